// Run-time helper assets, resolved with the scene graph so one run reports every missing entry

use crate::assets::{AssetCatalogue, AssetResolver, AssetResult};
use crate::capture::{Fingerprint, Rect};
use image::RgbImage;
use std::sync::Arc;

const FLEET_KEYS: [&str; 6] = [
    "Button_FleetOne",
    "Button_FleetTwo",
    "Button_FleetThree",
    "Button_FleetFour",
    "Button_FleetFive",
    "Button_FleetSix",
];

/// A button together with the fingerprints showing it is selected
#[derive(Debug, Clone, Default)]
pub struct Toggle {
    pub rect: Rect,
    pub state: Vec<Fingerprint>,
}

impl Toggle {
    fn resolve(resolver: &AssetResolver, button: &str, state: &str) -> Self {
        let state = format!("{button}.{state}");
        Self {
            rect: resolver.rect(button),
            state: resolver.eigens(&[state.as_str()]),
        }
    }

    fn selected(resolver: &AssetResolver, button: &str) -> Self {
        Self {
            rect: resolver.rect(button),
            state: resolver.eigens(&[button]),
        }
    }
}

/// A button whose state is told apart by two template images
#[derive(Debug, Clone)]
pub struct TemplateToggle {
    pub rect: Rect,
    pub on: Arc<RgbImage>,
    pub off: Arc<RgbImage>,
}

impl TemplateToggle {
    fn resolve(resolver: &AssetResolver, button: &str) -> Self {
        Self {
            rect: resolver.rect(button),
            on: resolver.template(&format!("{button}.State_On")),
            off: resolver.template(&format!("{button}.State_Off")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegionTemplate {
    pub rect: Rect,
    pub template: Arc<RgbImage>,
}

impl RegionTemplate {
    fn resolve(resolver: &AssetResolver, path: &str) -> Self {
        Self {
            rect: resolver.image_rect(path),
            template: resolver.template(path),
        }
    }
}

/// Delegation list entries are located by their level label; the other
/// regions are offsets from it.
#[derive(Debug, Clone)]
pub struct DelegationAssets {
    pub label_level: Arc<RgbImage>,
    pub label_processing: Arc<RgbImage>,
    pub processing_offset: Rect,
    pub mission_name_offset: Rect,
}

#[derive(Debug, Clone, Default)]
pub struct DutyPanel {
    /// Auto engage, stand by
    pub submarine: [Toggle; 2],
    /// Stand by, all battle, flagship, normal battle
    pub normal: [Toggle; 4],
}

impl DutyPanel {
    fn resolve(resolver: &AssetResolver) -> Self {
        let btn = "PopupFleetSelect.Button_ChangeDuty";
        Self {
            submarine: ["Button_AutoEngage", "Button_StandBy"]
                .map(|key| Toggle::selected(resolver, &format!("{btn}.Submarine.{key}"))),
            normal: [
                "Button_StandBy",
                "Button_AllBattle",
                "Button_Flagship",
                "Button_NormalBattle",
            ]
            .map(|key| Toggle::selected(resolver, &format!("{btn}.NormalFleet.{key}"))),
        }
    }
}

/// Enemy fleet sizes on the campaign map, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnemyScale {
    Boss,
    Large,
    Medium,
    Small,
}

impl EnemyScale {
    pub const ALL: [EnemyScale; 4] = [
        EnemyScale::Boss,
        EnemyScale::Large,
        EnemyScale::Medium,
        EnemyScale::Small,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            EnemyScale::Boss => "Boss",
            EnemyScale::Large => "Large",
            EnemyScale::Medium => "Medium",
            EnemyScale::Small => "Small",
        }
    }

    /// Offset from a template hit to a clickable spot on the fleet.
    /// `hits` is the number of de-duplicated hits of this scale.
    pub fn click_offset(&self, hits: usize) -> (i64, i64) {
        match self {
            EnemyScale::Boss if hits == 1 => (30, 30),
            EnemyScale::Boss => (0, 0),
            _ => (50, 80),
        }
    }
}

pub struct GameAssets {
    catalogue: Arc<AssetCatalogue>,
    pub back_to_main: Rect,
    pub chapter_title: Rect,
    pub next_chapter: Rect,
    pub prev_chapter: Rect,
    pub stage_automation: Rect,
    pub choose_team: [Rect; 2],
    /// Fleet buttons 1..=6 in each team drop-down
    pub fleets: [[Rect; 6]; 2],
    pub duty: DutyPanel,
    pub formation_automation: Toggle,
    pub enemies: Vec<(EnemyScale, Vec<Arc<RgbImage>>)>,
    pub rescue_count: Rect,
    pub signal_found: Vec<Fingerprint>,
    pub rewards: Rect,
    pub rewards_meta: Rect,
    pub information_text: Rect,
    pub google_account: Rect,
    pub campaign_automation: TemplateToggle,
    pub living_area_notice: RegionTemplate,
    pub delegation: DelegationAssets,
}

impl GameAssets {
    pub fn resolve(resolver: &AssetResolver, catalogue: Arc<AssetCatalogue>) -> Self {
        let team = "PopupFleetSelect.Formation";
        let fleets = ["Button_ChooseTeamOne", "Button_ChooseTeamTwo"].map(|chooser| {
            FLEET_KEYS.map(|fleet| resolver.rect(&format!("{team}.{chooser}.{fleet}")))
        });
        Self {
            back_to_main: resolver.rect("AnchorAweigh.Button_BackToMain"),
            chapter_title: resolver.image_rect("CampaignChapter.Chapters.ChapterNo"),
            next_chapter: resolver.rect("CampaignChapter.Chapters.Button_NextChapter"),
            prev_chapter: resolver.rect("CampaignChapter.Chapters.Button_PrevChapter"),
            stage_automation: resolver.rect("PopupStageInfo.Button_Automation"),
            choose_team: [
                resolver.rect(&format!("{team}.Button_ChooseTeamOne")),
                resolver.rect(&format!("{team}.Button_ChooseTeamTwo")),
            ],
            fleets,
            duty: DutyPanel::resolve(resolver),
            formation_automation: Toggle::resolve(
                resolver,
                "BeforeBattle.Formation.Automation.Button_Automation",
                "State_On",
            ),
            enemies: EnemyScale::ALL
                .iter()
                .map(|scale| {
                    let path = format!("Campaign.Enemy.Scale.{}", scale.key());
                    (*scale, resolver.templates_under(&path))
                })
                .collect(),
            rescue_count: resolver.image_rect("AnchorAweigh.Button_RescueSOS"),
            signal_found: resolver.eigens(&[
                "AnchorAweigh.Button_RescueSOS.Popup_RescueSOS.Button_Chapter03.State_SignalFound",
            ]),
            rewards: resolver.image_rect("CampaignChapter.Label_TotalRewards_without_META"),
            rewards_meta: resolver.image_rect("CampaignChapter.Label_TotalRewards_with_META"),
            information_text: resolver.image_rect("Popups.Information.Style_001"),
            google_account: resolver.rect("Login.ByGoogle.Account_01"),
            campaign_automation: TemplateToggle::resolve(resolver, "Campaign.Button_Automation"),
            living_area_notice: RegionTemplate::resolve(
                resolver,
                "Main.Button_LivingArea.State_HasNewNotice",
            ),
            delegation: DelegationAssets {
                label_level: resolver.template("Scene_DelegationList.Label_Level"),
                label_processing: resolver
                    .template("Scene_DelegationList.Label_Level.Label_Processing"),
                processing_offset: resolver
                    .image_rect("Scene_DelegationList.Label_Level.Label_Processing"),
                mission_name_offset: resolver
                    .rect("Scene_DelegationList.Label_Level.Label_MissionName"),
            },
            catalogue,
        }
    }

    pub fn catalogue(&self) -> &AssetCatalogue {
        &self.catalogue
    }

    /// Stage button on the chapter map, e.g. `stage_rect("13-4")`
    pub fn stage_rect(&self, stage: &str) -> AssetResult<Rect> {
        self.catalogue
            .rect(&format!("CampaignChapter.Chapters.Stages.{stage}"))
    }

    /// Stage button on an event map, e.g. `event_stage_rect("B3")`
    pub fn event_stage_rect(&self, stage: &str) -> AssetResult<Rect> {
        self.catalogue
            .rect(&format!("CampaignSpecial.Stages.{stage}"))
    }

    /// Fleet button for `fleet` (1..=6) in the drop-down of `team` (0 or 1)
    pub fn fleet_button(&self, team: usize, fleet: u8) -> Option<Rect> {
        let fleet = usize::from(fleet).checked_sub(1)?;
        self.fleets.get(team)?.get(fleet).copied()
    }
}
