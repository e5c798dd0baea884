// Azur Lane automation tasks.
// Each step only acts when the tracker is on its scene, so a pass can start anywhere in the flow.

use super::assets::GameAssets;
use super::delegation::{DelegationBook, read_delegation_list};
use super::helpers::{
    attack_enemies, choose_team, enable_campaign_automation, has_new_notice, is_signal_found,
    recognize_information_popup, recognize_rescue_times, set_duty_marine,
    set_formation_automation, set_stage_automation, switch_to_chapter,
};
use super::names::*;
use crate::scene::{Action, TransitionArgs, UNKNOWN_SCENE};
use crate::task::{
    CAN_RUN, CAN_RUN_AFTER_BATTLE, ConfigError, ConfigOption, CyclicQueue, Task, TaskConfig,
    TaskContext, TaskDefinition, TaskRegistry, TaskResult,
};
use crate::vision::{MatchConfig, create_game_object_config};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const FARM_CHAPTER: &str = "FarmChapter";
pub const FARM_SUBMARINE_SOS: &str = "FarmSubmarineSOS";
pub const FARM_CAMPAIGN_SPECIAL: &str = "FarmCampaignSpecial";
pub const REVIEW_DELEGATIONS: &str = "ReviewDelegations";
pub const AUTO_LOGIN: &str = "AutoLogin";

const RESCUE_RETRIES: u32 = 20;
const RESCUE_RETRY_INTERVAL: Duration = Duration::from_millis(150);

/// Chapter number of a stage name like `"13-4"`
pub fn stage_chapter(stage: &str) -> Option<u32> {
    let (chapter, number) = stage.split_once('-')?;
    number.parse::<u32>().ok()?;
    chapter.parse().ok()
}

fn stage_option(config: &TaskConfig, name: &str) -> TaskResult<(String, u32)> {
    let stage = config.get_str(name)?.trim().to_string();
    let chapter = stage_chapter(&stage).ok_or_else(|| ConfigError::InvalidValue {
        name: name.to_string(),
        value: stage.clone(),
        expected: "a stage like 13-4",
    })?;
    Ok((stage, chapter))
}

fn reward_delay_option() -> ConfigOption {
    ConfigOption::integer(
        "reward_delay",
        5,
        "Seconds the reward screen settles before it is saved",
    )
}

// the reward popup animates in; save it once it settles
async fn save_rewards(
    cx: &TaskContext,
    assets: &GameAssets,
    delay_secs: u32,
    subdir: &str,
) -> TaskResult<PathBuf> {
    let rect = if cx.at(CAMPAIGN_REWARD_META) {
        assets.rewards_meta
    } else {
        assets.rewards
    };
    cx.sleep_secs(delay_secs as f32).await?;
    cx.save_region(rect, subdir).await
}

/// Farm one stage with the game's own auto-battle, saving every reward screen.
pub struct FarmChapter {
    assets: Arc<GameAssets>,
    team_one: CyclicQueue<u8>,
    team_two: CyclicQueue<u8>,
    duty: CyclicQueue<u8>,
    stage: String,
    chapter: u32,
    max_farm_time: u32,
    reward_delay: u32,
    farmed: u32,
    base_dir: String,
}

impl FarmChapter {
    pub fn options() -> Vec<ConfigOption> {
        vec![
            ConfigOption::list("team_one", "4,5", "Fleets cycled into team one"),
            ConfigOption::list("team_two", "6", "Fleets cycled into team two"),
            ConfigOption::text("target_stage", "13-4", "Stage to farm"),
            ConfigOption::list("duty_01", "8", "Normal fleet duty codes, cycled"),
            ConfigOption::integer("max_farm_time", 20, "Number of runs before stopping"),
            ConfigOption::text("base_dir", FARM_CHAPTER, "Result folder under the results directory"),
            reward_delay_option(),
        ]
    }

    pub fn from_config(config: &TaskConfig, assets: Arc<GameAssets>) -> TaskResult<Self> {
        let (stage, chapter) = stage_option(config, "target_stage")?;
        Ok(Self {
            assets,
            team_one: config.rotation("team_one")?,
            team_two: config.rotation("team_two")?,
            duty: config.rotation("duty_01")?,
            stage,
            chapter,
            max_farm_time: config.get("max_farm_time")?,
            reward_delay: config.get("reward_delay")?,
            farmed: 0,
            base_dir: config.get_str("base_dir")?.to_string(),
        })
    }

    pub fn farmed(&self) -> u32 {
        self.farmed
    }

    async fn save_result(&mut self, cx: &TaskContext) -> TaskResult<()> {
        let subdir = format!("{}/{}", self.base_dir, self.stage);
        save_rewards(cx, &self.assets, self.reward_delay, &subdir).await?;
        self.farmed += 1;
        log::info!(
            "🏁 [{}] run {}/{} of {} done",
            cx.name(),
            self.farmed,
            self.max_farm_time,
            self.stage
        );
        cx.goto(CAMPAIGN).await?;
        cx.wait(&[CAN_RUN_AFTER_BATTLE]).await
    }
}

#[async_trait]
impl Task for FarmChapter {
    fn name(&self) -> &str {
        FARM_CHAPTER
    }

    async fn execute(&mut self, cx: &TaskContext) -> TaskResult<()> {
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(MAIN, ANCHOR_AWEIGH).await?;

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(ANCHOR_AWEIGH, CAMPAIGN_CHAPTER).await?;

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(CAMPAIGN_CHAPTER) {
            let seen = switch_to_chapter(cx, &self.assets, self.chapter).await?;
            if seen == self.chapter {
                let args = TransitionArgs::new().with(ARG_STAGE, &self.stage);
                cx.goto_with(STAGE_INFO, &args).await?;
            }
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(STAGE_INFO) {
            let assets = self.assets.clone();
            cx.perform(Action::custom(move |ctx, _| {
                set_stage_automation(ctx, &assets, true)
            }))
            .await?;
            cx.goto(FLEET_SELECTION_ARBITRATE).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(FLEET_SELECTION_ARBITRATE) {
            let (one, two) = (self.team_one.next(), self.team_two.next());
            log::info!("🚢 [{}] teams {one} + {two}", cx.name());
            let assets = self.assets.clone();
            cx.perform(Action::custom(move |ctx, _| choose_team(ctx, &assets, one, two)))
                .await?;
            cx.goto(FLEET_SELECTION_DUTY).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(FLEET_SELECTION_DUTY) {
            let code = self.duty.next();
            let assets = self.assets.clone();
            let applied = cx
                .observe(move |ctx| set_duty_marine(ctx, &assets, code))
                .await??;
            if !applied {
                log::warn!("⚠️ [{}] duty {code} did not stick", cx.name());
            }
            cx.goto(CAMPAIGN).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(BATTLE) || cx.at(CAMPAIGN) {
            cx.sleep_secs(5.0).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(GET_SHIP) {
            cx.goto(CAMPAIGN).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(CAMPAIGN_REWARD) || cx.at(CAMPAIGN_REWARD_META) {
            self.save_result(cx).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(CAMPAIGN_INFO, CAMPAIGN).await?;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.farmed >= self.max_farm_time
    }
}

/// Farm event stages in rotation. Event maps come with fixed fleets more
/// often than the main line, so the fixed fleet popup skips team selection.
pub struct FarmCampaignSpecial {
    assets: Arc<GameAssets>,
    team_one: CyclicQueue<u8>,
    team_two: CyclicQueue<u8>,
    duty: CyclicQueue<u8>,
    stages: CyclicQueue<String>,
    current_stage: Option<String>,
    max_farm_time: u32,
    reward_delay: u32,
    farmed: u32,
    base_dir: String,
}

impl FarmCampaignSpecial {
    pub fn options() -> Vec<ConfigOption> {
        vec![
            ConfigOption::list("team_one", "1", "Fleets cycled into team one"),
            ConfigOption::list("team_two", "2", "Fleets cycled into team two"),
            ConfigOption::list("target_stage", "B3", "Event stages, cycled"),
            ConfigOption::list("duty_01", "8,4", "Normal fleet duty codes, cycled"),
            ConfigOption::integer("max_farm_time", 20, "Number of runs before stopping"),
            ConfigOption::text(
                "base_dir",
                FARM_CAMPAIGN_SPECIAL,
                "Result folder under the results directory",
            ),
            reward_delay_option(),
        ]
    }

    pub fn from_config(config: &TaskConfig, assets: Arc<GameAssets>) -> TaskResult<Self> {
        Ok(Self {
            assets,
            team_one: config.rotation("team_one")?,
            team_two: config.rotation("team_two")?,
            duty: config.rotation("duty_01")?,
            stages: config.rotation("target_stage")?,
            current_stage: None,
            max_farm_time: config.get("max_farm_time")?,
            reward_delay: config.get("reward_delay")?,
            farmed: 0,
            base_dir: config.get_str("base_dir")?.to_string(),
        })
    }

    pub fn farmed(&self) -> u32 {
        self.farmed
    }

    pub fn current_stage(&self) -> Option<&str> {
        self.current_stage.as_deref()
    }
}

#[async_trait]
impl Task for FarmCampaignSpecial {
    fn name(&self) -> &str {
        FARM_CAMPAIGN_SPECIAL
    }

    async fn execute(&mut self, cx: &TaskContext) -> TaskResult<()> {
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(MAIN, ANCHOR_AWEIGH).await?;

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(ANCHOR_AWEIGH, CAMPAIGN_SPECIAL).await?;

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(CAMPAIGN_SPECIAL) || cx.at(CAMPAIGN_ACTIVITY) {
            let stage = self.stages.next();
            log::info!("🗺️ [{}] opening event stage {stage}", cx.name());
            let args = TransitionArgs::new().with(ARG_STAGE, &stage);
            self.current_stage = Some(stage);
            cx.goto_with(STAGE_INFO, &args).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(STAGE_INFO) {
            let assets = self.assets.clone();
            cx.perform(Action::custom(move |ctx, _| {
                set_stage_automation(ctx, &assets, true)
            }))
            .await?;
            cx.goto(FLEET_SELECTION_ARBITRATE).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(FLEET_SELECTION_ARBITRATE) {
            let (one, two) = (self.team_one.next(), self.team_two.next());
            log::info!("🚢 [{}] teams {one} + {two}", cx.name());
            let assets = self.assets.clone();
            cx.perform(Action::custom(move |ctx, _| choose_team(ctx, &assets, one, two)))
                .await?;
            cx.goto(FLEET_SELECTION_DUTY).await?;
        } else if cx.at(FLEET_SELECTION_FIXED) {
            log::info!("🚢 [{}] fleets are fixed on this stage", cx.name());
            cx.goto(FLEET_SELECTION_DUTY).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(FLEET_SELECTION_DUTY) {
            let code = self.duty.next();
            let assets = self.assets.clone();
            let applied = cx
                .observe(move |ctx| set_duty_marine(ctx, &assets, code))
                .await??;
            if !applied {
                log::warn!("⚠️ [{}] duty {code} did not stick", cx.name());
            }
            cx.goto(CAMPAIGN).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(CAMPAIGN) {
            let assets = self.assets.clone();
            if cx
                .observe(move |ctx| enable_campaign_automation(ctx, &assets))
                .await??
            {
                log::info!("🤖 [{}] auto search switched on", cx.name());
            }
        }
        if cx.at(BATTLE) || cx.at(CAMPAIGN) {
            cx.sleep_secs(5.0).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(GET_SHIP) {
            cx.goto(CAMPAIGN).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(CAMPAIGN_REWARD) || cx.at(CAMPAIGN_REWARD_META) {
            let stage = self.current_stage.as_deref().unwrap_or("unknown");
            let subdir = format!("{}/{stage}", self.base_dir);
            save_rewards(cx, &self.assets, self.reward_delay, &subdir).await?;
            self.farmed += 1;
            log::info!(
                "🏁 [{}] run {}/{} of {stage} done",
                cx.name(),
                self.farmed,
                self.max_farm_time
            );
            cx.goto(CAMPAIGN).await?;
            cx.wait(&[CAN_RUN_AFTER_BATTLE]).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(CAMPAIGN_INFO, CAMPAIGN).await?;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.farmed >= self.max_farm_time
    }
}

/// Open the delegation list, collect finished delegations on the way and log
/// what is listed.
pub struct ReviewDelegations {
    assets: Arc<GameAssets>,
    book: Option<DelegationBook>,
    reviewed: bool,
}

impl ReviewDelegations {
    pub fn options() -> Vec<ConfigOption> {
        vec![ConfigOption::text(
            "book",
            "",
            "Delegation book next to the asset catalogue (empty for none)",
        )]
    }

    pub fn from_config(config: &TaskConfig, assets: Arc<GameAssets>) -> TaskResult<Self> {
        let file = config.get_str("book")?.trim();
        let book = if file.is_empty() {
            None
        } else {
            let path = assets.catalogue().base_dir().join(file);
            let book = DelegationBook::load(&path).map_err(|e| {
                log::error!("❌ {e}");
                ConfigError::InvalidValue {
                    name: "book".to_string(),
                    value: file.to_string(),
                    expected: "a delegation book file",
                }
            })?;
            Some(book)
        };
        Ok(Self {
            assets,
            book,
            reviewed: false,
        })
    }
}

#[async_trait]
impl Task for ReviewDelegations {
    fn name(&self) -> &str {
        REVIEW_DELEGATIONS
    }

    async fn execute(&mut self, cx: &TaskContext) -> TaskResult<()> {
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(MAIN, POPUP_COMMISSION).await?;

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(POPUP_DELEGATION_SUCCESS, GET_ITEMS).await?;

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(POPUP_COMMISSION, DELEGATION_LIST).await?;

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(DELEGATION_LIST) {
            let text = cx.text_recognizer().clone();
            let assets = self.assets.clone();
            let entries = cx
                .observe(move |ctx| {
                    ctx.full_screenshot()
                        .map(|shot| read_delegation_list(&shot, &assets.delegation, text.as_ref()))
                })
                .await??;
            log::info!("📋 [{}] {} delegation(s) listed", cx.name(), entries.len());
            for entry in &entries {
                let known = entry
                    .name
                    .as_deref()
                    .zip(self.book.as_ref())
                    .and_then(|(name, book)| book.find_most_similar(name));
                let state = if entry.processing { "in progress" } else { "open" };
                let limit = entry.time_limit.as_deref().unwrap_or("-");
                match known {
                    Some((delegation, score)) => log::info!(
                        "  {state} {delegation} limit {limit} (match {score:.2})"
                    ),
                    None => log::info!(
                        "  {state} {} limit {limit}",
                        entry.name.as_deref().unwrap_or("?")
                    ),
                }
            }
            cx.goto(MAIN).await?;
            self.reviewed = true;
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.reviewed
    }
}

/// Spend pending SOS rescue signals on the submarine stage.
pub struct FarmSubmarineSOS {
    assets: Arc<GameAssets>,
    match_config: MatchConfig,
    team_one: u8,
    team_two: u8,
    stage: String,
    signal_pending: bool,
    finished: bool,
}

impl FarmSubmarineSOS {
    pub fn options() -> Vec<ConfigOption> {
        vec![
            ConfigOption::integer("team_one", 1, "Fleet for team one"),
            ConfigOption::integer("team_two", 3, "Fleet for team two"),
            ConfigOption::text("sos_stage", "3-5", "Stage opened by the rescue signal"),
        ]
    }

    pub fn from_config(config: &TaskConfig, assets: Arc<GameAssets>) -> TaskResult<Self> {
        let (stage, _) = stage_option(config, "sos_stage")?;
        Ok(Self {
            assets,
            match_config: create_game_object_config(),
            team_one: config.get("team_one")?,
            team_two: config.get("team_two")?,
            stage,
            signal_pending: false,
            finished: false,
        })
    }
}

#[async_trait]
impl Task for FarmSubmarineSOS {
    fn name(&self) -> &str {
        FARM_SUBMARINE_SOS
    }

    async fn execute(&mut self, cx: &TaskContext) -> TaskResult<()> {
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(MAIN, ANCHOR_AWEIGH).await?;

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(ANCHOR_AWEIGH) {
            let text = cx.text_recognizer().clone();
            let assets = self.assets.clone();
            let rescues = cx
                .retry(
                    "rescue count",
                    RESCUE_RETRIES,
                    RESCUE_RETRY_INTERVAL,
                    move |ctx| recognize_rescue_times(ctx, text.as_ref(), &assets),
                )
                .await?;
            log::info!("🆘 [{}] {rescues} rescue(s) left", cx.name());
            if rescues > 0 {
                cx.goto(RESCUE_SOS).await?;
            } else {
                cx.goto(MAIN).await?;
                self.finished = true;
                return Ok(());
            }
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(RESCUE_SOS) {
            let assets = self.assets.clone();
            self.signal_pending = cx.observe(move |ctx| is_signal_found(ctx, &assets)).await?;
            if self.signal_pending {
                log::info!("📡 [{}] signal found", cx.name());
            } else {
                log::info!("📡 [{}] no signal, searching", cx.name());
            }
            cx.goto(CAMPAIGN_CHAPTER).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(CAMPAIGN_CHAPTER) {
            if self.signal_pending {
                let args = TransitionArgs::new().with(ARG_STAGE, &self.stage);
                cx.goto_with(STAGE_INFO, &args).await?;
            } else {
                cx.goto(ANCHOR_AWEIGH).await?;
            }
        }

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(STAGE_INFO, FLEET_SELECTION_ARBITRATE).await?;

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(FLEET_SELECTION_ARBITRATE) {
            let (one, two) = (self.team_one, self.team_two);
            let assets = self.assets.clone();
            cx.perform(Action::custom(move |ctx, _| choose_team(ctx, &assets, one, two)))
                .await?;
            cx.goto(CAMPAIGN).await?;
            self.signal_pending = false;
        }

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(CAMPAIGN) && attack_enemies(cx, &self.assets, &self.match_config).await? {
            cx.sleep_secs(8.0).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(INFO_AUTO_BATTLE, BATTLE_FORMATION).await?;

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(BATTLE_FORMATION) {
            let assets = self.assets.clone();
            let automated = cx
                .observe(move |ctx| set_formation_automation(ctx, &assets, true))
                .await??;
            if !automated {
                log::warn!("⚠️ [{}] auto battle is still off", cx.name());
            }
            cx.goto(BATTLE).await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(BATTLE_CHECKPOINT_00, CAMPAIGN).await?;
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(BATTLE_CHECKPOINT_01, GET_ITEMS).await?;
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(GET_ITEMS, BATTLE_RESULT).await?;
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(BATTLE_RESULT, CAMPAIGN).await?;
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(GET_SHIP, CAMPAIGN).await?;

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(CAMPAIGN_INFO, CAMPAIGN).await?;

        cx.wait(&[CAN_RUN]).await?;
        while cx.at(BATTLE) {
            cx.sleep_secs(2.0).await?;
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Log in through the Google account flow and dismiss the data-loss popup.
pub struct AutoLogin {
    assets: Arc<GameAssets>,
    logged_in: bool,
}

impl AutoLogin {
    pub fn new(assets: Arc<GameAssets>) -> Self {
        Self {
            assets,
            logged_in: false,
        }
    }
}

#[async_trait]
impl Task for AutoLogin {
    fn name(&self) -> &str {
        AUTO_LOGIN
    }

    async fn execute(&mut self, cx: &TaskContext) -> TaskResult<()> {
        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(POPUP_UPDATE_HINT, UNKNOWN_SCENE).await?;

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(LOGIN_BY_ACCOUNT, LOGIN_BY_THIRD_PARTY).await?;

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(LOGIN_BY_THIRD_PARTY, LOGIN_BY_GOOGLE).await?;

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(LOGIN_BY_GOOGLE) {
            log::info!("🔑 [{}] choosing the Google account", cx.name());
            cx.perform(Action::Sequence(vec![
                Action::Click(self.assets.google_account),
                Action::Pause(Duration::from_secs(3)),
            ]))
            .await?;
        }

        cx.wait(&[CAN_RUN]).await?;
        cx.switch_scene(LOGIN, MAIN).await?;

        cx.wait(&[CAN_RUN]).await?;
        if cx.at(POPUP_INFORMATION_S001) {
            let text = cx.text_recognizer().clone();
            let assets = self.assets.clone();
            let code = cx
                .observe(move |ctx| recognize_information_popup(ctx, text.as_ref(), &assets))
                .await??;
            if code == 0 {
                cx.switch_scene(POPUP_INFORMATION_S001, LOGIN_BY_ACCOUNT).await?;
            }
        }

        if cx.at(MAIN) {
            log::info!("✅ [{}] logged in", cx.name());
            let assets = self.assets.clone();
            if cx.observe(move |ctx| has_new_notice(ctx, &assets)).await? {
                log::info!("🔔 [{}] the living area has a new notice", cx.name());
            }
            self.logged_in = true;
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.logged_in
    }
}

/// Register the Azur Lane tasks in console order.
pub fn register_tasks(registry: &mut TaskRegistry, assets: &Arc<GameAssets>) -> TaskResult<()> {
    let farm_assets = assets.clone();
    let sos_assets = assets.clone();
    let special_assets = assets.clone();
    let delegation_assets = assets.clone();
    let login_assets = assets.clone();
    registry
        .register(
            TaskDefinition::new(FARM_CHAPTER, "Farm one stage with auto battle", move |config| {
                Ok(Box::new(FarmChapter::from_config(config, farm_assets.clone())?) as Box<dyn Task>)
            })
            .gates(&[CAN_RUN, CAN_RUN_AFTER_BATTLE])
            .options(FarmChapter::options()),
        )?
        .register(
            TaskDefinition::new(FARM_SUBMARINE_SOS, "Clear SOS rescue signals", move |config| {
                Ok(Box::new(FarmSubmarineSOS::from_config(config, sos_assets.clone())?)
                    as Box<dyn Task>)
            })
            .options(FarmSubmarineSOS::options()),
        )?
        .register(
            TaskDefinition::new(FARM_CAMPAIGN_SPECIAL, "Farm event stages in rotation", move |config| {
                Ok(Box::new(FarmCampaignSpecial::from_config(config, special_assets.clone())?)
                    as Box<dyn Task>)
            })
            .gates(&[CAN_RUN, CAN_RUN_AFTER_BATTLE])
            .options(FarmCampaignSpecial::options()),
        )?
        .register(
            TaskDefinition::new(REVIEW_DELEGATIONS, "List the delegations on offer", move |config| {
                Ok(Box::new(ReviewDelegations::from_config(config, delegation_assets.clone())?)
                    as Box<dyn Task>)
            })
            .options(ReviewDelegations::options()),
        )?
        .register(TaskDefinition::new(
            AUTO_LOGIN,
            "Log in with the first Google account",
            move |_| Ok(Box::new(AutoLogin::new(login_assets.clone())) as Box<dyn Task>),
        ))?;
    Ok(())
}
