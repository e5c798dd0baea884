// Azur Lane scene catalogue.
// Registration order is recognition priority: popups before the screen they cover,
// fleet selection variants before the generic popup.

use super::assets::GameAssets;
use super::helpers::show_duty;
use super::names::*;
use crate::assets::AssetResolver;
use crate::capture::Point;
use crate::scene::{
    Action, Recognizer, Scene, SceneError, SceneGraphBuilder, SceneResult, Transition,
    UNKNOWN_SCENE,
};
use std::sync::Arc;
use std::time::Duration;

fn pixels(resolver: &AssetResolver, paths: &[&str]) -> Recognizer {
    Recognizer::pixels(resolver.eigens(paths))
}

fn click(resolver: &AssetResolver, path: &str, settle_secs: f32) -> Transition {
    Transition::click(resolver.rect(path)).settle_secs(settle_secs)
}

fn back_to_main(resolver: &AssetResolver) -> Transition {
    click(resolver, "AnchorAweigh.Button_BackToMain", 1.0)
}

const MAIN_RESOURCES: [&str; 3] = [
    "Main.Icon_Resources.Icon_Oil",
    "Main.Icon_Resources.Icon_Money",
    "Main.Icon_Resources.Icon_Diamond",
];

fn with_resources(paths: &[&'static str]) -> Vec<&'static str> {
    let mut all = paths.to_vec();
    all.extend_from_slice(&MAIN_RESOURCES);
    all
}

pub fn register_login_scenes(builder: &mut SceneGraphBuilder, resolver: &AssetResolver) -> SceneResult<()> {
    let update_hint = "Popups.UpdateHint";
    builder
        .register(
            Scene::new(
                POPUP_UPDATE_HINT,
                Recognizer::template(
                    resolver.image_rect(update_hint),
                    resolver.template(update_hint),
                    0.8,
                ),
            )
            .way(
                UNKNOWN_SCENE,
                click(resolver, &format!("{update_hint}.Button_Confirm"), 1.0),
            ),
        )?
        .register(
            Scene::new(
                POPUP_INFORMATION_S001,
                pixels(resolver, &["Popups.Information.Style_001"])
                    .and(pixels(resolver, &["Popups.Information.Style_002"]).negate()),
            )
            .way(
                LOGIN_BY_ACCOUNT,
                click(resolver, "Popups.Information.Style_001.Button_OK", 0.75),
            ),
        )?
        .register(
            Scene::new(LOGIN_BY_ACCOUNT, pixels(resolver, &["Login.ByAccount"])).way(
                LOGIN_BY_THIRD_PARTY,
                click(resolver, "Login.ByAccount.Button_ByThirdParty", 0.75),
            ),
        )?
        .register(
            Scene::new(LOGIN_BY_THIRD_PARTY, pixels(resolver, &["Login.ByThirdParty"]))
                .way(
                    LOGIN_BY_ACCOUNT,
                    click(resolver, "Login.ByThirdParty.Button_ByAccount", 0.75),
                )
                .way(
                    LOGIN_BY_GOOGLE,
                    click(resolver, "Login.ByThirdParty.Button_ByGoogle", 0.75),
                ),
        )?
        .register(Scene::new(LOGIN_BY_GOOGLE, pixels(resolver, &["Login.ByGoogle"])))?
        .register(
            Scene::new(LOGIN, pixels(resolver, &["Login"]))
                .way(MAIN, click(resolver, "Login", 0.75)),
        )?;
    Ok(())
}

pub fn register_main_scenes(builder: &mut SceneGraphBuilder, resolver: &AssetResolver) -> SceneResult<()> {
    let sos = "AnchorAweigh.Button_RescueSOS.Popup_RescueSOS";
    let commission = "Main.Button_Commission.Popup_Commission";
    let delegation_success = format!("{commission}.Popup_DelegationSuccess");
    let commission_label = format!("{commission}.Label_Commission");
    let open_delegations = Action::Sequence(vec![
        Action::Drag {
            from: Point::new(280, 340),
            to: Point::new(280, 940),
            duration: Duration::from_millis(250),
        },
        Action::Pause(Duration::from_millis(500)),
        Action::Click(resolver.rect(&format!("{commission}.Popup_Delegation"))),
        Action::Pause(Duration::from_millis(500)),
    ]);
    builder
        .register(
            Scene::new(
                POPUP_DELEGATION_SUCCESS,
                pixels(resolver, &[delegation_success.as_str()]),
            )
            .way(
                GET_ITEMS,
                click(
                    resolver,
                    &format!("{delegation_success}.Button_ExitScene"),
                    1.0,
                ),
            ),
        )?
        .register(
            Scene::new(
                POPUP_COMMISSION,
                pixels(resolver, &[commission_label.as_str()]),
            )
            .way(MAIN, click(resolver, &format!("{commission}.Button_Close"), 1.0))
            .way(DELEGATION_LIST, Transition::new(open_delegations).settle_secs(1.0)),
        )?
        .register(
            Scene::new(
                DELEGATION_LIST,
                pixels(
                    resolver,
                    &[
                        "Scene_DelegationList.Label_Delegation",
                        "Scene_DelegationList.Label_AvailableFleets",
                    ],
                ),
            )
            .way(MAIN, back_to_main(resolver)),
        )?
        .register(
            Scene::new(RESCUE_SOS, pixels(resolver, &[sos]))
                .way(MAIN, back_to_main(resolver))
                .way(ANCHOR_AWEIGH, click(resolver, &format!("{sos}.Button_GoBack"), 1.0))
                .way(
                    CAMPAIGN_CHAPTER,
                    click(resolver, &format!("{sos}.Button_Chapter03"), 1.5),
                ),
        )?
        .register(
            Scene::new(
                MAIN,
                pixels(resolver, &with_resources(&["Main.Button_AnchorAweigh"])),
            )
            .way(ANCHOR_AWEIGH, click(resolver, "Main.Button_AnchorAweigh", 1.5))
            .way(POPUP_COMMISSION, click(resolver, "Main.Button_Commission", 1.5)),
        )?
        .register(
            Scene::new(
                ANCHOR_AWEIGH,
                pixels(
                    resolver,
                    &[
                        "AnchorAweigh.Icon_Resources.Icon_Oil",
                        "AnchorAweigh.Icon_Resources.Icon_Money",
                        "AnchorAweigh.Icon_Resources.Icon_Diamond",
                        "AnchorAweigh.Button_MainBattleLine",
                        "AnchorAweigh.Label_WeighAnchor",
                    ],
                ),
            )
            .way(MAIN, back_to_main(resolver))
            .way(
                CAMPAIGN_CHAPTER,
                click(resolver, "AnchorAweigh.Button_MainBattleLine", 1.0),
            )
            .way(RESCUE_SOS, click(resolver, "AnchorAweigh.Button_RescueSOS", 1.0))
            .way(CAMPAIGN_SPECIAL, click(resolver, "AnchorAweigh.Button_Special", 1.0)),
        )?;
    Ok(())
}

fn fleet_selection(name: &'static str, recognizer: Recognizer, resolver: &AssetResolver) -> Scene {
    let scene = Scene::new(name, recognizer)
        .way(
            CAMPAIGN_CHAPTER,
            click(resolver, "PopupFleetSelect.Button_Close", 1.0),
        )
        .way(
            CAMPAIGN,
            click(resolver, "PopupFleetSelect.Button_ImmediateStart", 1.0),
        );
    if name == FLEET_SELECTION_DUTY {
        return scene;
    }
    scene.way(
        FLEET_SELECTION_DUTY,
        click(resolver, "PopupFleetSelect.Button_ChangeDuty", 1.0),
    )
}

pub fn register_chapter_scenes(
    builder: &mut SceneGraphBuilder,
    resolver: &AssetResolver,
    assets: &Arc<GameAssets>,
) -> SceneResult<()> {
    let immediate_start = || click(resolver, "PopupStageInfo.Button_ImmediateStart", 1.0);
    builder.register(
        Scene::new(
            STAGE_INFO,
            pixels(
                resolver,
                &[
                    "PopupStageInfo.Label_WeighAnchor",
                    "PopupStageInfo.Button_ImmediateStart",
                ],
            ),
        )
        .way(
            CAMPAIGN_CHAPTER,
            click(resolver, "PopupStageInfo.Button_Close", 1.0),
        )
        .way(FLEET_SELECTION, immediate_start())
        .way(FLEET_SELECTION_ARBITRATE, immediate_start())
        .way(FLEET_SELECTION_FIXED, immediate_start()),
    )?;

    let base = pixels(
        resolver,
        &[
            "PopupFleetSelect.Label_FleetSelect",
            "PopupFleetSelect.Label_Marine",
        ],
    );
    let fixed = pixels(resolver, &["PopupFleetSelect.Button_ChangeFormation"]);
    let duty = assets.duty.clone();
    let duty_showing = Recognizer::custom(move |ctx| show_duty(ctx, &duty) != 0);

    builder
        .register(fleet_selection(
            FLEET_SELECTION_DUTY,
            duty_showing.and(base.clone()),
            resolver,
        ))?
        .register(fleet_selection(
            FLEET_SELECTION_FIXED,
            fixed.clone().and(base.clone()),
            resolver,
        ))?
        .register(fleet_selection(
            FLEET_SELECTION_ARBITRATE,
            fixed.negate().and(base.clone()),
            resolver,
        ))?
        .register(fleet_selection(FLEET_SELECTION, base, resolver))?;

    let stage_assets = assets.clone();
    let open_stage = Action::custom(move |ctx, args| {
        let stage = args.require(CAMPAIGN_CHAPTER, ARG_STAGE)?;
        let rect = stage_assets
            .stage_rect(stage)
            .map_err(|_| SceneError::InvalidArgument {
                name: ARG_STAGE.to_string(),
                value: stage.to_string(),
            })?;
        ctx.click(rect.random_point())?;
        Ok(())
    });
    builder.register(
        Scene::new(
            CAMPAIGN_CHAPTER,
            pixels(
                resolver,
                &with_resources(&[
                    "CampaignChapter.Button_DailyTask",
                    "CampaignChapter.Label_WeighAnchor",
                ]),
            ),
        )
        .way(MAIN, back_to_main(resolver))
        .way(
            ANCHOR_AWEIGH,
            click(resolver, "CampaignChapter.Chapters.Button_BackToAnchorAweigh", 1.0),
        )
        .way(STAGE_INFO, Transition::new(open_stage).settle_secs(1.0)),
    )?;
    Ok(())
}

/// Event maps come in two modes sharing one screen layout; the mode button
/// shows which one is active.
pub fn register_event_scenes(
    builder: &mut SceneGraphBuilder,
    resolver: &AssetResolver,
    assets: &Arc<GameAssets>,
) -> SceneResult<()> {
    let base = pixels(resolver, &with_resources(&["CampaignSpecial.Label_WeighAnchor"]));
    let activity = pixels(resolver, &["CampaignSpecial.Button_SwitchMode.State_Activity"]);
    let event_scene = |name: &'static str, recognizer: Recognizer, other: &'static str| {
        let stage_assets = assets.clone();
        let open_stage = Action::custom(move |ctx, args| {
            let stage = args.require(name, ARG_STAGE)?;
            let rect = stage_assets
                .event_stage_rect(stage)
                .map_err(|_| SceneError::InvalidArgument {
                    name: ARG_STAGE.to_string(),
                    value: stage.to_string(),
                })?;
            ctx.click(rect.random_point())?;
            Ok(())
        });
        Scene::new(name, recognizer)
            .way(MAIN, back_to_main(resolver))
            .way(other, click(resolver, "CampaignSpecial.Button_SwitchMode", 1.0))
            .way(STAGE_INFO, Transition::new(open_stage).settle_secs(1.0))
    };
    builder
        .register(event_scene(
            CAMPAIGN_ACTIVITY,
            base.clone().and(activity.clone()),
            CAMPAIGN_SPECIAL,
        ))?
        .register(event_scene(
            CAMPAIGN_SPECIAL,
            base.and(activity.negate()),
            CAMPAIGN_ACTIVITY,
        ))?;
    Ok(())
}

pub fn register_battle_scenes(builder: &mut SceneGraphBuilder, resolver: &AssetResolver) -> SceneResult<()> {
    let auto_battle = "Popup_Information.AutoBattle";
    builder
        .register(
            Scene::new(
                INFO_AUTO_BATTLE,
                pixels(resolver, &[auto_battle, "Popup_Information.AutoBattle.Button_Ensure"]),
            )
            .way(
                BATTLE_FORMATION,
                click(resolver, "Popup_Information.AutoBattle.Button_Ensure", 0.75),
            ),
        )?
        .register(
            Scene::new(
                BATTLE_FORMATION,
                pixels(
                    resolver,
                    &[
                        "BeforeBattle.Formation.Button_WeighAnchor",
                        "BeforeBattle.Formation.Label_MainFleet",
                        "BeforeBattle.Formation.Label_VanguardFleet",
                    ],
                ),
            )
            .way(MAIN, back_to_main(resolver))
            .way(
                BATTLE,
                click(resolver, "BeforeBattle.Formation.Button_WeighAnchor", 2.5),
            ),
        )?
        .register(Scene::new(BATTLE, pixels(resolver, &["Battle.Button_Pause"])))?;
    Ok(())
}

pub fn register_campaign_scenes(
    builder: &mut SceneGraphBuilder,
    resolver: &AssetResolver,
) -> SceneResult<()> {
    let without_meta = "CampaignChapter.Label_TotalRewards_without_META";
    let with_meta = "CampaignChapter.Label_TotalRewards_with_META";
    let go_again = format!("{without_meta}.Button_GoAgain");
    let go_again_meta = format!("{with_meta}.Button_GoAgain");
    builder
        .register(
            Scene::new(CAMPAIGN_INFO, pixels(resolver, &["Campaign.Popup_Information"])).way(
                CAMPAIGN,
                click(resolver, "Campaign.Popup_Information.Button_Exit", 0.75),
            ),
        )?
        .register(
            Scene::new(GET_SHIP, pixels(resolver, &["Campaign.Popup_GetShip"])).way(
                CAMPAIGN,
                click(resolver, "Campaign.Popup_GetShip.Button_Exit", 2.0),
            ),
        )?
        .register(
            Scene::new(
                CAMPAIGN_REWARD,
                pixels(
                    resolver,
                    &[without_meta, go_again.as_str()],
                ),
            )
            .way(
                CAMPAIGN,
                click(resolver, &format!("{without_meta}.Button_EmptySpace"), 1.5),
            ),
        )?
        .register(
            Scene::new(
                CAMPAIGN_REWARD_META,
                pixels(resolver, &[with_meta, go_again_meta.as_str()]),
            )
            .way(
                CAMPAIGN,
                click(resolver, &format!("{with_meta}.Button_EmptySpace"), 1.5),
            ),
        )?
        .register(
            Scene::new(
                CAMPAIGN,
                pixels(
                    resolver,
                    &with_resources(&["Campaign.Label_LimitTime", "Campaign.Label_WeighAnchor"]),
                ),
            )
            .way(MAIN, back_to_main(resolver)),
        )?
        .register(
            Scene::new(
                BATTLE_CHECKPOINT_00,
                pixels(resolver, &["AfterBattle.Checkpoint_00.Label_Perfect"]),
            )
            .way(
                CAMPAIGN,
                click(resolver, "AfterBattle.Checkpoint_00.Button_EmptySpace", 0.75),
            ),
        )?
        .register(
            Scene::new(
                BATTLE_CHECKPOINT_01,
                pixels(resolver, &["AfterBattle.Checkpoint_01.Label_Checkpoint"]),
            )
            .way(
                GET_ITEMS,
                click(resolver, "AfterBattle.Checkpoint_01.Button_EmptySpace", 0.5),
            ),
        )?
        .register(
            Scene::new(
                GET_ITEMS,
                Recognizer::AnyOf(vec![
                    pixels(resolver, &["Popup_GetItems.Label_GetItems1"]),
                    pixels(resolver, &["Popup_GetItems.Label_GetItems2"]),
                ]),
            )
            .way(
                BATTLE_RESULT,
                click(resolver, "Popup_GetItems.Button_EmptySpace", 0.5),
            ),
        )?
        .register(
            Scene::new(
                BATTLE_RESULT,
                pixels(
                    resolver,
                    &[
                        "AfterBattle.BattleResult.Button_DamageReport",
                        "AfterBattle.BattleResult.Button_Ensure",
                    ],
                ),
            )
            .way(
                CAMPAIGN,
                click(resolver, "AfterBattle.BattleResult.Button_Ensure", 0.75),
            ),
        )?;
    Ok(())
}

/// Register every Azur Lane scene in recognition priority order.
pub fn register_scenes(
    builder: &mut SceneGraphBuilder,
    resolver: &AssetResolver,
    assets: &Arc<GameAssets>,
) -> SceneResult<()> {
    register_login_scenes(builder, resolver)?;
    register_main_scenes(builder, resolver)?;
    register_chapter_scenes(builder, resolver, assets)?;
    register_event_scenes(builder, resolver, assets)?;
    register_battle_scenes(builder, resolver)?;
    register_campaign_scenes(builder, resolver)?;
    Ok(())
}
