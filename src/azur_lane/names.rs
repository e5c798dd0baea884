// Scene names of the Azur Lane scene graph

pub const LOGIN: &str = "Scene.Login";
pub const LOGIN_BY_ACCOUNT: &str = "Scene.LoginByAccount";
pub const LOGIN_BY_THIRD_PARTY: &str = "Scene.LoginByThirdParty";
pub const LOGIN_BY_GOOGLE: &str = "Scene.LoginByGoogle";
pub const POPUP_INFORMATION_S001: &str = "Popup.Information.S001";
pub const POPUP_UPDATE_HINT: &str = "Popup.UpdateHint";

pub const MAIN: &str = "Scene.Main";
pub const ANCHOR_AWEIGH: &str = "Scene.AnchorAweigh";
pub const RESCUE_SOS: &str = "Popup.RescueSOS";
pub const POPUP_COMMISSION: &str = "Popup.Commission";
pub const POPUP_DELEGATION_SUCCESS: &str = "Popup.DelegationSuccess";
pub const DELEGATION_LIST: &str = "Scene.DelegationList";

pub const CAMPAIGN_CHAPTER: &str = "Scene.CampaignChapter";
pub const CAMPAIGN_SPECIAL: &str = "Scene.CampaignSpecial";
pub const CAMPAIGN_ACTIVITY: &str = "Scene.CampaignActivity";
pub const STAGE_INFO: &str = "Popup.StageInfo";
pub const FLEET_SELECTION: &str = "Popup.FleetSelection";
pub const FLEET_SELECTION_ARBITRATE: &str = "Popup.FleetSelection.Arbitrate";
pub const FLEET_SELECTION_FIXED: &str = "Popup.FleetSelection.Fixed";
pub const FLEET_SELECTION_DUTY: &str = "Popup.FleetSelection.Duty";

pub const CAMPAIGN: &str = "Scene.Campaign";
pub const CAMPAIGN_INFO: &str = "Popup.CampaignInfo";
pub const GET_SHIP: &str = "Popup.GetShip";
pub const CAMPAIGN_REWARD: &str = "Popup.CampaignReward";
pub const CAMPAIGN_REWARD_META: &str = "Popup.CampaignReward.Meta";

pub const INFO_AUTO_BATTLE: &str = "Popup.Information.AutoBattle";
pub const BATTLE_FORMATION: &str = "Scene.BattleFormation";
pub const BATTLE: &str = "Scene.Battle";
pub const BATTLE_CHECKPOINT_00: &str = "Scene.BattleCheckpoint00";
pub const BATTLE_CHECKPOINT_01: &str = "Scene.BattleCheckpoint01";
pub const GET_ITEMS: &str = "Scene.GetItems";
pub const BATTLE_RESULT: &str = "Scene.BattleResult";

/// Transition argument naming the stage to open, `"13-4"` on the chapter map or `"B3"` on an event map
pub const ARG_STAGE: &str = "stage";
