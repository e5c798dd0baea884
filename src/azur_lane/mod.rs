// Azur Lane module - the game's scene catalogue, recognition helpers and tasks
// Scenes and helper assets are resolved together against one asset catalogue,
// so a single startup reports every missing entry.

pub mod assets;
pub mod delegation;
pub mod helpers;
pub mod names;
pub mod scenes;
pub mod tasks;


pub use assets::{
    DelegationAssets, DutyPanel, EnemyScale, GameAssets, RegionTemplate, Toggle, TemplateToggle,
};
pub use delegation::{Delegation, DelegationBook, DelegationEntry, DelegationError, Resource};
pub use scenes::register_scenes;
pub use tasks::{
    AUTO_LOGIN, AutoLogin, FARM_CAMPAIGN_SPECIAL, FARM_CHAPTER, FARM_SUBMARINE_SOS,
    FarmCampaignSpecial, FarmChapter, FarmSubmarineSOS, REVIEW_DELEGATIONS, ReviewDelegations,
    register_tasks,
};

use crate::assets::{AssetCatalogue, AssetResolver};
use crate::scene::{SceneGraph, SceneResult};
use std::sync::Arc;

/// Build the scene graph and the run-time helper assets from `catalogue`.
pub fn load(catalogue: Arc<AssetCatalogue>) -> SceneResult<(SceneGraph, Arc<GameAssets>)> {
    let resolver = AssetResolver::new(&catalogue);
    let assets = Arc::new(GameAssets::resolve(&resolver, catalogue.clone()));
    let mut builder = SceneGraph::builder();
    register_scenes(&mut builder, &resolver, &assets)?;
    resolver.finish()?;
    let graph = builder.build()?;
    log::info!("🗺️ Azur Lane catalogue loaded: {} scenes", graph.len());
    Ok((graph, assets))
}
