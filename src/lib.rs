pub mod app;
pub mod args;
pub mod assets;
pub mod azur_lane;
pub mod capture;
pub mod config;
pub mod console;
pub mod gateway;
pub mod input;
pub mod scene;
pub mod task;
pub mod vision;

pub use app::{AppError, AppResult};
pub use gateway::Gateway;
