//! Application setup: config, asset catalogue, scene graph, gateway and console

use crate::args::{Args, Mode};
use crate::assets::{AssetCatalogue, AssetError};
use crate::azur_lane::{self, GameAssets, register_tasks};
use crate::capture::{CaptureContext, CaptureError, FrameContext};
use crate::config::{AppConfig, AppConfigError};
use crate::console::Console;
use crate::gateway::Gateway;
use crate::input::{ConsoleHotkeys, InputError};
use crate::scene::{SceneError, SceneGraph, SceneTracker};
use crate::task::{TaskEnvironment, TaskError, TaskManager, TaskRegistry};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{source}")]
    Config {
        #[from]
        source: AppConfigError,
    },

    #[error("{source}")]
    Asset {
        #[from]
        source: AssetError,
    },

    #[error("{source}")]
    Scene {
        #[from]
        source: SceneError,
    },

    #[error("{source}")]
    Capture {
        #[from]
        source: CaptureError,
    },

    #[error("{source}")]
    Task {
        #[from]
        source: TaskError,
    },

    #[error("{source}")]
    Input {
        #[from]
        source: InputError,
    },

    #[error("Console failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("No capture source, pass --frame=PNG")]
    NoCaptureSource,
}

pub type AppResult<T> = Result<T, AppError>;

/// Config file first, then command line overrides
pub fn resolve_config(args: &Args) -> AppResult<AppConfig> {
    let mut config = AppConfig::load_or_default(args.config.as_deref())?;
    if let Some(assets) = &args.assets {
        config.assets = assets.clone();
    }
    if let Some(ms) = args.interval_ms {
        config.poll_interval_ms = ms;
    }
    if args.use_defaults {
        config.interactive_config = false;
    }
    Ok(config)
}

pub fn load_game(config: &AppConfig) -> AppResult<(Arc<SceneGraph>, Arc<GameAssets>)> {
    let catalogue = Arc::new(AssetCatalogue::load(&config.assets)?);
    let (graph, assets) = azur_lane::load(catalogue)?;
    Ok((Arc::new(graph), assets))
}

/// Recognize the scene shown on a saved screenshot.
pub fn detect_scene(graph: &SceneGraph, screenshot: &Path) -> AppResult<&'static str> {
    let frame = FrameContext::open(screenshot)?;
    Ok(graph.recognize(&frame).name())
}

pub async fn run(args: Args) -> AppResult<()> {
    let config = resolve_config(&args)?;
    match args.mode {
        Mode::Detect(screenshot) => {
            let (graph, _) = load_game(&config)?;
            let scene = detect_scene(&graph, &screenshot)?;
            println!("🔍 {}: {scene}", screenshot.display());
            Ok(())
        }
        Mode::Run => {
            let frame = args.frame.ok_or(AppError::NoCaptureSource)?;
            let capture: Arc<dyn CaptureContext> = Arc::new(FrameContext::open(&frame)?);
            serve(config, capture).await
        }
    }
}

/// Start the gateway and run the console until exit, end of input or Ctrl-C.
pub async fn serve(config: AppConfig, capture: Arc<dyn CaptureContext>) -> AppResult<()> {
    let (graph, assets) = load_game(&config)?;
    let tracker = Arc::new(SceneTracker::new(graph.unknown()));
    let mut registry = TaskRegistry::new();
    register_tasks(&mut registry, &assets)?;

    log::info!(
        "📱 Capture source: {} ({}x{})",
        capture.device_name(),
        capture.screen_dimensions().0,
        capture.screen_dimensions().1
    );
    let env = TaskEnvironment::new(capture, graph, tracker.clone())
        .with_results_dir(config.results_dir.clone())
        .with_step_backoff(config.step_backoff())
        .with_overrides(config.task_overrides()?);
    let hotkeys = ConsoleHotkeys::new();
    let mut gateway = Gateway::new(TaskManager::new(env, registry), Arc::new(hotkeys.clone()))
        .with_poll_interval(config.poll_interval());
    gateway.start().await?;

    let console = Console::new(gateway.manager(), tracker, hotkeys, gateway.shutdown_token())
        .interactive(config.interactive_config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result = tokio::select! {
        result = console.run(&mut lines) => result,
        _ = tokio::signal::ctrl_c() => {
            log::info!("🛑 Ctrl-C received");
            Ok(())
        }
    };
    gateway.close().await;
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Fingerprint;
    use crate::scene::{Recognizer, Scene};
    use image::{Rgb, RgbImage};

    #[test]
    fn test_detect_scene_from_screenshot() {
        let mut builder = SceneGraph::builder();
        builder
            .register(Scene::new(
                "Green",
                Recognizer::pixels(vec![Fingerprint::new(1, 1, Rgb([0, 255, 0]))]),
            ))
            .unwrap();
        let graph = builder.build().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        RgbImage::from_pixel(4, 4, Rgb([0, 255, 0])).save(&path).unwrap();
        assert_eq!(detect_scene(&graph, &path).unwrap(), "Green");

        RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])).save(&path).unwrap();
        assert!(graph.get(detect_scene(&graph, &path).unwrap()).unwrap().is_unknown());
    }

    #[test]
    fn test_command_line_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(&path, "assets = \"a.toml\"\npoll_interval_ms = 500").unwrap();
        let args = Args::parse_from([
            format!("--config={}", path.display()),
            "--interval=50".to_string(),
            "--defaults".to_string(),
        ])
        .unwrap();

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.assets, Path::new("a.toml"));
        assert_eq!(config.poll_interval_ms, 50);
        assert!(!config.interactive_config);
    }

    #[tokio::test]
    async fn test_run_without_frame_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(&path, "poll_interval_ms = 500").unwrap();
        let args = Args::parse_from([format!("--config={}", path.display())]).unwrap();
        assert!(matches!(
            run(args).await,
            Err(AppError::NoCaptureSource)
        ));
    }
}
