use auto_game_run::app;
use auto_game_run::args::Args;

#[tokio::main]
async fn main() {
    let Some(args) = Args::parse() else {
        return;
    };

    // RUST_LOG wins over --debug
    let level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    println!("🚀 Auto Game Run {}", env!("APP_VERSION_DISPLAY"));
    if let Err(e) = app::run(args).await {
        println!("❌ {e}");
        std::process::exit(1);
    }
}
