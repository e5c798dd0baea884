use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Run the console against a capture source
    Run,
    /// Print the scene recognized on a screenshot and exit
    Detect(PathBuf),
}

#[derive(Debug)]
pub struct Args {
    pub mode: Mode,
    pub config: Option<PathBuf>,
    pub assets: Option<PathBuf>,
    pub frame: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub use_defaults: bool,
    pub debug_mode: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        Self::parse_from(env::args().skip(1))
    }

    pub fn parse_from<I, S>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mode = Mode::Run;
        let mut config: Option<PathBuf> = None;
        let mut assets: Option<PathBuf> = None;
        let mut frame: Option<PathBuf> = None;
        let mut interval_ms: Option<u64> = None;
        let mut use_defaults = false;
        let mut debug_mode = false;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("Auto Game Run {}", env!("APP_VERSION_DISPLAY"));
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--defaults" {
                use_defaults = true;
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--assets=") {
                assets = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--frame=") {
                frame = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--detect=") {
                mode = Mode::Detect(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--interval=") {
                match val.parse::<u64>() {
                    Ok(ms) if ms > 0 => interval_ms = Some(ms),
                    _ => {
                        eprintln!("❌ Invalid interval value: {}", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        Some(Args {
            mode,
            config,
            assets,
            frame,
            interval_ms,
            use_defaults,
            debug_mode,
        })
    }
}

fn print_help() {
    println!("🤖 Auto Game Run");
    println!();
    println!("USAGE:");
    println!("    auto-game-run [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --config=PATH       App config file (default: auto-game.toml when present)");
    println!("    --assets=PATH       Asset catalogue, overrides the config file");
    println!("    --frame=PNG         Replay a static screenshot as the capture source");
    println!("    --detect=PNG        Print the scene recognized on a screenshot and exit");
    println!("    --interval=MS       Scene poll interval in milliseconds");
    println!("    --defaults          Use option defaults instead of prompting");
    println!("    --debug             Enable debug output");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    auto-game-run --detect=screenshot.png");
    println!("    auto-game-run --frame=screenshot.png --defaults");
    println!("    auto-game-run --config=farm.toml --debug");
}
