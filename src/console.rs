//! Interactive console

use crate::input::{ConsoleHotkeys, Hotkey};
use crate::scene::SceneTracker;
use crate::task::{DefaultsSource, PromptSource, TaskManager};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Unknown command '{command}', type 'help'")]
    UnknownCommand { command: String },

    #[error("'{command}' needs a task number or name")]
    MissingArgument { command: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Tasks,
    Start(String),
    Stop(String),
    Scene,
    Hotkey(Hotkey),
    Help,
    Exit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ConsoleError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Command::Empty);
        };
        let argument = words.collect::<Vec<_>>().join(" ");
        let needs_argument = |name: &'static str| {
            if argument.is_empty() {
                Err(ConsoleError::MissingArgument { command: name })
            } else {
                Ok(argument.clone())
            }
        };
        match command.to_ascii_lowercase().as_str() {
            "ls" => Ok(Command::List),
            "tasks" => Ok(Command::Tasks),
            "start" => needs_argument("start").map(Command::Start),
            "stop" => needs_argument("stop").map(Command::Stop),
            "scene" => Ok(Command::Scene),
            "help" | "?" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            other => Hotkey::parse(other)
                .map(Command::Hotkey)
                .ok_or_else(|| ConsoleError::UnknownCommand {
                    command: other.to_string(),
                }),
        }
    }
}

pub struct Console {
    manager: Arc<Mutex<TaskManager>>,
    tracker: Arc<SceneTracker>,
    hotkeys: ConsoleHotkeys,
    shutdown: CancellationToken,
    interactive: bool,
}

impl Console {
    pub fn new(
        manager: Arc<Mutex<TaskManager>>,
        tracker: Arc<SceneTracker>,
        hotkeys: ConsoleHotkeys,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            manager,
            tracker,
            hotkeys,
            shutdown,
            interactive: true,
        }
    }

    /// Prompt for task options on start; otherwise defaults and config file values are used.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Read commands until `exit`, end of input or shutdown.
    pub async fn run<R>(&self, lines: &mut Lines<R>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        print_help();
        loop {
            let line = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                log::info!("📭 Console input closed");
                break;
            };
            match Command::parse(&line) {
                Ok(Command::Exit) => break,
                Ok(command) => self.execute(command, lines).await,
                Err(e) => println!("❌ {e}"),
            }
        }
        Ok(())
    }

    pub async fn execute<R>(&self, command: Command, lines: &mut Lines<R>)
    where
        R: AsyncBufRead + Unpin + Send,
    {
        match command {
            Command::List => {
                self.manager.lock().await.list_task();
            }
            Command::Tasks => {
                let manager = self.manager.lock().await;
                for (i, definition) in manager.available_tasks().iter().enumerate() {
                    println!("  {}. {} - {}", i + 1, definition.name, definition.description);
                }
            }
            Command::Start(target) => {
                // the manager stays unlocked while options are prompted for
                let prepared = {
                    let manager = self.manager.lock().await;
                    manager.resolve(&target).and_then(|name| {
                        let config = (!manager.is_alive(name))
                            .then(|| manager.task_config(name))
                            .transpose()?;
                        Ok((name, config))
                    })
                };
                let (name, mut config) = match prepared {
                    Ok((name, Some(config))) => (name, config),
                    Ok((name, None)) => {
                        println!("⚠️ {name} is already running");
                        return;
                    }
                    Err(e) => {
                        println!("❌ {e}");
                        return;
                    }
                };
                let filled = if self.interactive {
                    config.fill_missing(&mut PromptSource::new(lines)).await
                } else {
                    config.fill_missing(&mut DefaultsSource).await
                };
                if let Err(e) = filled {
                    println!("❌ Failed to start {name}: {e}");
                    return;
                }
                match self.manager.lock().await.launch(name, &config) {
                    Ok(true) => println!("▶️ {name} started"),
                    Ok(false) => println!("⚠️ {name} is already running"),
                    Err(e) => println!("❌ Failed to start {name}: {e}"),
                }
            }
            Command::Stop(target) => {
                let mut manager = self.manager.lock().await;
                match manager.resolve(&target) {
                    Ok(name) if manager.stop_task(name) => println!("⏹️ {name} stopped"),
                    Ok(name) => println!("⚠️ {name} is not running"),
                    Err(e) => println!("❌ {e}"),
                }
            }
            Command::Scene => {
                let pair = self.tracker.pair();
                println!(
                    "🗺️ current: {}, previous: {}",
                    pair.current.name(),
                    pair.previous.name()
                );
            }
            Command::Hotkey(key) => {
                if let Err(e) = self.hotkeys.press(key).await {
                    println!("❌ {e}");
                }
            }
            Command::Help => print_help(),
            Command::Exit | Command::Empty => {}
        }
    }
}

fn print_help() {
    println!("COMMANDS:");
    println!("    ls                  List started tasks and their gates");
    println!("    tasks               List available tasks");
    println!("    start <n|name>      Start a task");
    println!("    stop <n|name>       Stop a task");
    println!("    scene               Show the current and previous scene");
    println!("    f9                  Pause/resume after the current battle");
    println!("    f10                 Pause/resume now");
    println!("    help                Show this help");
    println!("    exit                Stop every task and quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureContext, FrameContext};
    use crate::input::{InputAdapter, InputMessage, create_input_channel};
    use crate::scene::SceneGraph;
    use crate::task::{
        CAN_RUN, ConfigOption, Task, TaskContext, TaskDefinition, TaskEnvironment, TaskRegistry,
        TaskResult,
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  ls "), Ok(Command::List));
        assert_eq!(Command::parse("start 1"), Ok(Command::Start("1".to_string())));
        assert_eq!(
            Command::parse("STOP FarmChapter"),
            Ok(Command::Stop("FarmChapter".to_string()))
        );
        assert_eq!(Command::parse("F9"), Ok(Command::Hotkey(Hotkey::F9)));
        assert_eq!(Command::parse(""), Ok(Command::Empty));
        assert_eq!(
            Command::parse("start"),
            Err(ConsoleError::MissingArgument { command: "start" })
        );
        assert!(matches!(
            Command::parse("jump"),
            Err(ConsoleError::UnknownCommand { .. })
        ));
    }

    struct Idle;

    #[async_trait]
    impl Task for Idle {
        fn name(&self) -> &str {
            "Idle"
        }

        async fn execute(&mut self, cx: &TaskContext) -> TaskResult<()> {
            cx.wait(&[CAN_RUN]).await?;
            cx.sleep(Duration::from_millis(5)).await
        }
    }

    fn console() -> (Console, Arc<Mutex<TaskManager>>, ConsoleHotkeys) {
        let scenes = Arc::new(SceneGraph::builder().build().unwrap());
        let capture: Arc<dyn CaptureContext> =
            Arc::new(FrameContext::solid(2, 2, image::Rgb([0, 0, 0])));
        let tracker = Arc::new(SceneTracker::new(scenes.unknown()));
        let mut registry = TaskRegistry::new();
        registry
            .register(
                TaskDefinition::new("Idle", "Wait on the gate", |config| {
                    config.get_str("label")?;
                    Ok(Box::new(Idle) as Box<dyn Task>)
                })
                .options(vec![ConfigOption::text("label", "idle", "Label")]),
            )
            .unwrap();
        let env = TaskEnvironment::new(capture, scenes, tracker.clone());
        let manager = Arc::new(Mutex::new(TaskManager::new(env, registry)));
        let hotkeys = ConsoleHotkeys::new();
        let console = Console::new(
            manager.clone(),
            tracker,
            hotkeys.clone(),
            CancellationToken::new(),
        );
        (console, manager, hotkeys)
    }

    #[tokio::test]
    async fn test_start_prompts_and_stop_by_index() {
        let (console, manager, _) = console();
        let input: &[u8] = b"start 1\nfast\nls\nstop 1\nexit\nstart 1\n";
        let mut lines = BufReader::new(input).lines();

        console.run(&mut lines).await.unwrap();
        assert!(manager.lock().await.alive_task().is_empty());
        // input after exit is left unread
        assert_eq!(lines.next_line().await.unwrap(), Some("start 1".to_string()));
    }

    #[tokio::test]
    async fn test_manager_unlocked_while_prompting() {
        let (console, manager, _) = console();
        let (mut writer, reader) = tokio::io::duplex(64);
        let session = tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            console.run(&mut lines).await
        });

        writer.write_all(b"start 1\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let locked = tokio::time::timeout(Duration::from_millis(200), manager.lock()).await;
        assert!(locked.is_ok(), "The prompt must not hold the manager lock");
        drop(locked);

        writer.write_all(b"fast\nexit\n").await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), session)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(manager.lock().await.alive_task(), vec!["Idle"]);
        manager.lock().await.close();
    }

    #[tokio::test]
    async fn test_start_without_prompts_keeps_running() {
        let (console, manager, _) = console();
        let console = console.interactive(false);
        let input: &[u8] = b"start Idle\nstart idle\n";
        let mut lines = BufReader::new(input).lines();

        console.run(&mut lines).await.unwrap();
        assert_eq!(manager.lock().await.alive_task(), vec!["Idle"]);
        manager.lock().await.close();
    }

    #[tokio::test]
    async fn test_hotkey_command_reaches_adapter() {
        let (console, _, hotkeys) = console();
        let (tx, mut rx) = create_input_channel();
        hotkeys.start(tx).await.unwrap();
        let input: &[u8] = b"f9\n";
        let mut lines = BufReader::new(input).lines();

        console.run(&mut lines).await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(InputMessage::ToggleGate(crate::task::CAN_RUN_AFTER_BATTLE.to_string()))
        );
    }
}
