//! Gateway: wires input adapters, the scene poller and the task manager together

use crate::input::{InputAdapter, InputMessage, InputResult, create_input_channel};
use crate::scene::{DEFAULT_POLL_INTERVAL, ScenePoller};
use crate::task::{TaskManager, Worker};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

pub struct Gateway {
    manager: Arc<Mutex<TaskManager>>,
    input: Arc<dyn InputAdapter>,
    poller: Option<Worker>,
    consumer: Option<Worker>,
    shutdown: CancellationToken,
    poll_interval: Duration,
}

impl Gateway {
    pub fn new(manager: TaskManager, input: Arc<dyn InputAdapter>) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
            input,
            poller: None,
            consumer: None,
            shutdown: CancellationToken::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn manager(&self) -> Arc<Mutex<TaskManager>> {
        self.manager.clone()
    }

    /// Cancelled when an input adapter asks to exit or the gateway is closed
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_running(&self) -> bool {
        self.poller.as_ref().is_some_and(Worker::is_alive)
    }

    pub async fn start(&mut self) -> InputResult<()> {
        if self.is_running() {
            log::warn!("⚠️ Gateway already started");
            return Ok(());
        }
        let env = self.manager.lock().await.environment().clone();
        self.poller = Some(
            ScenePoller::new(env.scenes, env.capture, env.tracker)
                .with_interval(self.poll_interval)
                .start(),
        );

        let (tx, rx) = create_input_channel();
        if let Err(e) = self.input.start(tx).await {
            if let Some(poller) = self.poller.take() {
                poller.terminate();
            }
            return Err(e);
        }
        let manager = self.manager.clone();
        let shutdown = self.shutdown.clone();
        self.consumer = Some(Worker::spawn("InputConsumer", move |cancel| {
            consume(rx, manager, shutdown, cancel)
        }));
        log::info!("🚪 Gateway started");
        Ok(())
    }

    /// Stop input, the poller, the consumer and every task.
    pub async fn close(&mut self) {
        self.input.close().await;
        if let Some(consumer) = self.consumer.take() {
            consumer.terminate();
        }
        if let Some(poller) = self.poller.take() {
            poller.terminate();
        }
        self.manager.lock().await.close();
        self.shutdown.cancel();
        log::info!("🚪 Gateway closed");
    }
}

async fn consume(
    mut rx: mpsc::Receiver<InputMessage>,
    manager: Arc<Mutex<TaskManager>>,
    shutdown: CancellationToken,
    cancel: CancellationToken,
) {
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => break,
            message = rx.recv() => match message {
                Some(message) => message,
                None => break,
            },
        };
        match message {
            InputMessage::ToggleGate(gate) => {
                let toggled = manager.lock().await.toggle_gate(&gate);
                if toggled > 0 {
                    log::info!("⏯️ Gate {gate} toggled on {toggled} task(s)");
                }
            }
            InputMessage::Exit => {
                log::info!("👋 Exit requested");
                shutdown.cancel();
                break;
            }
        }
    }
    log::debug!("📭 Input consumer stopped");
}
