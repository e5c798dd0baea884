// Input adapters - turn hotkeys into messages for the gateway
use crate::task::{CAN_RUN, CAN_RUN_AFTER_BATTLE};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

/// Hotkeys bound to pause gates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    /// Pause or resume after the current battle
    F9,
    /// Pause or resume immediately
    F10,
}

impl Hotkey {
    pub fn gate(&self) -> &'static str {
        match self {
            Hotkey::F9 => CAN_RUN_AFTER_BATTLE,
            Hotkey::F10 => CAN_RUN,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "f9" => Some(Hotkey::F9),
            "f10" => Some(Hotkey::F10),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMessage {
    ToggleGate(String),
    Exit,
}

impl From<Hotkey> for InputMessage {
    fn from(key: Hotkey) -> Self {
        InputMessage::ToggleGate(key.gate().to_string())
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input adapter is not started")]
    NotStarted,

    #[error("Input consumer has stopped")]
    Disconnected,
}

pub type InputResult<T> = Result<T, InputError>;

/// Helper function to create the input channel
pub fn create_input_channel() -> (mpsc::Sender<InputMessage>, mpsc::Receiver<InputMessage>) {
    mpsc::channel(32)
}

/// A source of input messages (keyboard hook, console, remote control)
#[async_trait]
pub trait InputAdapter: Send + Sync {
    async fn start(&self, sender: mpsc::Sender<InputMessage>) -> InputResult<()>;

    async fn close(&self);
}

/// Hotkeys typed as console commands
#[derive(Clone, Default)]
pub struct ConsoleHotkeys {
    sender: Arc<Mutex<Option<mpsc::Sender<InputMessage>>>>,
}

impl ConsoleHotkeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn press(&self, key: Hotkey) -> InputResult<()> {
        log::debug!("⌨️ {key:?} pressed");
        self.send(key.into()).await
    }

    pub async fn send(&self, message: InputMessage) -> InputResult<()> {
        let sender = self.sender.lock().await.clone().ok_or(InputError::NotStarted)?;
        sender
            .send(message)
            .await
            .map_err(|_| InputError::Disconnected)
    }

    pub async fn is_started(&self) -> bool {
        self.sender.lock().await.is_some()
    }
}

#[async_trait]
impl InputAdapter for ConsoleHotkeys {
    async fn start(&self, sender: mpsc::Sender<InputMessage>) -> InputResult<()> {
        *self.sender.lock().await = Some(sender);
        log::info!("⌨️ Hotkeys ready: f9 = pause after battle, f10 = pause now");
        Ok(())
    }

    async fn close(&self) {
        self.sender.lock().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotkey_gates() {
        assert_eq!(Hotkey::parse("F9"), Some(Hotkey::F9));
        assert_eq!(Hotkey::parse(" f10 "), Some(Hotkey::F10));
        assert_eq!(Hotkey::parse("f11"), None);
        assert_eq!(
            InputMessage::from(Hotkey::F9),
            InputMessage::ToggleGate(CAN_RUN_AFTER_BATTLE.to_string())
        );
        assert_eq!(Hotkey::F10.gate(), CAN_RUN);
    }

    #[tokio::test]
    async fn test_console_hotkeys_lifecycle() {
        let hotkeys = ConsoleHotkeys::new();
        assert!(matches!(
            hotkeys.press(Hotkey::F10).await,
            Err(InputError::NotStarted)
        ));

        let (tx, mut rx) = create_input_channel();
        hotkeys.start(tx).await.unwrap();
        hotkeys.press(Hotkey::F10).await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(InputMessage::ToggleGate(CAN_RUN.to_string()))
        );

        hotkeys.close().await;
        assert!(!hotkeys.is_started().await);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_send_after_consumer_dropped() {
        let hotkeys = ConsoleHotkeys::new();
        let (tx, rx) = create_input_channel();
        hotkeys.start(tx).await.unwrap();
        drop(rx);
        assert!(matches!(
            hotkeys.send(InputMessage::Exit).await,
            Err(InputError::Disconnected)
        ));
    }
}
