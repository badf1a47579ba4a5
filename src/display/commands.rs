//! Command mailbox between producers and the display task.
//!
//! The display task is the sole owner of the engine and the shift-register
//! chain; everyone else talks to it through a bounded channel. Sends never
//! block: a full mailbox drops the command and reports it, and the producer
//! simply tries again on its next tick. Display state is cheap to
//! reconstruct, so dropped control commands are an acceptable trade for
//! never stalling a sensor or network task on the display.

use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use crate::display::brightness::DisplayPreferences;
use crate::display::engine::DisplayMode;
use crate::error::DisplayError;

/// Control commands accepted by the display task. Data to *show* is not
/// here: the task pulls readings from the shared status itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayCommand {
    /// Jump to a mode, restarting its dwell.
    SetMode(DisplayMode),
    /// Override brightness (percent, 1–100) until the next policy update.
    SetBrightness(u8),
    /// Apply new preferences and re-evaluate the brightness policy.
    ApplyPreferences(DisplayPreferences),
    /// Blank all digits.
    Clear,
    /// Run the boot-time lamp test sequence.
    LampTest,
}

/// Producer handle, cloneable across tasks.
#[derive(Clone)]
pub struct DisplayMailbox {
    tx: SyncSender<DisplayCommand>,
}

impl DisplayMailbox {
    /// Create the mailbox and the consumer end for the display task.
    pub fn bounded(capacity: usize) -> (Self, Receiver<DisplayCommand>) {
        let (tx, rx) = sync_channel(capacity);
        (Self { tx }, rx)
    }

    /// Non-blocking send. A full (or closed) mailbox drops the command.
    pub fn send(&self, command: DisplayCommand) -> Result<(), DisplayError> {
        self.tx.try_send(command).map_err(|e| {
            match e {
                TrySendError::Full(_) | TrySendError::Disconnected(_) => DisplayError::MailboxFull,
            }
        })
    }
}
