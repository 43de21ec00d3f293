use std::sync::mpsc::{Receiver, SyncSender, TrySendError};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};

/// Lifecycle notification pushed to a registered sink.
///
/// Best-effort, emission-order only: no retry, no acknowledgment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A deposit-class detection created a new active deposit.
    Detected {
        id: u64,
        location: Point,
        bbox: BoundingBox,
    },
    /// A pending (behaviorally inferred) deposit was confirmed visually.
    Confirmed { id: u64, location: Point },
    /// A deposit was inferred removed via a sustained person-proximity streak.
    Cleaned { id: u64, location: Point },
}

/// Receives lifecycle notifications.
///
/// `publish` is called synchronously inside the lifecycle update, so
/// implementations must not block; a failure is isolated per notification
/// (logged and discarded by the caller), never aborting the update.
pub trait NotificationSink: Send {
    fn publish(&mut self, notification: &Notification) -> Result<()>;
}

/// Sink that drops everything. Useful when no consumer is registered.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn publish(&mut self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

/// Bounded-queue handoff to an external consumer.
///
/// Uses `try_send` so a slow or stalled consumer can never back-pressure
/// frame processing; a full queue surfaces as a publish error and the
/// notification is dropped.
pub struct ChannelSink {
    tx: SyncSender<Notification>,
}

impl ChannelSink {
    pub fn bounded(capacity: usize) -> (Self, Receiver<Notification>) {
        let (tx, rx) = std::sync::mpsc::sync_channel(capacity);
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn publish(&mut self, notification: &Notification) -> Result<()> {
        match self.tx.try_send(notification.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(anyhow!("notification queue full")),
            Err(TrySendError::Disconnected(_)) => {
                Err(anyhow!("notification consumer disconnected"))
            }
        }
    }
}
