//! # Post-Commit Notification
//!
//! The coordinator calls a [`Notifier`] only after a reservation is durably
//! committed. A failing notifier is logged and never undoes or fails the
//! booking; composing the message (email body, SMS text) is the
//! implementation's business.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::info;

use slotwise_core::Reservation;

const CHANNEL_CAPACITY: usize = 256;

/// Notification delivery failure.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Outbound notification seam.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> Result<(), NotifyError>;
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn reservation_confirmed(&self, _reservation: &Reservation) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Writes each confirmation to the log. Handy in development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> Result<(), NotifyError> {
        info!(
            reservation_id = %reservation.id,
            customer_id = %reservation.customer_id,
            date = %reservation.reserved_date,
            time = %reservation.reserved_time,
            "Reservation confirmed"
        );
        Ok(())
    }
}

/// Broadcasts confirmed reservations to in-process subscribers, e.g. a mail
/// worker or a live dashboard feed. Sending with nobody listening is a no-op.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: broadcast::Sender<Reservation>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        ChannelNotifier {
            sender: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Reservation> {
        self.sender.subscribe()
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> Result<(), NotifyError> {
        let _ = self.sender.send(reservation.clone());
        Ok(())
    }
}
