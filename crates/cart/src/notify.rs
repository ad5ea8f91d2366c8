//! User-visible notifications.
//!
//! The cart reports every failed operation here instead of returning an
//! error. Sinks are fire-and-forget: nothing they do flows back into the cart.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::error::{CartError, ErrorKind};

/// An error notification for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Message to display.
    pub message: &'static str,
}

impl From<&CartError> for Notification {
    fn from(err: &CartError) -> Self {
        let kind = err.kind();
        Self {
            kind,
            message: kind.user_message(),
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Must not block.
    fn notify(&self, notification: Notification);
}

/// Logs notifications at `info` level.
///
/// The failure itself is already logged by the cart; this only records what
/// the shopper was told.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            kind = ?notification.kind,
            user_message = notification.message,
            "Cart notification"
        );
    }
}

/// Forwards notifications over an unbounded channel, e.g. to a toast queue.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rocketshoes_core::ProductId;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;

    #[test]
    fn test_notification_from_error() {
        let err = CartError::ProductNotFound(ProductId::new(1));
        let notification = Notification::from(&err);
        assert_eq!(notification.kind, ErrorKind::ProductNotFound);
        assert_eq!(notification.message, "Error removing product");
    }

    #[test]
    fn test_channel_notifier_delivers() {
        let (notifier, mut receiver) = ChannelNotifier::channel();
        notifier.notify(Notification::from(&CartError::OutOfStock(ProductId::new(2))));

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.kind, ErrorKind::OutOfStock);
        assert!(receiver.try_recv().is_err());
    }

    #[derive(Clone, Default)]
    struct LevelRecorder(Arc<Mutex<Vec<Level>>>);

    impl<S: Subscriber> Layer<S> for LevelRecorder {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn test_tracing_notifier_logs_at_info() {
        let recorder = LevelRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            TracingNotifier.notify(Notification::from(&CartError::OutOfStock(ProductId::new(3))));
        });

        assert_eq!(*recorder.0.lock().unwrap(), vec![Level::INFO]);
    }

    #[test]
    fn test_channel_notifier_ignores_dropped_receiver() {
        let (notifier, receiver) = ChannelNotifier::channel();
        drop(receiver);
        notifier.notify(Notification::from(&CartError::OutOfStock(ProductId::new(2))));
    }
}
