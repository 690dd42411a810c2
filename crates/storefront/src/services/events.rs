//! Cart change notifications.
//!
//! Every cart mutation publishes a [`CartEvent`]; the badge endpoints
//! subscribe and recompute counts on delivery. This replaces an ambient
//! storage-wide change signal with an explicit channel keyed by owner, so a
//! tab only refreshes when its own identity's cart changed.

use clothstore_core::Identity;
use tokio::sync::broadcast;

/// A cart-relevant mutation happened for `owner`.
#[derive(Debug, Clone)]
pub struct CartEvent {
    /// Storage key of the identity whose cart changed.
    pub owner_key: String,
}

/// Broadcast channel for cart mutations.
///
/// Cheap to clone; all clones share one channel. Publishing never blocks and
/// never fails — with no subscribers the event is simply dropped.
#[derive(Debug, Clone)]
pub struct CartEvents {
    tx: broadcast::Sender<CartEvent>,
}

impl CartEvents {
    /// Create a channel retaining up to `capacity` undelivered events per
    /// subscriber before lagging.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a cart-changed event for an identity.
    pub fn publish(&self, owner: &Identity) {
        let event = CartEvent {
            owner_key: owner.owner_key(),
        };
        // Err means no subscriber is listening right now; that's fine.
        if self.tx.send(event).is_err() {
            tracing::trace!(owner = %owner, "cart event dropped (no subscribers)");
        }
    }

    /// Subscribe to cart-changed events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.tx.subscribe()
    }
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clothstore_core::{GuestToken, Identity, UserId};

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let events = CartEvents::new(8);
        let mut rx = events.subscribe();

        let owner = Identity::Anonymous(GuestToken::generate());
        events.publish(&owner);

        let event = rx.recv().await.expect("event delivered");
        assert_eq!(event.owner_key, owner.owner_key());
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_mutation() {
        let events = CartEvents::new(8);
        let mut rx_a = events.subscribe();
        let mut rx_b = events.subscribe();

        let owner = Identity::Authenticated(UserId::generate());
        events.publish(&owner);
        events.publish(&owner);

        for rx in [&mut rx_a, &mut rx_b] {
            assert_eq!(
                rx.recv().await.expect("first").owner_key,
                owner.owner_key()
            );
            assert_eq!(
                rx.recv().await.expect("second").owner_key,
                owner.owner_key()
            );
        }
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let events = CartEvents::default();
        events.publish(&Identity::Anonymous(GuestToken::generate()));
    }
}
