//! Cross-context broadcast bridge.
//!
//! A one-way, fire-and-forget notification channel toward external agents
//! (e.g. the companion browser extension): reward-mode transitions and
//! "assign next item to slot N" instructions. No acknowledgement exists;
//! a publish with zero receivers is a non-event, not an error.

use serde_json::json;
use tokio::sync::broadcast;

/// Buffered message capacity; slow receivers that lag past this lose the
/// oldest messages (acceptable for advisory notifications).
pub const BRIDGE_CAPACITY: usize = 64;

/// Messages crossing the bridge. Wire shape is `{"type": ..., ...payload}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage {
    RewardModeActivated {
        expires_at_ms: i64,
        duration_minutes: u32,
    },
    RewardModeDeactivated,
    /// Instructs the companion to assign the next queued item to a slot.
    AssignNextItem { slot: u8 },
}

impl BridgeMessage {
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::RewardModeActivated { .. } => "reward_mode_activated",
            Self::RewardModeDeactivated => "reward_mode_deactivated",
            Self::AssignNextItem { .. } => "assign_next_item",
        }
    }

    /// Flat `{type, ...payload}` JSON for the wire.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::RewardModeActivated { expires_at_ms, duration_minutes } => json!({
                "type": self.message_type(),
                "expires_at_ms": expires_at_ms,
                "duration_minutes": duration_minutes,
            }),
            Self::RewardModeDeactivated => json!({ "type": self.message_type() }),
            Self::AssignNextItem { slot } => json!({
                "type": self.message_type(),
                "slot": slot,
            }),
        }
    }
}

/// Broadcast sender handle. Clone freely; all clones feed the same channel.
#[derive(Clone)]
pub struct PulseBridge {
    tx: broadcast::Sender<String>,
}

impl PulseBridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BRIDGE_CAPACITY);
        Self { tx }
    }

    /// New receiver for an external listener (extension bridge, UI, tests).
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Fire-and-forget publish. A send error only means nobody is listening.
    pub fn publish(&self, message: &BridgeMessage) {
        let payload = message.to_json().to_string();
        match self.tx.send(payload) {
            Ok(receivers) => tracing::debug!(
                target: "pulse::bridge",
                message_type = message.message_type(),
                receivers = receivers,
                "bridge message published"
            ),
            Err(_) => tracing::debug!(
                target: "pulse::bridge",
                message_type = message.message_type(),
                "bridge message dropped (no receivers)"
            ),
        }
    }
}

impl Default for PulseBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_is_flat_with_type() {
        let msg = BridgeMessage::RewardModeActivated {
            expires_at_ms: 1_700_000_000_000,
            duration_minutes: 30,
        };
        let v = msg.to_json();
        assert_eq!(v["type"], "reward_mode_activated");
        assert_eq!(v["duration_minutes"], 30);

        let v = BridgeMessage::AssignNextItem { slot: 3 }.to_json();
        assert_eq!(v["type"], "assign_next_item");
        assert_eq!(v["slot"], 3);
    }

    #[tokio::test]
    async fn publish_without_receivers_is_a_noop() {
        let bridge = PulseBridge::new();
        bridge.publish(&BridgeMessage::RewardModeDeactivated);
    }

    #[tokio::test]
    async fn subscriber_receives_published_messages() {
        let bridge = PulseBridge::new();
        let mut rx = bridge.subscribe();
        bridge.publish(&BridgeMessage::AssignNextItem { slot: 1 });
        let raw = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["type"], "assign_next_item");
        assert_eq!(v["slot"], 1);
    }
}
