//! Pending-response table.
//!
//! Each response-expecting send registers a one-shot entry keyed by the
//! correlation id the service will echo back. The dispatcher settles the
//! entry with the decoded payload; teardown abandons every entry so the
//! waiting caller observes disconnection instead of hanging forever.

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use anonchat_core::error::{AnonchatError, Result};

/// Settle-once table keyed by correlation id.
#[derive(Default)]
pub struct PendingResponses {
    table: DashMap<u64, oneshot::Sender<Value>>,
}

impl PendingResponses {
    pub fn new() -> Self {
        Self {
            table: DashMap::new(),
        }
    }

    /// Create a new pending entry. Fails with `DuplicateCorrelation` when
    /// an entry already exists for this id; correct sequential usage never
    /// hits this, so it surfaces as a defect rather than being handled.
    pub fn register(&self, correlation_id: u64) -> Result<oneshot::Receiver<Value>> {
        match self.table.entry(correlation_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(AnonchatError::DuplicateCorrelation(correlation_id))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let (tx, rx) = oneshot::channel();
                slot.insert(tx);
                Ok(rx)
            }
        }
    }

    /// Settle the entry for `correlation_id` with `payload`. Returns false
    /// when no entry exists (unsolicited or late frame).
    pub fn resolve(&self, correlation_id: u64, payload: Value) -> bool {
        let Some((_, tx)) = self.table.remove(&correlation_id) else {
            return false;
        };
        if tx.send(payload).is_err() {
            // Caller abandoned its wait (own timeout/cancellation); the
            // entry is cleaned up here when the response finally lands.
            debug!(correlation_id, "resolved response had no waiter left");
        }
        true
    }

    /// Drop a single entry without resolving it (send failed after
    /// registration).
    pub fn discard(&self, correlation_id: u64) {
        self.table.remove(&correlation_id);
    }

    /// Drop every entry without resolving it. Waiters see the closed
    /// channel and surface disconnection.
    pub fn abandon(&self) {
        self.table.clear();
    }

    /// Number of unresolved entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_resolve_round_trip() {
        let pending = PendingResponses::new();
        let mut rx = pending.register(440).unwrap();
        assert!(pending.resolve(440, json!({"ok": true})));
        assert_eq!(rx.try_recv().unwrap(), json!({"ok": true}));
        assert!(pending.is_empty());
    }

    #[test]
    fn duplicate_registration_is_a_defect() {
        let pending = PendingResponses::new();
        let _rx = pending.register(440).unwrap();
        let err = pending.register(440).unwrap_err();
        assert!(matches!(err, AnonchatError::DuplicateCorrelation(440)));
    }

    #[test]
    fn unsolicited_id_resolves_nothing() {
        let pending = PendingResponses::new();
        let _rx = pending.register(440).unwrap();
        assert!(!pending.resolve(441, json!({})));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn abandon_closes_waiters() {
        let pending = PendingResponses::new();
        let mut rx = pending.register(440).unwrap();
        pending.abandon();
        assert!(rx.try_recv().is_err());
    }
}
