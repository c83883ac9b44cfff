use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::codec::CookieRecord;

pub(crate) const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A cookie that disappeared in a write. The wire primitive cannot
/// report the old value, so only the name survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedCookie {
    pub name: String,
}

/// One change notification: the single-name diff around a wire write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CookieChangeEvent {
    pub changed: Vec<CookieRecord>,
    pub deleted: Vec<DeletedCookie>,
}

/// A handle for receiving cookie change notifications.
pub type ChangeSubscription = broadcast::Receiver<CookieChangeEvent>;

#[derive(Debug)]
pub(crate) struct ChangeBus {
    tx: broadcast::Sender<CookieChangeEvent>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl ChangeBus {
    pub(crate) fn subscribe(&self) -> ChangeSubscription {
        self.tx.subscribe()
    }

    pub(crate) fn has_subscribers(&self) -> bool {
        self.tx.receiver_count() > 0
    }

    pub(crate) fn publish(&self, ev: CookieChangeEvent) {
        // broadcast::Sender::send() fails only when there are 0 receivers.
        // That's fine: if nobody listens, we can ignore the error.
        let _ = self.tx.send(ev);
    }
}
