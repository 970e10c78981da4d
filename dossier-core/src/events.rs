//! Change notifications published by the store, and changes pushed in from a
//! remote backend.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::models::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Removed,
}

/// Published to every subscriber after the store state changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A single record changed
    Record {
        collection: Collection,
        id: String,
        kind: ChangeKind,
    },
    /// A whole collection was replaced (investigator roster)
    CollectionReplaced(Collection),
    /// Everything was replaced (backup import)
    Reloaded,
    /// The active investigator changed (login/logout)
    SessionChanged(Option<String>),
}

/// A change notified by a remote store; applied as whole-record replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum RemoteChange {
    Upsert {
        collection: String,
        record: serde_json::Value,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl RemoteChange {
    /// Collection name as sent by the remote side
    pub fn collection(&self) -> &str {
        match self {
            RemoteChange::Upsert { collection, .. } | RemoteChange::Delete { collection, .. } => {
                collection
            }
        }
    }
}

/// Fan-out of store events over mpsc channels
#[derive(Debug, Default)]
pub struct Subscribers {
    senders: Vec<Sender<StoreEvent>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    /// Sends `event` to every live subscriber; receivers that were dropped
    /// are forgotten.
    pub fn publish(&mut self, event: StoreEvent) {
        let before = self.senders.len();
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
        let pruned = before - self.senders.len();
        if pruned > 0 {
            log::debug!("Pruned {} closed subscriber(s)", pruned);
        }
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
