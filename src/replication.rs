use crate::{client::ClientId, ReplyMessage};
use bytes::Bytes;
use hashbrown::Equivalent;
use std::hash::{Hash, Hasher};
use tokio::sync::mpsc;

/// A connected follower, fed a snapshot on attach and a stream of write commands afterward.
#[derive(Clone, Debug)]
pub struct Replica {
    id: ClientId,
    sender: mpsc::UnboundedSender<ReplyMessage>,
}

impl Eq for Replica {}

impl PartialEq for Replica {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq(&other.id)
    }
}

impl Hash for Replica {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Equivalent<Replica> for ClientId {
    fn equivalent(&self, key: &Replica) -> bool {
        *self == key.id
    }
}

impl Replica {
    pub fn new(id: ClientId, sender: mpsc::UnboundedSender<ReplyMessage>) -> Self {
        Self { id, sender }
    }

    /// Send a command's argument vector to this replica.
    pub fn propagate(&self, arguments: Vec<Bytes>) {
        _ = self.sender.send(ReplyMessage::Command(arguments));
    }
}
