mod buffer;
mod bytes;
mod client;
mod command;
mod config;
mod db;
mod drop;
mod glob;
mod linked_hash_set;
mod replication;
mod reply;
mod request;
mod reversible;
mod server;
mod skiplist;
mod slice;
mod snapshot;
mod spawn;
mod store;
mod time;

// Public interface
pub use client::Addr;
pub use server::Server;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use client::{Client, ClientId, ReplyMessage};
use command::{BlockResult, Command, CommandResult};
use db::DBIndex;
use reply::{BulkReply, Reply, ReplyError};
use reversible::Reversible;
use spawn::{spawn, spawn_with_handle, TaskHandle};

#[cfg(not(feature = "tokio-runtime"))]
pub use spawn::run_until_stalled;
use store::{Store, StoreMessage};
use time::epoch;
