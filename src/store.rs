mod blocking;
mod monitor;
mod watching;

use crate::{
    client::{Client, ClientId, ClientInfo},
    db::{DBIndex, Value, DB},
    drop::{self, DropMessage},
    linked_hash_set::LinkedHashSet,
    replication::Replica,
    reply::{Reply, ReplyError},
    request::Request,
    BlockResult,
};
use blocking::Blocking;
use bytes::Bytes;
use hashbrown::{hash_map::Entry, HashMap};
pub use monitor::Monitor;
use respite::RespConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use triomphe::Arc;
use watching::Watching;

/// The number of logical databases when none is configured.
pub const DEFAULT_DATABASES: usize = 1;

/// Large values can be dropped on a separate thread to prevent long pauses.
const MAX_DROP_EFFORT: usize = 64;

/// The size thresholds that gate `set-max-intset-entries`-family `CONFIG` keys. Kept purely as
/// settable state: this store has a single representation per value kind, so nothing reads these
/// back to change encoding the way a dual-representation store would.
#[derive(Clone, Debug)]
pub struct SetConfig {
    pub max_intset_entries: usize,
    pub max_listpack_entries: usize,
    pub max_listpack_value: usize,
}

impl Default for SetConfig {
    fn default() -> Self {
        SetConfig {
            max_intset_entries: 512,
            max_listpack_entries: 128,
            max_listpack_value: 64,
        }
    }
}

/// A message to the store.
pub enum StoreMessage {
    /// A client is ready to execute some commands.
    Ready(Box<Client>),

    /// A client has connected.
    Connect(ClientInfo),

    /// A client has disconnected.
    Disconnect(ClientId),

    /// A blocking client has timed out.
    Timeout(ClientId, Arc<AtomicBool>),
}

/// The store holds all the data for the server. It is the representation of the single threaded
/// nature of command execution: the sequence of actions carried out against the keyspace is
/// happening wherever the store is.
pub struct Store {
    /// Info about all connected clients, keyed by client id.
    pub clients: HashMap<ClientId, ClientInfo>,

    /// All of the databases.
    pub dbs: Vec<DB>,

    /// A channel for dropping values on a separate thread.
    pub drop: mpsc::UnboundedSender<DropMessage>,

    /// The blocking actions for this store.
    pub blocking: Blocking,

    /// A set of monitors to send commands to.
    pub monitors: LinkedHashSet<Monitor>,

    /// The watching actions for this store.
    pub watching: Watching,

    /// Connected replicas, in the order they attached.
    pub replicas: LinkedHashSet<Replica>,

    /// The shared password required by AUTH, if configured.
    pub requirepass: Option<Bytes>,

    /// The database index most recently propagated to replicas, used to emit a `SELECT` preamble
    /// whenever a write targets a different database.
    replication_db: Option<usize>,

    /// Is this instance a replica of another server? While true, writes from normal clients are
    /// refused; only the replication stream may mutate the keyspace.
    pub read_only_replica: bool,

    /// The number of changes since the last save.
    pub dirty: usize,

    /// Total commands executed since CONFIG RESETSTAT.
    pub numcommands: usize,

    /// Total connections accepted since CONFIG RESETSTAT.
    pub numconnections: usize,

    /// Resp reader config.
    pub reader_config: RespConfig,

    /// `hash-max-listpack-entries`. Settable via `CONFIG SET` but has no effect on encoding here.
    pub hash_max_listpack_entries: usize,

    /// `hash-max-listpack-value`.
    pub hash_max_listpack_value: usize,

    /// `zset-max-listpack-entries`.
    pub zset_max_listpack_entries: usize,

    /// `zset-max-listpack-value`.
    pub zset_max_listpack_value: usize,

    /// The `set-max-*` family of thresholds.
    pub set_config: SetConfig,

    /// `lazyfree-lazy-expire`.
    pub lazy_expire: bool,

    /// `lazyfree-lazy-user-del`.
    pub lazy_user_del: bool,

    /// `lazyfree-lazy-user-flush`.
    pub lazy_user_flush: bool,

    /// `list-max-listpack-size`. Negative values mean a byte-size threshold in real Redis; kept
    /// as a plain integer since nothing here acts on it.
    pub list_max_listpack_size: i64,

    /// `dir`, the directory `SAVE` writes its snapshot file into.
    pub dir: std::path::PathBuf,

    /// `dbfilename`, the name of the snapshot file within `dir`.
    pub dbfilename: String,
}

impl Store {
    /// Spawn a store and return its config.
    pub fn spawn(
        mut store_receiver: mpsc::UnboundedReceiver<StoreMessage>,
        databases: usize,
        requirepass: Option<Bytes>,
    ) -> RespConfig {
        let config = RespConfig::default();

        let mut store = Store {
            clients: HashMap::new(),
            dbs: vec![DB::default(); databases.max(1)],
            drop: drop::spawn(),
            blocking: Blocking::new(databases.max(1)),
            monitors: LinkedHashSet::new(),
            watching: Watching::new(databases.max(1)),
            replicas: LinkedHashSet::new(),
            requirepass,
            replication_db: None,
            read_only_replica: false,
            dirty: 0,
            numcommands: 0,
            numconnections: 0,
            reader_config: config.clone(),
            hash_max_listpack_entries: 128,
            hash_max_listpack_value: 64,
            zset_max_listpack_entries: 128,
            zset_max_listpack_value: 64,
            set_config: SetConfig::default(),
            lazy_expire: false,
            lazy_user_del: false,
            lazy_user_flush: false,
            list_max_listpack_size: 128,
            dir: std::path::PathBuf::from("."),
            dbfilename: "dump.rdb".to_string(),
        };

        crate::spawn(async move {
            while let Some(message) = store_receiver.recv().await {
                store.message(message);
            }
        });

        config
    }

    /// Get a reference to the database at a particular index.
    pub fn get_db(&self, index: DBIndex) -> Result<&DB, Reply> {
        self.dbs
            .get(index.0)
            .ok_or_else(|| ReplyError::DBIndex.into())
    }

    /// Get a mutable reference to the database at a particular index.
    pub fn mut_db(&mut self, index: DBIndex) -> Result<&mut DB, Reply> {
        self.dbs
            .get_mut(index.0)
            .ok_or_else(|| ReplyError::DBIndex.into())
    }

    /// Check to see if a particular client is dirty.
    pub fn is_dirty(&self, id: ClientId) -> bool {
        self.watching.dirty.contains(&id)
    }

    /// Remove all previously watched keys for a transaction.
    pub fn unwatch(&mut self, id: ClientId) {
        self.watching.remove(id);
        self.watching.dirty.remove(&id);
    }

    /// Mark a key as ready to fulfill blocking requests.
    pub fn mark_ready(&mut self, db: DBIndex, key: &[u8]) {
        self.blocking.mark_ready(db, key);
    }

    /// Mark all clients watching a key as dirty.
    pub fn touch(&mut self, db: DBIndex, key: &[u8]) {
        self.watching.touch(db, key);
    }

    /// Send a write command along to every connected replica, prefixed with a `SELECT` whenever
    /// the target database differs from the last command propagated.
    pub fn propagate(&mut self, db: DBIndex, request: &Request) {
        self.dirty += 1;

        if self.replicas.is_empty() {
            return;
        }

        if self.replication_db != Some(db.0) {
            self.replication_db = Some(db.0);
            let select = vec![Bytes::from_static(b"SELECT"), Bytes::from(db.0.to_string())];
            for replica in self.replicas.iter() {
                replica.propagate(select.clone());
            }
        }

        let arguments = request.arguments();
        for replica in self.replicas.iter() {
            replica.propagate(arguments.clone());
        }
    }

    // Handle a message from a client.
    pub fn message(&mut self, message: StoreMessage) {
        use StoreMessage::*;
        match message {
            Connect(info) => self.connect(info),
            Disconnect(id) => self.disconnect(id),
            Ready(client) => client.ready(self),
            Timeout(id, canceled) => {
                if !canceled.load(Ordering::Relaxed) {
                    self.blocking.unblock_with(id, Reply::Nil);
                }
            }
        }
    }

    /// A client has connected, so store some shared info about it.
    fn connect(&mut self, info: ClientInfo) {
        let id = info.id;
        self.numconnections += 1;
        self.clients.insert(id, info);
    }

    /// A client has disconnected, so remove all the tracking data for it.
    fn disconnect(&mut self, id: ClientId) {
        self.blocking.remove(id);
        self.monitors.remove(&id);
        self.replicas.remove(&id);
        self.unwatch(id);
        self.clients.remove(&id);
    }

    /// Block this client until the specified keys are ready.
    pub fn block(&mut self, mut client: Client, block: BlockResult) {
        client.block(block.timeout);
        self.blocking.add(client, block.keys);
    }

    /// Iterate over ready keys and serve blocking clients with as many results as possible.
    pub fn unblock_ready(&mut self) {
        // We loop as long as there are more empty keys, which can happen during the process of
        // serving blocked clients (e.g. BLMOVE with clients blocking on the destination).
        while let Some(ready) = self.blocking.ready() {
            // In order to run a command with an exclusive reference to both the client and the store,
            // we need to remove blocking clients from the store.
            let mut clients = self.blocking.take_clients();
            for (index, keys) in ready.iter() {
                for key in keys.iter() {
                    self.unblock_key(&mut clients, *index, key);
                }
            }
            self.blocking.restore_clients(clients);
        }
    }

    /// Serve blocked clients for a particular key with as many results as possible.
    pub fn unblock_key(&mut self, clients: &mut HashMap<ClientId, Client>, index: DBIndex, key: &[u8]) {
        while let Some(id) = self.blocking.front(index, key) {
            let Entry::Occupied(mut entry) = clients.entry(id) else {
                panic!("missing client");
            };

            let client = entry.get_mut();

            // Reset the request before running.
            client.request.reset(1);

            // If the client is still blocking then we're done.
            if client.run(self).is_some() {
                break;
            }

            // Remove the client and return it to the normal queue.
            self.blocking.remove(client.id);
            let mut client = entry.remove();
            client.unblock();
            client.ready(self);
        }
    }

    /// Drop a value, maybe asynchronously.
    pub fn drop_value(&mut self, value: Value, lazy: bool) {
        if lazy && value.drop_effort() > MAX_DROP_EFFORT {
            _ = self.drop.send(value.into());
        } else {
            drop(value);
        }
    }

    /// Set a client name.
    pub fn set_name(&mut self, client: &mut Client, name: Option<Bytes>) {
        let info = self.clients.get_mut(&client.id).unwrap();
        client.name = name.clone();
        info.name = name;
    }
}
