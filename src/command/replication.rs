use crate::{
    client::Client,
    command::{Arity, Command, CommandKind, Keys},
    replication::Replica,
    snapshot,
    store::Store,
    CommandResult,
};

pub static SYNC: Command = Command {
    kind: CommandKind::Sync,
    name: "sync",
    arity: Arity::Exact(1),
    run: sync,
    keys: Keys::None,
    readonly: false,
    admin: true,
    write: false,
};

/// Send a full snapshot of the keyspace, then keep streaming every write command afterward.
fn sync(client: &mut Client, store: &mut Store) -> CommandResult {
    let bytes = snapshot::save(&store.dbs);
    client.reply(bytes);

    let replica = Replica::new(client.id, client.reply_sender.clone());
    store.replicas.insert_back(replica);

    Ok(None)
}
