use crate::{
    bytes::lex,
    client::Client,
    command::{Arity, Command, CommandKind, Keys},
    epoch,
    reply::{Reply, ReplyError},
    snapshot,
    store::Store,
    CommandResult,
};
use bytes::Bytes;
use logos::Logos;

pub static DUMP: Command = Command {
    kind: CommandKind::Dump,
    name: "dump",
    arity: Arity::Exact(2),
    run: dump,
    keys: Keys::Single,
    readonly: true,
    admin: false,
    write: false,
};

fn dump(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let db = store.get_db(client.db())?;
    match db.get(&key) {
        Some(value) => client.reply(snapshot::dump(value)),
        None => client.reply(Reply::Nil),
    }
    Ok(None)
}

pub static RESTORE: Command = Command {
    kind: CommandKind::Restore,
    name: "restore",
    arity: Arity::Minimum(4),
    run: restore,
    keys: Keys::Single,
    readonly: false,
    admin: false,
    write: true,
};

#[derive(Clone, Copy, Debug, Eq, Hash, Logos, PartialEq)]
pub enum RestoreOption {
    #[regex(b"(?i:replace)")]
    Replace,

    #[regex(b"(?i:absttl)")]
    Absttl,

    #[regex(b"(?i:idletime)")]
    Idletime,

    #[regex(b"(?i:freq)")]
    Freq,
}

fn restore(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let ttl = client.request.u128()?;
    let payload = client.request.pop()?;

    let mut replace = false;
    let mut absttl = false;

    while !client.request.is_empty() {
        let Some(option) = lex(&client.request.pop()?[..]) else {
            return Err(ReplyError::Syntax.into());
        };

        use RestoreOption::*;
        match option {
            Replace => replace = true,
            Absttl => absttl = true,
            // Idle time and access frequency only matter to eviction policy, which this store
            // doesn't implement.
            Idletime | Freq => {
                client.request.i64()?;
            }
        }
    }

    let value = snapshot::restore(&payload)?;

    let db = store.mut_db(client.db())?;
    if !replace && db.exists(&key) {
        return Err(ReplyError::BusyKey.into());
    }

    match ttl {
        0 => {
            db.set(&key, value);
        }
        ms => {
            let at = if absttl { ms } else { epoch().as_millis() + ms };
            db.setex(&key, value, at);
        }
    }

    store.dirty += 1;
    store.touch(client.db(), &key);
    client.reply("OK");
    Ok(None)
}

pub static SAVE: Command = Command {
    kind: CommandKind::Save,
    name: "save",
    arity: Arity::Exact(1),
    run: save,
    keys: Keys::None,
    readonly: false,
    admin: true,
    write: false,
};

fn save(client: &mut Client, store: &mut Store) -> CommandResult {
    let bytes = snapshot::save(&store.dbs);
    let path = store.dir.join(&store.dbfilename);
    std::fs::write(&path, &bytes).map_err(|_| ReplyError::Custom(Bytes::from_static(
        b"ERR problem saving RDB file",
    )))?;
    store.dirty = 0;
    client.reply("OK");
    Ok(None)
}
