use crate::{
    bytes::lex,
    client::Client,
    command::{Arity, Command, CommandKind, Keys},
    db::Value,
    glob,
    reply::{Reply, ReplyError},
    store::Store,
    CommandResult,
};
use bytes::Bytes;
use logos::Logos;

pub static EXISTS: Command = Command {
    kind: CommandKind::Exists,
    name: "exists",
    arity: Arity::Minimum(2),
    run: exists,
    keys: Keys::All,
    readonly: true,
    admin: false,
    write: false,
};

fn exists(client: &mut Client, store: &mut Store) -> CommandResult {
    let mut count = 0;
    let db = store.get_db(client.db())?;
    for key in client.request.iter() {
        if db.exists(&key) {
            count += 1;
        }
    }
    client.reply(count);
    Ok(None)
}

pub static DEL: Command = Command {
    kind: CommandKind::Del,
    name: "del",
    arity: Arity::Minimum(2),
    run: del,
    keys: Keys::All,
    readonly: false,
    admin: false,
    write: true,
};

pub static UNLINK: Command = Command {
    kind: CommandKind::Unlink,
    name: "unlink",
    arity: Arity::Minimum(2),
    run: unlink,
    keys: Keys::All,
    readonly: false,
    admin: false,
    write: true,
};

fn delete(client: &mut Client, store: &mut Store, lazy: bool) -> CommandResult {
    let mut reply = 0;
    for key in client.request.iter() {
        let db = store.mut_db(client.db())?;
        if let Some(value) = db.remove(&key) {
            store.dirty += 1;
            store.drop_value(value, lazy);
            store.touch(client.db(), &key);
            reply += 1;
        }
    }

    client.reply(reply);
    Ok(None)
}

fn del(client: &mut Client, store: &mut Store) -> CommandResult {
    delete(client, store, false)
}

fn unlink(client: &mut Client, store: &mut Store) -> CommandResult {
    delete(client, store, true)
}

pub static KEYS: Command = Command {
    kind: CommandKind::Keys,
    name: "keys",
    arity: Arity::Exact(2),
    run: keys,
    keys: Keys::None,
    readonly: true,
    admin: false,
    write: false,
};

fn keys(client: &mut Client, store: &mut Store) -> CommandResult {
    let pattern = client.request.pop()?;
    client.deferred_array(
        store
            .get_db(client.db())?
            .keys()
            .filter(|key| glob::matches(key, &pattern[..])),
    );
    Ok(None)
}

pub static TYPE: Command = Command {
    kind: CommandKind::Type,
    name: "type",
    arity: Arity::Exact(2),
    run: type_,
    keys: Keys::Single,
    readonly: true,
    admin: false,
    write: false,
};

fn type_(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let result = match store.get_db(client.db())?.get(&key[..]) {
        Some(Value::String(_)) => "string",
        Some(Value::Hash(_)) => "hash",
        Some(Value::List(_)) => "list",
        Some(Value::Set(_)) => "set",
        Some(Value::SortedSet(_)) => "zset",
        None => "none",
    };

    client.reply(result);
    Ok(None)
}

pub static OBJECT: Command = Command {
    kind: CommandKind::Object,
    name: "object",
    arity: Arity::Minimum(2),
    run: object,
    keys: Keys::None,
    readonly: true,
    admin: false,
    write: false,
};

#[derive(Clone, Copy, Debug, Eq, Hash, Logos, PartialEq)]
pub enum ObjectSubcommand {
    #[regex(b"(?i:encoding)")]
    Encoding,

    #[regex(b"(?i:freq)")]
    Freq,

    #[regex(b"(?i:help)")]
    Help,

    #[regex(b"(?i:numpat)")]
    Idletime,

    #[regex(b"(?i:refcount)")]
    Refcount,
}

fn object(client: &mut Client, store: &mut Store) -> CommandResult {
    let len = client.request.len();
    let subcommand = client.request.pop()?;

    use ObjectSubcommand::*;
    let subcommand = match (lex(&subcommand[..]), len) {
        (Some(Encoding), _) => object_encoding,
        (Some(Freq), _) => object_freq,
        (Some(Help), 2) => object_help,
        (Some(Idletime), _) => object_idletime,
        (Some(Refcount), _) => object_refcount,
        _ => return Err(client.request.unknown_subcommand().into()),
    };

    subcommand(client, store)
}

// This store has no eviction policy, so no key is ever tracked by access frequency or idle time.
fn object_freq(_: &mut Client, _: &mut Store) -> CommandResult {
    Err(ReplyError::Custom(Bytes::from_static(
        b"ERR An LFU maxmemory policy is not selected, access frequency not tracked. Please note that when switching between maxmemory policies at runtime LFU and LRU data will take some time to adjust.",
    ))
    .into())
}

fn object_idletime(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let db = store.get_db(client.db())?;
    db.get(&key).ok_or(Reply::Nil)?;
    client.reply(0);
    Ok(None)
}

fn object_encoding(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let hash_max_entries = store.hash_max_listpack_entries;
    let hash_max_value = store.hash_max_listpack_value;
    let zset_max_entries = store.zset_max_listpack_entries;
    let zset_max_value = store.zset_max_listpack_value;
    let set_config = store.set_config.clone();

    let db = store.get_db(client.db())?;
    let encoding = match db.get(&key).ok_or(Reply::Nil)? {
        Value::Hash(hash) => {
            let small = hash.len() <= hash_max_entries
                && hash.iter().all(|(field, value)| {
                    field.len() <= hash_max_value && value.len() <= hash_max_value
                });
            if small { "listpack" } else { "hashtable" }
        }
        Value::List(_) => "quicklist",
        Value::Set(set) => {
            let all_integers = set.iter().all(|member| std::str::from_utf8(member)
                .ok()
                .is_some_and(|s| s.parse::<i64>().is_ok()));
            if all_integers && set.len() <= set_config.max_intset_entries {
                "intset"
            } else if set.len() <= set_config.max_listpack_entries
                && set.iter().all(|member| member.len() <= set_config.max_listpack_value)
            {
                "listpack"
            } else {
                "hashtable"
            }
        }
        Value::SortedSet(zset) => {
            let small = zset.len() <= zset_max_entries
                && zset.range(0..zset.len()).all(|(_, member)| member.len() <= zset_max_value);
            if small { "listpack" } else { "skiplist" }
        }
        Value::String(_) => "raw",
    };
    client.reply(encoding);
    Ok(None)
}

fn object_help(client: &mut Client, _: &mut Store) -> CommandResult {
    client.verbatim("txt", include_str!("../help/object.txt"));
    Ok(None)
}

fn object_refcount(client: &mut Client, _: &mut Store) -> CommandResult {
    client.reply(1);
    Ok(None)
}

pub static RANDOMKEY: Command = Command {
    kind: CommandKind::Randomkey,
    name: "randomkey",
    arity: Arity::Exact(1),
    run: randomkey,
    keys: Keys::None,
    readonly: true,
    admin: false,
    write: false,
};

fn randomkey(client: &mut Client, store: &mut Store) -> CommandResult {
    let db = store.get_db(client.db())?;
    client.reply(db.random_key());
    Ok(None)
}
