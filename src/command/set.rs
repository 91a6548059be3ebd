use crate::{
    client::Client,
    command::{Arity, Command, CommandKind, Keys},
    db::{Set, DB},
    reply::{Reply, ReplyError},
    store::Store,
    CommandResult,
};
use bytes::Bytes;
use rand::{seq::SliceRandom, Rng};
use std::{cmp::min, collections::BTreeSet};

pub static SADD: Command = Command {
    kind: CommandKind::Sadd,
    name: "sadd",
    arity: Arity::Minimum(3),
    run: sadd,
    keys: Keys::Single,
    readonly: false,
    admin: false,
    write: true,
};

fn sadd(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let db = store.mut_db(client.db())?;
    let set = db.set_or_default(&key)?;
    let mut count = 0;

    for value in client.request.iter() {
        if set.insert(value) {
            count += 1;
        }
    }

    if count > 0 {
        store.dirty += count;
        store.touch(client.db(), &key);
    }

    client.reply(count);
    Ok(None)
}

pub static SCARD: Command = Command {
    kind: CommandKind::Scard,
    name: "scard",
    arity: Arity::Exact(2),
    run: scard,
    keys: Keys::Single,
    readonly: true,
    admin: false,
    write: false,
};

fn scard(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let db = store.get_db(client.db())?;
    let set = db.get_set(&key[..])?.ok_or(0)?;

    client.reply(set.len());
    Ok(None)
}

pub static SISMEMBER: Command = Command {
    kind: CommandKind::Sismember,
    name: "sismember",
    arity: Arity::Exact(3),
    run: sismember,
    keys: Keys::Single,
    readonly: true,
    admin: false,
    write: false,
};

fn sismember(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let value = client.request.pop()?;
    let db = store.get_db(client.db())?;
    let set = db.get_set(&key)?.ok_or(0)?;
    let result = i64::from(set.contains(&value[..]));

    client.reply(result);
    Ok(None)
}

pub static SMEMBERS: Command = Command {
    kind: CommandKind::Smembers,
    name: "smembers",
    arity: Arity::Exact(2),
    run: smembers,
    keys: Keys::Single,
    readonly: true,
    admin: false,
    write: false,
};

fn smembers(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let db = store.get_db(client.db())?;
    let set = db.get_set(&key)?.ok_or(Reply::Set(0))?;

    client.reply(Reply::Set(set.len()));
    for item in set.iter() {
        client.reply(item);
    }

    Ok(None)
}

pub static SMISMEMBER: Command = Command {
    kind: CommandKind::Smismember,
    name: "smismember",
    arity: Arity::Minimum(3),
    run: smismember,
    keys: Keys::Single,
    readonly: true,
    admin: false,
    write: false,
};

fn smismember(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let db = store.get_db(client.db())?;

    let len = client.request.remaining();
    client.reply(Reply::Array(len));

    if let Some(value) = db.get(&key) {
        let set = value.as_set()?;
        while !client.request.is_empty() {
            let item = client.request.pop()?;
            client.reply(i64::from(set.contains(&item[..])));
        }
    } else {
        for _ in 0..len {
            client.reply(0);
        }
    }

    Ok(None)
}

pub static SPOP: Command = Command {
    kind: CommandKind::Spop,
    name: "spop",
    arity: Arity::Minimum(2),
    run: spop,
    keys: Keys::Single,
    readonly: false,
    admin: false,
    write: true,
};

fn spop(client: &mut Client, store: &mut Store) -> CommandResult {
    if client.request.len() > 3 {
        return Err(ReplyError::Syntax.into());
    }

    let key = client.request.pop()?;
    let db = store.mut_db(client.db())?;
    let set = db.mut_set(&key)?.ok_or(Reply::Array(0))?;

    if client.request.is_empty() {
        let member = set.pop().ok_or(Reply::Nil)?;
        client.reply(member);
        if set.is_empty() {
            db.remove(&key);
        }
        store.dirty += 1;
        store.touch(client.db(), &key);
        return Ok(None);
    }

    let count = min(client.request.usize()?, set.len());
    client.reply(Reply::Array(count));
    for _ in 0..count {
        let member = set.pop().ok_or(Reply::Nil)?;
        client.reply(member);
    }
    if set.is_empty() {
        db.remove(&key);
    }
    if count > 0 {
        store.dirty += count;
        store.touch(client.db(), &key);
    }

    Ok(None)
}

pub static SREM: Command = Command {
    kind: CommandKind::Srem,
    name: "srem",
    arity: Arity::Minimum(3),
    run: srem,
    keys: Keys::Single,
    readonly: false,
    admin: false,
    write: true,
};

fn srem(client: &mut Client, store: &mut Store) -> CommandResult {
    let key = client.request.pop()?;
    let db = store.mut_db(client.db())?;
    let set = db.set_or_default(&key)?;
    let mut count = 0;

    for value in client.request.iter() {
        if set.remove(&value[..]) {
            count += 1;
        }
    }

    if set.is_empty() {
        db.remove(&key);
    }

    if count > 0 {
        store.dirty += count;
        store.touch(client.db(), &key);
    }

    client.reply(count);
    Ok(None)
}

pub static SMOVE: Command = Command {
    kind: CommandKind::Smove,
    name: "smove",
    arity: Arity::Exact(4),
    run: smove,
    keys: Keys::Double,
    readonly: false,
    admin: false,
    write: true,
};

fn smove(client: &mut Client, store: &mut Store) -> CommandResult {
    let source = client.request.pop()?;
    let dest = client.request.pop()?;
    let member = client.request.pop()?;
    let db = store.mut_db(client.db())?;

    let (removed, became_empty) = match db.mut_set(&source)? {
        Some(set) => {
            let removed = set.remove(&member[..]);
            (removed, set.is_empty())
        }
        None => (false, false),
    };

    if became_empty {
        db.remove(&source);
    }

    if !removed {
        client.reply(0);
        return Ok(None);
    }

    db.set_or_default(&dest)?.insert(member);

    store.dirty += 1;
    store.touch(client.db(), &source);
    store.touch(client.db(), &dest);
    client.reply(1);
    Ok(None)
}

pub static SRANDMEMBER: Command = Command {
    kind: CommandKind::Srandmember,
    name: "srandmember",
    arity: Arity::Minimum(2),
    run: srandmember,
    keys: Keys::Single,
    readonly: true,
    admin: false,
    write: false,
};

fn srandmember(client: &mut Client, store: &mut Store) -> CommandResult {
    if client.request.len() > 3 {
        return Err(ReplyError::Syntax.into());
    }

    let key = client.request.pop()?;
    let db = store.get_db(client.db())?;
    let set = db.get_set(&key)?;

    if client.request.is_empty() {
        let member = set.and_then(Set::random).ok_or(Reply::Nil)?;
        client.reply(member);
        return Ok(None);
    }

    let count = client.request.i64()?;
    let Some(set) = set else {
        client.reply(Reply::Array(0));
        return Ok(None);
    };

    let members: Vec<&Bytes> = set.iter().collect();
    let mut rng = rand::thread_rng();

    if count >= 0 {
        let count = min(count as usize, members.len());
        client.reply(Reply::Array(count));
        for member in members.choose_multiple(&mut rng, count) {
            client.reply(*member);
        }
    } else {
        let count = (-count) as usize;
        client.reply(Reply::Array(count));
        for _ in 0..count {
            if members.is_empty() {
                break;
            }
            let index = rng.gen_range(0..members.len());
            client.reply(members[index]);
        }
    }

    Ok(None)
}

fn union(db: &DB, keys: impl Iterator<Item = Bytes>) -> Result<BTreeSet<Bytes>, Reply> {
    let mut result = BTreeSet::new();
    for key in keys {
        if let Some(set) = db.get_set(&key)? {
            result.extend(set.iter().cloned());
        }
    }
    Ok(result)
}

fn intersection(db: &DB, mut keys: impl Iterator<Item = Bytes>) -> Result<BTreeSet<Bytes>, Reply> {
    let Some(first) = keys.next() else {
        return Ok(BTreeSet::new());
    };

    let mut result: BTreeSet<Bytes> = match db.get_set(&first)? {
        Some(set) => set.iter().cloned().collect(),
        None => BTreeSet::new(),
    };

    for key in keys {
        if result.is_empty() {
            break;
        }
        match db.get_set(&key)? {
            Some(set) => result.retain(|member| set.contains(member)),
            None => result.clear(),
        }
    }

    Ok(result)
}

fn difference(db: &DB, mut keys: impl Iterator<Item = Bytes>) -> Result<BTreeSet<Bytes>, Reply> {
    let Some(first) = keys.next() else {
        return Ok(BTreeSet::new());
    };

    let mut result: BTreeSet<Bytes> = match db.get_set(&first)? {
        Some(set) => set.iter().cloned().collect(),
        None => BTreeSet::new(),
    };

    for key in keys {
        if let Some(set) = db.get_set(&key)? {
            for member in set.iter() {
                result.remove(member);
            }
        }
    }

    Ok(result)
}

fn reply_set(client: &mut Client, result: BTreeSet<Bytes>) {
    client.reply(Reply::Set(result.len()));
    for member in &result {
        client.reply(member);
    }
}

fn store_set(
    client: &mut Client,
    store: &mut Store,
    dest: Bytes,
    result: BTreeSet<Bytes>,
) -> CommandResult {
    let count = result.len();
    let db = store.mut_db(client.db())?;

    if result.is_empty() {
        db.remove(&dest);
    } else {
        db.set(&dest, Set::from_iter(result));
    }

    store.dirty += 1;
    store.touch(client.db(), &dest);
    client.reply(count);
    Ok(None)
}

pub static SUNION: Command = Command {
    kind: CommandKind::Sunion,
    name: "sunion",
    arity: Arity::Minimum(2),
    run: sunion,
    keys: Keys::All,
    readonly: true,
    admin: false,
    write: false,
};

fn sunion(client: &mut Client, store: &mut Store) -> CommandResult {
    let db = store.get_db(client.db())?;
    let result = union(db, client.request.iter())?;
    reply_set(client, result);
    Ok(None)
}

pub static SUNIONSTORE: Command = Command {
    kind: CommandKind::Sunionstore,
    name: "sunionstore",
    arity: Arity::Minimum(3),
    run: sunionstore,
    keys: Keys::All,
    readonly: false,
    admin: false,
    write: true,
};

fn sunionstore(client: &mut Client, store: &mut Store) -> CommandResult {
    let dest = client.request.pop()?;
    let db = store.get_db(client.db())?;
    let result = union(db, client.request.iter())?;
    store_set(client, store, dest, result)
}

pub static SINTER: Command = Command {
    kind: CommandKind::Sinter,
    name: "sinter",
    arity: Arity::Minimum(2),
    run: sinter,
    keys: Keys::All,
    readonly: true,
    admin: false,
    write: false,
};

fn sinter(client: &mut Client, store: &mut Store) -> CommandResult {
    let db = store.get_db(client.db())?;
    let result = intersection(db, client.request.iter())?;
    reply_set(client, result);
    Ok(None)
}

pub static SINTERSTORE: Command = Command {
    kind: CommandKind::Sinterstore,
    name: "sinterstore",
    arity: Arity::Minimum(3),
    run: sinterstore,
    keys: Keys::All,
    readonly: false,
    admin: false,
    write: true,
};

fn sinterstore(client: &mut Client, store: &mut Store) -> CommandResult {
    let dest = client.request.pop()?;
    let db = store.get_db(client.db())?;
    let result = intersection(db, client.request.iter())?;
    store_set(client, store, dest, result)
}

pub static SDIFF: Command = Command {
    kind: CommandKind::Sdiff,
    name: "sdiff",
    arity: Arity::Minimum(2),
    run: sdiff,
    keys: Keys::All,
    readonly: true,
    admin: false,
    write: false,
};

fn sdiff(client: &mut Client, store: &mut Store) -> CommandResult {
    let db = store.get_db(client.db())?;
    let result = difference(db, client.request.iter())?;
    reply_set(client, result);
    Ok(None)
}

pub static SDIFFSTORE: Command = Command {
    kind: CommandKind::Sdiffstore,
    name: "sdiffstore",
    arity: Arity::Minimum(3),
    run: sdiffstore,
    keys: Keys::All,
    readonly: false,
    admin: false,
    write: true,
};

fn sdiffstore(client: &mut Client, store: &mut Store) -> CommandResult {
    let dest = client.request.pop()?;
    let db = store.get_db(client.db())?;
    let result = difference(db, client.request.iter())?;
    store_set(client, store, dest, result)
}
