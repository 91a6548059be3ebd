//! Binary codec shared by `SAVE`/the initial replication sync (whole keyspace) and
//! `DUMP`/`RESTORE` (a single value).
//!
//! Both formats share the same per-value payload encoding; the full snapshot wraps those
//! payloads in a stream of opcodes, while DUMP/RESTORE wraps a single payload with a version
//! and a checksum.

use crate::{
    db::{Hash, List, Set, SortedSet, Value, DB},
    epoch,
    reply::ReplyError,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use ordered_float::NotNan;

/// The snapshot format version written by this implementation.
pub const VERSION: u16 = 6;

const OP_EXPIRE_MS: u8 = 0xFC;
const OP_SELECTDB: u8 = 0xFE;
const OP_EOF: u8 = 0xFF;

const TYPE_STRING: u8 = 0;
const TYPE_LIST: u8 = 1;
const TYPE_SET: u8 = 2;
const TYPE_ZSET: u8 = 3;
const TYPE_HASH: u8 = 4;

const LEN_6BIT: u8 = 0b0000_0000;
const LEN_14BIT: u8 = 0b0100_0000;
const LEN_32BIT: u8 = 0b1000_0000;

const DOUBLE_NAN: u8 = 253;
const DOUBLE_PINF: u8 = 254;
const DOUBLE_NINF: u8 = 255;

/// crc64/jones, reflected, init 0. Matches the checksum trailer on both snapshot files and
/// DUMP/RESTORE payloads.
pub fn crc64(initial: u64, bytes: &[u8]) -> u64 {
    static TABLE: std::sync::LazyLock<[u64; 256]> = std::sync::LazyLock::new(|| {
        const POLY: u64 = 0x95AC_9329_AC4B_C9B5;
        let mut table = [0u64; 256];
        let mut i = 0;
        while i < 256 {
            let mut c = i as u64;
            let mut j = 0;
            while j < 8 {
                c = if c & 1 == 1 { POLY ^ (c >> 1) } else { c >> 1 };
                j += 1;
            }
            table[i] = c;
            i += 1;
        }
        table
    });

    let mut crc = initial;
    for &byte in bytes {
        crc = TABLE[((crc ^ u64::from(byte)) & 0xff) as usize] ^ (crc >> 8);
    }
    crc
}

fn write_len(buffer: &mut BytesMut, len: usize) {
    if len < 0x40 {
        buffer.put_u8(LEN_6BIT | len as u8);
    } else if len < 0x4000 {
        buffer.put_u8(LEN_14BIT | ((len >> 8) as u8));
        buffer.put_u8((len & 0xff) as u8);
    } else {
        buffer.put_u8(LEN_32BIT);
        buffer.put_u32_le(len as u32);
    }
}

fn read_len(bytes: &mut Bytes) -> Result<usize, ReplyError> {
    let head = read_u8(bytes)?;
    match head & 0b1100_0000 {
        LEN_6BIT => Ok((head & 0x3f) as usize),
        LEN_14BIT => {
            let low = read_u8(bytes)?;
            Ok((((head & 0x3f) as usize) << 8) | low as usize)
        }
        LEN_32BIT => {
            if bytes.len() < 4 {
                return Err(ReplyError::DumpPayload);
            }
            Ok(bytes.get_u32_le() as usize)
        }
        _ => Err(ReplyError::DumpPayload),
    }
}

fn read_u8(bytes: &mut Bytes) -> Result<u8, ReplyError> {
    if bytes.is_empty() {
        Err(ReplyError::DumpPayload)
    } else {
        Ok(bytes.get_u8())
    }
}

fn write_bytes(buffer: &mut BytesMut, value: &[u8]) {
    write_len(buffer, value.len());
    buffer.put_slice(value);
}

fn read_bytes(bytes: &mut Bytes) -> Result<Bytes, ReplyError> {
    let len = read_len(bytes)?;
    if bytes.len() < len {
        return Err(ReplyError::DumpPayload);
    }
    Ok(bytes.split_to(len))
}

fn write_double(buffer: &mut BytesMut, value: f64) {
    if value.is_nan() {
        buffer.put_u8(DOUBLE_NAN);
    } else if value.is_infinite() {
        buffer.put_u8(if value < 0.0 { DOUBLE_NINF } else { DOUBLE_PINF });
    } else {
        let text = format!("{value}");
        buffer.put_u8(text.len() as u8);
        buffer.put_slice(text.as_bytes());
    }
}

fn read_double(bytes: &mut Bytes) -> Result<f64, ReplyError> {
    let head = read_u8(bytes)?;
    match head {
        DOUBLE_NAN => Ok(f64::NAN),
        DOUBLE_PINF => Ok(f64::INFINITY),
        DOUBLE_NINF => Ok(f64::NEG_INFINITY),
        len => {
            let len = len as usize;
            if bytes.len() < len {
                return Err(ReplyError::DumpPayload);
            }
            let text = bytes.split_to(len);
            std::str::from_utf8(&text)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or(ReplyError::DumpPayload)
        }
    }
}

/// Write the type tag and type-specific payload for `value`. Shared by snapshot records and
/// DUMP payloads, which differ only in what wraps this.
fn write_value(buffer: &mut BytesMut, value: &Value) {
    match value {
        Value::String(s) => {
            buffer.put_u8(TYPE_STRING);
            write_bytes(buffer, s);
        }
        Value::List(list) => {
            buffer.put_u8(TYPE_LIST);
            write_len(buffer, list.len());
            for element in list.iter() {
                write_bytes(buffer, element);
            }
        }
        Value::Set(set) => {
            buffer.put_u8(TYPE_SET);
            write_len(buffer, set.len());
            for member in set.iter() {
                write_bytes(buffer, member);
            }
        }
        Value::SortedSet(zset) => {
            buffer.put_u8(TYPE_ZSET);
            write_len(buffer, zset.len());
            for (score, member) in zset.range(0..zset.len()) {
                write_bytes(buffer, member);
                write_double(buffer, score);
            }
        }
        Value::Hash(hash) => {
            buffer.put_u8(TYPE_HASH);
            write_len(buffer, hash.len());
            for (field, field_value) in hash.iter() {
                write_bytes(buffer, field);
                write_bytes(buffer, field_value);
            }
        }
    }
}

fn read_value(bytes: &mut Bytes) -> Result<Value, ReplyError> {
    let kind = read_u8(bytes)?;
    read_value_kind(kind, bytes)
}

fn read_value_kind(kind: u8, bytes: &mut Bytes) -> Result<Value, ReplyError> {
    match kind {
        TYPE_STRING => Ok(Value::String(read_bytes(bytes)?)),
        TYPE_LIST => {
            let mut list = List::default();
            for _ in 0..read_len(bytes)? {
                list.push(read_bytes(bytes)?, crate::db::Edge::Right);
            }
            Ok(Value::List(Box::new(list)))
        }
        TYPE_SET => {
            let mut set = Set::default();
            for _ in 0..read_len(bytes)? {
                set.insert(read_bytes(bytes)?);
            }
            Ok(Value::Set(Box::new(set)))
        }
        TYPE_ZSET => {
            let mut zset = SortedSet::default();
            for _ in 0..read_len(bytes)? {
                let member = read_bytes(bytes)?;
                let score = read_double(bytes)?;
                let score = NotNan::new(score).map_err(|_| ReplyError::DumpPayload)?;
                zset.insert(score, member);
            }
            Ok(Value::SortedSet(Box::new(zset)))
        }
        TYPE_HASH => {
            let mut hash = Hash::default();
            for _ in 0..read_len(bytes)? {
                let field = read_bytes(bytes)?;
                let value = read_bytes(bytes)?;
                hash.insert(field, value);
            }
            Ok(Value::Hash(Box::new(hash)))
        }
        _ => Err(ReplyError::DumpPayload),
    }
}

/// Serialize one value for `DUMP`: the type/value payload followed by a 2-byte little-endian
/// version and an 8-byte little-endian CRC64 over the payload plus version.
pub fn dump(value: &Value) -> Bytes {
    let mut buffer = BytesMut::new();
    write_value(&mut buffer, value);
    buffer.put_u16_le(VERSION);
    let crc = crc64(0, &buffer);
    buffer.put_u64_le(crc);
    buffer.freeze()
}

/// Parse a `DUMP` payload, checking its version and checksum.
pub fn restore(payload: &[u8]) -> Result<Value, ReplyError> {
    if payload.len() < 2 + 8 {
        return Err(ReplyError::DumpPayload);
    }

    let (body, suffix) = payload.split_at(payload.len() - 8);
    let expected = u64::from_le_bytes(suffix.try_into().unwrap());
    if crc64(0, body) != expected {
        return Err(ReplyError::DumpPayload);
    }

    let (body, version) = body.split_at(body.len() - 2);
    let version = u16::from_le_bytes(version.try_into().unwrap());
    if version > VERSION {
        return Err(ReplyError::DumpPayload);
    }

    let mut bytes = Bytes::copy_from_slice(body);
    read_value(&mut bytes)
}

/// Serialize every database into a full snapshot, for `SAVE` and the initial sync sent to a new
/// replica. `now` fixes the "current instant" used to skip already-expired keys, so that a
/// snapshot taken while writes are still arriving reflects a single consistent cut.
pub fn save(dbs: &[DB]) -> Bytes {
    let mut buffer = BytesMut::new();
    buffer.put_slice(b"REDIS");
    buffer.put_slice(format!("{VERSION:04}").as_bytes());

    for (index, db) in dbs.iter().enumerate() {
        let mut keys = db.keys().peekable();
        if keys.peek().is_none() {
            continue;
        }

        buffer.put_u8(OP_SELECTDB);
        write_len(&mut buffer, index);

        for key in keys {
            let Some(value) = db.get(key) else { continue };

            if let Some(at) = db.expires_at(key) {
                buffer.put_u8(OP_EXPIRE_MS);
                buffer.put_u64_le(at as u64);
            }

            write_bytes(&mut buffer, key);
            write_value(&mut buffer, value);
        }
    }

    buffer.put_u8(OP_EOF);
    let crc = crc64(0, &buffer);
    buffer.put_u64_le(crc);
    buffer.freeze()
}

/// Parse a full snapshot, returning one populated [`DB`] per database it describes. `databases`
/// is the configured database count; indices outside that range are rejected.
pub fn load(bytes: &[u8], databases: usize) -> Result<Vec<DB>, ReplyError> {
    if bytes.len() < 9 || &bytes[..5] != b"REDIS" {
        return Err(ReplyError::DumpPayload);
    }

    let (body, suffix) = bytes.split_at(bytes.len() - 8);
    let expected = u64::from_le_bytes(suffix.try_into().unwrap());
    if crc64(0, body) != expected {
        return Err(ReplyError::DumpPayload);
    }

    let mut dbs = vec![DB::default(); databases.max(1)];
    let mut bytes = Bytes::copy_from_slice(&body[9..]);
    let mut index = 0usize;
    let mut pending_expire: Option<u128> = None;

    loop {
        let op = read_u8(&mut bytes)?;
        match op {
            OP_EOF => break,
            OP_SELECTDB => {
                index = read_len(&mut bytes)?;
                if index >= dbs.len() {
                    return Err(ReplyError::DumpPayload);
                }
            }
            OP_EXPIRE_MS => {
                if bytes.len() < 8 {
                    return Err(ReplyError::DumpPayload);
                }
                pending_expire = Some(u128::from(bytes.get_u64_le()));
            }
            kind => {
                let key = read_bytes(&mut bytes)?;
                let value = read_value_kind(kind, &mut bytes)?;
                let db = &mut dbs[index];
                match pending_expire.take() {
                    Some(at) => {
                        db.setex(&key, value, at);
                    }
                    None => {
                        db.set(&key, value);
                    }
                }
            }
        }
    }

    Ok(dbs)
}

#[cfg(test)]
#[cfg(not(miri))]
mod tests {
    use super::*;

    #[test]
    fn crc64_test_vector() {
        // The canonical crc64/jones check value for the ASCII string "123456789".
        assert_eq!(crc64(0, b"123456789"), 0xe9c6_d914_c4b8_d9ca);
    }

    #[test]
    fn dump_and_restore_string() {
        let value = Value::String(Bytes::from_static(b"hello"));
        let payload = dump(&value);
        assert_eq!(restore(&payload).unwrap(), value);
    }

    #[test]
    fn dump_and_restore_list() {
        let mut list = List::default();
        list.push(Bytes::from_static(b"a"), crate::db::Edge::Right);
        list.push(Bytes::from_static(b"b"), crate::db::Edge::Right);
        let value = Value::List(Box::new(list));
        let payload = dump(&value);
        assert_eq!(restore(&payload).unwrap(), value);
    }

    #[test]
    fn restore_rejects_bad_checksum() {
        let value = Value::String(Bytes::from_static(b"hello"));
        let mut payload = dump(&value).to_vec();
        let last = payload.len() - 1;
        payload[last] ^= 0xff;
        assert!(restore(&payload).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut db = DB::default();
        db.set(b"a", Bytes::from_static(b"1"));
        db.setex(b"b", Bytes::from_static(b"2"), epoch().as_millis() + 60_000);

        let mut other = DB::default();
        other.set(b"c", Bytes::from_static(b"3"));

        let snapshot = save(&[db, other]);
        let loaded = load(&snapshot, 2).unwrap();

        assert_eq!(loaded[0].get(b"a"), Some(&Value::String(Bytes::from_static(b"1"))));
        assert_eq!(loaded[0].get(b"b"), Some(&Value::String(Bytes::from_static(b"2"))));
        assert_eq!(loaded[1].get(b"c"), Some(&Value::String(Bytes::from_static(b"3"))));
    }

    #[test]
    fn save_and_load_skips_expired_keys() {
        let mut db = DB::default();
        db.setex(b"a", Bytes::from_static(b"1"), epoch().as_millis() - 1);

        let snapshot = save(&[db]);
        let loaded = load(&snapshot, 1).unwrap();

        assert_eq!(loaded[0].get(b"a"), None);
    }
}
