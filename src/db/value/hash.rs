use crate::reply::ReplyError;
use bytes::Bytes;
use hashbrown::{HashMap, hash_map::EntryRef};

/// A hash, stored as a flat map of byte-string fields to byte-string values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hash(HashMap<Bytes, Bytes>);

impl Hash {
    /// Does the hash contain `key`?
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.0.contains_key(key)
    }

    /// Get the value for `key`.
    pub fn get(&self, key: &[u8]) -> Option<&Bytes> {
        self.0.get(key)
    }

    /// Increment the value for `key` as an integer.
    pub fn incrby(&mut self, key: &[u8], by: i64) -> Result<i64, ReplyError> {
        match self.0.entry_ref(key) {
            EntryRef::Occupied(mut entry) => {
                let i = parse_integer(entry.get()).ok_or(ReplyError::Integer)?;
                let sum = i.checked_add(by).ok_or(ReplyError::IncrOverflow)?;
                entry.insert(Bytes::from(sum.to_string()));
                Ok(sum)
            }
            EntryRef::Vacant(entry) => {
                entry.insert(Bytes::from(by.to_string()));
                Ok(by)
            }
        }
    }

    /// Increment the value for `key` as a float.
    pub fn incrbyfloat(&mut self, key: &[u8], by: f64) -> Result<f64, ReplyError> {
        match self.0.entry_ref(key) {
            EntryRef::Occupied(mut entry) => {
                let f = parse_float(entry.get()).ok_or(ReplyError::Float)?;
                let sum = f + by;
                if !sum.is_finite() {
                    return Err(ReplyError::NanOrInfinity);
                }
                entry.insert(Bytes::from(format!("{sum}")));
                Ok(sum)
            }
            EntryRef::Vacant(entry) => {
                if !by.is_finite() {
                    return Err(ReplyError::NanOrInfinity);
                }
                entry.insert(Bytes::from(format!("{by}")));
                Ok(by)
            }
        }
    }

    /// Insert a `key` `value` pair. Return `true` if the field is new.
    pub fn insert(&mut self, key: Bytes, value: Bytes) -> bool {
        match self.0.entry_ref(&key[..]) {
            EntryRef::Occupied(mut entry) => {
                entry.insert(value);
                false
            }
            EntryRef::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Remove the value for `key`.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        self.0.remove(key).is_some()
    }

    /// Is this hash empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of values in this hash.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return an iterator over the key value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.0.iter()
    }

    /// Return an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &Bytes> {
        self.0.keys()
    }

    /// Return an iterator over the values.
    pub fn values(&self) -> impl Iterator<Item = &Bytes> {
        self.0.values()
    }

    /// How much effort is required to drop this value?
    pub fn drop_effort(&self) -> usize {
        self.0.len().max(1)
    }
}

fn parse_integer(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

fn parse_float(bytes: &[u8]) -> Option<f64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut hash = Hash::default();
        assert!(hash.insert(Bytes::from_static(b"key"), Bytes::from_static(b"value")));
        assert!(!hash.insert(Bytes::from_static(b"key"), Bytes::from_static(b"other")));
        assert_eq!(hash.get(b"key"), Some(&Bytes::from_static(b"other")));
    }

    #[test]
    fn incrby() {
        let mut hash = Hash::default();
        assert_eq!(hash.incrby(b"n", 5), Ok(5));
        assert_eq!(hash.incrby(b"n", -2), Ok(3));
    }

    #[test]
    fn incrby_not_an_integer() {
        let mut hash = Hash::default();
        hash.insert(Bytes::from_static(b"n"), Bytes::from_static(b"nope"));
        assert_eq!(hash.incrby(b"n", 1), Err(ReplyError::Integer));
    }

    #[test]
    fn incrbyfloat() {
        let mut hash = Hash::default();
        assert_eq!(hash.incrbyfloat(b"n", 1.5), Ok(1.5));
        assert_eq!(hash.incrbyfloat(b"n", 1.5), Ok(3.0));
    }
}
