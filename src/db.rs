mod index;
mod key_ref;
mod value;

pub use index::DBIndex;
pub use key_ref::KeyRef;
pub use value::{Edge, Extreme, Hash, Insertion, List, Set, SortedSet, Value, ValueError};

use crate::epoch;
use bytes::Bytes;
use hashbrown::{HashMap, hash_map::EntryRef};

/// A Redis database, storing all the values and their expiration times.
#[derive(Debug, Clone, Default)]
pub struct DB {
    /// A map containing all key value pairs in this database.
    objects: HashMap<Bytes, Value>,

    /// A map containing the expiration time of all volatile keys in this database.
    expires: HashMap<Bytes, u128>,
}

impl DB {
    /// Get the value for `key`, unless it has expired.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        if self.is_expired(key) {
            None
        } else {
            self.objects.get(key)
        }
    }

    /// Does `key` exist in this database?
    pub fn exists(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Get the mutable value for `key`, unless it has expired.
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut Value> {
        if self.is_expired(key) {
            self.remove(key);
            None
        } else {
            self.objects.get_mut(key)
        }
    }

    /// Get the mutable value for many keys.
    pub fn get_many_mut<const N: usize>(&mut self, keys: [&[u8]; N]) -> [Option<&mut Value>; N] {
        self.objects.get_many_mut(keys)
    }

    /// Get a mutable reference to the value for `key`, inserting the result of `default` if it
    /// doesn't exist.
    pub fn get_or_insert_with(
        &mut self,
        key: &[u8],
        default: impl FnOnce() -> Value,
    ) -> &mut Value {
        if self.is_expired(key) {
            self.remove(key);
        }
        if !self.objects.contains_key(key) {
            self.objects.insert(Bytes::copy_from_slice(key), default());
        }
        self.objects.get_mut(key).expect("key was just inserted")
    }

    /// Set the expiration time for `key`. Return `true` if the key exists, otherwise `false`.
    pub fn expire(&mut self, key: &[u8], at: u128) -> bool {
        if let EntryRef::Occupied(mut entry) = self.expires.entry_ref(key) {
            if epoch().as_millis() >= *entry.get() {
                entry.remove();
                self.objects.remove(key);
                false
            } else {
                entry.insert(at);
                true
            }
        } else if let Some((key, _)) = self.objects.get_key_value(key) {
            self.expires.insert(key.clone(), at);
            true
        } else {
            false
        }
    }

    /// Remove the expiration for `key`. Return `true` if it exists.
    pub fn persist(&mut self, key: &[u8]) -> bool {
        self.expires.remove(key).is_some()
    }

    /// Insert `key` `value` pair, optionally keeping the current expiration.
    fn insert<V>(&mut self, key: &[u8], value: V, keepttl: bool) -> Option<Value>
    where
        V: Into<Value>,
    {
        let expired = self.is_expired(key);
        if !keepttl || expired {
            self.persist(key);
        }
        let value = match self.objects.get_mut(key) {
            Some(existing) => Some(std::mem::replace(existing, value.into())),
            None => {
                self.objects.insert(Bytes::copy_from_slice(key), value.into());
                None
            }
        };
        if expired { None } else { value }
    }

    /// Set the `value` of `key`, removing the expiration time.
    pub fn set<V>(&mut self, key: &[u8], value: V) -> Option<Value>
    where
        V: Into<Value>,
    {
        self.insert(key, value, false)
    }

    /// Set the `value` of `key`, keeping the expiration time.
    pub fn overwrite<V>(&mut self, key: &[u8], value: V) -> Option<Value>
    where
        V: Into<Value>,
    {
        self.insert(key, value, true)
    }

    /// Set the `value` of `key`, with an expiration time.
    pub fn setex<V>(&mut self, key: &[u8], value: V, at: u128) -> Option<Value>
    where
        V: Into<Value>,
    {
        if at <= epoch().as_millis() {
            return None;
        }
        match self.objects.get_key_value(key) {
            Some((existing_key, _)) => {
                self.expires.insert(existing_key.clone(), at);
                let existing = self.objects.get_mut(key).expect("key was just looked up");
                Some(std::mem::replace(existing, value.into()))
            }
            None => {
                let key = Bytes::copy_from_slice(key);
                self.expires.insert(key.clone(), at);
                self.objects.insert(key, value.into());
                None
            }
        }
    }

    /// Remove `key` from this database.
    pub fn remove(&mut self, key: &[u8]) -> Option<Value> {
        let expired = self.is_expired(key);
        self.persist(key);
        let value = self.objects.remove(key);
        if expired { None } else { value }
    }

    /// Return the time until `key` expires in milliseconds.
    pub fn ttl(&self, key: &[u8]) -> Option<u128> {
        let x = self.expires.get(key)?;
        if epoch().as_millis() >= *x {
            None
        } else {
            Some(*x - epoch().as_millis())
        }
    }

    /// Return the expiration time for `key` in milliseconds.
    pub fn expires_at(&self, key: &[u8]) -> Option<u128> {
        self.expires.get(key).copied()
    }

    /// Is `key` expired?
    fn is_expired(&self, key: &[u8]) -> bool {
        match self.expires.get(key) {
            Some(x) => epoch().as_millis() >= *x,
            None => false,
        }
    }

    /// Iterate over all keys in this database.
    pub fn keys(&self) -> impl Iterator<Item = &Bytes> {
        self.objects.keys().filter(move |key| !self.is_expired(key))
    }

    /// Return a random key, if any exist.
    pub fn random_key(&self) -> Option<&Bytes> {
        use rand::Rng;
        let keys: Vec<_> = self.keys().collect();
        if keys.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..keys.len());
        keys.into_iter().nth(index)
    }

    /// The number of values in this database.
    pub fn size(&self) -> usize {
        self.objects.len()
    }

    /// Remove every key from this database.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.expires.clear();
    }

    /// Get a reference to a hash value. Return an error if the type is wrong.
    pub fn get_hash(&self, key: &[u8]) -> Result<Option<&Hash>, ValueError> {
        self.get(key).map(Value::as_hash).transpose()
    }

    /// Get a mutable reference to a hash value. Return an error if the type is wrong.
    pub fn mut_hash(&mut self, key: &[u8]) -> Result<Option<&mut Hash>, ValueError> {
        self.get_mut(key).map(Value::mut_hash).transpose()
    }

    /// Get a mutable reference to a hash value. Insert it if it doesn't exist. Return an error if
    /// the type is wrong.
    pub fn hash_or_default(&mut self, key: &[u8]) -> Result<&mut Hash, ValueError> {
        self.get_or_insert_with(key, Value::hash).mut_hash()
    }

    /// Get a reference to a list value. Return an error if the type is wrong.
    pub fn get_list(&self, key: &[u8]) -> Result<Option<&List>, ValueError> {
        self.get(key).map(Value::as_list).transpose()
    }

    /// Get a mutable reference to a list value. Return an error if the type is wrong.
    pub fn mut_list(&mut self, key: &[u8]) -> Result<Option<&mut List>, ValueError> {
        self.get_mut(key).map(Value::mut_list).transpose()
    }

    /// Get a mutable reference to a list value. Insert it if it doesn't exist. Return an error if
    /// the type is wrong.
    pub fn list_or_default(&mut self, key: &[u8]) -> Result<&mut List, ValueError> {
        self.get_or_insert_with(key, Value::list).mut_list()
    }

    /// Get a reference to a set value. Return an error if the type is wrong.
    pub fn get_set(&self, key: &[u8]) -> Result<Option<&Set>, ValueError> {
        self.get(key).map(Value::as_set).transpose()
    }

    /// Get a mutable reference to a set value. Return an error if the type is wrong.
    pub fn mut_set(&mut self, key: &[u8]) -> Result<Option<&mut Set>, ValueError> {
        self.get_mut(key).map(Value::mut_set).transpose()
    }

    /// Get a mutable reference to a set value. Insert it if it doesn't exist. Return an error if
    /// the type is wrong.
    pub fn set_or_default(&mut self, key: &[u8]) -> Result<&mut Set, ValueError> {
        self.get_or_insert_with(key, Value::set).mut_set()
    }

    /// Get a reference to a sorted set value. Return an error if the type is wrong.
    pub fn get_sorted_set(&self, key: &[u8]) -> Result<Option<&SortedSet>, ValueError> {
        self.get(key).map(Value::as_sorted_set).transpose()
    }

    /// Get a mutable reference to a sorted set value. Return an error if the type is wrong.
    pub fn mut_sorted_set(&mut self, key: &[u8]) -> Result<Option<&mut SortedSet>, ValueError> {
        self.get_mut(key).map(Value::mut_sorted_set).transpose()
    }

    /// Get a mutable reference to a sorted set value. Insert it if it doesn't exist. Return an
    /// error if the type is wrong.
    pub fn sorted_set_or_default(&mut self, key: &[u8]) -> Result<&mut SortedSet, ValueError> {
        self.get_or_insert_with(key, Value::sorted_set)
            .mut_sorted_set()
    }

    /// Get a reference to a string value. Return an error if the type is wrong.
    pub fn get_string(&self, key: &[u8]) -> Result<Option<&Bytes>, ValueError> {
        self.get(key).map(Value::as_string).transpose()
    }

    /// Get a mutable reference to a string value. Return an error if the type is wrong.
    pub fn mut_string(&mut self, key: &[u8]) -> Result<Option<&mut Bytes>, ValueError> {
        self.get_mut(key).map(Value::mut_string).transpose()
    }

    /// Get a mutable reference to a string value. Insert it if it doesn't exist. Return an error
    /// if the type is wrong.
    pub fn string_or_default(&mut self, key: &[u8]) -> Result<&mut Bytes, ValueError> {
        self.get_or_insert_with(key, Value::string)
            .mut_string()
    }
}

#[cfg(test)]
#[cfg(not(miri))]
mod tests {
    use super::*;

    #[test]
    fn set() {
        let mut db = DB::default();
        assert_eq!(db.set(b"a", "x"), None);
        assert_eq!(db.get(b"a"), Some(&"x".into()));
        assert_eq!(db.set(b"a", "y"), Some("x".into()));
    }

    #[test]
    fn set_expired() {
        let mut db = DB::default();
        assert_eq!(db.set(b"a", "x"), None);
        db.expire(b"a", epoch().as_millis() - 10_000);
        assert_eq!(db.set(b"a", "y"), None);
    }

    #[test]
    fn setex() {
        let mut db = DB::default();
        assert_eq!(db.setex(b"a", "x", epoch().as_millis() + 10_000), None);
        assert_eq!(db.get(b"a"), Some(&"x".into()));
        assert!((9995..10_006).contains(&db.ttl(b"a").unwrap()));
    }

    #[test]
    fn keys() {
        let mut db = DB::default();
        db.setex(b"a", "x", epoch().as_millis());
        db.setex(b"b", "x", epoch().as_millis() + 10_000);
        db.set(b"c", "x");
        let keys: Vec<_> = db.keys().collect();
        assert!(keys.contains(&&Bytes::from_static(b"b")));
        assert!(keys.contains(&&Bytes::from_static(b"c")));
    }

    #[test]
    fn remove_expired_returns_none() {
        let mut db = DB::default();
        db.set(b"x", "1");
        db.expire(b"x", epoch().as_millis() - 10_000);
        assert_eq!(db.remove(b"x"), None);
    }
}
