use bytes::Bytes;
use rand::Rng;
use std::collections::BTreeSet;

/// A set of unique byte-string values, kept in lexicographic order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Set(BTreeSet<Bytes>);

impl Set {
    /// The number of values in this set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// How much effort is required to drop this value?
    pub fn drop_effort(&self) -> usize {
        self.0.len().max(1)
    }

    /// Does this set contain `value`?
    pub fn contains(&self, value: &[u8]) -> bool {
        self.0.contains(value)
    }

    /// Insert `value` into this set. Return `true` if it was newly inserted.
    pub fn insert(&mut self, value: Bytes) -> bool {
        self.0.insert(value)
    }

    /// Pop a uniformly random value from this set.
    pub fn pop(&mut self) -> Option<Bytes> {
        if self.0.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..self.0.len());
        let value = self.0.iter().nth(index)?.clone();
        self.0.remove(&value);
        Some(value)
    }

    /// Return a uniformly random value without removing it.
    pub fn random(&self) -> Option<&Bytes> {
        if self.0.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..self.0.len());
        self.0.iter().nth(index)
    }

    /// Remove `value` from this set.
    pub fn remove(&mut self, value: &[u8]) -> bool {
        self.0.remove(value)
    }

    /// Return an iterator of the values in this set, in lexicographic order.
    pub fn iter(&self) -> std::collections::btree_set::Iter<'_, Bytes> {
        self.0.iter()
    }
}

impl FromIterator<Bytes> for Set {
    fn from_iter<I: IntoIterator<Item = Bytes>>(iter: I) -> Self {
        Set(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_contains() {
        let mut set = Set::default();
        assert!(set.insert(Bytes::from_static(b"a")));
        assert!(!set.insert(Bytes::from_static(b"a")));
        assert!(set.contains(b"a"));
    }

    #[test]
    fn ordering() {
        let mut set = Set::default();
        for value in [b"c", b"a", b"b"] {
            set.insert(Bytes::from_static(value));
        }
        let values: Vec<_> = set.iter().map(|v| v.to_vec()).collect();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn pop_removes_value() {
        let mut set = Set::default();
        set.insert(Bytes::from_static(b"a"));
        let popped = set.pop().unwrap();
        assert_eq!(popped, Bytes::from_static(b"a"));
        assert!(set.is_empty());
    }
}
