use crate::{db::Extreme, skiplist::Skiplist};
use bytes::Bytes;
use hashbrown::{HashMap, hash_map::EntryRef};
use ordered_float::NotNan;
use std::ops::{Range, RangeBounds};

#[derive(Debug, Eq, PartialEq)]
pub enum Insertion {
    Added,
    Changed,
}

/// A sorted set, kept as a [`Skiplist`] ordered by score plus a map from
/// member to score for O(1) lookups.
#[derive(Clone, Debug, Default)]
pub struct SortedSet {
    list: Skiplist,
    scores: HashMap<Bytes, NotNan<f64>>,
}

impl PartialEq for SortedSet {
    fn eq(&self, other: &Self) -> bool {
        self.scores == other.scores
    }
}

impl SortedSet {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// How much effort is required to drop this value?
    pub fn drop_effort(&self) -> usize {
        self.len().max(1)
    }

    pub fn contains(&self, value: &[u8]) -> bool {
        self.scores.contains_key(value)
    }

    pub fn score(&self, value: &[u8]) -> Option<f64> {
        self.scores.get(value).map(|&score| *score)
    }

    pub fn insert(&mut self, score: NotNan<f64>, value: Bytes) -> Option<Insertion> {
        match self.scores.entry_ref(&value[..]) {
            EntryRef::Occupied(mut entry) => {
                if *entry.get() == score {
                    None
                } else {
                    self.list.remove(**entry.get(), entry.key());
                    self.list.insert(score, entry.key().clone());
                    entry.insert(score);
                    Some(Insertion::Changed)
                }
            }
            EntryRef::Vacant(entry) => {
                let key = Bytes::copy_from_slice(entry.key());
                entry.insert(score);
                self.list.insert(score, key);
                Some(Insertion::Added)
            }
        }
    }

    pub fn rank(&self, value: &[u8]) -> Option<usize> {
        let (value, score) = self.scores.get_key_value(value)?;
        self.list.rank(**score, value)
    }

    pub fn count<R>(&self, bounds: &R) -> usize
    where
        R: RangeBounds<f64>,
    {
        self.list.count(bounds)
    }

    pub fn remove(&mut self, value: &[u8]) -> bool {
        if let EntryRef::Occupied(entry) = self.scores.entry_ref(value) {
            let (value, score) = entry.remove_entry();
            self.list.remove(*score, &value);
            true
        } else {
            false
        }
    }

    pub fn remove_range_score<R>(&mut self, bounds: &R) -> usize
    where
        R: RangeBounds<f64>,
    {
        let scores = &mut self.scores;
        self.list.remove_range_score(bounds, |value| {
            scores.remove(value);
        })
    }

    pub fn pop(&mut self, extreme: Extreme) -> Option<(f64, Bytes)> {
        let (score, value) = self.list.pop(extreme)?;
        self.scores.remove(&value);
        Some((score, value))
    }

    pub fn range(&self, range: Range<usize>) -> impl ExactSizeIterator<Item = (f64, &Bytes)> {
        self.list.range(range)
    }

    pub fn rev_range(&self, range: Range<usize>) -> impl ExactSizeIterator<Item = (f64, &Bytes)> {
        self.list.rev_range(range)
    }

    pub fn range_score<'a, R>(&'a self, bounds: &'a R) -> impl ExactSizeIterator<Item = (f64, &'a Bytes)>
    where
        R: RangeBounds<f64>,
    {
        self.list.range_score(bounds)
    }

    pub fn rev_range_score<'a, R>(
        &'a self,
        bounds: &'a R,
    ) -> impl ExactSizeIterator<Item = (f64, &'a Bytes)>
    where
        R: RangeBounds<f64>,
    {
        self.list.rev_range_score(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_rank() {
        let mut set = SortedSet::default();
        set.insert(NotNan::new(1.0).unwrap(), Bytes::from_static(b"a"));
        set.insert(NotNan::new(2.0).unwrap(), Bytes::from_static(b"b"));
        assert_eq!(set.rank(b"a"), Some(0));
        assert_eq!(set.rank(b"b"), Some(1));
    }

    #[test]
    fn reinsert_changes_score() {
        let mut set = SortedSet::default();
        assert_eq!(
            set.insert(NotNan::new(1.0).unwrap(), Bytes::from_static(b"a")),
            Some(Insertion::Added)
        );
        assert_eq!(
            set.insert(NotNan::new(2.0).unwrap(), Bytes::from_static(b"a")),
            Some(Insertion::Changed)
        );
        assert_eq!(set.score(b"a"), Some(2.0));
    }

    #[test]
    fn remove() {
        let mut set = SortedSet::default();
        set.insert(NotNan::new(1.0).unwrap(), Bytes::from_static(b"a"));
        assert!(set.remove(b"a"));
        assert!(set.is_empty());
    }
}
