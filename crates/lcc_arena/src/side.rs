use crate::EntityRef;

use std::{
    marker::PhantomData,
    ops::{Index, IndexMut},
};

/// A dense `K -> V` map for data attached to handles owned elsewhere.
///
/// Unlike [`Arena`](crate::Arena), a `SideTable` can't allocate handles. It
/// behaves as if every key already maps to the default value, and grows on
/// the first write to a key past its current end.
#[derive(Clone)]
pub struct SideTable<K, V>
where
    K: EntityRef,
    V: Clone,
{
    default: V,
    data: Vec<V>,
    phantom: PhantomData<K>,
}

impl<K, V> SideTable<K, V>
where
    K: EntityRef,
    V: Clone,
{
    /// Create an empty table whose untouched keys read as `default`.
    pub fn with_default(default: V) -> Self {
        Self {
            default,
            data: Vec::new(),
            phantom: PhantomData,
        }
    }

    /// Number of slots materialized so far (not the number of written keys).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if no slot has been materialized yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the value for `key`, or the default when it was never written.
    #[inline]
    pub fn get(&self, key: K) -> &V {
        self.data.get(key.index()).unwrap_or(&self.default)
    }

    /// Iterate over all materialized `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.data.iter().enumerate().map(|(i, v)| (K::new(i), v))
    }
}

impl<K, V> Default for SideTable<K, V>
where
    K: EntityRef,
    V: Clone + Default,
{
    fn default() -> Self {
        Self::with_default(V::default())
    }
}

impl<K, V> Index<K> for SideTable<K, V>
where
    K: EntityRef,
    V: Clone,
{
    type Output = V;

    #[inline]
    fn index(&self, key: K) -> &V {
        self.get(key)
    }
}

impl<K, V> IndexMut<K> for SideTable<K, V>
where
    K: EntityRef,
    V: Clone,
{
    #[inline]
    fn index_mut(&mut self, key: K) -> &mut V {
        let index = key.index();
        if index >= self.data.len() {
            self.data.resize(index + 1, self.default.clone());
        }
        &mut self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_impl;

    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct Key(u32);
    entity_impl!(Key, "key");

    #[test]
    fn untouched_keys_read_as_default() {
        let table: SideTable<Key, Option<u32>> = SideTable::default();
        assert_eq!(table[Key::new(0)], None);
        assert_eq!(table[Key::new(100)], None);
        assert!(table.is_empty());

        let table: SideTable<Key, i32> = SideTable::with_default(-1);
        assert_eq!(*table.get(Key::new(5)), -1);
    }

    #[test]
    fn writing_grows_the_table() {
        let mut table: SideTable<Key, u8> = SideTable::default();
        table[Key::new(2)] = 20;
        table[Key::new(0)] = 10;

        assert_eq!(table.len(), 3);
        assert_eq!(table[Key::new(0)], 10);
        assert_eq!(table[Key::new(1)], 0);
        assert_eq!(table[Key::new(2)], 20);
    }

    #[test]
    fn iteration_covers_materialized_slots() {
        let mut table: SideTable<Key, char> = SideTable::with_default('-');
        table[Key::new(1)] = 'b';
        let items: Vec<_> = table.iter().map(|(k, v)| (k.index(), *v)).collect();
        assert_eq!(items, vec![(0, '-'), (1, 'b')]);
    }
}
