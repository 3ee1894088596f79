use std::marker::PhantomData;

use crate::EntityRef;

/// An append-only record store handing out dense handles.
///
/// `Arena` owns every record allocated into it for as long as it lives.
/// There is no way to free a single record: handles stay valid, and keep
/// naming the same record, until the arena itself is dropped.
///
/// Only one arena should allocate a given handle type, otherwise two
/// different records could end up sharing a handle value.
pub struct Arena<K: EntityRef, V> {
    data: Vec<V>,
    phantom: PhantomData<K>,
}

impl<K: EntityRef, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            phantom: PhantomData,
        }
    }
}

impl<K: EntityRef, V> Arena<K, V> {
    /// Creates a new, empty arena.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new arena able to hold `capacity` records before growing.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            phantom: PhantomData,
            data: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of records allocated so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been allocated yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the handle the next call to [`Arena::alloc`] will return.
    #[inline]
    pub fn next_key(&self) -> K {
        K::new(self.data.len())
    }

    /// Moves `value` into the arena and returns its handle.
    ///
    /// Handles are handed out in strictly increasing index order.
    #[inline]
    pub fn alloc(&mut self, value: V) -> K {
        let k = self.next_key();
        self.data.push(value);
        k
    }

    /// Returns the record behind `key`, or `None` if the handle was not
    /// allocated by this arena.
    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.data.get(key.index())
    }

    /// Mutable counterpart of [`Arena::get`].
    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.data.get_mut(key.index())
    }

    /// Iterates over the records in allocation order.
    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.data.iter()
    }

    /// Iterates over `(handle, record)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.data.iter().enumerate().map(|(i, v)| (K::new(i), v))
    }
}

impl<K: EntityRef, V> std::ops::Index<K> for Arena<K, V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` was not allocated by this arena.
    #[inline]
    fn index(&self, key: K) -> &Self::Output {
        &self.data[key.index()]
    }
}

impl<K: EntityRef, V> std::ops::IndexMut<K> for Arena<K, V> {
    #[inline]
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        &mut self.data[key.index()]
    }
}
