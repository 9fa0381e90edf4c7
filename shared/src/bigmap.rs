use std::{
    collections::{hash_map::Iter, hash_map::IterMut, HashMap},
    hash::Hash,
    marker::PhantomData,
};

pub trait BigMapKey: Clone + Copy + Eq + PartialEq + Hash {
    fn to_u64(&self) -> u64;
    fn from_u64(value: u64) -> Self;
}

/// A map which hands out its own monotonically increasing keys.
/// Keys are never reused for the lifetime of the map.
pub struct BigMap<K: BigMapKey, V> {
    inner: HashMap<u64, V>,
    current_index: u64,
    phantom_k: PhantomData<K>,
}

impl<K: BigMapKey, V> Default for BigMap<K, V> {
    fn default() -> Self {
        Self {
            inner: HashMap::new(),
            current_index: 0,
            phantom_k: PhantomData,
        }
    }
}

impl<K: BigMapKey, V> BigMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(&key.to_u64())
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(&key.to_u64())
    }

    pub fn insert(&mut self, value: V) -> K {
        let old_index = self.current_index;
        self.current_index = self.current_index.wrapping_add(1);

        self.inner.insert(old_index, value);

        K::from_u64(old_index)
    }

    /// Reserves the next key without inserting, useful when the value needs to know its own key
    pub fn next_key(&self) -> K {
        K::from_u64(self.current_index)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(&key.to_u64())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(&key.to_u64())
    }

    pub fn iter(&self) -> BigMapIter<'_, K, V> {
        BigMapIter {
            iter: self.inner.iter(),
            phantom_k: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> BigMapIterMut<'_, K, V> {
        BigMapIterMut {
            iter: self.inner.iter_mut(),
            phantom_k: PhantomData,
        }
    }

    pub fn keys(&self) -> Vec<K> {
        let mut keys: Vec<u64> = self.inner.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter().map(K::from_u64).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

pub struct BigMapIter<'a, K: BigMapKey, V> {
    iter: Iter<'a, u64, V>,
    phantom_k: PhantomData<K>,
}

impl<'a, K: BigMapKey, V> Iterator for BigMapIter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|(key, value)| (K::from_u64(*key), value))
    }
}

pub struct BigMapIterMut<'a, K: BigMapKey, V> {
    iter: IterMut<'a, u64, V>,
    phantom_k: PhantomData<K>,
}

impl<'a, K: BigMapKey, V> Iterator for BigMapIterMut<'a, K, V> {
    type Item = (K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|(key, value)| (K::from_u64(*key), value))
    }
}
