//! Inverted index over a hash list.
//!
//! `by_hash` maps a content hash to every entry with that hash. `by_xor` is
//! the near-miss index for maps: a map entry `m` is filed under
//! `m.xor_hash ^ child.hash` for each of its children, so looking up
//! `target.xor_hash ^ target_child.hash` yields the maps that become the
//! target by replacing exactly one field.

use std::collections::HashMap;

use super::hasher::Hash;
use super::list::HashList;

pub struct HashIndex {
    by_hash: HashMap<Hash, Vec<usize>>,
    by_xor: HashMap<Hash, Vec<usize>>,
}

impl HashIndex {
    pub fn new(list: &HashList) -> HashIndex {
        let mut by_hash: HashMap<Hash, Vec<usize>> = HashMap::new();
        let mut by_xor: HashMap<Hash, Vec<usize>> = HashMap::new();

        for (idx, entry) in list.entries.iter().enumerate() {
            by_hash.entry(entry.hash).or_default().push(idx);

            if entry.xor_hash.is_zero() {
                continue;
            }
            for child in list.children(idx) {
                let key = entry.xor_hash.xored(&list.entries[child].hash);
                let bucket = by_xor.entry(key).or_default();
                // Two children with the same hash would file the map twice
                // under the same key.
                if bucket.last() == Some(&idx) {
                    continue;
                }
                bucket.push(idx);
            }
        }

        HashIndex { by_hash, by_xor }
    }

    /// Entry indices whose content hash equals `hash`, in document order.
    pub fn lookup(&self, hash: &Hash) -> &[usize] {
        self.by_hash.get(hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Map entry indices filed under the given near-miss key.
    pub fn lookup_xor(&self, key: &Hash) -> &[usize] {
        self.by_xor.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
