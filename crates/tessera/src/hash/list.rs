//! Flat hash-list representation of a document tree.
//!
//! A [`HashList`] stores one entry per node of a document, in a depth-first
//! order where children follow their parent and same-level entries are
//! chained through `sibling` links. Entry 0 is the root. Each entry carries
//! the node's content hash, letting the differ find equivalent sub-trees in
//! constant time.

use serde_json::Value;

use super::hasher::{hash_bool, hash_float, hash_null, hash_string, Hash, MapHasher, SeqHasher};
use crate::error::DiffError;

/// Where an entry sits inside its parent: the ordinal position, and for map
/// children the key (`""` for sequence elements and the root).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    pub index: usize,
    pub key: &'a str,
}

/// One node of an indexed document.
#[derive(Debug)]
pub struct HashEntry<'a> {
    pub hash: Hash,
    /// XOR of the direct children's hashes; zero for everything but
    /// non-empty maps. Used by the near-miss index.
    pub xor_hash: Hash,
    pub value: &'a Value,
    /// Rough byte cost of re-encoding this value, recursively.
    pub size: usize,
    pub parent: Option<usize>,
    pub sibling: Option<usize>,
    pub reference: Reference<'a>,
}

impl HashEntry<'_> {
    pub fn is_non_empty_map(&self) -> bool {
        matches!(self.value, Value::Object(m) if !m.is_empty())
    }

    pub fn is_non_empty_slice(&self) -> bool {
        matches!(self.value, Value::Array(a) if !a.is_empty())
    }
}

pub struct HashList<'a> {
    pub entries: Vec<HashEntry<'a>>,
}

impl<'a> HashList<'a> {
    /// Index a document. Map children are visited in ascending key order, so
    /// entry ordinals line up with the sorted field list the apply VM uses.
    pub fn build(doc: &'a Value) -> Result<HashList<'a>, DiffError> {
        let mut list = HashList {
            entries: Vec::new(),
        };
        list.process(None, Reference { index: 0, key: "" }, doc)?;
        Ok(list)
    }

    fn process(
        &mut self,
        parent: Option<usize>,
        reference: Reference<'a>,
        value: &'a Value,
    ) -> Result<(Hash, usize), DiffError> {
        let current = self.entries.len();
        self.entries.push(HashEntry {
            hash: Hash::ZERO,
            xor_hash: Hash::ZERO,
            value,
            size: 0,
            parent,
            sibling: None,
            reference,
        });

        let mut xor_hash = Hash::ZERO;

        let (hash, size) = match value {
            Value::Null => (hash_null(), 1),
            Value::Bool(b) => (hash_bool(*b), 1),
            Value::Number(n) => {
                let f = n
                    .as_f64()
                    .ok_or(DiffError::UnsupportedType("number outside f64 range"))?;
                (hash_float(f), 8)
            }
            Value::String(s) => (hash_string(s), s.len() + 1),
            Value::Object(map) => {
                let mut keys: Vec<&'a String> = map.keys().collect();
                keys.sort_unstable();

                let mut hasher = MapHasher::new();
                let mut size = 0;
                let mut prev: Option<usize> = None;

                for (idx, key) in keys.into_iter().enumerate() {
                    let entry_idx = self.entries.len();
                    let (child_hash, child_size) = self.process(
                        Some(current),
                        Reference {
                            index: idx,
                            key: key.as_str(),
                        },
                        &map[key.as_str()],
                    )?;

                    size += key.len() + child_size + 1;

                    if let Some(p) = prev {
                        self.entries[p].sibling = Some(entry_idx);
                    }
                    prev = Some(entry_idx);

                    hasher.write_field(key, &child_hash);
                    xor_hash.xor(&child_hash);
                }

                (hasher.sum(), size)
            }
            Value::Array(values) => {
                let mut hasher = SeqHasher::new();
                let mut size = 0;
                let mut prev: Option<usize> = None;

                for (idx, value) in values.iter().enumerate() {
                    let entry_idx = self.entries.len();
                    let (child_hash, child_size) =
                        self.process(Some(current), Reference { index: idx, key: "" }, value)?;

                    size += child_size + 1;

                    if let Some(p) = prev {
                        self.entries[p].sibling = Some(entry_idx);
                    }
                    prev = Some(entry_idx);

                    hasher.write_element(&child_hash);
                }

                (hasher.sum(), size)
            }
        };

        let entry = &mut self.entries[current];
        entry.hash = hash;
        entry.size = size;
        entry.xor_hash = xor_hash;

        Ok((hash, size))
    }

    /// Iterate the entry indices of a container's direct children.
    pub fn children(&self, idx: usize) -> Children<'_, 'a> {
        let has_children = match self.entries[idx].value {
            Value::Object(m) => !m.is_empty(),
            Value::Array(a) => !a.is_empty(),
            _ => false,
        };
        Children {
            list: self,
            next: has_children.then_some(idx + 1),
        }
    }

    /// Find the direct child of a map entry with the given key.
    pub fn child_by_key(&self, idx: usize, key: &str) -> Option<usize> {
        for child in self.children(idx) {
            let child_key = self.entries[child].reference.key;
            if child_key == key {
                return Some(child);
            }
            if child_key > key {
                break;
            }
        }
        None
    }
}

pub struct Children<'l, 'a> {
    list: &'l HashList<'a>,
    next: Option<usize>,
}

impl Iterator for Children<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let idx = self.next?;
        self.next = self.list.entries[idx].sibling;
        Some(idx)
    }
}
