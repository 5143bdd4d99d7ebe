//! Content-addressed view of a document: canonical hashing, the flat
//! hash-list representation, and the inverted hash index the differ
//! searches for reusable sub-trees.

mod hasher;
mod index;
mod list;

pub use hasher::{hash_bool, hash_float, hash_null, hash_string, Hash, MapHasher, SeqHasher};
pub use index::HashIndex;
pub use list::{HashEntry, HashList, Reference};
