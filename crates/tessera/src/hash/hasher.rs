//! Canonical per-node hashing.
//!
//! Every value is digested from a tagged canonical form: a one-byte type tag
//! followed by the value's contents. Map keys are folded in ascending key
//! order, so the digest is independent of insertion order; numbers are folded
//! as their IEEE-754 big-endian bit pattern, so `+0.0` and `-0.0` (and
//! distinct NaN payloads) hash differently.
//!
//! Two values with equal digests are treated as equal by the differ.

use sha2::{Digest, Sha256};

const TAG_STRING: u8 = 0;
const TAG_FLOAT: u8 = 1;
const TAG_MAP: u8 = 2;
const TAG_SEQUENCE: u8 = 3;
const TAG_TRUE: u8 = 4;
const TAG_FALSE: u8 = 5;
const TAG_NULL: u8 = 6;

/// A fixed-width content digest (SHA-256).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const ZERO: Hash = Hash([0; 32]);

    /// Fold another digest into this one, byte-wise.
    pub fn xor(&mut self, other: &Hash) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a ^= b;
        }
    }

    /// Like [`Hash::xor`], but by value.
    pub fn xored(mut self, other: &Hash) -> Hash {
        self.xor(other);
        self
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

fn digest_for(tag: u8) -> Sha256 {
    let mut digest = Sha256::new();
    digest.update([tag]);
    digest
}

fn finish(digest: Sha256) -> Hash {
    Hash(digest.finalize().into())
}

pub fn hash_null() -> Hash {
    finish(digest_for(TAG_NULL))
}

pub fn hash_bool(b: bool) -> Hash {
    finish(digest_for(if b { TAG_TRUE } else { TAG_FALSE }))
}

pub fn hash_float(f: f64) -> Hash {
    let mut digest = digest_for(TAG_FLOAT);
    digest.update(f.to_bits().to_be_bytes());
    finish(digest)
}

pub fn hash_string(s: &str) -> Hash {
    let mut digest = digest_for(TAG_STRING);
    digest.update(s.as_bytes());
    finish(digest)
}

/// Incremental hasher for maps. Fields must be written in ascending key
/// order; the caller is responsible for sorting.
pub struct MapHasher {
    digest: Sha256,
}

impl MapHasher {
    pub fn new() -> Self {
        Self {
            digest: digest_for(TAG_MAP),
        }
    }

    pub fn write_field(&mut self, key: &str, value: &Hash) {
        self.digest.update([TAG_STRING]);
        self.digest.update(key.as_bytes());
        self.digest.update(value.as_bytes());
    }

    pub fn sum(self) -> Hash {
        finish(self.digest)
    }
}

impl Default for MapHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Incremental hasher for sequences. Elements are written in order.
pub struct SeqHasher {
    digest: Sha256,
}

impl SeqHasher {
    pub fn new() -> Self {
        Self {
            digest: digest_for(TAG_SEQUENCE),
        }
    }

    pub fn write_element(&mut self, value: &Hash) {
        self.digest.update(value.as_bytes());
    }

    pub fn sum(self) -> Hash {
        finish(self.digest)
    }
}

impl Default for SeqHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_distinct() {
        let hashes = [hash_null(), hash_bool(true), hash_bool(false)];
        assert_ne!(hashes[0], hashes[1]);
        assert_ne!(hashes[0], hashes[2]);
        assert_ne!(hashes[1], hashes[2]);
    }

    #[test]
    fn hashing_is_deterministic() {
        assert_eq!(hash_string("hello"), hash_string("hello"));
        assert_eq!(hash_float(1.5), hash_float(1.5));
        assert_eq!(hash_null(), hash_null());
    }

    #[test]
    fn float_uses_bit_pattern() {
        assert_ne!(hash_float(0.0), hash_float(-0.0));
        assert_eq!(hash_float(10.0), hash_float(10.0));
        assert_ne!(hash_float(1.0), hash_float(2.0));
    }

    #[test]
    fn string_differs_from_float_tag() {
        // A string of eight NUL bytes must not collide with a float.
        assert_ne!(hash_string("\0\0\0\0\0\0\0\0"), hash_float(0.0));
    }

    #[test]
    fn map_hash_depends_on_fields() {
        let child = hash_string("v");
        let mut a = MapHasher::new();
        a.write_field("x", &child);
        let mut b = MapHasher::new();
        b.write_field("y", &child);
        assert_ne!(a.sum(), b.sum());
    }

    #[test]
    fn empty_map_differs_from_empty_sequence() {
        assert_ne!(MapHasher::new().sum(), SeqHasher::new().sum());
    }

    #[test]
    fn xor_is_self_inverse() {
        let a = hash_string("a");
        let b = hash_string("b");
        let mut x = a;
        x.xor(&b);
        assert!(!x.is_zero());
        x.xor(&b);
        assert_eq!(x, a);
        assert!(a.xored(&a).is_zero());
    }
}
