//! tessera — compact structural diffs for JSON-like documents.
//!
//! Given two documents, [`diff`] produces a patch — a small program for a
//! stack-based virtual machine — such that [`apply_patch`] rewrites the
//! first document into the second. The differ indexes every sub-tree of the
//! left document by content hash, so unchanged regions are copied by
//! reference instead of re-encoded: the patch for a small edit to a large
//! document stays proportional to the edit.
//!
//! ```
//! use serde_json::json;
//!
//! let left = json!({"name": "Bob", "age": 10});
//! let right = json!({"name": "Bob", "age": 15});
//!
//! let patch = tessera::diff(&left, &right)?;
//! assert_eq!(tessera::apply_patch(&left, &patch), right);
//! # Ok::<(), tessera::DiffError>(())
//! ```
//!
//! Patches serialize to JSON through `serde` (a flat heterogeneous array)
//! and to other encodings through the [`Reader`] / [`Writer`] visitors; see
//! the `tessera-msgpack` crate for the MessagePack binding.
//!
//! Supported values are null, booleans, numbers (through their `f64`
//! projection), strings, objects and arrays. Anything else can be folded
//! into that repertoire with a convert function, see [`Options`].

mod apply;
mod diff;
mod error;
mod exact;
mod options;

pub mod cli;
pub mod hash;
pub mod patch;

pub use apply::apply_patch;
pub use diff::{diff, double_diff};
pub use error::DiffError;
pub use exact::ExactDiffReporter;
pub use options::{ConvertFn, Options};
pub use patch::{
    patch_from_json, patch_to_json, read_op, read_patch, write_op, write_patch, CodecError, Op,
    Patch, Reader, Writer,
};
