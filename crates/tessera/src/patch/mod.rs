//! The patch data type: an opcode program for the apply VM, plus the
//! serialization visitors and the default JSON codec.

mod format;
mod json;
mod ops;

pub use format::{read_op, read_patch, write_op, write_patch, CodecError, Reader, Writer};
pub use json::{patch_from_json, patch_to_json};
pub use ops::{Op, Patch};
