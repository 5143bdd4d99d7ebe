//! Wire framing for patches.
//!
//! A patch serializes as a flat stream: one small-integer opcode tag followed
//! by that opcode's typed parameters, repeated until the stream ends. The
//! concrete encoding (JSON array, MessagePack, ...) is supplied by a
//! [`Reader`] / [`Writer`] pair; this module owns the tag numbering and the
//! per-opcode parameter layout, so every codec agrees on framing.
//!
//! Tag values are explicit constants and must never be renumbered; unknown
//! tags are a decode error.

use serde_json::Value;
use thiserror::Error;

use super::ops::{Op, Patch};

pub const CODE_VALUE: u8 = 0;
pub const CODE_COPY: u8 = 1;
pub const CODE_BLANK: u8 = 2;
pub const CODE_RETURN_INTO_ARRAY: u8 = 3;
pub const CODE_RETURN_INTO_OBJECT: u8 = 4;
pub const CODE_RETURN_INTO_OBJECT_SAME_KEY: u8 = 5;
pub const CODE_PUSH_FIELD: u8 = 6;
pub const CODE_PUSH_ELEMENT: u8 = 7;
pub const CODE_PUSH_PARENT: u8 = 8;
pub const CODE_POP: u8 = 9;
pub const CODE_PUSH_FIELD_COPY: u8 = 10;
pub const CODE_PUSH_FIELD_BLANK: u8 = 11;
pub const CODE_PUSH_ELEMENT_COPY: u8 = 12;
pub const CODE_PUSH_ELEMENT_BLANK: u8 = 13;
pub const CODE_RETURN_INTO_OBJECT_POP: u8 = 14;
pub const CODE_RETURN_INTO_OBJECT_SAME_KEY_POP: u8 = 15;
pub const CODE_RETURN_INTO_ARRAY_POP: u8 = 16;
pub const CODE_OBJECT_SET_FIELD_VALUE: u8 = 17;
pub const CODE_OBJECT_COPY_FIELD: u8 = 18;
pub const CODE_OBJECT_DELETE_FIELD: u8 = 19;
pub const CODE_ARRAY_APPEND_VALUE: u8 = 20;
pub const CODE_ARRAY_APPEND_SLICE: u8 = 21;
pub const CODE_STRING_APPEND_STRING: u8 = 22;
pub const CODE_STRING_APPEND_SLICE: u8 = 23;

/// Errors raised by patch serialization and deserialization.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Clean end of the stream, reported at an opcode boundary.
    #[error("end of stream")]
    Eof,
    /// The stream ended in the middle of an opcode's parameters.
    #[error("unexpected end of stream")]
    UnexpectedEof,
    #[error("unknown opcode tag: {0}")]
    UnknownOpcode(u8),
    #[error("expected {0}")]
    Expected(&'static str),
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serialization sink for one patch encoding.
pub trait Writer {
    fn write_u8(&mut self, v: u8) -> Result<(), CodecError>;
    fn write_uint(&mut self, v: usize) -> Result<(), CodecError>;
    fn write_string(&mut self, v: &str) -> Result<(), CodecError>;
    fn write_value(&mut self, v: &Value) -> Result<(), CodecError>;
}

/// Serialization source for one patch encoding.
///
/// Every read method reports [`CodecError::Eof`] when invoked at the clean
/// end of the stream; [`read_op`] turns that into [`CodecError::UnexpectedEof`]
/// everywhere except the opcode-tag position.
pub trait Reader {
    fn read_u8(&mut self) -> Result<u8, CodecError>;
    fn read_uint(&mut self) -> Result<usize, CodecError>;
    fn read_string(&mut self) -> Result<String, CodecError>;
    fn read_value(&mut self) -> Result<Value, CodecError>;
}

/// Write a single opcode: tag, then parameters.
pub fn write_op(w: &mut dyn Writer, op: &Op) -> Result<(), CodecError> {
    match op {
        Op::Value { value } => {
            w.write_u8(CODE_VALUE)?;
            w.write_value(value)
        }
        Op::Copy => w.write_u8(CODE_COPY),
        Op::Blank => w.write_u8(CODE_BLANK),
        Op::ReturnIntoArray => w.write_u8(CODE_RETURN_INTO_ARRAY),
        Op::ReturnIntoObject { key } => {
            w.write_u8(CODE_RETURN_INTO_OBJECT)?;
            w.write_string(key)
        }
        Op::ReturnIntoObjectSameKey => w.write_u8(CODE_RETURN_INTO_OBJECT_SAME_KEY),
        Op::PushField { index } => {
            w.write_u8(CODE_PUSH_FIELD)?;
            w.write_uint(*index)
        }
        Op::PushElement { index } => {
            w.write_u8(CODE_PUSH_ELEMENT)?;
            w.write_uint(*index)
        }
        Op::PushParent { n } => {
            w.write_u8(CODE_PUSH_PARENT)?;
            w.write_uint(*n)
        }
        Op::Pop => w.write_u8(CODE_POP),
        Op::PushFieldCopy { index } => {
            w.write_u8(CODE_PUSH_FIELD_COPY)?;
            w.write_uint(*index)
        }
        Op::PushFieldBlank { index } => {
            w.write_u8(CODE_PUSH_FIELD_BLANK)?;
            w.write_uint(*index)
        }
        Op::PushElementCopy { index } => {
            w.write_u8(CODE_PUSH_ELEMENT_COPY)?;
            w.write_uint(*index)
        }
        Op::PushElementBlank { index } => {
            w.write_u8(CODE_PUSH_ELEMENT_BLANK)?;
            w.write_uint(*index)
        }
        Op::ReturnIntoObjectPop { key } => {
            w.write_u8(CODE_RETURN_INTO_OBJECT_POP)?;
            w.write_string(key)
        }
        Op::ReturnIntoObjectSameKeyPop => w.write_u8(CODE_RETURN_INTO_OBJECT_SAME_KEY_POP),
        Op::ReturnIntoArrayPop => w.write_u8(CODE_RETURN_INTO_ARRAY_POP),
        Op::ObjectSetFieldValue { key, value } => {
            w.write_u8(CODE_OBJECT_SET_FIELD_VALUE)?;
            // Value first, then key: the historical parameter order.
            w.write_value(value)?;
            w.write_string(key)
        }
        Op::ObjectCopyField { index } => {
            w.write_u8(CODE_OBJECT_COPY_FIELD)?;
            w.write_uint(*index)
        }
        Op::ObjectDeleteField { index } => {
            w.write_u8(CODE_OBJECT_DELETE_FIELD)?;
            w.write_uint(*index)
        }
        Op::ArrayAppendValue { value } => {
            w.write_u8(CODE_ARRAY_APPEND_VALUE)?;
            w.write_value(value)
        }
        Op::ArrayAppendSlice { left, right } => {
            w.write_u8(CODE_ARRAY_APPEND_SLICE)?;
            w.write_uint(*left)?;
            w.write_uint(*right)
        }
        Op::StringAppendString { string } => {
            w.write_u8(CODE_STRING_APPEND_STRING)?;
            w.write_string(string)
        }
        Op::StringAppendSlice { left, right } => {
            w.write_u8(CODE_STRING_APPEND_SLICE)?;
            w.write_uint(*left)?;
            w.write_uint(*right)
        }
    }
}

/// Read a single opcode. Returns [`CodecError::Eof`] only when the stream
/// ends exactly at an opcode boundary.
pub fn read_op(r: &mut dyn Reader) -> Result<Op, CodecError> {
    let tag = r.read_u8()?;
    read_params(r, tag).map_err(|err| match err {
        CodecError::Eof => CodecError::UnexpectedEof,
        other => other,
    })
}

fn read_params(r: &mut dyn Reader, tag: u8) -> Result<Op, CodecError> {
    let op = match tag {
        CODE_VALUE => Op::Value {
            value: r.read_value()?,
        },
        CODE_COPY => Op::Copy,
        CODE_BLANK => Op::Blank,
        CODE_RETURN_INTO_ARRAY => Op::ReturnIntoArray,
        CODE_RETURN_INTO_OBJECT => Op::ReturnIntoObject {
            key: r.read_string()?,
        },
        CODE_RETURN_INTO_OBJECT_SAME_KEY => Op::ReturnIntoObjectSameKey,
        CODE_PUSH_FIELD => Op::PushField {
            index: r.read_uint()?,
        },
        CODE_PUSH_ELEMENT => Op::PushElement {
            index: r.read_uint()?,
        },
        CODE_PUSH_PARENT => Op::PushParent { n: r.read_uint()? },
        CODE_POP => Op::Pop,
        CODE_PUSH_FIELD_COPY => Op::PushFieldCopy {
            index: r.read_uint()?,
        },
        CODE_PUSH_FIELD_BLANK => Op::PushFieldBlank {
            index: r.read_uint()?,
        },
        CODE_PUSH_ELEMENT_COPY => Op::PushElementCopy {
            index: r.read_uint()?,
        },
        CODE_PUSH_ELEMENT_BLANK => Op::PushElementBlank {
            index: r.read_uint()?,
        },
        CODE_RETURN_INTO_OBJECT_POP => Op::ReturnIntoObjectPop {
            key: r.read_string()?,
        },
        CODE_RETURN_INTO_OBJECT_SAME_KEY_POP => Op::ReturnIntoObjectSameKeyPop,
        CODE_RETURN_INTO_ARRAY_POP => Op::ReturnIntoArrayPop,
        CODE_OBJECT_SET_FIELD_VALUE => {
            let value = r.read_value()?;
            let key = r.read_string()?;
            Op::ObjectSetFieldValue { key, value }
        }
        CODE_OBJECT_COPY_FIELD => Op::ObjectCopyField {
            index: r.read_uint()?,
        },
        CODE_OBJECT_DELETE_FIELD => Op::ObjectDeleteField {
            index: r.read_uint()?,
        },
        CODE_ARRAY_APPEND_VALUE => Op::ArrayAppendValue {
            value: r.read_value()?,
        },
        CODE_ARRAY_APPEND_SLICE => Op::ArrayAppendSlice {
            left: r.read_uint()?,
            right: r.read_uint()?,
        },
        CODE_STRING_APPEND_STRING => Op::StringAppendString {
            string: r.read_string()?,
        },
        CODE_STRING_APPEND_SLICE => Op::StringAppendSlice {
            left: r.read_uint()?,
            right: r.read_uint()?,
        },
        other => return Err(CodecError::UnknownOpcode(other)),
    };
    Ok(op)
}

/// Write every opcode of a patch to a writer.
pub fn write_patch(w: &mut dyn Writer, patch: &Patch) -> Result<(), CodecError> {
    for op in patch {
        write_op(w, op)?;
    }
    Ok(())
}

/// Read opcodes until the stream's clean end.
pub fn read_patch(r: &mut dyn Reader) -> Result<Patch, CodecError> {
    let mut ops = Vec::new();
    loop {
        match read_op(r) {
            Ok(op) => ops.push(op),
            Err(CodecError::Eof) => break,
            Err(err) => return Err(err),
        }
    }
    Ok(Patch(ops))
}
