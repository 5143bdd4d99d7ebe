//! Default JSON codec for patches.
//!
//! The wire form is a single heterogeneous array: every opcode contributes
//! its tag followed by its parameters, flattened —
//! `[tag, param, param, tag, param, ...]`. The codec is exposed both as
//! plain functions and as `Serialize`/`Deserialize` on [`Patch`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use super::format::{read_patch, write_patch, CodecError, Reader, Writer};
use super::ops::Patch;

struct JsonWriter {
    items: Vec<Value>,
}

impl Writer for JsonWriter {
    fn write_u8(&mut self, v: u8) -> Result<(), CodecError> {
        self.items.push(json!(v));
        Ok(())
    }

    fn write_uint(&mut self, v: usize) -> Result<(), CodecError> {
        self.items.push(json!(v));
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<(), CodecError> {
        self.items.push(json!(v));
        Ok(())
    }

    fn write_value(&mut self, v: &Value) -> Result<(), CodecError> {
        self.items.push(v.clone());
        Ok(())
    }
}

struct JsonReader {
    items: std::vec::IntoIter<Value>,
}

impl JsonReader {
    fn next(&mut self) -> Result<Value, CodecError> {
        self.items.next().ok_or(CodecError::Eof)
    }
}

impl Reader for JsonReader {
    fn read_u8(&mut self) -> Result<u8, CodecError> {
        let v = self.read_uint()?;
        u8::try_from(v).map_err(|_| CodecError::Expected("u8"))
    }

    fn read_uint(&mut self) -> Result<usize, CodecError> {
        match self.next()? {
            Value::Number(n) => n
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .ok_or(CodecError::Expected("unsigned integer")),
            _ => Err(CodecError::Expected("unsigned integer")),
        }
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        match self.next()? {
            Value::String(s) => Ok(s),
            _ => Err(CodecError::Expected("string")),
        }
    }

    fn read_value(&mut self) -> Result<Value, CodecError> {
        self.next()
    }
}

/// Encode a patch as its JSON array form.
pub fn patch_to_json(patch: &Patch) -> Result<Value, CodecError> {
    let mut writer = JsonWriter { items: Vec::new() };
    write_patch(&mut writer, patch)?;
    Ok(Value::Array(writer.items))
}

/// Decode a patch from its JSON array form.
pub fn patch_from_json(value: Value) -> Result<Patch, CodecError> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Err(CodecError::Expected("array")),
    };
    let mut reader = JsonReader {
        items: items.into_iter(),
    };
    read_patch(&mut reader)
}

impl Serialize for Patch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = patch_to_json(self).map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Patch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Patch, D::Error> {
        let value = Value::deserialize(deserializer)?;
        patch_from_json(value).map_err(serde::de::Error::custom)
    }
}
