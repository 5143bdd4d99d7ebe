//! Byte-level MessagePack encoder bound to the patch `Writer` visitor.

use serde_json::Value;
use tessera::{CodecError, Writer};

pub struct MsgpackWriter {
    buf: Vec<u8>,
}

impl MsgpackWriter {
    pub fn new() -> MsgpackWriter {
        MsgpackWriter { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn uint(&mut self, v: u64) {
        if v <= 0x7f {
            self.buf.push(v as u8);
        } else if v <= 0xff {
            self.buf.push(0xcc);
            self.buf.push(v as u8);
        } else if v <= 0xffff {
            self.buf.push(0xcd);
            self.buf.extend_from_slice(&(v as u16).to_be_bytes());
        } else if v <= 0xffff_ffff {
            self.buf.push(0xce);
            self.buf.extend_from_slice(&(v as u32).to_be_bytes());
        } else {
            self.buf.push(0xcf);
            self.buf.extend_from_slice(&v.to_be_bytes());
        }
    }

    fn int(&mut self, v: i64) {
        if v >= 0 {
            self.uint(v as u64);
        } else if v >= -0x20 {
            self.buf.push(v as u8);
        } else if v >= -0x80 {
            self.buf.push(0xd0);
            self.buf.push(v as u8);
        } else if v >= -0x8000 {
            self.buf.push(0xd1);
            self.buf.extend_from_slice(&(v as i16).to_be_bytes());
        } else if v >= -0x8000_0000 {
            self.buf.push(0xd2);
            self.buf.extend_from_slice(&(v as i32).to_be_bytes());
        } else {
            self.buf.push(0xd3);
            self.buf.extend_from_slice(&v.to_be_bytes());
        }
    }

    fn float(&mut self, v: f64) {
        self.buf.push(0xcb);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn str_header(&mut self, len: usize) {
        if len <= 0x1f {
            self.buf.push(0xa0 | len as u8);
        } else if len <= 0xff {
            self.buf.push(0xd9);
            self.buf.push(len as u8);
        } else if len <= 0xffff {
            self.buf.push(0xda);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            self.buf.push(0xdb);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
    }

    fn str(&mut self, s: &str) {
        self.str_header(s.len());
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn array_header(&mut self, len: usize) {
        if len <= 0xf {
            self.buf.push(0x90 | len as u8);
        } else if len <= 0xffff {
            self.buf.push(0xdc);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            self.buf.push(0xdd);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
    }

    fn map_header(&mut self, len: usize) {
        if len <= 0xf {
            self.buf.push(0x80 | len as u8);
        } else if len <= 0xffff {
            self.buf.push(0xde);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            self.buf.push(0xdf);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
    }

    fn value(&mut self, v: &Value) -> Result<(), CodecError> {
        match v {
            Value::Null => self.buf.push(0xc0),
            Value::Bool(false) => self.buf.push(0xc2),
            Value::Bool(true) => self.buf.push(0xc3),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.int(i);
                } else if let Some(u) = n.as_u64() {
                    self.uint(u);
                } else if let Some(f) = n.as_f64() {
                    self.float(f);
                } else {
                    return Err(CodecError::Expected("representable number"));
                }
            }
            Value::String(s) => self.str(s),
            Value::Array(values) => {
                self.array_header(values.len());
                for item in values {
                    self.value(item)?;
                }
            }
            Value::Object(map) => {
                self.map_header(map.len());
                for (key, item) in map {
                    self.str(key);
                    self.value(item)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for MsgpackWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for MsgpackWriter {
    fn write_u8(&mut self, v: u8) -> Result<(), CodecError> {
        self.uint(v as u64);
        Ok(())
    }

    fn write_uint(&mut self, v: usize) -> Result<(), CodecError> {
        self.uint(v as u64);
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<(), CodecError> {
        self.str(v);
        Ok(())
    }

    fn write_value(&mut self, v: &Value) -> Result<(), CodecError> {
        self.value(v)
    }
}
