//! Byte-level MessagePack decoder bound to the patch `Reader` visitor.

use serde_json::{Map, Number, Value};
use tessera::{CodecError, Reader};

pub struct MsgpackReader<'b> {
    data: &'b [u8],
    pos: usize,
}

impl<'b> MsgpackReader<'b> {
    pub fn new(data: &'b [u8]) -> MsgpackReader<'b> {
        MsgpackReader { data, pos: 0 }
    }

    /// Lead byte of the next value; `Eof` only at the clean end of the
    /// stream.
    fn lead(&mut self) -> Result<u8, CodecError> {
        if self.pos >= self.data.len() {
            return Err(CodecError::Eof);
        }
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'b [u8], CodecError> {
        if self.pos + n > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn be_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn be_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn be_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn uint_body(&mut self, lead: u8) -> Result<u64, CodecError> {
        match lead {
            0x00..=0x7f => Ok(lead as u64),
            0xcc => Ok(self.take(1)?[0] as u64),
            0xcd => Ok(self.be_u16()? as u64),
            0xce => Ok(self.be_u32()? as u64),
            0xcf => self.be_u64(),
            _ => Err(CodecError::Expected("unsigned integer")),
        }
    }

    fn str_body(&mut self, lead: u8) -> Result<String, CodecError> {
        let len = match lead {
            0xa0..=0xbf => (lead & 0x1f) as usize,
            0xd9 => self.take(1)?[0] as usize,
            0xda => self.be_u16()? as usize,
            0xdb => self.be_u32()? as usize,
            _ => return Err(CodecError::Expected("string")),
        };
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| CodecError::InvalidUtf8)
    }

    fn value_body(&mut self, lead: u8) -> Result<Value, CodecError> {
        match lead {
            0xc0 => Ok(Value::Null),
            0xc2 => Ok(Value::Bool(false)),
            0xc3 => Ok(Value::Bool(true)),
            0x00..=0x7f => Ok(Value::from(lead as i64)),
            0xe0..=0xff => Ok(Value::from(lead as i8 as i64)),
            0xcc | 0xcd | 0xce | 0xcf => Ok(Value::from(self.uint_body(lead)?)),
            0xd0 => Ok(Value::from(self.take(1)?[0] as i8 as i64)),
            0xd1 => Ok(Value::from(self.be_u16()? as i16 as i64)),
            0xd2 => Ok(Value::from(self.be_u32()? as i32 as i64)),
            0xd3 => Ok(Value::from(self.be_u64()? as i64)),
            0xca => {
                let f = f32::from_be_bytes(self.take(4)?.try_into().unwrap());
                Number::from_f64(f as f64)
                    .map(Value::Number)
                    .ok_or(CodecError::Expected("finite number"))
            }
            0xcb => {
                let f = f64::from_be_bytes(self.take(8)?.try_into().unwrap());
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or(CodecError::Expected("finite number"))
            }
            0xa0..=0xbf | 0xd9 | 0xda | 0xdb => Ok(Value::String(self.str_body(lead)?)),
            0x90..=0x9f => self.array_body((lead & 0xf) as usize),
            0xdc => {
                let len = self.be_u16()? as usize;
                self.array_body(len)
            }
            0xdd => {
                let len = self.be_u32()? as usize;
                self.array_body(len)
            }
            0x80..=0x8f => self.map_body((lead & 0xf) as usize),
            0xde => {
                let len = self.be_u16()? as usize;
                self.map_body(len)
            }
            0xdf => {
                let len = self.be_u32()? as usize;
                self.map_body(len)
            }
            _ => Err(CodecError::Expected("value")),
        }
    }

    fn array_body(&mut self, len: usize) -> Result<Value, CodecError> {
        let mut values = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            let lead = self.lead().map_err(|_| CodecError::UnexpectedEof)?;
            values.push(self.value_body(lead)?);
        }
        Ok(Value::Array(values))
    }

    fn map_body(&mut self, len: usize) -> Result<Value, CodecError> {
        let mut map = Map::new();
        for _ in 0..len {
            let lead = self.lead().map_err(|_| CodecError::UnexpectedEof)?;
            let key = self.str_body(lead)?;
            let lead = self.lead().map_err(|_| CodecError::UnexpectedEof)?;
            let value = self.value_body(lead)?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

impl Reader for MsgpackReader<'_> {
    fn read_u8(&mut self) -> Result<u8, CodecError> {
        let v = self.read_uint()?;
        u8::try_from(v).map_err(|_| CodecError::Expected("u8"))
    }

    fn read_uint(&mut self) -> Result<usize, CodecError> {
        let lead = self.lead()?;
        let v = self.uint_body(lead)?;
        usize::try_from(v).map_err(|_| CodecError::Expected("unsigned integer"))
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        let lead = self.lead()?;
        self.str_body(lead)
    }

    fn read_value(&mut self) -> Result<Value, CodecError> {
        let lead = self.lead()?;
        self.value_body(lead)
    }
}
