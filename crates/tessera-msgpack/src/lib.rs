//! MessagePack codec for tessera patches.
//!
//! A patch encodes as a raw concatenation of MessagePack values — one
//! unsigned integer tag per opcode followed by its parameters — with no
//! outer array framing, so the stream can be embedded in larger MessagePack
//! structures and decoded until it runs dry.
//!
//! Only the value repertoire the document model needs is implemented:
//! null, booleans, integers, floats, strings, arrays and string-keyed maps.

mod reader;
mod writer;

pub use reader::MsgpackReader;
pub use writer::MsgpackWriter;

use tessera::{read_patch, write_patch, CodecError, Patch};

/// Encode a patch as MessagePack bytes.
pub fn marshal(patch: &Patch) -> Result<Vec<u8>, CodecError> {
    let mut writer = MsgpackWriter::new();
    write_patch(&mut writer, patch)?;
    Ok(writer.into_bytes())
}

/// Decode a patch from MessagePack bytes.
pub fn unmarshal(data: &[u8]) -> Result<Patch, CodecError> {
    let mut reader = MsgpackReader::new(data);
    read_patch(&mut reader)
}
