//! Byte-cost estimation for ranking competing patches.
//!
//! The weights approximate a compact binary encoding: one byte per opcode
//! tag, one per small integer, `1 + len` per key or string, and a recursive
//! estimate for embedded values. They only have to rank patches
//! consistently, not predict the serialized size exactly.

use serde_json::Value;

use crate::patch::Op;

pub(crate) fn value_size(value: &Value) -> usize {
    match value {
        Value::Null | Value::Bool(_) => 1,
        Value::Number(_) => 8,
        Value::String(s) => s.len() + 1,
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| key.len() + value_size(child) + 1)
            .sum(),
        Value::Array(values) => values.iter().map(|child| value_size(child) + 1).sum(),
    }
}

fn op_cost(op: &Op) -> usize {
    match op {
        Op::Value { value } => 1 + 1 + value_size(value),
        Op::Copy
        | Op::Blank
        | Op::ReturnIntoArray
        | Op::ReturnIntoObjectSameKey
        | Op::Pop
        | Op::ReturnIntoObjectSameKeyPop
        | Op::ReturnIntoArrayPop => 1,
        Op::ReturnIntoObject { key } | Op::ReturnIntoObjectPop { key } => 1 + 1 + key.len(),
        Op::PushField { .. }
        | Op::PushElement { .. }
        | Op::PushParent { .. }
        | Op::PushFieldCopy { .. }
        | Op::PushFieldBlank { .. }
        | Op::PushElementCopy { .. }
        | Op::PushElementBlank { .. }
        | Op::ObjectCopyField { .. }
        | Op::ObjectDeleteField { .. } => 1 + 1,
        Op::ObjectSetFieldValue { key, value } => 1 + (1 + value_size(value)) + (1 + key.len()),
        Op::ArrayAppendValue { value } => 1 + 1 + value_size(value),
        Op::ArrayAppendSlice { .. } | Op::StringAppendSlice { .. } => 1 + 1 + 1,
        Op::StringAppendString { string } => 1 + 1 + string.len(),
    }
}

pub(crate) fn patch_cost(ops: &[Op]) -> usize {
    ops.iter().map(op_cost).sum()
}
