//! The patch virtual machine.
//!
//! Execution runs over two stacks. The *input* stack holds positions inside
//! the original document, each frame carrying the value, the key it lives
//! under in its parent, and a lazily-built list of the value's fields sorted
//! by key (ordinals in `PushField`-style opcodes address this list). The
//! *output* stack holds values under construction: either an untouched
//! `Source` pointer into the original document, or a writable builder that a
//! `Source` is promoted into on first mutation.
//!
//! When the program ends, the top output frame materializes into the result.

use serde_json::{Map, Value};

use crate::patch::{Op, Patch};

/// Apply a patch to a document, producing the patched document.
///
/// The empty patch is the identity. Opcode preconditions are not validated:
/// applying a patch to a document other than the one it was produced from
/// may panic.
pub fn apply_patch(root: &Value, patch: &Patch) -> Value {
    let mut patcher = Patcher::new(root);
    for op in patch {
        patcher.process(op);
    }
    patcher.result()
}

struct InputFrame<'a> {
    value: &'a Value,
    /// Key this value lives under in its parent map; `""` elsewhere.
    key: &'a str,
    /// Fields of `value` sorted by key, built on first ordinal access.
    fields: Option<Vec<(&'a str, &'a Value)>>,
}

impl<'a> InputFrame<'a> {
    fn new(value: &'a Value, key: &'a str) -> InputFrame<'a> {
        InputFrame {
            value,
            key,
            fields: None,
        }
    }

    fn field(&mut self, index: usize) -> (&'a str, &'a Value) {
        let value = self.value;
        let fields = self.fields.get_or_insert_with(|| {
            let map = match value {
                Value::Object(map) => map,
                _ => panic!("field access on a non-object input"),
            };
            let mut fields: Vec<(&'a str, &'a Value)> =
                map.iter().map(|(k, v)| (k.as_str(), v)).collect();
            fields.sort_unstable_by_key(|(k, _)| *k);
            fields
        });
        *fields
            .get(index)
            .unwrap_or_else(|| panic!("field ordinal {index} out of range"))
    }
}

enum OutputFrame<'a> {
    Source(&'a Value),
    Object(Map<String, Value>),
    Array(Vec<Value>),
    Str(String),
    Blank,
}

impl OutputFrame<'_> {
    fn materialize(self) -> Value {
        match self {
            OutputFrame::Source(v) => v.clone(),
            OutputFrame::Object(map) => Value::Object(map),
            OutputFrame::Array(values) => Value::Array(values),
            OutputFrame::Str(s) => Value::String(s),
            OutputFrame::Blank => Value::Null,
        }
    }
}

struct Patcher<'a> {
    input: Vec<InputFrame<'a>>,
    output: Vec<OutputFrame<'a>>,
}

impl<'a> Patcher<'a> {
    fn new(root: &'a Value) -> Patcher<'a> {
        Patcher {
            input: vec![InputFrame::new(root, "")],
            output: vec![OutputFrame::Source(root)],
        }
    }

    fn input_top(&mut self) -> &mut InputFrame<'a> {
        self.input.last_mut().expect("input stack is empty")
    }

    fn push_input(&mut self, value: &'a Value, key: &'a str) {
        self.input.push(InputFrame::new(value, key));
    }

    fn pop_input(&mut self) {
        self.input.pop().expect("pop on an empty input stack");
    }

    fn input_array(&mut self) -> &'a [Value] {
        match self.input_top().value {
            Value::Array(values) => values,
            _ => panic!("element access on a non-array input"),
        }
    }

    fn input_string(&mut self) -> &'a str {
        match self.input_top().value {
            Value::String(s) => s,
            _ => panic!("string access on a non-string input"),
        }
    }

    fn output_top(&mut self) -> &mut OutputFrame<'a> {
        self.output.last_mut().expect("output stack is empty")
    }

    /// Top output frame as a writable map, promoting a `Source` or `Blank`.
    fn output_object(&mut self) -> &mut Map<String, Value> {
        let top = self.output_top();
        match top {
            OutputFrame::Object(_) => {}
            OutputFrame::Source(Value::Object(map)) => *top = OutputFrame::Object(map.clone()),
            OutputFrame::Blank => *top = OutputFrame::Object(Map::new()),
            _ => panic!("output frame is not an object"),
        }
        match self.output_top() {
            OutputFrame::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn output_array(&mut self) -> &mut Vec<Value> {
        let top = self.output_top();
        match top {
            OutputFrame::Array(_) => {}
            OutputFrame::Source(Value::Array(values)) => *top = OutputFrame::Array(values.clone()),
            OutputFrame::Blank => *top = OutputFrame::Array(Vec::new()),
            _ => panic!("output frame is not an array"),
        }
        match self.output_top() {
            OutputFrame::Array(values) => values,
            _ => unreachable!(),
        }
    }

    fn output_string(&mut self) -> &mut String {
        let top = self.output_top();
        match top {
            OutputFrame::Str(_) => {}
            OutputFrame::Source(Value::String(s)) => *top = OutputFrame::Str(s.clone()),
            OutputFrame::Blank => *top = OutputFrame::Str(String::new()),
            _ => panic!("output frame is not a string"),
        }
        match self.output_top() {
            OutputFrame::Str(s) => s,
            _ => unreachable!(),
        }
    }

    fn return_into_object(&mut self, key: &str) {
        let frame = self.output.pop().expect("return on an empty output stack");
        let value = frame.materialize();
        self.output_object().insert(key.to_string(), value);
    }

    fn return_into_object_same_key(&mut self) {
        let key = self
            .input
            .last()
            .expect("input stack is empty")
            .key
            .to_string();
        self.return_into_object(&key);
    }

    fn return_into_array(&mut self) {
        let frame = self.output.pop().expect("return on an empty output stack");
        let value = frame.materialize();
        self.output_array().push(value);
    }

    fn process(&mut self, op: &'a Op) {
        match op {
            Op::Value { value } => self.output.push(OutputFrame::Source(value)),
            Op::Copy => {
                let value = self.input_top().value;
                self.output.push(OutputFrame::Source(value));
            }
            Op::Blank => self.output.push(OutputFrame::Blank),
            Op::ReturnIntoArray => self.return_into_array(),
            Op::ReturnIntoObject { key } => self.return_into_object(key),
            Op::ReturnIntoObjectSameKey => self.return_into_object_same_key(),
            Op::PushField { index } => {
                let (key, value) = self.input_top().field(*index);
                self.push_input(value, key);
            }
            Op::PushElement { index } => {
                let values = self.input_array();
                self.push_input(&values[*index], "");
            }
            Op::PushParent { n } => {
                let idx = self
                    .input
                    .len()
                    .checked_sub(2 + n)
                    .expect("push_parent past the bottom of the input stack");
                let frame = &self.input[idx];
                let (value, key) = (frame.value, frame.key);
                self.push_input(value, key);
            }
            Op::Pop => self.pop_input(),
            Op::PushFieldCopy { index } => {
                let (key, value) = self.input_top().field(*index);
                self.push_input(value, key);
                self.output.push(OutputFrame::Source(value));
            }
            Op::PushFieldBlank { index } => {
                let (key, value) = self.input_top().field(*index);
                self.push_input(value, key);
                self.output.push(OutputFrame::Blank);
            }
            Op::PushElementCopy { index } => {
                let values = self.input_array();
                let value = &values[*index];
                self.push_input(value, "");
                self.output.push(OutputFrame::Source(value));
            }
            Op::PushElementBlank { index } => {
                let values = self.input_array();
                self.push_input(&values[*index], "");
                self.output.push(OutputFrame::Blank);
            }
            Op::ReturnIntoObjectPop { key } => {
                self.return_into_object(key);
                self.pop_input();
            }
            Op::ReturnIntoObjectSameKeyPop => {
                self.return_into_object_same_key();
                self.pop_input();
            }
            Op::ReturnIntoArrayPop => {
                self.return_into_array();
                self.pop_input();
            }
            Op::ObjectSetFieldValue { key, value } => {
                self.output_object().insert(key.clone(), value.clone());
            }
            Op::ObjectCopyField { index } => {
                let (key, value) = self.input_top().field(*index);
                self.output_object().insert(key.to_string(), value.clone());
            }
            Op::ObjectDeleteField { index } => {
                let (key, _) = self.input_top().field(*index);
                self.output_object().remove(key);
            }
            Op::ArrayAppendValue { value } => self.output_array().push(value.clone()),
            Op::ArrayAppendSlice { left, right } => {
                let values = self.input_array();
                let slice = values
                    .get(*left..*right)
                    .expect("array slice out of range")
                    .to_vec();
                self.output_array().extend(slice);
            }
            Op::StringAppendString { string } => self.output_string().push_str(string),
            Op::StringAppendSlice { left, right } => {
                let s = self.input_string();
                let piece = s
                    .get(*left..*right)
                    .expect("string slice out of range")
                    .to_string();
                self.output_string().push_str(&piece);
            }
        }
    }

    fn result(mut self) -> Value {
        self.output
            .pop()
            .expect("output stack is empty")
            .materialize()
    }
}
