//! Diff/apply options.
//!
//! The only knob is a *convert function*: a caller-supplied re-mapping
//! applied to every node of a document before it is hashed, diffed, or read
//! by the apply VM. It exists so callers can fold foreign value shapes
//! (wrapped timestamps, custom scalar encodings) into the supported
//! repertoire. Diff and apply only round-trip when performed with the same
//! convert function on both sides.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;

use crate::apply;
use crate::diff;
use crate::error::DiffError;
use crate::exact::{self, ExactDiffReporter};
use crate::patch::Patch;

/// Node re-mapping hook; return `None` to keep a value as-is.
pub type ConvertFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;

#[derive(Clone, Default)]
pub struct Options {
    convert_fn: Option<Arc<ConvertFn>>,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    /// Register a convert function, replacing any previous one.
    pub fn with_convert_fn(
        mut self,
        convert_fn: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Options {
        self.convert_fn = Some(Arc::new(convert_fn));
        self
    }

    /// See [`diff`](crate::diff).
    pub fn diff(&self, left: &Value, right: &Value) -> Result<Patch, DiffError> {
        diff::diff(&*self.convert(left), &*self.convert(right))
    }

    /// See [`double_diff`](crate::double_diff).
    pub fn double_diff(&self, left: &Value, right: &Value) -> Result<(Patch, Patch), DiffError> {
        diff::double_diff(&*self.convert(left), &*self.convert(right))
    }

    /// Like [`Options::diff`], but also reports every right-side location
    /// whose value is not exactly present in the left document.
    pub fn diff_with_reporter(
        &self,
        left: &Value,
        right: &Value,
        reporter: &mut dyn ExactDiffReporter,
    ) -> Result<Patch, DiffError> {
        let left = self.convert(left);
        let right = self.convert(right);
        exact::walk(Some(&*left), &*right, reporter);
        diff::diff(&*left, &*right)
    }

    /// See [`apply_patch`](crate::apply_patch).
    pub fn apply_patch(&self, root: &Value, patch: &Patch) -> Value {
        apply::apply_patch(&*self.convert(root), patch)
    }

    fn convert<'v>(&self, value: &'v Value) -> Cow<'v, Value> {
        match &self.convert_fn {
            None => Cow::Borrowed(value),
            Some(f) => Cow::Owned(convert_tree(value, f.as_ref())),
        }
    }
}

/// Apply the convert function to a node, then rebuild its (converted)
/// children recursively.
fn convert_tree(value: &Value, convert_fn: &ConvertFn) -> Value {
    let value = match convert_fn(value) {
        Some(converted) => Cow::Owned(converted),
        None => Cow::Borrowed(value),
    };
    match &*value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), convert_tree(child, convert_fn)))
                .collect(),
        ),
        Value::Array(values) => Value::Array(
            values
                .iter()
                .map(|child| convert_tree(child, convert_fn))
                .collect(),
        ),
        _ => value.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Unwraps `{"$wrapped": x}` into `x`, the typical shape of a foreign
    /// scalar encoding.
    fn unwrap_options() -> Options {
        Options::new().with_convert_fn(|value| {
            let map = value.as_object()?;
            if map.len() == 1 {
                map.get("$wrapped").cloned()
            } else {
                None
            }
        })
    }

    #[test]
    fn convert_applies_to_both_sides_and_roundtrips() {
        let options = unwrap_options();
        let left = json!({"a": "abcdefgh"});
        let right = json!({"a": {"$wrapped": "abcdefgh"}, "b": 123.5});

        let patch = options.diff(&left, &right).unwrap();
        let result = options.apply_patch(&left, &patch);
        assert_eq!(result, json!({"a": "abcdefgh", "b": 123.5}));
    }

    #[test]
    fn convert_reaches_nested_values() {
        let options = unwrap_options();
        let doc = json!({"outer": [{"$wrapped": 1}, {"x": {"$wrapped": 2}}]});
        let patch = options.diff(&doc, &doc).unwrap();
        assert!(patch.is_empty());
        assert_eq!(
            options.apply_patch(&doc, &patch),
            json!({"outer": [1, {"x": 2}]})
        );
    }

    #[test]
    fn no_convert_fn_is_identity() {
        let options = Options::new();
        let doc = json!({"$wrapped": 1});
        assert_eq!(options.apply_patch(&doc, &Patch::new()), doc);
    }
}
