//! Exact-diff reporting.
//!
//! A visitor that is told, for every location in the right document, when
//! the value there is not exactly the one in the left document. This is
//! independent of the patch search: it answers "what changed, and where"
//! rather than "how do I rebuild it".

use serde_json::Value;

/// Visitor for exact differences. `enter_*`/`leave_*` calls trace the path;
/// `report` fires at the deepest location whose value differs.
pub trait ExactDiffReporter {
    fn enter_field(&mut self, key: &str);
    fn leave_field(&mut self, key: &str);
    fn enter_element(&mut self, idx: usize);
    fn leave_element(&mut self, idx: usize);
    fn report(&mut self, value: &Value);
}

/// Walk the right document against its left counterpart. A right-side
/// container descends whenever *any* left counterpart exists (its children
/// then compare against the left container's same-key/same-index children);
/// with no counterpart at all, the whole right value is reported.
pub(crate) fn walk(left: Option<&Value>, right: &Value, reporter: &mut dyn ExactDiffReporter) {
    if let Some(left_value) = left {
        if left_value == right {
            return;
        }
    }
    match right {
        Value::Object(map) if left.is_some() => {
            let left_map = left.and_then(Value::as_object);
            for (key, child) in map {
                reporter.enter_field(key);
                walk(left_map.and_then(|m| m.get(key)), child, reporter);
                reporter.leave_field(key);
            }
        }
        Value::Array(values) if left.is_some() => {
            let left_values = left.and_then(Value::as_array);
            for (idx, child) in values.iter().enumerate() {
                reporter.enter_element(idx);
                walk(left_values.and_then(|v| v.get(idx)), child, reporter);
                reporter.leave_element(idx);
            }
        }
        _ => reporter.report(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        path: Vec<String>,
        entries: Vec<(Vec<String>, Value)>,
    }

    impl ExactDiffReporter for Recorder {
        fn enter_field(&mut self, key: &str) {
            self.path.push(key.to_string());
        }

        fn leave_field(&mut self, _key: &str) {
            self.path.pop();
        }

        fn enter_element(&mut self, idx: usize) {
            self.path.push(idx.to_string());
        }

        fn leave_element(&mut self, _idx: usize) {
            self.path.pop();
        }

        fn report(&mut self, value: &Value) {
            self.entries.push((self.path.clone(), value.clone()));
        }
    }

    fn reported(left: Value, right: Value) -> Vec<(Vec<String>, Value)> {
        let mut recorder = Recorder::default();
        let options = Options::new();
        let patch = options
            .diff_with_reporter(&left, &right, &mut recorder)
            .unwrap();
        // The reporter never disturbs the patch itself.
        assert_eq!(crate::apply_patch(&left, &patch), right);
        recorder.entries
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn equal_documents_report_nothing() {
        let doc = json!({"a": 1.0, "b": [1.0, 2.0], "c": "hello"});
        assert!(reported(doc.clone(), doc).is_empty());
    }

    #[test]
    fn single_field_diff() {
        let entries = reported(
            json!({"a": 1.0, "b": 3.0, "c": 3.0}),
            json!({"a": 1.0, "b": 2.0, "c": 3.0}),
        );
        assert_eq!(entries, vec![(path(&["b"]), json!(2.0))]);
    }

    #[test]
    fn scalar_replaced_by_map_reports_each_field() {
        let entries = reported(
            json!({"a": 1.0, "b": 2.0}),
            json!({"a": 1.0, "b": {"c": 3.0, "d": 4.0}}),
        );
        assert_eq!(
            entries,
            vec![
                (path(&["b", "c"]), json!(3.0)),
                (path(&["b", "d"]), json!(4.0)),
            ]
        );
    }

    #[test]
    fn added_subtree_reports_whole_value() {
        let entries = reported(
            json!({"a": 1.0}),
            json!({"a": 1.0, "b": {"c": [0.0]}}),
        );
        assert_eq!(entries, vec![(path(&["b"]), json!({"c": [0.0]}))]);
    }

    #[test]
    fn array_element_diff() {
        let entries = reported(
            json!({"a": 1.0, "b": [1.0, 2.0]}),
            json!({"a": 1.0, "b": [2.0, 2.0]}),
        );
        assert_eq!(entries, vec![(path(&["b", "0"]), json!(2.0))]);
    }

    #[test]
    fn string_field_diff() {
        let entries = reported(
            json!({"a": 1.0, "b": "hello"}),
            json!({"a": 1.0, "b": "world"}),
        );
        assert_eq!(entries, vec![(path(&["b"]), json!("world"))]);
    }
}
