//! The reconstruction engine.
//!
//! Diffing is a search: for every sub-tree of the right document (*target*),
//! enumerate left-side sub-trees it could cheaply be rewritten from
//! (*candidates*), assemble the opcode program each candidate implies, and
//! keep the cheapest. The search is driven by *requests* — "produce this
//! target assuming the VM sits at this left-side context" — which recurse
//! field-by-field and element-by-element through the target.
//!
//! Anything without a viable candidate falls back to emitting the target as
//! a literal value.

mod cost;
mod map;
mod slice;
mod string;

use serde_json::Value;

use crate::error::DiffError;
use crate::hash::{HashIndex, HashList};
use crate::patch::{Op, Patch};

use cost::patch_cost;

/// Produce a patch that rewrites `left` into `right`.
pub fn diff(left: &Value, right: &Value) -> Result<Patch, DiffError> {
    let left_list = HashList::build(left)?;
    let right_list = HashList::build(right)?;
    let index = HashIndex::new(&left_list);
    Ok(Differ {
        left: &left_list,
        right: &right_list,
        index: &index,
    }
    .build())
}

/// Produce both directions at once: a patch rewriting `left` into `right`
/// and one rewriting `right` into `left`. The hash lists are built once and
/// reused with the roles swapped.
pub fn double_diff(left: &Value, right: &Value) -> Result<(Patch, Patch), DiffError> {
    let left_list = HashList::build(left)?;
    let right_list = HashList::build(right)?;

    let left_index = HashIndex::new(&left_list);
    let forward = Differ {
        left: &left_list,
        right: &right_list,
        index: &left_index,
    }
    .build();

    let right_index = HashIndex::new(&right_list);
    let backward = Differ {
        left: &right_list,
        right: &left_list,
        index: &right_index,
    }
    .build();

    Ok((forward, backward))
}

pub(crate) struct Differ<'l, 'a> {
    pub(crate) left: &'l HashList<'a>,
    pub(crate) right: &'l HashList<'a>,
    pub(crate) index: &'l HashIndex,
}

/// One unit of reconstruction work: produce the target while the VM sits at
/// `context_idx` in the left document, starting the search from
/// `primary_idx`. Tracks the cheapest program found so far; `best_size`
/// starts at the cost of emitting the target as a literal, so only programs
/// that beat the literal are kept.
pub(crate) struct Request<'a> {
    pub(crate) context_idx: Option<usize>,
    pub(crate) primary_idx: usize,
    pub(crate) best_size: usize,
    pub(crate) best_patch: Option<Vec<Op>>,
    /// Key of the left-side field the best program entered through, when it
    /// entered through a map field. Lets the parent pick the shorter
    /// same-key return opcode.
    pub(crate) best_enter_key: Option<&'a str>,
}

impl<'a> Request<'a> {
    pub(crate) fn new(context_idx: Option<usize>, primary_idx: usize, budget: usize) -> Request<'a> {
        Request {
            context_idx,
            primary_idx,
            best_size: budget,
            best_patch: None,
            best_enter_key: None,
        }
    }

    /// Record a candidate program if it beats the best one so far.
    pub(crate) fn offer(&mut self, ops: Vec<Op>, enter_key: Option<&'a str>) {
        let cost = patch_cost(&ops);
        if cost < self.best_size {
            self.best_size = cost;
            self.best_patch = Some(ops);
            self.best_enter_key = enter_key;
        }
    }
}

impl<'l, 'a> Differ<'l, 'a> {
    pub(crate) fn build(&self) -> Patch {
        let left_root = &self.left.entries[0];
        let right_root = &self.right.entries[0];

        if left_root.hash == right_root.hash {
            return Patch::new();
        }

        let mut reqs = vec![Request::new(None, 0, right_root.size + 1)];
        self.reconstruct(0, &mut reqs);

        match reqs.into_iter().next().and_then(|req| req.best_patch) {
            Some(ops) => Patch(ops),
            None => Patch(vec![Op::Value {
                value: right_root.value.clone(),
            }]),
        }
    }

    /// Try to fulfill every request for one target. Targets with no
    /// structural reuse potential leave the requests untouched and the
    /// caller falls back to a literal.
    fn reconstruct(&self, target_idx: usize, reqs: &mut [Request<'a>]) {
        match self.right.entries[target_idx].value {
            Value::Object(m) if !m.is_empty() => self.reconstruct_map(target_idx, reqs),
            Value::Array(a) if !a.is_empty() => self.reconstruct_slice(target_idx, reqs),
            Value::String(s) => self.reconstruct_string(target_idx, s, reqs),
            _ => {}
        }
    }

    /// The opcode that moves the VM from a request's context into `node`,
    /// along with the map key entered through (if any). `node` must be the
    /// context itself at the root, or a direct child of the context.
    fn enter_op(
        &self,
        context_idx: Option<usize>,
        node: usize,
        blank: bool,
    ) -> (Op, Option<&'a str>) {
        let Some(context_idx) = context_idx else {
            return (if blank { Op::Blank } else { Op::Copy }, None);
        };
        let reference = self.left.entries[node].reference;
        match self.left.entries[context_idx].value {
            Value::Object(_) => {
                let op = if blank {
                    Op::PushFieldBlank {
                        index: reference.index,
                    }
                } else {
                    Op::PushFieldCopy {
                        index: reference.index,
                    }
                };
                (op, Some(reference.key))
            }
            Value::Array(_) => {
                let op = if blank {
                    Op::PushElementBlank {
                        index: reference.index,
                    }
                } else {
                    Op::PushElementCopy {
                        index: reference.index,
                    }
                };
                (op, None)
            }
            _ => unreachable!("context is not a container"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply_patch;
    use serde_json::json;

    fn roundtrip(left: Value, right: Value) -> Patch {
        let patch = diff(&left, &right).unwrap();
        assert_eq!(
            apply_patch(&left, &patch),
            right,
            "patch {patch:?} for {left} -> {right}"
        );
        patch
    }

    #[test]
    fn identical_documents_produce_the_empty_patch() {
        let patch = roundtrip(json!({"a": [1, {"b": null}]}), json!({"a": [1, {"b": null}]}));
        assert!(patch.is_empty());
    }

    #[test]
    fn root_type_change_falls_back_to_literal() {
        let patch = roundtrip(json!(1), json!({}));
        assert_eq!(patch, Patch(vec![Op::Value { value: json!({}) }]));
    }

    #[test]
    fn added_field_keeps_the_rest() {
        let patch = roundtrip(
            json!({"a": "a", "b": "b", "c": "c"}),
            json!({"a": "a", "b": "b", "c": "c", "d": "d"}),
        );
        // Everything survives via a copy; only the new field is written.
        assert_eq!(
            patch,
            Patch(vec![
                Op::Copy,
                Op::ObjectSetFieldValue {
                    key: "d".to_string(),
                    value: json!("d"),
                },
            ])
        );
    }

    #[test]
    fn removed_field_uses_delete() {
        let patch = roundtrip(
            json!({"a": "a", "b": "b", "c": "c"}),
            json!({"a": "a", "b": "b"}),
        );
        assert_eq!(
            patch,
            Patch(vec![Op::Copy, Op::ObjectDeleteField { index: 2 }])
        );
    }

    #[test]
    fn mostly_removed_map_starts_blank() {
        let patch = roundtrip(
            json!({"a": "a", "b": "b", "c": "c"}),
            json!({"a": "a"}),
        );
        assert_eq!(
            patch,
            Patch(vec![Op::Blank, Op::ObjectCopyField { index: 0 }])
        );
    }

    #[test]
    fn field_value_reused_under_other_key() {
        roundtrip(json!({"": ""}), json!({"": "", "0000": ""}));
    }

    #[test]
    fn nested_map_edit_reuses_sibling_value() {
        roundtrip(
            json!({"a": "a", "b": {"a": "a"}}),
            json!({"a": "a", "b": {"a": "b", "b": "a"}}),
        );
    }

    #[test]
    fn sequence_truncation_appends_a_slice() {
        let patch = roundtrip(json!({"a": ["a", "b", "c"]}), json!({"a": ["a", "b"]}));
        assert!(patch
            .iter()
            .any(|op| matches!(op, Op::ArrayAppendSlice { left: 0, right: 2 })));
    }

    #[test]
    fn sequence_reorders_and_inserts() {
        roundtrip(json!([1, 2, 3, 4]), json!([4, 1, 2, 99]));
        roundtrip(json!(["x", "y"]), json!(["y", "x"]));
    }

    #[test]
    fn long_string_reuses_prefix_and_suffix() {
        let patch = roundtrip(json!({"a": "abcdefghijk"}), json!({"a": "abcdehijk"}));
        assert!(patch
            .iter()
            .any(|op| matches!(op, Op::StringAppendSlice { left: 0, right: 5 })));
        assert!(patch
            .iter()
            .any(|op| matches!(op, Op::StringAppendSlice { left: 7, right: 11 })));
    }

    #[test]
    fn multibyte_strings_never_split_code_points() {
        roundtrip(json!("݆݆݅Ʌ"), json!("І݆Ʌ"));
        roundtrip(json!({"s": "汉字文本汉字"}), json!({"s": "汉字改文本汉字"}));
    }

    #[test]
    fn string_cleared_to_empty() {
        roundtrip(json!("x"), json!(""));
        roundtrip(json!({"a": "abcdef"}), json!({"a": ""}));
        roundtrip(json!(""), json!("abc"));
    }

    #[test]
    fn empty_array_inside_array() {
        roundtrip(json!([[]]), json!([]));
        roundtrip(json!([]), json!([[]]));
    }

    #[test]
    fn null_on_either_side() {
        roundtrip(json!(null), json!({"a": 1}));
        roundtrip(json!({"a": 1}), json!(null));
    }

    #[test]
    fn near_miss_map_found_through_xor_index() {
        // The sibling map "m2" differs from the target "m1" by one field;
        // the xor index should let the differ rebuild "m1" out of "m2".
        roundtrip(
            json!({"m1": {"a": 1, "b": 2, "c": 3}, "m2": {"a": 1, "b": 2, "c": 4}}),
            json!({"m1": {"a": 1, "b": 2, "c": 4}, "m2": {"a": 1, "b": 2, "c": 4}}),
        );
    }

    #[test]
    fn deep_subtree_moves_across_keys() {
        roundtrip(
            json!({"old": {"deep": {"k": [1, 2, 3]}}}),
            json!({"new": {"deep": {"k": [1, 2, 3]}}}),
        );
    }

    #[test]
    fn diff_is_deterministic() {
        let left = json!({"a": [1, 2, {"x": "y"}], "b": "bbb", "c": {"d": 4}});
        let right = json!({"a": [2, {"x": "y"}, 5], "b": "bbc", "e": {"d": 4}});
        let p1 = diff(&left, &right).unwrap();
        let p2 = diff(&left, &right).unwrap();
        assert_eq!(p1, p2);
    }

    #[test]
    fn double_diff_goes_both_ways() {
        let left = json!({"a": "a", "b": {"a": "a"}, "c": [1, 2, 3]});
        let right = json!({"a": "b", "b": {"a": "a", "b": "x"}, "c": [2, 3]});
        let (forward, backward) = double_diff(&left, &right).unwrap();
        assert_eq!(apply_patch(&left, &forward), right);
        assert_eq!(apply_patch(&right, &backward), left);
    }
}
