//! String reconstruction.
//!
//! Strings are diffed by common prefix and suffix only: the target is
//! rebuilt as `source[..prefix] + middle + source[len-suffix..]`. Both runs
//! are computed byte-wise and then pulled back to code-point boundaries, so
//! slices never split a UTF-8 sequence.

use serde_json::Value;

use super::{Differ, Request};
use crate::patch::Op;

impl<'l, 'a> Differ<'l, 'a> {
    pub(super) fn reconstruct_string(
        &self,
        _target_idx: usize,
        target: &str,
        reqs: &mut [Request<'a>],
    ) {
        // An empty target would reconstruct as a blank frame with no
        // appends, which materializes as null; the literal fallback is
        // just as small and actually correct.
        if target.is_empty() {
            return;
        }
        for req_idx in 0..reqs.len() {
            let req = &reqs[req_idx];
            let Value::String(source) = self.left.entries[req.primary_idx].value else {
                continue;
            };
            assert!(
                source.as_str() != target,
                "string reconstruction invoked on equal strings"
            );

            let prefix = common_prefix(source, target);
            let suffix = common_suffix(&source[prefix..], &target[prefix..]);

            let (enter, enter_key) = self.enter_op(req.context_idx, req.primary_idx, true);
            let mut ops = vec![enter];
            if prefix > 0 {
                ops.push(Op::StringAppendSlice {
                    left: 0,
                    right: prefix,
                });
            }
            let middle = &target[prefix..target.len() - suffix];
            if !middle.is_empty() {
                ops.push(Op::StringAppendString {
                    string: middle.to_string(),
                });
            }
            if suffix > 0 {
                ops.push(Op::StringAppendSlice {
                    left: source.len() - suffix,
                    right: source.len(),
                });
            }

            reqs[req_idx].offer(ops, enter_key);
        }
    }
}

/// Length in bytes of the longest common prefix that ends on a code-point
/// boundary in both strings.
fn common_prefix(a: &str, b: &str) -> usize {
    let mut n = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    while n > 0 && !(a.is_char_boundary(n) && b.is_char_boundary(n)) {
        n -= 1;
    }
    n
}

/// Length in bytes of the longest common suffix that starts on a code-point
/// boundary in both strings.
fn common_suffix(a: &str, b: &str) -> usize {
    let mut n = a
        .bytes()
        .rev()
        .zip(b.bytes().rev())
        .take_while(|(x, y)| x == y)
        .count();
    while n > 0 && !(a.is_char_boundary(a.len() - n) && b.is_char_boundary(b.len() - n)) {
        n -= 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_basic() {
        assert_eq!(common_prefix("abcdef", "abcxyz"), 3);
        assert_eq!(common_prefix("abc", "abc"), 3);
        assert_eq!(common_prefix("", "abc"), 0);
        assert_eq!(common_prefix("xyz", "abc"), 0);
    }

    #[test]
    fn suffix_basic() {
        assert_eq!(common_suffix("abcdef", "xyzdef"), 3);
        assert_eq!(common_suffix("abc", ""), 0);
        assert_eq!(common_suffix("abc", "xbc"), 2);
    }

    #[test]
    fn prefix_respects_code_point_boundaries() {
        // "é" (C3 A9) vs "è" (C3 A8): the lead byte matches but the prefix
        // must not end inside the sequence.
        assert_eq!(common_prefix("é", "è"), 0);
        assert_eq!(common_prefix("aé", "aè"), 1);
        // "文" vs "改" share their first UTF-8 byte (E6).
        assert_eq!(common_prefix("汉字文", "汉字改"), 6);
    }

    #[test]
    fn suffix_respects_code_point_boundaries() {
        // "ā" (C4 81) vs "ḁ" (E1 B8 81) share a trailing byte only.
        assert_eq!(common_suffix("ā", "ḁ"), 0);
        assert_eq!(common_suffix("݆݆݅Ʌ", "І݆Ʌ"), 4);
    }
}
