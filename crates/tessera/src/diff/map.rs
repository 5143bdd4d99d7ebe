//! Map reconstruction.
//!
//! For each request, candidate left-side maps are collected from two
//! sources: the request's primary (the same-key child of its context) and
//! the near-miss xor index (sibling maps that differ from the target by one
//! field). Target fields are then matched against candidate fields by
//! content hash (*aliases*), unmatched fields recurse as child requests, and
//! finally each candidate is assembled into an opcode program and offered to
//! the request it serves.

use std::collections::HashSet;

use super::{Differ, Request};
use crate::patch::Op;

struct FieldAlias {
    /// Ordinal of the source field inside the candidate's map.
    source_index: usize,
    same_key: bool,
}

struct MapCandidate {
    req_idx: usize,
    context_idx: usize,
    /// Per target-field ordinal.
    aliases: Vec<Option<FieldAlias>>,
}

impl<'l, 'a> Differ<'l, 'a> {
    pub(super) fn reconstruct_map(&self, target_idx: usize, reqs: &mut [Request<'a>]) {
        let fields: Vec<usize> = self.right.children(target_idx).collect();
        let target = &self.right.entries[target_idx];

        // Candidates seeded from request primaries.
        let mut candidates: Vec<MapCandidate> = Vec::new();
        for (req_idx, req) in reqs.iter().enumerate() {
            if self.left.entries[req.primary_idx].is_non_empty_map() {
                candidates.push(MapCandidate {
                    req_idx,
                    context_idx: req.primary_idx,
                    aliases: (0..fields.len()).map(|_| None).collect(),
                });
            }
        }

        // Near-miss candidates: left maps that differ from the target by a
        // single field, provided they sit in a request's context.
        for &field_idx in &fields {
            let key = target
                .xor_hash
                .xored(&self.right.entries[field_idx].hash);
            for &m in self.index.lookup_xor(&key) {
                for (req_idx, req) in reqs.iter().enumerate() {
                    if self.left.entries[m].parent != req.context_idx {
                        continue;
                    }
                    if m == req.primary_idx {
                        continue;
                    }
                    if candidates
                        .iter()
                        .any(|c| c.req_idx == req_idx && c.context_idx == m)
                    {
                        continue;
                    }
                    candidates.push(MapCandidate {
                        req_idx,
                        context_idx: m,
                        aliases: (0..fields.len()).map(|_| None).collect(),
                    });
                }
            }
        }

        if candidates.is_empty() {
            return;
        }

        // Aliases: target fields whose exact value already exists among a
        // candidate's fields. Same-key sources win, then the lowest ordinal,
        // keeping patches stable.
        for (fi, &field_idx) in fields.iter().enumerate() {
            let field = &self.right.entries[field_idx];
            for &other_idx in self.index.lookup(&field.hash) {
                let other = &self.left.entries[other_idx];
                let Some(parent) = other.parent else {
                    continue;
                };
                for cand in candidates.iter_mut() {
                    if cand.context_idx != parent {
                        continue;
                    }
                    let alias = FieldAlias {
                        source_index: other.reference.index,
                        same_key: other.reference.key == field.reference.key,
                    };
                    match &cand.aliases[fi] {
                        Some(existing)
                            if existing.same_key
                                || (!alias.same_key
                                    && existing.source_index <= alias.source_index) => {}
                        _ => cand.aliases[fi] = Some(alias),
                    }
                }
            }
        }

        // Child requests for fields no alias covers, one per candidate that
        // has a same-key field to start from.
        let mut field_reqs: Vec<Vec<Request<'a>>> = (0..fields.len()).map(|_| Vec::new()).collect();
        for (fi, &field_idx) in fields.iter().enumerate() {
            let field = &self.right.entries[field_idx];
            for cand in &candidates {
                if cand.aliases[fi].is_some() {
                    continue;
                }
                let Some(child) = self.left.child_by_key(cand.context_idx, field.reference.key)
                else {
                    continue;
                };
                if field_reqs[fi]
                    .iter()
                    .any(|r| r.context_idx == Some(cand.context_idx))
                {
                    continue;
                }
                field_reqs[fi].push(Request::new(
                    Some(cand.context_idx),
                    child,
                    field.size + 1,
                ));
            }
            if !field_reqs[fi].is_empty() {
                self.reconstruct(field_idx, &mut field_reqs[fi]);
            }
        }

        // Assemble each candidate's program.
        for cand in &candidates {
            let request_context = reqs[cand.req_idx].context_idx;

            // Left-side keys that survive or get overwritten in place; the
            // rest must be deleted in copy mode.
            let mut seen: HashSet<&str> = HashSet::new();
            for (fi, &field_idx) in fields.iter().enumerate() {
                let key = self.right.entries[field_idx].reference.key;
                if cand.aliases[fi].is_some()
                    || field_reqs[fi]
                        .iter()
                        .any(|r| r.context_idx == Some(cand.context_idx))
                {
                    seen.insert(key);
                }
            }
            let removes: Vec<usize> = self
                .left
                .children(cand.context_idx)
                .filter(|&c| !seen.contains(self.left.entries[c].reference.key))
                .map(|c| self.left.entries[c].reference.index)
                .collect();

            let alias_count = cand.aliases.iter().flatten().count();
            let copy_mode = removes.len() < alias_count;

            let (enter, enter_key) = self.enter_op(request_context, cand.context_idx, !copy_mode);
            let mut ops = vec![enter];

            if copy_mode {
                for &ordinal in &removes {
                    ops.push(Op::ObjectDeleteField { index: ordinal });
                }
            }

            for (fi, &field_idx) in fields.iter().enumerate() {
                let field = &self.right.entries[field_idx];
                match &cand.aliases[fi] {
                    Some(alias) if alias.same_key => {
                        if !copy_mode {
                            ops.push(Op::ObjectCopyField {
                                index: alias.source_index,
                            });
                        }
                    }
                    Some(alias) => {
                        ops.push(Op::PushFieldCopy {
                            index: alias.source_index,
                        });
                        ops.push(Op::ReturnIntoObjectPop {
                            key: field.reference.key.to_string(),
                        });
                    }
                    None => {
                        let child_req = field_reqs[fi]
                            .iter()
                            .find(|r| r.context_idx == Some(cand.context_idx));
                        match child_req.and_then(|r| r.best_patch.as_deref()) {
                            Some(child_ops) => {
                                ops.extend(child_ops.iter().cloned());
                                let same_key = child_req.and_then(|r| r.best_enter_key)
                                    == Some(field.reference.key);
                                ops.push(if same_key {
                                    Op::ReturnIntoObjectSameKeyPop
                                } else {
                                    Op::ReturnIntoObjectPop {
                                        key: field.reference.key.to_string(),
                                    }
                                });
                            }
                            None => ops.push(Op::ObjectSetFieldValue {
                                key: field.reference.key.to_string(),
                                value: field.value.clone(),
                            }),
                        }
                    }
                }
            }

            reqs[cand.req_idx].offer(ops, enter_key);
        }
    }
}
