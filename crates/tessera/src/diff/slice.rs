//! Sequence reconstruction.
//!
//! Elements of the target are matched against a candidate sequence's
//! elements by content hash; matches prefer runs of adjacent source
//! positions so they can be emitted as single `ArrayAppendSlice` opcodes.
//! Unmatched positions recurse as child requests paired with the source
//! element at the same position, or fall back to literal appends.

use super::{Differ, Request};
use crate::patch::Op;

struct SliceCandidate {
    req_idx: usize,
    context_idx: usize,
    /// Direct children of the candidate sequence, by entry index.
    children: Vec<usize>,
    /// Per target position: the source element position copied from.
    aliases: Vec<Option<usize>>,
}

impl<'l, 'a> Differ<'l, 'a> {
    pub(super) fn reconstruct_slice(&self, target_idx: usize, reqs: &mut [Request<'a>]) {
        let elements: Vec<usize> = self.right.children(target_idx).collect();

        let mut candidates: Vec<SliceCandidate> = Vec::new();
        for (req_idx, req) in reqs.iter().enumerate() {
            if self.left.entries[req.primary_idx].is_non_empty_slice() {
                candidates.push(SliceCandidate {
                    req_idx,
                    context_idx: req.primary_idx,
                    children: self.left.children(req.primary_idx).collect(),
                    aliases: (0..elements.len()).map(|_| None).collect(),
                });
            }
        }
        if candidates.is_empty() {
            return;
        }

        // Alias resolution, adjacency-preserving: continuing the previous
        // run wins, then the first source past the previous match, then the
        // lowest source position (for patch stability).
        for cand in candidates.iter_mut() {
            let mut prev: Option<usize> = None;
            for (ei, &element_idx) in elements.iter().enumerate() {
                let element = &self.right.entries[element_idx];
                let mut sources: Vec<usize> = Vec::new();
                for &other_idx in self.index.lookup(&element.hash) {
                    let other = &self.left.entries[other_idx];
                    if other.parent == Some(cand.context_idx) {
                        sources.push(other.reference.index);
                    }
                }
                let pick = match prev {
                    Some(p) => sources
                        .iter()
                        .find(|&&s| s == p + 1)
                        .or_else(|| sources.iter().find(|&&s| s > p))
                        .or_else(|| sources.first())
                        .copied(),
                    None => sources.first().copied(),
                };
                cand.aliases[ei] = pick;
                if pick.is_some() {
                    prev = pick;
                }
            }
        }

        // Child requests for unaliased positions, paired with the source
        // element at the same position when the candidate has one.
        let mut element_reqs: Vec<Vec<Request<'a>>> =
            (0..elements.len()).map(|_| Vec::new()).collect();
        for (ei, &element_idx) in elements.iter().enumerate() {
            let element = &self.right.entries[element_idx];
            for cand in &candidates {
                if cand.aliases[ei].is_some() {
                    continue;
                }
                let Some(&primary) = cand.children.get(ei) else {
                    continue;
                };
                if element_reqs[ei]
                    .iter()
                    .any(|r| r.context_idx == Some(cand.context_idx))
                {
                    continue;
                }
                element_reqs[ei].push(Request::new(
                    Some(cand.context_idx),
                    primary,
                    element.size + 1,
                ));
            }
            if !element_reqs[ei].is_empty() {
                self.reconstruct(element_idx, &mut element_reqs[ei]);
            }
        }

        // Assembly: sequences are always rebuilt into a blank output.
        for cand in &candidates {
            let request_context = reqs[cand.req_idx].context_idx;
            let (enter, enter_key) = self.enter_op(request_context, cand.context_idx, true);
            let mut ops = vec![enter];

            // Current run of adjacent source positions, as [start, end).
            let mut run: Option<(usize, usize)> = None;
            for (ei, &element_idx) in elements.iter().enumerate() {
                match cand.aliases[ei] {
                    Some(source) => match run {
                        Some((start, end)) if source == end => run = Some((start, end + 1)),
                        Some((start, end)) => {
                            ops.push(Op::ArrayAppendSlice {
                                left: start,
                                right: end,
                            });
                            run = Some((source, source + 1));
                        }
                        None => run = Some((source, source + 1)),
                    },
                    None => {
                        if let Some((start, end)) = run.take() {
                            ops.push(Op::ArrayAppendSlice {
                                left: start,
                                right: end,
                            });
                        }
                        let child_req = element_reqs[ei]
                            .iter()
                            .find(|r| r.context_idx == Some(cand.context_idx));
                        match child_req.and_then(|r| r.best_patch.as_deref()) {
                            Some(child_ops) => {
                                ops.extend(child_ops.iter().cloned());
                                ops.push(Op::ReturnIntoArrayPop);
                            }
                            None => ops.push(Op::ArrayAppendValue {
                                value: self.right.entries[element_idx].value.clone(),
                            }),
                        }
                    }
                }
            }
            if let Some((start, end)) = run {
                ops.push(Op::ArrayAppendSlice {
                    left: start,
                    right: end,
                });
            }

            reqs[cand.req_idx].offer(ops, enter_key);
        }
    }
}
