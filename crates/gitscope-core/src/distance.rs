//! Merge-base discovery with ahead/behind counts.
//!
//! Both heads walk their first-parent chains one step per round. The first
//! round in which the two visited lists share a commit yields the merge
//! base. The walk always terminates: a side stops at a root commit or when
//! its next commit is already in its own list, and once both sides have
//! stopped without meeting there is no common ancestor on the first-parent
//! chains.

use std::collections::HashMap;

use gitscope_git::ObjectId;
use serde::Serialize;

/// Parent lookup over an in-memory commit DAG.
pub trait CommitGraph {
    /// Parent ids of `id`, first parent first. `None` for unknown commits.
    fn parent_ids(&self, id: &ObjectId) -> Option<&[ObjectId]>;

    fn first_parent_id(&self, id: &ObjectId) -> Option<&ObjectId> {
        self.parent_ids(id).and_then(<[ObjectId]>::first)
    }
}

impl CommitGraph for HashMap<ObjectId, Vec<ObjectId>> {
    fn parent_ids(&self, id: &ObjectId) -> Option<&[ObjectId]> {
        self.get(id).map(Vec::as_slice)
    }
}

/// Distance between a source and a target commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefDistance {
    /// Nearest common first-parent ancestor.
    pub merge_base: ObjectId,
    /// Commits on the source side not on the target side.
    pub ahead: usize,
    /// Commits on the target side not on the source side.
    pub behind: usize,
}

/// One side of the walk: visited commits in order plus their positions.
struct Walk {
    visited: Vec<ObjectId>,
    index: HashMap<ObjectId, usize>,
    active: bool,
}

impl Walk {
    fn new(head: &ObjectId) -> Self {
        Self {
            visited: vec![head.clone()],
            index: HashMap::from([(head.clone(), 0)]),
            active: true,
        }
    }

    /// Step to the first parent of the last visited commit. Returns the
    /// newly visited id, or `None` if this side has stopped.
    fn advance(&mut self, graph: &impl CommitGraph) -> Option<ObjectId> {
        if !self.active {
            return None;
        }
        let last = self.visited.last()?;
        match graph.first_parent_id(last) {
            Some(parent) if !self.index.contains_key(parent) => {
                let parent = parent.clone();
                self.index.insert(parent.clone(), self.visited.len());
                self.visited.push(parent.clone());
                Some(parent)
            }
            _ => {
                self.active = false;
                None
            }
        }
    }
}

/// Compute how far `source` and `target` have diverged.
///
/// Returns `None` when the first-parent chains never meet.
#[must_use]
pub fn compute_distance(
    graph: &impl CommitGraph,
    source: &ObjectId,
    target: &ObjectId,
) -> Option<RefDistance> {
    let mut s = Walk::new(source);
    let mut t = Walk::new(target);
    let mut new_s = Some(source.clone());
    let mut new_t = Some(target.clone());

    loop {
        // Only commits added this round can create the first match.
        let mut best: Option<RefDistance> = None;
        let candidates = new_s
            .iter()
            .filter_map(|id| t.index.get(id).map(|&j| (id, s.index[id], j)))
            .chain(
                new_t
                    .iter()
                    .filter_map(|id| s.index.get(id).map(|&i| (id, i, t.index[id]))),
            );
        for (id, ahead, behind) in candidates {
            let better = best.as_ref().is_none_or(|b| {
                (ahead + behind, id) < (b.ahead + b.behind, &b.merge_base)
            });
            if better {
                best = Some(RefDistance {
                    merge_base: id.clone(),
                    ahead,
                    behind,
                });
            }
        }
        if best.is_some() {
            return best;
        }

        new_s = s.advance(graph);
        new_t = t.advance(graph);
        if new_s.is_none() && new_t.is_none() {
            tracing::trace!(%source, %target, "first-parent chains never meet");
            return None;
        }
    }
}
