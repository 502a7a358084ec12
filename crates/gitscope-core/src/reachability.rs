//! Ancestor closure over all parents.

use std::collections::{HashSet, VecDeque};

use gitscope_git::ObjectId;

use crate::distance::CommitGraph;

/// Every commit reachable from `head` (inclusive) through any parent.
///
/// Commits missing from the graph, such as the boundary of a shallow clone,
/// end their branch of the walk. Each commit is visited once, however many
/// merge paths lead to it.
#[must_use]
pub fn ancestor_closure(graph: &impl CommitGraph, head: &ObjectId) -> HashSet<ObjectId> {
    let mut visited = HashSet::from([head.clone()]);
    let mut queue = VecDeque::from([head.clone()]);

    while let Some(id) = queue.pop_front() {
        for parent in graph.parent_ids(&id).unwrap_or_default() {
            if visited.insert(parent.clone()) {
                queue.push_back(parent.clone());
            }
        }
    }

    visited
}

/// Whether `commit` is `head` or one of its ancestors.
#[must_use]
pub fn is_ancestor(graph: &impl CommitGraph, commit: &ObjectId, head: &ObjectId) -> bool {
    ancestor_closure(graph, head).contains(commit)
}
