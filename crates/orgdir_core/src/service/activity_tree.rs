//! Activity taxonomy walker.
//!
//! # Responsibility
//! - Hold the activity hierarchy as an id-indexed forest.
//! - Collect bounded-depth descendant sets for activity searches.
//! - Render the hierarchy as a flat, depth-bounded pre-order listing.
//!
//! # Invariants
//! - Every walk is iterative and bounded by an explicit depth, so malformed
//!   parent links (cycles, dangling parents) never cause unbounded work.
//! - Sibling order is the order activities were handed to the forest.
//! - Walks never fail; missing ids yield empty continuations.

use crate::model::activity::{Activity, ActivityId};
use crate::repo::directory_repo::{DirectoryRepoResult, DirectoryRepository};
use std::collections::{HashMap, HashSet};

/// Number of taxonomy levels collected by [`ActivityForest::descendant_ids`].
///
/// The root is level 0, so levels 0, 1 and 2 are collected and children of
/// level-2 activities are never visited.
pub const DESCENDANT_DEPTH_LIMIT: usize = 3;

/// Default `max_depth` for [`ActivityForest::render`].
pub const DEFAULT_TREE_DEPTH: u32 = 3;

/// In-memory activity hierarchy addressed by stable ids.
#[derive(Debug, Clone, Default)]
pub struct ActivityForest {
    activities: HashMap<ActivityId, Activity>,
    children: HashMap<Option<ActivityId>, Vec<ActivityId>>,
}

impl ActivityForest {
    /// Builds a forest from activities in retrieval order.
    pub fn from_activities(activities: impl IntoIterator<Item = Activity>) -> Self {
        let mut forest = Self::default();
        for activity in activities {
            if forest.activities.contains_key(&activity.id) {
                continue;
            }
            forest
                .children
                .entry(activity.parent_id)
                .or_default()
                .push(activity.id);
            forest.activities.insert(activity.id, activity);
        }
        forest
    }

    /// Loads every activity from the store into a forest.
    ///
    /// One `list_activities` query per forest; walks never go back to the
    /// store level by level.
    pub fn load<R: DirectoryRepository>(repo: &R) -> DirectoryRepoResult<Self> {
        Ok(Self::from_activities(repo.list_activities()?))
    }

    /// Returns one activity by id.
    pub fn get(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Returns root activities (no parent) in retrieval order.
    pub fn roots(&self) -> Vec<&Activity> {
        self.children_of(None)
            .iter()
            .filter_map(|id| self.activities.get(id))
            .collect()
    }

    /// Collects `root` and its descendants down to [`DESCENDANT_DEPTH_LIMIT`].
    ///
    /// The walk is breadth-first with a visited set, so each id appears once,
    /// at its shallowest depth, and `root` always comes first. A `root` that
    /// is not in the forest yields `[root]`.
    pub fn descendant_ids(&self, root: ActivityId) -> Vec<ActivityId> {
        let mut collected = vec![root];
        let mut visited = HashSet::from([root]);
        let mut frontier = vec![root];

        for _depth in 1..DESCENDANT_DEPTH_LIMIT {
            let mut next = Vec::new();
            for parent in frontier {
                for &child in self.children_of(Some(parent)) {
                    if visited.insert(child) {
                        collected.push(child);
                        next.push(child);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        collected
    }

    /// Renders the forest as a flat depth-first pre-order listing.
    ///
    /// Roots sit at depth 0. An activity is emitted when its depth is below
    /// `max_depth`; its children are only looked at when they would be, too.
    /// `max_depth = 0` renders nothing and `max_depth = 1` renders roots only.
    pub fn render(&self, max_depth: u32) -> Vec<Activity> {
        let mut rendered = Vec::new();
        if max_depth == 0 {
            return rendered;
        }

        let mut stack = self
            .children_of(None)
            .iter()
            .rev()
            .map(|id| (*id, 0_u32))
            .collect::<Vec<_>>();

        while let Some((id, depth)) = stack.pop() {
            let Some(activity) = self.activities.get(&id) else {
                continue;
            };
            rendered.push(activity.clone());

            if depth + 1 < max_depth {
                stack.extend(
                    self.children_of(Some(id))
                        .iter()
                        .rev()
                        .map(|child| (*child, depth + 1)),
                );
            }
        }

        rendered
    }

    fn children_of(&self, parent_id: Option<ActivityId>) -> &[ActivityId] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
