//! Folder tree reconciliation
//!
//! The client shows folders as a nested display tree built from the flat
//! persisted folder list. After the user rearranges that tree, the edited
//! tree is diffed against the persisted state and replayed against the
//! backing store as an ordered sequence of rename/reorder operations.
//!
//! Each [`FolderTreeNode`] keeps the folder's *last persisted* pathname as
//! its identity; the node's target pathname is derived from its position in
//! the edited tree, and its target display order is its sibling index.
//!
//! Renames are sequenced so the store never holds two folders at the same
//! pathname: a rename whose destination is still occupied waits for the
//! occupant to move first, and rename cycles are broken by displacing one
//! occupant to a temporary pathname (`swap_target_pathname`, applied as a
//! two-phase rename).

#![allow(clippy::cast_possible_wrap)] // sibling indexes fit i64

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{folder_name, Folder, WorkspaceId};

/// One node of the display tree. `pathname` is the last persisted pathname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTreeNode {
    pub pathname: String,
    #[serde(default)]
    pub children: Vec<FolderTreeNode>,
}

impl FolderTreeNode {
    /// Leaf node with no children
    #[must_use]
    pub fn leaf(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            children: Vec::new(),
        }
    }
}

/// Ephemeral reconciliation descriptor.
///
/// `new_pathname == None` marks a reorder-only update. A populated
/// `swap_target_pathname` marks a two-phase rename: the folder currently at
/// `new_pathname` is moved to the swap target before this folder takes its
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTreeUpdate {
    pub old_pathname: String,
    pub new_pathname: Option<String>,
    pub display_order: i64,
    pub swap_target_pathname: Option<String>,
}

/// The seam to the backing store consumed during replay.
#[allow(async_fn_in_trait)]
pub trait FolderStore {
    /// Rename a folder, carrying its new display order. Fails if the
    /// destination pathname is occupied.
    async fn rename_folder(
        &self,
        workspace_id: &WorkspaceId,
        old_pathname: &str,
        new_pathname: &str,
        recursive: bool,
        display_order: i64,
    ) -> Result<()>;

    /// Update a folder's display order in place.
    async fn reorder_folder(
        &self,
        workspace_id: &WorkspaceId,
        pathname: &str,
        display_order: i64,
    ) -> Result<()>;
}

/// Build the nested display tree from the flat persisted folder list.
///
/// Siblings are ordered by (display order, pathname). A folder whose parent
/// pathname is not present in the list surfaces at the top level.
#[must_use]
pub fn build_folder_tree(folders: &[Folder]) -> Vec<FolderTreeNode> {
    let known: HashSet<&str> = folders.iter().map(|f| f.pathname.as_str()).collect();

    let mut children_of: HashMap<Option<String>, Vec<&Folder>> = HashMap::new();
    for folder in folders {
        let parent = folder
            .parent_pathname()
            .filter(|parent| known.contains(parent.as_str()));
        children_of.entry(parent).or_default().push(folder);
    }
    for group in children_of.values_mut() {
        group.sort_by(|a, b| {
            (a.display_order, a.pathname.as_str()).cmp(&(b.display_order, b.pathname.as_str()))
        });
    }

    build_nodes(None, &children_of)
}

fn build_nodes(
    parent: Option<&str>,
    children_of: &HashMap<Option<String>, Vec<&Folder>>,
) -> Vec<FolderTreeNode> {
    let key = parent.map(ToString::to_string);
    children_of.get(&key).map_or_else(Vec::new, |group| {
        group
            .iter()
            .map(|folder| FolderTreeNode {
                pathname: folder.pathname.clone(),
                children: build_nodes(Some(&folder.pathname), children_of),
            })
            .collect()
    })
}

/// Reject any tree in which two siblings share a leaf name.
///
/// Performed before an edited tree is accepted locally; a rejected edit is
/// discarded by the caller and the previous tree stays displayed.
pub fn validate_folder_tree(nodes: &[FolderTreeNode]) -> Result<()> {
    let mut seen = HashSet::new();
    for node in nodes {
        let name = folder_name(&node.pathname);
        if !seen.insert(name) {
            return Err(Error::DuplicatePathname(name.to_string()));
        }
        validate_folder_tree(&node.children)?;
    }
    Ok(())
}

struct PlannedNode {
    old_pathname: String,
    new_pathname: String,
    display_order: i64,
}

struct PendingRename {
    old_pathname: String,
    new_pathname: String,
    display_order: i64,
}

/// Diff the edited tree against the persisted folders and compute the
/// ordered update sequence to replay against the store.
///
/// Rename descriptors come first, sequenced collision-free; reorder-only
/// descriptors follow. Folders absent from the tree are left untouched.
pub fn plan_rearrangement(
    folders: &[Folder],
    tree: &[FolderTreeNode],
) -> Result<Vec<FolderTreeUpdate>> {
    let persisted: HashMap<&str, &Folder> =
        folders.iter().map(|f| (f.pathname.as_str(), f)).collect();

    let mut planned = Vec::new();
    collect_planned_nodes(tree, "", &persisted, &mut HashSet::new(), &mut planned)?;

    let mut renames = Vec::new();
    let mut reorders = Vec::new();
    for node in planned {
        let current = persisted[node.old_pathname.as_str()];
        if node.new_pathname == node.old_pathname {
            if node.display_order != current.display_order {
                reorders.push(FolderTreeUpdate {
                    old_pathname: node.old_pathname,
                    new_pathname: None,
                    display_order: node.display_order,
                    swap_target_pathname: None,
                });
            }
        } else {
            renames.push(PendingRename {
                old_pathname: node.old_pathname,
                new_pathname: node.new_pathname,
                display_order: node.display_order,
            });
        }
    }

    let mut updates = sequence_renames(folders, renames)?;
    updates.extend(reorders);
    Ok(updates)
}

fn collect_planned_nodes(
    nodes: &[FolderTreeNode],
    parent_pathname: &str,
    persisted: &HashMap<&str, &Folder>,
    seen: &mut HashSet<String>,
    planned: &mut Vec<PlannedNode>,
) -> Result<()> {
    for (index, node) in nodes.iter().enumerate() {
        if !persisted.contains_key(node.pathname.as_str()) {
            return Err(Error::InvalidInput(format!(
                "unknown folder in tree: {}",
                node.pathname
            )));
        }
        if !seen.insert(node.pathname.clone()) {
            return Err(Error::InvalidInput(format!(
                "folder appears twice in tree: {}",
                node.pathname
            )));
        }

        let new_pathname = format!("{parent_pathname}/{}", folder_name(&node.pathname));
        planned.push(PlannedNode {
            old_pathname: node.pathname.clone(),
            new_pathname: new_pathname.clone(),
            display_order: index as i64,
        });
        collect_planned_nodes(&node.children, &new_pathname, persisted, seen, planned)?;
    }
    Ok(())
}

/// Order renames so replaying them one at a time never leaves two folders at
/// one pathname, breaking cycles with a single displacement each.
fn sequence_renames(
    folders: &[Folder],
    mut pending: Vec<PendingRename>,
) -> Result<Vec<FolderTreeUpdate>> {
    let mut occupied: HashSet<String> = folders.iter().map(|f| f.pathname.clone()).collect();

    // Destinations must be unique, and an occupied destination must be
    // vacated by another rename in this batch.
    let mut destinations = HashSet::new();
    let moving: HashSet<&str> = pending.iter().map(|r| r.old_pathname.as_str()).collect();
    for rename in &pending {
        if !destinations.insert(rename.new_pathname.as_str()) {
            return Err(Error::DuplicatePathname(rename.new_pathname.clone()));
        }
        if occupied.contains(&rename.new_pathname) && !moving.contains(rename.new_pathname.as_str())
        {
            return Err(Error::DuplicatePathname(rename.new_pathname.clone()));
        }
    }

    let mut forbidden: HashSet<String> = occupied.clone();
    forbidden.extend(pending.iter().map(|r| r.new_pathname.clone()));

    let mut updates = Vec::new();
    while !pending.is_empty() {
        if let Some(index) = pending
            .iter()
            .position(|rename| !occupied.contains(&rename.new_pathname))
        {
            let rename = pending.swap_remove(index);
            occupied.remove(&rename.old_pathname);
            occupied.insert(rename.new_pathname.clone());
            updates.push(FolderTreeUpdate {
                old_pathname: rename.old_pathname,
                new_pathname: Some(rename.new_pathname),
                display_order: rename.display_order,
                swap_target_pathname: None,
            });
            continue;
        }

        // Every remaining destination is occupied by another pending rename:
        // a cycle. Displace the occupant of the first destination to a
        // temporary slot as part of a two-phase rename.
        let rename = pending.swap_remove(0);
        let swap_target = swap_pathname(&rename.new_pathname, &mut forbidden);
        let blocker = pending
            .iter_mut()
            .find(|candidate| candidate.old_pathname == rename.new_pathname)
            .ok_or_else(|| Error::DuplicatePathname(rename.new_pathname.clone()))?;
        blocker.old_pathname.clone_from(&swap_target);

        tracing::debug!(
            old = %rename.old_pathname,
            new = %rename.new_pathname,
            swap = %swap_target,
            "breaking rename cycle with displacement"
        );

        occupied.remove(&rename.new_pathname);
        occupied.insert(swap_target.clone());
        occupied.remove(&rename.old_pathname);
        occupied.insert(rename.new_pathname.clone());
        updates.push(FolderTreeUpdate {
            old_pathname: rename.old_pathname,
            new_pathname: Some(rename.new_pathname),
            display_order: rename.display_order,
            swap_target_pathname: Some(swap_target),
        });
    }

    Ok(updates)
}

/// Pick a temporary pathname that collides with nothing the plan touches.
fn swap_pathname(destination: &str, forbidden: &mut HashSet<String>) -> String {
    let mut counter = 0u32;
    loop {
        let candidate = if counter == 0 {
            format!("{destination}~moving")
        } else {
            format!("{destination}~moving-{counter}")
        };
        if forbidden.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Replay updates strictly in order, one store call at a time.
///
/// The first failing call halts the remaining sequence; already-applied
/// operations are not rolled back, and the local snapshot is expected to
/// re-sync from the store on the next refresh.
pub async fn apply_rearrangement<S: FolderStore>(
    store: &S,
    workspace_id: &WorkspaceId,
    updates: &[FolderTreeUpdate],
) -> Result<()> {
    for update in updates {
        match &update.new_pathname {
            None => {
                store
                    .reorder_folder(workspace_id, &update.old_pathname, update.display_order)
                    .await?;
            }
            Some(new_pathname) => {
                if let Some(swap_target) = &update.swap_target_pathname {
                    store
                        .rename_folder(
                            workspace_id,
                            new_pathname,
                            swap_target,
                            false,
                            update.display_order,
                        )
                        .await?;
                }
                store
                    .rename_folder(
                        workspace_id,
                        &update.old_pathname,
                        new_pathname,
                        false,
                        update.display_order,
                    )
                    .await?;
            }
        }
    }
    Ok(())
}

/// Mutual-exclusion flag preventing re-entrant rearrangement starts.
///
/// Not a cancellation protocol: an in-flight rearrangement runs to
/// completion or failure, and a second start is refused meanwhile.
#[derive(Debug, Default)]
pub struct RearrangementGate {
    in_flight: bool,
}

impl RearrangementGate {
    #[must_use]
    pub const fn is_rearranging(&self) -> bool {
        self.in_flight
    }

    fn begin(&mut self) -> bool {
        if self.in_flight {
            false
        } else {
            self.in_flight = true;
            true
        }
    }

    fn end(&mut self) {
        self.in_flight = false;
    }
}

/// Outcome of a rearrangement attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum RearrangeOutcome {
    /// The applied update sequence
    Applied(Vec<FolderTreeUpdate>),
    /// Refused: another rearrangement is in flight
    AlreadyRearranging,
}

/// Validate, plan and replay an edited tree against the store.
///
/// The gate is released on failure as well, so a failed run does not wedge
/// later attempts.
pub async fn rearrange_folders<S: FolderStore>(
    gate: &mut RearrangementGate,
    store: &S,
    workspace_id: &WorkspaceId,
    folders: &[Folder],
    tree: &[FolderTreeNode],
) -> Result<RearrangeOutcome> {
    if !gate.begin() {
        return Ok(RearrangeOutcome::AlreadyRearranging);
    }

    let result = run_rearrangement(store, workspace_id, folders, tree).await;
    gate.end();
    result.map(RearrangeOutcome::Applied)
}

async fn run_rearrangement<S: FolderStore>(
    store: &S,
    workspace_id: &WorkspaceId,
    folders: &[Folder],
    tree: &[FolderTreeNode],
) -> Result<Vec<FolderTreeUpdate>> {
    validate_folder_tree(tree)?;
    let updates = plan_rearrangement(folders, tree)?;
    tracing::debug!(count = updates.len(), "applying folder tree updates");
    apply_rearrangement(store, workspace_id, &updates).await?;
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn folder(pathname: &str, display_order: i64) -> Folder {
        Folder::new(WorkspaceId::new(), pathname, display_order)
    }

    /// Store double tracking pathname occupancy. Rejects any rename into an
    /// occupied pathname, so a successful replay proves no intermediate
    /// collision ever occurred.
    #[derive(Default)]
    struct SimStore {
        state: Mutex<HashMap<String, i64>>,
        calls: Mutex<Vec<String>>,
        fail_at_call: Option<usize>,
    }

    impl SimStore {
        fn with_folders(folders: &[Folder]) -> Self {
            let state = folders
                .iter()
                .map(|f| (f.pathname.clone(), f.display_order))
                .collect();
            Self {
                state: Mutex::new(state),
                calls: Mutex::new(Vec::new()),
                fail_at_call: None,
            }
        }

        fn failing_at(folders: &[Folder], call: usize) -> Self {
            Self {
                fail_at_call: Some(call),
                ..Self::with_folders(folders)
            }
        }

        fn record(&self, call: String) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            if Some(calls.len()) == self.fail_at_call {
                return Err(Error::Store("injected failure".to_string()));
            }
            Ok(())
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn snapshot(&self) -> HashMap<String, i64> {
            self.state.lock().unwrap().clone()
        }
    }

    impl FolderStore for SimStore {
        async fn rename_folder(
            &self,
            _workspace_id: &WorkspaceId,
            old_pathname: &str,
            new_pathname: &str,
            _recursive: bool,
            display_order: i64,
        ) -> Result<()> {
            self.record(format!("rename {old_pathname} -> {new_pathname}"))?;
            let mut state = self.state.lock().unwrap();
            assert!(
                state.contains_key(old_pathname),
                "rename of unknown folder {old_pathname}"
            );
            assert!(
                !state.contains_key(new_pathname),
                "pathname collision at {new_pathname}"
            );
            state.remove(old_pathname);
            state.insert(new_pathname.to_string(), display_order);
            Ok(())
        }

        async fn reorder_folder(
            &self,
            _workspace_id: &WorkspaceId,
            pathname: &str,
            display_order: i64,
        ) -> Result<()> {
            self.record(format!("reorder {pathname}"))?;
            let mut state = self.state.lock().unwrap();
            assert!(
                state.contains_key(pathname),
                "reorder of unknown folder {pathname}"
            );
            state.insert(pathname.to_string(), display_order);
            Ok(())
        }
    }

    #[test]
    fn build_folder_tree_nests_and_orders() {
        let folders = vec![
            folder("/b", 1),
            folder("/a", 0),
            folder("/a/inner", 0),
            folder("/a/other", 1),
        ];

        let tree = build_folder_tree(&folders);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].pathname, "/a");
        assert_eq!(tree[1].pathname, "/b");
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].pathname, "/a/inner");
        assert_eq!(tree[0].children[1].pathname, "/a/other");
    }

    #[test]
    fn build_folder_tree_surfaces_orphans_at_top_level() {
        let folders = vec![folder("/a", 0), folder("/missing/child", 0)];

        let tree = build_folder_tree(&folders);
        let pathnames: Vec<_> = tree.iter().map(|n| n.pathname.as_str()).collect();
        assert_eq!(pathnames, vec!["/a", "/missing/child"]);
    }

    #[test]
    fn validate_accepts_unique_siblings() {
        let tree = vec![
            FolderTreeNode {
                pathname: "/a".to_string(),
                children: vec![FolderTreeNode::leaf("/a/x"), FolderTreeNode::leaf("/a/y")],
            },
            FolderTreeNode::leaf("/b"),
        ];
        assert!(validate_folder_tree(&tree).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_sibling_names() {
        // Two siblings would both resolve to the same pathname under their
        // parent, even though their persisted pathnames differ.
        let tree = vec![
            FolderTreeNode::leaf("/old/notes"),
            FolderTreeNode::leaf("/notes"),
        ];
        assert!(matches!(
            validate_folder_tree(&tree),
            Err(Error::DuplicatePathname(_))
        ));
    }

    #[test]
    fn validate_allows_same_name_in_different_parents() {
        let tree = vec![
            FolderTreeNode {
                pathname: "/a".to_string(),
                children: vec![FolderTreeNode::leaf("/a/notes")],
            },
            FolderTreeNode {
                pathname: "/b".to_string(),
                children: vec![FolderTreeNode::leaf("/b/notes")],
            },
        ];
        assert!(validate_folder_tree(&tree).is_ok());
    }

    #[test]
    fn plan_is_empty_for_unchanged_tree() {
        let folders = vec![folder("/a", 0), folder("/b", 1)];
        let tree = build_folder_tree(&folders);

        let updates = plan_rearrangement(&folders, &tree).unwrap();
        assert_eq!(updates, Vec::new());
    }

    #[test]
    fn plan_emits_reorders_for_order_only_change() {
        let folders = vec![folder("/a", 0), folder("/b", 1)];
        let tree = vec![FolderTreeNode::leaf("/b"), FolderTreeNode::leaf("/a")];

        let updates = plan_rearrangement(&folders, &tree).unwrap();
        assert_eq!(
            updates,
            vec![
                FolderTreeUpdate {
                    old_pathname: "/b".to_string(),
                    new_pathname: None,
                    display_order: 0,
                    swap_target_pathname: None,
                },
                FolderTreeUpdate {
                    old_pathname: "/a".to_string(),
                    new_pathname: None,
                    display_order: 1,
                    swap_target_pathname: None,
                },
            ]
        );
    }

    #[test]
    fn plan_moves_folder_with_descendants() {
        let folders = vec![folder("/a", 0), folder("/a/x", 0), folder("/b", 1)];
        // Drag /a (with child x) under /b.
        let tree = vec![FolderTreeNode {
            pathname: "/b".to_string(),
            children: vec![FolderTreeNode {
                pathname: "/a".to_string(),
                children: vec![FolderTreeNode::leaf("/a/x")],
            }],
        }];

        let updates = plan_rearrangement(&folders, &tree).unwrap();
        let renames: Vec<_> = updates
            .iter()
            .filter_map(|u| u.new_pathname.as_ref().map(|n| (u.old_pathname.as_str(), n.as_str())))
            .collect();
        assert!(renames.contains(&("/a", "/b/a")));
        assert!(renames.contains(&("/a/x", "/b/a/x")));
        assert!(updates.iter().all(|u| u.swap_target_pathname.is_none()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn pairwise_swap_produces_exactly_one_swap_descriptor() {
        let folders = vec![
            folder("/p", 0),
            folder("/q", 1),
            folder("/p/a", 0),
            folder("/q/a", 0),
        ];
        // Exchange the two "a" folders between parents /p and /q.
        let tree = vec![
            FolderTreeNode {
                pathname: "/p".to_string(),
                children: vec![FolderTreeNode::leaf("/q/a")],
            },
            FolderTreeNode {
                pathname: "/q".to_string(),
                children: vec![FolderTreeNode::leaf("/p/a")],
            },
        ];

        let updates = plan_rearrangement(&folders, &tree).unwrap();
        let swaps: Vec<_> = updates
            .iter()
            .filter(|u| u.swap_target_pathname.is_some())
            .collect();
        assert_eq!(swaps.len(), 1);

        let store = SimStore::with_folders(&folders);
        let workspace_id = WorkspaceId::new();
        apply_rearrangement(&store, &workspace_id, &updates)
            .await
            .unwrap();

        let state = store.snapshot();
        assert!(state.contains_key("/p/a"));
        assert!(state.contains_key("/q/a"));
        assert_eq!(state.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn three_cycle_resolves_with_single_displacement() {
        let folders = vec![
            folder("/p", 0),
            folder("/q", 1),
            folder("/r", 2),
            folder("/p/n", 0),
            folder("/q/n", 0),
            folder("/r/n", 0),
        ];
        // Rotate the three "n" folders: p's goes to q, q's to r, r's to p.
        let tree = vec![
            FolderTreeNode {
                pathname: "/p".to_string(),
                children: vec![FolderTreeNode::leaf("/r/n")],
            },
            FolderTreeNode {
                pathname: "/q".to_string(),
                children: vec![FolderTreeNode::leaf("/p/n")],
            },
            FolderTreeNode {
                pathname: "/r".to_string(),
                children: vec![FolderTreeNode::leaf("/q/n")],
            },
        ];

        let updates = plan_rearrangement(&folders, &tree).unwrap();
        let swaps = updates
            .iter()
            .filter(|u| u.swap_target_pathname.is_some())
            .count();
        assert_eq!(swaps, 1);

        let store = SimStore::with_folders(&folders);
        let workspace_id = WorkspaceId::new();
        apply_rearrangement(&store, &workspace_id, &updates)
            .await
            .unwrap();

        let state = store.snapshot();
        for pathname in ["/p/n", "/q/n", "/r/n"] {
            assert!(state.contains_key(pathname), "missing {pathname}");
        }
        assert_eq!(state.len(), 6);
    }

    #[test]
    fn plan_rejects_destination_held_by_unmoving_folder() {
        let folders = vec![folder("/a", 0), folder("/b", 1), folder("/b/a", 0)];
        // Move /a under /b, where an unrelated folder already sits at /b/a
        // and stays put.
        let tree = vec![FolderTreeNode {
            pathname: "/b".to_string(),
            children: vec![FolderTreeNode::leaf("/b/a"), FolderTreeNode::leaf("/a")],
        }];

        // Sibling validation already catches the duplicate here.
        assert!(matches!(
            validate_folder_tree(&tree),
            Err(Error::DuplicatePathname(_))
        ));

        // And the planner independently refuses the colliding rename.
        let tree = vec![FolderTreeNode {
            pathname: "/b".to_string(),
            children: vec![FolderTreeNode::leaf("/a")],
        }];
        let folders_without_tree_entry = folders;
        assert!(matches!(
            plan_rearrangement(&folders_without_tree_entry, &tree),
            Err(Error::DuplicatePathname(_))
        ));
    }

    #[test]
    fn plan_rejects_unknown_tree_node() {
        let folders = vec![folder("/a", 0)];
        let tree = vec![FolderTreeNode::leaf("/ghost")];
        assert!(matches!(
            plan_rearrangement(&folders, &tree),
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn apply_halts_at_first_store_failure() {
        let folders = vec![folder("/a", 0), folder("/b", 1), folder("/c", 2)];
        let tree = vec![
            FolderTreeNode::leaf("/c"),
            FolderTreeNode::leaf("/a"),
            FolderTreeNode::leaf("/b"),
        ];

        let updates = plan_rearrangement(&folders, &tree).unwrap();
        assert_eq!(updates.len(), 3);

        let store = SimStore::failing_at(&folders, 2);
        let workspace_id = WorkspaceId::new();
        let result = apply_rearrangement(&store, &workspace_id, &updates).await;

        assert!(matches!(result, Err(Error::Store(_))));
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn successful_replay_reaches_target_state() {
        let folders = vec![
            folder("/inbox", 0),
            folder("/archive", 1),
            folder("/inbox/drafts", 0),
        ];
        // Move drafts under archive and flip the top-level order.
        let tree = vec![
            FolderTreeNode {
                pathname: "/archive".to_string(),
                children: vec![FolderTreeNode::leaf("/inbox/drafts")],
            },
            FolderTreeNode::leaf("/inbox"),
        ];

        let updates = plan_rearrangement(&folders, &tree).unwrap();
        let store = SimStore::with_folders(&folders);
        let workspace_id = WorkspaceId::new();
        apply_rearrangement(&store, &workspace_id, &updates)
            .await
            .unwrap();

        let state = store.snapshot();
        assert_eq!(state.get("/archive"), Some(&0));
        assert_eq!(state.get("/inbox"), Some(&1));
        assert_eq!(state.get("/archive/drafts"), Some(&0));
        assert!(!state.contains_key("/inbox/drafts"));
    }

    #[test]
    fn gate_refuses_reentrant_start() {
        let mut gate = RearrangementGate::default();
        assert!(!gate.is_rearranging());
        assert!(gate.begin());
        assert!(gate.is_rearranging());
        assert!(!gate.begin());
        gate.end();
        assert!(gate.begin());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rearrange_folders_skips_while_in_flight() {
        let folders = vec![folder("/a", 0), folder("/b", 1)];
        let tree = vec![FolderTreeNode::leaf("/b"), FolderTreeNode::leaf("/a")];
        let store = SimStore::with_folders(&folders);
        let workspace_id = WorkspaceId::new();

        let mut gate = RearrangementGate::default();
        assert!(gate.begin());

        let outcome = rearrange_folders(&mut gate, &store, &workspace_id, &folders, &tree)
            .await
            .unwrap();
        assert_eq!(outcome, RearrangeOutcome::AlreadyRearranging);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rearrange_folders_releases_gate_after_failure() {
        let folders = vec![folder("/a", 0), folder("/b", 1)];
        let tree = vec![FolderTreeNode::leaf("/b"), FolderTreeNode::leaf("/a")];
        let store = SimStore::failing_at(&folders, 1);
        let workspace_id = WorkspaceId::new();
        let mut gate = RearrangementGate::default();

        let result = rearrange_folders(&mut gate, &store, &workspace_id, &folders, &tree).await;
        assert!(result.is_err());
        assert!(!gate.is_rearranging());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rearrange_folders_rejects_duplicate_tree_without_store_calls() {
        let folders = vec![folder("/old/notes", 0), folder("/notes", 1)];
        let tree = vec![
            FolderTreeNode::leaf("/old/notes"),
            FolderTreeNode::leaf("/notes"),
        ];
        let store = SimStore::with_folders(&folders);
        let workspace_id = WorkspaceId::new();
        let mut gate = RearrangementGate::default();

        let result = rearrange_folders(&mut gate, &store, &workspace_id, &folders, &tree).await;
        assert!(matches!(result, Err(Error::DuplicatePathname(_))));
        assert_eq!(store.call_count(), 0);
        assert!(!gate.is_rearranging());
    }
}
