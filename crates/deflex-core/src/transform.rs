//! Optional passes over the raw tree, between ingestion and tree building.
//!
//! Each pass has a single responsibility and is enabled by its own
//! `BuildConfig` flag; `convert` applies them in the order defined here.

use crate::config::{BuildConfig, Z_INDEX_TEXT};
use crate::model::{Tag, VTree};
use petgraph::graph::NodeIndex;

// ─── Ghost nodes ─────────────────────────────────────────────────────────

/// Unwrap style-less group containers into their parent.
///
/// Design exports are full of grouping layers that only organize the file.
/// Splicing them out lets the tree builder regroup their members purely by
/// geometry. The page, chrome, attach nodes and white-listed IDs are kept.
/// Returns the number of nodes removed.
pub fn remove_ghost_nodes(tree: &mut VTree, config: &BuildConfig) -> usize {
    let ghosts: Vec<NodeIndex> = tree
        .descendants(tree.root)
        .into_iter()
        .filter(|&idx| is_ghost(tree, idx, config))
        .collect();

    // Innermost first, so each splice sees its final member list.
    for &ghost in ghosts.iter().rev() {
        let Some(parent) = tree.parent(ghost) else {
            continue;
        };
        let mut order = Vec::new();
        for sibling in tree.children(parent) {
            if sibling == ghost {
                order.extend(tree.children(ghost));
            } else {
                order.push(sibling);
            }
        }
        tree.set_children(parent, &order);
        for attach in tree.attach_nodes(ghost) {
            tree.push_attach(parent, attach);
        }
        log::trace!("ghost: unwrapped {}", tree[ghost].label());
        tree.remove(ghost);
    }

    log::debug!("ghost: {} nodes removed", ghosts.len());
    ghosts.len()
}

fn is_ghost(tree: &VTree, idx: NodeIndex, config: &BuildConfig) -> bool {
    let node = &tree[idx];
    idx != tree.root
        && tree.parent(idx).is_some()
        && node.tag == Tag::View
        && node.role.is_empty()
        && !node.has_visual_style()
        && !tree.is_leaf(idx)
        && node
            .id
            .as_ref()
            .is_some_and(|id| !config.is_white_listed(id.as_str()))
}

// ─── Z-index ─────────────────────────────────────────────────────────────

/// Number flow children by paint order.
///
/// Later siblings paint on top, so numbering runs forward over the sibling
/// list: the first non-text child gets `z-[1]` and the topmost the highest
/// number. Exports that list the topmost layer first would need the list
/// reversed before this pass. Text always sits above its siblings with
/// `Z_INDEX_TEXT`. The owner records the count so its own stacking context
/// covers them. A node numbered by its parent keeps that number.
pub fn assign_z_index(tree: &mut VTree) {
    for idx in tree.descendants(tree.root) {
        let children = tree.children(idx);
        if children.is_empty() {
            continue;
        }
        let mut count = 0;
        for child in children {
            let z = if tree[child].is_text() {
                Z_INDEX_TEXT
            } else {
                count += 1;
                count
            };
            let node = &mut tree[child];
            if !node.class_list.has_prefix("z-") {
                node.class_list.push(format!("z-[{z}]"));
                node.class_list.push("relative");
            }
        }
        let owner = &mut tree[idx];
        if !owner.class_list.has_prefix("z-") {
            owner.class_list.push(format!("z-[{count}]"));
        }
    }
}
