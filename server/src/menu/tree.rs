//! Menu tree assembly.
//!
//! Arranges the permission-visible menu items into a parent/child forest.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::db::MenuItem;

/// A menu item with its resolved children.
#[derive(Debug, Clone, Serialize)]
pub struct MenuNode {
    #[serde(flatten)]
    pub item: MenuItem,
    pub children: Vec<MenuNode>,
}

/// Arrange visible items into a forest.
///
/// An item attaches under `parent_id` only when that parent is itself in
/// the visible set; otherwise it becomes a root. Siblings sort ascending by
/// `position`, with id as the tie-break so output is deterministic.
pub fn build_menu_tree(items: Vec<MenuItem>) -> Vec<MenuNode> {
    // De-duplicate by id: the visibility query can yield an item once per
    // qualifying permission.
    let mut seen = HashSet::new();
    let mut unique: Vec<MenuItem> = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.id) {
            unique.push(item);
        }
    }

    let visible: HashSet<Uuid> = unique.iter().map(|item| item.id).collect();

    let mut children_of: HashMap<Uuid, Vec<MenuItem>> = HashMap::new();
    let mut roots: Vec<MenuItem> = Vec::new();
    for item in unique {
        match item.parent_id {
            Some(parent) if parent != item.id && visible.contains(&parent) => {
                children_of.entry(parent).or_default().push(item);
            }
            _ => roots.push(item),
        }
    }

    sort_siblings(&mut roots);
    roots
        .into_iter()
        .map(|item| attach_children(item, &mut children_of))
        .collect()
}

fn sort_siblings(items: &mut [MenuItem]) {
    items.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
}

fn attach_children(item: MenuItem, children_of: &mut HashMap<Uuid, Vec<MenuItem>>) -> MenuNode {
    let mut children = children_of.remove(&item.id).unwrap_or_default();
    sort_siblings(&mut children);

    let children = children
        .into_iter()
        .map(|child| attach_children(child, children_of))
        .collect();

    MenuNode { item, children }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn item(id: u128, parent: Option<u128>, position: i32) -> MenuItem {
        MenuItem {
            id: uuid(id),
            name: format!("item-{id}"),
            path: format!("/item-{id}"),
            icon: None,
            parent_id: parent.map(uuid),
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_input_builds_empty_forest() {
        assert!(build_menu_tree(Vec::new()).is_empty());
    }

    #[test]
    fn test_roots_and_children_sorted_by_position() {
        // A(1, root, position 2), B(2, child of A, position 1),
        // C(3, root, position 1) -> roots [C, A], A's children [B].
        let tree = build_menu_tree(vec![
            item(1, None, 2),
            item(2, Some(1), 1),
            item(3, None, 1),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].item.id, uuid(3));
        assert_eq!(tree[1].item.id, uuid(1));
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].item.id, uuid(2));
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_item_with_absent_parent_becomes_root() {
        // Parent 99 is not in the visible set (e.g. caller lacks its
        // permission), so its child enumerates as a root.
        let tree = build_menu_tree(vec![item(1, Some(99), 0)]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].item.id, uuid(1));
    }

    #[test]
    fn test_duplicate_rows_deduplicate_by_id() {
        // Two qualifying permissions for the same item produce two rows.
        let tree = build_menu_tree(vec![item(1, None, 0), item(1, None, 0)]);

        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_position_tie_breaks_by_id() {
        let tree = build_menu_tree(vec![item(2, None, 5), item(1, None, 5)]);

        assert_eq!(tree[0].item.id, uuid(1));
        assert_eq!(tree[1].item.id, uuid(2));
    }

    #[test]
    fn test_nested_grandchildren() {
        let tree = build_menu_tree(vec![
            item(1, None, 0),
            item(2, Some(1), 0),
            item(3, Some(2), 0),
        ]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].children[0].item.id, uuid(3));
    }

    #[test]
    fn test_children_of_one_parent_sorted() {
        let tree = build_menu_tree(vec![
            item(1, None, 0),
            item(2, Some(1), 3),
            item(3, Some(1), 1),
            item(4, Some(1), 2),
        ]);

        let child_ids: Vec<Uuid> = tree[0].children.iter().map(|c| c.item.id).collect();
        assert_eq!(child_ids, vec![uuid(3), uuid(4), uuid(2)]);
    }

    #[test]
    fn test_node_serializes_item_fields_inline() {
        let tree = build_menu_tree(vec![item(1, None, 7)]);
        let json = serde_json::to_value(&tree[0]).unwrap();

        assert_eq!(json["name"], "item-1");
        assert_eq!(json["order"], 7);
        assert!(json["children"].as_array().unwrap().is_empty());
    }
}
