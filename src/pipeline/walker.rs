use crate::types::DocumentNode;

/// A visited node together with the names of its strict ancestors,
/// root first. The node's own name is appended by whoever builds a
/// record from the visit, not here.
#[derive(Debug)]
pub struct NodeVisit<'a> {
    pub node: &'a DocumentNode,
    pub path: Vec<String>,
}

/// Lazy depth-first pre-order iterator over a document tree.
///
/// Visits every node exactly once, parent before children, preserving
/// sibling order. Absent or empty `children` is a leaf. The ancestor trail
/// is kept on a single stack, so memory for the path stays proportional to
/// tree depth. No recursion, so deep nesting cannot overflow the call stack.
pub struct TreeWalker<'a> {
    stack: Vec<(&'a DocumentNode, usize)>,
    trail: Vec<String>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(root: &'a DocumentNode) -> Self {
        Self {
            stack: vec![(root, 0)],
            trail: Vec::new(),
        }
    }
}

impl<'a> Iterator for TreeWalker<'a> {
    type Item = NodeVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;

        // Entries deeper than this node belong to an already-finished
        // subtree; cut the trail back to this node's ancestors.
        self.trail.truncate(depth);
        let path = self.trail.clone();
        self.trail.push(node.name.clone());

        // Reverse push keeps original sibling order on pop.
        for child in node.children.iter().rev() {
            self.stack.push((child, depth + 1));
        }

        Some(NodeVisit { node, path })
    }
}

/// Convenience constructor mirroring `TreeWalker::new`.
pub fn walk(root: &DocumentNode) -> TreeWalker<'_> {
    TreeWalker::new(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> DocumentNode {
        serde_json::from_value(json!({
            "id": "0:0",
            "name": "Root",
            "type": "DOCUMENT",
            "children": [
                {
                    "id": "1:0",
                    "name": "PageA",
                    "type": "CANVAS",
                    "children": [
                        { "id": "1:1", "name": "Button", "type": "COMPONENT" },
                        {
                            "id": "1:2",
                            "name": "Card",
                            "type": "FRAME",
                            "children": [
                                { "id": "1:3", "name": "Icon", "type": "INSTANCE" }
                            ]
                        }
                    ]
                },
                { "id": "2:0", "name": "PageB", "type": "CANVAS" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn visits_every_node_once_in_preorder() {
        let root = tree();
        let ids: Vec<&str> = walk(&root).map(|v| v.node.id.as_str()).collect();
        assert_eq!(ids, vec!["0:0", "1:0", "1:1", "1:2", "1:3", "2:0"]);
    }

    #[test]
    fn path_holds_strict_ancestors_root_first() {
        let root = tree();
        let visit = walk(&root).find(|v| v.node.id == "1:3").unwrap();
        assert_eq!(visit.path, vec!["Root", "PageA", "Card"]);

        let top = walk(&root).next().unwrap();
        assert!(top.path.is_empty());
    }

    #[test]
    fn sibling_order_is_preserved_after_nested_subtree() {
        let root = tree();
        let names: Vec<&str> = walk(&root).map(|v| v.node.name.as_str()).collect();
        // PageB comes after PageA's whole subtree
        assert_eq!(names.last(), Some(&"PageB"));
    }

    #[test]
    fn missing_children_is_a_leaf() {
        let root: DocumentNode = serde_json::from_value(json!({
            "id": "9:9",
            "name": "Lonely",
            "type": "FRAME"
        }))
        .unwrap();
        assert_eq!(walk(&root).count(), 1);
    }

    #[test]
    fn walker_is_restartable_from_the_same_root() {
        let root = tree();
        let first: Vec<String> = walk(&root).map(|v| v.node.id.clone()).collect();
        let second: Vec<String> = walk(&root).map(|v| v.node.id.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn deep_nesting_keeps_path_bounded_by_depth() {
        let mut node = json!({ "id": "d:0", "name": "Leaf", "type": "FRAME" });
        for i in 1..=200 {
            node = json!({
                "id": format!("d:{}", i),
                "name": format!("Level{}", i),
                "type": "FRAME",
                "children": [node]
            });
        }
        let root: DocumentNode = serde_json::from_value(node).unwrap();
        let visits: Vec<_> = walk(&root).map(|v| v.path.len()).collect();
        assert_eq!(visits.len(), 201);
        assert_eq!(*visits.last().unwrap(), 200);
    }
}
