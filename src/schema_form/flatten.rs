//! Pre-order flattening of a field tree
//!
//! A parent always precedes its descendants and sibling order is kept. Children
//! are spliced into the output one by one, so the result never contains a
//! nested group. Traversal uses an explicit stack bounded by `max_depth`.

use crate::domain::{FieldDefinition, FormError, FormResult};

/// Nesting bound used when none is configured
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Flatten `roots` into a single ordered sequence.
///
/// Every returned node has its `children` emptied; they appear after it in the
/// sequence instead. Fails with [`FormError::SchemaTooDeep`] when a node sits
/// more than `max_depth` levels below the roots (roots are level 1).
pub fn flatten(roots: Vec<FieldDefinition>, max_depth: usize) -> FormResult<Vec<FieldDefinition>> {
    let mut out = Vec::with_capacity(roots.len());
    let mut stack: Vec<(FieldDefinition, usize)> = roots.into_iter().rev().map(|f| (f, 1)).collect();

    while let Some((mut node, depth)) = stack.pop() {
        if depth > max_depth {
            return Err(FormError::SchemaTooDeep { max_depth });
        }
        let children = std::mem::take(&mut node.children);
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
        out.push(node);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(fields: &[FieldDefinition]) -> Vec<&str> {
        fields.iter().filter_map(|f| f.path.as_deref()).collect()
    }

    fn sample_tree() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("a").with_children(vec![
                FieldDefinition::new("a.1").with_children(vec![FieldDefinition::new("a.1.x")]),
                FieldDefinition::new("a.2"),
            ]),
            FieldDefinition::new("b"),
            FieldDefinition::new("c").with_children(vec![FieldDefinition::new("c.1")]),
        ]
    }

    #[test]
    fn test_preorder_splices_children() {
        let flat = flatten(sample_tree(), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(paths(&flat), vec!["a", "a.1", "a.1.x", "a.2", "b", "c", "c.1"]);
        assert!(flat.iter().all(|f| f.children.is_empty()));
    }

    #[test]
    fn test_every_node_exactly_once() {
        let flat = flatten(sample_tree(), DEFAULT_MAX_DEPTH).unwrap();
        let mut seen = paths(&flat);
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total);
        assert_eq!(total, 7);
    }

    #[test]
    fn test_parent_before_descendants() {
        let flat = flatten(sample_tree(), DEFAULT_MAX_DEPTH).unwrap();
        let order = paths(&flat);
        let pos = |p: &str| order.iter().position(|x| *x == p).unwrap();
        for (parent, child) in [("a", "a.1"), ("a.1", "a.1.x"), ("a", "a.2"), ("c", "c.1")] {
            assert!(pos(parent) < pos(child), "{} should precede {}", parent, child);
        }
    }

    #[test]
    fn test_empty_roots() {
        assert!(flatten(Vec::new(), DEFAULT_MAX_DEPTH).unwrap().is_empty());
    }

    #[test]
    fn test_depth_bound() {
        let mut node = FieldDefinition::new("leaf");
        for i in 0..5 {
            node = FieldDefinition::new(format!("level{}", i)).with_children(vec![node]);
        }

        // six levels in total
        assert_eq!(flatten(vec![node.clone()], 6).unwrap().len(), 6);
        let err = flatten(vec![node], 5).unwrap_err();
        assert!(matches!(err, FormError::SchemaTooDeep { max_depth: 5 }));
    }
}
