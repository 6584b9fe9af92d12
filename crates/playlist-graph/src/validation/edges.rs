use std::collections::HashSet;

use crate::document::GraphDocument;
use crate::validation::{error_codes, ValidationError, Validator};

/// An ordered (parent, child) pair declared more than once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEdge {
    pub parent: String,
    pub child: String,
}

/// Find every repeated child declaration, in document order
///
/// Each repeat beyond the first is reported once, so a pair declared three
/// times shows up twice.
pub fn find_duplicate_edges(document: &GraphDocument) -> Vec<DuplicateEdge> {
    let mut seen = HashSet::with_capacity(document.edge_count());
    let mut duplicates = Vec::new();

    for (playlist_id, node) in document.iter() {
        for child_id in &node.children {
            if !seen.insert(format!("{}:{}", playlist_id, child_id)) {
                duplicates.push(DuplicateEdge {
                    parent: playlist_id.clone(),
                    child: child_id.clone(),
                });
            }
        }
    }

    duplicates
}

/// Find every repeated parent entry, in document order
///
/// The pair is reported from the child's side: `parent` appears more than once
/// in `child`'s parent list.
pub fn find_repeated_parent_entries(document: &GraphDocument) -> Vec<DuplicateEdge> {
    let mut duplicates = Vec::new();

    for (playlist_id, node) in document.iter() {
        let mut seen = HashSet::with_capacity(node.parents.len());
        for edge in &node.parents {
            if !seen.insert(edge.id.as_str()) {
                duplicates.push(DuplicateEdge {
                    parent: edge.id.clone(),
                    child: playlist_id.clone(),
                });
            }
        }
    }

    duplicates
}

/// True if any ordered (parent, child) pair is declared as a child edge more than once
pub fn has_duplicate_edges(document: &GraphDocument) -> bool {
    let mut seen = HashSet::new();
    document.iter().any(|(playlist_id, node)| {
        node.children
            .iter()
            .any(|child_id| !seen.insert(format!("{}:{}", playlist_id, child_id)))
    })
}

/// Reports repeated child declarations and repeated parent entries
pub struct DuplicateEdgeValidator;

impl Validator for DuplicateEdgeValidator {
    fn validate(&self, document: &GraphDocument) -> Vec<ValidationError> {
        find_duplicate_edges(document)
            .into_iter()
            .map(|dup| ValidationError {
                code: error_codes::DUPLICATE_EDGE,
                message: format!(
                    "Edge '{}' -> '{}' is declared more than once",
                    dup.parent, dup.child
                ),
                path: Some(format!("{}.children", dup.parent)),
            })
            .chain(find_repeated_parent_entries(document).into_iter().map(|dup| ValidationError {
                code: error_codes::DUPLICATE_EDGE,
                message: format!(
                    "Parent '{}' is listed more than once by '{}'",
                    dup.parent, dup.child
                ),
                path: Some(format!("{}.parents", dup.child)),
            }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_support::{document, node};

    #[test]
    fn test_no_duplicates() {
        let doc = document(vec![
            node("a", &["b", "c"], &[]),
            node("b", &["c"], &[("a", 1)]),
            node("c", &[], &[("a", 1), ("b", 1)]),
        ]);

        assert!(!has_duplicate_edges(&doc));
        assert!(find_duplicate_edges(&doc).is_empty());
    }

    #[test]
    fn test_repeated_child_is_duplicate() {
        let doc = document(vec![node("a", &["b", "c", "b", "b"], &[])]);

        assert!(has_duplicate_edges(&doc));
        let dups = find_duplicate_edges(&doc);
        assert_eq!(dups.len(), 2);
        assert!(dups.iter().all(|d| d.parent == "a" && d.child == "b"));

        let errors = DuplicateEdgeValidator.validate(&doc);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, error_codes::DUPLICATE_EDGE);
        assert_eq!(errors[0].path.as_deref(), Some("a.children"));
    }

    #[test]
    fn test_reverse_direction_is_not_duplicate() {
        // a -> b and b -> a are different ordered pairs (that is a cycle, not a duplicate)
        let doc = document(vec![node("a", &["b"], &[]), node("b", &["a"], &[])]);
        assert!(!has_duplicate_edges(&doc));
    }

    #[test]
    fn test_repeated_parent_entry_is_duplicate() {
        let doc = document(vec![
            node("a", &[], &[("b", 1), ("b", 2)]),
            node("b", &["a"], &[]),
        ]);

        // child lists are clean, so only the validator sees it
        assert!(!has_duplicate_edges(&doc));
        assert_eq!(
            find_repeated_parent_entries(&doc),
            vec![DuplicateEdge {
                parent: "b".to_string(),
                child: "a".to_string(),
            }]
        );

        let errors = DuplicateEdgeValidator.validate(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, error_codes::DUPLICATE_EDGE);
        assert_eq!(errors[0].path.as_deref(), Some("a.parents"));
    }
}
