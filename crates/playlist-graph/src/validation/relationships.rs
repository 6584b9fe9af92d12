use std::collections::{HashMap, HashSet};

use crate::document::GraphDocument;
use crate::validation::{error_codes, ValidationError, Validator};

/// A declared edge whose counterpart is missing on the other node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asymmetry {
    /// `parent` lists `child` as a child, but `child` has no parent entry for `parent`
    MissingParentEntry { parent: String, child: String },
    /// `child` lists `parent` as a parent, but `parent` does not list `child`
    MissingChildEntry { parent: String, child: String },
    /// An edge points at an id with no document entry
    UnknownPlaylist { playlist_id: String, referenced_by: String },
}

struct DeclaredIds<'a> {
    children: HashSet<&'a str>,
    parents: HashSet<&'a str>,
}

/// Find every child/parent declaration lacking its symmetric counterpart
pub fn find_asymmetric_relationships(document: &GraphDocument) -> Vec<Asymmetry> {
    let declared: HashMap<&str, DeclaredIds<'_>> = document
        .iter()
        .map(|(playlist_id, node)| {
            let ids = DeclaredIds {
                children: node.children.iter().map(String::as_str).collect(),
                parents: node.parents.iter().map(|edge| edge.id.as_str()).collect(),
            };
            (playlist_id.as_str(), ids)
        })
        .collect();

    let mut faults = Vec::new();

    for (playlist_id, node) in document.iter() {
        for edge in &node.parents {
            match declared.get(edge.id.as_str()) {
                None => faults.push(Asymmetry::UnknownPlaylist {
                    playlist_id: edge.id.clone(),
                    referenced_by: playlist_id.clone(),
                }),
                Some(parent) if !parent.children.contains(playlist_id.as_str()) => {
                    faults.push(Asymmetry::MissingChildEntry {
                        parent: edge.id.clone(),
                        child: playlist_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        for child_id in &node.children {
            match declared.get(child_id.as_str()) {
                None => faults.push(Asymmetry::UnknownPlaylist {
                    playlist_id: child_id.clone(),
                    referenced_by: playlist_id.clone(),
                }),
                Some(child) if !child.parents.contains(playlist_id.as_str()) => {
                    faults.push(Asymmetry::MissingParentEntry {
                        parent: playlist_id.clone(),
                        child: child_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    faults
}

/// True only if every declared child and parent edge has its counterpart
pub fn has_valid_relationships(document: &GraphDocument) -> bool {
    find_asymmetric_relationships(document).is_empty()
}

/// Reports one-sided edge declarations and dangling ids
pub struct RelationshipValidator;

impl Validator for RelationshipValidator {
    fn validate(&self, document: &GraphDocument) -> Vec<ValidationError> {
        find_asymmetric_relationships(document)
            .into_iter()
            .map(|fault| match fault {
                Asymmetry::MissingParentEntry { parent, child } => ValidationError {
                    code: error_codes::ASYMMETRIC_RELATIONSHIP,
                    message: format!(
                        "'{}' lists '{}' as a child, but '{}' has no parent entry for '{}'",
                        parent, child, child, parent
                    ),
                    path: Some(format!("{}.parents", child)),
                },
                Asymmetry::MissingChildEntry { parent, child } => ValidationError {
                    code: error_codes::ASYMMETRIC_RELATIONSHIP,
                    message: format!(
                        "'{}' lists '{}' as a parent, but '{}' does not list '{}' as a child",
                        child, parent, parent, child
                    ),
                    path: Some(format!("{}.children", parent)),
                },
                Asymmetry::UnknownPlaylist {
                    playlist_id,
                    referenced_by,
                } => ValidationError {
                    code: error_codes::UNKNOWN_PLAYLIST,
                    message: format!(
                        "'{}' references playlist '{}' which is not in the document",
                        referenced_by, playlist_id
                    ),
                    path: Some(referenced_by),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_support::{document, node};

    #[test]
    fn test_symmetric_document_is_valid() {
        let doc = document(vec![
            node("a", &[], &[("b", 1)]),
            node("b", &["a"], &[("d", 2)]),
            node("c", &[], &[("d", 3)]),
            node("d", &["b", "c"], &[]),
        ]);

        assert!(has_valid_relationships(&doc));
        assert!(RelationshipValidator.validate(&doc).is_empty());
    }

    #[test]
    fn test_child_without_parent_entry() {
        let doc = document(vec![node("a", &["b"], &[]), node("b", &[], &[])]);

        assert!(!has_valid_relationships(&doc));
        assert_eq!(
            find_asymmetric_relationships(&doc),
            vec![Asymmetry::MissingParentEntry {
                parent: "a".to_string(),
                child: "b".to_string(),
            }]
        );
    }

    #[test]
    fn test_parent_without_child_entry() {
        let doc = document(vec![node("a", &[], &[]), node("b", &[], &[("a", 4)])]);

        assert!(!has_valid_relationships(&doc));
        let errors = RelationshipValidator.validate(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, error_codes::ASYMMETRIC_RELATIONSHIP);
        assert_eq!(errors[0].path.as_deref(), Some("a.children"));
    }

    #[test]
    fn test_dangling_reference_is_invalid() {
        let doc = document(vec![node("a", &["ghost"], &[])]);

        assert!(!has_valid_relationships(&doc));
        let errors = RelationshipValidator.validate(&doc);
        assert_eq!(errors[0].code, error_codes::UNKNOWN_PLAYLIST);
        assert!(errors[0].message.contains("ghost"));
    }

    #[test]
    fn test_empty_document_is_valid() {
        assert!(has_valid_relationships(&GraphDocument::new()));
    }
}
