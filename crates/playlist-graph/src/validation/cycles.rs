use std::collections::{HashMap, HashSet};

use crate::document::GraphDocument;
use crate::validation::{error_codes, ValidationError, Validator};

/// Collect the downstream neighbours of every playlist.
///
/// An edge P -> C counts if either side declares it: C in P's children, or P in
/// C's parents. Ids with no document entry are left out.
fn successors(document: &GraphDocument) -> HashMap<&str, Vec<&str>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = document
        .ids()
        .map(|id| (id.as_str(), Vec::new()))
        .collect();
    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(document.edge_count());

    for (playlist_id, node) in document.iter() {
        for child_id in &node.children {
            if document.contains(child_id) && seen.insert((playlist_id.as_str(), child_id.as_str())) {
                adjacency
                    .entry(playlist_id.as_str())
                    .or_default()
                    .push(child_id.as_str());
            }
        }
    }

    for (playlist_id, node) in document.iter() {
        for edge in &node.parents {
            let parent_id = edge.id.as_str();
            if document.contains(parent_id) && seen.insert((parent_id, playlist_id.as_str())) {
                adjacency.entry(parent_id).or_default().push(playlist_id.as_str());
            }
        }
    }

    adjacency
}

/// Find a cycle in the document, returning the playlist ids along it
///
/// Depth-first search with a visited set and an on-stack set, run from every
/// entry so disconnected components are covered. The search keeps an explicit
/// frame stack instead of recursing. The returned path starts at the node the
/// back-edge points to; the last id links back to the first.
pub fn find_cycle(document: &GraphDocument) -> Option<Vec<String>> {
    let adjacency = successors(document);
    let mut visited: HashSet<&str> = HashSet::with_capacity(document.len());
    let mut on_stack: HashSet<&str> = HashSet::new();

    for start in document.ids() {
        let start = start.as_str();
        if visited.contains(start) {
            continue;
        }

        visited.insert(start);
        on_stack.insert(start);
        let mut path: Vec<(&str, usize)> = vec![(start, 0)];

        while let Some(frame) = path.last_mut() {
            let current = frame.0;
            let next = adjacency
                .get(current)
                .and_then(|targets| targets.get(frame.1))
                .copied();
            frame.1 += 1;

            match next {
                Some(target) if on_stack.contains(target) => {
                    let begin = path
                        .iter()
                        .position(|(id, _)| *id == target)
                        .unwrap_or(0);
                    return Some(path[begin..].iter().map(|(id, _)| id.to_string()).collect());
                }
                Some(target) => {
                    if visited.insert(target) {
                        on_stack.insert(target);
                        path.push((target, 0));
                    }
                }
                None => {
                    on_stack.remove(current);
                    path.pop();
                }
            }
        }
    }

    None
}

/// True if the document contains any cycle, self-loops included
pub fn has_cycle(document: &GraphDocument) -> bool {
    find_cycle(document).is_some()
}

/// Reports a circular dependency between playlists
pub struct CycleValidator;

impl Validator for CycleValidator {
    fn validate(&self, document: &GraphDocument) -> Vec<ValidationError> {
        let Some(cycle) = find_cycle(document) else {
            return Vec::new();
        };

        let mut chain = cycle.join(" → ");
        chain.push_str(" → ");
        chain.push_str(&cycle[0]);

        vec![ValidationError {
            code: error_codes::CIRCULAR_DEPENDENCY,
            message: format!("Circular dependency detected in playlist chain: {}", chain),
            path: Some(cycle[0].clone()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_support::{document, node};

    #[test]
    fn test_acyclic_diamond() {
        let doc = document(vec![
            node("a", &["b", "c"], &[]),
            node("b", &["d"], &[("a", 1)]),
            node("c", &["d"], &[("a", 1)]),
            node("d", &[], &[("b", 1), ("c", 1)]),
        ]);

        assert!(!has_cycle(&doc));
        assert!(CycleValidator.validate(&doc).is_empty());
    }

    #[test]
    fn test_three_node_cycle() {
        let doc = document(vec![
            node("a", &["b"], &[("c", 0)]),
            node("b", &["c"], &[("a", 0)]),
            node("c", &["a"], &[("b", 0)]),
        ]);

        assert_eq!(
            find_cycle(&doc),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );

        let errors = CycleValidator.validate(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, error_codes::CIRCULAR_DEPENDENCY);
        assert!(errors[0].message.contains("a → b → c → a"));
    }

    #[test]
    fn test_self_loop() {
        let doc = document(vec![node("a", &["a"], &[("a", 0)])]);
        assert_eq!(find_cycle(&doc), Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_cycle_declared_only_through_parents() {
        let doc = document(vec![node("a", &[], &[("b", 0)]), node("b", &[], &[("a", 0)])]);
        assert!(has_cycle(&doc));
    }

    #[test]
    fn test_cycle_in_disconnected_component() {
        let doc = document(vec![
            node("a", &["b"], &[]),
            node("b", &[], &[("a", 1)]),
            node("x", &["y"], &[("y", 1)]),
            node("y", &["x"], &[("x", 1)]),
        ]);

        let cycle = find_cycle(&doc).unwrap();
        assert_eq!(cycle, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_dangling_child_is_ignored() {
        let doc = document(vec![node("a", &["ghost"], &[])]);
        assert!(!has_cycle(&doc));
    }

    #[test]
    fn test_empty_document() {
        assert!(!has_cycle(&GraphDocument::new()));
    }
}
