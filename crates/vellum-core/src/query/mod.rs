//! Smart view evaluation
//!
//! Evaluates a stored [`Condition`] against in-memory documents. Evaluation is
//! pure and never fails: a comparison against a property the document does not
//! carry is simply false. `filter` is a lazy pass over its input and preserves
//! the input order; nothing is cached between calls.

use std::cmp::Ordering;

use crate::models::{is_descendant_pathname, normalize_tag, Condition, Document, PropOp, PropValue};

/// Check whether a single document satisfies the condition.
#[must_use]
pub fn matches(condition: &Condition, document: &Document) -> bool {
    match condition {
        Condition::And { conditions } => conditions.iter().all(|c| matches(c, document)),
        Condition::Or { conditions } => conditions.iter().any(|c| matches(c, document)),
        Condition::Tag { tag } => document.has_tag(tag),
        Condition::InFolder { pathname } => {
            document.folder_pathname == *pathname
                || is_descendant_pathname(pathname, &document.folder_pathname)
        }
        Condition::Bookmarked { bookmarked } => document.bookmarked == *bookmarked,
        Condition::Prop { name, op, value } => document
            .props
            .get(name)
            .is_some_and(|actual| compare_prop(actual, *op, value)),
    }
}

/// Filter documents by a condition, preserving input order.
///
/// The returned iterator borrows the condition and re-evaluates on every
/// pass; call it again to restart.
pub fn filter<'a, I>(
    condition: &'a Condition,
    documents: I,
) -> impl Iterator<Item = &'a Document> + 'a
where
    I: IntoIterator<Item = &'a Document>,
    I::IntoIter: 'a,
{
    documents
        .into_iter()
        .filter(move |document| matches(condition, document))
}

fn compare_prop(actual: &PropValue, op: PropOp, expected: &PropValue) -> bool {
    match op {
        PropOp::Eq => prop_eq(actual, expected),
        PropOp::Contains => match (actual, expected) {
            (PropValue::Text(haystack), PropValue::Text(needle)) => {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => false,
        },
        PropOp::Gt => prop_ordering(actual, expected) == Some(Ordering::Greater),
        PropOp::Lt => prop_ordering(actual, expected) == Some(Ordering::Less),
    }
}

fn prop_eq(actual: &PropValue, expected: &PropValue) -> bool {
    match (actual, expected) {
        (PropValue::Text(a), PropValue::Text(b)) => normalize_tag(a) == normalize_tag(b),
        _ => actual == expected,
    }
}

/// Ordering between comparable variants; `None` when incomparable.
fn prop_ordering(actual: &PropValue, expected: &PropValue) -> Option<Ordering> {
    match (actual, expected) {
        (PropValue::Number(a), PropValue::Number(b)) | (PropValue::Date(a), PropValue::Date(b)) => {
            Some(a.cmp(b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkspaceId;
    use pretty_assertions::assert_eq;

    fn doc(title: &str, folder: &str, tags: &[&str], bookmarked: bool) -> Document {
        let mut document = Document::new(WorkspaceId::new(), title, "", folder);
        for tag in tags {
            document.add_tag(tag);
        }
        document.bookmarked = bookmarked;
        document
    }

    fn sample_documents() -> Vec<Document> {
        vec![
            doc("roadmap", "/projects", &["work"], true),
            doc("groceries", "/personal", &["home"], false),
            doc("retro notes", "/projects/alpha", &["work", "meeting"], false),
        ]
    }

    #[test]
    fn empty_condition_matches_all() {
        let documents = sample_documents();
        let empty = Condition::empty();
        let filtered: Vec<_> = filter(&empty, &documents).collect();
        assert_eq!(filtered.len(), documents.len());
    }

    #[test]
    fn empty_or_matches_none() {
        let documents = sample_documents();
        let condition = Condition::Or {
            conditions: Vec::new(),
        };
        assert_eq!(filter(&condition, &documents).count(), 0);
    }

    #[test]
    fn filter_output_is_subset_satisfying_matches() {
        let documents = sample_documents();
        let condition = Condition::Tag {
            tag: "work".to_string(),
        };

        let filtered: Vec<_> = filter(&condition, &documents).collect();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|d| matches(&condition, d)));
        assert!(filtered.iter().all(|d| documents.contains(d)));
    }

    #[test]
    fn filter_preserves_input_order_and_restarts() {
        let documents = sample_documents();
        let condition = Condition::Tag {
            tag: "work".to_string(),
        };

        let first: Vec<_> = filter(&condition, &documents)
            .map(|d| d.title.clone())
            .collect();
        let second: Vec<_> = filter(&condition, &documents)
            .map(|d| d.title.clone())
            .collect();
        assert_eq!(first, vec!["roadmap", "retro notes"]);
        assert_eq!(first, second);
    }

    #[test]
    fn in_folder_includes_descendants() {
        let documents = sample_documents();
        let condition = Condition::InFolder {
            pathname: "/projects".to_string(),
        };

        let titles: Vec<_> = filter(&condition, &documents).map(|d| &d.title).collect();
        assert_eq!(titles, vec!["roadmap", "retro notes"]);
    }

    #[test]
    fn bookmarked_condition() {
        let documents = sample_documents();
        let condition = Condition::Bookmarked { bookmarked: true };
        assert_eq!(filter(&condition, &documents).count(), 1);
    }

    #[test]
    fn missing_prop_is_false_not_an_error() {
        let document = doc("untyped", "/", &[], false);
        let condition = Condition::Prop {
            name: "status".to_string(),
            op: PropOp::Eq,
            value: PropValue::Text("open".to_string()),
        };
        assert!(!matches(&condition, &document));
    }

    #[test]
    fn mismatched_prop_types_are_false() {
        let mut document = doc("typed", "/", &[], false);
        document
            .props
            .insert("status".to_string(), PropValue::Text("open".to_string()));

        let condition = Condition::Prop {
            name: "status".to_string(),
            op: PropOp::Gt,
            value: PropValue::Number(3),
        };
        assert!(!matches(&condition, &document));
    }

    #[test]
    fn prop_comparisons() {
        let mut document = doc("typed", "/", &[], false);
        document
            .props
            .insert("priority".to_string(), PropValue::Number(5));
        document
            .props
            .insert("status".to_string(), PropValue::Text("In Review".to_string()));

        let gt = Condition::Prop {
            name: "priority".to_string(),
            op: PropOp::Gt,
            value: PropValue::Number(3),
        };
        let lt = Condition::Prop {
            name: "priority".to_string(),
            op: PropOp::Lt,
            value: PropValue::Number(3),
        };
        let contains = Condition::Prop {
            name: "status".to_string(),
            op: PropOp::Contains,
            value: PropValue::Text("review".to_string()),
        };
        let eq = Condition::Prop {
            name: "status".to_string(),
            op: PropOp::Eq,
            value: PropValue::Text("in review".to_string()),
        };

        assert!(matches(&gt, &document));
        assert!(!matches(&lt, &document));
        assert!(matches(&contains, &document));
        assert!(matches(&eq, &document));
    }

    #[test]
    fn nested_and_or_combination() {
        let documents = sample_documents();
        let condition = Condition::And {
            conditions: vec![
                Condition::Tag {
                    tag: "work".to_string(),
                },
                Condition::Or {
                    conditions: vec![
                        Condition::Bookmarked { bookmarked: true },
                        Condition::Tag {
                            tag: "meeting".to_string(),
                        },
                    ],
                },
            ],
        };

        let titles: Vec<_> = filter(&condition, &documents).map(|d| &d.title).collect();
        assert_eq!(titles, vec!["roadmap", "retro notes"]);
    }
}
