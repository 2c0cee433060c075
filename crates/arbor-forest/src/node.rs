use std::fmt;

use crate::dataset::Record;
use crate::error::ForestError;

/// A node in a categorical decision tree.
///
/// Trees are plain recursive ownership: every internal node owns its
/// children outright, one per attribute value observed during training, in
/// the order those values were first seen.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An interior split on one attribute.
    Split {
        /// Attribute tested at this node.
        attribute: String,
        /// Majority class at this node, returned for values never seen in training.
        default_class: String,
        /// One child per observed value of `attribute`. Keys are unique.
        children: Vec<(String, Node)>,
        /// Number of training records that reached this node.
        n_records: usize,
    },
    /// A terminal leaf node.
    Leaf {
        /// Predicted class. `None` only for a leaf grown from zero records.
        class: Option<String>,
        /// Number of training records in this leaf.
        n_records: usize,
    },
}

impl Node {
    /// Classify `record` by walking down from this node.
    ///
    /// A value with no matching child resolves to the node's `default_class`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingAttribute`] when `record` has no value at
    /// all for an attribute a node on the path splits on.
    pub fn classify(&self, record: &Record) -> Result<Option<&str>, ForestError> {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { class, .. } => return Ok(class.as_deref()),
                Node::Split {
                    attribute,
                    default_class,
                    ..
                } => {
                    let value = record.get(attribute).ok_or_else(|| ForestError::MissingAttribute {
                        attribute: attribute.clone(),
                    })?;
                    match node.child(value) {
                        Some(child) => node = child,
                        None => return Ok(Some(default_class.as_str())),
                    }
                }
            }
        }
    }

    /// Return the child reached by `value`, if that value was seen in training.
    #[must_use]
    pub fn child(&self, value: &str) -> Option<&Node> {
        match self {
            Node::Split { children, .. } => children
                .iter()
                .find(|(v, _)| v == value)
                .map(|(_, child)| child),
            Node::Leaf { .. } => None,
        }
    }

    /// Return the number of training records that reached this node.
    #[must_use]
    pub fn n_records(&self) -> usize {
        match self {
            Node::Split { n_records, .. } | Node::Leaf { n_records, .. } => *n_records,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Node::Leaf { class, .. } => write!(f, "{}", class.as_deref().unwrap_or("<none>")),
            Node::Split {
                attribute,
                children,
                ..
            } => {
                write!(f, "Attr: {attribute}")?;
                for (value, child) in children {
                    writeln!(f)?;
                    write!(f, "{:indent$}--> {value}:", "")?;
                    writeln!(f)?;
                    write!(f, "{:width$}", "", width = indent + 4)?;
                    child.write_indented(f, indent + 4)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::Node;
    use crate::dataset::tests::record;
    use crate::error::ForestError;

    fn leaf(class: &str, n_records: usize) -> Node {
        Node::Leaf {
            class: Some(class.to_string()),
            n_records,
        }
    }

    /// color=red -> yes, color=blue -> (size=big -> no, size=small -> yes)
    fn make_tree() -> Node {
        Node::Split {
            attribute: "color".into(),
            default_class: "no".into(),
            children: vec![
                ("red".into(), leaf("yes", 3)),
                (
                    "blue".into(),
                    Node::Split {
                        attribute: "size".into(),
                        default_class: "no".into(),
                        children: vec![("big".into(), leaf("no", 3)), ("small".into(), leaf("yes", 1))],
                        n_records: 4,
                    },
                ),
            ],
            n_records: 7,
        }
    }

    #[test]
    fn leaf_returns_its_class() {
        let node = leaf("yes", 2);
        assert_eq!(node.classify(&record(&[])).unwrap(), Some("yes"));
        assert!(node.is_leaf());
        assert_eq!(node.n_records(), 2);
    }

    #[test]
    fn seen_values_follow_branches() {
        let tree = make_tree();
        let r = record(&[("color", "blue"), ("size", "small")]);
        assert_eq!(tree.classify(&r).unwrap(), Some("yes"));
        let r = record(&[("color", "red"), ("size", "big")]);
        assert_eq!(tree.classify(&r).unwrap(), Some("yes"));
        let r = record(&[("color", "blue"), ("size", "big")]);
        assert_eq!(tree.classify(&r).unwrap(), Some("no"));
    }

    #[test]
    fn unseen_value_returns_default() {
        let tree = make_tree();
        let r = record(&[("color", "green"), ("size", "big")]);
        assert_eq!(tree.classify(&r).unwrap(), Some("no"));
        let r = record(&[("color", "blue"), ("size", "medium")]);
        assert_eq!(tree.classify(&r).unwrap(), Some("no"));
    }

    #[test]
    fn missing_split_attribute_is_an_error() {
        let tree = make_tree();
        let err = tree.classify(&record(&[("color", "blue")])).unwrap_err();
        assert!(matches!(err, ForestError::MissingAttribute { attribute } if attribute == "size"));
    }

    #[test]
    fn attributes_off_the_path_are_not_required() {
        let tree = make_tree();
        assert_eq!(tree.classify(&record(&[("color", "red")])).unwrap(), Some("yes"));
    }

    #[test]
    fn empty_leaf_abstains() {
        let node = Node::Leaf {
            class: None,
            n_records: 0,
        };
        assert_eq!(node.classify(&record(&[])).unwrap(), None);
    }

    #[test]
    fn child_lookup() {
        let tree = make_tree();
        assert!(tree.child("red").is_some_and(Node::is_leaf));
        assert!(tree.child("green").is_none());
        assert!(leaf("x", 1).child("red").is_none());
    }

    #[test]
    fn display_lists_branches() {
        let text = make_tree().to_string();
        assert!(text.starts_with("Attr: color"));
        assert!(text.contains("--> red:"));
        assert!(text.contains("    Attr: size"));
        assert!(text.contains("\n    --> small:\n        yes"));
    }
}
