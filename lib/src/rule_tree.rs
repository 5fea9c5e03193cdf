//! The compiled form of a requirement profile.
//!
//! A `RuleTree` mirrors the logical structure of a shapes document: one
//! `Root` per targeted class, combinators for `sh:and`/`sh:or`/`sh:not`,
//! `Field` nodes per property path and `Rule` leaves for individual facets.
//! Trees are built once per profile and only ever read afterwards.

use crate::types::{format_term_for_label, local_name, Component, FieldPath};
use oxigraph::model::{NamedNode, Term};

/// One facet of a shape fragment together with its parameter(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    In(Vec<Term>),
    /// `sh:not [ sh:in (...) ]`, compiled inline.
    NotIn(Vec<Term>),
    HasValue(Term),
    MinInclusive(Term),
    MinExclusive(Term),
    MaxInclusive(Term),
    MaxExclusive(Term),
    LessThan(NamedNode),
    LessThanOrEquals(NamedNode),
    MinCount(u64),
    MaxCount(u64),
    Node(Term),
    Qualified {
        shape: Term,
        min_count: Option<u64>,
        max_count: Option<u64>,
    },
}

impl Constraint {
    /// Whether a validation result reported for `component` concerns this facet.
    pub fn matches(&self, component: Component) -> bool {
        match self {
            Constraint::In(_) => component == Component::In,
            Constraint::NotIn(_) => component == Component::Not,
            Constraint::HasValue(_) => component == Component::HasValue,
            Constraint::MinInclusive(_) => component == Component::MinInclusive,
            Constraint::MinExclusive(_) => component == Component::MinExclusive,
            Constraint::MaxInclusive(_) => component == Component::MaxInclusive,
            Constraint::MaxExclusive(_) => component == Component::MaxExclusive,
            Constraint::LessThan(_) => component == Component::LessThan,
            Constraint::LessThanOrEquals(_) => component == Component::LessThanOrEquals,
            Constraint::MinCount(_) => component == Component::MinCount,
            Constraint::MaxCount(_) => component == Component::MaxCount,
            Constraint::Node(_) => component == Component::Node,
            Constraint::Qualified { .. } => matches!(
                component,
                Component::QualifiedMinCount | Component::QualifiedMaxCount
            ),
        }
    }

    pub fn is_min_bound(&self) -> bool {
        matches!(self, Constraint::MinInclusive(_) | Constraint::MinExclusive(_))
    }

    pub fn is_max_bound(&self) -> bool {
        matches!(self, Constraint::MaxInclusive(_) | Constraint::MaxExclusive(_))
    }

    /// Human readable rendering of the parameter(s).
    pub fn parameter_label(&self) -> String {
        match self {
            Constraint::In(values) | Constraint::NotIn(values) => values
                .iter()
                .map(format_term_for_label)
                .collect::<Vec<_>>()
                .join(", "),
            Constraint::HasValue(t)
            | Constraint::MinInclusive(t)
            | Constraint::MinExclusive(t)
            | Constraint::MaxInclusive(t)
            | Constraint::MaxExclusive(t)
            | Constraint::Node(t) => format_term_for_label(t),
            Constraint::LessThan(p) | Constraint::LessThanOrEquals(p) => local_name(p.as_str()),
            Constraint::MinCount(n) | Constraint::MaxCount(n) => n.to_string(),
            Constraint::Qualified {
                shape,
                min_count,
                max_count,
            } => {
                let shape = format_term_for_label(shape);
                match (min_count, max_count) {
                    (Some(min), Some(max)) => format!("{} ({}..{})", shape, min, max),
                    (Some(min), None) => format!("{} (>= {})", shape, min),
                    (None, Some(max)) => format!("{} (<= {})", shape, max),
                    (None, None) => shape,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root { target_class: NamedNode },
    /// `implicit` marks the conjunction formed by a path-less fragment with
    /// several contributions. No validation result names it; its status is
    /// folded from its children instead.
    And { implicit: bool },
    Or,
    Not,
    Field { path: FieldPath },
    Rule(Constraint),
}

impl NodeKind {
    /// The result-key half this node answers to, if any.
    pub fn matches(&self, component: Component) -> bool {
        match self {
            NodeKind::And { implicit: false } => component == Component::And,
            NodeKind::Or => component == Component::Or,
            NodeKind::Not => component == Component::Not,
            NodeKind::Rule(constraint) => constraint.matches(component),
            NodeKind::Root { .. } | NodeKind::Field { .. } | NodeKind::And { implicit: true } => {
                false
            }
        }
    }

    /// Group nodes take their status from their direct children.
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            NodeKind::Root { .. } | NodeKind::Field { .. } | NodeKind::And { implicit: true }
        )
    }
}

/// A node of a rule tree. `shape` is the shape fragment the node was
/// compiled from and, together with the constraint component, the key
/// validation results are matched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    pub kind: NodeKind,
    pub shape: Term,
    pub children: Vec<RuleNode>,
}

impl RuleNode {
    pub fn new(kind: NodeKind, shape: Term, children: Vec<RuleNode>) -> Self {
        RuleNode {
            kind,
            shape,
            children,
        }
    }

    pub fn leaf(constraint: Constraint, shape: Term) -> Self {
        RuleNode::new(NodeKind::Rule(constraint), shape, Vec::new())
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a RuleNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        match &self.kind {
            NodeKind::Rule(c) => Some(c),
            _ => None,
        }
    }
}

/// Compiled requirement profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTree {
    pub profile: Term,
    pub roots: Vec<RuleNode>,
}

impl RuleTree {
    pub fn roots_for<'a>(&'a self, class: &'a NamedNode) -> impl Iterator<Item = &'a RuleNode> {
        self.roots.iter().filter(move |root| match &root.kind {
            NodeKind::Root { target_class } => target_class == class,
            _ => false,
        })
    }

    pub fn target_classes(&self) -> Vec<&NamedNode> {
        let mut classes: Vec<&NamedNode> = Vec::new();
        for root in &self.roots {
            if let NodeKind::Root { target_class } = &root.kind {
                if !classes.contains(&target_class) {
                    classes.push(target_class);
                }
            }
        }
        classes
    }

    /// Every `Rule` leaf, in traversal order.
    pub fn leaves(&self) -> Vec<&RuleNode> {
        let mut leaves = Vec::new();
        for root in &self.roots {
            root.walk(&mut |node| {
                if node.constraint().is_some() {
                    leaves.push(node);
                }
            });
        }
        leaves
    }
}
