//! Overlays validation results onto per-entity copies of a rule tree.
//!
//! Two passes. First every result is matched against the nodes of its focus
//! entity's tree by `(source shape, constraint component)`. Then group nodes
//! (`Root`, `Field`, implicit conjunctions) fold the status of their direct
//! children, bottom up.

use crate::error::{EvaluateError, EvaluateResult};
use crate::facts::WorkingFacts;
use crate::rule_tree::{NodeKind, RuleNode, RuleTree};
use crate::types::{Component, Severity, Status};
use crate::validation::ValidationResult;
use log::{debug, warn};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{NamedNode, Term};

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedNode {
    pub kind: NodeKind,
    pub shape: Term,
    pub status: Status,
    /// Offending value of a violated rule, when the validator reported one.
    pub value: Option<Term>,
    pub message: Option<String>,
    pub children: Vec<EvaluatedNode>,
}

impl EvaluatedNode {
    fn from_template(node: &RuleNode) -> Self {
        EvaluatedNode {
            kind: node.kind.clone(),
            shape: node.shape.clone(),
            status: Status::Missing,
            value: None,
            message: None,
            children: node.children.iter().map(EvaluatedNode::from_template).collect(),
        }
    }

    /// Applies `result` to every node keyed `(shape, component)`. Returns the
    /// number of nodes touched.
    fn overlay(&mut self, shape: &Term, component: Component, result: &ValidationResult) -> usize {
        let mut touched = 0;
        if &self.shape == shape && self.kind.matches(component) {
            // several results on one rule: a violation sticks
            if self.status != Status::Violated {
                self.status = Status::from_severity(result.severity);
                if result.severity == Severity::Violation {
                    self.value = result.value.clone();
                    self.message = result.message.clone();
                }
            }
            touched += 1;
        }
        for child in &mut self.children {
            touched += child.overlay(shape, component, result);
        }
        touched
    }

    fn aggregate(&mut self) {
        for child in &mut self.children {
            child.aggregate();
        }
        if self.kind.is_group() {
            self.status = Status::fold(self.children.iter().map(|c| c.status));
        }
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a EvaluatedNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

/// One entity's copy of a `Root`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedTree {
    pub entity: Term,
    pub root: EvaluatedNode,
}

impl EvaluatedTree {
    pub fn status(&self) -> Status {
        self.root.status
    }

    pub fn target_class(&self) -> Option<&NamedNode> {
        match &self.root.kind {
            NodeKind::Root { target_class } => Some(target_class),
            _ => None,
        }
    }
}

/// Pairs each entity typed with one of the tree's target classes with that
/// class, in fact order.
pub fn entity_types(facts: &WorkingFacts, tree: &RuleTree) -> Vec<(Term, NamedNode)> {
    let classes = tree.target_classes();
    let mut pairs: Vec<(Term, NamedNode)> = Vec::new();
    for triple in facts.triples() {
        if triple.predicate != rdf::TYPE {
            continue;
        }
        let Term::NamedNode(class) = &triple.object else {
            continue;
        };
        if !classes.contains(&class) {
            continue;
        }
        let pair = (Term::from(triple.subject.clone()), class.clone());
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

/// Clones one tree per `(entity, class)` and every root targeting that
/// class, then overlays `results` (nested details included).
pub fn evaluate(
    tree: &RuleTree,
    entities: &[(Term, NamedNode)],
    results: &[ValidationResult],
) -> EvaluateResult<Vec<EvaluatedTree>> {
    let mut clones: Vec<EvaluatedTree> = Vec::new();
    for (entity, class) in entities {
        for root in tree.roots_for(class) {
            clones.push(EvaluatedTree {
                entity: entity.clone(),
                root: EvaluatedNode::from_template(root),
            });
        }
    }

    for result in results.iter().flat_map(|r| r.flatten()) {
        let component = Component::from_iri(result.component.as_ref()).ok_or_else(|| {
            EvaluateError::UnmappedComponent {
                component: result.component.clone(),
                source_shape: result.source_shape.clone(),
            }
        })?;
        let Some(focus) = &result.focus_node else {
            warn!("skipping {} result without a focus node", component);
            continue;
        };
        let Some(shape) = &result.source_shape else {
            warn!("skipping {} result on {} without a source shape", component, focus);
            continue;
        };
        let mut matched_entity = false;
        let mut touched = 0;
        for clone in clones.iter_mut().filter(|c| &c.entity == focus) {
            matched_entity = true;
            touched += clone.root.overlay(shape, component, result);
        }
        if !matched_entity {
            warn!(
                "skipping {} result for {}: no evaluated tree for that entity",
                component, focus
            );
        } else if touched == 0 {
            debug!("{} result on {} for {} matched no rule", component, shape, focus);
        }
    }

    for clone in &mut clones {
        clone.root.aggregate();
    }
    Ok(clones)
}
