//! Compiles a shapes document into a [`RuleTree`].
//!
//! Recursive descent over the raw graph. Each fragment is classified by the
//! SHACL predicates it carries:
//!
//! * facets (`sh:in`, `sh:minInclusive`, `sh:maxCount`, ...) become one
//!   `Rule` leaf each, in declaration order, ahead of any sub-constraint;
//! * `sh:property`, `sh:and`, `sh:or` and `sh:not` become nested nodes, in
//!   the order they are declared;
//! * a fragment with `sh:path` becomes a `Field` around its contributions,
//!   a path-less one collapses to its single contribution or is wrapped in
//!   an implicit conjunction.
//!
//! `sh:minCount 1` is never materialized. `sh:node` and
//! `sh:qualifiedValueShape` stay leaves that reference the nested shape
//! rather than inlining it.

use crate::error::{CompileError, CompileResult};
use crate::graph::RawGraph;
use crate::named_nodes::{SHACL, SHACL_NS};
use crate::rule_tree::{Constraint, NodeKind, RuleNode, RuleTree};
use crate::types::FieldPath;
use log::{debug, info};
use oxigraph::model::{NamedNode, NamedNodeRef, Term};
use petgraph::graph::NodeIndex;

/// Compiles every node shape with an `sh:targetClass` in `raw`.
///
/// `profile` names the requirement profile the tree belongs to.
pub fn compile(raw: &RawGraph, profile: Term) -> CompileResult<RuleTree> {
    let compiler = ShapeCompiler::new(raw);
    let roots = compiler.compile_roots()?;
    info!(
        "compiled profile {} into {} root(s) with {} rule(s)",
        profile,
        roots.len(),
        roots.iter().map(count_rules).sum::<usize>()
    );
    Ok(RuleTree { profile, roots })
}

fn count_rules(root: &RuleNode) -> usize {
    let mut n = 0;
    root.walk(&mut |node| {
        if node.constraint().is_some() {
            n += 1;
        }
    });
    n
}

pub struct ShapeCompiler<'a> {
    raw: &'a RawGraph,
    sh: SHACL,
}

impl<'a> ShapeCompiler<'a> {
    pub fn new(raw: &'a RawGraph) -> Self {
        ShapeCompiler {
            raw,
            sh: SHACL::new(),
        }
    }

    pub fn compile_roots(&self) -> CompileResult<Vec<RuleNode>> {
        let mut roots = Vec::new();
        for shape in self.raw.subjects_with(self.sh.target_class, None) {
            let shape_term = self.raw.term(shape).clone();
            for class in self.raw.objects(shape, self.sh.target_class) {
                let target_class = match self.raw.term(class) {
                    Term::NamedNode(nn) => nn.clone(),
                    other => {
                        return Err(CompileError::InvalidParameter {
                            fragment: shape_term.clone(),
                            predicate: self.sh.target_class.into_owned(),
                            value: other.clone(),
                        })
                    }
                };
                let mut stack = vec![shape];
                let children = self.contributions(shape, &mut stack)?;
                debug!(
                    "root {} targets {} with {} child(ren)",
                    shape_term,
                    target_class,
                    children.len()
                );
                roots.push(RuleNode::new(
                    NodeKind::Root { target_class },
                    shape_term.clone(),
                    children,
                ));
            }
        }
        Ok(roots)
    }

    /// Compiles a nested fragment: property shapes, combinator branches and
    /// the body of `sh:not`.
    fn compile_fragment(&self, fragment: NodeIndex, stack: &mut Vec<NodeIndex>) -> CompileResult<RuleNode> {
        let fragment_term = self.raw.term(fragment).clone();
        if stack.contains(&fragment) {
            return Err(CompileError::RecursiveShape {
                fragment: fragment_term,
            });
        }
        stack.push(fragment);
        let path = self.path(fragment)?;
        let mut children = self.contributions(fragment, stack)?;
        stack.pop();

        if let Some(path) = path {
            return Ok(RuleNode::new(NodeKind::Field { path }, fragment_term, children));
        }
        match children.len() {
            0 => Err(CompileError::EmptyFragment {
                fragment: fragment_term,
            }),
            1 => Ok(children.remove(0)),
            _ => Ok(RuleNode::new(
                NodeKind::And { implicit: true },
                fragment_term,
                children,
            )),
        }
    }

    /// Facet leaves first, then sub-constraints in declaration order.
    fn contributions(&self, fragment: NodeIndex, stack: &mut Vec<NodeIndex>) -> CompileResult<Vec<RuleNode>> {
        self.check_predicates(fragment)?;
        let mut children = self.facets(fragment)?;
        let fragment_term = self.raw.term(fragment);

        for (predicate, object) in self.raw.out_edges(fragment) {
            let predicate = predicate.as_ref();
            if predicate == self.sh.property {
                children.push(self.compile_fragment(object, stack)?);
            } else if predicate == self.sh.and_ || predicate == self.sh.or_ {
                let branches = self
                    .raw
                    .resolve_list(object)
                    .into_iter()
                    .map(|branch| self.compile_fragment(branch, stack))
                    .collect::<CompileResult<Vec<_>>>()?;
                let kind = if predicate == self.sh.and_ {
                    NodeKind::And { implicit: false }
                } else {
                    NodeKind::Or
                };
                children.push(RuleNode::new(kind, fragment_term.clone(), branches));
            } else if predicate == self.sh.not {
                children.push(self.compile_not(fragment_term, object, stack)?);
            }
        }
        Ok(children)
    }

    /// `sh:not` over a bare `sh:in` stays flat as a negated membership leaf.
    fn compile_not(&self, outer: &Term, inner: NodeIndex, stack: &mut Vec<NodeIndex>) -> CompileResult<RuleNode> {
        if let Some(list) = self.bare_in_list(inner) {
            return Ok(RuleNode::leaf(
                Constraint::NotIn(self.raw.resolve_list_terms(list)),
                outer.clone(),
            ));
        }
        let body = self.compile_fragment(inner, stack)?;
        Ok(RuleNode::new(NodeKind::Not, outer.clone(), vec![body]))
    }

    fn bare_in_list(&self, fragment: NodeIndex) -> Option<NodeIndex> {
        let mut list = None;
        for (predicate, object) in self.raw.out_edges(fragment) {
            let predicate = predicate.as_ref();
            if predicate == self.sh.in_ && list.is_none() {
                list = Some(object);
            } else if predicate != self.sh.path
                && (!is_shacl(predicate) || self.is_annotation(predicate))
            {
                continue;
            } else {
                return None;
            }
        }
        list
    }

    /// One leaf per facet, in declaration order.
    fn facets(&self, fragment: NodeIndex) -> CompileResult<Vec<RuleNode>> {
        let sh = &self.sh;
        let fragment_term = self.raw.term(fragment);
        let mut leaves = Vec::new();

        for (predicate, object) in self.raw.out_edges(fragment) {
            let p = predicate.as_ref();
            let value = || self.raw.term(object).clone();
            let constraint = if p == sh.in_ {
                Constraint::In(self.raw.resolve_list_terms(object))
            } else if p == sh.has_value {
                Constraint::HasValue(value())
            } else if p == sh.min_inclusive {
                Constraint::MinInclusive(value())
            } else if p == sh.min_exclusive {
                Constraint::MinExclusive(value())
            } else if p == sh.max_inclusive {
                Constraint::MaxInclusive(value())
            } else if p == sh.max_exclusive {
                Constraint::MaxExclusive(value())
            } else if p == sh.less_than {
                Constraint::LessThan(self.named(fragment, p, value())?)
            } else if p == sh.less_than_or_equals {
                Constraint::LessThanOrEquals(self.named(fragment, p, value())?)
            } else if p == sh.min_count {
                let count = self.count(fragment, p, value())?;
                // required-field marker, only surfaces as missing data
                if count == 1 {
                    continue;
                }
                Constraint::MinCount(count)
            } else if p == sh.max_count {
                Constraint::MaxCount(self.count(fragment, p, value())?)
            } else if p == sh.node {
                Constraint::Node(value())
            } else if p == sh.qualified_value_shape {
                Constraint::Qualified {
                    shape: value(),
                    min_count: self.first_count(fragment, sh.qualified_min_count)?,
                    max_count: self.first_count(fragment, sh.qualified_max_count)?,
                }
            } else {
                continue;
            };
            leaves.push(RuleNode::leaf(constraint, fragment_term.clone()));
        }
        Ok(leaves)
    }

    fn first_count(&self, fragment: NodeIndex, predicate: NamedNodeRef<'_>) -> CompileResult<Option<u64>> {
        self.terms(fragment, predicate)
            .into_iter()
            .next()
            .map(|v| self.count(fragment, predicate, v))
            .transpose()
    }

    fn path(&self, fragment: NodeIndex) -> CompileResult<Option<FieldPath>> {
        let Some(path) = self.raw.object(fragment, self.sh.path) else {
            return Ok(None);
        };
        match self.raw.term(path) {
            Term::NamedNode(nn) => Ok(Some(FieldPath::Predicate(nn.clone()))),
            Term::BlankNode(_) => {
                let edges = self.raw.out_edges(path);
                match edges.as_slice() {
                    [(p, inner)] if **p == self.sh.inverse_path => {
                        match self.raw.term(*inner) {
                            Term::NamedNode(nn) => Ok(Some(FieldPath::Inverse(nn.clone()))),
                            _ => Err(self.unsupported_path(fragment, path)),
                        }
                    }
                    _ => Err(self.unsupported_path(fragment, path)),
                }
            }
            _ => Err(self.unsupported_path(fragment, path)),
        }
    }

    fn unsupported_path(&self, fragment: NodeIndex, path: NodeIndex) -> CompileError {
        CompileError::UnsupportedPath {
            fragment: self.raw.term(fragment).clone(),
            path: self.raw.term(path).clone(),
        }
    }

    fn check_predicates(&self, fragment: NodeIndex) -> CompileResult<()> {
        for (predicate, _) in self.raw.out_edges(fragment) {
            let p = predicate.as_ref();
            if !is_shacl(p) || self.is_annotation(p) || self.is_facet(p) || self.is_nested(p) {
                continue;
            }
            return Err(CompileError::UnsupportedConstraint {
                fragment: self.raw.term(fragment).clone(),
                predicate: predicate.clone(),
            });
        }
        Ok(())
    }

    fn is_facet(&self, p: NamedNodeRef<'_>) -> bool {
        let sh = &self.sh;
        [
            sh.in_,
            sh.has_value,
            sh.min_inclusive,
            sh.min_exclusive,
            sh.max_inclusive,
            sh.max_exclusive,
            sh.less_than,
            sh.less_than_or_equals,
            sh.min_count,
            sh.max_count,
            sh.node,
            sh.qualified_value_shape,
            sh.qualified_min_count,
            sh.qualified_max_count,
        ]
        .contains(&p)
    }

    fn is_nested(&self, p: NamedNodeRef<'_>) -> bool {
        [self.sh.property, self.sh.and_, self.sh.or_, self.sh.not].contains(&p)
    }

    /// SHACL predicates that carry no constraint of their own.
    fn is_annotation(&self, p: NamedNodeRef<'_>) -> bool {
        let sh = &self.sh;
        [
            sh.target_class,
            sh.path,
            sh.name,
            sh.description,
            sh.message,
            sh.severity,
            sh.order,
            sh.group,
            sh.deactivated,
            sh.qualified_value_shapes_disjoint,
        ]
        .contains(&p)
    }

    fn terms(&self, fragment: NodeIndex, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        self.raw
            .objects(fragment, predicate)
            .into_iter()
            .map(|o| self.raw.term(o).clone())
            .collect()
    }

    fn named(&self, fragment: NodeIndex, predicate: NamedNodeRef<'_>, value: Term) -> CompileResult<NamedNode> {
        match value {
            Term::NamedNode(nn) => Ok(nn),
            other => Err(self.invalid(fragment, predicate, other)),
        }
    }

    fn count(&self, fragment: NodeIndex, predicate: NamedNodeRef<'_>, value: Term) -> CompileResult<u64> {
        if let Term::Literal(lit) = &value {
            if let Ok(n) = lit.value().parse::<u64>() {
                return Ok(n);
            }
        }
        Err(self.invalid(fragment, predicate, value))
    }

    fn invalid(&self, fragment: NodeIndex, predicate: NamedNodeRef<'_>, value: Term) -> CompileError {
        CompileError::InvalidParameter {
            fragment: self.raw.term(fragment).clone(),
            predicate: predicate.into_owned(),
            value,
        }
    }
}

fn is_shacl(p: NamedNodeRef<'_>) -> bool {
    p.as_str().starts_with(SHACL_NS)
}
