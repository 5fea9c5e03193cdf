use crate::named_nodes::SHACL;
use oxigraph::model::{NamedNode, NamedNodeRef, Term};
use std::fmt;

/// Result severity. `Other` covers custom severity IRIs and results that
/// carry none.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Info,
    Warning,
    Violation,
    #[default]
    Other,
}

impl Severity {
    pub fn from_term(term: &Term) -> Self {
        let shacl = SHACL::new();
        match term {
            Term::NamedNode(nn) if *nn == shacl.info => Severity::Info,
            Term::NamedNode(nn) if *nn == shacl.warning => Severity::Warning,
            Term::NamedNode(nn) if *nn == shacl.violation => Severity::Violation,
            _ => Severity::Other,
        }
    }
}

/// Tri-valued outcome of a node in an evaluated tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Status {
    Ok,
    Violated,
    #[default]
    Missing,
}

impl Status {
    /// Informational results confirm a constraint, violations break it, and
    /// anything else leaves it undecided.
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Info => Status::Ok,
            Severity::Violation => Status::Violated,
            Severity::Warning | Severity::Other => Status::Missing,
        }
    }

    /// Folds child statuses: any violation wins, then any missing, else ok.
    pub fn fold<I: IntoIterator<Item = Status>>(statuses: I) -> Self {
        let mut folded = Status::Ok;
        for status in statuses {
            match status {
                Status::Violated => return Status::Violated,
                Status::Missing => folded = Status::Missing,
                Status::Ok => {}
            }
        }
        folded
    }
}

/// SHACL constraint components this engine knows how to place in a rule tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    And,
    Or,
    Not,
    In,
    HasValue,
    MinInclusive,
    MinExclusive,
    MaxInclusive,
    MaxExclusive,
    LessThan,
    LessThanOrEquals,
    MinCount,
    MaxCount,
    Node,
    QualifiedMinCount,
    QualifiedMaxCount,
}

impl Component {
    pub const ALL: [Component; 16] = [
        Component::And,
        Component::Or,
        Component::Not,
        Component::In,
        Component::HasValue,
        Component::MinInclusive,
        Component::MinExclusive,
        Component::MaxInclusive,
        Component::MaxExclusive,
        Component::LessThan,
        Component::LessThanOrEquals,
        Component::MinCount,
        Component::MaxCount,
        Component::Node,
        Component::QualifiedMinCount,
        Component::QualifiedMaxCount,
    ];

    pub fn iri(self) -> NamedNodeRef<'static> {
        NamedNodeRef::new_unchecked(match self {
            Component::And => "http://www.w3.org/ns/shacl#AndConstraintComponent",
            Component::Or => "http://www.w3.org/ns/shacl#OrConstraintComponent",
            Component::Not => "http://www.w3.org/ns/shacl#NotConstraintComponent",
            Component::In => "http://www.w3.org/ns/shacl#InConstraintComponent",
            Component::HasValue => "http://www.w3.org/ns/shacl#HasValueConstraintComponent",
            Component::MinInclusive => "http://www.w3.org/ns/shacl#MinInclusiveConstraintComponent",
            Component::MinExclusive => "http://www.w3.org/ns/shacl#MinExclusiveConstraintComponent",
            Component::MaxInclusive => "http://www.w3.org/ns/shacl#MaxInclusiveConstraintComponent",
            Component::MaxExclusive => "http://www.w3.org/ns/shacl#MaxExclusiveConstraintComponent",
            Component::LessThan => "http://www.w3.org/ns/shacl#LessThanConstraintComponent",
            Component::LessThanOrEquals => {
                "http://www.w3.org/ns/shacl#LessThanOrEqualsConstraintComponent"
            }
            Component::MinCount => "http://www.w3.org/ns/shacl#MinCountConstraintComponent",
            Component::MaxCount => "http://www.w3.org/ns/shacl#MaxCountConstraintComponent",
            Component::Node => "http://www.w3.org/ns/shacl#NodeConstraintComponent",
            Component::QualifiedMinCount => {
                "http://www.w3.org/ns/shacl#QualifiedMinCountConstraintComponent"
            }
            Component::QualifiedMaxCount => {
                "http://www.w3.org/ns/shacl#QualifiedMaxCountConstraintComponent"
            }
        })
    }

    pub fn from_iri(iri: NamedNodeRef<'_>) -> Option<Self> {
        Component::ALL.into_iter().find(|c| c.iri() == iri)
    }

    /// Count shortfalls are the results that translate into missing data.
    pub fn is_count_shortfall(self) -> bool {
        matches!(self, Component::MinCount | Component::QualifiedMinCount)
    }

    /// Components whose violations only echo an inner failure or a count
    /// shortfall, and therefore never make a profile ineligible by themselves.
    pub fn is_structural_echo(self) -> bool {
        matches!(
            self,
            Component::MinCount
                | Component::QualifiedMinCount
                | Component::And
                | Component::Or
                | Component::Node
        )
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iri())
    }
}

/// The property path a `Field` groups its constraints under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Predicate(NamedNode),
    Inverse(NamedNode),
}

impl FieldPath {
    pub fn predicate(&self) -> &NamedNode {
        match self {
            FieldPath::Predicate(p) | FieldPath::Inverse(p) => p,
        }
    }

    /// Short human label: the local name, prefixed with `^` for inverse paths.
    pub fn label(&self) -> String {
        let local = local_name(self.predicate().as_str());
        match self {
            FieldPath::Predicate(_) => local,
            FieldPath::Inverse(_) => format!("^{}", local),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Predicate(p) => f.write_str(p.as_str()),
            FieldPath::Inverse(p) => write!(f, "^{}", p.as_str()),
        }
    }
}

/// Extracts the local name of an IRI (the segment after the last `#` or `/`).
pub fn local_name(iri: &str) -> String {
    if let Some(hash_idx) = iri.rfind('#') {
        iri[hash_idx + 1..].to_string()
    } else if let Some(slash_idx) = iri.rfind('/') {
        if slash_idx == iri.len() - 1 && iri.len() > 1 {
            // http://example.com/ns/ -> ns
            let without_trailing_slash = &iri[..slash_idx];
            match without_trailing_slash.rfind('/') {
                Some(prev_slash_idx) => without_trailing_slash[prev_slash_idx + 1..].to_string(),
                None => without_trailing_slash.to_string(),
            }
        } else {
            iri[slash_idx + 1..].to_string()
        }
    } else {
        iri.to_string()
    }
}

/// Display form of a term: local name for IRIs, `_:id` for blank nodes and
/// the lexical value for literals.
pub fn format_term_for_label(term: &Term) -> String {
    match term {
        Term::NamedNode(nn) => local_name(nn.as_str()),
        Term::BlankNode(bn) => format!("_:{}", bn.as_str()),
        Term::Literal(lit) => lit.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}
