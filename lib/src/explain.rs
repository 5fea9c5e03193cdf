//! Natural-language explanations for violated evaluated trees.

use crate::evaluate::{EvaluatedNode, EvaluatedTree};
use crate::rule_tree::{Constraint, NodeKind};
use crate::types::{format_term_for_label, FieldPath, Status};
use oxigraph::model::NamedNode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
}

#[derive(Debug, Error)]
#[error("unknown locale `{0}`")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

struct Templates {
    fallback_field: &'static str,
    unknown_value: &'static str,
    between: &'static str,
    generic: &'static str,
    generic_known: &'static str,
    generic_unknown: &'static str,
}

const EN: Templates = Templates {
    fallback_field: "value",
    unknown_value: "unknown",
    between: "The value of {field} must be between {min} and {max}, but it is {actual}.",
    generic: "The value of {field} {constraint} {param}",
    generic_known: ", actual value: {actual}.",
    generic_unknown: ", actual value unknown.",
};

const DE: Templates = Templates {
    fallback_field: "Wert",
    unknown_value: "unbekannt",
    between: "Der Wert von {field} muss zwischen {min} und {max} liegen, ist aber {actual}.",
    generic: "Der Wert von {field} {constraint} {param}",
    generic_known: ", tatsächlicher Wert: {actual}.",
    generic_unknown: ", tatsächlicher Wert unbekannt.",
};

impl Locale {
    fn templates(self) -> &'static Templates {
        match self {
            Locale::En => &EN,
            Locale::De => &DE,
        }
    }

    /// Sentence template for a constraint kind, or `None` for kinds that use
    /// the generic form.
    fn template(self, constraint: &Constraint) -> Option<&'static str> {
        use Constraint::*;
        let en = match constraint {
            In(_) => "The value of {field} must be one of {param}, but it is {actual}.",
            NotIn(_) => "The value of {field} must not be one of {param}, but it is {actual}.",
            HasValue(_) => "The value of {field} must be {param}, but it is {actual}.",
            MinInclusive(_) => "The value of {field} must be at least {param}, but it is {actual}.",
            MinExclusive(_) => {
                "The value of {field} must be greater than {param}, but it is {actual}."
            }
            MaxInclusive(_) => "The value of {field} must be at most {param}, but it is {actual}.",
            MaxExclusive(_) => "The value of {field} must be less than {param}, but it is {actual}.",
            LessThan(_) => {
                "The value of {field} must be less than the value of {param}, but it is {actual}."
            }
            LessThanOrEquals(_) => {
                "The value of {field} must not exceed the value of {param}, but it is {actual}."
            }
            MinCount(_) => "{field} needs at least {param} value(s).",
            MaxCount(_) => "{field} may have at most {param} value(s).",
            Node(_) | Qualified { .. } => return None,
        };
        if self == Locale::En {
            return Some(en);
        }
        Some(match constraint {
            In(_) => "Der Wert von {field} muss einer von {param} sein, ist aber {actual}.",
            NotIn(_) => "Der Wert von {field} darf keiner von {param} sein, ist aber {actual}.",
            HasValue(_) => "Der Wert von {field} muss {param} sein, ist aber {actual}.",
            MinInclusive(_) => "Der Wert von {field} muss mindestens {param} sein, ist aber {actual}.",
            MinExclusive(_) => "Der Wert von {field} muss größer als {param} sein, ist aber {actual}.",
            MaxInclusive(_) => "Der Wert von {field} darf höchstens {param} sein, ist aber {actual}.",
            MaxExclusive(_) => "Der Wert von {field} muss kleiner als {param} sein, ist aber {actual}.",
            LessThan(_) => {
                "Der Wert von {field} muss kleiner als der Wert von {param} sein, ist aber {actual}."
            }
            LessThanOrEquals(_) => {
                "Der Wert von {field} darf den Wert von {param} nicht überschreiten, ist aber {actual}."
            }
            MinCount(_) => "{field} benötigt mindestens {param} Wert(e).",
            MaxCount(_) => "{field} darf höchstens {param} Wert(e) haben.",
            Node(_) | Qualified { .. } => return None,
        })
    }

    fn constraint_phrase(self, constraint: &Constraint) -> &'static str {
        match (self, constraint) {
            (Locale::En, Constraint::Qualified { .. }) => "needs related values conforming to",
            (Locale::En, _) => "must conform to",
            (Locale::De, Constraint::Qualified { .. }) => "benötigt zugehörige Werte passend zu",
            (Locale::De, _) => "muss entsprechen",
        }
    }
}

/// Renders one sentence per violated rule of an evaluated tree.
#[derive(Debug, Clone, Default)]
pub struct Explainer {
    locale: Locale,
    labels: HashMap<NamedNode, String>,
}

impl Explainer {
    pub fn new(locale: Locale) -> Self {
        Explainer {
            locale,
            labels: HashMap::new(),
        }
    }

    /// Uses `label` instead of the local name of `predicate` in sentences.
    pub fn with_label(mut self, predicate: NamedNode, label: impl Into<String>) -> Self {
        self.labels.insert(predicate, label.into());
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn explain(&self, tree: &EvaluatedTree) -> Vec<String> {
        let mut sentences = Vec::new();
        let fallback = self.locale.templates().fallback_field.to_string();
        self.visit(&tree.root, &fallback, &mut sentences);
        sentences
    }

    fn field_label(&self, path: &FieldPath) -> String {
        match self.labels.get(path.predicate()) {
            Some(label) => label.clone(),
            None => path.label(),
        }
    }

    fn visit(&self, node: &EvaluatedNode, field: &str, out: &mut Vec<String>) {
        if node.status != Status::Violated {
            return;
        }
        match &node.kind {
            NodeKind::Rule(constraint) => out.push(self.sentence(constraint, node, field)),
            NodeKind::Field { path } => {
                let label = self.field_label(path);
                let range = combined_range(node);
                for (idx, child) in node.children.iter().enumerate() {
                    // the range sentence takes the place of whichever bound comes first
                    match range {
                        Some((min, max)) if idx == min.min(max) => {
                            out.push(self.between(&node.children[min], &node.children[max], &label))
                        }
                        Some((min, max)) if idx == min.max(max) => {}
                        _ => self.visit(child, &label, out),
                    }
                }
            }
            _ => {
                for child in &node.children {
                    self.visit(child, field, out);
                }
            }
        }
    }

    fn actual(&self, node: &EvaluatedNode) -> Option<String> {
        node.value.as_ref().map(format_term_for_label)
    }

    fn sentence(&self, constraint: &Constraint, node: &EvaluatedNode, field: &str) -> String {
        let actual = self.actual(node);
        let param = constraint.parameter_label();
        let templates = self.locale.templates();
        match self.locale.template(constraint) {
            Some(template) => template
                .replace("{field}", field)
                .replace("{param}", &param)
                .replace(
                    "{actual}",
                    actual.as_deref().unwrap_or(templates.unknown_value),
                ),
            None => {
                let head = templates
                    .generic
                    .replace("{field}", field)
                    .replace("{constraint}", self.locale.constraint_phrase(constraint))
                    .replace("{param}", &param);
                let tail = match &actual {
                    Some(actual) => templates.generic_known.replace("{actual}", actual),
                    None => templates.generic_unknown.to_string(),
                };
                head + &tail
            }
        }
    }

    fn between(&self, min: &EvaluatedNode, max: &EvaluatedNode, field: &str) -> String {
        let bound = |node: &EvaluatedNode| {
            node_constraint(node)
                .map(|c| c.parameter_label())
                .unwrap_or_default()
        };
        let actual = self
            .actual(min)
            .unwrap_or_else(|| self.locale.templates().unknown_value.to_string());
        self.locale
            .templates()
            .between
            .replace("{field}", field)
            .replace("{min}", &bound(min))
            .replace("{max}", &bound(max))
            .replace("{actual}", &actual)
    }
}

fn node_constraint(node: &EvaluatedNode) -> Option<&Constraint> {
    match &node.kind {
        NodeKind::Rule(c) => Some(c),
        _ => None,
    }
}

/// Indices of the first violated min-bound and max-bound children of a
/// field, when both captured the same actual value.
fn combined_range(field: &EvaluatedNode) -> Option<(usize, usize)> {
    let violated_bound = |pred: fn(&Constraint) -> bool| {
        field.children.iter().position(|c| {
            c.status == Status::Violated && node_constraint(c).is_some_and(pred)
        })
    };
    let min = violated_bound(Constraint::is_min_bound)?;
    let max = violated_bound(Constraint::is_max_bound)?;
    let (min_value, max_value) = (&field.children[min].value, &field.children[max].value);
    (min_value.is_some() && min_value == max_value).then_some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{Literal, Term};

    fn ex(local: &str) -> NamedNode {
        NamedNode::new(format!("https://example.org/{}", local)).expect("valid iri")
    }

    fn rule(constraint: Constraint, status: Status, value: Option<i64>) -> EvaluatedNode {
        EvaluatedNode {
            kind: NodeKind::Rule(constraint),
            shape: Term::from(ex("shape")),
            status,
            value: value.map(|v| Term::from(Literal::from(v))),
            message: None,
            children: Vec::new(),
        }
    }

    fn group(kind: NodeKind, children: Vec<EvaluatedNode>) -> EvaluatedNode {
        let status = Status::fold(children.iter().map(|c| c.status));
        EvaluatedNode {
            kind,
            shape: Term::from(ex("shape")),
            status,
            value: None,
            message: None,
            children,
        }
    }

    fn tree(children: Vec<EvaluatedNode>) -> EvaluatedTree {
        EvaluatedTree {
            entity: Term::from(ex("alice")),
            root: group(
                NodeKind::Root {
                    target_class: ex("Citizen"),
                },
                children,
            ),
        }
    }

    fn field(local: &str, children: Vec<EvaluatedNode>) -> EvaluatedNode {
        group(
            NodeKind::Field {
                path: FieldPath::Predicate(ex(local)),
            },
            children,
        )
    }

    fn int(n: i64) -> Term {
        Term::from(Literal::from(n))
    }

    #[test]
    fn minimum_violation() {
        let tree = tree(vec![field(
            "age",
            vec![
                rule(Constraint::MinInclusive(int(18)), Status::Violated, Some(16)),
                rule(Constraint::MaxCount(1), Status::Missing, None),
            ],
        )]);
        assert_eq!(
            Explainer::new(Locale::En).explain(&tree),
            vec!["The value of age must be at least 18, but it is 16."]
        );
        assert_eq!(
            Explainer::new(Locale::De).explain(&tree),
            vec!["Der Wert von age muss mindestens 18 sein, ist aber 16."]
        );
        assert_eq!(
            Explainer::new(Locale::En)
                .with_label(ex("age"), "your age")
                .explain(&tree),
            vec!["The value of your age must be at least 18, but it is 16."]
        );
    }

    #[test]
    fn paired_bounds_render_one_sentence() {
        let tree = tree(vec![field(
            "weeklyHours",
            vec![
                rule(Constraint::MinInclusive(int(15)), Status::Violated, Some(40)),
                rule(Constraint::MaxInclusive(int(36)), Status::Violated, Some(40)),
            ],
        )]);
        assert_eq!(
            Explainer::new(Locale::En).explain(&tree),
            vec!["The value of weeklyHours must be between 15 and 36, but it is 40."]
        );
    }

    #[test]
    fn range_sentence_sits_where_the_first_bound_was_declared() {
        let tree = tree(vec![field(
            "weeklyHours",
            vec![
                rule(Constraint::MaxInclusive(int(36)), Status::Violated, Some(40)),
                rule(Constraint::MaxCount(1), Status::Violated, None),
                rule(Constraint::MinInclusive(int(15)), Status::Violated, Some(40)),
            ],
        )]);
        assert_eq!(
            Explainer::new(Locale::En).explain(&tree),
            vec![
                "The value of weeklyHours must be between 15 and 36, but it is 40.",
                "weeklyHours may have at most 1 value(s).",
            ]
        );
    }

    #[test]
    fn bounds_with_different_values_stay_separate() {
        let tree = tree(vec![field(
            "weeklyHours",
            vec![
                rule(Constraint::MaxInclusive(int(36)), Status::Violated, Some(40)),
                rule(Constraint::MinInclusive(int(15)), Status::Violated, Some(10)),
            ],
        )]);
        assert_eq!(Explainer::new(Locale::En).explain(&tree).len(), 2);
    }

    #[test]
    fn only_violated_subtrees_are_explained() {
        let tree = tree(vec![
            field(
                "income",
                vec![rule(Constraint::MaxInclusive(int(3000)), Status::Ok, Some(2000))],
            ),
            group(
                NodeKind::Or,
                vec![field(
                    "status",
                    vec![rule(
                        Constraint::In(vec![Term::from(ex("student")), Term::from(ex("retired"))]),
                        Status::Violated,
                        None,
                    )],
                )],
            ),
            rule(Constraint::Node(Term::from(ex("AddressShape"))), Status::Violated, None),
        ]);
        assert_eq!(
            Explainer::new(Locale::En).explain(&tree),
            vec![
                "The value of status must be one of student, retired, but it is unknown.",
                "The value of value must conform to AddressShape, actual value unknown.",
            ]
        );
    }

    #[test]
    fn parses_locales() {
        assert_eq!("DE".parse::<Locale>().expect("known"), Locale::De);
        assert_eq!("en".parse::<Locale>().expect("known"), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }
}
