use crate::error::{MatchError, MatchResult};
use crate::named_nodes::{MATCH, MATCH_NS, SHACL, SHACL_NS};
use crate::types::FieldPath;
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;

/// Classification of one requirement profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Eligibility {
    Eligible,
    Ineligible,
    MissingData,
}

impl Eligibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Eligibility::Eligible => "eligible",
            Eligibility::Ineligible => "ineligible",
            Eligibility::MissingData => "missingData",
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact the citizen still has to provide: some value for `field` on
/// `entity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MissingDatum {
    pub entity: Term,
    pub field: FieldPath,
}

/// Outcome of one profile in a matching run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileOutcome {
    pub profile: NamedNode,
    pub status: Eligibility,
    /// Eligible, but count shortfalls were reported anyway.
    pub sentinel_only: bool,
    pub missing: Vec<MissingDatum>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingEntry {
    pub datum: MissingDatum,
    /// Profiles that miss this datum, in first-encounter order.
    pub profiles: Vec<NamedNode>,
}

impl MissingEntry {
    pub fn count(&self) -> usize {
        self.profiles.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchingReport {
    pub profiles: Vec<ProfileOutcome>,
    pub missing: Vec<MissingEntry>,
    pub most_missed: Option<MissingDatum>,
    pub missing_count: usize,
}

impl MatchingReport {
    /// Unions the missing data of `outcomes`. The most missed datum is the
    /// one missed by the most profiles; ties go to the one seen first.
    pub fn from_outcomes(outcomes: Vec<ProfileOutcome>) -> Self {
        let mut missing: Vec<MissingEntry> = Vec::new();
        let mut index: HashMap<MissingDatum, usize> = HashMap::new();
        for outcome in &outcomes {
            for datum in &outcome.missing {
                let idx = *index.entry(datum.clone()).or_insert_with(|| {
                    missing.push(MissingEntry {
                        datum: datum.clone(),
                        profiles: Vec::new(),
                    });
                    missing.len() - 1
                });
                let entry = &mut missing[idx];
                if !entry.profiles.contains(&outcome.profile) {
                    entry.profiles.push(outcome.profile.clone());
                }
            }
        }

        let mut most_missed: Option<&MissingEntry> = None;
        for entry in &missing {
            if most_missed.map_or(true, |best| entry.count() > best.count()) {
                most_missed = Some(entry);
            }
        }
        let most_missed = most_missed.map(|entry| entry.datum.clone());

        MatchingReport {
            missing_count: missing.len(),
            most_missed,
            missing,
            profiles: outcomes,
        }
    }

    pub fn outcome(&self, profile: &NamedNode) -> Option<&ProfileOutcome> {
        self.profiles.iter().find(|o| &o.profile == profile)
    }

    pub fn status(&self, profile: &NamedNode) -> Option<Eligibility> {
        self.outcome(profile).map(|o| o.status)
    }

    pub fn to_json(&self) -> Value {
        let profiles: Vec<Value> = self
            .profiles
            .iter()
            .map(|o| {
                json!({
                    "profile": o.profile.as_str(),
                    "status": o.status,
                    "sentinelOnly": o.sentinel_only,
                })
            })
            .collect();
        let missing: Vec<Value> = self
            .missing
            .iter()
            .map(|m| {
                json!({
                    "entity": term_to_string(&m.datum.entity),
                    "field": m.datum.field.to_string(),
                    "profiles": m.profiles.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                    "count": m.count(),
                })
            })
            .collect();
        json!({
            "profiles": profiles,
            "missing": missing,
            "mostMissed": self.most_missed.as_ref().map(|d| json!({
                "entity": term_to_string(&d.entity),
                "field": d.field.to_string(),
            })),
            "missingCount": self.missing_count,
        })
    }

    pub fn to_graph(&self) -> Graph {
        let mut graph = Graph::new();
        let vocab = MATCH::new();
        let sh = SHACL::new();
        let report_node: NamedOrBlankNode = BlankNode::default().into();

        graph.insert(&Triple::new(
            report_node.clone(),
            rdf::TYPE,
            Term::from(vocab.matching_report),
        ));

        for outcome in &self.profiles {
            let result_node: NamedOrBlankNode = BlankNode::default().into();
            graph.insert(&Triple::new(
                report_node.clone(),
                vocab.profile_result,
                Term::from(result_node.clone()),
            ));
            graph.insert(&Triple::new(
                result_node.clone(),
                vocab.profile,
                Term::from(outcome.profile.clone()),
            ));
            let status = match outcome.status {
                Eligibility::Eligible => vocab.eligible,
                Eligibility::Ineligible => vocab.ineligible,
                Eligibility::MissingData => vocab.missing_data,
            };
            graph.insert(&Triple::new(result_node.clone(), vocab.status, Term::from(status)));
            graph.insert(&Triple::new(
                result_node,
                vocab.sentinel_only,
                Term::from(Literal::from(outcome.sentinel_only)),
            ));
        }

        for entry in &self.missing {
            let datum_node: NamedOrBlankNode = BlankNode::default().into();
            graph.insert(&Triple::new(
                report_node.clone(),
                vocab.missing_datum,
                Term::from(datum_node.clone()),
            ));
            graph.insert(&Triple::new(
                datum_node.clone(),
                vocab.entity,
                entry.datum.entity.clone(),
            ));
            let field = match &entry.datum.field {
                FieldPath::Predicate(p) => Term::from(p.clone()),
                FieldPath::Inverse(p) => {
                    let path_node = BlankNode::default();
                    graph.insert(&Triple::new(
                        path_node.clone(),
                        sh.inverse_path,
                        Term::from(p.clone()),
                    ));
                    Term::from(path_node)
                }
            };
            graph.insert(&Triple::new(datum_node.clone(), vocab.field, field));
            for profile in &entry.profiles {
                graph.insert(&Triple::new(
                    datum_node.clone(),
                    vocab.used_in,
                    Term::from(profile.clone()),
                ));
            }
            graph.insert(&Triple::new(
                datum_node.clone(),
                vocab.miss_count,
                Term::from(Literal::from(entry.count() as i64)),
            ));
            if self.most_missed.as_ref() == Some(&entry.datum) {
                graph.insert(&Triple::new(
                    report_node.clone(),
                    vocab.most_missed,
                    Term::from(datum_node),
                ));
            }
        }

        graph.insert(&Triple::new(
            report_node,
            vocab.missing_count,
            Term::from(Literal::from(self.missing_count as i64)),
        ));
        graph
    }

    pub fn to_rdf(&self, format: RdfFormat) -> MatchResult<String> {
        let graph = self.to_graph();
        let mut writer = Vec::new();
        let mut serializer = RdfSerializer::from_format(format)
            .with_prefix("match", MATCH_NS)?
            .with_prefix("sh", SHACL_NS)?
            .with_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#")?
            .for_writer(&mut writer);

        for triple in graph.iter() {
            serializer.serialize_triple(triple)?;
        }
        serializer.finish()?;
        String::from_utf8(writer).map_err(|e| MatchError::Serialization(e.to_string()))
    }

    pub fn to_turtle(&self) -> MatchResult<String> {
        self.to_rdf(RdfFormat::Turtle)
    }
}

fn term_to_string(term: &Term) -> String {
    match term {
        Term::NamedNode(nn) => nn.as_str().to_string(),
        Term::BlankNode(bn) => format!("_:{}", bn.as_str()),
        Term::Literal(lit) => lit.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}
