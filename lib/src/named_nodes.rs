use oxigraph::model::NamedNodeRef;

const fn iri(value: &'static str) -> NamedNodeRef<'static> {
    NamedNodeRef::new_unchecked(value)
}

/// SHACL terms read by the shape compiler and the report reader.
pub struct SHACL {
    pub target_class: NamedNodeRef<'static>,
    pub property: NamedNodeRef<'static>,
    pub path: NamedNodeRef<'static>,
    pub inverse_path: NamedNodeRef<'static>,

    // facets
    pub in_: NamedNodeRef<'static>, // `in` is a reserved keyword in Rust
    pub has_value: NamedNodeRef<'static>,
    pub min_inclusive: NamedNodeRef<'static>,
    pub min_exclusive: NamedNodeRef<'static>,
    pub max_inclusive: NamedNodeRef<'static>,
    pub max_exclusive: NamedNodeRef<'static>,
    pub less_than: NamedNodeRef<'static>,
    pub less_than_or_equals: NamedNodeRef<'static>,
    pub min_count: NamedNodeRef<'static>,
    pub max_count: NamedNodeRef<'static>,
    pub node: NamedNodeRef<'static>,
    pub qualified_value_shape: NamedNodeRef<'static>,
    pub qualified_min_count: NamedNodeRef<'static>,
    pub qualified_max_count: NamedNodeRef<'static>,
    pub qualified_value_shapes_disjoint: NamedNodeRef<'static>,

    // logical
    pub and_: NamedNodeRef<'static>,
    pub or_: NamedNodeRef<'static>,
    pub not: NamedNodeRef<'static>,

    // annotations
    pub name: NamedNodeRef<'static>,
    pub description: NamedNodeRef<'static>,
    pub message: NamedNodeRef<'static>,
    pub order: NamedNodeRef<'static>,
    pub group: NamedNodeRef<'static>,
    pub deactivated: NamedNodeRef<'static>,

    // Severities
    pub severity: NamedNodeRef<'static>,
    pub info: NamedNodeRef<'static>,
    pub warning: NamedNodeRef<'static>,
    pub violation: NamedNodeRef<'static>,

    // Validation Report
    pub validation_report: NamedNodeRef<'static>,
    pub conforms: NamedNodeRef<'static>,
    pub result: NamedNodeRef<'static>,
    pub focus_node: NamedNodeRef<'static>,
    pub result_path: NamedNodeRef<'static>,
    pub value: NamedNodeRef<'static>,
    pub source_shape: NamedNodeRef<'static>,
    pub source_constraint_component: NamedNodeRef<'static>,
    pub result_message: NamedNodeRef<'static>,
    pub result_severity: NamedNodeRef<'static>,
    pub detail: NamedNodeRef<'static>,
}

pub const SHACL_NS: &str = "http://www.w3.org/ns/shacl#";

impl SHACL {
    pub fn new() -> Self {
        SHACL {
            target_class: iri("http://www.w3.org/ns/shacl#targetClass"),
            property: iri("http://www.w3.org/ns/shacl#property"),
            path: iri("http://www.w3.org/ns/shacl#path"),
            inverse_path: iri("http://www.w3.org/ns/shacl#inversePath"),

            in_: iri("http://www.w3.org/ns/shacl#in"),
            has_value: iri("http://www.w3.org/ns/shacl#hasValue"),
            min_inclusive: iri("http://www.w3.org/ns/shacl#minInclusive"),
            min_exclusive: iri("http://www.w3.org/ns/shacl#minExclusive"),
            max_inclusive: iri("http://www.w3.org/ns/shacl#maxInclusive"),
            max_exclusive: iri("http://www.w3.org/ns/shacl#maxExclusive"),
            less_than: iri("http://www.w3.org/ns/shacl#lessThan"),
            less_than_or_equals: iri("http://www.w3.org/ns/shacl#lessThanOrEquals"),
            min_count: iri("http://www.w3.org/ns/shacl#minCount"),
            max_count: iri("http://www.w3.org/ns/shacl#maxCount"),
            node: iri("http://www.w3.org/ns/shacl#node"),
            qualified_value_shape: iri("http://www.w3.org/ns/shacl#qualifiedValueShape"),
            qualified_min_count: iri("http://www.w3.org/ns/shacl#qualifiedMinCount"),
            qualified_max_count: iri("http://www.w3.org/ns/shacl#qualifiedMaxCount"),
            qualified_value_shapes_disjoint: iri(
                "http://www.w3.org/ns/shacl#qualifiedValueShapesDisjoint",
            ),

            and_: iri("http://www.w3.org/ns/shacl#and"),
            or_: iri("http://www.w3.org/ns/shacl#or"),
            not: iri("http://www.w3.org/ns/shacl#not"),

            name: iri("http://www.w3.org/ns/shacl#name"),
            description: iri("http://www.w3.org/ns/shacl#description"),
            message: iri("http://www.w3.org/ns/shacl#message"),
            order: iri("http://www.w3.org/ns/shacl#order"),
            group: iri("http://www.w3.org/ns/shacl#group"),
            deactivated: iri("http://www.w3.org/ns/shacl#deactivated"),

            severity: iri("http://www.w3.org/ns/shacl#severity"),
            info: iri("http://www.w3.org/ns/shacl#Info"),
            warning: iri("http://www.w3.org/ns/shacl#Warning"),
            violation: iri("http://www.w3.org/ns/shacl#Violation"),

            validation_report: iri("http://www.w3.org/ns/shacl#ValidationReport"),
            conforms: iri("http://www.w3.org/ns/shacl#conforms"),
            result: iri("http://www.w3.org/ns/shacl#result"),
            focus_node: iri("http://www.w3.org/ns/shacl#focusNode"),
            result_path: iri("http://www.w3.org/ns/shacl#resultPath"),
            value: iri("http://www.w3.org/ns/shacl#value"),
            source_shape: iri("http://www.w3.org/ns/shacl#sourceShape"),
            source_constraint_component: iri(
                "http://www.w3.org/ns/shacl#sourceConstraintComponent",
            ),
            result_message: iri("http://www.w3.org/ns/shacl#resultMessage"),
            result_severity: iri("http://www.w3.org/ns/shacl#resultSeverity"),
            detail: iri("http://www.w3.org/ns/shacl#detail"),
        }
    }
}

impl Default for SHACL {
    fn default() -> Self {
        Self::new()
    }
}

pub const MATCH_NS: &str = "https://w3id.org/reqmatch#";

/// Vocabulary of the matching report graph.
pub struct MATCH {
    pub citizen: NamedNodeRef<'static>,
    pub matching_report: NamedNodeRef<'static>,
    pub profile_result: NamedNodeRef<'static>,
    pub profile: NamedNodeRef<'static>,
    pub status: NamedNodeRef<'static>,
    pub sentinel_only: NamedNodeRef<'static>,
    pub eligible: NamedNodeRef<'static>,
    pub ineligible: NamedNodeRef<'static>,
    pub missing_data: NamedNodeRef<'static>,
    pub missing_datum: NamedNodeRef<'static>,
    pub entity: NamedNodeRef<'static>,
    pub field: NamedNodeRef<'static>,
    pub used_in: NamedNodeRef<'static>,
    pub miss_count: NamedNodeRef<'static>,
    pub most_missed: NamedNodeRef<'static>,
    pub missing_count: NamedNodeRef<'static>,
}

impl MATCH {
    pub fn new() -> Self {
        MATCH {
            citizen: iri("https://w3id.org/reqmatch#Citizen"),
            matching_report: iri("https://w3id.org/reqmatch#MatchingReport"),
            profile_result: iri("https://w3id.org/reqmatch#profileResult"),
            profile: iri("https://w3id.org/reqmatch#profile"),
            status: iri("https://w3id.org/reqmatch#status"),
            sentinel_only: iri("https://w3id.org/reqmatch#sentinelOnly"),
            eligible: iri("https://w3id.org/reqmatch#eligible"),
            ineligible: iri("https://w3id.org/reqmatch#ineligible"),
            missing_data: iri("https://w3id.org/reqmatch#missingData"),
            missing_datum: iri("https://w3id.org/reqmatch#missingDatum"),
            entity: iri("https://w3id.org/reqmatch#entity"),
            field: iri("https://w3id.org/reqmatch#field"),
            used_in: iri("https://w3id.org/reqmatch#usedIn"),
            miss_count: iri("https://w3id.org/reqmatch#missCount"),
            most_missed: iri("https://w3id.org/reqmatch#mostMissed"),
            missing_count: iri("https://w3id.org/reqmatch#missingCount"),
        }
    }
}

impl Default for MATCH {
    fn default() -> Self {
        Self::new()
    }
}
