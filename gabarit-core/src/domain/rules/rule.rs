// gabarit-core/src/domain/rules/rule.rs

use serde::Serialize;

/// Structural validation pattern selected for an attribute. One kind per
/// classifier table entry; `NotNull` is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleKind {
    CatalogRegex,
    Accuracy,
    PartialDate,
    Latitude,
    Longitude,
    CentralMeridian,
    TileIdentifier,
    TileMembership,
    WorkZone,
    Uuid,
    HexIdentifier,
    AgencyCode,
    LocalIdentifier,
    NamePresence,
    LegalNameSource,
    NameReference,
    NotNull,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::CatalogRegex => "CATALOG_REGEX",
            RuleKind::Accuracy => "ACCURACY",
            RuleKind::PartialDate => "PARTIAL_DATE",
            RuleKind::Latitude => "LATITUDE",
            RuleKind::Longitude => "LONGITUDE",
            RuleKind::CentralMeridian => "CENTRAL_MERIDIAN",
            RuleKind::TileIdentifier => "TILE_IDENTIFIER",
            RuleKind::TileMembership => "TILE_MEMBERSHIP",
            RuleKind::WorkZone => "WORK_ZONE",
            RuleKind::Uuid => "UUID",
            RuleKind::HexIdentifier => "HEX_IDENTIFIER",
            RuleKind::AgencyCode => "AGENCY_CODE",
            RuleKind::LocalIdentifier => "LOCAL_IDENTIFIER",
            RuleKind::NamePresence => "NAME_PRESENCE",
            RuleKind::LegalNameSource => "LEGAL_NAME_SOURCE",
            RuleKind::NameReference => "NAME_REFERENCE",
            RuleKind::NotNull => "NOT_NULL",
        }
    }
}

/// The executable shape of a rule: what the registry query checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RuleCheck {
    Regex(String),
    /// Closed numeric range with an optional out-of-band sentinel value.
    Range {
        min: f64,
        max: f64,
        sentinel: Option<f64>,
    },
    /// Value must exist in a reference table column.
    TableMembership { table: String, column: String },
    /// Value must match a pattern AND exist in a reference table column.
    PatternMembership {
        pattern: String,
        table: String,
        column: String,
    },
    /// Value must belong to a fixed list.
    ValueMembership(Vec<String>),
    /// When the attribute is set, at least one of these fields must be too.
    CrossFieldPresence(Vec<String>),
    NotNull,
}

/// One rule per attribute per scope, ready for the registry emitter.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRule {
    pub class: String,
    pub attribute: String,
    pub kind: RuleKind,
    pub check: RuleCheck,
    pub description: String,
    pub message: String,
}

impl ValidationRule {
    pub fn name(&self) -> String {
        format!("{}_{}_{}", self.class, self.attribute, self.kind.as_str())
    }
}

/// Doubles single quotes so a value can sit inside a SQL string literal.
pub fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

impl RuleCheck {
    /// Renders the validation probe the registry stores: a query counting
    /// the rows that violate the rule. Never executed by this crate.
    pub fn to_sql(&self, class: &str, attribute: &str) -> String {
        match self {
            RuleCheck::Regex(pattern) => format!(
                "SELECT COUNT(*) FROM {c} WHERE {a} IS NOT NULL AND NOT REGEXP_MATCHES(CAST({a} AS VARCHAR), '{p}')",
                c = class,
                a = attribute,
                p = escape_sql(pattern)
            ),
            RuleCheck::Range { min, max, sentinel } => {
                let sentinel_clause = sentinel
                    .map(|s| format!(" AND {} <> {}", attribute, s))
                    .unwrap_or_default();
                format!(
                    "SELECT COUNT(*) FROM {c} WHERE {a} IS NOT NULL AND ({a} < {min} OR {a} > {max}){s}",
                    c = class,
                    a = attribute,
                    min = min,
                    max = max,
                    s = sentinel_clause
                )
            }
            RuleCheck::TableMembership { table, column } => format!(
                "SELECT COUNT(*) FROM {c} WHERE {a} IS NOT NULL AND CAST({a} AS VARCHAR) NOT IN (SELECT {col} FROM {t})",
                c = class,
                a = attribute,
                col = column,
                t = table
            ),
            RuleCheck::PatternMembership { pattern, table, column } => format!(
                "SELECT COUNT(*) FROM {c} WHERE {a} IS NOT NULL AND (NOT REGEXP_MATCHES(CAST({a} AS VARCHAR), '{p}') OR CAST({a} AS VARCHAR) NOT IN (SELECT {col} FROM {t}))",
                c = class,
                a = attribute,
                p = escape_sql(pattern),
                col = column,
                t = table
            ),
            RuleCheck::ValueMembership(values) => {
                let list = values
                    .iter()
                    .map(|v| format!("'{}'", escape_sql(v)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "SELECT COUNT(*) FROM {c} WHERE {a} IS NOT NULL AND CAST({a} AS VARCHAR) NOT IN ({list})",
                    c = class,
                    a = attribute,
                    list = list
                )
            }
            RuleCheck::CrossFieldPresence(fields) => {
                let all_null = fields
                    .iter()
                    .map(|f| format!("{} IS NULL", f))
                    .collect::<Vec<_>>()
                    .join(" AND ");
                format!(
                    "SELECT COUNT(*) FROM {c} WHERE {a} IS NOT NULL AND {nulls}",
                    c = class,
                    a = attribute,
                    nulls = all_null
                )
            }
            RuleCheck::NotNull => format!(
                "SELECT COUNT(*) FROM {c} WHERE {a} IS NULL",
                c = class,
                a = attribute
            ),
        }
    }
}
