// gabarit-core/src/domain/catalog.rs

// In-memory representation of the published catalog. Entities are read fresh
// every run and never mutated; everything derived from them lives in
// dedup.rs / rules/.

use crate::domain::error::DomainError;
use serde::Serialize;

/// Root of a catalog tree. Immutable once published.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogInfo {
    pub id: i64,
    pub version: String,
    pub description: String,
}

/// A feature class with its specific codes, identified by its database-safe
/// uppercase name.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureClass {
    pub name: String,
    pub description: String,
    pub codes: Vec<SpecificCode>,
}

/// A numeric subtype code scoped to one feature class.
#[derive(Debug, Clone, Serialize)]
pub struct SpecificCode {
    pub code: i64,
    pub description: String,
}

/// Geometry cardinality intent carried by the last digit of a specific code.
/// Convention inherited from the catalog, not declared anywhere in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeometryIntent {
    Area,
    Line,
    Point,
    Unknown,
}

impl SpecificCode {
    pub fn geometry(&self) -> GeometryIntent {
        match self.code.rem_euclid(10) {
            0 => GeometryIntent::Area,
            1 => GeometryIntent::Line,
            2 => GeometryIntent::Point,
            _ => GeometryIntent::Unknown,
        }
    }
}

/// Declared data type of a catalog attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    Character,
    Integer,
    Decimal,
    Iduu,
}

impl DataType {
    pub fn from_catalog_code(code: i64) -> Result<Self, DomainError> {
        match code {
            1 => Ok(DataType::Character),
            2 => Ok(DataType::Integer),
            3 => Ok(DataType::Decimal),
            4 => Ok(DataType::Iduu),
            other => Err(DomainError::UnknownDataType(other)),
        }
    }

    /// Field type name used by the geodatabase for this catalog type.
    /// Fixed translation table; reconciliation relies on it (both ways).
    pub fn geodatabase_name(&self) -> &'static str {
        match self {
            DataType::Character => "TEXT",
            DataType::Integer => "INTEGER",
            DataType::Decimal => "DOUBLE",
            DataType::Iduu => "UUID",
        }
    }

    /// Whether a geodatabase field type name is an acceptable rendering of
    /// this catalog type. Engines spell the same type several ways.
    pub fn matches_field_type(&self, field_type: &str) -> bool {
        let ft = field_type.to_uppercase();
        match self {
            DataType::Character => ft == "TEXT" || ft == "VARCHAR" || ft.starts_with("CHAR"),
            DataType::Integer => ft == "INTEGER" || ft == "BIGINT" || ft == "INT" || ft == "SMALLINT",
            DataType::Decimal => ft == "DOUBLE" || ft == "FLOAT" || ft.starts_with("DECIMAL") || ft.starts_with("NUMERIC"),
            DataType::Iduu => ft == "UUID" || ft == "GUID",
        }
    }
}

/// Domain enforcement flag of a catalog attribute. The catalog encodes
/// "coded" as -1 in DOM_TYPE_CODE; anything else is free-form text with an
/// optional regex constraint attached through the constraint graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DomainKind {
    Coded,
    FreeForm,
}

impl DomainKind {
    pub fn from_catalog_code(code: i64) -> Self {
        if code == -1 {
            DomainKind::Coded
        } else {
            DomainKind::FreeForm
        }
    }
}

/// A catalog attribute, linked to feature classes through specific codes.
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: String,
    pub data_type: DataType,
    pub length: Option<u32>,
    pub domain_kind: DomainKind,
}

/// An (internal-code, label-fr, label-en) triple scoped to one attribute and
/// one specific code, in catalog display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodedValue {
    pub code: String,
    pub label_fr: String,
    pub label_en: String,
}
