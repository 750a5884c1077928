// gabarit-core/src/domain/reconcile.rs

// Pure set diffs between what the catalog declares and what the geodatabase
// exposes. Direction matters: "missing in catalog" means stale schema to
// document, "missing in geodatabase" means a class/field/value not deployed.
// Inputs are normalized and sorted so two runs over unchanged state produce
// byte-identical findings.

use crate::domain::catalog::{CodedValue, DataType};
use crate::ports::geodatabase::FieldSchema;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FindingKind {
    MissingInCatalog,
    MissingInGeodatabase,
    TypeMismatch,
    ValueMismatch,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::MissingInCatalog => "MISSING_IN_CATALOG",
            FindingKind::MissingInGeodatabase => "MISSING_IN_GEODATABASE",
            FindingKind::TypeMismatch => "TYPE_MISMATCH",
            FindingKind::ValueMismatch => "VALUE_MISMATCH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub scope: String,
    pub detail: String,
}

fn normalized(names: &[String]) -> BTreeSet<String> {
    names.iter().map(|n| n.trim().to_uppercase()).collect()
}

/// Diffs catalog classes against geodatabase tables, by case-normalized name.
pub fn diff_classes(catalog: &[String], geodatabase: &[String]) -> Vec<Finding> {
    let cat = normalized(catalog);
    let gdb = normalized(geodatabase);
    let mut findings = Vec::new();

    for name in cat.difference(&gdb) {
        findings.push(Finding {
            kind: FindingKind::MissingInGeodatabase,
            scope: name.clone(),
            detail: "class declared in catalog but absent from geodatabase".into(),
        });
    }
    for name in gdb.difference(&cat) {
        findings.push(Finding {
            kind: FindingKind::MissingInCatalog,
            scope: name.clone(),
            detail: "table present in geodatabase but not declared in catalog".into(),
        });
    }
    findings
}

/// Diffs catalog attributes (+ declared types) against the live field list
/// of one class. Type names go through the fixed translation table.
pub fn diff_fields(
    class: &str,
    catalog_attrs: &[(String, DataType)],
    fields: &[FieldSchema],
) -> Vec<Finding> {
    let cat: BTreeSet<String> = catalog_attrs.iter().map(|(n, _)| n.to_uppercase()).collect();
    let gdb: BTreeSet<String> = fields.iter().map(|f| f.name.to_uppercase()).collect();
    let mut findings = Vec::new();

    for name in cat.difference(&gdb) {
        findings.push(Finding {
            kind: FindingKind::MissingInGeodatabase,
            scope: format!("{}.{}", class, name),
            detail: "attribute declared in catalog but field absent".into(),
        });
    }
    for name in gdb.difference(&cat) {
        findings.push(Finding {
            kind: FindingKind::MissingInCatalog,
            scope: format!("{}.{}", class, name),
            detail: "field present but attribute not declared in catalog".into(),
        });
    }

    // Shared fields: compare types through the translation table.
    for (name, data_type) in catalog_attrs {
        let upper = name.to_uppercase();
        if let Some(field) = fields.iter().find(|f| f.name.to_uppercase() == upper) {
            if !data_type.matches_field_type(&field.data_type) {
                findings.push(Finding {
                    kind: FindingKind::TypeMismatch,
                    scope: format!("{}.{}", class, upper),
                    detail: format!(
                        "catalog type {} vs field type {}",
                        data_type.geodatabase_name(),
                        field.data_type.to_uppercase()
                    ),
                });
            }
        }
    }
    findings
}

/// Diffs the catalog coded values of one (class, code, attribute) scope
/// against the distinct values actually stored. The caller is responsible
/// for skipping empty table segments (row-count probe).
pub fn diff_values(scope: &str, expected: &[CodedValue], actual: &[String]) -> Vec<Finding> {
    let cat: BTreeSet<String> = expected.iter().map(|v| v.code.trim().to_string()).collect();
    let live: BTreeSet<String> = actual.iter().map(|v| v.trim().to_string()).collect();
    let mut findings = Vec::new();

    for value in live.difference(&cat) {
        findings.push(Finding {
            kind: FindingKind::ValueMismatch,
            scope: scope.to_string(),
            detail: format!("stored value '{}' is not a catalog coded value", value),
        });
    }
    // Unused catalog values are not a defect; only foreign stored values are.
    findings
}
