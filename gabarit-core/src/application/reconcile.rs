// gabarit-core/src/application/reconcile.rs

// Use case: diff the catalog against the live geodatabase and its data.
// Read order is fixed: catalog first, then geodatabase schema, then data.
// The reporter never mutates anything.

use tracing::info;

use crate::application::reader::{CatalogReader, Selection};
use crate::domain::reconcile::{diff_classes, diff_fields, diff_values};
use crate::domain::report::RunReport;
use crate::error::GabaritError;
use crate::ports::geodatabase::Geodatabase;
use crate::ports::store::CatalogStore;

/// Subtype discriminant column every BDG feature table carries.
pub const SUBTYPE_FIELD: &str = "CODE_SPEC";

pub async fn run_reconciliation(
    store: &dyn CatalogStore,
    geodatabase: &dyn Geodatabase,
    selection: &Selection,
) -> Result<RunReport, GabaritError> {
    let reader = CatalogReader::new(store);
    let snapshot = reader.read(selection).await?;
    let mut report = RunReport::new();

    // 1. Classes vs tables.
    let catalog_classes = snapshot.class_names();
    let gdb_classes = geodatabase.list_feature_classes().await?;
    report.findings.extend(diff_classes(&catalog_classes, &gdb_classes));

    let shared: Vec<String> = catalog_classes
        .iter()
        .filter(|c| gdb_classes.iter().any(|g| g.eq_ignore_ascii_case(c)))
        .cloned()
        .collect();

    // 2. Attributes + types vs fields, for classes present on both sides.
    for class in &shared {
        let catalog_attrs: Vec<(String, crate::domain::catalog::DataType)> = snapshot
            .attributes_of(class)
            .iter()
            .map(|a| (a.attribute.name.clone(), a.attribute.data_type))
            .collect();
        let fields = geodatabase.list_fields(class).await?;
        report.findings.extend(diff_fields(class, &catalog_attrs, &fields));
    }

    // 3. Coded values vs stored values, gated on a row-count probe so empty
    // table segments cost one query, not two.
    for scoped in &snapshot.coded_values {
        if !shared.contains(&scoped.class) {
            continue;
        }
        let filter = format!("{} = {}", SUBTYPE_FIELD, scoped.code);
        let count = geodatabase.count_rows(&scoped.class, Some(&filter)).await?;
        if count == 0 {
            continue;
        }
        let actual = geodatabase
            .distinct_values(&scoped.class, &scoped.attribute, Some(&filter))
            .await?;
        let scope = format!("{}/{}/{}", scoped.class, scoped.code, scoped.attribute);
        report.findings.extend(diff_values(&scope, &scoped.values, &actual));
    }

    info!(findings = report.findings.len(), "Reconciliation finished");
    Ok(report)
}
