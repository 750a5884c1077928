// gabarit-core/src/application/registry.rs

// Use case: derive one validation rule per free-form attribute and render
// the INSERT statements feeding the constraint registry. Statements are
// emitted for operator review, never executed here.

use std::collections::HashMap;

use tracing::info;

use crate::application::reader::{CatalogReader, Selection};
use crate::domain::catalog::DomainKind;
use crate::domain::report::{RunReport, WarningKind};
use crate::domain::rules::classifier::{classify, describe, AttributeFacts};
use crate::domain::rules::{escape_sql, extract, PhysicalConstraint, ValidationRule};
use crate::error::GabaritError;
use crate::infrastructure::render::SqlRenderer;
use crate::ports::store::CatalogStore;

/// Fixed column set of the registry table: group, description, message,
/// query-or-parameters, rule name, scope.
const REGISTRY_INSERT: &str = "INSERT INTO {{ table }} \
(GROUPE, DESCRIPTION, MESSAGE, REQUETE_OU_PARAMS, NOM_REGLE, CIBLE) VALUES \
('{{ group }}', '{{ description }}', '{{ message }}', '{{ payload }}', '{{ rule }}', '{{ target }}');";

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    pub table: String,
    pub group: String,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self { table: "CONTRAINTE_INTEGRITE".to_string(), group: "BDG".to_string() }
    }
}

pub async fn emit_registry_sql(
    store: &dyn CatalogStore,
    selection: &Selection,
    options: &RegistryOptions,
) -> Result<RunReport, GabaritError> {
    let reader = CatalogReader::new(store);
    let snapshot = reader.read(selection).await?;
    let renderer = SqlRenderer::new();
    let mut report = RunReport::new();

    // 1. Interpret the constraint graph once. Shape mismatches become
    // warnings and the offending constraint is skipped.
    let mut regexes: HashMap<(String, String), String> = HashMap::new();
    let mut shaped: Vec<(i64, PhysicalConstraint)> = Vec::new();
    for row in &snapshot.constraints {
        match extract(row) {
            Ok(PhysicalConstraint::Regex { attribute, pattern }) => {
                for relation in &row.relations {
                    regexes.insert((relation.class.clone(), attribute.clone()), pattern.clone());
                }
            }
            Ok(constraint) => shaped.push((row.id, constraint)),
            Err(e) => report.warn(
                WarningKind::ShapeMismatch,
                format!("constraint {}", row.id),
                e.to_string(),
            ),
        }
    }

    // 2. One rule per free-form attribute per class, waterfall order.
    for class in &snapshot.classes {
        for entry in snapshot.attributes_of(&class.name) {
            let attribute = &entry.attribute;
            if attribute.domain_kind == DomainKind::Coded {
                continue; // enforced through attribute domains instead
            }
            let facts = AttributeFacts {
                name: &attribute.name,
                data_type: attribute.data_type,
                catalog_regex: regexes
                    .get(&(class.name.clone(), attribute.name.clone()))
                    .map(String::as_str),
            };
            let classification = classify(&facts);
            if !classification.validated {
                report.notice_unvalidated(&class.name, &attribute.name);
            }
            let (description, message) = describe(classification.kind, &attribute.name);
            let rule = ValidationRule {
                class: class.name.clone(),
                attribute: attribute.name.clone(),
                kind: classification.kind,
                check: classification.check,
                description,
                message,
            };
            let payload = rule.check.to_sql(&rule.class, &rule.attribute);
            let statement = renderer.render(
                REGISTRY_INSERT,
                &serde_json::json!({
                    "table": options.table,
                    "group": options.group,
                    "description": escape_sql(&rule.description),
                    "message": escape_sql(&rule.message),
                    "payload": escape_sql(&payload),
                    "rule": rule.name(),
                    "target": rule.class,
                }),
            )?;
            report.statements.push(statement);
        }
    }

    // 3. Non-regex constraints carry their descriptor in the payload column
    // instead of a query.
    for (id, constraint) in &shaped {
        let (rule_name, target, description) = match constraint {
            PhysicalConstraint::SpatialMask { mask_name, mask_id, features, .. } => (
                format!("SPATIAL_{}_{}", mask_name, mask_id),
                features.join("+"),
                "Spatial mask relation between feature classes".to_string(),
            ),
            PhysicalConstraint::Tolerance { constraint_name, .. } => (
                format!("TOLERANCE_{}_{}", constraint_name, id),
                String::new(),
                format!("Numeric tolerance ({})", constraint_name),
            ),
            PhysicalConstraint::Regex { .. } => continue, // handled above
        };
        let payload = serde_json::to_string(constraint)
            .map_err(|e| GabaritError::InternalError(format!("descriptor serialization: {}", e)))?;
        let statement = renderer.render(
            REGISTRY_INSERT,
            &serde_json::json!({
                "table": options.table,
                "group": options.group,
                "description": escape_sql(&description),
                "message": escape_sql("Review the related features"),
                "payload": escape_sql(&payload),
                "rule": rule_name,
                "target": target,
            }),
        )?;
        report.statements.push(statement);
    }

    info!(statements = report.statements.len(), "Registry statements emitted");
    Ok(report)
}
