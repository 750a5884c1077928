// gabarit-core/src/application/domains.rs

// Use case: derive deduplicated attribute domains from the catalog and apply
// them to the geodatabase. Creation always precedes binding; individual
// failures are warnings and the run continues (partial application is the
// accepted failure mode).

use tracing::{info, warn};

use crate::application::reader::{CatalogReader, CatalogSnapshot, Selection};
use crate::domain::catalog::DomainKind;
use crate::domain::dedup::{DomainSet, GenerationStrategy, KeyOrder};
use crate::domain::report::{RunReport, WarningKind};
use crate::error::GabaritError;
use crate::ports::geodatabase::Geodatabase;
use crate::ports::store::CatalogStore;

/// What happens to domains already present in the target.
///
/// There is deliberately no diff-and-patch mode: a run either wipes and
/// recreates everything, or only adds what is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPolicy {
    FullReplace,
    AdditiveOnly,
}

#[derive(Debug, Clone)]
pub struct DomainOptions {
    pub strategy: GenerationStrategy,
    pub policy: ReplacementPolicy,
    pub prefix: String,
    pub key_order: KeyOrder,
}

impl Default for DomainOptions {
    fn default() -> Self {
        Self {
            strategy: GenerationStrategy::ByCodeAttribute,
            policy: ReplacementPolicy::AdditiveOnly,
            prefix: "DOM".to_string(),
            key_order: KeyOrder::CatalogOrder,
        }
    }
}

pub async fn generate_domains(
    store: &dyn CatalogStore,
    geodatabase: &dyn Geodatabase,
    selection: &Selection,
    options: &DomainOptions,
) -> Result<RunReport, GabaritError> {
    let reader = CatalogReader::new(store);
    let snapshot = reader.read(selection).await?;

    let set = build_domain_set(&snapshot, options);
    info!(
        domains = set.len(),
        strategy = ?options.strategy,
        "Derived canonical domains from catalog"
    );

    let mut report = RunReport::new();

    if options.policy == ReplacementPolicy::FullReplace {
        destroy_existing(geodatabase, &mut report).await?;
    }

    let existing: Vec<String> = geodatabase
        .list_domains()
        .await?
        .into_iter()
        .map(|d| d.name)
        .collect();

    for domain in set.domains() {
        let already_there = existing.iter().any(|name| name == &domain.name);
        if already_there {
            // Additive policy: leave the existing domain untouched, still
            // attempt the bindings below.
            report.domains_reused += 1;
        } else {
            if let Err(e) = geodatabase
                .create_domain(
                    &domain.name,
                    domain.field_type.geodatabase_name(),
                    &domain.description,
                )
                .await
            {
                warn!(domain = %domain.name, "Domain creation failed: {}", e);
                report.warn(
                    WarningKind::PartialApplication,
                    domain.name.clone(),
                    format!("create failed: {}", e),
                );
                continue;
            }
            report.domains_created += 1;

            for value in &domain.values {
                match geodatabase
                    .add_coded_value(&domain.name, &value.code, &value.label_fr)
                    .await
                {
                    Ok(()) => report.values_added += 1,
                    Err(e) => report.warn(
                        WarningKind::PartialApplication,
                        format!("{}:{}", domain.name, value.code),
                        format!("coded value failed: {}", e),
                    ),
                }
            }
        }

        for assignment in &domain.assignments {
            match geodatabase
                .assign_domain_to_field(
                    &assignment.class,
                    &assignment.field,
                    &domain.name,
                    &assignment.codes,
                )
                .await
            {
                Ok(()) => report.bindings_applied += 1,
                Err(e) => report.warn(
                    WarningKind::PartialApplication,
                    format!("{}.{}", assignment.class, assignment.field),
                    format!("binding failed: {}", e),
                ),
            }
        }
    }

    info!("{}", report.summary());
    Ok(report)
}

/// Full-replace teardown: unbind every field, then drop every domain.
/// Failures are warnings; whatever survives will collide later and warn
/// again at creation time.
async fn destroy_existing(
    geodatabase: &dyn Geodatabase,
    report: &mut RunReport,
) -> Result<(), GabaritError> {
    let bindings = geodatabase.list_bindings().await?;
    for binding in &bindings {
        if let Err(e) = geodatabase
            .remove_domain_from_field(&binding.table, &binding.field)
            .await
        {
            report.warn(
                WarningKind::PartialApplication,
                format!("{}.{}", binding.table, binding.field),
                format!("unbind failed: {}", e),
            );
        }
    }
    let domains = geodatabase.list_domains().await?;
    for domain in &domains {
        match geodatabase.delete_domain(&domain.name).await {
            Ok(()) => report.domains_destroyed += 1,
            Err(e) => report.warn(
                WarningKind::PartialApplication,
                domain.name.clone(),
                format!("delete failed: {}", e),
            ),
        }
    }
    Ok(())
}

fn build_domain_set(snapshot: &CatalogSnapshot, options: &DomainOptions) -> DomainSet {
    let mut set = DomainSet::new(&options.prefix, options.strategy, options.key_order);
    for scoped in &snapshot.coded_values {
        let Some(attribute) = snapshot.find_attribute(&scoped.class, &scoped.attribute) else {
            continue;
        };
        if attribute.domain_kind != DomainKind::Coded {
            continue;
        }
        let code = match options.strategy {
            GenerationStrategy::ByCodeAttribute => Some(scoped.code),
            _ => None,
        };
        set.insert(&scoped.class, code, attribute, &scoped.values);
    }
    set
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ports::geodatabase::{DomainBinding, DomainSchema, FieldSchema};
    use crate::ports::store::SqlValue;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // --- MOCK GEODATABASE ---
    // Records every mutation in call order; introspection answers come from
    // fixed fixtures. `fail_bindings_for` simulates a per-scope failure.
    #[derive(Default)]
    struct MockGeodatabase {
        calls: Mutex<Vec<String>>,
        existing_domains: Vec<DomainSchema>,
        existing_bindings: Vec<DomainBinding>,
        fail_bindings_for: Option<String>,
    }

    impl MockGeodatabase {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl Geodatabase for MockGeodatabase {
        async fn list_feature_classes(&self) -> Result<Vec<String>, GabaritError> {
            Ok(vec![])
        }
        async fn list_fields(&self, _table: &str) -> Result<Vec<FieldSchema>, GabaritError> {
            Ok(vec![])
        }
        async fn list_domains(&self) -> Result<Vec<DomainSchema>, GabaritError> {
            Ok(self.existing_domains.clone())
        }
        async fn list_bindings(&self) -> Result<Vec<DomainBinding>, GabaritError> {
            Ok(self.existing_bindings.clone())
        }
        async fn count_rows(
            &self,
            _table: &str,
            _filter: Option<&str>,
        ) -> Result<u64, GabaritError> {
            Ok(0)
        }
        async fn distinct_values(
            &self,
            _table: &str,
            _field: &str,
            _filter: Option<&str>,
        ) -> Result<Vec<String>, GabaritError> {
            Ok(vec![])
        }
        async fn create_domain(
            &self,
            name: &str,
            field_type: &str,
            _description: &str,
        ) -> Result<(), GabaritError> {
            self.record(format!("create:{}:{}", name, field_type));
            Ok(())
        }
        async fn add_coded_value(
            &self,
            domain: &str,
            code: &str,
            label: &str,
        ) -> Result<(), GabaritError> {
            self.record(format!("value:{}:{}:{}", domain, code, label));
            Ok(())
        }
        async fn assign_domain_to_field(
            &self,
            table: &str,
            field: &str,
            domain: &str,
            subtype_codes: &[i64],
        ) -> Result<(), GabaritError> {
            if self.fail_bindings_for.as_deref() == Some(table) {
                return Err(GabaritError::InternalError("field not found".into()));
            }
            self.record(format!("bind:{}:{}:{}:{:?}", table, field, domain, subtype_codes));
            Ok(())
        }
        async fn remove_domain_from_field(
            &self,
            table: &str,
            field: &str,
        ) -> Result<(), GabaritError> {
            self.record(format!("unbind:{}:{}", table, field));
            Ok(())
        }
        async fn delete_domain(&self, name: &str) -> Result<(), GabaritError> {
            self.record(format!("delete:{}", name));
            Ok(())
        }
    }

    // --- MOCK STORE (canned catalog) ---
    struct MockStore {
        responses: Vec<(&'static str, Vec<Vec<SqlValue>>)>,
    }

    #[async_trait]
    impl CatalogStore for MockStore {
        async fn select(&self, sql: &str) -> Result<Vec<Vec<SqlValue>>, GabaritError> {
            for (fragment, rows) in &self.responses {
                if sql.contains(fragment) {
                    return Ok(rows.clone());
                }
            }
            Ok(Vec::new())
        }
        async fn execute(&self, _sql: &str) -> Result<(), GabaritError> {
            Ok(())
        }
    }

    fn t(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }
    fn i(v: i64) -> SqlValue {
        SqlValue::Integer(v)
    }

    fn waterbody_store() -> MockStore {
        MockStore {
            responses: vec![
                ("FROM FEAT_CATALOGUE", vec![vec![i(42), t("2.1"), t("BDG")]]),
                (
                    "FROM FEAT_TYPE WHERE",
                    vec![
                        vec![t("NHN_HHYD_WATERBODY_2"), i(1480000), t("area")],
                        vec![t("NHN_HHYD_WATERBODY_2"), i(1480002), t("point")],
                    ],
                ),
                (
                    "JOIN RELATION_FEAT_ATTR",
                    vec![vec![t("NHN_HHYD_WATERBODY_2"), t("WATER_DEFINITION"), i(2), i(-1), i(0)]],
                ),
                (
                    "FROM ATTR_VALUE",
                    vec![
                        vec![t("NHN_HHYD_WATERBODY_2"), i(1480000), t("WATER_DEFINITION"), t("1"), t("Lac"), t("Lake")],
                        vec![t("NHN_HHYD_WATERBODY_2"), i(1480000), t("WATER_DEFINITION"), t("2"), t("Réservoir"), t("Reservoir")],
                        vec![t("NHN_HHYD_WATERBODY_2"), i(1480002), t("WATER_DEFINITION"), t("1"), t("Lac"), t("Lake")],
                        vec![t("NHN_HHYD_WATERBODY_2"), i(1480002), t("WATER_DEFINITION"), t("2"), t("Réservoir"), t("Reservoir")],
                    ],
                ),
            ],
        }
    }

    #[tokio::test]
    async fn test_shared_value_set_yields_one_domain_two_codes() {
        let store = waterbody_store();
        let gdb = MockGeodatabase::default();
        let selection = Selection::new(42, vec![], vec![]);
        let options = DomainOptions::default();

        let report = generate_domains(&store, &gdb, &selection, &options)
            .await
            .expect("run");

        assert_eq!(report.domains_created, 1);
        assert_eq!(report.values_added, 2);
        assert_eq!(report.bindings_applied, 1);

        let calls = gdb.calls();
        // Creation strictly precedes binding, and both codes travel in one
        // binding call.
        assert_eq!(calls[0], "create:DOM_WATER_DEFINITION_1:INTEGER");
        assert!(calls.contains(&"bind:NHN_HHYD_WATERBODY_2:WATER_DEFINITION:DOM_WATER_DEFINITION_1:[1480000, 1480002]".to_string()));
    }

    #[tokio::test]
    async fn test_full_replace_destroys_before_creating() {
        let store = waterbody_store();
        let gdb = MockGeodatabase {
            existing_domains: vec![DomainSchema {
                name: "OLD_DOMAIN".into(),
                field_type: "TEXT".into(),
                description: String::new(),
                values: vec![],
            }],
            existing_bindings: vec![DomainBinding {
                table: "OLD_TABLE".into(),
                field: "OLD_FIELD".into(),
                domain: "OLD_DOMAIN".into(),
                subtype_codes: vec![],
            }],
            ..Default::default()
        };
        let selection = Selection::new(42, vec![], vec![]);
        let options = DomainOptions {
            policy: ReplacementPolicy::FullReplace,
            ..Default::default()
        };

        let report = generate_domains(&store, &gdb, &selection, &options)
            .await
            .expect("run");

        assert_eq!(report.domains_destroyed, 1);
        let calls = gdb.calls();
        assert_eq!(calls[0], "unbind:OLD_TABLE:OLD_FIELD");
        assert_eq!(calls[1], "delete:OLD_DOMAIN");
        assert!(calls[2].starts_with("create:"));
    }

    #[tokio::test]
    async fn test_additive_policy_reuses_existing_domain() {
        let store = waterbody_store();
        let gdb = MockGeodatabase {
            existing_domains: vec![DomainSchema {
                name: "DOM_WATER_DEFINITION_1".into(),
                field_type: "INTEGER".into(),
                description: String::new(),
                values: vec![],
            }],
            ..Default::default()
        };
        let selection = Selection::new(42, vec![], vec![]);
        let options = DomainOptions::default();

        let report = generate_domains(&store, &gdb, &selection, &options)
            .await
            .expect("run");

        assert_eq!(report.domains_created, 0);
        assert_eq!(report.domains_reused, 1);
        // Still bound, just not recreated.
        assert_eq!(report.bindings_applied, 1);
        assert!(gdb.calls().iter().all(|c| !c.starts_with("create:")));
    }

    #[tokio::test]
    async fn test_binding_failure_is_warning_not_abort() {
        let store = waterbody_store();
        let gdb = MockGeodatabase {
            fail_bindings_for: Some("NHN_HHYD_WATERBODY_2".into()),
            ..Default::default()
        };
        let selection = Selection::new(42, vec![], vec![]);
        let options = DomainOptions::default();

        let report = generate_domains(&store, &gdb, &selection, &options)
            .await
            .expect("partial application must not abort the run");

        assert_eq!(report.domains_created, 1);
        assert_eq!(report.bindings_applied, 0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::PartialApplication);
    }
}
