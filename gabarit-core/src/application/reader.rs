// gabarit-core/src/application/reader.rs

// Read-only access to the generic catalog schema. Every result set is fully
// materialized before the next statement is issued: the underlying
// connection is not reentrant, so cursors are never nested.

use std::collections::BTreeSet;

use crate::domain::catalog::{
    Attribute, CatalogInfo, CodedValue, DataType, DomainKind, FeatureClass, SpecificCode,
};
use crate::domain::error::DomainError;
use crate::domain::rules::{ConstraintParameter, ConstraintRelation, ConstraintRow};
use crate::error::GabaritError;
use crate::ports::store::{CatalogStore, SqlValue};

/// What the caller asked for. Names are normalized to uppercase at
/// construction; filtering is exact IN (...) match, no wildcards.
#[derive(Debug, Clone)]
pub struct Selection {
    pub catalog_id: i64,
    pub classes: Vec<String>,
    pub attributes: Vec<String>,
}

impl Selection {
    pub fn new(catalog_id: i64, classes: Vec<String>, attributes: Vec<String>) -> Self {
        Self {
            catalog_id,
            classes: classes.into_iter().map(|c| c.trim().to_uppercase()).collect(),
            attributes: attributes.into_iter().map(|a| a.trim().to_uppercase()).collect(),
        }
    }
}

/// One (class, attribute) pair of the selection.
#[derive(Debug, Clone)]
pub struct ClassAttribute {
    pub class: String,
    pub attribute: Attribute,
}

/// The ordered coded values of one (class, specific code, attribute) scope.
#[derive(Debug, Clone)]
pub struct ScopedValues {
    pub class: String,
    pub code: i64,
    pub attribute: String,
    pub values: Vec<CodedValue>,
}

/// Everything one run reads from the catalog. Loaded fresh every run, never
/// cached across runs.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub info: CatalogInfo,
    pub classes: Vec<FeatureClass>,
    pub attributes: Vec<ClassAttribute>,
    pub coded_values: Vec<ScopedValues>,
    pub constraints: Vec<ConstraintRow>,
}

impl CatalogSnapshot {
    pub fn class_names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.name.clone()).collect()
    }

    pub fn attributes_of(&self, class: &str) -> Vec<&ClassAttribute> {
        self.attributes.iter().filter(|a| a.class == class).collect()
    }

    pub fn find_attribute(&self, class: &str, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.class == class && a.attribute.name == name)
            .map(|a| &a.attribute)
    }
}

pub struct CatalogReader<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> CatalogReader<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    pub async fn read(&self, selection: &Selection) -> Result<CatalogSnapshot, GabaritError> {
        let info = self.fetch_catalog(selection.catalog_id).await?;
        let classes = self.fetch_classes(selection).await?;
        check_requested(&selection.classes, classes.iter().map(|c| c.name.as_str()))
            .map_err(DomainError::ClassNotFound)?;

        let attributes = self.fetch_attributes(selection).await?;
        check_requested(
            &selection.attributes,
            attributes.iter().map(|a| a.attribute.name.as_str()),
        )
        .map_err(DomainError::AttributeNotFound)?;

        let coded_values = self.fetch_coded_values(selection).await?;
        let constraints = self.fetch_constraints(selection).await?;

        Ok(CatalogSnapshot { info, classes, attributes, coded_values, constraints })
    }

    async fn fetch_catalog(&self, catalog_id: i64) -> Result<CatalogInfo, GabaritError> {
        let sql = format!(
            "SELECT FEAT_CATAL_ID, VERSION_NO, DESCR FROM FEAT_CATALOGUE WHERE FEAT_CATAL_ID = {}",
            catalog_id
        );
        let rows = self.store.select(&sql).await?;
        let row = rows
            .first()
            .ok_or(DomainError::CatalogNotFound(catalog_id))?;
        Ok(CatalogInfo {
            id: req_i64(row, 0, "FEAT_CATALOGUE")?,
            version: text(row, 1),
            description: text(row, 2),
        })
    }

    async fn fetch_classes(&self, selection: &Selection) -> Result<Vec<FeatureClass>, GabaritError> {
        let mut sql = format!(
            "SELECT FEAT_TYPE_NAME_DB, FEAT_TYPE_CODE_BD, DESCR \
             FROM FEAT_TYPE WHERE FEAT_CATAL_FK = {}",
            selection.catalog_id
        );
        if !selection.classes.is_empty() {
            sql.push_str(&format!(
                " AND UPPER(FEAT_TYPE_NAME_DB) IN {}",
                quoted_in_list(&selection.classes)
            ));
        }
        sql.push_str(" ORDER BY FEAT_TYPE_NAME_DB, FEAT_TYPE_CODE_BD");

        let rows = self.store.select(&sql).await?;
        let mut classes: Vec<FeatureClass> = Vec::new();
        for row in &rows {
            let name = text(row, 0).to_uppercase();
            let code = req_i64(row, 1, "FEAT_TYPE")?;
            let descr = text(row, 2);
            match classes.last_mut() {
                Some(last) if last.name == name => {
                    last.codes.push(SpecificCode { code, description: descr });
                }
                _ => {
                    classes.push(FeatureClass {
                        name,
                        description: descr.clone(),
                        codes: vec![SpecificCode { code, description: descr }],
                    });
                }
            }
        }
        Ok(classes)
    }

    async fn fetch_attributes(
        &self,
        selection: &Selection,
    ) -> Result<Vec<ClassAttribute>, GabaritError> {
        let mut sql = format!(
            "SELECT DISTINCT t.FEAT_TYPE_NAME_DB, a.FEAT_ATTR_NAME_DB, a.ATTR_TYPE_CODE, \
             a.DOM_TYPE_CODE, a.ATTR_LENGTH \
             FROM FEAT_TYPE t \
             JOIN RELATION_FEAT_ATTR r ON r.FEAT_TYPE_FK = t.FEAT_TYPE_ID \
             JOIN FEAT_ATTR a ON a.FEAT_ATTR_ID = r.FEAT_ATTR_FK \
             WHERE t.FEAT_CATAL_FK = {}",
            selection.catalog_id
        );
        if !selection.classes.is_empty() {
            sql.push_str(&format!(
                " AND UPPER(t.FEAT_TYPE_NAME_DB) IN {}",
                quoted_in_list(&selection.classes)
            ));
        }
        if !selection.attributes.is_empty() {
            sql.push_str(&format!(
                " AND UPPER(a.FEAT_ATTR_NAME_DB) IN {}",
                quoted_in_list(&selection.attributes)
            ));
        }
        sql.push_str(" ORDER BY t.FEAT_TYPE_NAME_DB, a.FEAT_ATTR_NAME_DB");

        let rows = self.store.select(&sql).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let data_type = DataType::from_catalog_code(req_i64(row, 2, "FEAT_ATTR")?)?;
            out.push(ClassAttribute {
                class: text(row, 0).to_uppercase(),
                attribute: Attribute {
                    name: text(row, 1).to_uppercase(),
                    data_type,
                    length: row.get(4).and_then(SqlValue::as_i64).map(|l| l as u32),
                    domain_kind: DomainKind::from_catalog_code(
                        req_i64(row, 3, "FEAT_ATTR")?,
                    ),
                },
            });
        }
        Ok(out)
    }

    async fn fetch_coded_values(
        &self,
        selection: &Selection,
    ) -> Result<Vec<ScopedValues>, GabaritError> {
        let mut sql = format!(
            "SELECT t.FEAT_TYPE_NAME_DB, t.FEAT_TYPE_CODE_BD, a.FEAT_ATTR_NAME_DB, \
             v.INTERNAL_CODE, v.LABEL_FR, v.LABEL_EN \
             FROM ATTR_VALUE v \
             JOIN FEAT_TYPE t ON t.FEAT_TYPE_ID = v.FEAT_TYPE_FK \
             JOIN FEAT_ATTR a ON a.FEAT_ATTR_ID = v.FEAT_ATTR_FK \
             WHERE t.FEAT_CATAL_FK = {}",
            selection.catalog_id
        );
        if !selection.classes.is_empty() {
            sql.push_str(&format!(
                " AND UPPER(t.FEAT_TYPE_NAME_DB) IN {}",
                quoted_in_list(&selection.classes)
            ));
        }
        if !selection.attributes.is_empty() {
            sql.push_str(&format!(
                " AND UPPER(a.FEAT_ATTR_NAME_DB) IN {}",
                quoted_in_list(&selection.attributes)
            ));
        }
        sql.push_str(
            " ORDER BY t.FEAT_TYPE_NAME_DB, t.FEAT_TYPE_CODE_BD, a.FEAT_ATTR_NAME_DB, v.VALUE_ORDER",
        );

        let rows = self.store.select(&sql).await?;
        let mut out: Vec<ScopedValues> = Vec::new();
        for row in &rows {
            let class = text(row, 0).to_uppercase();
            let code = req_i64(row, 1, "ATTR_VALUE")?;
            let attribute = text(row, 2).to_uppercase();
            let value = CodedValue {
                code: text(row, 3),
                label_fr: text(row, 4),
                label_en: text(row, 5),
            };
            match out.last_mut() {
                Some(last)
                    if last.class == class && last.code == code && last.attribute == attribute =>
                {
                    last.values.push(value);
                }
                _ => out.push(ScopedValues { class, code, attribute, values: vec![value] }),
            }
        }
        Ok(out)
    }

    async fn fetch_constraints(
        &self,
        selection: &Selection,
    ) -> Result<Vec<ConstraintRow>, GabaritError> {
        let mut sql = format!(
            "SELECT DISTINCT c.CONST_ID, c.PHYS_CONST_TYPE \
             FROM CONSTRAINT_DEF c \
             JOIN CONST_RELATION r ON r.CONST_FK = c.CONST_ID \
             JOIN FEAT_TYPE t ON t.FEAT_TYPE_ID = r.FEAT_TYPE_FK \
             WHERE t.FEAT_CATAL_FK = {}",
            selection.catalog_id
        );
        if !selection.classes.is_empty() {
            sql.push_str(&format!(
                " AND UPPER(t.FEAT_TYPE_NAME_DB) IN {}",
                quoted_in_list(&selection.classes)
            ));
        }
        sql.push_str(" ORDER BY c.CONST_ID");

        let head_rows = self.store.select(&sql).await?;
        if head_rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut constraints = Vec::with_capacity(head_rows.len());
        let mut ids = Vec::with_capacity(head_rows.len());
        for row in &head_rows {
            let id = req_i64(row, 0, "CONSTRAINT_DEF")?;
            ids.push(id);
            constraints.push(ConstraintRow {
                id,
                phys_type: req_i64(row, 1, "CONSTRAINT_DEF")?,
                relations: Vec::new(),
                parameters: Vec::new(),
            });
        }
        let id_list = numeric_in_list(&ids);

        let sql = format!(
            "SELECT r.CONST_FK, t.FEAT_TYPE_NAME_DB, a.FEAT_ATTR_NAME_DB \
             FROM CONST_RELATION r \
             JOIN FEAT_TYPE t ON t.FEAT_TYPE_ID = r.FEAT_TYPE_FK \
             LEFT JOIN FEAT_ATTR a ON a.FEAT_ATTR_ID = r.FEAT_ATTR_FK \
             WHERE r.CONST_FK IN {} \
             ORDER BY r.CONST_FK",
            id_list
        );
        let relation_rows = self.store.select(&sql).await?;
        for row in &relation_rows {
            let id = req_i64(row, 0, "CONST_RELATION")?;
            if let Some(c) = constraints.iter_mut().find(|c| c.id == id) {
                let attribute = match row.get(2) {
                    Some(SqlValue::Null) | None => None,
                    Some(v) => Some(v.to_string().to_uppercase()),
                };
                c.relations.push(ConstraintRelation {
                    class: text(row, 1).to_uppercase(),
                    attribute,
                });
            }
        }

        let sql = format!(
            "SELECT p.CONST_FK, p.PARAM_NAME, p.P_VALUE \
             FROM CONST_PARAMETER p \
             WHERE p.CONST_FK IN {} \
             ORDER BY p.CONST_FK, p.PARAM_ORDER",
            id_list
        );
        let parameter_rows = self.store.select(&sql).await?;
        for row in &parameter_rows {
            let id = req_i64(row, 0, "CONST_PARAMETER")?;
            if let Some(c) = constraints.iter_mut().find(|c| c.id == id) {
                c.parameters.push(ConstraintParameter {
                    name: text(row, 1),
                    value: text(row, 2),
                });
            }
        }

        Ok(constraints)
    }
}

// --- ROW HELPERS ---

fn text(row: &[SqlValue], idx: usize) -> String {
    row.get(idx).map(ToString::to_string).unwrap_or_default()
}

fn req_i64(row: &[SqlValue], idx: usize, table: &str) -> Result<i64, GabaritError> {
    row.get(idx)
        .and_then(SqlValue::as_i64)
        .ok_or_else(|| {
            GabaritError::InternalError(format!("{}: column {} is not numeric", table, idx))
        })
}

/// Renders `('A', 'B')` with embedded quotes doubled.
fn quoted_in_list(names: &[String]) -> String {
    let quoted: Vec<String> = names
        .iter()
        .map(|n| format!("'{}'", n.replace('\'', "''")))
        .collect();
    format!("({})", quoted.join(", "))
}

fn numeric_in_list(ids: &[i64]) -> String {
    let rendered: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
    format!("({})", rendered.join(", "))
}

/// Every explicitly requested name must exist in the fetched rows.
fn check_requested<'a>(
    requested: &[String],
    found: impl Iterator<Item = &'a str>,
) -> Result<(), String> {
    if requested.is_empty() {
        return Ok(());
    }
    let found: BTreeSet<&str> = found.collect();
    for name in requested {
        if !found.contains(name.as_str()) {
            return Err(name.clone());
        }
    }
    Ok(())
}
