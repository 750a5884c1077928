// gabarit-core/src/ports/geodatabase.rs

// Introspection + mutation surface of the mirrored geodatabase. The core
// never talks to the GIS toolkit directly: it lists what exists, then asks
// for domains to be created, populated and bound to fields.

use crate::error::GabaritError;
use async_trait::async_trait;

/// One field of a feature table, as the geodatabase describes it.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

/// An attribute domain as stored in the geodatabase, values included.
#[derive(Debug, Clone)]
pub struct DomainSchema {
    pub name: String,
    pub field_type: String,
    pub description: String,
    /// (internal code, label) pairs in declaration order.
    pub values: Vec<(String, String)>,
}

/// A (table, field) -> domain binding, with the subtype codes it covers.
/// An empty code list means the binding applies to the whole table.
#[derive(Debug, Clone)]
pub struct DomainBinding {
    pub table: String,
    pub field: String,
    pub domain: String,
    pub subtype_codes: Vec<i64>,
}

#[async_trait]
pub trait Geodatabase: Send + Sync {
    // --- Introspection ---
    async fn list_feature_classes(&self) -> Result<Vec<String>, GabaritError>;
    async fn list_fields(&self, table: &str) -> Result<Vec<FieldSchema>, GabaritError>;
    async fn list_domains(&self) -> Result<Vec<DomainSchema>, GabaritError>;
    async fn list_bindings(&self) -> Result<Vec<DomainBinding>, GabaritError>;
    async fn count_rows(&self, table: &str, filter: Option<&str>) -> Result<u64, GabaritError>;
    async fn distinct_values(
        &self,
        table: &str,
        field: &str,
        filter: Option<&str>,
    ) -> Result<Vec<String>, GabaritError>;

    // --- Mutation ---
    async fn create_domain(
        &self,
        name: &str,
        field_type: &str,
        description: &str,
    ) -> Result<(), GabaritError>;
    async fn add_coded_value(
        &self,
        domain: &str,
        code: &str,
        label: &str,
    ) -> Result<(), GabaritError>;
    async fn assign_domain_to_field(
        &self,
        table: &str,
        field: &str,
        domain: &str,
        subtype_codes: &[i64],
    ) -> Result<(), GabaritError>;
    async fn remove_domain_from_field(&self, table: &str, field: &str)
        -> Result<(), GabaritError>;
    async fn delete_domain(&self, name: &str) -> Result<(), GabaritError>;
}
