// gabarit-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Catalog {0} not found")]
    #[diagnostic(
        code(gabarit::domain::catalog_not_found),
        help("Check the catalog id against FEAT_CATALOGUE.")
    )]
    CatalogNotFound(i64),

    #[error("Feature class '{0}' not found in catalog")]
    #[diagnostic(code(gabarit::domain::class_not_found))]
    ClassNotFound(String),

    #[error("Attribute '{0}' not found in catalog")]
    #[diagnostic(code(gabarit::domain::attribute_not_found))]
    AttributeNotFound(String),

    #[error("Constraint {constraint_id} (type {phys_type}): {reason}")]
    #[diagnostic(
        code(gabarit::domain::constraint_shape),
        help("The parameter rows do not match the shape this physical constraint type expects.")
    )]
    ShapeMismatch {
        constraint_id: i64,
        phys_type: i64,
        reason: String,
    },

    #[error("Unknown catalog data type code: {0}")]
    #[diagnostic(code(gabarit::domain::data_type))]
    UnknownDataType(i64),

    #[error("Invalid validation pattern: {0}")]
    #[diagnostic(code(gabarit::domain::pattern))]
    InvalidPattern(String),
}
