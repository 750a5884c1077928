// gabarit-core/src/domain/rules/extractor.rs

// The catalog encodes four constraint shapes behind one PHYS_CONST_TYPE
// foreign key. This module is the single place that interpretation happens:
// a tagged union plus one extraction function, instead of the same if/elif
// ladder repeated per consumer. A shape mismatch is a warning for the caller
// to record, never a silently coerced rule.

use crate::domain::error::DomainError;
use serde::Serialize;

/// Physical constraint type: attribute-level regex.
pub const TYPE_ATTRIBUTE_REGEX: i64 = 116_088;
/// Physical constraint type: spatial mask between feature classes.
pub const TYPE_SPATIAL_MASK: i64 = 16_904;
/// Physical constraint type: proximity tolerance.
pub const TYPE_PROXIMITY: i64 = 30_718_640;
/// Physical constraint type: filtering tolerance.
pub const TYPE_FILTERING: i64 = 131_019;

/// One row of the constraint graph, relations and parameters already
/// materialized (the reader never nests cursors).
#[derive(Debug, Clone)]
pub struct ConstraintRow {
    pub id: i64,
    pub phys_type: i64,
    pub relations: Vec<ConstraintRelation>,
    pub parameters: Vec<ConstraintParameter>,
}

/// A feature class (and optionally one of its attributes) the constraint
/// relates to.
#[derive(Debug, Clone)]
pub struct ConstraintRelation {
    pub class: String,
    pub attribute: Option<String>,
}

/// A (name, value) parameter row, in PARAM_ORDER.
#[derive(Debug, Clone)]
pub struct ConstraintParameter {
    pub name: String,
    pub value: String,
}

/// The interpreted constraint. Which variant is valid is decided by the
/// physical type id, confirmed against the parameter keys actually present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PhysicalConstraint {
    Regex {
        attribute: String,
        pattern: String,
    },
    SpatialMask {
        mask_id: i64,
        cardinality: String,
        mask_name: String,
        view_mask: String,
        expected: bool,
        /// Related feature classes, in relation order.
        features: Vec<String>,
    },
    Tolerance {
        constraint_name: String,
        parameters: Vec<(String, f64)>,
    },
}

fn param<'a>(row: &'a ConstraintRow, name: &str) -> Option<&'a str> {
    row.parameters
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.value.as_str())
}

fn mismatch(row: &ConstraintRow, reason: impl Into<String>) -> DomainError {
    DomainError::ShapeMismatch {
        constraint_id: row.id,
        phys_type: row.phys_type,
        reason: reason.into(),
    }
}

/// Interprets one constraint row. Exhaustive over the known type ids; every
/// other numeric type is a tolerance-style constraint (free-form numeric
/// parameter pairs).
pub fn extract(row: &ConstraintRow) -> Result<PhysicalConstraint, DomainError> {
    match row.phys_type {
        TYPE_ATTRIBUTE_REGEX => {
            let attribute = param(row, "ATTRIBUTE")
                .map(str::to_string)
                .or_else(|| {
                    row.relations
                        .iter()
                        .find_map(|r| r.attribute.clone())
                })
                .ok_or_else(|| mismatch(row, "missing ATTRIBUTE parameter and no attribute relation"))?;
            let pattern = param(row, "REGEX")
                .ok_or_else(|| mismatch(row, "missing REGEX parameter"))?;
            if pattern.trim().is_empty() {
                return Err(mismatch(row, "empty REGEX parameter"));
            }
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(mismatch(row, format!("invalid regular expression: {}", e)));
            }
            Ok(PhysicalConstraint::Regex {
                attribute: attribute.to_uppercase(),
                pattern: pattern.to_string(),
            })
        }
        TYPE_SPATIAL_MASK => {
            let mask_id: i64 = param(row, "MASK_ID")
                .ok_or_else(|| mismatch(row, "missing MASK_ID parameter"))?
                .trim()
                .parse()
                .map_err(|_| mismatch(row, "MASK_ID is not numeric"))?;
            let cardinality = param(row, "CARDINALITY")
                .ok_or_else(|| mismatch(row, "missing CARDINALITY parameter"))?;
            let mask_name = param(row, "MASK_NAME")
                .ok_or_else(|| mismatch(row, "missing MASK_NAME parameter"))?;
            let view_mask = param(row, "VIEW_MASK")
                .ok_or_else(|| mismatch(row, "missing VIEW_MASK parameter"))?;
            let expected = match param(row, "EXPECTED")
                .ok_or_else(|| mismatch(row, "missing EXPECTED parameter"))?
                .trim()
                .to_uppercase()
                .as_str()
            {
                "1" | "TRUE" | "VRAI" => true,
                "0" | "FALSE" | "FAUX" => false,
                other => {
                    return Err(mismatch(row, format!("EXPECTED is not boolean: '{}'", other)))
                }
            };
            Ok(PhysicalConstraint::SpatialMask {
                mask_id,
                cardinality: cardinality.to_string(),
                mask_name: mask_name.to_string(),
                view_mask: view_mask.to_string(),
                expected,
                features: row.relations.iter().map(|r| r.class.clone()).collect(),
            })
        }
        other => {
            // Proximity, filtering and the remaining numeric-parameter types
            // all share the (name, value) tolerance shape.
            if row.parameters.is_empty() {
                return Err(mismatch(row, "tolerance constraint without parameters"));
            }
            let mut parameters = Vec::with_capacity(row.parameters.len());
            for p in &row.parameters {
                let value: f64 = p.value.trim().parse().map_err(|_| {
                    mismatch(row, format!("parameter '{}' is not numeric: '{}'", p.name, p.value))
                })?;
                parameters.push((p.name.clone(), value));
            }
            let constraint_name = match other {
                TYPE_PROXIMITY => "PROXIMITY".to_string(),
                TYPE_FILTERING => "FILTERING".to_string(),
                id => format!("TYPE_{}", id),
            };
            Ok(PhysicalConstraint::Tolerance { constraint_name, parameters })
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn row(phys_type: i64, params: &[(&str, &str)]) -> ConstraintRow {
        ConstraintRow {
            id: 7,
            phys_type,
            relations: vec![ConstraintRelation {
                class: "NHN_HHYD_WATERBODY_2".into(),
                attribute: Some("WATER_DEFINITION".into()),
            }],
            parameters: params
                .iter()
                .map(|(n, v)| ConstraintParameter { name: n.to_string(), value: v.to_string() })
                .collect(),
        }
    }

    #[test]
    fn test_regex_extraction() {
        let r = row(TYPE_ATTRIBUTE_REGEX, &[("ATTRIBUTE", "zt_id"), ("REGEX", "^\\d+$")]);
        let c = extract(&r).expect("valid regex constraint");
        assert_eq!(
            c,
            PhysicalConstraint::Regex { attribute: "ZT_ID".into(), pattern: "^\\d+$".into() }
        );
    }

    #[test]
    fn test_regex_attribute_falls_back_to_relation() {
        let r = row(TYPE_ATTRIBUTE_REGEX, &[("REGEX", "^\\d+$")]);
        match extract(&r).expect("relation carries the attribute") {
            PhysicalConstraint::Regex { attribute, .. } => {
                assert_eq!(attribute, "WATER_DEFINITION");
            }
            other => panic!("expected regex, got {:?}", other),
        }
    }

    #[test]
    fn test_regex_missing_pattern_is_shape_mismatch() {
        let r = row(TYPE_ATTRIBUTE_REGEX, &[("ATTRIBUTE", "ZT_ID")]);
        let err = extract(&r).expect_err("missing REGEX must not coerce");
        assert!(err.to_string().contains("REGEX"));
    }

    #[test]
    fn test_regex_that_does_not_compile_is_shape_mismatch() {
        let r = row(TYPE_ATTRIBUTE_REGEX, &[("ATTRIBUTE", "ZT_ID"), ("REGEX", "[unclosed")]);
        let err = extract(&r).expect_err("broken pattern must not reach the registry");
        assert!(err.to_string().contains("invalid regular expression"));
    }

    #[test]
    fn test_spatial_mask_extraction() {
        let r = row(
            TYPE_SPATIAL_MASK,
            &[
                ("MASK_ID", "12"),
                ("CARDINALITY", "1..N"),
                ("MASK_NAME", "INSIDE"),
                ("VIEW_MASK", "V_MASK_12"),
                ("EXPECTED", "TRUE"),
            ],
        );
        match extract(&r).expect("valid spatial constraint") {
            PhysicalConstraint::SpatialMask { mask_id, expected, features, .. } => {
                assert_eq!(mask_id, 12);
                assert!(expected);
                assert_eq!(features, vec!["NHN_HHYD_WATERBODY_2".to_string()]);
            }
            other => panic!("expected spatial mask, got {:?}", other),
        }
    }

    #[test]
    fn test_spatial_mask_bad_boolean_is_shape_mismatch() {
        let r = row(
            TYPE_SPATIAL_MASK,
            &[
                ("MASK_ID", "12"),
                ("CARDINALITY", "1..N"),
                ("MASK_NAME", "INSIDE"),
                ("VIEW_MASK", "V_MASK_12"),
                ("EXPECTED", "PEUT-ETRE"),
            ],
        );
        assert!(extract(&r).is_err());
    }

    #[test]
    fn test_tolerance_extraction_for_known_and_unknown_types() {
        let r = row(TYPE_PROXIMITY, &[("DISTANCE", "2.5"), ("ANGLE", "15")]);
        match extract(&r).expect("valid tolerance constraint") {
            PhysicalConstraint::Tolerance { constraint_name, parameters } => {
                assert_eq!(constraint_name, "PROXIMITY");
                assert_eq!(parameters, vec![("DISTANCE".to_string(), 2.5), ("ANGLE".to_string(), 15.0)]);
            }
            other => panic!("expected tolerance, got {:?}", other),
        }

        let r = row(999, &[("SEUIL", "0.01")]);
        match extract(&r).expect("unknown numeric type is tolerance-shaped") {
            PhysicalConstraint::Tolerance { constraint_name, .. } => {
                assert_eq!(constraint_name, "TYPE_999");
            }
            other => panic!("expected tolerance, got {:?}", other),
        }
    }

    #[test]
    fn test_tolerance_non_numeric_parameter_is_shape_mismatch() {
        let r = row(TYPE_FILTERING, &[("SEUIL", "beaucoup")]);
        let err = extract(&r).expect_err("non-numeric tolerance must warn");
        assert!(err.to_string().contains("SEUIL"));
    }

    #[test]
    fn test_tolerance_without_parameters_is_shape_mismatch() {
        let r = row(TYPE_PROXIMITY, &[]);
        assert!(extract(&r).is_err());
    }
}
