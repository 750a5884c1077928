// gabarit-core/src/domain/rules/classifier.rs

// Ordered waterfall of name-based predicates: the first entry whose predicate
// holds produces the rule. The table is data, not a cascade of if/elif, so
// every entry is testable on its own and the ordering is explicit.

use crate::domain::catalog::DataType;
use crate::domain::rules::patterns;
use crate::domain::rules::rule::{RuleCheck, RuleKind};

/// Everything the classifier is allowed to look at. Same inputs always yield
/// the same rule kind.
#[derive(Debug, Clone, Copy)]
pub struct AttributeFacts<'a> {
    pub name: &'a str,
    pub data_type: DataType,
    /// Regex extracted from the catalog constraint graph, when one is
    /// attached to this attribute.
    pub catalog_regex: Option<&'a str>,
}

/// Outcome of a classification. `validated` is false only for the fallback:
/// the attribute still gets a not-null probe but is reported for triage.
#[derive(Debug, Clone)]
pub struct Classification {
    pub kind: RuleKind,
    pub check: RuleCheck,
    pub validated: bool,
}

struct RuleEntry {
    kind: RuleKind,
    applies: fn(&AttributeFacts) -> bool,
    build: fn(&AttributeFacts) -> RuleCheck,
}

const DATE_ATTRIBUTES: &[&str] = &["VALIDITY_DATE", "CREATION_DATE", "REVISION_DATE", "IDDATE"];

// First match wins. Order is part of the contract: e.g. ZT_ID and MD_ID must
// be caught before the generic `_ID` entry, and the exact DATASET_NAME match
// before the broader SNRC membership.
const RULE_TABLE: &[RuleEntry] = &[
    RuleEntry {
        kind: RuleKind::CatalogRegex,
        applies: |f| f.catalog_regex.is_some(),
        build: |f| RuleCheck::Regex(f.catalog_regex.unwrap_or_default().to_string()),
    },
    RuleEntry {
        kind: RuleKind::Accuracy,
        applies: |f| f.name == "PLANIMETRIC_ACCURACY" || f.name == "ALTIMETRIC_ACCURACY",
        build: |_| RuleCheck::Range { min: 1.0, max: 100.0, sentinel: Some(-1.0) },
    },
    RuleEntry {
        kind: RuleKind::PartialDate,
        applies: |f| DATE_ATTRIBUTES.contains(&f.name),
        build: |_| RuleCheck::Regex(patterns::PARTIAL_DATE.to_string()),
    },
    RuleEntry {
        kind: RuleKind::Latitude,
        applies: |f| f.name.contains("LAT_"),
        build: |_| RuleCheck::Regex(patterns::LATITUDE_QUARTER.to_string()),
    },
    RuleEntry {
        kind: RuleKind::Longitude,
        applies: |f| f.name.contains("LON_"),
        build: |_| RuleCheck::Regex(patterns::LONGITUDE_QUARTER.to_string()),
    },
    RuleEntry {
        kind: RuleKind::CentralMeridian,
        applies: |f| f.name == "MERIDIEN_CENTRAL",
        build: |_| RuleCheck::Regex(patterns::CENTRAL_MERIDIAN.to_string()),
    },
    RuleEntry {
        kind: RuleKind::TileIdentifier,
        applies: |f| f.name == "DATASET_NAME",
        build: |_| RuleCheck::Regex(patterns::TILE_IDENTIFIER.to_string()),
    },
    RuleEntry {
        kind: RuleKind::TileMembership,
        applies: |f| f.name.contains("SNRC"),
        build: |_| RuleCheck::TableMembership {
            table: patterns::TILE_TABLE.to_string(),
            column: patterns::TILE_COLUMN.to_string(),
        },
    },
    RuleEntry {
        kind: RuleKind::WorkZone,
        applies: |f| f.name == "ZT_ID",
        build: |_| RuleCheck::Regex(patterns::WORK_ZONE.to_string()),
    },
    RuleEntry {
        kind: RuleKind::Uuid,
        applies: |f| f.name == "MD_ID",
        build: |_| RuleCheck::Regex(patterns::UUID_DASHED.to_string()),
    },
    RuleEntry {
        kind: RuleKind::HexIdentifier,
        applies: |f| {
            (f.name.contains("_ID") && f.data_type == DataType::Character)
                || f.name.contains("RIVID")
                || f.name.contains("LAKEID")
                || f.name == "NID"
        },
        build: |_| RuleCheck::Regex(patterns::HEX_IDENTIFIER.to_string()),
    },
    RuleEntry {
        kind: RuleKind::AgencyCode,
        applies: |f| f.name == "ID_CANAC",
        build: |_| RuleCheck::Regex(patterns::AGENCY_CODE.to_string()),
    },
    RuleEntry {
        kind: RuleKind::LocalIdentifier,
        applies: |f| f.name.contains("ID_LOCAL"),
        build: |_| RuleCheck::PatternMembership {
            pattern: patterns::LOCAL_IDENTIFIER.to_string(),
            table: patterns::LOCAL_ID_TABLE.to_string(),
            column: patterns::LOCAL_ID_COLUMN.to_string(),
        },
    },
    RuleEntry {
        kind: RuleKind::NamePresence,
        applies: |f| f.name == "GEONAMEDB",
        build: |_| RuleCheck::CrossFieldPresence(vec!["NAMEID_1".into(), "NAMEID_2".into()]),
    },
    RuleEntry {
        kind: RuleKind::LegalNameSource,
        applies: |f| f.name.contains("GEONAMEDB_LEGAL"),
        build: |_| RuleCheck::ValueMembership(
            patterns::LEGAL_NAME_SOURCES.iter().map(|s| s.to_string()).collect(),
        ),
    },
    RuleEntry {
        kind: RuleKind::NameReference,
        applies: |f| f.name.contains("NAMEID"),
        build: |_| RuleCheck::TableMembership {
            table: patterns::NAMES_TABLE.to_string(),
            column: patterns::NAMES_COLUMN.to_string(),
        },
    },
];

/// Walks the table; the fallback never raises, it yields a not-null probe
/// flagged as unvalidated so the gap shows up in the run report.
pub fn classify(facts: &AttributeFacts) -> Classification {
    for entry in RULE_TABLE {
        if (entry.applies)(facts) {
            return Classification {
                kind: entry.kind,
                check: (entry.build)(facts),
                validated: true,
            };
        }
    }
    Classification {
        kind: RuleKind::NotNull,
        check: RuleCheck::NotNull,
        validated: false,
    }
}

/// Human description + remediation message for a classified attribute.
pub fn describe(kind: RuleKind, attribute: &str) -> (String, String) {
    let (what, fix): (String, String) = match kind {
        RuleKind::CatalogRegex => (
            format!("{} must match the expression declared in the catalog", attribute),
            format!("Correct {} to match the catalog expression", attribute),
        ),
        RuleKind::Accuracy => (
            format!("{} must be -1 (unknown) or between 1 and 100 metres", attribute),
            format!("Set {} to -1 or a value in 1..100", attribute),
        ),
        RuleKind::PartialDate => (
            format!("{} must be a partial date YYYY[MM[DD]], 1940-2019", attribute),
            format!("Correct {}: expected YYYY[MM[DD]]", attribute),
        ),
        RuleKind::Latitude => (
            format!("{} must be a packed latitude, 40-89 degrees, quarter fraction", attribute),
            format!("Correct {}: expected DDFF with FF in (00,25,50,75)", attribute),
        ),
        RuleKind::Longitude => (
            format!("{} must be a packed west longitude, 40-149 degrees, quarter fraction", attribute),
            format!("Correct {}: expected -DDDFF with FF in (00,25,50,75)", attribute),
        ),
        RuleKind::CentralMeridian => (
            format!("{} must be an odd west meridian between -41 and -149", attribute),
            format!("Correct {}: expected an odd negative degree value", attribute),
        ),
        RuleKind::TileIdentifier => (
            format!("{} must be a national grid tile identifier", attribute),
            format!("Correct {}: expected NNNL SS tile format", attribute),
        ),
        RuleKind::TileMembership => (
            format!("{} must be a registered grid tile", attribute),
            format!("Correct {}: tile not present in {}", attribute, patterns::TILE_TABLE),
        ),
        RuleKind::WorkZone => (
            format!("{} must be a work-zone identifier (tile + sequence)", attribute),
            format!("Correct {}: expected <tile>_<sequence>", attribute),
        ),
        RuleKind::Uuid => (
            format!("{} must be a 36-character dashed UUID", attribute),
            format!("Correct {}: expected a dashed UUID", attribute),
        ),
        RuleKind::HexIdentifier => (
            format!("{} must be a 32-hex-character identifier", attribute),
            format!("Correct {}: expected 32 hexadecimal characters", attribute),
        ),
        RuleKind::AgencyCode => (
            format!("{} must be a 4-character agency code", attribute),
            format!("Correct {}: expected 4 characters", attribute),
        ),
        RuleKind::LocalIdentifier => (
            format!("{} must be a registered 3-8 digit local identifier", attribute),
            format!("Correct {}: unknown local identifier", attribute),
        ),
        RuleKind::NamePresence => (
            format!("When {} is set, NAMEID_1 or NAMEID_2 must be present", attribute),
            "Provide NAMEID_1 or NAMEID_2".to_string(),
        ),
        RuleKind::LegalNameSource => (
            format!("{} must be one of the accepted name provenances", attribute),
            format!("Correct {}: expected one of {:?}", attribute, patterns::LEGAL_NAME_SOURCES),
        ),
        RuleKind::NameReference => (
            format!("{} must reference a registered toponym", attribute),
            format!("Correct {}: identifier not present in {}", attribute, patterns::NAMES_TABLE),
        ),
        RuleKind::NotNull => (
            format!("{} has no structural validation; null check only", attribute),
            format!("Populate {}", attribute),
        ),
    };
    (what, fix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(name: &str) -> AttributeFacts<'_> {
        AttributeFacts { name, data_type: DataType::Character, catalog_regex: None }
    }

    #[test]
    fn test_catalog_regex_wins_over_everything() {
        let f = AttributeFacts {
            name: "CREATION_DATE",
            data_type: DataType::Character,
            catalog_regex: Some("^[0-9]+$"),
        };
        let c = classify(&f);
        assert_eq!(c.kind, RuleKind::CatalogRegex);
        assert_eq!(c.check, RuleCheck::Regex("^[0-9]+$".into()));
    }

    #[test]
    fn test_creation_date_gets_partial_date_regex() {
        let c = classify(&facts("CREATION_DATE"));
        assert_eq!(c.kind, RuleKind::PartialDate);
        assert_eq!(
            c.check,
            RuleCheck::Regex(r"^(19[4-9]\d|20[0-1]\d)(0[1-9]|1[0-2])?([0-2]\d|3[0-1])?$".into())
        );
    }

    #[test]
    fn test_accuracy_range() {
        let c = classify(&facts("ALTIMETRIC_ACCURACY"));
        assert_eq!(c.kind, RuleKind::Accuracy);
        assert_eq!(c.check, RuleCheck::Range { min: 1.0, max: 100.0, sentinel: Some(-1.0) });
    }

    #[test]
    fn test_latitude_needs_verbatim_substring() {
        // LATITUDE_X does not contain "LAT_": it must NOT hit the latitude
        // entry, and with no other match it falls through to the fallback.
        let c = classify(&facts("LATITUDE_X"));
        assert_eq!(c.kind, RuleKind::NotNull);
        assert!(!c.validated);

        let c = classify(&facts("LAT_DEG"));
        assert_eq!(c.kind, RuleKind::Latitude);
    }

    #[test]
    fn test_dataset_name_before_snrc_membership() {
        assert_eq!(classify(&facts("DATASET_NAME")).kind, RuleKind::TileIdentifier);
        assert_eq!(classify(&facts("SNRC_INDEX")).kind, RuleKind::TileMembership);
    }

    #[test]
    fn test_specific_ids_before_generic_hex() {
        assert_eq!(classify(&facts("ZT_ID")).kind, RuleKind::WorkZone);
        assert_eq!(classify(&facts("MD_ID")).kind, RuleKind::Uuid);
        assert_eq!(classify(&facts("NID")).kind, RuleKind::HexIdentifier);
        assert_eq!(classify(&facts("RIVID")).kind, RuleKind::HexIdentifier);
        assert_eq!(classify(&facts("SEGMENT_ID")).kind, RuleKind::HexIdentifier);
    }

    #[test]
    fn test_generic_id_requires_character_type() {
        let f = AttributeFacts {
            name: "SEGMENT_ID",
            data_type: DataType::Integer,
            catalog_regex: None,
        };
        // Integer _ID attributes are not hex identifiers.
        assert_eq!(classify(&f).kind, RuleKind::NotNull);
    }

    #[test]
    fn test_agency_and_local_ids() {
        assert_eq!(classify(&facts("ID_CANAC")).kind, RuleKind::AgencyCode);
        assert_eq!(classify(&facts("ID_LOCAL_1")).kind, RuleKind::LocalIdentifier);
    }

    #[test]
    fn test_name_rules_ordering() {
        assert_eq!(classify(&facts("GEONAMEDB")).kind, RuleKind::NamePresence);
        assert_eq!(classify(&facts("GEONAMEDB_LEGAL")).kind, RuleKind::LegalNameSource);
        assert_eq!(classify(&facts("NAMEID_1")).kind, RuleKind::NameReference);
        assert_eq!(classify(&facts("NAMEID")).kind, RuleKind::NameReference);
    }

    #[test]
    fn test_classifier_is_deterministic() {
        let f = facts("REVISION_DATE");
        let a = classify(&f);
        let b = classify(&f);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.check, b.check);
    }

    #[test]
    fn test_fallback_is_data_not_error() {
        let c = classify(&facts("SHORELINE_WATER_LEVEL"));
        assert_eq!(c.kind, RuleKind::NotNull);
        assert_eq!(c.check, RuleCheck::NotNull);
        assert!(!c.validated);
    }
}
