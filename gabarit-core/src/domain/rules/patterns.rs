// gabarit-core/src/domain/rules/patterns.rs

// Structural validation patterns for attributes without a catalog-enforced
// coded domain. One constant per pattern so each is testable on its own and
// the classifier table stays readable.

/// Partial date YYYY[MM[DD]], years bounded 1940-2019.
pub const PARTIAL_DATE: &str =
    r"^(19[4-9]\d|20[0-1]\d)(0[1-9]|1[0-2])?([0-2]\d|3[0-1])?$";

/// Latitude in packed degrees + quarter-degree fraction, 40 to 89 north.
pub const LATITUDE_QUARTER: &str = r"^([4-8]\d)(00|25|50|75)$";

/// Longitude in packed negative degrees + quarter-degree fraction, 40 to 149 west.
pub const LONGITUDE_QUARTER: &str = r"^-([4-9]\d|1[0-4]\d)(00|25|50|75)$";

/// Central meridian: odd degree value west, -41 to -149.
pub const CENTRAL_MERIDIAN: &str = r"^-([4-9]|1[0-4])[13579]$";

/// National grid tile identifier (3-digit block, row letter, 2-digit sheet).
pub const TILE_IDENTIFIER: &str = r"^\d{3}[A-P](0[1-9]|1[0-6])$";

/// Work-zone identifier: tile identifier plus a numeric sequence.
pub const WORK_ZONE: &str = r"^\d{3}[A-P](0[1-9]|1[0-6])_\d{1,4}$";

/// UUID with dashes, 36 characters.
pub const UUID_DASHED: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

/// 32-hex-character identifier (dashless UUID).
pub const HEX_IDENTIFIER: &str = r"^[0-9a-fA-F]{32}$";

/// 4-character agency code.
pub const AGENCY_CODE: &str = r"^[A-Z0-9]{4}$";

/// Local numeric identifier, 3 to 8 digits.
pub const LOCAL_IDENTIFIER: &str = r"^\d{3,8}$";

// --- Reference lookups used by membership rules ---

/// Registry of valid grid tiles.
pub const TILE_TABLE: &str = "REGISTRE_SNRC";
pub const TILE_COLUMN: &str = "SNRC";

/// Registry of official toponym identifiers.
pub const NAMES_TABLE: &str = "REGISTRE_TOPONYMES";
pub const NAMES_COLUMN: &str = "NAMEID";

/// Registry of provider-scoped local identifiers.
pub const LOCAL_ID_TABLE: &str = "REGISTRE_ID_LOCAL";
pub const LOCAL_ID_COLUMN: &str = "ID_LOCAL";

/// Accepted provenance values for the legal-name flag.
pub const LEGAL_NAME_SOURCES: &[&str] = &["BDG", "CGNDB", "AUCUN"];

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn re(pattern: &str) -> Regex {
        #[allow(clippy::unwrap_used)]
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_all_patterns_compile() {
        for p in [
            PARTIAL_DATE,
            LATITUDE_QUARTER,
            LONGITUDE_QUARTER,
            CENTRAL_MERIDIAN,
            TILE_IDENTIFIER,
            WORK_ZONE,
            UUID_DASHED,
            HEX_IDENTIFIER,
            AGENCY_CODE,
            LOCAL_IDENTIFIER,
        ] {
            assert!(Regex::new(p).is_ok(), "pattern should compile: {}", p);
        }
    }

    #[test]
    fn test_partial_date_shapes() {
        let d = re(PARTIAL_DATE);
        assert!(d.is_match("1998"));
        assert!(d.is_match("199805"));
        assert!(d.is_match("19980531"));
        assert!(d.is_match("2019"));
        assert!(!d.is_match("1939"), "below the 1940 floor");
        assert!(!d.is_match("2020"), "above the 2019 ceiling");
        assert!(!d.is_match("199813"), "month 13");
        assert!(!d.is_match("19980532"), "day 32");
    }

    #[test]
    fn test_latitude_quarter_degrees() {
        let lat = re(LATITUDE_QUARTER);
        assert!(lat.is_match("4500"));
        assert!(lat.is_match("8975"));
        assert!(!lat.is_match("3900"), "below 40 degrees");
        assert!(!lat.is_match("4510"), "not a quarter fraction");
    }

    #[test]
    fn test_longitude_quarter_degrees() {
        let lon = re(LONGITUDE_QUARTER);
        assert!(lon.is_match("-7225"));
        assert!(lon.is_match("-14950"));
        assert!(!lon.is_match("7225"), "must be west (negative)");
        assert!(!lon.is_match("-15000"), "beyond 149 degrees");
    }

    #[test]
    fn test_central_meridian_is_odd() {
        let m = re(CENTRAL_MERIDIAN);
        assert!(m.is_match("-69"));
        assert!(m.is_match("-141"));
        assert!(!m.is_match("-70"), "even meridian");
        assert!(!m.is_match("-39"), "out of range");
    }

    #[test]
    fn test_tile_and_work_zone() {
        assert!(re(TILE_IDENTIFIER).is_match("021M07"));
        assert!(!re(TILE_IDENTIFIER).is_match("021Q07"), "row letter beyond P");
        assert!(!re(TILE_IDENTIFIER).is_match("021M17"), "sheet beyond 16");
        assert!(re(WORK_ZONE).is_match("021M07_4"));
        assert!(!re(WORK_ZONE).is_match("021M07"), "missing sequence");
    }

    #[test]
    fn test_identifier_patterns() {
        assert!(re(UUID_DASHED).is_match("6ba7b810-9dad-11d1-80b4-00c04fd430c8"));
        assert!(!re(UUID_DASHED).is_match("6ba7b8109dad11d180b400c04fd430c8"));
        assert!(re(HEX_IDENTIFIER).is_match("6ba7b8109dad11d180b400c04fd430c8"));
        assert!(re(AGENCY_CODE).is_match("CYUL"));
        assert!(!re(AGENCY_CODE).is_match("CYU"));
        assert!(re(LOCAL_IDENTIFIER).is_match("123"));
        assert!(re(LOCAL_IDENTIFIER).is_match("12345678"));
        assert!(!re(LOCAL_IDENTIFIER).is_match("12"));
        assert!(!re(LOCAL_IDENTIFIER).is_match("123456789"));
    }
}
