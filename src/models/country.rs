//! Country catalog used as probe targets.

use serde::Serialize;

/// A country acting as a probe vantage point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code
    pub code: &'static str,

    /// Display name
    pub name: &'static str,

    /// Flag glyph
    pub flag: &'static str,

    /// Latitude, for map placement only
    pub lat: f64,

    /// Longitude, for map placement only
    pub lng: f64,
}

const fn country(
    code: &'static str,
    name: &'static str,
    flag: &'static str,
    lat: f64,
    lng: f64,
) -> Country {
    Country {
        code,
        name,
        flag,
        lat,
        lng,
    }
}

/// Every selectable country, in display order.
pub static CATALOG: [Country; 20] = [
    country("US", "United States", "🇺🇸", 37.0902, -95.7129),
    country("GB", "United Kingdom", "🇬🇧", 55.3781, -3.4360),
    country("DE", "Germany", "🇩🇪", 51.1657, 10.4515),
    country("FR", "France", "🇫🇷", 46.2276, 2.2137),
    country("JP", "Japan", "🇯🇵", 36.2048, 138.2529),
    country("CN", "China", "🇨🇳", 35.8617, 104.1954),
    country("IN", "India", "🇮🇳", 20.5937, 78.9629),
    country("BR", "Brazil", "🇧🇷", -14.2350, -51.9253),
    country("AU", "Australia", "🇦🇺", -25.2744, 133.7751),
    country("CA", "Canada", "🇨🇦", 56.1304, -106.3468),
    country("RU", "Russia", "🇷🇺", 61.5240, 105.3188),
    country("SG", "Singapore", "🇸🇬", 1.3521, 103.8198),
    country("AE", "UAE", "🇦🇪", 23.4241, 53.8478),
    country("ZA", "South Africa", "🇿🇦", -30.5595, 22.9375),
    country("MX", "Mexico", "🇲🇽", 23.6345, -102.5528),
    country("ES", "Spain", "🇪🇸", 40.4637, -3.7492),
    country("IT", "Italy", "🇮🇹", 41.8719, 12.5674),
    country("KR", "South Korea", "🇰🇷", 35.9078, 127.7669),
    country("NL", "Netherlands", "🇳🇱", 52.1326, 5.2913),
    country("SE", "Sweden", "🇸🇪", 60.1282, 18.6435),
];

impl Country {
    /// Look up a catalog entry by code (case-insensitive).
    pub fn find(code: &str) -> Option<&'static Country> {
        let code = code.trim();
        CATALOG.iter().find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// All catalog entries.
    pub fn all() -> &'static [Country] {
        &CATALOG
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_codes_unique() {
        let codes: HashSet<_> = CATALOG.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), CATALOG.len());
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(Country::find("ru").map(|c| c.name), Some("Russia"));
        assert_eq!(Country::find(" US ").map(|c| c.code), Some("US"));
        assert!(Country::find("XX").is_none());
    }

    #[test]
    fn test_coordinates_in_range() {
        for c in Country::all() {
            assert!((-90.0..=90.0).contains(&c.lat), "{}", c.code);
            assert!((-180.0..=180.0).contains(&c.lng), "{}", c.code);
        }
    }
}
