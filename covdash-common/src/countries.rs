//! EU member states queried from the statistics API, with Dutch display names

/// ISO 3166-1 alpha-3 codes paired with the display name used in the dashboard
pub const EU_COUNTRIES: &[(&str, &str)] = &[
    ("BEL", "België"),
    ("DNK", "Denemarken"),
    ("BGR", "Bulgarije"),
    ("CYP", "Cyprus"),
    ("DEU", "Duitsland"),
    ("EST", "Estland"),
    ("FIN", "Finland"),
    ("FRA", "Frankrijk"),
    ("GRC", "Griekenland"),
    ("HUN", "Hongarije"),
    ("IRL", "Ierland"),
    ("ITA", "Italië"),
    ("HRV", "Kroatië"),
    ("LVA", "Letland"),
    ("LTU", "Litouwen"),
    ("LUX", "Luxemburg"),
    ("MLT", "Malta"),
    ("NLD", "Nederland"),
    ("AUT", "Oostenrijk"),
    ("POL", "Polen"),
    ("PRT", "Portugal"),
    ("ROU", "Roemenië"),
    ("SVN", "Slovenië"),
    ("SVK", "Slovakije"),
    ("ESP", "Spanje"),
    ("CZE", "Tsjechië"),
    ("SWE", "Zweden"),
];

/// All EU codes, in query order
pub fn eu_codes() -> Vec<String> {
    EU_COUNTRIES.iter().map(|(code, _)| code.to_string()).collect()
}

/// Display name for an ISO code, falling back to the code itself
pub fn display_name(iso: &str) -> String {
    EU_COUNTRIES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(iso))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| iso.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_known() {
        assert_eq!(display_name("NLD"), "Nederland");
        assert_eq!(display_name("fra"), "Frankrijk");
    }

    #[test]
    fn test_display_name_unknown_falls_back() {
        assert_eq!(display_name("USA"), "USA");
    }

    #[test]
    fn test_eu_codes_count() {
        assert_eq!(eu_codes().len(), 27);
    }
}
