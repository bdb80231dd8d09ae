use indexmap::IndexMap;
use once_cell::sync::Lazy;

pub const WHITE_FLAG: &str = "\u{1F3F3}\u{FE0F}";

// Football splits the United Kingdom into its home nations. These codes are
// not ISO 3166-1, so their glyphs cannot be derived from regional indicators.
const ENGLAND_FLAG: &str =
    "\u{1F3F4}\u{E0067}\u{E0062}\u{E0065}\u{E006E}\u{E0067}\u{E007F}";
const SCOTLAND_FLAG: &str =
    "\u{1F3F4}\u{E0067}\u{E0062}\u{E0073}\u{E0063}\u{E0074}\u{E007F}";
const WALES_FLAG: &str = "\u{1F3F4}\u{E0067}\u{E0062}\u{E0077}\u{E006C}\u{E0073}\u{E007F}";
const UNITED_KINGDOM_FLAG: &str = "\u{1F1EC}\u{1F1E7}";

const HOME_NATION_FLAGS: &[(&str, &str)] = &[
    ("EN", ENGLAND_FLAG),
    ("SC", SCOTLAND_FLAG),
    ("WA", WALES_FLAG),
    ("NI", UNITED_KINGDOM_FLAG),
];

const ISO_CODES: &[&str] = &[
    "AD", "AE", "AF", "AL", "AM", "AO", "AR", "AT", "AU", "AZ", "BA", "BB",
    "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BN", "BO", "BR", "BS", "BT",
    "BW", "BY", "BZ", "CA", "CD", "CF", "CG", "CH", "CI", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ",
    "EC", "EE", "EG", "ER", "ES", "ET", "FI", "FJ", "FM", "FR", "GA", "GB",
    "GD", "GE", "GF", "GH", "GI", "GM", "GN", "GQ", "GR", "GT", "GU", "GW",
    "GY", "HK", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IN", "IQ", "IR",
    "IS", "IT", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP",
    "KR", "KW", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU",
    "LV", "LY", "MA", "MC", "MD", "ME", "MG", "MH", "MK", "ML", "MM", "MN",
    "MR", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NE", "NG", "NL",
    "NO", "NP", "NR", "NZ", "OM", "PA", "PE", "PG", "PH", "PK", "PL", "PS",
    "PT", "PW", "PY", "QA", "RO", "RS", "RU", "RW", "SA", "SB", "SD", "SE",
    "SG", "SI", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV", "SY",
    "SZ", "TD", "TG", "TH", "TJ", "TL", "TM", "TN", "TO", "TR", "TT", "TV",
    "TW", "TZ", "UA", "UG", "US", "UY", "UZ", "VA", "VC", "VE", "VN", "VU",
    "WS", "XK", "YE", "ZA", "ZM", "ZW",
];

static BUILTIN: Lazy<FlagTable> = Lazy::new(|| {
    let mut table = FlagTable::default();
    for code in ISO_CODES {
        if let Some(glyph) = regional_indicator_flag(code) {
            table.insert(*code, glyph);
        }
    }
    // Home nations win over the ISO meaning of the same letters (SC, NI).
    for (code, glyph) in HOME_NATION_FLAGS {
        table.insert(*code, *glyph);
    }
    table
});

/// Country code to display glyph. Purely cosmetic: a missing entry renders
/// as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagTable {
    glyphs: IndexMap<String, String>,
}

impl FlagTable {
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn builtin_ref() -> &'static FlagTable {
        &BUILTIN
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for (code, glyph) in pairs {
            table.insert(code, glyph);
        }
        table
    }

    pub fn insert(&mut self, code: impl Into<String>, glyph: impl Into<String>) {
        self.glyphs.insert(code.into(), glyph.into());
    }

    pub fn flag(&self, code: &str) -> Option<&str> {
        self.glyphs.get(code).map(String::as_str)
    }

    pub fn flag_or_empty(&self, code: &str) -> &str {
        self.flag(code).unwrap_or("")
    }

    pub fn flag_or_white(&self, code: &str) -> &str {
        self.flag(code).unwrap_or(WHITE_FLAG)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.glyphs.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Two regional indicator symbols for an ISO alpha-2 code, e.g. "ES" -> 🇪🇸.
pub fn regional_indicator_flag(code: &str) -> Option<String> {
    let bytes = code.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_alphabetic) {
        return None;
    }
    bytes
        .iter()
        .map(|b| char::from_u32(0x1F1E6 + u32::from(b.to_ascii_uppercase() - b'A')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_indicator_flag_works() {
        assert_eq!(regional_indicator_flag("ES").as_deref(), Some("🇪🇸"));
        assert_eq!(regional_indicator_flag("br").as_deref(), Some("🇧🇷"));
        assert_eq!(regional_indicator_flag("E"), None);
        assert_eq!(regional_indicator_flag("E1"), None);
        assert_eq!(regional_indicator_flag("ESP"), None);
    }

    #[test]
    fn home_nations_override_iso_letters() {
        let flags = FlagTable::builtin();
        assert_eq!(flags.flag("SC"), Some(SCOTLAND_FLAG));
        assert_eq!(flags.flag("NI"), Some(UNITED_KINGDOM_FLAG));
        assert_eq!(flags.flag("EN"), Some(ENGLAND_FLAG));
        assert_eq!(flags.flag("WA"), Some(WALES_FLAG));
    }

    #[test]
    fn missing_code_fallbacks() {
        let flags = FlagTable::from_pairs([("ES", "🇪🇸")]);
        assert_eq!(flags.flag_or_empty("QQ"), "");
        assert_eq!(flags.flag_or_white("QQ"), WHITE_FLAG);
        assert_eq!(flags.flag_or_white("ES"), "🇪🇸");
    }
}
