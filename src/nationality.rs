use std::collections::HashMap;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub name: &'static str,
    pub code: &'static str,
}

/// Wikidata country item -> (display name, code). Home nations keep their
/// football codes (EN, SC, WA, NI) rather than GB.
const WIKIDATA_COUNTRIES: &[(&str, &str, &str)] = &[
    ("Q142", "France", "FR"),
    ("Q183", "Germany", "DE"),
    ("Q38", "Italy", "IT"),
    ("Q29", "Spain", "ES"),
    ("Q145", "United Kingdom", "GB"),
    ("Q21", "England", "EN"),
    ("Q22", "Scotland", "SC"),
    ("Q25", "Wales", "WA"),
    ("Q26", "Northern Ireland", "NI"),
    ("Q45", "Portugal", "PT"),
    ("Q55", "Netherlands", "NL"),
    ("Q31", "Belgium", "BE"),
    ("Q155", "Brazil", "BR"),
    ("Q414", "Argentina", "AR"),
    ("Q717", "Venezuela", "VE"),
    ("Q298", "Chile", "CL"),
    ("Q733", "Paraguay", "PY"),
    ("Q77", "Uruguay", "UY"),
    ("Q736", "Ecuador", "EC"),
    ("Q419", "Peru", "PE"),
    ("Q739", "Colombia", "CO"),
    ("Q96", "Mexico", "MX"),
    ("Q30", "United States", "US"),
    ("Q16", "Canada", "CA"),
    ("Q43", "Turkey", "TR"),
    ("Q159", "Russia", "RU"),
    ("Q212", "Ukraine", "UA"),
    ("Q36", "Poland", "PL"),
    ("Q34", "Sweden", "SE"),
    ("Q35", "Denmark", "DK"),
    ("Q20", "Norway", "NO"),
    ("Q33", "Finland", "FI"),
    ("Q39", "Switzerland", "CH"),
    ("Q40", "Austria", "AT"),
    ("Q41", "Greece", "GR"),
    ("Q224", "Croatia", "HR"),
    ("Q403", "Serbia", "RS"),
    ("Q225", "Bosnia and Herzegovina", "BA"),
    ("Q221", "North Macedonia", "MK"),
    ("Q229", "Cyprus", "CY"),
    ("Q222", "Albania", "AL"),
    ("Q1246", "Kosovo", "XK"),
    ("Q236", "Montenegro", "ME"),
    ("Q227", "Azerbaijan", "AZ"),
    ("Q399", "Armenia", "AM"),
    ("Q230", "Georgia", "GE"),
    ("Q37", "Lithuania", "LT"),
    ("Q211", "Latvia", "LV"),
    ("Q191", "Estonia", "EE"),
    ("Q184", "Belarus", "BY"),
    ("Q28", "Hungary", "HU"),
    ("Q218", "Romania", "RO"),
    ("Q219", "Bulgaria", "BG"),
    ("Q213", "Czech Republic", "CZ"),
    ("Q214", "Slovakia", "SK"),
    ("Q215", "Slovenia", "SI"),
    ("Q851", "Saudi Arabia", "SA"),
    ("Q878", "United Arab Emirates", "AE"),
    ("Q846", "Qatar", "QA"),
    ("Q817", "Kuwait", "KW"),
    ("Q148", "China", "CN"),
    ("Q17", "Japan", "JP"),
    ("Q884", "South Korea", "KR"),
    ("Q408", "Australia", "AU"),
    ("Q664", "New Zealand", "NZ"),
    ("Q79", "Egypt", "EG"),
    ("Q1028", "Morocco", "MA"),
    ("Q262", "Algeria", "DZ"),
    ("Q948", "Tunisia", "TN"),
    ("Q1029", "Senegal", "SN"),
    ("Q1008", "Ivory Coast", "CI"),
    ("Q1009", "Cameroon", "CM"),
    ("Q1030", "Nigeria", "NG"),
    ("Q1005", "Gambia", "GM"),
    ("Q1006", "Guinea", "GN"),
    ("Q1007", "Mali", "ML"),
    ("Q912", "Ghana", "GH"),
    ("Q258", "South Africa", "ZA"),
    ("Q954", "Zimbabwe", "ZW"),
    ("Q1033", "Niger", "NE"),
    ("Q929", "Central African Republic", "CF"),
    ("Q974", "DR Congo", "CD"),
    ("Q114", "Kenya", "KE"),
    ("Q115", "Ethiopia", "ET"),
    ("Q794", "Iran", "IR"),
    ("Q796", "Iraq", "IQ"),
    ("Q801", "Israel", "IL"),
    ("Q810", "Jordan", "JO"),
    ("Q805", "Yemen", "YE"),
    ("Q668", "India", "IN"),
    ("Q252", "Indonesia", "ID"),
    ("Q869", "Thailand", "TH"),
    ("Q833", "Malaysia", "MY"),
    ("Q928", "Philippines", "PH"),
    ("Q881", "Vietnam", "VN"),
    ("Q334", "Singapore", "SG"),
    ("Q574", "East Timor", "TL"),
    ("Q424", "Cambodia", "KH"),
    ("Q836", "Myanmar", "MM"),
    ("Q27", "Ireland", "IE"),
    ("Q189", "Iceland", "IS"),
    ("Q32", "Luxembourg", "LU"),
    ("Q233", "Malta", "MT"),
];

// Nationality names stored without a code. The codes are ISO 3166-1 here, so
// SC means Seychelles and flags come from regional indicators, not the
// football table.
const NATIONALITY_NAME_FIXES: &[(&str, &str)] = &[
    ("Kingdom of Denmark", "DK"),
    ("Kingdom of the Netherlands", "NL"),
    ("Lebanon", "LB"),
    ("Pakistan", "PK"),
    ("Senegal", "SN"),
    ("Seychelles", "SC"),
    ("Trinidad and Tobago", "TT"),
    ("Zambia", "ZM"),
    ("Antigua and Barbuda", "AG"),
    ("Costa Rica", "CR"),
    ("Ghana", "GH"),
    ("Honduras", "HN"),
    ("Jamaica", "JM"),
];

static BY_QID: Lazy<HashMap<&'static str, Country>> = Lazy::new(|| {
    WIKIDATA_COUNTRIES
        .iter()
        .map(|(qid, name, code)| {
            (
                *qid,
                Country {
                    name: *name,
                    code: *code,
                },
            )
        })
        .collect()
});

pub fn country_for_qid(qid: &str) -> Option<Country> {
    BY_QID.get(qid).copied()
}

pub fn code_for_nationality_name(name: &str) -> Option<&'static str> {
    NATIONALITY_NAME_FIXES
        .iter()
        .find(|(long_name, _)| *long_name == name)
        .map(|(_, code)| *code)
}
