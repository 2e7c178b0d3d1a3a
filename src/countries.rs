//! Country catalog offered during registration and profile editing.

use crate::model::Country;

/// `(code, name, flag, phone code)`
const CATALOG: &[(&str, &str, &str, &str)] = &[
    ("US", "United States", "🇺🇸", "+1"),
    ("CA", "Canada", "🇨🇦", "+1"),
    ("GB", "United Kingdom", "🇬🇧", "+44"),
    ("DE", "Germany", "🇩🇪", "+49"),
    ("FR", "France", "🇫🇷", "+33"),
    ("IT", "Italy", "🇮🇹", "+39"),
    ("ES", "Spain", "🇪🇸", "+34"),
    ("AU", "Australia", "🇦🇺", "+61"),
    ("JP", "Japan", "🇯🇵", "+81"),
    ("CN", "China", "🇨🇳", "+86"),
    ("IN", "India", "🇮🇳", "+91"),
    ("BR", "Brazil", "🇧🇷", "+55"),
    ("MX", "Mexico", "🇲🇽", "+52"),
    ("AR", "Argentina", "🇦🇷", "+54"),
    ("RU", "Russia", "🇷🇺", "+7"),
    ("ZA", "South Africa", "🇿🇦", "+27"),
    ("EG", "Egypt", "🇪🇬", "+20"),
    ("NG", "Nigeria", "🇳🇬", "+234"),
    ("KE", "Kenya", "🇰🇪", "+254"),
    ("GH", "Ghana", "🇬🇭", "+233"),
    ("MA", "Morocco", "🇲🇦", "+212"),
    ("TN", "Tunisia", "🇹🇳", "+216"),
    ("DZ", "Algeria", "🇩🇿", "+213"),
    ("LY", "Libya", "🇱🇾", "+218"),
    ("SD", "Sudan", "🇸🇩", "+249"),
];

fn to_country(&(code, name, flag, phone_code): &(&str, &str, &str, &str)) -> Country {
    Country {
        code: code.to_string(),
        name: name.to_string(),
        flag: flag.to_string(),
        phone_code: phone_code.to_string(),
    }
}

#[must_use]
pub fn countries() -> Vec<Country> {
    CATALOG.iter().map(to_country).collect()
}

/// Case-insensitive substring match on name or code. A blank query returns
/// the whole catalog.
#[must_use]
pub fn search_countries(query: &str) -> Vec<Country> {
    let needle = query.trim().to_lowercase();
    CATALOG
        .iter()
        .filter(|(code, name, _, _)| {
            name.to_lowercase().contains(&needle) || code.to_lowercase().contains(&needle)
        })
        .map(to_country)
        .collect()
}

#[must_use]
pub fn find_country(code: &str) -> Option<Country> {
    let code = code.trim();
    CATALOG
        .iter()
        .find(|(candidate, _, _, _)| candidate.eq_ignore_ascii_case(code))
        .map(to_country)
}
