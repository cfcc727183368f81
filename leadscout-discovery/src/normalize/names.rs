//! Person-name cleaning and validation.
//!
//! False negatives (a real person dropped) are acceptable here; false
//! positives (a business name treated as a person) are not, so every check
//! errs towards rejection.

use std::ops::RangeInclusive;

/// Honorifics dropped from the front of a name.
const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "mx", "dr", "prof", "professor", "sir", "dame", "lord", "lady",
    "rev", "revd",
];

/// Post-nominals and generational suffixes dropped anywhere in a name.
const PERSONAL_SUFFIXES: &[&str] = &[
    "jr", "jnr", "sr", "snr", "ii", "iii", "phd", "mba", "bsc", "msc", "obe", "mbe", "cbe", "aca",
    "fca", "acca", "ceng", "frcs",
];

/// Legal-entity suffixes. Stripped, but each one counts as a collision.
const BUSINESS_SUFFIXES: &[&str] = &[
    "ltd", "limited", "plc", "llp", "llc", "inc", "incorporated", "corp", "co", "&",
];

/// Tokens that never appear in a person's name.
const BUSINESS_TERMS: &[&str] = &[
    "services", "service", "solutions", "plumbing", "heating", "gas", "electrical", "electrics",
    "building", "builders", "construction", "contractors", "roofing", "cleaning", "landscaping",
    "gardening", "decorating", "joinery", "glazing", "windows", "doors", "kitchens", "bathrooms",
    "flooring", "carpets", "removals", "maintenance", "repairs", "installations", "engineering",
    "group", "company", "holdings", "enterprises", "trading", "associates", "partners",
    "consulting", "consultants", "management", "properties", "systems", "technologies", "uk",
    "international", "global", "agency", "studio", "studios", "centre", "shop", "store", "team",
    "staff", "office", "admin", "info", "sales", "support", "enquiries", "reception", "customer",
    "accounts", "contact", "about", "home", "welcome", "privacy", "policy", "terms", "cookies",
    "owner", "director", "manager", "founder", "the", "and", "of", "for", "our", "your", "us",
];

/// Allowed character length of one name word.
const WORD_LEN: RangeInclusive<usize> = 2..=15;

/// Separators after which a scraped name usually continues with a title.
const TRAILING_SEPARATORS: &[&str] = &[" - ", " – ", " | ", ",", "(", " / "];

/// Common UK first names used as a positive confidence signal.
const KNOWN_FIRST_NAMES: &[&str] = &[
    "adam", "alan", "alex", "alexander", "alice", "alison", "amanda", "amy", "andrew", "andy",
    "angela", "anna", "anne", "anthony", "barry", "ben", "benjamin", "beth", "bill", "bob",
    "brian", "carl", "caroline", "catherine", "charles", "charlie", "charlotte", "chloe", "chris",
    "christine", "christopher", "claire", "colin", "craig", "dan", "daniel", "darren", "dave",
    "david", "dean", "deborah", "dennis", "derek", "diane", "dominic", "donna", "ed", "edward",
    "eleanor", "elizabeth", "ella", "emily", "emma", "frank", "fred", "gary", "gavin", "george",
    "gemma", "geoff", "gillian", "graham", "hannah", "harry", "heather", "helen", "ian", "jack",
    "jacob", "james", "jamie", "jane", "janet", "jason", "jeff", "jennifer", "jessica", "jim",
    "jo", "joanne", "joe", "john", "jon", "jonathan", "joseph", "josh", "julie", "karen", "kate",
    "katie", "keith", "kevin", "kim", "laura", "lee", "leo", "linda", "lisa", "liam", "louise",
    "lucy", "luke", "margaret", "mark", "martin", "mary", "matt", "matthew", "michael",
    "michelle", "mike", "natalie", "neil", "nick", "nicola", "nicholas", "nigel", "oliver",
    "paul", "pete", "peter", "phil", "philip", "rachel", "rebecca", "richard", "rob", "robert",
    "ross", "ryan", "sam", "samuel", "sarah", "scott", "sean", "sharon", "simon", "sophie",
    "stephen", "steve", "steven", "stuart", "sue", "susan", "terry", "thomas", "tim", "tom",
    "tony", "tracy", "vicky", "victoria", "wayne", "william", "zoe",
];

/// Trades and the surname a one-word trader is conventionally known by.
const TRADE_SURNAMES: &[(&str, &str)] = &[
    ("plumb", "Plumber"),
    ("electric", "Electrician"),
    ("roof", "Roofer"),
    ("build", "Builder"),
    ("carpent", "Carpenter"),
    ("joiner", "Joiner"),
    ("plaster", "Plasterer"),
    ("paint", "Painter"),
    ("decorat", "Decorator"),
    ("garden", "Gardener"),
    ("landscap", "Landscaper"),
    ("clean", "Cleaner"),
    ("lock", "Locksmith"),
    ("glaz", "Glazier"),
    ("til", "Tiler"),
    ("heat", "Heating"),
];

/// A raw name after honorifics and suffixes are stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedName {
    /// Remaining words, properly capitalised.
    pub words: Vec<String>,
    /// Business suffixes that had to be stripped.
    pub collisions: usize,
    /// At least one word arrived all-lower or all-upper case.
    pub recased: bool,
}

/// Strip honorifics, post-nominals and business suffixes from a raw name.
///
/// Text after a title separator (`" - "`, `"|"`, `","`, `"("`) is dropped.
/// Words that arrive in all-lower or all-upper case are re-capitalised.
pub fn clean_name(raw: &str) -> CleanedName {
    let head = TRAILING_SEPARATORS
        .iter()
        .filter_map(|sep| raw.find(sep))
        .min()
        .map_or(raw, |idx| &raw[..idx]);

    let mut words = Vec::new();
    let mut collisions = 0;
    let mut recased = false;

    for token in head.split_whitespace() {
        let bare = token.trim_matches(|c: char| c == '.' || c == ',' || c == ';' || c == ':');
        if bare.is_empty() {
            continue;
        }
        let lower = bare.to_lowercase();
        if words.is_empty() && HONORIFICS.contains(&lower.as_str()) {
            continue;
        }
        if PERSONAL_SUFFIXES.contains(&lower.as_str()) {
            continue;
        }
        if BUSINESS_SUFFIXES.contains(&lower.as_str()) {
            collisions += 1;
            continue;
        }
        let is_upper = bare.chars().all(|c| !c.is_alphabetic() || c.is_uppercase());
        let is_lower = bare.chars().all(|c| !c.is_alphabetic() || c.is_lowercase());
        if (is_upper && bare.chars().count() > 1) || is_lower {
            recased = true;
            words.push(capitalise(&lower));
        } else {
            words.push(bare.to_string());
        }
    }

    CleanedName {
        words,
        collisions,
        recased,
    }
}

/// Returns `true` if the cleaned words look like a person's name.
///
/// Requires 1–2 words, each 2–15 letters (internal `-` or `'` allowed),
/// starting with an uppercase letter, and none on the business denylist.
pub fn is_person_name(words: &[String]) -> bool {
    if words.is_empty() || words.len() > 2 {
        return false;
    }
    words.iter().all(|w| is_name_word(w))
}

fn is_name_word(word: &str) -> bool {
    let len = word.chars().count();
    if !WORD_LEN.contains(&len) {
        return false;
    }
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    if !word
        .chars()
        .all(|c| c.is_alphabetic() || c == '-' || c == '\'')
    {
        return false;
    }
    if word.ends_with('-') || word.ends_with('\'') || word.contains("--") {
        return false;
    }
    let lower = word.to_lowercase();
    !BUSINESS_TERMS.contains(&lower.as_str())
}

/// Returns `true` if `first_name` is a common first name.
pub fn is_known_first_name(first_name: &str) -> bool {
    KNOWN_FIRST_NAMES.contains(&first_name.to_lowercase().as_str())
}

/// Infer a surname for a one-word name from company context.
///
/// In order of preference:
/// 1. the word after "The" in the company name ("Jack The Plumber" → "Plumber")
/// 2. the declared trade ("plumbing" → "Plumber")
/// 3. a trade keyword in the company name or domain
/// 4. the first label of the domain ("acme.co.uk" → "Acme")
///
/// Returns `None` when no usable context exists.
pub fn synthesize_surname(
    first_name: &str,
    company_name: &str,
    company_domain: &str,
    trade: Option<&str>,
) -> Option<String> {
    let first_lower = first_name.to_lowercase();
    let usable = |candidate: &str| {
        let lower = candidate.to_lowercase();
        lower != first_lower
            && WORD_LEN.contains(&candidate.chars().count())
            && candidate.chars().all(char::is_alphabetic)
            && !BUSINESS_SUFFIXES.contains(&lower.as_str())
            && !BUSINESS_TERMS.contains(&lower.as_str())
    };

    let company_words: Vec<&str> = company_name.split_whitespace().collect();
    let after_the = company_words
        .windows(2)
        .find(|pair| pair[0].eq_ignore_ascii_case("the"))
        .map(|pair| pair[1].trim_matches(|c: char| !c.is_alphabetic()));
    if let Some(word) = after_the.filter(|w| usable(w)) {
        return Some(capitalise(&word.to_lowercase()));
    }

    if let Some(surname) = trade.and_then(trade_surname) {
        return Some(surname.to_string());
    }

    let label = company_domain.split('.').next().unwrap_or_default();
    if let Some(surname) = trade_surname(company_name).or_else(|| trade_surname(label)) {
        return Some(surname.to_string());
    }

    usable(label).then(|| capitalise(&label.to_lowercase()))
}

/// Map text containing a trade keyword to the trade's surname.
fn trade_surname(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    TRADE_SURNAMES
        .iter()
        .find(|(stem, _)| {
            lower
                .split(|c: char| !c.is_alphabetic())
                .any(|word| word.starts_with(stem))
                || (stem.len() >= 4 && lower.contains(stem))
        })
        .map(|(_, surname)| *surname)
}

/// Uppercase the first letter and any letter after `-` or `'`.
fn capitalise(lower: &str) -> String {
    let mut out = String::with_capacity(lower.len());
    let mut upper_next = true;
    for c in lower.chars() {
        if upper_next && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
        if c == '-' || c == '\'' {
            upper_next = true;
        }
    }
    out
}
