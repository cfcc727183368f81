//! Contact-field clean-up: company domains, emails, phones, profile links.
//!
//! Canonicalises scraped values so that equivalent contacts compare equal
//! and obviously broken ones are dropped before they reach the merge stage.

use url::Url;

/// Placeholder email domains that appear in page templates.
const PLACEHOLDER_EMAIL_DOMAINS: &[&str] = &["example.com", "domain.com", "email.com", "yourdomain.com"];

/// Minimum and maximum digit counts for a plausible phone number.
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 10..=13;

/// Extract the registrable company domain from a website URL.
///
/// Lowercases the host and strips a leading `www.`. Bare hosts without a
/// scheme are accepted. Unparseable input is returned trimmed and
/// lowercased.
///
/// # Examples
///
/// ```
/// use leadscout_discovery::normalize::contact::company_domain;
///
/// assert_eq!(company_domain("https://www.JackThePlumber.co.uk/about"), "jacktheplumber.co.uk");
/// assert_eq!(company_domain("acme.com"), "acme.com");
/// ```
pub fn company_domain(website_url: &str) -> String {
    let trimmed = website_url.trim();
    let host = parse_lenient(trimmed)
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| trimmed.to_lowercase());
    host.strip_prefix("www.").map(str::to_owned).unwrap_or(host)
}

/// Clean a scraped email address.
///
/// Strips a `mailto:` prefix and lowercases. Returns `None` unless the
/// result has exactly one `@`, a non-empty local part, a dotted domain,
/// no whitespace, and is not a template placeholder.
pub fn clean_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("mailto:")
        .or_else(|| trimmed.strip_prefix("MAILTO:"))
        .unwrap_or(trimmed);
    let email = without_scheme.to_lowercase();

    if email.chars().any(char::is_whitespace) || email.matches('@').count() != 1 {
        return None;
    }
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return None;
    }
    if PLACEHOLDER_EMAIL_DOMAINS.contains(&domain) {
        return None;
    }
    Some(email)
}

/// Clean a scraped phone number.
///
/// Keeps digits and a single leading `+`. Returns `None` unless the
/// number has 10 to 13 digits.
pub fn clean_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let mut cleaned = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        cleaned.push('+');
    }
    cleaned.extend(trimmed.chars().filter(char::is_ascii_digit));

    let digits = cleaned.trim_start_matches('+').len();
    PHONE_DIGITS.contains(&digits).then_some(cleaned)
}

/// Canonicalise a professional-network profile URL.
///
/// Only personal profile links (`linkedin.com/in/<slug>`) are kept; company
/// pages, search links and anything unparseable yield `None`. Query,
/// fragment and trailing slash are dropped and the slug is lowercased.
pub fn normalize_profile_url(raw: &str) -> Option<String> {
    let parsed = parse_lenient(raw.trim())?;
    let host = parsed.host_str()?.to_lowercase();
    if host != "linkedin.com" && !host.ends_with(".linkedin.com") {
        return None;
    }
    let mut segments = parsed.path_segments()?;
    if segments.next()? != "in" {
        return None;
    }
    let slug = segments.next().filter(|s| !s.is_empty())?.to_lowercase();
    Some(format!("https://www.linkedin.com/in/{slug}"))
}

/// Parse a URL, assuming `https://` when the scheme is missing.
fn parse_lenient(raw: &str) -> Option<Url> {
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw)
        .ok()
        .filter(|u| u.has_host())
        .or_else(|| Url::parse(&format!("https://{raw}")).ok())
}
