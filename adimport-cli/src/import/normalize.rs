//! Attribute normalization and required-attribute completion

use chrono::Utc;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::types::attributes::{REQUIRED_ATTRIBUTES, ResolvedAttributes, names};

/// Hard limit the directory imposes on account names.
pub const ACCOUNT_NAME_MAX_LEN: usize = 20;

/// Characters the directory forbids in account names. The apostrophe is
/// not in this set: it folds into a dot with the other separators.
const FORBIDDEN_CHARS: &str = "\"/\\[]:;|=,+*?<>@#%^&(){}!~`";

/// Separators folded into dots.
const SEPARATOR_CHARS: [char; 4] = [' ', '\'', '-', '_'];

/// Per-attribute normalization rules.
///
/// Dispatch is by lower-cased attribute name; unrecognized attributes
/// are trimmed only.
#[derive(Debug, Clone)]
pub struct AttributeNormalizer {
    mail_domain: String,
}

impl AttributeNormalizer {
    pub fn new(mail_domain: impl Into<String>) -> Self {
        AttributeNormalizer {
            mail_domain: mail_domain.into(),
        }
    }

    pub fn normalize(&self, attribute: &str, raw: &str) -> String {
        match attribute.trim().to_lowercase().as_str() {
            names::ACCOUNT_NAME => normalize_account_name(raw),
            names::DISPLAY_NAME => normalize_display_name(raw),
            names::GIVEN_NAME => normalize_given_name(raw),
            names::MAIL => self.normalize_mail(raw),
            _ => raw.trim().to_string(),
        }
    }

    /// Lower-case, strip internal spaces, append the default domain when
    /// no `@` is present.
    fn normalize_mail(&self, raw: &str) -> String {
        let mut mail: String = raw
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if !mail.is_empty() && !mail.contains('@') && !self.mail_domain.is_empty() {
            mail.push('@');
            mail.push_str(&self.mail_domain);
        }
        mail
    }

    /// Fill required attributes from weaker signals and derive the
    /// composite ones. Runs after per-field normalization. An attribute
    /// that stays absent afterwards is a legitimate terminal state: it
    /// is recorded in `missing` for manual correction, never replaced
    /// with a placeholder.
    pub fn complete_required(&self, attrs: &mut ResolvedAttributes) {
        // given name <- first token of the display name
        if attrs.is_blank(names::GIVEN_NAME) {
            if let Some(display) = attrs.get_non_blank(names::DISPLAY_NAME) {
                if let Some(first) = display.split_whitespace().next() {
                    let given = normalize_given_name(first);
                    attrs.set(names::GIVEN_NAME, given);
                }
            }
        }

        // surname <- last token of the display name (the single token
        // when there is only one)
        if attrs.is_blank(names::SURNAME) {
            if let Some(display) = attrs.get_non_blank(names::DISPLAY_NAME) {
                let tokens: Vec<&str> = display.split_whitespace().collect();
                if let Some(last) = tokens.last() {
                    attrs.set(names::SURNAME, last.to_string());
                }
            }
        }

        // account name <- normalized "given.family", or whichever half
        // is present
        if attrs.is_blank(names::ACCOUNT_NAME) {
            let candidate = match (
                attrs.get_non_blank(names::GIVEN_NAME),
                attrs.get_non_blank(names::SURNAME),
            ) {
                (Some(given), Some(surname)) => Some(format!("{}.{}", given, surname)),
                (Some(given), None) => Some(given.to_string()),
                (None, Some(surname)) => Some(surname.to_string()),
                (None, None) => None,
            };
            if let Some(candidate) = candidate {
                attrs.set(names::ACCOUNT_NAME, normalize_account_name(&candidate));
            }
        }

        // display name <- "given surname", only when at least one half
        // is non-blank (never synthesize a blank display name)
        if attrs.is_blank(names::DISPLAY_NAME) {
            let parts: Vec<&str> = [
                attrs.get_non_blank(names::GIVEN_NAME),
                attrs.get_non_blank(names::SURNAME),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !parts.is_empty() {
                let display = parts.join(" ");
                attrs.set(names::DISPLAY_NAME, display);
            }
        }

        // principal name <- account name + mail domain (preferred) or
        // the configured default domain, only when an account name exists
        if attrs.is_blank(names::PRINCIPAL_NAME) {
            if let Some(account) = attrs.get_non_blank(names::ACCOUNT_NAME) {
                let domain = attrs
                    .get_non_blank(names::MAIL)
                    .and_then(|mail| mail.split_once('@'))
                    .map(|(_, domain)| domain.to_string())
                    .or_else(|| {
                        (!self.mail_domain.is_empty()).then(|| self.mail_domain.clone())
                    });
                if let Some(domain) = domain {
                    let principal = format!("{}@{}", account, domain);
                    attrs.set(names::PRINCIPAL_NAME, principal);
                }
            }
        }

        attrs.missing = REQUIRED_ATTRIBUTES
            .iter()
            .filter(|name| attrs.is_blank(name))
            .map(|name| name.to_string())
            .collect();
    }
}

/// Account-name normalization. The step order is a behavioral contract:
/// diacritics, lower-case, forbidden-character removal, separator
/// folding, dot collapse, dot trim, digit prefix, length fix, trailing
/// dot re-trim, fallback.
pub fn normalize_account_name(raw: &str) -> String {
    let stripped: String = raw.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = stripped.to_lowercase();

    let mut folded = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if FORBIDDEN_CHARS.contains(c) {
            continue;
        }
        if SEPARATOR_CHARS.contains(&c) {
            folded.push('.');
        } else {
            folded.push(c);
        }
    }

    let mut collapsed = String::with_capacity(folded.len());
    let mut previous_dot = false;
    for c in folded.chars() {
        if c == '.' {
            if previous_dot {
                continue;
            }
            previous_dot = true;
        } else {
            previous_dot = false;
        }
        collapsed.push(c);
    }

    let mut name = collapsed.trim_matches('.').to_string();

    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name.insert(0, 'u');
    }

    if name.chars().count() > ACCOUNT_NAME_MAX_LEN {
        name = truncate_account_name(&name);
    }

    let name = name.trim_end_matches('.').to_string();

    if name.is_empty() {
        return fallback_account_name();
    }
    name
}

/// Shrink an over-long account name to the hard limit.
///
/// A two-part "given.family" shape loses characters from the ends of
/// its parts alternately, given-name part first, so both halves stay
/// recognizable. Anything else gets a blunt cut.
fn truncate_account_name(name: &str) -> String {
    let two_part = name
        .split_once('.')
        .filter(|(given, family)| {
            !given.is_empty() && !family.is_empty() && !family.contains('.')
        });

    let Some((given, family)) = two_part else {
        return name.chars().take(ACCOUNT_NAME_MAX_LEN).collect();
    };

    let mut given: Vec<char> = given.chars().collect();
    let mut family: Vec<char> = family.chars().collect();
    let mut shrink_given = true;
    while given.len() + family.len() + 1 > ACCOUNT_NAME_MAX_LEN {
        if given.len() <= 1 && family.len() <= 1 {
            break;
        }
        let part = if shrink_given { &mut given } else { &mut family };
        if part.len() > 1 {
            part.pop();
        }
        shrink_given = !shrink_given;
    }

    let mut result: String = given.into_iter().collect();
    result.push('.');
    result.extend(family);
    result
}

/// Time-based stand-in for inputs that normalize to nothing. Fits the
/// length limit and never starts with a digit.
fn fallback_account_name() -> String {
    format!("user{}", Utc::now().format("%y%m%d%H%M%S"))
}

/// Lower-case, then title-case every word.
pub fn normalize_display_name(raw: &str) -> String {
    title_case_words(raw.trim())
}

/// Trim; names longer than two characters get first-upper rest-lower,
/// initials pass through unchanged.
pub fn normalize_given_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() > 2 {
        capitalize_word(trimmed)
    } else {
        trimmed.to_string()
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Capitalize every whitespace-separated word, preserving separators.
pub(crate) fn title_case_words(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_name_basic() {
        assert_eq!(normalize_account_name("Jean Dupont"), "jean.dupont");
        assert_eq!(normalize_account_name("  O'Brien  "), "o.brien");
        assert_eq!(normalize_account_name("van_der-Berg"), "van.der.berg");
    }

    #[test]
    fn test_account_name_strips_diacritics() {
        assert_eq!(normalize_account_name("Éloïse Müller"), "eloise.muller");
        assert_eq!(normalize_account_name("François"), "francois");
    }

    #[test]
    fn test_account_name_removes_forbidden_characters() {
        assert_eq!(normalize_account_name("jean@dupont#%"), "jeandupont");
        assert_eq!(normalize_account_name("a\"b/c\\d[e]f:g;h|i"), "abcdefghi");
        assert_eq!(normalize_account_name("x=y,z+w*v?u<t>s"), "xyzwvuts");
    }

    #[test]
    fn test_account_name_collapses_and_trims_dots() {
        assert_eq!(normalize_account_name("jean  dupont"), "jean.dupont");
        assert_eq!(normalize_account_name(" - jean - "), "jean");
        assert_eq!(normalize_account_name("..jean..dupont.."), "jean.dupont");
    }

    #[test]
    fn test_account_name_digit_prefix() {
        assert_eq!(normalize_account_name("3jean"), "u3jean");
        // prefix applies after dot-trimming, so ".3a" also gets it
        assert_eq!(normalize_account_name(".3a"), "u3a");
    }

    #[test]
    fn test_account_name_length_limit() {
        let long = normalize_account_name("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(long.chars().count(), ACCOUNT_NAME_MAX_LEN);
        assert_eq!(long, "abcdefghijklmnopqrst");
    }

    #[test]
    fn test_account_name_two_part_truncation_shrinks_alternately() {
        // given part shrinks first, then the family part
        let name = normalize_account_name("maximilien.robespierre");
        assert_eq!(name.chars().count(), ACCOUNT_NAME_MAX_LEN);
        assert_eq!(name, "maximilie.robespierr");

        // heavily lopsided input still keeps both halves
        let name = normalize_account_name("x.abcdefghijklmnopqrstuvwxyz");
        assert_eq!(name.chars().count(), ACCOUNT_NAME_MAX_LEN);
        assert!(name.starts_with("x."));
    }

    #[test]
    fn test_account_name_three_part_gets_blunt_cut() {
        // blunt cut to 20, then the trailing dot it exposed is re-trimmed
        let name = normalize_account_name("jean.baptiste.de.la.fontaine");
        assert_eq!(name, "jean.baptiste.de.la");
    }

    #[test]
    fn test_account_name_invariants() {
        for input in [
            "Jean Dupont",
            "3numeric start",
            "ALL CAPS NAME THAT IS VERY LONG INDEED",
            "...",
            "@#%",
            "a",
            "ßharp",
        ] {
            let name = normalize_account_name(input);
            assert!(name.chars().count() <= ACCOUNT_NAME_MAX_LEN, "len: {}", input);
            assert!(!name.starts_with('.'), "leading dot: {}", input);
            assert!(!name.ends_with('.'), "trailing dot: {}", input);
            assert!(
                !name.chars().next().unwrap().is_ascii_digit(),
                "digit start: {}",
                input
            );
        }
    }

    #[test]
    fn test_account_name_is_idempotent() {
        for input in ["Jean Dupont", "Éloïse O'Brien", "maximilien.robespierre"] {
            let once = normalize_account_name(input);
            let twice = normalize_account_name(&once);
            assert_eq!(once, twice, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_account_name_empty_falls_back_to_timestamp() {
        let name = normalize_account_name("@#%");
        assert!(name.starts_with("user"));
        assert!(name.chars().count() <= ACCOUNT_NAME_MAX_LEN);
    }

    #[test]
    fn test_display_name_title_cases_words() {
        assert_eq!(normalize_display_name("JEAN DUPONT"), "Jean Dupont");
        assert_eq!(normalize_display_name("jean  dupont"), "Jean  Dupont");
    }

    #[test]
    fn test_given_name_rules() {
        assert_eq!(normalize_given_name("  jean "), "Jean");
        assert_eq!(normalize_given_name("MARIE"), "Marie");
        // initials pass through unchanged
        assert_eq!(normalize_given_name("JP"), "JP");
        assert_eq!(normalize_given_name("j"), "j");
    }

    #[test]
    fn test_mail_normalization() {
        let normalizer = AttributeNormalizer::new("example.com");
        assert_eq!(
            normalizer.normalize("mail", "Jean Dupont@Example.COM"),
            "jeandupont@example.com"
        );
        assert_eq!(
            normalizer.normalize("mail", "jean.dupont"),
            "jean.dupont@example.com"
        );
    }

    #[test]
    fn test_unrecognized_attribute_is_trimmed_only() {
        let normalizer = AttributeNormalizer::new("example.com");
        assert_eq!(normalizer.normalize("description", "  As Is  "), "As Is");
    }

    #[test]
    fn test_completion_from_display_name() {
        let normalizer = AttributeNormalizer::new("example.com");
        let mut attrs = ResolvedAttributes::new();
        attrs.set(names::DISPLAY_NAME, "Jean Dupont");

        normalizer.complete_required(&mut attrs);

        assert_eq!(attrs.get(names::GIVEN_NAME), Some("Jean"));
        assert_eq!(attrs.get(names::SURNAME), Some("Dupont"));
        assert_eq!(attrs.get(names::ACCOUNT_NAME), Some("jean.dupont"));
        assert!(attrs.missing.is_empty());
    }

    #[test]
    fn test_completion_single_token_display_name() {
        let normalizer = AttributeNormalizer::new("example.com");
        let mut attrs = ResolvedAttributes::new();
        attrs.set(names::DISPLAY_NAME, "Cher");

        normalizer.complete_required(&mut attrs);

        assert_eq!(attrs.get(names::GIVEN_NAME), Some("Cher"));
        assert_eq!(attrs.get(names::SURNAME), Some("Cher"));
        assert_eq!(attrs.get(names::ACCOUNT_NAME), Some("cher.cher"));
    }

    #[test]
    fn test_completion_derives_display_and_principal() {
        let normalizer = AttributeNormalizer::new("example.com");
        let mut attrs = ResolvedAttributes::new();
        attrs.set(names::GIVEN_NAME, "Jean");
        attrs.set(names::SURNAME, "Dupont");
        attrs.set(names::MAIL, "jd@corp.org");

        normalizer.complete_required(&mut attrs);

        assert_eq!(attrs.get(names::DISPLAY_NAME), Some("Jean Dupont"));
        // mail domain wins over the configured default
        assert_eq!(
            attrs.get(names::PRINCIPAL_NAME),
            Some("jean.dupont@corp.org")
        );
    }

    #[test]
    fn test_completion_principal_falls_back_to_default_domain() {
        let normalizer = AttributeNormalizer::new("example.com");
        let mut attrs = ResolvedAttributes::new();
        attrs.set(names::ACCOUNT_NAME, "jean.dupont");
        attrs.set(names::SURNAME, "Dupont");
        attrs.set(names::GIVEN_NAME, "Jean");

        normalizer.complete_required(&mut attrs);

        assert_eq!(
            attrs.get(names::PRINCIPAL_NAME),
            Some("jean.dupont@example.com")
        );
    }

    #[test]
    fn test_completion_leaves_underivable_attributes_missing() {
        let normalizer = AttributeNormalizer::new("example.com");
        let mut attrs = ResolvedAttributes::new();

        normalizer.complete_required(&mut attrs);

        assert!(attrs.is_blank(names::GIVEN_NAME));
        assert!(attrs.is_blank(names::SURNAME));
        assert!(attrs.is_blank(names::ACCOUNT_NAME));
        assert_eq!(attrs.missing.len(), 3);
        // no display name synthesized from nothing
        assert!(attrs.is_blank(names::DISPLAY_NAME));
    }

    #[test]
    fn test_completion_account_name_from_given_only() {
        let normalizer = AttributeNormalizer::new("example.com");
        let mut attrs = ResolvedAttributes::new();
        attrs.set(names::GIVEN_NAME, "Jean");

        normalizer.complete_required(&mut attrs);

        assert_eq!(attrs.get(names::ACCOUNT_NAME), Some("jean"));
        assert_eq!(attrs.missing, vec![names::SURNAME.to_string()]);
    }
}
