//! Pre-tokenization input validation.
//!
//! Every filter string passes through this gate before the tokenizer sees
//! it. The gate bounds input length, allow-lists the character set, and
//! rejects known injection signatures. Rejections carry deliberately generic
//! messages so a caller probing the gate learns nothing about which check
//! fired.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FilterError, FilterResult};

/// Maximum length of a whole filter string, in characters.
///
/// This bounds worst-case parse cost independent of grammar complexity.
pub const MAX_FILTER_LENGTH: usize = 1000;

/// Known injection signatures, checked after the character allow-list.
///
/// The allow-list already excludes most payload shapes; this list is defense
/// in depth for payloads expressible in admissible characters. Order is
/// irrelevant since a match on any pattern rejects the input.
static DENYLIST: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Script/tag markers
        r"(?i)<\s*/?\s*script",
        r"(?i)<\s*iframe",
        r"(?i)javascript\s*:",
        r"(?i)\bon\w+\s*=",
        // Inline code-execution markers
        r"(?i)\beval\s*\(",
        r"(?i)\bfunction\s*\(",
        r"(?i)\brequire\s*\(",
        r"(?i)\bimport\s*\(",
        r"\$\{",
        // Property-traversal markers
        r"__\w+",
        r"(?i)\bconstructor\b",
        r"(?i)\bprototype\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("denylist pattern must compile"))
    .collect()
});

/// The simple `field operator literal` shape: a single condition with no
/// grouping or logical operators. Inputs of this shape skip the denylist so
/// that legitimate values containing a denylist substring (for example a
/// title search for the word "constructor") are not rejected. The character
/// allow-list still applies.
static SIMPLE_CONDITION: Lazy<Regex> = Lazy::new(|| {
    // The literal part deliberately excludes `<`, `>`, `=`, `(` and `&` so
    // tag- or expression-shaped payloads never qualify as "simple".
    Regex::new(
        r#"^\s*[A-Za-z][A-Za-z0-9]*\s*(=|!=|>=|<=|>|<|(?i:like)|(?i:not\s+in)|(?i:in))\s*[\w\s"'%@.:+/,-]+$"#,
    )
    .expect("simple-condition pattern must compile")
});

/// Validates a raw filter string against the security rules.
///
/// Checks run in order: length, character allow-list, pattern denylist.
///
/// # Errors
///
/// Returns `FilterError::InputTooLong` for oversized input,
/// `FilterError::InvalidCharacters` for characters outside the allowed set,
/// and `FilterError::RejectedInput` for denylisted patterns.
pub fn validate_input(input: &str) -> FilterResult<()> {
    let length = input.chars().count();
    if length > MAX_FILTER_LENGTH {
        return Err(FilterError::InputTooLong {
            length,
            max: MAX_FILTER_LENGTH,
        });
    }

    check_characters(input)?;

    if !SIMPLE_CONDITION.is_match(input) && DENYLIST.iter().any(|re| re.is_match(input)) {
        return Err(FilterError::RejectedInput);
    }

    Ok(())
}

/// Walks the input once, tracking quoted regions, and rejects any character
/// outside the allowed set.
fn check_characters(input: &str) -> FilterResult<()> {
    let mut in_quotes = false;
    let mut escaped = false;

    for c in input.chars() {
        // Control and invisible characters are rejected everywhere,
        // including inside quoted literals.
        if is_forbidden_everywhere(c) {
            return Err(FilterError::InvalidCharacters);
        }

        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }

        if c == '"' {
            in_quotes = true;
            continue;
        }

        if !is_allowed_bare(c) {
            return Err(FilterError::InvalidCharacters);
        }
    }

    Ok(())
}

/// Whitespace the tokenizer skips between tokens.
fn is_token_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

/// Characters rejected even inside quoted literals: controls (including
/// DEL), zero-width space, byte-order-mark, and bidi override characters.
fn is_forbidden_everywhere(c: char) -> bool {
    if is_token_whitespace(c) {
        return false;
    }
    c.is_control()
        || matches!(c, '\u{200B}' | '\u{200E}' | '\u{200F}' | '\u{FEFF}')
        || ('\u{202A}'..='\u{202E}').contains(&c)
        || ('\u{2066}'..='\u{2069}').contains(&c)
}

/// Characters admitted outside quoted literals. Unicode letters are
/// explicitly allowed so international text values pass unquoted.
fn is_allowed_bare(c: char) -> bool {
    c.is_alphanumeric()
        || is_token_whitespace(c)
        || matches!(
            c,
            '_' | '-' | '.' | '+' | ':' | '/' | '%' | '@' | ',' | '(' | ')' | '=' | '<' | '>'
                | '!' | '&' | '|' | '\''
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_typical_filters() {
        validate_input("done = false && priority >= 3").unwrap();
        validate_input("(dueDate < now+7d) || (labels in urgent, blocked)").unwrap();
        validate_input("title like \"%weekly report%\"").unwrap();
        // Field names ending in "one" must not trip the event-handler pattern
        validate_input("percentDone = 50 && done = true").unwrap();
    }

    #[test]
    fn test_accepts_international_text() {
        validate_input("title = \"café réunion\"").unwrap();
        validate_input("description like 日報").unwrap();
    }

    #[test]
    fn test_rejects_over_length_regardless_of_content() {
        let input = "x".repeat(1001);
        assert_eq!(
            validate_input(&input),
            Err(FilterError::InputTooLong {
                length: 1001,
                max: MAX_FILTER_LENGTH
            })
        );
    }

    #[test]
    fn test_accepts_input_at_length_limit() {
        // 1000 characters of admissible content
        let condition = "priority = 1";
        let mut input = condition.to_string();
        while input.chars().count() + condition.len() + 4 <= MAX_FILTER_LENGTH {
            input.push_str(" && ");
            input.push_str(condition);
        }
        assert!(input.chars().count() <= MAX_FILTER_LENGTH);
        validate_input(&input).unwrap();
    }

    #[test]
    fn test_rejects_disallowed_bare_characters() {
        assert_eq!(
            validate_input("title = $value"),
            Err(FilterError::InvalidCharacters)
        );
        assert_eq!(
            validate_input("done = true; drop"),
            Err(FilterError::InvalidCharacters)
        );
    }

    #[test]
    fn test_rejects_control_characters_even_inside_quotes() {
        assert_eq!(
            validate_input("title = \"a\u{0000}b\""),
            Err(FilterError::InvalidCharacters)
        );
        assert_eq!(
            validate_input("title = \"a\u{200B}b\""),
            Err(FilterError::InvalidCharacters)
        );
        assert_eq!(
            validate_input("title = \"a\u{202E}b\""),
            Err(FilterError::InvalidCharacters)
        );
        assert_eq!(
            validate_input("title = \"a\u{007F}b\""),
            Err(FilterError::InvalidCharacters)
        );
    }

    #[test]
    fn test_admits_punctuation_inside_quotes() {
        // Characters outside the bare allow-list are fine inside quotes
        validate_input("title = \"meeting #3 [draft]?\"").unwrap();
    }

    #[test]
    fn test_rejects_injection_signatures() {
        assert_eq!(
            validate_input("title = x && description like <script>alert(1)</script>"),
            Err(FilterError::RejectedInput)
        );
        // A tag-shaped literal never qualifies for the simple-shape carve-out
        assert_eq!(
            validate_input("title = <script>x</script>"),
            Err(FilterError::RejectedInput)
        );
        // Payload built entirely from admissible characters
        assert_eq!(
            validate_input("done = true && title = __proto__"),
            Err(FilterError::RejectedInput)
        );
        assert_eq!(
            validate_input("done = true && title = constructor"),
            Err(FilterError::RejectedInput)
        );
    }

    #[test]
    fn test_simple_condition_carve_out() {
        // A single bare condition may contain a denylist substring
        validate_input("title like \"%constructor%\"").unwrap();
        validate_input("title = prototype").unwrap();
        // The carve-out does not bypass the character allow-list
        assert_eq!(
            validate_input("title = construc`tor"),
            Err(FilterError::InvalidCharacters)
        );
    }

    #[test]
    fn test_rejection_messages_never_name_the_pattern() {
        let err = validate_input("done = true && title = constructor").unwrap_err();
        let message = format!("{}", err);
        assert!(!message.contains("constructor"));
        assert_eq!(message, "invalid filter syntax");
    }
}
