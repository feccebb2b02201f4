//! Lexer (tokenizer) for filter expressions.
//!
//! Converts a raw filter string into a flat sequence of typed tokens, each
//! tagged with its character offset in the input. The scan is a single
//! left-to-right pass with no backtracking; the stream always ends with an
//! explicit [`TokenKind::Eof`] sentinel so the parser never special-cases
//! end of input.

use crate::error::{FilterError, FilterResult};

/// Maximum length of an individual quoted literal, in characters.
///
/// Capped independently of the whole-input limit so one oversized value
/// cannot consume most of the budget.
pub const MAX_QUOTED_VALUE_LENGTH: usize = 256;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A recognized field name (`done`, `priority`, ...).
    Field,
    /// A comparison operator (`=`, `!=`, `like`, `not in`, ...).
    Operator,
    /// A logical operator (`&&` or `||`).
    LogicalOp,
    /// Opening parenthesis `(`.
    OpenParen,
    /// Closing parenthesis `)`.
    CloseParen,
    /// Comma separating `in`-list values.
    Comma,
    /// A string literal (quoted or a bare value run).
    Str,
    /// A numeric literal.
    Number,
    /// A `true`/`false` literal.
    Boolean,
    /// End-of-input sentinel.
    Eof,
}

/// A token with its source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The token text. Quoted literals are unescaped; word operators keep
    /// their original case for the parser to normalize.
    pub text: String,
    /// Character offset (0-indexed) where the token starts.
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

/// Characters that may appear in an unquoted value run.
fn is_value_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(c, '_' | '-' | '.' | '+' | ':' | '/' | '%' | '@' | '"' | '\'')
}

/// Returns true if `text` is a numeric literal (digits with optional sign
/// and decimal point). Deliberately stricter than `f64::from_str`, which
/// would also admit `inf` and `NaN`.
pub(crate) fn is_numeric_literal(text: &str) -> bool {
    let rest = text.strip_prefix(['-', '+']).unwrap_or(text);
    !rest.is_empty()
        && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
        && rest.chars().filter(|&c| c == '.').count() <= 1
        && rest.chars().any(|c| c.is_ascii_digit())
}

/// Lexer holding the scan state: the input as characters plus a single
/// cursor index, so token positions are character offsets.
struct Lexer<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

/// Tokenizes a filter string.
///
/// Called only after the security gate passes. Whitespace is skipped
/// between tokens; multi-character operators use longest-match-first
/// ordering (`>=` before `>`, `not in` before bare words).
///
/// # Errors
///
/// Returns a positioned `FilterError::Syntax` for unterminated quotes,
/// oversized quoted values, lone `&`/`|`, and unexpected characters.
pub fn tokenize(input: &str) -> FilterResult<Vec<Token>> {
    Lexer {
        input,
        chars: input.chars().collect(),
        pos: 0,
    }
    .run()
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> FilterResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        tokens.push(Token::new(TokenKind::Eof, "", self.chars.len()));
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}') {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>, position: usize) -> FilterError {
        FilterError::syntax(message, position, self.input)
    }

    fn next_token(&mut self) -> FilterResult<Option<Token>> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let start = self.pos;

        let token = match c {
            '(' => {
                self.bump();
                Token::new(TokenKind::OpenParen, "(", start)
            }
            ')' => {
                self.bump();
                Token::new(TokenKind::CloseParen, ")", start)
            }
            ',' => {
                self.bump();
                Token::new(TokenKind::Comma, ",", start)
            }
            '&' | '|' => {
                self.bump();
                if self.peek() == Some(c) {
                    self.bump();
                    let text = if c == '&' { "&&" } else { "||" };
                    Token::new(TokenKind::LogicalOp, text, start)
                } else {
                    return Err(self.error(format!("Unexpected character '{}'", c), start));
                }
            }
            '=' => {
                self.bump();
                Token::new(TokenKind::Operator, "=", start)
            }
            '!' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    Token::new(TokenKind::Operator, "!=", start)
                } else {
                    return Err(self.error("Unexpected character '!'", start));
                }
            }
            '>' | '<' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    let text = if c == '>' { ">=" } else { "<=" };
                    Token::new(TokenKind::Operator, text, start)
                } else {
                    let text = if c == '>' { ">" } else { "<" };
                    Token::new(TokenKind::Operator, text, start)
                }
            }
            '"' => self.read_quoted(start)?,
            _ if is_value_char(c) => self.read_word(start)?,
            _ => return Err(self.error(format!("Unexpected character '{}'", c), start)),
        };

        Ok(Some(token))
    }

    /// Reads a double-quoted literal, unescaping `\"` into a literal quote.
    fn read_quoted(&mut self, start: usize) -> FilterResult<Token> {
        self.bump(); // opening quote

        let mut value = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("Unterminated quoted value", start));
            };
            match c {
                '"' => break,
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(self.error("Unterminated quoted value", start));
                    };
                    value.push(escaped);
                }
                _ => value.push(c),
            }
            if value.chars().count() > MAX_QUOTED_VALUE_LENGTH {
                return Err(self.error(
                    format!(
                        "Quoted value exceeds the maximum length of {} characters",
                        MAX_QUOTED_VALUE_LENGTH
                    ),
                    start,
                ));
            }
        }

        Ok(Token::new(TokenKind::Str, value, start))
    }

    /// Reads a maximal run of value characters and classifies it: a field
    /// name, a word operator, a boolean or numeric literal, or a bare
    /// string value.
    fn read_word(&mut self, start: usize) -> FilterResult<Token> {
        let text = self.read_value_run();
        let lower = text.to_lowercase();

        // `not in` is matched before single-word classification so `not`
        // never leaks through as a bare value.
        if lower == "not" {
            let after_not = self.pos;
            self.skip_whitespace();
            let follow_start = self.pos;
            let follow = self.read_value_run();
            if follow.to_lowercase() == "in" {
                return Ok(Token::new(
                    TokenKind::Operator,
                    format!("{} {}", text, follow),
                    start,
                ));
            }
            // Not an operator after all; rewind and treat `not` as a value.
            self.pos = if follow.is_empty() {
                after_not
            } else {
                follow_start
            };
            return Ok(Token::new(TokenKind::Str, text, start));
        }

        if lower == "in" || lower == "like" {
            return Ok(Token::new(TokenKind::Operator, text, start));
        }

        if lower == "true" || lower == "false" {
            return Ok(Token::new(TokenKind::Boolean, text, start));
        }

        if is_numeric_literal(&text) {
            return Ok(Token::new(TokenKind::Number, text, start));
        }

        if text.parse::<crate::ast::Field>().is_ok() {
            return Ok(Token::new(TokenKind::Field, text, start));
        }

        Ok(Token::new(TokenKind::Str, text, start))
    }

    fn read_value_run(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_value_char(c) {
                text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input)
            .unwrap()
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }

    #[test]
    fn test_tokenize_simple_condition() {
        let tokens = tokenize("done = false").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Field, "done", 0),
                Token::new(TokenKind::Operator, "=", 5),
                Token::new(TokenKind::Boolean, "false", 7),
                Token::new(TokenKind::Eof, "", 12),
            ]
        );
    }

    #[test]
    fn test_tokenize_always_ends_with_eof() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens, vec![Token::new(TokenKind::Eof, "", 0)]);

        let tokens = tokenize("   ").unwrap();
        assert_eq!(tokens, vec![Token::new(TokenKind::Eof, "", 3)]);
    }

    #[test]
    fn test_tokenize_comparison_operators_longest_match_first() {
        assert_eq!(
            texts("priority >= 3"),
            vec!["priority", ">=", "3", ""]
        );
        assert_eq!(texts("priority > 3"), vec!["priority", ">", "3", ""]);
        assert_eq!(texts("percentDone <= 50"), vec!["percentDone", "<=", "50", ""]);
        assert_eq!(texts("priority != 1"), vec!["priority", "!=", "1", ""]);
    }

    #[test]
    fn test_tokenize_word_operators_case_insensitive() {
        let tokens = tokenize("title LIKE report").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        // Original case is preserved for the parser to normalize
        assert_eq!(tokens[1].text, "LIKE");

        let tokens = tokenize("labels In urgent").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, "In");
    }

    #[test]
    fn test_tokenize_not_in() {
        let tokens = tokenize("assignees not in user1").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, "not in");
        assert_eq!(tokens[1].position, 10);

        let tokens = tokenize("assignees NOT  IN user1").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, "NOT IN");
    }

    #[test]
    fn test_tokenize_bare_not_is_a_value() {
        let tokens = tokenize("title = not").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Str);
        assert_eq!(tokens[2].text, "not");

        // `not` followed by a non-`in` word stays a bare value
        let tokens = tokenize("title = not ready").unwrap();
        assert_eq!(tokens[2], Token::new(TokenKind::Str, "not", 8));
        assert_eq!(tokens[3], Token::new(TokenKind::Str, "ready", 12));
    }

    #[test]
    fn test_tokenize_logical_operators() {
        assert_eq!(
            kinds("done = true && priority > 2 || percentDone < 50"),
            vec![
                TokenKind::Field,
                TokenKind::Operator,
                TokenKind::Boolean,
                TokenKind::LogicalOp,
                TokenKind::Field,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::LogicalOp,
                TokenKind::Field,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_lone_ampersand_is_an_error() {
        let err = tokenize("done = true & priority > 2").unwrap_err();
        assert_eq!(err.position(), Some(12));

        let err = tokenize("a | b").unwrap_err();
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_tokenize_parens_and_commas() {
        assert_eq!(
            kinds("(labels in a, b)"),
            vec![
                TokenKind::OpenParen,
                TokenKind::Field,
                TokenKind::Operator,
                TokenKind::Str,
                TokenKind::Comma,
                TokenKind::Str,
                TokenKind::CloseParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_quoted_value() {
        let tokens = tokenize("title = \"weekly report\"").unwrap();
        assert_eq!(tokens[2], Token::new(TokenKind::Str, "weekly report", 8));
    }

    #[test]
    fn test_tokenize_quoted_value_unescapes_quotes() {
        let tokens = tokenize(r#"title = "say \"hi\"""#).unwrap();
        assert_eq!(tokens[2].text, "say \"hi\"");
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        let err = tokenize("title = \"unfinished").unwrap_err();
        match err {
            FilterError::Syntax {
                message, position, ..
            } => {
                assert!(message.contains("Unterminated"));
                assert_eq!(position, 8);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_quoted_value_length_cap() {
        let input = format!("title = \"{}\"", "x".repeat(300));
        let err = tokenize(&input).unwrap_err();
        match err {
            FilterError::Syntax { message, .. } => {
                assert!(message.contains("maximum length"));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }

        // 256 characters exactly is fine
        let input = format!("title = \"{}\"", "x".repeat(256));
        tokenize(&input).unwrap();
    }

    #[test]
    fn test_tokenize_relative_date_is_one_value_run() {
        let tokens = tokenize("dueDate < now+7d").unwrap();
        assert_eq!(tokens[2], Token::new(TokenKind::Str, "now+7d", 10));
    }

    #[test]
    fn test_tokenize_iso_date_is_a_string() {
        let tokens = tokenize("created > 2024-01-15").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Str);
        assert_eq!(tokens[2].text, "2024-01-15");
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = tokenize("percentDone >= 0.5").unwrap();
        assert_eq!(tokens[2], Token::new(TokenKind::Number, "0.5", 15));

        let tokens = tokenize("priority = -1").unwrap();
        // '-' is a value character, so the sign folds into the run
        assert_eq!(tokens[2], Token::new(TokenKind::Number, "-1", 11));
    }

    #[test]
    fn test_tokenize_unknown_word_is_a_string() {
        let tokens = tokenize("project = x").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text, "project");
    }

    #[test]
    fn test_token_positions_are_character_offsets() {
        // Multi-byte characters count as one position each
        let tokens = tokenize("title = café && done = true").unwrap();
        assert_eq!(tokens[2], Token::new(TokenKind::Str, "café", 8));
        assert_eq!(tokens[3].position, 13);
        assert_eq!(tokens[4].position, 16);
    }
}
