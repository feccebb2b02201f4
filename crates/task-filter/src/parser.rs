//! Recursive descent parser for filter expressions.
//!
//! # Grammar
//!
//! ```text
//! expression ::= group (logical_op group)*
//! group      ::= "(" condition (logical_op condition)* ")"
//!              | condition (logical_op condition)*      -- bare run
//! condition  ::= field operator value
//! value      ::= scalar | scalar ("," scalar)*          -- list for in/not in
//! logical_op ::= "&&" | "||"
//! ```
//!
//! There is no operator precedence: the first logical operator seen at the
//! expression level fixes the operator joining all groups, and the first
//! operator seen inside a group fixes the operator joining its conditions.
//! A bare condition run ends when a logical operator is immediately followed
//! by `(` — that operator belongs to the expression level and the
//! parenthesized clause that follows starts the next group.
//!
//! The parser is permissive about value typing: `done = "true"` coerces to
//! a boolean and `priority = "3"` to a number, so quoted and bare literals
//! are equivalent. Field/operator/value compatibility is the validator's
//! concern.

use crate::ast::{Field, FilterCondition, FilterExpression, FilterGroup, LogicalOp, Operator, Value};
use crate::error::{FilterError, FilterResult};
use crate::lexer::{self, Token, TokenKind};
use crate::security;

/// Parses a filter string into a [`FilterExpression`].
///
/// Runs the full pipeline: security gate, tokenizer, parser. Empty or
/// whitespace-only input yields the empty (match-everything) expression.
///
/// # Errors
///
/// Returns the security gate's rejection, or a positioned
/// `FilterError::Syntax` describing the first grammar problem. No failure
/// path panics.
///
/// # Example
///
/// ```
/// use task_filter_rs::{parse_filter_string, LogicalOp};
///
/// let expr = parse_filter_string("done = false && priority >= 3").unwrap();
/// assert_eq!(expr.groups.len(), 1);
/// assert_eq!(expr.groups[0].operator, LogicalOp::And);
/// assert_eq!(expr.groups[0].conditions.len(), 2);
/// ```
pub fn parse_filter_string(input: &str) -> FilterResult<FilterExpression> {
    security::validate_input(input)?;
    let tokens = lexer::tokenize(input)?;
    Parser::new(input, tokens).parse()
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            input,
            tokens,
            position: 0,
        }
    }

    /// Returns the current token. The Eof sentinel guarantees there always
    /// is one.
    fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    /// Returns the token after the current one.
    fn peek_next(&self) -> &Token {
        let next = (self.position + 1).min(self.tokens.len() - 1);
        &self.tokens[next]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn error(&self, message: impl Into<String>, position: usize) -> FilterError {
        FilterError::syntax(message, position, self.input)
    }

    fn parse(mut self) -> FilterResult<FilterExpression> {
        if self.at(TokenKind::Eof) {
            return Ok(FilterExpression::empty());
        }

        let expression = self.parse_expression()?;

        if !self.at(TokenKind::Eof) {
            let token = self.peek();
            return Err(self.error(
                format!("Unexpected token '{}'", token.text),
                token.position,
            ));
        }

        Ok(expression)
    }

    /// Parses groups joined by logical operators. The first operator seen
    /// here fixes the expression operator; later occurrences of the other
    /// operator still join with the first-seen one.
    fn parse_expression(&mut self) -> FilterResult<FilterExpression> {
        let mut groups = vec![self.parse_group()?];
        let mut operator: Option<LogicalOp> = None;

        while self.at(TokenKind::LogicalOp) {
            let op = logical_op_from(&self.advance());
            operator.get_or_insert(op);
            groups.push(self.parse_group()?);
        }

        Ok(FilterExpression::new(
            operator.unwrap_or(LogicalOp::And),
            groups,
        ))
    }

    /// Parses one parenthesized clause or one bare condition run.
    fn parse_group(&mut self) -> FilterResult<FilterGroup> {
        if self.at(TokenKind::OpenParen) {
            let open = self.advance();

            if self.at(TokenKind::CloseParen) {
                return Err(self.error("Empty group", open.position));
            }

            let group = self.parse_condition_run(false)?;

            if !self.at(TokenKind::CloseParen) {
                let token = self.peek();
                return Err(self.error("Expected closing parenthesis", token.position));
            }
            self.advance();

            Ok(group)
        } else {
            self.parse_condition_run(true)
        }
    }

    /// Parses conditions joined by a single logical operator. In a bare run
    /// (`stop_before_paren`), a logical operator followed by `(` terminates
    /// the run: it joins groups, not conditions.
    fn parse_condition_run(&mut self, stop_before_paren: bool) -> FilterResult<FilterGroup> {
        let mut conditions = vec![self.parse_condition()?];
        let mut operator: Option<LogicalOp> = None;

        while self.at(TokenKind::LogicalOp) {
            if stop_before_paren && self.peek_next().kind == TokenKind::OpenParen {
                break;
            }
            let op = logical_op_from(&self.advance());
            operator.get_or_insert(op);
            conditions.push(self.parse_condition()?);
        }

        Ok(FilterGroup::new(operator.unwrap_or(LogicalOp::And), conditions))
    }

    /// Parses one `field operator value` condition.
    fn parse_condition(&mut self) -> FilterResult<FilterCondition> {
        let field = self.parse_field()?;
        let operator = self.parse_operator()?;
        let value = if matches!(operator, Operator::In | Operator::NotIn) {
            self.parse_value_list()?
        } else {
            let token = self.expect_value_token()?;
            coerce_scalar(field, &token)
        };

        Ok(FilterCondition::new(field, operator, value))
    }

    fn parse_field(&mut self) -> FilterResult<Field> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Field => {
                self.advance();
                token
                    .text
                    .parse::<Field>()
                    .map_err(|_| self.error(format!("Unknown field '{}'", token.text), token.position))
            }
            TokenKind::Str => Err(self.error(
                format!("Unknown field '{}'", token.text),
                token.position,
            )),
            _ => Err(self.error("Expected field name", token.position)),
        }
    }

    fn parse_operator(&mut self) -> FilterResult<Operator> {
        let token = self.peek().clone();
        if token.kind != TokenKind::Operator {
            return Err(self.error("Expected operator", token.position));
        }
        self.advance();
        token
            .text
            .parse::<Operator>()
            .map_err(|_| self.error(format!("Unknown operator '{}'", token.text), token.position))
    }

    /// Consumes one scalar value token.
    fn expect_value_token(&mut self) -> FilterResult<Token> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Str | TokenKind::Number | TokenKind::Boolean | TokenKind::Field => {
                // A field name in value position is just a bare string.
                self.advance();
                Ok(token)
            }
            _ => Err(self.error("Expected value", token.position)),
        }
    }

    /// Parses a comma-separated run of scalar values for `in` / `not in`.
    /// The run is homogeneous: if every item is a numeric literal the list
    /// coerces to numbers, otherwise every item is kept as a string.
    fn parse_value_list(&mut self) -> FilterResult<Value> {
        let mut items = vec![self.expect_value_token()?];

        while self.at(TokenKind::Comma) {
            self.advance();
            items.push(self.expect_value_token()?);
        }

        let numbers: Option<Vec<f64>> = items
            .iter()
            .map(|t| {
                if t.kind == TokenKind::Number {
                    parse_finite_number(&t.text)
                } else {
                    None
                }
            })
            .collect();

        Ok(match numbers {
            Some(ns) => Value::NumberList(ns),
            None => Value::StrList(items.into_iter().map(|t| t.text).collect()),
        })
    }
}

/// Parses a numeric literal, rejecting values that overflow `f64` to
/// infinity. An overflowing literal stays a string so every `Value::Number`
/// renders back to a re-parseable token.
fn parse_finite_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn logical_op_from(token: &Token) -> LogicalOp {
    if token.text == "||" {
        LogicalOp::Or
    } else {
        LogicalOp::And
    }
}

/// Applies parse-time coercion: boolean fields coerce `true`/`false`
/// (quoted or bare) to booleans, numeric fields coerce numeric strings to
/// numbers. Everything else keeps the token's natural type.
fn coerce_scalar(field: Field, token: &Token) -> Value {
    use crate::ast::FieldType;

    match field.field_type() {
        FieldType::Boolean => {
            if token.text.eq_ignore_ascii_case("true") {
                return Value::Bool(true);
            }
            if token.text.eq_ignore_ascii_case("false") {
                return Value::Bool(false);
            }
        }
        FieldType::Number => {
            if lexer::is_numeric_literal(&token.text) {
                if let Some(n) = parse_finite_number(&token.text) {
                    return Value::Number(n);
                }
            }
        }
        _ => {}
    }

    match token.kind {
        TokenKind::Number => parse_finite_number(&token.text)
            .map(Value::Number)
            .unwrap_or_else(|| Value::Str(token.text.clone())),
        TokenKind::Boolean => Value::Bool(token.text.eq_ignore_ascii_case("true")),
        _ => Value::Str(token.text.clone()),
    }
}
