//! Security-hardened filter expression engine for task records.
//!
//! This crate parses, validates, renders, and evaluates a small query
//! language for selecting tasks by boolean, numeric, date, string, and
//! array predicates. It is a pure in-process library: no persistence, no
//! network I/O, no shared state between calls.
//!
//! # Supported Syntax
//!
//! ## Conditions
//! - `field operator value`, e.g. `done = false`, `priority >= 3`,
//!   `title like "%report%"`, `labels in urgent, blocked`
//!
//! ## Fields
//! - `done` (boolean), `priority` / `percentDone` (number),
//!   `dueDate` / `created` / `updated` (date),
//!   `assignees` / `labels` (array), `title` / `description` (text)
//!
//! ## Operators
//! - `=`, `!=`, `>`, `>=`, `<`, `<=`, `like`, `in`, `not in`
//!
//! ## Dates
//! - Absolute: `2024-01-15`, `2024-01-15T10:30:00Z`
//! - Relative: `now`, `now+7d`, `now-2w`, `now+3M` (`m` minutes, `M` months)
//!
//! ## Combining
//! - `&&` (AND), `||` (OR), parentheses for grouping:
//!   `(done = false && priority > 3) || (dueDate < now+7d)`
//!
//! There is no operator precedence: the first logical operator seen at each
//! level fixes how that level combines, and grouping is a single flat level
//! of parentheses.
//!
//! # Example
//!
//! ```
//! use task_filter_rs::{apply_filter, parse_filter_string, Task};
//!
//! let expr = parse_filter_string("done = false && priority >= 3").unwrap();
//!
//! let tasks = vec![
//!     Task { done: false, priority: Some(5.0), ..Task::default() },
//!     Task { done: true, priority: Some(5.0), ..Task::default() },
//! ];
//!
//! let matching = apply_filter(&tasks, &expr);
//! assert_eq!(matching.len(), 1);
//!
//! // Round-trip through the canonical form
//! let rendered = expr.to_string();
//! assert_eq!(parse_filter_string(&rendered).unwrap(), expr);
//! ```

pub mod ast;
pub mod builder;
mod display;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod relative_date;
pub mod security;
pub mod validator;

pub use ast::{
    Field, FieldType, FilterCondition, FilterExpression, FilterGroup, LogicalOp, Operator, Value,
};
pub use builder::FilterBuilder;
pub use error::{FilterError, FilterResult};
pub use evaluator::{apply_filter, matches, Task};
pub use lexer::{Token, TokenKind};
pub use parser::parse_filter_string;
pub use relative_date::parse_relative_date;
pub use security::MAX_FILTER_LENGTH;
pub use validator::{
    validate_condition, validate_filter_expression, ValidationOptions, ValidationReport,
};
