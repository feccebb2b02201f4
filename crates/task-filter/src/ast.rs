//! Abstract Syntax Tree (AST) for filter expressions.
//!
//! A filter is a flat, two-level tree: a [`FilterExpression`] joins one or
//! more [`FilterGroup`]s with a single logical operator, and each group joins
//! one or more [`FilterCondition`]s with its own logical operator. There is no
//! deeper nesting and no operator precedence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A filterable task field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Completion flag (boolean).
    Done,
    /// Priority level (number).
    Priority,
    /// Completion percentage (number).
    PercentDone,
    /// Due date (date).
    DueDate,
    /// Assigned user IDs (array).
    Assignees,
    /// Label IDs (array).
    Labels,
    /// Creation timestamp (date).
    Created,
    /// Last-update timestamp (date).
    Updated,
    /// Task title (text).
    Title,
    /// Task description (text).
    Description,
}

/// The value class a field accepts, used for operator/value compatibility
/// checks and evaluator dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Boolean fields (`done`).
    Boolean,
    /// Numeric fields (`priority`, `percentDone`).
    Number,
    /// Date fields (`dueDate`, `created`, `updated`).
    Date,
    /// Array fields (`assignees`, `labels`).
    Array,
    /// Text fields (`title`, `description`).
    Text,
}

impl Field {
    /// All recognized fields, in canonical order.
    pub const ALL: [Field; 10] = [
        Field::Done,
        Field::Priority,
        Field::PercentDone,
        Field::DueDate,
        Field::Assignees,
        Field::Labels,
        Field::Created,
        Field::Updated,
        Field::Title,
        Field::Description,
    ];

    /// Returns the canonical name of this field as it appears in filter text.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Field::Done => "done",
            Field::Priority => "priority",
            Field::PercentDone => "percentDone",
            Field::DueDate => "dueDate",
            Field::Assignees => "assignees",
            Field::Labels => "labels",
            Field::Created => "created",
            Field::Updated => "updated",
            Field::Title => "title",
            Field::Description => "description",
        }
    }

    /// Returns the value class this field accepts.
    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Done => FieldType::Boolean,
            Field::Priority | Field::PercentDone => FieldType::Number,
            Field::DueDate | Field::Created | Field::Updated => FieldType::Date,
            Field::Assignees | Field::Labels => FieldType::Array,
            Field::Title | Field::Description => FieldType::Text,
        }
    }
}

impl FromStr for Field {
    type Err = ();

    /// Field names are matched exactly; there are no aliases and no case
    /// folding, so `DueDate` is not a field.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.canonical_name() == s)
            .ok_or(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// `=`
    #[serde(rename = "=")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Neq,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    Gte,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    Lte,
    /// `like` — case-insensitive substring match.
    #[serde(rename = "like")]
    Like,
    /// `in` — set intersection.
    #[serde(rename = "in")]
    In,
    /// `not in` — empty set intersection.
    #[serde(rename = "not in")]
    NotIn,
}

impl Operator {
    /// Returns the canonical text of this operator.
    pub fn canonical_text(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "like",
            Operator::In => "in",
            Operator::NotIn => "not in",
        }
    }

    /// Returns true for the ordering/equality operators usable on numbers
    /// and dates.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::Neq
                | Operator::Gt
                | Operator::Gte
                | Operator::Lt
                | Operator::Lte
        )
    }
}

impl FromStr for Operator {
    type Err = ();

    /// Word operators (`like`, `in`, `not in`) match case-insensitively and
    /// with interior whitespace collapsed; symbol operators match exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        let normalized = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Neq),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            "like" => Ok(Operator::Like),
            "in" => Ok(Operator::In),
            "not in" => Ok(Operator::NotIn),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_text())
    }
}

/// A logical operator joining conditions within a group, or groups within
/// an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOp {
    /// `&&` — all operands must match.
    And,
    /// `||` — any operand may match.
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        })
    }
}

/// A condition value.
///
/// The parser is permissive about value typing and coerces where
/// unambiguous (see the parser docs); field/value compatibility is enforced
/// by the validator, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean literal.
    Bool(bool),
    /// A numeric literal.
    Number(f64),
    /// A string literal.
    Str(String),
    /// A homogeneous list of strings (for `in` / `not in`).
    StrList(Vec<String>),
    /// A homogeneous list of numbers (for `in` / `not in`).
    NumberList(Vec<f64>),
}

impl Value {
    /// Convenience constructor for string values.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }
}

/// A single `field operator value` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// The field being tested.
    pub field: Field,
    /// The comparison operator.
    pub operator: Operator,
    /// The value the field is compared against.
    pub value: Value,
}

impl FilterCondition {
    /// Creates a new condition.
    pub fn new(field: Field, operator: Operator, value: Value) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }
}

/// One clause of a filter: a run of conditions joined by a single logical
/// operator, written with or without parentheses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    /// The operator joining this group's conditions.
    pub operator: LogicalOp,
    /// The conditions; non-empty for any group produced by the parser.
    pub conditions: Vec<FilterCondition>,
}

impl FilterGroup {
    /// Creates a new group.
    pub fn new(operator: LogicalOp, conditions: Vec<FilterCondition>) -> Self {
        Self {
            operator,
            conditions,
        }
    }
}

/// The full filter: one or more groups joined by a top-level logical
/// operator.
///
/// An expression with no groups is the identity filter: the evaluator
/// treats it as matching every task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
    /// The operator joining the groups. Defaults to [`LogicalOp::And`] when
    /// no top-level operator appears in the source text.
    pub operator: LogicalOp,
    /// The groups making up the filter.
    pub groups: Vec<FilterGroup>,
}

impl FilterExpression {
    /// Creates a new expression.
    pub fn new(operator: LogicalOp, groups: Vec<FilterGroup>) -> Self {
        Self { operator, groups }
    }

    /// Creates the empty (match-everything) expression.
    pub fn empty() -> Self {
        Self {
            operator: LogicalOp::And,
            groups: Vec::new(),
        }
    }

    /// Returns true if this expression has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of conditions across all groups.
    pub fn condition_count(&self) -> usize {
        self.groups.iter().map(|g| g.conditions.len()).sum()
    }
}

impl Default for FilterExpression {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_str_exact_names() {
        assert_eq!("done".parse::<Field>(), Ok(Field::Done));
        assert_eq!("percentDone".parse::<Field>(), Ok(Field::PercentDone));
        assert_eq!("dueDate".parse::<Field>(), Ok(Field::DueDate));
        assert!("DueDate".parse::<Field>().is_err());
        assert!("duedate".parse::<Field>().is_err());
        assert!("project".parse::<Field>().is_err());
    }

    #[test]
    fn test_field_roundtrips_through_display() {
        for field in Field::ALL {
            assert_eq!(field.canonical_name().parse::<Field>(), Ok(field));
        }
    }

    #[test]
    fn test_field_types() {
        assert_eq!(Field::Done.field_type(), FieldType::Boolean);
        assert_eq!(Field::Priority.field_type(), FieldType::Number);
        assert_eq!(Field::PercentDone.field_type(), FieldType::Number);
        assert_eq!(Field::DueDate.field_type(), FieldType::Date);
        assert_eq!(Field::Created.field_type(), FieldType::Date);
        assert_eq!(Field::Updated.field_type(), FieldType::Date);
        assert_eq!(Field::Assignees.field_type(), FieldType::Array);
        assert_eq!(Field::Labels.field_type(), FieldType::Array);
        assert_eq!(Field::Title.field_type(), FieldType::Text);
        assert_eq!(Field::Description.field_type(), FieldType::Text);
    }

    #[test]
    fn test_operator_from_str_case_insensitive_words() {
        assert_eq!("like".parse::<Operator>(), Ok(Operator::Like));
        assert_eq!("LIKE".parse::<Operator>(), Ok(Operator::Like));
        assert_eq!("In".parse::<Operator>(), Ok(Operator::In));
        assert_eq!("not in".parse::<Operator>(), Ok(Operator::NotIn));
        assert_eq!("NOT  IN".parse::<Operator>(), Ok(Operator::NotIn));
        assert!("===".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(Operator::Gte.to_string(), ">=");
        assert_eq!(Operator::NotIn.to_string(), "not in");
    }

    #[test]
    fn test_logical_op_display() {
        assert_eq!(LogicalOp::And.to_string(), "&&");
        assert_eq!(LogicalOp::Or.to_string(), "||");
    }

    #[test]
    fn test_empty_expression() {
        let expr = FilterExpression::empty();
        assert!(expr.is_empty());
        assert_eq!(expr.operator, LogicalOp::And);
        assert_eq!(expr.condition_count(), 0);
    }

    #[test]
    fn test_condition_count() {
        let expr = FilterExpression::new(
            LogicalOp::Or,
            vec![
                FilterGroup::new(
                    LogicalOp::And,
                    vec![
                        FilterCondition::new(Field::Done, Operator::Eq, Value::Bool(false)),
                        FilterCondition::new(Field::Priority, Operator::Gt, Value::Number(3.0)),
                    ],
                ),
                FilterGroup::new(
                    LogicalOp::And,
                    vec![FilterCondition::new(
                        Field::Title,
                        Operator::Like,
                        Value::str("report"),
                    )],
                ),
            ],
        );
        assert_eq!(expr.condition_count(), 3);
    }

    #[test]
    fn test_value_serde_untagged() {
        let value: Value = serde_json::from_str("true").unwrap();
        assert_eq!(value, Value::Bool(true));

        let value: Value = serde_json::from_str("3.5").unwrap();
        assert_eq!(value, Value::Number(3.5));

        let value: Value = serde_json::from_str(r#"["user1","user2"]"#).unwrap();
        assert_eq!(
            value,
            Value::StrList(vec!["user1".to_string(), "user2".to_string()])
        );

        let value: Value = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(value, Value::NumberList(vec![1.0, 2.0]));
    }

    #[test]
    fn test_condition_serde_roundtrip() {
        let condition = FilterCondition::new(Field::DueDate, Operator::Lt, Value::str("now+7d"));
        let json = serde_json::to_string(&condition).unwrap();
        assert!(json.contains("\"dueDate\""));
        assert!(json.contains("\"<\""));

        let back: FilterCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, condition);
    }
}
