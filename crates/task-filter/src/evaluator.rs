//! Filter evaluation against in-memory task records.
//!
//! Evaluation is a pure, stateless pass over the tasks: no mutation, no
//! I/O, and no failure mode. Every data-shape problem (missing field,
//! unresolvable date, mismatched value type) resolves to a boolean via the
//! defensive rules below, so one malformed record can never abort filtering
//! of the rest of the batch.
//!
//! # Missing-field semantics
//!
//! - Scalar, text and `created`/`updated` fields: a missing value fails the
//!   condition for every operator.
//! - `dueDate` is the one asymmetry: a task with no due date satisfies
//!   `dueDate != x` for any `x` (it is "not equal to" every specific date)
//!   but fails every other operator. This mirrors the observed behavior of
//!   the original system and is pinned by tests; do not "fix" it.
//! - Array fields delegate empty-versus-empty handling to the intersection
//!   rule: `in` is true iff the sets intersect, `not in` iff they do not.

use serde::{Deserialize, Serialize};

use crate::ast::{Field, FilterCondition, FilterExpression, FilterGroup, LogicalOp, Operator, Value};
use crate::relative_date::parse_relative_date;

/// An in-memory task record, the unit of evaluation.
///
/// Field names and types follow the external task schema (camelCase JSON).
/// Optional fields model data that may be absent on a given record; the
/// evaluator's defensive rules decide what absence means per field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Completion flag.
    #[serde(default)]
    pub done: bool,
    /// Priority level.
    #[serde(default)]
    pub priority: Option<f64>,
    /// Completion percentage.
    #[serde(default)]
    pub percent_done: Option<f64>,
    /// Due date, as an ISO date or date-time string.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Assigned user IDs.
    #[serde(default)]
    pub assignees: Vec<String>,
    /// Label IDs.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Creation timestamp, as an ISO string.
    #[serde(default)]
    pub created: Option<String>,
    /// Last-update timestamp, as an ISO string.
    #[serde(default)]
    pub updated: Option<String>,
    /// Task title.
    #[serde(default)]
    pub title: Option<String>,
    /// Task description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Filters a slice of tasks, returning references to those that match.
///
/// An expression with no groups matches every task.
///
/// # Example
///
/// ```
/// use task_filter_rs::{apply_filter, parse_filter_string, Task};
///
/// let tasks = vec![
///     Task { priority: Some(5.0), ..Task::default() },
///     Task { priority: Some(1.0), ..Task::default() },
/// ];
/// let expr = parse_filter_string("priority > 3").unwrap();
/// assert_eq!(apply_filter(&tasks, &expr).len(), 1);
/// ```
pub fn apply_filter<'a>(tasks: &'a [Task], expression: &FilterExpression) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| matches(task, expression))
        .collect()
}

/// Returns true if a single task matches the expression.
pub fn matches(task: &Task, expression: &FilterExpression) -> bool {
    if expression.groups.is_empty() {
        return true;
    }
    match expression.operator {
        LogicalOp::And => expression.groups.iter().all(|g| evaluate_group(task, g)),
        LogicalOp::Or => expression.groups.iter().any(|g| evaluate_group(task, g)),
    }
}

/// Folds a group's conditions with its logical operator.
pub fn evaluate_group(task: &Task, group: &FilterGroup) -> bool {
    match group.operator {
        LogicalOp::And => group.conditions.iter().all(|c| evaluate_condition(task, c)),
        LogicalOp::Or => group.conditions.iter().any(|c| evaluate_condition(task, c)),
    }
}

/// Evaluates one condition against one task, dispatching on the field.
pub fn evaluate_condition(task: &Task, condition: &FilterCondition) -> bool {
    let op = condition.operator;
    let value = &condition.value;

    match condition.field {
        Field::Done => match boolean_operand(value) {
            Some(expected) => match op {
                Operator::Eq => task.done == expected,
                Operator::Neq => task.done != expected,
                _ => false,
            },
            None => false,
        },
        Field::Priority => evaluate_optional_number(task.priority, op, value),
        Field::PercentDone => evaluate_optional_number(task.percent_done, op, value),
        Field::DueDate => match &task.due_date {
            // The documented asymmetry: no due date is "not equal to" any date.
            None => op == Operator::Neq,
            Some(date) => evaluate_date_comparison(date, op, value),
        },
        Field::Created => match &task.created {
            None => false,
            Some(date) => evaluate_date_comparison(date, op, value),
        },
        Field::Updated => match &task.updated {
            None => false,
            Some(date) => evaluate_date_comparison(date, op, value),
        },
        Field::Title => match &task.title {
            None => false,
            Some(text) => evaluate_string_condition(text, op, value),
        },
        Field::Description => match &task.description {
            None => false,
            Some(text) => evaluate_string_condition(text, op, value),
        },
        Field::Assignees => evaluate_array_comparison(&task.assignees, op, &scalar_items(value)),
        Field::Labels => evaluate_array_comparison(&task.labels, op, &scalar_items(value)),
    }
}

/// Numeric comparison with the six ordering/equality operators. Any other
/// operator returns false rather than failing.
pub fn evaluate_comparison(a: f64, op: Operator, b: f64) -> bool {
    match op {
        Operator::Eq => a == b,
        Operator::Neq => a != b,
        Operator::Gt => a > b,
        Operator::Gte => a >= b,
        Operator::Lt => a < b,
        Operator::Lte => a <= b,
        _ => false,
    }
}

/// String comparison: exact `=`/`!=`, case-insensitive substring
/// containment for `like` (surrounding `%` wildcards are stripped).
pub fn evaluate_string_comparison(a: &str, op: Operator, b: &str) -> bool {
    match op {
        Operator::Eq => a == b,
        Operator::Neq => a != b,
        Operator::Like => {
            let needle = b.trim_matches('%').to_lowercase();
            a.to_lowercase().contains(&needle)
        }
        _ => false,
    }
}

/// Date comparison: resolves the filter literal through the relative date
/// resolver, parses the task's ISO value the same way, and compares
/// instants. Either side failing to resolve makes the condition false.
pub fn evaluate_date_comparison(task_date: &str, op: Operator, value: &Value) -> bool {
    let Value::Str(literal) = value else {
        return false;
    };
    let Some(rhs) = parse_relative_date(literal) else {
        return false;
    };
    let Some(lhs) = parse_relative_date(task_date) else {
        return false;
    };

    match op {
        Operator::Eq => lhs == rhs,
        Operator::Neq => lhs != rhs,
        Operator::Gt => lhs > rhs,
        Operator::Gte => lhs >= rhs,
        Operator::Lt => lhs < rhs,
        Operator::Lte => lhs <= rhs,
        _ => false,
    }
}

/// Array comparison on normalized string IDs: `in` is true iff the two
/// sets intersect, `not in` iff they do not. An empty side on either end
/// of `in` therefore fails, and an empty task-side makes `not in`
/// vacuously true.
pub fn evaluate_array_comparison(task_ids: &[String], op: Operator, filter_ids: &[String]) -> bool {
    let intersects = task_ids
        .iter()
        .any(|id| filter_ids.iter().any(|f| f == id));

    match op {
        Operator::In => intersects,
        Operator::NotIn => !intersects,
        _ => false,
    }
}

/// Extracts a boolean operand, accepting stringly `true`/`false` from
/// permissive parsing.
fn boolean_operand(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Str(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::Str(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Extracts a numeric operand where the value is numeric-looking.
fn numeric_operand(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Str(s) if crate::lexer::is_numeric_literal(s) => s.parse().ok(),
        _ => None,
    }
}

fn evaluate_optional_number(field_value: Option<f64>, op: Operator, value: &Value) -> bool {
    let (Some(a), Some(b)) = (field_value, numeric_operand(value)) else {
        return false;
    };
    evaluate_comparison(a, op, b)
}

fn evaluate_string_condition(text: &str, op: Operator, value: &Value) -> bool {
    match value {
        Value::Str(s) => evaluate_string_comparison(text, op, s),
        // A numeric literal against a text field compares textually.
        Value::Number(n) => evaluate_string_comparison(text, op, &n.to_string()),
        _ => false,
    }
}

/// Normalizes a filter value into a list of string IDs for array
/// comparison. A single scalar becomes a one-element list.
fn scalar_items(value: &Value) -> Vec<String> {
    match value {
        Value::StrList(items) => items.clone(),
        Value::NumberList(items) => items.iter().map(|n| n.to_string()).collect(),
        Value::Str(s) => vec![s.clone()],
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(_) => Vec::new(),
    }
}
