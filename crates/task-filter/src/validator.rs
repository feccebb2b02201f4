//! Semantic validation of filter ASTs.
//!
//! Validation is independent of parsing: an expression built
//! programmatically (for example with [`crate::FilterBuilder`]) can be
//! validated without going through the tokenizer. Checks cover
//! field/operator compatibility, value typing, and complexity limits.

use crate::ast::{FieldType, FilterCondition, FilterExpression, Operator, Value};
use crate::relative_date::parse_relative_date;

/// Complexity limits for [`validate_filter_expression`].
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Hard cap on the total condition count; exceeding it fails
    /// validation.
    pub max_conditions: usize,
    /// Soft threshold above which a performance warning is attached
    /// without failing validation.
    pub warn_threshold: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_conditions: 50,
            warn_threshold: 10,
        }
    }
}

/// Outcome of validating a whole expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// True when no errors were found. Warnings do not affect validity.
    pub valid: bool,
    /// Human-readable problems, each prefixed with its group/condition
    /// location.
    pub errors: Vec<String>,
    /// Non-fatal advisories (currently only the complexity warning).
    pub warnings: Vec<String>,
}

/// Validates a single condition, returning a list of problems
/// (empty = valid).
pub fn validate_condition(condition: &FilterCondition) -> Vec<String> {
    let mut errors = Vec::new();
    let field = condition.field;
    let op = condition.operator;

    match field.field_type() {
        FieldType::Boolean => {
            if !matches!(op, Operator::Eq | Operator::Neq) {
                errors.push(format!(
                    "field '{}' supports only = and !=, got '{}'",
                    field, op
                ));
            }
            if !is_boolean_value(&condition.value) {
                errors.push(format!("field '{}' requires a boolean value", field));
            }
        }
        FieldType::Number => {
            if !op.is_comparison() {
                errors.push(format!(
                    "field '{}' does not support the '{}' operator",
                    field, op
                ));
            }
            if !is_numeric_value(&condition.value) {
                errors.push(format!("field '{}' requires a numeric value", field));
            }
        }
        FieldType::Date => {
            if !op.is_comparison() {
                errors.push(format!(
                    "field '{}' does not support the '{}' operator",
                    field, op
                ));
            }
            match &condition.value {
                Value::Str(literal) => {
                    if parse_relative_date(literal).is_none() {
                        errors.push(format!(
                            "field '{}' has an unresolvable date literal '{}'",
                            field, literal
                        ));
                    }
                }
                _ => errors.push(format!(
                    "field '{}' requires a date string (absolute or relative)",
                    field
                )),
            }
        }
        FieldType::Array => {
            if !matches!(op, Operator::In | Operator::NotIn) {
                errors.push(format!(
                    "field '{}' supports only 'in' and 'not in', got '{}'",
                    field, op
                ));
            }
            if matches!(condition.value, Value::Bool(_)) {
                errors.push(format!(
                    "field '{}' requires a list of values or a single scalar",
                    field
                ));
            }
        }
        FieldType::Text => {
            if !matches!(op, Operator::Eq | Operator::Neq | Operator::Like) {
                errors.push(format!(
                    "field '{}' supports only =, != and like, got '{}'",
                    field, op
                ));
            }
            if !matches!(condition.value, Value::Str(_)) {
                errors.push(format!("field '{}' requires a string value", field));
            }
        }
    }

    errors
}

/// Validates an expression against the schema rules and complexity limits.
///
/// Per-condition problems are prefixed with their group and condition
/// index (1-based) so callers can point at the offending clause. An empty
/// group is an error; an expression with no groups at all is valid (it is
/// the match-everything identity).
pub fn validate_filter_expression(
    expression: &FilterExpression,
    options: &ValidationOptions,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (gi, group) in expression.groups.iter().enumerate() {
        if group.conditions.is_empty() {
            errors.push(format!("group {}: empty group", gi + 1));
            continue;
        }
        for (ci, condition) in group.conditions.iter().enumerate() {
            for problem in validate_condition(condition) {
                errors.push(format!("group {}, condition {}: {}", gi + 1, ci + 1, problem));
            }
        }
    }

    let total = expression.condition_count();
    if total > options.max_conditions {
        errors.push(format!(
            "too many conditions: {} (maximum {})",
            total, options.max_conditions
        ));
    } else if total > options.warn_threshold {
        warnings.push(format!(
            "filter has {} conditions and may be slow to evaluate",
            total
        ));
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Booleans may arrive as `true`/`false` strings from permissive parsing.
fn is_boolean_value(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Str(s) => s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"),
        _ => false,
    }
}

fn is_numeric_value(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::Str(s) => crate::lexer::is_numeric_literal(s),
        _ => false,
    }
}
