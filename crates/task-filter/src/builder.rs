//! Programmatic construction of filter expressions.
//!
//! The builder produces the same [`FilterExpression`] values the parser
//! does, so a built expression can go straight to validation, evaluation,
//! or canonical rendering without ever existing as text.
//!
//! # Example
//!
//! ```
//! use task_filter_rs::{Field, FilterBuilder, LogicalOp, Operator, Value};
//!
//! let expr = FilterBuilder::new()
//!     .where_(Field::Done, Operator::Eq, Value::Bool(false))
//!     .and()
//!     .where_(Field::Priority, Operator::Gte, Value::Number(3.0))
//!     .group(LogicalOp::Or)
//!     .where_(Field::DueDate, Operator::Lt, Value::str("now+7d"))
//!     .build();
//!
//! assert_eq!(
//!     expr.to_string(),
//!     "(done = false && priority >= 3) || (dueDate < \"now+7d\")"
//! );
//! ```

use crate::ast::{Field, FilterCondition, FilterExpression, FilterGroup, LogicalOp, Operator, Value};

/// Builder for [`FilterExpression`] values.
///
/// Conditions added with [`where_`](Self::where_) accumulate into the
/// current group; [`and`](Self::and) / [`or`](Self::or) choose the operator
/// joining them; [`group`](Self::group) closes the current group and starts
/// the next, with its argument becoming the expression-level operator.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    groups: Vec<FilterGroup>,
    current: Vec<FilterCondition>,
    current_op: Option<LogicalOp>,
    expression_op: Option<LogicalOp>,
}

impl FilterBuilder {
    /// Creates an empty builder. Building without adding conditions yields
    /// the empty (match-everything) expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition to the current group.
    pub fn where_(mut self, field: Field, operator: Operator, value: Value) -> Self {
        self.current.push(FilterCondition::new(field, operator, value));
        self
    }

    /// Joins the current group's conditions with `&&`.
    pub fn and(mut self) -> Self {
        self.current_op = Some(LogicalOp::And);
        self
    }

    /// Joins the current group's conditions with `||`.
    pub fn or(mut self) -> Self {
        self.current_op = Some(LogicalOp::Or);
        self
    }

    /// Closes the current group and starts a new one, joined to the
    /// previous groups by `operator`.
    pub fn group(mut self, operator: LogicalOp) -> Self {
        self.flush();
        self.expression_op = Some(operator);
        self
    }

    /// Builds the expression.
    pub fn build(mut self) -> FilterExpression {
        self.flush();
        FilterExpression::new(
            self.expression_op.unwrap_or(LogicalOp::And),
            self.groups,
        )
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let conditions = std::mem::take(&mut self.current);
        let operator = self.current_op.take().unwrap_or(LogicalOp::And);
        self.groups.push(FilterGroup::new(operator, conditions));
    }
}
