//! Canonical rendering of filter ASTs back to filter text.
//!
//! The rendered form is canonical, not source-preserving: redundant
//! whitespace is normalized away and string values are always quoted. The
//! invariant that matters is the round trip — re-parsing the canonical form
//! of any parse-produced AST yields an equal AST.
//!
//! A single-condition group renders bare only when it is the sole group of
//! its expression; in a multi-group expression every group is
//! parenthesized, so group boundaries survive re-parsing.

use std::fmt;

use crate::ast::{FilterCondition, FilterExpression, FilterGroup, Value};

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write_quoted(f, s),
            Value::StrList(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, item)?;
                }
                Ok(())
            }
            Value::NumberList(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        f.write_fmt(format_args!("{}", c))?;
    }
    f.write_str("\"")
}

impl fmt::Display for FilterCondition {
    /// Renders `field operator value`, e.g. `dueDate < "now+7d"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

impl fmt::Display for FilterGroup {
    /// Renders the group on its own: parenthesized when it has multiple
    /// conditions, bare otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_group(f, self, self.conditions.len() > 1)
    }
}

fn fmt_group(f: &mut fmt::Formatter<'_>, group: &FilterGroup, parens: bool) -> fmt::Result {
    if parens {
        f.write_str("(")?;
    }
    for (i, condition) in group.conditions.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", group.operator)?;
        }
        write!(f, "{}", condition)?;
    }
    if parens {
        f.write_str(")")?;
    }
    Ok(())
}

impl fmt::Display for FilterExpression {
    /// Renders the canonical textual form. The empty expression renders as
    /// the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.groups.len() {
            0 => Ok(()),
            1 => fmt_group(f, &self.groups[0], self.groups[0].conditions.len() > 1),
            _ => {
                for (i, group) in self.groups.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", self.operator)?;
                    }
                    fmt_group(f, group, true)?;
                }
                Ok(())
            }
        }
    }
}
