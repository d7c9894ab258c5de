//! Row predicates as plain data.
//!
//! A [`Predicate`] is an ordered conjunction of [`Condition`]s. The command
//! parser produces the same value that direct API callers build by hand, so
//! a predicate can be inspected, compared and logged.

use std::fmt;

use super::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Exact, case-sensitive string equality.
    Eq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub op: Op,
    pub value: String,
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: Op::Eq,
            value: value.into(),
        }
    }

    /// A row that does not hold `column` never matches.
    pub fn matches(&self, row: &Row) -> bool {
        match self.op {
            Op::Eq => row.get(&self.column) == Some(self.value.as_str()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::Eq => write!(f, "{}={}", self.column, self.value),
        }
    }
}

/// Conjunction of conditions. The empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::all().and_eq(column, value)
    }

    pub fn and_eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::eq(column, value));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            conditions: iter
                .into_iter()
                .map(|(column, value)| Condition::eq(column, value))
                .collect(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return f.write_str("<all>");
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}
