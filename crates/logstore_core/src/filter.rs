//! Structured record filters.
//!
//! The raw query operations take a SQL fragment that is pasted verbatim
//! into the statement. [`Filter`] is the bound-parameter alternative: each
//! [`Predicate`] names a column, a comparison and a value, and compiles to
//! `where <column> <op> ?N` with the value bound, never interpolated.
//!
//! ```
//! use logstore_core::{Field, Filter, Op};
//!
//! let filter = Filter::new()
//!     .and(Field::Channel, Op::Eq, 1)
//!     .and(Field::Message, Op::Like, "%timeout%");
//! let (clause, values) = filter.compile();
//! assert_eq!(clause, "where channel = ?1 and msg like ?2");
//! assert_eq!(values.len(), 2);
//! ```

use rusqlite::types::Value as SqlValue;

/// A filterable record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Record id.
    Id,
    /// Source file.
    SourceFile,
    /// Source line.
    SourceLine,
    /// Thread tag.
    ThreadId,
    /// Seconds since the Unix epoch.
    TimestampSeconds,
    /// Channel tag.
    Channel,
    /// Application name.
    AppName,
    /// Machine name.
    MachineName,
    /// Message payload.
    Message,
}

impl Field {
    /// Column name in the log table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::SourceFile => "file",
            Self::SourceLine => "line",
            Self::ThreadId => "tid",
            Self::TimestampSeconds => "timestamp_a",
            Self::Channel => "channel",
            Self::AppName => "appName",
            Self::MachineName => "machineName",
            Self::Message => "msg",
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// SQL `like` pattern match.
    Like,
}

impl Op {
    const fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "like",
        }
    }
}

/// A literal compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer literal.
    Int(i64),
    /// Text literal.
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Value> for SqlValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Int(i) => SqlValue::Integer(i),
            Value::Text(s) => SqlValue::Text(s),
        }
    }
}

/// One `column op value` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Column to test.
    pub field: Field,
    /// Comparison.
    pub op: Op,
    /// Right-hand side.
    pub value: Value,
}

/// A conjunction of predicates plus an ordering by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
    newest_first: bool,
}

impl Filter {
    /// Creates a filter matching every record, oldest first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate; all predicates must hold.
    #[must_use]
    pub fn and(mut self, field: Field, op: Op, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            field,
            op,
            value: value.into(),
        });
        self
    }

    /// Matches records on one channel.
    #[must_use]
    pub fn channel(self, channel: i32) -> Self {
        self.and(Field::Channel, Op::Eq, channel)
    }

    /// Matches records stamped at or after `seconds` since the Unix epoch.
    #[must_use]
    pub fn since(self, seconds: i64) -> Self {
        self.and(Field::TimestampSeconds, Op::Ge, seconds)
    }

    /// Returns matches newest first instead of in insertion order.
    ///
    /// Without this, [`LogStore::find`](crate::LogStore::find) orders by
    /// ascending id, which is insertion order.
    #[must_use]
    pub const fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    /// Returns the ordering clause for selects.
    #[must_use]
    pub const fn order_by(&self) -> &'static str {
        if self.newest_first {
            "order by id desc"
        } else {
            "order by id"
        }
    }

    /// Compiles the predicates to a `where` clause and the values to bind,
    /// in placeholder order.
    ///
    /// The clause is empty for a filter with no predicates. Ordering is not
    /// part of it; see [`order_by`](Self::order_by).
    #[must_use]
    pub fn compile(&self) -> (String, Vec<SqlValue>) {
        let mut clause = String::new();
        let mut values = Vec::with_capacity(self.predicates.len());

        for (i, p) in self.predicates.iter().enumerate() {
            clause.push_str(if i == 0 { "where " } else { " and " });
            clause.push_str(p.field.column());
            clause.push(' ');
            clause.push_str(p.op.sql());
            clause.push_str(&format!(" ?{}", i + 1));
            values.push(p.value.clone().into());
        }

        (clause, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter() {
        let (clause, values) = Filter::new().compile();
        assert!(clause.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn conjunction() {
        let (clause, values) = Filter::new().channel(2).since(100).compile();
        assert_eq!(clause, "where channel = ?1 and timestamp_a >= ?2");
        assert_eq!(values, vec![SqlValue::Integer(2), SqlValue::Integer(100)]);
    }

    #[test]
    fn text_values_are_bound() {
        let (clause, values) = Filter::new()
            .and(Field::Message, Op::Eq, "x'; drop table logtable; --")
            .compile();
        assert_eq!(clause, "where msg = ?1");
        assert_eq!(
            values,
            vec![SqlValue::Text("x'; drop table logtable; --".into())]
        );
    }

    #[test]
    fn ordering_is_separate() {
        let filter = Filter::new().channel(1).newest_first();
        let (clause, _) = filter.compile();
        assert_eq!(clause, "where channel = ?1");
        assert_eq!(filter.order_by(), "order by id desc");
        assert_eq!(Filter::new().order_by(), "order by id");
    }
}
