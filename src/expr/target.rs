//! Statement targets: logical entities, physical tables and their joins.

use super::filter::Filter;
use crate::error::{SqlError, SqlResult};

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL OUTER JOIN",
        }
    }
}

/// A join hanging off a statement target.
///
/// `name` is the path segment other expressions use to reach the joined
/// source (`address` in `address.city`); `source` is the table, or the entity
/// when the owning target is a [`DataTarget`].
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub name: String,
    pub source: String,
    pub alias: Option<String>,
    pub on: Option<Filter>,
    /// Entity the join was mapped from, when it came from a [`DataTarget`].
    pub entity: Option<String>,
}

impl Join {
    pub fn new(join_type: JoinType, name: &str, source: &str) -> Self {
        Self {
            join_type,
            name: name.into(),
            source: source.into(),
            alias: None,
            on: None,
            entity: None,
        }
    }

    pub fn inner(name: &str, source: &str) -> Self {
        Self::new(JoinType::Inner, name, source)
    }

    pub fn left(name: &str, source: &str) -> Self {
        Self::new(JoinType::Left, name, source)
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn on(mut self, condition: Filter) -> Self {
        self.on = Some(condition);
        self
    }

    pub fn validate(&self) -> SqlResult<()> {
        if self.name.trim().is_empty() {
            return Err(SqlError::invalid("join name must not be empty"));
        }
        if self.source.trim().is_empty() {
            return Err(SqlError::invalid(format!(
                "join '{}' has no source",
                self.name
            )));
        }
        match &self.on {
            Some(on) => on.validate(),
            None => Ok(()),
        }
    }
}

/// A physical table with optional schema, alias and ordered joins.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct RelationalTarget {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
    pub joins: Vec<Join>,
    /// Entity this table was mapped from, when it came from a [`DataTarget`].
    pub entity: Option<String>,
}

impl RelationalTarget {
    pub fn new(table: &str) -> Self {
        Self {
            schema: None,
            table: table.into(),
            alias: None,
            joins: Vec::new(),
            entity: None,
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn validate(&self) -> SqlResult<()> {
        if self.table.trim().is_empty() {
            return Err(SqlError::invalid("relational target has no table"));
        }
        self.joins.iter().try_for_each(Join::validate)
    }
}

/// A logical entity, mapped to a table through the data model.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct DataTarget {
    pub entity: String,
    pub alias: Option<String>,
    pub joins: Vec<Join>,
}

impl DataTarget {
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.into(),
            alias: None,
            joins: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn validate(&self) -> SqlResult<()> {
        if self.entity.trim().is_empty() {
            return Err(SqlError::invalid("data target has no entity"));
        }
        self.joins.iter().try_for_each(Join::validate)
    }
}
