//! Projections and result conversion.
//!
//! A [`Projection`] is the ordered SELECT list. Rendering resolves each
//! selection and attaches a column alias according to the alias mode; under
//! [`AliasMode::Auto`] aliases come from a generator private to the
//! projection, numbered with the owning statement's sequence.
//!
//! The compiler stops at the rendered list. Executors feed raw rows back
//! through the projection's [`ResultConverter`].

use std::fmt;
use std::sync::Arc;

use crate::context::{AliasGenerator, AliasMode, CompositionContext};
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expression, IntoExpression, LogicalType, Value};
use crate::token::{Token, TokenStream};
use crate::types::ValueCodec;

// =============================================================================
// Selection list
// =============================================================================

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub expr: Expression,
    pub alias: Option<String>,
}

impl Selection {
    pub fn new(expr: impl IntoExpression) -> Self {
        Self {
            expr: expr.into_expression(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Explicit alias: the selection's own, else the alias on a path.
    fn explicit_alias(&self) -> Option<&str> {
        self.alias.as_deref().or(match &self.expr {
            Expression::Path(p) => p.alias(),
            _ => None,
        })
    }

    /// Name generated aliases are derived from.
    fn local_name(&self) -> String {
        match &self.expr {
            Expression::Path(p) => p.name().to_string(),
            Expression::Function(f) => f.kind.name().to_lowercase(),
            _ => "col".to_string(),
        }
    }

    fn validate(&self) -> SqlResult<()> {
        match &self.expr {
            Expression::Path(_)
            | Expression::Function(_)
            | Expression::Literal(_)
            | Expression::Parameter(_)
            | Expression::Sql(_)
            | Expression::Query(_) => self.expr.validate(),
            other => Err(SqlError::invalid(format!(
                "cannot select a {:?} expression",
                other.kind()
            ))),
        }
    }
}

/// A rendered SELECT list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedColumn {
    pub sql: String,
    pub alias: Option<String>,
}

impl ProjectedColumn {
    /// `sql AS alias`, or just `sql`.
    pub fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {alias}", self.sql),
            None => self.sql.clone(),
        }
    }
}

/// The ordered SELECT list with its result contract.
#[derive(Debug, Clone, Default)]
#[must_use = "builders have no effect until used"]
pub struct Projection {
    selections: Vec<Selection>,
    alias_mode: Option<AliasMode>,
    converter: Option<Arc<dyn ResultConverter>>,
}

impl Projection {
    pub fn new(selections: Vec<Selection>) -> Self {
        Self {
            selections,
            alias_mode: None,
            converter: None,
        }
    }

    /// A projection of plain expressions.
    pub fn of<I, E>(exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpression,
    {
        Self::new(exprs.into_iter().map(Selection::new).collect())
    }

    pub fn select(mut self, selection: Selection) -> Self {
        self.selections.push(selection);
        self
    }

    /// Override the context's alias mode for column aliases.
    pub fn with_alias_mode(mut self, mode: AliasMode) -> Self {
        self.alias_mode = Some(mode);
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn ResultConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn converter(&self) -> Option<&Arc<dyn ResultConverter>> {
        self.converter.as_ref()
    }

    pub fn validate(&self) -> SqlResult<()> {
        if self.selections.is_empty() {
            return Err(SqlError::invalid("projection has no selections"));
        }
        self.selections.iter().try_for_each(Selection::validate)
    }

    /// Resolve every selection and attach column aliases.
    pub fn render(&self, ctx: &CompositionContext<'_>) -> SqlResult<Vec<ProjectedColumn>> {
        self.validate()?;
        let mode = self.alias_mode.unwrap_or(ctx.alias_mode());
        let mut aliases = AliasGenerator::new();
        self.selections
            .iter()
            .map(|selection| {
                let mut sql = ctx.resolve_sql(&selection.expr)?;
                if let Expression::Query(_) = selection.expr {
                    sql = format!("({sql})");
                }
                let alias = match mode {
                    AliasMode::Unsupported => None,
                    AliasMode::Default => selection.explicit_alias().map(str::to_string),
                    AliasMode::Auto => Some(match selection.explicit_alias() {
                        Some(alias) => alias.to_string(),
                        None => aliases.next(&selection.local_name(), ctx.sequence()),
                    }),
                };
                Ok(ProjectedColumn { sql, alias })
            })
            .collect()
    }
}

impl PartialEq for Projection {
    fn eq(&self, other: &Self) -> bool {
        self.selections == other.selections
            && self.alias_mode == other.alias_mode
            && match (&self.converter, &other.converter) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Render a SELECT list, `*` when empty.
pub(crate) fn select_list(columns: &[ProjectedColumn]) -> TokenStream {
    let mut ts = TokenStream::new();
    if columns.is_empty() {
        ts.push(Token::Star);
    } else {
        ts.comma_separated(columns.iter().map(ProjectedColumn::to_sql));
    }
    ts
}

// =============================================================================
// Result conversion
// =============================================================================

/// One raw row as returned by a driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl ResultRow {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value by column label, case-insensitive.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))?;
        self.values.get(index)
    }
}

/// Turns a raw row into the caller's result shape.
pub trait ResultConverter: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn convert(&self, row: &ResultRow, codec: &ValueCodec<'_>) -> SqlResult<Value>;
}

/// First column, converted to one logical type.
#[derive(Debug, Clone)]
pub struct SingleValue(pub LogicalType);

impl ResultConverter for SingleValue {
    fn name(&self) -> &'static str {
        "single-value"
    }

    fn convert(&self, row: &ResultRow, codec: &ValueCodec<'_>) -> SqlResult<Value> {
        let raw = row
            .get(0)
            .cloned()
            .ok_or_else(|| SqlError::conversion("result row has no columns"))?;
        codec.deserialize(raw, &self.0)
    }
}

/// Every column converted positionally, returned as a list.
#[derive(Debug, Clone)]
pub struct RowValues(pub Vec<LogicalType>);

impl ResultConverter for RowValues {
    fn name(&self) -> &'static str {
        "row-values"
    }

    fn convert(&self, row: &ResultRow, codec: &ValueCodec<'_>) -> SqlResult<Value> {
        if row.len() != self.0.len() {
            return Err(SqlError::conversion(format!(
                "expected {} columns, row has {}",
                self.0.len(),
                row.len()
            )));
        }
        let values = self
            .0
            .iter()
            .zip(row.values.iter().cloned())
            .map(|(ty, raw)| codec.deserialize(raw, ty))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(Value::List(values))
    }
}
