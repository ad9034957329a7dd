//! Resolver registry.
//!
//! A [`Resolver`] turns one expression variant into one [`TargetType`]. The
//! [`ResolverRegistry`] keeps, per `(variant, target)` pair, a list sorted by
//! descending priority and returns the first resolver's non-empty answer.
//!
//! Resolution is recursive: a resolver may call back into the context for a
//! different target type (a `DataTarget` first becomes a `RelationalTarget`,
//! then SQL text). Every nested call goes through the same ordered lists, so
//! a dialect resolver registered at a higher priority wins at every level.
//!
//! ```text
//!   Expression ──► registry.resolve(expr, target, ctx)
//!                     │
//!                     ├─ resolvers[(kind, target)] sorted by priority desc
//!                     │     ├─ r1.resolve(..) -> None   (declined)
//!                     │     └─ r2.resolve(..) -> Some   (may recurse via ctx)
//!                     └─ exhausted -> UnresolvedExpression
//! ```
//!
//! The default registry is built once and shared read-only; dialects extend
//! it into a new registry rather than mutating it.

mod defaults;

pub use defaults::default_resolvers;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use tracing::{debug, trace};

use crate::context::CompositionContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expression, ExpressionKind, RelationalTarget, SqlExpression};
use crate::statement::SqlParameter;

// =============================================================================
// Targets
// =============================================================================

/// What an expression is being resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// A SQL fragment, possibly containing named placeholders.
    Sql,
    /// A physical table with joins.
    Relational,
    /// A typed parameter not yet placed in the statement.
    Parameter,
    /// The final positional form of a parameter.
    Bindable,
}

/// A parameter ready for positional binding.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    /// Text replacing the placeholder, `?` or a wrapper such as `CAST(? AS DATE)`.
    pub marker: String,
    pub parameter: SqlParameter,
}

/// The result of a resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Sql(String),
    Relational(RelationalTarget),
    Parameter(SqlParameter),
    Bindable(BoundParameter),
}

impl Resolved {
    pub fn target_type(&self) -> TargetType {
        match self {
            Resolved::Sql(_) => TargetType::Sql,
            Resolved::Relational(_) => TargetType::Relational,
            Resolved::Parameter(_) => TargetType::Parameter,
            Resolved::Bindable(_) => TargetType::Bindable,
        }
    }

    pub fn into_sql(self) -> SqlResult<String> {
        match self {
            Resolved::Sql(sql) => Ok(sql),
            other => Err(mismatch(TargetType::Sql, &other)),
        }
    }

    pub fn into_relational(self) -> SqlResult<RelationalTarget> {
        match self {
            Resolved::Relational(target) => Ok(target),
            other => Err(mismatch(TargetType::Relational, &other)),
        }
    }

    pub fn into_parameter(self) -> SqlResult<SqlParameter> {
        match self {
            Resolved::Parameter(parameter) => Ok(parameter),
            other => Err(mismatch(TargetType::Parameter, &other)),
        }
    }

    pub fn into_bindable(self) -> SqlResult<BoundParameter> {
        match self {
            Resolved::Bindable(bound) => Ok(bound),
            other => Err(mismatch(TargetType::Bindable, &other)),
        }
    }
}

fn mismatch(expected: TargetType, got: &Resolved) -> SqlError {
    SqlError::invalid(format!(
        "resolver returned {:?} where {:?} was expected",
        got.target_type(),
        expected
    ))
}

// =============================================================================
// Resolver trait
// =============================================================================

/// Translates one expression variant into one target type.
///
/// Returning `Ok(None)` declines and lets the next resolver try; an `Err`
/// aborts the whole statement.
pub trait Resolver: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// The expression variant this resolver handles.
    fn accepts(&self) -> ExpressionKind;

    fn target(&self) -> TargetType;

    /// Higher runs first. Defaults to 0.
    fn priority(&self) -> i32 {
        0
    }

    fn resolve(&self, expr: &Expression, ctx: &CompositionContext<'_>)
        -> SqlResult<Option<Resolved>>;
}

// =============================================================================
// Registry
// =============================================================================

type Key = (ExpressionKind, TargetType);

static DEFAULTS: LazyLock<Arc<ResolverRegistry>> = LazyLock::new(|| {
    Arc::new(default_resolvers().into_iter().fold(
        ResolverRegistry::new(),
        ResolverRegistry::register,
    ))
});

/// Priority-ordered resolver lists keyed by variant and target.
#[derive(Debug, Clone, Default)]
pub struct ResolverRegistry {
    table: HashMap<Key, Vec<Arc<dyn Resolver>>>,
}

impl ResolverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry holding the built-in resolvers.
    pub fn defaults() -> Arc<ResolverRegistry> {
        Arc::clone(&DEFAULTS)
    }

    /// Add a resolver. Among equal priorities, earlier registrations run first.
    pub fn register(mut self, resolver: Arc<dyn Resolver>) -> Self {
        let list = self
            .table
            .entry((resolver.accepts(), resolver.target()))
            .or_default();
        let at = list
            .iter()
            .position(|r| r.priority() < resolver.priority())
            .unwrap_or(list.len());
        list.insert(at, resolver);
        self
    }

    /// A copy of this registry with more resolvers layered on.
    pub fn extended(&self, extra: impl IntoIterator<Item = Arc<dyn Resolver>>) -> Self {
        extra.into_iter().fold(self.clone(), Self::register)
    }

    /// Resolvers tried for a pair, in order.
    pub fn resolvers_for(&self, kind: ExpressionKind, target: TargetType) -> &[Arc<dyn Resolver>] {
        self.table
            .get(&(kind, target))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve `expr` into `target`.
    ///
    /// The expression is validated first. SQL results are validated again
    /// before they are returned.
    pub fn resolve(
        &self,
        expr: &Expression,
        target: TargetType,
        ctx: &CompositionContext<'_>,
    ) -> SqlResult<Resolved> {
        expr.validate()?;
        let kind = expr.kind();
        for resolver in self.resolvers_for(kind, target) {
            trace!(resolver = resolver.name(), ?kind, ?target, "trying resolver");
            let Some(resolved) = resolver.resolve(expr, ctx)? else {
                continue;
            };
            if resolved.target_type() != target {
                return Err(mismatch(target, &resolved));
            }
            if let Resolved::Sql(sql) = &resolved {
                SqlExpression::new(sql).validate()?;
            }
            return Ok(resolved);
        }
        debug!(?kind, ?target, "no resolver matched");
        Err(SqlError::UnresolvedExpression { kind, target })
    }
}
