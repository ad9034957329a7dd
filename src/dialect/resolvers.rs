//! Dialect-specific resolvers layered over the default registry.
//!
//! Both run at bind time (`Parameter` to `Bindable`) ahead of the default
//! resolver and decline anything they do not rewrite.

use crate::context::CompositionContext;
use crate::error::SqlResult;
use crate::expr::{Expression, ExpressionKind, LogicalType, Value};
use crate::resolve::{BoundParameter, Resolved, Resolver, TargetType};
use crate::statement::SqlParameter;
use crate::types::iso_temporal_text;

const PRIORITY: i32 = 10;

fn bound(parameter: SqlParameter) -> Resolved {
    Resolved::Bindable(BoundParameter {
        marker: parameter.bind_marker(),
        parameter,
    })
}

/// Materializes character-stream parameters into strings for drivers that
/// cannot bind readers.
#[derive(Debug, Clone, Copy)]
pub struct CharacterStreamResolver;

impl Resolver for CharacterStreamResolver {
    fn name(&self) -> &'static str {
        "character-stream"
    }

    fn accepts(&self) -> ExpressionKind {
        ExpressionKind::Parameter
    }

    fn target(&self) -> TargetType {
        TargetType::Bindable
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn resolve(&self, expr: &Expression, _ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
        let Expression::Parameter(parameter) = expr else {
            return Ok(None);
        };
        let Value::CharStream(stream) = parameter.value() else {
            return Ok(None);
        };
        let text = stream.read_string()?;
        let parameter = parameter
            .clone()
            .with_value(Value::String(text), Some(LogicalType::String));
        Ok(Some(bound(parameter)))
    }
}

/// Binds temporal values as ISO text, for databases without temporal types.
#[derive(Debug, Clone, Copy)]
pub struct TemporalTextResolver;

impl Resolver for TemporalTextResolver {
    fn name(&self) -> &'static str {
        "temporal-text"
    }

    fn accepts(&self) -> ExpressionKind {
        ExpressionKind::Parameter
    }

    fn target(&self) -> TargetType {
        TargetType::Bindable
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn resolve(&self, expr: &Expression, _ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
        let Expression::Parameter(parameter) = expr else {
            return Ok(None);
        };
        let Some(text) = iso_temporal_text(parameter.value()) else {
            return Ok(None);
        };
        let parameter = parameter
            .clone()
            .with_value(Value::String(text), Some(LogicalType::String));
        Ok(Some(bound(parameter)))
    }
}
