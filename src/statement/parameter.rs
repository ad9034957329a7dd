//! Bound parameters.

use std::fmt;
use std::sync::Arc;

use crate::error::{SqlError, SqlResult};
use crate::expr::{LogicalType, TemporalKind, Value};

type RenderFn = dyn Fn(&str) -> String + Send + Sync;

/// Wraps a parameter's bind marker in SQL, e.g. `CAST(? AS DATE)`.
#[derive(Clone)]
pub struct ParameterRenderer {
    name: &'static str,
    render: Arc<RenderFn>,
}

impl ParameterRenderer {
    pub fn new(name: &'static str, render: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            name,
            render: Arc::new(render),
        }
    }

    /// Replace every `?` in `template` with the bind marker.
    pub fn template(template: &'static str) -> Self {
        Self::new(template, move |marker| template.replace('?', marker))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn render(&self, marker: &str) -> String {
        (self.render)(marker)
    }
}

impl PartialEq for ParameterRenderer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for ParameterRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParameterRenderer").field(&self.name).finish()
    }
}

/// A value to bind, with the type information the executor needs.
///
/// Immutable once built; the builder methods consume and return a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParameter {
    value: Value,
    logical_type: Option<LogicalType>,
    temporal: Option<TemporalKind>,
    renderer: Option<ParameterRenderer>,
}

impl SqlParameter {
    /// A parameter whose logical type is inferred from the value.
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        let logical_type = value.logical_type();
        Self {
            value,
            logical_type,
            temporal: None,
            renderer: None,
        }
    }

    /// A parameter with an explicit logical type (required for typed NULLs).
    pub fn typed(value: impl Into<Value>, logical_type: LogicalType) -> Self {
        Self {
            value: value.into(),
            logical_type: Some(logical_type),
            temporal: None,
            renderer: None,
        }
    }

    pub fn with_temporal(mut self, kind: TemporalKind) -> Self {
        self.temporal = Some(kind);
        if self.logical_type.is_none() {
            self.logical_type = Some(kind.logical_type());
        }
        self
    }

    pub fn with_renderer(mut self, renderer: ParameterRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// The same parameter carrying a different value and type.
    pub fn with_value(mut self, value: Value, logical_type: Option<LogicalType>) -> Self {
        self.value = value;
        self.logical_type = logical_type;
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn logical_type(&self) -> Option<&LogicalType> {
        self.logical_type.as_ref()
    }

    pub fn temporal(&self) -> Option<TemporalKind> {
        self.temporal
    }

    pub fn renderer(&self) -> Option<&ParameterRenderer> {
        self.renderer.as_ref()
    }

    /// SQL text standing in for this parameter at its bind position.
    pub fn bind_marker(&self) -> String {
        match &self.renderer {
            Some(renderer) => renderer.render("?"),
            None => "?".to_string(),
        }
    }

    pub fn validate(&self) -> SqlResult<()> {
        if let Value::List(_) = self.value {
            return Err(SqlError::invalid(
                "a list cannot be bound as a single parameter",
            ));
        }
        match &self.logical_type {
            Some(ty) if !self.value.is_assignable_to(ty) => Err(SqlError::invalid(format!(
                "parameter value of type {} does not match declared type {:?}",
                self.value.type_name(),
                ty
            ))),
            _ => Ok(()),
        }
    }
}
