//! The statement compiler.

use std::sync::Arc;

use tracing::debug;

use super::{render_select, resolve_source, DeleteStatement, InsertStatement, SelectQuery, UpdateStatement};
use crate::config::Settings;
use crate::context::{AliasMode, CompositionContext};
use crate::dialect::{Dialect, GeneratedKeys};
use crate::error::SqlResult;
use crate::mapping::DataModel;
use crate::projection::{ProjectedColumn, ResultConverter};
use crate::resolve::ResolverRegistry;
use crate::statement::{prepare, SqlStatement};
use crate::types::{SqlType, TypeConverter, ValueCodec};

/// A compiled SELECT with its result contract.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub statement: SqlStatement,
    /// SELECT list in order; empty for `SELECT *`.
    pub columns: Vec<ProjectedColumn>,
    pub converter: Option<Arc<dyn ResultConverter>>,
}

/// A compiled INSERT with the way to fetch generated keys.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledInsert {
    pub statement: SqlStatement,
    pub generated_keys: GeneratedKeys,
}

/// Compiles statements for one dialect.
///
/// Every compilation gets its own root context.
#[derive(Debug, Clone)]
pub struct Compiler {
    dialect: Arc<Dialect>,
    alias_mode: AliasMode,
    registry: Option<Arc<ResolverRegistry>>,
    data_model: Option<Arc<dyn DataModel>>,
    null_type: Option<SqlType>,
}

impl Compiler {
    pub fn new(dialect: Arc<Dialect>) -> Self {
        Self {
            dialect,
            alias_mode: AliasMode::Default,
            registry: None,
            data_model: None,
            null_type: None,
        }
    }

    /// Build a compiler from settings, seeding static capabilities if any are
    /// configured.
    pub fn from_settings(settings: &Settings) -> SqlResult<Self> {
        let kind = settings.dialect_kind()?;
        let dialect = match settings.database_info()? {
            Some(info) => Dialect::with_info(kind, info),
            None => Dialect::new(kind),
        };
        debug!(dialect = %kind, alias_mode = ?settings.compiler.alias_mode, "compiler configured");
        Ok(Self {
            null_type: settings.null_type(),
            ..Self::new(Arc::new(dialect)).with_alias_mode(settings.compiler.alias_mode)
        })
    }

    pub fn with_alias_mode(mut self, alias_mode: AliasMode) -> Self {
        self.alias_mode = alias_mode;
        self
    }

    /// Replace the dialect's registry.
    pub fn with_registry(mut self, registry: Arc<ResolverRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_data_model(mut self, data_model: Arc<dyn DataModel>) -> Self {
        self.data_model = Some(data_model);
        self
    }

    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    pub fn alias_mode(&self) -> AliasMode {
        self.alias_mode
    }

    /// Value codec for the dialect.
    pub fn codec(&self) -> ValueCodec<'_> {
        ValueCodec::new(&self.dialect)
    }

    /// Type converter for binding, with any configured NULL type.
    pub fn type_converter(&self) -> TypeConverter<'_> {
        let converter = TypeConverter::new(&self.dialect);
        match &self.null_type {
            Some(ty) => converter.with_null_type(ty.clone()),
            None => converter,
        }
    }

    /// A fresh root context for one statement.
    pub fn context(&self) -> CompositionContext<'static> {
        let mut ctx =
            CompositionContext::root(Arc::clone(&self.dialect)).with_alias_mode(self.alias_mode);
        if let Some(registry) = &self.registry {
            ctx = ctx.with_registry(Arc::clone(registry));
        }
        if let Some(model) = &self.data_model {
            ctx = ctx.with_data_model(Arc::clone(model));
        }
        ctx
    }

    pub fn compile_select(&self, query: &SelectQuery) -> SqlResult<CompiledQuery> {
        let ctx = self.context();
        let target = resolve_source(query, &ctx)?;
        ctx.seed_target(&target);
        let rendered = render_select(query, &target, &ctx)?;
        Ok(CompiledQuery {
            statement: prepare(&rendered.sql, &ctx)?,
            columns: rendered.columns,
            converter: query.projection.as_ref().and_then(|p| p.converter().cloned()),
        })
    }

    pub fn compile_insert(&self, insert: &InsertStatement) -> SqlResult<CompiledInsert> {
        let ctx = self.context();
        let sql = insert.render(&ctx)?;
        let keys: Vec<&str> = insert.generated_keys.iter().map(String::as_str).collect();
        Ok(CompiledInsert {
            statement: prepare(&sql, &ctx)?,
            generated_keys: self.dialect.generated_keys(&keys),
        })
    }

    pub fn compile_update(&self, update: &UpdateStatement) -> SqlResult<SqlStatement> {
        let ctx = self.context();
        let sql = update.render(&ctx)?;
        prepare(&sql, &ctx)
    }

    pub fn compile_delete(&self, delete: &DeleteStatement) -> SqlResult<SqlStatement> {
        let ctx = self.context();
        let sql = delete.render(&ctx)?;
        prepare(&sql, &ctx)
    }
}
