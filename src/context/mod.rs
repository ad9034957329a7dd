//! Composition contexts.
//!
//! A context carries the compile-time state of one statement scope: the
//! dialect, the resolver registry, the shared named-parameter accumulator,
//! and a local table of source bindings with their aliases.
//!
//! Contexts form a tree rooted at one top-level statement. Children borrow
//! their parent, inherit its registry and share (never copy) its parameter
//! accumulator, so the whole tree emits one dense `:[NNNN]` sequence.
//!
//! Two kinds of scope exist:
//!
//! - [`ScopeKind::Statement`] owns a seeded target (the root statement or a
//!   sub-query). Lookups stop at its own table unless parent lookup is
//!   requested, which is how correlated sub-queries see outer aliases.
//! - [`ScopeKind::Query`] is a query-level helper scope without a target of
//!   its own; lookups always continue into its parent.
//!
//! A context's sequence number counts its ancestors of the same kind, so the
//! root is 0 and aliases generated in nested scopes never collide.

mod alias;
mod parameters;

pub use alias::{alias_prefix, format_alias, AliasGenerator, AliasMode, ALIAS_PREFIX_LEN};
pub use parameters::{
    parse_placeholder, placeholder_name, NamedParameters, MAX_PARAMETERS, PLACEHOLDER_WIDTH,
};

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::expr::{Expression, Path, RelationalTarget};
use crate::mapping::DataModel;
use crate::resolve::{Resolved, ResolverRegistry, TargetType};
use crate::statement::SqlParameter;

/// Key under which a context's own root target is bound.
pub const ROOT_KEY: &str = "";

/// Lookup chain a context belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Statement,
    Query,
}

/// A table source visible to paths in a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
    /// Entity the table was mapped from, used for column mapping.
    pub entity: Option<String>,
}

impl Binding {
    /// Prefix for qualified column references: the alias, else the table.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    /// `schema.table`, or just the table.
    pub fn qualified_table(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }
}

/// Hierarchical compile-time state for one statement scope.
pub struct CompositionContext<'p> {
    parent: Option<&'p CompositionContext<'p>>,
    scope: ScopeKind,
    alias_mode: AliasMode,
    sequence: u32,
    dialect: Arc<Dialect>,
    registry: Arc<ResolverRegistry>,
    data_model: Option<Arc<dyn DataModel>>,
    parameters: Arc<NamedParameters>,
    bindings: RefCell<HashMap<String, Binding>>,
    aliases: RefCell<AliasGenerator>,
}

impl CompositionContext<'static> {
    /// A root statement context using the dialect's registry.
    pub fn root(dialect: Arc<Dialect>) -> Self {
        let registry = dialect.registry();
        Self {
            parent: None,
            scope: ScopeKind::Statement,
            alias_mode: AliasMode::default(),
            sequence: 0,
            dialect,
            registry,
            data_model: None,
            parameters: Arc::new(NamedParameters::new()),
            bindings: RefCell::new(HashMap::new()),
            aliases: RefCell::new(AliasGenerator::new()),
        }
    }
}

impl<'p> CompositionContext<'p> {
    pub fn with_registry(mut self, registry: Arc<ResolverRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_data_model(mut self, data_model: Arc<dyn DataModel>) -> Self {
        self.data_model = Some(data_model);
        self
    }

    pub fn with_alias_mode(mut self, alias_mode: AliasMode) -> Self {
        self.alias_mode = alias_mode;
        self
    }

    fn child(&self, scope: ScopeKind) -> CompositionContext<'_> {
        CompositionContext {
            parent: Some(self),
            scope,
            alias_mode: self.alias_mode,
            sequence: self.count_ancestors(scope),
            dialect: Arc::clone(&self.dialect),
            registry: Arc::clone(&self.registry),
            data_model: self.data_model.clone(),
            parameters: Arc::clone(&self.parameters),
            bindings: RefCell::new(HashMap::new()),
            aliases: RefCell::new(AliasGenerator::new()),
        }
    }

    /// Number of contexts of `scope` kind from `self` up to the root.
    fn count_ancestors(&self, scope: ScopeKind) -> u32 {
        let mut count = 0;
        let mut current = Some(self);
        while let Some(ctx) = current {
            if ctx.scope == scope {
                count += 1;
            }
            current = ctx.parent;
        }
        count
    }

    /// A query-level child sharing registry and parameters.
    pub fn child_context(&self) -> CompositionContext<'_> {
        self.child(ScopeKind::Query)
    }

    /// A nested statement scope seeded with its own root target.
    pub fn statement_context(&self, target: &RelationalTarget) -> CompositionContext<'_> {
        let ctx = self.child(ScopeKind::Statement);
        ctx.seed_target(target);
        ctx
    }

    /// Bind a root target and its joins in this context.
    ///
    /// Re-seeding with the same table is a no-op.
    pub fn seed_target(&self, target: &RelationalTarget) {
        if let Some(existing) = self.bindings.borrow().get(ROOT_KEY) {
            if existing.table == target.table {
                return;
            }
        }
        let alias = self.table_alias(target.alias.as_deref(), &target.table);
        self.bind_root(target, alias);
    }

    /// Bind a DML target under its bare table name, whatever the alias mode.
    pub(crate) fn seed_unaliased(&self, target: &RelationalTarget) {
        self.bind_root(target, None);
    }

    fn bind_root(&self, target: &RelationalTarget, alias: Option<String>) {
        let root = Binding {
            schema: target.schema.clone(),
            table: target.table.clone(),
            alias,
            entity: target.entity.clone(),
        };
        trace!(table = %root.table, alias = ?root.alias, sequence = self.sequence, "seeding target");
        let mut bindings = self.bindings.borrow_mut();
        // also reachable by table and entity name
        for key in [Some(root.qualifier()), Some(root.table.as_str()), root.entity.as_deref()]
            .into_iter()
            .flatten()
        {
            bindings.insert(key.to_string(), root.clone());
        }
        bindings.insert(ROOT_KEY.to_string(), root);
        for join in &target.joins {
            let binding = Binding {
                schema: None,
                table: join.source.clone(),
                alias: self.table_alias(join.alias.as_deref(), &join.name),
                entity: join.entity.clone(),
            };
            if binding.qualifier() != join.name {
                bindings.insert(binding.qualifier().to_string(), binding.clone());
            }
            bindings.insert(join.name.clone(), binding);
        }
    }

    /// Alias for a table source under the current alias mode.
    pub fn table_alias(&self, explicit: Option<&str>, name: &str) -> Option<String> {
        match self.alias_mode {
            AliasMode::Unsupported => None,
            AliasMode::Default => explicit.map(str::to_string),
            AliasMode::Auto => Some(
                explicit
                    .map(str::to_string)
                    .unwrap_or_else(|| self.generate_alias(name)),
            ),
        }
    }

    /// A fresh alias for `name` in this context.
    pub fn generate_alias(&self, name: &str) -> String {
        self.aliases.borrow_mut().next(name, self.sequence)
    }

    /// Look up the source bound under `key`.
    ///
    /// Query-level scopes always continue into their parent. Statement scopes
    /// continue only when `use_parent` is set.
    pub fn binding(&self, key: &str, use_parent: bool) -> Option<Binding> {
        if let Some(binding) = self.bindings.borrow().get(key) {
            return Some(binding.clone());
        }
        let parent = self.parent?;
        match self.scope {
            ScopeKind::Query => parent.binding(key, use_parent),
            ScopeKind::Statement if use_parent => parent.binding(key, true),
            ScopeKind::Statement => None,
        }
    }

    /// The root target of the nearest seeded scope.
    pub fn root_binding(&self) -> Option<Binding> {
        self.binding(ROOT_KEY, false)
    }

    /// Alias for a path: its explicit alias, else the alias of the source
    /// bound under its key.
    pub fn alias(&self, path: &Path, use_parent: bool) -> Option<String> {
        if self.alias_mode == AliasMode::Unsupported {
            return None;
        }
        if let Some(alias) = path.alias() {
            return Some(alias.to_string());
        }
        self.binding(&path.key(), use_parent)?.alias
    }

    /// Store a parameter in the shared accumulator and return its name.
    pub fn add_parameter(&self, parameter: SqlParameter) -> SqlResult<String> {
        self.parameters.add(parameter)
    }

    pub fn resolve(&self, expr: &Expression, target: TargetType) -> SqlResult<Resolved> {
        self.registry.resolve(expr, target, self)
    }

    /// Resolve into a SQL fragment.
    pub fn resolve_sql(&self, expr: &Expression) -> SqlResult<String> {
        self.resolve(expr, TargetType::Sql)?.into_sql()
    }

    pub fn parent(&self) -> Option<&CompositionContext<'p>> {
        self.parent
    }

    pub fn scope(&self) -> ScopeKind {
        self.scope
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn alias_mode(&self) -> AliasMode {
        self.alias_mode
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn registry(&self) -> &Arc<ResolverRegistry> {
        &self.registry
    }

    pub fn data_model(&self) -> Option<&dyn DataModel> {
        self.data_model.as_deref()
    }

    pub fn parameters(&self) -> &Arc<NamedParameters> {
        &self.parameters
    }
}

impl std::fmt::Debug for CompositionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionContext")
            .field("scope", &self.scope)
            .field("sequence", &self.sequence)
            .field("alias_mode", &self.alias_mode)
            .field("dialect", &self.dialect.name())
            .field("bindings", &self.bindings.borrow().len())
            .field("parameters", &self.parameters.len())
            .finish()
    }
}
