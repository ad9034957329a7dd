//! SQL dialect definitions.
//!
//! Vendor differences live behind the stateless [`SqlDialect`] trait, one
//! unit struct per database. The default methods follow ANSI SQL; vendors
//! override what they do differently:
//!
//! - Pagination: `limit/offset`, `OFFSET ... FETCH`, ROWNUM or ROW_NUMBER wrapping
//! - Row locks: `FOR UPDATE [NOWAIT | WAIT n]`, `FOR SHARE`, `LOCK IN SHARE MODE`
//! - Function overrides (`DATEPART`, `strftime`) and name remapping
//! - Literal formats, type overrides and NULL binding type
//! - Error classification by native code or SQL state
//!
//! [`Dialect`] is the long-lived handle the compiler holds: a [`DialectKind`]
//! plus capability info, either vendor defaults or the result of a one-time
//! [`Dialect::init`] lookup against live metadata.
//!
//! # Usage
//!
//! ```ignore
//! use relsql::dialect::{Dialect, DialectKind};
//!
//! let dialect = Dialect::new(DialectKind::Postgres);
//! let sql = dialect.limit_offset("SELECT a FROM t", 10, 20)?;  // ... limit 10 offset 20
//! ```

mod ansi;
mod db2;
mod derby;
mod functions;
mod h2;
mod hana;
pub mod helpers;
mod metadata;
mod mysql;
mod oracle;
mod postgres;
mod resolvers;
mod sqlite;
mod sqlserver;

pub use ansi::Ansi;
pub use db2::Db2;
pub use derby::Derby;
pub use functions::{default_function, SqlFunction};
pub use h2::H2;
pub use hana::Hana;
pub use metadata::{Connection, ConnectionProvider, DatabaseInfo, DatabaseMetadata, IdentifierCase};
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use resolvers::{CharacterStreamResolver, TemporalTextResolver};
pub use sqlite::Sqlite;
pub use sqlserver::SqlServer;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::config::SettingsError;
use crate::error::{SqlError, SqlResult};
use crate::expr::{FunctionKind, LogicalType, TemporalKind};
use crate::resolve::{Resolver, ResolverRegistry};
use crate::statement::ParameterRenderer;
use crate::types::{SqlType, TypedLiteralProcessor, ValueProcessor};

// =============================================================================
// Capability types
// =============================================================================

/// Row-lock strength requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// Recoverable error categories the execution layer can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LockTimeout,
    Deadlock,
}

/// How a dialect applies a row limit and offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStyle {
    /// ` limit L offset O`
    LimitOffset,
    /// ` OFFSET O ROWS FETCH NEXT L ROWS ONLY`
    OffsetFetch,
    /// OFFSET FETCH that needs an ORDER BY and an explicit OFFSET.
    OffsetFetchRequired,
    /// Oracle ROWNUM wrapping.
    RowNum,
    /// Derived table filtered on a row-number function.
    RowNumber(&'static str),
}

impl LimitStyle {
    /// Apply to `sql`; a negative offset means no offset. `ordered` tells
    /// whether the outer statement already has an ORDER BY.
    pub fn apply(&self, sql: &str, limit: u64, offset: i64, ordered: bool) -> String {
        match self {
            LimitStyle::LimitOffset => helpers::limit_offset_standard(sql, limit, offset),
            LimitStyle::OffsetFetch => helpers::offset_fetch(sql, limit, offset),
            LimitStyle::OffsetFetchRequired => {
                helpers::offset_fetch_required(sql, limit, offset, ordered)
            }
            LimitStyle::RowNum => helpers::rownum(sql, limit, offset),
            LimitStyle::RowNumber(function) => helpers::row_number(sql, limit, offset, function),
        }
    }
}

/// How an INSERT should ask the driver for generated keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedKeys {
    Unsupported,
    /// The driver returns whatever keys the table generates.
    Implicit,
    /// The driver must be told which columns to return.
    ByName(Vec<String>),
}

// =============================================================================
// Vendor trait
// =============================================================================

/// SQL dialect trait - defines how vendor-specific constructs are rendered.
///
/// Implementations are stateless; anything that depends on the server
/// version takes the [`DatabaseInfo`] the owning [`Dialect`] holds.
pub trait SqlDialect: fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Capabilities assumed until [`Dialect::init`] runs.
    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new(self.name(), 0, 0)
    }

    // =========================================================================
    // Literals
    // =========================================================================

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn format_binary_literal(&self, bytes: &[u8]) -> String {
        helpers::format_binary_standard(bytes)
    }

    /// Format ISO text as a temporal literal of the given kind.
    ///
    /// - ANSI: `DATE '2024-01-02'`
    /// - SQL Server/SQLite: `'2024-01-02'`
    /// - DB2/Derby: `DATE('2024-01-02')`
    fn format_temporal_literal(&self, kind: TemporalKind, text: &str) -> String {
        helpers::format_temporal_typed(kind, text)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Limit renderer for the given server, or `None` if limits are unsupported.
    fn limit_style(&self, _info: &DatabaseInfo) -> Option<LimitStyle> {
        None
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Row-lock clause, or `None` if the mode is unsupported.
    ///
    /// `timeout_ms` of `Some(0)` means fail immediately.
    fn lock_clause(&self, mode: LockMode, timeout_ms: Option<u64>) -> Option<String> {
        match mode {
            LockMode::Exclusive => Some(helpers::for_update(timeout_ms)),
            LockMode::Shared => None,
        }
    }

    // =========================================================================
    // Generated keys
    // =========================================================================

    /// Whether generated keys must be requested by column name.
    fn generated_keys_by_name(&self) -> bool {
        false
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Override the rendering of a function kind.
    fn function(&self, kind: &FunctionKind) -> Option<SqlFunction> {
        let _ = kind;
        None
    }

    /// Remap a custom function name for this dialect.
    ///
    /// Returns `Some(new_name)` if the function should be remapped, `None` to
    /// keep the original. The input is matched case-insensitively.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn sql_type_for(&self, ty: &LogicalType) -> Option<SqlType> {
        let _ = ty;
        None
    }

    fn logical_type_for(&self, ty: &SqlType) -> Option<LogicalType> {
        let _ = ty;
        None
    }

    /// Whether a NULL may be bound with the generic NULL type.
    fn supports_null_type(&self) -> bool {
        true
    }

    /// SQL type used for NULLs whose type cannot be inferred.
    fn null_type(&self) -> SqlType {
        if self.supports_null_type() {
            SqlType::NULL
        } else {
            SqlType::VARCHAR
        }
    }

    // =========================================================================
    // Parameters and values
    // =========================================================================

    /// Wrapper for temporal-tagged parameters, e.g. `CAST(? AS DATE)`.
    fn temporal_parameter_renderer(&self, kind: TemporalKind) -> Option<ParameterRenderer> {
        let _ = kind;
        None
    }

    /// Extra resolvers layered over the default registry.
    fn resolvers(&self) -> Vec<Arc<dyn Resolver>> {
        Vec::new()
    }

    /// Deserialization processor chain, in order.
    fn value_processors(&self) -> Vec<Arc<dyn ValueProcessor>> {
        vec![Arc::new(TypedLiteralProcessor)]
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// Classify a driver error by native code and SQL state.
    fn classify_error(&self, native_code: i32, sql_state: Option<&str>) -> Option<ErrorKind> {
        let _ = (native_code, sql_state);
        None
    }
}

// =============================================================================
// Dialect kinds
// =============================================================================

/// Supported databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialectKind {
    #[default]
    Ansi,
    Postgres,
    MySql,
    H2,
    Hana,
    Sqlite,
    Oracle,
    Db2,
    SqlServer,
    Derby,
}

impl DialectKind {
    pub const ALL: [DialectKind; 10] = [
        DialectKind::Ansi,
        DialectKind::Postgres,
        DialectKind::MySql,
        DialectKind::H2,
        DialectKind::Hana,
        DialectKind::Sqlite,
        DialectKind::Oracle,
        DialectKind::Db2,
        DialectKind::SqlServer,
        DialectKind::Derby,
    ];

    /// Get the dialect implementation.
    pub fn vendor(&self) -> &'static dyn SqlDialect {
        match self {
            DialectKind::Ansi => &Ansi,
            DialectKind::Postgres => &Postgres,
            DialectKind::MySql => &MySql,
            DialectKind::H2 => &H2,
            DialectKind::Hana => &Hana,
            DialectKind::Sqlite => &Sqlite,
            DialectKind::Oracle => &Oracle,
            DialectKind::Db2 => &Db2,
            DialectKind::SqlServer => &SqlServer,
            DialectKind::Derby => &Derby,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.vendor().name())
    }
}

impl FromStr for DialectKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ansi" => Ok(DialectKind::Ansi),
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            "h2" => Ok(DialectKind::H2),
            "hana" | "saphana" => Ok(DialectKind::Hana),
            "sqlite" => Ok(DialectKind::Sqlite),
            "oracle" => Ok(DialectKind::Oracle),
            "db2" => Ok(DialectKind::Db2),
            "sqlserver" | "mssql" | "sql_server" => Ok(DialectKind::SqlServer),
            "derby" => Ok(DialectKind::Derby),
            other => Err(SettingsError::UnsupportedDialect(other.to_string())),
        }
    }
}

// =============================================================================
// Dialect handle
// =============================================================================

/// A dialect bound to the capabilities of one database.
///
/// Read-only after [`Dialect::init`]; share it behind an `Arc` across
/// concurrent compilations.
#[derive(Debug)]
pub struct Dialect {
    kind: DialectKind,
    defaults: DatabaseInfo,
    info: OnceCell<DatabaseInfo>,
    registry: OnceCell<Arc<ResolverRegistry>>,
}

impl Dialect {
    /// A dialect using vendor defaults until initialized.
    pub fn new(kind: DialectKind) -> Self {
        Self {
            kind,
            defaults: kind.vendor().default_info(),
            info: OnceCell::new(),
            registry: OnceCell::new(),
        }
    }

    /// A dialect already initialized with known capabilities.
    pub fn with_info(kind: DialectKind, info: DatabaseInfo) -> Self {
        let dialect = Self::new(kind);
        // a fresh cell is always empty
        let _ = dialect.info.set(info);
        dialect
    }

    /// Read live metadata once and freeze the result.
    ///
    /// Concurrent callers block until the first lookup finishes; later calls
    /// return the stored info without touching the provider. A failed lookup
    /// leaves the dialect uninitialized.
    pub fn init<P: ConnectionProvider>(&self, provider: &P) -> SqlResult<&DatabaseInfo> {
        self.info.get_or_try_init(|| {
            let metadata = provider
                .with_connection(|conn| conn.metadata().map_err(|e| e.to_string()))
                .map_err(SqlError::DialectInit)?;
            let info = DatabaseInfo::from(metadata);
            info!(
                dialect = self.name(),
                product = %info.product_name,
                major = info.major_version,
                minor = info.minor_version,
                "dialect initialized"
            );
            Ok(info)
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.info.get().is_some()
    }

    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.vendor().name()
    }

    pub fn vendor(&self) -> &'static dyn SqlDialect {
        self.kind.vendor()
    }

    /// Capabilities in effect: reported info, else vendor defaults.
    pub fn info(&self) -> &DatabaseInfo {
        self.info.get().unwrap_or(&self.defaults)
    }

    /// The default registry with this dialect's resolvers layered on top.
    pub fn registry(&self) -> Arc<ResolverRegistry> {
        Arc::clone(self.registry.get_or_init(|| {
            let extra = self.vendor().resolvers();
            if extra.is_empty() {
                ResolverRegistry::defaults()
            } else {
                debug!(dialect = self.name(), count = extra.len(), "extending resolver registry");
                Arc::new(ResolverRegistry::defaults().extended(extra))
            }
        }))
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Apply a limit and optional offset (`offset < 0` means none).
    /// Paginate arbitrary SQL text, detecting a top-level ORDER BY.
    pub fn limit_offset(&self, sql: &str, limit: u64, offset: i64) -> SqlResult<String> {
        self.limit_offset_ordered(sql, limit, offset, helpers::has_outer_order_by(sql))
    }

    /// Paginate when the caller knows whether the statement is sorted.
    pub fn limit_offset_ordered(
        &self,
        sql: &str,
        limit: u64,
        offset: i64,
        ordered: bool,
    ) -> SqlResult<String> {
        let style = self
            .vendor()
            .limit_style(self.info())
            .ok_or_else(|| SqlError::unsupported(self.name(), "limit/offset"))?;
        Ok(style.apply(sql, limit, offset, ordered))
    }

    pub fn lock_clause(&self, mode: LockMode, timeout_ms: Option<u64>) -> SqlResult<String> {
        self.vendor()
            .lock_clause(mode, timeout_ms)
            .ok_or_else(|| SqlError::unsupported(self.name(), format!("{mode:?} row locks")))
    }

    pub fn supports_like_escape(&self) -> bool {
        self.info().supports_like_escape
    }

    pub fn identifier_case(&self) -> IdentifierCase {
        self.info().identifier_case
    }

    /// Fold an unquoted identifier the way the database stores it.
    pub fn normalize_identifier(&self, ident: &str) -> String {
        self.identifier_case().apply(ident)
    }

    /// Table name as the database catalogs it.
    pub fn table_name(&self, name: &str) -> String {
        self.normalize_identifier(name)
    }

    /// Column name as the database catalogs it.
    pub fn column_name(&self, name: &str) -> String {
        self.normalize_identifier(name)
    }

    /// How to request generated keys for `columns`.
    pub fn generated_keys(&self, columns: &[&str]) -> GeneratedKeys {
        if !self.info().supports_generated_keys {
            return GeneratedKeys::Unsupported;
        }
        if self.vendor().generated_keys_by_name() && !columns.is_empty() {
            GeneratedKeys::ByName(columns.iter().map(|c| self.column_name(c)).collect())
        } else {
            GeneratedKeys::Implicit
        }
    }

    pub fn generated_keys_always_returned(&self) -> bool {
        self.info().generated_keys_always_returned
    }

    /// Rendering for a function kind: vendor override, then remapped
    /// custom name, then the ANSI default.
    pub fn function(&self, kind: &FunctionKind) -> SqlFunction {
        if let Some(f) = self.vendor().function(kind) {
            return f;
        }
        if let FunctionKind::Custom(name) = kind {
            if let Some(remapped) = self.vendor().remap_function(name) {
                return SqlFunction::call(remapped);
            }
        }
        default_function(kind)
    }

    pub fn classify_error(&self, native_code: i32, sql_state: Option<&str>) -> Option<ErrorKind> {
        self.vendor().classify_error(native_code, sql_state)
    }

    pub fn supports_null_type(&self) -> bool {
        self.vendor().supports_null_type()
    }

    pub fn null_type(&self) -> SqlType {
        self.vendor().null_type()
    }

    pub fn temporal_parameter_renderer(&self, kind: TemporalKind) -> Option<ParameterRenderer> {
        self.vendor().temporal_parameter_renderer(kind)
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::new(DialectKind::default())
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
