//! Function rendering.
//!
//! Every [`FunctionKind`] has a default rendering; dialects override
//! individual kinds through [`super::SqlDialect::function`].

use std::borrow::Cow;

use crate::expr::FunctionKind;

/// How a function is written in SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlFunction {
    /// `NAME(args)`; `COUNT()` becomes `COUNT(*)`.
    Call(Cow<'static, str>),
    /// A bare keyword such as `CURRENT_DATE`; arguments are ignored.
    Keyword(&'static str),
    /// Text with `{0}`, `{1}`... argument slots.
    Template(&'static str),
}

impl SqlFunction {
    pub fn call(name: &'static str) -> Self {
        SqlFunction::Call(Cow::Borrowed(name))
    }

    /// Render with already-resolved argument SQL.
    pub fn render(&self, args: &[String], distinct: bool) -> String {
        match self {
            SqlFunction::Call(name) => {
                let distinct = if distinct { "DISTINCT " } else { "" };
                if args.is_empty() && name.eq_ignore_ascii_case("COUNT") {
                    format!("{name}({distinct}*)")
                } else {
                    format!("{name}({distinct}{})", args.join(", "))
                }
            }
            SqlFunction::Keyword(keyword) => keyword.to_string(),
            SqlFunction::Template(template) => args
                .iter()
                .enumerate()
                .fold(template.to_string(), |out, (i, arg)| {
                    out.replace(&format!("{{{i}}}"), arg)
                }),
        }
    }
}

/// The ANSI rendering of a function kind.
pub fn default_function(kind: &FunctionKind) -> SqlFunction {
    match kind {
        FunctionKind::Count => SqlFunction::call("COUNT"),
        FunctionKind::Avg => SqlFunction::call("AVG"),
        FunctionKind::Min => SqlFunction::call("MIN"),
        FunctionKind::Max => SqlFunction::call("MAX"),
        FunctionKind::Sum => SqlFunction::call("SUM"),
        FunctionKind::Lower => SqlFunction::call("LOWER"),
        FunctionKind::Upper => SqlFunction::call("UPPER"),
        FunctionKind::CurrentDate => SqlFunction::Keyword("CURRENT_DATE"),
        FunctionKind::CurrentTimestamp => SqlFunction::Keyword("CURRENT_TIMESTAMP"),
        FunctionKind::Year => SqlFunction::Template("EXTRACT(YEAR FROM {0})"),
        FunctionKind::Month => SqlFunction::Template("EXTRACT(MONTH FROM {0})"),
        FunctionKind::Day => SqlFunction::Template("EXTRACT(DAY FROM {0})"),
        FunctionKind::Hour => SqlFunction::Template("EXTRACT(HOUR FROM {0})"),
        FunctionKind::Custom(name) => SqlFunction::Call(Cow::Owned(name.to_uppercase())),
    }
}

/// Date-part functions named after the part (`YEAR(x)`).
/// Used by: MySQL, Derby, DB2
pub fn date_part_native(kind: &FunctionKind) -> Option<SqlFunction> {
    match kind {
        FunctionKind::Year => Some(SqlFunction::Template("YEAR({0})")),
        FunctionKind::Month => Some(SqlFunction::Template("MONTH({0})")),
        FunctionKind::Day => Some(SqlFunction::Template("DAY({0})")),
        FunctionKind::Hour => Some(SqlFunction::Template("HOUR({0})")),
        _ => None,
    }
}
