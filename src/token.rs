//! SQL tokens - the atomic units statements are assembled from.
//!
//! Tokens are dialect-agnostic and serialize to dialect-specific strings.
//! Resolved sub-expressions enter a stream as [`Token::Fragment`].

use crate::dialect::Dialect;
use crate::expr::JoinType;

/// SQL token.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    Distinct,
    From,
    Where,
    OrderBy,
    As,
    On,
    Join(JoinType),
    And,
    Or,
    Not,
    Exists,
    In,
    Between,
    Like,
    Escape,
    IsNull,
    IsNotNull,

    // === DML Keywords ===
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,

    // === Punctuation ===
    Comma,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,

    Space,

    // === Dynamic Content ===
    /// Table, column or alias name, emitted as given.
    Ident(String),
    /// `schema.table` or just `table`.
    QualifiedIdent {
        schema: Option<String>,
        name: String,
    },
    /// String literal, quoted for the dialect.
    LitString(String),
    /// Already-resolved SQL.
    ///
    /// # Security Warning
    ///
    /// **Never pass user input to this variant.** Fragments come from the
    /// resolver registry, where values have been replaced by placeholders.
    Fragment(String),
}

impl Token {
    /// Serialize this token for the given dialect.
    pub fn serialize(&self, dialect: &Dialect) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::Distinct => "DISTINCT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Join(join_type) => join_type.keyword().into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::Exists => "EXISTS".into(),
            Token::In => "IN".into(),
            Token::Between => "BETWEEN".into(),
            Token::Like => "LIKE".into(),
            Token::Escape => "ESCAPE".into(),
            Token::IsNull => "IS NULL".into(),
            Token::IsNotNull => "IS NOT NULL".into(),

            Token::Insert => "INSERT".into(),
            Token::Into => "INTO".into(),
            Token::Values => "VALUES".into(),
            Token::Update => "UPDATE".into(),
            Token::Set => "SET".into(),
            Token::Delete => "DELETE".into(),

            Token::Comma => ",".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            Token::Eq => "=".into(),
            Token::Ne => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),

            Token::Space => " ".into(),

            Token::Ident(name) => name.clone(),
            Token::QualifiedIdent { schema, name } => match schema {
                Some(s) => format!("{s}.{name}"),
                None => name.clone(),
            },
            Token::LitString(s) => dialect.vendor().quote_string(s),
            Token::Fragment(sql) => sql.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Move every token of `other` onto the end of this stream.
    pub fn append(&mut self, other: TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens);
        self
    }

    /// Push a resolved fragment.
    pub fn fragment(&mut self, sql: impl Into<String>) -> &mut Self {
        self.push(Token::Fragment(sql.into()))
    }

    /// Push fragments separated by `, `.
    pub fn comma_separated(&mut self, items: impl IntoIterator<Item = String>) -> &mut Self {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.comma().space();
            }
            self.fragment(item);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn serialize(&self, dialect: &Dialect) -> String {
        self.tokens.iter().map(|t| t.serialize(dialect)).collect()
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
