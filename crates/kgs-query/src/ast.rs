//! Query abstract syntax tree.
//!
//! The tree has two main node shapes: binary nodes joining two sub-expressions with an
//! operator, and leaves carrying a single term or phrase with its modifiers.

use std::fmt;

/// Boolean connector between two sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `AND` or `&&`.
    And,
    /// `OR` or `||`.
    Or,
    /// `NOT` or `!` between two operands (left AND NOT right).
    Not,
    /// Adjacent operands with no explicit connector.
    Implicit,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Implicit => "<implicit>",
        };
        f.write_str(s)
    }
}

/// Occurrence prefix on a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `+term`: the term must appear.
    Required,
    /// `-term`: the term must not appear.
    Prohibited,
}

impl Prefix {
    /// Returns the prefix character as written in a query string.
    pub fn as_char(self) -> char {
        match self {
            Self::Required => '+',
            Self::Prohibited => '-',
        }
    }
}

/// A single term or quoted phrase with its modifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leaf {
    /// Field name when written as `field:term`.
    pub field: Option<String>,
    /// Term text. For phrases, the content between the quotes.
    pub term: String,
    /// Whether the term was written as a quoted phrase.
    pub quoted: bool,
    /// Occurrence prefix (`+`/`-`).
    pub prefix: Option<Prefix>,
    /// Boost factor from `^n`.
    pub boost: Option<f32>,
    /// Fuzzy similarity from `~` or `~n` on a bare term.
    pub similarity: Option<f32>,
    /// Proximity slop from `~n` on a phrase.
    pub proximity: Option<u32>,
}

impl Leaf {
    /// Creates an unmodified leaf for a bare term.
    pub fn term(text: impl Into<String>) -> Self {
        Self {
            term: text.into(),
            ..Self::default()
        }
    }

    /// Creates an unmodified leaf for a quoted phrase.
    pub fn phrase(text: impl Into<String>) -> Self {
        Self {
            term: text.into(),
            quoted: true,
            ..Self::default()
        }
    }
}

/// A `[min TO max]` or `{min TO max}` range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    /// Field name when written as `field:[..]`.
    pub field: Option<String>,
    /// Lower bound.
    pub min: String,
    /// Upper bound.
    pub max: String,
    /// `true` for square brackets, `false` for braces.
    pub inclusive: bool,
}

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A term or phrase.
    Leaf(Leaf),

    /// A range over a field.
    Range(Range),

    /// Two sub-expressions joined by an operator.
    Binary {
        /// Left operand.
        left: Box<Self>,
        /// Connector.
        operator: Operator,
        /// Right operand.
        right: Box<Self>,
        /// Field name for field-group syntax, `field:(a b)`.
        field: Option<String>,
    },

    /// A leading `NOT` applied to an operand.
    Not(Box<Self>),
}

impl Expr {
    /// Creates a binary node.
    pub fn binary(left: Self, operator: Operator, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            field: None,
        }
    }

    /// Scopes the expression to a field, unless it already names one.
    pub(crate) fn with_field(self, name: &str) -> Self {
        match self {
            Self::Leaf(mut leaf) => {
                leaf.field.get_or_insert_with(|| name.to_string());
                Self::Leaf(leaf)
            }
            Self::Range(mut range) => {
                range.field.get_or_insert_with(|| name.to_string());
                Self::Range(range)
            }
            Self::Binary {
                left,
                operator,
                right,
                field,
            } => Self::Binary {
                left,
                operator,
                right,
                field: field.or_else(|| Some(name.to_string())),
            },
            Self::Not(inner) => Self::Not(Box::new(inner.with_field(name))),
        }
    }

    /// Formats the expression as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Leaf(leaf) => {
                write!(f, "{prefix}")?;
                if let Some(p) = leaf.prefix {
                    write!(f, "{}", p.as_char())?;
                }
                if let Some(field) = &leaf.field {
                    write!(f, "{field}:")?;
                }
                if leaf.quoted {
                    write!(f, "Phrase({:?})", leaf.term)?;
                } else {
                    write!(f, "Term({:?})", leaf.term)?;
                }
                if let Some(boost) = leaf.boost {
                    write!(f, " boost={boost}")?;
                }
                if let Some(similarity) = leaf.similarity {
                    write!(f, " similarity={similarity}")?;
                }
                if let Some(proximity) = leaf.proximity {
                    write!(f, " proximity={proximity}")?;
                }
                writeln!(f)
            }
            Self::Range(range) => {
                let (open, close) = if range.inclusive { ('[', ']') } else { ('{', '}') };
                write!(f, "{prefix}")?;
                if let Some(field) = &range.field {
                    write!(f, "{field}:")?;
                }
                writeln!(f, "Range{open}{} TO {}{close}", range.min, range.max)
            }
            Self::Binary {
                left,
                operator,
                right,
                field,
            } => {
                match field {
                    Some(name) => writeln!(f, "{prefix}{operator} ({name})")?,
                    None => writeln!(f, "{prefix}{operator}")?,
                }
                left.fmt_tree(f, indent + 1)?;
                right.fmt_tree(f, indent + 1)
            }
            Self::Not(inner) => {
                writeln!(f, "{prefix}NOT")?;
                inner.fmt_tree(f, indent + 1)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
