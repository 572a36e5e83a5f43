//! Query parser.
//!
//! Parses a token stream into a query AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query    → expr?
//! expr     → unary (OPERATOR? expr)?
//! unary    → "NOT" unary | operand
//! operand  → PREFIX? FIELD_PREFIX? (leaf | range | "(" expr ")")
//! leaf     → (TERM | PHRASE) modifier*
//! modifier → "^" NUMBER | "~" NUMBER?
//! range    → ("[" | "{") bound "TO" bound ("]" | "}")
//! ```
//!
//! Operators have no relative precedence: `a OR b AND c` parses as
//! `a OR (b AND c)`, each binary node holding the next operand on its left
//! and the rest of the query on its right.

use std::mem;

use crate::{
    ast::{Expr, Leaf, Operator, Prefix, Range},
    error::{QueryError, Span},
    lexer::{Token, tokenize},
};

/// Similarity assigned to a bare `~` on a term.
const DEFAULT_SIMILARITY: f32 = 0.5;

/// Recursive descent parser for query expressions.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the token stream into a query expression.
    fn parse(mut self) -> Result<Option<Expr>, QueryError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_expr()?;

        if self.position < self.tokens.len() {
            return Err(QueryError::new(
                format!("unexpected token: {:?}", self.tokens[self.position]),
                Span::Token(self.position),
            ));
        }

        Ok(Some(expr))
    }

    /// Parses: expr → unary (OPERATOR? expr)?
    fn parse_expr(&mut self) -> Result<Expr, QueryError> {
        let left = self.parse_unary()?;

        let operator = match self.peek() {
            Some(Token::And) => Operator::And,
            Some(Token::Or) => Operator::Or,
            Some(Token::Not) => Operator::Not,
            _ if self.can_start_operand() => Operator::Implicit,
            _ => return Ok(left),
        };

        if operator != Operator::Implicit {
            self.advance(); // consume operator
            if self.peek().is_none() {
                return Err(QueryError::new(
                    format!("dangling operator {operator} at end of query"),
                    Span::Token(self.position),
                ));
            }
        }

        let right = self.parse_expr()?;
        Ok(Expr::binary(left, operator, right))
    }

    /// Checks if the current token can start an operand.
    fn can_start_operand(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Term(_)
                    | Token::Phrase(_)
                    | Token::FieldPrefix(_)
                    | Token::LParen
                    | Token::LBracket
                    | Token::LBrace
                    | Token::Required
                    | Token::Prohibited
            )
        )
    }

    /// Parses: unary → "NOT" unary | operand
    fn parse_unary(&mut self) -> Result<Expr, QueryError> {
        if self.check(&Token::Not) {
            self.advance(); // consume NOT
            let expr = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(expr)));
        }

        self.parse_operand()
    }

    /// Parses: operand → PREFIX? FIELD_PREFIX? (leaf | range | group)
    fn parse_operand(&mut self) -> Result<Expr, QueryError> {
        let prefix = match self.peek() {
            Some(Token::Required) => Some(Prefix::Required),
            Some(Token::Prohibited) => Some(Prefix::Prohibited),
            _ => None,
        };
        if prefix.is_some() {
            self.advance();
        }

        let field = if let Some(Token::FieldPrefix(name)) = self.peek().cloned() {
            self.advance();
            Some(name)
        } else {
            None
        };

        let expr = match self.peek().cloned() {
            Some(Token::Term(text)) => {
                self.advance();
                Expr::Leaf(self.parse_modifiers(Leaf::term(text))?)
            }

            Some(Token::Phrase(text)) => {
                self.advance();
                Expr::Leaf(self.parse_modifiers(Leaf::phrase(text))?)
            }

            Some(Token::LBracket | Token::LBrace) if prefix.is_none() => self.parse_range()?,

            Some(Token::LParen) if prefix.is_none() => self.parse_group()?,

            Some(Token::LBracket | Token::LBrace | Token::LParen) => {
                return Err(QueryError::new(
                    "'+' and '-' must precede a term or phrase",
                    Span::Token(self.position),
                ));
            }

            Some(Token::RParen) => {
                return Err(QueryError::new(
                    "unexpected closing parenthesis",
                    Span::Token(self.position),
                ));
            }

            Some(Token::And | Token::Or | Token::Not) => {
                return Err(QueryError::new(
                    "unexpected operator (needs expression before it)",
                    Span::Token(self.position),
                ));
            }

            Some(Token::Boost(_) | Token::Tilde(_)) => {
                return Err(QueryError::new(
                    "unexpected modifier (needs term before it)",
                    Span::Token(self.position),
                ));
            }

            Some(other) => {
                return Err(QueryError::new(
                    format!("unexpected token: {other:?}"),
                    Span::Token(self.position),
                ));
            }

            None => {
                return Err(QueryError::new("unexpected end of query", Span::End));
            }
        };

        let expr = match expr {
            Expr::Leaf(mut leaf) => {
                leaf.prefix = prefix;
                Expr::Leaf(leaf)
            }
            other => other,
        };

        Ok(match field {
            Some(name) => expr.with_field(&name),
            None => expr,
        })
    }

    /// Applies `^n` and `~n` suffixes to a leaf.
    fn parse_modifiers(&mut self, mut leaf: Leaf) -> Result<Leaf, QueryError> {
        loop {
            match self.peek().cloned() {
                Some(Token::Boost(factor)) if leaf.boost.is_none() => {
                    self.advance();
                    leaf.boost = Some(factor);
                }
                Some(Token::Tilde(value)) if leaf.quoted && leaf.proximity.is_none() => {
                    let Some(slop) = value.filter(|v| v.fract() == 0.0) else {
                        return Err(QueryError::new(
                            "phrase proximity needs a whole number, e.g. \"a b\"~2",
                            Span::Token(self.position),
                        ));
                    };
                    self.advance();
                    leaf.proximity = Some(slop as u32);
                }
                Some(Token::Tilde(value)) if !leaf.quoted && leaf.similarity.is_none() => {
                    self.advance();
                    leaf.similarity = Some(value.unwrap_or(DEFAULT_SIMILARITY));
                }
                Some(Token::Boost(_) | Token::Tilde(_)) => {
                    return Err(QueryError::new(
                        "modifier repeated on the same term",
                        Span::Token(self.position),
                    ));
                }
                _ => return Ok(leaf),
            }
        }
    }

    /// Parses a parenthesized group, consuming the surrounding parentheses.
    fn parse_group(&mut self) -> Result<Expr, QueryError> {
        self.advance(); // consume (
        if self.check(&Token::RParen) {
            return Err(QueryError::new("empty group", Span::Token(self.position)));
        }

        let inner = self.parse_expr()?;

        if !self.check(&Token::RParen) {
            return Err(QueryError::new(
                "expected closing parenthesis",
                Span::Token(self.position),
            ));
        }
        self.advance(); // consume )

        Ok(inner)
    }

    /// Parses a `[min TO max]` or `{min TO max}` range.
    fn parse_range(&mut self) -> Result<Expr, QueryError> {
        let inclusive = self.check(&Token::LBracket);
        self.advance(); // consume [ or {

        let min = self.parse_range_bound()?;
        match self.peek() {
            Some(Token::Term(word)) if word == "TO" => self.advance(),
            _ => {
                return Err(QueryError::new(
                    "expected TO inside range",
                    Span::Token(self.position),
                ));
            }
        }
        let max = self.parse_range_bound()?;

        let closing = if inclusive {
            Token::RBracket
        } else {
            Token::RBrace
        };
        if !self.check(&closing) {
            return Err(QueryError::new(
                "expected matching bracket to close range",
                Span::Token(self.position),
            ));
        }
        self.advance();

        Ok(Expr::Range(Range {
            field: None,
            min,
            max,
            inclusive,
        }))
    }

    /// Parses one bound of a range.
    fn parse_range_bound(&mut self) -> Result<String, QueryError> {
        match self.peek().cloned() {
            Some(Token::Term(text) | Token::Phrase(text)) if text != "TO" => {
                self.advance();
                Ok(text)
            }
            _ => Err(QueryError::new(
                "expected term as range bound",
                Span::Token(self.position),
            )),
        }
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token matches the given token.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Parses a query string into an AST.
///
/// Returns `Ok(None)` for empty queries, `Ok(Some(expr))` for valid queries,
/// or `Err(QueryError)` for invalid syntax.
pub fn parse(input: &str) -> Result<Option<Expr>, QueryError> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).parse().map_err(|e| e.in_query(input))
}
