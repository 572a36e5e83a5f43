//! Tokenizer for the query grammar.
//!
//! [`Lexer`] walks the text once and yields tokens lazily; [`tokenize`] collects them and stops
//! at the first error.

use std::{iter::Peekable, str::CharIndices};

use crate::error::{QueryError, Span};

/// Characters that end a bare word.
const WORD_BREAKS: &[char] = &['(', ')', '"', '^', '~', '[', ']', '{', '}', '/'];

/// A token in the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare word. Backslash escapes are kept verbatim.
    Term(String),
    /// Text between double quotes, quotes removed.
    Phrase(String),
    /// `name:` in front of a term, phrase, range or group.
    FieldPrefix(String),
    /// `AND` or `&&`.
    And,
    /// `OR` or `||`.
    Or,
    /// `NOT` or `!`.
    Not,
    /// Leading `+`.
    Required,
    /// Leading `-`.
    Prohibited,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `^factor`
    Boost(f32),
    /// `~` with an optional number.
    Tilde(Option<f32>),
}

/// Streaming tokenizer over a query string.
pub struct Lexer<'a> {
    /// Full query text, for error reporting.
    src: &'a str,
    /// Characters not yet consumed, with their byte offsets.
    rest: Peekable<CharIndices<'a>>,
    /// Set once an error has been yielded.
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Starts tokenizing `src`.
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            rest: src.char_indices().peekable(),
            failed: false,
        }
    }

    /// Byte offset of the next unread character.
    fn offset(&mut self) -> usize {
        self.rest.peek().map_or(self.src.len(), |&(i, _)| i)
    }

    /// The next unread character.
    fn peek(&mut self) -> Option<char> {
        self.rest.peek().map(|&(_, c)| c)
    }

    /// Consumes one character.
    fn bump(&mut self) -> Option<char> {
        self.rest.next().map(|(_, c)| c)
    }

    /// An error pointing at byte `at`.
    fn fail(&self, message: impl Into<String>, at: usize) -> QueryError {
        QueryError::new(message, Span::Byte(at)).in_query(self.src)
    }

    /// Lexes the token starting at `first`, which has not been consumed yet.
    fn lex(&mut self, first: char) -> Result<Token, QueryError> {
        let start = self.offset();
        let punct = match first {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '+' => Some(Token::Required),
            '-' => Some(Token::Prohibited),
            '!' => Some(Token::Not),
            _ => None,
        };
        if let Some(token) = punct {
            self.bump();
            return Ok(token);
        }

        match first {
            '"' => self.phrase(start),
            '^' => {
                if self.src[..start].chars().next_back().is_none_or(char::is_whitespace) {
                    return Err(self.fail("'^' must follow a term directly", start));
                }
                self.bump();
                let digits = self.number();
                if digits.is_empty() {
                    return Err(self.fail("expected number after '^'", start));
                }
                digits
                    .parse()
                    .map(Token::Boost)
                    .map_err(|_| self.fail(format!("invalid boost value: {digits}"), start))
            }
            '~' => {
                self.bump();
                let digits = self.number();
                if digits.is_empty() {
                    return Ok(Token::Tilde(None));
                }
                digits
                    .parse()
                    .map(|v| Token::Tilde(Some(v)))
                    .map_err(|_| self.fail(format!("invalid value after '~': {digits}"), start))
            }
            '/' => Err(self.fail("unexpected '/'", start)),
            ':' => Err(self.fail("unexpected ':' without a field name", start)),
            _ => self.word(),
        }
    }

    /// Reads a quoted phrase starting at the opening quote.
    fn phrase(&mut self, start: usize) -> Result<Token, QueryError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::Phrase(text)),
                Some('\\') => {
                    text.push('\\');
                    if let Some(escaped) = self.bump() {
                        text.push(escaped);
                    }
                }
                Some(c) => text.push(c),
                None => return Err(self.fail("unclosed quote", start)),
            }
        }
    }

    /// Reads a bare word, which may turn out to be an operator or a field prefix.
    fn word(&mut self) -> Result<Token, QueryError> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || WORD_BREAKS.contains(&c) {
                break;
            }
            let at = self.offset();
            self.bump();
            match c {
                ':' => return Ok(Token::FieldPrefix(word)),
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(self.fail("dangling escape character", at));
                    };
                    word.push('\\');
                    word.push(escaped);
                }
                _ => word.push(c),
            }
        }

        Ok(match word.as_str() {
            "AND" | "&&" => Token::And,
            "OR" | "||" => Token::Or,
            "NOT" => Token::Not,
            _ => Token::Term(word),
        })
    }

    /// Reads digits with at most one decimal point.
    fn number(&mut self) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if !(c.is_ascii_digit() || (c == '.' && !digits.contains('.'))) {
                break;
            }
            digits.push(c);
            self.bump();
        }
        digits
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let first = self.peek()?;
        let token = self.lex(first);
        self.failed = token.is_err();
        Some(token)
    }
}

/// Tokenizes a whole query, stopping at the first error.
pub fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    Lexer::new(input).collect()
}
