//! Terminal output styling for kgs.
//!
//! [`Highlighter`] colours the JSON payloads and TOML configuration the CLI prints. [`paint`]
//! and its shorthands wrap short labels in ANSI styles.

#![warn(missing_docs)]

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::{SyntaxReference, SyntaxSet},
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra},
};

/// ANSI reset sequence.
pub const RESET: &str = "\x1b[0m";

/// Document formats the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Search request bodies and facet listings.
    Json,
    /// Effective configuration.
    Toml,
}

impl Format {
    /// File extension syntect knows the format by.
    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

/// Colours structured documents for a 24-bit terminal.
pub struct Highlighter {
    /// Grammars, including the TOML grammar two-face adds.
    syntaxes: SyntaxSet,
    /// Lazily decoded themes.
    themes: EmbeddedLazyThemeSet,
    /// Active theme.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Highlighter using the Monokai Extended theme.
    pub fn new() -> Self {
        Self::with_theme(EmbeddedThemeName::MonokaiExtended)
    }

    /// Highlighter using a specific embedded theme.
    pub fn with_theme(theme: EmbeddedThemeName) -> Self {
        Self {
            syntaxes: extra_newlines(),
            themes: extra(),
            theme,
        }
    }

    /// Colours `text` as `format`.
    ///
    /// Lines the grammar cannot handle are passed through unstyled.
    pub fn paint(&self, text: &str, format: Format) -> String {
        let syntax = self.syntax(format);
        let mut lines = HighlightLines::new(syntax, self.themes.get(self.theme));

        let mut out = String::with_capacity(text.len() * 2);
        for line in LinesWithEndings::from(text) {
            match lines.highlight_line(line, &self.syntaxes) {
                Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
                Err(_) => out.push_str(&as_24_bit_terminal_escaped(
                    &[(Style::default(), line)],
                    false,
                )),
            }
        }
        out.push_str(RESET);
        out
    }

    /// Colours a JSON document.
    pub fn json(&self, text: &str) -> String {
        self.paint(text, Format::Json)
    }

    /// Colours a TOML document.
    pub fn toml(&self, text: &str) -> String {
        self.paint(text, Format::Toml)
    }

    /// Grammar for `format`, falling back to plain text.
    fn syntax(&self, format: Format) -> &SyntaxReference {
        self.syntaxes
            .find_syntax_by_extension(format.extension())
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }
}

/// Styles for short labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Bold cyan, for section headings.
    Heading,
    /// Bold.
    Strong,
    /// Faint, for secondary details.
    Muted,
    /// Green.
    Good,
    /// Red, for error prefixes.
    Bad,
}

impl Tone {
    /// Opening escape sequence.
    pub fn code(self) -> &'static str {
        match self {
            Self::Heading => "\x1b[1m\x1b[36m",
            Self::Strong => "\x1b[1m",
            Self::Muted => "\x1b[2m",
            Self::Good => "\x1b[32m",
            Self::Bad => "\x1b[31m",
        }
    }
}

/// Wraps `text` in `tone`.
pub fn paint(text: &str, tone: Tone) -> String {
    format!("{}{text}{RESET}", tone.code())
}

/// Section heading.
pub fn heading(text: &str) -> String {
    paint(text, Tone::Heading)
}

/// Secondary detail.
pub fn muted(text: &str) -> String {
    paint(text, Tone::Muted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_coloured_and_reset() {
        let out = Highlighter::new().json("{\"query\": {\"match_all\": {}}}\n");
        assert!(out.contains("\x1b[38;2;"));
        assert!(out.ends_with(RESET));
        assert!(out.contains("match_all"));
    }

    #[test]
    fn toml_grammar_is_available() {
        let hl = Highlighter::new();
        assert_ne!(hl.syntax(Format::Toml).name, "Plain Text");
        assert!(hl.toml("[tweaking]\nmax_terms_trigger = 4\n").contains("\x1b["));
    }

    #[test]
    fn tones_wrap_text() {
        assert_eq!(paint("x", Tone::Bad), "\x1b[31mx\x1b[0m");
        assert!(heading("Facets").starts_with(Tone::Heading.code()));
        assert!(muted("n/a").ends_with(RESET));
    }
}
