//! Single-pass term augmentation.
//!
//! The normalized query is split into words delimited by [`BOUNDARY_CHARS`]. A word matches a
//! planned term only as a whole, optionally behind a `+`/`-` prefix, so augmenting `brain`
//! never touches `brainstem` or `title:brain`. Quoted spans are copied verbatim.
//!
//! [`BOUNDARY_CHARS`]: super::normalize::BOUNDARY_CHARS

use std::collections::{BTreeMap, BTreeSet};

use super::normalize::is_boundary;

/// Alternatives injected for a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Augment {
    /// `term*`
    Wildcard,
    /// `term~`
    Fuzzy,
    /// `(term* OR term* OR term~)`
    Both,
}

impl Augment {
    /// Picks the augmentation for the two policy outcomes.
    pub fn from_policies(wildcard: bool, fuzzy: bool) -> Option<Self> {
        match (wildcard, fuzzy) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Wildcard),
            (false, true) => Some(Self::Fuzzy),
            (false, false) => None,
        }
    }

    /// Renders the replacement text.
    pub fn render(self, term: &str) -> String {
        match self {
            Self::Wildcard => format!("{term}*"),
            Self::Fuzzy => format!("{term}~"),
            // The wildcard clause is listed twice; ranking depends on it.
            Self::Both => format!("({term}* OR {term}* OR {term}~)"),
        }
    }
}

/// Lowercased words appearing inside double-quoted spans.
pub fn quoted_words(s: &str) -> BTreeSet<String> {
    s.split('"')
        .skip(1)
        .step_by(2)
        .flat_map(|span| span.split(|c: char| c.is_whitespace() || is_boundary(c)))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Replaces every whole-word occurrence of a planned term outside quotes.
pub fn rewrite_terms(s: &str, plan: &BTreeMap<String, Augment>) -> String {
    let mut out = String::with_capacity(s.len() + plan.len() * 24);
    let mut in_quote = false;
    let mut rest = s;

    while let Some(c) = rest.chars().next() {
        if is_boundary(c) {
            if c == '"' {
                in_quote = !in_quote;
            }
            out.push(c);
            rest = &rest[c.len_utf8()..];
            continue;
        }

        let end = rest.find(is_boundary).unwrap_or(rest.len());
        let word = &rest[..end];
        if in_quote {
            out.push_str(word);
        } else {
            rewrite_word(&mut out, word, plan);
        }
        rest = &rest[end..];
    }

    out
}

/// Appends `word`, augmented if its body is a planned term.
fn rewrite_word(out: &mut String, word: &str, plan: &BTreeMap<String, Augment>) {
    let (prefix, body) = match word.strip_prefix(['+', '-']) {
        Some(body) => word.split_at(word.len() - body.len()),
        None => ("", word),
    };

    let term = body.to_lowercase();
    match plan.get(&term) {
        Some(augment) => {
            out.push_str(prefix);
            out.push_str(&augment.render(&term));
        }
        None => out.push_str(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(entries: &[(&str, Augment)]) -> BTreeMap<String, Augment> {
        entries.iter().map(|(t, a)| ((*t).to_string(), *a)).collect()
    }

    #[test]
    fn renders_each_augmentation() {
        assert_eq!(Augment::Wildcard.render("rat"), "rat*");
        assert_eq!(Augment::Fuzzy.render("rat"), "rat~");
        assert_eq!(Augment::Both.render("rat"), "(rat* OR rat* OR rat~)");
        assert_eq!(Augment::from_policies(false, false), None);
    }

    #[test]
    fn rewrites_whole_words_only() {
        let plan = plan(&[("brain", Augment::Wildcard)]);
        assert_eq!(
            rewrite_terms("brain and brainstem neurons", &plan),
            "brain* and brainstem neurons"
        );
        assert_eq!(rewrite_terms("title:brain", &plan), "title:brain");
        assert_eq!(rewrite_terms("brain~", &plan), "brain~");
    }

    #[test]
    fn keeps_prefix() {
        let plan = plan(&[("rat", Augment::Both)]);
        assert_eq!(
            rewrite_terms("+rat -rat", &plan),
            "+(rat* OR rat* OR rat~) -(rat* OR rat* OR rat~)"
        );
    }

    #[test]
    fn respects_brackets_and_parens() {
        let plan = plan(&[("rat", Augment::Fuzzy)]);
        assert_eq!(rewrite_terms("(rat OR mouse)", &plan), "(rat~ OR mouse)");
        assert_eq!(rewrite_terms("{rat}", &plan), "{rat~}");
    }

    #[test]
    fn leaves_quoted_spans_alone() {
        let plan = plan(&[("rat", Augment::Wildcard)]);
        assert_eq!(
            rewrite_terms("\"rat brain\" rat", &plan),
            "\"rat brain\" rat*"
        );
    }

    #[test]
    fn replacement_text_is_not_rescanned() {
        let plan = plan(&[("or", Augment::Wildcard), ("rat", Augment::Both)]);
        assert_eq!(rewrite_terms("rat", &plan), "(rat* OR rat* OR rat~)");
    }

    #[test]
    fn collects_quoted_words() {
        let words = quoted_words("brain \"Visual Cortex\" rat \"v1\"");
        let words: Vec<_> = words.iter().map(String::as_str).collect();
        assert_eq!(words, vec!["cortex", "v1", "visual"]);
    }
}
