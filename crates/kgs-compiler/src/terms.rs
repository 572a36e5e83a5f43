//! Term extraction from a parsed query.

use kgs_query::{Expr, Leaf};

/// Collects the plain terms of a query, lowercased, in reading order.
///
/// A leaf counts only when its author used no advanced syntax on it: no boost, similarity or
/// proximity, no trailing `*`/`?`, not a number and not a multi-word phrase.
pub fn extract_terms(expr: &Expr) -> Vec<String> {
    let mut terms = Vec::new();
    collect(expr, &mut terms);
    terms
}

/// Walks the tree depth-first, left before right.
fn collect(expr: &Expr, terms: &mut Vec<String>) {
    match expr {
        Expr::Binary { left, right, .. } => {
            collect(left, terms);
            collect(right, terms);
        }
        Expr::Not(inner) => collect(inner, terms),
        Expr::Leaf(leaf) => {
            if is_plain(leaf) {
                terms.push(leaf.term.to_lowercase());
            }
        }
        Expr::Range(_) => {}
    }
}

/// Whether the leaf is eligible for augmentation.
fn is_plain(leaf: &Leaf) -> bool {
    let term = leaf.term.as_str();
    leaf.boost.is_none()
        && leaf.similarity.is_none()
        && leaf.proximity.is_none()
        && !term.is_empty()
        && !is_numeric(term)
        && !term.ends_with(['*', '?'])
        && !term.contains(char::is_whitespace)
}

/// Whether the term reads as a number: decimal, or a `0x`, `0o` or `0b` integer literal.
fn is_numeric(term: &str) -> bool {
    let radix_literal = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| {
            let (head, digits) = (term.get(..2)?, term.get(2..)?);
            head.eq_ignore_ascii_case(prefix)
                .then(|| !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)))
        });
    if let Some(valid) = radix_literal {
        return valid;
    }
    term.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && term.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(query: &str) -> Vec<String> {
        extract_terms(&kgs_query::parse(query).unwrap().unwrap())
    }

    #[test]
    fn walks_binary_nodes_in_order() {
        assert_eq!(
            terms("Brain AND (cortex OR rat)"),
            vec!["brain", "cortex", "rat"]
        );
    }

    #[test]
    fn skips_modified_leaves() {
        assert_eq!(terms("brain^2 cortex~ \"a b\"~2 rat"), vec!["rat"]);
        assert_eq!(terms("brain~0.7 rat"), vec!["rat"]);
    }

    #[test]
    fn skips_numbers_and_wildcards() {
        assert_eq!(terms("2020 1.5 neur* c?rtex? rat"), vec!["rat"]);
    }

    #[test]
    fn skips_radix_integer_literals() {
        assert_eq!(terms("0x10 0B101 0o17 rat"), vec!["rat"]);
        assert_eq!(terms("0xg1 0b"), vec!["0xg1", "0b"]);
    }

    #[test]
    fn keeps_words_that_only_parse_as_floats() {
        assert_eq!(terms("infinity nan"), vec!["infinity", "nan"]);
    }

    #[test]
    fn skips_multi_word_phrases_but_keeps_single_word_phrases() {
        assert_eq!(terms("\"visual cortex\" \"brain\""), vec!["brain"]);
    }

    #[test]
    fn includes_field_scoped_and_negated_leaves() {
        assert_eq!(terms("title:brain NOT rat -mouse"), vec!["brain", "rat", "mouse"]);
    }

    #[test]
    fn ignores_ranges() {
        assert_eq!(terms("year:[2010 TO 2020] brain"), vec!["brain"]);
    }
}
