//! String-level normalization and escaping.

/// Characters with meaning in the query grammar.
pub const RESERVED_CHARS: &[char] = &[
    '\\', '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '~', '*', '?', ':', '/',
];

/// Characters that delimit a word for operator and term matching.
pub const BOUNDARY_CHARS: &[char] = &[' ', '"', '[', ']', '{', '}', '(', ')'];

/// Operators re-capitalized after lowercasing.
const OPERATORS: &[&str] = &["AND", "OR", "NOT"];

/// Symbolic connectors stripped from the ends of a query.
const EDGE_CONNECTORS: &[&str] = &["&&", "||"];

/// Trims, collapses whitespace, strips edge connectors and lowercases.
pub fn normalize(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    trim_operators(&collapsed).to_lowercase()
}

/// Strips leading and trailing `&&`/`||` until nothing changes.
pub fn trim_operators(s: &str) -> &str {
    let mut current = s.trim();
    loop {
        let mut next = current;
        for op in EDGE_CONNECTORS {
            if let Some(rest) = next.trim_start().strip_prefix(op) {
                next = rest;
            }
        }
        for op in EDGE_CONNECTORS {
            if let Some(rest) = next.trim_end().strip_suffix(op) {
                next = rest;
            }
        }
        next = next.trim();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Whether `c` delimits a word.
pub fn is_boundary(c: char) -> bool {
    BOUNDARY_CHARS.contains(&c)
}

/// Upper-cases `and`, `or` and `not` when a boundary character sits on both sides.
pub fn capitalize_operators(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut copied = 0;
    let mut pos = 0;

    while pos < s.len() {
        if let Some(op) = operator_at(s, pos) {
            out.push_str(&s[copied..pos]);
            out.push_str(op);
            pos += op.len();
            copied = pos;
        } else {
            pos += s[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }

    out.push_str(&s[copied..]);
    out
}

/// Returns the operator starting at byte `pos` if it is bounded on both sides.
fn operator_at(s: &str, pos: usize) -> Option<&'static str> {
    let before = s[..pos].chars().next_back()?;
    if !is_boundary(before) {
        return None;
    }
    OPERATORS.iter().copied().find(|op| {
        let end = pos + op.len();
        s.get(pos..end).is_some_and(|word| word.eq_ignore_ascii_case(op))
            && s[end..].chars().next().is_some_and(is_boundary)
    })
}

/// Backslash-escapes every reserved character.
pub fn escape_reserved(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        if RESERVED_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Backslash-escapes reserved characters that are not already escaped.
///
/// A backslash and the character after it are copied as they are. A trailing lone backslash is
/// escaped.
pub fn escape_unescaped(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push('\\');
            out.push(chars.next().unwrap_or('\\'));
            continue;
        }
        if RESERVED_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
