//! Helpers for writing Ruby source text: value literals and indentation.

/// Operator method names that Ruby prints as bare symbols.
const OPERATOR_SYMBOLS: &[&str] = &[
    "[]", "[]=", "<=>", "===", "==", "=~", "!=", "!~", "!", "**", "+", "-", "+@", "-@", "*",
    "/", "%", "<<", ">>", "<", "<=", ">", ">=", "&", "|", "^", "~",
];

/// Renders `value` as a double-quoted Ruby string literal, the way
/// `String#inspect` does.
///
/// # Examples
///
/// ```
/// use convgen_core::literal::string_literal;
///
/// assert_eq!(string_literal("html5"), "\"html5\"");
/// assert_eq!(string_literal("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
/// assert_eq!(string_literal("#{x}"), "\"\\#{x}\"");
/// ```
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{1b}' => out.push_str("\\e"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\u{7f}' => out.push_str("\\x7F"),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Renders `name` as a Ruby symbol literal, quoting it only when Ruby would.
///
/// # Examples
///
/// ```
/// use convgen_core::literal::symbol_literal;
///
/// assert_eq!(symbol_literal("html5"), ":html5");
/// assert_eq!(symbol_literal("empty?"), ":empty?");
/// assert_eq!(symbol_literal("my-backend"), ":\"my-backend\"");
/// ```
pub fn symbol_literal(name: &str) -> String {
    if is_plain_symbol(name) {
        format!(":{name}")
    } else {
        format!(":{}", string_literal(name))
    }
}

fn is_plain_symbol(name: &str) -> bool {
    if OPERATOR_SYMBOLS.contains(&name) {
        return true;
    }
    let body = name
        .strip_prefix("@@")
        .or_else(|| name.strip_prefix('@'))
        .or_else(|| name.strip_prefix('$'))
        .unwrap_or(name);
    let sigil = body.len() != name.len();
    let body = if sigil {
        body
    } else {
        body.strip_suffix(['?', '!', '='])
            .unwrap_or(body)
    };

    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Prefixes every non-empty line of `text` with `width` spaces.
///
/// Lines that are completely empty stay empty, so indenting never introduces
/// trailing whitespace.
///
/// # Examples
///
/// ```
/// use convgen_core::literal::indent;
///
/// assert_eq!(indent("a\n\nb\n", 2), "  a\n\n  b\n");
/// ```
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    let mut out = String::with_capacity(text.len() + width * 8);
    for line in text.split_inclusive('\n') {
        if line != "\n" {
            out.push_str(&pad);
        }
        out.push_str(line);
    }
    out
}
