//! Ruby tokenizer.
//!
//! Only as much of Ruby is recognized as the layout engine needs: literal
//! bodies (strings, regexps, percent literals, heredocs, comments, embedded
//! documents) come out as single opaque tokens, and keywords are told apart
//! from method names and hash labels. Everything else is punctuation or a word.

use std::collections::HashSet;

use crate::error::SyntaxError;

/// Bracket pairs tracked by the block analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bracket {
    Paren,
    Square,
    Brace,
}

impl Bracket {
    pub(crate) fn closer(self) -> char {
        match self {
            Bracket::Paren => ')',
            Bracket::Square => ']',
            Bracket::Brace => '}',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Horizontal whitespace and backslash line continuations.
    Space,
    /// A line break, followed by the bodies of any heredocs opened on that line.
    Newline,
    Semicolon,
    Comment,
    /// `=begin` ... `=end`, without the final line break.
    EmbDoc,
    /// `__END__` and everything after it.
    Data,
    Keyword,
    /// Identifiers, constants, variables, method names and `label:` keys.
    Ident,
    /// Numbers, strings, symbols, regexps, percent literals and heredoc openers.
    Literal,
    Operator,
    Comma,
    Open(Bracket),
    Close(Bracket),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of `text` in the source.
    pub start: usize,
    /// Line (1-indexed) the token starts on.
    pub line: usize,
}

impl Token<'_> {
    /// Tokens that never change what the next token means.
    pub(crate) fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Space | TokenKind::Comment | TokenKind::EmbDoc
        )
    }

    pub(crate) fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub(crate) fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }
}

pub(crate) struct Lexed<'a> {
    pub tokens: Vec<Token<'a>>,
    /// First unterminated construct, if any. Tokenizing always runs to the end.
    pub error: Option<SyntaxError>,
}

const KEYWORDS: &[&str] = &[
    "BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "do", "else",
    "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not", "or",
    "redo", "rescue", "retry", "return", "self", "super", "then", "true", "undef", "unless",
    "until", "when", "while", "yield", "__FILE__", "__LINE__", "__ENCODING__",
];

/// Keywords that end an expression, so whatever follows is an operator.
const VALUE_KEYWORDS: &[&str] = &[
    "end", "self", "nil", "true", "false", "redo", "retry", "super", "__FILE__", "__LINE__",
    "__ENCODING__",
];

/// Longest first, so the scan can take the first match.
const OPERATORS: &[&str] = &[
    "**=", "<=>", "===", "...", "<<=", ">>=", "&&=", "||=", "==", "!=", ">=", "<=", "&&", "||",
    "<<", ">>", "**", "=~", "!~", "+=", "-=", "*=", "/=", "%=", "|=", "&=", "^=", "=>", "->",
    "..", "::",
];

/// Operator method names, recognized right after `def` or a `.`.
const OPERATOR_METHODS: &[&str] = &[
    "[]=", "[]", "<=>", "===", "==", "=~", "!=", "!~", "**", "+@", "-@", "<<", ">>", "<=", ">=",
    "<", ">", "+", "-", "*", "/", "%", "~", "!", "&", "|", "^",
];

pub(crate) fn tokenize(src: &str) -> Lexed<'_> {
    Lexer {
        src,
        bytes: src.as_bytes(),
        pos: 0,
        line: 1,
        tokens: Vec::new(),
        heredocs: Vec::new(),
        locals: HashSet::new(),
        method_name: false,
        error: None,
    }
    .run()
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
}

struct Heredoc {
    id: String,
    /// `<<-` and `<<~` allow an indented terminator.
    indented: bool,
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    tokens: Vec<Token<'a>>,
    heredocs: Vec<Heredoc>,
    /// Names assigned so far.
    locals: HashSet<&'a str>,
    /// The next word names a method (after `def`, `.` or `&.`).
    method_name: bool,
    error: Option<SyntaxError>,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Lexed<'a> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let line = self.line;
            let method_name = std::mem::take(&mut self.method_name);
            let kind = self.scan(method_name);
            if matches!(kind, TokenKind::Space | TokenKind::Comment) {
                self.method_name |= method_name;
            }
            if kind == TokenKind::Operator && &self.src[start..self.pos] == "=" {
                self.record_local();
            }
            self.tokens.push(Token {
                kind,
                text: &self.src[start..self.pos],
                start,
                line,
            });
        }
        if let Some(heredoc) = self.heredocs.first() {
            let message = format!(
                "can't find string \"{}\" anywhere before EOF",
                heredoc.id
            );
            self.fail(self.line, message);
        }
        Lexed {
            tokens: self.tokens,
            error: self.error,
        }
    }

    /// `x = ...` makes `x` a local variable, so a later `x <<y` or `x /y` is a
    /// binary operator rather than a command argument.
    fn record_local(&mut self) {
        let mut significant = self.tokens.iter().rev().filter(|t| !t.is_trivia());
        let Some(target) = significant.next().filter(|t| t.kind == TokenKind::Ident) else {
            return;
        };
        let receiver = significant.next().is_some_and(|t| matches!(t.text, "." | "&."));
        if !receiver {
            self.locals.insert(target.text);
        }
    }

    fn fail(&mut self, line: usize, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(SyntaxError::new(line, message));
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.pos < self.bytes.len() && pred(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.bytes[self.pos - 1] == b'\n'
    }

    fn last_significant(&self) -> Option<&Token<'a>> {
        self.tokens.iter().rev().find(|t| !t.is_trivia())
    }

    /// Whether an operand (rather than a binary operator) is expected here.
    fn expects_operand(&self) -> bool {
        match self.last_significant() {
            None => true,
            Some(tok) => match tok.kind {
                TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::Operator
                | TokenKind::Open(_) => true,
                TokenKind::Keyword => !VALUE_KEYWORDS.contains(&tok.text),
                _ => false,
            },
        }
    }

    /// `puts /x/`, `puts %w[a]`: a spaced word followed by an unspaced operator
    /// starts a command argument.
    fn spaced_argument(&self) -> bool {
        let spaced = matches!(self.tokens.last(), Some(t) if t.kind == TokenKind::Space);
        let after = self.peek(1);
        spaced
            && matches!(
                self.last_significant(),
                Some(t) if t.kind == TokenKind::Ident && !self.locals.contains(t.text)
            )
            && after.is_some_and(|b| !b.is_ascii_whitespace() && b != b'=')
    }

    fn scan(&mut self, method_name: bool) -> TokenKind {
        let b = self.bytes[self.pos];

        if method_name
            && let Some(op) = OPERATOR_METHODS
                .iter()
                .find(|op| self.src[self.pos..].starts_with(**op))
        {
            self.pos += op.len();
            return TokenKind::Ident;
        }

        match b {
            b'\n' => self.newline(),
            b'\\' if self.peek(1) == Some(b'\n') => {
                self.pos += 2;
                self.line += 1;
                TokenKind::Space
            }
            b if is_space(b) => {
                self.eat_while(is_space);
                TokenKind::Space
            }
            b';' => {
                self.pos += 1;
                TokenKind::Semicolon
            }
            b'#' => {
                self.eat_while(|b| b != b'\n');
                TokenKind::Comment
            }
            b'=' if self.at_line_start() && self.starts_directive("=begin") => self.embdoc(),
            b'_' if self.at_line_start() && self.starts_directive("__END__") => {
                self.line += self.src[self.pos..].matches('\n').count();
                self.pos = self.bytes.len();
                TokenKind::Data
            }
            b'0'..=b'9' => {
                self.number();
                TokenKind::Literal
            }
            b'"' | b'`' => {
                self.pos += 1;
                self.quoted(b, b, true, false);
                TokenKind::Literal
            }
            b'\'' => {
                self.pos += 1;
                self.quoted(b'\'', b'\'', false, false);
                TokenKind::Literal
            }
            b'@' | b'$' => self.variable(),
            b if is_ident_start(b) => self.word(method_name),
            b':' => self.colon(),
            b'?' => self.question(),
            b'/' if self.expects_operand() || self.spaced_argument() => {
                self.pos += 1;
                self.quoted(b'/', b'/', true, true);
                self.eat_while(|b| b.is_ascii_alphabetic());
                TokenKind::Literal
            }
            b'%' if self.percent_literal() => TokenKind::Literal,
            b'<' if self.heredoc() => TokenKind::Literal,
            b'(' => self.single(TokenKind::Open(Bracket::Paren)),
            b'[' => self.single(TokenKind::Open(Bracket::Square)),
            b'{' => self.single(TokenKind::Open(Bracket::Brace)),
            b')' => self.single(TokenKind::Close(Bracket::Paren)),
            b']' => self.single(TokenKind::Close(Bracket::Square)),
            b'}' => self.single(TokenKind::Close(Bracket::Brace)),
            b',' => self.single(TokenKind::Comma),
            b'.' if self.peek(1) != Some(b'.') => {
                self.pos += 1;
                self.method_name = true;
                TokenKind::Operator
            }
            b'&' if self.peek(1) == Some(b'.') => {
                self.pos += 2;
                self.method_name = true;
                TokenKind::Operator
            }
            _ => {
                let rest = &self.src[self.pos..];
                let len = OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(**op))
                    .map_or(1, |op| op.len());
                self.pos += len;
                TokenKind::Operator
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// `=begin` / `__END__` must be followed by whitespace or the end of input.
    fn starts_directive(&self, directive: &str) -> bool {
        self.src[self.pos..].starts_with(directive)
            && self
                .bytes
                .get(self.pos + directive.len())
                .is_none_or(|b| b.is_ascii_whitespace())
    }

    fn newline(&mut self) -> TokenKind {
        self.pos += 1;
        self.line += 1;
        for heredoc in std::mem::take(&mut self.heredocs) {
            self.heredoc_body(&heredoc);
        }
        TokenKind::Newline
    }

    fn heredoc_body(&mut self, heredoc: &Heredoc) {
        let start_line = self.line;
        loop {
            if self.pos >= self.bytes.len() {
                let message = format!("can't find string \"{}\" anywhere before EOF", heredoc.id);
                self.fail(start_line, message);
                return;
            }
            let line_end = self.src[self.pos..]
                .find('\n')
                .map_or(self.bytes.len(), |i| self.pos + i);
            let text = self.src[self.pos..line_end].trim_end_matches('\r');
            let text = if heredoc.indented {
                text.trim_start()
            } else {
                text
            };
            let done = text == heredoc.id;
            if line_end < self.bytes.len() {
                self.pos = line_end + 1;
                self.line += 1;
            } else {
                self.pos = line_end;
            }
            if done {
                return;
            }
        }
    }

    fn embdoc(&mut self) -> TokenKind {
        let start_line = self.line;
        let mut cursor = self.pos;
        loop {
            let line_end = self.src[cursor..]
                .find('\n')
                .map_or(self.bytes.len(), |i| cursor + i);
            let text = &self.src[cursor..line_end];
            let closes = cursor != self.pos
                && text.starts_with("=end")
                && text[4..].chars().next().is_none_or(char::is_whitespace);
            if closes {
                break self.advance_to(line_end);
            }
            if line_end >= self.bytes.len() {
                self.advance_to(line_end);
                self.fail(start_line, "embedded document meets end of file");
                break;
            }
            cursor = line_end + 1;
        }
        TokenKind::EmbDoc
    }

    fn advance_to(&mut self, end: usize) {
        self.line += self.src[self.pos..end].matches('\n').count();
        self.pos = end;
    }

    fn number(&mut self) {
        self.eat_while(is_ident_char);
        while self.peek(0) == Some(b'.') && self.peek(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            self.eat_while(is_ident_char);
        }
    }

    fn variable(&mut self) -> TokenKind {
        let sigil = self.bytes[self.pos];
        self.pos += 1;
        if sigil == b'@' && self.peek(0) == Some(b'@') {
            self.pos += 1;
        }
        match self.peek(0) {
            Some(b) if is_ident_start(b) => self.eat_while(is_ident_char),
            Some(b) if sigil == b'$' && b.is_ascii_digit() => {
                self.eat_while(|b| b.is_ascii_digit())
            }
            Some(b'-') if sigil == b'$' => {
                self.pos += 1;
                match self.src[self.pos..].chars().next() {
                    Some(c) if !c.is_whitespace() => self.pos += c.len_utf8(),
                    _ => return TokenKind::Operator,
                }
            }
            Some(b) if sigil == b'$' && b.is_ascii_punctuation() => self.pos += 1,
            _ => return TokenKind::Operator,
        }
        TokenKind::Ident
    }

    fn word(&mut self, method_name: bool) -> TokenKind {
        let start = self.pos;
        self.eat_while(is_ident_char);
        let word = &self.src[start..self.pos];

        if matches!(self.peek(0), Some(b'?' | b'!')) && self.peek(1) != Some(b'=') {
            self.pos += 1;
            return TokenKind::Ident;
        }
        if method_name {
            if self.peek(0) == Some(b'=') && self.peek(1) == Some(b'(') {
                self.pos += 1;
            }
            return TokenKind::Ident;
        }
        if self.peek(0) == Some(b':') && self.peek(1) != Some(b':') {
            self.pos += 1;
            return TokenKind::Ident;
        }
        if KEYWORDS.contains(&word) {
            if word == "def" {
                self.method_name = true;
            }
            return TokenKind::Keyword;
        }
        TokenKind::Ident
    }

    fn colon(&mut self) -> TokenKind {
        match self.peek(1) {
            Some(b':') => {
                self.pos += 2;
                TokenKind::Operator
            }
            Some(b'"') => {
                self.pos += 2;
                self.quoted(b'"', b'"', true, false);
                TokenKind::Literal
            }
            Some(b'\'') => {
                self.pos += 2;
                self.quoted(b'\'', b'\'', false, false);
                TokenKind::Literal
            }
            Some(b) if is_ident_start(b) => {
                self.pos += 1;
                self.eat_while(is_ident_char);
                match (self.peek(0), self.peek(1)) {
                    (Some(b'?' | b'!'), next) if next != Some(b'=') => self.pos += 1,
                    (Some(b'='), next) if !matches!(next, Some(b'=' | b'>' | b'~')) => {
                        self.pos += 1
                    }
                    _ => {}
                }
                TokenKind::Literal
            }
            Some(b'@' | b'$') => {
                self.pos += 1;
                match self.variable() {
                    TokenKind::Ident => TokenKind::Literal,
                    _ => TokenKind::Operator,
                }
            }
            Some(_) if self.expects_operand() => {
                let rest = &self.src[self.pos + 1..];
                match OPERATOR_METHODS.iter().find(|op| rest.starts_with(**op)) {
                    Some(op) => {
                        self.pos += 1 + op.len();
                        TokenKind::Literal
                    }
                    None => self.single(TokenKind::Operator),
                }
            }
            _ => self.single(TokenKind::Operator),
        }
    }

    /// `?a` character literals, otherwise the ternary operator.
    fn question(&mut self) -> TokenKind {
        if self.expects_operand() {
            let rest = &self.src[self.pos + 1..];
            match rest.chars().next() {
                Some('\\') => {
                    let escaped = rest[1..].chars().next().map_or(0, char::len_utf8);
                    self.pos = (self.pos + 2 + escaped).min(self.bytes.len());
                    return TokenKind::Literal;
                }
                Some(c) if !c.is_whitespace() => {
                    let after = self.pos + 1 + c.len_utf8();
                    if !self.bytes.get(after).is_some_and(|b| is_ident_char(*b)) {
                        self.pos = after;
                        return TokenKind::Literal;
                    }
                }
                _ => {}
            }
        }
        self.single(TokenKind::Operator)
    }

    fn percent_literal(&mut self) -> bool {
        if !(self.expects_operand() || self.spaced_argument()) {
            return false;
        }
        let mut cursor = self.pos + 1;
        let kind = self.bytes.get(cursor).copied();
        let typed = kind.is_some_and(|b| b"qQwWiIrsx".contains(&b));
        if typed {
            cursor += 1;
        }
        let Some(open) = self.bytes.get(cursor).copied() else {
            return false;
        };
        let valid_delimiter = if typed {
            !open.is_ascii_alphanumeric() && !open.is_ascii_whitespace() && open < 0x80
        } else {
            open.is_ascii_punctuation() && open != b'='
        };
        if !valid_delimiter {
            return false;
        }
        let close = match open {
            b'(' => b')',
            b'[' => b']',
            b'{' => b'}',
            b'<' => b'>',
            other => other,
        };
        let interpolate = !typed || kind.is_some_and(|b| b"QWIrx".contains(&b));
        self.pos = cursor + 1;
        self.quoted(open, close, interpolate, false);
        if kind == Some(b'r') {
            self.eat_while(|b| b.is_ascii_alphabetic());
        }
        true
    }

    fn heredoc(&mut self) -> bool {
        if self.peek(1) != Some(b'<') || !(self.expects_operand() || self.spaced_argument()) {
            return false;
        }
        // `class <<self` opens a singleton class.
        if matches!(
            self.last_significant(),
            Some(t) if t.kind == TokenKind::Keyword && t.text == "class"
        ) {
            return false;
        }
        let mut cursor = self.pos + 2;
        let indented = matches!(self.bytes.get(cursor), Some(b'~' | b'-'));
        if indented {
            cursor += 1;
        }
        let (id, end) = match self.bytes.get(cursor).copied() {
            Some(quote @ (b'\'' | b'"' | b'`')) => {
                let body = &self.src[cursor + 1..];
                let Some(len) = body.find(|c| c == quote as char || c == '\n') else {
                    return false;
                };
                if body.as_bytes()[len] != quote {
                    return false;
                }
                (body[..len].to_string(), cursor + 1 + len + 1)
            }
            Some(b) if is_ident_start(b) => {
                let len = self.bytes[cursor..]
                    .iter()
                    .take_while(|b| is_ident_char(**b))
                    .count();
                (self.src[cursor..cursor + len].to_string(), cursor + len)
            }
            _ => return false,
        };
        self.heredocs.push(Heredoc { id, indented });
        self.pos = end;
        true
    }

    /// Scans a delimited literal body; `self.pos` is just past the opening
    /// delimiter. Paired delimiters nest.
    fn quoted(&mut self, open: u8, close: u8, interpolate: bool, regexp: bool) {
        let start_line = self.line;
        let mut depth = 0usize;
        let mut class = false;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'\\' {
                if self.peek(1) == Some(b'\n') {
                    self.line += 1;
                }
                self.pos = (self.pos + 2).min(self.bytes.len());
                continue;
            }
            if b == b'\n' {
                self.line += 1;
            } else if interpolate && b == b'#' && self.peek(1) == Some(b'{') {
                self.pos += 2;
                self.interpolation();
                continue;
            } else if regexp && !class && b == b'[' {
                class = true;
            } else if class {
                if b == b']' {
                    class = false;
                }
            } else if b == close && depth > 0 && open != close {
                depth -= 1;
            } else if b == close {
                self.pos += 1;
                return;
            } else if b == open && open != close {
                depth += 1;
            }
            self.pos += 1;
        }
        self.fail(start_line, "unterminated string meets end of file");
    }

    /// Skips a `#{ ... }` body; `self.pos` is just past the `{`.
    fn interpolation(&mut self) {
        let start_line = self.line;
        let mut depth = 1usize;
        while let Some(&b) = self.bytes.get(self.pos) {
            self.pos += 1;
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                b'\n' => self.line += 1,
                b'\\' => self.pos = (self.pos + 1).min(self.bytes.len()),
                b'"' | b'`' => self.quoted(b, b, true, false),
                b'\'' => self.quoted(b'\'', b'\'', false, false),
                _ => {}
            }
        }
        self.fail(start_line, "unterminated string meets end of file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        tokenize(src)
            .tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Space)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_tokens_cover_source() {
        let src = "_buf << \"a#{b(\"}\")}c\"; x = %w[a b] # done\n";
        let lexed = tokenize(src);
        assert!(lexed.error.is_none());
        let joined: String = lexed.tokens.iter().map(|t| t.text).collect();
        assert_eq!(joined, src);
    }

    #[test]
    fn test_strings_are_opaque() {
        let toks = kinds("x = \"if ; end\"");
        assert_eq!(toks[2], (TokenKind::Literal, "\"if ; end\""));
        assert_eq!(toks.len(), 3);
    }

    #[test]
    fn test_keywords_after_dot_are_method_names() {
        let toks = kinds("obj.class.end");
        assert_eq!(toks[2], (TokenKind::Ident, "class"));
        assert_eq!(toks[4], (TokenKind::Ident, "end"));
    }

    #[test]
    fn test_labels_and_symbols() {
        let toks = kinds("f(if: 1, :end => 2)");
        assert_eq!(toks[2], (TokenKind::Ident, "if:"));
        assert_eq!(toks[5], (TokenKind::Literal, ":end"));
    }

    #[test]
    fn test_predicate_method_and_ternary() {
        let toks = kinds("empty? ? a : b");
        assert_eq!(toks[0], (TokenKind::Ident, "empty?"));
        assert_eq!(toks[1], (TokenKind::Operator, "?"));
        assert_eq!(toks[3], (TokenKind::Operator, ":"));
    }

    #[test]
    fn test_regexp_versus_division() {
        let toks = kinds("a = b / c\nd = /x; end/");
        assert!(toks.contains(&(TokenKind::Operator, "/")));
        assert!(toks.contains(&(TokenKind::Literal, "/x; end/")));
    }

    #[test]
    fn test_append_operator_is_not_heredoc() {
        let toks = kinds("_buf << 'a'");
        assert_eq!(toks[1], (TokenKind::Operator, "<<"));
    }

    #[test]
    fn test_heredoc_body_belongs_to_newline() {
        let src = "x = <<~EOS\n  if\n  EOS\ny";
        let toks = kinds(src);
        assert_eq!(toks[2], (TokenKind::Literal, "<<~EOS"));
        assert_eq!(toks[3], (TokenKind::Newline, "\n  if\n  EOS\n"));
        assert_eq!(toks[4], (TokenKind::Ident, "y"));
    }

    #[test]
    fn test_def_operator_name() {
        let toks = kinds("def ==(other)");
        assert_eq!(toks[1], (TokenKind::Ident, "=="));
        assert_eq!(toks[2], (TokenKind::Open(Bracket::Paren), "("));
    }

    #[test]
    fn test_embdoc_and_data() {
        let toks = kinds("=begin\nif\n=end\nx\n__END__\nend");
        assert_eq!(toks[0], (TokenKind::EmbDoc, "=begin\nif\n=end"));
        assert_eq!(toks[4], (TokenKind::Data, "__END__\nend"));
    }

    #[test]
    fn test_unterminated_literals_report_errors() {
        assert!(tokenize("x = \"abc").error.is_some());
        assert!(tokenize("x = <<~EOS\nabc\n").error.is_some());
        assert!(tokenize("=begin\nabc\n").error.is_some());
        assert!(tokenize("x = %w[a b").error.is_some());
        assert!(tokenize("x = \"#{y\"").error.is_some());
    }

    #[test]
    fn test_dash_global_before_multibyte_char() {
        let lexed = tokenize("x = $-é + $-w");
        assert!(lexed.error.is_none());
        let globals: Vec<&str> = lexed
            .tokens
            .iter()
            .filter(|t| t.text.starts_with('$'))
            .map(|t| t.text)
            .collect();
        assert_eq!(globals, ["$-é", "$-w"]);
        assert!(tokenize("$-é").error.is_none());
    }

    #[test]
    fn test_singleton_class_is_not_heredoc() {
        let lexed = tokenize("class <<self
  def a; end
end
");
        assert!(lexed.error.is_none());
        assert!(lexed.tokens.iter().any(|t| t.text == "<<"));
        assert!(lexed.tokens.iter().any(|t| t.text == "self"));
    }

    #[test]
    fn test_append_to_local_is_not_heredoc() {
        let lexed = tokenize("x = []\nx <<y\nx\n");
        assert!(lexed.error.is_none());
        assert!(lexed.tokens.iter().any(|t| t.text == "<<"));

        let lexed = tokenize("puts <<y\nbody\ny\n");
        assert!(lexed.error.is_none());
        assert!(lexed.tokens.iter().any(|t| t.kind == TokenKind::Literal && t.text == "<<y"));
    }

    #[test]
    fn test_line_numbers() {
        let lexed = tokenize("a\n\"b\nc\"\nd");
        let d = lexed.tokens.iter().find(|t| t.text == "d").map(|t| t.line);
        assert_eq!(d, Some(4));
    }
}
