//! Re-emits tokenized source one logical line at a time at its block depth.

use super::FormatOptions;
use super::blocks::{Analyzer, Effect};
use super::lexer::{Token, TokenKind, tokenize};

struct Line<'t, 'a> {
    tokens: &'t [Token<'a>],
    /// `Newline` or `Semicolon`; `None` for the last line of input.
    terminator: Option<&'t Token<'a>>,
    depth: usize,
}

impl<'a> Line<'_, 'a> {
    /// The line without its leading whitespace.
    fn body(&self, src: &'a str) -> Option<&'a str> {
        let first = self.tokens.iter().position(|t| t.kind != TokenKind::Space)?;
        let last = self.tokens.last()?;
        Some(&src[self.tokens[first].start..last.end()])
    }

    fn is_blank(&self) -> bool {
        self.tokens.iter().all(|t| t.kind == TokenKind::Space)
    }

    fn starts_at_column_zero(&self) -> bool {
        self.tokens
            .iter()
            .find(|t| t.kind != TokenKind::Space)
            .is_some_and(|t| matches!(t.kind, TokenKind::EmbDoc | TokenKind::Data))
    }
}

pub(crate) fn print(src: &str, options: &FormatOptions) -> String {
    let lexed = tokenize(src);
    let lines = split_lines(&lexed.tokens, options.break_on_semicolon);

    let unit = options.indent_token.to_string().repeat(options.indent_count);
    let mut out = String::with_capacity(src.len() + src.len() / 4);
    let mut index = 0;
    while index < lines.len() {
        let line = &lines[index];
        index += 1;

        let Some(body) = line.body(src) else {
            if let Some(newline) = line.terminator.filter(|t| t.kind == TokenKind::Newline) {
                out.push_str(newline.text);
            }
            continue;
        };

        if !line.starts_at_column_zero() {
            for _ in 0..line.depth {
                out.push_str(&unit);
            }
        }

        match line.terminator {
            Some(t) if t.kind == TokenKind::Semicolon => {
                out.push_str(body.trim_end());
                // Empty statements after the semicolon fold into the line break
                // that ends them.
                let mut ending = Some(";");
                let mut next = index;
                while let Some(blank) = lines.get(next).filter(|l| l.is_blank()) {
                    next += 1;
                    match blank.terminator {
                        Some(t) if t.kind == TokenKind::Semicolon => continue,
                        Some(t) => ending = Some(t.text),
                        None => ending = None,
                    }
                    index = next;
                    break;
                }
                if let Some(ending) = ending {
                    out.push_str(ending);
                }
            }
            Some(t) => {
                out.push_str(body);
                out.push_str(t.text);
            }
            None => out.push_str(body),
        }
    }
    out
}

fn split_lines<'t, 'a>(tokens: &'t [Token<'a>], break_on_semicolon: bool) -> Vec<Line<'t, 'a>> {
    let mut analyzer = Analyzer::default();
    let mut lines = Vec::new();
    let mut prev: Option<&Token<'a>> = None;
    let mut start = 0;
    let mut depth = 0;
    let mut leading = true;

    for (index, token) in tokens.iter().enumerate() {
        let effect = analyzer.step(tokens, index, prev);
        let breaks = token.kind == TokenKind::Newline
            || (break_on_semicolon && token.kind == TokenKind::Semicolon);
        if breaks {
            lines.push(Line {
                tokens: &tokens[start..index],
                terminator: Some(token),
                depth,
            });
            start = index + 1;
            depth = analyzer.depth();
            leading = true;
            prev = Some(token);
            continue;
        }
        if token.is_trivia() {
            continue;
        }
        if leading {
            match effect {
                Effect::Close => depth = analyzer.depth(),
                Effect::Mid => depth = analyzer.depth().saturating_sub(1),
                Effect::None | Effect::Open => leading = false,
            }
        }
        prev = Some(token);
    }
    if start < tokens.len() {
        lines.push(Line {
            tokens: &tokens[start..],
            terminator: None,
            depth,
        });
    }
    lines
}
