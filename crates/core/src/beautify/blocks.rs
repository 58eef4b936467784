//! Block structure analysis over the token stream.
//!
//! The analyzer keeps a stack of open blocks. The printer asks it for the depth
//! of each line; the syntax check asks it whether the stack ever went wrong.

use super::lexer::{Bracket, Token, TokenKind};
use crate::error::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Frame {
    Class,
    Module,
    Def,
    Begin,
    Do,
    Case,
    If,
    Unless,
    While,
    Until,
    For,
    Bracket(Bracket),
}

impl Frame {
    fn opened_by(word: &str) -> Option<Frame> {
        Some(match word {
            "class" => Frame::Class,
            "module" => Frame::Module,
            "def" => Frame::Def,
            "begin" => Frame::Begin,
            "do" => Frame::Do,
            "case" => Frame::Case,
            "if" => Frame::If,
            "unless" => Frame::Unless,
            "while" => Frame::While,
            "until" => Frame::Until,
            "for" => Frame::For,
            _ => return None,
        })
    }

    /// Whether `keyword` may continue a block of this kind.
    fn accepts(self, keyword: &str) -> bool {
        match keyword {
            "elsif" => self == Frame::If,
            "else" => matches!(
                self,
                Frame::If | Frame::Unless | Frame::Case | Frame::Begin | Frame::Def | Frame::Do
            ),
            "when" | "in" => self == Frame::Case,
            "rescue" | "ensure" => matches!(
                self,
                Frame::Begin | Frame::Def | Frame::Do | Frame::Class | Frame::Module
            ),
            _ => false,
        }
    }
}

/// What a token did to the block stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    None,
    Open,
    Close,
    /// `else`, `when`, `rescue` and friends: same block, new section.
    Mid,
}

/// Keywords after which a following `if`/`while`/... starts a new expression
/// instead of acting as a statement modifier.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "and", "or", "not", "then", "do", "else", "elsif", "begin", "ensure", "when", "in", "if",
    "unless", "while", "until", "case",
];

#[derive(Debug, Default)]
pub(crate) struct Analyzer {
    stack: Vec<Frame>,
    /// A `while`/`until`/`for` header is still open, so a `do` belongs to it.
    loop_header: bool,
    error: Option<SyntaxError>,
}

impl Analyzer {
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Feeds `tokens[index]`; `prev` is the last non-trivia token before it.
    pub(crate) fn step(&mut self, tokens: &[Token<'_>], index: usize, prev: Option<&Token<'_>>) -> Effect {
        let token = &tokens[index];
        match token.kind {
            TokenKind::Newline | TokenKind::Semicolon => {
                self.loop_header = false;
                Effect::None
            }
            TokenKind::Open(bracket) => {
                self.stack.push(Frame::Bracket(bracket));
                Effect::Open
            }
            TokenKind::Close(bracket) => {
                match self.stack.pop() {
                    Some(Frame::Bracket(open)) if open == bracket => {}
                    _ => self.fail(token.line, format!("unexpected '{}'", bracket.closer())),
                }
                Effect::Close
            }
            TokenKind::Keyword => self.keyword(tokens, index, prev),
            _ => Effect::None,
        }
    }

    fn keyword(&mut self, tokens: &[Token<'_>], index: usize, prev: Option<&Token<'_>>) -> Effect {
        let token = &tokens[index];
        match token.text {
            "class" | "module" | "begin" | "case" => self.open(token.text),
            "def" if endless_def(tokens, index) => Effect::None,
            "def" => self.open("def"),
            "for" => {
                self.loop_header = true;
                self.open("for")
            }
            "if" | "unless" | "while" | "until" if starts_expression(prev) => {
                self.loop_header = matches!(token.text, "while" | "until");
                self.open(token.text)
            }
            "do" if self.loop_header => {
                self.loop_header = false;
                Effect::None
            }
            "do" => self.open("do"),
            "end" => {
                match self.stack.pop() {
                    Some(Frame::Bracket(_)) | None => self.fail(token.line, "unexpected 'end'"),
                    Some(_) => {}
                }
                Effect::Close
            }
            "else" | "elsif" | "when" | "ensure" => self.mid(token),
            "rescue" | "in" if starts_statement(prev) => self.mid(token),
            _ => Effect::None,
        }
    }

    fn open(&mut self, word: &str) -> Effect {
        match Frame::opened_by(word) {
            Some(frame) => {
                self.stack.push(frame);
                Effect::Open
            }
            None => Effect::None,
        }
    }

    fn mid(&mut self, token: &Token<'_>) -> Effect {
        let accepted = self
            .stack
            .last()
            .is_some_and(|frame| frame.accepts(token.text));
        if !accepted {
            self.fail(token.line, format!("unexpected '{}'", token.text));
        }
        Effect::Mid
    }

    fn fail(&mut self, line: usize, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(SyntaxError::new(line, message));
        }
    }

    /// Ends the analysis at `line`, the last line of input.
    pub(crate) fn finish(self, line: usize) -> Result<(), SyntaxError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.stack.last() {
            None => Ok(()),
            Some(Frame::Bracket(bracket)) => Err(SyntaxError::new(
                line,
                format!("unexpected end-of-input, expecting '{}'", bracket.closer()),
            )),
            Some(_) => Err(SyntaxError::new(
                line,
                "unexpected end-of-input, expecting 'end'",
            )),
        }
    }
}

fn starts_statement(prev: Option<&Token<'_>>) -> bool {
    prev.is_none_or(|t| matches!(t.kind, TokenKind::Newline | TokenKind::Semicolon))
}

fn starts_expression(prev: Option<&Token<'_>>) -> bool {
    let Some(prev) = prev else {
        return true;
    };
    match prev.kind {
        TokenKind::Newline
        | TokenKind::Semicolon
        | TokenKind::Comma
        | TokenKind::Operator
        | TokenKind::Open(_) => true,
        TokenKind::Keyword => EXPRESSION_KEYWORDS.contains(&prev.text),
        _ => false,
    }
}

fn next_code(tokens: &[Token<'_>], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| tokens[i].kind != TokenKind::Space)
}

/// `def name(args) = expr` has no `end`.
fn endless_def(tokens: &[Token<'_>], index: usize) -> bool {
    let Some(mut cursor) = next_code(tokens, index + 1) else {
        return false;
    };
    // name, possibly behind a `self.` or `Const.` receiver
    loop {
        let Some(next) = next_code(tokens, cursor + 1) else {
            return false;
        };
        if tokens[next].is_operator(".") {
            let Some(name) = next_code(tokens, next + 1) else {
                return false;
            };
            cursor = name;
            continue;
        }
        cursor = next;
        break;
    }
    if tokens[cursor].kind == TokenKind::Open(Bracket::Paren) {
        let mut depth = 0usize;
        let mut close = None;
        for (i, token) in tokens.iter().enumerate().skip(cursor) {
            match token.kind {
                TokenKind::Open(_) => depth += 1,
                TokenKind::Close(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(next) = close.and_then(|close| next_code(tokens, close + 1)) else {
            return false;
        };
        cursor = next;
    }
    tokens[cursor].is_operator("=")
}
