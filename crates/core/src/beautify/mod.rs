//! Ruby code beautifier.
//!
//! Template engines emit Ruby as long runs of `;`-separated statements. The
//! functions here turn that into nested, readable code without touching what
//! the code does: literal bodies are never rewritten, only the whitespace at
//! the start of each line and the statement separators between them.

mod blocks;
mod lexer;
mod printer;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SyntaxError;

/// Character used for indentation while the wrapper module is still in place.
const PLACEHOLDER: char = '\u{1}';

const WRAPPER_OPEN: &str = "module M_\n";
const WRAPPER_CLOSE: &str = "\nend\n";

static LEADING_SEMICOLONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*;").unwrap());
static TRAILING_SEMICOLONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m);\s*$").unwrap());

/// Options for [`format_code`].
///
/// Every call takes its own options, so formatting on several threads at once
/// needs no coordination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Character repeated to build one indentation level.
    pub indent_token: char,
    /// Number of `indent_token`s per level.
    pub indent_count: usize,
    /// Treat every statement-separating `;` as the end of a line: the next
    /// statement is re-indented right after the `;`, which is kept so the
    /// caller can turn it into a line break.
    pub break_on_semicolon: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_token: ' ',
            indent_count: 2,
            break_on_semicolon: false,
        }
    }
}

/// Re-indents Ruby source according to its block structure.
///
/// Each line is emitted at the depth of the blocks enclosing it with its
/// original leading whitespace removed. Whitespace-only lines become empty.
/// Heredoc bodies, `=begin` blocks and the `__END__` section are copied
/// verbatim.
///
/// # Examples
///
/// ```
/// use convgen_core::beautify::{FormatOptions, format_code};
///
/// let code = "if x\ny\nend\n";
/// assert_eq!(format_code(code, &FormatOptions::default()), "if x\n  y\nend\n");
/// ```
pub fn format_code(code: &str, options: &FormatOptions) -> String {
    printer::print(code, options)
}

/// Pretty-prints a compiled template fragment.
///
/// Statements separated by `;` are put on their own lines and nested blocks
/// are indented by `indent_count` spaces per level. Running the result
/// through `pretty_print` again returns it unchanged.
///
/// Semicolons at the very start or end of a line are dropped without looking
/// at string contents, so a string literal whose line ends in `;` loses it.
/// Comments are not exempt either: a comment ending in `;;` loses one `;` per
/// call, so such input is not a fixpoint.
///
/// # Examples
///
/// ```
/// use convgen_core::beautify::pretty_print;
///
/// let flat = "_buf = ''; if true\n_buf << 'a'; end; _buf\n";
/// assert_eq!(pretty_print(flat, 2), "_buf = ''\nif true\n  _buf << 'a'\nend\n_buf\n");
/// ```
pub fn pretty_print(code: &str, indent_count: usize) -> String {
    let wrapped = format!("{WRAPPER_OPEN}{code}{WRAPPER_CLOSE}");
    let wrapped = LEADING_SEMICOLONS.replace_all(&wrapped, "");
    let wrapped = TRAILING_SEMICOLONS.replace_all(&wrapped, "");

    let options = FormatOptions {
        indent_token: PLACEHOLDER,
        indent_count,
        break_on_semicolon: true,
    };
    let formatted = format_code(&wrapped, &options);
    let formatted = formatted.replace(&format!(";{PLACEHOLDER}"), &format!("\n{PLACEHOLDER}"));

    // Drop the level added by the wrapper.
    let unit = PLACEHOLDER.to_string().repeat(indent_count);
    let mut unwrapped = String::with_capacity(formatted.len());
    for line in formatted.split_inclusive('\n') {
        unwrapped.push_str(line.strip_prefix(unit.as_str()).unwrap_or(line));
    }
    let unwrapped = unwrapped.replace(PLACEHOLDER, " ");

    let body = unwrapped.strip_prefix(WRAPPER_OPEN).unwrap_or(&unwrapped);
    let body = body.strip_suffix(WRAPPER_CLOSE).unwrap_or(body);
    log::debug!(
        "pretty-printed fragment: {} bytes in, {} bytes out",
        code.len(),
        body.len()
    );
    body.to_string()
}

/// Checks the block structure of Ruby source without running it.
///
/// Literals must be terminated, brackets balanced, every block opener closed by
/// `end`, and `else`/`when`/`rescue`-style keywords must sit inside a block that
/// takes them.
pub fn check_syntax(code: &str) -> Result<(), SyntaxError> {
    let lexed = lexer::tokenize(code);
    if let Some(error) = lexed.error {
        return Err(error);
    }

    let mut analyzer = blocks::Analyzer::default();
    let mut prev = None;
    for (index, token) in lexed.tokens.iter().enumerate() {
        analyzer.step(&lexed.tokens, index, prev);
        if !token.is_trivia() {
            prev = Some(token);
        }
    }
    let last_line = lexed.tokens.last().map_or(1, |t| t.line);
    analyzer.finish(last_line)
}

/// Returns `true` when [`check_syntax`] finds no problem.
///
/// # Examples
///
/// ```
/// use convgen_core::beautify::is_syntactically_valid;
///
/// assert!(is_syntactically_valid("def hi\n  puts 'hi'\nend\n"));
/// assert!(!is_syntactically_valid("def hi\n  puts 'hi'\n"));
/// ```
pub fn is_syntactically_valid(code: &str) -> bool {
    check_syntax(code).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indents_nested_blocks() {
        let input = "class Foo\ndef hi\nputs 'hi'\nend\nend\n";
        let expected = "class Foo\n  def hi\n    puts 'hi'\n  end\nend\n";
        assert_eq!(pretty_print(input, 2), expected);
    }

    #[test]
    fn test_removes_leading_semicolons() {
        let input = "; _buf = ''\n;_buf << '<a' \n ; _buf << ' href='\n";
        let expected = "_buf = ''\n_buf << '<a' \n_buf << ' href='\n";
        assert_eq!(pretty_print(input, 2), expected);
    }

    #[test]
    fn test_removes_trailing_semicolons() {
        let input = "_buf = '';\n_buf << '<a'; \n_buf << ' href=';\n";
        let expected = "_buf = ''\n_buf << '<a'\n_buf << ' href='";
        assert_eq!(pretty_print(input, 2), expected);
    }

    #[test]
    fn test_breaks_lines_on_semicolons() {
        let input = "_buf = ''; if true\n_buf << '<kbd>'; else; _buf << '<kbd id=\"key\">'; end; _buf\n";
        let expected = "_buf = ''\nif true\n  _buf << '<kbd>'\nelse\n  _buf << '<kbd id=\"key\">'\nend\n_buf\n";
        assert_eq!(pretty_print(input, 2), expected);
    }

    #[test]
    fn test_pretty_print_is_a_fixpoint() {
        let inputs = [
            "_buf = ''; if true\n_buf << '<kbd>'; else; _buf << 'x'; end; _buf\n",
            "class Foo\ndef hi\nputs 'hi'\nend\nend\n",
            "x = [1,\n2]\ncase x\nwhen 1 then y\nelse\nz\nend\n",
            "items.each do |i|\n\n   \n_buf << i.to_s; end\n",
        ];
        for input in inputs {
            let once = pretty_print(input, 2);
            assert_eq!(pretty_print(&once, 2), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_semicolons_inside_literals_are_kept() {
        let input = "_buf << \"a; b\"; _buf << 'c;d'\n";
        assert_eq!(pretty_print(input, 2), "_buf << \"a; b\"\n_buf << 'c;d'\n");
    }

    #[test]
    fn test_custom_indent_width() {
        let input = "if a\nb\nend\n";
        assert_eq!(pretty_print(input, 4), "if a\n    b\nend\n");
    }

    #[test]
    fn test_heredoc_body_is_verbatim() {
        let input = "x = <<~EOS\n    keep\n  this\nEOS\nif y\nz\nend\n";
        let expected = "x = <<~EOS\n    keep\n  this\nEOS\nif y\n  z\nend\n";
        assert_eq!(pretty_print(input, 2), expected);
    }

    #[test]
    fn test_format_code_keeps_semicolons_by_default() {
        let code = "if a; b; end\n";
        assert_eq!(format_code(code, &FormatOptions::default()), "if a; b; end\n");
    }

    #[test]
    fn test_format_code_with_custom_token() {
        let options = FormatOptions {
            indent_token: '\t',
            indent_count: 1,
            break_on_semicolon: true,
        };
        assert_eq!(format_code("def a; b; end", &options), "def a;\tb;end");
    }

    #[test]
    fn test_blank_lines_lose_whitespace() {
        let options = FormatOptions::default();
        assert_eq!(format_code("a\n   \nb\n", &options), "a\n\nb\n");
    }

    #[test]
    fn test_trailing_semicolons_are_stripped_inside_comments() {
        assert_eq!(pretty_print("b# c};; ", 2), "b# c};");
        assert_eq!(pretty_print("b# c};", 2), "b# c}");
    }

    #[test]
    fn test_dash_global_with_multibyte_name() {
        assert!(is_syntactically_valid("$-é"));
        assert_eq!(pretty_print("x = $-é", 2), "x = $-é");
    }

    #[test]
    fn test_singleton_class_in_helpers() {
        let helpers = "module Helpers\n  class <<self\n    def a; end\n  end\nend\n";
        assert_eq!(check_syntax(helpers), Ok(()));

        let flat = "module Helpers\nclass <<self\ndef a; end\nend\nend\n";
        let pretty = pretty_print(flat, 2);
        assert!(pretty.contains("  class <<self\n    def a\n    end\n  end\n"), "{pretty}");
    }

    #[test]
    fn test_append_to_local_variable() {
        assert!(is_syntactically_valid("x = []\nx <<y\nx\n"));
    }

    #[test]
    fn test_check_syntax_reports_line() {
        let err = check_syntax("if x\n  y\nend\nend\n").unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("end"));
    }

    #[test]
    fn test_is_syntactically_valid_handles_literals() {
        assert!(is_syntactically_valid("x = \"end\"\ny = 'if'\nz = %w[do end]\n"));
        assert!(is_syntactically_valid("x = <<~EOS\n  def\nEOS\n"));
        assert!(!is_syntactically_valid("x = \"abc\n"));
        assert!(!is_syntactically_valid("foo(1, 2\n"));
    }
}
