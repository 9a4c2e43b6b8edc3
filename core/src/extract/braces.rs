//! Delimiter scanning for Java-like source.
//!
//! Every scan walks the input once, one character per step, so it always
//! terminates; unbalanced input simply runs to the end of the text.

use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharKind {
    Code,
    Literal,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    LineComment,
    BlockComment,
    Str,
    TextBlock,
    Char,
}

/// Iterator over `(byte offset, char, kind)` that knows where string/char
/// literals and comments start and end.
pub struct CharKinds<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    mode: Mode,
    escaped: bool,
    /// Characters still belonging to a multi-char delimiter (`/*`, `*/`, `"""`).
    pending: usize,
    pending_kind: CharKind,
}

impl<'a> CharKinds<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            mode: Mode::Code,
            escaped: false,
            pending: 0,
            pending_kind: CharKind::Code,
        }
    }

    fn peek_is(&mut self, expected: char) -> bool {
        self.chars.peek().is_some_and(|&(_, c)| c == expected)
    }

    fn consume_delimiter(&mut self, extra: usize, kind: CharKind) -> CharKind {
        self.pending = extra;
        self.pending_kind = kind;
        kind
    }
}

impl Iterator for CharKinds<'_> {
    type Item = (usize, char, CharKind);

    fn next(&mut self) -> Option<Self::Item> {
        let (i, c) = self.chars.next()?;

        if self.pending > 0 {
            self.pending -= 1;
            return Some((i, c, self.pending_kind));
        }

        let kind = match self.mode {
            Mode::Code => match c {
                '/' if self.peek_is('/') => {
                    self.mode = Mode::LineComment;
                    CharKind::Comment
                }
                '/' if self.peek_is('*') => {
                    self.mode = Mode::BlockComment;
                    self.consume_delimiter(1, CharKind::Comment)
                }
                '"' if self.src[i..].starts_with("\"\"\"") => {
                    self.mode = Mode::TextBlock;
                    self.consume_delimiter(2, CharKind::Literal)
                }
                '"' => {
                    self.mode = Mode::Str;
                    CharKind::Literal
                }
                '\'' => {
                    self.mode = Mode::Char;
                    CharKind::Literal
                }
                _ => CharKind::Code,
            },
            Mode::LineComment => {
                if c == '\n' {
                    self.mode = Mode::Code;
                    CharKind::Code
                } else {
                    CharKind::Comment
                }
            }
            Mode::BlockComment => {
                if c == '*' && self.peek_is('/') {
                    self.mode = Mode::Code;
                    self.consume_delimiter(1, CharKind::Comment)
                } else {
                    CharKind::Comment
                }
            }
            Mode::Str | Mode::Char => {
                let close = if self.mode == Mode::Str { '"' } else { '\'' };
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == close || c == '\n' {
                    // A newline ends an unterminated literal instead of
                    // swallowing the rest of the file.
                    self.mode = Mode::Code;
                }
                CharKind::Literal
            }
            Mode::TextBlock => {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if self.src[i..].starts_with("\"\"\"") {
                    self.mode = Mode::Code;
                    return Some((i, c, self.consume_delimiter(2, CharKind::Literal)));
                }
                CharKind::Literal
            }
        };

        Some((i, c, kind))
    }
}

/// A brace-delimited block located by [`scan_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Byte offset of the opening `{`.
    pub open: usize,
    /// Byte range of the body, excluding both braces.
    pub body: std::ops::Range<usize>,
    /// `false` when the input ended before the block was closed.
    pub closed: bool,
}

impl Block {
    /// Offset just past the block (after the closing brace when present).
    pub fn end(&self) -> usize {
        if self.closed {
            self.body.end + 1
        } else {
            self.body.end
        }
    }
}

/// Find the body of the block whose opening delimiter is at `open`.
///
/// Depth starts at one just after `open`, goes up on each nested opener and
/// down on each closer; the block ends when it returns to zero. Delimiters
/// inside literals and comments are ignored.
pub fn scan_delimited(src: &str, open: usize, opener: char, closer: char) -> Block {
    let start = open + opener.len_utf8();
    let mut depth = 1usize;

    for (offset, c, kind) in CharKinds::new(&src[start..]) {
        if kind != CharKind::Code {
            continue;
        }
        if c == opener {
            depth += 1;
        } else if c == closer {
            depth -= 1;
            if depth == 0 {
                return Block {
                    open,
                    body: start..start + offset,
                    closed: true,
                };
            }
        }
    }

    Block {
        open,
        body: start..src.len(),
        closed: false,
    }
}

/// [`scan_delimited`] for `{ ... }`.
pub fn scan_block(src: &str, open: usize) -> Block {
    scan_delimited(src, open, '{', '}')
}

/// Replace comment characters with spaces, keeping every byte offset intact.
pub fn mask_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for (_, c, kind) in CharKinds::new(src) {
        if kind == CharKind::Comment && c != '\n' {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        } else {
            out.push(c);
        }
    }
    out
}

/// Byte offsets of `;`, `{` and `}` that are code (not in literals/comments).
pub fn member_boundaries(src: &str) -> Vec<usize> {
    CharKinds::new(src)
        .filter(|&(_, c, kind)| kind == CharKind::Code && matches!(c, ';' | '{' | '}'))
        .map(|(i, _, _)| i)
        .collect()
}

/// Keywords that continue a statement after its block closes.
const CONTINUATIONS: &[&str] = &["else", "catch", "finally", "while"];

/// Split a method body into top-level statements.
///
/// Statements end at a `;` outside parentheses and braces, or at a `}` that
/// closes a top-level block (unless followed by `else`, `catch`, `finally`,
/// `while` or `;`). Comments are dropped, whitespace outside literals is
/// collapsed, and the trailing `;` is removed.
pub fn split_statements(body: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut parens = 0usize;
    let mut braces = 0usize;

    let flush = |current: &mut String, statements: &mut Vec<String>| {
        let stmt = current.trim();
        if !stmt.is_empty() {
            statements.push(stmt.to_owned());
        }
        current.clear();
    };

    for (i, c, kind) in CharKinds::new(body) {
        match kind {
            CharKind::Comment => continue,
            CharKind::Literal => {
                current.push(c);
                continue;
            }
            CharKind::Code => {}
        }

        if c.is_whitespace() {
            if !current.is_empty() && !current.ends_with(' ') {
                current.push(' ');
            }
            continue;
        }

        match c {
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            '{' => braces += 1,
            '}' => braces = braces.saturating_sub(1),
            _ => {}
        }

        if c == ';' && parens == 0 && braces == 0 {
            flush(&mut current, &mut statements);
            continue;
        }

        current.push(c);

        if c == '}' && parens == 0 && braces == 0 {
            let rest = body[i + 1..].trim_start();
            let continues = rest.starts_with(';')
                || CONTINUATIONS.iter().any(|kw| {
                    rest.strip_prefix(kw)
                        .is_some_and(|after| !after.starts_with(|ch: char| ch.is_alphanumeric()))
                });
            if !continues {
                flush(&mut current, &mut statements);
            }
        }
    }

    flush(&mut current, &mut statements);
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_nested_block() {
        let src = "void a() { if (x) { y(); } z(); } void b() {}";
        let open = src.find('{').unwrap();
        let block = scan_block(src, open);
        assert!(block.closed);
        assert_eq!(&src[block.body.clone()], " if (x) { y(); } z(); ");
        assert_eq!(&src[block.end()..], " void b() {}");
    }

    #[test]
    fn test_braces_in_literals_and_comments_ignored() {
        let src = r#"{ s = "}"; c = '{'; // }
 /* } */ t(); }"#;
        let block = scan_block(src, 0);
        assert!(block.closed);
        assert_eq!(block.end(), src.len());
    }

    #[test]
    fn test_unbalanced_input_terminates_at_end() {
        let src = "{ a(); { b(); ";
        let block = scan_block(src, 0);
        assert!(!block.closed);
        assert_eq!(block.body, 1..src.len());
        assert_eq!(block.end(), src.len());
    }

    #[test]
    fn test_unterminated_string_does_not_swallow_file() {
        let src = "{ s = \"oops;\n t(); }";
        let block = scan_block(src, 0);
        assert!(block.closed);
    }

    #[test]
    fn test_text_block_is_literal() {
        let src = "{ s = \"\"\"\n } \n\"\"\"; }";
        let block = scan_block(src, 0);
        assert!(block.closed);
        assert_eq!(block.end(), src.len());
    }

    #[test]
    fn test_split_statements() {
        let body = r#"
            username.sendKeys(user); // type it
            /* wait */ Thread.sleep(100);
            if (remember) {
                rememberMe.click();
            } else {
                other.click();
            }
            log.info("a;b");
        "#;
        let stmts = split_statements(body);
        assert_eq!(
            stmts,
            vec![
                "username.sendKeys(user)".to_owned(),
                "Thread.sleep(100)".to_owned(),
                "if (remember) { rememberMe.click(); } else { other.click(); }".to_owned(),
                "log.info(\"a;b\")".to_owned(),
            ]
        );
    }

    #[test]
    fn test_split_statements_keeps_lambda_together() {
        let stmts = split_statements("items.forEach(i -> { i.click(); }); done();");
        assert_eq!(stmts, vec!["items.forEach(i -> { i.click(); })", "done()"]);
    }

    #[test]
    fn test_mask_comments_preserves_offsets() {
        let src = "a(); // é\nb(); /* x */ c();";
        let masked = mask_comments(src);
        assert_eq!(masked.len(), src.len());
        assert_eq!(masked.find("b()"), src.find("b()"));
        assert!(!masked.contains("x"));
    }

    #[test]
    fn test_member_boundaries_skip_literals() {
        let src = "a; s = \";\"; { }";
        assert_eq!(member_boundaries(src), vec![1, 10, 12, 14]);
    }
}
