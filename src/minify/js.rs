//! JavaScript minification on top of `minify-js`

use minify_js::{minify, Session, TopLevelMode};

use super::MinifyError;

const INDENT: &str = "  ";

/// How top-level declarations may be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptKind {
    /// Top-level names are globals and kept
    #[default]
    Classic,
    /// ES module; top-level names are local
    Module,
}

impl ScriptKind {
    /// Kind for a `<script type=..>` value, `None` when the body is not JavaScript
    pub fn from_type(script_type: Option<&str>) -> Option<Self> {
        let script_type = script_type.map(|t| t.trim().to_ascii_lowercase());
        match script_type.as_deref() {
            None | Some("") | Some("text/javascript") | Some("application/javascript") => {
                Some(ScriptKind::Classic)
            }
            Some("module") => Some(ScriptKind::Module),
            _ => None,
        }
    }
}

pub fn minify_js(source: &str, kind: ScriptKind) -> Result<String, MinifyError> {
    let mode = match kind {
        ScriptKind::Classic => TopLevelMode::Global,
        ScriptKind::Module => TopLevelMode::Module,
    };
    let session = Session::new();
    let mut out = Vec::with_capacity(source.len());
    minify(&session, mode, source.as_bytes(), &mut out)
        .map_err(|e| MinifyError::InvalidJs(format!("{:?}", e)))?;
    String::from_utf8(out).map_err(|e| MinifyError::InvalidJs(e.to_string()))
}

/// Lexical context carried across lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    BlockComment,
    Template,
}

/// Re-indent `source` by bracket depth after checking that it parses.
/// Line contents are kept; only leading whitespace changes.
pub fn beautify_js(source: &str) -> Result<String, MinifyError> {
    minify_js(source, ScriptKind::Classic)?;

    let mut out = String::with_capacity(source.len() + source.len() / 4);
    let mut depth: usize = 0;
    let mut lex = Lex::Code;

    for line in source.lines() {
        if lex == Lex::Template {
            // Inside a template literal the line is content
            out.push_str(line);
        } else {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let leading_closers = trimmed
                    .chars()
                    .take_while(|c| matches!(c, '}' | ']' | ')'))
                    .count();
                let level = if lex == Lex::BlockComment {
                    depth
                } else {
                    depth.saturating_sub(leading_closers)
                };
                out.push_str(&INDENT.repeat(level));
                out.push_str(trimmed);
            }
        }
        out.push('\n');
        (depth, lex) = scan_line(line, depth, lex);
    }
    Ok(out.trim_end().to_string() + "\n")
}

/// Bracket depth and lexical context after `line`
fn scan_line(line: &str, mut depth: usize, mut lex: Lex) -> (usize, Lex) {
    let mut chars = line.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match lex {
            Lex::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    lex = Lex::Code;
                }
            }
            Lex::Template => match c {
                '\\' => {
                    chars.next();
                }
                '`' => lex = Lex::Code,
                _ => {}
            },
            Lex::Code => {
                if let Some(q) = quote {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        c if c == q => quote = None,
                        _ => {}
                    }
                    continue;
                }
                match c {
                    '\'' | '"' => quote = Some(c),
                    '`' => lex = Lex::Template,
                    '/' if chars.peek() == Some(&'/') => break,
                    '/' if chars.peek() == Some(&'*') => {
                        chars.next();
                        lex = Lex::BlockComment;
                    }
                    '{' | '[' | '(' => depth += 1,
                    '}' | ']' | ')' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
        }
    }
    (depth, lex)
}
