//! CSS minifier and pretty-printer
//!
//! Tokenizes, parses into a shallow rule tree and re-serializes. Comments are
//! dropped unless they start with `/*!`. Invalid input (unterminated comment
//! or string, unbalanced braces) is reported as a list of errors.

use super::MinifyError;

const ZERO_UNITS: &[&str] = &[
    "px", "em", "rem", "pt", "pc", "cm", "mm", "in", "ex", "ch", "vw", "vh", "vmin", "vmax",
];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ws,
    /// A `/*! ... */` comment
    Comment(String),
    /// Quoted string including its quotes
    Str(String),
    Punct(char),
    Word(String),
}

fn is_punct(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ':' | ',' | '>' | '+' | '~' | '(' | ')')
}

fn tokenize(input: &str, errors: &mut Vec<String>) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut i = 0;

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    while i < chars.len() {
        let c = chars[i];

        if c == '/' && chars.get(i + 1) == Some(&'*') {
            flush(&mut word, &mut tokens);
            let start = i;
            let mut end = None;
            let mut j = i + 2;
            while j + 1 < chars.len() {
                if chars[j] == '*' && chars[j + 1] == '/' {
                    end = Some(j + 2);
                    break;
                }
                j += 1;
            }
            match end {
                Some(end) => {
                    if chars.get(start + 2) == Some(&'!') {
                        tokens.push(Token::Comment(chars[start..end].iter().collect()));
                    } else if tokens.last() != Some(&Token::Ws) {
                        tokens.push(Token::Ws);
                    }
                    i = end;
                }
                None => {
                    errors.push(format!("Unterminated comment at position {}", start));
                    i = chars.len();
                }
            }
            continue;
        }

        if c == '"' || c == '\'' {
            flush(&mut word, &mut tokens);
            let start = i;
            let mut j = i + 1;
            let mut closed = false;
            while j < chars.len() {
                match chars[j] {
                    '\\' => j += 2,
                    q if q == c => {
                        closed = true;
                        break;
                    }
                    '\n' => break,
                    _ => j += 1,
                }
            }
            if closed {
                tokens.push(Token::Str(chars[start..=j].iter().collect()));
                i = j + 1;
            } else {
                errors.push(format!("Unterminated string at position {}", start));
                let end = j.min(chars.len());
                tokens.push(Token::Word(chars[start..end].iter().collect()));
                i = end;
            }
            continue;
        }

        if c.is_whitespace() {
            flush(&mut word, &mut tokens);
            if tokens.last() != Some(&Token::Ws) {
                tokens.push(Token::Ws);
            }
        } else if is_punct(c) {
            flush(&mut word, &mut tokens);
            tokens.push(Token::Punct(c));
        } else {
            word.push(c);
        }
        i += 1;
    }
    flush(&mut word, &mut tokens);
    tokens
}

#[derive(Debug)]
enum Item {
    Comment(String),
    /// Declaration or a statement such as `@import ...;`
    Statement(Vec<Token>),
    Block { prelude: Vec<Token>, body: Vec<Item> },
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_items(&mut self, nested: bool, errors: &mut Vec<String>) -> Vec<Item> {
        let mut items = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut parens = 0usize;

        let tokens = self.tokens;
        while self.pos < tokens.len() {
            let token = &tokens[self.pos];
            self.pos += 1;
            match token {
                Token::Comment(c) if current.iter().all(|t| *t == Token::Ws) => {
                    current.clear();
                    items.push(Item::Comment(c.clone()));
                }
                Token::Comment(_) => {}
                Token::Punct('(') => {
                    parens += 1;
                    current.push(token.clone());
                }
                Token::Punct(')') => {
                    parens = parens.saturating_sub(1);
                    current.push(token.clone());
                }
                Token::Punct(';') if parens == 0 => {
                    if current.iter().any(|t| *t != Token::Ws) {
                        items.push(Item::Statement(std::mem::take(&mut current)));
                    }
                    current.clear();
                }
                Token::Punct('{') => {
                    let prelude = std::mem::take(&mut current);
                    let body = self.parse_items(true, errors);
                    items.push(Item::Block { prelude, body });
                    parens = 0;
                }
                Token::Punct('}') => {
                    if nested {
                        if current.iter().any(|t| *t != Token::Ws) {
                            items.push(Item::Statement(current));
                        }
                        return items;
                    }
                    errors.push("Unexpected '}'".to_string());
                }
                _ => current.push(token.clone()),
            }
        }

        if nested {
            errors.push("Missing '}'".to_string());
        }
        if current.iter().any(|t| *t != Token::Ws) {
            items.push(Item::Statement(current));
        }
        items
    }
}

/// Shorten `0px` to `0` and `0.5` to `.5`
fn shorten_number(word: &str) -> String {
    let (sign, rest) = match word.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", word),
    };

    let digits_end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (number, unit) = rest.split_at(digits_end);
    if number.is_empty() || number.chars().filter(|c| *c == '.').count() > 1 {
        return word.to_string();
    }

    let is_zero = number.chars().all(|c| c == '0' || c == '.');
    if is_zero && (unit.is_empty() || ZERO_UNITS.contains(&unit.to_ascii_lowercase().as_str())) {
        return "0".to_string();
    }

    let mut number = number.to_string();
    if number.starts_with("0.") && number.len() > 2 {
        number.remove(0);
    }
    if number.contains('.') {
        let trimmed = number.trim_end_matches('0').trim_end_matches('.');
        number = if trimmed.is_empty() { "0".into() } else { trimmed.to_string() };
    }
    format!("{}{}{}", sign, number, unit)
}

#[derive(Clone, Copy)]
enum Context {
    Selector,
    AtPrelude,
    Value,
}

impl Context {
    fn tight_before(self, c: char) -> bool {
        match self {
            Context::Selector => matches!(c, ',' | '>' | '+' | '~' | ')'),
            Context::AtPrelude => matches!(c, ',' | ':' | ')'),
            Context::Value => matches!(c, ',' | ')'),
        }
    }

    fn tight_after(self, c: char) -> bool {
        match self {
            Context::Selector => matches!(c, ',' | '>' | '+' | '~' | '('),
            Context::AtPrelude => matches!(c, ',' | ':' | '('),
            Context::Value => matches!(c, ',' | '('),
        }
    }
}

/// Serialize tokens, keeping only whitespace the context needs
fn join(tokens: &[Token], ctx: Context, shorten: bool) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Ws => {
                let next = tokens[i + 1..].iter().find(|t| **t != Token::Ws);
                let after_tight = matches!(prev, Some(Token::Punct(c)) if ctx.tight_after(*c));
                let before_tight = matches!(next, Some(Token::Punct(c)) if ctx.tight_before(*c));
                if prev.is_some() && next.is_some() && !after_tight && !before_tight {
                    out.push(' ');
                }
                continue;
            }
            Token::Comment(_) => continue,
            Token::Str(s) => out.push_str(s),
            Token::Punct(c) => out.push(*c),
            Token::Word(w) if shorten => out.push_str(&shorten_number(w)),
            Token::Word(w) => out.push_str(w),
        }
        prev = Some(token);
    }
    out
}

fn is_at_rule(prelude: &[Token]) -> bool {
    matches!(
        prelude.iter().find(|t| **t != Token::Ws),
        Some(Token::Word(w)) if w.starts_with('@')
    )
}

/// `(property, value)` of a declaration, or `None` for other statements
fn split_declaration(tokens: &[Token]) -> Option<(String, String)> {
    let colon = tokens.iter().position(|t| *t == Token::Punct(':'))?;
    let property = join(&tokens[..colon], Context::Value, false);
    if property.is_empty() || property.starts_with('@') {
        return None;
    }
    let value = join(&tokens[colon + 1..], Context::Value, true);
    Some((property, value))
}

fn statement(tokens: &[Token]) -> String {
    match split_declaration(tokens) {
        Some((property, value)) => format!("{}:{}", property, value),
        None => join(tokens, Context::AtPrelude, false),
    }
}

fn prelude_text(prelude: &[Token]) -> String {
    let ctx = if is_at_rule(prelude) {
        Context::AtPrelude
    } else {
        Context::Selector
    };
    join(prelude, ctx, false)
}

fn write_minified(items: &[Item], out: &mut String) {
    let mut pending_semicolon = false;
    for item in items {
        match item {
            Item::Comment(c) => {
                if pending_semicolon {
                    out.push(';');
                    pending_semicolon = false;
                }
                out.push_str(c);
            }
            Item::Statement(tokens) => {
                let text = statement(tokens);
                if text.is_empty() {
                    continue;
                }
                if pending_semicolon {
                    out.push(';');
                }
                out.push_str(&text);
                pending_semicolon = true;
            }
            Item::Block { prelude, body } => {
                let mut inner = String::new();
                write_minified(body, &mut inner);
                if inner.is_empty() {
                    continue;
                }
                if pending_semicolon {
                    out.push(';');
                    pending_semicolon = false;
                }
                out.push_str(&prelude_text(prelude));
                out.push('{');
                out.push_str(&inner);
                out.push('}');
            }
        }
    }
}

fn write_pretty(items: &[Item], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for item in items {
        match item {
            Item::Comment(c) => {
                out.push_str(&indent);
                out.push_str(c);
                out.push('\n');
            }
            Item::Statement(tokens) => {
                let text = match split_declaration(tokens) {
                    Some((property, value)) => format!("{}: {}", property, value),
                    None => join(tokens, Context::AtPrelude, false),
                };
                if !text.is_empty() {
                    out.push_str(&indent);
                    out.push_str(&text);
                    out.push_str(";\n");
                }
            }
            Item::Block { prelude, body } => {
                let mut inner = String::new();
                write_pretty(body, depth + 1, &mut inner);
                if inner.is_empty() {
                    continue;
                }
                if depth == 0 && !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&indent);
                out.push_str(&prelude_text(prelude).replace(',', ", "));
                out.push_str(" {\n");
                out.push_str(&inner);
                out.push_str(&indent);
                out.push_str("}\n");
            }
        }
    }
}

fn parse(css: &str) -> Result<Vec<Item>, MinifyError> {
    let mut errors = Vec::new();
    let tokens = tokenize(css, &mut errors);
    let items = Parser {
        tokens: &tokens,
        pos: 0,
    }
    .parse_items(false, &mut errors);

    if errors.is_empty() {
        Ok(items)
    } else {
        Err(MinifyError::InvalidCss(errors.join(", ")))
    }
}

/// Minify a stylesheet
pub fn minify_css(css: &str) -> Result<String, MinifyError> {
    let items = parse(css)?;
    let mut out = String::new();
    write_minified(&items, &mut out);
    Ok(out)
}

/// Pretty-print a stylesheet with 2-space indentation
pub fn beautify_css(css: &str) -> Result<String, MinifyError> {
    let items = parse(css)?;
    let mut out = String::new();
    write_pretty(&items, 0, &mut out);
    Ok(out)
}

/// Minify the contents of a `style` attribute
pub fn minify_declarations(declarations: &str) -> Result<String, MinifyError> {
    minify_css(declarations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minify_basic_rules() {
        let css = "
            /* layout */
            body , html {
                margin : 0px ;
                padding: 0.5em 1.50em;
            }

            a > span:hover { color: red; }
        ";
        assert_eq!(
            minify_css(css).unwrap(),
            "body,html{margin:0;padding:.5em 1.5em}a>span:hover{color:red}"
        );
    }

    #[test]
    fn test_keeps_descendant_space_and_bang_comments() {
        let css = "/*! keep me */ .a .b { color: blue }";
        assert_eq!(minify_css(css).unwrap(), "/*! keep me */.a .b{color:blue}");
    }

    #[test]
    fn test_drops_empty_rules() {
        assert_eq!(minify_css("a{} b{ } c{color:red}").unwrap(), "c{color:red}");
    }

    #[test]
    fn test_media_query_and_strings() {
        let css = "@media screen and (max-width : 600px) { .x { content: \"a  b\"; width: calc(100% - 10px) } }";
        assert_eq!(
            minify_css(css).unwrap(),
            "@media screen and (max-width:600px){.x{content:\"a  b\";width:calc(100% - 10px)}}"
        );
    }

    #[test]
    fn test_import_statement() {
        let css = "@import url(\"base.css\") ;\nbody{color:red}";
        assert_eq!(
            minify_css(css).unwrap(),
            "@import url(\"base.css\");body{color:red}"
        );
    }

    #[test]
    fn test_beautify() {
        let css = "a,b{color:red;margin:0}@media print{a{color:black}}";
        assert_eq!(
            beautify_css(css).unwrap(),
            "a, b {\n  color: red;\n  margin: 0;\n}\n\n@media print {\n  a {\n    color: black;\n  }\n}\n"
        );
    }

    #[test]
    fn test_errors_are_joined() {
        let err = minify_css("a{color:red").unwrap_err();
        assert_eq!(err.to_string(), "Missing '}'");

        let err = minify_css("a{color:red}} /* open").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unterminated comment at position 14, Unexpected '}'"
        );
    }

    #[test]
    fn test_shorten_number() {
        assert_eq!(shorten_number("0px"), "0");
        assert_eq!(shorten_number("0.0em"), "0");
        assert_eq!(shorten_number("0%"), "0%");
        assert_eq!(shorten_number("-0.25rem"), "-.25rem");
        assert_eq!(shorten_number("10px"), "10px");
        assert_eq!(shorten_number("1.50"), "1.5");
        assert_eq!(shorten_number("#000"), "#000");
        assert_eq!(shorten_number("1.2.3"), "1.2.3");
    }

    #[test]
    fn test_style_attribute() {
        assert_eq!(
            minify_declarations(" color : red ; margin: 0px ; ").unwrap(),
            "color:red;margin:0"
        );
    }
}
