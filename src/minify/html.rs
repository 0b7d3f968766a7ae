//! HTML minifier on top of lol_html's streaming rewriter

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::{ContentType, EndTag};
use lol_html::{doc_comments, doc_text, element, rewrite_str, EndTagHandler, RewriteStrSettings};

use super::css::{minify_css, minify_declarations};
use super::js::{minify_js, ScriptKind};
use super::MinifyError;

/// Attributes dropped when their value is empty
const DROPPABLE_WHEN_EMPTY: &[&str] = &["class", "id", "style"];

#[derive(Debug, Clone, Copy)]
pub struct HtmlOptions {
    pub collapse_whitespace: bool,
    pub remove_comments: bool,
    pub remove_empty_attributes: bool,
}

impl HtmlOptions {
    pub fn minify() -> Self {
        Self {
            collapse_whitespace: true,
            remove_comments: true,
            remove_empty_attributes: true,
        }
    }

    /// Keep layout and comments; inline CSS and JavaScript are still
    /// minified and attributes still sorted
    pub fn beautify() -> Self {
        Self {
            collapse_whitespace: false,
            remove_comments: false,
            remove_empty_attributes: false,
        }
    }
}

#[derive(Default)]
struct TextState {
    /// Depth inside `pre`, `textarea` and non-JavaScript `script`
    raw_depth: usize,
    in_style: bool,
    script: Option<ScriptKind>,
    /// Chunks of the current text node seen so far
    buffer: String,
}

fn collapse_whitespace(text: &str) -> String {
    if text.trim().is_empty() {
        // Indentation between tags
        if text.contains('\n') || text.is_empty() {
            return String::new();
        }
        return " ".to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn is_conditional_comment(text: &str) -> bool {
    let text = text.trim_start();
    text.starts_with("[if") || text.starts_with("<![endif")
}

/// Minify an HTML document or fragment
pub fn minify_html(html: &str, opts: HtmlOptions) -> Result<String, MinifyError> {
    let state = Rc::new(RefCell::new(TextState::default()));
    let raw_state = state.clone();
    let script_state = state.clone();
    let style_state = state.clone();
    let text_state = state;

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script", move |el| {
                    let kind = ScriptKind::from_type(el.get_attribute("type").as_deref());
                    if let Some(handlers) = el.end_tag_handlers() {
                        {
                            let mut state = script_state.borrow_mut();
                            match kind {
                                Some(kind) => state.script = Some(kind),
                                None => state.raw_depth += 1,
                            }
                        }
                        let state = script_state.clone();
                        handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                            let mut state = state.borrow_mut();
                            match kind {
                                Some(_) => state.script = None,
                                None => state.raw_depth = state.raw_depth.saturating_sub(1),
                            }
                            Ok(())
                        }) as EndTagHandler<'static>);
                    }
                    Ok(())
                }),
                element!("pre, textarea", move |el| {
                    if let Some(handlers) = el.end_tag_handlers() {
                        raw_state.borrow_mut().raw_depth += 1;
                        let state = raw_state.clone();
                        handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                            let mut state = state.borrow_mut();
                            state.raw_depth = state.raw_depth.saturating_sub(1);
                            Ok(())
                        }) as EndTagHandler<'static>);
                    }
                    Ok(())
                }),
                element!("style", move |el| {
                    if let Some(handlers) = el.end_tag_handlers() {
                        style_state.borrow_mut().in_style = true;
                        let state = style_state.clone();
                        handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                            state.borrow_mut().in_style = false;
                            Ok(())
                        }) as EndTagHandler<'static>);
                    }
                    Ok(())
                }),
                element!("*", move |el| {
                    let attrs: Vec<(String, String)> = el
                        .attributes()
                        .iter()
                        .map(|a| (a.name(), a.value()))
                        .collect();
                    if attrs.is_empty() {
                        return Ok(());
                    }
                    for (name, _) in &attrs {
                        el.remove_attribute(name);
                    }

                    let mut kept = Vec::with_capacity(attrs.len());
                    for (name, value) in attrs {
                        let value = match name.as_str() {
                            "class" => {
                                let mut classes: Vec<&str> = value.split_whitespace().collect();
                                classes.sort_unstable();
                                classes.join(" ")
                            }
                            "style" => minify_declarations(&value).unwrap_or(value),
                            _ => value,
                        };
                        if opts.remove_empty_attributes
                            && DROPPABLE_WHEN_EMPTY.contains(&name.as_str())
                            && value.trim().is_empty()
                        {
                            continue;
                        }
                        kept.push((name, value));
                    }

                    kept.sort_by(|a, b| a.0.cmp(&b.0));
                    for (name, value) in kept {
                        el.set_attribute(&name, &value)?;
                    }
                    Ok(())
                }),
            ],
            document_content_handlers: vec![
                doc_comments!(move |c| {
                    if opts.remove_comments && !is_conditional_comment(&c.text()) {
                        c.remove();
                    }
                    Ok(())
                }),
                doc_text!(move |t| {
                    let mut state = text_state.borrow_mut();
                    state.buffer.push_str(t.as_str());
                    if !t.last_in_text_node() {
                        t.remove();
                        return Ok(());
                    }

                    let text = std::mem::take(&mut state.buffer);
                    let out = if state.in_style {
                        minify_css(&text).unwrap_or(text)
                    } else if let Some(kind) = state.script {
                        minify_js(&text, kind).unwrap_or(text)
                    } else if state.raw_depth > 0 || !opts.collapse_whitespace {
                        text
                    } else {
                        collapse_whitespace(&text)
                    };
                    t.replace(&out, ContentType::Html);
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| MinifyError::Rewrite(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minify(html: &str) -> String {
        minify_html(html, HtmlOptions::minify()).unwrap()
    }

    #[test]
    fn test_collapses_whitespace_and_sorts_classes() {
        let html = "<div>\n  <p class=\"b a\" id=\"\">Hello   world</p>\n</div>";
        assert_eq!(minify(html), "<div><p class=\"a b\">Hello world</p></div>");
    }

    #[test]
    fn test_sorts_attributes() {
        assert_eq!(
            minify("<a title=\"t\" href=\"h\">x</a>"),
            "<a href=\"h\" title=\"t\">x</a>"
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(minify("<p>a<!-- note -->b</p>"), "<p>ab</p>");
        let conditional = "<!--[if IE]><p>old</p><![endif]-->";
        assert_eq!(minify(conditional), conditional);
    }

    #[test]
    fn test_preformatted_text_untouched() {
        let html = "<pre>  a\n   b </pre><textarea> x  y </textarea>";
        assert_eq!(minify(html), html);
    }

    #[test]
    fn test_inline_css() {
        assert_eq!(
            minify("<style>\n  a { color : red ; }\n</style>"),
            "<style>a{color:red}</style>"
        );
        assert_eq!(
            minify("<p style=\" color : red ; \">x</p>"),
            "<p style=\"color:red\">x</p>"
        );
    }

    #[test]
    fn test_inline_script() {
        let html = "<script>\n  function greet(personName) {\n    return 'hi ' + personName;\n  }\n</script>";
        let out = minify(html);
        assert!(out.starts_with("<script>") && out.ends_with("</script>"));
        assert!(!out.contains("personName"));
        assert!(!out.contains('\n'));

        let module = minify("<script type=\"module\">\n  const value = 1;\n  export default value;\n</script>");
        assert!(!module.contains('\n'));
    }

    #[test]
    fn test_non_javascript_script_untouched() {
        let html = "<script type=\"application/ld+json\">\n  { \"a\" :  1 }\n</script>";
        assert_eq!(minify(html), html);
        let broken = "<script>var = ;</script>";
        assert_eq!(minify(broken), broken);
    }

    #[test]
    fn test_beautify_keeps_layout() {
        let html = "<div>\n  <!-- c -->\n  <span>a  b</span>\n</div>";
        assert_eq!(minify_html(html, HtmlOptions::beautify()).unwrap(), html);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b  "), " a b ");
        assert_eq!(collapse_whitespace("\n   "), "");
        assert_eq!(collapse_whitespace("  "), " ");
    }
}
