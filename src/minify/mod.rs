//! CSS, JavaScript and HTML minification

mod css;
mod html;
mod js;

pub use css::{beautify_css, minify_css, minify_declarations};
pub use html::{minify_html, HtmlOptions};
pub use js::{beautify_js, minify_js, ScriptKind};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinifyError {
    /// Parse errors joined by `, `
    #[error("{0}")]
    InvalidCss(String),

    #[error("JavaScript parse failed: {0}")]
    InvalidJs(String),

    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}
