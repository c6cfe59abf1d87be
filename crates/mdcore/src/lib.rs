pub mod markdown;
pub mod preview;
pub mod sanitize;

pub use markdown::to_html;
pub use preview::{preview, LineKind, PreviewLine, PreviewSpan, SpanStyle};
pub use sanitize::sanitize_html;

/// Render `src` to HTML that is safe to hand to a browser.
pub fn to_safe_html(src: &str) -> String {
    sanitize::sanitize_html(&markdown::to_html(src))
}
