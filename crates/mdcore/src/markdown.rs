use comrak::{markdown_to_html, Options};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MATH_BLOCK: Regex =
        Regex::new(r"\$\$([^\$]+)\$\$").expect("Invalid MATH_BLOCK regex pattern");
    // No space just inside the dollars and no digit right after the closing
    // one, so prices like "$5 and $10" stay text.
    static ref MATH_INLINE: Regex = Regex::new(r"\$([^\s$](?:[^$\n]*[^\s$])?)\$(\D|$)")
        .expect("Invalid MATH_INLINE regex pattern");
    static ref HIGHLIGHT: Regex =
        Regex::new(r"==([^=\n<>]+)==").expect("Invalid HIGHLIGHT regex pattern");
    static ref CODE: Regex =
        Regex::new(r"(?s)<code[^>]*>.*?</code>").expect("Invalid CODE regex pattern");
}

/// Render a buffer to HTML. Never fails: malformed markup comes out as text.
pub fn to_html(src: &str) -> String {
    let html = markdown_to_html(src, &options());
    let html = patch_math(&html);
    patch_highlight(&html)
}

/// GFM-flavoured parse/render options shared by the HTML and preview paths.
pub(crate) fn options() -> Options<'static> {
    let mut opt = Options::default();

    opt.extension.strikethrough = true;
    opt.extension.table = true;
    opt.extension.autolink = true;
    opt.extension.tasklist = true;
    opt.extension.superscript = true;
    opt.extension.footnotes = true;
    opt.extension.description_lists = true;

    // Raw HTML in the buffer is shown, never executed.
    opt.render.unsafe_ = false;
    opt.render.escape = true;

    opt
}

/// Turn `$$…$$` and `$…$` into placeholders a math renderer can pick up.
/// Code spans and code blocks are left alone.
pub fn patch_math(html: &str) -> String {
    outside_code(html, |text| {
        let blocks = MATH_BLOCK.replace_all(
            text,
            r#"<div class="math-block" data-math="${1}">${1}</div>"#,
        );
        MATH_INLINE
            .replace_all(
                &blocks,
                r#"<span class="math-inline" data-math="${1}">${1}</span>${2}"#,
            )
            .into_owned()
    })
}

/// `==text==` becomes `<mark>text</mark>`, except inside code.
pub fn patch_highlight(html: &str) -> String {
    outside_code(html, |text| {
        HIGHLIGHT.replace_all(text, "<mark>${1}</mark>").into_owned()
    })
}

// Apply `patch` to every stretch of `html` that is not a `<code>` element.
fn outside_code(html: &str, patch: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for code in CODE.find_iter(html) {
        out.push_str(&patch(&html[last..code.start()]));
        out.push_str(code.as_str());
        last = code.end();
    }
    out.push_str(&patch(&html[last..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_text() {
        let html = to_html("# Willkommen 👋\n\nDies ist mein **Markdown Editor**!");
        assert!(html.contains("<h1>Willkommen 👋</h1>"));
        assert!(html.contains("<strong>Markdown Editor</strong>"));
    }

    #[test]
    fn test_gfm_extensions() {
        let html = to_html("~~gone~~ and X^2^\n\n- [ ] open\n- [x] done");
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<sup>2</sup>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_footnote_and_table() {
        let html = to_html("Text[^1]\n\n[^1]: Footnote\n\n| a | b |\n| - | - |\n| 1 | 2 |");
        assert!(html.contains("footnote"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = to_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_unbalanced_markup_does_not_panic() {
        for src in ["**open", "[link](", "| a |\n|", "```\nunterminated", "==", "$$", "> > >"] {
            let _ = to_html(src);
        }
    }

    #[test]
    fn test_currency_is_not_math() {
        let html = to_html("I paid $5 and $10");
        assert!(!html.contains("math-inline"));
        assert!(html.contains("I paid $5 and $10"));
    }

    #[test]
    fn test_math_patch() {
        let patched = patch_math("<p>$$y = mx$$ and $x^2$</p>");
        assert!(patched.contains(r#"<div class="math-block" data-math="y = mx">"#));
        assert!(patched.contains(r#"<span class="math-inline" data-math="x^2">"#));
    }
}
