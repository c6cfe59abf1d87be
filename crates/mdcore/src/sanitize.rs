use ammonia::Builder;

/// Strip anything executable from rendered HTML, keeping the classes the
/// math and highlight post-passes add.
pub fn sanitize_html(html: &str) -> String {
    sanitizer().clean(html).to_string()
}

/// Strict variant: ammonia's defaults with no extra classes.
pub fn sanitize_strict(html: &str) -> String {
    Builder::default().clean(html).to_string()
}

fn sanitizer() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .add_allowed_classes("span", &["math-inline"])
        .add_allowed_classes("div", &["math-block"])
        .add_tag_attributes("span", &["data-math"])
        .add_tag_attributes("div", &["data-math"]);
    builder
}
