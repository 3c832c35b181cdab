//! HTML helper functions

/// Escape the three characters that can start markup: `&`, `<`, `>`
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape HTML special characters, including quotes, for attribute values
pub fn html_escape(s: &str) -> String {
    escape_text(s).replace('"', "&quot;").replace('\'', "&#39;")
}

/// Generate an anchor tag
///
/// # Examples
/// ```ignore
/// link_to("content/a.md", "a.md", true) // -> <a href="content/a.md" target="_blank" rel="noopener">a.md</a>
/// ```
pub fn link_to(href: &str, text: &str, new_tab: bool) -> String {
    if new_tab {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(href),
            html_escape(text)
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(href), html_escape(text))
    }
}
