//! Page chrome shared by every HTML handler.

/// Navigation HTML template shared across all pages
pub const NAV_HTML: &str = include_str!("../../templates/nav.html");

/// Wrap a page body in the document shell. `nav` marks the active link.
pub fn render_page(title: &str, nav: &str, body: &str, scripts: &[&str]) -> String {
    let scripts: String = scripts
        .iter()
        .map(|src| format!(r#"<script src="{src}" defer></script>"#))
        .collect();

    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} — SecureWatch</title>
    <link rel="stylesheet" href="/static/css/main.css?v=0.1.0">
    <script src="/static/js/app.js" defer></script>
    {scripts}
</head>
<body data-nav="{nav}">
<div class="app-container">
{NAV_HTML}
<main class="main-content">
{body}
</main>
</div>
</body>
</html>"#)
}

pub fn page_header(title: &str, subtitle: &str, actions: &str) -> String {
    format!(r#"
    <div class="page-header">
        <div>
            <h1 class="page-title">{title}</h1>
            <p class="text-muted">{subtitle}</p>
        </div>
        <div class="d-flex gap-3">{actions}</div>
    </div>"#)
}

/// Minimal HTML escaping for request-derived text.
pub fn escape_html(raw: &str) -> String {
    raw.chars().fold(String::with_capacity(raw.len()), |mut out, c| {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
        out
    })
}
