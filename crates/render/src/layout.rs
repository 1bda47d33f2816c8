use shelter_pages_core::PageContent;

/// Escape text for use in HTML content and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Link target safe to put in an `href`. Relative links and `http(s)` URLs
/// pass through; any other scheme (`javascript:`, `data:`, ...) becomes `#`.
pub(crate) fn safe_href(link: &str) -> &str {
    let link = link.trim();
    // Browsers ignore tabs and newlines inside a scheme.
    let cleaned: String = link
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    match cleaned.find([':', '/', '?', '#']) {
        Some(end) if cleaned[end..].starts_with(':') => {
            let scheme = &cleaned[..end];
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
                link
            } else {
                "#"
            }
        }
        _ => link,
    }
}

/// Wrap page content in the site's HTML shell.
pub fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Title and subtitle block at the top of a page.
pub fn render_summary(content: &PageContent) -> String {
    format!(
        r#"<section class="summary"><h1 class="summary-title">{}</h1><p class="summary-subtitle">{}</p></section>"#,
        html_escape(&content.title),
        html_escape(&content.subtitle),
    )
}
