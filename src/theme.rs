// src/theme.rs
//! Presentation theme injected into the newsletter before preview/download,
//! plus the readability styles used for fragments embedded in the dashboard.

const THEME_CSS: &str = r#"
<style>
:root {
  --primary: #16a34a;
  --accent: #06b6d4;
  --bg: #f8fafc;
  --text: #111827;
  --muted: #6b7280;
  --card: #ffffff;
}
html, body { background: var(--bg); color: var(--text); }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Inter, Arial, sans-serif; line-height: 1.65; }
.newsletter, main, article, section, .container {
  max-width: 900px; margin: 24px auto; background: var(--card);
  border: 1px solid #e5e7eb; border-radius: 12px; padding: 24px;
  box-shadow: 0 10px 30px rgba(2, 6, 23, 0.08);
}
h1 { margin: 0 0 16px 0; color: #fff; padding: 14px 18px; border-radius: 12px;
     background: linear-gradient(90deg, var(--primary), var(--accent));
     box-shadow: 0 6px 16px rgba(22,163,74,0.25); }
h2 { color: #0f172a; border-left: 6px solid var(--primary); padding-left: 12px; }
h3 { color: #0f172a; }
p { color: var(--text); }
small, .muted { color: var(--muted); }
a { color: #2563eb; text-decoration: none; }
a:hover { text-decoration: underline; }
blockquote { background: #f0fdf4; border-left: 5px solid var(--primary); padding: 10px 14px; border-radius: 10px; }
ul { padding-left: 22px; }
li { margin: 6px 0; }
hr { border: none; border-top: 1px solid #e5e7eb; margin: 24px 0; }
table { width: 100%; border-collapse: collapse; border: 1px solid #e5e7eb; }
th { background: #ecfeff; }
th, td { border: 1px solid #e5e7eb; padding: 8px 10px; text-align: left; }
code { background: #f1f5f9; padding: 2px 6px; border-radius: 6px; }
</style>
"#;

const FRAGMENT_CSS: &str = r#"
<style>
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Inter, Arial, sans-serif; }
h1 { font-size: 32px; }
h2 { font-size: 28px; color: #0f172a; }
h3 { font-size: 24px; color: #0f172a; }
p, li { font-size: 20px; line-height: 1.75; }
ul { padding-left: 22px; }
</style>
"#;

/// Byte offset just past the opening `<head ...>` tag, if any.
/// `<header>` does not count.
fn head_tag_end(html: &str) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut from = 0;
    while let Some(pos) = lower[from..].find("<head") {
        let start = from + pos;
        let after = start + "<head".len();
        match bytes.get(after) {
            Some(b'>') => return Some(after + 1),
            Some(c) if c.is_ascii_whitespace() => {
                return lower[after..].find('>').map(|close| after + close + 1);
            }
            Some(_) => from = after,
            None => return None,
        }
    }
    None
}

/// Insert the theme right after `<head>`, or prepend it when there is no head.
pub fn apply_theme(html: &str) -> String {
    match head_tag_end(html) {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + THEME_CSS.len());
            out.push_str(&html[..idx]);
            out.push_str(THEME_CSS);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{THEME_CSS}{html}"),
    }
}

/// Readability styles in front of a section/overview fragment.
pub fn style_fragment(fragment: &str) -> String {
    format!("{FRAGMENT_CSS}{fragment}")
}
