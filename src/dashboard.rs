// src/dashboard.rs
//! Server-rendered dashboard page.
//!
//! Artifact text is untrusted: plain text is escaped, and markup fragments
//! (overview/topic sections) are only ever embedded through an iframe
//! `srcdoc`, never inlined into the page itself.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write as _;

use crate::reconcile::{TopicBody, TopicPanel};
use crate::runner::RunOutcome;
use crate::theme::style_fragment;
use crate::view::{OverviewPanel, ViewModel, NO_NEWSLETTER_MSG};

const PAGE_CSS: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Inter, Arial, sans-serif; margin: 0; display: flex; }
aside { width: 280px; padding: 16px; background: #f1f5f9; min-height: 100vh; box-sizing: border-box; }
main { flex: 1; padding: 16px 24px; }
.app-banner { background: linear-gradient(90deg, #22c55e 0%, #06b6d4 100%); padding: 10px 16px;
  border-radius: 10px; color: white; font-weight: 600; margin-bottom: 12px; }
.card { background: #ffffff; border: 1px solid #e5e7eb; border-radius: 12px;
  box-shadow: 0 4px 18px rgba(0,0,0,0.06); padding: 10px; margin-bottom: 16px; }
.info { background: #eff6ff; border-radius: 8px; padding: 8px 12px; color: #1e3a8a; }
.ok { background: #f0fdf4; border-radius: 8px; padding: 8px 12px; color: #166534; }
.err { background: #fef2f2; border-radius: 8px; padding: 8px 12px; color: #991b1b; }
iframe { width: 100%; border: none; }
.topic-text { font-size: 20px; line-height: 1.75; }
"#;

fn outcome_banner(out: &RunOutcome) -> String {
    let class = match out {
        RunOutcome::Succeeded { .. } => "ok",
        RunOutcome::Failed { .. } => "err",
        RunOutcome::Busy => "info",
    };
    let when = match out {
        RunOutcome::Succeeded { at } | RunOutcome::Failed { at, .. } => {
            format!(" <small>({})</small>", at.format("%Y-%m-%d %H:%M:%S UTC"))
        }
        RunOutcome::Busy => String::new(),
    };
    format!(
        r#"<div class="{class}">{}{when}</div>"#,
        text(&out.message())
    )
}

fn fragment_frame(fragment: &str, height: u32) -> String {
    format!(
        r#"<iframe sandbox="allow-popups" style="height:{height}px" srcdoc="{}"></iframe>"#,
        attr(&style_fragment(fragment))
    )
}

fn sidebar(out: &mut String, view: &ViewModel, last_run: Option<&RunOutcome>) {
    out.push_str("<aside><h2>Controls</h2>");
    out.push_str(r#"<form method="post" action="/run"><button type="submit">Run pipeline</button></form>"#);
    out.push_str("<p><small>Runs the newsletter pipeline and refreshes outputs.</small></p>");
    if let Some(run) = last_run {
        out.push_str(&outcome_banner(run));
    }
    out.push_str("<hr><h3>Topics</h3>");

    if view.topics.is_empty() {
        let _ = write!(
            out,
            r#"<div class="info">{}</div>"#,
            text(view.notice.unwrap_or_default())
        );
    } else {
        out.push_str(r#"<form method="get" action="/">"#);
        for t in &view.topics {
            let checked = if view.selected == Some(*t) { " checked" } else { "" };
            let _ = write!(
                out,
                r#"<label><input type="radio" name="topic" value="{}" onchange="this.form.submit()"{checked}> {}</label><br>"#,
                attr(t.name()),
                text(t.name())
            );
        }
        out.push_str(r#"<noscript><button type="submit">Show</button></noscript></form>"#);
    }
    out.push_str("</aside>");
}

fn overview_card(out: &mut String, overview: &OverviewPanel) {
    out.push_str(r#"<h2>Main Summary</h2><div class="card">"#);
    match overview {
        OverviewPanel::Rendered { body, .. } => out.push_str(&fragment_frame(body, 620)),
        OverviewPanel::Summary { text: t } => {
            let _ = write!(out, "<p>{}</p>", text(t));
        }
        OverviewPanel::Empty { message } => {
            let _ = write!(out, r#"<div class="info">{}</div>"#, text(message));
        }
    }
    out.push_str("</div>");
}

fn topic_card(out: &mut String, panel: &TopicPanel) {
    let _ = write!(
        out,
        r#"<h2>Summary: {}</h2><div class="card">"#,
        text(panel.topic.name())
    );
    match &panel.body {
        TopicBody::Rendered(html) => out.push_str(&fragment_frame(html, 700)),
        TopicBody::Summary(t) => {
            let _ = write!(out, r#"<div class="topic-text">{}</div>"#, text(t));
        }
        TopicBody::Empty => {}
    }
    if !panel.bullets.is_empty() {
        out.push_str("<ul>");
        for b in &panel.bullets {
            let _ = write!(out, "<li>{}</li>", text(b));
        }
        out.push_str("</ul>");
    }
    out.push_str("</div>");

    if !panel.further_reading.is_empty() {
        out.push_str("<p><strong>Further reading</strong></p><ul>");
        for link in &panel.further_reading {
            let _ = write!(
                out,
                r#"<li><a href="{}" target="_blank" rel="noopener">{}</a></li>"#,
                attr(&link.url),
                text(&link.title)
            );
        }
        out.push_str("</ul>");
    }
}

fn preview_card(out: &mut String, has_newsletter: bool) {
    out.push_str("<h2>Final Newsletter (preview)</h2>");
    if !has_newsletter {
        let _ = write!(out, r#"<div class="info">{}</div>"#, text(NO_NEWSLETTER_MSG));
        return;
    }
    out.push_str(
        r#"<div class="card"><iframe sandbox="allow-popups" style="height:650px" src="/preview"></iframe></div>"#,
    );
    out.push_str(r#"<p><a href="/newsletter.html" download>Download newsletter.html</a></p>"#);
}

/// Full dashboard page.
pub fn render_page(title: &str, view: &ViewModel, last_run: Option<&RunOutcome>) -> String {
    let mut out = String::with_capacity(8 * 1024);
    let _ = write!(
        out,
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{}</title><style>{PAGE_CSS}</style></head><body>"#,
        text(title)
    );
    sidebar(&mut out, view, last_run);

    let _ = write!(
        out,
        r#"<main><h1>{}</h1><div class="app-banner">Final AI Newsletter</div>"#,
        text(title)
    );
    overview_card(&mut out, &view.overview);
    if let Some(panel) = &view.panel {
        topic_card(&mut out, panel);
    }
    preview_card(&mut out, view.has_newsletter);
    out.push_str("</main></body></html>");
    out
}
