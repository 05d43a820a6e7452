// src/reconcile.rs
//! Topic reconciliation and per-topic content selection.
//!
//! Two independently failable sources name topics: the rendered newsletter's
//! section titles and the structured summaries. A topic is shown if either
//! source recovered it, so a half-failed run still lists what it can.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::schema::{FetchResult, SummariesOutput};
use crate::sections::Section;
use crate::topics::Topic;

/// Eligible topics in canonical order.
///
/// `overview_title` is excluded from the section titles (case-insensitively)
/// before merging; the summaries' topic names are taken as-is. Names outside
/// the canonical set are dropped.
pub fn reconcile_topics(
    sections: &[Section],
    overview_title: Option<&str>,
    summaries: Option<&SummariesOutput>,
) -> Vec<Topic> {
    let excluded = overview_title.map(str::to_lowercase);

    let from_sections = sections
        .iter()
        .map(|s| s.title.as_str())
        .filter(|t| excluded.as_deref() != Some(t.to_lowercase().as_str()));
    let from_summaries = summaries.into_iter().flat_map(|s| s.topic_names());

    // BTreeSet orders by Topic's canonical Ord
    from_sections
        .chain(from_summaries)
        .filter_map(Topic::from_name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Where the topic's main text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "text", rename_all = "snake_case")]
pub enum TopicBody {
    /// Section markup from the rendered newsletter.
    Rendered(String),
    /// Plain `summary` text from the structured summaries.
    Summary(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicPanel {
    pub topic: Topic,
    pub body: TopicBody,
    pub bullets: Vec<String>,
    pub further_reading: Vec<Link>,
}

/// Resolve what to show for `topic`.
pub fn topic_panel(
    topic: Topic,
    sections: &[Section],
    summaries: Option<&SummariesOutput>,
    fetch: Option<&FetchResult>,
) -> TopicPanel {
    let name = topic.name();
    let summary = summaries.and_then(|s| s.topic(name));

    let rendered = sections
        .iter()
        .find(|s| s.title == name)
        .map(|s| s.body.as_str())
        .filter(|b| !b.trim().is_empty());
    let summary_text = summary
        .map(|t| t.summary.trim())
        .filter(|s| !s.is_empty());

    let body = match (rendered, summary_text) {
        (Some(html), _) => TopicBody::Rendered(html.to_string()),
        (None, Some(text)) => TopicBody::Summary(text.to_string()),
        (None, None) => TopicBody::Empty,
    };

    let bullets = summary
        .map(|t| {
            t.bullets
                .iter()
                .map(|b| b.trim())
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let further_reading = fetch
        .map(|f| f.items_for(name))
        .unwrap_or_default()
        .iter()
        .filter(|it| it.is_linkable())
        .map(|it| {
            let url = it.url.trim().to_string();
            let title = match it.title.trim() {
                "" => url.clone(),
                t => t.to_string(),
            };
            Link { title, url }
        })
        .collect();

    TopicPanel {
        topic,
        body,
        bullets,
        further_reading,
    }
}
