// src/schema.rs
//! Shapes of the structured artifacts the pipeline writes.
//!
//! Topic names stay raw strings here: an artifact may mention a topic outside
//! the canonical set, and that must not make the whole file unreadable. The
//! reconciler filters names against [`crate::topics::Topic`] later.

use serde::{Deserialize, Serialize};

/// A reference to an external article.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl NewsItem {
    /// Only http(s) urls are linked; other items stay in the data.
    pub fn is_linkable(&self) -> bool {
        let url = self.url.trim();
        ["http://", "https://"].iter().any(|scheme| {
            url.len() > scheme.len()
                && url
                    .get(..scheme.len())
                    .is_some_and(|p| p.eq_ignore_ascii_case(scheme))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicItems {
    pub topic: String,
    #[serde(default)]
    pub items: Vec<NewsItem>,
}

/// Raw research output, one entry per topic in the order the pipeline wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchResult {
    #[serde(default)]
    pub topics: Vec<TopicItems>,
}

impl FetchResult {
    /// Items for `topic` (first matching entry), or an empty slice.
    pub fn items_for(&self, topic: &str) -> &[NewsItem] {
        self.topics
            .iter()
            .find(|t| t.topic == topic)
            .map(|t| t.items.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicSummary {
    pub topic: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// Condensed editorial output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummariesOutput {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub topics: Vec<TopicSummary>,
}

impl SummariesOutput {
    pub fn topic(&self, topic: &str) -> Option<&TopicSummary> {
        self.topics.iter().find(|t| t.topic == topic)
    }

    /// Non-empty topic names, in artifact order.
    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics
            .iter()
            .map(|t| t.topic.as_str())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_result_tolerates_missing_optional_fields() {
        let raw = r#"{"topics":[{"topic":"Treatment Methods","items":[
            {"title":"A","url":"https://a.example"},
            {"title":"No link"}
        ]}]}"#;
        let fr: FetchResult = serde_json::from_str(raw).unwrap();
        let items = fr.items_for("Treatment Methods");
        assert_eq!(items.len(), 2);
        assert!(items[0].is_linkable());
        assert!(!items[1].is_linkable());
        assert!(items[0].publish_date.is_none());
        assert!(fr.items_for("Precision Oncology").is_empty());
    }

    #[test]
    fn only_http_urls_are_linkable() {
        let item = |url: &str| NewsItem {
            url: url.into(),
            ..Default::default()
        };
        assert!(item("HTTPS://news.example/a").is_linkable());
        assert!(item(" http://news.example ").is_linkable());
        assert!(!item("javascript:alert(document.cookie)").is_linkable());
        assert!(!item("data:text/html,<script>x</script>").is_linkable());
        assert!(!item("//news.example/a").is_linkable());
        assert!(!item("https://").is_linkable());
    }

    #[test]
    fn summaries_default_bullets_and_overview() {
        let raw = r#"{"topics":[{"topic":"Precision Oncology","summary":"s"}]}"#;
        let so: SummariesOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(so.overview, "");
        let t = so.topic("Precision Oncology").unwrap();
        assert_eq!(t.summary, "s");
        assert!(t.bullets.is_empty());
    }

    #[test]
    fn topic_names_skip_empty() {
        let so = SummariesOutput {
            overview: String::new(),
            topics: vec![
                TopicSummary {
                    topic: String::new(),
                    ..Default::default()
                },
                TopicSummary {
                    topic: "Treatment Methods".into(),
                    ..Default::default()
                },
            ],
        };
        assert_eq!(so.topic_names().collect::<Vec<_>>(), vec!["Treatment Methods"]);
    }
}
