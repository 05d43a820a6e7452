// src/view.rs
//! View model for the dashboard, rebuilt from the artifacts on every request.

use metrics::counter;
use serde::Serialize;
use tracing::debug;

use crate::artifacts::ArtifactSet;
use crate::overview::select_overview;
use crate::reconcile::{reconcile_topics, topic_panel, TopicPanel};
use crate::sections::{extract_sections, Section};
use crate::topics::Topic;

pub const NO_TOPICS_MSG: &str = "Run the pipeline to populate topics.";
pub const NO_OVERVIEW_MSG: &str = "Run the pipeline to populate the overview summary.";
pub const NO_NEWSLETTER_MSG: &str = "No final newsletter yet. Click 'Run pipeline' to generate.";

/// The one piece of mutable UI state: which topic is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    selected: Option<Topic>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Topic> {
        self.selected
    }

    /// Record a user choice. Callers only offer eligible topics; anything
    /// else is replaced on the next [`build_view`].
    pub fn select(&mut self, topic: Topic) {
        self.selected = Some(topic);
    }

    /// Keep the selection if it is still eligible, otherwise fall back to
    /// the first eligible topic (or nothing).
    pub fn settle(&mut self, eligible: &[Topic]) -> Option<Topic> {
        match self.selected {
            Some(t) if eligible.contains(&t) => {}
            _ => self.selected = eligible.first().copied(),
        }
        self.selected
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum OverviewPanel {
    /// Overview section of the rendered newsletter (markup).
    Rendered { title: String, body: String },
    /// `overview` text of the structured summaries.
    Summary { text: String },
    Empty { message: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    /// Eligible topics, canonical order.
    pub topics: Vec<Topic>,
    pub selected: Option<Topic>,
    pub overview: OverviewPanel,
    pub panel: Option<TopicPanel>,
    /// Informational message when there is nothing to select.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    pub has_newsletter: bool,
}

/// Reconcile the artifacts into a view, settling `state` against the
/// eligible topics.
pub fn build_view(artifacts: &ArtifactSet, state: &mut ViewState) -> ViewModel {
    counter!("view_builds_total").increment(1);

    let sections: Vec<Section> = extract_sections(&artifacts.final_html);
    let overview_section = select_overview(&sections);
    let summaries = artifacts.summaries.found();
    let fetch = artifacts.fetch.found();

    let topics = reconcile_topics(
        &sections,
        overview_section.map(|s| s.title.as_str()),
        summaries,
    );
    let selected = state.settle(&topics);

    let overview = match (overview_section, summaries.map(|s| s.overview.trim())) {
        (Some(s), _) if !s.body.is_empty() => OverviewPanel::Rendered {
            title: s.title.clone(),
            body: s.body.clone(),
        },
        (_, Some(text)) if !text.is_empty() => OverviewPanel::Summary {
            text: text.to_string(),
        },
        _ => OverviewPanel::Empty {
            message: NO_OVERVIEW_MSG,
        },
    };

    let panel = selected.map(|t| topic_panel(t, &sections, summaries, fetch));

    debug!(
        target: "view",
        sections = sections.len(),
        topics = topics.len(),
        selected = ?selected,
        "view built"
    );

    ViewModel {
        notice: topics.is_empty().then_some(NO_TOPICS_MSG),
        topics,
        selected,
        overview,
        panel,
        has_newsletter: !artifacts.final_html.trim().is_empty(),
    }
}
