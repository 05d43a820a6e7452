// src/artifacts.rs
//! Artifact reader: loads whatever the pipeline left in the results directory.
//!
//! Nothing here returns an error. A missing file, an unreadable file, an empty
//! file and a file that fails to parse all come back as [`Loaded::Absent`]
//! (or an empty string for text artifacts). The reason is logged, never
//! returned, so callers can't branch on it.

use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::schema::{FetchResult, SummariesOutput};

/// Outcome of reading a structured artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    Found(T),
    Absent,
}

impl<T> Loaded<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Loaded::Found(v) => Some(v),
            Loaded::Absent => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Loaded::Found(_))
    }
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Loaded::Absent
    }
}

// Only used for logs/metrics.
#[derive(Debug, Clone, Copy)]
enum AbsentReason {
    Missing,
    Unreadable,
    Empty,
    Malformed,
    WrongShape,
}

impl AbsentReason {
    fn as_str(self) -> &'static str {
        match self {
            AbsentReason::Missing => "missing",
            AbsentReason::Unreadable => "unreadable",
            AbsentReason::Empty => "empty",
            AbsentReason::Malformed => "malformed",
            AbsentReason::WrongShape => "wrong_shape",
        }
    }
}

fn note_absent(path: &Path, reason: AbsentReason) {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    debug!(target: "artifacts", artifact = %name, reason = reason.as_str(), "artifact absent");
    counter!("artifact_absent_total", "artifact" => name, "reason" => reason.as_str()).increment(1);
}

fn try_read_text(path: &Path) -> Result<String, AbsentReason> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AbsentReason::Missing,
        _ => AbsentReason::Unreadable,
    })?;
    String::from_utf8(bytes).map_err(|_| AbsentReason::Unreadable)
}

/// Whole file as UTF-8, or "" if it is missing or can't be decoded.
pub fn read_text(path: &Path) -> String {
    match try_read_text(path) {
        Ok(s) => s,
        Err(reason) => {
            note_absent(path, reason);
            String::new()
        }
    }
}

/// Strip a surrounding ```` ``` ```` fence (with optional language tag) that
/// generative output sometimes wraps JSON in. Returns trimmed text either way.
pub fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };

    // The fence line may carry a tag like `json`; anything else on it is content.
    let body = match rest.find('\n') {
        Some(nl) if is_fence_tag(&rest[..nl]) => &rest[nl + 1..],
        _ => rest,
    };

    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn is_fence_tag(s: &str) -> bool {
    s.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

/// Parse a JSON artifact, fenced or not.
pub fn read_structured(path: &Path) -> Loaded<serde_json::Value> {
    match try_read_structured(path) {
        Ok(v) => Loaded::Found(v),
        Err(reason) => {
            note_absent(path, reason);
            Loaded::Absent
        }
    }
}

fn try_read_structured(path: &Path) -> Result<serde_json::Value, AbsentReason> {
    let text = try_read_text(path)?;
    let body = strip_code_fence(&text);
    if body.is_empty() {
        return Err(AbsentReason::Empty);
    }
    serde_json::from_str(body).map_err(|_| AbsentReason::Malformed)
}

/// [`read_structured`] followed by conversion into `T`. A shape mismatch is
/// absent too; no partial parse is attempted.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Loaded<T> {
    let value = match read_structured(path) {
        Loaded::Found(v) => v,
        Loaded::Absent => return Loaded::Absent,
    };
    match serde_json::from_value(value) {
        Ok(v) => Loaded::Found(v),
        Err(_) => {
            note_absent(path, AbsentReason::WrongShape);
            Loaded::Absent
        }
    }
}

/// Where the pipeline writes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArtifactLayout {
    pub results_dir: PathBuf,
    pub news: String,
    pub summaries: String,
    pub draft: String,
    pub newsletter: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::in_dir("results")
    }
}

impl ArtifactLayout {
    /// Default file names inside `dir`.
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            results_dir: dir.into(),
            news: "news.md".to_string(),
            summaries: "editorial.md".to_string(),
            draft: "draft.html".to_string(),
            newsletter: "newsletter.html".to_string(),
        }
    }

    pub fn news_path(&self) -> PathBuf {
        self.results_dir.join(&self.news)
    }

    pub fn summaries_path(&self) -> PathBuf {
        self.results_dir.join(&self.summaries)
    }

    pub fn draft_path(&self) -> PathBuf {
        self.results_dir.join(&self.draft)
    }

    pub fn newsletter_path(&self) -> PathBuf {
        self.results_dir.join(&self.newsletter)
    }
}

/// Everything the presenter reads, loaded in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    pub fetch: Loaded<FetchResult>,
    pub summaries: Loaded<SummariesOutput>,
    /// Produced by the pipeline but not reconciled.
    pub draft_html: String,
    pub final_html: String,
}

impl ArtifactSet {
    pub fn load(layout: &ArtifactLayout) -> Self {
        let set = Self {
            fetch: read_artifact(&layout.news_path()),
            summaries: read_artifact(&layout.summaries_path()),
            draft_html: read_text(&layout.draft_path()),
            final_html: read_text(&layout.newsletter_path()),
        };
        debug!(
            target: "artifacts",
            dir = %layout.results_dir.display(),
            fetch = set.fetch.is_found(),
            summaries = set.summaries.is_found(),
            draft_len = set.draft_html.len(),
            final_len = set.final_html.len(),
            "artifacts loaded"
        );
        set
    }

    pub fn is_empty(&self) -> bool {
        !self.fetch.is_found()
            && !self.summaries.is_found()
            && self.draft_html.trim().is_empty()
            && self.final_html.trim().is_empty()
    }
}
