// src/topics.rs
//! Canonical newsletter topics.
//!
//! The set is closed: anything an artifact names outside these five is not a
//! topic, no matter how close the spelling. Declaration order is the canonical
//! display order (and the `Ord` impl follows it).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "Research & Prevention")]
    ResearchPrevention,
    #[serde(rename = "Early Detection and Diagnosis")]
    EarlyDetection,
    #[serde(rename = "Drug Discovery and Development")]
    DrugDiscovery,
    #[serde(rename = "Treatment Methods")]
    TreatmentMethods,
    #[serde(rename = "Precision Oncology")]
    PrecisionOncology,
}

impl Topic {
    /// All topics in canonical order.
    pub const ALL: [Topic; 5] = [
        Topic::ResearchPrevention,
        Topic::EarlyDetection,
        Topic::DrugDiscovery,
        Topic::TreatmentMethods,
        Topic::PrecisionOncology,
    ];

    /// Display name, exactly as the pipeline writes it.
    pub fn name(self) -> &'static str {
        match self {
            Topic::ResearchPrevention => "Research & Prevention",
            Topic::EarlyDetection => "Early Detection and Diagnosis",
            Topic::DrugDiscovery => "Drug Discovery and Development",
            Topic::TreatmentMethods => "Treatment Methods",
            Topic::PrecisionOncology => "Precision Oncology",
        }
    }

    /// Exact, case-sensitive lookup. Near misses are not topics.
    pub fn from_name(name: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::from_name(s).ok_or_else(|| anyhow::anyhow!("unknown topic: {s}"))
    }
}
