use serde::{Deserialize, Serialize};

use super::{ClassifyError, ClassifyResult, Sentiment};

/// Substring markers that identify one canonical sentiment in raw labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMarkers {
    pub sentiment: Sentiment,
    pub markers: Vec<String>,
}

impl LabelMarkers {
    pub fn new(sentiment: Sentiment, markers: &[&str]) -> Self {
        Self {
            sentiment,
            markers: markers.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Ordered marker groups used to fold raw classifier labels into a [`Sentiment`].
///
/// Groups are tested in order and the first group with a marker contained in
/// the lower-cased label wins. Labels matching no group are `Neutral`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelScheme {
    groups: Vec<LabelMarkers>,
}

impl LabelScheme {
    pub fn new(groups: Vec<LabelMarkers>) -> ClassifyResult<Self> {
        let mut normalized = Vec::with_capacity(groups.len());
        for group in groups {
            let mut markers = Vec::with_capacity(group.markers.len());
            for marker in group.markers {
                // An empty marker is contained in every label.
                if marker.trim().is_empty() {
                    return Err(ClassifyError::invalid(
                        "labels",
                        format!("empty marker in {} group", group.sentiment),
                    ));
                }
                markers.push(marker.to_lowercase());
            }
            normalized.push(LabelMarkers {
                sentiment: group.sentiment,
                markers,
            });
        }
        Ok(Self { groups: normalized })
    }

    pub fn groups(&self) -> &[LabelMarkers] {
        &self.groups
    }

    /// Markers of the built-in scheme. Negative is listed first: 3-class
    /// schemes such as `LABEL_0`/`LABEL_1`/`LABEL_2` must resolve `0` before
    /// any positive marker is considered.
    pub fn default_groups() -> Vec<LabelMarkers> {
        vec![
            LabelMarkers::new(Sentiment::Negative, &["neg", "0", "-", "negativ"]),
            LabelMarkers::new(Sentiment::Positive, &["pos", "2", "+", "positiv"]),
        ]
    }
}

impl Default for LabelScheme {
    fn default() -> Self {
        Self {
            groups: Self::default_groups(),
        }
    }
}
