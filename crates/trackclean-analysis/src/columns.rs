//! Bodypart-qualified column resolution.
//!
//! `<bp>_x`, `<bp>_y` and `<bp>_likelihood` (or `<bp>_confidence`) are
//! grouped into one [`BodypartColumns`] per bodypart. Suffixes are matched
//! exactly, so bodypart names may themselves contain underscores.

use serde::Serialize;
use tracing::warn;

use trackclean_core::constants::{CONFIDENCE_SUFFIX, LIKELIHOOD_SUFFIX, X_SUFFIX, Y_SUFFIX};
use trackclean_core::types::BTreeMap;

use crate::warnings::CleaningWarning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    X,
    Y,
    Confidence,
}

impl ChannelKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Confidence => "confidence",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A bodypart name plus the channel a column carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodypartChannel {
    pub bodypart: String,
    pub kind: ChannelKind,
}

impl BodypartChannel {
    /// Parse a column name by suffix. Returns `None` for unrecognized names.
    ///
    /// Both confidence suffixes map to [`ChannelKind::Confidence`].
    pub fn parse(column: &str) -> Option<Self> {
        let suffixes = [
            (LIKELIHOOD_SUFFIX, ChannelKind::Confidence),
            (CONFIDENCE_SUFFIX, ChannelKind::Confidence),
            (X_SUFFIX, ChannelKind::X),
            (Y_SUFFIX, ChannelKind::Y),
        ];
        suffixes.iter().find_map(|(suffix, kind)| {
            column
                .strip_suffix(suffix)
                .filter(|bodypart| !bodypart.is_empty())
                .map(|bodypart| Self {
                    bodypart: bodypart.to_string(),
                    kind: *kind,
                })
        })
    }
}

/// Column indices of one recognized bodypart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodypartColumns {
    pub bodypart: String,
    pub x: usize,
    pub y: usize,
    pub confidence: Option<usize>,
}

/// Resolved mapping from bodypart to its channel columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnModel {
    bodyparts: Vec<BodypartColumns>,
    passthrough: Vec<usize>,
    warnings: Vec<CleaningWarning>,
}

#[derive(Default)]
struct Partial {
    x: Option<usize>,
    y: Option<usize>,
    likelihood: Option<usize>,
    confidence: Option<usize>,
}

impl ColumnModel {
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Self {
        let mut partials: BTreeMap<String, Partial> = BTreeMap::new();
        let mut claimed = vec![false; names.len()];

        for (index, name) in names.iter().enumerate() {
            let name = name.as_ref();
            let Some(channel) = BodypartChannel::parse(name) else {
                continue;
            };
            let partial = partials.entry(channel.bodypart).or_default();
            match channel.kind {
                ChannelKind::X => partial.x = Some(index),
                ChannelKind::Y => partial.y = Some(index),
                ChannelKind::Confidence if name.ends_with(LIKELIHOOD_SUFFIX) => {
                    partial.likelihood = Some(index)
                }
                ChannelKind::Confidence => partial.confidence = Some(index),
            }
        }

        let mut bodyparts = Vec::new();
        let mut warnings = Vec::new();

        for (bodypart, partial) in partials {
            match (partial.x, partial.y) {
                (Some(x), Some(y)) => {
                    claimed[x] = true;
                    claimed[y] = true;
                    let confidence = match (partial.likelihood, partial.confidence) {
                        (Some(used), Some(ignored)) => {
                            let used_name = names[used].as_ref().to_string();
                            let ignored_name = names[ignored].as_ref().to_string();
                            warn!(
                                bodypart = %bodypart,
                                used = %used_name,
                                ignored = %ignored_name,
                                "both confidence columns present, using likelihood"
                            );
                            warnings.push(CleaningWarning::DuplicateConfidence {
                                bodypart: bodypart.clone(),
                                used: used_name,
                                ignored: ignored_name,
                            });
                            Some(used)
                        }
                        (likelihood, confidence) => likelihood.or(confidence),
                    };
                    if let Some(c) = confidence {
                        claimed[c] = true;
                    }
                    bodyparts.push(BodypartColumns {
                        bodypart,
                        x,
                        y,
                        confidence,
                    });
                }
                (Some(present), None) | (None, Some(present)) => {
                    let column = names[present].as_ref().to_string();
                    let missing = if partial.x.is_some() {
                        format!("{bodypart}{Y_SUFFIX}")
                    } else {
                        format!("{bodypart}{X_SUFFIX}")
                    };
                    warn!(column = %column, missing = %missing, "coordinate column without partner");
                    warnings.push(CleaningWarning::OrphanCoordinate { column, missing });
                }
                (None, None) => {}
            }
        }

        let passthrough = claimed
            .iter()
            .enumerate()
            .filter(|(_, &c)| !c)
            .map(|(i, _)| i)
            .collect();

        Self {
            bodyparts,
            passthrough,
            warnings,
        }
    }

    /// Recognized bodyparts in sorted name order.
    pub fn bodyparts(&self) -> &[BodypartColumns] {
        &self.bodyparts
    }

    pub fn get(&self, bodypart: &str) -> Option<&BodypartColumns> {
        self.bodyparts
            .binary_search_by(|b| b.bodypart.as_str().cmp(bodypart))
            .ok()
            .map(|i| &self.bodyparts[i])
    }

    pub fn contains(&self, bodypart: &str) -> bool {
        self.get(bodypart).is_some()
    }

    /// Indices of columns no stage ever mutates.
    pub fn passthrough(&self) -> &[usize] {
        &self.passthrough
    }

    pub fn warnings(&self) -> &[CleaningWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_triples_in_sorted_order() {
        let model = ColumnModel::resolve(&[
            "snout_x",
            "snout_y",
            "snout_likelihood",
            "ear_left_x",
            "ear_left_y",
            "ear_left_likelihood",
        ]);
        let names: Vec<_> = model.bodyparts().iter().map(|b| b.bodypart.as_str()).collect();
        assert_eq!(names, vec!["ear_left", "snout"]);
        let ear = model.get("ear_left").unwrap();
        assert_eq!((ear.x, ear.y, ear.confidence), (3, 4, Some(5)));
        assert!(model.passthrough().is_empty());
        assert!(model.warnings().is_empty());
    }

    #[test]
    fn test_confidence_suffix_accepted() {
        let model = ColumnModel::resolve(&["a_x", "a_y", "a_confidence"]);
        assert_eq!(model.get("a").unwrap().confidence, Some(2));
    }

    #[test]
    fn test_likelihood_wins_over_confidence() {
        let model = ColumnModel::resolve(&["a_x", "a_y", "a_confidence", "a_likelihood"]);
        assert_eq!(model.get("a").unwrap().confidence, Some(3));
        assert_eq!(model.passthrough(), &[2]);
        assert!(matches!(
            model.warnings()[0],
            CleaningWarning::DuplicateConfidence { ref used, .. } if used == "a_likelihood"
        ));
    }

    #[test]
    fn test_missing_confidence_is_coordinate_only() {
        let model = ColumnModel::resolve(&["a_x", "a_y"]);
        assert_eq!(model.get("a").unwrap().confidence, None);
    }

    #[test]
    fn test_orphan_coordinate_is_passthrough() {
        let model = ColumnModel::resolve(&["tail_x", "tail_likelihood", "time"]);
        assert!(model.bodyparts().is_empty());
        assert_eq!(model.passthrough(), &[0, 1, 2]);
        assert!(matches!(
            model.warnings()[0],
            CleaningWarning::OrphanCoordinate { ref missing, .. } if missing == "tail_y"
        ));
    }

    #[test]
    fn test_exact_suffix_matching() {
        assert_eq!(
            BodypartChannel::parse("left_x_y"),
            Some(BodypartChannel {
                bodypart: "left_x".into(),
                kind: ChannelKind::Y
            })
        );
        assert_eq!(BodypartChannel::parse("_x"), None);
        assert_eq!(BodypartChannel::parse("index"), None);
    }
}
