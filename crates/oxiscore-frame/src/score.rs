//! Score-type enumeration for system predictions.
//!
//! A predicted score passes through a fixed pipeline: the raw model output,
//! optionally rescaled to the human score distribution, then trimmed to the
//! valid score range, then rounded to an integer label. Each stage is a
//! distinct column in the prediction frame, and every evaluation table is
//! ordered by this canonical sequence.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One stage of the raw/scaled/trimmed/rounded prediction pipeline.
///
/// The enumeration is closed: evaluation tables are always filtered to the
/// order given by [`ScoreType::ALL`], retaining only the stages actually
/// present in the data.
///
/// # Examples
///
/// ```
/// use oxiscore_frame::score::ScoreType;
///
/// assert_eq!(ScoreType::RawTrim.to_string(), "raw_trim");
/// assert_eq!("scale_trim_round".parse(), Ok(ScoreType::ScaleTrimRound));
/// assert_eq!(ScoreType::ALL.len(), 6);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    /// Raw model prediction.
    #[display("raw")]
    Raw,
    /// Raw prediction trimmed to the valid score range.
    #[display("raw_trim")]
    RawTrim,
    /// Trimmed raw prediction rounded to an integer label.
    #[display("raw_trim_round")]
    RawTrimRound,
    /// Prediction rescaled to the human score distribution.
    #[display("scale")]
    Scale,
    /// Rescaled prediction trimmed to the valid score range.
    #[display("scale_trim")]
    ScaleTrim,
    /// Trimmed rescaled prediction rounded to an integer label.
    #[display("scale_trim_round")]
    ScaleTrimRound,
}

impl ScoreType {
    /// All score types in canonical tabulation order.
    pub const ALL: [ScoreType; 6] = [
        ScoreType::Raw,
        ScoreType::RawTrim,
        ScoreType::RawTrimRound,
        ScoreType::Scale,
        ScoreType::ScaleTrim,
        ScoreType::ScaleTrimRound,
    ];

    /// The trimmed stage for the raw or scaled branch of the pipeline.
    #[must_use]
    pub fn trim(use_scaled: bool) -> Self {
        if use_scaled {
            ScoreType::ScaleTrim
        } else {
            ScoreType::RawTrim
        }
    }

    /// The trimmed-and-rounded stage for the raw or scaled branch.
    #[must_use]
    pub fn trim_round(use_scaled: bool) -> Self {
        if use_scaled {
            ScoreType::ScaleTrimRound
        } else {
            ScoreType::RawTrimRound
        }
    }
}

/// Error returned when parsing an unknown score-type name.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown score type '{name}', expected one of: raw, raw_trim, raw_trim_round, scale, scale_trim, scale_trim_round")]
pub struct ParseScoreTypeError {
    /// The unrecognized name.
    pub name: String,
}

impl FromStr for ScoreType {
    type Err = ParseScoreTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(ScoreType::Raw),
            "raw_trim" => Ok(ScoreType::RawTrim),
            "raw_trim_round" => Ok(ScoreType::RawTrimRound),
            "scale" => Ok(ScoreType::Scale),
            "scale_trim" => Ok(ScoreType::ScaleTrim),
            "scale_trim_round" => Ok(ScoreType::ScaleTrimRound),
            _ => Err(ParseScoreTypeError {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_pipeline() {
        let names = ScoreType::ALL.map(|s| s.to_string());
        assert_eq!(
            names,
            [
                "raw",
                "raw_trim",
                "raw_trim_round",
                "scale",
                "scale_trim",
                "scale_trim_round"
            ]
        );
    }

    #[test]
    fn round_trips_through_display() {
        for score_type in ScoreType::ALL {
            assert_eq!(score_type.to_string().parse(), Ok(score_type));
        }
    }

    #[test]
    fn rejects_unknown_name() {
        let err = "raw_round".parse::<ScoreType>().unwrap_err();
        assert_eq!(err.name, "raw_round");
    }

    #[test]
    fn branch_selection() {
        assert_eq!(ScoreType::trim(false), ScoreType::RawTrim);
        assert_eq!(ScoreType::trim_round(true), ScoreType::ScaleTrimRound);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ScoreType::RawTrimRound).unwrap();
        assert_eq!(json, "\"raw_trim_round\"");
    }
}
