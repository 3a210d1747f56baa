//! Items and item frames.
//!
//! An [`Item`] is one scored unit of work; an [`ItemFrame`] is an immutable,
//! id-keyed collection of items. Every analysis step consumes a frame (or a
//! column extracted from one) and produces new owned data, so frames are
//! never mutated after construction.
//!
//! # Grouping
//!
//! Subgroup statistics and whole-sample statistics flow through the same
//! code path: [`ItemFrame::group_partitions`] always injects a synthetic
//! [`ALL_DATA_GROUP`] partition holding a copy of the whole frame, so callers
//! iterate one list of `(group, frame)` pairs and never special-case the
//! ungrouped computation.
//!
//! # Examples
//!
//! ```
//! use oxiscore_frame::{frame::{Item, ItemFrame}, score::ScoreType};
//!
//! let mut item = Item::new("resp_1");
//! item.sc1 = Some(3.0);
//! item.features.insert("grammar".to_string(), 0.25);
//! item.scores.insert(ScoreType::Raw, 2.8);
//!
//! let frame = ItemFrame::new(vec![item]).unwrap();
//! assert_eq!(frame.feature_column("grammar").unwrap(), vec![0.25]);
//! assert_eq!(frame.score_column(ScoreType::Raw).unwrap(), vec![2.8]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::score::ScoreType;

/// Label of the synthetic whole-sample partition injected by
/// [`ItemFrame::group_partitions`].
pub const ALL_DATA_GROUP: &str = "All data";

/// Errors raised by frame construction and column extraction.
///
/// These are input-contract violations: the caller handed the engine data
/// that does not satisfy the documented column contract. Numerically
/// degenerate data (constant columns, singular matrices) is *not* an error
/// and surfaces as NaN in result tables instead.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FrameError {
    /// Two or more items share an id.
    #[display("duplicate item ids: {}", ids.join(", "))]
    DuplicateItemIds { ids: Vec<String> },
    /// A join partner does not cover the same id set.
    #[display("cannot merge frames, ids missing from partner: {}", ids.join(", "))]
    MergeMismatch { ids: Vec<String> },
    /// No item carries the requested column at all.
    #[display("column '{column}' is not present in the frame")]
    MissingColumn { column: String },
    /// Some items lack a value required by the requested column.
    #[display("column '{column}' has missing values for items: {}", ids.join(", "))]
    MissingValues { column: String, ids: Vec<String> },
    /// A subgroup uses the reserved whole-sample label as a real value.
    #[display("subgroup '{column}' uses the reserved group label '{ALL_DATA_GROUP}'")]
    ReservedGroupLabel { column: String },
}

/// One scored unit of work.
///
/// `sc1` is the primary human score; `sc2` is only present for double-scored
/// items. `features` holds per-item numeric measurements keyed by feature
/// name (an absent key means the value is missing, which only occurs in
/// excluded-item frames). `scores` holds the system predictions that exist
/// for this experiment; which [`ScoreType`]s are present depends on whether
/// scaling was configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    /// Unique item identifier.
    pub item_id: String,
    /// Primary human score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sc1: Option<f64>,
    /// Second human score, present only for double-scored items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sc2: Option<f64>,
    /// Optional length covariate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Optional respondent identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
    /// Numeric feature values keyed by feature name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, f64>,
    /// Categorical subgroup labels keyed by subgroup name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subgroups: BTreeMap<String, String>,
    /// System predictions keyed by score type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<ScoreType, f64>,
}

impl Item {
    /// Create an item with the given id and no measurements.
    #[must_use]
    pub fn new(item_id: impl Into<String>) -> Self {
        Item {
            item_id: item_id.into(),
            ..Item::default()
        }
    }
}

/// An immutable collection of items keyed by unique id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFrame {
    items: Vec<Item>,
}

impl ItemFrame {
    /// Build a frame, rejecting duplicate item ids.
    ///
    /// An empty frame is valid: excluded-item frames are frequently empty.
    pub fn new(items: Vec<Item>) -> Result<Self, FrameError> {
        let mut seen = BTreeSet::new();
        let mut duplicates = Vec::new();
        for item in &items {
            if !seen.insert(item.item_id.as_str()) && !duplicates.contains(&item.item_id) {
                duplicates.push(item.item_id.clone());
            }
        }
        if !duplicates.is_empty() {
            return Err(FrameError::DuplicateItemIds { ids: duplicates });
        }
        Ok(ItemFrame { items })
    }

    /// An empty frame.
    #[must_use]
    pub fn empty() -> Self {
        ItemFrame { items: Vec::new() }
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the frame holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterator over item ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.item_id.as_str())
    }

    /// Inner-join another frame on item id.
    ///
    /// Both frames must cover exactly the same id set; anything else is an
    /// input-contract violation naming the uncovered ids. The merged item
    /// takes scalar fields from whichever side has them (`self` wins when
    /// both do) and unions the feature, subgroup, and score maps.
    pub fn merge(&self, other: &ItemFrame) -> Result<ItemFrame, FrameError> {
        let other_by_id: BTreeMap<&str, &Item> = other
            .items
            .iter()
            .map(|item| (item.item_id.as_str(), item))
            .collect();

        let missing_from_other: Vec<String> = self
            .ids()
            .filter(|id| !other_by_id.contains_key(id))
            .map(str::to_string)
            .collect();
        if !missing_from_other.is_empty() {
            return Err(FrameError::MergeMismatch {
                ids: missing_from_other,
            });
        }
        let self_ids: BTreeSet<&str> = self.ids().collect();
        let missing_from_self: Vec<String> = other
            .ids()
            .filter(|id| !self_ids.contains(id))
            .map(str::to_string)
            .collect();
        if !missing_from_self.is_empty() {
            return Err(FrameError::MergeMismatch {
                ids: missing_from_self,
            });
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                let partner = other_by_id[item.item_id.as_str()];
                let mut merged = item.clone();
                merged.sc1 = merged.sc1.or(partner.sc1);
                merged.sc2 = merged.sc2.or(partner.sc2);
                merged.length = merged.length.or(partner.length);
                merged.candidate = merged.candidate.take().or_else(|| partner.candidate.clone());
                for (name, value) in &partner.features {
                    merged.features.entry(name.clone()).or_insert(*value);
                }
                for (name, value) in &partner.subgroups {
                    merged
                        .subgroups
                        .entry(name.clone())
                        .or_insert_with(|| value.clone());
                }
                for (score_type, value) in &partner.scores {
                    merged.scores.entry(*score_type).or_insert(*value);
                }
                merged
            })
            .collect();
        Ok(ItemFrame { items })
    }

    /// Owned copy containing only the items matching the predicate.
    #[must_use]
    pub fn filtered<F>(&self, mut keep: F) -> ItemFrame
    where
        F: FnMut(&Item) -> bool,
    {
        ItemFrame {
            items: self
                .items
                .iter()
                .filter(|item| keep(item))
                .map(|item| (*item).clone())
                .collect(),
        }
    }

    /// Values of one feature column, in item order.
    ///
    /// Fails when the column is absent everywhere, or names the items with
    /// missing values when it is only partially present.
    pub fn feature_column(&self, name: &str) -> Result<Vec<f64>, FrameError> {
        let mut values = Vec::with_capacity(self.items.len());
        let mut missing = Vec::new();
        for item in &self.items {
            match item.features.get(name) {
                Some(value) => values.push(*value),
                None => missing.push(item.item_id.clone()),
            }
        }
        if missing.len() == self.items.len() && !self.items.is_empty() {
            return Err(FrameError::MissingColumn {
                column: name.to_string(),
            });
        }
        if !missing.is_empty() {
            return Err(FrameError::MissingValues {
                column: name.to_string(),
                ids: missing,
            });
        }
        Ok(values)
    }

    /// Primary human scores, in item order; every item must have one.
    pub fn sc1_column(&self) -> Result<Vec<f64>, FrameError> {
        self.required_scalar("sc1", |item| item.sc1)
    }

    /// Second human scores, in item order, `None` for single-scored items.
    #[must_use]
    pub fn sc2_column(&self) -> Vec<Option<f64>> {
        self.items.iter().map(|item| item.sc2).collect()
    }

    /// Length covariate values, in item order; every item must have one.
    pub fn length_column(&self) -> Result<Vec<f64>, FrameError> {
        self.required_scalar("length", |item| item.length)
    }

    /// Whether every item carries a length value.
    #[must_use]
    pub fn has_length(&self) -> bool {
        !self.is_empty() && self.items.iter().all(|item| item.length.is_some())
    }

    /// Whether any item carries a second human score.
    #[must_use]
    pub fn has_second_score(&self) -> bool {
        self.items.iter().any(|item| item.sc2.is_some())
    }

    /// System scores of one type, in item order; every item must have one.
    pub fn score_column(&self, score_type: ScoreType) -> Result<Vec<f64>, FrameError> {
        let mut values = Vec::with_capacity(self.items.len());
        let mut missing = Vec::new();
        for item in &self.items {
            match item.scores.get(&score_type) {
                Some(value) => values.push(*value),
                None => missing.push(item.item_id.clone()),
            }
        }
        if missing.is_empty() {
            Ok(values)
        } else if missing.len() == self.items.len() {
            Err(FrameError::MissingColumn {
                column: score_type.to_string(),
            })
        } else {
            Err(FrameError::MissingValues {
                column: score_type.to_string(),
                ids: missing,
            })
        }
    }

    /// Whether a system-score column is present on every item.
    #[must_use]
    pub fn has_score_column(&self, score_type: ScoreType) -> bool {
        !self.is_empty()
            && self
                .items
                .iter()
                .all(|item| item.scores.contains_key(&score_type))
    }

    /// The score types present on every item, in canonical order.
    #[must_use]
    pub fn present_score_types(&self) -> Vec<ScoreType> {
        ScoreType::ALL
            .into_iter()
            .filter(|score_type| self.has_score_column(*score_type))
            .collect()
    }

    /// Labels of one subgroup column, in item order; every item must have one.
    pub fn subgroup_column(&self, name: &str) -> Result<Vec<String>, FrameError> {
        let mut values = Vec::with_capacity(self.items.len());
        let mut missing = Vec::new();
        for item in &self.items {
            match item.subgroups.get(name) {
                Some(value) => values.push(value.clone()),
                None => missing.push(item.item_id.clone()),
            }
        }
        if missing.len() == self.items.len() && !self.items.is_empty() {
            return Err(FrameError::MissingColumn {
                column: name.to_string(),
            });
        }
        if !missing.is_empty() {
            return Err(FrameError::MissingValues {
                column: name.to_string(),
                ids: missing,
            });
        }
        Ok(values)
    }

    /// Whether a subgroup column is present on every item.
    #[must_use]
    pub fn has_subgroup(&self, name: &str) -> bool {
        !self.is_empty()
            && self
                .items
                .iter()
                .all(|item| item.subgroups.contains_key(name))
    }

    /// Partition the frame by a subgroup column.
    ///
    /// Returns `(group label, frame)` pairs in sorted label order, with the
    /// synthetic [`ALL_DATA_GROUP`] partition (a copy of the whole frame)
    /// injected so whole-sample statistics flow through the grouped code
    /// path. A real subgroup value equal to the reserved label is rejected.
    pub fn group_partitions(&self, subgroup: &str) -> Result<Vec<(String, ItemFrame)>, FrameError> {
        let labels = self.subgroup_column(subgroup)?;
        if labels.iter().any(|label| label == ALL_DATA_GROUP) {
            return Err(FrameError::ReservedGroupLabel {
                column: subgroup.to_string(),
            });
        }

        let mut partitions: BTreeMap<String, Vec<Item>> = BTreeMap::new();
        for (item, label) in self.items.iter().zip(labels) {
            partitions.entry(label).or_default().push(item.clone());
        }
        partitions.insert(ALL_DATA_GROUP.to_string(), self.items.clone());

        Ok(partitions
            .into_iter()
            .map(|(label, items)| (label, ItemFrame { items }))
            .collect())
    }

    /// Distinct values of one subgroup column, sorted.
    pub fn distinct_subgroup_values(&self, name: &str) -> Result<BTreeSet<String>, FrameError> {
        Ok(self.subgroup_column(name)?.into_iter().collect())
    }

    /// Distinct candidate ids; items without a candidate are skipped.
    #[must_use]
    pub fn distinct_candidates(&self) -> BTreeSet<String> {
        self.items
            .iter()
            .filter_map(|item| item.candidate.clone())
            .collect()
    }

    fn required_scalar<F>(&self, column: &str, get: F) -> Result<Vec<f64>, FrameError>
    where
        F: Fn(&Item) -> Option<f64>,
    {
        let mut values = Vec::with_capacity(self.items.len());
        let mut missing = Vec::new();
        for item in &self.items {
            match get(item) {
                Some(value) => values.push(value),
                None => missing.push(item.item_id.clone()),
            }
        }
        if missing.is_empty() {
            Ok(values)
        } else {
            Err(FrameError::MissingValues {
                column: column.to_string(),
                ids: missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, sc1: f64) -> Item {
        let mut item = Item::new(id);
        item.sc1 = Some(sc1);
        item
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = ItemFrame::new(vec![item("a", 1.0), item("b", 2.0), item("a", 3.0)]).unwrap_err();
        assert_eq!(
            err,
            FrameError::DuplicateItemIds {
                ids: vec!["a".to_string()]
            }
        );
    }

    #[test]
    fn merge_joins_disjoint_columns() {
        let mut left = item("a", 3.0);
        left.features.insert("len".to_string(), 10.0);
        let left_frame = ItemFrame::new(vec![left]).unwrap();

        let mut right = Item::new("a");
        right.scores.insert(ScoreType::Raw, 2.5);
        right.length = Some(140.0);
        let right_frame = ItemFrame::new(vec![right]).unwrap();

        let merged = left_frame.merge(&right_frame).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.sc1_column().unwrap(), vec![3.0]);
        assert_eq!(merged.feature_column("len").unwrap(), vec![10.0]);
        assert_eq!(merged.score_column(ScoreType::Raw).unwrap(), vec![2.5]);
        assert_eq!(merged.length_column().unwrap(), vec![140.0]);
    }

    #[test]
    fn merge_requires_matching_id_sets() {
        let left = ItemFrame::new(vec![item("a", 1.0), item("b", 2.0)]).unwrap();
        let right = ItemFrame::new(vec![item("a", 1.0)]).unwrap();
        let err = left.merge(&right).unwrap_err();
        assert_eq!(
            err,
            FrameError::MergeMismatch {
                ids: vec!["b".to_string()]
            }
        );

        let err = right.merge(&left).unwrap_err();
        assert_eq!(
            err,
            FrameError::MergeMismatch {
                ids: vec!["b".to_string()]
            }
        );
    }

    #[test]
    fn feature_column_reports_partial_and_total_absence() {
        let mut a = item("a", 1.0);
        a.features.insert("f".to_string(), 0.5);
        let b = item("b", 2.0);
        let frame = ItemFrame::new(vec![a, b]).unwrap();

        assert_eq!(
            frame.feature_column("f").unwrap_err(),
            FrameError::MissingValues {
                column: "f".to_string(),
                ids: vec!["b".to_string()]
            }
        );
        assert_eq!(
            frame.feature_column("g").unwrap_err(),
            FrameError::MissingColumn {
                column: "g".to_string()
            }
        );
    }

    #[test]
    fn partitions_include_all_data_group() {
        let mut a = item("a", 1.0);
        a.subgroups.insert("l1".to_string(), "de".to_string());
        let mut b = item("b", 2.0);
        b.subgroups.insert("l1".to_string(), "fr".to_string());
        let mut c = item("c", 3.0);
        c.subgroups.insert("l1".to_string(), "de".to_string());
        let frame = ItemFrame::new(vec![a, b, c]).unwrap();

        let partitions = frame.group_partitions("l1").unwrap();
        let labels: Vec<&str> = partitions.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec![ALL_DATA_GROUP, "de", "fr"]);

        let sizes: Vec<usize> = partitions.iter().map(|(_, frame)| frame.len()).collect();
        assert_eq!(sizes, vec![3, 2, 1]);
    }

    #[test]
    fn reserved_group_label_is_rejected() {
        let mut a = item("a", 1.0);
        a.subgroups
            .insert("l1".to_string(), ALL_DATA_GROUP.to_string());
        let frame = ItemFrame::new(vec![a]).unwrap();
        assert_eq!(
            frame.group_partitions("l1").unwrap_err(),
            FrameError::ReservedGroupLabel {
                column: "l1".to_string()
            }
        );
    }

    #[test]
    fn item_round_trips_through_json() {
        let mut item = item("a", 3.0);
        item.scores.insert(ScoreType::ScaleTrim, 2.9);
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back.item_id, "a");
        assert_eq!(back.scores[&ScoreType::ScaleTrim], 2.9);
    }
}
