//! Core data model for the Oxiscore evaluation toolkit.
//!
//! This crate provides the tabular types shared by every analysis:
//!
//! - **Items and frames**: scored items keyed by a unique id, collected into
//!   immutable [`frame::ItemFrame`] tables with join and grouping support
//! - **Score types**: the closed [`score::ScoreType`] enumeration of the
//!   raw/scaled/trimmed/rounded prediction pipeline stages
//! - **Result tables**: the [`table::Table`] presentation type that every
//!   analysis returns and the reporting layer renders
//!
//! # Modules
//!
//! - [`frame`]: items, item frames, and the grouping machinery
//! - [`score`]: the score-type enumeration
//! - [`table`]: ordered result tables and their CSV rendering
//!
//! # Examples
//!
//! ## Building a frame and partitioning by subgroup
//!
//! ```
//! use oxiscore_frame::frame::{ALL_DATA_GROUP, Item, ItemFrame};
//!
//! let mut a = Item::new("resp_1");
//! a.sc1 = Some(3.0);
//! a.subgroups.insert("prompt".to_string(), "p1".to_string());
//! let mut b = Item::new("resp_2");
//! b.sc1 = Some(4.0);
//! b.subgroups.insert("prompt".to_string(), "p2".to_string());
//!
//! let frame = ItemFrame::new(vec![a, b]).unwrap();
//! let partitions = frame.group_partitions("prompt").unwrap();
//!
//! // Two observed groups plus the synthetic whole-sample group.
//! assert_eq!(partitions.len(), 3);
//! assert!(partitions.iter().any(|(name, _)| name == ALL_DATA_GROUP));
//! ```
//!
//! ## Rendering a result table
//!
//! ```
//! use oxiscore_frame::table::{Cell, Table};
//!
//! let mut table = Table::new("feature", ["mean", "N"]);
//! table.push_row("grammar", vec![Cell::Num(0.5), Cell::Int(120)]);
//! assert_eq!(table.to_csv(), "feature,mean,N\ngrammar,0.5,120\n");
//! ```

pub mod frame;
pub mod score;
pub mod table;
