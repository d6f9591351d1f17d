//! A classic B-tree ordered map for Rust.
//!
//! This crate provides [`BTreeMap`], an ordered key-value container whose
//! nodes hold between `B - 1` and `2B - 1` entries. Overflowing nodes are split
//! at the median, and underflowing nodes are repaired by merging with, or
//! borrowing from, a sibling. The tree's shape can be inspected layer by layer
//! with [`traverse_breadth_first`](BTreeMap::traverse_breadth_first).
//!
//! # Example
//!
//! ```
//! use ods_btree::BTreeMap;
//!
//! let mut scores: BTreeMap<&str, u32, 2> = BTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! assert_eq!(scores.find(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Keys are never overwritten.
//! assert!(!scores.insert("Bob", 0));
//!
//! assert_eq!(scores.erase(&"Alice"), Some(100));
//! let names: Vec<&str> = scores.traverse_in_order().into_iter().map(|(k, _)| *k).collect();
//! assert_eq!(names, ["Bob", "Carol"]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Compile-time branching** - `B` is a const generic checked at compile time
//! - **Custom orderings** - Any [`Compare`] implementation or comparison closure
//! - **`demo`** - Builds the `movie_reviews` binary, which logs its rebalancing steps
//!
//! # Logging
//!
//! Structural changes (splits, merges, borrows, root growth and collapse) are
//! reported as [`tracing`] events at `TRACE` level under the `ods_btree`
//! target. They cost nothing unless a subscriber is installed.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod error;
mod raw;

pub mod btree_map;

pub use btree_map::{BTreeMap, DEFAULT_BRANCHING, Entry, Layer, NodeSnapshot};
pub use compare::{Compare, Natural};
pub use error::DuplicateKey;
