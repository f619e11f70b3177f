#![crate_name = "tsview"]
//! Sample sets, their reactive partition and the analysis views of a
//! tree sequence explorer.
//!
//! Individuals are grouped into named, colored sample sets held in a
//! [`DataStore`]. Every view reads the current grouping through
//! [`DataStore::partition`] and asks a [`TreeSequence`] backend for the
//! numbers it plots. A [`Dashboard`] keeps all views in step with the
//! store.

pub mod prelude;

pub mod config;
pub mod dashboard;
pub mod datastore;
pub mod error;
pub mod gnn;
pub mod individuals;
pub mod map;
pub mod observable;
pub mod partition;
pub mod reactive;
pub mod sample_sets;
pub mod stats;
pub mod table;
pub mod tree_sequence;
pub mod trees;
pub mod view;
pub mod windows;

pub type SampleSetId = u32;
pub type IndividualId = u32;
/// Sample node id in the tree sequence.
pub type NodeId = u32;

pub use config::Config;
pub use dashboard::{Dashboard, Page};
pub use datastore::DataStore;
pub use error::{Error, Result};
pub use partition::Partition;
pub use tree_sequence::TreeSequence;
pub use view::{Rendered, View};
pub use windows::make_windows;
