pub use crate::config::Config;
pub use crate::dashboard::{Dashboard, Page};
pub use crate::datastore::DataStore;
pub use crate::error::{Entity, Error, Result};
pub use crate::gnn::{GnnBars, GnnHaplotype, SortOrder};
pub use crate::individuals::{Individual, Individuals};
pub use crate::map::{GeoMap, Tiles};
pub use crate::observable::{CsvBuilder, Observation};
pub use crate::partition::{Group, Partition};
pub use crate::reactive::StateKey;
pub use crate::sample_sets::{SampleSet, SampleSets};
pub use crate::stats::{MultiwayStats, OnewayStats};
pub use crate::table::{CellEdit, Column, ColumnEditor, IndividualsTable, PageSize, TableOptions};
pub use crate::tree_sequence::{
    Interval, Mode, MultiwayStatistic, OnewayStatistic, QueryError, TreeDrawOptions, TreeSequence,
};
pub use crate::trees::{SearchBy, TreeView};
pub use crate::view::{Rendered, View};
pub use crate::windows::make_windows;
pub use crate::{IndividualId, NodeId, SampleSetId};
