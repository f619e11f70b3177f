use log::warn;

use crate::datastore::DataStore;
use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::reactive::StateKey;
use crate::tree_sequence::TreeSequence;

/// What a view produced on its last render.
#[derive(Debug)]
pub enum Rendered<T> {
    Plot(T),
    /// Nothing to draw yet, e.g. no individual has been chosen.
    Prompt(String),
    /// The view could not be computed; nothing was queried.
    Warning(Error),
    /// The latest input was rejected, the previous plot is still shown.
    Stale { plot: T, warning: Error },
}

impl<T> Rendered<T> {
    pub fn plot(&self) -> Option<&T> {
        match self {
            Rendered::Plot(plot) | Rendered::Stale { plot, .. } => Some(plot),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<&Error> {
        match self {
            Rendered::Warning(warning) | Rendered::Stale { warning, .. } => Some(warning),
            _ => None,
        }
    }

    pub fn is_plot(&self) -> bool {
        matches!(self, Rendered::Plot(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Rendered::Warning(_))
    }
}

impl<T> From<Result<T>> for Rendered<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(plot) => Rendered::Plot(plot),
            Err(e) => {
                warn!("view degraded: {}", e);
                Rendered::Warning(e)
            }
        }
    }
}

/// A legend entry: one line, area or bar stack in a plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub label: String,
    pub color: String,
}

/// A plot computed from the session state and the genomics backend.
pub trait View {
    type Output;

    /// The state the view reads. A change to any of these re-renders it.
    fn dependencies(&self) -> &'static [StateKey];

    fn render(&mut self, store: &DataStore, ts: &dyn TreeSequence) -> Rendered<Self::Output>;
}

/// Fails with `InsufficientSelection` unless `partition` has at least
/// `required` non-empty sample sets.
pub(crate) fn require_sample_sets(partition: &Partition, required: usize) -> Result<()> {
    if partition.len() < required {
        return Err(Error::InsufficientSelection {
            required,
            selected: partition.len(),
        });
    }
    Ok(())
}
