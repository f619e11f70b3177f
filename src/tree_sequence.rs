//! The genomics backend the views query.
//!
//! Statistics, genealogical nearest neighbours, tree lookup and tree
//! drawing all happen behind [`TreeSequence`]. The crate never computes
//! them itself.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array2;
use thiserror::Error;

use crate::NodeId;

/// Whether a statistic is computed from mutations or from branch lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Site,
    /// Only meaningful for tree sequences with calibrated node times.
    Branch,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Site => "site",
            Mode::Branch => "branch",
        })
    }
}

/// Statistics of a single sample set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnewayStatistic {
    Diversity,
    TajimasD,
}

impl fmt::Display for OnewayStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OnewayStatistic::Diversity => "diversity",
            OnewayStatistic::TajimasD => "Tajimas_D",
        })
    }
}

/// Statistics of a pair of sample sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiwayStatistic {
    Fst,
    Divergence,
}

impl fmt::Display for MultiwayStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MultiwayStatistic::Fst => "Fst",
            MultiwayStatistic::Divergence => "divergence",
        })
    }
}

/// Half open genome interval `[left, right)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub left: f64,
    pub right: f64,
}

impl Interval {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn contains(&self, position: f64) -> bool {
        self.left <= position && position < self.right
    }

    pub fn span(&self) -> f64 {
        self.right - self.left
    }
}

/// Options handed to the backend's tree drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeDrawOptions {
    pub width: u32,
    pub height: u32,
    pub symbol_size: f64,
    pub y_axis: bool,
    pub node_labels: BTreeMap<NodeId, String>,
    /// CSS appended to the drawing.
    pub style: String,
}

/// A rejected backend request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("{0} mode is not supported by this tree sequence")]
    UnsupportedMode(Mode),

    #[error("{0} is out of bounds")]
    OutOfBounds(String),

    #[error("{0}")]
    Other(String),
}

/// Read only access to a tree sequence.
///
/// Sample sets are passed as lists of sample node ids and are referred to
/// by their position in that list. Windowed results have one row per
/// window and one column per sample set (or per index pair).
pub trait TreeSequence {
    fn sequence_length(&self) -> f64;

    fn num_trees(&self) -> usize;

    /// `false` when node times are uncalibrated, which rules out
    /// [`Mode::Branch`].
    fn is_calibrated(&self) -> bool;

    fn tree_interval(&self, index: usize) -> Result<Interval, QueryError>;

    /// Index of the tree whose interval contains `position`, for
    /// `0 <= position < sequence_length`.
    fn tree_index_at(&self, position: f64) -> Result<usize, QueryError>;

    fn oneway_statistic(
        &self,
        statistic: OnewayStatistic,
        sample_sets: &[Vec<NodeId>],
        windows: &[f64],
        mode: Mode,
    ) -> Result<Array2<f64>, QueryError>;

    fn multiway_statistic(
        &self,
        statistic: MultiwayStatistic,
        sample_sets: &[Vec<NodeId>],
        indexes: &[(usize, usize)],
        windows: &[f64],
        mode: Mode,
    ) -> Result<Array2<f64>, QueryError>;

    /// GNN proportions, one row per focal node, one column per sample set.
    fn genealogical_nearest_neighbours(
        &self,
        focal: &[NodeId],
        sample_sets: &[Vec<NodeId>],
    ) -> Result<Array2<f64>, QueryError>;

    /// Windowed GNN proportions of a single haplotype, one row per window.
    fn haplotype_gnn(
        &self,
        sample: NodeId,
        sample_sets: &[Vec<NodeId>],
        windows: &[f64],
    ) -> Result<Array2<f64>, QueryError>;

    /// SVG drawing of one tree.
    fn draw_tree_svg(&self, index: usize, options: &TreeDrawOptions) -> Result<String, QueryError>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! Deterministic stand in for a real backend.
    //!
    //! Values are simple functions of the arguments so tests can check
    //! which sample sets and windows a view asked for.

    use super::*;
    use std::cell::Cell;

    pub struct FakeTreeSequence {
        pub breakpoints: Vec<f64>,
        pub calibrated: bool,
        /// When set, statistic queries fail with this error.
        pub reject: Option<QueryError>,
        pub queries: Cell<usize>,
    }

    impl FakeTreeSequence {
        /// Trees split at `breakpoints`, which must start at 0 and end at
        /// the sequence length.
        pub fn new(breakpoints: Vec<f64>) -> Self {
            Self {
                breakpoints,
                calibrated: false,
                reject: None,
                queries: Cell::new(0),
            }
        }

        pub fn queries(&self) -> usize {
            self.queries.get()
        }

        fn count(&self) {
            self.queries.set(self.queries.get() + 1);
        }

        fn num_windows(windows: &[f64]) -> Result<usize, QueryError> {
            if windows.len() < 2 {
                return Err(QueryError::Other("need at least one window".into()));
            }
            Ok(windows.len() - 1)
        }

        fn check_mode(&self, mode: Mode) -> Result<(), QueryError> {
            if let Some(e) = &self.reject {
                return Err(e.clone());
            }
            if mode == Mode::Branch && !self.calibrated {
                return Err(QueryError::UnsupportedMode(mode));
            }
            Ok(())
        }
    }

    fn total(set: &[NodeId]) -> f64 {
        set.iter().map(|n| *n as f64).sum()
    }

    impl TreeSequence for FakeTreeSequence {
        fn sequence_length(&self) -> f64 {
            *self.breakpoints.last().unwrap()
        }

        fn num_trees(&self) -> usize {
            self.breakpoints.len() - 1
        }

        fn is_calibrated(&self) -> bool {
            self.calibrated
        }

        fn tree_interval(&self, index: usize) -> Result<Interval, QueryError> {
            if index >= self.num_trees() {
                return Err(QueryError::OutOfBounds(format!("tree index {}", index)));
            }
            Ok(Interval::new(
                self.breakpoints[index],
                self.breakpoints[index + 1],
            ))
        }

        fn tree_index_at(&self, position: f64) -> Result<usize, QueryError> {
            self.count();
            (0..self.num_trees())
                .find(|i| self.tree_interval(*i).map_or(false, |t| t.contains(position)))
                .ok_or_else(|| QueryError::OutOfBounds(format!("position {}", position)))
        }

        /// Value = window index * 1000 + total of node ids in the set.
        fn oneway_statistic(
            &self,
            _statistic: OnewayStatistic,
            sample_sets: &[Vec<NodeId>],
            windows: &[f64],
            mode: Mode,
        ) -> Result<Array2<f64>, QueryError> {
            self.count();
            self.check_mode(mode)?;
            let n = Self::num_windows(windows)?;
            Ok(Array2::from_shape_fn((n, sample_sets.len()), |(w, s)| {
                w as f64 * 1000.0 + total(&sample_sets[s])
            }))
        }

        /// Value depends on the order of each pair, 10 * i + j.
        fn multiway_statistic(
            &self,
            _statistic: MultiwayStatistic,
            sample_sets: &[Vec<NodeId>],
            indexes: &[(usize, usize)],
            windows: &[f64],
            mode: Mode,
        ) -> Result<Array2<f64>, QueryError> {
            self.count();
            self.check_mode(mode)?;
            if indexes
                .iter()
                .any(|(i, j)| *i >= sample_sets.len() || *j >= sample_sets.len())
            {
                return Err(QueryError::OutOfBounds("sample set index".into()));
            }
            let n = Self::num_windows(windows)?;
            Ok(Array2::from_shape_fn((n, indexes.len()), |(w, k)| {
                let (i, j) = indexes[k];
                w as f64 + 10.0 * i as f64 + j as f64
            }))
        }

        /// A focal node is fully its own sample set's neighbour.
        fn genealogical_nearest_neighbours(
            &self,
            focal: &[NodeId],
            sample_sets: &[Vec<NodeId>],
        ) -> Result<Array2<f64>, QueryError> {
            self.count();
            Ok(Array2::from_shape_fn((focal.len(), sample_sets.len()), |(f, s)| {
                if sample_sets[s].contains(&focal[f]) {
                    1.0
                } else {
                    0.0
                }
            }))
        }

        fn haplotype_gnn(
            &self,
            sample: NodeId,
            sample_sets: &[Vec<NodeId>],
            windows: &[f64],
        ) -> Result<Array2<f64>, QueryError> {
            self.count();
            let n = Self::num_windows(windows)?;
            let k = sample_sets.len() as f64;
            Ok(Array2::from_shape_fn((n, sample_sets.len()), |(_, s)| {
                if sample_sets[s].contains(&sample) {
                    1.0
                } else {
                    1.0 / k
                }
            }))
        }

        fn draw_tree_svg(
            &self,
            index: usize,
            options: &TreeDrawOptions,
        ) -> Result<String, QueryError> {
            self.count();
            self.tree_interval(index)?;
            Ok(format!(
                "<svg width=\"{}\" height=\"{}\" data-tree=\"{}\" data-labels=\"{}\"/>",
                options.width,
                options.height,
                index,
                options.node_labels.len()
            ))
        }
    }
}
