//! Local tree drawings.
//!
//! A tree is addressed either by its zero based index or by a genome
//! position, which is resolved to the index of the containing tree as soon
//! as it is set. Rejected input leaves the current tree in place and the
//! view keeps showing it next to a warning.

use std::collections::BTreeMap;

use log::debug;

use crate::config::Config;
use crate::datastore::DataStore;
use crate::error::{Error, Result};
use crate::reactive::StateKey;
use crate::tree_sequence::{Interval, TreeDrawOptions, TreeSequence};
use crate::view::{Rendered, View};
use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    Position,
    TreeIndex,
}

#[derive(Debug)]
pub struct TreePlot {
    pub index: usize,
    pub interval: Interval,
    /// `Tree index i (position a - b)`, `b` being the last base of the tree.
    pub heading: String,
    pub style: String,
    pub svg: String,
    /// Set when the advanced options were unusable and defaults were drawn.
    pub advanced_warning: Option<Error>,
}

pub struct TreeView {
    pub search_by: SearchBy,
    pub width: u32,
    pub height: u32,
    pub y_axis: bool,
    pub symbol_size: f64,
    /// JSON object mapping node ids to labels, e.g. `{"12": "root"}`.
    pub node_labels: String,
    tree_index: usize,
    default_symbol_size: f64,
    rejected: Option<String>,
}

impl TreeView {
    pub fn new(config: &Config) -> Self {
        Self {
            search_by: SearchBy::Position,
            width: config.tree.width,
            height: config.tree.height,
            y_axis: true,
            symbol_size: config.tree.symbol_size,
            node_labels: "{}".into(),
            tree_index: 0,
            default_symbol_size: config.tree.symbol_size,
            rejected: None,
        }
    }

    pub fn tree_index(&self) -> usize {
        self.tree_index
    }

    fn reject(&mut self, msg: String) -> Error {
        debug!("tree input rejected: {}", msg);
        self.rejected = Some(msg.clone());
        Error::InvalidParameter(msg)
    }

    fn accept(&mut self, index: usize) -> usize {
        self.rejected = None;
        self.tree_index = index;
        index
    }

    /// Moves to the tree containing `position` and returns its index.
    ///
    /// The position is not kept; afterwards the tree is addressed by index.
    /// `position == sequence_length` selects the last tree.
    pub fn set_position(&mut self, position: f64, ts: &dyn TreeSequence) -> Result<usize> {
        let length = ts.sequence_length();
        if !(0.0..=length).contains(&position) {
            return Err(self.reject(format!(
                "position {} is outside the sequence [0, {}]",
                position, length
            )));
        }
        let index = if position == length {
            ts.num_trees().saturating_sub(1)
        } else {
            ts.tree_index_at(position)?
        };
        Ok(self.accept(index))
    }

    pub fn set_tree_index(&mut self, index: usize, ts: &dyn TreeSequence) -> Result<usize> {
        if index >= ts.num_trees() {
            return Err(self.reject(format!(
                "tree index {} is outside [0, {}]",
                index,
                ts.num_trees().saturating_sub(1)
            )));
        }
        Ok(self.accept(index))
    }

    pub fn next_tree(&mut self, ts: &dyn TreeSequence) -> usize {
        let last = ts.num_trees().saturating_sub(1);
        self.accept((self.tree_index + 1).min(last))
    }

    pub fn prev_tree(&mut self) -> usize {
        self.accept(self.tree_index.saturating_sub(1))
    }

    /// Node fill colors by sample set, one rule per sample node.
    pub fn default_css(store: &DataStore) -> String {
        let individuals = store.individuals();
        individuals
            .iter()
            .flat_map(|ind| {
                let color = store
                    .sample_sets()
                    .color(ind.sample_set_id())
                    .unwrap_or("black");
                ind.haplotype_ids()
                    .iter()
                    .map(move |n| format!(".node.n{} > .sym {{fill: {} }}", n, color))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn parse_node_labels(&self) -> Result<BTreeMap<NodeId, String>> {
        let labels: BTreeMap<String, String> = serde_json::from_str(&self.node_labels)?;
        labels
            .into_iter()
            .map(|(node, label)| {
                let node = node.trim().parse::<NodeId>().map_err(|_| {
                    Error::InvalidParameter(format!("{:?} is not a node id", node))
                })?;
                Ok((node, label))
            })
            .collect()
    }

    fn advanced_options(&self, style: &str) -> Result<TreeDrawOptions> {
        if !self.symbol_size.is_finite() || self.symbol_size < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "symbol size {} must be non-negative",
                self.symbol_size
            )));
        }
        Ok(TreeDrawOptions {
            width: self.width,
            height: self.height,
            symbol_size: self.symbol_size,
            y_axis: self.y_axis,
            node_labels: self.parse_node_labels()?,
            style: style.to_owned(),
        })
    }

    fn default_options(&self, style: &str) -> TreeDrawOptions {
        TreeDrawOptions {
            width: self.width,
            height: self.height,
            symbol_size: self.default_symbol_size,
            y_axis: true,
            node_labels: BTreeMap::new(),
            style: style.to_owned(),
        }
    }

    fn draw(&self, store: &DataStore, ts: &dyn TreeSequence) -> Result<TreePlot> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidParameter("tree size must be positive".into()));
        }
        let index = self.tree_index;
        let interval = ts.tree_interval(index)?;
        let style = Self::default_css(store);
        let (options, advanced_warning) = match self.advanced_options(&style) {
            Ok(options) => (options, None),
            Err(e @ Error::InvalidParameter(_)) | Err(e @ Error::Parse(_)) => {
                (self.default_options(&style), Some(e))
            }
            Err(e) => return Err(e),
        };
        let svg = ts.draw_tree_svg(index, &options)?;
        Ok(TreePlot {
            index,
            interval,
            heading: format!(
                "Tree index {} (position {} - {})",
                index,
                interval.left as i64,
                interval.right as i64 - 1
            ),
            style,
            svg,
            advanced_warning,
        })
    }
}

impl View for TreeView {
    type Output = TreePlot;

    fn dependencies(&self) -> &'static [StateKey] {
        &[StateKey::SampleSets, StateKey::Individuals]
    }

    fn render(&mut self, store: &DataStore, ts: &dyn TreeSequence) -> Rendered<TreePlot> {
        match (self.draw(store, ts), &self.rejected) {
            (Ok(plot), Some(msg)) => Rendered::Stale {
                plot,
                warning: Error::InvalidParameter(msg.clone()),
            },
            (result, _) => result.into(),
        }
    }
}
