//! Windowed population genetic statistics per sample set and per pair of
//! sample sets.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::config::Config;
use crate::datastore::DataStore;
use crate::error::{Error, Result};
use crate::reactive::StateKey;
use crate::tree_sequence::{Mode, MultiwayStatistic, OnewayStatistic, QueryError, TreeSequence};
use crate::view::{require_sample_sets, Rendered, Series, View};
use crate::windows::make_windows;
use crate::SampleSetId;

/// Statistic values along the genome, ready to be drawn as one curve per
/// series.
#[derive(Debug, Clone, PartialEq)]
pub struct StatTable {
    pub statistic: String,
    pub mode: Mode,
    pub sequence_length: f64,
    /// Window boundaries; `values` has one row per window.
    pub windows: Vec<f64>,
    pub series: Vec<Series>,
    pub values: Array2<f64>,
}

impl StatTable {
    /// Values of one series, one per window.
    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        let idx = self.series.iter().position(|s| s.label == label)?;
        Some(self.values.column(idx).to_vec())
    }
}

/// Modes the tree sequence supports. Branch statistics need calibrated
/// node times.
pub fn available_modes(ts: &dyn TreeSequence) -> Vec<Mode> {
    if ts.is_calibrated() {
        vec![Mode::Branch, Mode::Site]
    } else {
        vec![Mode::Site]
    }
}

fn check_mode(mode: Mode, ts: &dyn TreeSequence) -> Result<()> {
    if !available_modes(ts).contains(&mode) {
        return Err(Error::InvalidParameter(format!(
            "{} mode is only available for calibrated data",
            mode
        )));
    }
    Ok(())
}

pub(crate) fn check_shape(values: &Array2<f64>, rows: usize, cols: usize) -> Result<()> {
    if values.dim() != (rows, cols) {
        return Err(QueryError::Other(format!(
            "expected a {}x{} result, got {:?}",
            rows,
            cols,
            values.dim()
        ))
        .into());
    }
    Ok(())
}

pub struct OnewayStats {
    pub statistic: OnewayStatistic,
    pub mode: Mode,
    pub window_size: u64,
}

impl OnewayStats {
    pub fn new(config: &Config) -> Self {
        Self {
            statistic: OnewayStatistic::Diversity,
            mode: Mode::Site,
            window_size: config.default_window_size,
        }
    }

    fn compute(&self, store: &DataStore, ts: &dyn TreeSequence) -> Result<StatTable> {
        let partition = store.partition(true);
        require_sample_sets(&partition, 1)?;
        check_mode(self.mode, ts)?;
        let windows = make_windows(self.window_size, ts.sequence_length())?;

        let values =
            ts.oneway_statistic(self.statistic, &partition.sample_sets(), &windows, self.mode)?;
        check_shape(&values, windows.len() - 1, partition.len())?;

        let names = store.sample_sets().names();
        let series = partition
            .ids()
            .into_iter()
            .map(|id| Series {
                label: names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
                color: store.sample_sets().color(id).unwrap_or("black").to_owned(),
            })
            .collect();

        Ok(StatTable {
            statistic: self.statistic.to_string(),
            mode: self.mode,
            sequence_length: ts.sequence_length(),
            windows,
            series,
            values,
        })
    }
}

impl View for OnewayStats {
    type Output = StatTable;

    fn dependencies(&self) -> &'static [StateKey] {
        &[StateKey::SampleSets, StateKey::Individuals]
    }

    fn render(&mut self, store: &DataStore, ts: &dyn TreeSequence) -> Rendered<StatTable> {
        self.compute(store, ts).into()
    }
}

/// Parses a `"a-b"` comparison of two sample set ids.
pub fn parse_comparison(text: &str) -> Result<(SampleSetId, SampleSetId)> {
    let bad = || Error::InvalidParameter(format!("{:?} is not a comparison like \"0-1\"", text));
    let (a, b) = text.split_once('-').ok_or_else(bad)?;
    let a = a.trim().parse().map_err(|_| bad())?;
    let b = b.trim().parse().map_err(|_| bad())?;
    Ok((a, b))
}

/// Puts each pair in ascending order and drops self pairs and repeats,
/// keeping the first occurrence.
pub fn normalize_comparisons(
    comparisons: &[(SampleSetId, SampleSetId)],
) -> Vec<(SampleSetId, SampleSetId)> {
    let mut pairs: Vec<(SampleSetId, SampleSetId)> = Vec::with_capacity(comparisons.len());
    for (a, b) in comparisons {
        let pair = if a <= b { (*a, *b) } else { (*b, *a) };
        if pair.0 != pair.1 && !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

/// Every pair of currently selected sample sets, smaller id first.
pub fn available_comparisons(store: &DataStore) -> Vec<(SampleSetId, SampleSetId)> {
    let ids = store.partition(true).ids();
    let mut pairs = vec![];
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            pairs.push((*a, *b));
        }
    }
    pairs
}

/// Statistic values per compared pair; `pairs[k]` is series `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    pub pairs: Vec<(SampleSetId, SampleSetId)>,
    pub table: StatTable,
}

pub struct MultiwayStats {
    pub statistic: MultiwayStatistic,
    pub mode: Mode,
    pub window_size: u64,
    pub comparisons: Vec<(SampleSetId, SampleSetId)>,
    palette: String,
    palettes: BTreeMap<String, Vec<String>>,
}

impl MultiwayStats {
    pub fn new(config: &Config) -> Self {
        Self {
            statistic: MultiwayStatistic::Fst,
            mode: Mode::Site,
            window_size: config.default_window_size,
            comparisons: vec![],
            palette: config.default_palette.clone(),
            palettes: config.categorical_palettes.clone(),
        }
    }

    pub fn palette(&self) -> &str {
        &self.palette
    }

    pub fn palettes(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }

    pub fn set_palette(&mut self, name: &str) -> Result<()> {
        match self.palettes.get(name) {
            Some(colors) if !colors.is_empty() => {
                self.palette = name.to_owned();
                Ok(())
            }
            _ => Err(Error::InvalidParameter(format!("unknown palette {:?}", name))),
        }
    }

    fn compute(&self, store: &DataStore, ts: &dyn TreeSequence) -> Result<PairTable> {
        check_mode(self.mode, ts)?;
        let windows = make_windows(self.window_size, ts.sequence_length())?;

        // indexes refer to every sample set, selected or not
        let all = store.partition(false);
        let pairs: Vec<(SampleSetId, SampleSetId)> = normalize_comparisons(&self.comparisons)
            .into_iter()
            .filter(|(a, b)| all.contains(*a) && all.contains(*b))
            .collect();
        if pairs.is_empty() {
            return Err(Error::InvalidParameter(
                "none of the chosen comparisons refer to sample sets with members".into(),
            ));
        }
        let indexes: Vec<(usize, usize)> = pairs
            .iter()
            .filter_map(|(a, b)| Some((all.position(*a)?, all.position(*b)?)))
            .collect();

        let values = ts.multiway_statistic(
            self.statistic,
            &all.sample_sets(),
            &indexes,
            &windows,
            self.mode,
        )?;
        check_shape(&values, windows.len() - 1, pairs.len())?;

        let names = store.sample_sets().names();
        let name = |id: &SampleSetId| names.get(id).cloned().unwrap_or_else(|| id.to_string());
        let colors = self.palettes.get(&self.palette).map(Vec::as_slice).unwrap_or(&[]);
        let series = pairs
            .iter()
            .enumerate()
            .map(|(k, (a, b))| Series {
                label: format!("{}-{}", name(a), name(b)),
                color: if colors.is_empty() {
                    "black".to_owned()
                } else {
                    colors[k % colors.len()].clone()
                },
            })
            .collect();

        Ok(PairTable {
            pairs,
            table: StatTable {
                statistic: self.statistic.to_string(),
                mode: self.mode,
                sequence_length: ts.sequence_length(),
                windows,
                series,
                values,
            },
        })
    }
}

impl View for MultiwayStats {
    type Output = PairTable;

    fn dependencies(&self) -> &'static [StateKey] {
        &[StateKey::SampleSets, StateKey::Individuals]
    }

    fn render(&mut self, store: &DataStore, ts: &dyn TreeSequence) -> Rendered<PairTable> {
        if let Err(e) = require_sample_sets(&store.partition(true), 2) {
            return Err::<PairTable, Error>(e).into();
        }
        if self.comparisons.is_empty() {
            return Rendered::Prompt("Select which sample sets to compare to see this plot.".into());
        }
        self.compute(store, ts).into()
    }
}
