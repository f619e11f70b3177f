//! Genealogical nearest neighbour proportions.
//!
//! [`GnnBars`] shows, for every selected sample, which sample sets its
//! nearest genealogical relatives belong to. [`GnnHaplotype`] follows the
//! two haplotypes of one individual along the genome.

use std::cmp::Ordering;

use ndarray::Array2;

use crate::config::Config;
use crate::datastore::DataStore;
use crate::error::{Entity, Error, Result};
use crate::reactive::StateKey;
use crate::stats::check_shape;
use crate::tree_sequence::TreeSequence;
use crate::view::{require_sample_sets, Rendered, Series, View};
use crate::windows::make_windows;
use crate::{IndividualId, NodeId, SampleSetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One stacked bar.
#[derive(Debug, Clone, PartialEq)]
pub struct GnnRow {
    pub sample: NodeId,
    pub individual: IndividualId,
    pub name: String,
    pub sample_set_id: SampleSetId,
    /// One proportion per column of the table.
    pub proportions: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GnnTable {
    /// Column order, the sort column first when sorting by one.
    pub sample_set_ids: Vec<SampleSetId>,
    pub series: Vec<Series>,
    pub rows: Vec<GnnRow>,
}

pub struct GnnBars {
    /// Sample set whose proportion orders bars within each group; `None`
    /// orders by sample id.
    pub sort_by: Option<SampleSetId>,
    pub sort_order: SortOrder,
}

impl GnnBars {
    pub fn new(_config: &Config) -> Self {
        Self {
            sort_by: None,
            sort_order: SortOrder::Ascending,
        }
    }

    fn compute(&self, store: &DataStore, ts: &dyn TreeSequence) -> Result<GnnTable> {
        let partition = store.partition(true);
        require_sample_sets(&partition, 1)?;
        let mut sample_set_ids = partition.ids();
        let sort_column = match self.sort_by {
            Some(id) => Some(partition.position(id).ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "can't sort by sample set {} which has no selected members",
                    id
                ))
            })?),
            None => None,
        };

        let focal = partition.samples();
        let values = ts.genealogical_nearest_neighbours(&focal, &partition.sample_sets())?;
        check_shape(&values, focal.len(), sample_set_ids.len())?;

        let mut rows = Vec::with_capacity(focal.len());
        for (sample_set_id, group) in partition.iter() {
            for sample in group.samples() {
                let individual_id = store.individuals().individual_of_sample(*sample)?;
                let name = store
                    .individuals()
                    .get(individual_id)
                    .map(|i| i.name().to_owned())
                    .unwrap_or_default();
                let mut proportions = values.row(rows.len()).to_vec();
                if let Some(col) = sort_column {
                    proportions.swap(0, col);
                }
                rows.push(GnnRow {
                    sample: *sample,
                    individual: individual_id,
                    name,
                    sample_set_id,
                    proportions,
                });
            }
        }

        if let Some(col) = sort_column {
            sample_set_ids.swap(0, col);
        }
        let key = sort_column.map(|_| 0);
        let order = self.sort_order;
        rows.sort_by(|a, b| {
            let within = key
                .map(|k| {
                    a.proportions[k]
                        .partial_cmp(&b.proportions[k])
                        .unwrap_or(Ordering::Equal)
                })
                .unwrap_or(Ordering::Equal)
                .then(a.sample.cmp(&b.sample));
            let within = match order {
                SortOrder::Ascending => within,
                SortOrder::Descending => within.reverse(),
            };
            a.sample_set_id.cmp(&b.sample_set_id).then(within)
        });

        let names = store.sample_sets().names();
        let series = sample_set_ids
            .iter()
            .map(|id| Series {
                label: names.get(id).cloned().unwrap_or_else(|| id.to_string()),
                color: store.sample_sets().color(*id).unwrap_or("black").to_owned(),
            })
            .collect();

        Ok(GnnTable {
            sample_set_ids,
            series,
            rows,
        })
    }
}

impl View for GnnBars {
    type Output = GnnTable;

    fn dependencies(&self) -> &'static [StateKey] {
        &[StateKey::SampleSets, StateKey::Individuals]
    }

    fn render(&mut self, store: &DataStore, ts: &dyn TreeSequence) -> Rendered<GnnTable> {
        self.compute(store, ts).into()
    }
}

/// Windowed GNN proportions of both haplotypes of one individual.
#[derive(Debug, Clone, PartialEq)]
pub struct HaplotypeGnn {
    pub individual: IndividualId,
    pub samples: [NodeId; 2],
    pub windows: Vec<f64>,
    pub series: Vec<Series>,
    /// One row per window, one column per series, for each haplotype.
    pub haplotypes: [Array2<f64>; 2],
}

pub struct GnnHaplotype {
    pub individual_id: Option<IndividualId>,
    pub window_size: u64,
}

impl GnnHaplotype {
    pub fn new(config: &Config) -> Self {
        Self {
            individual_id: None,
            window_size: config.default_window_size,
        }
    }

    /// Smallest and largest individual id, for the input hint.
    pub fn valid_ids(store: &DataStore) -> Option<(IndividualId, IndividualId)> {
        let first = store.individuals().iter().next()?.id();
        Some((first, store.individuals().max_id()?))
    }

    fn compute(
        &self,
        individual_id: IndividualId,
        store: &DataStore,
        ts: &dyn TreeSequence,
    ) -> Result<HaplotypeGnn> {
        if store.individuals().get(individual_id).is_none() {
            return Err(Error::not_found(Entity::Individual, individual_id));
        }
        let samples = store.samples_by_individual(individual_id)?;
        let partition = store.partition(true);
        require_sample_sets(&partition, 1)?;
        let windows = make_windows(self.window_size, ts.sequence_length())?;

        let sample_sets = partition.sample_sets();
        let haplotype = |sample: NodeId| -> Result<Array2<f64>> {
            let values = ts.haplotype_gnn(sample, &sample_sets, &windows)?;
            check_shape(&values, windows.len() - 1, sample_sets.len())?;
            Ok(values)
        };
        let haplotypes = [haplotype(samples[0])?, haplotype(samples[1])?];

        let names = store.sample_sets().names();
        let series = partition
            .ids()
            .into_iter()
            .map(|id| Series {
                label: names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
                color: store.sample_sets().color(id).unwrap_or("black").to_owned(),
            })
            .collect();

        Ok(HaplotypeGnn {
            individual: individual_id,
            samples,
            windows,
            series,
            haplotypes,
        })
    }
}

impl View for GnnHaplotype {
    type Output = HaplotypeGnn;

    fn dependencies(&self) -> &'static [StateKey] {
        &[StateKey::SampleSets, StateKey::Individuals]
    }

    fn render(&mut self, store: &DataStore, ts: &dyn TreeSequence) -> Rendered<HaplotypeGnn> {
        match self.individual_id {
            None => Rendered::Prompt("Enter a valid sample id to see the GNN haplotype plot.".into()),
            Some(id) => self.compute(id, store, ts).into(),
        }
    }
}
