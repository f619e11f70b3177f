use std::collections::HashMap;

use log::{debug, info};

use crate::config::Config;
use crate::error::{Entity, Error, Result};
use crate::individuals::{Individual, Individuals};
use crate::observable::Observation;
use crate::partition::Partition;
use crate::reactive::{Callback, Observers, StateKey, Subscription};
use crate::sample_sets::SampleSets;
use crate::{IndividualId, NodeId, SampleSetId};

/// Label of the sample set created when the loaded data has no
/// population column.
pub const DEFAULT_SAMPLE_SET: &str = "default";

/// The session state: sample sets, individuals and whoever is watching
/// them.
///
/// All mutations go through here so that every successful change is
/// followed by a notification. A failed mutation changes nothing and
/// notifies nobody.
#[derive(Debug, Default)]
pub struct DataStore {
    sample_sets: SampleSets,
    individuals: Individuals,
    observers: Observers,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing sample set registry, e.g. one built with
    /// [`SampleSets::with_unique_names`].
    pub fn with_sample_sets(sample_sets: SampleSets) -> Self {
        Self {
            sample_sets,
            ..Self::default()
        }
    }

    pub fn sample_sets(&self) -> &SampleSets {
        &self.sample_sets
    }

    pub fn individuals(&self) -> &Individuals {
        &self.individuals
    }

    pub fn subscribe(&mut self, keys: &[StateKey], callback: Callback) -> Subscription {
        self.observers.subscribe(keys, callback)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    fn changed(&mut self, key: StateKey) {
        self.observers
            .notify(key, &self.sample_sets, &self.individuals);
    }

    pub fn create_sample_set(&mut self, name: &str, color: &str) -> Result<SampleSetId> {
        let id = self.sample_sets.create(name, color)?;
        self.changed(StateKey::SampleSets);
        Ok(id)
    }

    pub fn rename_sample_set(&mut self, id: SampleSetId, name: &str) -> Result<()> {
        self.sample_sets.rename(id, name)?;
        self.changed(StateKey::SampleSets);
        Ok(())
    }

    pub fn recolor_sample_set(&mut self, id: SampleSetId, color: &str) -> Result<()> {
        self.sample_sets.recolor(id, color)?;
        self.changed(StateKey::SampleSets);
        Ok(())
    }

    /// Deletes a sample set that no individual is assigned to.
    pub fn delete_sample_set(&mut self, id: SampleSetId) -> Result<()> {
        if !self.sample_sets.contains(id) {
            return Err(Error::not_found(Entity::SampleSet, id));
        }
        let count = self.individuals.references(id);
        if count > 0 {
            return Err(Error::InUse { id, count });
        }
        self.sample_sets.remove(id)?;
        debug!("deleted sample set {}", id);
        self.changed(StateKey::SampleSets);
        Ok(())
    }

    pub fn add_individual(&mut self, individual: Individual) -> Result<()> {
        self.individuals.insert(individual, &self.sample_sets)?;
        self.changed(StateKey::Individuals);
        Ok(())
    }

    pub fn set_selected(&mut self, id: IndividualId, selected: bool) -> Result<()> {
        self.individuals.set_selected(id, selected)?;
        self.changed(StateKey::Individuals);
        Ok(())
    }

    pub fn bulk_set_selected(&mut self, ids: &[IndividualId], selected: bool) -> Result<()> {
        self.individuals.bulk_set_selected(ids, selected)?;
        self.changed(StateKey::Individuals);
        Ok(())
    }

    pub fn reassign(&mut self, id: IndividualId, sample_set_id: SampleSetId) -> Result<()> {
        self.individuals
            .reassign(id, sample_set_id, &self.sample_sets)?;
        self.changed(StateKey::Individuals);
        Ok(())
    }

    pub fn bulk_reassign(&mut self, ids: &[IndividualId], sample_set_id: SampleSetId) -> Result<()> {
        self.individuals
            .bulk_reassign(ids, sample_set_id, &self.sample_sets)?;
        self.changed(StateKey::Individuals);
        Ok(())
    }

    pub fn select_sample_sets(&mut self, sample_set_ids: &[SampleSetId]) -> Result<()> {
        self.individuals
            .select_sample_sets(sample_set_ids, &self.sample_sets)?;
        self.changed(StateKey::Individuals);
        Ok(())
    }

    pub fn samples_by_individual(&self, id: IndividualId) -> Result<[NodeId; 2]> {
        self.individuals.samples_by_individual(id)
    }

    /// The current grouping of individuals, recomputed on every call.
    pub fn partition(&self, only_selected: bool) -> Partition {
        self.individuals.partition(only_selected)
    }

    /// Loads individuals, creating one sample set per population label in
    /// first-seen order.
    ///
    /// Individuals without a population label go to a single
    /// [`DEFAULT_SAMPLE_SET`]. Colors cycle through
    /// `config.sample_set_colours`. Every loaded individual starts selected.
    ///
    /// Loading is all or nothing: a bad row or an invalid `config` leaves
    /// the store untouched and notifies nobody.
    pub fn observe<I>(&mut self, observations: I, config: &Config) -> Result<()>
    where
        I: Iterator<Item = Result<Observation>>,
    {
        config.validate()?;
        let mut sample_sets = self.sample_sets.clone();
        let mut individuals = self.individuals.clone();
        let mut by_label: HashMap<String, SampleSetId> = sample_sets
            .iter()
            .map(|s| (s.name().to_owned(), s.id()))
            .collect();
        let mut loaded = 0usize;
        for (row, observation) in observations.enumerate() {
            let observation = observation?;
            let label = observation
                .population
                .clone()
                .unwrap_or_else(|| DEFAULT_SAMPLE_SET.to_owned());
            let sample_set_id = match by_label.get(&label) {
                Some(id) => *id,
                None => {
                    let color = config.sample_set_colour(sample_sets.len());
                    let id = sample_sets.create(&label, color)?;
                    by_label.insert(label, id);
                    id
                }
            };
            let id = observation.id.unwrap_or(row as IndividualId);
            let mut individual = Individual::new(id, &observation.name, observation.nodes, sample_set_id);
            if let Some(population) = &observation.population {
                individual = individual.with_population(population);
            }
            if let Some((longitude, latitude)) = observation.location {
                individual = individual.with_location(longitude, latitude);
            }
            individuals.insert(individual, &sample_sets)?;
            loaded += 1;
        }
        self.sample_sets = sample_sets;
        self.individuals = individuals;
        info!(
            "loaded {} individual(s) into {} sample set(s)",
            loaded,
            self.sample_sets.len()
        );
        self.changed(StateKey::SampleSets);
        self.changed(StateKey::Individuals);
        Ok(())
    }
}
