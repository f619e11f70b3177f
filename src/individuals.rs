use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::error::{Entity, Error, Result};
use crate::partition::Partition;
use crate::sample_sets::SampleSets;
use crate::{IndividualId, NodeId, SampleSetId};

/// A diploid individual and its two haplotype sample nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    id: IndividualId,
    name: String,
    population: Option<String>,
    location: Option<(f64, f64)>,
    sample_set_id: SampleSetId,
    selected: bool,
    haplotype_ids: [NodeId; 2],
}

impl Individual {
    /// Constructs a selected individual with no location.
    pub fn new(
        id: IndividualId,
        name: &str,
        haplotype_ids: [NodeId; 2],
        sample_set_id: SampleSetId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            population: None,
            location: None,
            sample_set_id,
            selected: true,
            haplotype_ids,
        }
    }

    /// Sets the sampling location as `(longitude, latitude)`.
    pub fn with_location(mut self, longitude: f64, latitude: f64) -> Self {
        self.location = Some((longitude, latitude));
        self
    }

    /// Sets the population label the individual was loaded with.
    pub fn with_population(mut self, population: &str) -> Self {
        self.population = Some(population.into());
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn id(&self) -> IndividualId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn population(&self) -> Option<&str> {
        self.population.as_deref()
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|(lon, _)| lon)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|(_, lat)| lat)
    }

    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    pub fn sample_set_id(&self) -> SampleSetId {
        self.sample_set_id
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn haplotype_ids(&self) -> [NodeId; 2] {
        self.haplotype_ids
    }
}

/// Registry of individuals keyed by id.
///
/// Haplotype ids are fixed once an individual is inserted; only the
/// inclusion flag and the sample set assignment can change afterwards.
#[derive(Debug, Clone, Default)]
pub struct Individuals {
    individuals: BTreeMap<IndividualId, Individual>,
    sample2ind: HashMap<NodeId, IndividualId>,
}

impl Individuals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an individual at load time.
    ///
    /// Fails if the id or one of the haplotype nodes is already registered,
    /// or if the sample set doesn't exist.
    pub fn insert(&mut self, individual: Individual, sample_sets: &SampleSets) -> Result<()> {
        if !sample_sets.contains(individual.sample_set_id) {
            return Err(Error::not_found(
                Entity::SampleSet,
                individual.sample_set_id,
            ));
        }
        if self.individuals.contains_key(&individual.id) {
            return Err(Error::InvalidParameter(format!(
                "individual {} is already registered",
                individual.id
            )));
        }
        let [a, b] = individual.haplotype_ids;
        if a == b || self.sample2ind.contains_key(&a) || self.sample2ind.contains_key(&b) {
            return Err(Error::InvalidParameter(format!(
                "haplotype nodes {:?} of individual {} overlap existing samples",
                individual.haplotype_ids, individual.id
            )));
        }
        self.sample2ind.insert(a, individual.id);
        self.sample2ind.insert(b, individual.id);
        self.individuals.insert(individual.id, individual);
        Ok(())
    }

    fn get_mut(&mut self, id: IndividualId) -> Result<&mut Individual> {
        self.individuals
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(Entity::Individual, id))
    }

    fn check_ids(&self, ids: &[IndividualId]) -> Result<()> {
        match ids.iter().find(|id| !self.individuals.contains_key(*id)) {
            Some(missing) => Err(Error::not_found(Entity::Individual, *missing)),
            None => Ok(()),
        }
    }

    pub fn set_selected(&mut self, id: IndividualId, selected: bool) -> Result<()> {
        self.get_mut(id)?.selected = selected;
        debug!("individual {} selected = {}", id, selected);
        Ok(())
    }

    /// Sets the inclusion flag of every listed individual, or of none if
    /// any id is unknown.
    pub fn bulk_set_selected(&mut self, ids: &[IndividualId], selected: bool) -> Result<()> {
        self.check_ids(ids)?;
        for id in ids {
            if let Some(individual) = self.individuals.get_mut(id) {
                individual.selected = selected;
            }
        }
        debug!("{} individual(s) selected = {}", ids.len(), selected);
        Ok(())
    }

    pub fn reassign(
        &mut self,
        id: IndividualId,
        sample_set_id: SampleSetId,
        sample_sets: &SampleSets,
    ) -> Result<()> {
        if !sample_sets.contains(sample_set_id) {
            return Err(Error::not_found(Entity::SampleSet, sample_set_id));
        }
        self.get_mut(id)?.sample_set_id = sample_set_id;
        debug!("individual {} moved to sample set {}", id, sample_set_id);
        Ok(())
    }

    /// Moves every listed individual to `sample_set_id`.
    ///
    /// All ids are checked before anything changes, so an unknown id leaves
    /// the registry untouched and is reported in the error.
    pub fn bulk_reassign(
        &mut self,
        ids: &[IndividualId],
        sample_set_id: SampleSetId,
        sample_sets: &SampleSets,
    ) -> Result<()> {
        if !sample_sets.contains(sample_set_id) {
            return Err(Error::not_found(Entity::SampleSet, sample_set_id));
        }
        self.check_ids(ids)?;
        for id in ids {
            if let Some(individual) = self.individuals.get_mut(id) {
                individual.sample_set_id = sample_set_id;
            }
        }
        debug!(
            "{} individual(s) moved to sample set {}",
            ids.len(),
            sample_set_id
        );
        Ok(())
    }

    /// Selects exactly the individuals assigned to one of `sample_set_ids`
    /// and deselects everyone else.
    pub fn select_sample_sets(
        &mut self,
        sample_set_ids: &[SampleSetId],
        sample_sets: &SampleSets,
    ) -> Result<()> {
        if let Some(missing) = sample_set_ids.iter().find(|id| !sample_sets.contains(**id)) {
            return Err(Error::not_found(Entity::SampleSet, *missing));
        }
        let wanted: BTreeSet<SampleSetId> = sample_set_ids.iter().copied().collect();
        for individual in self.individuals.values_mut() {
            individual.selected = wanted.contains(&individual.sample_set_id);
        }
        debug!("selection restricted to sample sets {:?}", wanted);
        Ok(())
    }

    pub fn samples_by_individual(&self, id: IndividualId) -> Result<[NodeId; 2]> {
        self.individuals
            .get(&id)
            .map(|i| i.haplotype_ids)
            .ok_or_else(|| Error::not_found(Entity::Individual, id))
    }

    pub fn individual_of_sample(&self, sample: NodeId) -> Result<IndividualId> {
        self.sample2ind
            .get(&sample)
            .copied()
            .ok_or_else(|| Error::not_found(Entity::Sample, sample))
    }

    /// Every haplotype node id, in individual order.
    pub fn samples(&self) -> Vec<NodeId> {
        self.individuals
            .values()
            .flat_map(|i| i.haplotype_ids.iter().copied())
            .collect()
    }

    /// Number of individuals assigned to a sample set.
    pub fn references(&self, sample_set_id: SampleSetId) -> usize {
        self.individuals
            .values()
            .filter(|i| i.sample_set_id == sample_set_id)
            .count()
    }

    /// Groups individuals by sample set.
    ///
    /// With `only_selected` the inclusion flag is honoured; without it every
    /// individual is grouped, which multiway comparisons use to index into
    /// the full set of sample sets.
    pub fn partition(&self, only_selected: bool) -> Partition {
        let mut partition = Partition::default();
        for individual in self
            .individuals
            .values()
            .filter(|i| !only_selected || i.selected)
        {
            partition.push(individual);
        }
        partition
    }

    pub fn get(&self, id: IndividualId) -> Option<&Individual> {
        self.individuals.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.values()
    }

    pub fn max_id(&self) -> Option<IndividualId> {
        self.individuals.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn registry(members: &[(u32, bool)]) -> (SampleSets, Individuals) {
        let mut sets = SampleSets::new();
        for i in 0..4 {
            sets.create(&format!("set{}", i), "black").unwrap();
        }
        let mut inds = Individuals::new();
        for (id, (set, selected)) in members.iter().enumerate() {
            let id = id as u32;
            inds.insert(
                Individual::new(id, "x", [2 * id, 2 * id + 1], *set).with_selected(*selected),
                &sets,
            )
            .unwrap();
        }
        (sets, inds)
    }

    proptest! {
        #[test]
        fn partition_is_exactly_the_selected_individuals(
            members in proptest::collection::vec((0u32..4, any::<bool>()), 0..40)
        ) {
            let (_, inds) = registry(&members);
            let partition = inds.partition(true);

            let mut seen = BTreeSet::new();
            for (set, group) in partition.iter() {
                prop_assert!(!group.is_empty());
                for id in group.individuals() {
                    let individual = inds.get(*id).unwrap();
                    prop_assert!(individual.selected());
                    prop_assert_eq!(individual.sample_set_id(), set);
                    prop_assert!(seen.insert(*id));
                }
            }
            let expected: BTreeSet<IndividualId> =
                inds.iter().filter(|i| i.selected()).map(|i| i.id()).collect();
            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn reassign_round_trip(
            members in proptest::collection::vec((0u32..4, any::<bool>()), 1..20),
            target in 0u32..4,
        ) {
            let (sets, mut inds) = registry(&members);
            let before = inds.partition(true);
            let original = inds.get(0).unwrap().sample_set_id();
            inds.reassign(0, target, &sets).unwrap();
            inds.reassign(0, original, &sets).unwrap();
            prop_assert_eq!(inds.partition(true), before);
        }
    }
}
