use std::collections::BTreeMap;

use crate::individuals::Individual;
use crate::{IndividualId, NodeId, SampleSetId};

/// The members of one sample set in a [`Partition`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    individuals: Vec<IndividualId>,
    samples: Vec<NodeId>,
}

impl Group {
    /// Member individuals in id order.
    pub fn individuals(&self) -> &[IndividualId] {
        &self.individuals
    }

    /// Haplotype node ids of the members, two per individual, in
    /// individual order.
    pub fn samples(&self) -> &[NodeId] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

/// Individuals grouped by the sample set they are assigned to.
///
/// A partition is computed from the registries on request and is never
/// updated in place. Sample sets without members are not present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    groups: BTreeMap<SampleSetId, Group>,
}

impl Partition {
    pub(crate) fn push(&mut self, individual: &Individual) {
        let group = self.groups.entry(individual.sample_set_id()).or_default();
        group.individuals.push(individual.id());
        group.samples.extend_from_slice(&individual.haplotype_ids());
    }

    /// Sample set ids with at least one member, ascending.
    pub fn ids(&self) -> Vec<SampleSetId> {
        self.groups.keys().copied().collect()
    }

    /// Number of non-empty sample sets.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, id: SampleSetId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn contains(&self, id: SampleSetId) -> bool {
        self.groups.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SampleSetId, &Group)> {
        self.groups.iter().map(|(id, group)| (*id, group))
    }

    /// Position of a sample set among the partition's ids, which is the
    /// index the genomics backend uses to refer to it.
    pub fn position(&self, id: SampleSetId) -> Option<usize> {
        self.groups.keys().position(|k| *k == id)
    }

    /// Sample node ids per sample set, in id order.
    pub fn sample_sets(&self) -> Vec<Vec<NodeId>> {
        self.groups.values().map(|g| g.samples.clone()).collect()
    }

    /// All sample node ids, grouped by sample set.
    pub fn samples(&self) -> Vec<NodeId> {
        self.groups
            .values()
            .flat_map(|g| g.samples.iter().copied())
            .collect()
    }

    /// All member individuals, grouped by sample set.
    pub fn individuals(&self) -> Vec<IndividualId> {
        self.groups
            .values()
            .flat_map(|g| g.individuals.iter().copied())
            .collect()
    }
}
