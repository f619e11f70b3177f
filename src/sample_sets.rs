use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::error::{Entity, Error, Result};
use crate::SampleSetId;

/// A named, colored group of individuals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSet {
    id: SampleSetId,
    name: String,
    color: String,
}

impl SampleSet {
    pub fn id(&self) -> SampleSetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` and plain named colors such as
/// `"steelblue"`.
pub fn is_valid_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => !color.is_empty() && color.chars().all(|c| c.is_ascii_alphabetic()),
    }
}

fn check_color(color: &str) -> Result<()> {
    if is_valid_color(color) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{:?} is not a hex or named color",
            color
        )))
    }
}

/// Ordered registry of sample sets keyed by id.
///
/// Deleting a sample set needs to know whether any individual still
/// references it, so `delete` lives on [`DataStore`](crate::DataStore).
/// Everything here only touches the sample sets themselves.
#[derive(Debug, Clone, Default)]
pub struct SampleSets {
    sets: BTreeMap<SampleSetId, SampleSet>,
    /// Never decremented, so a deleted id is not handed out again.
    next_id: SampleSetId,
    unique_names: bool,
}

impl SampleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that refuses to create or rename a sample set to a name
    /// that is already taken.
    pub fn with_unique_names() -> Self {
        Self {
            unique_names: true,
            ..Self::default()
        }
    }

    pub fn unique_names(&self) -> bool {
        self.unique_names
    }

    fn check_name(&self, name: &str, except: Option<SampleSetId>) -> Result<()> {
        if self.unique_names
            && self
                .sets
                .values()
                .any(|s| s.name == name && Some(s.id) != except)
        {
            return Err(Error::DuplicateName(name.to_owned()));
        }
        Ok(())
    }

    /// Creates a sample set with an id no set has had before.
    pub fn create(&mut self, name: &str, color: &str) -> Result<SampleSetId> {
        check_color(color)?;
        self.check_name(name, None)?;
        let id = self.next_id;
        self.next_id += 1;
        self.sets.insert(
            id,
            SampleSet {
                id,
                name: name.to_owned(),
                color: color.to_owned(),
            },
        );
        debug!("created sample set {} ({:?}, {})", id, name, color);
        Ok(id)
    }

    pub fn rename(&mut self, id: SampleSetId, name: &str) -> Result<()> {
        if !self.sets.contains_key(&id) {
            return Err(Error::not_found(Entity::SampleSet, id));
        }
        self.check_name(name, Some(id))?;
        if let Some(set) = self.sets.get_mut(&id) {
            set.name = name.to_owned();
        }
        debug!("renamed sample set {} to {:?}", id, name);
        Ok(())
    }

    pub fn recolor(&mut self, id: SampleSetId, color: &str) -> Result<()> {
        check_color(color)?;
        let set = self
            .sets
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(Entity::SampleSet, id))?;
        set.color = color.to_owned();
        debug!("recolored sample set {} to {}", id, color);
        Ok(())
    }

    /// Removes a sample set without checking for references.
    pub(crate) fn remove(&mut self, id: SampleSetId) -> Result<SampleSet> {
        self.sets
            .remove(&id)
            .ok_or_else(|| Error::not_found(Entity::SampleSet, id))
    }

    pub fn get(&self, id: SampleSetId) -> Option<&SampleSet> {
        self.sets.get(&id)
    }

    pub fn contains(&self, id: SampleSetId) -> bool {
        self.sets.contains_key(&id)
    }

    pub fn color(&self, id: SampleSetId) -> Option<&str> {
        self.sets.get(&id).map(|s| s.color.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleSet> {
        self.sets.values()
    }

    pub fn ids(&self) -> Vec<SampleSetId> {
        self.sets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Display names keyed by id.
    ///
    /// Names need not be unique, but legends and table columns are keyed by
    /// them, so any name shared by more than one set gets its id appended.
    pub fn names(&self) -> BTreeMap<SampleSetId, String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for set in self.sets.values() {
            *counts.entry(set.name.as_str()).or_insert(0) += 1;
        }
        self.sets
            .values()
            .map(|set| {
                let label = if counts[set.name.as_str()] > 1 {
                    format!("{} ({})", set.name, set.id)
                } else {
                    set.name.clone()
                };
                (set.id, label)
            })
            .collect()
    }

    /// The display name of one set, see [`SampleSets::names`].
    pub fn label(&self, id: SampleSetId) -> Option<String> {
        let set = self.sets.get(&id)?;
        let shared = self.sets.values().filter(|s| s.name == set.name).count() > 1;
        Some(if shared {
            format!("{} ({})", set.name, set.id)
        } else {
            set.name.clone()
        })
    }
}
