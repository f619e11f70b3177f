//! Geographic distribution of the selected individuals.

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::datastore::DataStore;
use crate::error::{Error, Result};
use crate::reactive::StateKey;
use crate::tree_sequence::TreeSequence;
use crate::view::{require_sample_sets, Rendered, View};
use crate::{IndividualId, SampleSetId};

/// Esri XYZ tile sets offered as map background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tiles {
    WorldImagery,
    WorldTopoMap,
    WorldStreetMap,
    WorldTerrain,
    WorldShadedRelief,
    WorldPhysical,
    WorldGrayCanvas,
}

impl Tiles {
    pub const ALL: [Tiles; 7] = [
        Tiles::WorldImagery,
        Tiles::WorldTopoMap,
        Tiles::WorldStreetMap,
        Tiles::WorldTerrain,
        Tiles::WorldShadedRelief,
        Tiles::WorldPhysical,
        Tiles::WorldGrayCanvas,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tiles::WorldImagery => "WorldImagery",
            Tiles::WorldTopoMap => "WorldTopoMap",
            Tiles::WorldStreetMap => "WorldStreetMap",
            Tiles::WorldTerrain => "WorldTerrain",
            Tiles::WorldShadedRelief => "WorldShadedRelief",
            Tiles::WorldPhysical => "WorldPhysical",
            Tiles::WorldGrayCanvas => "WorldGrayCanvas",
        }
    }
}

impl Default for Tiles {
    fn default() -> Self {
        Tiles::WorldPhysical
    }
}

impl fmt::Display for Tiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tiles {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tiles::ALL
            .iter()
            .find(|t| t.name() == s)
            .copied()
            .ok_or_else(|| Error::InvalidParameter(format!("unknown tiles {:?}", s)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub individual: IndividualId,
    pub name: String,
    pub population: Option<String>,
    pub sample_set_id: SampleSetId,
    pub longitude: f64,
    pub latitude: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPoints {
    pub tiles: Tiles,
    pub xlim: (f64, f64),
    pub ylim: (f64, f64),
    pub width: u32,
    pub points: Vec<MapPoint>,
}

pub struct GeoMap {
    pub tiles: Tiles,
    width: u32,
}

impl GeoMap {
    pub const XLIM: (f64, f64) = (-180.0, 180.0);
    pub const YLIM: (f64, f64) = (-60.0, 70.0);

    pub fn new(config: &Config) -> Self {
        Self {
            tiles: Tiles::default(),
            width: config.plot_width,
        }
    }

    fn compute(&self, store: &DataStore) -> Result<MapPoints> {
        let partition = store.partition(true);
        require_sample_sets(&partition, 1)?;

        // individuals without coordinates still count towards the selection
        let points = partition
            .individuals()
            .into_iter()
            .filter_map(|id| store.individuals().get(id))
            .filter_map(|ind| {
                let (longitude, latitude) = ind.location()?;
                Some(MapPoint {
                    individual: ind.id(),
                    name: ind.name().to_owned(),
                    population: ind.population().map(str::to_owned),
                    sample_set_id: ind.sample_set_id(),
                    longitude,
                    latitude,
                    color: store
                        .sample_sets()
                        .color(ind.sample_set_id())
                        .unwrap_or("black")
                        .to_owned(),
                })
            })
            .collect();

        Ok(MapPoints {
            tiles: self.tiles,
            xlim: Self::XLIM,
            ylim: Self::YLIM,
            width: self.width,
            points,
        })
    }
}

impl View for GeoMap {
    type Output = MapPoints;

    fn dependencies(&self) -> &'static [StateKey] {
        &[StateKey::SampleSets, StateKey::Individuals]
    }

    fn render(&mut self, store: &DataStore, _ts: &dyn TreeSequence) -> Rendered<MapPoints> {
        self.compute(store).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individuals::Individual;
    use crate::tree_sequence::fake::FakeTreeSequence;

    #[test]
    fn test_points_for_located_selected_individuals() -> Result<()> {
        let mut store = DataStore::new();
        store.create_sample_set("pop", "#d60000")?;
        store.add_individual(
            Individual::new(0, "a", [0, 1], 0)
                .with_location(10.5, 59.9)
                .with_population("NOR"),
        )?;
        store.add_individual(Individual::new(1, "b", [2, 3], 0))?;
        store.add_individual(Individual::new(2, "c", [4, 5], 0).with_location(-3.7, 40.4))?;
        store.set_selected(2, false)?;

        let ts = FakeTreeSequence::new(vec![0.0, 100.0]);
        let rendered = GeoMap::new(&Config::default()).render(&store, &ts);
        let map = rendered.plot().unwrap();
        assert_eq!(map.tiles, Tiles::WorldPhysical);
        assert_eq!(map.xlim, (-180.0, 180.0));
        assert_eq!(map.points.len(), 1);
        assert_eq!(map.points[0].individual, 0);
        assert_eq!(map.points[0].population.as_deref(), Some("NOR"));
        assert_eq!(map.points[0].color, "#d60000");
        assert_eq!(ts.queries(), 0);
        Ok(())
    }

    #[test]
    fn test_empty_selection_warns() -> Result<()> {
        let mut store = DataStore::new();
        store.create_sample_set("pop", "red")?;
        store.add_individual(Individual::new(0, "a", [0, 1], 0).with_selected(false))?;
        let ts = FakeTreeSequence::new(vec![0.0, 100.0]);
        assert!(matches!(
            GeoMap::new(&Config::default()).render(&store, &ts),
            Rendered::Warning(Error::InsufficientSelection { required: 1, selected: 0 })
        ));
        Ok(())
    }

    #[test]
    fn test_tiles_parse_by_name() -> Result<()> {
        assert_eq!("WorldGrayCanvas".parse::<Tiles>()?, Tiles::WorldGrayCanvas);
        assert!("OpenStreetMap".parse::<Tiles>().is_err());
        for tiles in Tiles::ALL.iter() {
            assert_eq!(tiles.to_string().parse::<Tiles>()?, *tiles);
        }
        Ok(())
    }
}
