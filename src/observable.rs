use std::io::Read;

use crate::error::{Error, Result};
use crate::{IndividualId, NodeId};

/// One individual as read from a metadata table.
///
/// Observations are turned into registry entries by
/// [`DataStore::observe`](crate::DataStore::observe).
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Explicit individual id; the row number is used when absent.
    pub id: Option<IndividualId>,
    pub name: String,
    pub population: Option<String>,
    /// `(longitude, latitude)`
    pub location: Option<(f64, f64)>,
    pub nodes: [NodeId; 2],
}

impl Observation {
    pub fn new(name: &str, nodes: [NodeId; 2]) -> Self {
        Self {
            id: None,
            name: name.to_owned(),
            population: None,
            location: None,
            nodes,
        }
    }

    pub fn id(mut self, id: IndividualId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn population(mut self, population: &str) -> Self {
        self.population = Some(population.to_owned());
        self
    }

    pub fn location(mut self, longitude: f64, latitude: f64) -> Self {
        self.location = Some((longitude, latitude));
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Columns {
    id: Option<usize>,
    name: Option<usize>,
    population: Option<usize>,
    longitude: Option<usize>,
    latitude: Option<usize>,
    nodes: Option<usize>,
}

/// Produces Observations from delimited individual metadata.
///
/// `Csv` implements Iterator so it can be passed directly to
/// `DataStore::observe()`.
pub struct Csv {
    records: std::iter::Enumerate<csv::StringRecordsIntoIter<Box<dyn Read>>>,
    columns: Columns,
    separator: String,
}

impl Csv {
    fn field<'r>(record: &'r csv::StringRecord, column: Option<usize>) -> Option<&'r str> {
        column
            .and_then(|c| record.get(c))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn parse(&self, row: usize, record: &csv::StringRecord) -> Result<Observation> {
        let bad = |what: &str| Error::Parse(format!("row {}: {}", row + 1, what));

        let nodes_field =
            Self::field(record, self.columns.nodes).ok_or_else(|| bad("missing nodes"))?;
        let nodes: Vec<NodeId> = nodes_field
            .split(self.separator.as_str())
            .map(|n| n.trim().parse::<NodeId>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| bad(&format!("invalid nodes {:?}", nodes_field)))?;
        let nodes: [NodeId; 2] = match nodes.as_slice() {
            [a, b] => [*a, *b],
            _ => return Err(bad(&format!("expected two nodes, got {:?}", nodes_field))),
        };

        let name = Self::field(record, self.columns.name)
            .map(str::to_owned)
            .unwrap_or_else(|| row.to_string());
        let mut observation = Observation::new(&name, nodes);

        if let Some(id) = Self::field(record, self.columns.id) {
            let id = id
                .parse::<IndividualId>()
                .map_err(|_| bad(&format!("invalid id {:?}", id)))?;
            observation = observation.id(id);
        }
        if let Some(population) = Self::field(record, self.columns.population) {
            observation = observation.population(population);
        }

        let coordinate = |column: Option<usize>| -> Result<Option<f64>> {
            Self::field(record, column)
                .map(|s| {
                    s.parse::<f64>()
                        .map_err(|_| bad(&format!("invalid coordinate {:?}", s)))
                })
                .transpose()
        };
        match (coordinate(self.columns.longitude)?, coordinate(self.columns.latitude)?) {
            (Some(longitude), Some(latitude)) => {
                observation = observation.location(longitude, latitude);
            }
            (None, None) => {}
            _ => return Err(bad("longitude and latitude must both be present or both empty")),
        }
        Ok(observation)
    }
}

impl Iterator for Csv {
    type Item = Result<Observation>;

    fn next(&mut self) -> Option<Result<Observation>> {
        let (row, record) = self.records.next()?;
        Some(
            record
                .map_err(Error::from)
                .and_then(|record| self.parse(row, &record)),
        )
    }
}

pub struct CsvBuilder {
    delimiter: u8,
    separator: String,
    id_field: String,
    name_field: String,
    population_field: String,
    longitude_field: String,
    latitude_field: String,
    nodes_field: String,
}

impl CsvBuilder {
    /// Construct a new Csv builder
    ///
    /// Defaults to comma delimited columns named `id`, `name`, `population`,
    /// `longitude`, `latitude` and `nodes`, with the two nodes of an
    /// individual separated by `/`.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            separator: "/".to_owned(),
            id_field: "id".to_owned(),
            name_field: "name".to_owned(),
            population_field: "population".to_owned(),
            longitude_field: "longitude".to_owned(),
            latitude_field: "latitude".to_owned(),
            nodes_field: "nodes".to_owned(),
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Separator between the two node ids in the nodes column.
    pub fn separator(&mut self, separator: &str) -> &mut Self {
        self.separator = separator.to_owned();
        self
    }

    pub fn id_field(&mut self, field: &str) -> &mut Self {
        self.id_field = field.to_owned();
        self
    }

    pub fn name_field(&mut self, field: &str) -> &mut Self {
        self.name_field = field.to_owned();
        self
    }

    pub fn population_field(&mut self, field: &str) -> &mut Self {
        self.population_field = field.to_owned();
        self
    }

    pub fn longitude_field(&mut self, field: &str) -> &mut Self {
        self.longitude_field = field.to_owned();
        self
    }

    pub fn latitude_field(&mut self, field: &str) -> &mut Self {
        self.latitude_field = field.to_owned();
        self
    }

    pub fn nodes_field(&mut self, field: &str) -> &mut Self {
        self.nodes_field = field.to_owned();
        self
    }

    pub fn from_reader(&self, reader: Box<dyn Read>) -> Result<Csv> {
        if self.separator.is_empty() {
            return Err(Error::InvalidParameter("node separator is empty".into()));
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let columns = Columns {
            id: find(&self.id_field),
            name: find(&self.name_field),
            population: find(&self.population_field),
            longitude: find(&self.longitude_field),
            latitude: find(&self.latitude_field),
            nodes: find(&self.nodes_field),
        };
        if columns.nodes.is_none() {
            return Err(Error::Parse(format!(
                "no {:?} column in header",
                self.nodes_field
            )));
        }

        Ok(Csv {
            records: rdr.into_records().enumerate(),
            columns,
            separator: self.separator.clone(),
        })
    }
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::DataStore;

    const TABLE: &str = "id,name,population,longitude,latitude,nodes
0,NA19238,YRI,3.9,7.4,0/1
1,NA12878,CEU,,,2/3
2,NA19239,YRI,3.9,7.4,4/5
";

    #[test]
    fn test_csv_reads_observations() -> Result<()> {
        let observations: Vec<Observation> = CsvBuilder::new()
            .from_reader(Box::new(TABLE.as_bytes()))?
            .collect::<Result<_>>()?;
        assert_eq!(observations.len(), 3);
        assert_eq!(
            observations[0],
            Observation::new("NA19238", [0, 1])
                .id(0)
                .population("YRI")
                .location(3.9, 7.4)
        );
        assert_eq!(observations[1].location, None);
        Ok(())
    }

    #[test]
    fn test_csv_into_datastore() -> Result<()> {
        let mut store = DataStore::new();
        store.observe(
            CsvBuilder::new().from_reader(Box::new(TABLE.as_bytes()))?,
            &Config::default(),
        )?;
        assert_eq!(store.individuals().len(), 3);
        assert_eq!(store.sample_sets().len(), 2);
        assert_eq!(store.samples_by_individual(2)?, [4, 5]);
        Ok(())
    }

    #[test]
    fn test_csv_custom_layout() -> Result<()> {
        let table = "sample\tpop\tnode_ids\nHG1\tGBR\t10|11\n";
        let observations: Vec<Observation> = CsvBuilder::new()
            .delimiter(b'\t')
            .separator("|")
            .name_field("sample")
            .population_field("pop")
            .nodes_field("node_ids")
            .from_reader(Box::new(table.as_bytes()))?
            .collect::<Result<_>>()?;
        assert_eq!(observations[0].nodes, [10, 11]);
        assert_eq!(observations[0].population.as_deref(), Some("GBR"));
        assert_eq!(observations[0].id, None);
        Ok(())
    }

    #[test]
    fn test_csv_malformed_rows() -> Result<()> {
        let table = "name,nodes,longitude,latitude\na,0/1/2,,\nb,x/1,,\nc,4/5,1.0,\n";
        let results: Vec<Result<Observation>> = CsvBuilder::new()
            .from_reader(Box::new(table.as_bytes()))?
            .collect();
        assert!(results.iter().all(|r| matches!(r, Err(Error::Parse(_)))));
        Ok(())
    }

    #[test]
    fn test_csv_requires_nodes_column() {
        assert!(CsvBuilder::new()
            .from_reader(Box::new("name\na\n".as_bytes()))
            .is_err());
    }
}
