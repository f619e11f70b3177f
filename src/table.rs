//! The combined individuals table.
//!
//! Each row joins an individual with the name and color of its sample set.
//! Only the sample set assignment and the selection flag can be edited.

use std::collections::BTreeMap;
use std::fmt;

use crate::datastore::DataStore;
use crate::error::{Error, Result};
use crate::reactive::StateKey;
use crate::tree_sequence::TreeSequence;
use crate::view::{Rendered, View};
use crate::{IndividualId, NodeId, SampleSetId};

/// Rows per page, one of [`PageSize::ALLOWED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    pub const ALLOWED: [usize; 6] = [10, 20, 50, 100, 200, 500];

    pub fn new(rows: usize) -> Result<Self> {
        if !Self::ALLOWED.contains(&rows) {
            return Err(Error::InvalidParameter(format!(
                "page size {} is not one of {:?}",
                rows,
                Self::ALLOWED
            )));
        }
        Ok(PageSize(rows))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(20)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Id,
    Name,
    Population,
    Longitude,
    Latitude,
    SampleSetId,
    SampleSetName,
    Color,
    Selected,
    Samples,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Id,
        Column::Name,
        Column::Population,
        Column::Longitude,
        Column::Latitude,
        Column::SampleSetId,
        Column::SampleSetName,
        Column::Color,
        Column::Selected,
        Column::Samples,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Population => "population",
            Column::Longitude => "longitude",
            Column::Latitude => "latitude",
            Column::SampleSetId => "sample_set_id",
            Column::SampleSetName => "sample_set_name",
            Column::Color => "color",
            Column::Selected => "selected",
            Column::Samples => "samples",
        }
    }

    /// The editor a column accepts, if it is editable at all.
    fn allowed_editor(&self) -> Option<ColumnEditor> {
        match self {
            Column::SampleSetId => Some(ColumnEditor::Number),
            Column::Selected => Some(ColumnEditor::Toggle),
            _ => None,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnEditor {
    None,
    Number,
    Toggle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    page_size: PageSize,
    editors: BTreeMap<Column, ColumnEditor>,
}

impl Default for TableOptions {
    fn default() -> Self {
        let editors = Column::ALL
            .iter()
            .map(|c| (*c, c.allowed_editor().unwrap_or(ColumnEditor::None)))
            .collect();
        Self {
            page_size: PageSize::default(),
            editors,
        }
    }
}

impl TableOptions {
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn set_page_size(&mut self, rows: usize) -> Result<()> {
        self.page_size = PageSize::new(rows)?;
        Ok(())
    }

    pub fn editor(&self, column: Column) -> ColumnEditor {
        self.editors
            .get(&column)
            .copied()
            .unwrap_or(ColumnEditor::None)
    }

    pub fn set_editor(&mut self, column: Column, editor: ColumnEditor) -> Result<()> {
        if editor != ColumnEditor::None && column.allowed_editor() != Some(editor) {
            return Err(Error::InvalidParameter(format!(
                "column {} can't be edited with {:?}",
                column, editor
            )));
        }
        self.editors.insert(column, editor);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: IndividualId,
    pub name: String,
    pub population: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub sample_set_id: SampleSetId,
    pub sample_set_name: String,
    pub color: String,
    pub selected: bool,
    pub samples: [NodeId; 2],
}

/// Row filter; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filter {
    pub sample_set_id: Option<SampleSetId>,
    pub selected: Option<bool>,
}

impl Filter {
    fn matches(&self, row: &TableRow) -> bool {
        self.sample_set_id.map_or(true, |id| id == row.sample_set_id)
            && self.selected.map_or(true, |s| s == row.selected)
    }
}

/// A change typed into an editable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEdit {
    SampleSet(SampleSetId),
    Selected(bool),
}

impl CellEdit {
    fn column(&self) -> Column {
        match self {
            CellEdit::SampleSet(_) => Column::SampleSetId,
            CellEdit::Selected(_) => Column::Selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub page: usize,
    pub num_pages: usize,
    pub total_rows: usize,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Default)]
pub struct IndividualsTable {
    pub options: TableOptions,
    pub filter: Filter,
    pub current_page: usize,
}

impl IndividualsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows passing the filter, in individual id order.
    pub fn rows(&self, store: &DataStore) -> Vec<TableRow> {
        let names = store.sample_sets().names();
        store
            .individuals()
            .iter()
            .map(|ind| {
                let ssid = ind.sample_set_id();
                TableRow {
                    id: ind.id(),
                    name: ind.name().to_owned(),
                    population: ind.population().map(str::to_owned),
                    longitude: ind.longitude(),
                    latitude: ind.latitude(),
                    sample_set_id: ssid,
                    sample_set_name: names.get(&ssid).cloned().unwrap_or_default(),
                    color: store.sample_sets().color(ssid).unwrap_or_default().to_owned(),
                    selected: ind.selected(),
                    samples: ind.haplotype_ids(),
                }
            })
            .filter(|row| self.filter.matches(row))
            .collect()
    }

    /// Zero based page `n`. An empty table has a single empty page.
    pub fn page(&self, store: &DataStore, n: usize) -> Result<TablePage> {
        let rows = self.rows(store);
        let size = self.options.page_size().get();
        let num_pages = ((rows.len() + size - 1) / size).max(1);
        if n >= num_pages {
            return Err(Error::InvalidParameter(format!(
                "page {} is outside [0, {}]",
                n,
                num_pages - 1
            )));
        }
        let total_rows = rows.len();
        let rows = rows.into_iter().skip(n * size).take(size).collect();
        Ok(TablePage {
            page: n,
            num_pages,
            total_rows,
            rows,
        })
    }

    /// Applies a cell edit through the store, refusing columns whose
    /// editor is switched off.
    pub fn edit(&self, store: &mut DataStore, id: IndividualId, edit: CellEdit) -> Result<()> {
        let column = edit.column();
        if self.options.editor(column) == ColumnEditor::None {
            return Err(Error::InvalidParameter(format!(
                "column {} is not editable",
                column
            )));
        }
        match edit {
            CellEdit::SampleSet(ssid) => store.reassign(id, ssid),
            CellEdit::Selected(selected) => store.set_selected(id, selected),
        }
    }
}

impl View for IndividualsTable {
    type Output = TablePage;

    fn dependencies(&self) -> &'static [StateKey] {
        &[StateKey::SampleSets, StateKey::Individuals]
    }

    fn render(&mut self, store: &DataStore, _ts: &dyn TreeSequence) -> Rendered<TablePage> {
        self.page(store, self.current_page).into()
    }
}
