//! The pages of a session wired to its [`DataStore`].
//!
//! Each page subscribes to the state its view depends on. A mutation made
//! through the dashboard flags the affected pages and re-renders them
//! before the call returns, so every page always shows the current state.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};

use crate::config::Config;
use crate::datastore::DataStore;
use crate::error::Result;
use crate::gnn::{GnnBars, GnnHaplotype};
use crate::map::GeoMap;
use crate::stats::{MultiwayStats, OnewayStats};
use crate::table::{CellEdit, IndividualsTable};
use crate::tree_sequence::TreeSequence;
use crate::trees::TreeView;
use crate::view::{Rendered, View};
use crate::{IndividualId, SampleSetId};

/// A view and its latest rendering.
pub struct Page<V: View> {
    view: V,
    output: Rendered<V::Output>,
    dirty: Rc<Cell<bool>>,
    renders: usize,
}

impl<V: View> Page<V> {
    fn new(mut view: V, store: &mut DataStore, ts: &dyn TreeSequence) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        store.subscribe(
            view.dependencies(),
            Box::new(move |_, _, _| flag.set(true)),
        );
        let output = view.render(store, ts);
        Self {
            view,
            output,
            dirty,
            renders: 1,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn output(&self) -> &Rendered<V::Output> {
        &self.output
    }

    /// Number of times the view has been rendered.
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn render(&mut self, store: &DataStore, ts: &dyn TreeSequence) {
        self.output = self.view.render(store, ts);
        self.renders += 1;
        self.dirty.set(false);
    }

    fn refresh(&mut self, store: &DataStore, ts: &dyn TreeSequence) -> bool {
        if !self.is_dirty() {
            return false;
        }
        self.render(store, ts);
        true
    }

    fn configure<R>(
        &mut self,
        store: &DataStore,
        ts: &dyn TreeSequence,
        f: impl FnOnce(&mut V, &dyn TreeSequence) -> R,
    ) -> R {
        let result = f(&mut self.view, ts);
        self.render(store, ts);
        result
    }
}

pub struct Dashboard<T: TreeSequence> {
    store: DataStore,
    ts: T,
    config: Config,
    individuals: Page<IndividualsTable>,
    map: Page<GeoMap>,
    gnn: Page<GnnBars>,
    haplotype: Page<GnnHaplotype>,
    oneway: Page<OnewayStats>,
    multiway: Page<MultiwayStats>,
    trees: Page<TreeView>,
    mutation_warning: Option<String>,
}

impl<T: TreeSequence> Dashboard<T> {
    /// Builds every page and renders it once.
    pub fn new(mut store: DataStore, ts: T, config: Config) -> Self {
        let individuals = Page::new(IndividualsTable::new(), &mut store, &ts);
        let map = Page::new(GeoMap::new(&config), &mut store, &ts);
        let gnn = Page::new(GnnBars::new(&config), &mut store, &ts);
        let haplotype = Page::new(GnnHaplotype::new(&config), &mut store, &ts);
        let oneway = Page::new(OnewayStats::new(&config), &mut store, &ts);
        let multiway = Page::new(MultiwayStats::new(&config), &mut store, &ts);
        let trees = Page::new(TreeView::new(&config), &mut store, &ts);
        Self {
            store,
            ts,
            config,
            individuals,
            map,
            gnn,
            haplotype,
            oneway,
            multiway,
            trees,
            mutation_warning: None,
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn tree_sequence(&self) -> &T {
        &self.ts
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Message of the last rejected mutation, cleared by the next
    /// successful one.
    pub fn mutation_warning(&self) -> Option<&str> {
        self.mutation_warning.as_deref()
    }

    pub fn individuals(&self) -> &Page<IndividualsTable> {
        &self.individuals
    }

    pub fn map(&self) -> &Page<GeoMap> {
        &self.map
    }

    pub fn gnn(&self) -> &Page<GnnBars> {
        &self.gnn
    }

    pub fn haplotype(&self) -> &Page<GnnHaplotype> {
        &self.haplotype
    }

    pub fn oneway(&self) -> &Page<OnewayStats> {
        &self.oneway
    }

    pub fn multiway(&self) -> &Page<MultiwayStats> {
        &self.multiway
    }

    pub fn trees(&self) -> &Page<TreeView> {
        &self.trees
    }

    /// Re-renders the pages flagged by the last mutation.
    fn refresh(&mut self) {
        let (store, ts) = (&self.store, &self.ts as &dyn TreeSequence);
        let refreshed = [
            self.individuals.refresh(store, ts),
            self.map.refresh(store, ts),
            self.gnn.refresh(store, ts),
            self.haplotype.refresh(store, ts),
            self.oneway.refresh(store, ts),
            self.multiway.refresh(store, ts),
            self.trees.refresh(store, ts),
        ];
        debug!(
            "re-rendered {} page(s)",
            refreshed.iter().filter(|r| **r).count()
        );
    }

    fn finish<R>(&mut self, result: Result<R>) -> Result<R> {
        match &result {
            Ok(_) => {
                self.mutation_warning = None;
                self.refresh();
            }
            Err(e) => {
                warn!("mutation rejected: {}", e);
                self.mutation_warning = Some(e.to_string());
            }
        }
        result
    }

    fn mutate<R>(&mut self, f: impl FnOnce(&mut DataStore) -> Result<R>) -> Result<R> {
        let result = f(&mut self.store);
        self.finish(result)
    }

    pub fn create_sample_set(&mut self, name: &str, color: &str) -> Result<SampleSetId> {
        self.mutate(|store| store.create_sample_set(name, color))
    }

    pub fn rename_sample_set(&mut self, id: SampleSetId, name: &str) -> Result<()> {
        self.mutate(|store| store.rename_sample_set(id, name))
    }

    pub fn recolor_sample_set(&mut self, id: SampleSetId, color: &str) -> Result<()> {
        self.mutate(|store| store.recolor_sample_set(id, color))
    }

    pub fn delete_sample_set(&mut self, id: SampleSetId) -> Result<()> {
        self.mutate(|store| store.delete_sample_set(id))
    }

    pub fn set_selected(&mut self, id: IndividualId, selected: bool) -> Result<()> {
        self.mutate(|store| store.set_selected(id, selected))
    }

    pub fn bulk_set_selected(&mut self, ids: &[IndividualId], selected: bool) -> Result<()> {
        self.mutate(|store| store.bulk_set_selected(ids, selected))
    }

    pub fn reassign(&mut self, id: IndividualId, sample_set_id: SampleSetId) -> Result<()> {
        self.mutate(|store| store.reassign(id, sample_set_id))
    }

    pub fn bulk_reassign(&mut self, ids: &[IndividualId], sample_set_id: SampleSetId) -> Result<()> {
        self.mutate(|store| store.bulk_reassign(ids, sample_set_id))
    }

    pub fn select_sample_sets(&mut self, sample_set_ids: &[SampleSetId]) -> Result<()> {
        self.mutate(|store| store.select_sample_sets(sample_set_ids))
    }

    /// Applies an edit made in the individuals table.
    pub fn edit_cell(&mut self, id: IndividualId, edit: CellEdit) -> Result<()> {
        let result = self.individuals.view.edit(&mut self.store, id, edit);
        self.finish(result)
    }

    pub fn configure_individuals<R>(
        &mut self,
        f: impl FnOnce(&mut IndividualsTable, &dyn TreeSequence) -> R,
    ) -> R {
        self.individuals.configure(&self.store, &self.ts, f)
    }

    pub fn configure_map<R>(&mut self, f: impl FnOnce(&mut GeoMap, &dyn TreeSequence) -> R) -> R {
        self.map.configure(&self.store, &self.ts, f)
    }

    pub fn configure_gnn<R>(&mut self, f: impl FnOnce(&mut GnnBars, &dyn TreeSequence) -> R) -> R {
        self.gnn.configure(&self.store, &self.ts, f)
    }

    pub fn configure_haplotype<R>(
        &mut self,
        f: impl FnOnce(&mut GnnHaplotype, &dyn TreeSequence) -> R,
    ) -> R {
        self.haplotype.configure(&self.store, &self.ts, f)
    }

    pub fn configure_oneway<R>(
        &mut self,
        f: impl FnOnce(&mut OnewayStats, &dyn TreeSequence) -> R,
    ) -> R {
        self.oneway.configure(&self.store, &self.ts, f)
    }

    pub fn configure_multiway<R>(
        &mut self,
        f: impl FnOnce(&mut MultiwayStats, &dyn TreeSequence) -> R,
    ) -> R {
        self.multiway.configure(&self.store, &self.ts, f)
    }

    /// Changes tree options or moves between trees, e.g.
    /// `dashboard.configure_trees(|view, ts| view.set_position(1200.0, ts))`.
    pub fn configure_trees<R>(&mut self, f: impl FnOnce(&mut TreeView, &dyn TreeSequence) -> R) -> R {
        self.trees.configure(&self.store, &self.ts, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::individuals::Individual;
    use crate::tree_sequence::fake::FakeTreeSequence;

    fn dashboard() -> Result<Dashboard<FakeTreeSequence>> {
        let mut store = DataStore::new();
        store.create_sample_set("A", "#d60000")?;
        store.create_sample_set("B", "#018700")?;
        store.create_sample_set("C", "#b500ff")?;
        store.add_individual(Individual::new(0, "a", [0, 1], 0).with_location(1.0, 2.0))?;
        store.add_individual(Individual::new(1, "b", [2, 3], 1))?;
        store.add_individual(Individual::new(2, "c", [4, 5], 1))?;
        let ts = FakeTreeSequence::new(vec![0.0, 10000.0, 25000.0]);
        Ok(Dashboard::new(store, ts, Config::default()))
    }

    #[test]
    fn test_pages_render_on_construction() -> Result<()> {
        let dashboard = dashboard()?;
        assert!(dashboard.individuals().output().is_plot());
        assert!(dashboard.map().output().is_plot());
        assert!(dashboard.gnn().output().is_plot());
        assert!(matches!(dashboard.haplotype().output(), Rendered::Prompt(_)));
        assert!(dashboard.oneway().output().is_plot());
        assert!(matches!(dashboard.multiway().output(), Rendered::Prompt(_)));
        assert!(dashboard.trees().output().is_plot());
        assert_eq!(dashboard.oneway().renders(), 1);
        assert!(dashboard.mutation_warning().is_none());
        Ok(())
    }

    #[test]
    fn test_mutation_rerenders_dependent_pages() -> Result<()> {
        let mut dashboard = dashboard()?;
        dashboard.reassign(1, 2)?;
        let oneway = dashboard.oneway();
        assert_eq!(oneway.renders(), 2);
        assert!(!oneway.is_dirty());
        let labels: Vec<&str> = oneway
            .output()
            .plot()
            .unwrap()
            .series
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert_eq!(dashboard.trees().renders(), 2);

        dashboard.set_selected(0, false)?;
        assert_eq!(dashboard.map().output().plot().unwrap().points.len(), 0);
        Ok(())
    }

    #[test]
    fn test_rejected_mutation_warns_and_changes_nothing() -> Result<()> {
        let mut dashboard = dashboard()?;
        assert!(matches!(
            dashboard.delete_sample_set(1),
            Err(Error::InUse { id: 1, count: 2 })
        ));
        assert!(dashboard.mutation_warning().is_some());
        assert_eq!(dashboard.oneway().renders(), 1);
        assert_eq!(dashboard.store().sample_sets().len(), 3);

        dashboard.delete_sample_set(2)?;
        assert!(dashboard.mutation_warning().is_none());
        assert_eq!(dashboard.oneway().renders(), 2);
        Ok(())
    }

    #[test]
    fn test_selection_below_threshold_degrades_views() -> Result<()> {
        let mut dashboard = dashboard()?;
        let queries = dashboard.tree_sequence().queries();
        dashboard.bulk_set_selected(&[0, 1, 2], false)?;
        assert!(matches!(
            dashboard.oneway().output(),
            Rendered::Warning(Error::InsufficientSelection { required: 1, selected: 0 })
        ));
        assert!(dashboard.gnn().output().is_warning());
        // only the tree drawing reached the backend
        assert_eq!(dashboard.tree_sequence().queries(), queries + 1);
        Ok(())
    }

    #[test]
    fn test_configure_rerenders_one_page() -> Result<()> {
        let mut dashboard = dashboard()?;
        let index = dashboard.configure_trees(|view, ts| view.set_position(12000.0, ts))?;
        assert_eq!(index, 1);
        assert_eq!(dashboard.trees().view().tree_index(), 1);
        assert_eq!(dashboard.trees().renders(), 2);
        assert_eq!(dashboard.oneway().renders(), 1);

        dashboard.configure_multiway(|view, _| view.comparisons = vec![(1, 0)]);
        assert!(dashboard.multiway().output().is_plot());

        dashboard.configure_haplotype(|view, _| view.individual_id = Some(2));
        assert!(dashboard.haplotype().output().is_plot());
        Ok(())
    }

    #[test]
    fn test_cell_edits_propagate() -> Result<()> {
        let mut dashboard = dashboard()?;
        dashboard.edit_cell(0, CellEdit::SampleSet(2))?;
        let page = dashboard.individuals().output().plot().unwrap();
        assert_eq!(page.rows[0].sample_set_name, "C");
        assert!(dashboard.edit_cell(9, CellEdit::Selected(false)).is_err());
        assert!(dashboard.mutation_warning().is_some());
        Ok(())
    }
}
