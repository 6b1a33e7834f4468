/// DataTable Controller
///
/// Owns the row set and every piece of view state (filters, sorting, column
/// visibility, row selection, pagination, debounced filter inputs) and keeps
/// the derived row lists in sync. Each state change re-runs the pipeline
///
///   rows -> filter -> sort -> paginate
///
/// from scratch and bumps `generation()`, which hosts can compare to decide
/// whether to re-render.

use crate::actions::RowContext;
use crate::column::{format_number, ColumnSpec};
use crate::config::TableOptions;
use crate::debounce::DebouncedInput;
use crate::error::{ExportError, TableError};
use crate::export::{export_csv, ExportBlob};
use crate::filter::{self, FilterMeta, FilterState, FilterValue, NumberRange};
use crate::pagination::{paginate, PageState};
use crate::selection::{CheckState, ColumnVisibility, RowSelection};
use crate::sort::{self, SortKey, SortOrder, SortState};
use crate::table::{rows_from_json, Row, RowId, Table};
use std::collections::BTreeMap;
use std::time::Instant;

/// Which filter a debounced text input feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterTarget {
    /// The global search box
    Global,
    /// Text, select or fuzzy filter of one column
    Column(String),
    /// Lower bound of a range column
    RangeMin(String),
    /// Upper bound of a range column
    RangeMax(String),
}

impl FilterTarget {
    fn column(&self) -> Option<&str> {
        match self {
            FilterTarget::Global => None,
            FilterTarget::Column(id) | FilterTarget::RangeMin(id) | FilterTarget::RangeMax(id) => Some(id.as_str()),
        }
    }
}

/// Table state plus the rows derived from it.
///
/// # Examples
///
/// ```
/// use datatable::{ColumnSpec, Row, TableController, TableOptions};
///
/// let columns = vec![ColumnSpec::accessor("name"), ColumnSpec::accessor("email")];
/// let rows = vec![
///     Row::new(1).with("name", "Alice").with("email", "alice@x.com"),
///     Row::new(2).with("name", "Bob").with("email", "bob@x.com"),
/// ];
///
/// let mut table = TableController::new(columns, rows, TableOptions::default()).unwrap();
/// table.set_global_filter("ali");
///
/// let names: Vec<String> = table.page_rows().iter().map(|r| r.get("name").unwrap().to_text()).collect();
/// assert_eq!(names, vec!["Alice"]);
/// ```
#[derive(Debug)]
pub struct TableController {
    table: Table,
    options: TableOptions,
    filters: FilterState,
    sorting: SortState,
    visibility: ColumnVisibility,
    selection: RowSelection,
    page: PageState,
    inputs: BTreeMap<FilterTarget, DebouncedInput>,

    // Derived by recompute()
    filtered: Vec<usize>,
    ordered: Vec<usize>,
    page_rows: Vec<usize>,
    page_count: usize,
    meta: FilterMeta,
    generation: u64,
}

impl TableController {
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<Row>, options: TableOptions) -> Result<Self, TableError> {
        let table = Table::new(columns, rows)?;
        let page = PageState::new(0, options.page_size);

        let mut controller = TableController {
            table,
            options,
            filters: FilterState::default(),
            sorting: SortState::default(),
            visibility: ColumnVisibility::default(),
            selection: RowSelection::default(),
            page,
            inputs: BTreeMap::new(),
            filtered: Vec::new(),
            ordered: Vec::new(),
            page_rows: Vec::new(),
            page_count: 1,
            meta: FilterMeta::default(),
            generation: 0,
        };
        controller.recompute();
        Ok(controller)
    }

    /// Build a controller from a JSON array of row objects.
    pub fn from_json(columns: Vec<ColumnSpec>, json: &str, id_key: &str, options: TableOptions) -> Result<Self, TableError> {
        let rows = rows_from_json(json, id_key)?;
        Self::new(columns, rows, options)
    }

    /// Re-derive filtered, sorted and paged rows from the current state.
    fn recompute(&mut self) {
        let rows = self.table.rows();
        let columns = self.table.columns();

        let output = filter::apply(rows, columns, &self.filters, &self.visibility, &self.options.rank_options());
        self.ordered = sort::sort(rows, &output.visible, &self.sorting, columns, &output.meta);
        self.filtered = output.visible;
        self.meta = output.meta;

        let page = paginate(&self.ordered, &mut self.page);
        self.page_rows = page.rows;
        self.page_count = page.page_count;

        let table = &self.table;
        self.selection.retain(|id| table.contains(id));

        self.generation += 1;
        log::trace!(
            "recompute #{}: {} rows, {} filtered, page {}/{}",
            self.generation,
            self.table.len(),
            self.filtered.len(),
            self.page.index() + 1,
            self.page_count
        );
    }

    fn reset_page_if_configured(&mut self) {
        if self.options.auto_reset_page_index {
            self.page.set_index(0);
        }
    }

    fn require_column(&self, id: &str) -> Result<&ColumnSpec, TableError> {
        self.table
            .column(id)
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    fn rows_at<'a>(&'a self, positions: &[usize]) -> Vec<&'a Row> {
        let rows = self.table.rows();
        positions.iter().map(|&pos| &rows[pos]).collect()
    }

    // ---- Read surface ----

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rows on the current page, in view order.
    pub fn page_rows(&self) -> Vec<&Row> {
        self.rows_at(&self.page_rows)
    }

    /// All rows passing the filters, in view order.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.rows_at(&self.ordered)
    }

    pub fn row_count(&self) -> usize {
        self.table.len()
    }

    pub fn filtered_row_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Selected rows, including those hidden by filters.
    ///
    /// Rows in the current view come first, in view order. Selected rows the
    /// filters hide carry no match rank, so they follow sorted by value alone.
    pub fn selected_rows(&self) -> Vec<&Row> {
        let rows = self.table.rows();
        let mut in_view = vec![false; rows.len()];
        for &pos in &self.ordered {
            in_view[pos] = true;
        }

        let mut positions: Vec<usize> = self
            .ordered
            .iter()
            .copied()
            .filter(|&pos| self.selection.is_selected(rows[pos].id()))
            .collect();
        let hidden: Vec<usize> = (0..rows.len())
            .filter(|&pos| !in_view[pos] && self.selection.is_selected(rows[pos].id()))
            .collect();
        positions.extend(sort::sort(rows, &hidden, &self.sorting, self.table.columns(), &FilterMeta::new()));
        self.rows_at(&positions)
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.table.row(id)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        self.table.columns()
    }

    pub fn visible_columns(&self) -> Vec<&ColumnSpec> {
        self.table
            .columns()
            .iter()
            .filter(|c| self.visibility.is_visible(c.id()))
            .collect()
    }

    /// Columns offered in the column-visibility menu.
    pub fn hideable_columns(&self) -> Vec<&ColumnSpec> {
        self.table.columns().iter().filter(|c| c.can_hide()).collect()
    }

    pub fn sort_direction(&self, column: &str) -> Option<SortOrder> {
        self.sorting.direction(column)
    }

    pub fn sort_position(&self, column: &str) -> Option<usize> {
        self.sorting.position(column)
    }

    pub fn sorting(&self) -> &SortState {
        &self.sorting
    }

    pub fn column_filter(&self, column: &str) -> Option<&FilterValue> {
        self.filters.columns.get(column)
    }

    pub fn global_filter(&self) -> &str {
        &self.filters.global
    }

    pub fn filter_meta(&self) -> &FilterMeta {
        &self.meta
    }

    /// State of the "select all on this page" checkbox. Rows selected on
    /// other pages do not affect it.
    pub fn header_check_state(&self) -> CheckState {
        let rows = self.table.rows();
        CheckState::from_rows(self.page_rows.iter().map(|&pos| rows[pos].id()), &self.selection)
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn is_column_visible(&self, column: &str) -> bool {
        self.visibility.is_visible(column)
    }

    pub fn page_index(&self) -> usize {
        self.page.index()
    }

    pub fn page_size(&self) -> usize {
        self.page.size()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.options.page_size_options
    }

    pub fn can_previous_page(&self) -> bool {
        self.page.index() > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page.index() + 1 < self.page_count
    }

    /// Context for a row action, if the row is in the current view.
    pub fn row_context(&self, id: &RowId) -> Option<RowContext<'_>> {
        let pos = self.table.position(id)?;
        let position = self.ordered.iter().position(|&p| p == pos)?;
        Some(RowContext {
            row: &self.table.rows()[pos],
            position,
            selected: self.selection.is_selected(id),
        })
    }

    // ---- Filters ----

    fn apply_column_filter(&mut self, column: &str, value: FilterValue) {
        self.filters.columns.set(column, value);
        self.reset_page_if_configured();
        self.recompute();
    }

    fn apply_global_filter(&mut self, query: String) {
        self.filters.global = query;
        self.reset_page_if_configured();
        self.recompute();
    }

    /// Keep any open inputs showing a filter that changed from outside.
    fn sync_inputs(&mut self, column: Option<&str>) {
        let targets: Vec<FilterTarget> = self
            .inputs
            .keys()
            .filter(|target| target.column() == column)
            .cloned()
            .collect();
        for target in targets {
            let value = self.current_value(&target);
            if let Some(input) = self.inputs.get_mut(&target) {
                input.sync(value);
            }
        }
    }

    pub fn set_column_filter(&mut self, column: &str, value: FilterValue) -> Result<(), TableError> {
        self.require_column(column)?;
        self.filters.columns.set(column, value);
        self.sync_inputs(Some(column));
        self.reset_page_if_configured();
        self.recompute();
        Ok(())
    }

    pub fn clear_column_filter(&mut self, column: &str) {
        self.filters.columns.remove(column);
        self.sync_inputs(Some(column));
        self.reset_page_if_configured();
        self.recompute();
    }

    /// Remove every column filter; the global filter is kept.
    pub fn reset_column_filters(&mut self) {
        self.filters.columns.clear();
        let columns: Vec<String> = self
            .inputs
            .keys()
            .filter_map(|t| t.column().map(str::to_string))
            .collect();
        for column in columns {
            self.sync_inputs(Some(&column));
        }
        self.reset_page_if_configured();
        self.recompute();
    }

    pub fn set_global_filter(&mut self, query: impl Into<String>) {
        self.filters.global = query.into();
        self.sync_inputs(None);
        self.reset_page_if_configured();
        self.recompute();
    }

    // ---- Debounced inputs ----

    fn current_value(&self, target: &FilterTarget) -> String {
        let range = |id: &str| {
            self.filters
                .columns
                .get(id)
                .and_then(FilterValue::as_range)
                .copied()
                .unwrap_or_default()
        };
        match target {
            FilterTarget::Global => self.filters.global.clone(),
            FilterTarget::Column(id) => self
                .filters
                .columns
                .get(id)
                .and_then(FilterValue::as_text)
                .unwrap_or_default()
                .to_string(),
            FilterTarget::RangeMin(id) => range(id.as_str()).min.map(format_number).unwrap_or_default(),
            FilterTarget::RangeMax(id) => range(id.as_str()).max.map(format_number).unwrap_or_default(),
        }
    }

    /// Record a keystroke. Only the draft changes; the filter is applied by
    /// `poll_inputs` once the input has been quiet for the debounce delay.
    pub fn input_filter(&mut self, target: FilterTarget, text: impl Into<String>, now: Instant) -> Result<(), TableError> {
        if let Some(column) = target.column() {
            self.require_column(column)?;
        }
        let initial = self.current_value(&target);
        let delay = self.options.debounce();
        self.inputs
            .entry(target)
            .or_insert_with(|| DebouncedInput::new(initial, delay))
            .input(text, now);
        Ok(())
    }

    /// Apply every input whose quiet period has elapsed. Returns whether any
    /// filter changed.
    pub fn poll_inputs(&mut self, now: Instant) -> bool {
        let fired: Vec<(FilterTarget, String)> = self
            .inputs
            .iter_mut()
            .filter_map(|(target, input)| input.poll(now).map(|text| (target.clone(), text)))
            .collect();

        for (target, text) in &fired {
            log::debug!("debounced input {:?} fired with {:?}", target, text);
            match target {
                FilterTarget::Global => self.apply_global_filter(text.clone()),
                FilterTarget::Column(id) => self.apply_column_filter(id, FilterValue::text(text.as_str())),
                FilterTarget::RangeMin(id) | FilterTarget::RangeMax(id) => {
                    let bound = NumberRange::parse_bound(text).unwrap_or_else(|err| {
                        log::debug!("treating range bound as open: {}", err);
                        None
                    });
                    let mut range = self
                        .filters
                        .columns
                        .get(id)
                        .and_then(FilterValue::as_range)
                        .copied()
                        .unwrap_or_default();
                    if matches!(target, FilterTarget::RangeMin(_)) {
                        range.min = bound;
                    } else {
                        range.max = bound;
                    }
                    self.apply_column_filter(id, FilterValue::Range(range));
                }
            }
        }

        !fired.is_empty()
    }

    /// Earliest moment a pending input will be ready to apply.
    pub fn next_input_deadline(&self) -> Option<Instant> {
        self.inputs.values().filter_map(DebouncedInput::deadline).min()
    }

    /// Text to show in an input box: the draft if one is open, otherwise the
    /// applied filter value.
    pub fn filter_draft(&self, target: &FilterTarget) -> String {
        match self.inputs.get(target) {
            Some(input) => input.draft().to_string(),
            None => self.current_value(target),
        }
    }

    // ---- Sorting ----

    /// Cycle a column through ascending, descending and unsorted. With
    /// `multi` (and multi-sort enabled) other sort keys are kept.
    pub fn toggle_sort(&mut self, column: &str, multi: bool) -> Result<(), TableError> {
        if !self.require_column(column)?.can_sort() {
            log::debug!("column '{}' is not sortable", column);
            return Ok(());
        }
        let multi = multi && self.options.enable_multi_sort;
        self.sorting.toggle(column, multi, self.options.max_multi_sort);
        self.reset_page_if_configured();
        self.recompute();
        Ok(())
    }

    pub fn set_sorting(&mut self, keys: Vec<SortKey>) {
        self.sorting.set(keys);
        self.reset_page_if_configured();
        self.recompute();
    }

    pub fn clear_sorting(&mut self) {
        self.sorting.clear();
        self.reset_page_if_configured();
        self.recompute();
    }

    // ---- Column visibility ----

    pub fn set_column_visible(&mut self, column: &str, visible: bool) -> Result<(), TableError> {
        let col = self.require_column(column)?;
        if !visible && !col.can_hide() {
            log::debug!("column '{}' cannot be hidden", column);
            return Ok(());
        }
        self.visibility.set(column, visible);
        self.recompute();
        Ok(())
    }

    /// Flip a column's visibility; returns the new state.
    pub fn toggle_column_visible(&mut self, column: &str) -> Result<bool, TableError> {
        let visible = !self.visibility.is_visible(column);
        self.set_column_visible(column, visible)?;
        Ok(self.visibility.is_visible(column))
    }

    /// Show or hide every hideable column.
    pub fn set_all_columns_visible(&mut self, visible: bool) {
        if visible {
            self.visibility.reset();
        } else {
            for column in self.table.columns() {
                if column.can_hide() {
                    self.visibility.set(column.id(), false);
                }
            }
        }
        self.recompute();
    }

    // ---- Selection ----

    /// Flip one row's selection; returns the new state. Unknown ids are
    /// ignored.
    pub fn toggle_row(&mut self, id: &RowId) -> bool {
        if !self.table.contains(id) {
            log::debug!("ignoring selection of unknown row '{}'", id);
            return false;
        }
        let selected = self.selection.toggle(id);
        self.recompute();
        selected
    }

    pub fn set_row_selected(&mut self, id: &RowId, selected: bool) {
        if !self.table.contains(id) {
            log::debug!("ignoring selection of unknown row '{}'", id);
            return;
        }
        self.selection.set(id, selected);
        self.recompute();
    }

    /// Header checkbox: select the whole page, or clear it when it is
    /// already fully selected.
    pub fn toggle_all_on_page(&mut self) {
        let select = self.header_check_state() != CheckState::Checked;
        let rows = self.table.rows();
        for &pos in &self.page_rows {
            self.selection.set(rows[pos].id(), select);
        }
        self.recompute();
    }

    /// Select or deselect every row passing the current filters. Selections
    /// hidden by filters are left alone.
    pub fn set_all_selected(&mut self, selected: bool) {
        let rows = self.table.rows();
        for &pos in &self.filtered {
            self.selection.set(rows[pos].id(), selected);
        }
        self.recompute();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.recompute();
    }

    // ---- Pagination ----

    pub fn set_page_index(&mut self, index: usize) {
        self.page.set_index(index);
        self.recompute();
    }

    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.set_page_index(self.page.index() + 1);
        }
    }

    pub fn previous_page(&mut self) {
        if self.can_previous_page() {
            self.set_page_index(self.page.index() - 1);
        }
    }

    pub fn first_page(&mut self) {
        self.set_page_index(0);
    }

    pub fn last_page(&mut self) {
        self.set_page_index(self.page_count.saturating_sub(1));
    }

    /// Change the page size, keeping the current first row on screen.
    /// Returns false for a size of zero.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if !self.page.set_size(size) {
            return false;
        }
        self.recompute();
        true
    }

    // ---- Data ----

    /// Replace the rows after the host changed its data. Selections of rows
    /// that no longer exist are dropped.
    pub fn set_rows(&mut self, rows: Vec<Row>) -> Result<(), TableError> {
        self.table = self.table.with_rows(rows)?;
        self.recompute();
        Ok(())
    }

    // ---- Export ----

    /// Export the selected rows, or every filtered row when nothing is
    /// selected, in the current sort order.
    pub fn export(&self) -> Result<ExportBlob, ExportError> {
        let options = &self.options.export;
        let columns: Vec<&ColumnSpec> = if options.visible_columns_only {
            self.visible_columns()
        } else {
            self.table.columns().iter().collect()
        };

        let rows = if self.selection.is_empty() {
            self.filtered_rows()
        } else {
            self.selected_rows()
        };

        export_csv(&columns, &rows, options)
    }
}
