/// DataTable - Interactive Tabular View Engine
///
/// Client-side data table logic: column and global fuzzy filtering, ranked
/// multi-column sorting, row selection, column visibility, pagination,
/// debounced filter inputs, CSV export and row mutation messages. Rendering
/// is left to the host; this crate owns the state and the derived row lists.

pub mod actions;
pub mod column;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod export;
pub mod filter;
pub mod pagination;
pub mod rank;
pub mod selection;
pub mod sort;
pub mod table;

pub use actions::{dispatch, DeleteConfirmation, EditSession, RowContext, RowMutation, RowMutationHandler, RowPatch};
pub use column::{Accessor, CellValue, ColumnSpec, FilterVariant};
pub use config::{ExportOptions, TableOptions};
pub use controller::{FilterTarget, TableController};
pub use debounce::DebouncedInput;
pub use error::{ExportError, FieldErrors, FilterError, MutationError, TableError};
pub use export::{export_csv, ExportBlob};
pub use filter::{ColumnFilter, ColumnFilters, FilterMeta, FilterState, FilterValue, NumberRange};
pub use pagination::{page_count, paginate, Page, PageState};
pub use rank::{rank_item, ItemRank, RankOptions, Ranking};
pub use selection::{CheckState, ColumnVisibility, RowSelection};
pub use sort::{compare_alphanumeric, SortKey, SortOrder, SortState};
pub use table::{rows_from_json, Row, RowId, Table};
