// ── Generic data table ──
//
// Column definitions, the per-entity filter registry, the buffered filter
// panel and the table state machine that produces paginated requests.

pub mod catalog;
pub mod column;
pub mod filter;
pub mod state;

pub use column::{Align, ColumnDef};
pub use filter::{FilterField, FilterFieldRegistry, FilterPanel, UrlSeed};
pub use state::{ColumnFilter, ColumnSort, DataTable, TableError, TableObserver, TableState};
