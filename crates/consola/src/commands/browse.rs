//! Interactive page container.
//!
//! Drives a `DataTable` from terminal prompts: paging, the buffered
//! filter panel, header-style sort toggling, row selection and bulk
//! delete. While a new page loads the previous one stays on screen,
//! marked as placeholder data, and adjacent pages are prefetched after
//! every settled fetch.

use std::io::IsTerminal;

use dialoguer::{Input, MultiSelect, Select};
use serde_json::Value;
use tokio::task::JoinHandle;

use consola_api::PaginatedResult;
use consola_core::model::EntityId;
use consola_core::query::{QueryKey, QuerySnapshot};
use consola_core::table::{ColumnDef, ColumnFilter, ColumnSort, DataTable, FilterPanel, TableObserver};
use consola_core::{EntityQueries, QueryObserver, Resource};

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output;

use super::entity::{configure_table, to_rows};
use super::{App, util};

const SELECTED: ColumnDef = ColumnDef::new("__selecionado", "✓").unsortable();

// ── Table observer ──────────────────────────────────────────────────

/// Records which transitions happened since the last fetch.
#[derive(Debug, Default)]
struct Changes {
    filters: bool,
    pagination: bool,
    sorting: bool,
}

impl Changes {
    fn take(&mut self) -> bool {
        let any = self.filters || self.pagination || self.sorting;
        *self = Self::default();
        any
    }
}

impl TableObserver for Changes {
    fn on_filters_change(&mut self, _filters: &[ColumnFilter]) {
        self.filters = true;
    }

    fn on_pagination_change(&mut self, _page: u32, _page_size: u32) {
        self.pagination = true;
    }

    fn on_sorting_change(&mut self, _sorting: &[ColumnSort]) {
        self.sorting = true;
    }
}

// ── Actions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    GoTo,
    Filters,
    Sort,
    SelectRows,
    SelectPage,
    ClearSelection,
    DeleteSelected,
    PageSize,
    Refresh,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Self::Next => "Página seguinte",
            Self::Previous => "Página anterior",
            Self::GoTo => "Ir para página…",
            Self::Filters => "Filtros…",
            Self::Sort => "Ordenar por…",
            Self::SelectRows => "Selecionar linhas…",
            Self::SelectPage => "Selecionar / desselecionar página",
            Self::ClearSelection => "Limpar seleção",
            Self::DeleteSelected => "Apagar selecionados",
            Self::PageSize => "Linhas por página…",
            Self::Refresh => "Atualizar",
            Self::Quit => "Sair",
        }
    }

    /// Actions that make sense for the current page and selection.
    fn available<T>(page: Option<&PaginatedResult<T>>, selected: usize) -> Vec<Self> {
        let mut actions = Vec::with_capacity(12);
        if page.is_some_and(|p| p.has_next_page) {
            actions.push(Self::Next);
        }
        if page.is_some_and(|p| p.has_previous_page) {
            actions.push(Self::Previous);
        }
        if page.is_some_and(|p| p.total_pages > 1) {
            actions.push(Self::GoTo);
        }
        actions.extend([Self::Filters, Self::Sort]);
        if page.is_some_and(|p| !p.data.is_empty()) {
            actions.extend([Self::SelectRows, Self::SelectPage]);
        }
        if selected > 0 {
            actions.extend([Self::ClearSelection, Self::DeleteSelected]);
        }
        actions.extend([Self::PageSize, Self::Refresh, Self::Quit]);
        actions
    }
}

// ── Loop ────────────────────────────────────────────────────────────

pub async fn run<E: Resource>(
    app: &App<'_>,
    queries: &EntityQueries<E>,
    args: &ListArgs,
) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Err(CliError::NotATerminal {
            command: "browse".into(),
        });
    }

    let mut table = DataTable::new(E::KIND, app.page_size, Changes::default());
    configure_table(&mut table, args, app.page_size)?;
    table.observer_mut().take();

    let mut observer: QueryObserver<PaginatedResult<E>> = QueryObserver::new();
    let mut panel = FilterPanel::new();
    let mut warming: Vec<JoinHandle<()>> = Vec::new();

    loop {
        let request = table.request();
        let key = QueryKey::paginated(E::KIND, &request);
        observer.observe(key.clone());

        let before = observer.snapshot();
        if before.is_placeholder_data {
            if let Some(ref previous) = before.data {
                render::<E>(app, &table, previous, " · a carregar…")?;
            }
        }

        let result = queries.paginated(&request).await;
        observer.settle(&key, result);
        let snapshot = observer.snapshot();

        if let Some(ref err) = snapshot.error {
            eprintln!("✗ {}", err.user_message());
        }

        // A failed fetch leaves the previous page as placeholder. It was
        // already shown, and its page count belongs to another request.
        if let Some(page) = settled_page(&snapshot) {
            if table.reconcile(&**page) {
                table.observer_mut().take();
                continue;
            }
            render::<E>(app, &table, page, "")?;

            warming.retain(|h| !h.is_finished());
            warming.extend(queries.prefetch_adjacent(&request, Some(page.total_pages)));
        }

        let page = snapshot.data.as_deref();
        let actions = Action::available(page, table.state().selection.len());
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let choice = Select::new()
            .with_prompt(E::KIND.plural())
            .items(&labels)
            .default(0)
            .interact_opt()?;
        let Some(action) = choice.and_then(|i| actions.get(i).copied()) else {
            break;
        };

        let current = table.state().page;
        match action {
            Action::Next => table.set_page(current + 1)?,
            Action::Previous => table.set_page(current.saturating_sub(1).max(1))?,
            Action::GoTo => {
                let target: u32 = Input::new()
                    .with_prompt("Página")
                    .default(current)
                    .interact_text()?;
                if target == 0 {
                    eprintln!("A página tem de ser pelo menos 1");
                } else {
                    table.set_page(target)?;
                }
            }
            Action::Filters => edit_filters(&mut table, &mut panel)?,
            Action::Sort => choose_sort(&mut table)?,
            Action::SelectRows => {
                if let Some(page) = page {
                    select_rows(&mut table, page)?;
                }
            }
            Action::SelectPage => {
                if let Some(page) = page {
                    let ids: Vec<EntityId> = page.data.iter().map(|r| r.id().clone()).collect();
                    let all = ids.iter().all(|id| table.is_selected(id));
                    table.toggle_all_on_page(&ids, !all);
                }
            }
            Action::ClearSelection => table.clear_selection(),
            Action::DeleteSelected => {
                let ids = table.selection();
                if util::confirm(
                    &format!("Apagar {} {}?", ids.len(), E::KIND.plural()),
                    "delete-many",
                    app.global.yes,
                )? {
                    match queries.delete_multiple(&ids).await {
                        Ok(()) => {
                            table.clear_selection();
                            eprintln!("✓ {} registos apagados", ids.len());
                        }
                        Err(e) => eprintln!("✗ {}", e.user_message()),
                    }
                }
            }
            Action::PageSize => {
                let size: u32 = Input::new()
                    .with_prompt("Linhas por página")
                    .default(table.state().page_size)
                    .interact_text()?;
                if let Err(e) = table.set_pagination(1, size) {
                    eprintln!("✗ {e}");
                }
            }
            Action::Refresh => {
                queries.invalidate(&consola_core::InvalidationSet::for_write(E::KIND));
            }
            Action::Quit => break,
        }
        if table.observer_mut().take() {
            tracing::debug!(entity = %E::KIND, page = table.state().page, "table state changed");
        }
    }

    for handle in warming {
        handle.abort();
    }
    Ok(())
}

// ── Rendering ───────────────────────────────────────────────────────

fn render<E: Resource>(
    app: &App<'_>,
    table: &DataTable<Changes>,
    page: &PaginatedResult<E>,
    note: &str,
) -> Result<(), CliError> {
    let mut rows = to_rows(&page.data)?;
    for (row, record) in rows.iter_mut().zip(&page.data) {
        if let Value::Object(map) = row {
            let mark = if table.is_selected(record.id()) { "●" } else { "" };
            map.insert(SELECTED.id.into(), Value::String(mark.into()));
        }
    }

    let mut columns = Vec::with_capacity(table.columns().len() + 1);
    columns.push(SELECTED);
    columns.extend(table.columns().iter().copied());

    let out = output::render_records(crate::cli::OutputFormat::Table, &columns, &rows);
    output::print_output(&out, false);

    let mut status = output::page_footer(page, table.state().selection.len());
    let filters = &table.state().filters;
    if !filters.is_empty() {
        let desc: Vec<String> = filters.iter().map(|f| format!("{}={}", f.id, f.value)).collect();
        status.push_str(&format!(" · filtros: {}", desc.join(", ")));
    }
    if let Some(sort) = table.state().sorting.first() {
        let arrow = if sort.desc { "▼" } else { "▲" };
        status.push_str(&format!(" · ordenado por {} {arrow}", sort.id));
    }
    status.push_str(note);
    if !app.global.quiet {
        eprintln!("{status}");
    }
    Ok(())
}

// ── Prompts ─────────────────────────────────────────────────────────

fn edit_filters(table: &mut DataTable<Changes>, panel: &mut FilterPanel) -> Result<(), CliError> {
    panel.open(table);
    let fields: Vec<(&'static str, &'static str)> =
        table.registry().iter().map(|f| (f.id, f.label)).collect();

    while panel.is_open() {
        let mut items: Vec<String> = fields
            .iter()
            .map(|(id, label)| match panel.draft_value(id) {
                Some(v) => format!("{label}: {v}"),
                None => format!("{label}: —"),
            })
            .collect();
        items.extend(["Aplicar".into(), "Limpar".into(), "Cancelar".into()]);

        let choice = Select::new()
            .with_prompt("Filtros")
            .items(&items)
            .default(fields.len())
            .interact_opt()?;
        let Some(choice) = choice else {
            panel.cancel();
            break;
        };

        match choice.checked_sub(fields.len()) {
            None => {
                let Some((id, label)) = fields.get(choice).copied() else {
                    continue;
                };
                let value: String = Input::new()
                    .with_prompt(label)
                    .with_initial_text(panel.draft_value(id).unwrap_or_default())
                    .allow_empty(true)
                    .interact_text()?;
                panel.set(id, &value);
            }
            Some(0) => {
                if let Err(e) = panel.apply(table) {
                    eprintln!("✗ {e}");
                }
            }
            Some(1) => panel.clear(table),
            Some(_) => panel.cancel(),
        }
    }
    Ok(())
}

fn choose_sort(table: &mut DataTable<Changes>) -> Result<(), CliError> {
    let sortable: Vec<ColumnDef> = table
        .columns()
        .iter()
        .copied()
        .filter(ColumnDef::is_sortable)
        .collect();
    let items: Vec<&str> = sortable.iter().map(|c| c.header).collect();
    let choice = Select::new()
        .with_prompt("Ordenar por (repetir alterna asc → desc → nenhum)")
        .items(&items)
        .default(0)
        .interact_opt()?;
    if let Some(column) = choice.and_then(|i| sortable.get(i)) {
        table.toggle_sort(column.id)?;
    }
    Ok(())
}

fn select_rows<E: Resource>(
    table: &mut DataTable<Changes>,
    page: &PaginatedResult<E>,
) -> Result<(), CliError> {
    let labels: Vec<String> = page
        .data
        .iter()
        .map(|r| format!("{} ({})", r.name(), r.id()))
        .collect();
    let defaults: Vec<bool> = page.data.iter().map(|r| table.is_selected(r.id())).collect();
    let Some(chosen) = MultiSelect::new()
        .with_prompt("Espaço marca, Enter confirma")
        .items(&labels)
        .defaults(&defaults)
        .interact_opt()?
    else {
        return Ok(());
    };

    for (i, record) in page.data.iter().enumerate() {
        if chosen.contains(&i) != table.is_selected(record.id()) {
            table.toggle_row_selection(record.id());
        }
    }
    Ok(())
}

/// Data fetched for the observed key itself, not carried over from a
/// previous one.
fn settled_page<T>(snapshot: &QuerySnapshot<T>) -> Option<&std::sync::Arc<T>> {
    if snapshot.is_placeholder_data {
        None
    } else {
        snapshot.data.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(current: u32, total: u32, rows: usize) -> PaginatedResult<Value> {
        PaginatedResult {
            data: vec![Value::Null; rows],
            current_page: current,
            total_pages: total,
            total_count: u64::from(total) * 10,
            page_size: 10,
            has_previous_page: current > 1,
            has_next_page: current < total,
        }
    }

    #[test]
    fn first_page_offers_next_but_not_previous() {
        let actions = Action::available(Some(&page(1, 3, 10)), 0);
        assert!(actions.contains(&Action::Next));
        assert!(!actions.contains(&Action::Previous));
        assert!(!actions.contains(&Action::DeleteSelected));
    }

    #[test]
    fn selection_enables_bulk_delete() {
        let actions = Action::available(Some(&page(2, 3, 10)), 3);
        assert!(actions.contains(&Action::DeleteSelected));
        assert!(actions.contains(&Action::ClearSelection));
    }

    #[test]
    fn loading_without_data_still_allows_quitting() {
        let actions = Action::available::<Value>(None, 0);
        assert_eq!(actions.last(), Some(&Action::Quit));
        assert!(!actions.contains(&Action::SelectRows));
    }

    #[test]
    fn placeholder_left_by_failed_fetch_is_not_settled() {
        let previous = std::sync::Arc::new(page(1, 3, 10));
        let failed = QuerySnapshot {
            data: Some(previous.clone()),
            is_placeholder_data: true,
            is_fetching: false,
            error: Some(std::sync::Arc::new(consola_core::DomainError::Validation {
                entity: consola_core::EntityKind::Area,
                message: "offline".into(),
            })),
        };
        assert!(settled_page(&failed).is_none());

        let fresh = QuerySnapshot {
            data: Some(previous),
            is_placeholder_data: false,
            is_fetching: false,
            error: None,
        };
        assert_eq!(settled_page(&fresh).map(|p| p.total_pages), Some(3));
    }

    #[test]
    fn observer_reports_changes_once() {
        let mut table = DataTable::new(
            consola_core::EntityKind::Cliente,
            10,
            Changes::default(),
        );
        assert!(table.set_filter("nome", "Acme").is_ok());
        assert!(table.observer_mut().take());
        assert!(!table.observer_mut().take());
    }
}
