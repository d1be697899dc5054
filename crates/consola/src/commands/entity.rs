//! Entity command handlers, generic over every managed resource.
//!
//! `list` is the non-interactive page container: it seeds and filters a
//! `DataTable`, fetches the page through the query layer, clamps an
//! out-of-range page and renders the result.

use serde::Serialize;
use serde_json::Value;

use consola_core::model::EntityId;
use consola_core::table::{DataTable, TableObserver, catalog};
use consola_core::{EntityQueries, Resource, Submission};

use crate::cli::{EntityCommand, ListArgs};
use crate::error::{CliError, command_name};
use crate::output;

use super::{App, browse, util};

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<E: Resource>(app: &App<'_>, cmd: EntityCommand) -> Result<(), CliError> {
    app.require(E::KIND)?;
    let queries = app.registry.queries::<E>();
    let global = app.global;
    let columns = catalog::columns(E::KIND);

    match cmd {
        EntityCommand::List(args) => list(app, &queries, &args).await,

        EntityCommand::Browse(args) => browse::run(app, &queries, &args).await,

        EntityCommand::Get { id } => {
            let id = EntityId::from(id);
            let record = queries
                .by_id(&id)
                .await
                .map_err(|e| not_found_as(e, E::KIND, &id))?;
            let row = serde_json::to_value(&*record)?;
            let out = output::render_record(global.output, &columns, &row);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Related { parent_id } => {
            let parent = EntityId::from(parent_id);
            let records = queries.related(&parent).await?;
            let rows = to_rows(records.as_slice())?;
            let out = output::render_records(global.output, &columns, &rows);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Create(body) => {
            let dto: E::Create = util::read_body(&body)?;
            let id = saved::<E, _>(queries.create(&dto).await?)?;
            if !global.quiet {
                eprintln!("{}: registo criado ({id})", E::KIND.label());
            }
            output::print_output(&id.to_string(), global.quiet || !is_plain(app));
            Ok(())
        }

        EntityCommand::Update { id, body } => {
            let id = EntityId::from(id);
            let dto: E::Update = util::read_body(&body)?;
            let updated = saved::<E, _>(queries.update(&id, &dto).await?)?;
            if !global.quiet {
                eprintln!("{}: registo atualizado ({updated})", E::KIND.label());
            }
            Ok(())
        }

        EntityCommand::Delete { id } => {
            let id = EntityId::from(id);
            if !util::confirm(
                &format!("Apagar {} '{id}'?", E::KIND.label()),
                "delete",
                global.yes,
            )? {
                return Ok(());
            }
            queries
                .delete(&id)
                .await
                .map_err(|e| not_found_as(e, E::KIND, &id))?;
            if !global.quiet {
                eprintln!("{}: registo apagado ({id})", E::KIND.label());
            }
            Ok(())
        }

        EntityCommand::DeleteMany { ids } => {
            let ids: Vec<EntityId> = ids.into_iter().map(EntityId::from).collect();
            if !ids.is_empty()
                && !util::confirm(
                    &format!("Apagar {} {}?", ids.len(), E::KIND.plural()),
                    "delete-many",
                    global.yes,
                )?
            {
                return Ok(());
            }
            queries.delete_multiple(&ids).await?;
            if !global.quiet {
                eprintln!("{}: {} registos apagados", E::KIND.plural(), ids.len());
            }
            Ok(())
        }

        EntityCommand::Count => {
            let summary = queries.count().await?;
            let out = output::render_single(
                global.output,
                &*summary,
                |s| format!("Total: {}\nAtivos: {}", s.total, s.active),
                |s| s.total.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Options => {
            let options = queries.select_options().await?;
            let out = output::render_list(
                global.output,
                options.as_slice(),
                |o| OptionRow {
                    value: o.value.to_string(),
                    label: o.label.clone(),
                },
                |o| o.value.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

// ── List ────────────────────────────────────────────────────────────

#[derive(tabled::Tabled)]
struct OptionRow {
    #[tabled(rename = "Valor")]
    value: String,
    #[tabled(rename = "Nome")]
    label: String,
}

async fn list<E: Resource>(
    app: &App<'_>,
    queries: &EntityQueries<E>,
    args: &ListArgs,
) -> Result<(), CliError> {
    let mut table = DataTable::for_kind(E::KIND, app.page_size);
    configure_table(&mut table, args, app.page_size)?;

    let mut page = queries.paginated(&table.request()).await?;
    if table.reconcile(&*page) {
        page = queries.paginated(&table.request()).await?;
    }

    let rows = to_rows(&page.data)?;
    let out = output::render_records(app.global.output, table.columns(), &rows);
    output::print_output(&out, app.global.quiet);
    if is_table(app) && !app.global.quiet {
        eprintln!("{}", output::page_footer(&*page, 0));
    }
    Ok(())
}

/// Apply `--seed`, `--filter`, `--sort` and the page arguments, in that
/// order: filters reset the page, so pagination goes last.
pub fn configure_table<O: TableObserver>(
    table: &mut DataTable<O>,
    args: &ListArgs,
    default_page_size: u32,
) -> Result<(), CliError> {
    if let Some(ref seed) = args.seed {
        if table.seed_from_url(seed).is_none() {
            return Err(CliError::Validation {
                field: "seed".into(),
                reason: format!(
                    "'{seed}' has no parameter {} can be filtered by",
                    command_name(table.kind())
                ),
            });
        }
    }

    if !args.filters.is_empty() {
        let mut filters = table.state().filters.clone();
        for raw in &args.filters {
            filters.push(util::parse_filter(raw)?);
        }
        table.set_filters(filters)?;
    }

    if let Some(ref sort) = args.sort {
        table.set_sorting(vec![util::parse_sort(sort)?])?;
    }

    table.set_pagination(args.page, args.page_size.unwrap_or(default_page_size))?;
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

pub fn to_rows<T: Serialize>(items: &[T]) -> Result<Vec<Value>, CliError> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(CliError::from))
        .collect()
}

/// Unwrap a submission, turning inline validation messages into an error.
fn saved<E: Resource, T>(submission: Submission<T>) -> Result<T, CliError> {
    match submission {
        Submission::Saved(v) => Ok(v),
        Submission::Invalid { messages, .. } => Err(CliError::Invalid {
            entity: E::KIND.label().into(),
            details: if messages.is_empty() {
                "O servidor rejeitou os dados sem mensagem.".into()
            } else {
                messages.join("\n")
            },
        }),
    }
}

/// Name the record in a 404 instead of the generic placeholder.
fn not_found_as(
    err: consola_core::DomainError,
    kind: consola_core::EntityKind,
    id: &EntityId,
) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            entity: kind.label().into(),
            identifier: id.to_string(),
            list_command: format!("{} list", command_name(kind)),
        }
    } else {
        err.into()
    }
}

fn is_table(app: &App<'_>) -> bool {
    matches!(app.global.output, crate::cli::OutputFormat::Table)
}

fn is_plain(app: &App<'_>) -> bool {
    matches!(app.global.output, crate::cli::OutputFormat::Plain)
}
