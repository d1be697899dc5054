//! Output formatting: table, JSON, YAML, plain.
//!
//! Records are rendered from their wire JSON so one path serves every
//! entity: table columns come from the entity's `ColumnDef`s, structured
//! formats serialize the records as-is, plain emits one id per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use consola_api::PaginatedResult;
use consola_core::table::{Align, ColumnDef};
use consola_core::{Role, RoleColor};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Role name tinted with the role's badge color.
pub fn role_badge(role: &Role, color: bool) -> String {
    let name = role.to_string();
    if !color {
        return name;
    }
    match role.color() {
        RoleColor::Red => name.red().bold().to_string(),
        RoleColor::Blue => name.blue().bold().to_string(),
        RoleColor::Green => name.green().bold().to_string(),
        RoleColor::Gray => name.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render records of one entity in the chosen format.
pub fn render_records(format: OutputFormat, columns: &[ColumnDef], rows: &[Value]) -> String {
    match format {
        OutputFormat::Table => render_record_table(columns, rows),
        OutputFormat::Json => render_json(rows, false),
        OutputFormat::JsonCompact => render_json(rows, true),
        OutputFormat::Yaml => render_yaml(rows),
        OutputFormat::Plain => rows.iter().map(record_id).collect::<Vec<_>>().join("\n"),
    }
}

/// Render one record as a two-column field/value table.
pub fn render_record(format: OutputFormat, columns: &[ColumnDef], row: &Value) -> String {
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["ID".to_owned(), record_id(row)]);
            for col in columns {
                builder.push_record([col.header.to_owned(), col.cell(row)]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(row, false),
        OutputFormat::JsonCompact => render_json(row, true),
        OutputFormat::Yaml => render_yaml(row),
        OutputFormat::Plain => record_id(row),
    }
}

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String {
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// "Página 2 de 3 · 23 registos", shown under list tables.
pub fn page_footer<T>(page: &PaginatedResult<T>, selected: usize) -> String {
    let mut footer = format!(
        "Página {} de {} · {} registos",
        page.current_page,
        page.total_pages.max(1),
        page.total_count
    );
    if selected > 0 {
        footer.push_str(&format!(" · {selected} selecionados"));
    }
    footer
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_record_table(columns: &[ColumnDef], rows: &[Value]) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.header.to_owned()));
    for row in rows {
        builder.push_record(columns.iter().map(|c| c.cell(row)));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    for (i, col) in columns.iter().enumerate() {
        let align = match col.align {
            Align::Left => continue,
            Align::Center => Alignment::center(),
            Align::Right => Alignment::right(),
        };
        table.modify(Columns::single(i), align);
    }
    table.to_string()
}

fn record_id(row: &Value) -> String {
    match row.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}
