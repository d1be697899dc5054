//! Dashboard counts: total and active records for every screen the
//! signed-in role can open. A failing kind is reported in its row and
//! does not hide the others.

use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output;

use super::App;

#[derive(Debug, Serialize)]
struct SummaryEntry {
    entity: String,
    total: Option<usize>,
    active: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Ecrã")]
    entity: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Ativos")]
    active: String,
}

impl From<&SummaryEntry> for SummaryRow {
    fn from(e: &SummaryEntry) -> Self {
        let fmt = |n: Option<usize>| n.map_or_else(|| "✗".to_owned(), |n| n.to_string());
        Self {
            entity: e.entity.clone(),
            total: fmt(e.total),
            active: e.error.clone().unwrap_or_else(|| fmt(e.active)),
        }
    }
}

pub async fn handle(app: &App<'_>) -> Result<(), CliError> {
    let role = app.role()?;
    let results = app.registry.summary(role.menu()).await;

    let entries: Vec<SummaryEntry> = results
        .into_iter()
        .map(|(kind, result)| match result {
            Ok(counts) => SummaryEntry {
                entity: kind.plural().to_owned(),
                total: Some(counts.total),
                active: Some(counts.active),
                error: None,
            },
            Err(e) => SummaryEntry {
                entity: kind.plural().to_owned(),
                total: None,
                active: None,
                error: Some(e.user_message()),
            },
        })
        .collect();

    let out = output::render_list(
        app.global.output,
        &entries,
        |e| SummaryRow::from(e),
        |e| format!("{}\t{}", e.entity, e.total.map_or_else(String::new, |n| n.to_string())),
    );
    output::print_output(&out, app.global.quiet);
    Ok(())
}
