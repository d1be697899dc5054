//! Client (tenant) command handlers: the shared entity commands plus
//! API-key issuance and rotation.

use tabled::Tabled;

use consola_core::model::EntityId;
use consola_core::{ApiKeyIssued, Cliente, Resource};

use crate::cli::{ClientesArgs, ClientesCommand};
use crate::error::CliError;
use crate::output;

use super::{App, entity, util};

#[derive(Tabled)]
struct KeyRow {
    #[tabled(rename = "Cliente")]
    cliente: String,
    #[tabled(rename = "API key")]
    api_key: String,
}

pub async fn handle(app: &App<'_>, args: ClientesArgs) -> Result<(), CliError> {
    let (id, rotate) = match args.command {
        ClientesCommand::Common(cmd) => return entity::handle::<Cliente>(app, cmd).await,
        ClientesCommand::IssueKey { id } => (EntityId::from(id), false),
        ClientesCommand::RotateKey { id } => (EntityId::from(id), true),
    };

    app.require(Cliente::KIND)?;
    let queries = app.registry.queries::<Cliente>();

    let issued = if rotate {
        if !util::confirm(
            &format!("Substituir a API key do cliente '{id}'? A chave atual deixa de funcionar."),
            "rotate-key",
            app.global.yes,
        )? {
            return Ok(());
        }
        queries.rotate_api_key(&id).await?
    } else {
        queries.issue_api_key(&id).await?
    };

    print_key(app, &id, &issued);
    Ok(())
}

/// Print the issued key. It cannot be read back later.
fn print_key(app: &App<'_>, id: &EntityId, issued: &ApiKeyIssued) {
    let out = output::render_list(
        app.global.output,
        std::slice::from_ref(issued),
        |k| KeyRow {
            cliente: id.to_string(),
            api_key: k.api_key.clone(),
        },
        |k| k.api_key.clone(),
    );
    output::print_output(&out, app.global.quiet);
    if !app.global.quiet {
        eprintln!("Guarde esta chave agora: não volta a ser mostrada.");
    }
}
