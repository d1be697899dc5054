//! License command handlers: the shared entity commands plus blocking
//! and seat assignment.

use consola_core::model::EntityId;
use consola_core::{EntityQueries, Licenca, Resource};

use crate::cli::{LicencasArgs, LicencasCommand};
use crate::error::CliError;

use super::{App, entity, util};

fn licencas(app: &App<'_>) -> Result<EntityQueries<Licenca>, CliError> {
    app.require(Licenca::KIND)?;
    Ok(app.registry.queries::<Licenca>())
}

pub async fn handle(app: &App<'_>, args: LicencasArgs) -> Result<(), CliError> {
    let quiet = app.global.quiet;

    match args.command {
        LicencasCommand::Common(cmd) => entity::handle::<Licenca>(app, cmd).await,

        LicencasCommand::Block { id, motivo } => {
            let id = EntityId::from(id);
            let motivo = motivo.trim();
            if motivo.is_empty() {
                return Err(CliError::Validation {
                    field: "motivo".into(),
                    reason: "a reason is required to block a license".into(),
                });
            }
            let queries = licencas(app)?;
            if !util::confirm(&format!("Bloquear a licença '{id}'?"), "block", app.global.yes)? {
                return Ok(());
            }
            queries.block(&id, motivo).await?;
            if !quiet {
                eprintln!("Licença bloqueada ({id})");
            }
            Ok(())
        }

        LicencasCommand::Unblock { id } => {
            let id = EntityId::from(id);
            licencas(app)?.unblock(&id).await?;
            if !quiet {
                eprintln!("Licença desbloqueada ({id})");
            }
            Ok(())
        }

        LicencasCommand::AddUser { id, utilizador } => {
            let (id, user) = (EntityId::from(id), EntityId::from(utilizador));
            licencas(app)?.add_utilizador(&id, &user).await?;
            if !quiet {
                eprintln!("Utilizador {user} associado à licença {id}");
            }
            Ok(())
        }

        LicencasCommand::RemoveUser { id, utilizador } => {
            let (id, user) = (EntityId::from(id), EntityId::from(utilizador));
            licencas(app)?.remove_utilizador(&id, &user).await?;
            if !quiet {
                eprintln!("Utilizador {user} removido da licença {id}");
            }
            Ok(())
        }
    }
}
