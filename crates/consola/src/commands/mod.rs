//! Command dispatch: bridges CLI args -> entity queries -> output formatting.

pub mod account;
pub mod browse;
pub mod clientes;
pub mod config_cmd;
pub mod entity;
pub mod licencas;
pub mod summary;
pub mod util;

use consola_core::model::{Aplicacao, Area, Funcionalidade, Modulo, Perfil, Utilizador};
use consola_core::{ClientRegistry, EntityKind, Role};

use crate::cli::{Command, GlobalOpts};
use crate::config::Backend;
use crate::error::CliError;

/// Per-invocation context shared by every backend-bound handler.
pub struct App<'a> {
    pub global: &'a GlobalOpts,
    pub profile: String,
    pub page_size: u32,
    pub registry: ClientRegistry,
}

impl<'a> App<'a> {
    pub fn new(global: &'a GlobalOpts, backend: Backend) -> Self {
        Self {
            global,
            profile: backend.profile,
            page_size: backend.config.page_size,
            registry: backend.registry,
        }
    }

    /// Role of the signed-in user.
    pub fn role(&self) -> Result<Role, CliError> {
        let session = self.registry.session();
        if !session.is_authenticated() {
            return Err(self.auth_required());
        }
        let claims = session.decode_token().map_err(|_| self.auth_required())?;
        Ok(Role::from_claims(&claims))
    }

    /// Fail unless the signed-in role has `kind` in its menu.
    pub fn require(&self, kind: EntityKind) -> Result<Role, CliError> {
        let role = self.role()?;
        if role.can_access(kind) {
            Ok(role)
        } else {
            Err(CliError::Forbidden {
                role: role.to_string(),
                entity: kind.plural().into(),
            })
        }
    }

    pub fn auth_required(&self) -> CliError {
        CliError::AuthRequired {
            profile: self.profile.clone(),
        }
    }

    /// Swap the generic "current" profile in auth errors for the real one.
    pub fn localize(&self, err: CliError) -> CliError {
        match err {
            CliError::AuthRequired { .. } => self.auth_required(),
            other => other,
        }
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, app: &App<'_>) -> Result<(), CliError> {
    let result = match cmd {
        Command::Login(args) => account::login(app, &args).await,
        Command::Logout => account::logout(app).await,
        Command::Refresh => account::refresh(app).await,
        Command::Whoami => account::whoami(app),
        Command::Areas(args) => entity::handle::<Area>(app, args.command).await,
        Command::Aplicacoes(args) => entity::handle::<Aplicacao>(app, args.command).await,
        Command::Modulos(args) => entity::handle::<Modulo>(app, args.command).await,
        Command::Funcionalidades(args) => {
            entity::handle::<Funcionalidade>(app, args.command).await
        }
        Command::Licencas(args) => licencas::handle(app, args).await,
        Command::Clientes(args) => clientes::handle(app, args).await,
        Command::Utilizadores(args) => entity::handle::<Utilizador>(app, args.command).await,
        Command::Perfis(args) => entity::handle::<Perfil>(app, args.command).await,
        Command::Summary => summary::handle(app).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    };
    result.map_err(|e| app.localize(e))
}
