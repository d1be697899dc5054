//! Clap derive structures for the `consola` CLI.
//!
//! Only depends on clap + clap_complete so `build.rs` can include it for
//! man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// consola -- terminal console for the multi-tenant administration backend
#[derive(Debug, Parser)]
#[command(
    name = "consola",
    version,
    about = "Administer areas, applications, licenses and users from the command line",
    long_about = "Terminal console for the multi-tenant administration backend.\n\n\
        Every entity screen of the web console is available as a subcommand\n\
        with paginated, filtered and sorted listing plus create/update/delete.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "CONSOLA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, env = "CONSOLA_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Tenant identifier (overrides profile)
    #[arg(long, short = 't', env = "CONSOLA_TENANT", global = true)]
    pub tenant: Option<String>,

    /// Accept-Language sent to the backend
    #[arg(long, env = "CONSOLA_LOCALE", global = true)]
    pub locale: Option<String>,

    /// Tenant API key (used by login)
    #[arg(long, env = "CONSOLA_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CONSOLA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CONSOLA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login(LoginArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Renew the session with the stored refresh token
    Refresh,

    /// Show the signed-in user, role and menu
    Whoami,

    /// Manage functional areas
    Areas(EntityArgs),

    /// Manage applications
    #[command(alias = "apps")]
    Aplicacoes(EntityArgs),

    /// Manage application modules
    Modulos(EntityArgs),

    /// Manage module features
    Funcionalidades(EntityArgs),

    /// Manage licenses, blocking and seats
    #[command(alias = "lic")]
    Licencas(LicencasArgs),

    /// Manage tenants (clients) and their API keys
    Clientes(ClientesArgs),

    /// Manage users
    Utilizadores(EntityArgs),

    /// Manage profiles (roles)
    Perfis(EntityArgs),

    /// Record counts for every screen the current role can see
    Summary,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Account ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (defaults to the profile's username)
    #[arg(long, short = 'u')]
    pub email: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ── Shared Entity Arguments ──────────────────────────────────────────

/// Pagination, filtering and sorting for list commands.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Rows per page (defaults to the profile's page_size)
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u32).range(1..=500))]
    pub page_size: Option<u32>,

    /// Filter as field=value (repeatable), e.g. -f nome=Acme
    #[arg(long = "filter", short = 'f', value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Sort column, optionally with direction: nome, nome:desc
    #[arg(long, short = 's', value_name = "COLUMN[:desc]")]
    pub sort: Option<String>,

    /// Initial filter as a query string, e.g. "areaId=..." or "?clienteId=..."
    #[arg(long, value_name = "QUERY")]
    pub seed: Option<String>,
}

/// JSON body for create/update, from a file or inline.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct BodyArgs {
    /// Read the JSON body from a file
    #[arg(long, short = 'F', value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// Inline JSON body
    #[arg(long, short = 'd', value_name = "JSON")]
    pub data: Option<String>,
}

#[derive(Debug, Args)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub command: EntityCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum EntityCommand {
    /// List one page of records
    #[command(alias = "ls")]
    List(ListArgs),

    /// Interactive browser: paging, filters, sorting, bulk delete
    Browse(ListArgs),

    /// Show one record
    Get {
        /// Record ID
        id: String,
    },

    /// List records under a parent (e.g. modules of one application)
    Related {
        /// Parent record ID
        parent_id: String,
    },

    /// Create a record
    Create(BodyArgs),

    /// Update a record
    Update {
        /// Record ID
        id: String,

        #[command(flatten)]
        body: BodyArgs,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record ID
        id: String,
    },

    /// Delete several records at once
    DeleteMany {
        /// Record IDs
        ids: Vec<String>,
    },

    /// Total and active record counts
    Count,

    /// Active records as value/label pairs
    Options,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LICENCAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LicencasArgs {
    #[command(subcommand)]
    pub command: LicencasCommand,
}

#[derive(Debug, Subcommand)]
pub enum LicencasCommand {
    #[command(flatten)]
    Common(EntityCommand),

    /// Block a license
    Block {
        /// License ID
        id: String,

        /// Reason recorded with the block
        #[arg(long, short = 'm')]
        motivo: String,
    },

    /// Unblock a license
    Unblock {
        /// License ID
        id: String,
    },

    /// Assign a seat on the license to a user
    AddUser {
        /// License ID
        id: String,

        /// User ID
        utilizador: String,
    },

    /// Remove a user's seat from the license
    RemoveUser {
        /// License ID
        id: String,

        /// User ID
        utilizador: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientesArgs {
    #[command(subcommand)]
    pub command: ClientesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientesCommand {
    #[command(flatten)]
    Common(EntityCommand),

    /// Issue the tenant's first API key
    IssueKey {
        /// Client ID
        id: String,
    },

    /// Replace the tenant's API key (the old key stops working)
    RotateKey {
        /// Client ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a profile value
    Set {
        /// Profile key, e.g. base_url, tenant, page_size
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the tenant API key in the system keyring
    SetApiKey {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
