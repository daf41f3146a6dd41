use std::io;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::account::AccountForm;
use crate::api::{ApiGateway, HttpGateway, InMemoryGateway, RecordId};
use crate::cli::account::run_account_form;
use crate::cli::output::{self, OutputPreferences};
use crate::cli::prompter::{DialoguerPrompter, Prompter, ScriptPrompter};
use crate::cli::wizard::run_wizard;
use crate::config::ConfigManager;
use crate::errors::AppError;
use crate::session::{logout, Route, SessionInfo, SessionStore};
use crate::utils::build_info;
use crate::wizard::steps::acolhido_steps;
use crate::wizard::{MultistepController, WizardSession};

pub const SCRIPT_ENV: &str = "APAJAC_ADMIN_CLI_SCRIPT";

/// Terminal client for the APAJAC admin front-end.
#[derive(Debug, Parser)]
#[command(name = "apajac_admin_cli")]
#[command(about = "Cadastro de acolhidos e usuários da APAJAC")]
#[command(version, long_version = build_info::long_version())]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Usa um servidor em memória (nada é persistido)
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Cadastro de acolhidos
    Acolhido {
        #[command(subcommand)]
        action: PersonAction,
    },
    /// Usuários do sistema
    Usuario {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Iniciar sessão
    Login,
    /// Encerrar sessão
    Logout,
    /// Mostrar sessão e configuração
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum PersonAction {
    /// Cadastrar acolhido
    Novo,
    /// Alterar cadastro de acolhido
    Editar { id: RecordId },
    /// Consultar acolhido (somente leitura)
    Consultar { id: RecordId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum AccountAction {
    /// Cadastrar usuário
    Novo,
    /// Alterar usuário
    Editar { id: RecordId },
}

/// Entry point of the terminal client. Reads answers line by line from stdin
/// when `APAJAC_ADMIN_CLI_SCRIPT` is set.
pub fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    if std::env::var_os(SCRIPT_ENV).is_some() {
        output::set_preferences(OutputPreferences {
            plain: true,
            quiet: false,
        });
        let stdin = io::stdin();
        let mut prompter = ScriptPrompter::new(stdin.lock());
        run_command(&cli, &mut prompter)
    } else {
        let mut prompter = DialoguerPrompter::new();
        run_command(&cli, &mut prompter)
    }
}

fn run_command<P: Prompter>(cli: &Cli, prompter: &mut P) -> Result<(), AppError> {
    let store = SessionStore::new()?;
    let route = match cli.command {
        Command::Login => return login(&store, prompter),
        Command::Logout => {
            let route = logout(&store)?;
            output::success(format!("Sessão encerrada ({route})"));
            return Ok(());
        }
        Command::Status => return status(&store),
        Command::Acolhido { action } => {
            let gateway = connect(&store, cli.offline)?;
            run_person(action, prompter, gateway.as_ref())?
        }
        Command::Usuario { action } => {
            let gateway = connect(&store, cli.offline)?;
            run_account(action, prompter, gateway.as_ref())?
        }
    };

    if let Some(route) = route {
        output::info(format!("Voltando para {route}"));
    }
    Ok(())
}

fn run_person<P: Prompter>(
    action: PersonAction,
    prompter: &mut P,
    gateway: &dyn ApiGateway,
) -> Result<Option<Route>, AppError> {
    let controller = match action {
        PersonAction::Novo => MultistepController::new(acolhido_steps())?,
        PersonAction::Editar { id } => {
            let record = gateway.get_person(id)?;
            let active = record.is_active();
            MultistepController::for_record(acolhido_steps(), &record, active)?
        }
        PersonAction::Consultar { id } => {
            let record = gateway.get_person(id)?;
            MultistepController::for_record(acolhido_steps(), &record, false)?
        }
    };
    run_wizard(&mut WizardSession::new(controller), prompter, gateway)
}

fn run_account<P: Prompter>(
    action: AccountAction,
    prompter: &mut P,
    gateway: &dyn ApiGateway,
) -> Result<Option<Route>, AppError> {
    let mut form = match action {
        AccountAction::Novo => AccountForm::create(),
        AccountAction::Editar { id } => AccountForm::edit(&gateway.get_account(id)?),
    };
    run_account_form(&mut form, prompter, gateway)
}

/// Greets the stored session, if any, and opens the gateway with its token.
fn connect(store: &SessionStore, offline: bool) -> Result<Box<dyn ApiGateway>, AppError> {
    let session = store.load()?;
    if let Some(session) = &session {
        output::info(session.greeting());
    }
    gateway_for(offline, session.as_ref())
}

fn gateway_for(
    offline: bool,
    session: Option<&SessionInfo>,
) -> Result<Box<dyn ApiGateway>, AppError> {
    if offline {
        tracing::info!("using in-memory gateway");
        return Ok(Box::new(InMemoryGateway::new()));
    }
    let config = ConfigManager::new()?.load()?;
    let gateway = HttpGateway::new(
        config.api_base_url,
        session.map(|session| session.token.clone()),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(Box::new(gateway))
}

fn login<P: Prompter>(store: &SessionStore, prompter: &mut P) -> Result<(), AppError> {
    let name = prompter.text("Nome", "")?;
    let token = prompter.secret("Token de acesso")?;
    if name.trim().is_empty() || token.trim().is_empty() {
        return Err(AppError::Config("nome e token são obrigatórios".into()));
    }
    let session = SessionInfo::new(name.trim(), token.trim());
    store.save(&session)?;
    output::success(session.greeting());
    output::info(format!("Indo para {}", Route::Menu));
    Ok(())
}

fn status(store: &SessionStore) -> Result<(), AppError> {
    output::info(build_info::current().banner());
    match store.load()? {
        Some(session) => {
            output::info(session.greeting());
            if let Some(at) = session.logged_in_at {
                output::info(format!("Sessão iniciada em {}", at.format("%d/%m/%Y %H:%M")));
            }
        }
        None => output::warning(format!("Nenhuma sessão ativa ({})", Route::Login)),
    }
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    output::info(format!("Servidor: {}", config.api_base_url));
    output::info(format!("Configuração: {}", manager.path().display()));
    Ok(())
}
