//! Terminal client: prompts, colored output and the form runners.

mod account;
pub mod forms;
pub mod io;
pub mod output;
pub mod prompter;
mod shell;
mod wizard;

pub use account::run_account_form;
pub use prompter::{DialoguerPrompter, PromptConfirmation, Prompter, ScriptPrompter};
pub use shell::{run_cli, AccountAction, Cli, Command, PersonAction, SCRIPT_ENV};
pub use wizard::run_wizard;
