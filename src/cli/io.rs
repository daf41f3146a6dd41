use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};

use crate::errors::AppError;

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(theme: &ColorfulTheme, prompt: &str, default: bool) -> Result<bool, AppError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(AppError::from)
}

/// Prompt for free-form text, pre-filled with `initial`. Blank answers are
/// allowed so optional fields can be cleared.
pub fn prompt_text(theme: &ColorfulTheme, prompt: &str, initial: &str) -> Result<String, AppError> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .map_err(AppError::from)
}

/// Prompt for a secret without echo.
pub fn prompt_secret(theme: &ColorfulTheme, prompt: &str) -> Result<String, AppError> {
    Password::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(AppError::from)
}

/// Let the user pick one of `items`, returning its index.
pub fn choose(
    theme: &ColorfulTheme,
    prompt: &str,
    items: &[&str],
    default: usize,
) -> Result<usize, AppError> {
    Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(default.min(items.len().saturating_sub(1)))
        .interact()
        .map_err(AppError::from)
}
