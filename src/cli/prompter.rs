use std::io::{self, BufRead};

use dialoguer::theme::ColorfulTheme;

use crate::cli::{io as prompts, output};
use crate::errors::AppError;
use crate::submission::Confirmation;

/// Answer source for the interactive runners.
pub trait Prompter {
    fn text(&mut self, label: &str, initial: &str) -> Result<String, AppError>;
    fn secret(&mut self, label: &str) -> Result<String, AppError>;
    fn select(&mut self, label: &str, items: &[&str], default: usize) -> Result<usize, AppError>;
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, AppError>;
}

/// Terminal prompts rendered with dialoguer.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&mut self, label: &str, initial: &str) -> Result<String, AppError> {
        prompts::prompt_text(&self.theme, label, initial)
    }

    fn secret(&mut self, label: &str) -> Result<String, AppError> {
        prompts::prompt_secret(&self.theme, label)
    }

    fn select(&mut self, label: &str, items: &[&str], default: usize) -> Result<usize, AppError> {
        prompts::choose(&self.theme, label, items, default)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, AppError> {
        prompts::confirm_action(&self.theme, message, default)
    }
}

/// Line-per-answer prompter used in script mode.
///
/// Text prompts take the line as typed; `<keep>` keeps the pre-filled value.
/// Selections accept a 1-based index or the item text; a blank line picks
/// the default. Confirmations accept `s`/`sim`/`y`/`yes`.
pub struct ScriptPrompter<R> {
    input: R,
}

pub const KEEP: &str = "<keep>";

impl<R: BufRead> ScriptPrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn next_line(&mut self, label: &str) -> Result<String, AppError> {
        output::prompt(label);
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("script ended before `{label}`"),
            )));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead> Prompter for ScriptPrompter<R> {
    fn text(&mut self, label: &str, initial: &str) -> Result<String, AppError> {
        let line = self.next_line(label)?;
        Ok(if line == KEEP { initial.to_string() } else { line })
    }

    fn secret(&mut self, label: &str) -> Result<String, AppError> {
        self.next_line(label)
    }

    fn select(&mut self, label: &str, items: &[&str], default: usize) -> Result<usize, AppError> {
        let line = self.next_line(label)?;
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        if let Ok(position) = answer.parse::<usize>() {
            if (1..=items.len()).contains(&position) {
                return Ok(position - 1);
            }
        }
        items
            .iter()
            .position(|item| item.eq_ignore_ascii_case(answer))
            .ok_or_else(|| AppError::Config(format!("`{answer}` is not an option of `{label}`")))
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, AppError> {
        let line = self.next_line(message)?;
        Ok(match line.trim().to_lowercase().as_str() {
            "" => default,
            "s" | "sim" | "y" | "yes" => true,
            _ => false,
        })
    }
}

/// Bridges yes/no prompts of the library to a [`Prompter`]. A prompt that
/// fails to render counts as a refusal.
pub struct PromptConfirmation<'a, P: ?Sized>(pub &'a mut P);

impl<P: Prompter + ?Sized> Confirmation for PromptConfirmation<'_, P> {
    fn confirm(&mut self, message: &str) -> bool {
        Prompter::confirm(&mut *self.0, message, false).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "confirmation prompt failed");
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(lines: &str) -> ScriptPrompter<&[u8]> {
        ScriptPrompter::new(lines.as_bytes())
    }

    #[test]
    fn script_answers_are_consumed_in_order() {
        let mut prompter = script("Maria\n<keep>\n2\nsim\n\n");
        assert_eq!(prompter.text("Nome", "").unwrap(), "Maria");
        assert_eq!(prompter.text("Login", "ana").unwrap(), "ana");
        assert_eq!(prompter.select("Ocupação", &["a", "b"], 0).unwrap(), 1);
        assert!(prompter.confirm("Continuar?", false).unwrap());
        assert!(prompter.confirm("Continuar?", true).unwrap());
        assert!(matches!(prompter.text("Fim", ""), Err(AppError::Io(_))));
    }

    #[test]
    fn selection_matches_item_text() {
        let mut prompter = script("outro\nnada\n");
        assert_eq!(prompter.select("x", &["clt", "Outro"], 0).unwrap(), 1);
        assert!(prompter.select("x", &["clt"], 0).is_err());
    }

    #[test]
    fn confirmation_bridge_declines_on_error() {
        let mut prompter = script("");
        assert!(!PromptConfirmation(&mut prompter).confirm("Sair?"));
    }
}
