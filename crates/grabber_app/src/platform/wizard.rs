use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use grabber_core::{ChoiceView, MediaKind};
use grabber_logging::grabber_debug;

const MAX_ATTEMPTS: usize = 5;

/// Source of interactive answers.
pub trait ChoiceInput {
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

pub struct StdinInput;

impl ChoiceInput for StdinInput {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from standard input")?;
        if read == 0 {
            bail!("Standard input closed");
        }
        Ok(line.trim().to_string())
    }
}

/// Resolves one wizard step to a choice value.
///
/// `preset` comes from a command-line flag and is matched without prompting.
/// An exact value wins over a 1-based position.
/// A single choice is taken as is; otherwise the user picks from a numbered
/// list by position, value or label.
pub fn pick(
    title: &str,
    choices: &[ChoiceView],
    preset: Option<&str>,
    input: &mut dyn ChoiceInput,
) -> Result<String> {
    if choices.is_empty() {
        bail!("No options available for {title}");
    }
    if let Some(token) = preset {
        return match match_choice(choices, token) {
            Some(choice) => Ok(choice.value.clone()),
            None => bail!(
                "{token:?} is not {title}; expected one of: {}",
                choices
                    .iter()
                    .map(|choice| choice.value.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
    }
    if let [only] = choices {
        grabber_debug!("Only one choice for {}; taking {}", title, only.value);
        return Ok(only.value.clone());
    }

    let prompt = numbered_prompt(title, choices);
    for _ in 0..MAX_ATTEMPTS {
        let answer = input.ask(&prompt)?;
        if let Some(choice) = match_choice(choices, &answer) {
            return Ok(choice.value.clone());
        }
        println!("{answer:?} is not one of the listed options.");
    }
    bail!("Gave up waiting for {title}")
}

pub fn confirm(prompt: &str, input: &mut dyn ChoiceInput) -> Result<bool> {
    let answer = input.ask(&format!("{prompt} [y/N] "))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub fn media_kind_from_value(value: &str) -> Option<MediaKind> {
    MediaKind::ALL
        .iter()
        .copied()
        .find(|kind| kind.to_string() == value)
}

fn match_choice<'a>(choices: &'a [ChoiceView], token: &str) -> Option<&'a ChoiceView> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    // Format ids are often numeric, so an exact value beats a position.
    if let Some(choice) = choices.iter().find(|choice| choice.value == token) {
        return Some(choice);
    }
    if let Ok(position) = token.parse::<usize>() {
        if let Some(choice) = position.checked_sub(1).and_then(|index| choices.get(index)) {
            return Some(choice);
        }
    }
    choices.iter().find(|choice| {
        choice.value.eq_ignore_ascii_case(token) || choice.label.eq_ignore_ascii_case(token)
    })
}

fn numbered_prompt(title: &str, choices: &[ChoiceView]) -> String {
    let mut prompt = format!("Choose {title}:\n");
    for (index, choice) in choices.iter().enumerate() {
        match &choice.detail {
            Some(detail) => {
                prompt.push_str(&format!("  {}) {} - {}\n", index + 1, choice.label, detail))
            }
            None => prompt.push_str(&format!("  {}) {}\n", index + 1, choice.label)),
        }
    }
    prompt.push_str(&format!("Enter 1-{}: ", choices.len()));
    prompt
}
