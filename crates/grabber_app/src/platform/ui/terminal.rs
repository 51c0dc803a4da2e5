use grabber_client::BackendSettings;
use grabber_logging::grabber_warn;
use indicatif::{ProgressBar, ProgressStyle};

use super::render::{bar_position, TerminalCommand};

/// Applies render commands to stdout/stderr and an optional progress bar.
pub struct Terminal {
    settings: BackendSettings,
    bar: Option<ProgressBar>,
}

impl Terminal {
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            settings,
            bar: None,
        }
    }

    pub fn apply(&mut self, cmds: Vec<TerminalCommand>) {
        for cmd in cmds {
            match cmd {
                TerminalCommand::Line(text) => self.print(&text, false),
                TerminalCommand::Error(text) => self.print(&text, true),
                TerminalCommand::Progress {
                    percent,
                    status_text,
                } => {
                    let bar = self.bar.get_or_insert_with(new_bar);
                    bar.set_position(bar_position(percent));
                    bar.set_message(status_text);
                }
                TerminalCommand::ClearProgress => self.clear_progress(),
                TerminalCommand::CompletionLink(route) => {
                    if let Some(bar) = self.bar.take() {
                        bar.finish();
                    }
                    println!("Download file: {}", self.resolve(&route));
                }
            }
        }
    }

    /// Prints `text` without tearing the progress bar.
    pub fn print(&self, text: &str, is_error: bool) {
        let emit = || {
            if is_error {
                eprintln!("{text}");
            } else {
                println!("{text}");
            }
        };
        match &self.bar {
            Some(bar) => bar.suspend(emit),
            None => emit(),
        }
    }

    pub fn clear_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn resolve(&self, route: &str) -> String {
        match self.settings.endpoint(route) {
            Ok(url) => url.to_string(),
            Err(err) => {
                grabber_warn!("Could not resolve completion link {}: {}", route, err);
                route.to_string()
            }
        }
    }
}

fn new_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos:>3}% {wide_msg}")
    {
        Ok(style) => bar.set_style(style.progress_chars("█▓░")),
        Err(err) => grabber_warn!("Progress bar template rejected: {}", err),
    }
    bar
}
