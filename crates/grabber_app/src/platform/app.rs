use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use grabber_client::ClientHandle;
use grabber_core::{
    container_catalog, quality_catalog, update, AppState, AppViewModel, CatalogMode,
    DownloadPhase, LookupState, MediaKind, Msg, VideoMetadata,
};
use grabber_logging::{grabber_debug, grabber_info, grabber_warn};

use super::cli::Cli;
use super::config::GrabberConfig;
use super::effects::EffectRunner;
use super::ui::render::render;
use super::ui::terminal::Terminal;
use super::wizard::{self, ChoiceInput, StdinInput};

const EVENT_WAIT: Duration = Duration::from_millis(50);
/// Conventional status for a run ended by SIGINT.
const INTERRUPTED: u8 = 130;

pub fn run_app(cli: Cli, config: GrabberConfig) -> Result<ExitCode> {
    let backend = config.backend_settings()?;
    let client = ClientHandle::new(backend.clone()).context("Failed to start backend client")?;
    let mut session = Session {
        state: AppState::with_settings(config.core_settings()),
        last_view: AppViewModel::default(),
        runner: EffectRunner::new(client),
        terminal: Terminal::new(backend),
        exit_requested: false,
    };
    let mut input = StdinInput;

    session.dispatch(Msg::InputChanged(cli.url.clone()));
    session.dispatch(Msg::AnalyzeClicked);
    if session.state.error().is_some() {
        return Ok(ExitCode::FAILURE);
    }
    session.wait_for_lookup();

    let metadata = match session.state.lookup() {
        LookupState::Ready(metadata) => metadata.clone(),
        _ => return Ok(ExitCode::FAILURE),
    };

    if cli.list {
        session.list_choices(&metadata);
        return Ok(ExitCode::SUCCESS);
    }

    session.choose(&cli, &mut input)?;
    session.dispatch(Msg::DownloadClicked);
    if !matches!(session.state.download(), DownloadPhase::Starting { .. }) {
        return Ok(ExitCode::FAILURE);
    }

    let (ui_tx, ui_rx) = mpsc::channel();
    spawn_interrupt_listener(ui_tx)?;
    session.drive_download(&ui_rx, &mut input)
}

struct Session {
    state: AppState,
    last_view: AppViewModel,
    runner: EffectRunner,
    terminal: Terminal,
    exit_requested: bool,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            let view = state.view();
            self.terminal.apply(render(&self.last_view, &view));
            self.last_view = view;
        }
        self.state = state;
        if self.runner.enqueue(effects) {
            self.exit_requested = true;
        }
    }

    fn pump(&mut self) {
        if let Some(msg) = self.runner.next_msg(EVENT_WAIT) {
            self.dispatch(msg);
        }
    }

    fn wait_for_lookup(&mut self) {
        while matches!(self.state.lookup(), LookupState::Pending { .. }) {
            self.pump();
        }
    }

    /// Walks the three selection steps, taking flags first and prompting
    /// for whatever is missing.
    fn choose(&mut self, cli: &Cli, input: &mut dyn ChoiceInput) -> Result<()> {
        let preset_kind = cli.kind.map(|kind| MediaKind::from(kind).to_string());
        let value = wizard::pick(
            "a format",
            &self.last_view.media_kinds,
            preset_kind.as_deref(),
            input,
        )?;
        let kind = wizard::media_kind_from_value(&value)
            .ok_or_else(|| anyhow!("Unknown media kind {value:?}"))?;
        self.dispatch(Msg::MediaKindSelected(kind));

        let qualities = self.last_view.quality_options.clone().unwrap_or_default();
        let token = wizard::pick("a quality option", &qualities, cli.quality.as_deref(), input)?;
        self.dispatch(Msg::QualitySelected(token));

        let containers = self.last_view.container_options.clone().unwrap_or_default();
        let extension =
            wizard::pick("a file format", &containers, cli.container.as_deref(), input)?;
        self.dispatch(Msg::ContainerSelected(extension));
        Ok(())
    }

    fn list_choices(&self, metadata: &VideoMetadata) {
        let mode = self.state.settings().catalog_mode;
        for kind in MediaKind::ALL {
            self.terminal.print(&format!("\n{} qualities:", kind.label()), false);
            let qualities = quality_catalog(mode, kind, &metadata.formats);
            if qualities.is_empty() && mode == CatalogMode::FromMetadata {
                self.terminal.print("  (none reported)", false);
            }
            for (index, option) in qualities.iter().enumerate() {
                self.terminal.print(
                    &format!("  {}) {}  [{}]", index + 1, option.label, option.selector),
                    false,
                );
            }
            self.terminal.print(&format!("{} file formats:", kind.label()), false);
            for option in container_catalog(kind) {
                let line = match &option.description {
                    Some(description) => {
                        format!("  {}  {} - {}", option.extension, option.label, description)
                    }
                    None => format!("  {}  {}", option.extension, option.label),
                };
                self.terminal.print(&line, false);
            }
        }
    }

    fn drive_download(
        &mut self,
        ui_rx: &mpsc::Receiver<Msg>,
        input: &mut dyn ChoiceInput,
    ) -> Result<ExitCode> {
        loop {
            self.pump();
            while let Ok(msg) = ui_rx.try_recv() {
                self.dispatch(msg);
            }

            if let Some(prompt) = self.last_view.leave_prompt.clone() {
                let leave = self.terminal_confirm(&prompt, input);
                self.dispatch(if leave {
                    Msg::LeaveConfirmed
                } else {
                    Msg::LeaveCancelled
                });
            }

            if self.exit_requested {
                grabber_info!("Leaving on user request");
                self.terminal.clear_progress();
                return Ok(ExitCode::from(INTERRUPTED));
            }

            match self.state.download() {
                DownloadPhase::Completed { .. } => return Ok(ExitCode::SUCCESS),
                DownloadPhase::Failed | DownloadPhase::Idle => return Ok(ExitCode::FAILURE),
                DownloadPhase::Starting { .. } | DownloadPhase::Polling { .. } => {}
            }
        }
    }

    fn terminal_confirm(&mut self, prompt: &str, input: &mut dyn ChoiceInput) -> bool {
        self.terminal.clear_progress();
        match wizard::confirm(prompt, input) {
            Ok(answer) => answer,
            Err(err) => {
                grabber_warn!("No answer to leave prompt: {:#}", err);
                false
            }
        }
    }
}

/// Forwards Ctrl-C presses as `LeaveRequested` from a small signal runtime.
fn spawn_interrupt_listener(tx: mpsc::Sender<Msg>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;
    thread::spawn(move || {
        runtime.block_on(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                grabber_debug!("Interrupt received");
                if tx.send(Msg::LeaveRequested).is_err() {
                    break;
                }
            }
        });
    });
    Ok(())
}
