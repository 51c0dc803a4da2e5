use grabber_core::{AppViewModel, ErrorKind, MetadataView};

/// One terminal output step derived from a view-model change.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalCommand {
    Line(String),
    Error(String),
    Progress { percent: f64, status_text: String },
    ClearProgress,
    /// Route of the finished file, relative to the backend base.
    CompletionLink(String),
}

/// Commands that bring the terminal from `prev` to `next`.
pub fn render(prev: &AppViewModel, next: &AppViewModel) -> Vec<TerminalCommand> {
    let mut cmds = Vec::new();

    if next.loading && !prev.loading {
        cmds.push(TerminalCommand::Line(format!(
            "Analyzing {} ...",
            next.url_input.trim()
        )));
    }

    if next.metadata != prev.metadata {
        if let Some(metadata) = &next.metadata {
            cmds.extend(metadata_lines(metadata).into_iter().map(TerminalCommand::Line));
        }
    }

    if next.progress != prev.progress {
        match &next.progress {
            Some(progress) => cmds.push(TerminalCommand::Progress {
                percent: progress.percent,
                status_text: progress.status_text.clone(),
            }),
            None => cmds.push(TerminalCommand::ClearProgress),
        }
    }

    if next.error != prev.error {
        if let Some(error) = &next.error {
            let prefix = match error.kind {
                ErrorKind::Validation => "",
                ErrorKind::ServerRejection => "Error: ",
                ErrorKind::JobFailure => "Download failed: ",
            };
            cmds.push(TerminalCommand::Error(format!("{prefix}{}", error.message)));
        }
    }

    if next.completion_link != prev.completion_link {
        if let Some(link) = &next.completion_link {
            cmds.push(TerminalCommand::CompletionLink(link.clone()));
        }
    }

    cmds
}

pub fn metadata_lines(metadata: &MetadataView) -> Vec<String> {
    let mut lines = vec![
        format!("Title:    {}", metadata.title),
        format!("Uploader: {}", metadata.uploader),
        format!("Duration: {}", metadata.duration),
        format!("Views:    {}", metadata.views),
    ];
    if let Some(url) = &metadata.thumbnail_url {
        lines.push(format!("Thumbnail: {url}"));
    }
    lines
}

/// Percent as whole progress-bar units.
pub fn bar_position(percent: f64) -> u64 {
    if percent.is_nan() {
        0
    } else {
        percent.clamp(0.0, 100.0).round() as u64
    }
}
