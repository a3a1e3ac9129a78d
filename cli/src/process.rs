use crate::cli::OutputFormat;
use crate::error::{CliError, Result, ResultExt};
use crate::progress::ProgressTracker;
use crate::ui;
use dialoguer::{Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use ocr_client::formatter::format_file_size;
use ocr_client::{
    ClientConfig, CliRenderer, ErrorRenderer, HealthStatus, HttpTransport, JsonRenderer,
    OcrResultSet, OutputRenderer, ProcessOutcome, ResultsPresenter, SelectOutcome, SelectedFile,
    SystemClipboard, TextRenderer, WorkflowController, WorkflowError,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncReadExt;
use tokio::runtime::Runtime;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ProcessArgs {
    pub input: PathBuf,
    pub name: Option<String>,
    pub format: OutputFormat,
    pub copy: bool,
    pub save_text: bool,
    pub save_json: bool,
    pub output_dir: PathBuf,
    pub interactive: bool,
    pub skip_health_check: bool,
    pub verbose: bool,
}

type Controller = WorkflowController<HttpTransport>;

#[derive(Clone, Copy)]
enum Attempt {
    First,
    Retry,
}

pub fn execute(config: ClientConfig, args: ProcessArgs) -> Result<()> {
    let rt = Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {e}")))?;

    rt.block_on(execute_async(config, args))
}

async fn execute_async(config: ClientConfig, args: ProcessArgs) -> Result<()> {
    let quiet = !args.format.is_human();
    let mut progress = ProgressTracker::new("OCR Processing", quiet).with_steps([
        "Checking backend",
        "Loading image",
        "Uploading and recognizing",
        "Presenting results",
    ]);

    let backend_url = config.display_url();
    let policy = config.policy.clone();
    let transport = HttpTransport::new(config)?;
    let controller = WorkflowController::new(transport, policy);

    // Health
    if args.skip_health_check {
        progress.skip_step("--skip-health-check");
    } else {
        progress.start_step();
        let status = controller.check_health().await;
        debug!(connected = status.is_connected(), "backend health checked");
        if !status.is_connected() {
            ui::suggestion("Start the backend, or pass --skip-health-check to upload anyway");
        }
        require_connected(status, &backend_url)?;
        if args.verbose && !quiet {
            ui::info_message(&format!("Backend connected at {backend_url}"));
        }
        progress.complete_step();
    }

    // Selection
    progress.start_step();
    let file = load_file(&args).await?;
    debug!(file = file.name(), bytes = file.byte_size(), format = ?args.format, "image loaded");
    match controller.select_file(file) {
        SelectOutcome::Selected => {}
        SelectOutcome::Rejected(rejection) => return Err(rejection.into()),
        SelectOutcome::Busy => {
            return Err(CliError::Other("A submission is already in progress".to_string()));
        }
    }
    let preview = controller.preview()?;
    let phase = controller.snapshot();
    if let Some(file) = phase.file() {
        if !quiet {
            ui::info_message(&format!(
                "{} ({}, {})",
                file.name(),
                format_file_size(file.byte_size()),
                file.mime_type()
            ));
        }
        if args.verbose && !quiet {
            if let Some(preview) = &preview {
                ui::field("Preview", &preview.path().display().to_string());
            }
            ui::field("Request", &controller.transport().curl_command(file)?);
        }
    }
    progress.complete_step();

    // Submission
    progress.start_step();
    let mut attempt = Attempt::First;
    let results = loop {
        match submit_with_progress(&controller, attempt, quiet).await {
            ProcessOutcome::Succeeded(results) => break results,
            ProcessOutcome::Failed(error) => {
                render_error(&error);
                if error.is_cancelled() {
                    return Err(CliError::Cancelled);
                }
                if !args.interactive {
                    return Err(processing_failed(&error));
                }
                let choice = prompt_after_failure()?;
                debug!(?choice, "failure prompt answered");
                match choice {
                    FailureChoice::Retry => attempt = Attempt::Retry,
                    FailureChoice::Dismiss => {
                        controller.dismiss_error();
                        ui::info_message("Error dismissed; the image is still selected");
                        return Ok(());
                    }
                    FailureChoice::Quit => return Err(processing_failed(&error)),
                }
            }
            ProcessOutcome::NoFileSelected(rejection) => return Err(rejection.into()),
            ProcessOutcome::AlreadySubmitting => {
                return Err(CliError::Other("A submission is already in progress".to_string()));
            }
            ProcessOutcome::Refused { phase } => {
                return Err(CliError::Other(format!("Cannot submit while {phase}")));
            }
        }
    };
    progress.complete_step();

    // Results
    progress.start_step();
    print_results(&results, args.format);
    export_results(&results, &args, quiet)?;
    progress.complete_step();

    if let Some(preview) = preview {
        preview.release();
    }
    progress.complete();
    Ok(())
}

/// Build the selection from a path or from stdin
async fn load_file(args: &ProcessArgs) -> Result<SelectedFile> {
    if args.input.as_os_str() == "-" {
        let name = args.name.clone().ok_or_else(|| {
            CliError::Other(
                "--name is required when reading from stdin (e.g. --name scan.png)".to_string(),
            )
        })?;
        let mut bytes = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut bytes)
            .await
            .with_context(|| "Failed to read image from stdin")?;
        return Ok(SelectedFile::from_bytes(name, bytes));
    }

    if !args.input.exists() {
        return Err(CliError::FileNotFound(args.input.clone()));
    }
    let file = SelectedFile::from_path(&args.input)
        .with_context(|| format!("Cannot open {}", args.input.display()))?;
    Ok(file)
}

/// Run one attempt while mirroring upload progress and listening for Ctrl-C
async fn submit_with_progress(controller: &Controller, attempt: Attempt, quiet: bool) -> ProcessOutcome {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(100)
    };
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    pb.set_message("Uploading image...");

    let mut phases = controller.subscribe();
    let mut watching = true;
    let mut cancel_requested = false;

    let mut submission: Pin<Box<dyn Future<Output = ProcessOutcome> + '_>> = match attempt {
        Attempt::First => Box::pin(controller.process()),
        Attempt::Retry => Box::pin(controller.retry()),
    };

    let outcome = loop {
        tokio::select! {
            outcome = &mut submission => break outcome,
            changed = phases.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let percent = phases.borrow_and_update().progress();
                if let Some(percent) = percent {
                    pb.set_position(u64::from(percent));
                    if percent == 100 {
                        pb.set_message("Recognizing text...");
                    }
                }
            }
            _ = tokio::signal::ctrl_c(), if !cancel_requested => {
                cancel_requested = true;
                pb.set_message("Cancelling...");
                controller.cancel();
            }
        }
    };

    match &outcome {
        ProcessOutcome::Succeeded(_) => pb.finish_with_message("✅ Text extracted"),
        _ => pb.abandon_with_message("❌ Processing stopped"),
    }
    outcome
}

#[derive(Debug)]
enum FailureChoice {
    Retry,
    Dismiss,
    Quit,
}

fn prompt_after_failure() -> Result<FailureChoice> {
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("What would you like to do?")
        .items(&["Retry", "Dismiss", "Quit"])
        .default(0)
        .interact()?;

    Ok(match choice {
        0 => FailureChoice::Retry,
        1 => FailureChoice::Dismiss,
        _ => FailureChoice::Quit,
    })
}

/// Uploading is only offered while the backend answers its health probe
fn require_connected(status: HealthStatus, backend_url: &str) -> Result<()> {
    match status {
        HealthStatus::Connected(_) => Ok(()),
        HealthStatus::Disconnected { reason } => Err(CliError::BackendUnavailable {
            url: backend_url.to_string(),
            reason,
        }),
    }
}

fn render_error(error: &WorkflowError) {
    let rendered = ErrorRenderer::without_emojis().render(error);
    let mut lines = rendered.lines();
    if let Some(title) = lines.next() {
        ui::error_message(title);
    }
    for line in lines {
        match line.trim_start().strip_prefix("• ") {
            Some(suggestion) => ui::suggestion(suggestion),
            None => eprintln!("{line}"),
        }
    }
}

fn processing_failed(error: &WorkflowError) -> CliError {
    CliError::ProcessingFailed {
        title: error.title().to_string(),
        message: error.raw_message.clone(),
    }
}

fn print_results(results: &OcrResultSet, format: OutputFormat) {
    let output = match format {
        OutputFormat::Summary => CliRenderer::new().render(results),
        OutputFormat::Table => CliRenderer::table().render(results),
        OutputFormat::Text => TextRenderer::new().render(results),
        OutputFormat::Json => JsonRenderer::new().render(results),
    };
    if format.is_human() {
        ui::section_header("OCR Results");
    }
    println!("{}", output.trim_end());
}

fn export_results(results: &OcrResultSet, args: &ProcessArgs, quiet: bool) -> Result<()> {
    let presenter = ResultsPresenter::new(SystemClipboard::new());

    if args.copy {
        match presenter.copy_text(results) {
            Ok(()) if !quiet => ui::success_message("Text copied to clipboard"),
            Ok(()) => {}
            Err(e) => ui::warning_message(&format!("Could not copy to clipboard: {e}")),
        }
    }

    if args.save_text || args.save_json {
        ensure_dir(&args.output_dir)?;
    }
    if args.save_text {
        let path = presenter
            .export_text(results, &args.output_dir)
            .with_context(|| "Failed to save text")?;
        if !quiet {
            ui::success_message(&format!("Text saved to {}", path.display()));
        }
    }
    if args.save_json {
        let path = presenter
            .export_json(results, &args.output_dir)
            .with_context(|| "Failed to save JSON")?;
        if !quiet {
            ui::success_message(&format!("Results saved to {}", path.display()));
        }
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create output directory {}", dir.display()))?;
    }
    Ok(())
}
