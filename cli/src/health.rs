use crate::error::{CliError, Result};
use crate::ui;
use ocr_client::{ClientConfig, HealthStatus, HttpTransport, Transport};
use tokio::runtime::Runtime;

pub fn execute(config: ClientConfig, verbose: bool) -> Result<()> {
    let rt = Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {e}")))?;

    rt.block_on(execute_async(config, verbose))
}

async fn execute_async(config: ClientConfig, verbose: bool) -> Result<()> {
    let url = config.display_url();
    ui::section_header("Backend Health");
    ui::field("Backend", &url);

    let transport = HttpTransport::new(config)?;
    match transport.check_health().await {
        HealthStatus::Connected(report) => {
            ui::success_message("Connected");
            if verbose {
                if let Some(service) = &report.service {
                    ui::field("Service", service);
                }
                if let Some(status) = &report.status {
                    ui::field("Status", status);
                }
                if let Some(ready) = report.ocr_initialized {
                    ui::field("OCR engine", if ready { "ready" } else { "not initialized" });
                }
            }
            Ok(())
        }
        HealthStatus::Disconnected { reason } => {
            ui::error_message("Disconnected");
            Err(CliError::BackendUnavailable { url, reason })
        }
    }
}
