use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use ocr_client::formatter::format_file_size;
use ocr_client::{ClientConfig, HttpTransport, Transport};
use tokio::runtime::Runtime;

pub fn execute(config: ClientConfig, json: bool, verbose: bool) -> Result<()> {
    let rt = Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {e}")))?;

    rt.block_on(execute_async(config, json, verbose))
}

async fn execute_async(config: ClientConfig, json: bool, verbose: bool) -> Result<()> {
    let url = config.display_url();
    let policy = config.policy.clone();
    let transport = HttpTransport::new(config)?;
    let info = transport
        .service_info()
        .await
        .with_context(|| format!("Failed to fetch service info from {url}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    ui::section_header("OCR Service");
    ui::field("Backend", &url);
    ui::field("Service", &info.service);
    ui::field("Version", &info.version);
    if let Some(language) = &info.language {
        ui::field("Language", language);
    }
    if !info.supported_formats.is_empty() {
        ui::field("Formats", &info.supported_formats.join(", "));
    }
    if let Some(max_mb) = info.max_file_size_mb {
        ui::field("Max size", &format!("{max_mb}MB"));
    }
    for feature in &info.features {
        println!("  • {feature}");
    }

    if verbose {
        ui::section_header("Local Validation");
        ui::field("Formats", &policy.allowed_extensions().join(", "));
        ui::field("Max size", &format_file_size(policy.max_bytes()));
    }
    Ok(())
}
