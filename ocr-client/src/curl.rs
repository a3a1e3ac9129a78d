//! Curl command generation for reproducing an upload by hand

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::UPLOAD_PATH;
use crate::types::{FileContent, SelectedFile};

/// Generator for curl commands equivalent to the transport's requests
pub struct CurlGenerator<'a> {
    config: &'a ClientConfig,
}

impl<'a> CurlGenerator<'a> {
    pub fn new(config: &'a ClientConfig) -> Self {
        Self { config }
    }

    /// Multipart upload of `file` to the processing endpoint.
    ///
    /// In-memory content is read from stdin (`@-`) under the file's name.
    pub fn upload_command(&self, file: &SelectedFile) -> Result<String> {
        let url = self.config.endpoint(UPLOAD_PATH)?;
        let source = match file.content() {
            FileContent::Path(path) => format!("@{}", path.display()),
            FileContent::Memory(_) => format!("@-;filename={}", file.name()),
        };

        Ok(format!(
            "curl -X POST \\\n  -F '{}' \\\n  '{}'",
            escape_argument(&format!("image={source};type={}", file.mime_type())),
            escape_argument(url.as_str())
        ))
    }
}

/// Handle single quotes by replacing them with '"'"'
fn escape_argument(arg: &str) -> String {
    arg.replace('\'', "'\"'\"'")
}
