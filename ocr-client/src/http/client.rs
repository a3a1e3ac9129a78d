use crate::config::ClientConfig;
use crate::curl::CurlGenerator;
use crate::error::{OcrClientError, Result};
use crate::http::{
    ResponseConverterImpl, UploadRequestBuilder, HEALTH_PATH, INFO_PATH, UPLOAD_PATH,
};
use crate::http::response_converter::error_chain;
use crate::progress::ProgressReporter;
use crate::traits::Transport;
use crate::types::{
    ErrorBody, FailureReason, HealthReport, HealthStatus, OcrResultSet, SelectedFile, ServiceInfo,
    TransportFailure,
};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Upper bound for the liveness probe, independent of the upload timeout
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest-backed transport against one backend origin
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
    request_builder: UploadRequestBuilder,
    response_converter: ResponseConverterImpl,
}

impl HttpTransport {
    /// Create a transport; the client-wide timeout bounds each whole request
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let response_converter = ResponseConverterImpl::new(config.timeout);

        Ok(Self {
            client,
            config,
            request_builder: UploadRequestBuilder::new(),
            response_converter,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Equivalent curl invocation for reproducing an upload by hand
    pub fn curl_command(&self, file: &SelectedFile) -> Result<String> {
        CurlGenerator::new(&self.config).upload_command(file)
    }

    async fn send_upload(
        &self,
        file: &SelectedFile,
        progress: ProgressReporter,
    ) -> std::result::Result<OcrResultSet, TransportFailure> {
        let url = self.config.endpoint(UPLOAD_PATH).map_err(|e| {
            TransportFailure::new(FailureReason::Io, format!("Invalid upload URL: {e}"))
        })?;
        let form = self.request_builder.build_form(file, progress).await?;

        debug!(url = %url, file = file.name(), bytes = file.byte_size(), "uploading image");

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.response_converter.convert_error(&e))?;

        debug!(status = %response.status(), "upload response received");
        self.response_converter.convert_upload(response).await
    }
}

impl Transport for HttpTransport {
    async fn check_health(&self) -> HealthStatus {
        let url = match self.config.endpoint(HEALTH_PATH) {
            Ok(url) => url,
            Err(e) => {
                return HealthStatus::Disconnected {
                    reason: e.to_string(),
                }
            }
        };

        debug!(url = %url, "checking backend health");
        let response = match self
            .client
            .get(url)
            .timeout(HEALTH_TIMEOUT.min(self.config.timeout))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "health check failed");
                return HealthStatus::Disconnected {
                    reason: error_chain(&e),
                };
            }
        };

        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        if !status.is_success() {
            let reason = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("Backend returned status {status}"));
            return HealthStatus::Disconnected { reason };
        }

        HealthStatus::Connected(serde_json::from_slice::<HealthReport>(&body).unwrap_or_default())
    }

    async fn submit(
        &self,
        file: &SelectedFile,
        progress: ProgressReporter,
    ) -> std::result::Result<OcrResultSet, TransportFailure> {
        let result = self.send_upload(file, progress).await;
        if let Err(failure) = &result {
            debug!(reason = ?failure.reason, message = %failure.message, "upload failed");
        }
        result
    }

    async fn service_info(&self) -> Result<ServiceInfo> {
        let url = self.config.endpoint(INFO_PATH)?;
        debug!(url = %url, "fetching service info");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status.to_string());
            return Err(OcrClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<ServiceInfo>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curl_command_uses_configured_origin() {
        let config = ClientConfig::new("http://ocr.internal:8080").unwrap();
        let transport = HttpTransport::new(config).unwrap();
        let file = SelectedFile::from_bytes("scan.png", vec![1u8]);

        let command = transport.curl_command(&file).unwrap();
        assert!(command.contains("'http://ocr.internal:8080/api/ocr/upload'"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_disconnected() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::builder()
            .base_url(format!("http://{addr}"))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let transport = HttpTransport::new(config).unwrap();

        let status = transport.check_health().await;
        assert!(!status.is_connected());
    }
}
