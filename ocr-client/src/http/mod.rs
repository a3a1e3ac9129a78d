pub mod client;
pub mod request_builder;
pub mod response_converter;

pub use client::HttpTransport;
pub use request_builder::UploadRequestBuilder;
pub use response_converter::ResponseConverterImpl;

/// Liveness probe
pub const HEALTH_PATH: &str = "/api/health";

/// Multipart processing endpoint
pub const UPLOAD_PATH: &str = "/api/ocr/upload";

/// Service description endpoint
pub const INFO_PATH: &str = "/api/ocr/info";

/// Multipart field carrying the image bytes
pub const IMAGE_FIELD: &str = "image";
