mod health;
mod url;

pub use health::HealthResponse;
pub use url::{DecodeParams, EncodeRequest, ErrorResponse, ErrorsResponse, ShortLinkResponse};
