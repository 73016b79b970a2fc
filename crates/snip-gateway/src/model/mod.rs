mod url;

pub use url::{
    CreateUrlRequest, ErrorResponse, HealthResponse, UpdateUrlRequest, UrlDetailsResponse,
    UrlResponse,
};
