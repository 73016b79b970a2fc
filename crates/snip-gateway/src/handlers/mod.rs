mod health;
mod redirect;
mod url;

pub use health::health_handler;
pub use redirect::redirect_handler;
pub use url::{
    create_url_handler, delete_url_handler, get_url_handler, list_urls_handler,
    update_url_handler,
};

use crate::error::AppError;
use snip_core::ShortCode;

/// Parses a short code taken from the request path.
///
/// A malformed code can never have been stored, so it is reported the same
/// way as an unknown one.
fn path_code(raw: String) -> Result<ShortCode, AppError> {
    ShortCode::new(raw).map_err(|_| AppError::NotFound)
}
