//! Small helpers shared by the config layer and the text renderer.
//!
//! - **Endpoint validation**: scheme and host checks for the catalog URL
//! - **Text processing**: width-aware truncation and control-character
//!   scrubbing for remote strings

mod text;
mod url_validator;

pub use text::{sanitize_line, truncate_to_width};
pub use url_validator::{validate_endpoint, UrlValidationError};
