pub mod temp;
pub use temp::{scoped_temp_file, write_stream_to_file};
pub mod url_validation;
pub use url_validation::{UrlValidationError, validate_endpoint_url, virtual_hosted_endpoint};
