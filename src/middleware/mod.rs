pub mod error_handler;
pub mod security_headers;

pub use error_handler::ErrorHandler;
pub use security_headers::SecurityHeaders;
