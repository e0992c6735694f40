//! HTTP handlers and their error/response vocabulary.

mod authentication;
mod error;
mod response;

pub use authentication::routes;
pub use error::{Error, ErrorKind, Result};
pub use response::{AuthResponse, SubjectData, SubjectResponse};
