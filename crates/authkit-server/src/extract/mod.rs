//! Request extractors.

mod api_json;
mod auth_subject;

pub use api_json::ApiJson;
pub use auth_subject::AuthSubject;
