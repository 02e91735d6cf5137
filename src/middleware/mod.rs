pub mod api_json;
pub mod api_params;
pub mod auth;

pub use api_json::ApiJson;
pub use api_params::{ApiPath, ApiQuery};
pub use auth::RequireAdminKey;
