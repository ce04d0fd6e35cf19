pub mod cors;
pub mod json;

pub use cors::cors_layer;
pub use json::ValidJson;
