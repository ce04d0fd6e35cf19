use axum::Json;
use tracing::debug;

use crate::types::responses::MessageResponse;

pub async fn test_connection() -> Json<MessageResponse> {
    debug!("connection test ping");
    Json(MessageResponse {
        message: "Backend is working!",
    })
}
