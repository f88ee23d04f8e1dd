use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Successful response in the `{success, message, data}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// Success with `data: null`, used by deletes.
    pub fn empty(message: impl Into<String>) -> Self {
        Self::ok(message, ())
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response data");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to serialize response data",
                        "data": Value::Null
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "message": self.message,
            "data": data_value
        });

        (StatusCode::OK, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn wraps_data_in_envelope() {
        let response = ApiResponse::ok("Course found successfully", json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Course found successfully");
        assert_eq!(body["data"]["id"], 1);
    }

    #[tokio::test]
    async fn empty_has_null_data() {
        let body = body(ApiResponse::empty("Course deleted successfully").into_response()).await;
        assert_eq!(body["data"], Value::Null);
    }
}
