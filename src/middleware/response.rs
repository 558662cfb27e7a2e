use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper for API responses that renders the uniform success envelope
/// `{success: true, data?, message?}` with the right status code.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a data payload
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created with the created resource
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status_code: StatusCode::CREATED,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// 200 OK with a message and no data, used by delete/update acknowledgements
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = json!({ "success": true });

        if let Some(data) = &self.data {
            match serde_json::to_value(data) {
                Ok(value) => envelope["data"] = value,
                Err(e) => {
                    tracing::error!("failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "message": "failed to serialize response data"
                        })),
                    )
                        .into_response();
                }
            }
        }

        if let Some(message) = &self.message {
            envelope["message"] = json!(message);
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

/// Handler result alias: success envelope or an `ApiError` envelope.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_defaults_to_200() {
        let res = ApiResponse::success(5);
        assert_eq!(res.status_code, StatusCode::OK);
        assert_eq!(res.data, Some(5));
    }

    #[test]
    fn created_sets_201() {
        let res = ApiResponse::created("row");
        assert_eq!(res.status_code, StatusCode::CREATED);
    }

    #[test]
    fn message_has_no_data() {
        let res = ApiResponse::message("deleted");
        assert!(res.data.is_none());
        assert_eq!(res.message.as_deref(), Some("deleted"));
    }
}
