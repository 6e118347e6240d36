use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use aerodesk_auth::{Principal, Role};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    #[serde(default)]
    pub force_change: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProvisionRequest {
    pub email: String,
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResponse {
    pub success: bool,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
}

impl From<&Principal> for LoginResponse {
    fn from(p: &Principal) -> Self {
        Self {
            user: LoginUser {
                id: p.id.to_string(),
                email: p.email().map(str::to_string),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: &'static str,
}

impl MeResponse {
    pub fn new(p: &Principal, role: Role) -> Self {
        Self {
            id: p.id.to_string(),
            email: p.email().map(str::to_string),
            phone: p.phone.clone(),
            role: role.as_str(),
        }
    }
}

/// Parse a JSON body, mapping any rejection (missing content type, malformed
/// JSON, wrong shape) to a 400.
pub async fn read_json<T: DeserializeOwned>(req: Request) -> Result<T, ApiError> {
    match Json::<T>::from_request(req, &()).await {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "rejected request body");
            Err(ApiError::validation("Invalid request body"))
        }
    }
}
