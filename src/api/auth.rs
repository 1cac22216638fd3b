use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{cleared_session_cookie, create_jwt, hash_password, session_cookie, verify_password};
use crate::domain::{DomainError, NewUser};
use crate::infrastructure::AppState;
use crate::models::user::Role;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Loose `local@domain.tld` check, same as `^\S+@\S+\.\S+$`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    // Some `@` with text before it, then a `.` with text on both sides
    email.match_indices('@').any(|(at, _)| {
        let domain = &email[at + 1..];
        at > 0
            && domain
                .match_indices('.')
                .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
    })
}

fn signup_errors(email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push("Please enter a valid email address".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    errors
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> impl IntoResponse {
    let first_name = payload.first_name.trim().to_string();
    let last_name = payload.last_name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if first_name.is_empty() || last_name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Missing required fields" })),
        )
            .into_response();
    }

    let errors = signup_errors(&email, &payload.password);
    if !errors.is_empty() {
        tracing::warn!("Signup rejected for {}: {:?}", email, errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Validation error", "errors": errors })),
        )
            .into_response();
    }

    let role = payload
        .role
        .as_deref()
        .and_then(|r| r.trim().parse::<Role>().ok())
        .unwrap_or_default();

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => return DomainError::Internal(e).into_response(),
    };

    let created = state
        .user_repo
        .create(NewUser {
            first_name,
            last_name,
            email,
            password_hash,
            role,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!("New {} account created: {}", user.role, user.email);
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "message": "User registered successfully",
                    "data": {
                        "id": user.id,
                        "firstName": user.first_name,
                        "lastName": user.last_name,
                        "email": user.email,
                        "role": user.role,
                    }
                })),
            )
                .into_response()
        }
        Err(DomainError::Conflict(msg)) => (
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "message": msg })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Invalid credentials" })),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/signin",
    responses(
        (status = 200, description = "Signed in, session cookie set"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> impl IntoResponse {
    let email = payload.email.trim().to_lowercase();
    tracing::info!("Sign-in attempt for: {}", email);

    let user = match state.user_repo.find_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            tracing::warn!("Unknown email: {}", email);
            return invalid_credentials();
        }
        Err(e) => return e.into_response(),
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        _ => {
            tracing::warn!("Password verification failed for: {}", email);
            return invalid_credentials();
        }
    }

    let token = match create_jwt(user.id, &user.email, &user.role) {
        Ok(token) => token,
        Err(e) => return DomainError::Internal(e).into_response(),
    };

    tracing::info!("User {} signed in", user.email);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&token, state.cookie_secure))],
        Json(json!({
            "success": true,
            "message": "Signed in successfully",
            "token": token,
        })),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_session_cookie(state.cookie_secure))],
        Json(json!({ "success": true, "message": "Logged out successfully" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane.example.com"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(is_valid_email("a@b.c."));
        assert!(is_valid_email("a@@b.c"));
        assert!(is_valid_email("@x@b.c"));
        assert!(!is_valid_email("a@.b"));
        assert!(!is_valid_email("a@b."));
    }

    #[test]
    fn collects_every_signup_problem() {
        assert!(signup_errors("jane@example.com", "longenough").is_empty());
        assert_eq!(signup_errors("nope", "short").len(), 2);
    }
}
