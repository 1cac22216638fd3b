use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::ApiResult;
use crate::api::Success;
use crate::domain::ProfileChanges;
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::AppState;
use crate::models::user::{DEFAULT_AVATAR, LEGACY_DEFAULT_AVATAR};
use crate::models::Profile;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAddressUpdate {
    pub country: Option<String>,
    pub city_state: Option<String>,
    pub postal_code: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinksUpdate {
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub address: Option<ProfileAddressUpdate>,
    pub social_links: Option<SocialLinksUpdate>,
}

/// Keep only values that carry something after trimming
fn provided(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// "City, State" splits on the first comma; without one the whole value is the city
fn split_city_state(value: &str) -> (Option<String>, Option<String>) {
    let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
    match value.split_once(',') {
        Some((city, state)) => (non_empty(city), non_empty(state)),
        None => (non_empty(value), None),
    }
}

impl UpdateProfileRequest {
    pub fn to_changes(&self) -> ProfileChanges {
        let mut changes = ProfileChanges {
            first_name: provided(&self.first_name),
            last_name: provided(&self.last_name),
            phone: provided(&self.phone),
            bio: provided(&self.bio),
            company: provided(&self.company),
            location: provided(&self.location),
            avatar: provided(&self.avatar),
            ..Default::default()
        };

        if let Some(address) = &self.address {
            if let Some(city_state) = provided(&address.city_state) {
                let (city, state) = split_city_state(&city_state);
                changes.city = city;
                changes.state = state;
            }
            changes.zip_code = provided(&address.postal_code);
            changes.country = provided(&address.country);
        }

        if let Some(links) = &self.social_links {
            changes.facebook = provided(&links.facebook);
            changes.twitter = provided(&links.twitter);
            changes.instagram = provided(&links.instagram);
        }

        changes
    }
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile of the signed-in user"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_profile(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Success<Profile>>> {
    let mut model = state
        .user_repo
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| crate::domain::DomainError::not_found("User"))?;

    if model.avatar.as_deref() == Some(LEGACY_DEFAULT_AVATAR) {
        model = state
            .user_repo
            .update_profile(
                user.id,
                ProfileChanges {
                    avatar: Some(DEFAULT_AVATAR.to_string()),
                    ..Default::default()
                },
            )
            .await?;
    }

    Ok(Success::json(Profile::from(model)))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    state.user_repo.update_profile(user.id, req.to_changes()).await?;
    tracing::info!("Profile updated for {}", user.email);

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Profile updated successfully",
            "data": req,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_state_splits_on_first_comma() {
        assert_eq!(
            split_city_state("Austin, TX"),
            (Some("Austin".into()), Some("TX".into()))
        );
        assert_eq!(
            split_city_state("Washington, D.C., USA"),
            (Some("Washington".into()), Some("D.C., USA".into()))
        );
        assert_eq!(split_city_state("Paris"), (Some("Paris".into()), None));
    }

    #[test]
    fn blank_fields_are_ignored() {
        let req = UpdateProfileRequest {
            first_name: Some("  ".into()),
            bio: Some(" Reader ".into()),
            address: Some(ProfileAddressUpdate {
                city_state: Some("Austin, TX".into()),
                postal_code: Some(String::new()),
                ..Default::default()
            }),
            social_links: Some(SocialLinksUpdate {
                twitter: Some("@jane".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let changes = req.to_changes();
        assert_eq!(changes.first_name, None);
        assert_eq!(changes.bio.as_deref(), Some("Reader"));
        assert_eq!(changes.city.as_deref(), Some("Austin"));
        assert_eq!(changes.state.as_deref(), Some("TX"));
        assert_eq!(changes.zip_code, None);
        assert_eq!(changes.twitter.as_deref(), Some("@jane"));
        assert_eq!(changes.facebook, None);
    }
}
