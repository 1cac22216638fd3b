use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_AVATAR: &str = "/images/user/user-01.jpg";
pub const LEGACY_DEFAULT_AVATAR: &str = "/images/user/default-avatar.jpg";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sea_orm(default_value = "user")]
    pub role: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    // Postal address, flattened
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    // Social links, flattened
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Account roles. Anything unknown falls back to `User` at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Vendor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "vendor" => Ok(Role::Vendor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Profile payload returned by `GET /api/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub role: String,
    pub company: String,
    pub location: String,
    pub address: ProfileAddress,
    pub social_links: SocialLinks,
    pub avatar: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAddress {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city_state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub tax_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub instagram: String,
}

impl From<Model> for Profile {
    fn from(model: Model) -> Self {
        let city = model.city.unwrap_or_default();
        let state = model.state.unwrap_or_default();

        Self {
            id: model.id.to_string(),
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone.unwrap_or_default(),
            bio: model
                .bio
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| "No bio available".to_string()),
            role: model.role,
            company: model.company.unwrap_or_default(),
            location: model.location.unwrap_or_default(),
            address: ProfileAddress {
                country: model
                    .country
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "United States".to_string()),
                city_state: format!("{}, {}", city, state),
                postal_code: model.zip_code.unwrap_or_default(),
                tax_id: String::new(),
            },
            social_links: SocialLinks {
                facebook: model.facebook.unwrap_or_default(),
                twitter: model.twitter.unwrap_or_default(),
                linkedin: String::new(),
                instagram: model.instagram.unwrap_or_default(),
            },
            avatar: model
                .avatar
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        }
    }
}
