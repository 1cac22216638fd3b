use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_COVER_IMAGE: &str = "/images/product/product-01.jpg";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    #[sea_orm(unique)]
    pub isbn: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub cover_image: String,
    pub vendor_id: i32,
    pub purchased_at: Option<String>,
    pub purchased_by: Option<i32>,
    pub purchase_country: Option<String>,
    pub purchase_lat: Option<f64>,
    pub purchase_lng: Option<f64>,
    #[sea_orm(default_value = "Available")]
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VendorId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Vendor,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Catalog / fulfilment state of a single book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookStatus {
    #[default]
    Available,
    Pending,
    Delivered,
    Canceled,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Pending => "Pending",
            BookStatus::Delivered => "Delivered",
            BookStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BookStatus::Available),
            "Pending" => Ok(BookStatus::Pending),
            "Delivered" => Ok(BookStatus::Delivered),
            "Canceled" => Ok(BookStatus::Canceled),
            other => Err(format!(
                "Invalid status '{}'. Must be one of Available, Pending, Delivered, Canceled",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLocation {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<[f64; 2]>,
}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub cover_image: String,
    pub vendor_id: i32,
    pub purchased_at: Option<String>,
    pub purchased_by: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_location: Option<PurchaseLocation>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        let lat_lng = match (model.purchase_lat, model.purchase_lng) {
            (Some(lat), Some(lng)) => Some([lat, lng]),
            _ => None,
        };
        let purchase_location = model.purchase_country.map(|country| PurchaseLocation {
            country,
            lat_lng,
        });

        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            isbn: model.isbn,
            price: model.price,
            description: model.description,
            category: model.category,
            cover_image: model.cover_image,
            vendor_id: model.vendor_id,
            purchased_at: model.purchased_at,
            purchased_by: model.purchased_by,
            purchase_location,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Validated input for inserting a catalog book.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub cover_image: Option<String>,
    pub vendor_id: i32,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<BookStatus>,
}
