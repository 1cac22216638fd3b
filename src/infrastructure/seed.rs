use chrono::{Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::auth::hash_password;
use crate::models::book::{self, BookStatus, DEFAULT_COVER_IMAGE};
use crate::models::user::{self, Role, DEFAULT_AVATAR};
use crate::utils::time::format_timestamp;

pub const ADMIN_EMAIL: &str = "admin@bookstore.test";
pub const VENDOR_EMAIL: &str = "vendor@bookstore.test";
pub const CUSTOMER_EMAIL: &str = "reader@bookstore.test";
pub const DEMO_PASSWORD: &str = "password123";

struct DemoBook {
    title: &'static str,
    author: &'static str,
    isbn: &'static str,
    price: f64,
    category: &'static str,
    description: &'static str,
    /// Days since purchase and where it shipped; `None` stays in the catalog
    sold: Option<(i64, &'static str, [f64; 2])>,
}

const DEMO_BOOKS: &[DemoBook] = &[
    DemoBook {
        title: "Dune",
        author: "Frank Herbert",
        isbn: "9780441013593",
        price: 499.0,
        category: "Science Fiction",
        description: "A desert planet, a noble family and the spice.",
        sold: Some((0, "India", [20.5937, 78.9629])),
    },
    DemoBook {
        title: "Foundation",
        author: "Isaac Asimov",
        isbn: "9780553293357",
        price: 350.0,
        category: "Science Fiction",
        description: "Psychohistory and the fall of a galactic empire.",
        sold: Some((5, "United States", [37.0902, -95.7129])),
    },
    DemoBook {
        title: "The Hobbit",
        author: "J.R.R. Tolkien",
        isbn: "9780547928227",
        price: 299.0,
        category: "Fantasy",
        description: "There and back again.",
        sold: Some((34, "India", [20.5937, 78.9629])),
    },
    DemoBook {
        title: "Pride and Prejudice",
        author: "Jane Austen",
        isbn: "9780141439518",
        price: 199.0,
        category: "Classic",
        description: "Manners, marriage and misjudgement.",
        sold: Some((62, "United Kingdom", [55.3781, -3.4360])),
    },
    DemoBook {
        title: "Neuromancer",
        author: "William Gibson",
        isbn: "9780441569595",
        price: 420.0,
        category: "Science Fiction",
        description: "The sky above the port was the color of television.",
        sold: None,
    },
    DemoBook {
        title: "The Name of the Rose",
        author: "Umberto Eco",
        isbn: "9780156001311",
        price: 380.0,
        category: "Mystery",
        description: "Murder in a medieval abbey.",
        sold: None,
    },
];

async fn ensure_user(
    db: &DatabaseConnection,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: Role,
    password_hash: &str,
    created_at: &str,
) -> Result<i32, DbErr> {
    let account = user::ActiveModel {
        first_name: Set(first_name.to_owned()),
        last_name: Set(last_name.to_owned()),
        email: Set(email.to_owned()),
        password_hash: Set(password_hash.to_owned()),
        role: Set(role.to_string()),
        avatar: Set(Some(DEFAULT_AVATAR.to_owned())),
        is_verified: Set(true),
        created_at: Set(created_at.to_owned()),
        updated_at: Set(created_at.to_owned()),
        ..Default::default()
    };

    user::Entity::insert(account)
        .on_conflict(OnConflict::column(user::Column::Email).do_nothing().to_owned())
        .do_nothing()
        .exec(db)
        .await?;

    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .map(|u| u.id)
        .ok_or_else(|| DbErr::RecordNotFound(email.to_owned()))
}

/// Demo accounts and catalog; safe to run on every start
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = Utc::now();
    let joined = format_timestamp(now - Duration::days(90));
    let password_hash = hash_password(DEMO_PASSWORD).map_err(DbErr::Custom)?;

    ensure_user(db, ADMIN_EMAIL, "Ada", "Admin", Role::Admin, &password_hash, &joined).await?;
    let vendor_id =
        ensure_user(db, VENDOR_EMAIL, "Victor", "Vendor", Role::Vendor, &password_hash, &joined)
            .await?;
    let customer_id =
        ensure_user(db, CUSTOMER_EMAIL, "Rita", "Reader", Role::User, &password_hash, &joined)
            .await?;

    for demo in DEMO_BOOKS {
        let listed = format_timestamp(now - Duration::days(120));
        let mut model = book::ActiveModel {
            title: Set(demo.title.to_owned()),
            author: Set(demo.author.to_owned()),
            isbn: Set(demo.isbn.to_owned()),
            price: Set(demo.price),
            description: Set(demo.description.to_owned()),
            category: Set(demo.category.to_owned()),
            cover_image: Set(DEFAULT_COVER_IMAGE.to_owned()),
            vendor_id: Set(vendor_id),
            status: Set(BookStatus::Available.to_string()),
            created_at: Set(listed.clone()),
            updated_at: Set(listed),
            ..Default::default()
        };

        if let Some((days_ago, country, [lat, lng])) = demo.sold {
            model.purchased_at = Set(Some(format_timestamp(now - Duration::days(days_ago))));
            model.purchased_by = Set(Some(customer_id));
            model.purchase_country = Set(Some(country.to_owned()));
            model.purchase_lat = Set(Some(lat));
            model.purchase_lng = Set(Some(lng));
        }

        book::Entity::insert(model)
            .on_conflict(OnConflict::column(book::Column::Isbn).do_nothing().to_owned())
            .do_nothing()
            .exec(db)
            .await?;
    }

    tracing::info!("Demo accounts ready (password: {})", DEMO_PASSWORD);
    Ok(())
}
