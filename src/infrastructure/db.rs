use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await
    .map(|_| ())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create users table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'vendor', 'admin')),
            phone TEXT,
            bio TEXT,
            company TEXT,
            location TEXT,
            street TEXT,
            city TEXT,
            state TEXT,
            zip_code TEXT,
            country TEXT,
            twitter TEXT,
            facebook TEXT,
            instagram TEXT,
            avatar TEXT DEFAULT '/images/user/user-01.jpg',
            is_verified BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create books table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            isbn TEXT NOT NULL UNIQUE,
            price REAL NOT NULL CHECK (price >= 0),
            description TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL,
            cover_image TEXT NOT NULL DEFAULT '/images/product/product-01.jpg',
            vendor_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            purchased_at TEXT,
            purchased_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
            purchase_country TEXT,
            purchase_lat REAL,
            purchase_lng REAL,
            status TEXT NOT NULL DEFAULT 'Available'
                CHECK (status IN ('Available', 'Pending', 'Delivered', 'Canceled')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_books_vendor ON books(vendor_id)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_books_purchased_at ON books(purchased_at)",
    )
    .await?;

    // Create orders table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            items TEXT NOT NULL DEFAULT '[]',
            total_amount REAL NOT NULL,
            ship_street TEXT NOT NULL,
            ship_city TEXT NOT NULL,
            ship_state TEXT NOT NULL,
            ship_zip_code TEXT NOT NULL,
            ship_country TEXT NOT NULL,
            payment_method TEXT NOT NULL
                CHECK (payment_method IN ('credit_card', 'debit_card', 'upi', 'cash_on_delivery', 'wallet')),
            transaction_id TEXT,
            payment_status TEXT NOT NULL DEFAULT 'pending'
                CHECK (payment_status IN ('pending', 'completed', 'failed', 'refunded')),
            paid_at TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'processing', 'shipped', 'delivered', 'cancelled')),
            status_history TEXT NOT NULL DEFAULT '[]',
            delivered_at TEXT,
            cancelled_at TEXT,
            cancel_reason TEXT,
            tracking_number TEXT,
            tracking_url TEXT,
            note TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id)",
    )
    .await?;

    Ok(())
}
