mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_signup_signin_and_profile() {
    let app = setup_app().await;

    let created = signup(&app, "  Jane@Example.COM ", "vendor").await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["email"], "jane@example.com");
    assert_eq!(created.body["data"]["role"], "vendor");

    let res = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/signin",
            None,
            json!({ "email": "jane@example.com", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    let cookie = res.headers["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let token = res.body["token"].as_str().unwrap();
    let profile = send(&app, get("/api/profile", Some(token))).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["data"]["email"], "jane@example.com");
    assert_eq!(profile.body["data"]["bio"], "No bio available");
    assert_eq!(profile.body["data"]["address"]["country"], "United States");
    assert_eq!(profile.body["data"]["avatar"], "/images/user/user-01.jpg");
}

#[tokio::test]
async fn test_profile_update_merges_fields() {
    let app = setup_app().await;
    let token = login_as(&app, "sam@example.com", "user").await;

    let res = send(
        &app,
        json_request(
            Method::PUT,
            "/api/profile",
            Some(&token),
            json!({
                "bio": "Collector of first editions",
                "lastName": "",
                "address": { "cityState": "Austin, TX", "postalCode": "73301" },
                "socialLinks": { "twitter": "@sam" },
            }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Profile updated successfully");

    let profile = send(&app, get("/api/profile", Some(&token))).await;
    assert_eq!(profile.body["data"]["bio"], "Collector of first editions");
    assert_eq!(profile.body["data"]["lastName"], "user");
    assert_eq!(profile.body["data"]["address"]["cityState"], "Austin, TX");
    assert_eq!(profile.body["data"]["address"]["postalCode"], "73301");
    assert_eq!(profile.body["data"]["socialLinks"]["twitter"], "@sam");
    assert_eq!(profile.body["data"]["socialLinks"]["linkedin"], "");
}

#[tokio::test]
async fn test_book_crud_flow() {
    let app = setup_app().await;
    let token = login_as(&app, "vendor@example.com", "vendor").await;

    let book = create_book(&app, &token, "9780441013593", "Dune", 499.0).await;
    let id = book["id"].as_i64().unwrap();
    assert_eq!(book["status"], "Available");
    assert_eq!(book["coverImage"], "/images/product/product-01.jpg");
    assert!(book["purchasedAt"].is_null());

    let fetched = send(&app, get(&format!("/api/books/{}", id), Some(&token))).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["title"], "Dune");

    let updated = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/books/{}", id),
            Some(&token),
            json!({ "title": "Dune (Deluxe)", "price": 0, "author": "  ", "status": "Pending" }),
        ),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Dune (Deluxe)");
    assert_eq!(updated.body["price"], 499.0);
    assert_eq!(updated.body["author"], "Some Author");
    assert_eq!(updated.body["status"], "Pending");

    let deleted = send(&app, delete(&format!("/api/books/{}", id), Some(&token))).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Book deleted successfully");

    let gone = send(&app, get(&format!("/api/books/{}", id), Some(&token))).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_isbn_is_rejected() {
    let app = setup_app().await;
    let token = login_as(&app, "vendor@example.com", "vendor").await;
    create_book(&app, &token, "111", "First", 10.0).await;
    let second = create_book(&app, &token, "222", "Second", 10.0).await;

    let dup = send(
        &app,
        json_request(
            Method::POST,
            "/api/books",
            Some(&token),
            json!({
                "title": "Copy", "author": "A", "isbn": "111",
                "price": 5, "description": "", "category": "Misc",
            }),
        ),
    )
    .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["error"], "A book with ISBN 111 already exists in the database");

    // Renaming onto an existing ISBN fails the same way
    let clash = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/books/{}", second["id"]),
            Some(&token),
            json!({ "isbn": "111" }),
        ),
    )
    .await;
    assert_eq!(clash.status, StatusCode::BAD_REQUEST);
    assert_eq!(clash.body["error"], "A book with ISBN 111 already exists in the database");
}

#[tokio::test]
async fn test_list_books_search_and_pagination() {
    let app = setup_app().await;
    let token = login_as(&app, "vendor@example.com", "vendor").await;
    for i in 0..12 {
        create_book(&app, &token, &format!("isbn-{:02}", i), &format!("Title {}", i), 10.0).await;
    }
    create_book(&app, &token, "978-dune", "Dune Messiah", 20.0).await;

    let page2 = send(&app, get("/api/books?page=2&limit=5", Some(&token))).await;
    assert_eq!(page2.status, StatusCode::OK);
    assert_eq!(page2.body["books"].as_array().unwrap().len(), 5);
    assert_eq!(page2.body["books"][0]["title"], "Title 5");
    let pagination = &page2.body["pagination"];
    assert_eq!(pagination["total"], 13);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["currentPage"], 2);
    assert_eq!(pagination["hasNextPage"], true);
    assert_eq!(pagination["hasPreviousPage"], true);

    let search = send(&app, get("/api/books?search=dUNE", Some(&token))).await;
    let books = search.body["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["isbn"], "978-dune");
    assert_eq!(search.body["pagination"]["limit"], 10);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let app = setup_app().await;
    let token = login_as(&app, "vendor@example.com", "vendor").await;
    create_book(&app, &token, "111", "Half_Price", 10.0).await;
    create_book(&app, &token, "222", "HalfXPrice", 10.0).await;
    create_book(&app, &token, "333", "100% Cotton", 10.0).await;

    let underscore = send(&app, get("/api/books?search=f_P", Some(&token))).await;
    let books = underscore.body["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Half_Price");

    let percent = send(&app, get("/api/books?search=0%25%20C", Some(&token))).await;
    let books = percent.body["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "100% Cotton");

    let lone = send(&app, get("/api/books?search=%25", Some(&token))).await;
    assert_eq!(lone.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_bulk_upload_adds_and_skips_duplicates() {
    let app = setup_app().await;
    let token = login_as(&app, "vendor@example.com", "vendor").await;
    create_book(&app, &token, "111", "Existing", 10.0).await;

    let csv = "Title,Author,ISBN,Price,Category,Description\n\
               Dune,Frank Herbert,999,499,Sci-Fi,\"Spice, sand\"\n\
               Again,Someone,111,10,Misc,dup of catalog\n\
               Emma,Jane Austen,888,0,Classic,\n\
               Dune twice,Frank Herbert,999,1,Sci-Fi,dup in file\n";
    let res = send(&app, multipart_request("/api/books/bulk", Some(&token), "file", csv)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["skippedCount"], 2);
    assert_eq!(res.body["addedBooks"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["addedBooks"][0]["description"], "Spice, sand");
    assert_eq!(
        res.body["message"],
        "Successfully added 2 new book(s)\nSkipped 2 duplicate book(s):\n\
         Row 3: ISBN 111 already exists\nRow 5: ISBN 999 already exists"
    );

    let listed = send(&app, get("/api/books", Some(&token))).await;
    assert_eq!(listed.body["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_bulk_upload_with_row_errors_inserts_nothing() {
    let app = setup_app().await;
    let token = login_as(&app, "vendor@example.com", "vendor").await;

    let csv = "title,author,isbn,price,category,description\n\
               Good,Author,123,10,Misc,x\n\
               ,Author,124,10,Misc,x\n\
               Bad,Author,125,ten,Misc,x\n";
    let res = send(&app, multipart_request("/api/books/bulk", Some(&token), "file", csv)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Validation errors found");
    assert_eq!(
        res.body["details"],
        "Validation errors:\nRow 3: Missing required fields\nRow 4: Invalid price"
    );

    let listed = send(&app, get("/api/books", Some(&token))).await;
    assert_eq!(listed.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_bulk_delete() {
    let app = setup_app().await;
    let token = login_as(&app, "vendor@example.com", "vendor").await;
    let a = create_book(&app, &token, "1", "A", 1.0).await;
    let b = create_book(&app, &token, "2", "B", 1.0).await;
    create_book(&app, &token, "3", "C", 1.0).await;

    let res = send(
        &app,
        json_request(
            Method::DELETE,
            "/api/books/bulk-delete",
            Some(&token),
            json!({ "ids": [a["id"], b["id"], 9999] }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["deletedCount"], 2);
    assert_eq!(res.body["message"], "Successfully deleted 2 book(s).");

    let again = send(
        &app,
        json_request(
            Method::DELETE,
            "/api/books/bulk-delete",
            Some(&token),
            json!({ "ids": [a["id"]] }),
        ),
    )
    .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.body["error"], "No books found with the provided IDs.");
}

#[tokio::test]
async fn test_order_lifecycle() {
    let app = setup_app().await;
    let vendor = login_as(&app, "vendor@example.com", "vendor").await;
    let buyer = login_as(&app, "buyer@example.com", "user").await;
    let admin = login_as(&app, "admin@example.com", "admin").await;

    let dune = create_book(&app, &vendor, "111", "Dune", 499.0).await;
    let emma = create_book(&app, &vendor, "222", "Emma", 150.5).await;
    let ids = [dune["id"].as_i64().unwrap(), emma["id"].as_i64().unwrap()];

    let placed = send(&app, json_request(Method::POST, "/api/orders", Some(&buyer), order_payload(&ids))).await;
    assert_eq!(placed.status, StatusCode::CREATED, "{}", placed.body);
    assert_eq!(placed.body["totalAmount"], 649.5);
    assert_eq!(placed.body["status"], "pending");
    assert_eq!(placed.body["paymentDetails"]["status"], "completed");
    assert_eq!(placed.body["statusHistory"].as_array().unwrap().len(), 1);
    let order_id = placed.body["id"].as_i64().unwrap();

    // Books are stamped with the purchase
    let sold = send(&app, get(&format!("/api/books/{}", ids[0]), Some(&vendor))).await;
    assert_eq!(sold.body["status"], "Pending");
    assert_eq!(sold.body["purchaseLocation"]["country"], "India");
    assert!(sold.body["purchasedAt"].is_string());

    // A sold book cannot be bought twice
    let again = send(&app, json_request(Method::POST, "/api/orders", Some(&buyer), order_payload(&ids[..1]))).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let mine = send(&app, get("/api/orders", Some(&buyer))).await;
    assert_eq!(mine.body["orders"].as_array().unwrap().len(), 1);
    let vendors_view = send(&app, get("/api/orders", Some(&vendor))).await;
    assert_eq!(vendors_view.body["orders"].as_array().unwrap().len(), 0);
    let hidden = send(&app, get(&format!("/api/orders/{}", order_id), Some(&vendor))).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let status_uri = format!("/api/orders/{}/status", order_id);
    let forbidden = send(
        &app,
        json_request(Method::PUT, &status_uri, Some(&buyer), json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let delivered = send(
        &app,
        json_request(
            Method::PUT,
            &status_uri,
            Some(&admin),
            json!({ "status": "delivered", "note": "Left at door", "trackingNumber": "TRK1" }),
        ),
    )
    .await;
    assert_eq!(delivered.status, StatusCode::OK, "{}", delivered.body);
    assert_eq!(delivered.body["status"], "delivered");
    assert!(delivered.body["deliveredAt"].is_string());
    assert_eq!(delivered.body["trackingNumber"], "TRK1");
    assert_eq!(delivered.body["statusHistory"].as_array().unwrap().len(), 2);

    let book = send(&app, get(&format!("/api/books/{}", ids[1]), Some(&vendor))).await;
    assert_eq!(book.body["status"], "Delivered");

    let terminal = send(
        &app,
        json_request(Method::PUT, &status_uri, Some(&admin), json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(terminal.status, StatusCode::BAD_REQUEST);
    assert_eq!(terminal.body["error"], "Order is already delivered and cannot be changed");
}

#[tokio::test]
async fn test_dashboard_reflects_purchases() {
    let app = setup_app().await;
    let vendor = login_as(&app, "vendor@example.com", "vendor").await;
    let buyer = login_as(&app, "buyer@example.com", "user").await;
    let admin = login_as(&app, "admin@example.com", "admin").await;

    let sold = create_book(&app, &vendor, "111", "Dune", 400.0).await;
    create_book(&app, &vendor, "222", "Unsold", 30_000.0).await;
    let id = sold["id"].as_i64().unwrap();
    let placed = send(&app, json_request(Method::POST, "/api/orders", Some(&buyer), order_payload(&[id]))).await;
    assert_eq!(placed.status, StatusCode::CREATED);

    let metrics = send(&app, get("/api/dashboard/metrics", Some(&vendor))).await;
    assert_eq!(metrics.status, StatusCode::OK);
    assert_eq!(metrics.body["metrics"]["books"]["total"], 2);
    assert_eq!(metrics.body["metrics"]["revenue"]["total"], "400.00");
    assert_eq!(metrics.body["metrics"]["avgOrder"]["value"], "400.00");
    assert_eq!(metrics.body["metrics"]["users"]["total"], 1);

    let admin_metrics = send(&app, get("/api/dashboard/metrics", Some(&admin))).await;
    assert_eq!(admin_metrics.body["metrics"]["users"]["total"], 1);
    assert_eq!(admin_metrics.body["metrics"]["users"]["growth"], "100.00");

    let target = send(&app, get("/api/dashboard/monthly-target", Some(&vendor))).await;
    assert_eq!(target.body["data"]["currentRevenue"], 400.0);
    assert_eq!(target.body["data"]["todayRevenue"], 400.0);
    assert_eq!(target.body["data"]["target"], 15_000.0);
    assert_eq!(target.body["data"]["progressPercentage"], 3.0);

    let sales = send(&app, get("/api/dashboard/monthly-sales", Some(&vendor))).await;
    assert_eq!(sales.body["data"]["totalSales"], 400.0);
    assert_eq!(sales.body["data"]["monthlySales"].as_array().unwrap().len(), 12);

    let stats = send(&app, get("/api/dashboard/statistics", Some(&vendor))).await;
    assert_eq!(stats.body["data"]["hasSales"], true);

    let recent = send(&app, get("/api/dashboard/recent-orders", Some(&vendor))).await;
    let recent = recent.body["data"].as_array().unwrap().clone();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["name"], "Dune");
    assert_eq!(recent[0]["status"], "Pending");

    let all = send(&app, get("/api/dashboard/all-orders?page=1&limit=10", Some(&admin))).await;
    assert_eq!(all.body["data"]["pagination"]["totalOrders"], 1);
    assert_eq!(all.body["data"]["pagination"]["totalPages"], 1);

    let locations = send(&app, get("/api/dashboard/purchase-locations", Some(&vendor))).await;
    assert_eq!(locations.body["data"]["hasPurchases"], true);
    assert_eq!(locations.body["data"]["locations"][0]["country"], "India");
    assert_eq!(locations.body["data"]["locations"][0]["purchaseCount"], 1);
    assert_eq!(locations.body["data"]["locations"][0]["latLng"], json!([18.52, 73.85]));

    // Other vendors see none of it
    let other = login_as(&app, "other@example.com", "vendor").await;
    let empty = send(&app, get("/api/dashboard/metrics", Some(&other))).await;
    assert_eq!(empty.body["metrics"]["revenue"]["total"], "0.00");
}

#[tokio::test]
async fn test_demo_seed_is_idempotent() {
    use bookstore_admin::infrastructure::AppState;
    use bookstore_admin::{db, seed, server};

    let db = db::init_db("sqlite::memory:").await.expect("Failed to init DB");
    let state = AppState::new(db);
    seed::seed_demo_data(state.db()).await.expect("first seed");
    seed::seed_demo_data(state.db()).await.expect("second seed");
    let app = server::build_router(state, &[]);

    let res = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/signin",
            None,
            json!({ "email": seed::ADMIN_EMAIL, "password": seed::DEMO_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    let token = res.body["token"].as_str().unwrap().to_string();

    let books = send(&app, get("/api/books", Some(&token))).await;
    assert_eq!(books.body["pagination"]["total"], 6);

    let orders = send(&app, get("/api/dashboard/all-orders", Some(&token))).await;
    assert_eq!(orders.body["data"]["pagination"]["totalOrders"], 4);

    let recent = send(&app, get("/api/dashboard/recent-orders", Some(&token))).await;
    assert_eq!(recent.body["data"][0]["name"], "Dune");
}
