#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bookstore_admin::infrastructure::AppState;
use bookstore_admin::{db, server};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

pub const PASSWORD: &str = "correct horse";

pub async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    server::build_router(AppState::new(db), &[])
}

/// App plus a handle on its database, for tests that rewrite rows directly
pub async fn setup_app_with_db() -> (DatabaseConnection, Router) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let app = server::build_router(AppState::new(db.clone()), &[]);
    (db, app)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    TestResponse { status, headers, body }
}

fn with_session(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::COOKIE, format!("token={}", token)),
        None => builder,
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    with_session(Request::builder().method(method).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    with_session(Request::builder().method(Method::GET).uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    with_session(Request::builder().method(Method::DELETE).uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub const BOUNDARY: &str = "----bookstore-test-boundary";

pub fn multipart_request(uri: &str, token: Option<&str>, field: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"books.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        content = content
    );
    with_session(Request::builder().method(Method::POST).uri(uri), token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn signup(app: &Router, email: &str, role: &str) -> TestResponse {
    send(
        app,
        json_request(
            Method::POST,
            "/api/auth/signup",
            None,
            json!({
                "firstName": "Test",
                "lastName": role,
                "email": email,
                "password": PASSWORD,
                "role": role,
            }),
        ),
    )
    .await
}

/// Sign up and sign in, returning the session token
pub async fn login_as(app: &Router, email: &str, role: &str) -> String {
    let created = signup(app, email, role).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);

    let res = send(
        app,
        json_request(
            Method::POST,
            "/api/auth/signin",
            None,
            json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    res.body["token"].as_str().unwrap().to_string()
}

pub async fn create_book(app: &Router, token: &str, isbn: &str, title: &str, price: f64) -> Value {
    let res = send(
        app,
        json_request(
            Method::POST,
            "/api/books",
            Some(token),
            json!({
                "title": title,
                "author": "Some Author",
                "isbn": isbn,
                "price": price,
                "description": "A book",
                "category": "Fiction",
            }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    res.body
}

pub fn order_payload(book_ids: &[i64]) -> Value {
    json!({
        "items": book_ids.iter().map(|id| json!({ "bookId": id, "quantity": 1 })).collect::<Vec<_>>(),
        "shippingAddress": {
            "street": "12 MG Road",
            "city": "Pune",
            "state": "MH",
            "zipCode": "411001",
            "country": "India",
        },
        "paymentMethod": "upi",
        "latLng": [18.52, 73.85],
    })
}
