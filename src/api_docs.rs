use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::signup,
        api::auth::signin,
        api::auth::logout,
        api::profile::get_profile,
        api::profile::update_profile,
        api::books::list_books,
        api::books::get_book,
        api::books::create_book,
        api::books::update_book,
        api::books::delete_book,
        api::bulk::bulk_upload,
        api::bulk::bulk_delete,
        api::orders::create_order,
        api::orders::list_orders,
        api::orders::get_order,
        api::orders::update_order_status,
        api::dashboard::metrics,
        api::dashboard::monthly_sales,
        api::dashboard::monthly_target,
        api::dashboard::statistics,
        api::dashboard::recent_orders,
        api::dashboard::all_orders,
        api::dashboard::purchase_locations,
    ),
    tags(
        (name = "bookstore-admin", description = "Bookstore admin dashboard API")
    )
)]
pub struct ApiDoc;
