//! Services Layer
//!
//! Business rules extracted from HTTP handlers. Services work against the
//! repository traits so they can be exercised without the router.

pub mod analytics_service;
pub mod order_service;
