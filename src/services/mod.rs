pub mod booking_service;
pub mod catalog_service;
pub mod seat_service;
pub mod user_service;
