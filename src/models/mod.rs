pub mod booking;
pub mod movie;
pub mod seat;
pub mod user;
