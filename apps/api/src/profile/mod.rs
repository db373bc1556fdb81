pub mod handlers;
pub mod images;
pub mod operations;
