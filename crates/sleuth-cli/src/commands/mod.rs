pub mod config;
pub mod dispatch;
pub mod investigate;
pub mod sample;
pub mod schema;
