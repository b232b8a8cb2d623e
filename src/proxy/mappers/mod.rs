pub mod models;
pub mod request;
