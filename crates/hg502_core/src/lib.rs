pub mod core_api;
pub mod decoder;
