pub mod cache;
pub mod data;
pub mod markdown;
pub mod schema;
pub mod settings;
