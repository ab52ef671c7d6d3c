pub mod builder;
pub mod reader;
pub mod schema;
pub mod stats;
pub mod types;
