pub mod analyzers;
pub mod config;
pub mod error;
pub mod gradebook;
pub mod output;
pub mod parser;
pub mod schema;
