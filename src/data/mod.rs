pub mod columns;
pub mod loader;
pub mod parser;
pub mod timestamp;
