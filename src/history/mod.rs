pub mod columns;
pub mod error;
mod extractor;
pub mod loader;
pub mod record;
pub mod store;
