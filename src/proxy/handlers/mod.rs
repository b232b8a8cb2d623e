pub mod errors;
pub mod extract;
pub mod image;
pub mod prompt_engine;
pub mod scrape;
pub mod summary;
