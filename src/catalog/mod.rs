// Public API - what other modules can use
pub use models::{CatalogAnime, CatalogCharacter, CharacterRole};
pub use service::{CatalogService, JikanCatalog, DEFAULT_CATALOG_BASE_URL, POPULAR_BATCH_SIZE};

// Internal modules
pub mod models;
mod service;
