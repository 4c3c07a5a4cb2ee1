//! Content module.
//!
//! - Slug generation and structured-text codec
//! - Storage traits with PostgreSQL and in-memory backends
//! - PostService: writes with slug assignment

mod memory;
mod post_service;
pub mod slug;
mod store;
pub mod structured_text;

pub use memory::MemoryStore;
pub use post_service::{MAX_SLUG_ATTEMPTS, PostService};
pub use store::{PgStore, PostStore, SlugConflict, SubCategoryStore};
