//! Database models.

pub mod category;
pub mod post;
pub mod sub_category;

pub use category::{Category, Scope, UnknownVariant};
pub use post::{Post, PostDraft, PostFilter, PostInput, PostType};
pub use sub_category::{SubCategory, SubCategoryDraft, SubCategoryInput};
