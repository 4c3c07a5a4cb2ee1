//! Admin forms: resource descriptors, the request pipeline and CSRF tokens.

pub mod csrf;
pub mod pipeline;
pub mod resource;

pub use csrf::{CSRF_FIELD, generate_csrf_token, verify_csrf_token};
pub use pipeline::{Action, Params, Pipeline, params_from_form};
pub use resource::{FieldView, POSTS, Property, PropertyKind, Resource, SUB_CATEGORIES};
