//! Posting categories and scopes.
//!
//! Categories are a closed set. Each has a display label and a URL slug used
//! by the `/api/category/{slug}` and `/api/subcategories/{slug}` routes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string names no known variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Recruitment category of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "post_category")]
pub enum Category {
    #[serde(rename = "SSC")]
    #[sqlx(rename = "SSC")]
    Ssc,
    Banking,
    Railway,
    Police,
    Teaching,
    #[serde(rename = "UPSC")]
    #[sqlx(rename = "UPSC")]
    Upsc,
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 7] = [
        Category::Ssc,
        Category::Banking,
        Category::Railway,
        Category::Police,
        Category::Teaching,
        Category::Upsc,
        Category::Other,
    ];

    /// Stored value, e.g. `SSC`.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ssc => "SSC",
            Category::Banking => "Banking",
            Category::Railway => "Railway",
            Category::Police => "Police",
            Category::Teaching => "Teaching",
            Category::Upsc => "UPSC",
            Category::Other => "Other",
        }
    }

    /// URL slug, e.g. `ssc`.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Ssc => "ssc",
            Category::Banking => "banking",
            Category::Railway => "railway",
            Category::Police => "police",
            Category::Teaching => "teaching",
            Category::Upsc => "upsc",
            Category::Other => "other",
        }
    }

    /// Look a category up by its slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the stored value or the slug, case-insensitively.
impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.as_str().eq_ignore_ascii_case(needle) || c.slug().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Whether a job is a central or state government vacancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "post_scope")]
pub enum Scope {
    Central,
    State,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Central, Scope::State];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Central => "Central",
            Scope::State => "State",
        }
    }
}
