//! Slug generation.
//!
//! A slug is derived from a posting's title (joined with its organization for
//! admit cards and results), then made unique by checking the store and
//! appending `-2`, `-3`, … until a free value is found.
//!
//! The check is a read followed by a later write, so two concurrent saves can
//! pick the same slug. The `posts_slug_key` unique index is the authority;
//! callers treat a violation at write time as "try the next suffix" (see
//! [`crate::content::PostService`]).

use anyhow::{Result, bail};
use async_trait::async_trait;
use uuid::Uuid;

/// Maximum slug length in bytes.
pub const MAX_SLUG_LEN: usize = 128;

/// Upper bound on numbered suffixes before giving up.
const MAX_SUFFIX: u32 = 10_000;

/// Lookup used to check slug availability.
#[async_trait]
pub trait SlugIndex: Send + Sync {
    /// Whether `slug` is used by any record other than `exclude`.
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool>;
}

/// Convert text into a URL-safe slug.
///
/// Lowercases, maps everything outside `[a-z0-9]` to a separator, collapses
/// separator runs into a single hyphen and trims hyphens at both ends.
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !result.is_empty() {
                result.push('-');
            }
            pending_hyphen = false;
            result.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if result.len() > MAX_SLUG_LEN {
        // Pure ASCII at this point, so every index is a char boundary.
        let truncated = &result[..MAX_SLUG_LEN];
        let cut = truncated.rfind('-').unwrap_or(MAX_SLUG_LEN);
        result.truncate(cut);
    }

    result
}

/// Base slug for a posting: `title-organization`, or just the title.
pub fn base_slug(title: &str, organization: Option<&str>) -> String {
    match organization.map(str::trim).filter(|o| !o.is_empty()) {
        Some(org) => slugify(&format!("{title}-{org}")),
        None => slugify(title),
    }
}

/// Candidate slug for attempt `n` (1 is the bare base).
pub fn candidate(base: &str, n: u32) -> String {
    if n <= 1 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}

/// Find the first free candidate at or after attempt `start`.
///
/// Returns the slug together with its attempt number so a caller that loses
/// a write race can resume the search at `n + 1`.
pub async fn next_free<I>(
    index: &I,
    base: &str,
    start: u32,
    exclude: Option<Uuid>,
) -> Result<(String, u32)>
where
    I: SlugIndex + ?Sized,
{
    let mut n = start.max(1);
    while n <= MAX_SUFFIX {
        let slug = candidate(base, n);
        if !index.slug_exists(&slug, exclude).await? {
            return Ok((slug, n));
        }
        n += 1;
    }

    bail!("no free slug for {base:?} after {MAX_SUFFIX} candidates")
}

/// Find the first free slug for `base`, ignoring the record `exclude`.
pub async fn unique_slug<I>(index: &I, base: &str, exclude: Option<Uuid>) -> Result<String>
where
    I: SlugIndex + ?Sized,
{
    next_free(index, base, 1, exclude)
        .await
        .map(|(slug, _)| slug)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Slugs owned by record ids.
    struct FixedIndex(HashMap<String, Uuid>);

    impl FixedIndex {
        fn with(slugs: &[(&str, Uuid)]) -> Self {
            Self(slugs.iter().map(|(s, id)| (s.to_string(), *id)).collect())
        }
    }

    #[async_trait]
    impl SlugIndex for FixedIndex {
        async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
            Ok(self
                .0
                .get(slug)
                .is_some_and(|owner| Some(*owner) != exclude))
        }
    }

    struct BrokenIndex;

    #[async_trait]
    impl SlugIndex for BrokenIndex {
        async fn slug_exists(&self, _slug: &str, _exclude: Option<Uuid>) -> Result<bool> {
            bail!("database unavailable")
        }
    }

    fn is_clean(slug: &str) -> bool {
        slug.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("SSC CGL 2024"), "ssc-cgl-2024");
        assert_eq!(slugify("Railway Group-D Result"), "railway-group-d-result");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("UPSC (Prelims) 2025: Notice!"), "upsc-prelims-2025-notice");
        assert_eq!(slugify("IBPS PO/MT-XIV"), "ibps-po-mt-xiv");
        assert_eq!(slugify("What's New?"), "what-s-new");
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("  --hello   world--  "), "hello-world");
        assert_eq!(slugify("a___b...c"), "a-b-c");
    }

    #[test]
    fn slugify_non_ascii_only_is_empty() {
        assert_eq!(slugify("भर्ती"), "");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn slugify_output_is_always_clean() {
        let samples = [
            "SSC CGL 2024",
            "  Bihar Police Constable (Advt. No. 01/2025)  ",
            "Ünïcödé Tïtlé — 2025",
            "100% Marks!!!",
            "a - b - c",
            "ALL CAPS TITLE",
            "tabs\tand\nnewlines",
        ];
        for sample in samples {
            let slug = slugify(sample);
            assert!(is_clean(&slug), "{sample:?} produced {slug:?}");
        }
    }

    #[test]
    fn slugify_truncates_at_word_boundary() {
        let long_title = "word ".repeat(60);
        let slug = slugify(&long_title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(slug.ends_with("word"));
        assert!(is_clean(&slug));
    }

    #[test]
    fn base_slug_joins_organization_when_given() {
        assert_eq!(
            base_slug("CGL 2024", Some("Staff Selection Commission")),
            "cgl-2024-staff-selection-commission"
        );
        assert_eq!(base_slug("SSC CGL 2024", None), "ssc-cgl-2024");
        assert_eq!(base_slug("SSC CGL 2024", Some("   ")), "ssc-cgl-2024");
    }

    #[test]
    fn candidates_start_at_two() {
        assert_eq!(candidate("ssc-cgl-2024", 1), "ssc-cgl-2024");
        assert_eq!(candidate("ssc-cgl-2024", 2), "ssc-cgl-2024-2");
        assert_eq!(candidate("ssc-cgl-2024", 3), "ssc-cgl-2024-3");
    }

    #[tokio::test]
    async fn unique_slug_free_base() {
        let index = FixedIndex::with(&[]);
        let slug = unique_slug(&index, "ssc-cgl-2024", None).await.unwrap();
        assert_eq!(slug, "ssc-cgl-2024");
    }

    #[tokio::test]
    async fn unique_slug_second_and_third_collision() {
        let index = FixedIndex::with(&[("ssc-cgl-2024", Uuid::now_v7())]);
        assert_eq!(
            unique_slug(&index, "ssc-cgl-2024", None).await.unwrap(),
            "ssc-cgl-2024-2"
        );

        let index = FixedIndex::with(&[
            ("ssc-cgl-2024", Uuid::now_v7()),
            ("ssc-cgl-2024-2", Uuid::now_v7()),
        ]);
        assert_eq!(
            unique_slug(&index, "ssc-cgl-2024", None).await.unwrap(),
            "ssc-cgl-2024-3"
        );
    }

    #[tokio::test]
    async fn unique_slug_ignores_own_record() {
        let own = Uuid::now_v7();
        let index = FixedIndex::with(&[("ssc-cgl-2024", own)]);
        assert_eq!(
            unique_slug(&index, "ssc-cgl-2024", Some(own)).await.unwrap(),
            "ssc-cgl-2024"
        );
    }

    #[tokio::test]
    async fn next_free_resumes_after_lost_race() {
        let index = FixedIndex::with(&[]);
        let (slug, n) = next_free(&index, "result", 3, None).await.unwrap();
        assert_eq!((slug.as_str(), n), ("result-3", 3));
    }

    #[tokio::test]
    async fn unique_slug_propagates_store_errors() {
        let err = unique_slug(&BrokenIndex, "ssc", None).await.unwrap_err();
        assert!(err.to_string().contains("database unavailable"));
    }
}
