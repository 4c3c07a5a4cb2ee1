//! ezvacancy test utilities.
//!
//! Fixture builders for posts and sub-categories in the two shapes tests
//! submit them in (admin form pairs and JSON), plus assertion helpers.

use serde_json::{Map, Value as JsonValue};

/// Create a test post with the fields its type requires.
///
/// `post_type` is the wire name (`job`, `admit-card`, `result`,
/// `answer-key`, `syllabus`).
pub fn test_post(post_type: &str, title: &str) -> TestPost {
    let post = TestPost {
        fields: vec![
            ("postType".to_string(), post_type.to_string()),
            ("title".to_string(), title.to_string()),
        ],
    };

    match post_type {
        "job" => post
            .with("organization", "Staff Selection Commission")
            .with("category", "SSC"),
        "admit-card" | "answer-key" => post.with("downloadUrl", "https://ssc.gov.in/download"),
        "result" => post.with("resultUrl", "https://ssc.gov.in/results"),
        "syllabus" => post
            .with("organization", "Staff Selection Commission")
            .with("shortInformation", "Tier 1: Reasoning, Maths, English"),
        _ => post,
    }
}

/// A post fixture as ordered form fields.
#[derive(Debug, Clone)]
pub struct TestPost {
    pub fields: Vec<(String, String)>,
}

impl TestPost {
    /// Set a field, replacing any earlier value.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.fields.retain(|(k, _)| k != name);
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    /// Remove a field.
    pub fn without(mut self, name: &str) -> Self {
        self.fields.retain(|(k, _)| k != name);
        self
    }

    pub fn in_category(self, category: &str) -> Self {
        self.with("category", category)
    }

    /// Set the post date (`YYYY-MM-DD`, as the admin date input sends it).
    pub fn posted_on(self, date: &str) -> Self {
        self.with("postDate", date)
    }

    /// Add a structured-text field from `(key, value)` rows.
    pub fn with_rows(self, name: &str, rows: &[(&str, &str)]) -> Self {
        let text = rows
            .iter()
            .map(|(k, v)| format!("{k} : {v}"))
            .collect::<Vec<_>>()
            .join("\n");
        self.with(name, &text)
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// URL-encoded admin form body, with the CSRF token first.
    pub fn form_body(&self, csrf_token: &str) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("_token", csrf_token);
        for (k, v) in &self.fields {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    /// Fields as a JSON object of strings.
    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
            .collect();
        JsonValue::Object(map)
    }
}

/// URL-encoded sub-category form body.
pub fn sub_category_form(category: &str, name: &str, slug: &str, csrf_token: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("_token", csrf_token)
        .append_pair("category", category)
        .append_pair("name", name)
        .append_pair("slug", slug)
        .finish()
}

/// URL-encoded login form body.
pub fn login_form(email: &str, password: &str, csrf_token: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("_token", csrf_token)
        .append_pair("email", email)
        .append_pair("password", password)
        .finish()
}

/// Pull the value of the first hidden `_token` input out of an HTML page.
pub fn csrf_token_in(html: &str) -> Option<String> {
    let marker = r#"name="_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON array lists titles in this order.
    pub fn titles_in_order(value: &Value, expected: &[&str]) {
        let titles: Vec<&str> = value
            .as_array()
            .map(|items| items.iter().filter_map(|p| p["title"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(titles, expected, "unexpected titles in {value}");
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}
