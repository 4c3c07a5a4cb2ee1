//! Admin request pipeline.
//!
//! Submissions and record views pass through an ordered list of named steps
//! chosen by action. Each step rewrites the parameter map in place using the
//! resource's property descriptors.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::resource::{PropertyKind, Resource};
use crate::content::structured_text::{decode_value, encode_value};

/// Record parameters keyed by property name.
pub type Params = Map<String, Value>;

/// Admin action being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Show,
    Edit,
}

/// One named transform.
#[derive(Clone, Copy)]
pub struct Step {
    pub name: &'static str,
    apply: fn(&mut Params, &Resource),
}

const STRIP_CONTROLS: Step = Step {
    name: "strip_controls",
    apply: strip_controls,
};
const BLANK_TO_NULL: Step = Step {
    name: "blank_to_null",
    apply: blank_to_null,
};
const PARSE_DATES: Step = Step {
    name: "parse_dates",
    apply: parse_dates,
};
const ENCODE_STRUCTURED: Step = Step {
    name: "encode_structured",
    apply: encode_structured,
};
const DECODE_STRUCTURED: Step = Step {
    name: "decode_structured",
    apply: decode_structured,
};
const FORMAT_DATES: Step = Step {
    name: "format_dates",
    apply: format_dates,
};

/// Steps bound to a resource.
pub struct Pipeline<'r> {
    resource: &'r Resource,
    steps: &'static [Step],
}

impl<'r> Pipeline<'r> {
    pub fn for_action(resource: &'r Resource, action: Action) -> Self {
        let steps: &'static [Step] = match action {
            Action::Create | Action::Update => {
                &[STRIP_CONTROLS, BLANK_TO_NULL, PARSE_DATES, ENCODE_STRUCTURED]
            }
            Action::Show | Action::Edit => &[DECODE_STRUCTURED, FORMAT_DATES],
        };
        Self { resource, steps }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    pub fn run(&self, mut params: Params) -> Params {
        for step in self.steps {
            (step.apply)(&mut params, self.resource);
        }
        params
    }
}

/// Build parameters from submitted form pairs. A repeated name keeps its
/// last value.
pub fn params_from_form(pairs: Vec<(String, String)>) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

fn names_of(resource: &Resource, wanted: fn(&PropertyKind) -> bool) -> Vec<&'static str> {
    resource
        .properties
        .iter()
        .filter(|p| wanted(&p.kind))
        .map(|p| p.name)
        .collect()
}

/// Drop form controls such as `_token`.
fn strip_controls(params: &mut Params, _resource: &Resource) {
    params.retain(|key, _| !key.starts_with('_'));
}

fn blank_to_null(params: &mut Params, _resource: &Resource) {
    for value in params.values_mut() {
        if let Value::String(s) = value {
            let trimmed = s.trim();
            *value = if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            };
        }
    }
}

/// `YYYY-MM-DD` becomes midnight UTC in RFC 3339. Anything else is left for
/// validation to reject.
fn parse_dates(params: &mut Params, resource: &Resource) {
    for name in names_of(resource, |k| matches!(k, PropertyKind::Date)) {
        let Some(Value::String(raw)) = params.get(name) else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            let ts = date.and_time(NaiveTime::MIN).and_utc();
            params.insert(
                name.to_string(),
                Value::String(ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
    }
}

fn encode_structured(params: &mut Params, resource: &Resource) {
    for name in names_of(resource, |k| matches!(k, PropertyKind::StructuredText)) {
        let encoded = params.get(name).map(encode_value).unwrap_or_default();
        let object: Map<String, Value> = encoded
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        params.insert(name.to_string(), Value::Object(object));
    }
}

fn decode_structured(params: &mut Params, resource: &Resource) {
    for name in names_of(resource, |k| matches!(k, PropertyKind::StructuredText)) {
        let text = params.get(name).map(decode_value).unwrap_or_default();
        params.insert(name.to_string(), Value::String(text));
    }
}

/// Timestamps become `YYYY-MM-DD` for date inputs.
fn format_dates(params: &mut Params, resource: &Resource) {
    for name in names_of(resource, |k| matches!(k, PropertyKind::Date)) {
        let Some(Value::String(raw)) = params.get(name) else {
            continue;
        };
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            let day = ts.with_timezone(&Utc).format("%Y-%m-%d").to_string();
            params.insert(name.to_string(), Value::String(day));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::form::resource::{POSTS, SUB_CATEGORIES};
    use crate::models::PostInput;
    use serde_json::json;

    fn submitted(pairs: &[(&str, &str)]) -> Params {
        params_from_form(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn steps_per_action() {
        assert_eq!(
            Pipeline::for_action(&POSTS, Action::Create).step_names(),
            ["strip_controls", "blank_to_null", "parse_dates", "encode_structured"]
        );
        assert_eq!(
            Pipeline::for_action(&POSTS, Action::Update).step_names(),
            Pipeline::for_action(&POSTS, Action::Create).step_names()
        );
        assert_eq!(
            Pipeline::for_action(&POSTS, Action::Edit).step_names(),
            ["decode_structured", "format_dates"]
        );
        assert_eq!(
            Pipeline::for_action(&POSTS, Action::Show).step_names(),
            ["decode_structured", "format_dates"]
        );
    }

    #[test]
    fn create_normalises_submission() {
        let params = submitted(&[
            ("_token", "abc"),
            ("postType", "job"),
            ("title", "  SSC CGL 2024  "),
            ("organization", "   "),
            ("postDate", "2025-01-12"),
            ("importantDates", "Exam Date : 12 Jan 2025\r\nAdmit Card : 1 Jan 2025"),
            ("applicationFee", ""),
        ]);

        let out = Pipeline::for_action(&POSTS, Action::Create).run(params);

        assert!(!out.contains_key("_token"));
        assert_eq!(out["title"], "SSC CGL 2024");
        assert_eq!(out["organization"], Value::Null);
        assert_eq!(out["postDate"], "2025-01-12T00:00:00Z");
        assert_eq!(
            out["importantDates"],
            json!({"Exam Date": "12 Jan 2025", "Admit Card": "1 Jan 2025"})
        );
        let keys: Vec<_> = out["importantDates"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["Exam Date", "Admit Card"]);
        assert_eq!(out["applicationFee"], json!({}));
        // Absent structured fields are filled with empty mappings.
        assert_eq!(out["usefulLinks"], json!({}));
    }

    #[test]
    fn invalid_date_left_for_validation() {
        let params = submitted(&[("postDate", "12/01/2025")]);
        let out = Pipeline::for_action(&POSTS, Action::Create).run(params);
        assert_eq!(out["postDate"], "12/01/2025");
    }

    #[test]
    fn create_output_deserialises_into_post_input() {
        let params = submitted(&[
            ("postType", "admit-card"),
            ("title", "SSC GD Admit Card"),
            ("downloadUrl", "https://ssc.gov.in/gd.pdf"),
            ("lastDate", "2025-02-01"),
            ("vacancyDetails", "GD : 39481"),
        ]);
        let out = Pipeline::for_action(&POSTS, Action::Create).run(params);
        let input: PostInput = serde_json::from_value(Value::Object(out)).unwrap();
        let draft = input.into_draft().unwrap();
        assert_eq!(draft.vacancy_details["GD"], "39481");
        assert_eq!(
            draft.last_date.unwrap().format("%Y-%m-%d").to_string(),
            "2025-02-01"
        );
    }

    #[test]
    fn edit_renders_stored_record() {
        let mut params = Params::new();
        params.insert("title".into(), json!("SSC CGL 2024"));
        params.insert("postDate".into(), json!("2025-01-12T00:00:00Z"));
        params.insert("lastDate".into(), Value::Null);
        params.insert("importantDates".into(), json!({"Fee": "500", "Age": "18-27"}));
        params.insert("usefulLinks".into(), json!({}));

        let out = Pipeline::for_action(&POSTS, Action::Edit).run(params);

        assert_eq!(out["postDate"], "2025-01-12");
        assert_eq!(out["lastDate"], Value::Null);
        assert_eq!(out["importantDates"], "Fee : 500\nAge : 18-27");
        assert_eq!(out["usefulLinks"], "");
        assert_eq!(out["title"], "SSC CGL 2024");
    }

    #[test]
    fn edit_then_create_round_trips_structured_fields() {
        let mut stored = Params::new();
        stored.insert("importantDates".into(), json!({"Begin": "1 Jan", "End": "31 Jan"}));

        let shown = Pipeline::for_action(&POSTS, Action::Edit).run(stored.clone());
        let saved = Pipeline::for_action(&POSTS, Action::Update).run(shown);
        assert_eq!(saved["importantDates"], stored["importantDates"]);
    }

    #[test]
    fn resources_without_structured_fields_pass_through() {
        let params = submitted(&[("_token", "t"), ("category", "SSC"), ("name", " CGL ")]);
        let out = Pipeline::for_action(&SUB_CATEGORIES, Action::Create).run(params);
        assert_eq!(out.len(), 2);
        assert_eq!(out["name"], "CGL");
    }
}
