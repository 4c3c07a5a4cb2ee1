//! Admin resource descriptors.
//!
//! Each resource lists its editable properties once; forms, list columns and
//! the request pipeline are all driven from that list.

use serde::Serialize;
use serde_json::Value;

use super::pipeline::Params;
use crate::models::SubCategory;

/// How a property is edited and transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyKind {
    Text,
    Textarea { rows: u32 },
    /// `key : value` lines in the form, an ordered mapping in storage.
    StructuredText,
    Url,
    /// `<input type="date">`, stored as a timestamp.
    Date,
    Select {
        #[serde(skip)]
        options: &'static [(&'static str, &'static str)],
    },
    /// Select filled from the sub-category table at render time.
    SubCategory,
}

#[derive(Debug, Clone, Copy)]
pub struct Property {
    /// Parameter name, matching the record's JSON field.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: PropertyKind,
    pub required: bool,
    /// Shown as a column on the list page.
    pub in_list: bool,
}

impl Property {
    const fn new(name: &'static str, label: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            in_list: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn listed(mut self) -> Self {
        self.in_list = true;
        self
    }
}

#[derive(Debug)]
pub struct Resource {
    /// Path segment under `{admin}/resources/`.
    pub id: &'static str,
    pub label: &'static str,
    /// Property whose value names a record in lists and headings.
    pub title_property: &'static str,
    pub properties: &'static [Property],
}

impl Resource {
    pub fn list_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.in_list)
    }

    /// Form fields for `params`, which should already have been through the
    /// edit pipeline.
    pub fn fields(&self, params: &Params, sub_categories: &[SubCategory]) -> Vec<FieldView> {
        self.properties
            .iter()
            .map(|property| {
                let value = params.get(property.name).map(display_value).unwrap_or_default();
                let options = match property.kind {
                    PropertyKind::Select { options } => options
                        .iter()
                        .map(|(v, l)| SelectOption::new(v, l, &value))
                        .collect(),
                    PropertyKind::SubCategory => sub_categories
                        .iter()
                        .map(|s| {
                            let label = format!("{} / {}", s.category, s.name);
                            SelectOption::new(&s.id.to_string(), &label, &value)
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                FieldView {
                    name: property.name,
                    label: property.label,
                    kind: property.kind,
                    required: property.required,
                    value,
                    options,
                }
            })
            .collect()
    }
}

/// Render-ready form field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: PropertyKind,
    pub required: bool,
    pub value: String,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: &str, label: &str, current: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: value == current,
        }
    }
}

/// Text shown for a parameter value in forms and tables.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

const POST_TYPE_OPTIONS: &[(&str, &str)] = &[
    ("job", "Job"),
    ("admit-card", "Admit card"),
    ("result", "Result"),
    ("answer-key", "Answer key"),
    ("syllabus", "Syllabus"),
];

const CATEGORY_OPTIONS: &[(&str, &str)] = &[
    ("SSC", "SSC"),
    ("Banking", "Banking"),
    ("Railway", "Railway"),
    ("Police", "Police"),
    ("Teaching", "Teaching"),
    ("UPSC", "UPSC"),
    ("Other", "Other"),
];

const SCOPE_OPTIONS: &[(&str, &str)] = &[("Central", "Central"), ("State", "State")];

pub static POSTS: Resource = Resource {
    id: "posts",
    label: "Posts",
    title_property: "title",
    properties: &[
        Property::new(
            "postType",
            "Post type",
            PropertyKind::Select {
                options: POST_TYPE_OPTIONS,
            },
        )
        .required()
        .listed(),
        Property::new("title", "Title", PropertyKind::Text)
            .required()
            .listed(),
        Property::new("organization", "Organization", PropertyKind::Text).listed(),
        Property::new(
            "category",
            "Category",
            PropertyKind::Select {
                options: CATEGORY_OPTIONS,
            },
        )
        .listed(),
        Property::new(
            "scope",
            "Scope",
            PropertyKind::Select {
                options: SCOPE_OPTIONS,
            },
        ),
        Property::new("subCategoryId", "Sub-category", PropertyKind::SubCategory),
        Property::new("postDate", "Post date", PropertyKind::Date).listed(),
        Property::new("lastDate", "Last date", PropertyKind::Date),
        Property::new("applyUrl", "Apply URL", PropertyKind::Url),
        Property::new("noticeUrl", "Notice URL", PropertyKind::Url),
        Property::new("downloadUrl", "Download URL", PropertyKind::Url),
        Property::new("resultUrl", "Result URL", PropertyKind::Url),
        Property::new(
            "shortInformation",
            "Short information",
            PropertyKind::Textarea { rows: 4 },
        ),
        Property::new("howToApply", "How to apply", PropertyKind::Textarea { rows: 6 }),
        Property::new("importantDates", "Important dates", PropertyKind::StructuredText),
        Property::new("applicationFee", "Application fee", PropertyKind::StructuredText),
        Property::new("ageLimit", "Age limit", PropertyKind::StructuredText),
        Property::new("vacancyDetails", "Vacancy details", PropertyKind::StructuredText),
        Property::new("usefulLinks", "Useful links", PropertyKind::StructuredText),
        Property::new("slug", "Slug", PropertyKind::Text).listed(),
    ],
};

pub static SUB_CATEGORIES: Resource = Resource {
    id: "sub-categories",
    label: "Sub-categories",
    title_property: "name",
    properties: &[
        Property::new(
            "category",
            "Category",
            PropertyKind::Select {
                options: CATEGORY_OPTIONS,
            },
        )
        .required()
        .listed(),
        Property::new("name", "Name", PropertyKind::Text)
            .required()
            .listed(),
        Property::new("slug", "Slug", PropertyKind::Text).listed(),
    ],
};
