//! # API Documentation
//!
//! Builds an OpenAPI 3.0 document from the annotations routes were
//! registered with, and renders the Swagger UI page that browses it.
//!
//! Annotations live next to route registration ([`RouteDoc`]); the document
//! is assembled once, after every route is known (see
//! `Server::mount_docs`).

use crate::route::RouteInfo;
use crate::types::FieldType;
use crate::validation::{Location, Validator};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Document-level metadata
#[derive(Debug, Clone, Serialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Info {
    /// Create document info
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
        }
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One documented parameter or body property
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDoc {
    /// Field name
    pub name: String,
    /// Where the field is sent
    pub location: Location,
    /// Declared type
    pub field_type: FieldType,
    /// Whether the field must be present
    pub required: bool,
    /// Example value
    pub example: Option<Value>,
}

impl FieldDoc {
    fn schema(&self) -> Value {
        let mut schema = Map::new();
        match self.field_type {
            FieldType::Int => {
                schema.insert("type".into(), json!("integer"));
                schema.insert("format".into(), json!("int64"));
            }
            FieldType::Alpha => {
                schema.insert("type".into(), json!("string"));
                schema.insert("pattern".into(), json!("^[A-Za-z]+$"));
            }
            FieldType::Text => {
                schema.insert("type".into(), json!("string"));
            }
        }
        if let Some(example) = &self.example {
            schema.insert("example".into(), example.clone());
        }
        Value::Object(schema)
    }
}

/// Documentation annotation for a single route
#[derive(Debug, Clone, Default)]
pub struct RouteDoc {
    summary: String,
    description: Option<String>,
    tags: Vec<String>,
    fields: Vec<FieldDoc>,
    responses: Vec<(u16, String)>,
}

impl RouteDoc {
    /// Start an annotation with a one-line summary
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// Longer description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Group under a tag
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Document every field a validator checks
    #[must_use]
    pub fn fields_from(mut self, validator: &Validator) -> Self {
        for chain in validator.chains() {
            self.fields.push(FieldDoc {
                name: chain.field().to_string(),
                location: chain.location(),
                field_type: chain.field_type(),
                required: chain.is_required(),
                example: None,
            });
        }
        self
    }

    /// Set an example on every documented field with this name
    #[must_use]
    pub fn example(mut self, name: &str, example: impl Into<Value>) -> Self {
        let example = example.into();
        for field in self.fields.iter_mut().filter(|f| f.name == name) {
            field.example = Some(example.clone());
        }
        self
    }

    /// Document a response status
    #[must_use]
    pub fn response(mut self, status: u16, description: impl Into<String>) -> Self {
        self.responses.push((status, description.into()));
        self
    }

    /// Documented fields
    #[must_use]
    pub fn fields(&self) -> &[FieldDoc] {
        &self.fields
    }

    fn operation(&self) -> Value {
        let mut op = Map::new();
        op.insert("summary".into(), json!(self.summary));
        if let Some(description) = &self.description {
            op.insert("description".into(), json!(description));
        }
        if !self.tags.is_empty() {
            op.insert("tags".into(), json!(self.tags));
        }

        let parameters: Vec<Value> = self
            .fields
            .iter()
            .filter(|f| f.location == Location::Query)
            .map(|f| {
                json!({
                    "name": f.name,
                    "in": "query",
                    "required": f.required,
                    "schema": f.schema(),
                })
            })
            .collect();
        if !parameters.is_empty() {
            op.insert("parameters".into(), Value::Array(parameters));
        }

        let body: Vec<&FieldDoc> = self
            .fields
            .iter()
            .filter(|f| f.location == Location::Body)
            .collect();
        if !body.is_empty() {
            let properties: Map<String, Value> =
                body.iter().map(|f| (f.name.clone(), f.schema())).collect();
            let required: Vec<&str> = body
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name.as_str())
                .collect();
            let schema = json!({
                "type": "object",
                "properties": properties,
                "required": required,
            });
            op.insert(
                "requestBody".into(),
                json!({
                    "required": true,
                    "content": {
                        "application/json": { "schema": schema },
                        "application/x-www-form-urlencoded": { "schema": schema },
                    }
                }),
            );
        }

        let responses: Map<String, Value> = self
            .responses
            .iter()
            .map(|(status, description)| {
                (status.to_string(), json!({ "description": description }))
            })
            .collect();
        op.insert("responses".into(), Value::Object(responses));

        Value::Object(op)
    }
}

/// OpenAPI document builder
#[derive(Debug, Clone)]
pub struct ApiDoc {
    info: Info,
}

impl ApiDoc {
    /// Create a builder with document info
    #[must_use]
    pub const fn new(info: Info) -> Self {
        Self { info }
    }

    /// Build the OpenAPI document for the annotated routes
    ///
    /// Routes without an annotation are left out.
    #[must_use]
    pub fn document(&self, routes: &[RouteInfo]) -> Value {
        let mut paths: Map<String, Value> = Map::new();

        for route in routes {
            let Some(doc) = &route.doc else {
                continue;
            };
            let item = paths
                .entry(route.path_pattern.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(item) = item {
                item.insert(route.method.as_lower().to_string(), doc.operation());
            }
        }

        json!({
            "openapi": "3.0.3",
            "info": self.info,
            "paths": paths,
        })
    }
}

/// Swagger UI page loading the document from `spec_url`
#[must_use]
pub fn swagger_ui_html(title: &str, spec_url: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{spec_url}", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>
"##
    )
}
