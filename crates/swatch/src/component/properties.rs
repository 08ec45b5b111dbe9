//! Declared component properties.
//!
//! A component may describe the locals it expects with a [`PropertySchema`].
//! The schema is documentation only: nothing validates locals against it.
//!
//! Rust components declare it through [`Component::property_schema`]; template
//! components through a sidecar file next to the template, e.g.
//! `forms/input/forms_input.properties.yaml`:
//!
//! ```yaml
//! - name: label
//!   type: string
//!   required: true
//! - name: placeholder
//!   type: string
//!   default: ""
//! ```
//!
//! [`Component::property_schema`]: super::Component::property_schema

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::resolver::ComponentResolver;
use crate::error::Result;

/// One declared property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpec {
    pub name: String,

    /// Free-form type description (`string`, `bool`, `list of items`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            required: false,
            default: None,
            description: None,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered list of a component's declared properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySchema {
    properties: Vec<PropertySpec>,
}

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property, keeping declaration order.
    pub fn property(mut self, spec: PropertySpec) -> Self {
        self.properties.push(spec);
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertySpec> {
        self.properties.iter()
    }

    pub fn get(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The schema as a map keyed by property name, the shape shown in
    /// documentation.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        for spec in &self.properties {
            let mut entry = Map::new();
            if let Some(kind) = &spec.kind {
                entry.insert("type".to_string(), Value::from(kind.as_str()));
            }
            entry.insert("required".to_string(), Value::from(spec.required));
            if let Some(default) = &spec.default {
                entry.insert("default".to_string(), default.clone());
            }
            if let Some(description) = &spec.description {
                entry.insert("description".to_string(), Value::from(description.as_str()));
            }
            out.insert(spec.name.clone(), Value::Object(entry));
        }
        Value::Object(out)
    }
}

/// Looks up declared schemas by component name.
#[derive(Debug, Clone, Copy)]
pub struct PropertyIntrospector<'a> {
    resolver: &'a ComponentResolver,
}

impl<'a> PropertyIntrospector<'a> {
    pub fn new(resolver: &'a ComponentResolver) -> Self {
        Self { resolver }
    }

    /// Returns the component's schema, or `None` when it declares none.
    ///
    /// # Errors
    ///
    /// Only resolution errors; a missing schema is not an error.
    pub fn properties_of(&self, name: &str) -> Result<Option<PropertySchema>> {
        let component = self.resolver.resolve(name)?;
        Ok(component.implementation().property_schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_from_yaml_keeps_order() {
        let schema = PropertySchema::from_yaml(
            r#"
- name: label
  type: string
  required: true
- name: placeholder
  default: ""
"#,
        )
        .unwrap();

        assert_eq!(schema.len(), 2);
        let names: Vec<_> = schema.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["label", "placeholder"]);
        assert!(schema.get("label").unwrap().required);
        assert_eq!(schema.get("placeholder").unwrap().default, Some(json!("")));
    }

    #[test]
    fn test_schema_from_yaml_rejects_unknown_fields() {
        let err = PropertySchema::from_yaml("- name: x\n  kind: string\n").unwrap_err();
        assert!(matches!(err, crate::RenderError::SerializationError(_)));
    }

    #[test]
    fn test_schema_from_json() {
        let schema = PropertySchema::from_json(r#"[{"name": "title", "type": "string"}]"#).unwrap();
        assert_eq!(schema.get("title").unwrap().kind.as_deref(), Some("string"));
    }

    #[test]
    fn test_schema_to_value() {
        let schema = PropertySchema::new()
            .property(PropertySpec::new("name").kind("string").required())
            .property(PropertySpec::new("size").default_value("md").description("Button size"));

        assert_eq!(
            schema.to_value(),
            json!({
                "name": {"type": "string", "required": true},
                "size": {"required": false, "default": "md", "description": "Button size"}
            })
        );
    }
}
