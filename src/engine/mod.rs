//! Options schema engine
//!
//! Builds the `additional_options_schema` returned by `AccountCollector.init`.

mod overrides;

pub use overrides::*;

use serde_json::{Map, Value};

use crate::contracts::*;

/// Builds the options schema and applies configured defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaBuilder;

impl SchemaBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Schema with the built-in defaults
    pub fn base_schema(&self) -> OptionsSchema {
        OptionsSchema {
            schema_type: SchemaType::Object,
            properties: OptionProperties {
                trusting_organization: PropertySchema::boolean("Trusting Organization", true),
                exclude_projects: PropertySchema::string_array("Exclude Projects")
                    .with_description("Supports Unix filename pattern matching. ex ['sys-*']"),
                exclude_folders: PropertySchema::string_array("Exclude Folders")
                    .with_description("Enter the Folder ID to exclude."),
                start_depth: PropertySchema::non_negative_integer("Start Depth", 0)
                    .with_description(
                        "Depth level to start collection from. 0=Organization, 1=First level folders, 2=Second level folders, etc.",
                    ),
                include_location_from_depth: PropertySchema::non_negative_integer(
                    "Include Location From Depth",
                    0,
                )
                .with_description(
                    "Depth level to start including folder location in project path. Must be less than or equal to start_depth. If not set, uses start_depth value.",
                ),
            },
        }
    }

    /// Options schema with configured values as defaults
    ///
    /// Override values are copied as-is. Neither their types nor the
    /// `include_location_from_depth <= start_depth` relation are checked.
    pub fn build(&self, options: &Map<String, Value>) -> OptionsSchema {
        let mut schema = self.base_schema();

        for key in OptionKey::ALL {
            if let Some(value) = override_for(options, key) {
                tracing::debug!(option = %key, "Overriding option default");
                schema.properties.get_mut(key).default = value.clone();
            }
        }

        schema
    }

    /// Metadata for `AccountCollector.init`
    pub fn build_init_metadata(&self, options: &Map<String, Value>) -> InitMetadata {
        InitMetadata {
            additional_options_schema: self.build(options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_base_defaults() {
        let schema = SchemaBuilder::new().build(&Map::new());

        assert_eq!(schema.default_of(OptionKey::TrustingOrganization), &json!(true));
        assert_eq!(schema.default_of(OptionKey::ExcludeProjects), &json!([]));
        assert_eq!(schema.default_of(OptionKey::ExcludeFolders), &json!([]));
        assert_eq!(schema.default_of(OptionKey::StartDepth), &json!(0));
        assert_eq!(schema.default_of(OptionKey::IncludeLocationFromDepth), &json!(0));
    }

    #[test]
    fn test_serialized_document() {
        let metadata = SchemaBuilder::new().build_init_metadata(&Map::new());
        let value = serde_json::to_value(&metadata).unwrap();
        let schema = &value["additional_options_schema"];

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"].as_object().unwrap().len(), 5);
        assert_eq!(
            schema["properties"]["start_depth"],
            json!({
                "title": "Start Depth",
                "type": "integer",
                "default": 0,
                "minimum": 0,
                "description": "Depth level to start collection from. 0=Organization, 1=First level folders, 2=Second level folders, etc."
            })
        );
        assert_eq!(
            schema["properties"]["exclude_projects"]["description"],
            "Supports Unix filename pattern matching. ex ['sys-*']"
        );
    }

    #[test]
    fn test_truthy_override_applies() {
        let schema = SchemaBuilder::new().build(&options(json!({
            "start_depth": 3,
            "exclude_folders": ["folders/123"]
        })));

        assert_eq!(schema.default_of(OptionKey::StartDepth), &json!(3));
        assert_eq!(schema.default_of(OptionKey::ExcludeFolders), &json!(["folders/123"]));
        assert_eq!(schema.default_of(OptionKey::TrustingOrganization), &json!(true));
    }

    #[test]
    fn test_falsy_override_ignored() {
        let schema = SchemaBuilder::new().build(&options(json!({
            "trusting_organization": false,
            "start_depth": 0,
            "exclude_projects": []
        })));

        assert_eq!(schema.default_of(OptionKey::TrustingOrganization), &json!(true));
        assert_eq!(schema.default_of(OptionKey::StartDepth), &json!(0));
        assert_eq!(schema.default_of(OptionKey::ExcludeProjects), &json!([]));
    }

    #[test]
    fn test_override_value_not_type_checked() {
        let schema = SchemaBuilder::new().build(&options(json!({
            "start_depth": "deep",
            "include_location_from_depth": 9
        })));

        assert_eq!(schema.default_of(OptionKey::StartDepth), &json!("deep"));
        assert_eq!(schema.default_of(OptionKey::IncludeLocationFromDepth), &json!(9));
    }

    #[test]
    fn test_unknown_options_ignored() {
        let builder = SchemaBuilder::new();
        let schema = builder.build(&options(json!({"region": "asia-northeast3"})));
        assert_eq!(schema, builder.base_schema());
    }
}
