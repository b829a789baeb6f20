//! Options schema types
//!
//! The JSON-schema document returned as `additional_options_schema`. The
//! set of properties is fixed; only each property's `default` changes
//! between calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// JSON-schema primitive types used by the options schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Boolean,
    Array,
    String,
    Integer,
}

/// Configurable options understood by the account collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    TrustingOrganization,
    ExcludeProjects,
    ExcludeFolders,
    StartDepth,
    IncludeLocationFromDepth,
}

impl OptionKey {
    /// All options, in schema order
    pub const ALL: [OptionKey; 5] = [
        OptionKey::TrustingOrganization,
        OptionKey::ExcludeProjects,
        OptionKey::ExcludeFolders,
        OptionKey::StartDepth,
        OptionKey::IncludeLocationFromDepth,
    ];

    /// Key as it appears in the options mapping
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::TrustingOrganization => "trusting_organization",
            OptionKey::ExcludeProjects => "exclude_projects",
            OptionKey::ExcludeFolders => "exclude_folders",
            OptionKey::StartDepth => "start_depth",
            OptionKey::IncludeLocationFromDepth => "include_location_from_depth",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item type of an array property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsSchema {
    #[serde(rename = "type")]
    pub item_type: SchemaType,
}

/// Schema of a single option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Display title
    pub title: String,

    /// Value type
    #[serde(rename = "type")]
    pub value_type: SchemaType,

    /// Element type for arrays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsSchema>,

    /// Default value shown to the user
    pub default: Value,

    /// Lower bound for integers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<u64>,

    /// Help text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertySchema {
    /// Boolean property
    pub fn boolean(title: impl Into<String>, default: bool) -> Self {
        Self {
            title: title.into(),
            value_type: SchemaType::Boolean,
            items: None,
            default: Value::Bool(default),
            minimum: None,
            description: None,
        }
    }

    /// Array-of-strings property with an empty default
    pub fn string_array(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value_type: SchemaType::Array,
            items: Some(ItemsSchema {
                item_type: SchemaType::String,
            }),
            default: Value::Array(Vec::new()),
            minimum: None,
            description: None,
        }
    }

    /// Non-negative integer property
    pub fn non_negative_integer(title: impl Into<String>, default: u64) -> Self {
        Self {
            title: title.into(),
            value_type: SchemaType::Integer,
            items: None,
            default: Value::from(default),
            minimum: Some(0),
            description: None,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Same property with `default` ignored
    ///
    /// Two schemas with equal shapes differ at most in their defaults.
    pub fn shape(&self) -> PropertySchema {
        PropertySchema {
            default: Value::Null,
            ..self.clone()
        }
    }
}

/// Properties of the options schema
///
/// Field order is the serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionProperties {
    pub trusting_organization: PropertySchema,
    pub exclude_projects: PropertySchema,
    pub exclude_folders: PropertySchema,
    pub start_depth: PropertySchema,
    pub include_location_from_depth: PropertySchema,
}

impl OptionProperties {
    /// Property for an option
    pub fn get(&self, key: OptionKey) -> &PropertySchema {
        match key {
            OptionKey::TrustingOrganization => &self.trusting_organization,
            OptionKey::ExcludeProjects => &self.exclude_projects,
            OptionKey::ExcludeFolders => &self.exclude_folders,
            OptionKey::StartDepth => &self.start_depth,
            OptionKey::IncludeLocationFromDepth => &self.include_location_from_depth,
        }
    }

    /// Mutable property for an option
    pub fn get_mut(&mut self, key: OptionKey) -> &mut PropertySchema {
        match key {
            OptionKey::TrustingOrganization => &mut self.trusting_organization,
            OptionKey::ExcludeProjects => &mut self.exclude_projects,
            OptionKey::ExcludeFolders => &mut self.exclude_folders,
            OptionKey::StartDepth => &mut self.start_depth,
            OptionKey::IncludeLocationFromDepth => &mut self.include_location_from_depth,
        }
    }

    /// Iterate properties in schema order
    pub fn iter(&self) -> impl Iterator<Item = (OptionKey, &PropertySchema)> {
        OptionKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}

/// The `additional_options_schema` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    pub properties: OptionProperties,
}

impl OptionsSchema {
    /// Default value currently advertised for an option
    pub fn default_of(&self, key: OptionKey) -> &Value {
        &self.properties.get(key).default
    }

    /// Schema with every default erased, for shape comparisons
    pub fn shape(&self) -> Vec<(OptionKey, PropertySchema)> {
        self.properties
            .iter()
            .map(|(key, property)| (key, property.shape()))
            .collect()
    }
}
