use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

use crate::CodecError;
use crate::describe::short_name;

/// Upper bound for capacities preallocated from lengths read off the wire.
const PREALLOCATION_LIMIT: usize = 4096;

// -----------------------------------------------------------------------------
// FieldNaming

/// How declared field names map to external names.
///
/// `#[codec(rename = "...")]` bypasses the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNaming {
    /// Use the name as declared.
    #[default]
    Declared,
    /// `field_name` becomes `fieldName`.
    CamelCase,
    /// `field_name` becomes `FieldName`.
    PascalCase,
    /// `field_name` becomes `field-name`.
    KebabCase,
    /// `field_name` becomes `FIELD_NAME`.
    ScreamingSnakeCase,
}

impl FieldNaming {
    /// Applies the policy to a declared name.
    ///
    /// ```
    /// use vc_codec::FieldNaming;
    ///
    /// assert_eq!(FieldNaming::CamelCase.apply("map_str_val"), "mapStrVal");
    /// assert_eq!(FieldNaming::Declared.apply("map_str_val"), "map_str_val");
    /// ```
    pub fn apply(self, declared: &str) -> String {
        match self {
            FieldNaming::Declared => declared.to_owned(),
            FieldNaming::CamelCase => declared.to_lower_camel_case(),
            FieldNaming::PascalCase => declared.to_upper_camel_case(),
            FieldNaming::KebabCase => declared.to_kebab_case(),
            FieldNaming::ScreamingSnakeCase => declared.to_shouty_snake_case(),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeNaming

/// How a subtype is named in a type tag unless registered with an alias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNaming {
    /// The full type path, e.g. `shapes::Circle`.
    #[default]
    Path,
    /// The path with module segments stripped, e.g. `Circle`.
    Name,
}

impl TypeNaming {
    /// Returns the tag name of a type path.
    pub fn apply(self, path: &str) -> String {
        match self {
            TypeNaming::Path => path.to_owned(),
            TypeNaming::Name => short_name(path),
        }
    }
}

// -----------------------------------------------------------------------------
// Config

/// Options shared by every codec of one [`CodecCore`](crate::CodecCore).
///
/// The value is frozen when the core is built. It implements serde's traits
/// so it can be loaded from any configuration file; missing keys take their
/// defaults.
///
/// ```
/// use vc_codec::{Config, FieldNaming};
///
/// let config: Config = serde_json::from_str(r#"{
///     "allowed_packages": ["shapes"],
///     "field_naming": "camel_case"
/// }"#).unwrap();
///
/// assert_eq!(config.field_naming, FieldNaming::CamelCase);
/// assert!(config.fail_on_unrecognised_fields);
/// assert!(config.is_allowed("shapes::Circle"));
/// assert!(!config.is_allowed("shapes_extra::Circle"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module paths whose types may be instantiated from a type tag.
    ///
    /// An empty list allows every registered subtype.
    pub allowed_packages: Vec<String>,
    /// Mapping from declared to external field names.
    pub field_naming: FieldNaming,
    /// Reject objects that contain fields the type does not declare.
    ///
    /// When disabled such fields are skipped.
    pub fail_on_unrecognised_fields: bool,
    /// Reject objects that do not carry every declared field.
    ///
    /// Formats that report [`exact_fields`](crate::format::Capabilities::exact_fields)
    /// get this check regardless of the flag.
    pub require_exact_fields: bool,
    /// Initial capacity of decoded containers whose length is not known up front.
    pub default_array_size: usize,
    /// Field name of the key in a map entry object.
    pub map_key_field: String,
    /// Field name of the value in a map entry object.
    pub map_value_field: String,
    /// Record the runtime type of trait-object values that differ from the
    /// default subtype.
    pub dynamic_types: bool,
    /// Tag naming of subtypes registered without an alias.
    pub type_naming: TypeNaming,
    /// Prefix added to a field name that collides with a name claimed by the
    /// parent object.
    pub shadow_marker: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_packages: Vec::new(),
            field_naming: FieldNaming::Declared,
            fail_on_unrecognised_fields: true,
            require_exact_fields: false,
            default_array_size: 16,
            map_key_field: "key".to_owned(),
            map_value_field: "value".to_owned(),
            dynamic_types: true,
            type_naming: TypeNaming::Path,
            shadow_marker: '_',
        }
    }
}

impl Config {
    /// Adds a module path to [`Config::allowed_packages`].
    #[inline]
    pub fn allow_package(mut self, package: impl Into<String>) -> Self {
        self.allowed_packages.push(package.into());
        self
    }

    #[inline]
    pub fn with_field_naming(mut self, naming: FieldNaming) -> Self {
        self.field_naming = naming;
        self
    }

    #[inline]
    pub fn with_fail_on_unrecognised_fields(mut self, enabled: bool) -> Self {
        self.fail_on_unrecognised_fields = enabled;
        self
    }

    #[inline]
    pub fn with_require_exact_fields(mut self, enabled: bool) -> Self {
        self.require_exact_fields = enabled;
        self
    }

    #[inline]
    pub fn with_dynamic_types(mut self, enabled: bool) -> Self {
        self.dynamic_types = enabled;
        self
    }

    #[inline]
    pub fn with_type_naming(mut self, naming: TypeNaming) -> Self {
        self.type_naming = naming;
        self
    }

    #[inline]
    pub fn with_map_fields(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.map_key_field = key.into();
        self.map_value_field = value.into();
        self
    }

    /// Returns `true` if a type path lies inside one of the allowed packages.
    ///
    /// A package matches itself and everything below it at a `::` boundary,
    /// so `shapes` allows `shapes::Circle` but not `shapes_extra::Circle`.
    pub fn is_allowed(&self, path: &str) -> bool {
        if self.allowed_packages.is_empty() {
            return true;
        }

        self.allowed_packages.iter().any(|package| {
            let package = package.trim_end_matches("::");
            match path.strip_prefix(package) {
                Some(rest) => rest.is_empty() || rest.starts_with("::"),
                None => false,
            }
        })
    }

    /// Capacity to preallocate for a container of `reported` elements.
    #[inline]
    pub fn capacity_hint(&self, reported: Option<usize>) -> usize {
        reported
            .unwrap_or(self.default_array_size)
            .min(PREALLOCATION_LIMIT)
    }

    /// Checks the options for contradictions.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.map_key_field.is_empty() || self.map_value_field.is_empty() {
            return Err(CodecError::InvalidConfig(
                "map entry field names must not be empty".to_owned(),
            ));
        }
        if self.map_key_field == self.map_value_field {
            return Err(CodecError::InvalidConfig(alloc::format!(
                "map key and value share the field name `{}`",
                self.map_key_field
            )));
        }
        if self.default_array_size == 0 {
            return Err(CodecError::InvalidConfig(
                "default array size must be positive".to_owned(),
            ));
        }
        if self.shadow_marker.is_whitespace() {
            return Err(CodecError::InvalidConfig(
                "the shadow marker must be visible".to_owned(),
            ));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Config, FieldNaming, TypeNaming};

    #[test]
    fn field_naming() {
        assert_eq!(FieldNaming::PascalCase.apply("list_val"), "ListVal");
        assert_eq!(FieldNaming::KebabCase.apply("list_val"), "list-val");
        assert_eq!(FieldNaming::ScreamingSnakeCase.apply("list_val"), "LIST_VAL");
    }

    #[test]
    fn type_naming() {
        assert_eq!(TypeNaming::Path.apply("shapes::Circle"), "shapes::Circle");
        assert_eq!(TypeNaming::Name.apply("shapes::Circle"), "Circle");
    }

    #[test]
    fn package_whitelist() {
        let config = Config::default();
        assert!(config.is_allowed("anything::At::All"));

        let config = Config::default().allow_package("app::model::");
        assert!(config.is_allowed("app::model"));
        assert!(config.is_allowed("app::model::user::User"));
        assert!(!config.is_allowed("app::models::User"));
        assert!(!config.is_allowed("evil::app::model::User"));
    }

    #[test]
    fn capacity_is_clamped() {
        let config = Config::default();
        assert_eq!(config.capacity_hint(None), 16);
        assert_eq!(config.capacity_hint(Some(3)), 3);
        assert_eq!(config.capacity_hint(Some(usize::MAX)), 4096);
    }

    #[test]
    fn validation() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::default().with_map_fields("k", "k").validate().is_err());

        let mut config = Config::default();
        config.default_array_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn serde_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());

        let config: Config =
            serde_json::from_str(r#"{"type_naming": "name", "dynamic_types": false}"#).unwrap();
        assert_eq!(config.type_naming, TypeNaming::Name);
        assert!(!config.dynamic_types);
    }
}
