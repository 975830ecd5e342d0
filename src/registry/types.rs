//! Type definitions for the action registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Module that the built-in actions are imported from in synthesized code.
pub const DEFAULT_MODULE: &str = "automations";

/// Semantic type tag for an action parameter.
///
/// Unknown tags deserialize to `Any` rather than failing, so a registration
/// with a vocabulary we do not recognize still lands in the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ParamType {
    Str,
    Int,
    Float,
    Bool,
    List,
    Dict,
    #[default]
    Any,
}

impl From<String> for ParamType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "str" | "string" => Self::Str,
            "int" | "integer" => Self::Int,
            "float" | "number" => Self::Float,
            "bool" | "boolean" => Self::Bool,
            "list" | "array" => Self::List,
            "dict" | "object" => Self::Dict,
            _ => Self::Any,
        }
    }
}

/// Schema entry for one action parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: String,
}

impl ParameterSpec {
    /// Spec for a required parameter with a concrete type tag.
    pub fn required(param_type: ParamType, description: &str) -> Self {
        Self {
            param_type,
            required: true,
            default: None,
            description: description.to_string(),
        }
    }

    /// Spec for an optional parameter carrying a default value.
    pub fn optional(param_type: ParamType, default: Value, description: &str) -> Self {
        Self {
            param_type,
            required: false,
            default: Some(default),
            description: description.to_string(),
        }
    }
}

/// Ordered name -> spec mapping for an action's parameters.
pub type ParameterSchema = IndexMap<String, ParameterSpec>;

/// A named, described, schema-bearing record pointing to an external
/// side-effecting capability. The core never executes the capability; it only
/// emits source text referencing `module` and `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    /// Source location the synthesized import resolves against.
    pub module: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

/// One parameter as declared in a capability's published signature.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclaredParameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: Option<ParamType>,
    #[serde(default)]
    pub default: Option<Value>,
}

/// What an external provider publishes about a registrable callable.
///
/// This replaces runtime signature reflection: the provider declares its
/// identifier, source module, docstring, and call signature up front, and
/// schema inference works purely from this declaration.
#[derive(Debug, Clone)]
pub struct Capability {
    /// Intrinsic identifier of the callable.
    pub name: String,
    /// Module the callable is importable from.
    pub module: String,
    /// Intrinsic documentation string, used when no description is supplied.
    pub doc: String,
    /// Declared parameters, in declaration order.
    pub signature: Vec<DeclaredParameter>,
}
