//! Action registry: the catalog of named, parameterized actions.
//!
//! The registry is composed of an immutable built-in set populated at process
//! start and a mutable custom set fed by registration calls. The effective
//! view merges custom over built-in on name collision; entries are never
//! removed for the process lifetime.

pub mod builtin;
pub mod types;

pub use builtin::builtin_catalog;
pub use types::{
    ActionDescriptor, Capability, DeclaredParameter, ParamType, ParameterSchema, ParameterSpec,
    DEFAULT_MODULE,
};

pub struct ActionRegistry {
    builtin: Vec<ActionDescriptor>,
    custom: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    /// Registry seeded with the built-in catalog.
    pub fn with_builtins() -> Self {
        Self {
            builtin: builtin_catalog(),
            custom: Vec::new(),
        }
    }

    /// Empty registry, custom registrations only.
    pub fn empty() -> Self {
        Self {
            builtin: Vec::new(),
            custom: Vec::new(),
        }
    }

    /// Register a declared capability, returning the canonical action name.
    ///
    /// `name` falls back to the capability's intrinsic identifier and
    /// `description` to its docstring. For every declared parameter not
    /// explicitly present in `schema`, a spec is inferred from the
    /// declaration: missing type tag becomes `any`, `required` is true iff
    /// the declaration carries no default, and a declared default is copied
    /// over. Inference never fails, and registration always succeeds;
    /// re-registering a name overwrites the previous custom entry in place.
    pub fn register(
        &mut self,
        capability: Capability,
        name: Option<String>,
        description: Option<String>,
        schema: Option<ParameterSchema>,
    ) -> String {
        let canonical = name.unwrap_or_else(|| capability.name.clone());
        let description = description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| capability.doc.clone());

        let mut parameters = schema.unwrap_or_default();
        for declared in &capability.signature {
            if !parameters.contains_key(&declared.name) {
                parameters.insert(
                    declared.name.clone(),
                    ParameterSpec {
                        param_type: declared.param_type.unwrap_or(ParamType::Any),
                        required: declared.default.is_none(),
                        default: declared.default.clone(),
                        description: String::new(),
                    },
                );
            }
        }

        if self.builtin.iter().any(|d| d.name == canonical) {
            tracing::warn!(action = %canonical, "Custom registration overrides a built-in action");
        }

        let descriptor = ActionDescriptor {
            name: canonical.clone(),
            module: capability.module,
            description,
            parameters,
        };

        match self.custom.iter_mut().find(|d| d.name == canonical) {
            Some(slot) => *slot = descriptor,
            None => self.custom.push(descriptor),
        }

        canonical
    }

    /// Look up an action by name. Custom entries shadow built-ins.
    pub fn get(&self, name: &str) -> Option<&ActionDescriptor> {
        self.custom
            .iter()
            .find(|d| d.name == name)
            .or_else(|| self.builtin.iter().find(|d| d.name == name))
    }

    /// Merged view: built-in positions first (with custom values on name
    /// collision), then custom-only entries in insertion order.
    pub fn merged(&self) -> Vec<&ActionDescriptor> {
        let mut view: Vec<&ActionDescriptor> = self
            .builtin
            .iter()
            .map(|d| {
                self.custom
                    .iter()
                    .find(|c| c.name == d.name)
                    .unwrap_or(d)
            })
            .collect();

        view.extend(
            self.custom
                .iter()
                .filter(|c| !self.builtin.iter().any(|d| d.name == c.name)),
        );

        view
    }

    pub fn len(&self) -> usize {
        self.merged().len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtin.is_empty() && self.custom.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn capability(name: &str, signature: Vec<DeclaredParameter>) -> Capability {
        Capability {
            name: name.to_string(),
            module: "plugins".to_string(),
            doc: "declared docstring".to_string(),
            signature,
        }
    }

    #[test]
    fn test_register_uses_intrinsic_name_and_doc() {
        let mut registry = ActionRegistry::empty();
        let name = registry.register(capability("greet", Vec::new()), None, None, None);

        assert_eq!(name, "greet");
        let descriptor = registry.get("greet").unwrap();
        assert_eq!(descriptor.description, "declared docstring");
        assert_eq!(descriptor.module, "plugins");
    }

    #[test]
    fn test_register_explicit_name_and_description_win() {
        let mut registry = ActionRegistry::empty();
        let name = registry.register(
            capability("greet", Vec::new()),
            Some("say_hello".to_string()),
            Some("Say hello to someone".to_string()),
            None,
        );

        assert_eq!(name, "say_hello");
        assert!(registry.get("greet").is_none());
        assert_eq!(
            registry.get("say_hello").unwrap().description,
            "Say hello to someone"
        );
    }

    #[test]
    fn test_schema_inference_from_signature() {
        let mut registry = ActionRegistry::empty();
        registry.register(
            capability(
                "resize",
                vec![
                    DeclaredParameter {
                        name: "width".to_string(),
                        param_type: Some(ParamType::Int),
                        default: None,
                    },
                    DeclaredParameter {
                        name: "keep_aspect".to_string(),
                        param_type: None,
                        default: Some(json!(true)),
                    },
                ],
            ),
            None,
            None,
            None,
        );

        let descriptor = registry.get("resize").unwrap();
        let width = &descriptor.parameters["width"];
        assert_eq!(width.param_type, ParamType::Int);
        assert!(width.required);

        // Untyped declaration falls back to "any"; a declared default makes it optional.
        let keep_aspect = &descriptor.parameters["keep_aspect"];
        assert_eq!(keep_aspect.param_type, ParamType::Any);
        assert!(!keep_aspect.required);
        assert_eq!(keep_aspect.default, Some(json!(true)));
    }

    #[test]
    fn test_explicit_schema_shadows_declared_parameter() {
        let mut registry = ActionRegistry::empty();
        let schema = ParameterSchema::from([(
            "width".to_string(),
            ParameterSpec::optional(ParamType::Int, json!(640), "Output width"),
        )]);
        registry.register(
            capability(
                "resize",
                vec![DeclaredParameter {
                    name: "width".to_string(),
                    param_type: Some(ParamType::Str),
                    default: None,
                }],
            ),
            None,
            None,
            Some(schema),
        );

        let width = &registry.get("resize").unwrap().parameters["width"];
        assert_eq!(width.param_type, ParamType::Int);
        assert_eq!(width.default, Some(json!(640)));
    }

    #[test]
    fn test_custom_overrides_builtin_in_merged_view() {
        let mut registry = ActionRegistry::with_builtins();
        let builtin_count = registry.len();

        registry.register(
            Capability {
                name: "open_calculator".to_string(),
                module: "custom_tools".to_string(),
                doc: String::new(),
                signature: Vec::new(),
            },
            None,
            Some("Open a scientific calculator".to_string()),
            None,
        );

        // Same count: the collision replaces the built-in slot instead of appending.
        assert_eq!(registry.len(), builtin_count);
        let merged = registry.merged();
        let slot = merged
            .iter()
            .find(|d| d.name == "open_calculator")
            .unwrap();
        assert_eq!(slot.description, "Open a scientific calculator");
        assert_eq!(slot.module, "custom_tools");
        assert_eq!(
            registry.get("open_calculator").unwrap().module,
            "custom_tools"
        );
    }

    #[test]
    fn test_merged_order_builtins_first_then_custom() {
        let mut registry = ActionRegistry::with_builtins();
        registry.register(capability("zeta", Vec::new()), None, None, None);
        registry.register(capability("alpha", Vec::new()), None, None, None);

        let names: Vec<&str> = registry.merged().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names[0], "open_chrome");
        // Custom-only entries keep insertion order, not lexical order.
        assert_eq!(&names[names.len() - 2..], &["zeta", "alpha"]);
    }

    #[test]
    fn test_reregistration_is_last_write_wins() {
        let mut registry = ActionRegistry::empty();
        registry.register(capability("greet", Vec::new()), None, None, None);
        registry.register(
            capability("greet", Vec::new()),
            None,
            Some("second version".to_string()),
            None,
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("greet").unwrap().description, "second version");
    }
}
