//! User-defined classes and instances.
//!
//! Grounded on the curated `types/class.rs` reference file's field/method
//! table shape. `ClassInit` gives each instance a freshly minted,
//! globally-unique inner scope name (`uuid` v4, the same crate the teacher
//! uses for its own object identities) so instance state never collides
//! with another instance's variables in the shared scope registry.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{function::Lambda, value::Value};

/// A class definition: a constructor [`Lambda`] plus method and field
/// name tables, shared by every instance created from it.
#[derive(Debug, Clone)]
pub struct UserClass {
    pub name: String,
    pub constructor: Option<Lambda>,
    pub methods: IndexMap<String, Lambda>,
    pub field_names: Vec<String>,
}

impl UserClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), constructor: None, methods: IndexMap::new(), field_names: Vec::new() }
    }

    /// Returns the scope name a new instance's inner scope should be
    /// registered under.
    pub fn new_instance_scope_name(&self) -> String {
        format!("cantus.instance.{}", Uuid::new_v4())
    }
}

/// A live instance of a [`UserClass`]: a reference to its class plus the
/// name of the globally-unique inner scope holding its field values.
#[derive(Debug, Clone)]
pub struct ClassInstance {
    pub class_name: String,
    pub inner_scope: String,
    pub fields: IndexMap<String, Value>,
}

impl ClassInstance {
    pub fn new(class: &UserClass) -> Self {
        Self { class_name: class.name.clone(), inner_scope: class.new_instance_scope_name(), fields: IndexMap::new() }
    }

    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_instance_gets_a_distinct_inner_scope() {
        let class = UserClass::new("Point");
        let a = ClassInstance::new(&class);
        let b = ClassInstance::new(&class);
        assert_ne!(a.inner_scope, b.inner_scope);
    }

    #[test]
    fn fields_round_trip() {
        let class = UserClass::new("Point");
        let mut instance = ClassInstance::new(&class);
        instance.set_field("x", Value::Boolean(true));
        assert_eq!(instance.get_field("x"), Some(&Value::Boolean(true)));
    }
}
