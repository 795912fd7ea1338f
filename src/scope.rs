//! Named, hierarchical scope registry.
//!
//! Grounded on the teacher's `namespace.rs` (`Namespaces` stack-of-maps
//! shape, `deep_clone`/`register_prebuilt` patterns), rebuilt around
//! string keys instead of the teacher's slot-indexed `NamespaceId` —
//! spec's Scope is explicitly name-keyed and resolved by walking from the
//! current scope toward the root by full dotted name (`A.B.C`), not by a
//! compiled slot offset, so the teacher's literal data layout does not
//! generalize here and was rewritten in its idiom instead.

use indexmap::IndexMap;

use crate::{function::UserFunction, value::Value};

/// One named scope: three insertion-ordered maps keyed by full dotted
/// name, plus the name of its parent scope (`None` for the root).
#[derive(Debug, Clone, Default)]
struct ScopeFrame {
    parent: Option<String>,
    variables: IndexMap<String, Value>,
    functions: IndexMap<String, UserFunction>,
    classes: IndexMap<String, crate::class::UserClass>,
}

/// The full registry of named scopes. Resolution walks from a given
/// scope name toward the root (`None` parent), returning the first map
/// that defines the requested name.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    frames: IndexMap<String, ScopeFrame>,
}

pub const ROOT_SCOPE: &str = "global";

impl Scope {
    pub fn new() -> Self {
        let mut frames = IndexMap::new();
        frames.insert(ROOT_SCOPE.to_string(), ScopeFrame::default());
        Self { frames }
    }

    /// Creates a new scope, parented under `parent`, returning its name.
    pub fn create_scope(&mut self, name: impl Into<String>, parent: &str) -> String {
        let name = name.into();
        self.frames.insert(name.clone(), ScopeFrame { parent: Some(parent.to_string()), ..Default::default() });
        name
    }

    pub fn drop_scope(&mut self, name: &str) {
        if name != ROOT_SCOPE {
            self.frames.shift_remove(name);
        }
    }

    fn ancestry(&self, from: &str) -> impl Iterator<Item = &str> + '_ {
        let mut current = Some(from);
        std::iter::from_fn(move || {
            let name = current?;
            let frame = self.frames.get(name);
            current = frame.and_then(|f| f.parent.as_deref());
            Some(name)
        })
    }

    /// Resolves a dotted variable name by walking `from` toward the root.
    pub fn resolve_variable(&self, from: &str, name: &str) -> Option<&Value> {
        for scope in self.ancestry(from) {
            if let Some(value) = self.frames.get(scope).and_then(|f| f.variables.get(name)) {
                return Some(value);
            }
        }
        None
    }

    /// Assigns into the nearest scope (toward root) that already defines
    /// `name`, or into `from` itself if none does — matching the common
    /// "assignment creates in the innermost scope unless shadowing an
    /// outer binding" rule.
    pub fn assign_variable(&mut self, from: &str, name: &str, value: Value) {
        let target = self
            .ancestry(from)
            .find(|scope| self.frames.get(*scope).is_some_and(|f| f.variables.contains_key(name)))
            .map(str::to_string)
            .unwrap_or_else(|| from.to_string());
        if let Some(frame) = self.frames.get_mut(&target) {
            frame.variables.insert(name.to_string(), value);
        }
    }

    pub fn resolve_function(&self, from: &str, name: &str) -> Option<&UserFunction> {
        for scope in self.ancestry(from) {
            if let Some(func) = self.frames.get(scope).and_then(|f| f.functions.get(name)) {
                return Some(func);
            }
        }
        None
    }

    pub fn define_function(&mut self, scope: &str, name: impl Into<String>, func: UserFunction) {
        if let Some(frame) = self.frames.get_mut(scope) {
            frame.functions.insert(name.into(), func);
        }
    }

    pub fn resolve_class(&self, from: &str, name: &str) -> Option<&crate::class::UserClass> {
        for scope in self.ancestry(from) {
            if let Some(class) = self.frames.get(scope).and_then(|f| f.classes.get(name)) {
                return Some(class);
            }
        }
        None
    }

    pub fn define_class(&mut self, scope: &str, name: impl Into<String>, class: crate::class::UserClass) {
        if let Some(frame) = self.frames.get_mut(scope) {
            frame.classes.insert(name.into(), class);
        }
    }

    /// Resets the root scope to empty, matching the `_AllClear` built-in's
    /// contract; non-root scopes (e.g. live class instances) are left
    /// intact since they are not reachable by name from a cleared root
    /// unless re-registered.
    pub fn clear_root(&mut self) {
        if let Some(frame) = self.frames.get_mut(ROOT_SCOPE) {
            *frame = ScopeFrame::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_resolves_parent_variable() {
        let mut scope = Scope::new();
        scope.assign_variable(ROOT_SCOPE, "a", Value::Boolean(true));
        let child = scope.create_scope("child", ROOT_SCOPE);
        assert_eq!(scope.resolve_variable(&child, "a"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn assignment_shadows_in_innermost_scope_by_default() {
        let mut scope = Scope::new();
        let child = scope.create_scope("child", ROOT_SCOPE);
        scope.assign_variable(&child, "a", Value::Boolean(true));
        assert_eq!(scope.resolve_variable(ROOT_SCOPE, "a"), None);
        assert_eq!(scope.resolve_variable(&child, "a"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn assignment_updates_existing_outer_binding_in_place() {
        let mut scope = Scope::new();
        scope.assign_variable(ROOT_SCOPE, "a", Value::Boolean(true));
        let child = scope.create_scope("child", ROOT_SCOPE);
        scope.assign_variable(&child, "a", Value::Boolean(false));
        assert_eq!(scope.resolve_variable(ROOT_SCOPE, "a"), Some(&Value::Boolean(false)));
    }

    #[test]
    fn clear_root_empties_root_variables() {
        let mut scope = Scope::new();
        scope.assign_variable(ROOT_SCOPE, "a", Value::Boolean(true));
        scope.clear_root();
        assert_eq!(scope.resolve_variable(ROOT_SCOPE, "a"), None);
    }
}
