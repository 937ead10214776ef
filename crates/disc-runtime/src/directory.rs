use std::collections::HashMap;
use std::fmt;

use disc_core::{ArgValue, DiscError, ParamType};

/// One callable operation as enumerated by a capability: its name and its
/// declared parameter types. Arity is the parameter count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    pub name: String,
    pub params: Vec<ParamType>,
}

impl OperationSpec {
    pub fn new(name: impl Into<String>, params: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A registered object handle. Enumerating the operation table is the
/// one-time "reflection" work; it happens at registration, never per call.
/// `invoke` receives arguments already coerced to the declared types and
/// returns the call result, if the operation produces one.
pub trait Capability: Send {
    /// The natural binding name used by [`Directory::register`].
    fn type_name(&self) -> &str;

    /// The callable operations this handle exposes.
    fn operations(&self) -> Vec<OperationSpec>;

    fn invoke(&mut self, operation: &str, args: &[ArgValue])
        -> Result<Option<ArgValue>, DiscError>;
}

struct DirectoryEntry {
    handle: Box<dyn Capability>,
    operations: Vec<OperationSpec>,
}

/// The name → capability registry used for dynamic dispatch. Names are
/// either the handle's own type name or an explicit nickname, so multiple
/// instances of one type can coexist under different names. Re-registering
/// a name overwrites the prior binding.
#[derive(Default)]
pub struct Directory {
    entries: HashMap<String, DirectoryEntry>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the handle under its own type name.
    pub fn register(&mut self, handle: Box<dyn Capability>) {
        let name = handle.type_name().to_string();
        self.register_as(name, handle);
    }

    /// Binds the handle under a nickname. Last write wins.
    pub fn register_as(&mut self, name: impl Into<String>, handle: Box<dyn Capability>) {
        let operations = handle.operations();
        self.entries
            .insert(name.into(), DirectoryEntry { handle, operations });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Resolves an operation by name and declared arity. If no operation
    /// matches both, falls back to the first operation matching the name
    /// alone; the caller may supply fewer or more arguments than declared.
    pub fn resolve_operation(
        &self,
        name: &str,
        operation: &str,
        arity: usize,
    ) -> Option<OperationSpec> {
        let entry = self.entries.get(name)?;
        entry
            .operations
            .iter()
            .find(|spec| spec.name == operation && spec.arity() == arity)
            .or_else(|| entry.operations.iter().find(|spec| spec.name == operation))
            .cloned()
    }

    pub fn resolve_handle(&mut self, name: &str) -> Option<&mut dyn Capability> {
        let entry = self.entries.get_mut(name)?;
        Some(entry.handle.as_mut())
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("Directory").field("names", &names).finish()
    }
}

#[cfg(test)]
mod directory_tests {
    use super::*;

    struct Probe {
        tag: i64,
    }

    impl Capability for Probe {
        fn type_name(&self) -> &str {
            "probe"
        }

        fn operations(&self) -> Vec<OperationSpec> {
            vec![
                OperationSpec::new("foo", vec![ParamType::Int, ParamType::Int]),
                OperationSpec::new("foo", vec![ParamType::Int]),
                OperationSpec::new("bar", vec![]),
            ]
        }

        fn invoke(
            &mut self,
            _operation: &str,
            _args: &[ArgValue],
        ) -> Result<Option<ArgValue>, DiscError> {
            Ok(Some(ArgValue::Int(self.tag)))
        }
    }

    #[test]
    fn register_uses_the_handles_type_name() {
        let mut directory = Directory::new();
        directory.register(Box::new(Probe { tag: 1 }));
        assert!(directory.contains("probe"));
        assert!(directory.resolve_handle("probe").is_some());
    }

    #[test]
    fn register_as_binds_a_nickname() {
        let mut directory = Directory::new();
        directory.register_as("left", Box::new(Probe { tag: 1 }));
        directory.register_as("right", Box::new(Probe { tag: 2 }));
        assert!(directory.contains("left"));
        assert!(directory.contains("right"));
        assert!(!directory.contains("probe"));
    }

    #[test]
    fn re_registering_a_name_overwrites_the_binding() {
        let mut directory = Directory::new();
        directory.register_as("p", Box::new(Probe { tag: 1 }));
        directory.register_as("p", Box::new(Probe { tag: 2 }));
        let handle = directory.resolve_handle("p").expect("handle should resolve");
        let result = handle.invoke("bar", &[]).expect("invoke should pass");
        assert_eq!(result, Some(ArgValue::Int(2)));
    }

    #[test]
    fn resolve_operation_prefers_exact_arity() {
        let mut directory = Directory::new();
        directory.register(Box::new(Probe { tag: 1 }));
        let spec = directory
            .resolve_operation("probe", "foo", 1)
            .expect("arity-1 foo should resolve");
        assert_eq!(spec.arity(), 1);
        let spec = directory
            .resolve_operation("probe", "foo", 2)
            .expect("arity-2 foo should resolve");
        assert_eq!(spec.arity(), 2);
    }

    #[test]
    fn resolve_operation_falls_back_to_name_only_match() {
        let mut directory = Directory::new();
        directory.register(Box::new(Probe { tag: 1 }));
        let spec = directory
            .resolve_operation("probe", "foo", 3)
            .expect("name-only fallback should resolve");
        assert_eq!(spec.name, "foo");
    }

    #[test]
    fn resolve_operation_not_found_cases() {
        let mut directory = Directory::new();
        directory.register(Box::new(Probe { tag: 1 }));
        assert!(directory.resolve_operation("probe", "baz", 0).is_none());
        assert!(directory.resolve_operation("ghost", "foo", 1).is_none());
        assert!(directory.resolve_handle("ghost").is_none());
    }
}
