//! Candidate pools of recovered signatures, grouped the way the matcher
//! queries them: per module, per enclosing type, per entry-point kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use swiftlink_decl::AccessorKind;

use crate::lowlevel::{SignatureKind, TLFunction};

/// The recovered accessors of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyContents {
    pub name: String,
    pub is_static: bool,
    pub getter: Option<TLFunction>,
    pub setter: Option<TLFunction>,
    pub materializer: Option<TLFunction>,
}

impl PropertyContents {
    pub fn new(name: impl Into<String>, is_static: bool) -> Self {
        PropertyContents {
            name: name.into(),
            is_static,
            getter: None,
            setter: None,
            materializer: None,
        }
    }

    pub fn accessor(&self, kind: AccessorKind) -> Option<&TLFunction> {
        match kind {
            AccessorKind::Getter => self.getter.as_ref(),
            AccessorKind::Setter => self.setter.as_ref(),
            AccessorKind::Materializer => self.materializer.as_ref(),
        }
    }
}

/// Everything recovered for one enclosing type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassContents {
    /// Fully-qualified name of the enclosing type.
    pub name: String,
    pub methods: Vec<TLFunction>,
    pub static_functions: Vec<TLFunction>,
    pub constructors: Vec<TLFunction>,
    pub destructors: Vec<TLFunction>,
    pub properties: Vec<PropertyContents>,
    pub subscripts: Vec<TLFunction>,
}

impl ClassContents {
    pub fn new(name: impl Into<String>) -> Self {
        ClassContents {
            name: name.into(),
            methods: Vec::new(),
            static_functions: Vec::new(),
            constructors: Vec::new(),
            destructors: Vec::new(),
            properties: Vec::new(),
            subscripts: Vec::new(),
        }
    }

    pub fn methods_with_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TLFunction> {
        self.methods.iter().filter(move |method| method.name == name)
    }

    pub fn static_functions_with_name<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a TLFunction> {
        self.static_functions
            .iter()
            .filter(move |function| function.name == name)
    }

    /// Only allocating constructors are call targets.
    pub fn allocating_constructors(&self) -> impl Iterator<Item = &TLFunction> {
        self.constructors
            .iter()
            .filter(|constructor| constructor.kind.is_allocating_constructor())
    }

    /// Only deallocating destructors are call targets.
    pub fn deallocating_destructors(&self) -> impl Iterator<Item = &TLFunction> {
        self.destructors
            .iter()
            .filter(|destructor| destructor.kind.is_deallocating_destructor())
    }

    pub fn properties_with_name<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a PropertyContents> {
        self.properties
            .iter()
            .filter(move |property| property.name == name)
    }

    pub fn subscripts_with_accessor(
        &self,
        accessor: AccessorKind,
    ) -> impl Iterator<Item = &TLFunction> {
        self.subscripts.iter().filter(move |subscript| {
            subscript.kind == SignatureKind::Subscript { accessor }
        })
    }
}

/// Everything recovered for one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleContents {
    pub name: String,
    pub functions: Vec<TLFunction>,
    pub classes: BTreeMap<String, ClassContents>,
}

impl ModuleContents {
    pub fn new(name: impl Into<String>) -> Self {
        ModuleContents {
            name: name.into(),
            functions: Vec::new(),
            classes: BTreeMap::new(),
        }
    }

    pub fn add_function(&mut self, function: TLFunction) {
        self.functions.push(function);
    }

    pub fn add_class(&mut self, class: ClassContents) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Look up an enclosing type by fully-qualified name.
    pub fn class(&self, name: &str) -> Option<&ClassContents> {
        self.classes.get(name)
    }

    pub fn functions_with_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TLFunction> {
        self.functions
            .iter()
            .filter(move |function| function.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowlevel::{LowLevelSignature, LowLevelType};

    fn empty_signature() -> LowLevelSignature {
        LowLevelSignature::new(LowLevelType::empty_tuple(), LowLevelType::empty_tuple())
    }

    #[test]
    fn constructor_pools_filter_on_allocation() {
        let mut class = ClassContents::new("Mod.Widget");
        class.constructors.push(TLFunction::member(
            "Mod",
            "init",
            SignatureKind::Constructor { allocating: true },
            empty_signature(),
        ));
        class.constructors.push(TLFunction::member(
            "Mod",
            "init",
            SignatureKind::Constructor { allocating: false },
            empty_signature(),
        ));
        assert_eq!(class.allocating_constructors().count(), 1);
    }

    #[test]
    fn property_accessor_lookup() {
        let mut property = PropertyContents::new("count", false);
        property.getter = Some(TLFunction::member(
            "Mod",
            "count",
            SignatureKind::Getter,
            empty_signature(),
        ));
        assert!(property.accessor(AccessorKind::Getter).is_some());
        assert!(property.accessor(AccessorKind::Setter).is_none());
    }

    #[test]
    fn module_lookup_by_class_and_function_name() {
        let mut contents = ModuleContents::new("Mod");
        contents.add_class(ClassContents::new("Mod.Widget"));
        contents.add_function(TLFunction::top_level("Mod", "f", empty_signature()));
        assert!(contents.class("Mod.Widget").is_some());
        assert!(contents.class("Mod.Missing").is_none());
        assert_eq!(contents.functions_with_name("f").count(), 1);
    }
}
