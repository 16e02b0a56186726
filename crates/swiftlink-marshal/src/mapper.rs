//! Projection of type specs onto marshal types.
//!
//! [`TypeMapper`] owns the dispatch from [`TypeSpec`] variants to
//! [`MarshalType`] shapes, including the three closure trampoline shapes.
//! A closure value cannot cross the ABI boundary as a single value, so it
//! is decomposed into function-pointer plus context-pointer form:
//!
//! 1. *Override shape* (`for_override`): a direct function type over the
//!    closure's arguments, escaping when the source marked it escaping.
//! 2. *Return-position shape* (`is_for_return`): out-pointer convention,
//!    `(pointer-to-return-slot, pointer-to-argument-tuple) -> ()`; either
//!    pointer is omitted when the closure returns nothing or takes no
//!    arguments.
//! 3. *Call-site shape*: shape 2 plus one trailing opaque context pointer,
//!    always escaping.

use swiftlink_decl::{EntityRegistry, FunctionDeclaration, ParameterItem};
use swiftlink_typespec::{ClosureSpec, NamedSpec, TypeSpec, TypeSpecKind};

use crate::error::{MarshalError, Result};
use crate::marshal::{
    MarshalElement, MarshalParameter, MarshalType, ModuleReferences, ParameterPassing,
    OPAQUE_POINTER, PLACEHOLDER_LABEL, UNSAFE_RAW_POINTER,
};

/// Maps type specs and parameters into marshal types.
pub struct TypeMapper<'a> {
    registry: &'a EntityRegistry,
    for_override: bool,
}

impl<'a> TypeMapper<'a> {
    pub fn new(registry: &'a EntityRegistry) -> Self {
        TypeMapper {
            registry,
            for_override: false,
        }
    }

    /// A mapper generating a target-language override of a foreign member.
    pub fn for_override(registry: &'a EntityRegistry) -> Self {
        TypeMapper {
            registry,
            for_override: true,
        }
    }

    /// Lossy mapping for interop stubs: built-in value types map to
    /// themselves, everything else erases to a raw pointer.
    pub fn map_simplified(&self, spec: &TypeSpec) -> MarshalType {
        match spec.as_named() {
            Some(named) if spec.is_built_in_value_type() => MarshalType::simple(&named.name),
            _ => MarshalType::simple(UNSAFE_RAW_POINTER),
        }
    }

    /// Full-fidelity mapping of one type spec.
    ///
    /// Modules referenced by qualified names are accumulated into the
    /// caller-owned `modules` set.
    pub fn map_type(
        &self,
        declaration: &FunctionDeclaration,
        modules: &mut ModuleReferences,
        spec: &TypeSpec,
        is_for_return: bool,
    ) -> Result<MarshalType> {
        match &spec.kind {
            TypeSpecKind::Named(named) => {
                self.map_named(declaration, modules, named, is_for_return)
            }
            TypeSpecKind::Tuple(tuple) => {
                let mut elements = Vec::with_capacity(tuple.elements.len());
                for element in &tuple.elements {
                    let ty = self.map_type(declaration, modules, element, is_for_return)?;
                    elements.push(MarshalElement {
                        label: element.type_label.clone(),
                        ty,
                    });
                }
                Ok(MarshalType::Tuple { elements })
            }
            TypeSpecKind::ProtocolList(list) => {
                let mut protocols = Vec::with_capacity(list.protocols.len());
                for protocol in &list.protocols {
                    protocols.push(self.map_type(declaration, modules, protocol, is_for_return)?);
                }
                Ok(MarshalType::ProtocolComposition { protocols })
            }
            TypeSpecKind::Closure(closure) => {
                self.map_closure(declaration, modules, spec, closure, is_for_return)
            }
        }
    }

    fn map_named(
        &self,
        declaration: &FunctionDeclaration,
        modules: &mut ModuleReferences,
        named: &NamedSpec,
        is_for_return: bool,
    ) -> Result<MarshalType> {
        if let Some(module) = named.module() {
            modules.add(module);
        }
        let base = if named.generic_params.is_empty() {
            match declaration.generics.depth_and_index(&named.name) {
                Some((depth, index)) => MarshalType::GenericReference { depth, index },
                None => MarshalType::simple(named.name_without_module()),
            }
        } else {
            let mut bound = Vec::with_capacity(named.generic_params.len());
            for argument in &named.generic_params {
                bound.push(self.map_type(declaration, modules, argument, is_for_return)?);
            }
            MarshalType::bound_generic(named.name_without_module(), bound)
        };
        match &named.inner {
            Some(inner) => Ok(MarshalType::Compound {
                outer: Box::new(base),
                inner: Box::new(self.map_type(declaration, modules, inner, is_for_return)?),
            }),
            None => Ok(base),
        }
    }

    fn map_closure(
        &self,
        declaration: &FunctionDeclaration,
        modules: &mut ModuleReferences,
        spec: &TypeSpec,
        closure: &ClosureSpec,
        is_for_return: bool,
    ) -> Result<MarshalType> {
        if closure.throws {
            return Err(MarshalError::ThrowingClosure {
                declaration: declaration.fully_qualified_name(),
                closure: spec.to_string(),
            });
        }

        if self.for_override {
            // Override trampolines carry their arguments unlabeled.
            let parameters = self
                .closure_elements(declaration, modules, &closure.arguments)?
                .into_iter()
                .map(|element| MarshalElement::unlabeled(element.ty))
                .collect();
            let return_type =
                self.map_type(declaration, modules, &closure.return_type, true)?;
            return Ok(MarshalType::Function {
                parameters,
                return_type: Box::new(return_type),
                is_escaping: spec.is_escaping(),
            });
        }

        // Out-pointer convention: return-by-value from a generated
        // trampoline at this position is not reliable.
        let mut parameters = Vec::new();
        let returns_value =
            !closure.return_type.is_empty_tuple() && !closure.return_type.is_void();
        if returns_value {
            let slot = self.map_type(declaration, modules, &closure.return_type, true)?;
            parameters.push(MarshalElement::unlabeled(MarshalType::mutable_pointer_to(
                slot,
            )));
        }
        if !closure.arguments.is_empty_tuple() {
            let arguments = MarshalType::Tuple {
                elements: self.closure_elements(declaration, modules, &closure.arguments)?,
            };
            parameters.push(MarshalElement::unlabeled(MarshalType::mutable_pointer_to(
                arguments,
            )));
        }

        let call_site = !is_for_return;
        if call_site {
            // Recovers the captured environment when invoked.
            parameters.push(MarshalElement::unlabeled(MarshalType::simple(
                OPAQUE_POINTER,
            )));
        }
        Ok(MarshalType::Function {
            parameters,
            return_type: Box::new(MarshalType::unit()),
            is_escaping: call_site,
        })
    }

    fn closure_elements(
        &self,
        declaration: &FunctionDeclaration,
        modules: &mut ModuleReferences,
        arguments: &TypeSpec,
    ) -> Result<Vec<MarshalElement>> {
        match &arguments.kind {
            TypeSpecKind::Tuple(tuple) => tuple
                .elements
                .iter()
                .map(|element| self.closure_element(declaration, modules, element))
                .collect(),
            _ => Ok(vec![self.closure_element(declaration, modules, arguments)?]),
        }
    }

    fn closure_element(
        &self,
        declaration: &FunctionDeclaration,
        modules: &mut ModuleReferences,
        element: &TypeSpec,
    ) -> Result<MarshalElement> {
        let ty = self.map_type(declaration, modules, element, false)?;
        let label = element
            .type_label
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_LABEL.to_string());
        Ok(MarshalElement::labeled(label, ty))
    }

    /// Map one declared parameter list into marshal parameters.
    ///
    /// `dont_change_inout` preserves the declared passing mode instead of
    /// wrapping forced-reference sites in pointer types.
    pub fn map_parameters(
        &self,
        declaration: &FunctionDeclaration,
        modules: &mut ModuleReferences,
        parameters: &[ParameterItem],
        dont_change_inout: bool,
    ) -> Result<Vec<MarshalParameter>> {
        parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| {
                self.map_parameter(declaration, modules, parameter, index, dont_change_inout)
            })
            .collect()
    }

    fn map_parameter(
        &self,
        declaration: &FunctionDeclaration,
        modules: &mut ModuleReferences,
        parameter: &ParameterItem,
        index: usize,
        dont_change_inout: bool,
    ) -> Result<MarshalParameter> {
        let spec = &parameter.type_spec;
        let is_generic =
            spec.as_named().is_some() && declaration.generics.references_generic(spec);
        let entity = self.registry.entity_for_spec(spec);
        let private_name = if parameter.private_name.is_empty() {
            format!("anonymous_parameter_{index}")
        } else {
            parameter.private_name.clone()
        };

        if parameter.is_inout()
            && entity.is_none()
            && !is_generic
            && !spec.is_built_in_value_type()
        {
            return Err(MarshalError::UnknownParameterType {
                declaration: declaration.fully_qualified_name(),
                parameter: private_name,
                type_name: spec.to_string(),
            });
        }

        // Value aggregates already pass by value safely; everything else
        // declared inout crosses by reference.
        let passing = if parameter.is_inout()
            && !entity.map(|entity| entity.is_struct_or_enum()).unwrap_or(false)
        {
            ParameterPassing::InOut
        } else {
            ParameterPassing::Value
        };

        let mut ty = if is_generic {
            self.map_generic_parameter(declaration, modules, parameter, dont_change_inout)?
        } else {
            let mapped = self.map_type(declaration, modules, spec, false)?;
            self.wrap_forced_reference(declaration, parameter, dont_change_inout, mapped)
        };

        if parameter.is_variadic {
            ty = self.rewrite_variadic(declaration, &private_name, ty)?;
        }

        Ok(MarshalParameter {
            public_name: if parameter.public_name.is_empty() {
                None
            } else {
                Some(parameter.public_name.clone())
            },
            private_name,
            ty,
            passing,
        })
    }

    fn map_generic_parameter(
        &self,
        declaration: &FunctionDeclaration,
        modules: &mut ModuleReferences,
        parameter: &ParameterItem,
        dont_change_inout: bool,
    ) -> Result<MarshalType> {
        let spec = &parameter.type_spec;
        let named = match spec.as_named() {
            Some(named) => named,
            None => return self.map_type(declaration, modules, spec, false),
        };

        if named.generic_params.is_empty() {
            // An unapplied generic parameter maps purely to its coordinate.
            return match declaration.generics.depth_and_index(&named.name) {
                Some((depth, index)) => Ok(MarshalType::GenericReference { depth, index }),
                None => Err(MarshalError::UnresolvedGenericParameter {
                    declaration: declaration.fully_qualified_name(),
                    name: named.name.clone(),
                }),
            };
        }

        // Applied form: keep the full qualified name and map the arguments
        // with return-position fidelity.
        if let Some(module) = named.module() {
            modules.add(module);
        }
        let mut bound = Vec::with_capacity(named.generic_params.len());
        for argument in &named.generic_params {
            bound.push(self.map_type(declaration, modules, argument, true)?);
        }
        let ty = MarshalType::bound_generic(named.name.clone(), bound);
        Ok(self.wrap_forced_reference(declaration, parameter, dont_change_inout, ty))
    }

    /// Types that must cross the boundary behind a pointer get wrapped in
    /// `UnsafeMutablePointer` (inout) or `UnsafePointer` (by value).
    fn wrap_forced_reference(
        &self,
        declaration: &FunctionDeclaration,
        parameter: &ParameterItem,
        dont_change_inout: bool,
        ty: MarshalType,
    ) -> MarshalType {
        if dont_change_inout
            || !self.must_force_pass_by_reference(declaration, &parameter.type_spec)
        {
            return ty;
        }
        if parameter.is_inout() {
            MarshalType::mutable_pointer_to(ty)
        } else {
            MarshalType::pointer_to(ty)
        }
    }

    fn rewrite_variadic(
        &self,
        declaration: &FunctionDeclaration,
        private_name: &str,
        ty: MarshalType,
    ) -> Result<MarshalType> {
        if !self.for_override {
            return Ok(ty);
        }
        match ty {
            MarshalType::BoundGeneric { name, mut bound }
                if bound.len() == 1 && (name == "Array" || name.ends_with(".Array")) =>
            {
                Ok(MarshalType::Variadic {
                    element: Box::new(bound.remove(0)),
                })
            }
            _ => Err(MarshalError::VariadicNotArray {
                declaration: declaration.fully_qualified_name(),
                parameter: private_name.to_string(),
            }),
        }
    }

    /// Whether a type must cross the boundary behind a pointer: generic
    /// sites always, built-in scalars never, registered value aggregates
    /// always, everything else by value.
    pub fn must_force_pass_by_reference(
        &self,
        declaration: &FunctionDeclaration,
        spec: &TypeSpec,
    ) -> bool {
        if declaration.generics.references_generic(spec) {
            return true;
        }
        if spec.is_built_in_value_type() {
            return false;
        }
        self.registry
            .entity_for_spec(spec)
            .map(|entity| entity.is_struct_or_enum())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftlink_decl::{EntityKind, GenericContext, GenericDeclaration};
    use swiftlink_typespec::parse_type_spec;

    fn plain_declaration() -> FunctionDeclaration {
        FunctionDeclaration::top_level(
            "Mod",
            "f",
            Vec::new(),
            parse_type_spec("()").unwrap(),
        )
    }

    fn generic_declaration() -> FunctionDeclaration {
        let mut declaration = plain_declaration();
        declaration.generics =
            GenericContext::from_scopes(vec![vec![GenericDeclaration::new("T")]]);
        declaration
    }

    #[test]
    fn simplified_mapping_keeps_scalars_and_erases_the_rest() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        assert_eq!(
            mapper
                .map_simplified(&parse_type_spec("Swift.Int").unwrap())
                .to_string(),
            "Swift.Int"
        );
        assert_eq!(
            mapper
                .map_simplified(&parse_type_spec("Mod.Widget").unwrap())
                .to_string(),
            "UnsafeRawPointer"
        );
        assert_eq!(
            mapper
                .map_simplified(&parse_type_spec("(Swift.Int) -> Swift.Bool").unwrap())
                .to_string(),
            "UnsafeRawPointer"
        );
    }

    #[test]
    fn override_shape_is_a_direct_function_type() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::for_override(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let closure = parse_type_spec("(Swift.Int, Swift.Bool) -> Swift.String").unwrap();
        let mapped = mapper
            .map_type(&declaration, &mut modules, &closure, false)
            .unwrap();
        assert_eq!(mapped.to_string(), "(Int, Bool) -> String");
        assert!(modules.contains("Swift"));
    }

    #[test]
    fn return_position_shape_uses_out_pointers() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let closure = parse_type_spec("(Swift.Int, Swift.Bool) -> Swift.String").unwrap();
        let mapped = mapper
            .map_type(&declaration, &mut modules, &closure, true)
            .unwrap();
        assert_eq!(
            mapped.to_string(),
            "(UnsafeMutablePointer<String>, UnsafeMutablePointer<(_: Int, _: Bool)>) -> ()"
        );
    }

    #[test]
    fn return_position_shape_omits_absent_pointers() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let closure = parse_type_spec("() -> ()").unwrap();
        let mapped = mapper
            .map_type(&declaration, &mut modules, &closure, true)
            .unwrap();
        assert_eq!(mapped.to_string(), "() -> ()");
    }

    #[test]
    fn call_site_shape_appends_context_pointer_and_escapes() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let closure = parse_type_spec("(Swift.Int, Swift.Bool) -> Swift.String").unwrap();
        let mapped = mapper
            .map_type(&declaration, &mut modules, &closure, false)
            .unwrap();
        assert_eq!(
            mapped.to_string(),
            "@escaping (UnsafeMutablePointer<String>, \
             UnsafeMutablePointer<(_: Int, _: Bool)>, OpaquePointer) -> ()"
        );
    }

    #[test]
    fn throwing_closures_never_map() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let closure = parse_type_spec("(Swift.Int) throws -> Swift.Bool").unwrap();
        for is_for_return in [false, true] {
            let err = mapper
                .map_type(&declaration, &mut modules, &closure, is_for_return)
                .unwrap_err();
            assert!(matches!(err, MarshalError::ThrowingClosure { .. }));
        }
    }

    #[test]
    fn generic_parameter_maps_to_its_coordinate() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = generic_declaration();
        let mut modules = ModuleReferences::new();
        let parameter = ParameterItem::parse("value", "value", "T").unwrap();
        let mapped = mapper
            .map_parameters(&declaration, &mut modules, &[parameter], false)
            .unwrap();
        assert_eq!(mapped[0].ty, MarshalType::GenericReference { depth: 0, index: 0 });
        assert_eq!(mapped[0].ty.to_string(), "T0_0");
    }

    #[test]
    fn applied_generic_parameter_is_forced_behind_a_pointer() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = generic_declaration();
        let mut modules = ModuleReferences::new();
        let parameter = ParameterItem::parse("values", "values", "Swift.Array<T>").unwrap();
        let mapped = mapper
            .map_parameters(&declaration, &mut modules, &[parameter], false)
            .unwrap();
        assert_eq!(mapped[0].ty.to_string(), "UnsafePointer<Swift.Array<T0_0>>");
        assert_eq!(mapped[0].passing, ParameterPassing::Value);
    }

    #[test]
    fn registered_value_aggregates_cross_behind_pointers() {
        let mut registry = EntityRegistry::new();
        registry.register_kind("Mod.Point", EntityKind::Struct);
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();

        let by_value = ParameterItem::parse("p", "p", "Mod.Point").unwrap();
        let by_inout = ParameterItem::parse("q", "q", "inout Mod.Point").unwrap();
        let mapped = mapper
            .map_parameters(
                &declaration,
                &mut modules,
                &[by_value, by_inout.clone()],
                false,
            )
            .unwrap();
        assert_eq!(mapped[0].ty.to_string(), "UnsafePointer<Point>");
        assert_eq!(mapped[1].ty.to_string(), "UnsafeMutablePointer<Point>");

        // The declared passing mode survives on request.
        let preserved = mapper
            .map_parameters(&declaration, &mut modules, &[by_inout], true)
            .unwrap();
        assert_eq!(preserved[0].ty.to_string(), "Point");
    }

    #[test]
    fn inout_unknown_type_is_an_error() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let parameter = ParameterItem::parse("w", "w", "inout Mod.Widget").unwrap();
        let err = mapper
            .map_parameters(&declaration, &mut modules, &[parameter], false)
            .unwrap_err();
        assert!(matches!(err, MarshalError::UnknownParameterType { .. }));
    }

    #[test]
    fn inout_passing_depends_on_value_aggregates() {
        let mut registry = EntityRegistry::new();
        registry.register_kind("Mod.Widget", EntityKind::Class);
        registry.register_kind("Mod.Point", EntityKind::Struct);
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();

        let class_param = ParameterItem::parse("w", "w", "inout Mod.Widget").unwrap();
        let struct_param = ParameterItem::parse("p", "p", "inout Mod.Point").unwrap();
        let scalar_param = ParameterItem::parse("n", "n", "inout Swift.Int").unwrap();
        let mapped = mapper
            .map_parameters(
                &declaration,
                &mut modules,
                &[class_param, struct_param, scalar_param],
                false,
            )
            .unwrap();
        assert_eq!(mapped[0].passing, ParameterPassing::InOut);
        assert_eq!(mapped[1].passing, ParameterPassing::Value);
        assert_eq!(mapped[2].passing, ParameterPassing::InOut);
    }

    #[test]
    fn anonymous_parameters_get_deterministic_names() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let parameters = vec![
            ParameterItem::parse("", "", "Swift.Int").unwrap(),
            ParameterItem::parse("", "", "Swift.Bool").unwrap(),
        ];
        let mapped = mapper
            .map_parameters(&declaration, &mut modules, &parameters, false)
            .unwrap();
        assert_eq!(mapped[0].private_name, "anonymous_parameter_0");
        assert_eq!(mapped[1].private_name, "anonymous_parameter_1");
        assert_eq!(mapped[0].public_name, None);
    }

    #[test]
    fn override_variadic_rewrites_array_to_variadic() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::for_override(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let mut parameter =
            ParameterItem::parse("values", "values", "Swift.Array<Swift.Int>").unwrap();
        parameter.is_variadic = true;
        let mapped = mapper
            .map_parameters(&declaration, &mut modules, &[parameter], false)
            .unwrap();
        assert_eq!(mapped[0].ty.to_string(), "Int...");
    }

    #[test]
    fn override_variadic_requires_an_array() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::for_override(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let mut parameter = ParameterItem::parse("values", "values", "Swift.Int").unwrap();
        parameter.is_variadic = true;
        let err = mapper
            .map_parameters(&declaration, &mut modules, &[parameter], false)
            .unwrap_err();
        assert!(matches!(err, MarshalError::VariadicNotArray { .. }));
    }

    #[test]
    fn compound_inner_types_map_to_compounds() {
        let registry = EntityRegistry::new();
        let mapper = TypeMapper::new(&registry);
        let declaration = plain_declaration();
        let mut modules = ModuleReferences::new();
        let spec = parse_type_spec("Mod.Outer<Swift.Int>.Inner").unwrap();
        let mapped = mapper
            .map_type(&declaration, &mut modules, &spec, false)
            .unwrap();
        assert_eq!(mapped.to_string(), "Outer<Int>.Inner");
    }
}
