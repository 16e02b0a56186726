//! Reconciliation of declared APIs against recovered signatures.
//!
//! Given a declaration and the recovered contents of its module, narrow
//! the candidate pool by declaration kind, then keep every candidate
//! whose signature structurally matches. Absence is an expected outcome,
//! not an error; more than one survivor is reported as ambiguous instead
//! of silently taking the first.
//!
//! Two foreign-compiler quirks are kept as named, isolated special cases
//! and must not be widened: the `self` parameter-name pass and the
//! flattening of a sole literal-tuple argument.

use swiftlink_decl::{AccessorKind, FunctionDeclaration, FunctionKind, ParameterItem};
use swiftlink_typespec::{NamedSpec, TypeSpec, TypeSpecKind};

use crate::inventory::ModuleContents;
use crate::lowlevel::{LowLevelKind, LowLevelSignature, LowLevelType, SignatureKind, TLFunction};

/// Reserved call-site substitute for the receiver; a declared parameter
/// cannot carry this name, so it always passes name matching.
const RECEIVER_SUBSTITUTE: &str = "self";

/// Result of matching one declaration against a candidate pool.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    /// Exactly one candidate matched.
    Unique(&'a TLFunction),
    /// More than one candidate matched, in pool order.
    Ambiguous(Vec<&'a TLFunction>),
    /// No discoverable low-level counterpart; skip generation.
    NotFound,
}

impl<'a> MatchOutcome<'a> {
    pub fn found(&self) -> Option<&'a TLFunction> {
        match self {
            MatchOutcome::Unique(function) => Some(function),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MatchOutcome::NotFound)
    }
}

/// Find the low-level counterpart of a declaration.
pub fn match_declaration<'a>(
    declaration: &FunctionDeclaration,
    contents: &'a ModuleContents,
) -> MatchOutcome<'a> {
    let survivors: Vec<&TLFunction> = candidate_pool(declaration, contents)
        .into_iter()
        .filter(|candidate| signatures_match(declaration, candidate))
        .collect();
    match survivors.len() {
        0 => MatchOutcome::NotFound,
        1 => MatchOutcome::Unique(survivors[0]),
        _ => MatchOutcome::Ambiguous(survivors),
    }
}

/// Narrow the pool by declaration kind before structural comparison.
fn candidate_pool<'a>(
    declaration: &FunctionDeclaration,
    contents: &'a ModuleContents,
) -> Vec<&'a TLFunction> {
    let parent = match &declaration.parent {
        Some(parent) => parent,
        None => {
            return contents
                .functions
                .iter()
                .filter(|function| {
                    function.is_top_level && top_level_admits(declaration, function)
                })
                .collect();
        }
    };
    let class = match contents.class(&parent.name) {
        Some(class) => class,
        None => return Vec::new(),
    };
    match declaration.kind {
        FunctionKind::Constructor => class.allocating_constructors().collect(),
        FunctionKind::Destructor => class.deallocating_destructors().collect(),
        FunctionKind::Property(accessor) => class
            .properties
            .iter()
            .filter(|property| {
                property.name == declaration.search_name()
                    && property.is_static == declaration.is_static
            })
            .filter_map(|property| property.accessor(accessor))
            .collect(),
        FunctionKind::Subscript(accessor) => class.subscripts_with_accessor(accessor).collect(),
        FunctionKind::Function => {
            let source = if declaration.is_static {
                &class.static_functions
            } else {
                &class.methods
            };
            source
                .iter()
                .filter(|function| function.name == declaration.name)
                .collect()
        }
    }
}

/// Top-level properties are recovered as plain functions carrying the
/// stripped property name and an accessor kind; everything else matches
/// by declared name against the non-accessor candidates.
fn top_level_admits(declaration: &FunctionDeclaration, function: &TLFunction) -> bool {
    match declaration.kind {
        FunctionKind::Property(accessor) => {
            function.name == declaration.search_name()
                && function.kind == accessor_signature_kind(accessor)
        }
        _ => {
            function.name == declaration.name
                && !matches!(
                    function.kind,
                    SignatureKind::Getter | SignatureKind::Setter | SignatureKind::Materializer
                )
        }
    }
}

fn accessor_signature_kind(accessor: AccessorKind) -> SignatureKind {
    match accessor {
        AccessorKind::Getter => SignatureKind::Getter,
        AccessorKind::Setter => SignatureKind::Setter,
        AccessorKind::Materializer => SignatureKind::Materializer,
    }
}

fn signatures_match(declaration: &FunctionDeclaration, candidate: &TLFunction) -> bool {
    let signature = &candidate.signature;

    if needs_receiver_check(declaration) {
        let receiver = match &signature.uncurried_parameter {
            Some(receiver) => receiver,
            None => return false,
        };
        if !receiver_matches(declaration, &declaration.parameter_lists[0], receiver) {
            return false;
        }
    }

    // A constructor's return is implicit.
    if !declaration.is_constructor()
        && !type_matches(declaration, &declaration.return_type, &signature.return_type)
    {
        return false;
    }

    let parameters = declaration.significant_parameters();
    let count = signature.parameter_count();
    if parameters.len() == count {
        let ignore_name = declaration.is_setter() || declaration.is_subscript();
        (0..count).all(|index| match signature.parameter_at(index) {
            Some(low) => parameter_matches(declaration, &parameters[index], low, ignore_name),
            None => false,
        })
    } else {
        flattened_tuple_matches(declaration, parameters, signature)
    }
}

/// Constructors and members of value types never carry the extra curry
/// level, so their receiver is not validated.
fn needs_receiver_check(declaration: &FunctionDeclaration) -> bool {
    declaration.is_curried()
        && !declaration.is_static
        && !declaration.is_constructor()
        && !declaration
            .parent
            .as_ref()
            .map(|parent| parent.is_value_type())
            .unwrap_or(false)
}

fn receiver_matches(
    declaration: &FunctionDeclaration,
    receiver_list: &[ParameterItem],
    receiver: &LowLevelType,
) -> bool {
    match receiver_list.len() {
        0 => receiver.is_empty_tuple(),
        1 => parameter_matches(declaration, &receiver_list[0], receiver, false),
        n => match &receiver.kind {
            LowLevelKind::Tuple { elements } if elements.len() == n => receiver_list
                .iter()
                .zip(elements)
                .all(|(parameter, low)| parameter_matches(declaration, parameter, low, false)),
            _ => false,
        },
    }
}

/// The foreign compiler flattens a function whose sole argument is a
/// literal tuple; re-validate the declared tuple against the flattened
/// parameter list.
fn flattened_tuple_matches(
    declaration: &FunctionDeclaration,
    parameters: &[ParameterItem],
    signature: &LowLevelSignature,
) -> bool {
    if parameters.len() != 1 {
        return false;
    }
    let elements = match &parameters[0].type_spec.kind {
        TypeSpecKind::Tuple(tuple) => &tuple.elements,
        _ => return false,
    };
    if elements.len() != signature.parameter_count() {
        return false;
    }
    elements
        .iter()
        .enumerate()
        .all(|(index, element)| match signature.parameter_at(index) {
            Some(low) => type_matches(declaration, element, low),
            None => false,
        })
}

fn parameter_matches(
    declaration: &FunctionDeclaration,
    parameter: &ParameterItem,
    low: &LowLevelType,
    ignore_name: bool,
) -> bool {
    if !ignore_name {
        if let Some(label) = low.label.as_deref() {
            let declared = parameter.public_name.as_str();
            if declared != label
                && declared != RECEIVER_SUBSTITUTE
                && label != RECEIVER_SUBSTITUTE
            {
                return false;
            }
        }
    }
    if parameter.is_variadic != low.is_variadic {
        return false;
    }
    type_matches(declaration, &parameter.type_spec, low)
}

fn type_matches(declaration: &FunctionDeclaration, spec: &TypeSpec, low: &LowLevelType) -> bool {
    match &low.kind {
        LowLevelKind::Scalar(scalar) => {
            spec.is_inout == low.is_reference
                && matches!(spec.as_named(), Some(named) if names_match(named, scalar.swift_name()))
        }
        LowLevelKind::Class { name } => match &spec.kind {
            TypeSpecKind::Named(named) => names_match(named, name),
            // A single-protocol composition is a bare protocol reference.
            TypeSpecKind::ProtocolList(list) if list.protocols.len() == 1 => {
                matches!(list.protocols[0].as_named(), Some(named) if names_match(named, name))
            }
            _ => false,
        },
        LowLevelKind::MetaClass { class_name } => {
            matches!(spec.as_named(), Some(named) if names_match(named, class_name))
        }
        LowLevelKind::BoundGeneric { name, bound } => match spec.as_named() {
            Some(named) if !named.generic_params.is_empty() && names_match(named, name) => {
                bound_arguments_match(declaration, &named.generic_params, bound)
            }
            _ => false,
        },
        LowLevelKind::Tuple { elements } => match &spec.kind {
            TypeSpecKind::Tuple(tuple) if tuple.elements.len() == elements.len() => tuple
                .elements
                .iter()
                .zip(elements)
                .all(|(element, low)| type_matches(declaration, element, low)),
            _ => false,
        },
        LowLevelKind::ProtocolList { protocols } => match &spec.kind {
            TypeSpecKind::ProtocolList(list) if list.protocols.len() == protocols.len() => list
                .protocols
                .iter()
                .zip(protocols)
                .all(|(protocol, low_name)| {
                    matches!(protocol.as_named(), Some(named) if names_match(named, low_name))
                }),
            TypeSpecKind::Named(named) if protocols.len() == 1 => {
                names_match(named, &protocols[0])
            }
            _ => false,
        },
        LowLevelKind::GenericReference { depth, index } => matches!(
            spec.as_named(),
            Some(named)
                if declaration.generics.depth_and_index(&named.name) == Some((*depth, *index))
        ),
        LowLevelKind::Function {
            parameters,
            return_type,
        } => match &spec.kind {
            TypeSpecKind::Closure(closure) => {
                closure_arguments_match(declaration, &closure.arguments, parameters)
                    && type_matches(declaration, &closure.return_type, return_type)
            }
            _ => false,
        },
    }
}

fn bound_arguments_match(
    declaration: &FunctionDeclaration,
    specs: &[TypeSpec],
    lows: &[LowLevelType],
) -> bool {
    if specs.len() != lows.len() {
        return false;
    }
    // A sole bound argument of `Void` and the empty tuple are the same;
    // multi-argument lists compare strictly pairwise.
    if specs.len() == 1 && specs[0].is_void() && lows[0].is_empty_tuple() {
        return true;
    }
    specs
        .iter()
        .zip(lows)
        .all(|(spec, low)| type_matches(declaration, spec, low))
}

fn closure_arguments_match(
    declaration: &FunctionDeclaration,
    arguments: &TypeSpec,
    lows: &[LowLevelType],
) -> bool {
    match &arguments.kind {
        TypeSpecKind::Tuple(tuple) => {
            tuple.elements.len() == lows.len()
                && tuple
                    .elements
                    .iter()
                    .zip(lows)
                    .all(|(element, low)| type_matches(declaration, element, low))
        }
        _ => lows.len() == 1 && type_matches(declaration, arguments, &lows[0]),
    }
}

/// Declared names may or may not carry a module prefix; recovered names
/// always do. Accept either spelling.
fn names_match(named: &NamedSpec, low_name: &str) -> bool {
    named.name == low_name
        || named.name_without_module() == low_name
        || named.name == unqualified(low_name)
}

fn unqualified(name: &str) -> &str {
    match name.split_once('.') {
        Some((_, rest)) => rest,
        None => name,
    }
}
