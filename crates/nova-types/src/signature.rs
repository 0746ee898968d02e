//! Generic signature synthesis. Shapes that carry no generic information have no signature.

use nova_classfile::{
    binary_to_internal, ClassSignature, ClassTypeSignature, MethodSignature,
    SimpleClassTypeSignature, TypeArgument, TypeParameter, TypeSignature,
};
use thiserror::Error;

use crate::erased::ErasedType;
use crate::generic::{GenericType, ParameterizedType, TypeVariable, WildcardType};
use crate::store::{ClassDef, TypeStore, TypeVarDef};
use crate::visitor::Visitor;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed generic signature: {0}")]
pub struct MalformedSignature(&'static str);

struct SignatureWriter<'s> {
    store: &'s TypeStore,
    depth: usize,
}

impl<'s> SignatureWriter<'s> {
    fn new(store: &'s TypeStore) -> Self {
        Self { store, depth: 0 }
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, MalformedSignature>,
    ) -> Result<T, MalformedSignature> {
        if self.depth >= MAX_DEPTH {
            return Err(MalformedSignature("type nesting too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn class_type(&mut self, ty: &ParameterizedType) -> Result<ClassTypeSignature, MalformedSignature> {
        self.nested(|this| {
            let internal = binary_to_internal(this.store.name(ty.raw));
            let mut signature = match ty.owner.as_deref() {
                Some(GenericType::Parameterized(owner)) => {
                    let mut outer = this.class_type(owner)?;
                    let simple = internal
                        .strip_prefix(outer.internal_name().as_str())
                        .and_then(|rest| rest.strip_prefix('$'))
                        .ok_or(MalformedSignature("inner class is not a member of its owner"))?
                        .to_string();
                    outer.segments.push(SimpleClassTypeSignature {
                        name: simple,
                        type_arguments: Vec::new(),
                    });
                    outer
                }
                _ => ClassTypeSignature::raw(&internal),
            };
            let arguments = ty
                .arguments
                .iter()
                .map(|argument| this.type_argument(argument))
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(last) = signature.segments.last_mut() {
                last.type_arguments = arguments;
            }
            Ok(signature)
        })
    }

    fn type_argument(&mut self, argument: &GenericType) -> Result<TypeArgument, MalformedSignature> {
        match argument {
            GenericType::Wildcard(wildcard) => {
                if let Some(lower) = wildcard.lower_bounds().first() {
                    Ok(TypeArgument::Super(lower.accept(self)?))
                } else if wildcard.is_unbounded(self.store) {
                    Ok(TypeArgument::Any)
                } else {
                    match wildcard.upper_bounds().first() {
                        Some(upper) => Ok(TypeArgument::Extends(upper.accept(self)?)),
                        None => Err(MalformedSignature("wildcard without bounds")),
                    }
                }
            }
            other => Ok(TypeArgument::Exact(other.accept(self)?)),
        }
    }

    fn type_parameter(&mut self, var: &TypeVarDef) -> Result<TypeParameter, MalformedSignature> {
        let mut bounds = var
            .bounds
            .iter()
            .map(|bound| bound.accept(self))
            .collect::<Result<Vec<_>, _>>()?;
        let interface_first = var
            .bounds
            .first()
            .and_then(|bound| bound.try_erasure().ok())
            .is_some_and(|erasure| erasure.is_interface(self.store));
        let class_bound = if bounds.is_empty() {
            Some(TypeSignature::Class(object_signature(self.store)))
        } else if interface_first {
            None
        } else {
            Some(bounds.remove(0))
        };
        Ok(TypeParameter {
            name: var.symbol.to_string(),
            class_bound,
            interface_bounds: bounds,
        })
    }

    fn class_bound(&mut self, ty: &GenericType) -> Result<ClassTypeSignature, MalformedSignature> {
        match ty.accept(self)? {
            TypeSignature::Class(class) => Ok(class),
            _ => Err(MalformedSignature("super type is not a class type")),
        }
    }
}

impl Visitor for SignatureWriter<'_> {
    type Output = Result<TypeSignature, MalformedSignature>;

    fn on_non_generic(&mut self, ty: &ErasedType) -> Self::Output {
        match ty {
            ErasedType::Void => Err(MalformedSignature("void is not a type signature")),
            ErasedType::Primitive(base) => Ok(TypeSignature::Base(*base)),
            ErasedType::Class(id) => Ok(TypeSignature::Class(ClassTypeSignature::raw(
                &binary_to_internal(self.store.name(*id)),
            ))),
            ErasedType::Array(component) => {
                Ok(TypeSignature::Array(Box::new(self.on_non_generic(component)?)))
            }
        }
    }

    fn on_generic_array(&mut self, component: &GenericType) -> Self::Output {
        self.nested(|this| Ok(TypeSignature::Array(Box::new(component.accept(this)?))))
    }

    fn on_parameterized(&mut self, ty: &ParameterizedType) -> Self::Output {
        Ok(TypeSignature::Class(self.class_type(ty)?))
    }

    fn on_wildcard(&mut self, _ty: &WildcardType) -> Self::Output {
        Err(MalformedSignature("wildcard outside of a type argument"))
    }

    fn on_type_variable(&mut self, variable: &TypeVariable) -> Self::Output {
        Ok(TypeSignature::TypeVariable(variable.symbol.to_string()))
    }
}

fn object_signature(store: &TypeStore) -> ClassTypeSignature {
    ClassTypeSignature::raw(&binary_to_internal(store.name(store.well_known().object)))
}

fn degrade<T>(result: Result<T, MalformedSignature>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(target: "nova.types", error = %err, "dropping generic signature");
            None
        }
    }
}

/// The signature of a single type shape.
pub fn type_signature(store: &TypeStore, ty: &GenericType) -> Result<TypeSignature, MalformedSignature> {
    ty.accept(&mut SignatureWriter::new(store))
}

/// The `Signature` attribute text of a class, or `None` if the class is not generic.
pub fn class_generic_signature(store: &TypeStore, def: &ClassDef) -> Option<String> {
    let generic = !def.type_variables.is_empty()
        || def.super_class.as_ref().is_some_and(GenericType::is_generic)
        || def.interfaces.iter().any(GenericType::is_generic);
    if !generic {
        return None;
    }
    let mut writer = SignatureWriter::new(store);
    let signature = (|| -> Result<ClassSignature, MalformedSignature> {
        Ok(ClassSignature {
            type_parameters: def
                .type_variables
                .iter()
                .map(|var| writer.type_parameter(var))
                .collect::<Result<_, _>>()?,
            super_class: match &def.super_class {
                Some(super_class) => writer.class_bound(super_class)?,
                None => object_signature(store),
            },
            interfaces: def
                .interfaces
                .iter()
                .map(|iface| writer.class_bound(iface))
                .collect::<Result<_, _>>()?,
        })
    })();
    degrade(signature).map(|signature| signature.to_string())
}

pub(crate) fn method_generic_signature(
    store: &TypeStore,
    type_variables: &[TypeVarDef],
    parameters: &[GenericType],
    return_type: &GenericType,
    exception_types: &[GenericType],
) -> Option<String> {
    let generic_throws = exception_types.iter().any(GenericType::is_generic);
    let generic = !type_variables.is_empty()
        || parameters.iter().any(GenericType::is_generic)
        || return_type.is_generic()
        || generic_throws;
    if !generic {
        return None;
    }
    let mut writer = SignatureWriter::new(store);
    let signature = (|| -> Result<MethodSignature, MalformedSignature> {
        Ok(MethodSignature {
            type_parameters: type_variables
                .iter()
                .map(|var| writer.type_parameter(var))
                .collect::<Result<_, _>>()?,
            parameters: parameters
                .iter()
                .map(|param| param.accept(&mut writer))
                .collect::<Result<_, _>>()?,
            return_type: match return_type {
                GenericType::NonGeneric(ErasedType::Void) => None,
                other => Some(other.accept(&mut writer)?),
            },
            throws: if generic_throws {
                exception_types
                    .iter()
                    .map(|thrown| thrown.accept(&mut writer))
                    .collect::<Result<_, _>>()?
            } else {
                Vec::new()
            },
        })
    })();
    degrade(signature).map(|signature| signature.to_string())
}

pub(crate) fn field_generic_signature(store: &TypeStore, ty: &GenericType) -> Option<String> {
    if !ty.is_generic() {
        return None;
    }
    degrade(type_signature(store, ty)).map(|signature| signature.to_string())
}
