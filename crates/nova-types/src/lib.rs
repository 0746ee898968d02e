//! Structural model of JVM types, methods and method shapes.
//!
//! Three views of every declaration are kept apart:
//!
//! * the *erased* view ([`ErasedType`]), which is what the binary format and the runtime's
//!   dispatch rules see,
//! * the *declared* generic view ([`GenericType`] trees as written on the declaration), and
//! * the *use-site* view, obtained by pushing a [`Substitutor`] through a declaration (for
//!   example when a method of `List<E>` is looked at through `List<String>`).
//!
//! Declarations live in a [`TypeStore`] arena and are referenced by [`ClassId`] handles; type
//! variables refer back to their declaring class through such a handle and never own it.
//! Methods can be detached into context-free [`Token`]s and re-attached to other classes.

#![forbid(unsafe_code)]

mod erased;
mod error;
mod field;
mod generic;
mod hierarchy;
pub mod method;
mod signature;
mod store;
mod visitor;

pub use crate::erased::ErasedType;
pub use crate::error::ShapeError;
pub use crate::field::FieldDescription;
pub use crate::generic::{
    GenericType, ParameterizedType, Sort, TypeVariable, VariableSource, WildcardType,
};
pub use crate::hierarchy::{ErasedView, TypeHierarchy, TypeRepresentation, TypeView};
pub use crate::method::{
    BootstrapArgument, MethodDescription, ParameterDescription, ParameterToken, Token, TypeToken,
};
pub use crate::signature::{class_generic_signature, type_signature, MalformedSignature};
pub use crate::store::{
    ClassDef, ClassId, ClassKind, FieldDef, MethodDef, ParameterDef, TypeStore, TypeVarDef,
    WellKnownTypes, CONSTRUCTOR_INTERNAL_NAME, TYPE_INITIALIZER_INTERNAL_NAME,
};
pub use crate::visitor::{
    Attachment, ClassScope, Detachment, Substitutor, TypeBinding, TypeVariableSource, Visitor,
};

pub use nova_classfile::{AccessFlags, Annotation, BaseType, ConstValue, ElementValue};
