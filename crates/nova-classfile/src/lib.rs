#![forbid(unsafe_code)]
//! Binary-level vocabulary shared by the shape model: descriptors, generic signatures, access
//! flags, annotation values and the declaration stubs a type source hands out.

mod access;
mod annotation;
mod descriptor;
mod error;
mod signature;
mod stub;

pub use crate::access::AccessFlags;
pub use crate::annotation::{descriptor_to_internal_name, Annotation, ConstValue, ElementValue};
pub use crate::descriptor::{
    binary_to_internal, internal_to_binary, parse_field_descriptor, parse_method_descriptor,
};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSignature, FieldTypeSignature, MethodSignature, SimpleClassTypeSignature,
    TypeArgument, TypeParameter, TypeSignature,
};
pub use crate::stub::{FieldStub, MethodStub, ParameterStub, TypeStub};
