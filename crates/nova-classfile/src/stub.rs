use crate::annotation::{Annotation, ElementValue};
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, FieldType, MethodDescriptor};
use crate::error::Result;
use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    FieldTypeSignature, MethodSignature,
};

/// A declared type as handed out by a type source: raw names, descriptors and the
/// unparsed signature attribute text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeStub {
    /// Binary name (`java.util.Map$Entry`).
    pub binary_name: String,
    pub access_flags: u16,
    pub super_binary_name: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    /// Binary name of the lexically enclosing type, for member classes.
    pub declaring_type: Option<String>,
    pub annotations: Vec<Annotation>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStub {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub access_flags: u16,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodStub {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub access_flags: u16,
    /// Internal names from the `Exceptions` attribute.
    pub exceptions: Vec<String>,
    pub annotations: Vec<Annotation>,
    /// `AnnotationDefault` attribute value.
    pub default_value: Option<ElementValue>,
    /// `MethodParameters` attribute entries; empty when absent.
    pub parameters: Vec<ParameterStub>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStub {
    pub name: Option<String>,
    pub access_flags: Option<u16>,
}

impl TypeStub {
    pub fn parsed_signature(&self) -> Option<Result<ClassSignature>> {
        self.signature.as_deref().map(parse_class_signature)
    }
}

impl FieldStub {
    pub fn parsed_descriptor(&self) -> Result<FieldType> {
        parse_field_descriptor(&self.descriptor)
    }

    pub fn parsed_signature(&self) -> Option<Result<FieldTypeSignature>> {
        self.signature.as_deref().map(parse_field_signature)
    }
}

impl MethodStub {
    pub fn parsed_descriptor(&self) -> Result<MethodDescriptor> {
        parse_method_descriptor(&self.descriptor)
    }

    pub fn parsed_signature(&self) -> Option<Result<MethodSignature>> {
        self.signature.as_deref().map(parse_method_signature)
    }
}
