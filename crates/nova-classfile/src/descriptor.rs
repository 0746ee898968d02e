use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub const ALL: [BaseType; 8] = [
        BaseType::Boolean,
        BaseType::Byte,
        BaseType::Char,
        BaseType::Short,
        BaseType::Int,
        BaseType::Long,
        BaseType::Float,
        BaseType::Double,
    ];

    pub fn from_descriptor_char(c: char) -> Option<Self> {
        Some(match c {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    pub fn descriptor_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    /// The Java keyword naming this type (`int`, `boolean`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }

    /// Number of operand stack slots a value of this type occupies.
    pub fn stack_size(self) -> usize {
        match self {
            BaseType::Long | BaseType::Double => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// An object type, by internal name (`java/lang/String`).
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn object(internal_name: impl Into<String>) -> Self {
        FieldType::Object(internal_name.into())
    }

    pub fn array_of(component: FieldType) -> Self {
        FieldType::Array(Box::new(component))
    }

    pub fn write_descriptor(&self, out: &mut String) {
        match self {
            FieldType::Base(base) => out.push(base.descriptor_char()),
            FieldType::Object(internal) => {
                out.push('L');
                out.push_str(internal);
                out.push(';');
            }
            FieldType::Array(component) => {
                out.push('[');
                component.write_descriptor(out);
            }
        }
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            param.write_descriptor(&mut out);
        }
        out.push(')');
        match &self.return_type {
            ReturnType::Void => out.push('V'),
            ReturnType::Type(ty) => ty.write_descriptor(&mut out),
        }
        out
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// `java/util/Map$Entry` -> `java.util.Map$Entry`.
pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// `java.util.Map$Entry` -> `java/util/Map$Entry`.
pub fn binary_to_internal(binary: &str) -> String {
    binary.replace('.', "/")
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc).ok_or_else(|| invalid(desc))?;
    if !rest.is_empty() {
        return Err(invalid(desc));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let mut rest = desc.strip_prefix('(').ok_or_else(|| invalid(desc))?;

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        let (param, after) = parse_field_type(rest).ok_or_else(|| invalid(desc))?;
        params.push(param);
        rest = after;
    }

    let (return_type, rest) = match rest.strip_prefix('V') {
        Some(after) => (ReturnType::Void, after),
        None => {
            let (ty, after) = parse_field_type(rest).ok_or_else(|| invalid(desc))?;
            (ReturnType::Type(ty), after)
        }
    };

    if !rest.is_empty() {
        return Err(invalid(desc));
    }

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn invalid(desc: &str) -> Error {
    Error::InvalidDescriptor(desc.to_string())
}

fn parse_field_type(input: &str) -> Option<(FieldType, &str)> {
    let first = input.chars().next()?;
    if let Some(base) = BaseType::from_descriptor_char(first) {
        return Some((FieldType::Base(base), &input[1..]));
    }
    match first {
        'L' => {
            let end = input.find(';')?;
            let name = &input[1..end];
            if name.is_empty() {
                return None;
            }
            Some((FieldType::Object(name.to_string()), &input[end + 1..]))
        }
        '[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Some((FieldType::Array(Box::new(component)), rest))
        }
        _ => None,
    }
}
