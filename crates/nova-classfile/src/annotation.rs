use crate::descriptor::internal_to_binary;

/// An annotation as recorded on a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_descriptor: String,
    pub type_internal_name: Option<String>,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub fn new(type_descriptor: impl Into<String>) -> Self {
        let type_descriptor = type_descriptor.into();
        let type_internal_name = descriptor_to_internal_name(&type_descriptor);
        Self {
            type_descriptor,
            type_internal_name,
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, name: impl Into<String>, value: ElementValue) -> Self {
        self.elements.push((name.into(), value));
        self
    }

    /// Binary name of the annotation type (`java.lang.Deprecated`).
    pub fn type_binary_name(&self) -> Option<String> {
        self.type_internal_name.as_deref().map(internal_to_binary)
    }

    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }
}

/// The value of an annotation element, also used for annotation default values.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// A class literal, by return descriptor (`Ljava/lang/String;`, `I`, `V`).
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl ConstValue {
    /// Name of the runtime representation of this constant (`Integer`, `String`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            ConstValue::Byte(_) => "Byte",
            ConstValue::Char(_) => "Character",
            ConstValue::Short(_) => "Short",
            ConstValue::Int(_) => "Integer",
            ConstValue::Long(_) => "Long",
            ConstValue::Float(_) => "Float",
            ConstValue::Double(_) => "Double",
            ConstValue::Boolean(_) => "Boolean",
            ConstValue::String(_) => "String",
        }
    }
}

pub fn descriptor_to_internal_name(desc: &str) -> Option<String> {
    desc.strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .map(|name| name.to_string())
}
