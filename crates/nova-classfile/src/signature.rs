//! Generic signatures (JVMS 4.7.9.1): parsing from attribute text and rendering back.

use std::fmt;

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSignature {
    Base(BaseType),
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

/// Field signatures are reference type signatures.
pub type FieldTypeSignature = TypeSignature;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTypeSignature {
    /// Package in internal form without the trailing slash (`java/util`), empty for the default
    /// package.
    pub package: String,
    /// Outermost class first; nested classes follow as `.Inner` suffixes.
    pub segments: Vec<SimpleClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArgument {
    Any,
    Exact(TypeSignature),
    Extends(TypeSignature),
    Super(TypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

impl ClassTypeSignature {
    /// A signature naming a top-level class without type arguments.
    pub fn raw(internal_name: &str) -> Self {
        let (package, name) = match internal_name.rfind('/') {
            Some(idx) => (&internal_name[..idx], &internal_name[idx + 1..]),
            None => ("", internal_name),
        };
        Self {
            package: package.to_string(),
            segments: vec![SimpleClassTypeSignature {
                name: name.to_string(),
                type_arguments: Vec::new(),
            }],
        }
    }

    /// Internal name of the innermost class (`java/util/Map$Entry`).
    pub fn internal_name(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&self.package);
            out.push('/');
        }
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('$');
            }
            out.push_str(&segment.name);
        }
        out
    }
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut parser = Parser::new(sig);
    let type_parameters = parser.type_parameters()?;
    let super_class = parser.class_type()?;
    let mut interfaces = Vec::new();
    while !parser.at_end() {
        interfaces.push(parser.class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut parser = Parser::new(sig);
    let type_parameters = parser.type_parameters()?;
    parser.expect('(')?;
    let mut parameters = Vec::new();
    while !parser.eat(')') {
        parameters.push(parser.java_type()?);
    }
    let return_type = if parser.eat('V') {
        None
    } else {
        Some(parser.java_type()?)
    };
    let mut throws = Vec::new();
    while parser.eat('^') {
        let thrown = match parser.peek() {
            Some('T') => parser.type_variable()?,
            _ => TypeSignature::Class(parser.class_type()?),
        };
        throws.push(thrown);
    }
    parser.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<FieldTypeSignature> {
    let mut parser = Parser::new(sig);
    let ty = parser.reference_type()?;
    parser.finish()?;
    Ok(ty)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, reason: &'static str) -> Error {
        Error::signature(self.input, reason)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error("unexpected character"))
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    /// Reads an identifier up to (not including) one of the terminators.
    fn identifier(&mut self, terminators: &[char]) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if terminators.contains(&c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(self.error("empty identifier"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut out = Vec::new();
        if !self.eat('<') {
            return Ok(out);
        }
        while !self.eat('>') {
            let name = self.identifier(&[':', '>', ';', '<'])?;
            self.expect(':')?;
            let class_bound = match self.peek() {
                Some(':') | Some('>') => None,
                _ => Some(self.reference_type()?),
            };
            let mut interface_bounds = Vec::new();
            while self.eat(':') {
                interface_bounds.push(self.reference_type()?);
            }
            out.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
        }
        if out.is_empty() {
            return Err(self.error("empty type parameter list"));
        }
        Ok(out)
    }

    fn java_type(&mut self) -> Result<TypeSignature> {
        if let Some(base) = self.peek().and_then(BaseType::from_descriptor_char) {
            self.bump();
            return Ok(TypeSignature::Base(base));
        }
        self.reference_type()
    }

    fn reference_type(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some('L') => Ok(TypeSignature::Class(self.class_type()?)),
            Some('T') => self.type_variable(),
            Some('[') => {
                self.bump();
                Ok(TypeSignature::Array(Box::new(self.java_type()?)))
            }
            Some(_) => Err(self.error("expected a reference type")),
            None => Err(self.error("unexpected end of signature")),
        }
    }

    fn type_variable(&mut self) -> Result<TypeSignature> {
        self.expect('T')?;
        let name = self.identifier(&[';', '<', '>', ':', '.', '/'])?;
        self.expect(';')?;
        Ok(TypeSignature::TypeVariable(name))
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.expect('L')?;
        let first = self.identifier(&['<', ';', '.'])?;
        let (package, name) = match first.rfind('/') {
            Some(idx) => (first[..idx].to_string(), first[idx + 1..].to_string()),
            None => (String::new(), first),
        };
        if name.is_empty() {
            return Err(self.error("empty class name"));
        }
        let mut segments = vec![SimpleClassTypeSignature {
            type_arguments: self.type_arguments()?,
            name,
        }];
        while self.eat('.') {
            let name = self.identifier(&['<', ';', '.'])?;
            segments.push(SimpleClassTypeSignature {
                type_arguments: self.type_arguments()?,
                name,
            });
        }
        self.expect(';')?;
        Ok(ClassTypeSignature { package, segments })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut out = Vec::new();
        if !self.eat('<') {
            return Ok(out);
        }
        while !self.eat('>') {
            let arg = match self.peek() {
                Some('*') => {
                    self.bump();
                    TypeArgument::Any
                }
                Some('+') => {
                    self.bump();
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some('-') => {
                    self.bump();
                    TypeArgument::Super(self.reference_type()?)
                }
                _ => TypeArgument::Exact(self.reference_type()?),
            };
            out.push(arg);
        }
        if out.is_empty() {
            return Err(self.error("empty type argument list"));
        }
        Ok(out)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Base(base) => write!(f, "{}", base.descriptor_char()),
            TypeSignature::Class(class) => fmt::Display::fmt(class, f),
            TypeSignature::TypeVariable(name) => write!(f, "T{name};"),
            TypeSignature::Array(component) => write!(f, "[{component}"),
        }
    }
}

impl fmt::Display for ClassTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("L")?;
        if !self.package.is_empty() {
            write!(f, "{}/", self.package)?;
        }
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
            if !segment.type_arguments.is_empty() {
                f.write_str("<")?;
                for arg in &segment.type_arguments {
                    fmt::Display::fmt(arg, f)?;
                }
                f.write_str(">")?;
            }
        }
        f.write_str(";")
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArgument::Any => f.write_str("*"),
            TypeArgument::Exact(ty) => fmt::Display::fmt(ty, f),
            TypeArgument::Extends(ty) => write!(f, "+{ty}"),
            TypeArgument::Super(ty) => write!(f, "-{ty}"),
        }
    }
}

fn write_type_parameters(f: &mut fmt::Formatter<'_>, params: &[TypeParameter]) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for param in params {
        write!(f, "{}:", param.name)?;
        if let Some(bound) = &param.class_bound {
            fmt::Display::fmt(bound, f)?;
        }
        for bound in &param.interface_bounds {
            write!(f, ":{bound}")?;
        }
    }
    f.write_str(">")
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        fmt::Display::fmt(&self.super_class, f)?;
        for iface in &self.interfaces {
            fmt::Display::fmt(iface, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        f.write_str("(")?;
        for param in &self.parameters {
            fmt::Display::fmt(param, f)?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(ty) => fmt::Display::fmt(ty, f)?,
            None => f.write_str("V")?,
        }
        for thrown in &self.throws {
            write!(f, "^{thrown}")?;
        }
        Ok(())
    }
}
