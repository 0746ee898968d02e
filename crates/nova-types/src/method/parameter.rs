use nova_classfile::AccessFlags;

use crate::generic::GenericType;
use crate::method::token::ParameterToken;
use crate::visitor::Substitutor;

/// A parameter of a method shape, with its position in the parameter list and in the local
/// variable array.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDescription {
    ty: GenericType,
    index: usize,
    offset: usize,
    name: Option<String>,
    modifiers: Option<AccessFlags>,
}

impl ParameterDescription {
    pub(crate) fn new(
        ty: GenericType,
        index: usize,
        offset: usize,
        name: Option<String>,
        modifiers: Option<AccessFlags>,
    ) -> Self {
        Self {
            ty,
            index,
            offset,
            name,
            modifiers,
        }
    }

    pub fn ty(&self) -> &GenericType {
        &self.ty
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Local variable slot, counting the receiver of instance methods and two slots for
    /// `long`/`double` predecessors.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// The declared name, or the synthetic `argN` name.
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("arg{}", self.index),
        }
    }

    pub fn has_modifiers(&self) -> bool {
        self.modifiers.is_some()
    }

    pub fn modifiers(&self) -> AccessFlags {
        self.modifiers.unwrap_or(AccessFlags::EMPTY)
    }

    pub fn as_token(&self, detachment: &dyn Substitutor) -> ParameterToken {
        ParameterToken {
            ty: detachment.substitute(&self.ty),
            name: self.name.clone(),
            modifiers: self.modifiers,
        }
    }
}
