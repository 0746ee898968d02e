use std::fmt;

use nova_classfile::{AccessFlags, Annotation};

use crate::erased::ErasedType;
use crate::generic::GenericType;
use crate::signature::field_generic_signature;
use crate::store::{ClassId, FieldDef, TypeStore};
use crate::visitor::Substitutor;

/// A field as declared, or as seen through a parameterization of its declaring type.
#[derive(Clone)]
pub struct FieldDescription<'p> {
    store: &'p TypeStore,
    declaring_class: ClassId,
    declaring: GenericType,
    def: &'p FieldDef,
    ty: GenericType,
}

impl<'p> FieldDescription<'p> {
    pub fn new(store: &'p TypeStore, declaring: ClassId, def: &'p FieldDef) -> Self {
        Self {
            store,
            declaring_class: declaring,
            declaring: GenericType::class(declaring),
            def,
            ty: def.ty.clone(),
        }
    }

    pub fn substituted(&self, declaring: GenericType, visitor: &dyn Substitutor) -> Self {
        Self {
            store: self.store,
            declaring_class: self.declaring_class,
            declaring,
            def: self.def,
            ty: visitor.substitute(&self.def.ty),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn modifiers(&self) -> AccessFlags {
        self.def.access_flags
    }

    pub fn ty(&self) -> &GenericType {
        &self.ty
    }

    pub fn declaring_type(&self) -> &GenericType {
        &self.declaring
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.def.annotations
    }

    pub fn descriptor(&self) -> String {
        self.ty.erasure().descriptor(self.store)
    }

    pub fn generic_signature(&self) -> Option<String> {
        field_generic_signature(self.store, &self.ty)
    }

    pub fn is_visible_to(&self, ty: &ErasedType) -> bool {
        let declaring = ErasedType::Class(self.declaring_class);
        let flags = self.modifiers();
        declaring.is_visible_to(self.store, ty)
            && (flags.is_public()
                || *ty == declaring
                || (flags.is_protected() && declaring.is_assignable_from(self.store, ty))
                || (!flags.is_private() && ty.is_same_package(self.store, &declaring)))
    }
}

impl PartialEq for FieldDescription<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_class == other.declaring_class && self.name() == other.name()
    }
}

impl fmt::Debug for FieldDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescription")
            .field("declaring_type", &self.declaring.type_name(self.store))
            .field("name", &self.name())
            .field("type", &self.ty.type_name(self.store))
            .finish()
    }
}

impl fmt::Display for FieldDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keywords = self.modifiers().method_keywords();
        if !keywords.is_empty() {
            write!(f, "{keywords} ")?;
        }
        write!(
            f,
            "{} {}.{}",
            self.ty.erasure().name(self.store),
            self.store.name(self.declaring_class),
            self.name()
        )
    }
}
