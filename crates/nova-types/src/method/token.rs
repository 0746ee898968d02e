use std::hash::{Hash, Hasher};

use nova_classfile::{AccessFlags, Annotation, ElementValue};
use smol_str::SmolStr;

use crate::erased::ErasedType;
use crate::error::ShapeError;
use crate::generic::{GenericType, ParameterizedType, TypeVariable, VariableSource, WildcardType};
use crate::method::MethodDescription;
use crate::store::{ClassId, MethodDef, ParameterDef, TypeStore, TypeVarDef};
use crate::visitor::{Attachment, ClassScope, Substitutor, TypeVariableSource, Visitor};

/// A method shape detached from its declaring class.
///
/// `PartialEq` and `Hash` are structural: internal name plus erased return and parameter types.
/// Use [`Token::is_identical_to`] to compare every attribute.
#[derive(Clone, Debug)]
pub struct Token {
    pub internal_name: String,
    pub modifiers: AccessFlags,
    pub type_variables: Vec<TypeVarDef>,
    pub return_type: GenericType,
    pub parameters: Vec<ParameterToken>,
    pub exception_types: Vec<GenericType>,
    pub annotations: Vec<Annotation>,
    pub default_value: Option<ElementValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterToken {
    pub ty: GenericType,
    pub name: Option<String>,
    pub modifiers: Option<AccessFlags>,
}

/// Erased return and parameter types only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeToken {
    pub return_type: ErasedType,
    pub parameter_types: Vec<ErasedType>,
}

impl Token {
    pub fn is_identical_to(&self, other: &Token) -> bool {
        self.internal_name == other.internal_name
            && self.modifiers == other.modifiers
            && self.type_variables == other.type_variables
            && self.return_type == other.return_type
            && self.parameters == other.parameters
            && self.exception_types == other.exception_types
            && self.annotations == other.annotations
            && self.default_value == other.default_value
    }

    pub fn as_type_token(&self) -> TypeToken {
        TypeToken {
            return_type: self.return_type.erasure(),
            parameter_types: self.parameters.iter().map(|p| p.ty.erasure()).collect(),
        }
    }

    /// Applies `substitutor` to every type shape of this token.
    pub fn accept(&self, substitutor: &dyn Substitutor) -> Token {
        Token {
            internal_name: self.internal_name.clone(),
            modifiers: self.modifiers,
            type_variables: self
                .type_variables
                .iter()
                .map(|var| {
                    TypeVarDef::new(
                        var.symbol.clone(),
                        var.bounds.iter().map(|b| substitutor.substitute(b)).collect(),
                    )
                })
                .collect(),
            return_type: substitutor.substitute(&self.return_type),
            parameters: self
                .parameters
                .iter()
                .map(|param| ParameterToken {
                    ty: substitutor.substitute(&param.ty),
                    name: param.name.clone(),
                    modifiers: param.modifiers,
                })
                .collect(),
            exception_types: self
                .exception_types
                .iter()
                .map(|ty| substitutor.substitute(ty))
                .collect(),
            annotations: self.annotations.clone(),
            default_value: self.default_value.clone(),
        }
    }

    /// Binds this token to `declaring`.
    ///
    /// Symbols are resolved against the token's own type variables first, then against the type
    /// variables visible in `declaring`. `TargetType` references become `declaring`.
    pub fn attach<'p>(
        &self,
        store: &'p TypeStore,
        declaring: ClassId,
    ) -> Result<MethodDescription<'p>, ShapeError> {
        let scope = LatentScope {
            store,
            declaring,
            type_variables: &self.type_variables,
        };
        let attached = self.accept(&Attachment::of(&scope, declaring));
        let def = MethodDef {
            internal_name: attached.internal_name,
            access_flags: attached.modifiers,
            type_variables: attached.type_variables,
            return_type: attached.return_type,
            parameters: attached
                .parameters
                .into_iter()
                .map(|param| ParameterDef {
                    ty: param.ty,
                    name: param.name,
                    access_flags: param.modifiers,
                })
                .collect(),
            exception_types: attached.exception_types,
            annotations: attached.annotations,
            default_value: attached.default_value,
        };
        if let Some(symbol) = first_detached(&def) {
            return Err(ShapeError::UnresolvedTypeVariable { symbol });
        }
        Ok(MethodDescription::latent(store, declaring, def))
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.internal_name == other.internal_name && self.as_type_token() == other.as_type_token()
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.internal_name.hash(state);
        self.as_type_token().hash(state);
    }
}

/// The type variables of a token being attached, in front of its new declaring class.
struct LatentScope<'a> {
    store: &'a TypeStore,
    declaring: ClassId,
    type_variables: &'a [TypeVarDef],
}

impl TypeVariableSource for LatentScope<'_> {
    fn store(&self) -> &TypeStore {
        self.store
    }

    fn declared_variable(&self, symbol: &str) -> Option<TypeVariable> {
        let target = self.store.well_known().target_type;
        self.type_variables
            .iter()
            .find(|var| var.symbol == symbol)
            .map(|var| {
                TypeVariable::new(
                    var.symbol.clone(),
                    VariableSource::Method,
                    var.erasure(self.store).replace_class(target, self.declaring),
                )
            })
    }

    fn enclosing_source(&self) -> Option<ClassScope<'_>> {
        Some(ClassScope::new(self.store, self.declaring))
    }
}

/// Finds a placeholder that survived attachment.
struct DetachedFinder;

impl Visitor for DetachedFinder {
    type Output = Option<SmolStr>;

    fn on_non_generic(&mut self, _ty: &ErasedType) -> Self::Output {
        None
    }

    fn on_generic_array(&mut self, component: &GenericType) -> Self::Output {
        component.accept(self)
    }

    fn on_parameterized(&mut self, ty: &ParameterizedType) -> Self::Output {
        ty.owner
            .iter()
            .map(|owner| &**owner)
            .chain(&ty.arguments)
            .find_map(|ty| ty.accept(&mut *self))
    }

    fn on_wildcard(&mut self, ty: &WildcardType) -> Self::Output {
        ty.upper_bounds()
            .iter()
            .chain(ty.lower_bounds())
            .find_map(|bound| bound.accept(&mut *self))
    }

    fn on_type_variable(&mut self, variable: &TypeVariable) -> Self::Output {
        variable.is_detached().then(|| variable.symbol.clone())
    }
}

fn first_detached(def: &MethodDef) -> Option<SmolStr> {
    def.type_variables
        .iter()
        .flat_map(|var| var.bounds.iter())
        .chain(std::iter::once(&def.return_type))
        .chain(def.parameters.iter().map(|param| &param.ty))
        .chain(&def.exception_types)
        .find_map(|ty| ty.accept(&mut DetachedFinder))
}
