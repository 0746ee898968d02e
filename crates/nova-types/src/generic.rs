use std::fmt;

use nova_classfile::BaseType;
use smol_str::SmolStr;

use crate::erased::ErasedType;
use crate::error::ShapeError;
use crate::store::{ClassId, TypeStore};
use crate::visitor::{Substitutor, Visitor};

/// Variant tag of a [`GenericType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sort {
    NonGeneric,
    GenericArray,
    Parameterized,
    Wildcard,
    TypeVariable,
}

impl Sort {
    pub fn is_non_generic(self) -> bool {
        self == Sort::NonGeneric
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sort::NonGeneric => "non-generic",
            Sort::GenericArray => "generic array",
            Sort::Parameterized => "parameterized",
            Sort::Wildcard => "wildcard",
            Sort::TypeVariable => "type variable",
        })
    }
}

/// A type shape as written in a generic declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenericType {
    NonGeneric(ErasedType),
    /// An array whose component is generic (`T[]`, `List<String>[]`).
    GenericArray(Box<GenericType>),
    Parameterized(ParameterizedType),
    Wildcard(WildcardType),
    TypeVariable(TypeVariable),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParameterizedType {
    pub raw: ClassId,
    pub arguments: Vec<GenericType>,
    /// Enclosing parameterization of an inner class (`Outer<String>.Inner<T>`).
    pub owner: Option<Box<GenericType>>,
}

/// `?`, `? extends T` or `? super T`.
///
/// Exactly one of the two bound lists is non-empty: `? super T` keeps its single lower bound and
/// no upper bound, the unbounded wildcard is `? extends Object`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WildcardType {
    upper_bounds: Vec<GenericType>,
    lower_bounds: Vec<GenericType>,
}

impl WildcardType {
    pub fn unbounded(store: &TypeStore) -> Self {
        Self::upper(GenericType::class(store.well_known().object))
    }

    pub fn upper(bound: GenericType) -> Self {
        Self {
            upper_bounds: vec![bound],
            lower_bounds: Vec::new(),
        }
    }

    pub fn lower(bound: GenericType) -> Self {
        Self {
            upper_bounds: Vec::new(),
            lower_bounds: vec![bound],
        }
    }

    pub(crate) fn from_bounds(upper_bounds: Vec<GenericType>, lower_bounds: Vec<GenericType>) -> Self {
        Self {
            upper_bounds,
            lower_bounds,
        }
    }

    pub fn upper_bounds(&self) -> &[GenericType] {
        &self.upper_bounds
    }

    pub fn lower_bounds(&self) -> &[GenericType] {
        &self.lower_bounds
    }

    pub fn is_unbounded(&self, store: &TypeStore) -> bool {
        self.lower_bounds.is_empty()
            && matches!(
                self.upper_bounds.as_slice(),
                [GenericType::NonGeneric(ErasedType::Class(id))] if *id == store.well_known().object
            )
    }
}

/// Where a type variable is declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableSource {
    Type(ClassId),
    /// Declared by the method whose shape contains the reference.
    Method,
    /// A symbolic placeholder inside a token, not bound to any declaration.
    Detached,
}

/// A reference to a type variable. Bounds live with the declaration and are looked up through
/// the source; the erasure is kept so that erasure never needs a lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVariable {
    pub symbol: SmolStr,
    pub source: VariableSource,
    pub erasure: ErasedType,
}

impl TypeVariable {
    pub fn new(symbol: impl Into<SmolStr>, source: VariableSource, erasure: ErasedType) -> Self {
        Self {
            symbol: symbol.into(),
            source,
            erasure,
        }
    }

    pub fn is_detached(&self) -> bool {
        self.source == VariableSource::Detached
    }
}

impl GenericType {
    pub fn void() -> Self {
        GenericType::NonGeneric(ErasedType::Void)
    }

    pub fn primitive(base: BaseType) -> Self {
        GenericType::NonGeneric(ErasedType::Primitive(base))
    }

    pub fn class(id: ClassId) -> Self {
        GenericType::NonGeneric(ErasedType::Class(id))
    }

    /// An array of `component`; non-generic when the component is.
    pub fn array(component: GenericType) -> Self {
        match component {
            GenericType::NonGeneric(erased) => GenericType::NonGeneric(ErasedType::array_of(erased)),
            other => GenericType::GenericArray(Box::new(other)),
        }
    }

    pub fn parameterized(raw: ClassId, arguments: Vec<GenericType>) -> Self {
        GenericType::Parameterized(ParameterizedType {
            raw,
            arguments,
            owner: None,
        })
    }

    pub fn variable(symbol: impl Into<SmolStr>, source: VariableSource, erasure: ErasedType) -> Self {
        GenericType::TypeVariable(TypeVariable::new(symbol, source, erasure))
    }

    pub fn sort(&self) -> Sort {
        match self {
            GenericType::NonGeneric(_) => Sort::NonGeneric,
            GenericType::GenericArray(_) => Sort::GenericArray,
            GenericType::Parameterized(_) => Sort::Parameterized,
            GenericType::Wildcard(_) => Sort::Wildcard,
            GenericType::TypeVariable(_) => Sort::TypeVariable,
        }
    }

    /// Whether this shape carries any generic information.
    pub fn is_generic(&self) -> bool {
        !self.sort().is_non_generic()
    }

    /// The raw projection of this shape.
    ///
    /// # Panics
    ///
    /// Panics for a wildcard, which has no erasure. Use [`GenericType::try_erasure`] when the
    /// shape may be one.
    pub fn erasure(&self) -> ErasedType {
        match self.try_erasure() {
            Ok(erased) => erased,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_erasure(&self) -> Result<ErasedType, ShapeError> {
        match self {
            GenericType::NonGeneric(erased) => Ok(erased.clone()),
            GenericType::GenericArray(component) => Ok(ErasedType::array_of(component.try_erasure()?)),
            GenericType::Parameterized(ty) => Ok(ErasedType::Class(ty.raw)),
            GenericType::Wildcard(_) => Err(ShapeError::WildcardErasure),
            GenericType::TypeVariable(var) => Ok(var.erasure.clone()),
        }
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            GenericType::NonGeneric(erased) => visitor.on_non_generic(erased),
            GenericType::GenericArray(component) => visitor.on_generic_array(component),
            GenericType::Parameterized(ty) => visitor.on_parameterized(ty),
            GenericType::Wildcard(ty) => visitor.on_wildcard(ty),
            GenericType::TypeVariable(var) => visitor.on_type_variable(var),
        }
    }

    pub fn substitute<S: Substitutor + ?Sized>(&self, substitutor: &S) -> GenericType {
        substitutor.substitute(self)
    }

    pub fn component_type(&self) -> Option<GenericType> {
        match self {
            GenericType::GenericArray(component) => Some((**component).clone()),
            GenericType::NonGeneric(ErasedType::Array(component)) => {
                Some(GenericType::NonGeneric((**component).clone()))
            }
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<&SmolStr> {
        match self {
            GenericType::TypeVariable(var) => Some(&var.symbol),
            _ => None,
        }
    }

    pub fn type_arguments(&self) -> &[GenericType] {
        match self {
            GenericType::Parameterized(ty) => &ty.arguments,
            _ => &[],
        }
    }

    pub fn owner_type(&self) -> Option<&GenericType> {
        match self {
            GenericType::Parameterized(ty) => ty.owner.as_deref(),
            _ => None,
        }
    }

    /// Source-like rendering (`java.util.Map<K, ? extends java.lang.Number>`).
    pub fn type_name(&self, store: &TypeStore) -> String {
        let mut out = String::new();
        self.write_type_name(store, &mut out);
        out
    }

    fn write_type_name(&self, store: &TypeStore, out: &mut String) {
        match self {
            GenericType::NonGeneric(erased) => out.push_str(&erased.type_name(store)),
            GenericType::GenericArray(component) => {
                component.write_type_name(store, out);
                out.push_str("[]");
            }
            GenericType::Parameterized(ty) => {
                match ty.owner.as_deref() {
                    Some(owner) => {
                        owner.write_type_name(store, out);
                        out.push('.');
                        let raw = store.name(ty.raw);
                        let owner_name = owner.try_erasure().map(|e| e.type_name(store));
                        let simple = owner_name
                            .ok()
                            .and_then(|prefix| raw.strip_prefix(prefix.as_str()))
                            .and_then(|rest| rest.strip_prefix('$'))
                            .unwrap_or(raw);
                        out.push_str(simple);
                    }
                    None => out.push_str(store.name(ty.raw)),
                }
                if !ty.arguments.is_empty() {
                    out.push('<');
                    for (idx, arg) in ty.arguments.iter().enumerate() {
                        if idx > 0 {
                            out.push_str(", ");
                        }
                        arg.write_type_name(store, out);
                    }
                    out.push('>');
                }
            }
            GenericType::Wildcard(ty) => {
                if let Some(lower) = ty.lower_bounds.first() {
                    out.push_str("? super ");
                    lower.write_type_name(store, out);
                } else if ty.is_unbounded(store) {
                    out.push('?');
                } else {
                    out.push_str("? extends ");
                    for (idx, bound) in ty.upper_bounds.iter().enumerate() {
                        if idx > 0 {
                            out.push_str(" & ");
                        }
                        bound.write_type_name(store, out);
                    }
                }
            }
            GenericType::TypeVariable(var) => out.push_str(&var.symbol),
        }
    }
}
