use std::collections::HashMap;

use smol_str::SmolStr;

use crate::erased::ErasedType;
use crate::generic::{GenericType, ParameterizedType, TypeVariable, VariableSource, WildcardType};
use crate::store::{ClassId, TypeStore};

/// One callback per [`crate::Sort`]; [`GenericType::accept`] dispatches exhaustively.
pub trait Visitor {
    type Output;

    fn on_non_generic(&mut self, ty: &ErasedType) -> Self::Output;
    fn on_generic_array(&mut self, component: &GenericType) -> Self::Output;
    fn on_parameterized(&mut self, ty: &ParameterizedType) -> Self::Output;
    fn on_wildcard(&mut self, ty: &WildcardType) -> Self::Output;
    fn on_type_variable(&mut self, variable: &TypeVariable) -> Self::Output;
}

/// A shape-to-shape transformation. Only type variables must be handled; the provided methods
/// rebuild every other node from its substituted children.
pub trait Substitutor {
    fn on_type_variable(&self, variable: &TypeVariable) -> GenericType;

    fn on_non_generic(&self, ty: &ErasedType) -> GenericType {
        GenericType::NonGeneric(ty.clone())
    }

    fn on_generic_array(&self, component: &GenericType) -> GenericType {
        GenericType::array(self.substitute(component))
    }

    fn on_parameterized(&self, ty: &ParameterizedType) -> GenericType {
        GenericType::Parameterized(ParameterizedType {
            raw: self.on_raw_type(ty.raw),
            arguments: ty
                .arguments
                .iter()
                .map(|argument| self.on_type_argument(argument))
                .collect(),
            owner: ty.owner.as_deref().map(|owner| Box::new(self.substitute(owner))),
        })
    }

    fn on_wildcard(&self, ty: &WildcardType) -> GenericType {
        GenericType::Wildcard(WildcardType::from_bounds(
            ty.upper_bounds().iter().map(|b| self.substitute(b)).collect(),
            ty.lower_bounds().iter().map(|b| self.substitute(b)).collect(),
        ))
    }

    /// A type argument of a parameterized type, the one position where a wildcard may stand.
    fn on_type_argument(&self, argument: &GenericType) -> GenericType {
        self.substitute(argument)
    }

    fn on_raw_type(&self, raw: ClassId) -> ClassId {
        raw
    }

    fn substitute(&self, ty: &GenericType) -> GenericType {
        match ty {
            GenericType::NonGeneric(erased) => self.on_non_generic(erased),
            GenericType::GenericArray(component) => self.on_generic_array(component),
            GenericType::Parameterized(parameterized) => self.on_parameterized(parameterized),
            GenericType::Wildcard(wildcard) => self.on_wildcard(wildcard),
            GenericType::TypeVariable(variable) => self.on_type_variable(variable),
        }
    }
}

/// A declaration that introduces type variables: a class or a method.
pub trait TypeVariableSource {
    fn store(&self) -> &TypeStore;

    /// A variable declared directly by this source.
    fn declared_variable(&self, symbol: &str) -> Option<TypeVariable>;

    /// The source consulted when a symbol is not declared here.
    fn enclosing_source(&self) -> Option<ClassScope<'_>>;

    fn find_variable(&self, symbol: &str) -> Option<TypeVariable> {
        self.declared_variable(symbol).or_else(|| {
            self.enclosing_source()
                .and_then(|enclosing| enclosing.find_variable(symbol))
        })
    }
}

/// The type variables visible inside a class body.
#[derive(Clone, Copy, Debug)]
pub struct ClassScope<'p> {
    store: &'p TypeStore,
    id: ClassId,
}

impl<'p> ClassScope<'p> {
    pub fn new(store: &'p TypeStore, id: ClassId) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }
}

impl TypeVariableSource for ClassScope<'_> {
    fn store(&self) -> &TypeStore {
        self.store
    }

    fn declared_variable(&self, symbol: &str) -> Option<TypeVariable> {
        self.store
            .def(self.id)
            .type_variables
            .iter()
            .find(|var| var.symbol == symbol)
            .map(|var| {
                TypeVariable::new(
                    var.symbol.clone(),
                    VariableSource::Type(self.id),
                    var.erasure(self.store),
                )
            })
    }

    fn enclosing_source(&self) -> Option<ClassScope<'_>> {
        let def = self.store.def(self.id);
        if def.access_flags.is_static() {
            return None;
        }
        def.declaring_type.map(|id| ClassScope::new(self.store, id))
    }
}

/// Strips declaration context from a shape.
///
/// Type variables accepted by `erase` become their erasure; all others become symbolic
/// [`VariableSource::Detached`] placeholders. After [`Detachment::retargeting`], references to
/// the given class also become the `TargetType` placeholder.
pub struct Detachment<'a> {
    retarget: Option<ClassId>,
    target: ClassId,
    erase: &'a dyn Fn(&TypeVariable) -> bool,
}

impl<'a> Detachment<'a> {
    pub fn new(store: &TypeStore, erase: &'a dyn Fn(&TypeVariable) -> bool) -> Self {
        Self {
            retarget: None,
            target: store.well_known().target_type,
            erase,
        }
    }

    /// Replaces every reference to `declaring` with the `TargetType` placeholder.
    pub fn retargeting(mut self, declaring: ClassId) -> Self {
        self.retarget = Some(declaring);
        self
    }

    fn detach_erasure(&self, erased: &ErasedType) -> ErasedType {
        match self.retarget {
            Some(declaring) => erased.replace_class(declaring, self.target),
            None => erased.clone(),
        }
    }
}

impl Substitutor for Detachment<'_> {
    fn on_type_variable(&self, variable: &TypeVariable) -> GenericType {
        let erasure = self.detach_erasure(&variable.erasure);
        if variable.is_detached() {
            GenericType::TypeVariable(variable.clone())
        } else if (self.erase)(variable) {
            GenericType::NonGeneric(erasure)
        } else {
            GenericType::variable(variable.symbol.clone(), VariableSource::Detached, erasure)
        }
    }

    fn on_non_generic(&self, ty: &ErasedType) -> GenericType {
        GenericType::NonGeneric(self.detach_erasure(ty))
    }

    fn on_raw_type(&self, raw: ClassId) -> ClassId {
        match self.retarget {
            Some(declaring) if declaring == raw => self.target,
            _ => raw,
        }
    }
}

enum AttachmentContext<'a> {
    Source(&'a dyn TypeVariableSource),
    Explicit(&'a HashMap<SmolStr, GenericType>),
}

/// Resolves detached placeholders against a new context and maps `TargetType` to the new
/// declaring class.
///
/// Symbols the context cannot resolve stay detached.
pub struct Attachment<'a> {
    context: AttachmentContext<'a>,
    declaring: ClassId,
    target: ClassId,
}

impl<'a> Attachment<'a> {
    pub fn of(source: &'a dyn TypeVariableSource, declaring: ClassId) -> Self {
        Self {
            target: source.store().well_known().target_type,
            context: AttachmentContext::Source(source),
            declaring,
        }
    }

    pub fn explicit(
        store: &TypeStore,
        mapping: &'a HashMap<SmolStr, GenericType>,
        declaring: ClassId,
    ) -> Self {
        Self {
            context: AttachmentContext::Explicit(mapping),
            declaring,
            target: store.well_known().target_type,
        }
    }

    fn attach_erasure(&self, erased: &ErasedType) -> ErasedType {
        erased.replace_class(self.target, self.declaring)
    }
}

impl Substitutor for Attachment<'_> {
    fn on_type_variable(&self, variable: &TypeVariable) -> GenericType {
        if !variable.is_detached() {
            return GenericType::TypeVariable(variable.clone());
        }
        let resolved = match &self.context {
            AttachmentContext::Source(source) => source
                .find_variable(&variable.symbol)
                .map(GenericType::TypeVariable),
            AttachmentContext::Explicit(mapping) => mapping.get(&variable.symbol).cloned(),
        };
        resolved.unwrap_or_else(|| {
            tracing::debug!(
                target: "nova.types",
                symbol = %variable.symbol,
                "type variable not resolvable in attachment context"
            );
            GenericType::TypeVariable(variable.clone())
        })
    }

    fn on_non_generic(&self, ty: &ErasedType) -> GenericType {
        GenericType::NonGeneric(self.attach_erasure(ty))
    }

    fn on_raw_type(&self, raw: ClassId) -> ClassId {
        if raw == self.target {
            self.declaring
        } else {
            raw
        }
    }
}

/// Binds the type variables of a parameterized type (and of its owner types) to its arguments.
///
/// Outside of a type argument position a bound wildcard collapses to its first upper bound, or to
/// the root object type for `? super T`, so that the result always has an erasure.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeBinding {
    bindings: HashMap<(ClassId, SmolStr), GenericType>,
    object: ClassId,
}

impl TypeBinding {
    pub fn of(store: &TypeStore, ty: &ParameterizedType) -> Self {
        let mut binding = Self {
            bindings: HashMap::new(),
            object: store.well_known().object,
        };
        binding.bind(store, ty);
        binding
    }

    fn bind(&mut self, store: &TypeStore, ty: &ParameterizedType) {
        let def = store.def(ty.raw);
        for (var, argument) in def.type_variables.iter().zip(&ty.arguments) {
            self.bindings
                .insert((ty.raw, var.symbol.clone()), argument.clone());
        }
        if let Some(GenericType::Parameterized(owner)) = ty.owner.as_deref() {
            self.bind(store, owner);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn lookup(&self, variable: &TypeVariable) -> Option<&GenericType> {
        match variable.source {
            VariableSource::Type(id) => self.bindings.get(&(id, variable.symbol.clone())),
            VariableSource::Method | VariableSource::Detached => None,
        }
    }
}

impl Substitutor for TypeBinding {
    fn on_type_variable(&self, variable: &TypeVariable) -> GenericType {
        match self.lookup(variable) {
            Some(GenericType::Wildcard(wildcard)) => wildcard
                .upper_bounds()
                .first()
                .cloned()
                .unwrap_or_else(|| GenericType::class(self.object)),
            Some(bound) => bound.clone(),
            None => GenericType::TypeVariable(variable.clone()),
        }
    }

    fn on_type_argument(&self, argument: &GenericType) -> GenericType {
        match argument {
            GenericType::TypeVariable(variable) => match self.lookup(variable) {
                Some(bound) => bound.clone(),
                None => GenericType::TypeVariable(variable.clone()),
            },
            other => self.substitute(other),
        }
    }
}
