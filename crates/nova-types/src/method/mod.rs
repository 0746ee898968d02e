//! Method, constructor and type initializer shapes.
//!
//! A [`MethodDescription`] is either the *defined* shape of a declaration (types exactly as
//! written on the declaring class) or a *substituted* shape: the defined shape seen through a
//! parameterization of its declaring type, computed on demand through a
//! [`Substitutor`].

mod bootstrap;
mod parameter;
mod substitution;
mod token;

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use nova_classfile::{AccessFlags, Annotation, BaseType, ConstValue, ElementValue};

use crate::erased::ErasedType;
use crate::error::ShapeError;
use crate::generic::{GenericType, TypeVariable, VariableSource};
use crate::signature::method_generic_signature;
use crate::store::{
    ClassId, MethodDef, TypeStore, TypeVarDef, CONSTRUCTOR_INTERNAL_NAME,
    TYPE_INITIALIZER_INTERNAL_NAME,
};
use crate::visitor::{ClassScope, Detachment, Substitutor, TypeVariableSource};

pub use self::bootstrap::BootstrapArgument;
pub use self::parameter::ParameterDescription;
pub use self::token::{ParameterToken, Token, TypeToken};

use self::substitution::VariableRetainingDelegator;

/// A view of a method declaration.
///
/// Equality and hashing are structural: two descriptions are equal when their internal names and
/// erased return and parameter types match, whatever their declaring type. This is the notion of
/// "same dispatch slot" used for overriding.
#[derive(Clone)]
pub struct MethodDescription<'p> {
    store: &'p TypeStore,
    shape: Shape<'p>,
}

#[derive(Clone)]
enum Shape<'p> {
    Defined {
        declaring: ClassId,
        def: Cow<'p, MethodDef>,
    },
    Substituted(Arc<Substituted<'p>>),
}

pub(crate) struct Substituted<'p> {
    declaring: GenericType,
    defined: MethodDescription<'p>,
    visitor: Arc<dyn Substitutor + Send + Sync + 'p>,
}

impl<'p> MethodDescription<'p> {
    /// The defined shape of a method stored on `declaring`.
    pub fn new(store: &'p TypeStore, declaring: ClassId, def: &'p MethodDef) -> Self {
        Self {
            store,
            shape: Shape::Defined {
                declaring,
                def: Cow::Borrowed(def),
            },
        }
    }

    /// A method that is not (or not yet) stored on its declaring class.
    pub fn latent(store: &'p TypeStore, declaring: ClassId, def: MethodDef) -> Self {
        Self {
            store,
            shape: Shape::Defined {
                declaring,
                def: Cow::Owned(def),
            },
        }
    }

    /// The implicit static initializer of `declaring`.
    pub fn type_initializer(store: &'p TypeStore, declaring: ClassId) -> Self {
        Self::latent(store, declaring, MethodDef::type_initializer())
    }

    /// Defined shapes of all methods and constructors declared by `declaring`.
    pub fn declared_by(store: &'p TypeStore, declaring: ClassId) -> Vec<Self> {
        store
            .def(declaring)
            .methods
            .iter()
            .map(|def| Self::new(store, declaring, def))
            .collect()
    }

    /// This method seen through `declaring`, with every type shape passed through `visitor`.
    ///
    /// Type variables declared by the method itself are never substituted.
    pub fn substituted(
        &self,
        declaring: GenericType,
        visitor: Arc<dyn Substitutor + Send + Sync + 'p>,
    ) -> Self {
        Self {
            store: self.store,
            shape: Shape::Substituted(Arc::new(Substituted {
                declaring,
                defined: self.as_defined(),
                visitor,
            })),
        }
    }

    pub fn store(&self) -> &'p TypeStore {
        self.store
    }

    pub(crate) fn definition(&self) -> (ClassId, &MethodDef) {
        match &self.shape {
            Shape::Defined { declaring, def } => (*declaring, &**def),
            Shape::Substituted(shape) => shape.defined.definition(),
        }
    }

    fn def(&self) -> &MethodDef {
        self.definition().1
    }

    pub fn as_defined(&self) -> MethodDescription<'p> {
        match &self.shape {
            Shape::Defined { .. } => self.clone(),
            Shape::Substituted(shape) => shape.defined.clone(),
        }
    }

    pub fn is_defined_shape(&self) -> bool {
        matches!(self.shape, Shape::Defined { .. })
    }

    fn transform(&self, ty: &GenericType) -> GenericType {
        match &self.shape {
            Shape::Defined { .. } => ty.clone(),
            Shape::Substituted(shape) => VariableRetainingDelegator::new(self, shape).substitute(ty),
        }
    }

    pub fn declaring_class(&self) -> ClassId {
        self.definition().0
    }

    pub fn declaring_type(&self) -> GenericType {
        match &self.shape {
            Shape::Defined { declaring, .. } => GenericType::class(*declaring),
            Shape::Substituted(shape) => shape.declaring.clone(),
        }
    }

    fn declaring_erasure(&self) -> ErasedType {
        ErasedType::Class(self.declaring_class())
    }

    pub fn internal_name(&self) -> &str {
        &self.def().internal_name
    }

    pub fn modifiers(&self) -> AccessFlags {
        self.def().access_flags
    }

    pub fn type_variables(&self) -> Vec<TypeVarDef> {
        self.def()
            .type_variables
            .iter()
            .map(|var| {
                TypeVarDef::new(
                    var.symbol.clone(),
                    var.bounds.iter().map(|bound| self.transform(bound)).collect(),
                )
            })
            .collect()
    }

    pub fn return_type(&self) -> GenericType {
        self.transform(&self.def().return_type)
    }

    pub fn parameters(&self) -> Vec<ParameterDescription> {
        let mut offset = usize::from(!self.is_static());
        self.def()
            .parameters
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let ty = self.transform(&param.ty);
                let description = ParameterDescription::new(
                    ty,
                    index,
                    offset,
                    param.name.clone(),
                    param.access_flags,
                );
                offset += param.ty.erasure().stack_size();
                description
            })
            .collect()
    }

    pub fn parameter_types(&self) -> Vec<GenericType> {
        self.def()
            .parameters
            .iter()
            .map(|param| self.transform(&param.ty))
            .collect()
    }

    fn parameter_erasures(&self) -> Vec<ErasedType> {
        self.parameter_types().iter().map(GenericType::erasure).collect()
    }

    pub fn exception_types(&self) -> Vec<GenericType> {
        self.def()
            .exception_types
            .iter()
            .map(|ty| self.transform(ty))
            .collect()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.def().annotations
    }

    pub fn default_value(&self) -> Option<&ElementValue> {
        self.def().default_value.as_ref()
    }

    pub fn is_constructor(&self) -> bool {
        self.internal_name() == CONSTRUCTOR_INTERNAL_NAME
    }

    pub fn is_type_initializer(&self) -> bool {
        self.internal_name() == TYPE_INITIALIZER_INTERNAL_NAME
    }

    pub fn is_method(&self) -> bool {
        !self.is_constructor() && !self.is_type_initializer()
    }

    pub fn is_public(&self) -> bool {
        self.modifiers().is_public()
    }

    pub fn is_protected(&self) -> bool {
        self.modifiers().is_protected()
    }

    pub fn is_private(&self) -> bool {
        self.modifiers().is_private()
    }

    pub fn is_static(&self) -> bool {
        self.modifiers().is_static()
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers().is_abstract()
    }

    pub fn is_bridge(&self) -> bool {
        self.modifiers().is_bridge()
    }

    pub fn is_synthetic(&self) -> bool {
        self.modifiers().is_synthetic()
    }

    /// Eligible for dynamic dispatch.
    pub fn is_virtual(&self) -> bool {
        !(self.is_constructor() || self.is_private() || self.is_static() || self.is_type_initializer())
    }

    /// A non-abstract instance method declared by an interface.
    pub fn is_default_method(&self) -> bool {
        self.is_method()
            && !self.is_static()
            && !self.is_abstract()
            && !self.is_bridge()
            && self.declaring_erasure().is_interface(self.store)
    }

    pub fn is_visible_to(&self, ty: &ErasedType) -> bool {
        let declaring = self.declaring_erasure();
        (self.is_virtual() || declaring.is_visible_to(self.store, ty))
            && (self.is_public()
                || *ty == declaring
                || (self.is_protected() && declaring.is_assignable_from(self.store, ty))
                || (!self.is_private() && ty.is_same_package(self.store, &declaring)))
    }

    pub fn is_accessible_to(&self, ty: &ErasedType) -> bool {
        self.is_visible_to(ty) && self.declaring_erasure().is_visible_to(self.store, ty)
    }

    /// Whether `target` may invoke this method without virtual dispatch.
    pub fn is_specializable_for(&self, target: &ErasedType) -> bool {
        let declaring = self.declaring_erasure();
        if self.is_static() {
            false
        } else if self.is_private() || self.is_constructor() || self.is_default_method() {
            declaring == *target
        } else {
            !self.is_abstract() && declaring.is_assignable_from(self.store, target)
        }
    }

    pub fn is_invokable_on(&self, ty: &ErasedType) -> bool {
        let declaring = self.declaring_erasure();
        !self.is_static()
            && !self.is_type_initializer()
            && self.is_visible_to(ty)
            && if self.is_virtual() {
                declaring.is_assignable_from(self.store, ty)
            } else {
                declaring == *ty
            }
    }

    /// Whether this method has the shape of a call-site bootstrap method: a static method
    /// returning a call site (or `Object`), or a call site constructor, taking a lookup, a name, a
    /// method type and constant pool arguments.
    pub fn is_bootstrap(&self) -> bool {
        let store = self.store;
        let wk = store.well_known();
        let call_site = ErasedType::Class(wk.call_site);
        let returns = self.return_type().erasure();
        if (self.is_method()
            && (!self.is_static()
                || !(call_site.is_assignable_from(store, &returns)
                    || call_site.is_assignable_to(store, &returns))))
            || (self.is_constructor()
                && !call_site.is_assignable_from(store, &self.declaring_erasure()))
        {
            return false;
        }

        let lookup = ErasedType::Class(wk.lookup);
        let method_type = ErasedType::Class(wk.method_type);
        let named = |ty: &ErasedType| ty.represents(wk.object) || ty.represents(wk.string);
        let varargs = |ty: &ErasedType| ty.represents_array_of(wk.object);
        let parameters = self.parameter_erasures();
        match parameters.as_slice() {
            [] => false,
            [only] => varargs(only),
            [first, second] => lookup.is_assignable_to(store, first) && varargs(second),
            [first, second, third] => {
                lookup.is_assignable_to(store, first)
                    && named(second)
                    && (varargs(third) || method_type.is_assignable_to(store, third))
            }
            [first, second, third, rest @ ..] => {
                if !(lookup.is_assignable_to(store, first)
                    && named(second)
                    && method_type.is_assignable_to(store, third))
                {
                    return false;
                }
                for (offset, parameter) in rest.iter().enumerate() {
                    if !parameter.represents(wk.object) && !parameter.is_constant_pool(store) {
                        return varargs(parameter) && offset + 4 == parameters.len();
                    }
                }
                true
            }
        }
    }

    /// Whether this bootstrap method accepts `arguments` as its static arguments.
    ///
    /// Returns an error for an argument that cannot be a static bootstrap argument at all.
    pub fn is_bootstrap_with(&self, arguments: &[BootstrapArgument]) -> Result<bool, ShapeError> {
        if !self.is_bootstrap() {
            return Ok(false);
        }
        for argument in arguments {
            argument.validate()?;
        }
        let object = self.store.well_known().object;
        let parameters = self.parameter_erasures();
        if parameters.len() < 4 {
            return Ok(arguments.is_empty()
                || parameters
                    .last()
                    .is_some_and(|last| last.represents_array_of(object)));
        }
        let mut arguments = arguments.iter();
        for (offset, parameter) in parameters[3..].iter().enumerate() {
            let mismatch = match arguments.next() {
                Some(argument) => !argument.binds_to(self.store, parameter),
                None => true,
            };
            if mismatch {
                return Ok(offset + 4 == parameters.len() && parameter.represents_array_of(object));
            }
        }
        Ok(true)
    }

    /// Whether this method can be an annotation property with a default value.
    pub fn is_default_value(&self) -> bool {
        !self.is_constructor()
            && !self.is_static()
            && self
                .return_type()
                .erasure()
                .is_annotation_return_type(self.store)
            && self.def().parameters.is_empty()
    }

    pub fn is_default_value_for(&self, value: &ElementValue) -> bool {
        self.is_default_value() && default_value_matches(self.store, &self.return_type().erasure(), value)
    }

    /// Detaches this method, erasing every type variable it does not declare itself.
    ///
    /// The token attaches to any class without changing its structural identity.
    pub fn as_token(&self) -> Token {
        self.as_token_with(&declared_outside)
    }

    /// Detaches this method. Type variables accepted by `erase` are replaced with their erasure,
    /// all others are kept as symbolic placeholders.
    pub fn as_token_with(&self, erase: &dyn Fn(&TypeVariable) -> bool) -> Token {
        self.detach(&Detachment::new(self.store, erase))
    }

    /// Like [`MethodDescription::as_token`], additionally replacing references to the declaring
    /// class with the `TargetType` placeholder so that `D copy(D)` attached to `S` becomes
    /// `S copy(S)`.
    pub fn as_retargeted_token(&self) -> Token {
        self.detach(&Detachment::new(self.store, &declared_outside).retargeting(self.declaring_class()))
    }

    fn detach(&self, detachment: &Detachment<'_>) -> Token {
        Token {
            internal_name: self.internal_name().to_string(),
            modifiers: self.modifiers(),
            type_variables: self
                .type_variables()
                .into_iter()
                .map(|var| {
                    let bounds = var.bounds.iter().map(|b| detachment.substitute(b)).collect();
                    TypeVarDef::new(var.symbol, bounds)
                })
                .collect(),
            return_type: detachment.substitute(&self.return_type()),
            parameters: self
                .parameters()
                .iter()
                .map(|param| param.as_token(detachment))
                .collect(),
            exception_types: self
                .exception_types()
                .iter()
                .map(|ty| detachment.substitute(ty))
                .collect(),
            annotations: self.annotations().to_vec(),
            default_value: self.default_value().cloned(),
        }
    }

    pub fn as_type_token(&self) -> TypeToken {
        TypeToken {
            return_type: self.return_type().erasure(),
            parameter_types: self.parameter_erasures(),
        }
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for parameter in self.parameter_erasures() {
            out.push_str(&parameter.descriptor(self.store));
        }
        out.push(')');
        out.push_str(&self.return_type().erasure().descriptor(self.store));
        out
    }

    /// The `Signature` attribute text, or `None` if no part of the shape is generic or the
    /// shape cannot be expressed as a signature.
    pub fn generic_signature(&self) -> Option<String> {
        method_generic_signature(
            self.store,
            &self.type_variables(),
            &self.parameter_types(),
            &self.return_type(),
            &self.exception_types(),
        )
    }

    /// Modifiers for an implementation (`non_abstract`) or an abstract redeclaration.
    pub fn adjusted_modifiers(&self, non_abstract: bool) -> AccessFlags {
        let modifiers = self.modifiers();
        if non_abstract {
            modifiers.without(AccessFlags::ABSTRACT | AccessFlags::NATIVE)
        } else {
            modifiers.without(AccessFlags::NATIVE).with(AccessFlags::ABSTRACT)
        }
    }

    /// Local variable slots taken by the receiver and the parameters.
    pub fn stack_size(&self) -> usize {
        let parameters: usize = self.parameter_erasures().iter().map(ErasedType::stack_size).sum();
        parameters + usize::from(!self.is_static())
    }

    /// The method name, or the declaring type's name for constructors and type initializers.
    pub fn name(&self) -> String {
        if self.is_method() {
            self.internal_name().to_string()
        } else {
            self.declaring_erasure().name(self.store)
        }
    }

    /// The name as written in source; empty for constructors and type initializers.
    pub fn source_code_name(&self) -> &str {
        if self.is_method() {
            self.internal_name()
        } else {
            ""
        }
    }

    pub fn represents(&self, internal_name: &str, descriptor: &str) -> bool {
        self.internal_name() == internal_name && self.descriptor() == descriptor
    }

    pub fn to_generic_string(&self) -> String {
        let store = self.store;
        let mut out = self.signature_prefix();
        if self.is_method() {
            out.push_str(&self.return_type().type_name(store));
            out.push(' ');
        }
        out.push_str(&self.declaring_type().type_name(store));
        self.push_parameters_and_throws(&mut out, |ty| ty.type_name(store));
        out
    }

    fn signature_prefix(&self) -> String {
        let keywords = self
            .modifiers()
            .without(!AccessFlags::SOURCE_METHOD_MASK)
            .method_keywords();
        if keywords.is_empty() {
            keywords
        } else {
            keywords + " "
        }
    }

    fn push_parameters_and_throws(&self, out: &mut String, render: impl Fn(&GenericType) -> String) {
        if self.is_method() {
            out.push('.');
            out.push_str(&self.name());
        }
        let parameters: Vec<_> = self.parameter_types().iter().map(&render).collect();
        out.push('(');
        out.push_str(&parameters.join(","));
        out.push(')');
        let exceptions: Vec<_> = self.exception_types().iter().map(&render).collect();
        if !exceptions.is_empty() {
            out.push_str(" throws ");
            out.push_str(&exceptions.join(","));
        }
    }
}

/// Type variables the method does not declare itself: those of its declaring class and beyond.
fn declared_outside(variable: &TypeVariable) -> bool {
    !matches!(variable.source, VariableSource::Method)
}

fn default_value_matches(store: &TypeStore, return_type: &ErasedType, value: &ElementValue) -> bool {
    let wk = store.well_known();
    match (return_type, value) {
        (ErasedType::Primitive(base), ElementValue::Const(constant)) => matches!(
            (base, constant),
            (BaseType::Boolean, ConstValue::Boolean(_))
                | (BaseType::Byte, ConstValue::Byte(_))
                | (BaseType::Char, ConstValue::Char(_))
                | (BaseType::Short, ConstValue::Short(_))
                | (BaseType::Int, ConstValue::Int(_))
                | (BaseType::Long, ConstValue::Long(_))
                | (BaseType::Float, ConstValue::Float(_))
                | (BaseType::Double, ConstValue::Double(_))
        ),
        (ErasedType::Class(id), ElementValue::Const(ConstValue::String(_))) => *id == wk.string,
        (_, ElementValue::Enum { .. }) => {
            return_type.is_assignable_to(store, &ErasedType::Class(wk.enumeration))
        }
        (_, ElementValue::Annotation(_)) => {
            return_type.is_assignable_to(store, &ErasedType::Class(wk.annotation))
        }
        (_, ElementValue::Class(_)) => return_type.represents(wk.class),
        (ErasedType::Array(component), ElementValue::Array(values)) => values
            .iter()
            .all(|value| default_value_matches(store, component, value)),
        _ => false,
    }
}

impl TypeVariableSource for MethodDescription<'_> {
    fn store(&self) -> &TypeStore {
        self.store
    }

    fn declared_variable(&self, symbol: &str) -> Option<TypeVariable> {
        self.type_variables()
            .into_iter()
            .find(|var| var.symbol == symbol)
            .map(|var| {
                let erasure = var.erasure(self.store);
                TypeVariable::new(var.symbol, VariableSource::Method, erasure)
            })
    }

    fn enclosing_source(&self) -> Option<ClassScope<'_>> {
        Some(ClassScope::new(self.store, self.declaring_class()))
    }
}

impl PartialEq for MethodDescription<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.internal_name() == other.internal_name()
            && self.as_type_token() == other.as_type_token()
    }
}

impl Eq for MethodDescription<'_> {}

impl Hash for MethodDescription<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.internal_name().hash(state);
        self.as_type_token().hash(state);
    }
}

impl fmt::Debug for MethodDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescription")
            .field("declaring_type", &self.declaring_type().type_name(self.store))
            .field("internal_name", &self.internal_name())
            .field("descriptor", &self.descriptor())
            .field("defined", &self.is_defined_shape())
            .finish()
    }
}

/// `public static java.lang.Object p.Foo.bar(int,java.lang.String) throws java.io.IOException`
impl fmt::Display for MethodDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store;
        let mut out = self.signature_prefix();
        if self.is_method() {
            out.push_str(&self.return_type().erasure().name(store));
            out.push(' ');
        }
        out.push_str(&self.declaring_erasure().name(store));
        self.push_parameters_and_throws(&mut out, |ty| ty.erasure().name(store));
        f.write_str(&out)
    }
}
