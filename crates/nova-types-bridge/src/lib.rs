#![forbid(unsafe_code)]
//! Loads declarations from an external [`TypeSource`] into a [`TypeStore`].
//!
//! Stubs carry raw descriptors and unparsed `Signature` attribute text. The loader turns both into
//! [`GenericType`] trees; a signature that does not parse, or that names a type variable no scope
//! declares, is dropped in favour of the descriptor unless
//! [`LoaderConfig::strict_signatures`] is set.

use std::collections::{HashMap, HashSet};

use nova_classfile::{
    internal_to_binary, parse_class_signature, parse_field_signature, parse_method_signature,
    AccessFlags, ClassTypeSignature, FieldType, MethodStub, ReturnType, TypeArgument, TypeParameter,
    TypeSignature, TypeStub,
};
use nova_types::{
    ClassDef, ClassId, ErasedType, FieldDef, GenericType, MethodDef, ParameterDef,
    ParameterizedType, TypeStore, TypeVarDef, VariableSource, WildcardType,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hands out declaration stubs by binary name (`java.util.Map$Entry`).
pub trait TypeSource {
    fn lookup_type(&self, binary_name: &str) -> Option<TypeStub>;
}

impl<T: TypeSource + ?Sized> TypeSource for &T {
    fn lookup_type(&self, binary_name: &str) -> Option<TypeStub> {
        (**self).lookup_type(binary_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Fail with [`LoadError::MalformedSignature`] instead of falling back to the descriptor.
    pub strict_signatures: bool,
    /// Referenced types nested deeper than this stay unloaded placeholders.
    pub max_depth: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            strict_signatures: false,
            max_depth: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("type `{0}` not found")]
    NotFound(String),
    #[error("malformed signature on `{owner}`: {reason}")]
    MalformedSignature { owner: String, reason: String },
    #[error("malformed descriptor on `{owner}`: {source}")]
    MalformedDescriptor {
        owner: String,
        #[source]
        source: nova_classfile::Error,
    },
}

/// Type variables visible while converting one declaration's signatures.
#[derive(Debug, Clone, Default)]
struct Scope {
    declaring: Option<ClassId>,
    /// Innermost enclosing class whose variables are visible, for non-static member classes.
    enclosing: Option<ClassId>,
    class_variables: HashMap<String, ErasedType>,
    method_variables: HashMap<String, ErasedType>,
}

/// Why a signature was not used.
type Degraded = String;

/// Loads external [`TypeSource`] stubs into a [`TypeStore`] on demand.
pub struct ExternalTypeLoader<'a> {
    store: &'a mut TypeStore,
    source: &'a dyn TypeSource,
    config: LoaderConfig,
    in_progress: HashSet<String>,
    loaded: HashSet<String>,
}

impl<'a> ExternalTypeLoader<'a> {
    pub fn new(store: &'a mut TypeStore, source: &'a dyn TypeSource) -> Self {
        Self::with_config(store, source, LoaderConfig::default())
    }

    pub fn with_config(
        store: &'a mut TypeStore,
        source: &'a dyn TypeSource,
        config: LoaderConfig,
    ) -> Self {
        Self {
            store,
            source,
            config,
            in_progress: HashSet::new(),
            loaded: HashSet::new(),
        }
    }

    pub fn store(&self) -> &TypeStore {
        &*self.store
    }

    pub fn config(&self) -> LoaderConfig {
        self.config
    }

    /// Ensures `binary_name` is defined in the store and returns its id.
    ///
    /// Classes the store already defines (for example the minimal JDK) are never overwritten.
    pub fn load(&mut self, binary_name: &str) -> Result<ClassId, LoadError> {
        if self.loaded.contains(binary_name) || self.in_progress.contains(binary_name) {
            if let Some(id) = self.store.lookup_class(binary_name) {
                return Ok(id);
            }
        }
        if let Some(id) = self.store.lookup_class(binary_name) {
            if !self.store.is_placeholder(id) {
                return Ok(id);
            }
        }
        let stub = self
            .source
            .lookup_type(binary_name)
            .ok_or_else(|| LoadError::NotFound(binary_name.to_string()))?;

        let id = self.store.intern_class_id(binary_name);
        self.in_progress.insert(binary_name.to_string());
        let def = self.class_def(id, &stub);
        self.in_progress.remove(binary_name);
        let def = def?;

        self.store.define_class(id, def);
        self.loaded.insert(binary_name.to_string());
        tracing::debug!(target: "nova.types.bridge", class = binary_name, "loaded type stub");
        Ok(id)
    }

    /// Like [`ExternalTypeLoader::load`], logging failures instead of returning them.
    pub fn ensure_class(&mut self, binary_name: &str) -> Option<ClassId> {
        match self.load(binary_name) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(target: "nova.types.bridge", class = binary_name, error = %err, "type not loaded");
                None
            }
        }
    }

    /// A referenced class: loaded when the source knows it, an unresolved placeholder otherwise.
    fn class_ref(&mut self, binary_name: &str) -> Result<ClassId, LoadError> {
        if self.in_progress.len() >= self.config.max_depth {
            tracing::debug!(
                target: "nova.types.bridge",
                class = binary_name,
                max_depth = self.config.max_depth,
                "reference left unloaded at maximum depth"
            );
            return Ok(self.store.intern_class_id(binary_name));
        }
        match self.load(binary_name) {
            Ok(id) => Ok(id),
            Err(LoadError::NotFound(_)) => {
                tracing::warn!(target: "nova.types.bridge", class = binary_name, "unresolved type reference");
                Ok(self.store.intern_class_id(binary_name))
            }
            Err(err) => Err(err),
        }
    }

    fn object(&self) -> ClassId {
        self.store.well_known().object
    }

    fn class_def(&mut self, id: ClassId, stub: &TypeStub) -> Result<ClassDef, LoadError> {
        let flags = AccessFlags::new(stub.access_flags);
        let declaring_type = match stub.declaring_type.as_deref() {
            Some(outer) => Some(self.class_ref(outer)?),
            None => None,
        };
        let scope = Scope {
            declaring: Some(id),
            enclosing: declaring_type.filter(|_| !flags.is_static()),
            ..Scope::default()
        };

        let signature = match stub.signature.as_deref() {
            Some(text) => {
                let converted = parse_class_signature(text)
                    .map_err(|err| err.to_string())
                    .and_then(|sig| self.class_signature(&sig, &scope, flags.is_interface()));
                self.degrade(&stub.binary_name, converted)?
            }
            None => None,
        };
        let (type_variables, super_class, interfaces, scope) = match signature {
            Some(parts) => parts,
            None => {
                let super_class = match stub.super_binary_name.as_deref() {
                    Some(name) if !flags.is_interface() => Some(GenericType::class(self.class_ref(name)?)),
                    _ => None,
                };
                let mut interfaces = Vec::with_capacity(stub.interfaces.len());
                for name in &stub.interfaces {
                    interfaces.push(GenericType::class(self.class_ref(name)?));
                }
                (Vec::new(), super_class, interfaces, scope)
            }
        };

        let mut def = ClassDef::new(stub.binary_name.clone(), stub.access_flags, super_class);
        def.type_variables = type_variables;
        def.interfaces = interfaces;
        def.declaring_type = declaring_type;
        def.annotations = stub.annotations.clone();

        for field in &stub.fields {
            let owner = format!("{}.{}", stub.binary_name, field.name);
            let descriptor = field
                .parsed_descriptor()
                .map_err(|source| LoadError::MalformedDescriptor {
                    owner: owner.clone(),
                    source,
                })?;
            let generic = match field.signature.as_deref() {
                Some(text) => {
                    let converted = parse_field_signature(text)
                        .map_err(|err| err.to_string())
                        .and_then(|sig| self.type_signature(&sig, &scope));
                    self.degrade(&owner, converted)?
                }
                None => None,
            };
            let ty = match generic {
                Some(ty) => ty,
                None => self.field_type(&descriptor)?,
            };
            def.fields.push(FieldDef {
                name: field.name.clone(),
                access_flags: AccessFlags::new(field.access_flags),
                ty,
                annotations: field.annotations.clone(),
            });
        }

        for method in &stub.methods {
            let method = self.method_def(&stub.binary_name, method, &scope)?;
            def.methods.push(method);
        }
        Ok(def)
    }

    fn class_signature(
        &mut self,
        sig: &nova_classfile::ClassSignature,
        scope: &Scope,
        is_interface: bool,
    ) -> Result<(Vec<TypeVarDef>, Option<GenericType>, Vec<GenericType>, Scope), Degraded> {
        let mut scope = scope.clone();
        scope.class_variables = self.variable_erasures(&sig.type_parameters, &scope)?;
        let type_variables = self.type_variables(&sig.type_parameters, &scope)?;
        let super_class = if is_interface {
            None
        } else {
            Some(self.class_type_signature(&sig.super_class, &scope)?)
        };
        let interfaces = sig
            .interfaces
            .iter()
            .map(|iface| self.class_type_signature(iface, &scope))
            .collect::<Result<_, _>>()?;
        Ok((type_variables, super_class, interfaces, scope))
    }

    fn method_def(
        &mut self,
        class_name: &str,
        stub: &MethodStub,
        scope: &Scope,
    ) -> Result<MethodDef, LoadError> {
        let owner = format!("{class_name}.{}{}", stub.name, stub.descriptor);
        let descriptor = stub
            .parsed_descriptor()
            .map_err(|source| LoadError::MalformedDescriptor {
                owner: owner.clone(),
                source,
            })?;

        let generic = match stub.signature.as_deref() {
            Some(text) => {
                let converted = parse_method_signature(text)
                    .map_err(|err| err.to_string())
                    .and_then(|sig| {
                        if sig.parameters.len() != descriptor.params.len() {
                            return Err("parameter count differs from the descriptor".to_string());
                        }
                        let mut scope = scope.clone();
                        scope.method_variables = self.variable_erasures(&sig.type_parameters, &scope)?;
                        let type_variables = self.type_variables(&sig.type_parameters, &scope)?;
                        let parameters = sig
                            .parameters
                            .iter()
                            .map(|param| self.type_signature(param, &scope))
                            .collect::<Result<Vec<_>, _>>()?;
                        let return_type = match &sig.return_type {
                            Some(ty) => self.type_signature(ty, &scope)?,
                            None => GenericType::void(),
                        };
                        let exception_types = sig
                            .throws
                            .iter()
                            .map(|ty| self.type_signature(ty, &scope))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok((type_variables, parameters, return_type, exception_types))
                    });
                self.degrade(&owner, converted)?
            }
            None => None,
        };

        let (type_variables, parameter_types, return_type, mut exception_types) = match generic {
            Some(parts) => parts,
            None => {
                let mut parameters = Vec::with_capacity(descriptor.params.len());
                for param in &descriptor.params {
                    parameters.push(self.field_type(param)?);
                }
                let return_type = match &descriptor.return_type {
                    ReturnType::Void => GenericType::void(),
                    ReturnType::Type(ty) => self.field_type(ty)?,
                };
                (Vec::new(), parameters, return_type, Vec::new())
            }
        };
        if exception_types.is_empty() {
            for internal in &stub.exceptions {
                exception_types.push(GenericType::class(self.class_ref(&internal_to_binary(internal))?));
            }
        }

        let named = stub.parameters.len() == parameter_types.len();
        let parameters = parameter_types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| {
                let attribute = named.then(|| &stub.parameters[index]);
                ParameterDef {
                    ty,
                    name: attribute.and_then(|p| p.name.clone()),
                    access_flags: attribute.and_then(|p| p.access_flags).map(AccessFlags::new),
                }
            })
            .collect();

        Ok(MethodDef {
            internal_name: stub.name.clone(),
            access_flags: AccessFlags::new(stub.access_flags),
            type_variables,
            return_type,
            parameters,
            exception_types,
            annotations: stub.annotations.clone(),
            default_value: stub.default_value.clone(),
        })
    }

    /// Applies the configured policy to a signature conversion result.
    fn degrade<T>(&self, owner: &str, converted: Result<T, Degraded>) -> Result<Option<T>, LoadError> {
        match converted {
            Ok(value) => Ok(Some(value)),
            Err(reason) if self.config.strict_signatures => Err(LoadError::MalformedSignature {
                owner: owner.to_string(),
                reason,
            }),
            Err(reason) => {
                tracing::debug!(
                    target: "nova.types.bridge",
                    owner,
                    reason = %reason,
                    "signature dropped, using the descriptor"
                );
                Ok(None)
            }
        }
    }

    /// Erasures of the type parameters in `params`, resolving bounds that name other parameters of
    /// the same list.
    fn variable_erasures(
        &mut self,
        params: &[TypeParameter],
        scope: &Scope,
    ) -> Result<HashMap<String, ErasedType>, Degraded> {
        let mut erasures = HashMap::with_capacity(params.len());
        for index in 0..params.len() {
            let erasure = self.bound_erasure(params, index, scope, &mut Vec::new())?;
            erasures.insert(params[index].name.clone(), erasure);
        }
        Ok(erasures)
    }

    fn bound_erasure(
        &mut self,
        params: &[TypeParameter],
        index: usize,
        scope: &Scope,
        visiting: &mut Vec<usize>,
    ) -> Result<ErasedType, Degraded> {
        let param = &params[index];
        let bound = param.class_bound.as_ref().or(param.interface_bounds.first());
        match bound {
            None => Ok(ErasedType::Class(self.object())),
            Some(TypeSignature::TypeVariable(name)) => {
                match params.iter().position(|p| &p.name == name) {
                    Some(_) if visiting.contains(&index) => {
                        Err(format!("cyclic bound on type variable `{}`", param.name))
                    }
                    Some(next) => {
                        visiting.push(index);
                        self.bound_erasure(params, next, scope, visiting)
                    }
                    None => Ok(self.resolve_variable(name, scope)?.erasure()),
                }
            }
            Some(TypeSignature::Class(class)) => Ok(ErasedType::Class(self.signature_class(class)?)),
            Some(_) => Err(format!("type variable `{}` has a non-class bound", param.name)),
        }
    }

    fn type_variables(
        &mut self,
        params: &[TypeParameter],
        scope: &Scope,
    ) -> Result<Vec<TypeVarDef>, Degraded> {
        params
            .iter()
            .map(|param| {
                let mut bounds = Vec::with_capacity(1 + param.interface_bounds.len());
                match &param.class_bound {
                    Some(bound) => bounds.push(self.type_signature(bound, scope)?),
                    None if param.interface_bounds.is_empty() => {
                        bounds.push(GenericType::class(self.object()))
                    }
                    None => {}
                }
                for bound in &param.interface_bounds {
                    bounds.push(self.type_signature(bound, scope)?);
                }
                Ok(TypeVarDef::new(param.name.as_str(), bounds))
            })
            .collect()
    }

    fn resolve_variable(&self, name: &str, scope: &Scope) -> Result<GenericType, Degraded> {
        if let Some(erasure) = scope.method_variables.get(name) {
            return Ok(GenericType::variable(name, VariableSource::Method, erasure.clone()));
        }
        if let (Some(declaring), Some(erasure)) = (scope.declaring, scope.class_variables.get(name)) {
            return Ok(GenericType::variable(
                name,
                VariableSource::Type(declaring),
                erasure.clone(),
            ));
        }
        scope
            .enclosing
            .and_then(|outer| self.store.find_type_variable(outer, name))
            .map(|(owner, var)| {
                GenericType::variable(name, VariableSource::Type(owner), var.erasure(self.store))
            })
            .ok_or_else(|| format!("type variable `{name}` is not declared in scope"))
    }

    fn signature_class(&mut self, sig: &ClassTypeSignature) -> Result<ClassId, Degraded> {
        self.class_ref(&internal_to_binary(&sig.internal_name()))
            .map_err(|err| err.to_string())
    }

    fn class_type_signature(
        &mut self,
        sig: &ClassTypeSignature,
        scope: &Scope,
    ) -> Result<GenericType, Degraded> {
        let mut internal = if sig.package.is_empty() {
            String::new()
        } else {
            format!("{}/", sig.package)
        };
        let mut owner: Option<GenericType> = None;
        for (position, segment) in sig.segments.iter().enumerate() {
            if position > 0 {
                internal.push('$');
            }
            internal.push_str(&segment.name);
            let raw = self
                .class_ref(&internal_to_binary(&internal))
                .map_err(|err| err.to_string())?;
            let arguments = segment
                .type_arguments
                .iter()
                .map(|argument| self.type_argument(argument, scope))
                .collect::<Result<Vec<_>, _>>()?;
            owner = Some(match owner {
                Some(outer @ GenericType::Parameterized(_)) => {
                    GenericType::Parameterized(ParameterizedType {
                        raw,
                        arguments,
                        owner: Some(Box::new(outer)),
                    })
                }
                _ if arguments.is_empty() => GenericType::class(raw),
                _ => GenericType::parameterized(raw, arguments),
            });
        }
        owner.ok_or_else(|| "empty class type signature".to_string())
    }

    fn type_argument(&mut self, argument: &TypeArgument, scope: &Scope) -> Result<GenericType, Degraded> {
        Ok(match argument {
            TypeArgument::Any => GenericType::Wildcard(WildcardType::unbounded(self.store)),
            TypeArgument::Exact(ty) => self.type_signature(ty, scope)?,
            TypeArgument::Extends(ty) => GenericType::Wildcard(WildcardType::upper(self.type_signature(ty, scope)?)),
            TypeArgument::Super(ty) => GenericType::Wildcard(WildcardType::lower(self.type_signature(ty, scope)?)),
        })
    }

    fn type_signature(&mut self, sig: &TypeSignature, scope: &Scope) -> Result<GenericType, Degraded> {
        match sig {
            TypeSignature::Base(base) => Ok(GenericType::primitive(*base)),
            TypeSignature::Array(component) => Ok(GenericType::array(self.type_signature(component, scope)?)),
            TypeSignature::Class(class) => self.class_type_signature(class, scope),
            TypeSignature::TypeVariable(name) => self.resolve_variable(name, scope),
        }
    }

    fn field_type(&mut self, ty: &FieldType) -> Result<GenericType, LoadError> {
        Ok(match ty {
            FieldType::Base(base) => GenericType::primitive(*base),
            FieldType::Array(component) => GenericType::array(self.field_type(component)?),
            FieldType::Object(internal) => GenericType::class(self.class_ref(&internal_to_binary(internal))?),
        })
    }
}
