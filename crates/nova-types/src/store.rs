use std::collections::HashMap;

use nova_classfile::{AccessFlags, Annotation, ElementValue};
use smol_str::SmolStr;

use crate::erased::ErasedType;
use crate::generic::GenericType;

pub const CONSTRUCTOR_INTERNAL_NAME: &str = "<init>";
pub const TYPE_INITIALIZER_INTERNAL_NAME: &str = "<clinit>";

/// Handle of a class declaration inside a [`TypeStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn to_raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Annotation,
    Enum,
}

/// A declared type variable: its symbol and upper bounds, in declaration order.
///
/// The bounds are never empty for variables built by the store or the loader; an unbounded
/// variable carries the root object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVarDef {
    pub symbol: SmolStr,
    pub bounds: Vec<GenericType>,
}

impl TypeVarDef {
    pub fn new(symbol: impl Into<SmolStr>, bounds: Vec<GenericType>) -> Self {
        Self {
            symbol: symbol.into(),
            bounds,
        }
    }

    /// Erasure of the leftmost bound; the root object type if there is none.
    pub fn erasure(&self, store: &TypeStore) -> ErasedType {
        self.bounds
            .first()
            .and_then(|bound| bound.try_erasure().ok())
            .unwrap_or_else(|| ErasedType::Class(store.well_known().object))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub access_flags: AccessFlags,
    pub ty: GenericType,
    pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDef {
    pub ty: GenericType,
    pub name: Option<String>,
    pub access_flags: Option<AccessFlags>,
}

impl ParameterDef {
    pub fn of(ty: GenericType) -> Self {
        Self {
            ty,
            name: None,
            access_flags: None,
        }
    }
}

/// A method, constructor or type initializer exactly as declared on its class.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDef {
    pub internal_name: String,
    pub access_flags: AccessFlags,
    pub type_variables: Vec<TypeVarDef>,
    pub return_type: GenericType,
    pub parameters: Vec<ParameterDef>,
    pub exception_types: Vec<GenericType>,
    pub annotations: Vec<Annotation>,
    pub default_value: Option<ElementValue>,
}

impl MethodDef {
    /// A non-generic method without annotations or exceptions.
    pub fn simple(
        internal_name: impl Into<String>,
        access_flags: u16,
        return_type: GenericType,
        parameters: Vec<GenericType>,
    ) -> Self {
        Self {
            internal_name: internal_name.into(),
            access_flags: AccessFlags::new(access_flags),
            type_variables: Vec::new(),
            return_type,
            parameters: parameters.into_iter().map(ParameterDef::of).collect(),
            exception_types: Vec::new(),
            annotations: Vec::new(),
            default_value: None,
        }
    }

    pub fn type_initializer() -> Self {
        Self::simple(
            TYPE_INITIALIZER_INTERNAL_NAME,
            AccessFlags::STATIC | AccessFlags::PRIVATE | AccessFlags::SYNTHETIC,
            GenericType::void(),
            Vec::new(),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    /// Binary name (`java.util.Map$Entry`).
    pub name: String,
    pub access_flags: AccessFlags,
    pub type_variables: Vec<TypeVarDef>,
    pub super_class: Option<GenericType>,
    pub interfaces: Vec<GenericType>,
    /// Lexically enclosing class of a member class.
    pub declaring_type: Option<ClassId>,
    pub annotations: Vec<Annotation>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    /// Set for names that were referenced but never defined.
    pub placeholder: bool,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, access_flags: u16, super_class: Option<GenericType>) -> Self {
        Self {
            name: name.into(),
            access_flags: AccessFlags::new(access_flags),
            type_variables: Vec::new(),
            super_class,
            interfaces: Vec::new(),
            declaring_type: None,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            placeholder: false,
        }
    }

    fn placeholder(name: &str, object: Option<ClassId>) -> Self {
        let mut def = Self::new(
            name,
            AccessFlags::PUBLIC,
            object.map(GenericType::class),
        );
        def.placeholder = true;
        def
    }

    pub fn kind(&self) -> ClassKind {
        if self.access_flags.is_annotation() {
            ClassKind::Annotation
        } else if self.access_flags.is_interface() {
            ClassKind::Interface
        } else if self.access_flags.is_enum() {
            ClassKind::Enum
        } else {
            ClassKind::Class
        }
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.is_interface()
    }

    /// Package part of the binary name; empty for the default package.
    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }
}

/// Handles of the runtime types the shape predicates refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub class: ClassId,
    pub enumeration: ClassId,
    pub annotation: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub call_site: ClassId,
    pub method_handles: ClassId,
    pub lookup: ClassId,
    pub method_type: ClassId,
    pub method_handle: ClassId,
    /// Stand-in for "the class a detached declaration will be attached to".
    pub target_type: ClassId,
}

/// Arena of class declarations, keyed by binary name.
#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    /// A store pre-populated with the handful of `java.*` types the shape model needs.
    pub fn with_minimal_jdk() -> Self {
        const PUBLIC: u16 = AccessFlags::PUBLIC;
        const FINAL: u16 = AccessFlags::FINAL;
        const ABSTRACT: u16 = AccessFlags::ABSTRACT;
        const INTERFACE: u16 = AccessFlags::INTERFACE | AccessFlags::ABSTRACT;

        let mut store = TypeStore {
            classes: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes {
                object: ClassId(0),
                string: ClassId(0),
                class: ClassId(0),
                enumeration: ClassId(0),
                annotation: ClassId(0),
                cloneable: ClassId(0),
                serializable: ClassId(0),
                call_site: ClassId(0),
                method_handles: ClassId(0),
                lookup: ClassId(0),
                method_type: ClassId(0),
                method_handle: ClassId(0),
                target_type: ClassId(0),
            },
        };

        let object = store.add_class(ClassDef::new("java.lang.Object", PUBLIC, None));
        let object_ty = || Some(GenericType::class(object));
        let serializable =
            store.add_class(ClassDef::new("java.io.Serializable", PUBLIC | INTERFACE, None));
        let cloneable = store.add_class(ClassDef::new("java.lang.Cloneable", PUBLIC | INTERFACE, None));
        let annotation = store.add_class(ClassDef::new(
            "java.lang.annotation.Annotation",
            PUBLIC | INTERFACE,
            None,
        ));

        let with_serializable = |store: &mut TypeStore, name: &str, flags: u16| {
            let mut def = ClassDef::new(name, flags, object_ty());
            def.interfaces.push(GenericType::class(serializable));
            store.add_class(def)
        };
        let string = with_serializable(&mut store, "java.lang.String", PUBLIC | FINAL);
        let class = with_serializable(&mut store, "java.lang.Class", PUBLIC | FINAL);
        let enumeration = with_serializable(&mut store, "java.lang.Enum", PUBLIC | ABSTRACT);
        let method_type = with_serializable(&mut store, "java.lang.invoke.MethodType", PUBLIC | FINAL);

        let call_site = store.add_class(ClassDef::new(
            "java.lang.invoke.CallSite",
            PUBLIC | ABSTRACT,
            object_ty(),
        ));
        store.add_class(ClassDef::new(
            "java.lang.invoke.ConstantCallSite",
            PUBLIC,
            Some(GenericType::class(call_site)),
        ));
        let method_handles = store.add_class(ClassDef::new(
            "java.lang.invoke.MethodHandles",
            PUBLIC,
            object_ty(),
        ));
        let mut lookup = ClassDef::new(
            "java.lang.invoke.MethodHandles$Lookup",
            PUBLIC | FINAL | AccessFlags::STATIC,
            object_ty(),
        );
        lookup.declaring_type = Some(method_handles);
        let lookup = store.add_class(lookup);
        let method_handle = store.add_class(ClassDef::new(
            "java.lang.invoke.MethodHandle",
            PUBLIC | ABSTRACT,
            object_ty(),
        ));
        let target_type = store.add_class(ClassDef::new(
            "nova.types.TargetType",
            PUBLIC | FINAL,
            object_ty(),
        ));

        store.well_known = WellKnownTypes {
            object,
            string,
            class,
            enumeration,
            annotation,
            cloneable,
            serializable,
            call_site,
            method_handles,
            lookup,
            method_type,
            method_handle,
            target_type,
        };
        store
    }

    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Returns the id for `name`, reserving a placeholder declaration when it is unknown.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let object = (!self.classes.is_empty()).then_some(self.well_known.object);
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassDef::placeholder(name, object));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Replaces the declaration behind `id`; the declared name must match the interned one.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        debug_assert_eq!(self.classes[id.index()].name, def.name);
        self.classes[id.index()] = def;
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.index())
    }

    /// Declaration behind an id handed out by this store.
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different store.
    pub fn def(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    pub fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ClassId) -> &str {
        &self.def(id).name
    }

    pub fn is_placeholder(&self, id: ClassId) -> bool {
        self.def(id).placeholder
    }

    /// Finds `symbol` among the type variables of `id`, then of its enclosing classes.
    ///
    /// Static member classes do not see the variables of their enclosing class.
    pub fn find_type_variable(&self, id: ClassId, symbol: &str) -> Option<(ClassId, &TypeVarDef)> {
        let mut current = Some(id);
        while let Some(class_id) = current {
            let def = self.def(class_id);
            if let Some(var) = def.type_variables.iter().find(|v| v.symbol == symbol) {
                return Some((class_id, var));
            }
            if def.access_flags.is_static() {
                return None;
            }
            current = def.declaring_type;
        }
        None
    }
}
