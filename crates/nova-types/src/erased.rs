use std::collections::{HashSet, VecDeque};

use nova_classfile::{binary_to_internal, BaseType};

use crate::store::{ClassId, ClassKind, TypeStore};

/// The erased (raw, binary-level) view of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErasedType {
    Void,
    Primitive(BaseType),
    Class(ClassId),
    Array(Box<ErasedType>),
}

impl ErasedType {
    pub fn array_of(component: ErasedType) -> Self {
        ErasedType::Array(Box::new(component))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, ErasedType::Void)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, ErasedType::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ErasedType::Array(_))
    }

    pub fn component_type(&self) -> Option<&ErasedType> {
        match self {
            ErasedType::Array(component) => Some(component),
            _ => None,
        }
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            ErasedType::Class(id) => Some(*id),
            _ => None,
        }
    }

    pub fn represents(&self, id: ClassId) -> bool {
        self.class_id() == Some(id)
    }

    pub fn represents_primitive(&self, base: BaseType) -> bool {
        *self == ErasedType::Primitive(base)
    }

    /// `true` for an array whose component is the class `id` (`Object[]` for the root object).
    pub fn represents_array_of(&self, id: ClassId) -> bool {
        self.component_type().is_some_and(|component| component.represents(id))
    }

    /// Replaces every occurrence of the class `from`, including as an array component.
    pub fn replace_class(&self, from: ClassId, to: ClassId) -> ErasedType {
        match self {
            ErasedType::Class(id) if *id == from => ErasedType::Class(to),
            ErasedType::Array(component) => ErasedType::array_of(component.replace_class(from, to)),
            other => other.clone(),
        }
    }

    /// Operand stack slots: two for `long` and `double`, none for `void`.
    pub fn stack_size(&self) -> usize {
        match self {
            ErasedType::Void => 0,
            ErasedType::Primitive(base) => base.stack_size(),
            ErasedType::Class(_) | ErasedType::Array(_) => 1,
        }
    }

    pub fn descriptor(&self, store: &TypeStore) -> String {
        let mut out = String::new();
        self.write_descriptor(store, &mut out);
        out
    }

    fn write_descriptor(&self, store: &TypeStore, out: &mut String) {
        match self {
            ErasedType::Void => out.push('V'),
            ErasedType::Primitive(base) => out.push(base.descriptor_char()),
            ErasedType::Class(id) => {
                out.push('L');
                out.push_str(&binary_to_internal(store.name(*id)));
                out.push(';');
            }
            ErasedType::Array(component) => {
                out.push('[');
                component.write_descriptor(store, out);
            }
        }
    }

    /// Internal name: slashed for classes, the descriptor for arrays.
    pub fn internal_name(&self, store: &TypeStore) -> String {
        match self {
            ErasedType::Class(id) => binary_to_internal(store.name(*id)),
            ErasedType::Array(_) => self.descriptor(store),
            ErasedType::Void => "void".to_string(),
            ErasedType::Primitive(base) => base.keyword().to_string(),
        }
    }

    /// Runtime name: binary name for classes, `[Ljava.lang.String;` for arrays.
    pub fn name(&self, store: &TypeStore) -> String {
        match self {
            ErasedType::Array(_) => self.descriptor(store).replace('/', "."),
            _ => self.type_name(store),
        }
    }

    /// Source-like name (`java.lang.String[]`).
    pub fn type_name(&self, store: &TypeStore) -> String {
        match self {
            ErasedType::Void => "void".to_string(),
            ErasedType::Primitive(base) => base.keyword().to_string(),
            ErasedType::Class(id) => store.name(*id).to_string(),
            ErasedType::Array(component) => format!("{}[]", component.type_name(store)),
        }
    }

    fn kind(&self, store: &TypeStore) -> Option<ClassKind> {
        self.class_id().map(|id| store.def(id).kind())
    }

    pub fn is_interface(&self, store: &TypeStore) -> bool {
        matches!(
            self.kind(store),
            Some(ClassKind::Interface | ClassKind::Annotation)
        )
    }

    pub fn is_annotation(&self, store: &TypeStore) -> bool {
        self.kind(store) == Some(ClassKind::Annotation)
    }

    pub fn is_enum(&self, store: &TypeStore) -> bool {
        self.kind(store) == Some(ClassKind::Enum)
    }

    /// Package of a class type; `None` for primitives, `void` and arrays.
    pub fn package<'s>(&self, store: &'s TypeStore) -> Option<&'s str> {
        self.class_id().map(|id| store.def(id).package())
    }

    pub fn is_same_package(&self, store: &TypeStore, other: &ErasedType) -> bool {
        self.package(store) == other.package(store)
    }

    /// Whether code in `viewer` may name this type.
    pub fn is_visible_to(&self, store: &TypeStore, viewer: &ErasedType) -> bool {
        match self {
            ErasedType::Void | ErasedType::Primitive(_) => true,
            ErasedType::Array(component) => component.is_visible_to(store, viewer),
            ErasedType::Class(id) => {
                let flags = store.def(*id).access_flags;
                flags.is_public() || flags.is_protected() || self.is_same_package(store, viewer)
            }
        }
    }

    /// Types that have a constant pool representation (`int`, `long`, `float`, `double`, `String`,
    /// `Class`, `MethodHandle`, `MethodType`).
    pub fn is_constant_pool(&self, store: &TypeStore) -> bool {
        let wk = store.well_known();
        match self {
            ErasedType::Primitive(base) => matches!(
                base,
                BaseType::Int | BaseType::Long | BaseType::Float | BaseType::Double
            ),
            ErasedType::Class(id) => {
                [wk.string, wk.class, wk.method_handle, wk.method_type].contains(id)
            }
            ErasedType::Void | ErasedType::Array(_) => false,
        }
    }

    /// Whether an annotation property may return this type.
    pub fn is_annotation_return_type(&self, store: &TypeStore) -> bool {
        match self {
            ErasedType::Array(component) => {
                !component.is_array() && component.is_annotation_value_type(store)
            }
            other => other.is_annotation_value_type(store),
        }
    }

    fn is_annotation_value_type(&self, store: &TypeStore) -> bool {
        let wk = store.well_known();
        match self {
            ErasedType::Primitive(_) => true,
            ErasedType::Class(id) => {
                *id == wk.string
                    || *id == wk.class
                    || self.is_enum(store)
                    || self.is_annotation(store)
            }
            ErasedType::Void | ErasedType::Array(_) => false,
        }
    }

    pub fn is_assignable_to(&self, store: &TypeStore, target: &ErasedType) -> bool {
        target.is_assignable_from(store, self)
    }

    /// Whether a value of type `source` can be stored in a variable of this type without a cast.
    pub fn is_assignable_from(&self, store: &TypeStore, source: &ErasedType) -> bool {
        if self == source {
            return true;
        }
        let wk = store.well_known();
        match (self, source) {
            (ErasedType::Void | ErasedType::Primitive(_), _)
            | (_, ErasedType::Void | ErasedType::Primitive(_)) => false,
            (ErasedType::Class(target), _) if *target == wk.object => true,
            (ErasedType::Array(target), ErasedType::Array(source)) => {
                !target.is_primitive() && !source.is_primitive() && target.is_assignable_from(store, source)
            }
            (ErasedType::Array(_), ErasedType::Class(_)) => false,
            (ErasedType::Class(target), ErasedType::Array(_)) => {
                *target == wk.cloneable || *target == wk.serializable
            }
            (ErasedType::Class(target), ErasedType::Class(source)) => {
                is_subclass(store, *source, *target)
            }
        }
    }
}

/// Breadth-first walk over declared super classes and interfaces.
fn is_subclass(store: &TypeStore, source: ClassId, target: ClassId) -> bool {
    let mut seen = HashSet::from([source]);
    let mut queue = VecDeque::from([source]);
    while let Some(current) = queue.pop_front() {
        if current == target {
            return true;
        }
        let def = store.def(current);
        let supers = def.super_class.iter().chain(def.interfaces.iter());
        for next in supers.filter_map(|ty| ty.try_erasure().ok()?.class_id()) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}
