use std::sync::Arc;

use crate::erased::ErasedType;
use crate::error::ShapeError;
use crate::field::FieldDescription;
use crate::generic::{GenericType, ParameterizedType, Sort};
use crate::method::MethodDescription;
use crate::store::{ClassId, TypeStore};
use crate::visitor::{Substitutor, TypeBinding};

/// The members and super types of a type, shared by erased and generic views.
///
/// Only non-generic and parameterized shapes (and generic arrays, which behave like any array)
/// have a hierarchy; asking a wildcard or a type variable is an error.
pub trait TypeRepresentation<'p> {
    fn store(&self) -> &'p TypeStore;

    fn as_generic(&self) -> GenericType;

    fn type_name(&self) -> String {
        self.as_generic().type_name(self.store())
    }

    fn super_type(&self) -> Result<Option<GenericType>, ShapeError>;

    fn interfaces(&self) -> Result<Vec<GenericType>, ShapeError>;

    fn declared_fields(&self) -> Result<Vec<FieldDescription<'p>>, ShapeError>;

    fn declared_methods(&self) -> Result<Vec<MethodDescription<'p>>, ShapeError>;

    /// This type followed by its super classes; a fresh iterator on every call.
    fn hierarchy(&self) -> TypeHierarchy<'p> {
        TypeHierarchy {
            store: self.store(),
            next: Some(self.as_generic()),
        }
    }
}

/// A generic shape viewed as a type.
#[derive(Clone, Debug)]
pub struct TypeView<'p> {
    store: &'p TypeStore,
    shape: GenericType,
}

/// An erased type viewed as a type; members keep their declared generic shapes.
#[derive(Clone, Debug)]
pub struct ErasedView<'p> {
    inner: TypeView<'p>,
}

enum Members<'a> {
    Class(ClassId, Option<&'a ParameterizedType>),
    Array,
    None,
}

impl<'p> TypeView<'p> {
    pub fn new(store: &'p TypeStore, shape: GenericType) -> Self {
        Self { store, shape }
    }

    pub fn shape(&self) -> &GenericType {
        &self.shape
    }

    fn members(&self, operation: &'static str) -> Result<Members<'_>, ShapeError> {
        match &self.shape {
            GenericType::NonGeneric(ErasedType::Class(id)) => Ok(Members::Class(*id, None)),
            GenericType::NonGeneric(ErasedType::Array(_)) | GenericType::GenericArray(_) => {
                Ok(Members::Array)
            }
            GenericType::NonGeneric(ErasedType::Void | ErasedType::Primitive(_)) => Ok(Members::None),
            GenericType::Parameterized(ty) => Ok(Members::Class(ty.raw, Some(ty))),
            GenericType::Wildcard(_) | GenericType::TypeVariable(_) => Err(ShapeError::UnsupportedSort {
                operation,
                sort: self.shape.sort(),
            }),
        }
    }

    fn binding(&self, parameterized: Option<&ParameterizedType>) -> Option<TypeBinding> {
        parameterized.map(|ty| TypeBinding::of(self.store, ty))
    }
}

impl<'p> TypeRepresentation<'p> for TypeView<'p> {
    fn store(&self) -> &'p TypeStore {
        self.store
    }

    fn as_generic(&self) -> GenericType {
        self.shape.clone()
    }

    fn super_type(&self) -> Result<Option<GenericType>, ShapeError> {
        Ok(match self.members("super_type")? {
            Members::Class(id, parameterized) => {
                let declared = self.store.def(id).super_class.as_ref();
                match self.binding(parameterized) {
                    Some(binding) => declared.map(|ty| binding.substitute(ty)),
                    None => declared.cloned(),
                }
            }
            Members::Array => Some(GenericType::class(self.store.well_known().object)),
            Members::None => None,
        })
    }

    fn interfaces(&self) -> Result<Vec<GenericType>, ShapeError> {
        Ok(match self.members("interfaces")? {
            Members::Class(id, parameterized) => {
                let declared = &self.store.def(id).interfaces;
                match self.binding(parameterized) {
                    Some(binding) => declared.iter().map(|ty| binding.substitute(ty)).collect(),
                    None => declared.clone(),
                }
            }
            Members::Array => {
                let wk = self.store.well_known();
                vec![GenericType::class(wk.cloneable), GenericType::class(wk.serializable)]
            }
            Members::None => Vec::new(),
        })
    }

    fn declared_fields(&self) -> Result<Vec<FieldDescription<'p>>, ShapeError> {
        let store = self.store;
        Ok(match self.members("declared_fields")? {
            Members::Class(id, parameterized) => {
                let defined = store
                    .def(id)
                    .fields
                    .iter()
                    .map(|def| FieldDescription::new(store, id, def));
                match self.binding(parameterized) {
                    Some(binding) => defined
                        .map(|field| field.substituted(self.shape.clone(), &binding))
                        .collect(),
                    None => defined.collect(),
                }
            }
            Members::Array | Members::None => Vec::new(),
        })
    }

    fn declared_methods(&self) -> Result<Vec<MethodDescription<'p>>, ShapeError> {
        let store = self.store;
        Ok(match self.members("declared_methods")? {
            Members::Class(id, parameterized) => {
                let defined = MethodDescription::declared_by(store, id);
                match self.binding(parameterized) {
                    Some(binding) => {
                        let visitor: Arc<dyn Substitutor + Send + Sync + 'p> = Arc::new(binding);
                        defined
                            .iter()
                            .map(|method| method.substituted(self.shape.clone(), visitor.clone()))
                            .collect()
                    }
                    None => defined,
                }
            }
            Members::Array | Members::None => Vec::new(),
        })
    }
}

impl<'p> ErasedView<'p> {
    pub fn new(store: &'p TypeStore, ty: ErasedType) -> Self {
        Self {
            inner: TypeView::new(store, GenericType::NonGeneric(ty)),
        }
    }
}

impl<'p> TypeRepresentation<'p> for ErasedView<'p> {
    fn store(&self) -> &'p TypeStore {
        self.inner.store
    }

    fn as_generic(&self) -> GenericType {
        self.inner.as_generic()
    }

    fn super_type(&self) -> Result<Option<GenericType>, ShapeError> {
        self.inner.super_type()
    }

    fn interfaces(&self) -> Result<Vec<GenericType>, ShapeError> {
        self.inner.interfaces()
    }

    fn declared_fields(&self) -> Result<Vec<FieldDescription<'p>>, ShapeError> {
        self.inner.declared_fields()
    }

    fn declared_methods(&self) -> Result<Vec<MethodDescription<'p>>, ShapeError> {
        self.inner.declared_methods()
    }
}

/// Walks from a type up through its super classes.
///
/// Single pass: once exhausted it stays exhausted. Call [`TypeRepresentation::hierarchy`] again
/// to restart.
#[derive(Clone, Debug)]
pub struct TypeHierarchy<'p> {
    store: &'p TypeStore,
    next: Option<GenericType>,
}

impl Iterator for TypeHierarchy<'_> {
    type Item = GenericType;

    fn next(&mut self) -> Option<GenericType> {
        let current = self.next.take()?;
        self.next = match TypeView::new(self.store, current.clone()).super_type() {
            Ok(super_type) => super_type,
            Err(err) => {
                tracing::trace!(target: "nova.types", error = %err, "hierarchy ends at non-class sort");
                None
            }
        };
        tracing::trace!(
            target: "nova.types",
            ty = %current.type_name(self.store),
            "hierarchy step"
        );
        Some(current)
    }
}

impl Sort {
    /// Whether a [`TypeView`] of this sort has a hierarchy.
    pub fn has_hierarchy(self) -> bool {
        !matches!(self, Sort::Wildcard | Sort::TypeVariable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::{TypeVariable, VariableSource, WildcardType};
    use crate::store::{ClassDef, FieldDef, MethodDef, TypeVarDef};
    use nova_classfile::AccessFlags;
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: TypeStore,
        list: ClassId,
        array_list: ClassId,
    }

    /// `interface List<E>` with `E get(int)`, `class ArrayList<E> implements List<E>` with a field
    /// `E[] elements`.
    fn fixture() -> Fixture {
        let mut store = TypeStore::with_minimal_jdk();
        let object = store.well_known().object;
        let object_erasure = ErasedType::Class(object);

        let list = store.intern_class_id("java.util.List");
        let e_list = GenericType::variable("E", VariableSource::Type(list), object_erasure.clone());
        let mut list_def = ClassDef::new(
            "java.util.List",
            AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT,
            None,
        );
        list_def
            .type_variables
            .push(TypeVarDef::new("E", vec![GenericType::class(object)]));
        list_def.methods.push(MethodDef::simple(
            "get",
            AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
            e_list,
            vec![GenericType::primitive(nova_classfile::BaseType::Int)],
        ));
        store.define_class(list, list_def);

        let array_list = store.intern_class_id("java.util.ArrayList");
        let e = GenericType::variable("E", VariableSource::Type(array_list), object_erasure);
        let mut def = ClassDef::new("java.util.ArrayList", AccessFlags::PUBLIC, Some(GenericType::class(object)));
        def.type_variables
            .push(TypeVarDef::new("E", vec![GenericType::class(object)]));
        def.interfaces
            .push(GenericType::parameterized(list, vec![e.clone()]));
        def.fields.push(FieldDef {
            name: "elements".into(),
            access_flags: AccessFlags::new(AccessFlags::PRIVATE),
            ty: GenericType::array(e),
            annotations: Vec::new(),
        });
        store.define_class(array_list, def);

        Fixture {
            store,
            list,
            array_list,
        }
    }

    #[test]
    fn parameterized_view_binds_interfaces_fields_and_methods() {
        let Fixture {
            store,
            list,
            array_list,
        } = fixture();
        let string = GenericType::class(store.well_known().string);
        let view = TypeView::new(
            &store,
            GenericType::parameterized(array_list, vec![string.clone()]),
        );

        assert_eq!(
            view.interfaces().unwrap(),
            vec![GenericType::parameterized(list, vec![string.clone()])]
        );
        let fields = view.declared_fields().unwrap();
        assert_eq!(fields[0].ty(), &GenericType::array(string.clone()));
        assert_eq!(fields[0].descriptor(), "[Ljava/lang/String;");

        let list_view = TypeView::new(&store, view.interfaces().unwrap().remove(0));
        let methods = list_view.declared_methods().unwrap();
        assert_eq!(methods[0].return_type(), string);
        assert_eq!(methods[0].descriptor(), "(I)Ljava/lang/String;");
        assert!(!methods[0].is_defined_shape());
        assert_eq!(methods[0].as_defined().descriptor(), "(I)Ljava/lang/Object;");
    }

    #[test]
    fn generic_array_has_fixed_super_types() {
        let Fixture { store, list, .. } = fixture();
        let wk = *store.well_known();
        let e = GenericType::variable("E", VariableSource::Type(list), ErasedType::Class(wk.object));
        let view = TypeView::new(&store, GenericType::array(e));
        assert_eq!(view.super_type(), Ok(Some(GenericType::class(wk.object))));
        assert_eq!(
            view.interfaces(),
            Ok(vec![GenericType::class(wk.cloneable), GenericType::class(wk.serializable)])
        );
        assert!(view.declared_methods().unwrap().is_empty());
        assert!(view.declared_fields().unwrap().is_empty());
    }

    #[test]
    fn wildcards_and_variables_have_no_hierarchy() {
        let store = TypeStore::with_minimal_jdk();
        let wildcard = TypeView::new(&store, GenericType::Wildcard(WildcardType::unbounded(&store)));
        assert_eq!(
            wildcard.super_type(),
            Err(ShapeError::UnsupportedSort {
                operation: "super_type",
                sort: Sort::Wildcard
            })
        );
        let variable = TypeView::new(
            &store,
            GenericType::TypeVariable(TypeVariable::new(
                "T",
                VariableSource::Method,
                ErasedType::Class(store.well_known().object),
            )),
        );
        assert!(variable.declared_methods().is_err());
        assert!(!Sort::TypeVariable.has_hierarchy());
    }

    #[test]
    fn hierarchy_is_restartable_and_finite() {
        let Fixture {
            store, array_list, ..
        } = fixture();
        let view = ErasedView::new(&store, ErasedType::Class(array_list));
        let first: Vec<_> = view.hierarchy().collect();
        let second: Vec<_> = view.hierarchy().collect();
        assert_eq!(
            first,
            vec![
                GenericType::class(array_list),
                GenericType::class(store.well_known().object)
            ]
        );
        assert_eq!(first, second);

        let mut walk = view.hierarchy();
        assert!(walk.by_ref().count() == 2);
        assert_eq!(walk.next(), None);
    }
}
