#![allow(dead_code)]

use nova_types::{
    AccessFlags, BaseType, ClassDef, ClassId, ErasedType, FieldDef, GenericType, MethodDef, ParameterDef,
    TypeStore, TypeVarDef, VariableSource,
};

pub const PUBLIC: u16 = AccessFlags::PUBLIC;
pub const PRIVATE: u16 = AccessFlags::PRIVATE;
pub const STATIC: u16 = AccessFlags::STATIC;
pub const ABSTRACT: u16 = AccessFlags::ABSTRACT;
pub const INTERFACE: u16 = AccessFlags::INTERFACE | AccessFlags::ABSTRACT;

/// A small class graph on top of the minimal JDK:
///
/// ```text
/// interface java.util.List<E>
/// class java.util.ArrayList<E> implements List<E> { E head; E get(int); }
/// class p.D { private void m(); public D copy(D); }
/// interface p.I { default void greet(); }
/// class p.S extends D implements I
/// class p.Box<E> { <T extends E> T pick(List<T> items, E fallback); }
/// class p.StrBox<E extends String>
/// ```
pub struct Fixture {
    pub store: TypeStore,
    pub list: ClassId,
    pub array_list: ClassId,
    pub d: ClassId,
    pub i: ClassId,
    pub s: ClassId,
    pub boxed: ClassId,
    pub str_box: ClassId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut store = TypeStore::with_minimal_jdk();
        let object = store.well_known().object;
        let object_ty = || GenericType::class(object);

        let list = store.intern_class_id("java.util.List");
        let mut list_def = ClassDef::new("java.util.List", PUBLIC | INTERFACE, None);
        list_def
            .type_variables
            .push(TypeVarDef::new("E", vec![object_ty()]));
        store.define_class(list, list_def);

        let array_list = store.intern_class_id("java.util.ArrayList");
        let element = GenericType::variable("E", VariableSource::Type(array_list), ErasedType::Class(object));
        let mut array_list_def = ClassDef::new("java.util.ArrayList", PUBLIC, Some(object_ty()));
        array_list_def
            .type_variables
            .push(TypeVarDef::new("E", vec![object_ty()]));
        array_list_def
            .interfaces
            .push(GenericType::parameterized(list, vec![element.clone()]));
        array_list_def.fields.push(FieldDef {
            name: "head".into(),
            access_flags: AccessFlags::new(PRIVATE),
            ty: element.clone(),
            annotations: Vec::new(),
        });
        array_list_def.methods.push(MethodDef::simple(
            "get",
            PUBLIC,
            element,
            vec![GenericType::primitive(BaseType::Int)],
        ));
        store.define_class(array_list, array_list_def);

        let d = store.intern_class_id("p.D");
        let mut d_def = ClassDef::new("p.D", PUBLIC, Some(object_ty()));
        d_def
            .methods
            .push(MethodDef::simple("m", PRIVATE, GenericType::void(), Vec::new()));
        d_def.methods.push(MethodDef::simple(
            "copy",
            PUBLIC,
            GenericType::class(d),
            vec![GenericType::class(d)],
        ));
        store.define_class(d, d_def);

        let mut i_def = ClassDef::new("p.I", PUBLIC | INTERFACE, None);
        i_def
            .methods
            .push(MethodDef::simple("greet", PUBLIC, GenericType::void(), Vec::new()));
        let i = store.add_class(i_def);

        let mut s_def = ClassDef::new("p.S", PUBLIC, Some(GenericType::class(d)));
        s_def.interfaces.push(GenericType::class(i));
        let s = store.add_class(s_def);

        let boxed = store.intern_class_id("p.Box");
        let e = GenericType::variable("E", VariableSource::Type(boxed), ErasedType::Class(object));
        let t = GenericType::variable("T", VariableSource::Method, ErasedType::Class(object));
        let mut box_def = ClassDef::new("p.Box", PUBLIC, Some(object_ty()));
        box_def
            .type_variables
            .push(TypeVarDef::new("E", vec![object_ty()]));
        box_def.methods.push(MethodDef {
            internal_name: "pick".into(),
            access_flags: AccessFlags::new(PUBLIC),
            type_variables: vec![TypeVarDef::new("T", vec![e.clone()])],
            return_type: t.clone(),
            parameters: vec![
                ParameterDef {
                    ty: GenericType::parameterized(list, vec![t]),
                    name: Some("items".into()),
                    access_flags: None,
                },
                ParameterDef::of(e),
            ],
            exception_types: Vec::new(),
            annotations: Vec::new(),
            default_value: None,
        });
        store.define_class(boxed, box_def);

        let string = store.well_known().string;
        let mut str_box_def = ClassDef::new("p.StrBox", PUBLIC, Some(object_ty()));
        str_box_def
            .type_variables
            .push(TypeVarDef::new("E", vec![GenericType::class(string)]));
        let str_box = store.add_class(str_box_def);

        Self {
            store,
            list,
            array_list,
            d,
            i,
            s,
            boxed,
            str_box,
        }
    }

    pub fn class(&self, id: ClassId) -> ErasedType {
        ErasedType::Class(id)
    }

    /// `java.lang.invoke.MethodHandles$Lookup` and friends, by short name.
    pub fn jdk(&self, name: &str) -> ErasedType {
        let wk = self.store.well_known();
        let id = match name {
            "Object" => wk.object,
            "String" => wk.string,
            "Class" => wk.class,
            "Serializable" => wk.serializable,
            "CallSite" => wk.call_site,
            "Lookup" => wk.lookup,
            "MethodType" => wk.method_type,
            "MethodHandle" => wk.method_handle,
            other => panic!("no well-known type {other}"),
        };
        ErasedType::Class(id)
    }
}
