use nova_types::{
    ErasedType, ErasedView, GenericType, TypeRepresentation, TypeView, VariableSource,
    WildcardType,
};
use pretty_assertions::assert_eq;

use super::fixtures::Fixture;

#[test]
fn class_hierarchy_walks_super_classes_only() {
    let f = Fixture::new();
    let wk = *f.store.well_known();
    let view = ErasedView::new(&f.store, f.class(f.s));

    let names: Vec<_> = view.hierarchy().map(|ty| ty.type_name(&f.store)).collect();
    assert_eq!(names, vec!["p.S", "p.D", "java.lang.Object"]);
    assert_eq!(view.interfaces().unwrap(), vec![GenericType::class(f.i)]);

    let interface = ErasedView::new(&f.store, f.class(f.i));
    assert_eq!(interface.super_type(), Ok(None));
    assert_eq!(interface.hierarchy().count(), 1);

    let array = ErasedView::new(&f.store, ErasedType::array_of(f.jdk("String")));
    assert_eq!(
        array.hierarchy().collect::<Vec<_>>(),
        vec![
            GenericType::NonGeneric(ErasedType::array_of(f.jdk("String"))),
            GenericType::class(wk.object),
        ]
    );
}

#[test]
fn methods_seen_through_a_parameterization_keep_their_own_variables() {
    let f = Fixture::new();
    let string = GenericType::class(f.store.well_known().string);
    let view = TypeView::new(&f.store, GenericType::parameterized(f.boxed, vec![string.clone()]));
    let pick = view.declared_methods().unwrap().remove(0);

    assert_eq!(pick.declaring_type().type_name(&f.store), "p.Box<java.lang.String>");
    assert_eq!(pick.parameter_types()[1], string);
    match pick.return_type() {
        GenericType::TypeVariable(var) => {
            assert_eq!(var.symbol.as_str(), "T");
            assert_eq!(var.source, VariableSource::Method);
            assert_eq!(var.erasure, f.jdk("String"));
        }
        other => panic!("expected the method's own type variable, got {other:?}"),
    }
    assert_eq!(
        pick.to_generic_string(),
        "public T p.Box<java.lang.String>.pick(java.util.List<T>,java.lang.String)"
    );
    assert_eq!(pick.parameters()[0].name(), "items");
    assert_eq!(pick.parameters()[1].name(), "arg1");
}

#[test]
fn lower_bounded_wildcard_arguments_collapse_to_object() {
    let f = Fixture::new();
    let wk = *f.store.well_known();
    let argument = GenericType::Wildcard(WildcardType::lower(GenericType::class(wk.string)));
    let view = TypeView::new(&f.store, GenericType::parameterized(f.array_list, vec![argument.clone()]));

    let head = view.declared_fields().unwrap().remove(0);
    assert_eq!(head.ty(), &GenericType::class(wk.object));
    assert_eq!(head.descriptor(), "Ljava/lang/Object;");
    assert_eq!(
        view.interfaces().unwrap(),
        vec![GenericType::parameterized(f.list, vec![argument])]
    );
}
