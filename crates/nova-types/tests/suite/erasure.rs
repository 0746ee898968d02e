use nova_types::{
    BaseType, ErasedType, GenericType, ShapeError, Sort, TypeStore, VariableSource, WildcardType,
};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = GenericType> {
    let wk = *TypeStore::with_minimal_jdk().well_known();
    let classes = vec![wk.object, wk.string, wk.class, wk.serializable, wk.method_type];
    prop_oneof![
        prop::sample::select(vec![
            BaseType::Boolean,
            BaseType::Int,
            BaseType::Long,
            BaseType::Double,
        ])
        .prop_map(GenericType::primitive),
        prop::sample::select(classes.clone()).prop_map(GenericType::class),
        (prop::sample::select(vec!["T", "U", "E"]), prop::sample::select(classes))
            .prop_map(|(symbol, bound)| {
                GenericType::variable(symbol, VariableSource::Method, ErasedType::Class(bound))
            }),
    ]
}

/// Shapes without a top-level wildcard; wildcards only appear as type arguments.
fn shape() -> impl Strategy<Value = GenericType> {
    let wk = *TypeStore::with_minimal_jdk().well_known();
    leaf().prop_recursive(4, 24, 3, move |inner| {
        let argument = prop_oneof![
            inner.clone(),
            inner.clone().prop_map(|bound| GenericType::Wildcard(WildcardType::upper(bound))),
            inner.clone().prop_map(|bound| GenericType::Wildcard(WildcardType::lower(bound))),
        ];
        prop_oneof![
            inner.prop_map(GenericType::array),
            (
                prop::sample::select(vec![wk.class, wk.enumeration]),
                prop::collection::vec(argument, 1..3)
            )
                .prop_map(|(raw, arguments)| GenericType::parameterized(raw, arguments)),
        ]
    })
}

proptest! {
    #[test]
    fn erasure_is_idempotent(ty in shape()) {
        let erased = ty.erasure();
        prop_assert_eq!(GenericType::NonGeneric(erased.clone()).erasure(), erased.clone());
        prop_assert_eq!(ty.try_erasure(), Ok(erased));
    }

    #[test]
    fn only_wildcards_lack_an_erasure(bound in shape(), lower in any::<bool>()) {
        let wildcard = if lower { WildcardType::lower(bound) } else { WildcardType::upper(bound) };
        let ty = GenericType::Wildcard(wildcard);
        prop_assert_eq!(ty.sort(), Sort::Wildcard);
        prop_assert_eq!(ty.try_erasure(), Err(ShapeError::WildcardErasure));
    }

    #[test]
    fn arrays_of_non_generic_components_stay_non_generic(component in shape()) {
        let array = GenericType::array(component.clone());
        prop_assert_eq!(array.is_generic(), component.is_generic());
        prop_assert_eq!(array.erasure(), ErasedType::array_of(component.erasure()));
    }
}

#[test]
#[should_panic(expected = "wildcard has no erasure")]
fn erasure_of_a_wildcard_panics() {
    let store = TypeStore::with_minimal_jdk();
    let _ = GenericType::Wildcard(WildcardType::unbounded(&store)).erasure();
}
