use nova_types::{
    AccessFlags, GenericType, MethodDef, MethodDescription, CONSTRUCTOR_INTERNAL_NAME,
    TYPE_INITIALIZER_INTERNAL_NAME,
};
use proptest::prelude::*;

use super::fixtures::Fixture;

fn internal_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        CONSTRUCTOR_INTERNAL_NAME,
        TYPE_INITIALIZER_INTERNAL_NAME,
        "run",
        "value",
        "<lambda>",
    ])
}

proptest! {
    #[test]
    fn exactly_one_kind_holds(name in internal_name(), flags in any::<u16>()) {
        let f = Fixture::new();
        let method = MethodDescription::latent(
            &f.store,
            f.d,
            MethodDef::simple(name, flags, GenericType::void(), Vec::new()),
        );
        let kinds = [method.is_constructor(), method.is_type_initializer(), method.is_method()];
        prop_assert_eq!(kinds.iter().filter(|kind| **kind).count(), 1);
    }

    #[test]
    fn virtuality_excludes_constructors_initializers_privates_and_statics(
        name in internal_name(),
        flags in any::<u16>(),
    ) {
        let f = Fixture::new();
        let method = MethodDescription::latent(
            &f.store,
            f.d,
            MethodDef::simple(name, flags, GenericType::void(), Vec::new()),
        );
        let modifiers = AccessFlags::new(flags);
        let expected = method.is_method() && !modifiers.is_private() && !modifiers.is_static();
        prop_assert_eq!(method.is_virtual(), expected);
        if method.is_static() {
            prop_assert!(!method.is_specializable_for(&f.class(f.d)));
        }
    }
}
