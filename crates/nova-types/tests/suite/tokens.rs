use std::collections::HashMap;

use nova_types::{
    Attachment, ErasedType, GenericType, MethodDef, MethodDescription, ShapeError, TypeVarDef,
    TypeVariable, VariableSource,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use smol_str::SmolStr;

use super::fixtures::{Fixture, PUBLIC, STATIC};

fn retain_all(_: &TypeVariable) -> bool {
    false
}

#[test]
fn detaching_then_attaching_to_the_declaring_class_is_identical() {
    let f = Fixture::new();
    for declaring in [f.d, f.i, f.array_list, f.boxed] {
        for method in MethodDescription::declared_by(&f.store, declaring) {
            let token = method.as_token_with(&retain_all);
            let attached = token.attach(&f.store, declaring).unwrap();
            assert!(
                attached.as_token_with(&retain_all).is_identical_to(&token),
                "{method} did not survive a round trip"
            );
            assert_eq!(attached.return_type(), method.return_type());
            assert_eq!(attached.parameter_types(), method.parameter_types());

            let erased = method.as_token().attach(&f.store, declaring).unwrap();
            assert_eq!(erased, method);
            assert_eq!(erased.descriptor(), method.descriptor());
        }
    }
}

#[test]
fn explicit_attachment_maps_symbols() {
    let f = Fixture::new();
    let string = GenericType::class(f.store.well_known().string);
    let pick = MethodDescription::declared_by(&f.store, f.boxed).remove(0);
    let token = pick.as_token_with(&retain_all);

    let mapping: HashMap<SmolStr, GenericType> = [("E".into(), string.clone())].into();
    let attached = token.accept(&Attachment::explicit(&f.store, &mapping, f.boxed));

    assert_eq!(attached.parameters[1].ty, string);
    match &attached.return_type {
        GenericType::TypeVariable(var) => {
            assert_eq!(var.symbol.as_str(), "T");
            assert_eq!(var.source, VariableSource::Detached);
        }
        other => panic!("expected a detached placeholder, got {other:?}"),
    }
}

#[test]
fn retained_symbols_must_resolve_in_the_new_class() {
    let f = Fixture::new();
    let get = MethodDescription::declared_by(&f.store, f.array_list).remove(0);
    let token = get.as_token_with(&retain_all);
    let err = token.attach(&f.store, f.d).unwrap_err();
    assert_eq!(err, ShapeError::UnresolvedTypeVariable { symbol: "E".into() });

    // `Box` declares its own `E`.
    let moved = token.attach(&f.store, f.boxed).unwrap();
    assert_eq!(moved.return_type().symbol().map(SmolStr::as_str), Some("E"));
    assert_eq!(moved, get);

    assert_eq!(get.as_token().attach(&f.store, f.d).unwrap(), get);
}

#[test]
fn class_variables_keep_their_erasure_in_a_new_class() {
    let f = Fixture::new();
    let get = MethodDescription::declared_by(&f.store, f.array_list).remove(0);
    assert_eq!(get.descriptor(), "(I)Ljava/lang/Object;");

    let moved = get.as_token().attach(&f.store, f.str_box).unwrap();
    assert_eq!(moved.descriptor(), "(I)Ljava/lang/Object;");
    assert_eq!(moved, get);

    // A retained `E` picks up the bound declared by `StrBox`.
    let rebound = get.as_token_with(&retain_all).attach(&f.store, f.str_box).unwrap();
    assert_eq!(rebound.descriptor(), "(I)Ljava/lang/String;");
    assert_ne!(rebound, get);
}

#[test]
fn overriding_methods_detach_to_equal_tokens() {
    let f = Fixture::new();
    let copy = MethodDescription::declared_by(&f.store, f.d).remove(1);
    let overriding = MethodDescription::latent(
        &f.store,
        f.s,
        MethodDef::simple(
            "copy",
            PUBLIC,
            GenericType::class(f.d),
            vec![GenericType::class(f.d)],
        ),
    );

    assert_eq!(copy, overriding);
    assert_eq!(copy.as_token(), overriding.as_token());
    assert_eq!(copy.as_type_token(), overriding.as_token().as_type_token());
}

proptest! {
    #[test]
    fn structural_class_survives_reattachment(
        returns in 0usize..9,
        params in prop::collection::vec(0usize..9, 0..4),
        target in 0usize..5,
        is_static in any::<bool>(),
    ) {
        let f = Fixture::new();
        let wk = *f.store.well_known();
        let object = ErasedType::Class(wk.object);
        let element = GenericType::variable("E", VariableSource::Type(f.boxed), object.clone());
        let own = GenericType::variable("T", VariableSource::Method, object);
        let pool = [
            GenericType::void(),
            GenericType::class(wk.string),
            GenericType::class(f.i),
            GenericType::array(GenericType::class(wk.object)),
            GenericType::parameterized(f.list, vec![GenericType::class(wk.string)]),
            element.clone(),
            GenericType::parameterized(f.list, vec![element]),
            own.clone(),
            GenericType::array(own),
        ];
        let flags = if is_static { PUBLIC | STATIC } else { PUBLIC };
        let mut def = MethodDef::simple(
            "run",
            flags,
            pool[returns].clone(),
            params.iter().map(|&p| pool[p.max(1)].clone()).collect(),
        );
        def.type_variables = vec![TypeVarDef::new("T", vec![GenericType::class(wk.object)])];
        let method = MethodDescription::latent(&f.store, f.d, def);
        let target = [f.d, f.s, f.boxed, wk.string, f.str_box][target];

        let token = method.as_token();
        let attached = token.attach(&f.store, target).unwrap();
        prop_assert_eq!(&attached, &method);
        prop_assert_eq!(attached.descriptor(), method.descriptor());
        prop_assert_eq!(&attached.as_token(), &token);
        prop_assert_eq!(&token, &token.clone());
        prop_assert_eq!(attached.declaring_class(), target);
    }
}
