use nova_types::{BootstrapArgument, ConstValue, ErasedType, GenericType, MethodDef, MethodDescription};
use pretty_assertions::assert_eq;

use super::fixtures::{Fixture, PUBLIC, STATIC};

#[test]
fn private_method_is_specializable_only_for_its_declaring_type() {
    let f = Fixture::new();
    let methods = MethodDescription::declared_by(&f.store, f.d);
    let m = methods.iter().find(|m| m.internal_name() == "m").unwrap();

    assert!(m.is_specializable_for(&f.class(f.d)));
    assert!(!m.is_specializable_for(&f.class(f.s)));
    assert!(!m.is_virtual());
}

#[test]
fn default_method_is_specializable_only_for_its_interface() {
    let f = Fixture::new();
    let greet = MethodDescription::declared_by(&f.store, f.i).remove(0);

    assert!(greet.is_default_method());
    assert!(greet.is_virtual());
    assert!(greet.is_specializable_for(&f.class(f.i)));
    assert!(!greet.is_specializable_for(&f.class(f.s)));
    assert!(greet.is_invokable_on(&f.class(f.s)));
}

#[test]
fn four_parameter_bootstrap_with_a_single_text_argument() {
    let f = Fixture::new();
    let object_array = ErasedType::array_of(f.jdk("Object"));
    let parameters = [f.jdk("Lookup"), f.jdk("String"), f.jdk("MethodType"), object_array];
    let call_site = f.store.well_known().call_site;
    let def = MethodDef::simple(
        "bootstrap",
        PUBLIC | STATIC,
        GenericType::class(call_site),
        parameters.into_iter().map(GenericType::NonGeneric).collect(),
    );
    let method = MethodDescription::latent(&f.store, f.d, def);

    assert!(method.is_bootstrap());
    assert_eq!(
        method.is_bootstrap_with(&[BootstrapArgument::Const(ConstValue::String("x".into()))]),
        Ok(true)
    );
    assert_eq!(method.to_string(), "public static java.lang.invoke.CallSite p.D.bootstrap(java.lang.invoke.MethodHandles$Lookup,java.lang.String,java.lang.invoke.MethodType,[Ljava.lang.Object;)");
}

#[test]
fn overriding_methods_share_a_dispatch_slot() {
    let f = Fixture::new();
    let copy = MethodDescription::declared_by(&f.store, f.d)
        .into_iter()
        .find(|m| m.internal_name() == "copy")
        .unwrap();
    let same_slot = MethodDescription::latent(
        &f.store,
        f.s,
        MethodDef::simple("copy", PUBLIC, GenericType::class(f.d), vec![GenericType::class(f.d)]),
    );
    let covariant = MethodDescription::latent(
        &f.store,
        f.s,
        MethodDef::simple("copy", PUBLIC, GenericType::class(f.s), vec![GenericType::class(f.d)]),
    );

    assert_eq!(copy, same_slot);
    assert_ne!(copy, covariant);
    assert_eq!(copy.descriptor(), "(Lp/D;)Lp/D;");
}
