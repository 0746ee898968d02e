use nova_types::{
    BaseType, BootstrapArgument, ConstValue, ErasedType, GenericType, MethodDef, MethodDescription,
    CONSTRUCTOR_INTERNAL_NAME,
};
use proptest::prelude::*;

use super::fixtures::{Fixture, PUBLIC, STATIC};

const NAMES: [&str; 8] = [
    "Object",
    "String",
    "Class",
    "Serializable",
    "Lookup",
    "MethodType",
    "MethodHandle",
    "CallSite",
];

#[derive(Clone, Debug)]
enum Param {
    Jdk(&'static str),
    Primitive(BaseType),
    ArrayOf(&'static str),
}

impl Param {
    fn erased(&self, f: &Fixture) -> ErasedType {
        match self {
            Param::Jdk(name) => f.jdk(name),
            Param::Primitive(base) => ErasedType::Primitive(*base),
            Param::ArrayOf(name) => ErasedType::array_of(f.jdk(name)),
        }
    }
}

fn param() -> impl Strategy<Value = Param> {
    prop_oneof![
        prop::sample::select(NAMES.to_vec()).prop_map(Param::Jdk),
        prop::sample::select(vec![BaseType::Int, BaseType::Long, BaseType::Boolean])
            .prop_map(Param::Primitive),
        prop::sample::select(vec!["Object", "String"]).prop_map(Param::ArrayOf),
    ]
}

fn legal_argument() -> impl Strategy<Value = BootstrapArgument> {
    prop_oneof![
        "[a-z]{0,3}".prop_map(|s| BootstrapArgument::Const(ConstValue::String(s))),
        any::<i32>().prop_map(|v| BootstrapArgument::Const(ConstValue::Int(v))),
        any::<i64>().prop_map(|v| BootstrapArgument::Const(ConstValue::Long(v))),
        Just(BootstrapArgument::MethodType {
            descriptor: "()V".into()
        }),
        Just(BootstrapArgument::MethodHandle {
            owner: "p/D".into(),
            name: "m".into(),
            descriptor: "()V".into(),
        }),
    ]
}

fn argument() -> impl Strategy<Value = BootstrapArgument> {
    prop_oneof![
        4 => legal_argument(),
        1 => any::<bool>().prop_map(|v| BootstrapArgument::Const(ConstValue::Boolean(v))),
        1 => any::<i8>().prop_map(|v| BootstrapArgument::Const(ConstValue::Byte(v))),
    ]
}

/// `(is_static, return type, is_constructor)`
fn method<'a>(
    f: &'a Fixture,
    shape: (bool, Option<&'static str>, bool),
    params: &[Param],
) -> MethodDescription<'a> {
    let (is_static, returns, constructor) = shape;
    let flags = if is_static { PUBLIC | STATIC } else { PUBLIC };
    let name = if constructor { CONSTRUCTOR_INTERNAL_NAME } else { "bootstrap" };
    let returns = returns.map_or_else(GenericType::void, |name| GenericType::NonGeneric(f.jdk(name)));
    let def = MethodDef::simple(
        name,
        flags,
        returns,
        params.iter().map(|p| GenericType::NonGeneric(p.erased(f))).collect(),
    );
    MethodDescription::latent(&f.store, f.d, def)
}

fn shape() -> impl Strategy<Value = (bool, Option<&'static str>, bool)> {
    (
        any::<bool>(),
        prop::option::of(prop::sample::select(vec!["CallSite", "Object", "String"])),
        prop::bool::weighted(0.1),
    )
}

proptest! {
    #[test]
    fn argument_validation_never_rescues_a_non_bootstrap_shape(
        shape in shape(),
        params in prop::collection::vec(param(), 0..7),
        arguments in prop::collection::vec(argument(), 0..4),
    ) {
        let f = Fixture::new();
        let method = method(&f, shape, &params);
        if !method.is_bootstrap() {
            prop_assert_eq!(method.is_bootstrap_with(&arguments), Ok(false));
        }
        if method.is_bootstrap_with(&arguments) == Ok(true) {
            prop_assert!(method.is_bootstrap());
        }
    }

    #[test]
    fn three_fixed_parameters(
        named in prop::sample::select(vec!["String", "Object"]),
        third in param(),
        arguments in prop::collection::vec(legal_argument(), 0..3),
    ) {
        let f = Fixture::new();
        let params = [Param::Jdk("Lookup"), Param::Jdk(named), third.clone()];
        let method = method(&f, (true, Some("CallSite"), false), &params);

        let trailing_array = matches!(third, Param::ArrayOf("Object"));
        let method_type_slot = matches!(third, Param::Jdk("MethodType" | "Object" | "Serializable"));
        prop_assert_eq!(method.is_bootstrap(), trailing_array || method_type_slot);
        if method.is_bootstrap() {
            prop_assert_eq!(
                method.is_bootstrap_with(&arguments),
                Ok(arguments.is_empty() || trailing_array)
            );
        }
    }
}
