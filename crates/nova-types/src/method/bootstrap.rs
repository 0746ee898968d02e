use nova_classfile::{BaseType, ConstValue};

use crate::erased::ErasedType;
use crate::error::ShapeError;
use crate::store::TypeStore;

/// A static argument handed to a call-site bootstrap method.
#[derive(Clone, Debug, PartialEq)]
pub enum BootstrapArgument {
    Const(ConstValue),
    /// A class literal.
    Type(ErasedType),
    MethodHandle {
        owner: String,
        name: String,
        descriptor: String,
    },
    MethodType {
        descriptor: String,
    },
}

impl BootstrapArgument {
    /// Only `String`, `int`, `long`, `float` and `double` constants live in the constant pool.
    pub(crate) fn validate(&self) -> Result<(), ShapeError> {
        match self {
            BootstrapArgument::Const(
                value @ (ConstValue::Byte(_)
                | ConstValue::Char(_)
                | ConstValue::Short(_)
                | ConstValue::Boolean(_)),
            ) => Err(ShapeError::IllegalBootstrapArgument(format!(
                "{} constant {value:?}",
                value.kind()
            ))),
            _ => Ok(()),
        }
    }

    /// Whether this argument can be bound to a fixed bootstrap parameter of type `parameter`.
    pub(crate) fn binds_to(&self, store: &TypeStore, parameter: &ErasedType) -> bool {
        let wk = store.well_known();
        match self {
            BootstrapArgument::Const(ConstValue::String(_)) => parameter.represents(wk.string),
            BootstrapArgument::Const(ConstValue::Int(_)) => parameter.represents_primitive(BaseType::Int),
            BootstrapArgument::Const(ConstValue::Long(_)) => parameter.represents_primitive(BaseType::Long),
            BootstrapArgument::Const(ConstValue::Float(_)) => {
                parameter.represents_primitive(BaseType::Float)
            }
            BootstrapArgument::Const(ConstValue::Double(_)) => {
                parameter.represents_primitive(BaseType::Double)
            }
            BootstrapArgument::Const(_) => false,
            BootstrapArgument::Type(_) => parameter.represents(wk.class),
            BootstrapArgument::MethodHandle { .. } => {
                parameter.is_assignable_from(store, &ErasedType::Class(wk.method_handle))
            }
            BootstrapArgument::MethodType { .. } => parameter.represents(wk.method_type),
        }
    }
}
