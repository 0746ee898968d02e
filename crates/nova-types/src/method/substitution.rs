use std::hash::{Hash, Hasher};

use smol_str::SmolStr;

use crate::erased::ErasedType;
use crate::generic::{GenericType, TypeVariable, VariableSource};
use crate::method::{MethodDescription, Substituted};
use crate::store::ClassId;
use crate::visitor::Substitutor;

/// Applies a substituted method's visitor while keeping the method's own type variables.
///
/// A use-site substitution of the declaring type must not capture the variables the method
/// declares itself; those are passed through with their erasure recomputed from the substituted
/// bound.
pub(crate) struct VariableRetainingDelegator<'a, 'p> {
    owner: &'a MethodDescription<'p>,
    shape: &'a Substituted<'p>,
}

impl<'a, 'p> VariableRetainingDelegator<'a, 'p> {
    pub(crate) fn new(owner: &'a MethodDescription<'p>, shape: &'a Substituted<'p>) -> Self {
        Self { owner, shape }
    }

    fn object(&self) -> ErasedType {
        ErasedType::Class(self.owner.store().well_known().object)
    }

    fn retained_erasure(&self, symbol: &SmolStr, visiting: &mut Vec<SmolStr>) -> ErasedType {
        if visiting.contains(symbol) {
            return self.object();
        }
        visiting.push(symbol.clone());
        let (_, def) = self.shape.defined.definition();
        let bound = def
            .type_variables
            .iter()
            .find(|var| var.symbol == *symbol)
            .and_then(|var| var.bounds.first());
        match bound {
            Some(bound) => self.bound_erasure(bound, visiting),
            None => self.object(),
        }
    }

    /// Erasure of a substituted bound. Type arguments never contribute to an erasure, so they are
    /// not visited.
    fn bound_erasure(&self, bound: &GenericType, visiting: &mut Vec<SmolStr>) -> ErasedType {
        let visitor = &self.shape.visitor;
        match bound {
            GenericType::TypeVariable(var) if var.source == VariableSource::Method => {
                self.retained_erasure(&var.symbol, visiting)
            }
            GenericType::GenericArray(component) => {
                ErasedType::array_of(self.bound_erasure(component, visiting))
            }
            GenericType::Parameterized(ty) => ErasedType::Class(visitor.on_raw_type(ty.raw)),
            GenericType::NonGeneric(_) | GenericType::TypeVariable(_) => visitor
                .substitute(bound)
                .try_erasure()
                .unwrap_or_else(|_| self.object()),
            GenericType::Wildcard(_) => self.object(),
        }
    }
}

impl Substitutor for VariableRetainingDelegator<'_, '_> {
    fn on_type_variable(&self, variable: &TypeVariable) -> GenericType {
        match variable.source {
            VariableSource::Method => GenericType::TypeVariable(TypeVariable::new(
                variable.symbol.clone(),
                VariableSource::Method,
                self.retained_erasure(&variable.symbol, &mut Vec::new()),
            )),
            VariableSource::Type(_) | VariableSource::Detached => self
                .shape
                .visitor
                .substitute(&GenericType::TypeVariable(variable.clone())),
        }
    }

    fn on_type_argument(&self, argument: &GenericType) -> GenericType {
        match argument {
            GenericType::TypeVariable(variable) if variable.source != VariableSource::Method => {
                self.shape.visitor.on_type_argument(argument)
            }
            other => self.substitute(other),
        }
    }

    fn on_non_generic(&self, ty: &ErasedType) -> GenericType {
        self.shape.visitor.on_non_generic(ty)
    }

    fn on_raw_type(&self, raw: ClassId) -> ClassId {
        self.shape.visitor.on_raw_type(raw)
    }
}

impl PartialEq for VariableRetainingDelegator<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
    }
}

impl Eq for VariableRetainingDelegator<'_, '_> {}

impl Hash for VariableRetainingDelegator<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
    }
}
