use smol_str::SmolStr;
use thiserror::Error;

use crate::generic::Sort;

/// Misuse of the shape model: asking a question the receiver structurally cannot answer.
///
/// "No" answers of validation predicates are plain `false`, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("{operation} is not defined for {sort} types")]
    UnsupportedSort { operation: &'static str, sort: Sort },
    #[error("a wildcard has no erasure; resolve one of its bounds first")]
    WildcardErasure,
    #[error("not a bootstrap argument: {0}")]
    IllegalBootstrapArgument(String),
    #[error("cannot resolve type variable `{symbol}` in the attachment context")]
    UnresolvedTypeVariable { symbol: SmolStr },
}
