use thiserror::Error;

/// Error raised while indexing a document for diffing.
///
/// The only failure mode is a value the engine cannot canonicalize. With
/// `serde_json` defaults this is limited to numbers that have no `f64`
/// projection; a convert function (see [`Options`](crate::Options)) can be
/// used to re-map such values before they reach the hasher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("unsupported value: {0}")]
    UnsupportedType(&'static str),
}
