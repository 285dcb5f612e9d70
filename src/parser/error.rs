use thiserror::Error;

/// Why a single field, row or block produced no value. Never fatal: the
/// caller logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("no Product JSON-LD block on page")]
    NoProductBlock,

    #[error("field '{0}' not present")]
    Missing(&'static str),

    #[error("field '{field}' has unexpected type (expected {expected})")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("characteristics block has no <h3> heading")]
    NoHeading,

    #[error("row has {0} span cells, need 2")]
    TooFewCells(usize),

    #[error("characteristic '{0}' has an empty value")]
    EmptyValue(String),
}
