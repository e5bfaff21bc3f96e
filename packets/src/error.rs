use thiserror::Error;

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("malformed state payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{entity} entry {index} has {found} values, expected at least {expected}")]
    ShortEntity {
        entity: &'static str,
        index: usize,
        found: usize,
        expected: usize,
    },

    #[error("{entity} entry {index} has a non-numeric field {value:?}")]
    NotANumber {
        entity: &'static str,
        index: usize,
        value: String,
    },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}
