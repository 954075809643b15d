use crate::entity::EntityKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Malformed snapshot: {message}")]
    MalformedSnapshot { message: String },

    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Node {id} ({kind}) does not accept control actions")]
    NotControllable { id: String, kind: EntityKind },
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            message: message.into(),
        }
    }
}
