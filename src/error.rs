use crate::{
    database::{db_structs::PlayerId, DirectoryError},
    store::StoreError
};
use thiserror::Error;

/// How the API layer should surface a [`RankingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    ClientError,
    ServiceUnavailable,
    Internal
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("no authenticated player on the request")]
    PlayerNotAuthenticated,

    #[error("player {0} does not exist or has been deleted")]
    PlayerNotFound(PlayerId),

    #[error("player {0} has no entry in the ranking")]
    PlayerNotRanked(PlayerId),

    #[error("ranking store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("failed to serialize ranking view: {0}")]
    Serialization(#[from] serde_json::Error)
}

impl From<StoreError> for RankingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable { .. } => RankingError::StoreUnavailable(e),
            e => RankingError::Store(e)
        }
    }
}

impl RankingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RankingError::PlayerNotAuthenticated => ErrorKind::Unauthenticated,
            RankingError::PlayerNotFound(_) => ErrorKind::ClientError,
            RankingError::StoreUnavailable(_) => ErrorKind::ServiceUnavailable,
            RankingError::PlayerNotRanked(_)
            | RankingError::Store(_)
            | RankingError::Directory(_)
            | RankingError::Serialization(_) => ErrorKind::Internal
        }
    }
}

pub type RankingResult<T> = Result<T, RankingError>;
