use crate::model::Id;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// The restrict delete policy refused to remove a row that still owns children.
    #[error("{entity} {id} still has {dependents} dependent {child}(s)")]
    HasDependents {
        entity: &'static str,
        id: Id,
        child: &'static str,
        dependents: i64,
    },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.into())
    }
}
