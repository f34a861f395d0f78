//! Error type shared by the source readers, the alert stores and the engine.

use std::path::PathBuf;

use uuid::Uuid;

use super::alerts::model::AlertKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {dataset} from {}: {source}", .path.display())]
    SourceRead {
        dataset: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {dataset} from {}: {source}", .path.display())]
    SourceDecode {
        dataset: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("alert store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("failed to encode alert detail: {0}")]
    Detail(#[from] serde_json::Error),

    #[error("alert store holds a malformed row {id}: {reason}")]
    MalformedRow { id: i64, reason: String },

    #[error("identity key {key:?} produced twice for {kind} (employee {subject:?})")]
    IdentityCollision {
        kind: AlertKind,
        subject: Option<Uuid>,
        key: String,
    },

    #[error("{} alerts are owned by the reconciliation engine", .0.display_name())]
    ManagedKind(AlertKind),
}
