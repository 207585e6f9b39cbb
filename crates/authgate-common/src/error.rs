use std::path::PathBuf;

use thiserror::Error;

use crate::types::SwitchStep;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid provider '{0}' (expected sqlite or postgresql)")]
    InvalidProvider(String),

    #[error("no provider field found in schema {}", .0.display())]
    SchemaFormat(PathBuf),

    #[error(
        "switch stopped at the {failed} step (completed: {}): {source}",
        SwitchStep::join(.completed)
    )]
    PartialSwitch {
        completed: Vec<SwitchStep>,
        failed: SwitchStep,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
