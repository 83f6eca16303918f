use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to read beatmap file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
