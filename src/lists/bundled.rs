use std::path::PathBuf;

use thiserror::Error;

use crate::domain::SafetyList;

const EMBEDDED_LIST: &str = include_str!("../../assets/websites.json");

#[derive(Debug, Error)]
pub enum BundledListError {
    #[error("failed to read bundled list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bundled list is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Default document shipped with the host, consulted when nothing has been
/// persisted yet.
#[derive(Debug, Clone)]
pub enum BundledList {
    Embedded,
    File(PathBuf),
}

impl BundledList {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map(BundledList::File).unwrap_or(BundledList::Embedded)
    }

    pub async fn read(&self) -> Result<SafetyList, BundledListError> {
        match self {
            BundledList::Embedded => Ok(SafetyList::from_json(EMBEDDED_LIST.as_bytes())?),
            BundledList::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| BundledListError::Read {
                        path: path.clone(),
                        source,
                    })?;
                Ok(SafetyList::from_json(&bytes)?)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            BundledList::Embedded => "embedded".to_string(),
            BundledList::File(path) => path.display().to_string(),
        }
    }
}
