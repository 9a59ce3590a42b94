//! Dataset loading
//!
//! Local files and the bundled sample are read synchronously. Remote
//! datasets are fetched on a background thread running its own tokio
//! runtime; the UI polls a [`LoadHandle`] each frame for the result.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use shared::DatasetNode;
use thiserror::Error;

/// Flare sample compiled into the binary
const BUNDLED_FLARE: &str = include_str!("../assets/flare.json");

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Loader thread failed: {0}")]
    Runtime(String),
}

/// Where a dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Bundled,
    Path(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// Interpret a command-line argument: `http(s)://` means a URL,
    /// anything else a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Bundled => "flare (bundled)".to_string(),
            Self::Path(p) => p.display().to_string(),
            Self::Url(u) => u.clone(),
        }
    }
}

pub fn parse(json: &str) -> Result<DatasetNode, DatasetError> {
    Ok(DatasetNode::from_json(json)?)
}

pub fn load_bundled() -> Result<DatasetNode, DatasetError> {
    parse(BUNDLED_FLARE)
}

pub fn load_path(path: &Path) -> Result<DatasetNode, DatasetError> {
    let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse(&json)?;
    tracing::info!(path = %path.display(), nodes = data.count(), "dataset loaded");
    Ok(data)
}

pub async fn fetch(url: &str) -> Result<DatasetNode, DatasetError> {
    let client = reqwest::Client::new();
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    let data = parse(&body)?;
    tracing::info!(url, nodes = data.count(), "dataset fetched");
    Ok(data)
}

type LoadResult = Result<DatasetNode, DatasetError>;

/// Handle to a dataset load in progress
pub struct LoadHandle {
    source: DatasetSource,
    receiver: Receiver<LoadResult>,
}

impl LoadHandle {
    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    /// `Some(result)` once the load has completed. Consumes the result.
    pub fn try_recv(&self) -> Option<LoadResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                Some(Err(DatasetError::Runtime("loader exited without a result".into())))
            }
        }
    }
}

/// Start loading `source`. Local sources complete immediately; URLs are
/// fetched on a background thread.
pub fn load_async(source: DatasetSource) -> LoadHandle {
    let (tx, receiver) = mpsc::channel();
    match &source {
        DatasetSource::Bundled => {
            let _ = tx.send(load_bundled());
        }
        DatasetSource::Path(path) => {
            let _ = tx.send(load_path(path));
        }
        DatasetSource::Url(url) => {
            let url = url.clone();
            std::thread::spawn(move || {
                let result = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime.block_on(fetch(&url)),
                    Err(e) => Err(DatasetError::Runtime(e.to_string())),
                };
                if let Err(e) = &result {
                    tracing::error!(url, "dataset fetch failed: {e}");
                }
                let _ = tx.send(result);
            });
        }
    }
    LoadHandle { source, receiver }
}
