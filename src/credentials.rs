//! Token persistence between runs.

use crate::datamodel::Token;
use directories::ProjectDirs;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const TOKEN_FILE_NAME: &str = "auth.json";

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("No configuration directory could be determined for this user")]
    NoConfigDirectory,

    #[error("Could not access token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Token file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The token as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `auth.json` under the `vuesync` directory of the user configuration.
    pub fn default_location() -> Result<Self, CredentialsError> {
        let dirs = ProjectDirs::from("", "", "vuesync").ok_or(CredentialsError::NoConfigDirectory)?;
        Ok(Self::new(dirs.config_dir().join(TOKEN_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file, or one holding `null`, is no token.
    pub fn load(&self) -> Result<Option<Token>, CredentialsError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CredentialsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CredentialsError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the token, creating parent directories as needed.
    pub fn save(&self, token: Option<&Token>) -> Result<(), CredentialsError> {
        let io_error = |source| CredentialsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let file = File::create(&self.path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &token).map_err(|source| {
            CredentialsError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(io_error)
    }
}
