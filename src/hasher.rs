use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::algorithm::Algorithm;

/// Path that selects standard input instead of a file.
pub const STDIN_PATH: &str = "-";

const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("can not open file {path}: {source}")]
    Open {
        path: PathBuf,
        source: io::Error,
    },

    #[error("error while hashing file {path} after {bytes_read} bytes: {source}")]
    Read {
        path: PathBuf,
        bytes_read: u64,
        source: io::Error,
    },
}

impl HashError {
    /// Bytes consumed before the failure. Zero when the file never opened.
    pub fn bytes_read(&self) -> u64 {
        match self {
            HashError::Open { .. } => 0,
            HashError::Read { bytes_read, .. } => *bytes_read,
        }
    }
}

/// Digest of one input, rendered as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub hash: String,
    pub size: u64,
}

/// Hash a single file (or stdin for `-`) without loading it into memory.
pub fn hash_path(path: &Path, algorithm: Algorithm) -> Result<FileDigest, HashError> {
    if path.as_os_str() == STDIN_PATH {
        let stdin = io::stdin();
        return hash_reader(stdin.lock(), algorithm).map_err(|(bytes_read, source)| {
            HashError::Read {
                path: path.to_path_buf(),
                bytes_read,
                source,
            }
        });
    }

    let file = File::open(path).map_err(|source| HashError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    // `file` is dropped on return, closing it on both paths
    hash_reader(file, algorithm).map_err(|(bytes_read, source)| HashError::Read {
        path: path.to_path_buf(),
        bytes_read,
        source,
    })
}

/// Stream a reader through the algorithm's accumulator.
///
/// On failure returns the number of bytes consumed alongside the error.
pub fn hash_reader<R: Read>(
    mut reader: R,
    algorithm: Algorithm,
) -> Result<FileDigest, (u64, io::Error)> {
    let mut acc = algorithm.accumulator();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut size = 0u64;

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                acc.update(&buf[..n]);
                size += n as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err((size, e)),
        }
    }

    Ok(FileDigest {
        hash: hex::encode(acc.finalize()),
        size,
    })
}
