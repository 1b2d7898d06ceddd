//! Reading and writing patched text files
//!
//! Encoding policy: files are decoded as UTF-8, keeping a byte-order mark if
//! one was present. Bytes that are not valid UTF-8 are decoded as ISO-8859-1,
//! which maps every byte to a char. Files are written back in the encoding
//! they were read with.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Latin1,
}

#[derive(Debug, Error)]
pub enum TextIoError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is ISO-8859-1 encoded and cannot hold {ch:?}", .path.display())]
    Unencodable { path: PathBuf, ch: char },
}

/// A text file decoded under the encoding policy
#[derive(Debug, Clone)]
pub struct TextFile {
    path: PathBuf,
    encoding: TextEncoding,
    pub content: String,
}

impl TextFile {
    /// Read and decode a file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, TextIoError> {
        let path = path.as_ref().to_path_buf();
        let bytes = std::fs::read(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                TextIoError::NotFound(path.clone())
            } else {
                TextIoError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let (content, encoding) = decode(bytes);
        if encoding == TextEncoding::Latin1 {
            tracing::warn!(path = %path.display(), "not valid UTF-8, decoded as ISO-8859-1");
        }

        Ok(Self {
            path,
            encoding,
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Encode the current content in the file's original encoding
    pub fn encode(&self) -> Result<Vec<u8>, TextIoError> {
        match self.encoding {
            TextEncoding::Utf8 => Ok(self.content.as_bytes().to_vec()),
            TextEncoding::Utf8Bom => {
                let mut bytes = Vec::with_capacity(UTF8_BOM.len() + self.content.len());
                bytes.extend_from_slice(UTF8_BOM);
                bytes.extend_from_slice(self.content.as_bytes());
                Ok(bytes)
            }
            TextEncoding::Latin1 => self
                .content
                .chars()
                .map(|ch| {
                    u8::try_from(u32::from(ch)).map_err(|_| TextIoError::Unencodable {
                        path: self.path.clone(),
                        ch,
                    })
                })
                .collect(),
        }
    }

    /// Overwrite the file in place
    pub fn write(&self) -> Result<(), TextIoError> {
        let bytes = self.encode()?;
        std::fs::write(&self.path, bytes).map_err(|source| TextIoError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn decode(bytes: Vec<u8>) -> (String, TextEncoding) {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        if let Ok(text) = std::str::from_utf8(rest) {
            return (text.to_string(), TextEncoding::Utf8Bom);
        }
    }

    match String::from_utf8(bytes) {
        Ok(text) => (text, TextEncoding::Utf8),
        Err(e) => {
            let text = e.into_bytes().iter().map(|&b| char::from(b)).collect();
            (text, TextEncoding::Latin1)
        }
    }
}
