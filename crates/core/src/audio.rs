//! Audio references exchanged with speech collaborators

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Encoded audio produced by a synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `audio/mpeg`
    pub content_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    /// File extension matching the content type
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/ogg" => "ogg",
            "audio/basic" | "audio/x-mulaw" => "ulaw",
            _ => "bin",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Where a piece of audio lives: a stored clip or a remote recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    /// File name (stored clips) or last URL segment (recordings)
    pub file_name: String,
    /// Local path, or remote URL for recordings
    pub location: String,
    pub content_type: String,
}

impl AudioRef {
    pub fn local(file_name: impl Into<String>, path: PathBuf, content_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            location: path.to_string_lossy().into_owned(),
            content_type: content_type.into(),
        }
    }

    /// Reference to a recording hosted by the telephony provider
    pub fn remote(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        let location = url.into();
        let file_name = location
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("recording")
            .to_string();
        Self {
            file_name,
            location,
            content_type: content_type.into(),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }
}
