//! On-disk store for synthesized prompts
//!
//! Clips are written as `response_{call_id}_{uuid}.{ext}` so that a call's
//! clips can be removed together when the call ends, and so a file name alone
//! is enough to serve the clip back to the telephony provider.
//!
//! The call id is escaped into the name: ASCII letters and digits are kept and
//! every other byte becomes `-` plus two hex digits. Distinct call ids always
//! give distinct prefixes.

use std::path::{Path, PathBuf};
use voice_order_core::{AudioClip, AudioRef};

use crate::PipelineError;

const CLIP_PREFIX: &str = "response_";

/// Directory-backed audio clip store
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a clip for a call and return a reference to it
    pub async fn save(&self, call_id: &str, clip: &AudioClip) -> Result<AudioRef, PipelineError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!(
            "{}{}_{}.{}",
            CLIP_PREFIX,
            encode_call_id(call_id),
            uuid::Uuid::new_v4().simple(),
            clip.extension()
        );
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &clip.bytes).await?;

        tracing::debug!(call_id = %call_id, file = %file_name, bytes = clip.bytes.len(), "Stored audio clip");
        Ok(AudioRef::local(file_name, path, clip.content_type.clone()))
    }

    /// Read a stored clip by file name, with its content type
    pub async fn load(&self, file_name: &str) -> Result<(Vec<u8>, &'static str), PipelineError> {
        if !is_valid_file_name(file_name) {
            return Err(PipelineError::InvalidAudioName(file_name.to_string()));
        }

        let path = self.dir.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok((bytes, content_type_for(file_name))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PipelineError::AudioNotFound(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a single stored clip; a missing file is not an error
    pub async fn remove(&self, file_name: &str) -> Result<(), PipelineError> {
        if !is_valid_file_name(file_name) {
            return Err(PipelineError::InvalidAudioName(file_name.to_string()));
        }

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every clip stored for a call, returning how many were removed
    pub async fn remove_for_call(&self, call_id: &str) -> Result<usize, PipelineError> {
        let prefix = format!("{}{}_", CLIP_PREFIX, encode_call_id(call_id));

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(&prefix) {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(file = %name, error = %e, "Failed to remove audio clip"),
            }
        }

        if removed > 0 {
            tracing::debug!(call_id = %call_id, removed, "Removed audio clips");
        }
        Ok(removed)
    }
}

/// File names served over HTTP: a single plain path component
pub fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn encode_call_id(call_id: &str) -> String {
    let mut encoded = String::with_capacity(call_id.len());
    for byte in call_id.bytes() {
        if byte.is_ascii_alphanumeric() {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("-{:02x}", byte));
        }
    }
    encoded
}

fn content_type_for(file_name: &str) -> &'static str {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("ulaw") => "audio/basic",
        _ => "application/octet-stream",
    }
}
