//! Speech-to-text providers

mod disabled;
mod whisper;

pub use disabled::DisabledStt;
pub use whisper::WhisperStt;
