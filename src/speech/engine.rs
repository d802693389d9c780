use std::io::Write;
use std::process::{Command, Stdio};

use crate::config::TtsConfig;
use crate::error::AppError;

/// Mono or interleaved 16-bit PCM produced by a speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl SynthesizedAudio {
    /// Whether two clips can be played back-to-back in one stream.
    pub fn same_format(&self, other: &SynthesizedAudio) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }
}

/// A text-to-speech engine.
///
/// Calls are blocking; run them through [`crate::speech::pool::SynthesisPool`]
/// rather than directly on an async task.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechEngine: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, AppError>;
}

/// Offline engine backed by the `espeak-ng` command line tool.
pub struct EspeakEngine {
    binary: String,
    voice: String,
    rate: u32,
    amplitude: u32,
}

impl EspeakEngine {
    pub fn new(config: &TtsConfig) -> Self {
        Self {
            binary: config.engine_path.clone(),
            voice: config.voice.clone(),
            rate: config.rate,
            amplitude: config.amplitude,
        }
    }

    /// Check that the binary runs and reports a version.
    pub fn probe(&self) -> Result<String, AppError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| AppError::Synthesis(format!("Cannot run '{}': {e}", self.binary)))?;

        if !output.status.success() {
            return Err(AppError::Synthesis(format!(
                "'{} --version' exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn command(&self, wav_path: &std::path::Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-v")
            .arg(&self.voice)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-a")
            .arg(self.amplitude.to_string())
            .arg("-w")
            .arg(wav_path)
            // Text on stdin so a leading '-' is never read as a flag
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}

impl SpeechEngine for EspeakEngine {
    fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, AppError> {
        let wav_file = tempfile::Builder::new()
            .prefix("saathi-tts-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| AppError::Synthesis(format!("Failed to create temp file: {e}")))?;

        let mut child = self
            .command(wav_file.path())
            .spawn()
            .map_err(|e| AppError::Synthesis(format!("Cannot run '{}': {e}", self.binary)))?;

        // Closing stdin on drop lets the engine see end of input
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        // Always reap the child, even when it stopped reading early
        let output = child
            .wait_with_output()
            .map_err(|e| AppError::Synthesis(format!("Engine did not finish: {e}")))?;

        if !output.status.success() {
            return Err(AppError::Synthesis(format!(
                "'{}' exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        write_result.map_err(|e| AppError::Synthesis(format!("Failed to send text: {e}")))?;

        let file = std::fs::File::open(wav_file.path())
            .map_err(|e| AppError::Synthesis(format!("Failed to open engine output: {e}")))?;

        let audio = crate::speech::wav::decode_wav(std::io::BufReader::new(file))?;
        tracing::debug!(
            chars = text.len(),
            samples = audio.samples.len(),
            "espeak synthesis finished"
        );

        Ok(audio)
    }
}
