//! WAV container handling: decoding engine output, encoding complete
//! responses, and the open-ended header used for streamed responses.

use std::io::{Cursor, Read};

use crate::error::AppError;
use crate::speech::engine::SynthesizedAudio;

const BITS_PER_SAMPLE: u16 = 16;

/// Length placeholder for RIFF and data chunks whose size is not known up front.
/// Same value espeak-ng writes when streaming to stdout; a multiple of any block size.
const UNKNOWN_LENGTH: u32 = 0x7FFF_F000;

/// Decode a 16-bit integer PCM WAV.
pub fn decode_wav<R: Read>(reader: R) -> Result<SynthesizedAudio, AppError> {
    let mut reader = hound::WavReader::new(reader)
        .map_err(|e| AppError::Synthesis(format!("Invalid WAV from engine: {e}")))?;

    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != BITS_PER_SAMPLE {
        return Err(AppError::Synthesis(format!(
            "Unsupported WAV format from engine: {:?} {}-bit",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Synthesis(format!("Truncated WAV from engine: {e}")))?;

    Ok(SynthesizedAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

/// Encode complete audio as a WAV file.
pub fn encode_wav(audio: &SynthesizedAudio) -> Result<Vec<u8>, AppError> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AppError::Internal(format!("Failed to start WAV: {e}")))?;
        for sample in &audio.samples {
            writer
                .write_sample(*sample)
                .map_err(|e| AppError::Internal(format!("Failed to write WAV: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| AppError::Internal(format!("Failed to finish WAV: {e}")))?;
    }

    Ok(cursor.into_inner())
}

/// A 44-byte PCM WAV header with unknown length, for audio whose total size is
/// not known when the response starts.
pub fn streaming_header(sample_rate: u32, channels: u16) -> Vec<u8> {
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * u32::from(block_align);

    let mut header = Vec::with_capacity(44);
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&UNKNOWN_LENGTH.to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&16u32.to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes()); // PCM
    header.extend_from_slice(&channels.to_le_bytes());
    header.extend_from_slice(&sample_rate.to_le_bytes());
    header.extend_from_slice(&byte_rate.to_le_bytes());
    header.extend_from_slice(&block_align.to_le_bytes());
    header.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    header.extend_from_slice(b"data");
    header.extend_from_slice(&UNKNOWN_LENGTH.to_le_bytes());
    header
}

/// Little-endian PCM payload.
pub fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
