use std::fs::File;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::types::{AudioBuffer, AudioFormat};
use crate::error::{AudioError, Result};

/// Extensions the loader can decode; `wav` goes through hound, the rest through symphonia
const SUPPORTED_FORMATS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a", "aac"];

/// Anything that can turn a path into decoded audio
///
/// Loading is atomic: either a complete buffer comes back or an error does.
pub trait AudioSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<AudioBuffer>;
}

/// Audio file loader supporting multiple formats
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioLoader;

impl AudioSource for AudioLoader {
    fn load(&self, path: &Path) -> Result<AudioBuffer> {
        let extension = Self::detect_format(path).unwrap_or_default();

        if !Self::is_format_supported(&extension) {
            return Err(AudioError::UnsupportedFormat { format: extension }.into());
        }

        match extension.as_str() {
            "wav" => Self::load_wav(path),
            _ => Self::load_with_symphonia(path),
        }
    }
}

impl AudioLoader {
    /// Load WAV files using the hound crate (most reliable for WAV)
    fn load_wav(path: &Path) -> Result<AudioBuffer> {
        let reader = hound::WavReader::open(path).map_err(|e| load_failed(path, e))?;

        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| load_failed(path, e))?,
            hound::SampleFormat::Int => {
                let bit_depth = spec.bits_per_sample;
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|s| Self::int_to_float(s, bit_depth)))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| load_failed(path, e))?
            }
        };

        if samples.is_empty() {
            return Err(load_failed(path, "file contains no samples"));
        }

        let format = AudioFormat {
            extension: "wav".to_string(),
            bit_depth: Some(spec.bits_per_sample),
            compression: None,
        };

        Ok(AudioBuffer::from_interleaved(&samples, spec.channels, spec.sample_rate)
            .with_source(path.to_path_buf(), format))
    }

    /// Load compressed formats using Symphonia
    fn load_with_symphonia(path: &Path) -> Result<AudioBuffer> {
        let file = File::open(path).map_err(|e| load_failed(path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| load_failed(path, e))?;

        let mut format = probed.format;

        // First audio track with a decodable codec
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| load_failed(path, "no decodable audio track"))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| load_failed(path, "no sample rate found"))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| load_failed(path, e))?;

        let mut samples = Vec::new();
        let mut channels = codec_params.channels.map(|c| c.count() as u16).unwrap_or(0);
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == IoErrorKind::UnexpectedEof => break,
                Err(e) => return Err(load_failed(path, e)),
            };

            while !format.metadata().is_latest() {
                format.metadata().pop();
            }

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let buf = sample_buf.get_or_insert_with(|| {
                        let spec = *decoded.spec();
                        channels = spec.channels.count() as u16;
                        SampleBuffer::new(decoded.capacity() as u64, spec)
                    });
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                // Corrupt packet: skip it and keep decoding
                Err(SymphoniaError::DecodeError(reason)) => {
                    tracing::debug!("Skipping undecodable packet: {}", reason);
                    continue;
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == IoErrorKind::UnexpectedEof => break,
                Err(e) => return Err(load_failed(path, e)),
            }
        }

        if samples.is_empty() || channels == 0 {
            return Err(load_failed(path, "no audio samples decoded"));
        }

        let format_info = AudioFormat {
            extension: Self::detect_format(path).unwrap_or_else(|| "unknown".to_string()),
            bit_depth: codec_params.bits_per_sample.map(|b| b as u16),
            compression: Some(format!("{:?}", codec_params.codec)),
        };

        Ok(AudioBuffer::from_interleaved(&samples, channels, sample_rate)
            .with_source(path.to_path_buf(), format_info))
    }

    /// Convert integer sample to float (-1.0 to 1.0)
    ///
    /// hound already shifts unsigned 8-bit samples into the signed range.
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        match bit_depth {
            8 => sample as f32 / 128.0,
            16 => sample as f32 / 32768.0,
            24 => sample as f32 / 8388608.0,
            32 => sample as f32 / 2147483648.0,
            _ => sample as f32 / 32768.0,
        }
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        SUPPORTED_FORMATS.contains(&extension.to_lowercase().as_str())
    }
}

fn load_failed(path: &Path, reason: impl ToString) -> crate::error::MontageError {
    AudioError::LoadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
    .into()
}
