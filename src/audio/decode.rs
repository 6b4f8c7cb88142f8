//! Audio file decoding.
//!
//! WAV files are read with `hound`; MP3 and Ogg Vorbis go through
//! `symphonia`. Multi-channel audio is averaged to mono and the native
//! sample rate is preserved: no resampling happens here.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{downmix, Waveform};
use crate::error::ExtractionError;

/// File extensions the decoder understands
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg"];

/// Decode an audio file into a mono waveform
///
/// The container is chosen from the file extension. An empty result is
/// reported as `NoAudioData` so callers never see a zero-length waveform.
pub fn decode_file(path: &Path) -> Result<Waveform, ExtractionError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let waveform = match extension.as_str() {
        "wav" | "wave" => read_wav(path)?,
        "mp3" | "ogg" | "oga" => read_compressed(path, &extension)?,
        other => {
            return Err(ExtractionError::UnsupportedFormat {
                format: if other.is_empty() {
                    "<no extension>".to_string()
                } else {
                    other.to_string()
                },
            })
        }
    };

    if waveform.is_empty() {
        return Err(ExtractionError::NoAudioData);
    }

    log::debug!(
        "[Decode] {} -> {} samples @ {} Hz",
        path.display(),
        waveform.len(),
        waveform.sample_rate
    );
    Ok(waveform)
}

fn read_wav(path: &Path) -> Result<Waveform, ExtractionError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(ExtractionError::Decode {
            details: format!("{} has zero channels", path.display()),
        });
    }

    // Integer PCM is scaled by 2^(bits-1) so full-scale negative maps to -1.0
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|sample| sample.map(|v| v as f32 / pcm_scale(8)))
                .collect::<Result<Vec<f32>, _>>()?,
            16 => reader
                .samples::<i16>()
                .map(|sample| sample.map(|v| v as f32 / pcm_scale(16)))
                .collect::<Result<Vec<f32>, _>>()?,
            bits @ (24 | 32) => {
                let scale = pcm_scale(bits);
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<f32>, _>>()?
            }
            bits => {
                return Err(ExtractionError::UnsupportedFormat {
                    format: format!("{}-bit integer PCM", bits),
                })
            }
        },
    };

    Ok(Waveform::new(
        downmix(&samples, spec.channels as usize),
        spec.sample_rate,
    ))
}

/// Full-scale magnitude for signed PCM of the given width (8..=32 bits)
fn pcm_scale(bits: u16) -> f32 {
    (1i64 << (bits - 1)) as f32
}

fn read_compressed(path: &Path, extension: &str) -> Result<Waveform, ExtractionError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(extension);

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ExtractionError::Decode {
            details: "no audio track found".into(),
        })?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                log::warn!("[Decode] Skipping corrupt packet in {}: {}", path.display(), reason);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        let channel_count = *channels.get_or_insert(spec.channels.count());

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend(downmix(buffer.samples(), channel_count));
    }

    let sample_rate = sample_rate.ok_or_else(|| ExtractionError::Decode {
        details: "stream has no sample rate".into(),
    })?;

    Ok(Waveform::new(samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fixtures;
    use tempfile::TempDir;

    fn write_wav(path: &Path, spec: hound::WavSpec, frames: &[i16]) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &sample in frames {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn spec(channels: u16, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_decode_mono_wav_preserves_rate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, spec(1, 22_050), &[0, 16_384, -16_384, -32_768]);

        let waveform = decode_file(&path).unwrap();
        assert_eq!(waveform.sample_rate, 22_050);
        assert_eq!(waveform.samples, vec![0.0, 0.5, -0.5, -1.0]);
    }

    #[test]
    fn test_decode_stereo_wav_downmixes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.WAV");
        write_wav(&path, spec(2, 16_000), &[16_384, 0, -16_384, -16_384]);

        let waveform = decode_file(&path).unwrap();
        assert_eq!(waveform.samples, vec![0.25, -0.5]);
    }

    #[test]
    fn test_empty_wav_is_no_audio_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, spec(1, 16_000), &[]);

        assert_eq!(decode_file(&path), Err(ExtractionError::NoAudioData));
    }

    #[test]
    fn test_corrupt_wav_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        match decode_file(&path) {
            Err(ExtractionError::Decode { .. }) => {}
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        match decode_file(Path::new("/nonexistent/clip.wav")) {
            Err(ExtractionError::Io { .. }) => {}
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        match decode_file(Path::new("clip.flac")) {
            Err(ExtractionError::UnsupportedFormat { format }) => assert_eq!(format, "flac"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_mp3_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.mp3");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        assert!(decode_file(&path).is_err());
    }

    #[test]
    fn test_extensible_wav_uses_valid_bits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extensible.wav");
        std::fs::write(&path, fixtures::extensible_wav(16, &[16_384, -32_768])).unwrap();

        let waveform = decode_file(&path).unwrap();
        assert_eq!(waveform.sample_rate, 16_000);
        assert_eq!(waveform.samples, vec![0.5, -1.0]);
    }

    #[test]
    fn test_oversized_valid_bits_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bogus_bits.wav");
        std::fs::write(&path, fixtures::extensible_wav(100, &[0, 1, 2, 3])).unwrap();

        match decode_file(&path) {
            Err(ExtractionError::UnsupportedFormat { format }) => {
                assert_eq!(format, "100-bit integer PCM")
            }
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_mono_mp3() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("line.mp3");
        std::fs::write(&path, fixtures::mp3_stream(false, 8)).unwrap();

        let waveform = decode_file(&path).unwrap();
        assert_eq!(waveform.sample_rate, fixtures::MP3_SAMPLE_RATE);
        assert_eq!(waveform.len(), 8 * fixtures::MP3_SAMPLES_PER_FRAME);

        let peak = waveform.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        println!("mono mp3 peak: {}", peak);
        assert!(peak > 0.0, "decoded MP3 should not be silent");
        assert!(waveform.samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_decode_stereo_mp3_downmixes() {
        let dir = TempDir::new().unwrap();
        let mono_path = dir.path().join("mono.mp3");
        let stereo_path = dir.path().join("stereo.MP3");
        std::fs::write(&mono_path, fixtures::mp3_stream(false, 6)).unwrap();
        std::fs::write(&stereo_path, fixtures::mp3_stream(true, 6)).unwrap();

        let mono = decode_file(&mono_path).unwrap();
        let stereo = decode_file(&stereo_path).unwrap();

        assert_eq!(stereo.sample_rate, fixtures::MP3_SAMPLE_RATE);
        assert_eq!(stereo.len(), mono.len());
        // The right channel is coded silent, so the mix is half the left channel
        for (mixed, left) in stereo.samples.iter().zip(&mono.samples) {
            assert!((mixed - left * 0.5).abs() < 1e-6, "{} vs {}", mixed, left);
        }
    }
}
