//! WAV encoding: mono, 16-bit signed little-endian PCM.
//!
//! Samples at or below -1.0 map to `i16::MIN`, samples at or above 1.0 map to
//! `i16::MAX`, everything else is scaled by `i16::MAX` and truncated toward
//! zero. NaN encodes as 0.

use crate::invariant_ppt::{assert_invariant, WAV_SIZES_CONSISTENT};
use crate::sequence::ExportError;
use crate::units::Frequency;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{Cursor, Seek, Write};
use std::path::Path;

pub const BITS_PER_SAMPLE: u16 = 16;
pub const CHANNELS: u16 = 1;
/// Bytes before the first sample.
pub const HEADER_LEN: usize = 44;

/// Quantize one sample to 16 bits.
pub fn quantize(sample: f64) -> i16 {
    if sample <= -1.0 {
        i16::MIN
    } else if sample >= 1.0 {
        i16::MAX
    } else {
        (sample * f64::from(i16::MAX)) as i16
    }
}

/// WAV parameters for a sample rate.
pub fn wav_spec(sample_rate: Frequency) -> Result<WavSpec, ExportError> {
    let hz = sample_rate.value();
    if !(hz >= 1.0 && hz <= f64::from(u32::MAX)) {
        return Err(ExportError::InvalidSampleRate(sample_rate));
    }
    Ok(WavSpec {
        channels: CHANNELS,
        sample_rate: hz as u32,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    })
}

fn write_samples<W, I>(writer: W, samples: I, spec: WavSpec) -> Result<u32, ExportError>
where
    W: Write + Seek,
    I: IntoIterator<Item = f64>,
{
    let mut wav = WavWriter::new(writer, spec)?;
    for sample in samples {
        wav.write_sample(quantize(sample))?;
    }
    let frames = wav.len();
    wav.finalize()?;
    Ok(frames)
}

/// Encode samples into an in-memory WAV file.
pub fn encode<I>(samples: I, sample_rate: Frequency) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = f64>,
{
    let spec = wav_spec(sample_rate)?;
    let mut cursor = Cursor::new(Vec::new());
    let frames = write_samples(&mut cursor, samples, spec)?;
    let bytes = cursor.into_inner();
    let data_len = frames as usize * usize::from(BITS_PER_SAMPLE / 8);
    assert_invariant(
        WAV_SIZES_CONSISTENT,
        bytes.len() == HEADER_LEN + data_len,
        "Header plus data accounts for every byte",
        Some("wav::encode"),
    );
    Ok(bytes)
}

/// Encode samples into a WAV file on disk.
pub fn write_file<P, I>(path: P, samples: I, sample_rate: Frequency) -> Result<(), ExportError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = f64>,
{
    let spec = wav_spec(sample_rate)?;
    let file = std::io::BufWriter::new(
        std::fs::File::create(path).map_err(|e| ExportError::Wav(e.to_string()))?,
    );
    write_samples(file, samples, spec)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitExt;

    fn le_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn quantize_clamps_and_truncates() {
        assert_eq!(quantize(-1.0), i16::MIN);
        assert_eq!(quantize(-3.0), i16::MIN);
        assert_eq!(quantize(1.0), i16::MAX);
        assert_eq!(quantize(7.5), i16::MAX);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 16383);
        assert_eq!(quantize(-0.5), -16383);
        assert_eq!(quantize(f64::NAN), 0);
    }

    #[test]
    fn header_fields() {
        let bytes = encode([0.0, 0.5], 8000.0.hz()).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(le_u32(&bytes, 24), 8000);
        assert_eq!(le_u32(&bytes, 28), 16000);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(le_u32(&bytes, 40), 4);
        assert_eq!(&bytes[44..], &[0, 0, 0xFF, 0x3F]);
    }

    #[test]
    fn rejects_unrepresentable_rate() {
        assert!(matches!(
            wav_spec(0.5.hz()),
            Err(ExportError::InvalidSampleRate(_))
        ));
        assert!(wav_spec(f64::NAN.hz()).is_err());
    }
}
