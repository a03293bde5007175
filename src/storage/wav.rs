//! WAV export so an external player can render a capture

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

use crate::core::PcmBuffer;
use crate::error::{ReedError, Result};

/// Write `buffer` as 32-bit float WAV, preserving channel count and rate
pub fn export_wav(buffer: &PcmBuffer, output_path: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.channels() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let to_io = |e: hound::Error| match e {
        hound::Error::IoError(io) => ReedError::io(output_path, io),
        other => ReedError::io(output_path, std::io::Error::other(other.to_string())),
    };

    let mut writer = WavWriter::create(output_path, spec).map_err(to_io)?;
    for &sample in buffer.samples() {
        writer.write_sample(sample).map_err(to_io)?;
    }
    writer.finalize().map_err(to_io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let buf = PcmBuffer::from_interleaved(vec![0.5, -0.5, 0.25, -0.25], 44100, 2).unwrap();

        export_wav(&buf, &path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, buf.samples());
    }
}
