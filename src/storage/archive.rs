// src/storage/archive.rs
//
// Single-file recording archive: a gzip-compressed tar holding two entries,
// `recording` (little-endian f32, interleaved) and `fingerprint` (JSON).

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;
use tar::{Archive, Builder, Header};

use super::fingerprint::{Fingerprint, FINGERPRINT_VERSION};
use crate::core::PcmBuffer;
use crate::error::{ReedError, Result};

pub const ARCHIVE_EXTENSION: &str = "tar.gz";

const RECORDING_ENTRY: &str = "recording";
const FINGERPRINT_ENTRY: &str = "fingerprint";

/// Write `buffer` and `fingerprint` to `path`, replacing any existing file
pub fn write_archive(path: &Path, buffer: &PcmBuffer, fingerprint: &Fingerprint) -> Result<()> {
    let file = File::create(path).map_err(|e| ReedError::io(path, e))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = Builder::new(encoder);

    let recording: Vec<u8> = buffer
        .samples()
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();
    let fingerprint = serde_json::to_vec(fingerprint)?;

    let mtime = fingerprint_mtime(path);
    append_entry(&mut builder, RECORDING_ENTRY, &recording, mtime).map_err(|e| ReedError::io(path, e))?;
    append_entry(&mut builder, FINGERPRINT_ENTRY, &fingerprint, mtime).map_err(|e| ReedError::io(path, e))?;

    let encoder = builder.into_inner().map_err(|e| ReedError::io(path, e))?;
    let mut writer = encoder.finish().map_err(|e| ReedError::io(path, e))?;
    std::io::Write::flush(&mut writer).map_err(|e| ReedError::io(path, e))?;

    Ok(())
}

fn append_entry<W: std::io::Write>(
    builder: &mut Builder<W>,
    name: &str,
    data: &[u8],
    mtime: u64,
) -> std::io::Result<()> {
    let mut header = Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    builder.append_data(&mut header, name, data)
}

/// Entry mtime in seconds, taken from the numeric file stem when there is one
fn fingerprint_mtime(path: &Path) -> u64 {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(super::store::parse_save_time)
        .map(|nanos| nanos / 1_000_000_000)
        .unwrap_or(0)
}

/// Read a recording back. Missing or malformed entries are `CorruptArchive`.
pub fn read_archive(path: &Path) -> Result<(PcmBuffer, Fingerprint)> {
    let file = File::open(path).map_err(|e| ReedError::io(path, e))?;
    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));

    let mut recording = None;
    let mut fingerprint = None;

    let entries = archive
        .entries()
        .map_err(|e| ReedError::corrupt(path, format!("unreadable container: {}", e)))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| ReedError::corrupt(path, format!("bad entry: {}", e)))?;
        let name = entry
            .path()
            .map_err(|e| ReedError::corrupt(path, format!("bad entry name: {}", e)))?
            .to_string_lossy()
            .into_owned();

        let slot = match name.as_str() {
            RECORDING_ENTRY => &mut recording,
            FINGERPRINT_ENTRY => &mut fingerprint,
            _ => continue,
        };

        // Header sizes are untrusted; the buffer grows only as data arrives
        let declared = entry.size();
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| ReedError::corrupt(path, format!("truncated {}: {}", name, e)))?;
        if data.len() as u64 != declared {
            return Err(ReedError::corrupt(
                path,
                format!("truncated {}: {} of {} bytes", name, data.len(), declared),
            ));
        }
        *slot = Some(data);
    }

    let recording = recording.ok_or_else(|| ReedError::corrupt(path, "missing recording"))?;
    let fingerprint = fingerprint.ok_or_else(|| ReedError::corrupt(path, "missing fingerprint"))?;

    let fingerprint: Fingerprint = serde_json::from_slice(&fingerprint)
        .map_err(|e| ReedError::corrupt(path, format!("malformed fingerprint: {}", e)))?;
    if fingerprint.version != FINGERPRINT_VERSION {
        return Err(ReedError::corrupt(
            path,
            format!("unsupported fingerprint version {}", fingerprint.version),
        ));
    }

    if recording.len() % 4 != 0 {
        return Err(ReedError::corrupt(path, "recording is not a whole number of f32 samples"));
    }
    let samples: Vec<f32> = recording
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let buffer = PcmBuffer::from_interleaved(samples, fingerprint.sample_rate, fingerprint.channels)
        .map_err(|e| ReedError::corrupt(path, e.to_string()))?;

    Ok((buffer, fingerprint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_buffer() -> PcmBuffer {
        PcmBuffer::from_interleaved(vec![0.1, -0.2, 0.3, -0.4, f32::MIN_POSITIVE, 1.0], 44100, 2).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.tar.gz");
        let fp = Fingerprint::new(Some("a".to_string()), 1, 44100, 2, 0.1 + 0.2);

        write_archive(&path, &sample_buffer(), &fp).unwrap();
        let (buf, back) = read_archive(&path).unwrap();

        assert_eq!(buf, sample_buffer());
        assert_eq!(back, fp);
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2.tar.gz");
        File::create(&path).unwrap().write_all(b"not an archive").unwrap();

        assert!(matches!(read_archive(&path), Err(ReedError::CorruptArchive { .. })));
    }

    #[test]
    fn test_missing_fingerprint_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("3.tar.gz");

        let file = File::create(&path).unwrap();
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
        append_entry(&mut builder, RECORDING_ENTRY, &[0u8; 8], 0).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        match read_archive(&path) {
            Err(ReedError::CorruptArchive { reason, .. }) => assert!(reason.contains("fingerprint")),
            other => panic!("expected corrupt archive, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_header_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("5.tar.gz");

        let mut header = Header::new_gnu();
        header.set_path(RECORDING_ENTRY).unwrap();
        header.set_size(1 << 62);
        header.set_mode(0o644);
        header.set_cksum();

        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(header.as_bytes()).unwrap();
        encoder.write_all(&[0u8; 512]).unwrap();
        encoder.finish().unwrap();

        match read_archive(&path) {
            Err(ReedError::CorruptArchive { reason, .. }) => assert!(reason.contains("recording")),
            other => panic!("expected corrupt archive, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_version_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("4.tar.gz");
        let mut fp = Fingerprint::new(None, 4, 44100, 2, 0.0);
        fp.version = 99;

        write_archive(&path, &sample_buffer(), &fp).unwrap();
        assert!(matches!(read_archive(&path), Err(ReedError::CorruptArchive { .. })));
    }

    #[test]
    fn test_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(read_archive(&dir.path().join("nope")), Err(ReedError::Io { .. })));
    }
}
