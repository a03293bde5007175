//! Recording persistence: archive format, fingerprints, namespaces, WAV export

mod archive;
mod fingerprint;
mod store;
mod wav;

pub use archive::{read_archive, write_archive, ARCHIVE_EXTENSION};
pub use fingerprint::{epoch_nanos, Fingerprint, FINGERPRINT_VERSION};
pub use store::{
    archive_file_name, parse_save_time, Namespace, RecordingEntry, RecordingStore, RecordingSummary,
};
pub use wav::export_wav;
