use std::hash::Hasher;
use std::path::Path;

use derive_more::Display;
use metrohash::MetroHash128;
use tracing::debug;

use crate::filesystem::{FileSystem, FsError};

/// 128-bit MetroHash of a file's full content. Used to detect changes, not
/// to resist tampering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{_0:016x}{_1:016x}")]
pub struct ContentDigest(u64, u64);

impl ContentDigest {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = MetroHash128::default();
        hasher.write(bytes);
        let (high, low) = hasher.finish128();
        Self(high, low)
    }
}

/// Reads the whole file and hashes it.
pub async fn digest<F: FileSystem>(fs: &F, path: &Path) -> Result<ContentDigest, FsError> {
    let bytes = fs.read_bytes(path).await?;
    Ok(ContentDigest::of_bytes(&bytes))
}

pub fn equal(a: &ContentDigest, b: &ContentDigest) -> bool {
    a == b
}

/// Both files are read in full, no shortcut on size.
pub async fn files_match<F: FileSystem>(
    fs: &F,
    source: &Path,
    destination: &Path,
) -> Result<bool, FsError> {
    let source_digest = digest(fs, source).await?;
    let destination_digest = digest(fs, destination).await?;
    debug!(
        "Digests for {}: source {source_digest}, destination {destination_digest}",
        destination.display()
    );
    Ok(equal(&source_digest, &destination_digest))
}
