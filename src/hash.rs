//! Content hashing for tracked artifacts.
//!
//! SHA-1 over file bytes only; metadata never enters the digest, so the same
//! bytes always produce the same hash across runs. Collision resistance is
//! not a requirement here; the digest only detects accidental change.

use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 8192;

/// Compute the hex SHA-1 digest of the file at `path`, streaming in fixed
/// chunks. Returns `None` when the file does not exist or cannot be read;
/// the validator treats an absent digest as a hash mismatch.
pub fn hash_file(path: &Path) -> Option<String> {
    let mut file = File::open(path).ok()?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf).ok()?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Some(format!("{:x}", hasher.finalize()))
}

/// Compute the hex SHA-1 digest of an in-memory byte slice.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_hashes_to_none() {
        assert!(hash_file(Path::new("/nonexistent/file.txt")).is_none());
    }

    #[test]
    fn identical_bytes_produce_identical_digest() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "same content").unwrap();
        fs::write(&b, "same content").unwrap();
        assert_eq!(hash_file(&a), hash_file(&b));
    }

    #[test]
    fn digest_changes_with_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "one").unwrap();
        let first = hash_file(&path).unwrap();
        fs::write(&path, "two").unwrap();
        let second = hash_file(&path).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn streaming_matches_in_memory_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        // Larger than one chunk to exercise the streaming loop.
        let content = vec![0xabu8; CHUNK_SIZE * 3 + 17];
        fs::write(&path, &content).unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_bytes(&content));
    }

    #[test]
    fn known_digest_of_empty_input() {
        assert_eq!(hash_bytes(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }
}
