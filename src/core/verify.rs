use crate::error::{FetchError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Lowercase hex SHA-256 of the file at `path`, read in chunks.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Check `path` against `expected` (hex, case-insensitive).
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(FetchError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.trim().to_lowercase(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // sha256("abc")
    const ABC_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("abc.txt");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(sha256_file(&path).unwrap(), ABC_DIGEST);
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("abc.txt");
        std::fs::write(&path, b"abc").unwrap();

        assert!(verify_sha256(&path, &ABC_DIGEST.to_uppercase()).is_ok());
    }

    #[test]
    fn test_verify_mismatch() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("abc.txt");
        std::fs::write(&path, b"abd").unwrap();

        match verify_sha256(&path, ABC_DIGEST) {
            Err(FetchError::ChecksumMismatch { expected, .. }) => assert_eq!(expected, ABC_DIGEST),
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }
}
