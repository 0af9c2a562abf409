//! Integrity verification of local files against hub digests.

use std::path::Path;
use tracing::debug;

use crate::{
    application::ports::Filesystem,
    domain::{Digest, digest},
    error::SspromptResult,
};

/// Computes blob digests of files on disk.
pub struct IntegrityVerifier<'a> {
    filesystem: &'a dyn Filesystem,
}

impl<'a> IntegrityVerifier<'a> {
    pub fn new(filesystem: &'a dyn Filesystem) -> Self {
        Self { filesystem }
    }

    /// Digest of the file's current contents.
    pub fn digest_file(&self, path: &Path) -> SspromptResult<Digest> {
        let bytes = self.filesystem.read_file(path)?;
        Ok(digest(&bytes))
    }

    /// Whether `path` is a readable file whose digest equals `expected`.
    ///
    /// Unreadable files count as a mismatch.
    pub fn matches(&self, path: &Path, expected: &Digest) -> bool {
        if !self.filesystem.is_file(path) {
            return false;
        }
        match self.digest_file(path) {
            Ok(actual) => actual == *expected,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unreadable local copy");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;

    const HELLO_DIGEST: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    #[test]
    fn matching_file_is_verified() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_file().return_const(true);
        fs.expect_read_file()
            .returning(|_| Ok(b"hello\n".to_vec()));

        let verifier = IntegrityVerifier::new(&fs);
        let expected = Digest::parse(HELLO_DIGEST).unwrap();
        assert!(verifier.matches(Path::new("a.txt"), &expected));
    }

    #[test]
    fn changed_file_is_a_mismatch() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_file().return_const(true);
        fs.expect_read_file()
            .returning(|_| Ok(b"hello world\n".to_vec()));

        let verifier = IntegrityVerifier::new(&fs);
        let expected = Digest::parse(HELLO_DIGEST).unwrap();
        assert!(!verifier.matches(Path::new("a.txt"), &expected));
    }

    #[test]
    fn missing_file_is_a_mismatch() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_file().return_const(false);
        fs.expect_read_file().never();

        let verifier = IntegrityVerifier::new(&fs);
        let expected = Digest::parse(HELLO_DIGEST).unwrap();
        assert!(!verifier.matches(Path::new("a.txt"), &expected));
    }
}
