use crate::consts::HEX_DIGEST_REGEX;
use crate::models::DirTemplate;
use crate::violation::FieldError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Hash algorithms recognised in file entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha256,
}
impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }

    /// Length of a hex-encoded digest.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 => 64,
        }
    }
}
impl FromStr for HashAlgorithm {
    type Err = FieldError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            other => Err(FieldError::validation(format!("unsupported hash algorithm '{other}'"))),
        }
    }
}

/// A file hash written as `algorithm:hexdigest`, e.g. `md5:d41d8cd9...`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileHash {
    pub algorithm: HashAlgorithm,
    /// Lower-case hex digest.
    pub digest: String,
}
impl FromStr for FileHash {
    type Err = FieldError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((algorithm, digest)) = s.split_once(':') else {
            return Err(FieldError::validation(format!("hash '{s}' must look like 'algorithm:hexdigest'")));
        };
        let algorithm: HashAlgorithm = algorithm.parse()?;
        if digest.len() != algorithm.digest_len() || !HEX_DIGEST_REGEX.is_match(digest) {
            return Err(FieldError::validation(format!(
                "hash '{s}' must have {} lower-case hex digits",
                algorithm.digest_len()
            )));
        }
        Ok(Self { algorithm, digest: digest.to_string() })
    }
}
impl Display for FileHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.algorithm.as_str(), self.digest)
    }
}

/// A file (EPUB, PDF, ...) belonging to a book.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookFile {
    /// File name, unique within the book.
    pub name: String,
    pub hash: Option<FileHash>,
    /// Directory relative to the book (or absolute), possibly with dir vars.
    pub directory: DirTemplate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parses_hash() {
        let hash: FileHash = "md5:d41d8cd98f00b204e9800998ecf8427e".parse().unwrap();
        assert_eq!(hash.algorithm, HashAlgorithm::Md5);
        assert_eq!(hash.to_string(), "md5:d41d8cd98f00b204e9800998ecf8427e");
        let sha: FileHash = format!("sha256:{}", "a".repeat(64)).parse().unwrap();
        assert_eq!(sha.algorithm, HashAlgorithm::Sha256);
    }

    #[rstest]
    #[case("d41d8cd98f00b204e9800998ecf8427e")]
    #[case("crc32:deadbeef")]
    #[case("md5:d41d8cd98f00b204")]
    #[case("md5:D41D8CD98F00B204E9800998ECF8427E")]
    #[case("sha256:d41d8cd98f00b204e9800998ecf8427e")]
    fn test_rejects_hash(#[case] raw: &str) {
        assert!(raw.parse::<FileHash>().is_err());
    }
}
