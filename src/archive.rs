//! In-memory ZIP bundles for multi-file responses

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::result::ZipResult;
use zip::write::{FileOptions, ZipWriter};

/// Builds a ZIP archive in memory. Entry names are de-duplicated by
/// suffixing `_1`, `_2`, ... before the extension.
pub struct ZipBundle {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

impl Default for ZipBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipBundle {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
        }
    }

    fn unique_name(&mut self, name: &str) -> String {
        if self.names.insert(name.to_string()) {
            return name.to_string();
        }

        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{}", ext)),
            None => (name, String::new()),
        };

        let mut n = 1;
        loop {
            let candidate = format!("{}_{}{}", stem, n, ext);
            if self.names.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Add an entry and return the name it was stored under
    pub fn add(&mut self, name: &str, data: &[u8]) -> ZipResult<String> {
        let name = self.unique_name(name);
        self.writer.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        self.writer.write_all(data)?;
        Ok(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn finish(self) -> ZipResult<Vec<u8>> {
        Ok(self.writer.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_bundle_roundtrip_with_duplicates() {
        let mut bundle = ZipBundle::new();
        assert_eq!(bundle.add("a.png", b"one").unwrap(), "a.png");
        assert_eq!(bundle.add("a.png", b"two").unwrap(), "a_1.png");
        assert_eq!(bundle.add("dir/readme", b"three").unwrap(), "dir/readme");
        assert_eq!(bundle.len(), 3);

        let bytes = bundle.finish().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut content = String::new();
        archive
            .by_name("a_1.png")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "two");
    }
}
