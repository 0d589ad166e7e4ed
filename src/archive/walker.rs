// Lazy entry streaming over a ZIP-compatible container.
//
// The walker never materializes more than one entry at a time: each call to
// `next()` on an entry iterator reads exactly one entry's bytes. Iterators
// borrow the walker mutably, so a new pass can be started once the previous
// one is dropped.

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::ExtractError;

/// File extension that marks a nested sub-container.
pub const SUB_CONTAINER_EXTENSION: &str = ".jar";

/// One file entry with its uncompressed bytes.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

/// Returns true if the entry name denotes a nested sub-container.
pub fn is_sub_container(name: &str) -> bool {
    name.ends_with(SUB_CONTAINER_EXTENSION)
}

/// Walks the entries of one container.
pub struct ArchiveWalker<R: Read + Seek> {
    archive: ZipArchive<R>,
    label: String,
}

impl<R: Read + Seek> ArchiveWalker<R> {
    /// Open a container. `label` names it in error messages (the input path
    /// for top-level packages, the entry name for nested ones).
    pub fn open(reader: R, label: impl Into<String>) -> Result<Self, ExtractError> {
        let label = label.into();
        let archive =
            ZipArchive::new(reader).map_err(|e| ExtractError::corrupt(label.clone(), e))?;
        Ok(Self { archive, label })
    }

    /// Number of raw entries in the container, directories included.
    pub fn entry_count(&self) -> usize {
        self.archive.len()
    }

    /// Names of all raw entries, in container order, without reading any
    /// entry data.
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Every file entry (directories skipped), in container order.
    pub fn entries(&mut self) -> Entries<'_, R> {
        self.entries_matching(|_| true)
    }

    /// Only the nested sub-container entries, in container order.
    pub fn sub_containers(&mut self) -> Entries<'_, R> {
        self.entries_matching(is_sub_container)
    }

    /// File entries whose name passes `filter`. Entries that fail the filter
    /// are never decompressed.
    pub fn entries_matching(&mut self, filter: fn(&str) -> bool) -> Entries<'_, R> {
        Entries {
            walker: self,
            index: 0,
            filter,
        }
    }

    /// Read a single entry by exact name. `Ok(None)` if it does not exist.
    pub fn read_by_name(&mut self, name: &str) -> Result<Option<Vec<u8>>, ExtractError> {
        let location = format!("{}!{}", self.label, name);
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ExtractError::corrupt(location, e)),
        };
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|e| ExtractError::corrupt(location, zip::result::ZipError::Io(e)))?;
        Ok(Some(bytes))
    }
}

/// Lazy iterator over container entries. Yields `Err` once and stops if an
/// entry cannot be read.
pub struct Entries<'a, R: Read + Seek> {
    walker: &'a mut ArchiveWalker<R>,
    index: usize,
    filter: fn(&str) -> bool,
}

impl<R: Read + Seek> Iterator for Entries<'_, R> {
    type Item = Result<ArchiveEntry, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.walker.archive.len() {
            let index = self.index;
            self.index += 1;

            let label = &self.walker.label;
            let mut file = match self.walker.archive.by_index(index) {
                Ok(file) => file,
                Err(e) => {
                    self.index = usize::MAX;
                    return Some(Err(ExtractError::corrupt(
                        format!("{label} (entry #{index})"),
                        e,
                    )));
                }
            };

            if file.is_dir() || !(self.filter)(file.name()) {
                continue;
            }

            let name = file.name().to_string();
            let size = file.size();
            let mut bytes = Vec::with_capacity(size as usize);
            if let Err(e) = file.read_to_end(&mut bytes) {
                self.index = usize::MAX;
                return Some(Err(ExtractError::corrupt(
                    format!("{label}!{name}"),
                    zip::result::ZipError::Io(e),
                )));
            }

            return Some(Ok(ArchiveEntry { name, size, bytes }));
        }
        None
    }
}
