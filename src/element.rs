//! Containers that make up a classpath: plain directories and zip/jar archives.

use ignore::WalkBuilder;
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};

pub const SEPARATOR_CHAR: char = '/';

/// One entry of a classpath.
///
/// Paths handed to [`ClassPathElement::open`] and produced by
/// [`ClassPathElement::list`] are relative and `/`-separated regardless of
/// platform, matching jar entry names.
#[derive(Debug)]
pub enum ClassPathElement {
    Folder(FolderElement),
    Archive(ArchiveElement),
}

impl ClassPathElement {
    pub fn from_location(location: &Path) -> Result<Self> {
        let metadata = match fs::metadata(location) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::LocationNotFound(location.to_path_buf()));
            }
            Err(err) => return Err(invalid_location(location, err)),
        };

        if metadata.is_dir() {
            Ok(ClassPathElement::Folder(FolderElement::new(location)))
        } else if metadata.is_file() {
            ArchiveElement::open(location).map(ClassPathElement::Archive)
        } else {
            Err(invalid_location(location, "not a regular file"))
        }
    }

    pub fn location(&self) -> &Path {
        match self {
            ClassPathElement::Folder(folder) => &folder.root,
            ClassPathElement::Archive(archive) => &archive.location,
        }
    }

    pub fn open(&mut self, path: &str) -> Result<Box<dyn Read + '_>> {
        match self {
            ClassPathElement::Folder(folder) => folder.open(path),
            ClassPathElement::Archive(archive) => archive.open_entry(path),
        }
    }

    /// Lazily lists every file in this element. A closed element lists nothing.
    pub fn list(&mut self) -> Box<dyn Iterator<Item = String> + '_> {
        match self {
            ClassPathElement::Folder(folder) => folder.list(),
            ClassPathElement::Archive(archive) => archive.list(),
        }
    }

    pub fn close(&mut self) {
        match self {
            ClassPathElement::Folder(folder) => folder.closed = true,
            ClassPathElement::Archive(archive) => archive.archive = None,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            ClassPathElement::Folder(folder) => folder.closed,
            ClassPathElement::Archive(archive) => archive.archive.is_none(),
        }
    }
}

#[derive(Debug)]
pub struct FolderElement {
    root: PathBuf,
    closed: bool,
}

impl FolderElement {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            closed: false,
        }
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        if self.closed {
            return Err(Error::Closed(self.root.clone()));
        }

        let full = path
            .split(SEPARATOR_CHAR)
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part));
        if !full.is_file() {
            return Err(Error::EntryNotFound {
                entry: path.to_string(),
                location: self.root.clone(),
            });
        }

        Ok(Box::new(File::open(&full)?))
    }

    fn list(&self) -> Box<dyn Iterator<Item = String> + '_> {
        if self.closed {
            return Box::new(std::iter::empty());
        }

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        Box::new(walker.filter_map(move |entry| {
            let entry = entry.ok()?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                return None;
            }
            let relative = entry.path().strip_prefix(&self.root).ok()?;
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            Some(parts.join("/"))
        }))
    }
}

pub struct ArchiveElement {
    location: PathBuf,
    archive: Option<ZipArchive<Cursor<Mmap>>>,
}

impl std::fmt::Debug for ArchiveElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveElement")
            .field("location", &self.location)
            .field("open", &self.archive.is_some())
            .finish()
    }
}

impl ArchiveElement {
    pub fn open(location: &Path) -> Result<Self> {
        let file = File::open(location).map_err(|err| invalid_location(location, err))?;
        // SAFETY: The mapping is read-only and jars on the classpath are not
        // rewritten while a resolution pass holds them open.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|err| invalid_location(location, err))?;
        let archive = ZipArchive::new(Cursor::new(mmap))
            .map_err(|err| invalid_location(location, err))?;

        Ok(Self {
            location: location.to_path_buf(),
            archive: Some(archive),
        })
    }

    fn open_entry(&mut self, path: &str) -> Result<Box<dyn Read + '_>> {
        let archive = self
            .archive
            .as_mut()
            .ok_or_else(|| Error::Closed(self.location.clone()))?;

        match archive.by_name(path) {
            Ok(entry) if !entry.is_dir() => Ok(Box::new(entry)),
            Ok(_) | Err(ZipError::FileNotFound) => Err(Error::EntryNotFound {
                entry: path.to_string(),
                location: self.location.clone(),
            }),
            Err(source) => Err(Error::Zip {
                location: self.location.clone(),
                source,
            }),
        }
    }

    fn list(&mut self) -> Box<dyn Iterator<Item = String> + '_> {
        let Some(archive) = self.archive.as_mut() else {
            return Box::new(std::iter::empty());
        };

        let len = archive.len();
        Box::new((0..len).filter_map(move |i| {
            let entry = archive.by_index(i).ok()?;
            if entry.is_dir() {
                return None;
            }
            Some(entry.name().to_string())
        }))
    }
}

fn invalid_location(location: &Path, reason: impl ToString) -> Error {
    Error::InvalidLocation {
        path: location.to_path_buf(),
        reason: reason.to_string(),
    }
}
