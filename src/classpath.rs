use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::element::ClassPathElement;
use crate::error::{Error, Result};
use crate::name::UnitName;
use crate::unit::{self, BinaryUnit};

const READ_BUFFER_CAPACITY: usize = 40 * 1024;

/// Ordered list of containers searched for class files. Earlier elements
/// shadow later ones.
#[derive(Debug)]
pub struct ClassPath {
    elements: Vec<ClassPathElement>,
    buffer: Vec<u8>,
}

impl ClassPath {
    /// Opens every location, in parallel, keeping the configured order.
    pub fn new<P>(locations: &[P]) -> Result<Self>
    where
        P: AsRef<Path> + Sync,
    {
        let opened: Vec<Result<ClassPathElement>> = locations
            .par_iter()
            .map(|location| ClassPathElement::from_location(location.as_ref()))
            .collect();
        // The first bad location in configured order wins.
        let elements = opened.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(Self::from_elements(elements))
    }

    pub fn from_elements(elements: Vec<ClassPathElement>) -> Self {
        Self {
            elements,
            buffer: Vec::with_capacity(READ_BUFFER_CAPACITY),
        }
    }

    pub fn elements(&self) -> &[ClassPathElement] {
        &self.elements
    }

    /// Loads and decodes `name` from the first element that contains it.
    ///
    /// Only a missing entry moves the search on to the next element. An entry
    /// that exists but cannot be read fails the lookup.
    pub fn get_unit(&mut self, name: &UnitName) -> Result<BinaryUnit> {
        for element in self.elements.iter_mut() {
            let mut input = match element.open(name.as_path()) {
                Ok(input) => input,
                Err(Error::EntryNotFound { .. }) => continue,
                Err(err) => return Err(err),
            };

            self.buffer.clear();
            if let Err(source) = input.read_to_end(&mut self.buffer) {
                drop(input);
                let location = element.location().to_path_buf();
                debug!(unit = %name, location = %location.display(), error = %source, "entry is unreadable");
                return Err(Error::UnreadableUnit {
                    name: name.clone(),
                    location,
                    source,
                });
            }
            drop(input);

            return unit::parse(name, &self.buffer);
        }

        Err(Error::UnitNotFound(name.clone()))
    }

    /// Releases every element. Safe to call more than once.
    pub fn close(&mut self) {
        for element in self.elements.iter_mut() {
            element.close();
        }
    }
}

/// Splits a platform path list such as `a.jar:classes/:b.jar`, dropping empty parts.
pub fn split_definition(definition: &str) -> Vec<PathBuf> {
    std::env::split_paths(definition)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

impl Drop for ClassPath {
    fn drop(&mut self) {
        self.close();
    }
}
