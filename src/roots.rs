//! Ways to obtain the root set handed to the resolver.

use anyhow::{Context, Result};
use std::path::Path;

use crate::element::ClassPathElement;
use crate::name::{CLASS_EXTENSION, UnitName};

/// Every class file in a jar or directory, typically the output of a
/// shrinker run over the application's entry points.
pub fn roots_from_container(location: &Path) -> Result<Vec<UnitName>> {
    let mut element = ClassPathElement::from_location(location)
        .with_context(|| format!("\"{}\" can not be read as a root container", location.display()))?;

    let roots: Vec<UnitName> = element
        .list()
        .filter(|path| path.ends_with(CLASS_EXTENSION))
        .map(UnitName::new)
        .collect();
    element.close();
    Ok(roots)
}

/// One class name per line. Blank lines and `#` comments are ignored.
pub fn roots_from_file(path: &Path) -> Result<Vec<UnitName>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roots file: {}", path.display()))?;
    Ok(parse_root_lines(&content))
}

pub fn parse_root_lines(content: &str) -> Vec<UnitName> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(UnitName::parse)
        .collect()
}
