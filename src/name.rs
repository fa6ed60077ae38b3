use serde::Serialize;
use std::fmt;

pub const CLASS_EXTENSION: &str = ".class";

/// Canonical name of one class file: `/`-separated, always ending in `.class`.
///
/// This is the form classes take inside a jar and the form a main dex list
/// file expects, e.g. `com/example/App$Inner.class`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UnitName(String);

impl UnitName {
    /// Builds a name from a relative entry path, appending `.class` when missing.
    pub fn new(path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.ends_with(CLASS_EXTENSION) {
            path.push_str(CLASS_EXTENSION);
        }
        Self(path)
    }

    /// Builds a name from a JVM internal name such as `java/lang/String`.
    pub fn from_internal(internal: &str) -> Self {
        Self(format!("{internal}{CLASS_EXTENSION}"))
    }

    /// Accepts `a.b.C`, `a/b/C` or `a/b/C.class`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().replace('\\', "/");
        if raw.contains('/') {
            return Self::new(raw);
        }
        let stem = raw.strip_suffix(CLASS_EXTENSION).unwrap_or(&raw);
        Self::from_internal(&stem.replace('.', "/"))
    }

    pub fn as_path(&self) -> &str {
        &self.0
    }

    pub fn internal_name(&self) -> &str {
        self.0.strip_suffix(CLASS_EXTENSION).unwrap_or(&self.0)
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_dotted_internal_and_path_forms() {
        let expected = "org/example/pkg/App.class";
        assert_eq!(UnitName::parse("org.example.pkg.App").as_path(), expected);
        assert_eq!(UnitName::parse("org/example/pkg/App").as_path(), expected);
        assert_eq!(UnitName::parse(" org/example/pkg/App.class ").as_path(), expected);
        assert_eq!(UnitName::parse("org.example.pkg.App.class").as_path(), expected);
    }

    #[test]
    fn internal_name_strips_extension() {
        let name = UnitName::from_internal("a/B$C");
        assert_eq!(name.as_path(), "a/B$C.class");
        assert_eq!(name.internal_name(), "a/B$C");
    }

    #[test]
    fn new_does_not_double_the_extension() {
        assert_eq!(UnitName::new("a/B.class"), UnitName::new("a/B"));
    }
}
