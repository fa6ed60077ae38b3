//! Structural decoding of class files.
//!
//! Only the header, the constant pool, the class hierarchy and the interface
//! table are read. Fields, methods and attributes (and therefore bytecode) are
//! left untouched: dependency discovery needs nothing from them.

use crate::error::{Error, FormatError, Result};
use crate::name::UnitName;
use crate::pool::{ByteReader, ConstantPool};

pub const MAGIC: u32 = 0xCAFE_BABE;
/// JDK 1.1, the oldest class file version in circulation.
pub const MIN_MAJOR_VERSION: u16 = 45;

#[derive(Debug, Clone)]
pub struct BinaryUnit {
    name: UnitName,
    this_class: String,
    superclass: Option<UnitName>,
    interfaces: Vec<UnitName>,
    pool: ConstantPool,
}

impl BinaryUnit {
    pub fn name(&self) -> &UnitName {
        &self.name
    }

    /// Internal name declared by the class file itself.
    pub fn this_class(&self) -> &str {
        &self.this_class
    }

    pub fn superclass(&self) -> Option<&UnitName> {
        self.superclass.as_ref()
    }

    pub fn interfaces(&self) -> &[UnitName] {
        &self.interfaces
    }

    /// Superclass first, then interfaces in declaration order.
    pub fn ancestors(&self) -> impl Iterator<Item = &UnitName> + '_ {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.pool
    }
}

/// Decodes `bytes` as the class file stored under `name`.
pub fn parse(name: &UnitName, bytes: &[u8]) -> Result<BinaryUnit> {
    decode(name, bytes).map_err(|source| Error::bad_format(name, source))
}

fn decode(name: &UnitName, bytes: &[u8]) -> std::result::Result<BinaryUnit, FormatError> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(FormatError::new(format!("bad magic {magic:#010x}")));
    }
    let minor_version = reader.u16()?;
    let major_version = reader.u16()?;
    if major_version < MIN_MAJOR_VERSION {
        return Err(FormatError::new(format!(
            "unsupported class file version {major_version}.{minor_version}"
        )));
    }

    let pool = ConstantPool::read(&mut reader)?;

    let _access_flags = reader.u16()?;
    let this_class = pool.class_name(reader.u16()?)?.to_string();

    let superclass = match reader.u16()? {
        0 => None,
        index => Some(class_unit_name(&pool, index)?),
    };

    let interface_count = reader.u16()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(class_unit_name(&pool, reader.u16()?)?);
    }

    Ok(BinaryUnit {
        name: name.clone(),
        this_class,
        superclass,
        interfaces,
        pool,
    })
}

fn class_unit_name(pool: &ConstantPool, index: u16) -> std::result::Result<UnitName, FormatError> {
    let internal = pool.class_name(index)?;
    if internal.is_empty() || internal.starts_with('[') {
        return Err(FormatError::new(format!(
            "\"{internal}\" at index {index} is not a class or interface name"
        )));
    }
    Ok(UnitName::from_internal(internal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::ClassFileBuilder;

    fn name(internal: &str) -> UnitName {
        UnitName::from_internal(internal)
    }

    #[test]
    fn parse_reads_hierarchy_in_declaration_order() {
        let bytes = ClassFileBuilder::new("com/example/App")
            .extends("com/example/Base")
            .implements("java/lang/Runnable")
            .implements("com/example/Listener")
            .build();

        let unit = parse(&name("com/example/App"), &bytes).unwrap();
        assert_eq!(unit.this_class(), "com/example/App");
        assert_eq!(unit.superclass(), Some(&name("com/example/Base")));
        assert_eq!(
            unit.interfaces(),
            &[name("java/lang/Runnable"), name("com/example/Listener")]
        );
        let ancestors: Vec<&str> = unit.ancestors().map(UnitName::as_path).collect();
        assert_eq!(
            ancestors,
            vec![
                "com/example/Base.class",
                "java/lang/Runnable.class",
                "com/example/Listener.class"
            ]
        );
    }

    #[test]
    fn parse_allows_missing_superclass() {
        let bytes = ClassFileBuilder::new("java/lang/Object").build();
        let unit = parse(&name("java/lang/Object"), &bytes).unwrap();
        assert!(unit.superclass().is_none());
        assert!(unit.interfaces().is_empty());
    }

    #[test]
    fn parse_ignores_member_tables_after_interfaces() {
        let mut bytes = ClassFileBuilder::new("a/A").extends("a/B").build();
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(parse(&name("a/A"), &bytes).is_ok());
    }

    #[test]
    fn parse_rejects_bad_magic_old_versions_and_truncation() {
        let unit = name("a/A");

        let err = parse(&unit, b"not a class file").unwrap_err();
        assert!(matches!(err, Error::BadFormat { .. }));
        assert!(err.to_string().contains("bad magic"));

        let old = ClassFileBuilder::new("a/A").major_version(44).build();
        assert!(matches!(parse(&unit, &old), Err(Error::BadFormat { .. })));

        let full = ClassFileBuilder::new("a/A").extends("a/B").build();
        let truncated = &full[..12];
        assert!(matches!(parse(&unit, truncated), Err(Error::BadFormat { .. })));
    }
}
