//! Direct class references recorded in a constant pool.

use std::collections::HashSet;

use crate::error::{Error, FormatError, Result};
use crate::name::UnitName;
use crate::pool::{Constant, ConstantPool};
use crate::unit::BinaryUnit;

type FormatResult<T> = std::result::Result<T, FormatError>;

/// Collects every class named by a `Class`, field reference or method
/// reference constant of `unit`, in first-seen constant pool order.
pub fn extract_references(unit: &BinaryUnit) -> Result<Vec<UnitName>> {
    collect(unit.constant_pool()).map_err(|source| Error::bad_format(unit.name(), source))
}

fn collect(pool: &ConstantPool) -> FormatResult<Vec<UnitName>> {
    let mut refs = ReferenceSet::default();

    for (_, constant) in pool.iter() {
        match constant {
            Constant::Class { name_index } => {
                let internal = pool.utf8(*name_index)?;
                if internal.starts_with('[') {
                    refs.add(unit_name_for_descriptor(internal)?);
                } else if internal.is_empty() {
                    return Err(FormatError::new("empty class name"));
                } else {
                    refs.add(Some(UnitName::from_internal(internal)));
                }
            }
            Constant::FieldRef(member) => {
                refs.add(unit_name_for_descriptor(pool.member_descriptor(member)?)?);
            }
            Constant::MethodRef(member) | Constant::InterfaceMethodRef(member) => {
                let (params, ret) = split_method_descriptor(pool.member_descriptor(member)?)?;
                refs.add(unit_name_for_descriptor(ret)?);
                for param in params {
                    refs.add(unit_name_for_descriptor(param)?);
                }
            }
            _ => {}
        }
    }

    Ok(refs.ordered)
}

#[derive(Default)]
struct ReferenceSet {
    seen: HashSet<UnitName>,
    ordered: Vec<UnitName>,
}

impl ReferenceSet {
    fn add(&mut self, name: Option<UnitName>) {
        if let Some(name) = name
            && self.seen.insert(name.clone())
        {
            self.ordered.push(name);
        }
    }
}

/// Maps a field descriptor to the class it names.
///
/// Primitive and `void` descriptors yield `None`; arrays resolve to their
/// element class (`[[Ljava/lang/String;` gives `java/lang/String.class`).
pub fn unit_name_for_descriptor(descriptor: &str) -> FormatResult<Option<UnitName>> {
    if !descriptor.ends_with(';') {
        return Ok(None);
    }

    let element = descriptor.trim_start_matches('[');
    let internal = element
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .filter(|inner| !inner.is_empty() && !inner.contains(';'))
        .ok_or_else(|| FormatError::new(format!("malformed type descriptor \"{descriptor}\"")))?;

    Ok(Some(UnitName::from_internal(internal)))
}

/// Splits `(params)ret` into its parameter descriptors and return descriptor.
pub fn split_method_descriptor(descriptor: &str) -> FormatResult<(Vec<&str>, &str)> {
    let malformed = || FormatError::new(format!("malformed method descriptor \"{descriptor}\""));

    // Class names may contain `)`, so parameters are consumed one descriptor
    // at a time rather than by searching for the closing parenthesis.
    let mut rest = descriptor.strip_prefix('(').ok_or_else(malformed)?;
    let mut params = Vec::new();
    let ret = loop {
        if let Some(ret) = rest.strip_prefix(')') {
            break ret;
        }
        let len = field_descriptor_len(rest).ok_or_else(malformed)?;
        params.push(&rest[..len]);
        rest = &rest[len..];
    };

    let valid_return = ret == "V" || field_descriptor_len(ret) == Some(ret.len());
    if !valid_return {
        return Err(malformed());
    }

    Ok((params, ret))
}

/// Length of the field descriptor at the start of `s`, if one is there.
fn field_descriptor_len(s: &str) -> Option<usize> {
    let dims = s.bytes().take_while(|b| *b == b'[').count();
    match s.as_bytes().get(dims)? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => Some(dims + 1),
        b'L' => s[dims..].find(';').filter(|end| *end > 1).map(|end| dims + end + 1),
        _ => None,
    }
}
