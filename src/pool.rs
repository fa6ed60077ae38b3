//! Constant pool of a class file, stored as a flat arena indexed the way the
//! class file format indexes it (slot 0 unused, long/double take two slots).

use crate::error::FormatError;

type FormatResult<T> = std::result::Result<T, FormatError>;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELD_REF: u8 = 9;
const TAG_METHOD_REF: u8 = 10;
const TAG_INTERFACE_METHOD_REF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef(MemberRef),
    MethodRef(MemberRef),
    InterfaceMethodRef(MemberRef),
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    slots: Vec<Option<Constant>>,
}

impl ConstantPool {
    pub(crate) fn read(reader: &mut ByteReader<'_>) -> FormatResult<Self> {
        let count = reader.u16()?;
        if count == 0 {
            return Err(FormatError::new("constant pool count is zero"));
        }

        let mut slots = Vec::with_capacity(count as usize);
        slots.push(None);
        while slots.len() < count as usize {
            let index = slots.len();
            let tag = reader.u8()?;
            let constant = match tag {
                TAG_UTF8 => {
                    let len = reader.u16()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.take(len)?)?)
                }
                TAG_INTEGER => Constant::Integer(reader.u32()? as i32),
                TAG_FLOAT => Constant::Float(f32::from_bits(reader.u32()?)),
                TAG_LONG => Constant::Long(reader.u64()? as i64),
                TAG_DOUBLE => Constant::Double(f64::from_bits(reader.u64()?)),
                TAG_CLASS => Constant::Class {
                    name_index: reader.u16()?,
                },
                TAG_STRING => Constant::String {
                    string_index: reader.u16()?,
                },
                TAG_FIELD_REF => Constant::FieldRef(read_member(reader)?),
                TAG_METHOD_REF => Constant::MethodRef(read_member(reader)?),
                TAG_INTERFACE_METHOD_REF => Constant::InterfaceMethodRef(read_member(reader)?),
                TAG_NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.u16()?,
                    descriptor_index: reader.u16()?,
                },
                TAG_METHOD_HANDLE => Constant::MethodHandle {
                    kind: reader.u8()?,
                    reference_index: reader.u16()?,
                },
                TAG_METHOD_TYPE => Constant::MethodType {
                    descriptor_index: reader.u16()?,
                },
                TAG_DYNAMIC => Constant::Dynamic {
                    bootstrap_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_INVOKE_DYNAMIC => Constant::InvokeDynamic {
                    bootstrap_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_MODULE => Constant::Module {
                    name_index: reader.u16()?,
                },
                TAG_PACKAGE => Constant::Package {
                    name_index: reader.u16()?,
                },
                other => {
                    return Err(FormatError::new(format!(
                        "unknown constant pool tag {other} at index {index}"
                    )));
                }
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            slots.push(Some(constant));
            if wide {
                if slots.len() >= count as usize {
                    return Err(FormatError::new(format!(
                        "8-byte constant at index {index} overflows the constant pool"
                    )));
                }
                slots.push(None);
            }
        }

        Ok(Self { slots })
    }

    /// Number of slots, including the unused slot 0.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 1
    }

    pub fn get(&self, index: u16) -> FormatResult<&Constant> {
        self.slots
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| FormatError::new(format!("invalid constant pool index {index}")))
    }

    /// Iterates populated slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (i as u16, c)))
    }

    pub fn utf8(&self, index: u16) -> FormatResult<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            other => Err(mistyped(index, "Utf8", other)),
        }
    }

    /// Internal name of a `Class` entry, e.g. `java/lang/Object` or `[Ljava/lang/String;`.
    pub fn class_name(&self, index: u16) -> FormatResult<&str> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            other => Err(mistyped(index, "Class", other)),
        }
    }

    pub fn name_and_type(&self, index: u16) -> FormatResult<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(mistyped(index, "NameAndType", other)),
        }
    }

    /// Type descriptor of a field or method reference.
    pub fn member_descriptor(&self, member: &MemberRef) -> FormatResult<&str> {
        self.class_name(member.class_index)?;
        let (_, descriptor) = self.name_and_type(member.name_and_type_index)?;
        Ok(descriptor)
    }
}

fn read_member(reader: &mut ByteReader<'_>) -> FormatResult<MemberRef> {
    Ok(MemberRef {
        class_index: reader.u16()?,
        name_and_type_index: reader.u16()?,
    })
}

fn mistyped(index: u16, expected: &str, found: &Constant) -> FormatError {
    FormatError::new(format!(
        "constant pool index {index} should be {expected}, found {found:?}"
    ))
}

/// Decodes the JVM's modified UTF-8: no raw NUL bytes, no 4-byte sequences,
/// supplementary characters encoded as surrogate pairs.
fn decode_modified_utf8(bytes: &[u8]) -> FormatResult<String> {
    if bytes.iter().all(|b| (1..0x80).contains(b)) {
        return Ok(bytes.iter().map(|&b| b as char).collect());
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let continuation = |offset: usize| -> FormatResult<u16> {
            match bytes.get(i + offset) {
                Some(&c) if c & 0xC0 == 0x80 => Ok((c & 0x3F) as u16),
                _ => Err(FormatError::new(format!(
                    "truncated modified UTF-8 sequence at byte {i}"
                ))),
            }
        };

        match b {
            0x01..=0x7F => {
                units.push(b as u16);
                i += 1;
            }
            0xC0..=0xDF => {
                units.push(((b & 0x1F) as u16) << 6 | continuation(1)?);
                i += 2;
            }
            0xE0..=0xEF => {
                units.push(((b & 0x0F) as u16) << 12 | continuation(1)? << 6 | continuation(2)?);
                i += 3;
            }
            _ => {
                return Err(FormatError::new(format!(
                    "invalid modified UTF-8 byte {b:#04x} at {i}"
                )));
            }
        }
    }

    Ok(String::from_utf16_lossy(&units))
}

/// Big-endian cursor over a class file.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn take(&mut self, len: usize) -> FormatResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                FormatError::new(format!(
                    "unexpected end of class file at offset {} (wanted {len} bytes)",
                    self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> FormatResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> FormatResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> FormatResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn u64(&mut self) -> FormatResult<u64> {
        let hi = self.u32()? as u64;
        let lo = self.u32()? as u64;
        Ok(hi << 32 | lo)
    }
}
