//! Class-file binary reader.
//!
//! Decodes the parts of a class file the structural report needs: constant
//! pool, access flags, class hierarchy, member names and descriptors, the
//! `Signature` attribute, and (parameter) annotations, both runtime-visible
//! and runtime-invisible. Code, stack maps and annotation element values are
//! skipped.

use thiserror::Error;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
pub const ACC_VOLATILE: u16 = 0x0040;
pub const ACC_TRANSIENT: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_STRICT: u16 = 0x0800;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("unknown annotation element tag {tag:?}")]
    InvalidElementTag { tag: char },
    #[error("malformed descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Raw view of one class file; names use internal form (`java/lang/String`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Annotation type descriptors, e.g. `Ljavax/annotation/Nonnull;`.
    pub annotations: Vec<String>,
    pub parameter_annotations: Vec<Vec<String>>,
}

pub fn parse_class(bytes: &[u8]) -> Result<ClassFile, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    if reader.read_u4()? != MAGIC {
        return Err(ClassParseError::InvalidMagic);
    }
    let _minor_version = reader.read_u2()?;
    let _major_version = reader.read_u2()?;
    let constant_pool = ConstantPool::parse(&mut reader)?;

    let access_flags = reader.read_u2()?;
    let this_class = constant_pool.class_name(reader.read_u2()?)?.to_string();
    let super_index = reader.read_u2()?;
    let super_class = if super_index == 0 {
        None
    } else {
        Some(constant_pool.class_name(super_index)?.to_string())
    };

    let interfaces_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        interfaces.push(constant_pool.class_name(reader.read_u2()?)?.to_string());
    }

    let fields = parse_members(&mut reader, &constant_pool)?;
    let methods = parse_members(&mut reader, &constant_pool)?;

    // Class-level attributes carry nothing the report uses.
    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let _name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        reader.read_slice(length)?;
    }

    Ok(ClassFile {
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
    })
}

fn parse_members(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<MemberInfo>, ClassParseError> {
    let count = reader.read_u2()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access_flags = reader.read_u2()?;
        let name = pool.utf8(reader.read_u2()?)?.to_string();
        let descriptor = pool.utf8(reader.read_u2()?)?.to_string();
        let mut member = MemberInfo {
            access_flags,
            name,
            descriptor,
            ..MemberInfo::default()
        };

        let attributes_count = reader.read_u2()?;
        for _ in 0..attributes_count {
            let attribute_name = pool.utf8(reader.read_u2()?)?;
            let length = reader.read_u4()? as usize;
            let mut body = ClassReader::new(reader.read_slice(length)?);
            match attribute_name {
                "Signature" => {
                    member.signature = Some(pool.utf8(body.read_u2()?)?.to_string());
                }
                "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                    member.annotations.extend(read_annotations(&mut body, pool)?);
                }
                "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                    let num_parameters = body.read_u1()? as usize;
                    if member.parameter_annotations.len() < num_parameters {
                        member.parameter_annotations.resize(num_parameters, Vec::new());
                    }
                    for slot in member.parameter_annotations.iter_mut().take(num_parameters) {
                        slot.extend(read_annotations(&mut body, pool)?);
                    }
                }
                _ => {}
            }
        }
        members.push(member);
    }
    Ok(members)
}

fn read_annotations(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<String>, ClassParseError> {
    let count = reader.read_u2()?;
    let mut types = Vec::with_capacity(count as usize);
    for _ in 0..count {
        types.push(read_annotation(reader, pool)?);
    }
    Ok(types)
}

fn read_annotation(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<String, ClassParseError> {
    let type_descriptor = pool.utf8(reader.read_u2()?)?.to_string();
    let pairs = reader.read_u2()?;
    for _ in 0..pairs {
        let _element_name = reader.read_u2()?;
        skip_element_value(reader, pool)?;
    }
    Ok(type_descriptor)
}

fn skip_element_value(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<(), ClassParseError> {
    let tag = reader.read_u1()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            reader.read_u2()?;
        }
        b'e' => {
            reader.read_u2()?;
            reader.read_u2()?;
        }
        b'@' => {
            read_annotation(reader, pool)?;
        }
        b'[' => {
            let count = reader.read_u2()?;
            for _ in 0..count {
                skip_element_value(reader, pool)?;
            }
        }
        other => {
            return Err(ClassParseError::InvalidElementTag {
                tag: char::from(other),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class(u16),
    Other,
    // Second slot of a long or double.
    Unusable,
}

#[derive(Debug, Clone)]
struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable);

        let mut index = 1usize;
        while index < count {
            let tag = reader.read_u1()?;
            let constant = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.read_slice(length)?))
                }
                7 => Constant::Class(reader.read_u2()?),
                3 | 4 => {
                    reader.read_u4()?;
                    Constant::Other
                }
                5 | 6 => {
                    // Takes this slot and the next, which must still be inside the pool.
                    if index + 1 >= count {
                        return Err(ClassParseError::InvalidConstantIndex {
                            index: index as u16,
                        });
                    }
                    reader.read_slice(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                8 | 16 | 19 | 20 => {
                    reader.read_u2()?;
                    Constant::Other
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.read_u4()?;
                    Constant::Other
                }
                15 => {
                    reader.read_slice(3)?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };
            entries.push(constant);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.entries.get(index as usize) {
            Some(Constant::Utf8(value)) => Ok(value),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.entries.get(index as usize) {
            Some(Constant::Class(name_index)) => self.utf8(*name_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }
}

/// Decodes the JVM's modified UTF-8 (2-byte NUL, surrogate pairs as two 3-byte units).
fn decode_modified_utf8(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 && i + 1 < bytes.len() {
            units.push((u16::from(b & 0x1F) << 6) | u16::from(bytes[i + 1] & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 && i + 2 < bytes.len() {
            units.push(
                (u16::from(b & 0x0F) << 12)
                    | (u16::from(bytes[i + 1] & 0x3F) << 6)
                    | u16::from(bytes[i + 2] & 0x3F),
            );
            i += 3;
        } else {
            units.push(0xFFFD);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}

struct ClassReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassParseError::UnexpectedEof)?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        Ok(self.read_slice(1)?[0])
    }

    fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let s = self.read_slice(2)?;
        Ok(u16::from_be_bytes([s[0], s[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let s = self.read_slice(4)?;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }
}
