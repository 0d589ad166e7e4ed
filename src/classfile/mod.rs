// Partial class-file introspection.
//
// Only enough of the JVM class format is parsed to list declared method
// names: the constant pool (to resolve name indices), then interfaces and
// fields are skipped, then each method's name is resolved. Bytecode,
// descriptors, and signatures are never interpreted.

mod reader;
pub mod symbols;

use thiserror::Error;

use reader::{decode_modified_utf8, ByteReader};

pub use symbols::split_camel_case;

const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// Why a class could not be introspected. Always non-fatal for the package:
/// the caller skips the class and carries on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassParseError {
    #[error("not a class file (magic {0:#010x})")]
    BadMagic(u32),

    #[error("class file truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("method name index {0} does not point to a UTF-8 constant")]
    BadNameIndex(u16),
}

// Constant pool tags (JVMS §4.4).
const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// List the names of all methods declared by a class, in declaration order.
/// Constructors and static initializers appear as `<init>` and `<clinit>`.
pub fn method_names(class_bytes: &[u8]) -> Result<Vec<String>, ClassParseError> {
    let mut r = ByteReader::new(class_bytes);

    let magic = r.u32()?;
    if magic != CLASS_MAGIC {
        return Err(ClassParseError::BadMagic(magic));
    }
    let _minor = r.u16()?;
    let _major = r.u16()?;

    let utf8 = read_constant_pool(&mut r)?;

    let _access_flags = r.u16()?;
    let _this_class = r.u16()?;
    let _super_class = r.u16()?;
    let interfaces = r.u16()?;
    r.skip(usize::from(interfaces) * 2)?;

    let fields = r.u16()?;
    for _ in 0..fields {
        skip_member(&mut r)?;
    }

    let methods = r.u16()?;
    let mut names = Vec::with_capacity(usize::from(methods));
    for _ in 0..methods {
        let _access = r.u16()?;
        let name_index = r.u16()?;
        let _descriptor_index = r.u16()?;
        skip_attributes(&mut r)?;

        let name = utf8
            .get(usize::from(name_index))
            .and_then(|entry| entry.as_ref())
            .ok_or(ClassParseError::BadNameIndex(name_index))?;
        names.push(name.clone());
    }

    Ok(names)
}

/// Read the constant pool, keeping only UTF-8 entries (indexed as in the
/// class file, slot 0 unused).
fn read_constant_pool(r: &mut ByteReader<'_>) -> Result<Vec<Option<String>>, ClassParseError> {
    let count = r.u16()?;
    let mut pool: Vec<Option<String>> = vec![None; usize::from(count)];

    let mut index = 1usize;
    while index < pool.len() {
        let tag = r.u8()?;
        match tag {
            TAG_UTF8 => {
                let len = r.u16()?;
                let bytes = r.bytes(usize::from(len))?;
                pool[index] = Some(decode_modified_utf8(bytes));
            }
            TAG_INTEGER | TAG_FLOAT => r.skip(4)?,
            // Long and Double take two pool slots
            TAG_LONG | TAG_DOUBLE => {
                r.skip(8)?;
                index += 1;
            }
            TAG_CLASS | TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => r.skip(2)?,
            TAG_FIELDREF
            | TAG_METHODREF
            | TAG_INTERFACE_METHODREF
            | TAG_NAME_AND_TYPE
            | TAG_DYNAMIC
            | TAG_INVOKE_DYNAMIC => r.skip(4)?,
            TAG_METHOD_HANDLE => r.skip(3)?,
            _ => {
                return Err(ClassParseError::UnknownConstantTag {
                    tag,
                    index: index as u16,
                })
            }
        }
        index += 1;
    }

    Ok(pool)
}

fn skip_member(r: &mut ByteReader<'_>) -> Result<(), ClassParseError> {
    let _access = r.u16()?;
    let _name = r.u16()?;
    let _descriptor = r.u16()?;
    skip_attributes(r)
}

fn skip_attributes(r: &mut ByteReader<'_>) -> Result<(), ClassParseError> {
    let count = r.u16()?;
    for _ in 0..count {
        let _name = r.u16()?;
        let len = r.u32()?;
        r.skip(len as usize)?;
    }
    Ok(())
}
