//! Keyed archive documents, the object graph holding the note collection.
//!
//! A keyed archive is a property list of the form:
//!
//! ```text
//! {
//!     "$archiver": "NSKeyedArchiver",
//!     "$top": { "root": <ref 1> },
//!     "$objects": [ "$null", { "songTaps": <ref 2>, ... }, ... ],
//!     "$version": 100000,
//! }
//! ```
//!
//! Objects refer to each other only through references into `$objects`. Binary property lists
//! store a reference as a native UID, XML ones as a `{ "CF$UID": n }` dictionary. Both forms are
//! read, and new references are written in the form the document was read in.
//!
//! Only reference resolution and object insertion are provided here. Every other value of the
//! document is kept as is.

pub mod patch;

use std::{
    fmt,
    io::{self, Cursor},
    path::{Path, PathBuf},
};

use plist::{Dictionary, Uid, Value};
use thiserror::Error;

const OBJECTS_KEY: &str = "$objects";
const TOP_KEY: &str = "$top";
const ROOT_KEY: &str = "root";
const CF_UID_KEY: &str = "CF$UID";
const BINARY_MAGIC: &[u8] = b"bplist";

/// An error occurred when reading, navigating or writing a keyed archive.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The property list could not be decoded or encoded.
    #[error("property list: {0}")]
    Plist(#[from] plist::Error),
    /// The top level of the document is not a dictionary.
    #[error("the document is not a dictionary")]
    NotADictionary,
    /// A key expected on an object is absent.
    #[error("key `{key}` not found")]
    MissingKey {
        /// The absent key.
        key: String,
    },
    /// A value expected to be a reference is something else.
    #[error("value of `{key}` is not a reference")]
    NotAReference {
        /// The key holding the value.
        key: String,
    },
    /// A reference points outside of the object table.
    #[error("reference {0} is out of the object table")]
    UnresolvedReference(ObjRef),
    /// An object has another kind than expected.
    #[error("object {reference} is not {expected}")]
    UnexpectedKind {
        /// The object.
        reference: ObjRef,
        /// The expected kind.
        expected: &'static str,
    },
    /// The document could not be read or written.
    #[error("i/o: {0}")]
    Io(#[from] io::Error),
}

/// Type alias of `core::result::Result<T, ArchiveError>`
pub type Result<T> = core::result::Result<T, ArchiveError>;

/// Index of an object in the object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjRef(pub u64);

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl ObjRef {
    /// Reads a reference cell in either of its encodings.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uid(uid) => Some(Self(uid.get())),
            Value::Dictionary(dict) if dict.len() == 1 => dict
                .get(CF_UID_KEY)
                .and_then(Value::as_unsigned_integer)
                .map(Self),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Serialization of the property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlistFormat {
    /// XML property list, references as `{ "CF$UID": n }`.
    Xml,
    /// Binary property list, references as UIDs.
    Binary,
}

impl PlistFormat {
    /// Guesses the format from the leading bytes.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(BINARY_MAGIC) {
            Self::Binary
        } else {
            Self::Xml
        }
    }

    /// Encodes a reference cell in the format's convention.
    #[must_use]
    pub fn encode_ref(self, reference: ObjRef) -> Value {
        match self {
            Self::Binary => Value::Uid(Uid::new(reference.0)),
            Self::Xml => {
                let mut dict = Dictionary::new();
                dict.insert(CF_UID_KEY.to_owned(), Value::from(reference.0));
                Value::Dictionary(dict)
            }
        }
    }
}

/// A keyed archive document.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedArchive {
    document: Dictionary,
    format: PlistFormat,
}

impl KeyedArchive {
    /// Decodes a document in either format.
    ///
    /// # Errors
    ///
    /// When the bytes are not a property list whose top level is a dictionary.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format = PlistFormat::detect(bytes);
        let document = Value::from_reader(Cursor::new(bytes))?
            .into_dictionary()
            .ok_or(ArchiveError::NotADictionary)?;
        Ok(Self { document, format })
    }

    /// Reads and decodes a document file.
    ///
    /// # Errors
    ///
    /// When the file cannot be read or decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    /// Encodes the document in the format it was read in.
    ///
    /// # Errors
    ///
    /// When the document cannot be encoded in its format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let value = Value::Dictionary(self.document.clone());
        let mut bytes = vec![];
        match self.format {
            PlistFormat::Xml => value.to_writer_xml(&mut bytes)?,
            PlistFormat::Binary => value.to_writer_binary(&mut bytes)?,
        }
        Ok(bytes)
    }

    /// Format the document was read in.
    #[must_use]
    pub const fn format(&self) -> PlistFormat {
        self.format
    }

    /// The whole document.
    #[must_use]
    pub const fn document(&self) -> &Dictionary {
        &self.document
    }

    fn objects(&self) -> Result<&Vec<Value>> {
        self.document
            .get(OBJECTS_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| missing(OBJECTS_KEY))
    }

    fn objects_mut(&mut self) -> Result<&mut Vec<Value>> {
        self.document
            .get_mut(OBJECTS_KEY)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| missing(OBJECTS_KEY))
    }

    /// Number of objects in the object table.
    ///
    /// # Errors
    ///
    /// When the document has no object table.
    pub fn object_count(&self) -> Result<usize> {
        Ok(self.objects()?.len())
    }

    /// The reference declared by `$top.root`.
    ///
    /// # Errors
    ///
    /// When `$top` or its `root` is absent or not a reference.
    pub fn root_ref(&self) -> Result<ObjRef> {
        let top = self
            .document
            .get(TOP_KEY)
            .and_then(Value::as_dictionary)
            .ok_or_else(|| missing(TOP_KEY))?;
        ref_field(top, ROOT_KEY)
    }

    /// Resolves a reference to its object.
    ///
    /// # Errors
    ///
    /// When the reference points outside of the object table.
    pub fn resolve(&self, reference: ObjRef) -> Result<&Value> {
        self.objects()?
            .get(reference.index())
            .ok_or(ArchiveError::UnresolvedReference(reference))
    }

    /// Resolves a reference to a dictionary object.
    ///
    /// # Errors
    ///
    /// When the reference is unresolved or the object is not a dictionary.
    pub fn resolve_dict(&self, reference: ObjRef) -> Result<&Dictionary> {
        self.resolve(reference)?
            .as_dictionary()
            .ok_or(ArchiveError::UnexpectedKind {
                reference,
                expected: "a dictionary",
            })
    }

    /// Resolves a reference to a mutable dictionary object.
    ///
    /// # Errors
    ///
    /// When the reference is unresolved or the object is not a dictionary.
    pub fn resolve_dict_mut(&mut self, reference: ObjRef) -> Result<&mut Dictionary> {
        self.objects_mut()?
            .get_mut(reference.index())
            .ok_or(ArchiveError::UnresolvedReference(reference))?
            .as_dictionary_mut()
            .ok_or(ArchiveError::UnexpectedKind {
                reference,
                expected: "a dictionary",
            })
    }

    /// Appends an object to the object table, returning its reference.
    ///
    /// # Errors
    ///
    /// When the document has no object table.
    pub fn push_object(&mut self, object: impl Into<Value>) -> Result<ObjRef> {
        let objects = self.objects_mut()?;
        let reference = ObjRef(objects.len() as u64);
        objects.push(object.into());
        Ok(reference)
    }

    /// Encodes a reference in this document's convention.
    #[must_use]
    pub fn encode_ref(&self, reference: ObjRef) -> Value {
        self.format.encode_ref(reference)
    }
}

fn missing(key: &str) -> ArchiveError {
    ArchiveError::MissingKey {
        key: key.to_owned(),
    }
}

/// Reads the reference stored under `key` of an object.
///
/// # Errors
///
/// When the key is absent or does not hold a reference.
pub fn ref_field(object: &Dictionary, key: &str) -> Result<ObjRef> {
    let value = object.get(key).ok_or_else(|| missing(key))?;
    ObjRef::from_value(value).ok_or_else(|| ArchiveError::NotAReference {
        key: key.to_owned(),
    })
}

/// Path of the backup copy, `suffix` appended to the file name.
#[must_use]
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Copies the current file at `path` to its backup path, then overwrites `path` with the
/// document. Returns the backup path.
///
/// The document is encoded before anything touches the disk, and the original file is only
/// overwritten once the backup copy is complete. An existing backup is replaced.
///
/// # Errors
///
/// When encoding, copying or writing fails. If the copy fails the original is untouched.
pub fn save_with_backup(archive: &KeyedArchive, path: &Path, suffix: &str) -> Result<PathBuf> {
    let bytes = archive.to_bytes()?;
    let backup = backup_path(path, suffix);
    std::fs::copy(path, &backup)?;
    std::fs::write(path, bytes)?;
    Ok(backup)
}
