//! Replacing the note collection of a keyed archive.

use plist::{Dictionary, Value};
use thiserror::Error;

use crate::tap::TapNote;

use super::{ArchiveError, KeyedArchive, ObjRef, ref_field};

const MEMBERS_KEY: &str = "NS.objects";
const CLASS_KEY: &str = "$class";

/// An error occurred on replacing the note collection.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PatchError {
    /// The collection has no note to take the class reference from.
    #[error("no notes in target")]
    NoNotesInTarget,
    /// The document does not have the expected structure.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// The note collection of a document, located and ready to be replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteCollection {
    collection: ObjRef,
    class_cell: Value,
    previous_len: usize,
}

impl NoteCollection {
    /// Follows `$top.root` and then `key` of the root object to the collection, and captures the
    /// class reference of its first note.
    ///
    /// # Errors
    ///
    /// [`PatchError::NoNotesInTarget`] if the collection is empty, or [`PatchError::Archive`] if
    /// any link is absent or unresolvable.
    pub fn locate(archive: &KeyedArchive, key: &str) -> Result<Self, PatchError> {
        let root = archive.root_ref()?;
        let collection = ref_field(archive.resolve_dict(root)?, key)?;
        let members = members(archive.resolve_dict(collection)?, collection)?;
        let first = members.first().ok_or(PatchError::NoNotesInTarget)?;
        let first = ObjRef::from_value(first).ok_or_else(|| ArchiveError::NotAReference {
            key: MEMBERS_KEY.to_owned(),
        })?;
        let class_cell = archive
            .resolve_dict(first)?
            .get(CLASS_KEY)
            .cloned()
            .ok_or_else(|| ArchiveError::MissingKey {
                key: CLASS_KEY.to_owned(),
            })?;
        Ok(Self {
            collection,
            class_cell,
            previous_len: members.len(),
        })
    }

    /// Reference of the collection object.
    #[must_use]
    pub const fn collection(&self) -> ObjRef {
        self.collection
    }

    /// Class reference shared by the notes of the collection.
    #[must_use]
    pub const fn class_cell(&self) -> &Value {
        &self.class_cell
    }

    /// Number of notes before replacing.
    #[must_use]
    pub const fn previous_len(&self) -> usize {
        self.previous_len
    }

    fn encode(&self, note: &TapNote) -> Dictionary {
        let mut object = Dictionary::new();
        object.insert("flags".to_owned(), Value::from(u64::from(note.flags)));
        object.insert("holdTime".to_owned(), Value::from(note.hold_duration_ms));
        object.insert("time".to_owned(), Value::from(note.time_ms));
        object.insert(CLASS_KEY.to_owned(), self.class_cell.clone());
        object
    }

    /// Appends a new object per note to the object table and makes the collection refer to
    /// exactly those, in order.
    ///
    /// The previous notes stay in the object table, unreferenced.
    ///
    /// # Errors
    ///
    /// When the document structure changed since [`Self::locate`].
    pub fn replace(self, archive: &mut KeyedArchive, notes: &[TapNote]) -> Result<(), PatchError> {
        let mut new_members = Vec::with_capacity(notes.len());
        for note in notes {
            let reference = archive.push_object(self.encode(note))?;
            new_members.push(archive.encode_ref(reference));
        }
        let collection = archive.resolve_dict_mut(self.collection)?;
        *members_mut(collection, self.collection)? = new_members;
        Ok(())
    }
}

fn members(collection: &Dictionary, reference: ObjRef) -> Result<&Vec<Value>, ArchiveError> {
    collection
        .get(MEMBERS_KEY)
        .ok_or_else(|| ArchiveError::MissingKey {
            key: MEMBERS_KEY.to_owned(),
        })?
        .as_array()
        .ok_or(ArchiveError::UnexpectedKind {
            reference,
            expected: "an array collection",
        })
}

fn members_mut(
    collection: &mut Dictionary,
    reference: ObjRef,
) -> Result<&mut Vec<Value>, ArchiveError> {
    collection
        .get_mut(MEMBERS_KEY)
        .ok_or_else(|| ArchiveError::MissingKey {
            key: MEMBERS_KEY.to_owned(),
        })?
        .as_array_mut()
        .ok_or(ArchiveError::UnexpectedKind {
            reference,
            expected: "an array collection",
        })
}

/// Replaces the notes of the collection linked by `key` from the root object.
///
/// # Errors
///
/// See [`NoteCollection::locate`]. The document is unchanged on error.
pub fn replace_notes(
    archive: &mut KeyedArchive,
    key: &str,
    notes: &[TapNote],
) -> Result<NoteCollection, PatchError> {
    let located = NoteCollection::locate(archive, key)?;
    located.clone().replace(archive, notes)?;
    Ok(located)
}
