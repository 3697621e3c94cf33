//! Slot File Store
//!
//! Tiny named-file layer over [`super::storage`]: eight fixed slots, each
//! holding one file of up to 1KB. Backs the shell's `ls`, `cat`, `nano`,
//! `delete` and `showspace` commands and the pages served by the HTTP
//! server.

use defmt::Format;
use heapless::{String, Vec};
use sequential_storage::map::{SerializationError, Value};

use crate::system::storage::{self, take_str, StorageError, StorageKey};

/// Number of file slots
pub const SLOT_COUNT: u8 = 8;

/// Maximum file name length
pub const NAME_MAX: usize = 24;

/// Maximum file size
pub const FILE_MAX: usize = 1024;

/// Errors from file operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum FsError {
    /// No such file
    NotFound,
    /// All slots taken
    Full,
    /// Name empty or longer than [`NAME_MAX`]
    BadName,
    /// Content longer than [`FILE_MAX`]
    TooLarge,
    /// Underlying flash failure
    Storage,
}

impl From<StorageError> for FsError {
    fn from(_: StorageError) -> Self {
        FsError::Storage
    }
}

/// One stored file
#[derive(Debug, Clone, Default)]
pub struct FileRecord {
    pub name: String<NAME_MAX>,
    pub data: Vec<u8, FILE_MAX>,
}

impl Value<'_> for FileRecord {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let needed = 3 + self.name.len() + self.data.len();
        if buffer.len() < needed {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = self.name.len() as u8;
        let mut at = 1;
        buffer[at..at + self.name.len()].copy_from_slice(self.name.as_bytes());
        at += self.name.len();
        buffer[at..at + 2].copy_from_slice(&(self.data.len() as u16).to_le_bytes());
        at += 2;
        buffer[at..at + self.data.len()].copy_from_slice(&self.data);
        at += self.data.len();
        Ok(at)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<Self, SerializationError>
    where
        Self: Sized,
    {
        let name = take_str::<NAME_MAX>(buffer, 0)?;
        let at = 1 + name.len();
        let len_bytes = buffer
            .get(at..at + 2)
            .ok_or(SerializationError::BufferTooSmall)?;
        let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if len > FILE_MAX {
            return Err(SerializationError::InvalidFormat);
        }
        let bytes = buffer
            .get(at + 2..at + 2 + len)
            .ok_or(SerializationError::BufferTooSmall)?;
        let mut data = Vec::new();
        let _ = data.extend_from_slice(bytes);
        Ok(FileRecord { name, data })
    }
}

/// Writes a file, replacing one with the same name or taking a free slot.
pub async fn write(name: &str, data: &[u8]) -> Result<(), FsError> {
    if name.is_empty() || name.len() > NAME_MAX {
        return Err(FsError::BadName);
    }
    if data.len() > FILE_MAX {
        return Err(FsError::TooLarge);
    }

    let mut free: Option<u8> = None;
    let mut target: Option<u8> = None;
    for slot in 0..SLOT_COUNT {
        match storage::fetch::<FileRecord>(StorageKey::FileSlot(slot)).await? {
            Some(record) if record.name.as_str() == name => {
                target = Some(slot);
                break;
            }
            Some(_) => {}
            None => {
                if free.is_none() {
                    free = Some(slot);
                }
            }
        }
    }

    let slot = target.or(free).ok_or(FsError::Full)?;
    let mut record = FileRecord::default();
    let _ = record.name.push_str(name);
    let _ = record.data.extend_from_slice(data);
    storage::store(StorageKey::FileSlot(slot), &record).await?;
    Ok(())
}

/// Reads the file with the given name.
pub async fn read(name: &str) -> Result<FileRecord, FsError> {
    let slot = find(name).await?.ok_or(FsError::NotFound)?;
    storage::fetch::<FileRecord>(StorageKey::FileSlot(slot))
        .await?
        .ok_or(FsError::NotFound)
}

/// Deletes the file with the given name.
pub async fn remove(name: &str) -> Result<(), FsError> {
    let slot = find(name).await?.ok_or(FsError::NotFound)?;
    storage::remove(StorageKey::FileSlot(slot)).await?;
    Ok(())
}

/// Lists all stored files as (name, size) pairs.
pub async fn list() -> Result<Vec<(String<NAME_MAX>, usize), 8>, FsError> {
    let mut out = Vec::new();
    for slot in 0..SLOT_COUNT {
        if let Some(record) = storage::fetch::<FileRecord>(StorageKey::FileSlot(slot)).await? {
            let _ = out.push((record.name, record.data.len()));
        }
    }
    Ok(out)
}

/// Bytes used and slots taken, for `showspace`.
pub async fn usage() -> Result<(usize, u8), FsError> {
    let mut bytes = 0;
    let mut slots = 0;
    for slot in 0..SLOT_COUNT {
        if let Some(record) = storage::fetch::<FileRecord>(StorageKey::FileSlot(slot)).await? {
            bytes += record.data.len();
            slots += 1;
        }
    }
    Ok((bytes, slots))
}

async fn find(name: &str) -> Result<Option<u8>, FsError> {
    for slot in 0..SLOT_COUNT {
        if let Some(record) = storage::fetch::<FileRecord>(StorageKey::FileSlot(slot)).await? {
            if record.name.as_str() == name {
                return Ok(Some(slot));
            }
        }
    }
    Ok(None)
}
