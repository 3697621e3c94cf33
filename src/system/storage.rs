//! Persistent Flash Storage
//!
//! Key-value store in the last sectors of the on-chip flash, built on
//! `sequential-storage` for wear leveling. Holds the WiFi credentials, the
//! timezone offset, the todo list and the file slots used by [`super::fs`].
//!
//! The flash peripheral is owned by a global mutex so the shell and the
//! background tasks can share it without a dedicated storage task.

use defmt::{error, info, Format};
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_storage_async::nor_flash::NorFlash;
use heapless::String;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, remove_item, store_item, Key, SerializationError, Value};

use crate::system::resources::FlashResources;

/// Total flash size on the Pico 2 W
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Number of sectors reserved for storage at the end of flash
const STORAGE_SECTOR_COUNT: usize = 32;

/// Total storage size (128KB)
pub const STORAGE_SIZE: usize = ERASE_SIZE * STORAGE_SECTOR_COUNT;

/// Storage offset from the start of flash
const STORAGE_OFFSET: u32 = FLASH_SIZE as u32 - STORAGE_SIZE as u32;

/// Scratch buffer size; must hold the largest value plus framing
const BUFFER_SIZE: usize = 1152;

struct Store {
    flash: Flash<'static, FLASH, Async, FLASH_SIZE>,
    cache: NoCache,
    buffer: [u8; BUFFER_SIZE],
}

static STORE: Mutex<CriticalSectionRawMutex, Option<Store>> = Mutex::new(None);

/// Storage errors surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum StorageError {
    /// [`init`] has not run
    NotInitialized,
    /// Flash or map-level failure
    Flash,
}

/// Takes ownership of the flash peripheral. Must run before any other
/// function in this module.
pub async fn init(r: FlashResources) {
    let flash = Flash::new(r.flash, r.dma);
    *STORE.lock().await = Some(Store {
        flash,
        cache: NoCache::new(),
        buffer: [0; BUFFER_SIZE],
    });
    info!("flash store ready, {} bytes reserved", STORAGE_SIZE);
}

fn range() -> core::ops::Range<u32> {
    STORAGE_OFFSET..(STORAGE_OFFSET + STORAGE_SIZE as u32)
}

/// Fetches the value stored under `key`, if any.
pub async fn fetch<V>(key: StorageKey) -> Result<Option<V>, StorageError>
where
    V: for<'d> Value<'d>,
{
    let mut guard = STORE.lock().await;
    let store = guard.as_mut().ok_or(StorageError::NotInitialized)?;
    fetch_item::<StorageKey, V, _>(
        &mut store.flash,
        range(),
        &mut store.cache,
        &mut store.buffer,
        &key,
    )
    .await
    .map_err(|e| {
        error!("fetch failed: {}", defmt::Debug2Format(&e));
        StorageError::Flash
    })
}

/// Stores `value` under `key`, replacing any previous value.
pub async fn store<V>(key: StorageKey, value: &V) -> Result<(), StorageError>
where
    V: for<'d> Value<'d>,
{
    let mut guard = STORE.lock().await;
    let store = guard.as_mut().ok_or(StorageError::NotInitialized)?;
    store_item(
        &mut store.flash,
        range(),
        &mut store.cache,
        &mut store.buffer,
        &key,
        value,
    )
    .await
    .map_err(|e| {
        error!("store failed: {}", defmt::Debug2Format(&e));
        StorageError::Flash
    })
}

/// Removes the value stored under `key`, if any.
pub async fn remove(key: StorageKey) -> Result<(), StorageError> {
    let mut guard = STORE.lock().await;
    let store = guard.as_mut().ok_or(StorageError::NotInitialized)?;
    remove_item::<StorageKey, _>(
        &mut store.flash,
        range(),
        &mut store.cache,
        &mut store.buffer,
        &key,
    )
    .await
    .map_err(|e| {
        error!("remove failed: {}", defmt::Debug2Format(&e));
        StorageError::Flash
    })
}

/// Erases the whole storage region. Everything persisted is lost.
pub async fn erase_all() -> Result<(), StorageError> {
    let mut guard = STORE.lock().await;
    let store = guard.as_mut().ok_or(StorageError::NotInitialized)?;
    store.cache = NoCache::new();
    store
        .flash
        .erase(STORAGE_OFFSET, STORAGE_OFFSET + STORAGE_SIZE as u32)
        .await
        .map_err(|e| {
            error!("erase failed: {}", defmt::Debug2Format(&e));
            StorageError::Flash
        })
}

/// Storage keys for sequential-storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StorageKey {
    /// WiFi credentials
    WifiConfig,
    /// Timezone offset in hours
    Timezone,
    /// Todo list
    Todos,
    /// One file slot, 0 to 7
    FileSlot(u8),
}

impl StorageKey {
    fn tag(self) -> u8 {
        match self {
            StorageKey::WifiConfig => 0,
            StorageKey::Timezone => 1,
            StorageKey::Todos => 2,
            StorageKey::FileSlot(n) => 0x10 + n,
        }
    }
}

impl Key for StorageKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        if buffer.is_empty() {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = self.tag();
        Ok(1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError>
    where
        Self: Sized,
    {
        if buffer.is_empty() {
            return Err(SerializationError::BufferTooSmall);
        }
        let key = match buffer[0] {
            0 => StorageKey::WifiConfig,
            1 => StorageKey::Timezone,
            2 => StorageKey::Todos,
            n @ 0x10..=0x17 => StorageKey::FileSlot(n - 0x10),
            _ => return Err(SerializationError::InvalidFormat),
        };
        Ok((key, 1))
    }
}

/// Persisted WiFi credentials
#[derive(Debug, Clone, Default, Format)]
pub struct WifiConfig {
    pub ssid: String<32>,
    pub password: String<64>,
}

impl Value<'_> for WifiConfig {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let needed = 2 + self.ssid.len() + self.password.len();
        if buffer.len() < needed {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = self.ssid.len() as u8;
        let mut at = 1;
        buffer[at..at + self.ssid.len()].copy_from_slice(self.ssid.as_bytes());
        at += self.ssid.len();
        buffer[at] = self.password.len() as u8;
        at += 1;
        buffer[at..at + self.password.len()].copy_from_slice(self.password.as_bytes());
        at += self.password.len();
        Ok(at)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<Self, SerializationError>
    where
        Self: Sized,
    {
        let ssid = take_str::<32>(buffer, 0)?;
        let password = take_str::<64>(buffer, 1 + ssid.len())?;
        Ok(WifiConfig { ssid, password })
    }
}

/// Persisted timezone offset, hours from UTC
#[derive(Debug, Clone, Copy, Default, Format)]
pub struct TimezoneOffset(pub i8);

impl Value<'_> for TimezoneOffset {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        if buffer.is_empty() {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = self.0 as u8;
        Ok(1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<Self, SerializationError>
    where
        Self: Sized,
    {
        if buffer.is_empty() {
            return Err(SerializationError::BufferTooSmall);
        }
        Ok(TimezoneOffset(buffer[0] as i8))
    }
}

/// Reads a length-prefixed string starting at `offset`.
pub(crate) fn take_str<const N: usize>(
    buffer: &[u8],
    offset: usize,
) -> Result<String<N>, SerializationError> {
    let len = *buffer.get(offset).ok_or(SerializationError::BufferTooSmall)? as usize;
    if len > N {
        return Err(SerializationError::InvalidFormat);
    }
    let bytes = buffer
        .get(offset + 1..offset + 1 + len)
        .ok_or(SerializationError::BufferTooSmall)?;
    let s = core::str::from_utf8(bytes).map_err(|_| SerializationError::InvalidFormat)?;
    let mut out = String::new();
    let _ = out.push_str(s);
    Ok(out)
}
