//! Gemeinsame Mocks für die Integration Tests

#![allow(dead_code)]

use embedded_storage::nor_flash::{ErrorType, NorFlash, NorFlashErrorKind, ReadNorFlash};
use lights_core::{ConfigStore, Lamp, LampDriver, LampError, MemoryStore, StoreError};

// ============================================================================
// Mock Lamp Driver
// ============================================================================

#[derive(Default)]
pub struct MockLampDriver {
    pub front: bool,
    pub drl: bool,
    pub rear: bool,
    pub write_count: usize,
    pub fail_next_write: bool,
}

impl MockLampDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pegel als (Front, DRL, Rear)
    pub fn levels(&self) -> (bool, bool, bool) {
        (self.front, self.drl, self.rear)
    }
}

impl LampDriver for MockLampDriver {
    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), LampError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LampError::WriteFailed);
        }

        match lamp {
            Lamp::Front => self.front = on,
            Lamp::Drl => self.drl = on,
            Lamp::Rear => self.rear = on,
        }
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// Mock Store
// ============================================================================

/// RAM-Speicher mit Fehler-Injektion und Zählern
#[derive(Default)]
pub struct MockStore {
    pub inner: MemoryStore<4>,
    pub read_count: usize,
    pub write_count: usize,
    pub fail_reads: Option<StoreError>,
    pub fail_writes: Option<StoreError>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Speicher mit einem vorhandenen Datensatz
    pub fn with_record(key: &str, data: &[u8]) -> Self {
        let mut store = Self::new();
        store.inner.write(key, data).unwrap();
        store
    }

    /// Gespeicherter Datensatz als Text
    pub fn record(&self, key: &str) -> Option<String> {
        self.inner
            .get(key)
            .map(|data| String::from_utf8(data.to_vec()).unwrap())
    }
}

impl ConfigStore for MockStore {
    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.read_count += 1;
        if let Some(e) = self.fail_reads {
            return Err(e);
        }
        self.inner.read(key, buf)
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        if let Some(e) = self.fail_writes {
            return Err(e);
        }
        self.write_count += 1;
        self.inner.write(key, data)
    }
}

// ============================================================================
// Mock Flash
// ============================================================================

pub const FLASH_SIZE: usize = 64 * 1024;
pub const FLASH_SECTOR: u32 = 4096;

/// NOR-Flash im RAM
///
/// Schreiben kann nur Bits löschen (wie echter NOR-Flash). Mit
/// `cut_power_after` schlagen alle Operationen nach der angegebenen Anzahl
/// erfolgreicher Erase/Write-Aufrufe fehl.
pub struct MockFlash {
    pub data: Vec<u8>,
    pub erase_count: usize,
    pub write_count: usize,
    pub cut_power_after: Option<usize>,
    pub unavailable: bool,
}

impl MockFlash {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; FLASH_SIZE],
            erase_count: 0,
            write_count: 0,
            cut_power_after: None,
            unavailable: false,
        }
    }

    /// Stromausfall nach `ops` Erase/Write-Aufrufen
    pub fn simulate_power_loss(&mut self, ops: usize) {
        self.cut_power_after = Some(ops);
    }

    /// Neustart: Strom wieder da
    pub fn restore_power(&mut self) {
        self.cut_power_after = None;
    }

    pub fn inject_corruption(&mut self, offset: u32, len: usize) {
        let start = offset as usize;
        self.data[start..start + len].fill(0xAA);
    }

    fn consume_op(&mut self) -> Result<(), NorFlashErrorKind> {
        if self.unavailable {
            return Err(NorFlashErrorKind::Other);
        }
        match self.cut_power_after {
            Some(0) => Err(NorFlashErrorKind::Other),
            Some(remaining) => {
                self.cut_power_after = Some(remaining - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl ErrorType for MockFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for MockFlash {
    const READ_SIZE: usize = 4;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        if self.unavailable {
            return Err(NorFlashErrorKind::Other);
        }
        let start = offset as usize;
        if start % Self::READ_SIZE != 0 || bytes.len() % Self::READ_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        let source = self
            .data
            .get(start..start + bytes.len())
            .ok_or(NorFlashErrorKind::OutOfBounds)?;
        bytes.copy_from_slice(source);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl NorFlash for MockFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = FLASH_SECTOR as usize;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from % FLASH_SECTOR != 0 || to % FLASH_SECTOR != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        if to as usize > self.data.len() || from > to {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        self.consume_op()?;
        self.data[from as usize..to as usize].fill(0xFF);
        self.erase_count += 1;
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        if start % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        if start + bytes.len() > self.data.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        self.consume_op()?;
        for (cell, byte) in self.data[start..start + bytes.len()].iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        self.write_count += 1;
        Ok(())
    }
}
