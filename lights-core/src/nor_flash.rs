//! `ConfigStore` auf NOR-Flash (embedded-storage)
//!
//! Zwei Bänke (A/B) pro Schlüssel, jede Bank ganze Erase-Sektoren, ab
//! `base_offset` hintereinander:
//!
//! ```text
//! +--------+--------+--------+--------+----------------------------+
//! | magic  |  len   |  seq   | crc32  | payload (auf WRITE_SIZE)   |
//! | u16 LE | u16 LE | u32 LE | u32 LE |                            |
//! +--------+--------+--------+--------+----------------------------+
//! ```
//!
//! Geschrieben wird immer in die Bank, die gerade nicht aktiv ist:
//! Erase, Payload, Header. Gelesen wird die gültige Bank mit der höchsten
//! Sequenznummer. Ein Stromausfall mitten im Schreiben lässt die alte Bank
//! unberührt, der Schlüssel liefert danach den vorherigen Datensatz.

use crc::{CRC_32_ISO_HDLC, Crc};
use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};

use crate::storage::{LIGHT_CONFIG_KEY, ODOMETER_KEY, RECORD_BUFFER_SIZE};
use crate::traits::{ConfigStore, StoreError};

/// Kennung eines gültigen Datensatz-Headers
pub const RECORD_MAGIC: u16 = 0x4C47;
/// Header: magic + len + seq + crc32
pub const HEADER_SIZE: usize = 12;
/// Bänke pro Schlüssel
pub const BANKS: u32 = 2;

/// Schlüssel in Slot-Reihenfolge
pub const SLOT_KEYS: [&str; 2] = [LIGHT_CONFIG_KEY, ODOMETER_KEY];

const ERASED_HEADER: [u8; HEADER_SIZE] = [0xFF; HEADER_SIZE];

/// CRC32 (ISO HDLC) über len, seq und Payload
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

fn record_crc(len: u16, seq: u32, payload: &[u8]) -> u32 {
    let mut digest = CRC32.digest();
    digest.update(&len.to_le_bytes());
    digest.update(&seq.to_le_bytes());
    digest.update(payload);
    digest.finalize()
}

/// `seq` ist neuer als `than`, auch über den Überlauf hinweg
fn is_newer(seq: u32, than: u32) -> bool {
    (seq.wrapping_sub(than) as i32) > 0
}

/// Gültiger Header einer Bank
#[derive(Debug, Clone, Copy)]
struct BankHeader {
    len: usize,
    seq: u32,
}

/// Aktive Bank eines Schlüssels
#[derive(Debug, Clone, Copy)]
struct ActiveBank {
    bank: u32,
    header: BankHeader,
}

/// Datensatz-Speicher auf einer Flash-Region
///
/// `WRITE_SIZE` und `READ_SIZE` des Flash müssen 4 teilen.
pub struct NorFlashStore<F> {
    flash: F,
    base_offset: u32,
}

impl<F: NorFlash> NorFlashStore<F> {
    /// `base_offset` muss auf `ERASE_SIZE` ausgerichtet sein
    pub fn new(flash: F, base_offset: u32) -> Self {
        Self { flash, base_offset }
    }

    /// Größe einer Bank: ganze Sektoren, groß genug für Header + Datensatz
    pub const fn slot_size() -> u32 {
        let needed = (HEADER_SIZE + RECORD_BUFFER_SIZE) as u32;
        let sector = F::ERASE_SIZE as u32;
        needed.div_ceil(sector) * sector
    }

    /// Benötigte Größe der Flash-Region
    pub const fn region_size() -> u32 {
        Self::slot_size() * BANKS * SLOT_KEYS.len() as u32
    }

    /// Offset von Bank `bank` des Schlüssels `key`
    pub fn bank_offset(&self, key: &str, bank: u32) -> Result<u32, StoreError> {
        let index = SLOT_KEYS
            .iter()
            .position(|slot| *slot == key)
            .ok_or(StoreError::StorageUnavailable)?;
        Ok(self.base_offset + (index as u32 * BANKS + bank) * Self::slot_size())
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn release(self) -> F {
        self.flash
    }

    /// Liest Header und Payload einer Bank in `scratch` und prüft die CRC
    fn read_bank(
        &mut self,
        offset: u32,
        scratch: &mut [u8; RECORD_BUFFER_SIZE],
    ) -> Result<BankHeader, StoreError> {
        let mut header = [0u8; HEADER_SIZE];
        self.flash
            .read(offset, &mut header)
            .map_err(|_| StoreError::StorageUnavailable)?;

        if header == ERASED_HEADER {
            return Err(StoreError::Missing);
        }

        let magic = u16::from_le_bytes([header[0], header[1]]);
        let len = u16::from_le_bytes([header[2], header[3]]);
        let seq = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let crc = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        let size = len as usize;
        if magic != RECORD_MAGIC || size == 0 || size > RECORD_BUFFER_SIZE {
            return Err(StoreError::CorruptRecord);
        }

        let padded = size.next_multiple_of(F::READ_SIZE);
        let target = scratch
            .get_mut(..padded)
            .ok_or(StoreError::CorruptRecord)?;
        self.flash
            .read(offset + HEADER_SIZE as u32, target)
            .map_err(|_| StoreError::StorageUnavailable)?;

        if record_crc(len, seq, &scratch[..size]) != crc {
            return Err(StoreError::CorruptRecord);
        }

        Ok(BankHeader { len: size, seq })
    }

    /// Sucht die neueste gültige Bank und lässt ihre Payload in `scratch`
    ///
    /// Ohne gültige Bank: `CorruptRecord` wenn eine Bank beschädigt ist,
    /// sonst `Missing`.
    fn load_active(
        &mut self,
        key: &str,
        scratch: &mut [u8; RECORD_BUFFER_SIZE],
    ) -> Result<ActiveBank, StoreError> {
        let mut active: Option<ActiveBank> = None;
        let mut corrupt = false;

        for bank in 0..BANKS {
            let offset = self.bank_offset(key, bank)?;
            match self.read_bank(offset, scratch) {
                Ok(header) => {
                    if active.is_none_or(|current| is_newer(header.seq, current.header.seq)) {
                        active = Some(ActiveBank { bank, header });
                    }
                }
                Err(StoreError::Missing) => {}
                Err(StoreError::CorruptRecord) => {
                    warn!("Flash: {} bank {} corrupt", key, bank);
                    corrupt = true;
                }
                Err(e) => return Err(e),
            }
        }

        let active = match active {
            Some(active) => active,
            None if corrupt => return Err(StoreError::CorruptRecord),
            None => return Err(StoreError::Missing),
        };

        // `scratch` hält die zuletzt gelesene Bank
        if active.bank + 1 != BANKS {
            let offset = self.bank_offset(key, active.bank)?;
            self.read_bank(offset, scratch)?;
        }
        Ok(active)
    }
}

impl<F: NorFlash> ConfigStore for NorFlashStore<F> {
    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        let mut scratch = [0u8; RECORD_BUFFER_SIZE];
        let len = self.load_active(key, &mut scratch)?.header.len;

        let target = buf.get_mut(..len).ok_or(StoreError::CorruptRecord)?;
        target.copy_from_slice(&scratch[..len]);
        Ok(len)
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        // Unbekannter Schlüssel vor der Längenprüfung
        self.bank_offset(key, 0)?;
        if data.is_empty() || data.len() > RECORD_BUFFER_SIZE {
            return Err(StoreError::PartialWrite);
        }

        let mut scratch = [0u8; RECORD_BUFFER_SIZE];
        let (bank, seq) = match self.load_active(key, &mut scratch) {
            Ok(active) if &scratch[..active.header.len] == data => {
                debug!("Flash: {} unchanged", key);
                return Ok(());
            }
            Ok(active) => ((active.bank + 1) % BANKS, active.header.seq.wrapping_add(1)),
            Err(StoreError::Missing) | Err(StoreError::CorruptRecord) => (0, 1),
            Err(e) => return Err(e),
        };

        let offset = self.bank_offset(key, bank)?;
        self.flash
            .erase(offset, offset + Self::slot_size())
            .map_err(|_| StoreError::StorageUnavailable)?;

        // Payload mit 0xFF auf WRITE_SIZE auffüllen
        let padded = data.len().next_multiple_of(F::WRITE_SIZE);
        let mut payload = [0xFFu8; RECORD_BUFFER_SIZE];
        payload[..data.len()].copy_from_slice(data);
        let payload = payload.get(..padded).ok_or(StoreError::PartialWrite)?;
        self.flash
            .write(offset + HEADER_SIZE as u32, payload)
            .map_err(|_| StoreError::StorageUnavailable)?;

        let len = data.len() as u16;
        let mut header = [0u8; HEADER_SIZE];
        header[..2].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        header[2..4].copy_from_slice(&len.to_le_bytes());
        header[4..8].copy_from_slice(&seq.to_le_bytes());
        header[8..].copy_from_slice(&record_crc(len, seq, data).to_le_bytes());
        self.flash
            .write(offset, &header)
            .map_err(|_| StoreError::StorageUnavailable)?;

        debug!("Flash: {} written to bank {} (seq {}, {} bytes)", key, bank, seq, data.len());
        Ok(())
    }
}
