//! Fixed-capacity display list: an append/read byte arena with LIFO
//! rollback and an explicit transfer lifecycle.
//!
//! Records are stored back to back in bus-aligned slots so the filled
//! region can be written to the hardware verbatim. The append cursor only
//! ever moves forward except through `remove`, which undoes the most recent
//! push — that is what makes failed multi-part appends atomic.

use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Anything that can live in a display list: plain-old-data with a checked
/// byte representation.
pub trait Record: IntoBytes + FromBytes + Immutable + Sized {}

impl<T: IntoBytes + FromBytes + Immutable + Sized> Record for T {}

/// Transfer lifecycle of a list. Role exclusivity between the encoder and
/// the upload scheduler hangs off this state, not off locks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListState {
    /// Writable; owned by the command encoder.
    Free,
    /// Complete frame waiting for the scheduler to pick it up.
    Queued,
    /// Being consumed record-by-record by the upload scheduler.
    Transferring,
}

/// Append failed: not enough space for the record. The list is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ListFull;

/// A byte arena of `SIZE` bytes whose record slots are padded to `ALIGN`.
pub struct DisplayList<const SIZE: usize, const ALIGN: usize> {
    buf: [u8; SIZE],
    write: usize,
    read: usize,
    state: ListState,
}

impl<const SIZE: usize, const ALIGN: usize> DisplayList<SIZE, ALIGN> {
    pub const fn new() -> Self {
        Self {
            buf: [0; SIZE],
            write: 0,
            read: 0,
            state: ListState::Free,
        }
    }

    /// Slot size of a record type: its byte size rounded up to the bus
    /// alignment. Used both to reserve space and to skip records.
    pub const fn record_size<T>() -> usize {
        (core::mem::size_of::<T>() + ALIGN - 1) / ALIGN * ALIGN
    }

    /// Bytes still available for appends.
    pub fn free_space(&self) -> usize {
        SIZE - self.write
    }

    /// Bytes currently filled (the wire image length).
    pub fn len(&self) -> usize {
        self.write
    }

    pub fn is_empty(&self) -> bool {
        self.write == 0
    }

    /// Append one record. Fails without side effects when the aligned slot
    /// does not fit; slot padding bytes are zeroed so the wire image is
    /// deterministic.
    pub fn push<T: Record>(&mut self, value: T) -> Result<(), ListFull> {
        let slot = Self::record_size::<T>();
        if self.free_space() < slot {
            return Err(ListFull);
        }
        self.buf[self.write..self.write + slot].fill(0);
        self.buf[self.write..self.write + core::mem::size_of::<T>()]
            .copy_from_slice(value.as_bytes());
        self.write += slot;
        Ok(())
    }

    /// Undo the most recent `push::<T>`. Strictly LIFO; the caller names
    /// the same type it pushed.
    pub fn remove<T: Record>(&mut self) {
        let slot = Self::record_size::<T>();
        debug_assert!(self.write >= slot);
        self.write = self.write.saturating_sub(slot);
    }

    /// Read the next record and advance the read cursor. `None` once the
    /// cursor has caught up with the append cursor.
    pub fn get_next<T: Record>(&mut self) -> Option<T> {
        let slot = Self::record_size::<T>();
        if self.read + slot > self.write {
            return None;
        }
        let value =
            T::read_from_bytes(&self.buf[self.read..self.read + core::mem::size_of::<T>()]).ok()?;
        self.read += slot;
        Some(value)
    }

    /// True when the read cursor has consumed every appended record.
    pub fn at_end(&self) -> bool {
        self.read >= self.write
    }

    /// Rewind the read cursor to the first record.
    pub fn reset_get(&mut self) {
        self.read = 0;
    }

    /// Discard all contents and return to `Free`.
    pub fn clear(&mut self) {
        self.write = 0;
        self.read = 0;
        self.state = ListState::Free;
    }

    /// Mark the list as a complete frame awaiting transfer.
    pub fn enqueue(&mut self) {
        self.state = ListState::Queued;
    }

    /// Mark the list as being consumed by the upload scheduler.
    pub fn transfer(&mut self) {
        self.state = ListState::Transferring;
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    /// The filled region, ready to go on the bus verbatim.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.write]
    }
}

impl<const SIZE: usize, const ALIGN: usize> Default for DisplayList<SIZE, ALIGN> {
    fn default() -> Self {
        Self::new()
    }
}
