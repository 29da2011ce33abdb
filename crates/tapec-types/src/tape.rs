//! The tape model every generated program runs against.
//!
//! ```text
//! 0x0000 ──────────── 0x8000 ─────────────────────── 0xFFFE 0xFFFF
//! │   guard region     │   tape: TAPE_LEN cells      │      │ past-end
//! └────────────────────┴─────────────────────────────┴──────┘
//! ```
//!
//! The pointer is a signed 16-bit value and cell addresses are
//! `TAPE_OFFSET + pointer`, so every pointer value lands inside the 64 KiB
//! region. Pointers outside `0..TAPE_LEN` alias the guard bytes instead of
//! faulting; [`BoundsPolicy::Checked`] turns such accesses into run-time
//! errors. All executors (WASM, bytecode VM, reference evaluator) share this
//! layout so that out-of-range programs behave identically everywhere.

use serde::{Deserialize, Serialize};

/// Number of cells on the tape.
pub const TAPE_LEN: usize = 0x7FFF;

/// Byte offset of cell 0 inside the memory region.
pub const TAPE_OFFSET: u32 = 0x8000;

/// Size of the memory region holding the tape and its guard bytes.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Tape pointer; moves wrap at 16 bits.
pub type Pointer = i16;

/// How cell accesses treat a pointer outside `0..TAPE_LEN`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Access whatever byte `TAPE_OFFSET + pointer` addresses.
    #[default]
    Unchecked,
    /// Fail the running program on an out-of-range access.
    Checked,
}

impl BoundsPolicy {
    /// Whether `pointer` may be used to access a cell under this policy.
    pub fn permits(self, pointer: Pointer) -> bool {
        match self {
            Self::Unchecked => true,
            Self::Checked => pointer_in_bounds(pointer),
        }
    }
}

/// `true` when `pointer` indexes a real tape cell.
pub fn pointer_in_bounds(pointer: Pointer) -> bool {
    (0..TAPE_LEN as i32).contains(&i32::from(pointer))
}

/// Byte address of the cell `pointer` refers to.
pub fn cell_address(pointer: Pointer) -> usize {
    (TAPE_OFFSET as i32 + i32::from(pointer)) as usize
}

/// Tape storage plus pointer, as seen by an executing program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Box<[u8]>,
    pointer: Pointer,
}

impl Memory {
    /// Zeroed memory with the pointer at cell 0.
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE].into_boxed_slice(),
            pointer: 0,
        }
    }

    /// Build from a raw 64 KiB memory image (e.g. a WASM linear memory page).
    ///
    /// Returns `None` if `image` is shorter than [`MEMORY_SIZE`].
    pub fn from_image(image: &[u8], pointer: Pointer) -> Option<Self> {
        let bytes = image.get(..MEMORY_SIZE)?.to_vec().into_boxed_slice();
        Some(Self { bytes, pointer })
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Move the pointer by `delta`, wrapping at 16 bits.
    pub fn move_pointer(&mut self, delta: i16) {
        self.pointer = self.pointer.wrapping_add(delta);
    }

    /// Current cell value.
    pub fn cell(&self) -> u8 {
        self.bytes[cell_address(self.pointer)]
    }

    pub fn set_cell(&mut self, value: u8) {
        self.bytes[cell_address(self.pointer)] = value;
    }

    /// Add `delta` to the current cell, wrapping at 8 bits.
    pub fn add_cell(&mut self, delta: i8) {
        let cell = &mut self.bytes[cell_address(self.pointer)];
        *cell = cell.wrapping_add_signed(delta);
    }

    /// The tape cells proper, without guard bytes.
    pub fn tape(&self) -> &[u8] {
        let start = TAPE_OFFSET as usize;
        &self.bytes[start..start + TAPE_LEN]
    }

    /// The full memory region, guard bytes included.
    pub fn image(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pointer_maps_inside_memory() {
        assert_eq!(cell_address(i16::MIN), 0);
        assert_eq!(cell_address(0), TAPE_OFFSET as usize);
        assert_eq!(cell_address(i16::MAX), MEMORY_SIZE - 1);
    }

    #[test]
    fn test_pointer_bounds() {
        assert!(pointer_in_bounds(0));
        assert!(pointer_in_bounds((TAPE_LEN - 1) as i16));
        assert!(!pointer_in_bounds(TAPE_LEN as i16));
        assert!(!pointer_in_bounds(-1));
    }

    #[test]
    fn test_bounds_policy() {
        assert!(BoundsPolicy::Unchecked.permits(-1));
        assert!(!BoundsPolicy::Checked.permits(-1));
        assert!(BoundsPolicy::Checked.permits(5));
        assert_eq!(BoundsPolicy::default(), BoundsPolicy::Unchecked);
    }

    #[test]
    fn test_pointer_wraps_at_16_bits() {
        let mut mem = Memory::new();
        mem.move_pointer(-1);
        assert_eq!(mem.pointer(), -1);
        let mut mem = Memory::from_image(&[0; MEMORY_SIZE], i16::MAX).unwrap();
        mem.move_pointer(1);
        assert_eq!(mem.pointer(), i16::MIN);
    }

    #[test]
    fn test_cell_wraps_at_8_bits() {
        let mut mem = Memory::new();
        mem.add_cell(-1);
        assert_eq!(mem.cell(), 255);
        mem.add_cell(1);
        assert_eq!(mem.cell(), 0);
    }

    #[test]
    fn test_negative_pointer_aliases_guard_region() {
        let mut mem = Memory::new();
        mem.move_pointer(-1);
        mem.set_cell(7);
        assert_eq!(mem.image()[TAPE_OFFSET as usize - 1], 7);
        assert!(mem.tape().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_image_rejects_short_images() {
        assert!(Memory::from_image(&[0; 16], 0).is_none());
    }
}
