//! Deleted-icon mask

use super::icons::IconId;

/// Bit set of deleted desktop icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrashMask(u8);

impl TrashMask {
    const VALID: u8 = 0b1_1111;

    /// Mask from persisted bits; unknown bits are dropped
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::VALID)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_deleted(&self, id: IconId) -> bool {
        id.trash_bit().is_some_and(|b| self.0 & (1 << b) != 0)
    }

    /// Mark deleted; returns false for the Trash icon or if already deleted
    pub fn delete(&mut self, id: IconId) -> bool {
        match id.trash_bit() {
            Some(b) if self.0 & (1 << b) == 0 => {
                self.0 |= 1 << b;
                true
            }
            _ => false,
        }
    }

    /// Returns false if the icon was not deleted
    pub fn restore(&mut self, id: IconId) -> bool {
        match id.trash_bit() {
            Some(b) if self.0 & (1 << b) != 0 => {
                self.0 &= !(1 << b);
                true
            }
            _ => false,
        }
    }

    pub fn restore_all(&mut self) {
        self.0 = 0;
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Deleted icons in desktop order
    pub fn deleted(&self) -> impl Iterator<Item = IconId> + '_ {
        IconId::ALL.into_iter().filter(|id| self.is_deleted(*id))
    }
}
