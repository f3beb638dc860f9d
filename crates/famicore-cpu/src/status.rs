//! Processor status register (P).
//!
//! Bit layout, LSB first:
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! ```
//!
//! `U` (bit 5) reads as 1 whenever P is pushed to the stack. `B` (bit 4)
//! only exists on the stack copy: 1 when pushed by PHP or BRK, 0 when pushed
//! by a hardware interrupt. `D` is a storage bit on the Ricoh 2A03; it has
//! no arithmetic effect.

use bitflags::bitflags;

bitflags! {
    /// CPU status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable. Gates IRQ, never NMI.
        const I = 1 << 2;
        /// Decimal mode. Stored but ignored by the arithmetic unit.
        const D = 1 << 3;
        /// Break. Meaningful only on the stack copy of P.
        const B = 1 << 4;
        /// Unused. Always 1 on the stack copy of P.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative (bit 7 of the last result).
        const N = 1 << 7;
    }
}

impl Status {
    /// Power-on value: `I` and `U` set (`$24`, matching the nestest log).
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Creates the power-on status.
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Updates `Z` and `N` from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// Byte pushed to the stack. `U` is always set; `B` is set for PHP/BRK
    /// pushes and clear for hardware interrupt pushes.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, software_push: bool) -> u8 {
        let byte = self.bits() | Self::U.bits();
        if software_push {
            byte | Self::B.bits()
        } else {
            byte
        }
    }

    /// Status restored from a stack byte (PLP/RTI). `B` is discarded and
    /// `U` forced on.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(byte: u8) -> Self {
        Self::from_bits_truncate((byte & !Self::B.bits()) | Self::U.bits())
    }
}
