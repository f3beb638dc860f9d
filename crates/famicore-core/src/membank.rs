//! Fixed-range, mirrored byte storage.
//!
//! A bank covers `start..=end` with `size` bytes of backing storage; the
//! range must be a whole multiple of the size, and every access is taken
//! modulo the size. This is how the console's 2 KiB of system RAM fills
//! `$0000-$1FFF`.

use famicore_cpu::BusError;

/// A byte-addressable bank with address mirroring.
#[derive(Debug, Clone)]
pub struct MemBank {
    start: u16,
    end: u16,
    data: Vec<u8>,
}

impl MemBank {
    /// Creates a bank covering `start..=end` backed by `size` bytes.
    ///
    /// # Panics
    ///
    /// Panics unless `size > 0`, `start <= end` and the range is a whole
    /// multiple of `size`. These are construction-time invariants, not
    /// runtime conditions.
    #[must_use]
    pub fn new(start: u16, end: u16, size: usize) -> Self {
        assert!(size > 0, "bank size must be nonzero");
        assert!(start <= end, "bank range is inverted");
        assert_eq!(
            (usize::from(end) - usize::from(start) + 1) % size,
            0,
            "bank range must be a whole multiple of its size"
        );
        Self {
            start,
            end,
            data: vec![0; size],
        }
    }

    /// Whether this bank owns `addr`.
    #[must_use]
    pub fn contains(&self, addr: u16) -> bool {
        (self.start..=self.end).contains(&addr)
    }

    /// Backing storage size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    fn index(&self, addr: u16) -> Result<usize, BusError> {
        if !self.contains(addr) {
            return Err(BusError::AddressOutOfRange(addr));
        }
        Ok(usize::from(addr - self.start) % self.data.len())
    }

    /// Reads one byte, mirroring into the backing storage.
    ///
    /// # Errors
    ///
    /// [`BusError::AddressOutOfRange`] outside `start..=end`; the bus must
    /// not route such accesses here.
    pub fn read(&self, addr: u16) -> Result<u8, BusError> {
        Ok(self.data[self.index(addr)?])
    }

    /// Writes one byte, mirroring into the backing storage.
    ///
    /// # Errors
    ///
    /// [`BusError::AddressOutOfRange`] outside `start..=end`.
    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        let index = self.index(addr)?;
        self.data[index] = value;
        Ok(())
    }

    /// Side-effect-free read; 0 outside the range.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.index(addr).map_or(0, |i| self.data[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mirrors_across_the_declared_range() {
        let mut bank = MemBank::new(0x0000, 0x1FFF, 0x800);

        bank.write(0x0000, 0x42).unwrap();
        assert_eq!(bank.read(0x0000).unwrap(), 0x42);
        assert_eq!(bank.read(0x0800).unwrap(), 0x42);
        assert_eq!(bank.read(0x1000).unwrap(), 0x42);
        assert_eq!(bank.read(0x1800).unwrap(), 0x42);

        bank.write(0x1ABC, 0x99).unwrap();
        assert_eq!(bank.read(0x02BC).unwrap(), 0x99);
    }

    #[test]
    fn rejects_out_of_range_accesses() {
        let mut bank = MemBank::new(0x2000, 0x3FFF, 0x8);
        assert_eq!(bank.read(0x1FFF), Err(BusError::AddressOutOfRange(0x1FFF)));
        assert_eq!(
            bank.write(0x4000, 0),
            Err(BusError::AddressOutOfRange(0x4000))
        );
    }

    #[test]
    fn unmirrored_bank_is_plain_storage() {
        let mut bank = MemBank::new(0x4000, 0x4017, 0x18);
        bank.write(0x4015, 0x1F).unwrap();
        assert_eq!(bank.read(0x4015).unwrap(), 0x1F);
    }

    #[test]
    #[should_panic(expected = "whole multiple")]
    fn rejects_range_not_divisible_by_size() {
        let _ = MemBank::new(0x0000, 0x1000, 0x800);
    }

    #[test]
    #[should_panic(expected = "nonzero")]
    fn rejects_zero_size() {
        let _ = MemBank::new(0x0000, 0x07FF, 0);
    }

    proptest! {
        /// Reads repeat every `size` bytes throughout the range.
        #[test]
        fn reads_repeat_at_every_mirror(
            offset in 0u16..0x800,
            mirror in 0u16..4,
            value in any::<u8>(),
        ) {
            let mut bank = MemBank::new(0x0000, 0x1FFF, 0x800);
            bank.write(offset, value).unwrap();
            let shifted = offset + mirror * 0x800;
            prop_assert_eq!(bank.read(shifted).unwrap(), value);
        }
    }
}
