//! Mapper 3: CNROM.
//!
//! Fixed PRG-ROM like NROM, but the 8 KiB CHR window is bank-switched by
//! writes to `$8000-$FFFF`.

use crate::rom::{CHR_BANK_SIZE, PRG_BANK_SIZE};
use crate::{Mapper, Mirroring, Rom, RomError};

/// CNROM board.
pub struct Cnrom {
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
    mirroring: Mirroring,
    chr_bank: u8,
    bank_count: usize,
}

impl Cnrom {
    /// Builds the board from a parsed ROM.
    ///
    /// # Errors
    ///
    /// [`RomError::InvalidPrgSize`] unless PRG-ROM is 16 or 32 KiB;
    /// [`RomError::InvalidChrSize`] unless CHR-ROM is a nonzero whole
    /// number of 8 KiB banks.
    pub fn new(rom: &Rom) -> Result<Self, RomError> {
        if rom.prg_rom.len() != PRG_BANK_SIZE && rom.prg_rom.len() != 2 * PRG_BANK_SIZE {
            return Err(RomError::InvalidPrgSize(rom.prg_rom.len()));
        }
        let chr_len = rom.chr_rom.len();
        if chr_len == 0 || chr_len % CHR_BANK_SIZE != 0 {
            return Err(RomError::InvalidChrSize(chr_len));
        }

        Ok(Self {
            prg_rom: rom.prg_rom.clone(),
            chr_rom: rom.chr_rom.clone(),
            mirroring: rom.header.mirroring,
            chr_bank: 0,
            bank_count: chr_len / CHR_BANK_SIZE,
        })
    }
}

impl Mapper for Cnrom {
    fn read_prg(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0xFFFF => {
                let offset = (addr as usize - 0x8000) % self.prg_rom.len();
                self.prg_rom[offset]
            }
            _ => 0,
        }
    }

    fn write_prg(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.chr_bank = value;
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        let bank = self.chr_bank as usize % self.bank_count;
        self.chr_rom[bank * CHR_BANK_SIZE + (addr & 0x1FFF) as usize]
    }

    fn write_chr(&mut self, _addr: u16, _value: u8) {
        // CHR-ROM only.
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn id(&self) -> u8 {
        3
    }

    fn name(&self) -> &'static str {
        "CNROM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::RomHeader;

    fn rom_with_chr_banks(banks: usize) -> Rom {
        let chr: Vec<u8> = (0..banks * CHR_BANK_SIZE)
            .map(|i| (i / CHR_BANK_SIZE) as u8)
            .collect();
        Rom {
            header: RomHeader {
                prg_rom_size: 2 * PRG_BANK_SIZE,
                chr_rom_size: chr.len(),
                prg_ram_size: 8 * 1024,
                mapper: 3,
                mirroring: Mirroring::Horizontal,
                has_battery: false,
                has_trainer: false,
            },
            prg_rom: vec![0; 2 * PRG_BANK_SIZE],
            chr_rom: chr,
        }
    }

    #[test]
    fn chr_bank_switching() {
        let mut mapper = Cnrom::new(&rom_with_chr_banks(4)).unwrap();

        assert_eq!(mapper.read_chr(0x0000), 0);
        mapper.write_prg(0x8000, 2);
        assert_eq!(mapper.read_chr(0x0000), 2);
        assert_eq!(mapper.read_chr(0x1FFF), 2);
    }

    #[test]
    fn bank_select_wraps() {
        let mut mapper = Cnrom::new(&rom_with_chr_banks(2)).unwrap();
        mapper.write_prg(0x8000, 5);
        assert_eq!(mapper.read_chr(0x0000), 1);
    }

    #[test]
    fn chr_writes_are_ignored() {
        let mut mapper = Cnrom::new(&rom_with_chr_banks(2)).unwrap();
        mapper.write_chr(0x0000, 0x77);
        assert_eq!(mapper.read_chr(0x0000), 0);
    }

    #[test]
    fn prg_is_fixed() {
        let mut mapper = Cnrom::new(&rom_with_chr_banks(2)).unwrap();
        mapper.write_prg(0x8000, 1); // selects CHR, not PRG
        assert_eq!(mapper.read_prg(0x8000), 0);
    }

    #[test]
    fn rejects_missing_chr() {
        let mut rom = rom_with_chr_banks(1);
        rom.chr_rom.clear();
        assert!(matches!(Cnrom::new(&rom), Err(RomError::InvalidChrSize(0))));
    }
}
