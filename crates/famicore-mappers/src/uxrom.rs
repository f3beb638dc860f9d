//! Mapper 2: UxROM.
//!
//! Discrete-logic PRG banking: any write to `$8000-$FFFF` selects the
//! 16 KiB bank visible at `$8000-$BFFF`, while `$C000-$FFFF` is hard-wired
//! to the last bank. CHR is almost always 8 KiB of RAM.

use crate::rom::{CHR_BANK_SIZE, PRG_BANK_SIZE};
use crate::{Mapper, Mirroring, Rom, RomError};

/// UxROM board.
pub struct Uxrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_writable: bool,
    mirroring: Mirroring,
    prg_bank: u8,
    bank_count: usize,
}

impl Uxrom {
    /// Builds the board from a parsed ROM.
    ///
    /// # Errors
    ///
    /// [`RomError::InvalidPrgSize`] unless PRG-ROM is a whole number of
    /// 16 KiB banks with at least two of them.
    pub fn new(rom: &Rom) -> Result<Self, RomError> {
        let len = rom.prg_rom.len();
        if len % PRG_BANK_SIZE != 0 || len < 2 * PRG_BANK_SIZE {
            return Err(RomError::InvalidPrgSize(len));
        }
        let chr_writable = rom.chr_rom.is_empty();

        Ok(Self {
            prg_rom: rom.prg_rom.clone(),
            chr: if chr_writable {
                vec![0; CHR_BANK_SIZE]
            } else {
                rom.chr_rom.clone()
            },
            chr_writable,
            mirroring: rom.header.mirroring,
            prg_bank: 0,
            bank_count: len / PRG_BANK_SIZE,
        })
    }
}

impl Mapper for Uxrom {
    fn read_prg(&self, addr: u16) -> u8 {
        let offset = (addr & 0x3FFF) as usize;
        match addr {
            0x8000..=0xBFFF => {
                let bank = self.prg_bank as usize % self.bank_count;
                self.prg_rom[bank * PRG_BANK_SIZE + offset]
            }
            0xC000..=0xFFFF => {
                let bank = self.bank_count - 1;
                self.prg_rom[bank * PRG_BANK_SIZE + offset]
            }
            _ => 0,
        }
    }

    fn write_prg(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.prg_bank = value;
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr[(addr & 0x1FFF) as usize]
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        if self.chr_writable {
            self.chr[(addr & 0x1FFF) as usize] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn id(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "UxROM"
    }
}
