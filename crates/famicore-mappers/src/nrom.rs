//! Mapper 0: NROM.
//!
//! No banking at all. 16 KiB boards mirror their single PRG bank across
//! `$C000-$FFFF`; 32 KiB boards map straight through. CHR is a fixed 8 KiB
//! of ROM or RAM, and the board may carry PRG-RAM at `$6000-$7FFF`
//! (nestest stores its result codes there).

use crate::rom::{CHR_BANK_SIZE, PRG_BANK_SIZE};
use crate::{Mapper, Mirroring, Rom, RomError};

/// NROM board.
pub struct Nrom {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_writable: bool,
    mirroring: Mirroring,
}

impl Nrom {
    /// Builds the board from a parsed ROM.
    ///
    /// # Errors
    ///
    /// [`RomError::InvalidPrgSize`] unless PRG-ROM is 16 or 32 KiB;
    /// [`RomError::InvalidChrSize`] unless CHR-ROM is 8 KiB (or absent,
    /// which selects 8 KiB of CHR-RAM).
    pub fn new(rom: &Rom) -> Result<Self, RomError> {
        if rom.prg_rom.len() != PRG_BANK_SIZE && rom.prg_rom.len() != 2 * PRG_BANK_SIZE {
            return Err(RomError::InvalidPrgSize(rom.prg_rom.len()));
        }
        let chr_writable = rom.chr_rom.is_empty();
        if !chr_writable && rom.chr_rom.len() != CHR_BANK_SIZE {
            return Err(RomError::InvalidChrSize(rom.chr_rom.len()));
        }

        Ok(Self {
            prg_rom: rom.prg_rom.clone(),
            prg_ram: vec![0; rom.header.prg_ram_size],
            chr: if chr_writable {
                vec![0; CHR_BANK_SIZE]
            } else {
                rom.chr_rom.clone()
            },
            chr_writable,
            mirroring: rom.header.mirroring,
        })
    }
}

impl Mapper for Nrom {
    fn read_prg(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                let offset = (addr as usize - 0x6000) % self.prg_ram.len();
                self.prg_ram[offset]
            }
            0x8000..=0xFFFF => {
                // A single 16 KiB bank appears twice.
                let offset = (addr as usize - 0x8000) % self.prg_rom.len();
                self.prg_rom[offset]
            }
            _ => 0,
        }
    }

    fn write_prg(&mut self, addr: u16, value: u8) {
        if let 0x6000..=0x7FFF = addr {
            let offset = (addr as usize - 0x6000) % self.prg_ram.len();
            self.prg_ram[offset] = value;
        }
        // ROM-space writes have nowhere to go on NROM.
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
        0
    }

    fn name(&self) -> &'static str {
        "NROM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::RomHeader;

    fn rom_with(prg: Vec<u8>, chr: Vec<u8>) -> Rom {
        Rom {
            header: RomHeader {
                prg_rom_size: prg.len(),
                chr_rom_size: chr.len(),
                prg_ram_size: 8 * 1024,
                mapper: 0,
                mirroring: Mirroring::Horizontal,
                has_battery: false,
                has_trainer: false,
            },
            prg_rom: prg,
            chr_rom: chr,
        }
    }

    #[test]
    fn sixteen_k_prg_mirrors_high_half() {
        let mut prg = vec![0; PRG_BANK_SIZE];
        prg[0x0000] = 0x11;
        prg[0x3FFF] = 0x22;
        let mapper = Nrom::new(&rom_with(prg, vec![0; CHR_BANK_SIZE])).unwrap();

        assert_eq!(mapper.read_prg(0x8000), 0x11);
        assert_eq!(mapper.read_prg(0xBFFF), 0x22);
        assert_eq!(mapper.read_prg(0xC000), 0x11);
        assert_eq!(mapper.read_prg(0xFFFF), 0x22);
    }

    #[test]
    fn thirty_two_k_prg_maps_straight_through() {
        let mut prg = vec![0; 2 * PRG_BANK_SIZE];
        prg[0x0000] = 0x11;
        prg[0x7FFF] = 0x22;
        let mapper = Nrom::new(&rom_with(prg, vec![0; CHR_BANK_SIZE])).unwrap();

        assert_eq!(mapper.read_prg(0x8000), 0x11);
        assert_eq!(mapper.read_prg(0xFFFF), 0x22);
    }

    #[test]
    fn rom_space_writes_are_ignored() {
        let mut prg = vec![0; PRG_BANK_SIZE];
        prg[0] = 0x77;
        let mut mapper = Nrom::new(&rom_with(prg, vec![0; CHR_BANK_SIZE])).unwrap();

        mapper.write_prg(0x8000, 0x00);
        assert_eq!(mapper.read_prg(0x8000), 0x77);
    }

    #[test]
    fn prg_ram_round_trips() {
        let mut mapper =
            Nrom::new(&rom_with(vec![0; PRG_BANK_SIZE], vec![0; CHR_BANK_SIZE])).unwrap();

        mapper.write_prg(0x6000, 0x5A);
        mapper.write_prg(0x7FFF, 0xA5);
        assert_eq!(mapper.read_prg(0x6000), 0x5A);
        assert_eq!(mapper.read_prg(0x7FFF), 0xA5);
    }

    #[test]
    fn chr_rom_is_read_only() {
        let mut chr = vec![0; CHR_BANK_SIZE];
        chr[0x100] = 0x42;
        let mut mapper = Nrom::new(&rom_with(vec![0; PRG_BANK_SIZE], chr)).unwrap();

        mapper.write_chr(0x0100, 0x00);
        assert_eq!(mapper.read_chr(0x0100), 0x42);
    }

    #[test]
    fn chr_ram_is_writable() {
        let mut mapper = Nrom::new(&rom_with(vec![0; PRG_BANK_SIZE], Vec::new())).unwrap();

        mapper.write_chr(0x1FFF, 0x99);
        assert_eq!(mapper.read_chr(0x1FFF), 0x99);
    }

    #[test]
    fn rejects_odd_prg_sizes() {
        let rom = rom_with(vec![0; 8 * 1024], vec![0; CHR_BANK_SIZE]);
        assert!(matches!(
            Nrom::new(&rom),
            Err(RomError::InvalidPrgSize(8192))
        ));
    }

    #[test]
    fn rejects_oversized_chr() {
        let rom = rom_with(vec![0; PRG_BANK_SIZE], vec![0; 2 * CHR_BANK_SIZE]);
        assert!(matches!(Nrom::new(&rom), Err(RomError::InvalidChrSize(_))));
    }
}
