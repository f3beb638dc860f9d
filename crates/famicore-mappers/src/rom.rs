//! iNES ROM image parsing.
//!
//! Layout: 16-byte header (`NES\x1A`, PRG units of 16 KiB, CHR units of
//! 8 KiB, flag bytes), an optional 512-byte trainer, then the PRG-ROM and
//! CHR-ROM bodies. A CHR size of zero means the board carries 8 KiB of
//! CHR-RAM instead of ROM.

use crate::Mirroring;

/// 16 KiB, the PRG-ROM unit size.
pub const PRG_BANK_SIZE: usize = 16 * 1024;
/// 8 KiB, the CHR unit size.
pub const CHR_BANK_SIZE: usize = 8 * 1024;
/// 8 KiB, the PRG-RAM unit size.
pub const PRG_RAM_UNIT: usize = 8 * 1024;

/// Errors raised while parsing a ROM image or building its mapper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RomError {
    /// The image is smaller than a header (or the header promises more
    /// data than the file contains).
    #[error("ROM image too small: {0} bytes")]
    FileTooSmall(usize),

    /// The magic bytes are not `NES\x1A`.
    #[error("invalid iNES magic: {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// The PRG-ROM size is unusable (zero, or not what the mapper needs).
    #[error("invalid PRG-ROM size: {0} bytes")]
    InvalidPrgSize(usize),

    /// The CHR size is unusable for the selected mapper.
    #[error("invalid CHR size: {0} bytes")]
    InvalidChrSize(usize),

    /// The body does not match the sizes the header declares.
    #[error("ROM body mismatch: header implies {expected} bytes, image has {actual}")]
    SizeMismatch {
        /// Bytes the header accounts for.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// The header names a mapper this crate does not implement.
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
}

/// Parsed iNES header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomHeader {
    /// PRG-ROM size in bytes.
    pub prg_rom_size: usize,
    /// CHR-ROM size in bytes; 0 means 8 KiB of CHR-RAM.
    pub chr_rom_size: usize,
    /// PRG-RAM size in bytes (byte 8; 0 reads as one 8 KiB unit).
    pub prg_ram_size: usize,
    /// Mapper id from the two flag nibbles.
    pub mapper: u8,
    /// Nametable mirroring from flag bit 0.
    pub mirroring: Mirroring,
    /// Battery-backed PRG-RAM flag.
    pub has_battery: bool,
    /// 512-byte trainer before the PRG body.
    pub has_trainer: bool,
}

impl RomHeader {
    const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

    /// Parses the 16-byte header.
    ///
    /// # Errors
    ///
    /// [`RomError::FileTooSmall`] for short input, [`RomError::InvalidMagic`]
    /// when the magic bytes are wrong, [`RomError::InvalidPrgSize`] when the
    /// header declares no PRG-ROM at all.
    pub fn parse(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < 16 {
            return Err(RomError::FileTooSmall(data.len()));
        }
        let magic = [data[0], data[1], data[2], data[3]];
        if magic != Self::MAGIC {
            return Err(RomError::InvalidMagic(magic));
        }

        let prg_rom_size = data[4] as usize * PRG_BANK_SIZE;
        if prg_rom_size == 0 {
            return Err(RomError::InvalidPrgSize(0));
        }
        let chr_rom_size = data[5] as usize * CHR_BANK_SIZE;

        let flags6 = data[6];
        let flags7 = data[7];
        let mapper = (flags7 & 0xF0) | (flags6 >> 4);
        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let prg_ram_units = if data[8] == 0 { 1 } else { data[8] as usize };

        Ok(Self {
            prg_rom_size,
            chr_rom_size,
            prg_ram_size: prg_ram_units * PRG_RAM_UNIT,
            mapper,
            mirroring,
            has_battery: flags6 & 0x02 != 0,
            has_trainer: flags6 & 0x04 != 0,
        })
    }
}

/// A parsed cartridge image.
#[derive(Debug, Clone)]
pub struct Rom {
    /// Header fields.
    pub header: RomHeader,
    /// PRG-ROM body.
    pub prg_rom: Vec<u8>,
    /// CHR-ROM body; empty when the board uses CHR-RAM.
    pub chr_rom: Vec<u8>,
}

impl Rom {
    /// Parses a complete iNES image.
    ///
    /// # Errors
    ///
    /// Header errors from [`RomHeader::parse`], plus
    /// [`RomError::SizeMismatch`] when the body is shorter than the header
    /// declares.
    pub fn load(data: &[u8]) -> Result<Self, RomError> {
        let header = RomHeader::parse(data)?;

        let mut offset = 16;
        if header.has_trainer {
            offset += 512;
        }

        let expected = offset + header.prg_rom_size + header.chr_rom_size;
        if data.len() < expected {
            return Err(RomError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let prg_rom = data[offset..offset + header.prg_rom_size].to_vec();
        offset += header.prg_rom_size;
        let chr_rom = data[offset..offset + header.chr_rom_size].to_vec();

        log::info!(
            "loaded iNES image: mapper {}, {} KiB PRG, {} KiB CHR{}",
            header.mapper,
            header.prg_rom_size / 1024,
            header.chr_rom_size / 1024,
            if header.chr_rom_size == 0 { " (CHR-RAM)" } else { "" },
        );

        Ok(Self {
            header,
            prg_rom,
            chr_rom,
        })
    }
}
