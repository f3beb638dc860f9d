//! iNES ROM parsing and cartridge mapper implementations.
//!
//! The mapper decides how the cartridge's PRG and CHR bytes appear in the
//! CPU and PPU address spaces, including bank switching and nametable
//! mirroring. Boards implemented here:
//!
//! | Mapper | Board | Banking |
//! |--------|-------|---------|
//! | 0 | NROM | none (16 KiB PRG mirrored) |
//! | 2 | UxROM | switchable low PRG bank, fixed last bank |
//! | 3 | CNROM | switchable 8 KiB CHR bank |
//!
//! # Example
//!
//! ```no_run
//! use famicore_mappers::{create_mapper, Rom};
//!
//! let image = std::fs::read("game.nes").expect("read ROM file");
//! let rom = Rom::load(&image)?;
//! let mapper = create_mapper(&rom)?;
//! let reset_lo = mapper.read_prg(0xFFFC);
//! # Ok::<(), famicore_mappers::RomError>(())
//! ```

#![warn(missing_docs)]

mod cnrom;
mod mapper;
mod mirroring;
mod nrom;
mod rom;
mod uxrom;

pub use cnrom::Cnrom;
pub use mapper::Mapper;
pub use mirroring::Mirroring;
pub use nrom::Nrom;
pub use rom::{Rom, RomError, RomHeader, CHR_BANK_SIZE, PRG_BANK_SIZE};
pub use uxrom::Uxrom;

/// Builds the mapper named by the ROM header.
///
/// # Errors
///
/// [`RomError::UnsupportedMapper`] for ids this crate does not implement,
/// plus the size errors of the individual boards.
pub fn create_mapper(rom: &Rom) -> Result<Box<dyn Mapper>, RomError> {
    let mapper: Box<dyn Mapper> = match rom.header.mapper {
        0 => Box::new(Nrom::new(rom)?),
        2 => Box::new(Uxrom::new(rom)?),
        3 => Box::new(Cnrom::new(rom)?),
        id => {
            log::warn!("unsupported mapper {id}");
            return Err(RomError::UnsupportedMapper(id));
        }
    };
    log::info!("mapper {} ({})", mapper.id(), mapper.name());
    Ok(mapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(prg_banks: u8, chr_banks: u8, mapper: u8) -> Vec<u8> {
        let mut data = vec![
            0x4E,
            0x45,
            0x53,
            0x1A,
            prg_banks,
            chr_banks,
            (mapper & 0x0F) << 4,
            mapper & 0xF0,
        ];
        data.extend_from_slice(&[0; 8]);
        data.extend(std::iter::repeat(0).take(prg_banks as usize * PRG_BANK_SIZE));
        data.extend(std::iter::repeat(0).take(chr_banks as usize * CHR_BANK_SIZE));
        data
    }

    #[test]
    fn creates_supported_mappers() {
        for (id, chr_banks, name) in [(0u8, 1u8, "NROM"), (2, 0, "UxROM"), (3, 1, "CNROM")] {
            let rom = Rom::load(&image(2, chr_banks, id)).unwrap();
            let mapper = create_mapper(&rom).unwrap();
            assert_eq!(mapper.id(), id);
            assert_eq!(mapper.name(), name);
        }
    }

    #[test]
    fn rejects_unsupported_mappers() {
        let rom = Rom::load(&image(2, 1, 7)).unwrap();
        assert!(matches!(
            create_mapper(&rom),
            Err(RomError::UnsupportedMapper(7))
        ));
    }
}
