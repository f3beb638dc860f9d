//! The system bus: the console's CPU-side and PPU-side memory maps.
//!
//! Address resolution follows the NES map, first match wins:
//!
//! | CPU range | Device |
//! |-----------|--------|
//! | `$0000-$1FFF` | 2 KiB RAM, mirrored |
//! | `$2000-$3FFF` | PPU registers, 8-byte mirror |
//! | `$4014` | OAM-DMA trigger |
//! | `$4016`/`$4017` | Controller ports |
//! | `$4000-$4015` | APU window |
//! | `$4018-$401F` | Disabled (open bus) |
//! | `$4020-$FFFF` | Cartridge mapper |
//!
//! On the PPU side, `$0000-$1FFF` goes to the mapper's CHR view and
//! `$2000-$3EFF` to the console's 2 KiB nametable VRAM through the
//! mapper's mirroring; palette RAM is internal to the PPU.

use crate::apu::Apu;
use crate::input::Controller;
use crate::membank::MemBank;
use crate::ppu::{Ppu, VideoBus};
use famicore_cpu::{Bus, BusError};
use famicore_mappers::{Mapper, Mirroring};

/// PPU-side address resolution borrowed out of the bus for the duration
/// of one register access.
struct VideoMemory<'a> {
    mapper: &'a mut dyn Mapper,
    ciram: &'a mut [u8; 2048],
    mirroring: Mirroring,
}

impl VideoBus for VideoMemory<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.mapper.read_chr(addr),
            0x2000..=0x3EFF => self.ciram[usize::from(self.mirroring.map_address(addr))],
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.mapper.write_chr(addr, value),
            0x2000..=0x3EFF => {
                self.ciram[usize::from(self.mirroring.map_address(addr))] = value;
            }
            _ => {}
        }
    }
}

/// Everything the CPU can reach, plus the PPU and its memory.
pub struct SystemBus {
    ram: MemBank,
    ciram: [u8; 2048],
    ppu: Ppu,
    apu: Apu,
    controller1: Controller,
    controller2: Controller,
    mapper: Box<dyn Mapper>,
    /// Page latched by a `$4014` write, consumed by the console.
    dma_page: Option<u8>,
    /// Last byte seen on the data bus, read back from disabled regions.
    open_bus: u8,
}

impl SystemBus {
    /// Wires the bus around a cartridge mapper.
    #[must_use]
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        Self {
            ram: MemBank::new(0x0000, 0x1FFF, 0x800),
            ciram: [0; 2048],
            ppu: Ppu::new(),
            apu: Apu::new(),
            controller1: Controller::new(),
            controller2: Controller::new(),
            mapper,
            dma_page: None,
            open_bus: 0,
        }
    }

    /// The PPU.
    #[must_use]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// The PPU, mutably.
    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    /// Controller in port 1.
    pub fn controller1_mut(&mut self) -> &mut Controller {
        &mut self.controller1
    }

    /// Controller in port 2.
    pub fn controller2_mut(&mut self) -> &mut Controller {
        &mut self.controller2
    }

    /// The cartridge mapper.
    #[must_use]
    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    /// Advances the PPU by one dot.
    pub fn step_ppu(&mut self) {
        self.ppu.step();
    }

    /// Level of the PPU's NMI output.
    #[must_use]
    pub fn nmi_level(&self) -> bool {
        self.ppu.nmi_level()
    }

    /// Takes a pending OAM-DMA request, if a `$4014` write latched one.
    pub fn take_dma_request(&mut self) -> Option<u8> {
        self.dma_page.take()
    }

    /// Whether a `$4014` write is waiting to be serviced.
    #[must_use]
    pub fn dma_pending(&self) -> bool {
        self.dma_page.is_some()
    }

    fn ppu_register_read(&mut self, addr: u16) -> u8 {
        let mut video = VideoMemory {
            mirroring: self.mapper.mirroring(),
            mapper: self.mapper.as_mut(),
            ciram: &mut self.ciram,
        };
        self.ppu.read_register(addr, &mut video)
    }

    fn ppu_register_write(&mut self, addr: u16, value: u8) {
        let mut video = VideoMemory {
            mirroring: self.mapper.mirroring(),
            mapper: self.mapper.as_mut(),
            ciram: &mut self.ciram,
        };
        self.ppu.write_register(addr, value, &mut video);
    }
}

impl Bus for SystemBus {
    fn read(&mut self, addr: u16) -> Result<u8, BusError> {
        let value = match addr {
            0x0000..=0x1FFF => self.ram.read(addr)?,
            0x2000..=0x3FFF => self.ppu_register_read(addr),
            // Write-only DMA port.
            0x4014 => self.open_bus,
            0x4016 => self.controller1.read(),
            0x4017 => self.controller2.read(),
            0x4000..=0x4015 => self.apu.read(addr),
            // Disabled test-mode registers.
            0x4018..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
        };
        self.open_bus = value;
        Ok(value)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        self.open_bus = value;
        match addr {
            0x0000..=0x1FFF => self.ram.write(addr, value)?,
            0x2000..=0x3FFF => self.ppu_register_write(addr, value),
            0x4014 => self.dma_page = Some(value),
            0x4016 => {
                // One strobe line feeds both ports.
                self.controller1.write_strobe(value);
                self.controller2.write_strobe(value);
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write(addr, value),
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => self.mapper.write_prg(addr, value),
        }
        Ok(())
    }

    fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram.peek(addr),
            // Real PPU register reads have side effects; the trace must
            // not trigger them.
            0x2000..=0x3FFF => 0,
            0x4014 | 0x4016 | 0x4017 => 0x40,
            0x4000..=0x4015 => self.apu.peek(addr),
            0x4018..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
        }
    }
}
