//! The console shell: master clock, CPU/PPU scheduling and OAM-DMA.
//!
//! The NTSC master clock divides by 12 for the CPU and by 4 for the PPU,
//! so every CPU cycle spans three PPU dots. [`Console::tick`] advances one
//! master cycle with the CPU's bus access ordered before the PPU dots of
//! the same cycle, which is the ordering cycle-exact traces compare
//! against.

use crate::bus::SystemBus;
use crate::ppu::Ppu;
use famicore_cpu::{Bus, BusError, Cpu, CpuError, TraceEntry};
use famicore_mappers::{create_mapper, Rom, RomError};

/// Master clock divider for the CPU (NTSC).
pub const MASTER_PER_CPU: u64 = 12;
/// Master clock divider for the PPU (NTSC).
pub const MASTER_PER_PPU: u64 = 4;

/// Errors surfaced by the console. Fatal for the current step; the host
/// decides whether to continue.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// ROM parsing or mapper construction failed; no console state was
    /// touched.
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),

    /// The CPU halted on an unknown opcode or a bus fault.
    #[error("CPU error: {0}")]
    Cpu(#[from] CpuError),

    /// A bus access faulted during OAM DMA.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
}

/// A NES with a cartridge inserted.
pub struct Console {
    cpu: Cpu,
    bus: SystemBus,
    master_cycle: u64,
}

impl Console {
    /// Builds a console around an iNES image.
    ///
    /// The CPU does not start until [`Console::reset`] loads the reset
    /// vector.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Rom`] when the image is malformed or names an
    /// unsupported mapper.
    pub fn new(rom_bytes: &[u8]) -> Result<Self, ConsoleError> {
        let rom = Rom::load(rom_bytes)?;
        let mapper = create_mapper(&rom)?;
        Ok(Self {
            cpu: Cpu::new(),
            bus: SystemBus::new(mapper),
            master_cycle: 0,
        })
    }

    /// Restarts the CPU through the reset vector. RAM, VRAM and mapper
    /// state are preserved. The 7 reset cycles elapse on the master clock,
    /// so the PPU advances 21 dots.
    ///
    /// # Errors
    ///
    /// Propagates bus faults from the vector read.
    pub fn reset(&mut self) -> Result<(), ConsoleError> {
        self.cpu.reset(&mut self.bus)?;
        for _ in 0..7 * MASTER_PER_CPU {
            if self.master_cycle % MASTER_PER_PPU == 0 {
                self.bus.step_ppu();
            }
            self.master_cycle += 1;
        }
        self.cpu.set_nmi_line(self.bus.nmi_level());
        Ok(())
    }

    /// Advances one master cycle: the CPU's bus access (every 12th cycle,
    /// with DMA serviced first) precedes the PPU dot (every 4th cycle),
    /// then the NMI line level propagates to the CPU's edge detector.
    ///
    /// # Errors
    ///
    /// Propagates fatal CPU errors.
    pub fn tick(&mut self) -> Result<(), ConsoleError> {
        if self.master_cycle % MASTER_PER_CPU == 0 {
            self.service_dma()?;
            self.cpu.tick(&mut self.bus)?;
        }
        if self.master_cycle % MASTER_PER_PPU == 0 {
            self.bus.step_ppu();
        }
        self.cpu.set_nmi_line(self.bus.nmi_level());
        self.master_cycle += 1;
        Ok(())
    }

    /// Runs master cycles until the CPU completes an instruction (and any
    /// DMA stall in front of it). Returns the CPU cycles consumed.
    ///
    /// # Errors
    ///
    /// Propagates fatal CPU errors.
    pub fn step(&mut self) -> Result<u32, ConsoleError> {
        let before = self.cpu.cycles();
        loop {
            self.tick()?;
            // Stop on a full master window so the PPU has caught up with
            // the instruction's last CPU cycle.
            if self.cpu.cycles() > before
                && self.cpu.at_instruction_boundary()
                && self.master_cycle % MASTER_PER_CPU == 0
            {
                return Ok((self.cpu.cycles() - before) as u32);
            }
        }
    }

    /// Copies one page into PPU OAM when a `$4014` write is pending, then
    /// stalls the CPU for 513 cycles (514 when the transfer starts on an
    /// odd CPU cycle). No instruction fetch happens during the stall; the
    /// PPU keeps running.
    fn service_dma(&mut self) -> Result<(), ConsoleError> {
        if let Some(page) = self.bus.take_dma_request() {
            let base = u16::from(page) << 8;
            for offset in 0..=255u16 {
                let value = self.bus.read(base | offset)?;
                self.bus.write(0x2004, value)?;
            }
            let stall = if self.cpu.cycles() % 2 == 1 { 514 } else { 513 };
            self.cpu.stall(stall);
            log::debug!("OAM DMA from page ${page:02X}, stalling {stall} cycles");
        }
        Ok(())
    }

    /// Canonical trace line for the next instruction. Uses side-effect-free
    /// peeks only.
    #[must_use]
    pub fn trace_line(&self) -> String {
        TraceEntry::capture(
            &self.cpu,
            &self.bus,
            self.bus.ppu().dot(),
            self.bus.ppu().scanline(),
        )
        .format()
    }

    /// The CPU.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The CPU, mutably (test and debugger hook).
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// The PPU.
    #[must_use]
    pub fn ppu(&self) -> &Ppu {
        self.bus.ppu()
    }

    /// The system bus.
    #[must_use]
    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    /// The system bus, mutably.
    pub fn bus_mut(&mut self) -> &mut SystemBus {
        &mut self.bus
    }

    /// Master cycles elapsed since power-on.
    #[must_use]
    pub fn master_cycle(&self) -> u64 {
        self.master_cycle
    }
}
