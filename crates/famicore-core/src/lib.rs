//! NES system core.
//!
//! Wires the cycle-stepped CPU from `famicore-cpu` and the cartridge
//! mappers from `famicore-mappers` into a console: the mirrored memory
//! map, the PPU and APU register interfaces, controller ports, OAM-DMA
//! and the 12:4 master clock.
//!
//! # Example
//!
//! ```no_run
//! use famicore_core::Console;
//!
//! let image = std::fs::read("game.nes").expect("read ROM file");
//! let mut console = Console::new(&image)?;
//! console.reset()?;
//!
//! loop {
//!     println!("{}", console.trace_line());
//!     console.step()?;
//! }
//! # Ok::<(), famicore_core::ConsoleError>(())
//! ```

#![warn(missing_docs)]

mod apu;
mod bus;
mod console;
mod input;
mod membank;
mod ppu;

pub use apu::Apu;
pub use bus::SystemBus;
pub use console::{Console, ConsoleError, MASTER_PER_CPU, MASTER_PER_PPU};
pub use input::{Button, Controller};
pub use membank::MemBank;
pub use ppu::{
    Ctrl, Ppu, PpuStatus, VideoBus, DOTS_PER_SCANLINE, PRE_RENDER_SCANLINE, SCANLINES_PER_FRAME,
    VBLANK_SCANLINE,
};
