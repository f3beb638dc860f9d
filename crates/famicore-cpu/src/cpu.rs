//! 6502 CPU core.
//!
//! The CPU is stepped one bus cycle at a time. [`Cpu::tick`] performs
//! exactly one bus access: the opcode fetch decodes the instruction and
//! selects a state sequence, and every following tick advances that
//! sequence by one state until the instruction boundary. Cycle counts,
//! dummy reads and dummy writes therefore fall out of the sequences rather
//! than out of a per-opcode cycle table.
//!
//! Timing follows the NESdev wiki. Decimal mode is a storage bit only
//! (Ricoh 2A03).

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::opcodes::{decode, Family, Opcode};
use crate::state::{CycleState, InstructionKind};
use crate::status::Status;
use crate::{vectors, CpuError};

/// Cycle-stepped MOS 6502.
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)] // Interrupt lines are levels, not state
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Program counter.
    pub pc: u16,
    /// Stack pointer into page `$0100-$01FF`.
    pub sp: u8,
    /// Status register.
    pub status: Status,

    /// Total CPU cycles executed (one per bus access).
    cycles: u64,
    /// PC at the most recent opcode fetch.
    start_pc: u16,
    /// Cycle count at the most recent opcode fetch.
    start_cycle: u64,
    /// Most recently fetched opcode; `None` before the first fetch and
    /// during interrupt sequences.
    current: Option<Opcode>,

    /// Level of the NMI input line.
    nmi_line: bool,
    /// Edge latch: set on a low-to-high NMI transition, cleared at service.
    nmi_pending: bool,
    /// Level of the IRQ input line.
    irq_line: bool,
    /// Sticky fatal error; the CPU stays halted once set.
    fault: Option<CpuError>,
    /// Remaining stall cycles (OAM-DMA).
    stall: u16,

    state: CycleState,
    kind: InstructionKind,
    operand_lo: u8,
    operand_hi: u8,
    base_addr: u16,
    effective_addr: u16,
    temp: u8,
    vector: u16,
    /// Selects B=1 on the pushed status (BRK) vs B=0 (NMI/IRQ).
    software_interrupt: bool,
}

impl Cpu {
    /// Creates a CPU in its raw power-on state: `A = X = Y = 0`, `P = $24`.
    /// The mandatory [`Cpu::reset`] drops SP to `$FD` and loads PC from the
    /// reset vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0x00,
            status: Status::new(),
            cycles: 0,
            start_pc: 0,
            start_cycle: 0,
            current: None,
            nmi_line: false,
            nmi_pending: false,
            irq_line: false,
            fault: None,
            stall: 0,
            state: CycleState::FetchOpcode,
            kind: InstructionKind::default(),
            operand_lo: 0,
            operand_hi: 0,
            base_addr: 0,
            effective_addr: 0,
            temp: 0,
            vector: 0,
            software_interrupt: false,
        }
    }

    /// Runs the reset sequence: `SP` drops by 3 without stack writes, `I`
    /// is set, PC is loaded from `$FFFC/$FFFD` and 7 cycles elapse. RAM and
    /// cartridge state are untouched.
    ///
    /// # Errors
    ///
    /// Propagates bus faults from the vector reads.
    pub fn reset(&mut self, bus: &mut impl Bus) -> Result<(), CpuError> {
        self.sp = self.sp.wrapping_sub(3);
        self.status.insert(Status::I);
        self.pc = bus.read_word(vectors::RESET)?;
        self.cycles += 7;
        self.nmi_pending = false;
        self.fault = None;
        self.stall = 0;
        self.current = None;
        self.state = CycleState::FetchOpcode;
        Ok(())
    }

    /// Total cycles executed, including reset and stall cycles.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// PC captured at the most recent opcode fetch.
    #[must_use]
    pub fn start_pc(&self) -> u16 {
        self.start_pc
    }

    /// Cycle count captured at the most recent opcode fetch.
    #[must_use]
    pub fn start_cycle(&self) -> u64 {
        self.start_cycle
    }

    /// The opcode currently executing, if any.
    #[must_use]
    pub fn current_opcode(&self) -> Option<Opcode> {
        self.current
    }

    /// True when the next tick will fetch an opcode.
    #[must_use]
    pub fn at_instruction_boundary(&self) -> bool {
        self.state == CycleState::FetchOpcode && self.stall == 0
    }

    /// Drives the NMI input. The interrupt is edge-triggered: a low-to-high
    /// transition latches a pending NMI which is serviced at the next
    /// instruction boundary.
    pub fn set_nmi_line(&mut self, level: bool) {
        if level && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = level;
    }

    /// Drives the IRQ input. Level-triggered and gated by `I = 0`.
    pub fn set_irq_line(&mut self, level: bool) {
        self.irq_line = level;
    }

    /// Consumes `cycles` without instruction progress (OAM-DMA stall).
    pub fn stall(&mut self, cycles: u16) {
        self.stall += cycles;
    }

    /// Advances the CPU by one bus cycle.
    ///
    /// Returns `true` when the cycle completed an instruction (the next
    /// tick will fetch). Stall cycles consume time without bus access and
    /// return `false`.
    ///
    /// # Errors
    ///
    /// [`CpuError::UnknownOpcode`] when the fetch decodes to
    /// [`Family::Invalid`], and [`CpuError::Bus`] on bus faults. Both halt
    /// the CPU; further ticks return the same error.
    pub fn tick(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if self.stall > 0 {
            self.stall -= 1;
            self.cycles += 1;
            return Ok(false);
        }
        self.cycles += 1;
        match self.dispatch(bus) {
            Ok(done) => Ok(done),
            Err(err) => {
                self.fault = Some(err);
                Err(err)
            }
        }
    }

    /// Runs whole bus cycles until the current instruction (and any pending
    /// stall) completes; returns the number of cycles consumed.
    ///
    /// # Errors
    ///
    /// Propagates the first [`CpuError`] from [`Cpu::tick`].
    pub fn step(&mut self, bus: &mut impl Bus) -> Result<u32, CpuError> {
        let before = self.cycles;
        while !self.tick(bus)? {}
        Ok((self.cycles - before) as u32)
    }

    fn dispatch(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        match self.state {
            CycleState::FetchOpcode => self.fetch_opcode(bus),
            CycleState::FetchOperand => self.fetch_operand(bus),
            CycleState::FetchHigh => self.fetch_high(bus),
            CycleState::ZeroPageIndex => self.zero_page_index(bus),
            CycleState::IndexFixup => self.index_fixup(bus),
            CycleState::PointerLow => self.pointer_low(bus),
            CycleState::PointerHigh => self.pointer_high(bus),
            CycleState::ReadData => self.read_data(bus),
            CycleState::WriteData => self.write_data(bus),
            CycleState::RmwRead => self.rmw_read(bus),
            CycleState::RmwDummyWrite => self.rmw_dummy_write(bus),
            CycleState::RmwWrite => self.rmw_write(bus),
            CycleState::ImpliedExecute => self.implied_execute(bus),
            CycleState::BranchTaken => self.branch_taken(bus),
            CycleState::BranchFixup => self.branch_fixup(bus),
            CycleState::SignatureFetch => self.signature_fetch(bus),
            CycleState::InterruptDummy => self.interrupt_dummy(bus),
            CycleState::PushPch => self.push_pch(bus),
            CycleState::PushPcl => self.push_pcl(bus),
            CycleState::PushStatus => self.push_status(bus),
            CycleState::VectorLow => self.vector_low(bus),
            CycleState::VectorHigh => self.vector_high(bus),
            CycleState::DummyFetch => self.dummy_fetch(bus),
            CycleState::StackSpin => self.stack_spin(bus),
            CycleState::JsrInternal => self.jsr_internal(bus),
            CycleState::JsrHigh => self.jsr_high(bus),
            CycleState::PushValue => self.push_value(bus),
            CycleState::PullValue => self.pull_value(bus),
            CycleState::PullStatus => self.pull_status(bus),
            CycleState::PullPcl => self.pull_pcl(bus),
            CycleState::PullPch => self.pull_pch(bus),
            CycleState::IncrementPc => self.increment_pc(bus),
        }
    }

    // ---- cycle handlers -------------------------------------------------

    fn fetch_opcode(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        // Interrupts are sampled between instructions, before the fetch.
        if self.nmi_pending {
            self.nmi_pending = false;
            self.begin_interrupt(vectors::NMI);
            let _ = bus.read(self.pc)?;
            return Ok(false);
        }
        if self.irq_line && !self.status.contains(Status::I) {
            self.begin_interrupt(vectors::IRQ);
            let _ = bus.read(self.pc)?;
            return Ok(false);
        }

        self.start_pc = self.pc;
        self.start_cycle = self.cycles - 1;

        let byte = bus.read(self.pc)?;
        let opcode = decode(byte);
        if opcode.family == Family::Invalid {
            log::warn!("unknown opcode ${byte:02X} at ${:04X}", self.pc);
            return Err(CpuError::UnknownOpcode { opcode: byte, pc: self.pc });
        }
        self.pc = self.pc.wrapping_add(1);
        self.current = Some(opcode);
        self.kind = InstructionKind::of(opcode);
        self.software_interrupt = false;

        self.state = match self.kind {
            InstructionKind::Implied => CycleState::ImpliedExecute,
            InstructionKind::Break => CycleState::SignatureFetch,
            InstructionKind::ReturnSubroutine
            | InstructionKind::ReturnInterrupt
            | InstructionKind::Push
            | InstructionKind::Pull => CycleState::DummyFetch,
            _ => CycleState::FetchOperand,
        };
        Ok(false)
    }

    fn begin_interrupt(&mut self, vector: u16) {
        self.vector = vector;
        self.software_interrupt = false;
        self.current = None;
        self.kind = InstructionKind::Break;
        self.state = CycleState::InterruptDummy;
    }

    fn fetch_operand(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.operand_lo = bus.read(self.pc)?;
        self.pc = self.pc.wrapping_add(1);

        if self.kind == InstructionKind::JumpSubroutine {
            self.state = CycleState::JsrInternal;
            return Ok(false);
        }

        match self.mode() {
            AddrMode::Imm => {
                // The operand byte is the value; the instruction is done.
                self.effective_addr = self.pc.wrapping_sub(1);
                self.temp = self.operand_lo;
                self.exec_read();
                self.finish();
                return Ok(true);
            }
            AddrMode::Zp0 => {
                self.effective_addr = u16::from(self.operand_lo);
                self.state = self.data_state();
            }
            AddrMode::Zpx | AddrMode::Zpy | AddrMode::Idx => {
                self.base_addr = u16::from(self.operand_lo);
                self.state = CycleState::ZeroPageIndex;
            }
            AddrMode::Idy => {
                self.base_addr = u16::from(self.operand_lo);
                self.state = CycleState::PointerLow;
            }
            AddrMode::Abs | AddrMode::Abx | AddrMode::Aby | AddrMode::Ind => {
                self.state = CycleState::FetchHigh;
            }
            AddrMode::Rel => {
                if self.branch_condition() {
                    self.state = CycleState::BranchTaken;
                } else {
                    self.finish();
                    return Ok(true);
                }
            }
            AddrMode::Imp | AddrMode::Acc => unreachable!("no operand fetch for implied modes"),
        }
        Ok(false)
    }

    fn fetch_high(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.operand_hi = bus.read(self.pc)?;
        self.pc = self.pc.wrapping_add(1);
        let addr = u16::from_le_bytes([self.operand_lo, self.operand_hi]);

        match self.mode() {
            AddrMode::Abs => {
                if self.kind == InstructionKind::JumpAbsolute {
                    self.pc = addr;
                    self.finish();
                    return Ok(true);
                }
                self.effective_addr = addr;
                self.state = self.data_state();
            }
            AddrMode::Abx | AddrMode::Aby => {
                let index = if self.mode() == AddrMode::Abx { self.x } else { self.y };
                self.base_addr = addr;
                self.effective_addr = addr.wrapping_add(u16::from(index));
                self.state = self.indexed_data_state();
            }
            AddrMode::Ind => {
                self.base_addr = addr;
                self.state = CycleState::PointerLow;
            }
            _ => unreachable!("no high operand byte for {:?}", self.mode()),
        }
        Ok(false)
    }

    fn zero_page_index(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        // The base is read (and discarded) while the index is added.
        let _ = bus.read(self.base_addr)?;
        let index = match self.mode() {
            AddrMode::Zpy => self.y,
            _ => self.x,
        };
        let indexed = u16::from((self.base_addr as u8).wrapping_add(index));
        if self.mode() == AddrMode::Idx {
            self.base_addr = indexed;
            self.state = CycleState::PointerLow;
        } else {
            self.effective_addr = indexed;
            self.state = self.data_state();
        }
        Ok(false)
    }

    fn index_fixup(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        // While the carry propagates into the high byte the CPU reads from
        // the not-yet-fixed address.
        let wrong = (self.base_addr & 0xFF00) | (self.effective_addr & 0x00FF);
        let _ = bus.read(wrong)?;
        self.state = self.data_state();
        Ok(false)
    }

    fn pointer_low(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.operand_lo = bus.read(self.base_addr)?;
        self.state = CycleState::PointerHigh;
        Ok(false)
    }

    fn pointer_high(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        match self.mode() {
            AddrMode::Idx | AddrMode::Idy => {
                // Zero-page pointers wrap within the zero page.
                let hi_addr = u16::from((self.base_addr as u8).wrapping_add(1));
                self.operand_hi = bus.read(hi_addr)?;
                let target = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
                if self.mode() == AddrMode::Idx {
                    self.effective_addr = target;
                    self.state = self.data_state();
                } else {
                    self.base_addr = target;
                    self.effective_addr = target.wrapping_add(u16::from(self.y));
                    self.state = self.indexed_data_state();
                }
            }
            AddrMode::Ind => {
                // JMP ($xxFF) fetches the high byte from $xx00.
                let hi_addr =
                    (self.base_addr & 0xFF00) | u16::from((self.base_addr as u8).wrapping_add(1));
                self.operand_hi = bus.read(hi_addr)?;
                self.pc = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
                self.finish();
                return Ok(true);
            }
            _ => unreachable!("no pointer fetch for {:?}", self.mode()),
        }
        Ok(false)
    }

    fn read_data(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.temp = bus.read(self.effective_addr)?;
        self.exec_read();
        self.finish();
        Ok(true)
    }

    fn write_data(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let value = self.write_value();
        bus.write(self.effective_addr, value)?;
        self.finish();
        Ok(true)
    }

    fn rmw_read(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.temp = bus.read(self.effective_addr)?;
        self.state = CycleState::RmwDummyWrite;
        Ok(false)
    }

    fn rmw_dummy_write(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        // The unmodified value goes back first.
        bus.write(self.effective_addr, self.temp)?;
        self.state = CycleState::RmwWrite;
        Ok(false)
    }

    fn rmw_write(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let value = self.exec_rmw();
        bus.write(self.effective_addr, value)?;
        self.finish();
        Ok(true)
    }

    fn implied_execute(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let _ = bus.read(self.pc)?;
        self.exec_implied();
        self.finish();
        Ok(true)
    }

    fn branch_taken(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let _ = bus.read(self.pc)?;
        let old_pc = self.pc;
        let offset = i16::from(self.operand_lo as i8);
        self.pc = self.pc.wrapping_add(offset as u16);
        if (old_pc & 0xFF00) == (self.pc & 0xFF00) {
            self.finish();
            Ok(true)
        } else {
            self.base_addr = old_pc;
            self.state = CycleState::BranchFixup;
            Ok(false)
        }
    }

    fn branch_fixup(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let wrong = (self.base_addr & 0xFF00) | (self.pc & 0x00FF);
        let _ = bus.read(wrong)?;
        self.finish();
        Ok(true)
    }

    fn signature_fetch(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        // BRK skips the byte after the opcode.
        let _ = bus.read(self.pc)?;
        self.pc = self.pc.wrapping_add(1);
        self.vector = vectors::IRQ;
        self.software_interrupt = true;
        self.state = CycleState::PushPch;
        Ok(false)
    }

    fn interrupt_dummy(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let _ = bus.read(self.pc)?;
        self.state = CycleState::PushPch;
        Ok(false)
    }

    fn push_pch(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        bus.write(self.stack_addr(), (self.pc >> 8) as u8)?;
        self.sp = self.sp.wrapping_sub(1);
        self.state = CycleState::PushPcl;
        Ok(false)
    }

    fn push_pcl(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        bus.write(self.stack_addr(), (self.pc & 0xFF) as u8)?;
        self.sp = self.sp.wrapping_sub(1);
        self.state = if self.kind == InstructionKind::JumpSubroutine {
            CycleState::JsrHigh
        } else {
            CycleState::PushStatus
        };
        Ok(false)
    }

    fn push_status(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let byte = self.status.to_stack_byte(self.software_interrupt);
        bus.write(self.stack_addr(), byte)?;
        self.sp = self.sp.wrapping_sub(1);
        self.status.insert(Status::I);
        self.state = CycleState::VectorLow;
        Ok(false)
    }

    fn vector_low(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.operand_lo = bus.read(self.vector)?;
        self.state = CycleState::VectorHigh;
        Ok(false)
    }

    fn vector_high(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.operand_hi = bus.read(self.vector.wrapping_add(1))?;
        self.pc = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
        self.finish();
        Ok(true)
    }

    fn dummy_fetch(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let _ = bus.read(self.pc)?;
        self.state = match self.kind {
            InstructionKind::Push => CycleState::PushValue,
            _ => CycleState::StackSpin,
        };
        Ok(false)
    }

    fn stack_spin(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let _ = bus.read(self.stack_addr())?;
        self.state = match self.kind {
            InstructionKind::Pull => CycleState::PullValue,
            InstructionKind::ReturnInterrupt => CycleState::PullStatus,
            _ => CycleState::PullPcl,
        };
        Ok(false)
    }

    fn jsr_internal(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let _ = bus.read(self.stack_addr())?;
        self.state = CycleState::PushPch;
        Ok(false)
    }

    fn jsr_high(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.operand_hi = bus.read(self.pc)?;
        self.pc = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
        self.finish();
        Ok(true)
    }

    fn push_value(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let value = match self.family() {
            Family::Pha => self.a,
            _ => self.status.to_stack_byte(true), // PHP pushes with B set
        };
        bus.write(self.stack_addr(), value)?;
        self.sp = self.sp.wrapping_sub(1);
        self.finish();
        Ok(true)
    }

    fn pull_value(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.sp = self.sp.wrapping_add(1);
        let value = bus.read(self.stack_addr())?;
        match self.family() {
            Family::Pla => {
                self.a = value;
                self.status.set_zn(self.a);
            }
            _ => self.status = Status::from_stack_byte(value),
        }
        self.finish();
        Ok(true)
    }

    fn pull_status(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.sp = self.sp.wrapping_add(1);
        let value = bus.read(self.stack_addr())?;
        self.status = Status::from_stack_byte(value);
        self.state = CycleState::PullPcl;
        Ok(false)
    }

    fn pull_pcl(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.sp = self.sp.wrapping_add(1);
        self.operand_lo = bus.read(self.stack_addr())?;
        self.state = CycleState::PullPch;
        Ok(false)
    }

    fn pull_pch(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        self.sp = self.sp.wrapping_add(1);
        self.operand_hi = bus.read(self.stack_addr())?;
        self.pc = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
        if self.kind == InstructionKind::ReturnInterrupt {
            self.finish();
            return Ok(true);
        }
        self.state = CycleState::IncrementPc;
        Ok(false)
    }

    fn increment_pc(&mut self, bus: &mut impl Bus) -> Result<bool, CpuError> {
        let _ = bus.read(self.pc)?;
        self.pc = self.pc.wrapping_add(1);
        self.finish();
        Ok(true)
    }

    // ---- helpers --------------------------------------------------------

    fn finish(&mut self) {
        self.state = CycleState::FetchOpcode;
    }

    fn stack_addr(&self) -> u16 {
        0x0100 | u16::from(self.sp)
    }

    fn mode(&self) -> AddrMode {
        self.current.map_or(AddrMode::Imp, |op| op.mode)
    }

    fn family(&self) -> Family {
        self.current.map_or(Family::Nop, |op| op.family)
    }

    /// First data state for the decoded access kind.
    fn data_state(&self) -> CycleState {
        match self.kind {
            InstructionKind::Write => CycleState::WriteData,
            InstructionKind::ReadModifyWrite => CycleState::RmwRead,
            _ => CycleState::ReadData,
        }
    }

    /// Data state for indexed modes: reads skip the fixup cycle unless the
    /// page crossed; writes and read-modify-writes always take it.
    fn indexed_data_state(&self) -> CycleState {
        let crossed = (self.base_addr & 0xFF00) != (self.effective_addr & 0xFF00);
        if self.kind == InstructionKind::Read && !crossed {
            CycleState::ReadData
        } else {
            CycleState::IndexFixup
        }
    }

    fn branch_condition(&self) -> bool {
        match self.family() {
            Family::Bpl => !self.status.contains(Status::N),
            Family::Bmi => self.status.contains(Status::N),
            Family::Bvc => !self.status.contains(Status::V),
            Family::Bvs => self.status.contains(Status::V),
            Family::Bcc => !self.status.contains(Status::C),
            Family::Bcs => self.status.contains(Status::C),
            Family::Bne => !self.status.contains(Status::Z),
            Family::Beq => self.status.contains(Status::Z),
            _ => false,
        }
    }

    /// Executes a read instruction against `self.temp`.
    fn exec_read(&mut self) {
        let value = self.temp;
        match self.family() {
            Family::Lda => {
                self.a = value;
                self.status.set_zn(self.a);
            }
            Family::Ldx => {
                self.x = value;
                self.status.set_zn(self.x);
            }
            Family::Ldy => {
                self.y = value;
                self.status.set_zn(self.y);
            }
            Family::Lax => {
                self.a = value;
                self.x = value;
                self.status.set_zn(value);
            }
            Family::Adc => self.do_adc(value),
            Family::Sbc => self.do_adc(!value),
            Family::And => {
                self.a &= value;
                self.status.set_zn(self.a);
            }
            Family::Ora => {
                self.a |= value;
                self.status.set_zn(self.a);
            }
            Family::Eor => {
                self.a ^= value;
                self.status.set_zn(self.a);
            }
            Family::Cmp => self.do_compare(self.a, value),
            Family::Cpx => self.do_compare(self.x, value),
            Family::Cpy => self.do_compare(self.y, value),
            Family::Bit => {
                self.status.set(Status::Z, self.a & value == 0);
                self.status.set(Status::V, value & 0x40 != 0);
                self.status.set(Status::N, value & 0x80 != 0);
            }
            Family::Nop => {}
            family => debug_assert!(false, "not a read instruction: {family:?}"),
        }
    }

    /// Value stored by a write instruction.
    fn write_value(&self) -> u8 {
        match self.family() {
            Family::Sta => self.a,
            Family::Stx => self.x,
            Family::Sty => self.y,
            _ => self.a & self.x, // SAX
        }
    }

    /// Executes a read-modify-write instruction and returns the new value.
    fn exec_rmw(&mut self) -> u8 {
        let value = self.temp;
        match self.family() {
            Family::Asl => self.do_asl(value),
            Family::Lsr => self.do_lsr(value),
            Family::Rol => self.do_rol(value),
            Family::Ror => self.do_ror(value),
            Family::Inc => {
                let result = value.wrapping_add(1);
                self.status.set_zn(result);
                result
            }
            Family::Dec => {
                let result = value.wrapping_sub(1);
                self.status.set_zn(result);
                result
            }
            Family::Slo => {
                let result = self.do_asl(value);
                self.a |= result;
                self.status.set_zn(self.a);
                result
            }
            Family::Rla => {
                let result = self.do_rol(value);
                self.a &= result;
                self.status.set_zn(self.a);
                result
            }
            Family::Sre => {
                let result = self.do_lsr(value);
                self.a ^= result;
                self.status.set_zn(self.a);
                result
            }
            Family::Rra => {
                let result = self.do_ror(value);
                self.do_adc(result);
                result
            }
            Family::Dcp => {
                let result = value.wrapping_sub(1);
                self.do_compare(self.a, result);
                result
            }
            Family::Isb => {
                let result = value.wrapping_add(1);
                self.do_adc(!result);
                result
            }
            family => {
                debug_assert!(false, "not a read-modify-write instruction: {family:?}");
                value
            }
        }
    }

    /// Executes register-only operations, including accumulator shifts.
    fn exec_implied(&mut self) {
        match self.family() {
            Family::Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
            }
            Family::Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
            }
            Family::Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
            }
            Family::Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
            }
            Family::Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
            }
            Family::Txs => self.sp = self.x,
            Family::Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
            }
            Family::Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
            }
            Family::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
            }
            Family::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
            }
            Family::Clc => self.status.remove(Status::C),
            Family::Sec => self.status.insert(Status::C),
            Family::Cli => self.status.remove(Status::I),
            Family::Sei => self.status.insert(Status::I),
            Family::Clv => self.status.remove(Status::V),
            Family::Cld => self.status.remove(Status::D),
            Family::Sed => self.status.insert(Status::D),
            Family::Asl => self.a = self.do_asl(self.a),
            Family::Lsr => self.a = self.do_lsr(self.a),
            Family::Rol => self.a = self.do_rol(self.a),
            Family::Ror => self.a = self.do_ror(self.a),
            Family::Nop => {}
            family => debug_assert!(false, "not an implied instruction: {family:?}"),
        }
    }

    fn do_adc(&mut self, value: u8) {
        let carry = u16::from(self.status.contains(Status::C));
        let sum = u16::from(self.a) + u16::from(value) + carry;
        let result = sum as u8;
        self.status.set(Status::C, sum > 0xFF);
        self.status
            .set(Status::V, (self.a ^ result) & (value ^ result) & 0x80 != 0);
        self.a = result;
        self.status.set_zn(self.a);
    }

    fn do_compare(&mut self, register: u8, value: u8) {
        self.status.set(Status::C, register >= value);
        self.status.set_zn(register.wrapping_sub(value));
    }

    fn do_asl(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x80 != 0);
        let result = value << 1;
        self.status.set_zn(result);
        result
    }

    fn do_lsr(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x01 != 0);
        let result = value >> 1;
        self.status.set_zn(result);
        result
    }

    fn do_rol(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C));
        self.status.set(Status::C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.status.set_zn(result);
        result
    }

    fn do_ror(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C));
        self.status.set(Status::C, value & 0x01 != 0);
        let result = (value >> 1) | (carry_in << 7);
        self.status.set_zn(result);
        result
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
