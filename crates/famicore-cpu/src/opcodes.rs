//! Opcode decode table.
//!
//! The table, not the interpreter, is the source of truth for what each of
//! the 256 opcode bytes does: which instruction family it belongs to, which
//! addressing mode it uses, and whether its memory effect is a read, a write
//! or a read-modify-write. The CPU state machine derives its per-cycle
//! schedule entirely from the decoded descriptor.
//!
//! Coverage is every opcode the nestest conformance log exercises: all
//! documented instructions plus the stable undocumented ones (`LAX`, `SAX`,
//! `DCP`, `ISB`, `SLO`, `RLA`, `SRE`, `RRA`, the multi-mode `NOP`s and the
//! second `SBC #` at `$EB`). Everything else decodes to [`Family::Invalid`].

use crate::addressing::AddrMode;

/// Instruction family (mnemonic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)] // Mnemonics are their own documentation.
pub enum Family {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Undocumented but stable.
    Lax, Sax, Dcp, Isb, Slo, Rla, Sre, Rra,
    /// Byte with no decoding; executing one is a fatal error.
    Invalid,
}

/// Memory effect of an instruction family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Reads the operand once.
    Read,
    /// Writes the operand once.
    Write,
    /// Reads, writes the old value back (dummy), then writes the new value.
    ReadModifyWrite,
}

impl Family {
    /// Three-letter mnemonic as it appears in trace output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Adc => "ADC", Self::And => "AND", Self::Asl => "ASL",
            Self::Bcc => "BCC", Self::Bcs => "BCS", Self::Beq => "BEQ",
            Self::Bit => "BIT", Self::Bmi => "BMI", Self::Bne => "BNE",
            Self::Bpl => "BPL", Self::Brk => "BRK", Self::Bvc => "BVC",
            Self::Bvs => "BVS", Self::Clc => "CLC", Self::Cld => "CLD",
            Self::Cli => "CLI", Self::Clv => "CLV", Self::Cmp => "CMP",
            Self::Cpx => "CPX", Self::Cpy => "CPY", Self::Dec => "DEC",
            Self::Dex => "DEX", Self::Dey => "DEY", Self::Eor => "EOR",
            Self::Inc => "INC", Self::Inx => "INX", Self::Iny => "INY",
            Self::Jmp => "JMP", Self::Jsr => "JSR", Self::Lda => "LDA",
            Self::Ldx => "LDX", Self::Ldy => "LDY", Self::Lsr => "LSR",
            Self::Nop => "NOP", Self::Ora => "ORA", Self::Pha => "PHA",
            Self::Php => "PHP", Self::Pla => "PLA", Self::Plp => "PLP",
            Self::Rol => "ROL", Self::Ror => "ROR", Self::Rti => "RTI",
            Self::Rts => "RTS", Self::Sbc => "SBC", Self::Sec => "SEC",
            Self::Sed => "SED", Self::Sei => "SEI", Self::Sta => "STA",
            Self::Stx => "STX", Self::Sty => "STY", Self::Tax => "TAX",
            Self::Tay => "TAY", Self::Tsx => "TSX", Self::Txa => "TXA",
            Self::Txs => "TXS", Self::Tya => "TYA", Self::Lax => "LAX",
            Self::Sax => "SAX", Self::Dcp => "DCP", Self::Isb => "ISB",
            Self::Slo => "SLO", Self::Rla => "RLA", Self::Sre => "SRE",
            Self::Rra => "RRA", Self::Invalid => "???",
        }
    }

    /// Classifies the memory effect of the family.
    ///
    /// Families without a memory operand (control flow, register transfers)
    /// report [`AccessKind::Read`]; the CPU never consults them.
    #[must_use]
    pub const fn access_kind(self) -> AccessKind {
        match self {
            Self::Sta | Self::Stx | Self::Sty | Self::Sax => AccessKind::Write,
            Self::Asl
            | Self::Lsr
            | Self::Rol
            | Self::Ror
            | Self::Inc
            | Self::Dec
            | Self::Dcp
            | Self::Isb
            | Self::Slo
            | Self::Rla
            | Self::Sre
            | Self::Rra => AccessKind::ReadModifyWrite,
            _ => AccessKind::Read,
        }
    }
}

/// Decoded opcode descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// Instruction family.
    pub family: Family,
    /// The raw opcode byte this descriptor was decoded from.
    pub byte: u8,
    /// Addressing mode.
    pub mode: AddrMode,
    /// Memory effect.
    pub access: AccessKind,
}

impl Opcode {
    /// True for opcodes the trace marks with a `*` prefix: the illegal
    /// families, every `NOP` except the official `$EA`, and `SBC #$EB`.
    #[must_use]
    pub const fn is_undocumented(self) -> bool {
        match self.family {
            Family::Lax
            | Family::Sax
            | Family::Dcp
            | Family::Isb
            | Family::Slo
            | Family::Rla
            | Family::Sre
            | Family::Rra => true,
            Family::Nop => self.byte != 0xEA,
            Family::Sbc => self.byte == 0xEB,
            _ => false,
        }
    }
}

/// Decodes an opcode byte. Pure lookup; `decode(b).byte == b` for all `b`.
#[must_use]
pub fn decode(byte: u8) -> Opcode {
    let (family, mode) = OPCODE_TABLE[byte as usize];
    Opcode {
        family,
        byte,
        mode,
        access: family.access_kind(),
    }
}

/// Shorthand for a table entry.
const fn op(family: Family, mode: AddrMode) -> (Family, AddrMode) {
    (family, mode)
}

/// Bytes with no stable decoding (JAM and the unstable illegals).
const BAD: (Family, AddrMode) = (Family::Invalid, AddrMode::Imp);

#[rustfmt::skip]
static OPCODE_TABLE: [(Family, AddrMode); 256] = {
    use AddrMode::{Abs, Abx, Aby, Acc, Idx, Idy, Imm, Imp, Ind, Rel, Zp0, Zpx, Zpy};
    use Family::*;
    [
        /* 0x00 */ op(Brk, Imp), op(Ora, Idx), BAD,         op(Slo, Idx),
        /* 0x04 */ op(Nop, Zp0), op(Ora, Zp0), op(Asl, Zp0), op(Slo, Zp0),
        /* 0x08 */ op(Php, Imp), op(Ora, Imm), op(Asl, Acc), BAD,
        /* 0x0C */ op(Nop, Abs), op(Ora, Abs), op(Asl, Abs), op(Slo, Abs),
        /* 0x10 */ op(Bpl, Rel), op(Ora, Idy), BAD,         op(Slo, Idy),
        /* 0x14 */ op(Nop, Zpx), op(Ora, Zpx), op(Asl, Zpx), op(Slo, Zpx),
        /* 0x18 */ op(Clc, Imp), op(Ora, Aby), op(Nop, Imp), op(Slo, Aby),
        /* 0x1C */ op(Nop, Abx), op(Ora, Abx), op(Asl, Abx), op(Slo, Abx),
        /* 0x20 */ op(Jsr, Abs), op(And, Idx), BAD,         op(Rla, Idx),
        /* 0x24 */ op(Bit, Zp0), op(And, Zp0), op(Rol, Zp0), op(Rla, Zp0),
        /* 0x28 */ op(Plp, Imp), op(And, Imm), op(Rol, Acc), BAD,
        /* 0x2C */ op(Bit, Abs), op(And, Abs), op(Rol, Abs), op(Rla, Abs),
        /* 0x30 */ op(Bmi, Rel), op(And, Idy), BAD,         op(Rla, Idy),
        /* 0x34 */ op(Nop, Zpx), op(And, Zpx), op(Rol, Zpx), op(Rla, Zpx),
        /* 0x38 */ op(Sec, Imp), op(And, Aby), op(Nop, Imp), op(Rla, Aby),
        /* 0x3C */ op(Nop, Abx), op(And, Abx), op(Rol, Abx), op(Rla, Abx),
        /* 0x40 */ op(Rti, Imp), op(Eor, Idx), BAD,         op(Sre, Idx),
        /* 0x44 */ op(Nop, Zp0), op(Eor, Zp0), op(Lsr, Zp0), op(Sre, Zp0),
        /* 0x48 */ op(Pha, Imp), op(Eor, Imm), op(Lsr, Acc), BAD,
        /* 0x4C */ op(Jmp, Abs), op(Eor, Abs), op(Lsr, Abs), op(Sre, Abs),
        /* 0x50 */ op(Bvc, Rel), op(Eor, Idy), BAD,         op(Sre, Idy),
        /* 0x54 */ op(Nop, Zpx), op(Eor, Zpx), op(Lsr, Zpx), op(Sre, Zpx),
        /* 0x58 */ op(Cli, Imp), op(Eor, Aby), op(Nop, Imp), op(Sre, Aby),
        /* 0x5C */ op(Nop, Abx), op(Eor, Abx), op(Lsr, Abx), op(Sre, Abx),
        /* 0x60 */ op(Rts, Imp), op(Adc, Idx), BAD,         op(Rra, Idx),
        /* 0x64 */ op(Nop, Zp0), op(Adc, Zp0), op(Ror, Zp0), op(Rra, Zp0),
        /* 0x68 */ op(Pla, Imp), op(Adc, Imm), op(Ror, Acc), BAD,
        /* 0x6C */ op(Jmp, Ind), op(Adc, Abs), op(Ror, Abs), op(Rra, Abs),
        /* 0x70 */ op(Bvs, Rel), op(Adc, Idy), BAD,         op(Rra, Idy),
        /* 0x74 */ op(Nop, Zpx), op(Adc, Zpx), op(Ror, Zpx), op(Rra, Zpx),
        /* 0x78 */ op(Sei, Imp), op(Adc, Aby), op(Nop, Imp), op(Rra, Aby),
        /* 0x7C */ op(Nop, Abx), op(Adc, Abx), op(Ror, Abx), op(Rra, Abx),
        /* 0x80 */ op(Nop, Imm), op(Sta, Idx), op(Nop, Imm), op(Sax, Idx),
        /* 0x84 */ op(Sty, Zp0), op(Sta, Zp0), op(Stx, Zp0), op(Sax, Zp0),
        /* 0x88 */ op(Dey, Imp), op(Nop, Imm), op(Txa, Imp), BAD,
        /* 0x8C */ op(Sty, Abs), op(Sta, Abs), op(Stx, Abs), op(Sax, Abs),
        /* 0x90 */ op(Bcc, Rel), op(Sta, Idy), BAD,         BAD,
        /* 0x94 */ op(Sty, Zpx), op(Sta, Zpx), op(Stx, Zpy), op(Sax, Zpy),
        /* 0x98 */ op(Tya, Imp), op(Sta, Aby), op(Txs, Imp), BAD,
        /* 0x9C */ BAD,         op(Sta, Abx), BAD,         BAD,
        /* 0xA0 */ op(Ldy, Imm), op(Lda, Idx), op(Ldx, Imm), op(Lax, Idx),
        /* 0xA4 */ op(Ldy, Zp0), op(Lda, Zp0), op(Ldx, Zp0), op(Lax, Zp0),
        /* 0xA8 */ op(Tay, Imp), op(Lda, Imm), op(Tax, Imp), BAD,
        /* 0xAC */ op(Ldy, Abs), op(Lda, Abs), op(Ldx, Abs), op(Lax, Abs),
        /* 0xB0 */ op(Bcs, Rel), op(Lda, Idy), BAD,         op(Lax, Idy),
        /* 0xB4 */ op(Ldy, Zpx), op(Lda, Zpx), op(Ldx, Zpy), op(Lax, Zpy),
        /* 0xB8 */ op(Clv, Imp), op(Lda, Aby), op(Tsx, Imp), BAD,
        /* 0xBC */ op(Ldy, Abx), op(Lda, Abx), op(Ldx, Aby), op(Lax, Aby),
        /* 0xC0 */ op(Cpy, Imm), op(Cmp, Idx), op(Nop, Imm), op(Dcp, Idx),
        /* 0xC4 */ op(Cpy, Zp0), op(Cmp, Zp0), op(Dec, Zp0), op(Dcp, Zp0),
        /* 0xC8 */ op(Iny, Imp), op(Cmp, Imm), op(Dex, Imp), BAD,
        /* 0xCC */ op(Cpy, Abs), op(Cmp, Abs), op(Dec, Abs), op(Dcp, Abs),
        /* 0xD0 */ op(Bne, Rel), op(Cmp, Idy), BAD,         op(Dcp, Idy),
        /* 0xD4 */ op(Nop, Zpx), op(Cmp, Zpx), op(Dec, Zpx), op(Dcp, Zpx),
        /* 0xD8 */ op(Cld, Imp), op(Cmp, Aby), op(Nop, Imp), op(Dcp, Aby),
        /* 0xDC */ op(Nop, Abx), op(Cmp, Abx), op(Dec, Abx), op(Dcp, Abx),
        /* 0xE0 */ op(Cpx, Imm), op(Sbc, Idx), op(Nop, Imm), op(Isb, Idx),
        /* 0xE4 */ op(Cpx, Zp0), op(Sbc, Zp0), op(Inc, Zp0), op(Isb, Zp0),
        /* 0xE8 */ op(Inx, Imp), op(Sbc, Imm), op(Nop, Imp), op(Sbc, Imm),
        /* 0xEC */ op(Cpx, Abs), op(Sbc, Abs), op(Inc, Abs), op(Isb, Abs),
        /* 0xF0 */ op(Beq, Rel), op(Sbc, Idy), BAD,         op(Isb, Idy),
        /* 0xF4 */ op(Nop, Zpx), op(Sbc, Zpx), op(Inc, Zpx), op(Isb, Zpx),
        /* 0xF8 */ op(Sed, Imp), op(Sbc, Aby), op(Nop, Imp), op(Isb, Aby),
        /* 0xFC */ op(Nop, Abx), op(Sbc, Abx), op(Inc, Abx), op(Isb, Abx),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_round_trips_the_byte() {
        for byte in 0..=u8::MAX {
            assert_eq!(decode(byte).byte, byte);
        }
    }

    #[test]
    fn documented_opcodes() {
        let lda = decode(0xA9);
        assert_eq!(lda.family, Family::Lda);
        assert_eq!(lda.mode, AddrMode::Imm);
        assert_eq!(lda.access, AccessKind::Read);

        let sta = decode(0x8D);
        assert_eq!(sta.family, Family::Sta);
        assert_eq!(sta.mode, AddrMode::Abs);
        assert_eq!(sta.access, AccessKind::Write);

        let inc = decode(0xFE);
        assert_eq!(inc.family, Family::Inc);
        assert_eq!(inc.mode, AddrMode::Abx);
        assert_eq!(inc.access, AccessKind::ReadModifyWrite);

        assert_eq!(decode(0x6C).mode, AddrMode::Ind);
    }

    #[test]
    fn undocumented_opcodes() {
        assert_eq!(decode(0xA3).family, Family::Lax);
        assert_eq!(decode(0x87).family, Family::Sax);
        assert_eq!(decode(0xC3).family, Family::Dcp);
        assert_eq!(decode(0xE3).family, Family::Isb);
        assert_eq!(decode(0x03).family, Family::Slo);
        assert_eq!(decode(0x23).family, Family::Rla);
        assert_eq!(decode(0x43).family, Family::Sre);
        assert_eq!(decode(0x63).family, Family::Rra);

        // Second SBC immediate.
        let sbc = decode(0xEB);
        assert_eq!(sbc.family, Family::Sbc);
        assert_eq!(sbc.mode, AddrMode::Imm);
        assert!(sbc.is_undocumented());
    }

    #[test]
    fn nop_variants() {
        for byte in [0x1A, 0x3A, 0x5A, 0x7A, 0xDA, 0xFA] {
            assert_eq!(decode(byte).mode, AddrMode::Imp);
            assert_eq!(decode(byte).family, Family::Nop);
        }
        assert_eq!(decode(0x80).mode, AddrMode::Imm);
        for byte in [0x04, 0x44, 0x64] {
            assert_eq!(decode(byte).mode, AddrMode::Zp0);
        }
        for byte in [0x14, 0x34, 0x54, 0x74, 0xD4, 0xF4] {
            assert_eq!(decode(byte).mode, AddrMode::Zpx);
        }
        assert_eq!(decode(0x0C).mode, AddrMode::Abs);
        for byte in [0x1C, 0x3C, 0x5C, 0x7C, 0xDC, 0xFC] {
            assert_eq!(decode(byte).mode, AddrMode::Abx);
        }
    }

    #[test]
    fn undocumented_marker() {
        assert!(!decode(0xEA).is_undocumented()); // official NOP
        assert!(decode(0x1A).is_undocumented());
        assert!(decode(0xA3).is_undocumented());
        assert!(!decode(0xE9).is_undocumented()); // official SBC
        assert!(decode(0xEB).is_undocumented());
        assert!(!decode(0xA9).is_undocumented());
    }

    #[test]
    fn jam_bytes_are_invalid() {
        for byte in [0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2] {
            assert_eq!(decode(byte).family, Family::Invalid);
        }
    }
}
