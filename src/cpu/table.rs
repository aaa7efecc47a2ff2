/*!
table.rs - Static 256-entry opcode table.

Each opcode byte maps to an immutable `Instruction`: mnemonic, addressing
mode (which fixes the operand size and the resolver), declared base cycle
cost, whether an indexed read pays one extra cycle on a page cross, and the
execution function. The table is a plain `static` built at compile time and
never mutated.

Cycle counts follow the NMOS 6502 timings. Stores and read-modify-write
instructions in indexed modes always take their worst-case cost, so their
`page_penalty` is false.
*/

use crate::cpu::addressing::{AddrMode, ResolveFn};
use crate::cpu::execute::{self, ExecFn};

/// Immutable opcode descriptor.
#[derive(Clone, Copy)]
pub struct Instruction {
    pub name: &'static str,
    pub mode: AddrMode,
    pub cycles: u8,
    pub page_penalty: bool,
    pub resolve: ResolveFn,
    pub exec: ExecFn,
}

impl Instruction {
    const fn new(
        name: &'static str,
        mode: AddrMode,
        cycles: u8,
        page_penalty: bool,
        exec: ExecFn,
    ) -> Self {
        Self {
            name,
            mode,
            cycles,
            page_penalty,
            resolve: mode.resolver(),
            exec,
        }
    }

    /// Bytes occupied by the instruction, derived from the addressing mode.
    #[inline]
    pub const fn size(&self) -> u16 {
        self.mode.size()
    }

    /// True for the opcodes that lock the processor up.
    #[inline]
    pub fn is_lockup(&self) -> bool {
        matches!(self.mode, AddrMode::Illegal)
    }
}

impl std::fmt::Debug for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instruction")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("cycles", &self.cycles)
            .field("page_penalty", &self.page_penalty)
            .finish()
    }
}

/// Look up the descriptor for an opcode byte.
#[inline]
pub fn instruction(opcode: u8) -> &'static Instruction {
    &INSTRUCTIONS[opcode as usize]
}

macro_rules! op {
    ($name:literal, $mode:ident, $cycles:literal +, $exec:ident) => {
        Instruction::new($name, AddrMode::$mode, $cycles, true, execute::$exec)
    };
    ($name:literal, $mode:ident, $cycles:literal, $exec:ident) => {
        Instruction::new($name, AddrMode::$mode, $cycles, false, execute::$exec)
    };
}

// ------------------------------------------
// Dispatch Table (256 entries)
// ------------------------------------------

#[rustfmt::skip]
pub static INSTRUCTIONS: [Instruction; 256] = [
    /* 00 */ op!("BRK", Implied, 7, brk),
    /* 01 */ op!("ORA", IndexedIndirect, 6, ora),
    /* 02 */ op!("JAM", Illegal, 2, jam),
    /* 03 */ op!("SLO", IndexedIndirect, 8, slo),
    /* 04 */ op!("NOP", ZeroPage, 3, nop_read),
    /* 05 */ op!("ORA", ZeroPage, 3, ora),
    /* 06 */ op!("ASL", ZeroPage, 5, asl),
    /* 07 */ op!("SLO", ZeroPage, 5, slo),
    /* 08 */ op!("PHP", Implied, 3, php),
    /* 09 */ op!("ORA", Immediate, 2, ora),
    /* 0A */ op!("ASL", Accumulator, 2, asl_acc),
    /* 0B */ op!("ANC", Immediate, 2, anc),
    /* 0C */ op!("NOP", Absolute, 4, nop_read),
    /* 0D */ op!("ORA", Absolute, 4, ora),
    /* 0E */ op!("ASL", Absolute, 6, asl),
    /* 0F */ op!("SLO", Absolute, 6, slo),
    /* 10 */ op!("BPL", Relative, 2, bpl),
    /* 11 */ op!("ORA", IndirectIndexed, 5+, ora),
    /* 12 */ op!("JAM", Illegal, 2, jam),
    /* 13 */ op!("SLO", IndirectIndexed, 8, slo),
    /* 14 */ op!("NOP", ZeroPageX, 4, nop_read),
    /* 15 */ op!("ORA", ZeroPageX, 4, ora),
    /* 16 */ op!("ASL", ZeroPageX, 6, asl),
    /* 17 */ op!("SLO", ZeroPageX, 6, slo),
    /* 18 */ op!("CLC", Implied, 2, clc),
    /* 19 */ op!("ORA", AbsoluteY, 4+, ora),
    /* 1A */ op!("NOP", Implied, 2, nop),
    /* 1B */ op!("SLO", AbsoluteY, 7, slo),
    /* 1C */ op!("NOP", AbsoluteX, 4+, nop_read),
    /* 1D */ op!("ORA", AbsoluteX, 4+, ora),
    /* 1E */ op!("ASL", AbsoluteX, 7, asl),
    /* 1F */ op!("SLO", AbsoluteX, 7, slo),
    /* 20 */ op!("JSR", Absolute, 6, jsr),
    /* 21 */ op!("AND", IndexedIndirect, 6, and),
    /* 22 */ op!("JAM", Illegal, 2, jam),
    /* 23 */ op!("RLA", IndexedIndirect, 8, rla),
    /* 24 */ op!("BIT", ZeroPage, 3, bit),
    /* 25 */ op!("AND", ZeroPage, 3, and),
    /* 26 */ op!("ROL", ZeroPage, 5, rol),
    /* 27 */ op!("RLA", ZeroPage, 5, rla),
    /* 28 */ op!("PLP", Implied, 4, plp),
    /* 29 */ op!("AND", Immediate, 2, and),
    /* 2A */ op!("ROL", Accumulator, 2, rol_acc),
    /* 2B */ op!("ANC", Immediate, 2, anc),
    /* 2C */ op!("BIT", Absolute, 4, bit),
    /* 2D */ op!("AND", Absolute, 4, and),
    /* 2E */ op!("ROL", Absolute, 6, rol),
    /* 2F */ op!("RLA", Absolute, 6, rla),
    /* 30 */ op!("BMI", Relative, 2, bmi),
    /* 31 */ op!("AND", IndirectIndexed, 5+, and),
    /* 32 */ op!("JAM", Illegal, 2, jam),
    /* 33 */ op!("RLA", IndirectIndexed, 8, rla),
    /* 34 */ op!("NOP", ZeroPageX, 4, nop_read),
    /* 35 */ op!("AND", ZeroPageX, 4, and),
    /* 36 */ op!("ROL", ZeroPageX, 6, rol),
    /* 37 */ op!("RLA", ZeroPageX, 6, rla),
    /* 38 */ op!("SEC", Implied, 2, sec),
    /* 39 */ op!("AND", AbsoluteY, 4+, and),
    /* 3A */ op!("NOP", Implied, 2, nop),
    /* 3B */ op!("RLA", AbsoluteY, 7, rla),
    /* 3C */ op!("NOP", AbsoluteX, 4+, nop_read),
    /* 3D */ op!("AND", AbsoluteX, 4+, and),
    /* 3E */ op!("ROL", AbsoluteX, 7, rol),
    /* 3F */ op!("RLA", AbsoluteX, 7, rla),
    /* 40 */ op!("RTI", Implied, 6, rti),
    /* 41 */ op!("EOR", IndexedIndirect, 6, eor),
    /* 42 */ op!("JAM", Illegal, 2, jam),
    /* 43 */ op!("SRE", IndexedIndirect, 8, sre),
    /* 44 */ op!("NOP", ZeroPage, 3, nop_read),
    /* 45 */ op!("EOR", ZeroPage, 3, eor),
    /* 46 */ op!("LSR", ZeroPage, 5, lsr),
    /* 47 */ op!("SRE", ZeroPage, 5, sre),
    /* 48 */ op!("PHA", Implied, 3, pha),
    /* 49 */ op!("EOR", Immediate, 2, eor),
    /* 4A */ op!("LSR", Accumulator, 2, lsr_acc),
    /* 4B */ op!("ALR", Immediate, 2, alr),
    /* 4C */ op!("JMP", Absolute, 3, jmp),
    /* 4D */ op!("EOR", Absolute, 4, eor),
    /* 4E */ op!("LSR", Absolute, 6, lsr),
    /* 4F */ op!("SRE", Absolute, 6, sre),
    /* 50 */ op!("BVC", Relative, 2, bvc),
    /* 51 */ op!("EOR", IndirectIndexed, 5+, eor),
    /* 52 */ op!("JAM", Illegal, 2, jam),
    /* 53 */ op!("SRE", IndirectIndexed, 8, sre),
    /* 54 */ op!("NOP", ZeroPageX, 4, nop_read),
    /* 55 */ op!("EOR", ZeroPageX, 4, eor),
    /* 56 */ op!("LSR", ZeroPageX, 6, lsr),
    /* 57 */ op!("SRE", ZeroPageX, 6, sre),
    /* 58 */ op!("CLI", Implied, 2, cli),
    /* 59 */ op!("EOR", AbsoluteY, 4+, eor),
    /* 5A */ op!("NOP", Implied, 2, nop),
    /* 5B */ op!("SRE", AbsoluteY, 7, sre),
    /* 5C */ op!("NOP", AbsoluteX, 4+, nop_read),
    /* 5D */ op!("EOR", AbsoluteX, 4+, eor),
    /* 5E */ op!("LSR", AbsoluteX, 7, lsr),
    /* 5F */ op!("SRE", AbsoluteX, 7, sre),
    /* 60 */ op!("RTS", Implied, 6, rts),
    /* 61 */ op!("ADC", IndexedIndirect, 6, adc),
    /* 62 */ op!("JAM", Illegal, 2, jam),
    /* 63 */ op!("RRA", IndexedIndirect, 8, rra),
    /* 64 */ op!("NOP", ZeroPage, 3, nop_read),
    /* 65 */ op!("ADC", ZeroPage, 3, adc),
    /* 66 */ op!("ROR", ZeroPage, 5, ror),
    /* 67 */ op!("RRA", ZeroPage, 5, rra),
    /* 68 */ op!("PLA", Implied, 4, pla),
    /* 69 */ op!("ADC", Immediate, 2, adc),
    /* 6A */ op!("ROR", Accumulator, 2, ror_acc),
    /* 6B */ op!("ARR", Immediate, 2, arr),
    /* 6C */ op!("JMP", Indirect, 5, jmp),
    /* 6D */ op!("ADC", Absolute, 4, adc),
    /* 6E */ op!("ROR", Absolute, 6, ror),
    /* 6F */ op!("RRA", Absolute, 6, rra),
    /* 70 */ op!("BVS", Relative, 2, bvs),
    /* 71 */ op!("ADC", IndirectIndexed, 5+, adc),
    /* 72 */ op!("JAM", Illegal, 2, jam),
    /* 73 */ op!("RRA", IndirectIndexed, 8, rra),
    /* 74 */ op!("NOP", ZeroPageX, 4, nop_read),
    /* 75 */ op!("ADC", ZeroPageX, 4, adc),
    /* 76 */ op!("ROR", ZeroPageX, 6, ror),
    /* 77 */ op!("RRA", ZeroPageX, 6, rra),
    /* 78 */ op!("SEI", Implied, 2, sei),
    /* 79 */ op!("ADC", AbsoluteY, 4+, adc),
    /* 7A */ op!("NOP", Implied, 2, nop),
    /* 7B */ op!("RRA", AbsoluteY, 7, rra),
    /* 7C */ op!("NOP", AbsoluteX, 4+, nop_read),
    /* 7D */ op!("ADC", AbsoluteX, 4+, adc),
    /* 7E */ op!("ROR", AbsoluteX, 7, ror),
    /* 7F */ op!("RRA", AbsoluteX, 7, rra),
    /* 80 */ op!("NOP", Immediate, 2, nop_read),
    /* 81 */ op!("STA", IndexedIndirect, 6, sta),
    /* 82 */ op!("NOP", Immediate, 2, nop_read),
    /* 83 */ op!("SAX", IndexedIndirect, 6, sax),
    /* 84 */ op!("STY", ZeroPage, 3, sty),
    /* 85 */ op!("STA", ZeroPage, 3, sta),
    /* 86 */ op!("STX", ZeroPage, 3, stx),
    /* 87 */ op!("SAX", ZeroPage, 3, sax),
    /* 88 */ op!("DEY", Implied, 2, dey),
    /* 89 */ op!("NOP", Immediate, 2, nop_read),
    /* 8A */ op!("TXA", Implied, 2, txa),
    /* 8B */ op!("ANE", Immediate, 2, ane),
    /* 8C */ op!("STY", Absolute, 4, sty),
    /* 8D */ op!("STA", Absolute, 4, sta),
    /* 8E */ op!("STX", Absolute, 4, stx),
    /* 8F */ op!("SAX", Absolute, 4, sax),
    /* 90 */ op!("BCC", Relative, 2, bcc),
    /* 91 */ op!("STA", IndirectIndexed, 6, sta),
    /* 92 */ op!("JAM", Illegal, 2, jam),
    /* 93 */ op!("SHA", IndirectIndexed, 6, sha),
    /* 94 */ op!("STY", ZeroPageX, 4, sty),
    /* 95 */ op!("STA", ZeroPageX, 4, sta),
    /* 96 */ op!("STX", ZeroPageY, 4, stx),
    /* 97 */ op!("SAX", ZeroPageY, 4, sax),
    /* 98 */ op!("TYA", Implied, 2, tya),
    /* 99 */ op!("STA", AbsoluteY, 5, sta),
    /* 9A */ op!("TXS", Implied, 2, txs),
    /* 9B */ op!("TAS", AbsoluteY, 5, tas),
    /* 9C */ op!("SHY", AbsoluteX, 5, shy),
    /* 9D */ op!("STA", AbsoluteX, 5, sta),
    /* 9E */ op!("SHX", AbsoluteY, 5, shx),
    /* 9F */ op!("SHA", AbsoluteY, 5, sha),
    /* A0 */ op!("LDY", Immediate, 2, ldy),
    /* A1 */ op!("LDA", IndexedIndirect, 6, lda),
    /* A2 */ op!("LDX", Immediate, 2, ldx),
    /* A3 */ op!("LAX", IndexedIndirect, 6, lax),
    /* A4 */ op!("LDY", ZeroPage, 3, ldy),
    /* A5 */ op!("LDA", ZeroPage, 3, lda),
    /* A6 */ op!("LDX", ZeroPage, 3, ldx),
    /* A7 */ op!("LAX", ZeroPage, 3, lax),
    /* A8 */ op!("TAY", Implied, 2, tay),
    /* A9 */ op!("LDA", Immediate, 2, lda),
    /* AA */ op!("TAX", Implied, 2, tax),
    /* AB */ op!("LXA", Immediate, 2, lxa),
    /* AC */ op!("LDY", Absolute, 4, ldy),
    /* AD */ op!("LDA", Absolute, 4, lda),
    /* AE */ op!("LDX", Absolute, 4, ldx),
    /* AF */ op!("LAX", Absolute, 4, lax),
    /* B0 */ op!("BCS", Relative, 2, bcs),
    /* B1 */ op!("LDA", IndirectIndexed, 5+, lda),
    /* B2 */ op!("JAM", Illegal, 2, jam),
    /* B3 */ op!("LAX", IndirectIndexed, 5+, lax),
    /* B4 */ op!("LDY", ZeroPageX, 4, ldy),
    /* B5 */ op!("LDA", ZeroPageX, 4, lda),
    /* B6 */ op!("LDX", ZeroPageY, 4, ldx),
    /* B7 */ op!("LAX", ZeroPageY, 4, lax),
    /* B8 */ op!("CLV", Implied, 2, clv),
    /* B9 */ op!("LDA", AbsoluteY, 4+, lda),
    /* BA */ op!("TSX", Implied, 2, tsx),
    /* BB */ op!("LAS", AbsoluteY, 4+, las),
    /* BC */ op!("LDY", AbsoluteX, 4+, ldy),
    /* BD */ op!("LDA", AbsoluteX, 4+, lda),
    /* BE */ op!("LDX", AbsoluteY, 4+, ldx),
    /* BF */ op!("LAX", AbsoluteY, 4+, lax),
    /* C0 */ op!("CPY", Immediate, 2, cpy),
    /* C1 */ op!("CMP", IndexedIndirect, 6, cmp),
    /* C2 */ op!("NOP", Immediate, 2, nop_read),
    /* C3 */ op!("DCP", IndexedIndirect, 8, dcp),
    /* C4 */ op!("CPY", ZeroPage, 3, cpy),
    /* C5 */ op!("CMP", ZeroPage, 3, cmp),
    /* C6 */ op!("DEC", ZeroPage, 5, dec),
    /* C7 */ op!("DCP", ZeroPage, 5, dcp),
    /* C8 */ op!("INY", Implied, 2, iny),
    /* C9 */ op!("CMP", Immediate, 2, cmp),
    /* CA */ op!("DEX", Implied, 2, dex),
    /* CB */ op!("SBX", Immediate, 2, sbx),
    /* CC */ op!("CPY", Absolute, 4, cpy),
    /* CD */ op!("CMP", Absolute, 4, cmp),
    /* CE */ op!("DEC", Absolute, 6, dec),
    /* CF */ op!("DCP", Absolute, 6, dcp),
    /* D0 */ op!("BNE", Relative, 2, bne),
    /* D1 */ op!("CMP", IndirectIndexed, 5+, cmp),
    /* D2 */ op!("JAM", Illegal, 2, jam),
    /* D3 */ op!("DCP", IndirectIndexed, 8, dcp),
    /* D4 */ op!("NOP", ZeroPageX, 4, nop_read),
    /* D5 */ op!("CMP", ZeroPageX, 4, cmp),
    /* D6 */ op!("DEC", ZeroPageX, 6, dec),
    /* D7 */ op!("DCP", ZeroPageX, 6, dcp),
    /* D8 */ op!("CLD", Implied, 2, cld),
    /* D9 */ op!("CMP", AbsoluteY, 4+, cmp),
    /* DA */ op!("NOP", Implied, 2, nop),
    /* DB */ op!("DCP", AbsoluteY, 7, dcp),
    /* DC */ op!("NOP", AbsoluteX, 4+, nop_read),
    /* DD */ op!("CMP", AbsoluteX, 4+, cmp),
    /* DE */ op!("DEC", AbsoluteX, 7, dec),
    /* DF */ op!("DCP", AbsoluteX, 7, dcp),
    /* E0 */ op!("CPX", Immediate, 2, cpx),
    /* E1 */ op!("SBC", IndexedIndirect, 6, sbc),
    /* E2 */ op!("NOP", Immediate, 2, nop_read),
    /* E3 */ op!("ISC", IndexedIndirect, 8, isc),
    /* E4 */ op!("CPX", ZeroPage, 3, cpx),
    /* E5 */ op!("SBC", ZeroPage, 3, sbc),
    /* E6 */ op!("INC", ZeroPage, 5, inc),
    /* E7 */ op!("ISC", ZeroPage, 5, isc),
    /* E8 */ op!("INX", Implied, 2, inx),
    /* E9 */ op!("SBC", Immediate, 2, sbc),
    /* EA */ op!("NOP", Implied, 2, nop),
    /* EB */ op!("SBC", Immediate, 2, sbc),
    /* EC */ op!("CPX", Absolute, 4, cpx),
    /* ED */ op!("SBC", Absolute, 4, sbc),
    /* EE */ op!("INC", Absolute, 6, inc),
    /* EF */ op!("ISC", Absolute, 6, isc),
    /* F0 */ op!("BEQ", Relative, 2, beq),
    /* F1 */ op!("SBC", IndirectIndexed, 5+, sbc),
    /* F2 */ op!("JAM", Illegal, 2, jam),
    /* F3 */ op!("ISC", IndirectIndexed, 8, isc),
    /* F4 */ op!("NOP", ZeroPageX, 4, nop_read),
    /* F5 */ op!("SBC", ZeroPageX, 4, sbc),
    /* F6 */ op!("INC", ZeroPageX, 6, inc),
    /* F7 */ op!("ISC", ZeroPageX, 6, isc),
    /* F8 */ op!("SED", Implied, 2, sed),
    /* F9 */ op!("SBC", AbsoluteY, 4+, sbc),
    /* FA */ op!("NOP", Implied, 2, nop),
    /* FB */ op!("ISC", AbsoluteY, 7, isc),
    /* FC */ op!("NOP", AbsoluteX, 4+, nop_read),
    /* FD */ op!("SBC", AbsoluteX, 4+, sbc),
    /* FE */ op!("INC", AbsoluteX, 7, inc),
    /* FF */ op!("ISC", AbsoluteX, 7, isc),
];

#[cfg(test)]
mod tests {
    use super::*;

    const LOCKUPS: [u8; 12] = [
        0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
    ];

    #[test]
    fn size_is_derived_from_mode_for_every_opcode() {
        for (opcode, ins) in INSTRUCTIONS.iter().enumerate() {
            let expected = match ins.mode {
                AddrMode::Implied | AddrMode::Accumulator | AddrMode::Illegal => 1,
                AddrMode::Immediate => 2,
                AddrMode::Absolute
                | AddrMode::AbsoluteX
                | AddrMode::AbsoluteY
                | AddrMode::Indirect => 3,
                _ => 2,
            };
            assert_eq!(ins.size(), expected, "opcode {opcode:02X}");
        }
    }

    #[test]
    fn exactly_the_jam_opcodes_lock_up() {
        for opcode in 0..=255u8 {
            assert_eq!(
                instruction(opcode).is_lockup(),
                LOCKUPS.contains(&opcode),
                "opcode {opcode:02X}"
            );
        }
    }

    #[test]
    fn well_known_entries() {
        let lda_abs_x = instruction(0xBD);
        assert_eq!(lda_abs_x.name, "LDA");
        assert_eq!(lda_abs_x.mode, AddrMode::AbsoluteX);
        assert_eq!(lda_abs_x.cycles, 4);
        assert!(lda_abs_x.page_penalty);

        let sta_abs_x = instruction(0x9D);
        assert_eq!(sta_abs_x.cycles, 5);
        assert!(!sta_abs_x.page_penalty);

        let jmp_ind = instruction(0x6C);
        assert_eq!(jmp_ind.mode, AddrMode::Indirect);
        assert_eq!(jmp_ind.size(), 3);

        assert_eq!(instruction(0x00).cycles, 7);
        assert_eq!(instruction(0xEB).name, "SBC");
    }

    #[test]
    fn every_documented_mnemonic_is_present() {
        let documented = [
            "ADC", "AND", "ASL", "BCC", "BCS", "BEQ", "BIT", "BMI", "BNE", "BPL", "BRK", "BVC",
            "BVS", "CLC", "CLD", "CLI", "CLV", "CMP", "CPX", "CPY", "DEC", "DEX", "DEY", "EOR",
            "INC", "INX", "INY", "JMP", "JSR", "LDA", "LDX", "LDY", "LSR", "NOP", "ORA", "PHA",
            "PHP", "PLA", "PLP", "ROL", "ROR", "RTI", "RTS", "SBC", "SEC", "SED", "SEI", "STA",
            "STX", "STY", "TAX", "TAY", "TSX", "TXA", "TXS", "TYA",
        ];
        for name in documented {
            assert!(
                INSTRUCTIONS.iter().any(|i| i.name == name),
                "missing {name}"
            );
        }
    }
}
