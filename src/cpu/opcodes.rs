//! Opcode table: every one of the 256 opcode bytes maps to an (operation, addressing mode)
//! pair, including the undocumented NMOS opcodes.
//!
//! Addressing modes are split by access kind. Read variants (`Abx`, `Izy`, ...) only pay the
//! page-crossing cycle when the index carries into the high byte; write (`*W`) and
//! read-modify-write (`*Rw`) variants always pay it. Picking the wrong variant changes both the
//! cycle count and which dummy accesses reach the bus.

/// Micro-op sequence that resolves an instruction's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// Instruction sequences its own operand fetches (JSR).
    Nul,
    /// Implied / accumulator.
    Imp,
    Imm,
    Rel,
    /// Absolute operand used as a jump target (JMP $nnnn).
    AbsJmp,
    /// Indirect jump target with the page-wrap bug (JMP ($nnnn)).
    Ind,
    Zp0,
    Zp0W,
    Zp0Rw,
    Zpx,
    ZpxW,
    ZpxRw,
    Zpy,
    ZpyW,
    Abs,
    AbsW,
    AbsRw,
    Abx,
    AbxW,
    AbxRw,
    Aby,
    AbyW,
    AbyRw,
    Izx,
    IzxW,
    IzxRw,
    Izy,
    IzyW,
    IzyRw,
}

/// Instruction semantics, documented and undocumented.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc, Ahx, Alr, Anc, And, Arr, Asl, Axs, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dcp, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Isb, Jmp, Jsr,
    Las, Lax, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rla, Rol, Ror, Rra, Rti, Rts,
    Sax, Sbc, Sec, Sed, Sei, Shx, Shy, Slo, Sre, Sta, Stp, Stx, Sty, Tas, Tax, Tay, Tsx, Txa,
    Txs, Tya, Xaa,
}

/// Decoded instruction descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub name: &'static str,
    pub operation: Operation,
    pub mode: AddressingMode,
}

const fn ins(name: &'static str, operation: Operation, mode: AddressingMode) -> Instruction {
    Instruction {
        name,
        operation,
        mode,
    }
}

use AddressingMode::*;
use Operation::*;

#[rustfmt::skip]
pub static OPCODES: [Instruction; 256] = [
    // 00
    ins("BRK", Brk, Imm), // 00
    ins("ORA", Ora, Izx), // 01
    ins("STP", Stp, Imp), // 02
    ins("SLO", Slo, IzxRw), // 03
    ins("NOP", Nop, Zp0), // 04
    ins("ORA", Ora, Zp0), // 05
    ins("ASL", Asl, Zp0Rw), // 06
    ins("SLO", Slo, Zp0Rw), // 07
    ins("PHP", Php, Imp), // 08
    ins("ORA", Ora, Imm), // 09
    ins("ASL", Asl, Imp), // 0A
    ins("ANC", Anc, Imm), // 0B
    ins("NOP", Nop, Abs), // 0C
    ins("ORA", Ora, Abs), // 0D
    ins("ASL", Asl, AbsRw), // 0E
    ins("SLO", Slo, AbsRw), // 0F
    // 10
    ins("BPL", Bpl, Rel), // 10
    ins("ORA", Ora, Izy), // 11
    ins("STP", Stp, Imp), // 12
    ins("SLO", Slo, IzyRw), // 13
    ins("NOP", Nop, Zpx), // 14
    ins("ORA", Ora, Zpx), // 15
    ins("ASL", Asl, ZpxRw), // 16
    ins("SLO", Slo, ZpxRw), // 17
    ins("CLC", Clc, Imp), // 18
    ins("ORA", Ora, Aby), // 19
    ins("NOP", Nop, Imp), // 1A
    ins("SLO", Slo, AbyRw), // 1B
    ins("NOP", Nop, Abx), // 1C
    ins("ORA", Ora, Abx), // 1D
    ins("ASL", Asl, AbxRw), // 1E
    ins("SLO", Slo, AbxRw), // 1F
    // 20
    ins("JSR", Jsr, Nul), // 20
    ins("AND", And, Izx), // 21
    ins("STP", Stp, Imp), // 22
    ins("RLA", Rla, IzxRw), // 23
    ins("BIT", Bit, Zp0), // 24
    ins("AND", And, Zp0), // 25
    ins("ROL", Rol, Zp0Rw), // 26
    ins("RLA", Rla, Zp0Rw), // 27
    ins("PLP", Plp, Imp), // 28
    ins("AND", And, Imm), // 29
    ins("ROL", Rol, Imp), // 2A
    ins("ANC", Anc, Imm), // 2B
    ins("BIT", Bit, Abs), // 2C
    ins("AND", And, Abs), // 2D
    ins("ROL", Rol, AbsRw), // 2E
    ins("RLA", Rla, AbsRw), // 2F
    // 30
    ins("BMI", Bmi, Rel), // 30
    ins("AND", And, Izy), // 31
    ins("STP", Stp, Imp), // 32
    ins("RLA", Rla, IzyRw), // 33
    ins("NOP", Nop, Zpx), // 34
    ins("AND", And, Zpx), // 35
    ins("ROL", Rol, ZpxRw), // 36
    ins("RLA", Rla, ZpxRw), // 37
    ins("SEC", Sec, Imp), // 38
    ins("AND", And, Aby), // 39
    ins("NOP", Nop, Imp), // 3A
    ins("RLA", Rla, AbyRw), // 3B
    ins("NOP", Nop, Abx), // 3C
    ins("AND", And, Abx), // 3D
    ins("ROL", Rol, AbxRw), // 3E
    ins("RLA", Rla, AbxRw), // 3F
    // 40
    ins("RTI", Rti, Imp), // 40
    ins("EOR", Eor, Izx), // 41
    ins("STP", Stp, Imp), // 42
    ins("SRE", Sre, IzxRw), // 43
    ins("NOP", Nop, Zp0), // 44
    ins("EOR", Eor, Zp0), // 45
    ins("LSR", Lsr, Zp0Rw), // 46
    ins("SRE", Sre, Zp0Rw), // 47
    ins("PHA", Pha, Imp), // 48
    ins("EOR", Eor, Imm), // 49
    ins("LSR", Lsr, Imp), // 4A
    ins("ALR", Alr, Imm), // 4B
    ins("JMP", Jmp, AbsJmp), // 4C
    ins("EOR", Eor, Abs), // 4D
    ins("LSR", Lsr, AbsRw), // 4E
    ins("SRE", Sre, AbsRw), // 4F
    // 50
    ins("BVC", Bvc, Rel), // 50
    ins("EOR", Eor, Izy), // 51
    ins("STP", Stp, Imp), // 52
    ins("SRE", Sre, IzyRw), // 53
    ins("NOP", Nop, Zpx), // 54
    ins("EOR", Eor, Zpx), // 55
    ins("LSR", Lsr, ZpxRw), // 56
    ins("SRE", Sre, ZpxRw), // 57
    ins("CLI", Cli, Imp), // 58
    ins("EOR", Eor, Aby), // 59
    ins("NOP", Nop, Imp), // 5A
    ins("SRE", Sre, AbyRw), // 5B
    ins("NOP", Nop, Abx), // 5C
    ins("EOR", Eor, Abx), // 5D
    ins("LSR", Lsr, AbxRw), // 5E
    ins("SRE", Sre, AbxRw), // 5F
    // 60
    ins("RTS", Rts, Imp), // 60
    ins("ADC", Adc, Izx), // 61
    ins("STP", Stp, Imp), // 62
    ins("RRA", Rra, IzxRw), // 63
    ins("NOP", Nop, Zp0), // 64
    ins("ADC", Adc, Zp0), // 65
    ins("ROR", Ror, Zp0Rw), // 66
    ins("RRA", Rra, Zp0Rw), // 67
    ins("PLA", Pla, Imp), // 68
    ins("ADC", Adc, Imm), // 69
    ins("ROR", Ror, Imp), // 6A
    ins("ARR", Arr, Imm), // 6B
    ins("JMP", Jmp, Ind), // 6C
    ins("ADC", Adc, Abs), // 6D
    ins("ROR", Ror, AbsRw), // 6E
    ins("RRA", Rra, AbsRw), // 6F
    // 70
    ins("BVS", Bvs, Rel), // 70
    ins("ADC", Adc, Izy), // 71
    ins("STP", Stp, Imp), // 72
    ins("RRA", Rra, IzyRw), // 73
    ins("NOP", Nop, Zpx), // 74
    ins("ADC", Adc, Zpx), // 75
    ins("ROR", Ror, ZpxRw), // 76
    ins("RRA", Rra, ZpxRw), // 77
    ins("SEI", Sei, Imp), // 78
    ins("ADC", Adc, Aby), // 79
    ins("NOP", Nop, Imp), // 7A
    ins("RRA", Rra, AbyRw), // 7B
    ins("NOP", Nop, Abx), // 7C
    ins("ADC", Adc, Abx), // 7D
    ins("ROR", Ror, AbxRw), // 7E
    ins("RRA", Rra, AbxRw), // 7F
    // 80
    ins("NOP", Nop, Imm), // 80
    ins("STA", Sta, IzxW), // 81
    ins("NOP", Nop, Imm), // 82
    ins("SAX", Sax, IzxW), // 83
    ins("STY", Sty, Zp0W), // 84
    ins("STA", Sta, Zp0W), // 85
    ins("STX", Stx, Zp0W), // 86
    ins("SAX", Sax, Zp0W), // 87
    ins("DEY", Dey, Imp), // 88
    ins("NOP", Nop, Imm), // 89
    ins("TXA", Txa, Imp), // 8A
    ins("XAA", Xaa, Imm), // 8B
    ins("STY", Sty, AbsW), // 8C
    ins("STA", Sta, AbsW), // 8D
    ins("STX", Stx, AbsW), // 8E
    ins("SAX", Sax, AbsW), // 8F
    // 90
    ins("BCC", Bcc, Rel), // 90
    ins("STA", Sta, IzyW), // 91
    ins("STP", Stp, Imp), // 92
    ins("AHX", Ahx, IzyW), // 93
    ins("STY", Sty, ZpxW), // 94
    ins("STA", Sta, ZpxW), // 95
    ins("STX", Stx, ZpyW), // 96
    ins("SAX", Sax, ZpyW), // 97
    ins("TYA", Tya, Imp), // 98
    ins("STA", Sta, AbyW), // 99
    ins("TXS", Txs, Imp), // 9A
    ins("TAS", Tas, AbyW), // 9B
    ins("SHY", Shy, AbxW), // 9C
    ins("STA", Sta, AbxW), // 9D
    ins("SHX", Shx, AbyW), // 9E
    ins("AHX", Ahx, AbyW), // 9F
    // A0
    ins("LDY", Ldy, Imm), // A0
    ins("LDA", Lda, Izx), // A1
    ins("LDX", Ldx, Imm), // A2
    ins("LAX", Lax, Izx), // A3
    ins("LDY", Ldy, Zp0), // A4
    ins("LDA", Lda, Zp0), // A5
    ins("LDX", Ldx, Zp0), // A6
    ins("LAX", Lax, Zp0), // A7
    ins("TAY", Tay, Imp), // A8
    ins("LDA", Lda, Imm), // A9
    ins("TAX", Tax, Imp), // AA
    ins("LAX", Lax, Imm), // AB
    ins("LDY", Ldy, Abs), // AC
    ins("LDA", Lda, Abs), // AD
    ins("LDX", Ldx, Abs), // AE
    ins("LAX", Lax, Abs), // AF
    // B0
    ins("BCS", Bcs, Rel), // B0
    ins("LDA", Lda, Izy), // B1
    ins("STP", Stp, Imp), // B2
    ins("LAX", Lax, Izy), // B3
    ins("LDY", Ldy, Zpx), // B4
    ins("LDA", Lda, Zpx), // B5
    ins("LDX", Ldx, Zpy), // B6
    ins("LAX", Lax, Zpy), // B7
    ins("CLV", Clv, Imp), // B8
    ins("LDA", Lda, Aby), // B9
    ins("TSX", Tsx, Imp), // BA
    ins("LAS", Las, Aby), // BB
    ins("LDY", Ldy, Abx), // BC
    ins("LDA", Lda, Abx), // BD
    ins("LDX", Ldx, Aby), // BE
    ins("LAX", Lax, Aby), // BF
    // C0
    ins("CPY", Cpy, Imm), // C0
    ins("CMP", Cmp, Izx), // C1
    ins("NOP", Nop, Imm), // C2
    ins("DCP", Dcp, IzxRw), // C3
    ins("CPY", Cpy, Zp0), // C4
    ins("CMP", Cmp, Zp0), // C5
    ins("DEC", Dec, Zp0Rw), // C6
    ins("DCP", Dcp, Zp0Rw), // C7
    ins("INY", Iny, Imp), // C8
    ins("CMP", Cmp, Imm), // C9
    ins("DEX", Dex, Imp), // CA
    ins("AXS", Axs, Imm), // CB
    ins("CPY", Cpy, Abs), // CC
    ins("CMP", Cmp, Abs), // CD
    ins("DEC", Dec, AbsRw), // CE
    ins("DCP", Dcp, AbsRw), // CF
    // D0
    ins("BNE", Bne, Rel), // D0
    ins("CMP", Cmp, Izy), // D1
    ins("STP", Stp, Imp), // D2
    ins("DCP", Dcp, IzyRw), // D3
    ins("NOP", Nop, Zpx), // D4
    ins("CMP", Cmp, Zpx), // D5
    ins("DEC", Dec, ZpxRw), // D6
    ins("DCP", Dcp, ZpxRw), // D7
    ins("CLD", Cld, Imp), // D8
    ins("CMP", Cmp, Aby), // D9
    ins("NOP", Nop, Imp), // DA
    ins("DCP", Dcp, AbyRw), // DB
    ins("NOP", Nop, Abx), // DC
    ins("CMP", Cmp, Abx), // DD
    ins("DEC", Dec, AbxRw), // DE
    ins("DCP", Dcp, AbxRw), // DF
    // E0
    ins("CPX", Cpx, Imm), // E0
    ins("SBC", Sbc, Izx), // E1
    ins("NOP", Nop, Imm), // E2
    ins("ISB", Isb, IzxRw), // E3
    ins("CPX", Cpx, Zp0), // E4
    ins("SBC", Sbc, Zp0), // E5
    ins("INC", Inc, Zp0Rw), // E6
    ins("ISB", Isb, Zp0Rw), // E7
    ins("INX", Inx, Imp), // E8
    ins("SBC", Sbc, Imm), // E9
    ins("NOP", Nop, Imp), // EA
    ins("SBC", Sbc, Imm), // EB
    ins("CPX", Cpx, Abs), // EC
    ins("SBC", Sbc, Abs), // ED
    ins("INC", Inc, AbsRw), // EE
    ins("ISB", Isb, AbsRw), // EF
    // F0
    ins("BEQ", Beq, Rel), // F0
    ins("SBC", Sbc, Izy), // F1
    ins("STP", Stp, Imp), // F2
    ins("ISB", Isb, IzyRw), // F3
    ins("NOP", Nop, Zpx), // F4
    ins("SBC", Sbc, Zpx), // F5
    ins("INC", Inc, ZpxRw), // F6
    ins("ISB", Isb, ZpxRw), // F7
    ins("SED", Sed, Imp), // F8
    ins("SBC", Sbc, Aby), // F9
    ins("NOP", Nop, Imp), // FA
    ins("ISB", Isb, AbyRw), // FB
    ins("NOP", Nop, Abx), // FC
    ins("SBC", Sbc, Abx), // FD
    ins("INC", Inc, AbxRw), // FE
    ins("ISB", Isb, AbxRw), // FF
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jam_opcodes_are_stp() {
        let jams: Vec<usize> = OPCODES
            .iter()
            .enumerate()
            .filter(|(_, i)| i.operation == Stp)
            .map(|(code, _)| code)
            .collect();
        assert_eq!(
            jams,
            vec![0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2]
        );
    }

    #[test]
    fn stores_use_write_modes() {
        for (code, instruction) in OPCODES.iter().enumerate() {
            if matches!(instruction.operation, Sta | Stx | Sty | Sax | Shx | Shy | Ahx | Tas) {
                assert!(
                    matches!(
                        instruction.mode,
                        Zp0W | ZpxW | ZpyW | AbsW | AbxW | AbyW | IzxW | IzyW
                    ),
                    "opcode {code:02X} stores through a non-write mode"
                );
            }
        }
    }

    #[test]
    fn names_match_operations() {
        for instruction in OPCODES.iter() {
            let debug = format!("{:?}", instruction.operation).to_uppercase();
            assert_eq!(instruction.name, debug);
        }
    }
}
