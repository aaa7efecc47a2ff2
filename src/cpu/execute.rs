/*!
execute.rs - 6502 instruction semantics.

Every function here has the same shape, `ExecFn`:

```text
fn(&mut CpuState, &mut dyn Bus, effective_address)
```

The step loop has already resolved the effective address and advanced PC
past the instruction, so control-flow instructions see PC pointing at the
next instruction. Extra cycles beyond the table's base cost (taken branches)
are charged directly to `CpuState::cycles`.

Undocumented opcodes are built by running one documented operation and then
another against the same resolved address (SLO = ASL then ORA, and so on),
so their flag behavior falls out of the documented helpers.

Decimal mode is ignored by ADC/SBC; the console's CPU has no BCD unit.
*/

use crate::bus::Bus;
use crate::cpu::state::{CpuState, IRQ_VECTOR};

/// Instruction execution function.
pub type ExecFn = fn(&mut CpuState, &mut dyn Bus, u16);

/// Magic constant ORed into A by the unstable ANE (XAA) and LXA opcodes.
const ANE_MAGIC: u8 = 0xEE;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Canonical 6502 RMW sequence: read -> dummy write old -> write new.
fn rmw<F>(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16, transform: F) -> u8
where
    F: FnOnce(&mut CpuState, u8) -> u8,
{
    let old = bus.read(addr);
    bus.write(addr, old);
    let new = transform(cpu, old);
    bus.write(addr, new);
    cpu.update_zn(new);
    new
}

fn shift_left(cpu: &mut CpuState, v: u8, carry_in: bool) -> u8 {
    cpu.set_carry(v & 0x80 != 0);
    (v << 1) | carry_in as u8
}

fn shift_right(cpu: &mut CpuState, v: u8, carry_in: bool) -> u8 {
    cpu.set_carry(v & 0x01 != 0);
    (v >> 1) | ((carry_in as u8) << 7)
}

fn add_with_carry(cpu: &mut CpuState, v: u8) {
    let a = cpu.a;
    let sum = a as u16 + v as u16 + cpu.carry() as u16;
    let result = sum as u8;
    cpu.set_carry(sum > 0xFF);
    cpu.set_overflow((!(a ^ v)) & (a ^ result) & 0x80 != 0);
    cpu.a = result;
    cpu.update_zn(result);
}

fn compare(cpu: &mut CpuState, reg: u8, v: u8) {
    cpu.set_carry(reg >= v);
    cpu.update_zn(reg.wrapping_sub(v));
}

fn branch(cpu: &mut CpuState, target: u16, take: bool) {
    if !take {
        return;
    }
    cpu.cycles += 1;
    if (cpu.pc & 0xFF00) != (target & 0xFF00) {
        cpu.cycles += 1;
    }
    cpu.pc = target;
}

/// Store for the SHA/SHX/SHY/TAS family: the value is ANDed with the high
/// byte of the un-indexed base plus one, and on a page cross that value also
/// replaces the high byte of the target address.
fn unstable_store(bus: &mut dyn Bus, addr: u16, index: u8, value: u8) {
    let base = addr.wrapping_sub(index as u16);
    let v = value & ((base >> 8) as u8).wrapping_add(1);
    let target = if (base & 0xFF00) != (addr & 0xFF00) {
        ((v as u16) << 8) | (addr & 0x00FF)
    } else {
        addr
    };
    bus.write(target, v);
}

// ---------------------------------------------------------------------------
// Loads / Stores
// ---------------------------------------------------------------------------

pub fn lda(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    cpu.a = bus.read(addr);
    cpu.update_zn(cpu.a);
}

pub fn ldx(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    cpu.x = bus.read(addr);
    cpu.update_zn(cpu.x);
}

pub fn ldy(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    cpu.y = bus.read(addr);
    cpu.update_zn(cpu.y);
}

pub fn sta(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    bus.write(addr, cpu.a);
}

pub fn stx(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    bus.write(addr, cpu.x);
}

pub fn sty(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    bus.write(addr, cpu.y);
}

// ---------------------------------------------------------------------------
// Transfers / register inc-dec
// ---------------------------------------------------------------------------

pub fn tax(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.x = cpu.a;
    cpu.update_zn(cpu.x);
}

pub fn tay(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.y = cpu.a;
    cpu.update_zn(cpu.y);
}

pub fn txa(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.a = cpu.x;
    cpu.update_zn(cpu.a);
}

pub fn tya(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.a = cpu.y;
    cpu.update_zn(cpu.a);
}

pub fn tsx(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.x = cpu.sp;
    cpu.update_zn(cpu.x);
}

/// TXS leaves the flags alone.
pub fn txs(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.sp = cpu.x;
}

pub fn inx(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.x = cpu.x.wrapping_add(1);
    cpu.update_zn(cpu.x);
}

pub fn iny(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.y = cpu.y.wrapping_add(1);
    cpu.update_zn(cpu.y);
}

pub fn dex(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.x = cpu.x.wrapping_sub(1);
    cpu.update_zn(cpu.x);
}

pub fn dey(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.y = cpu.y.wrapping_sub(1);
    cpu.update_zn(cpu.y);
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

pub fn pha(cpu: &mut CpuState, bus: &mut dyn Bus, _addr: u16) {
    let a = cpu.a;
    cpu.push(bus, a);
}

pub fn php(cpu: &mut CpuState, bus: &mut dyn Bus, _addr: u16) {
    let p = cpu.status_for_push(true);
    cpu.push(bus, p);
}

pub fn pla(cpu: &mut CpuState, bus: &mut dyn Bus, _addr: u16) {
    cpu.a = cpu.pop(bus);
    cpu.update_zn(cpu.a);
}

pub fn plp(cpu: &mut CpuState, bus: &mut dyn Bus, _addr: u16) {
    let p = cpu.pop(bus);
    cpu.set_status(p);
}

// ---------------------------------------------------------------------------
// Logical / arithmetic
// ---------------------------------------------------------------------------

pub fn and(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    cpu.a &= bus.read(addr);
    cpu.update_zn(cpu.a);
}

pub fn ora(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    cpu.a |= bus.read(addr);
    cpu.update_zn(cpu.a);
}

pub fn eor(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    cpu.a ^= bus.read(addr);
    cpu.update_zn(cpu.a);
}

pub fn bit(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr);
    cpu.set_zero(cpu.a & v == 0);
    cpu.set_negative(v & 0x80 != 0);
    cpu.set_overflow(v & 0x40 != 0);
}

pub fn adc(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr);
    add_with_carry(cpu, v);
}

pub fn sbc(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr);
    add_with_carry(cpu, v ^ 0xFF);
}

pub fn cmp(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr);
    let reg = cpu.a;
    compare(cpu, reg, v);
}

pub fn cpx(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr);
    let reg = cpu.x;
    compare(cpu, reg, v);
}

pub fn cpy(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr);
    let reg = cpu.y;
    compare(cpu, reg, v);
}

// ---------------------------------------------------------------------------
// Shifts / rotates / memory inc-dec
// ---------------------------------------------------------------------------

pub fn asl_acc(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    let a = cpu.a;
    cpu.a = shift_left(cpu, a, false);
    cpu.update_zn(cpu.a);
}

pub fn lsr_acc(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    let a = cpu.a;
    cpu.a = shift_right(cpu, a, false);
    cpu.update_zn(cpu.a);
}

pub fn rol_acc(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    let (a, c) = (cpu.a, cpu.carry());
    cpu.a = shift_left(cpu, a, c);
    cpu.update_zn(cpu.a);
}

pub fn ror_acc(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    let (a, c) = (cpu.a, cpu.carry());
    cpu.a = shift_right(cpu, a, c);
    cpu.update_zn(cpu.a);
}

pub fn asl(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    rmw(cpu, bus, addr, |c, v| shift_left(c, v, false));
}

pub fn lsr(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    rmw(cpu, bus, addr, |c, v| shift_right(c, v, false));
}

pub fn rol(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    rmw(cpu, bus, addr, |c, v| {
        let carry = c.carry();
        shift_left(c, v, carry)
    });
}

pub fn ror(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    rmw(cpu, bus, addr, |c, v| {
        let carry = c.carry();
        shift_right(c, v, carry)
    });
}

pub fn inc(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    rmw(cpu, bus, addr, |_, v| v.wrapping_add(1));
}

pub fn dec(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    rmw(cpu, bus, addr, |_, v| v.wrapping_sub(1));
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

pub fn clc(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.set_carry(false);
}

pub fn sec(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.set_carry(true);
}

pub fn cli(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.set_irq_disable(false);
}

pub fn sei(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.set_irq_disable(true);
}

pub fn cld(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.set_decimal(false);
}

pub fn sed(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.set_decimal(true);
}

pub fn clv(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.set_overflow(false);
}

// ---------------------------------------------------------------------------
// Branches (target already resolved)
// ---------------------------------------------------------------------------

/// Branch on plus: taken when N is clear.
pub fn bpl(cpu: &mut CpuState, _bus: &mut dyn Bus, target: u16) {
    let take = !cpu.negative();
    branch(cpu, target, take);
}

pub fn bmi(cpu: &mut CpuState, _bus: &mut dyn Bus, target: u16) {
    let take = cpu.negative();
    branch(cpu, target, take);
}

pub fn bvc(cpu: &mut CpuState, _bus: &mut dyn Bus, target: u16) {
    let take = !cpu.overflow();
    branch(cpu, target, take);
}

pub fn bvs(cpu: &mut CpuState, _bus: &mut dyn Bus, target: u16) {
    let take = cpu.overflow();
    branch(cpu, target, take);
}

pub fn bcc(cpu: &mut CpuState, _bus: &mut dyn Bus, target: u16) {
    let take = !cpu.carry();
    branch(cpu, target, take);
}

pub fn bcs(cpu: &mut CpuState, _bus: &mut dyn Bus, target: u16) {
    let take = cpu.carry();
    branch(cpu, target, take);
}

pub fn bne(cpu: &mut CpuState, _bus: &mut dyn Bus, target: u16) {
    let take = !cpu.zero();
    branch(cpu, target, take);
}

pub fn beq(cpu: &mut CpuState, _bus: &mut dyn Bus, target: u16) {
    let take = cpu.zero();
    branch(cpu, target, take);
}

// ---------------------------------------------------------------------------
// Control flow
// ---------------------------------------------------------------------------

pub fn jmp(cpu: &mut CpuState, _bus: &mut dyn Bus, addr: u16) {
    cpu.pc = addr;
}

/// JSR pushes the address of its own last byte.
pub fn jsr(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let ret = cpu.pc.wrapping_sub(1);
    cpu.push16(bus, ret);
    cpu.pc = addr;
}

pub fn rts(cpu: &mut CpuState, bus: &mut dyn Bus, _addr: u16) {
    cpu.pc = cpu.pop16(bus).wrapping_add(1);
}

pub fn rti(cpu: &mut CpuState, bus: &mut dyn Bus, _addr: u16) {
    let p = cpu.pop(bus);
    cpu.set_status(p);
    cpu.pc = cpu.pop16(bus);
}

/// BRK skips a padding byte: the pushed return address is opcode + 2.
pub fn brk(cpu: &mut CpuState, bus: &mut dyn Bus, _addr: u16) {
    let ret = cpu.pc.wrapping_add(1);
    cpu.push16(bus, ret);
    let p = cpu.status_for_push(true);
    cpu.push(bus, p);
    cpu.set_irq_disable(true);
    cpu.pc = bus.read_word(IRQ_VECTOR);
}

pub fn nop(_cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {}

/// Multi-byte NOPs still perform their operand read.
pub fn nop_read(_cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    bus.read(addr);
}

/// Lockup: the processor stops fetching; PC stays on the jamming opcode.
/// The step loop logs it with the opcode it already fetched.
pub fn jam(cpu: &mut CpuState, _bus: &mut dyn Bus, _addr: u16) {
    cpu.pc = cpu.pc.wrapping_sub(1);
    cpu.halted = true;
}

// ---------------------------------------------------------------------------
// Undocumented opcodes
// ---------------------------------------------------------------------------

pub fn slo(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    asl(cpu, bus, addr);
    ora(cpu, bus, addr);
}

pub fn rla(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    rol(cpu, bus, addr);
    and(cpu, bus, addr);
}

pub fn sre(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    lsr(cpu, bus, addr);
    eor(cpu, bus, addr);
}

pub fn rra(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    ror(cpu, bus, addr);
    adc(cpu, bus, addr);
}

pub fn dcp(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    dec(cpu, bus, addr);
    cmp(cpu, bus, addr);
}

pub fn isc(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    inc(cpu, bus, addr);
    sbc(cpu, bus, addr);
}

pub fn lax(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    lda(cpu, bus, addr);
    tax(cpu, bus, addr);
}

pub fn sax(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    bus.write(addr, cpu.a & cpu.x);
}

pub fn anc(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    and(cpu, bus, addr);
    cpu.set_carry(cpu.negative());
}

pub fn alr(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    and(cpu, bus, addr);
    lsr_acc(cpu, bus, addr);
}

/// AND then ROR A, with C from bit 6 and V from bit 6 XOR bit 5.
pub fn arr(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    and(cpu, bus, addr);
    let carry = cpu.carry() as u8;
    cpu.a = (cpu.a >> 1) | (carry << 7);
    cpu.update_zn(cpu.a);
    let b6 = cpu.a & 0x40 != 0;
    let b5 = cpu.a & 0x20 != 0;
    cpu.set_carry(b6);
    cpu.set_overflow(b6 ^ b5);
}

/// SBX: X = (A & X) - operand, carry as in CMP.
pub fn sbx(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr);
    let ax = cpu.a & cpu.x;
    cpu.set_carry(ax >= v);
    cpu.x = ax.wrapping_sub(v);
    cpu.update_zn(cpu.x);
}

pub fn las(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr) & cpu.sp;
    cpu.a = v;
    cpu.x = v;
    cpu.sp = v;
    cpu.update_zn(v);
}

pub fn ane(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = bus.read(addr);
    cpu.a = (cpu.a | ANE_MAGIC) & cpu.x & v;
    cpu.update_zn(cpu.a);
}

/// LXA: A and X both take `(A | magic) & operand`.
pub fn lxa(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    let v = (cpu.a | ANE_MAGIC) & bus.read(addr);
    cpu.a = v;
    cpu.x = v;
    cpu.update_zn(v);
}

pub fn sha(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    unstable_store(bus, addr, cpu.y, cpu.a & cpu.x);
}

pub fn shx(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    unstable_store(bus, addr, cpu.y, cpu.x);
}

pub fn shy(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    unstable_store(bus, addr, cpu.x, cpu.y);
}

pub fn tas(cpu: &mut CpuState, bus: &mut dyn Bus, addr: u16) {
    cpu.sp = cpu.a & cpu.x;
    unstable_store(bus, addr, cpu.y, cpu.sp);
}
