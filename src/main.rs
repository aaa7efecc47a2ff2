use nescore::{Bus, Cartridge, CartridgeError, Cpu, RunOutcome, SystemBus};

/// CPU cycles in one NTSC frame.
const FRAME_CYCLES: u64 = 29_781;

fn build_demo_ines() -> Vec<u8> {
    // iNES header
    let mut rom = Vec::with_capacity(16 + 16 * 1024 + 8 * 1024);
    rom.extend_from_slice(b"NES\x1A");
    rom.push(1); // 1 x 16KB PRG
    rom.push(1); // 1 x 8KB CHR
    rom.push(0); // flags6: mapper 0, horizontal mirroring
    rom.push(0); // flags7
    rom.push(1); // PRG-RAM size in 8KB units
    rom.extend_from_slice(&[0u8; 7]);

    let mut prg = vec![0u8; 16 * 1024];
    let program: &[u8] = &[
        0xA9, 0x10, // LDA #$10
        0x69, 0x05, // ADC #$05 => A = 0x15
        0x8D, 0x00, 0x02, // STA $0200
        0xE8, // INX
        0xD0, 0xFD, // BNE -3 -> loop until X wraps to 0
        0x00, // BRK
    ];
    prg[..program.len()].copy_from_slice(program);

    // NMI, RESET and IRQ/BRK vectors all point at $8000.
    for vector in [0x3FFA, 0x3FFC, 0x3FFE] {
        prg[vector] = 0x00;
        prg[vector + 1] = 0x80;
    }

    rom.extend_from_slice(&prg);
    rom.resize(rom.len() + 8 * 1024, 0);
    rom
}

fn main() -> Result<(), CartridgeError> {
    let cart = Cartridge::from_ines_bytes(&build_demo_ines())?;
    println!("{cart:?}");

    let mut bus = SystemBus::with_cartridge(cart);
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    // Stop at the BRK once the loop has finished, or after one frame.
    match cpu.run(&mut bus, FRAME_CYCLES, &[0x800A]) {
        RunOutcome::Breakpoint { pc, cycles } => println!("breakpoint at ${pc:04X} after {cycles} cycles"),
        RunOutcome::BudgetReached { cycles } => println!("frame budget spent ({cycles} cycles)"),
        RunOutcome::Halted { pc, opcode, cycles } => {
            println!("processor jammed on ${opcode:02X} at ${pc:04X} after {cycles} cycles")
        }
    }

    println!("A: 0x{:02X}", cpu.a());
    println!("X: 0x{:02X}", cpu.x());
    println!("Y: 0x{:02X}", cpu.y());
    println!("SP: 0x{:02X}", cpu.sp());
    println!("PC: 0x{:04X}", cpu.pc());
    println!("P (flags): 0b{:08b}", cpu.status());
    println!("mem[0x0200]: 0x{:02X}", bus.read(0x0200));
    Ok(())
}
