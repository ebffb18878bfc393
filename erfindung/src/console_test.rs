use pretty_assertions::assert_eq;

use crate::asm::Assembler;
use crate::console::*;
use crate::fixed_point::to_f64;
use crate::gamepad::Button;
use crate::isa::*;

fn console_with(source: &str) -> Console {
    let mut asmr = Assembler::new();
    if let Err(e) = asmr.assemble_from_string(source) {
        panic!("assembly failed: {}", e);
    }
    let mut console = Console::deterministic();
    console.load_program(asmr.program_data()).unwrap();
    console
}

#[test]
fn ram_reads_and_writes_route_through_the_bus() {
    let mut pack = ConsolePack::deterministic();
    do_write(&mut pack, 100, 0xABCD).unwrap();
    assert_eq!(Ok(0xABCD), do_read(&mut pack, 100));
}

#[test]
fn addresses_between_ram_and_device_space_fault() {
    let mut pack = ConsolePack::deterministic();
    assert_eq!(Err(BusFault(20_000)), do_read(&mut pack, 20_000));
    assert_eq!(Err(BusFault(0x7FFF_FFFF)), do_write(&mut pack, 0x7FFF_FFFF, 1));
}

#[test]
fn misused_devices_latch_a_bus_error() {
    let mut pack = ConsolePack::deterministic();
    // reading a write-only stream
    assert_eq!(Ok(0), do_read(&mut pack, GPU_INPUT_STREAM));
    assert_eq!(Ok(BUS_ERROR_READ_ON_WRITE_ONLY), do_read(&mut pack, BUS_ERROR));
    // the read of the latch cleared it
    assert_eq!(Ok(BUS_ERROR_NONE), do_read(&mut pack, BUS_ERROR));
}

#[test]
fn any_successful_device_access_clears_the_latch() {
    let mut pack = ConsolePack::deterministic();
    assert_eq!(Ok(0), do_read(&mut pack, RESERVED_NULL));
    // a good access in between eats the latched code
    do_read(&mut pack, READ_CONTROLLER).unwrap();
    assert_eq!(Ok(BUS_ERROR_NONE), do_read(&mut pack, BUS_ERROR));
}

#[test]
fn writes_to_rom_devices_latch() {
    let mut pack = ConsolePack::deterministic();
    do_write(&mut pack, RANDOM_NUMBER_GENERATOR, 1).unwrap();
    assert_eq!(Ok(BUS_ERROR_WRITE_ON_READ_ONLY), do_read(&mut pack, BUS_ERROR));
    do_write(&mut pack, RESERVED_NULL, 1).unwrap();
    assert_eq!(Ok(BUS_ERROR_INVALID_ADDRESS), do_read(&mut pack, BUS_ERROR));
}

#[test]
fn malformed_gpu_commands_latch() {
    let mut pack = ConsolePack::deterministic();
    do_write(&mut pack, GPU_INPUT_STREAM, 77).unwrap();
    assert_eq!(Ok(BUS_ERROR_MALFORMED_COMMAND), do_read(&mut pack, BUS_ERROR));
}

#[test]
fn the_controller_is_readable_over_the_bus() {
    let mut console = console_with("load x 0x80000007");
    console.process_button(Button::A, true);
    console.step().unwrap();
    assert_eq!(PAD_A, console.cpu.reg(Reg::X));
}

#[test]
fn deterministic_consoles_share_a_random_stream() {
    let mut a = ConsolePack::deterministic();
    let mut b = ConsolePack::deterministic();
    for _ in 0..16 {
        assert_eq!(do_read(&mut a, RANDOM_NUMBER_GENERATOR),
                   do_read(&mut b, RANDOM_NUMBER_GENERATOR));
    }
}

#[test]
fn halt_writes_stop_the_frame_loop() {
    let mut console = console_with("set x 3\nio halt x\n:spin jump spin");
    console.run_until_wait().unwrap();
    assert!(console.trying_to_shutdown());
}

#[test]
fn waits_suspend_until_the_frame_boundary() {
    let mut console = console_with("set x 1\nio wait x\nset y 5\nio halt x");
    console.run_until_wait().unwrap();
    // suspended right after the wait write, before "set y"
    assert_eq!(0, console.cpu.reg(Reg::Y));
    console.run_until_wait().unwrap();
    assert_eq!(5, console.cpu.reg(Reg::Y));
    assert!(console.trying_to_shutdown());
}

#[test]
fn the_deterministic_timer_reports_a_sixtieth() {
    let mut console = console_with("set x 1\nio wait x");
    console.run_until_wait().unwrap();
    let elapsed = do_read(&mut console.pack, TIMER_QUERY_SYNC_ET).unwrap();
    assert!((to_f64(elapsed) - 1.0 / 60.0).abs() < 0.0001);
}

#[test]
fn restart_resets_the_register_file() {
    let mut console = console_with("set x 9\nset y 9");
    console.step().unwrap();
    console.step().unwrap();
    console.press_restart();
    assert_eq!([0; REG_COUNT], console.register_snapshot());
}

#[test]
fn frame_boundaries_flush_the_gpu_queue() {
    // draw an 8x1 all-set sprite at the origin, wait, then halt
    let source = "\
        set sp 200\n\
        set x 8\n\
        set y 1\n\
        set z 64\n\
        io upload x y z\n\
        io read gpu a\n\
        set x 0\n\
        set y 0\n\
        set z a\n\
        io draw x y z\n\
        set x 1\n\
        io wait x\n\
        :done jump done\n";
    let mut asmr = Assembler::new();
    asmr.assemble_from_string(source).unwrap();
    let mut console = Console::deterministic();
    console.load_program(asmr.program_data()).unwrap();
    // sprite bits live at word 64
    console.pack.ram.write(64, 0xFF00_0000);
    console.run_until_wait().unwrap();
    let mut lit = 0;
    console.draw_pixels(|_x, y, px| {
        if px && y == 0 {
            lit += 1;
        }
    });
    assert_eq!(8, lit);
}
