//! The console: RAM plus the memory mapped devices, the bus dispatch
//! between them, and the frame loop driving the CPU.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::apu::Apu;
use crate::cpu::{ErfiCpu, ErfiError, RuntimeErrorKind};
use crate::fixed_point::to_fixed;
use crate::gamepad::{Button, GamePad};
use crate::gpu::Gpu;
use crate::isa::*;
use crate::memory::MemorySpace;

#[cfg(test)]
#[path = "./console_test.rs"]
mod console_test;

/// prints every device access
const DEBUG_BUS: bool = false;

// bus error latch codes
pub const BUS_ERROR_NONE: u32 = 0;
pub const BUS_ERROR_READ_ON_WRITE_ONLY: u32 = 1;
pub const BUS_ERROR_WRITE_ON_READ_ONLY: u32 = 2;
pub const BUS_ERROR_INVALID_ADDRESS: u32 = 3;
pub const BUS_ERROR_MALFORMED_COMMAND: u32 = 4;

const SEED: [u8; 16] = *b"erfindung seed 1";

/// the timer, RNG, halt flag and bus error latch
pub struct UtilityDevices {
    wait: bool,
    halt_flag: bool,
    bus_error: u32,
    rng: XorShiftRng,
    prev_time: Instant,
    wait_time: u32,
    deterministic: bool,
}

impl UtilityDevices {
    pub fn new() -> Self {
        UtilityDevices {
            wait: false,
            halt_flag: false,
            bus_error: BUS_ERROR_NONE,
            rng: XorShiftRng::from_entropy(),
            prev_time: Instant::now(),
            wait_time: 0,
            deterministic: false,
        }
    }

    pub fn deterministic() -> Self {
        let mut dev = UtilityDevices::new();
        dev.rng = XorShiftRng::from_seed(SEED);
        dev.deterministic = true;
        dev
    }

    pub fn generate_random_number(&mut self) -> u32 {
        self.rng.gen()
    }

    /// fixed point seconds since the previous frame boundary
    pub fn query_elapsed_time(&self) -> u32 {
        self.wait_time
    }

    /// a non-zero write suspends the cpu until the next frame
    pub fn wait(&mut self, w: u32) {
        if w != 0 {
            self.wait = true;
        }
    }

    pub fn power(&mut self, p: u32) {
        self.halt_flag = p != 0;
    }

    pub fn wait_requested(&self) -> bool {
        self.wait
    }

    pub fn halt_requested(&self) -> bool {
        self.halt_flag
    }

    /// frame boundary: clears the wait flag and timestamps the elapsed time
    pub fn set_wait_time(&mut self) {
        let elapsed = if self.deterministic {
            1.0 / 60.0
        } else {
            let duration = self.prev_time.elapsed();
            self.prev_time = Instant::now();
            duration.as_secs() as f64 + f64::from(duration.subsec_millis()) / 1000.0
        };
        self.wait = false;
        self.wait_time = to_fixed(elapsed).unwrap_or(0x7FFF_FFFF);
    }

    pub fn set_bus_error(&mut self, code: u32) {
        self.bus_error = code;
    }

    /// reads and clears the latch; every device access goes through this
    pub fn take_bus_error(&mut self) -> u32 {
        std::mem::replace(&mut self.bus_error, BUS_ERROR_NONE)
    }
}

impl Default for UtilityDevices {
    fn default() -> Self {
        UtilityDevices::new()
    }
}

/// everything the cpu can reach over the bus
pub struct ConsolePack {
    pub ram: MemorySpace,
    pub gpu: Gpu,
    pub apu: Apu,
    pub pad: GamePad,
    pub dev: UtilityDevices,
}

impl ConsolePack {
    pub fn new() -> Self {
        ConsolePack {
            ram: MemorySpace::new(),
            gpu: Gpu::new(),
            apu: Apu::new(),
            pad: GamePad::new(),
            dev: UtilityDevices::new(),
        }
    }

    pub fn deterministic() -> Self {
        let mut pack = ConsolePack::new();
        pack.dev = UtilityDevices::deterministic();
        pack
    }
}

/// a hard fault: the address is neither RAM nor device space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BusFault(pub u32);

pub fn do_read(pack: &mut ConsolePack, address: u32) -> Result<u32, BusFault> {
    if is_device_address(address) {
        Ok(do_device_read(pack, address))
    } else if (address as usize) < pack.ram.size() {
        Ok(pack.ram.read(address).unwrap_or(0))
    } else {
        Err(BusFault(address))
    }
}

pub fn do_write(pack: &mut ConsolePack, address: u32, data: u32) -> Result<(), BusFault> {
    if is_device_address(address) {
        do_device_write(pack, address, data);
        Ok(())
    } else if pack.ram.write(address, data) {
        Ok(())
    } else {
        Err(BusFault(address))
    }
}

pub fn address_is_valid(pack: &ConsolePack, address: u32) -> bool {
    if is_device_address(address) {
        device_address_to_str(address).is_some()
    } else {
        (address as usize) < pack.ram.size()
    }
}

fn do_device_read(pack: &mut ConsolePack, address: u32) -> u32 {
    if DEBUG_BUS {
        println!("device read from {}",
                 device_address_to_str(address).unwrap_or("<INVALID ADDRESS>"));
    }
    let previous = pack.dev.take_bus_error();
    match address {
        GPU_RESPONSE => pack.gpu.read(),
        TIMER_QUERY_SYNC_ET => pack.dev.query_elapsed_time(),
        RANDOM_NUMBER_GENERATOR => pack.dev.generate_random_number(),
        READ_CONTROLLER => pack.pad.decode(),
        BUS_ERROR => previous,
        GPU_INPUT_STREAM | APU_INPUT_STREAM | TIMER_WAIT_AND_SYNC | HALT_SIGNAL => {
            pack.dev.set_bus_error(BUS_ERROR_READ_ON_WRITE_ONLY);
            0
        }
        _ => {
            pack.dev.set_bus_error(BUS_ERROR_INVALID_ADDRESS);
            0
        }
    }
}

fn do_device_write(pack: &mut ConsolePack, address: u32, data: u32) {
    if DEBUG_BUS {
        println!("device write to {} = {:08X}",
                 device_address_to_str(address).unwrap_or("<INVALID ADDRESS>"), data);
    }
    pack.dev.take_bus_error();
    match address {
        GPU_INPUT_STREAM => {
            if !pack.gpu.io_write(data) {
                pack.dev.set_bus_error(BUS_ERROR_MALFORMED_COMMAND);
            }
        }
        APU_INPUT_STREAM => {
            if !pack.apu.io_write(data) {
                pack.dev.set_bus_error(BUS_ERROR_MALFORMED_COMMAND);
            }
        }
        TIMER_WAIT_AND_SYNC => pack.dev.wait(data),
        HALT_SIGNAL => pack.dev.power(data),
        GPU_RESPONSE | TIMER_QUERY_SYNC_ET | RANDOM_NUMBER_GENERATOR
        | READ_CONTROLLER | BUS_ERROR => {
            pack.dev.set_bus_error(BUS_ERROR_WRITE_ON_READ_ONLY);
        }
        _ => pack.dev.set_bus_error(BUS_ERROR_INVALID_ADDRESS),
    }
}

pub struct Console {
    pub cpu: ErfiCpu,
    pub pack: ConsolePack,
}

impl Console {
    pub fn new() -> Self {
        Console {
            cpu: ErfiCpu::new(),
            pack: ConsolePack::new(),
        }
    }

    /// a console whose RNG and timer behave reproducibly
    pub fn deterministic() -> Self {
        Console {
            cpu: ErfiCpu::new(),
            pack: ConsolePack::deterministic(),
        }
    }

    pub fn load_program(&mut self, program: &[Inst]) -> Result<(), ErfiError> {
        if !self.pack.ram.load_program(program) {
            return Err(ErfiError {
                pc: 0,
                kind: RuntimeErrorKind::AccessViolation,
                message: "program is too large for RAM".to_string(),
            });
        }
        Ok(())
    }

    pub fn step(&mut self) -> Result<(), ErfiError> {
        self.cpu.step(&mut self.pack)
    }

    /// runs instructions until the program waits for the next frame or
    /// asks to halt, then performs the frame boundary work
    pub fn run_until_wait(&mut self) -> Result<(), ErfiError> {
        self.cpu.clear_wait();
        while !self.pack.dev.halt_requested() {
            self.cpu.step(&mut self.pack)?;
            if self.pack.dev.wait_requested() || self.cpu.wait_was_called() {
                break;
            }
        }
        self.finish_frame();
        Ok(())
    }

    /// the frame boundary work: gpu flush, apu mix, timer stamp; drivers
    /// stepping the cpu by hand call this when a frame ends
    pub fn finish_frame(&mut self) {
        self.pack.gpu.flush(&self.pack.ram);
        self.pack.apu.update();
        self.pack.dev.set_wait_time();
    }

    pub fn trying_to_shutdown(&self) -> bool {
        self.pack.dev.halt_requested()
    }

    pub fn press_restart(&mut self) {
        self.cpu.reset();
    }

    /// puts the console into a wait state, as if the program had asked
    pub fn force_wait_state(&mut self) {
        self.pack.dev.wait(!0);
    }

    pub fn register_snapshot(&self) -> [u32; REG_COUNT] {
        *self.cpu.registers()
    }

    pub fn process_button(&mut self, button: Button, pressed: bool) {
        self.pack.pad.update(button, pressed);
    }

    pub fn draw_pixels<F>(&self, func: F)
        where F: FnMut(usize, usize, bool)
    {
        self.pack.gpu.draw_pixels(func);
    }

    pub fn drain_audio_samples(&mut self) -> Vec<i16> {
        self.pack.apu.drain_samples()
    }
}

impl Default for Console {
    fn default() -> Self {
        Console::new()
    }
}
