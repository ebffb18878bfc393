//! The tile style GPU. Commands arrive one word at a time over the memory
//! mapped input stream; completed commands queue up and run against RAM at
//! the next frame flush. The screen is a 320x240 1-bit framebuffer.

use std::collections::HashMap;

use crate::isa::{gpu_params_per_command, GPU_CMD_CLEAR, GPU_CMD_DRAW, GPU_CMD_UPLOAD};
use crate::memory::MemorySpace;

#[cfg(test)]
#[path = "./gpu_test.rs"]
mod gpu_test;

pub const SCREEN_WIDTH: usize = 320;
pub const SCREEN_HEIGHT: usize = 240;

struct SpriteMeta {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

enum GpuCommand {
    Upload { index: u32, width: u32, height: u32, address: u32 },
    Draw { x: u32, y: u32, index: u32 },
    Clear,
}

pub struct Gpu {
    // words of the command currently being streamed in
    pending: Vec<u32>,
    queue: Vec<GpuCommand>,
    sprites: HashMap<u32, SpriteMeta>,
    next_index: u32,
    response: u32,
    screen_pixels: Vec<bool>,
}

impl Gpu {
    pub fn new() -> Self {
        Gpu {
            pending: Vec::new(),
            queue: Vec::new(),
            sprites: HashMap::new(),
            next_index: 0,
            response: 0,
            screen_pixels: vec![false; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// one word of the command stream; false marks a malformed command,
    /// which the bus reports through the error latch
    pub fn io_write(&mut self, data: u32) -> bool {
        if self.pending.is_empty() && gpu_params_per_command(data).is_none() {
            return false;
        }
        self.pending.push(data);
        let needed = match gpu_params_per_command(self.pending[0]) {
            Some(n) => n,
            None => return false,
        };
        if self.pending.len() == needed + 1 {
            let words: Vec<u32> = self.pending.drain(..).collect();
            self.finish_command(&words);
        }
        true
    }

    /// the command output ROM: the sprite index of the last upload
    pub fn read(&self) -> u32 {
        self.response
    }

    fn finish_command(&mut self, words: &[u32]) {
        match words[0] {
            GPU_CMD_UPLOAD => {
                let index = self.next_index;
                self.next_index += 1;
                self.response = index;
                self.queue.push(GpuCommand::Upload {
                    index,
                    width: words[1],
                    height: words[2],
                    address: words[3],
                });
            }
            GPU_CMD_DRAW => {
                self.queue.push(GpuCommand::Draw {
                    x: words[1],
                    y: words[2],
                    index: words[3],
                });
            }
            GPU_CMD_CLEAR => self.queue.push(GpuCommand::Clear),
            _ => unreachable!("io_write validated the command word"),
        }
    }

    // legacy register addressed entry points, used by the system call form

    pub fn upload_sprite(&mut self, width: u32, height: u32, address: u32) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        self.response = index;
        self.queue.push(GpuCommand::Upload { index, width, height, address });
        index
    }

    pub fn unload_sprite(&mut self, index: u32) {
        self.sprites.remove(&index);
    }

    pub fn draw_sprite(&mut self, x: u32, y: u32, index: u32) {
        self.queue.push(GpuCommand::Draw { x, y, index });
    }

    pub fn screen_clear(&mut self) {
        self.queue.push(GpuCommand::Clear);
    }

    /// runs the queued commands; called at every frame boundary
    pub fn flush(&mut self, memory: &MemorySpace) {
        let queue = std::mem::replace(&mut self.queue, Vec::new());
        for command in queue {
            match command {
                GpuCommand::Upload { index, width, height, address } => {
                    let pixels = read_sprite_bits(memory, address, width, height);
                    self.sprites.insert(index, SpriteMeta { width, height, pixels });
                }
                GpuCommand::Draw { x, y, index } => {
                    if let Some(sprite) = self.sprites.get(&index) {
                        blit(&mut self.screen_pixels, sprite, x, y);
                    }
                }
                GpuCommand::Clear => {
                    for px in &mut self.screen_pixels {
                        *px = false;
                    }
                }
            }
        }
    }

    pub fn screen(&self) -> &[bool] {
        &self.screen_pixels
    }

    pub fn draw_pixels<F>(&self, mut func: F)
        where F: FnMut(usize, usize, bool)
    {
        let mut x = 0;
        let mut y = 0;
        for &px in &self.screen_pixels {
            func(x, y, px);
            x += 1;
            if x == SCREEN_WIDTH {
                x = 0;
                y += 1;
            }
        }
    }
}

impl Default for Gpu {
    fn default() -> Self {
        Gpu::new()
    }
}

/// sprite bits are packed msb first, reading words from `address` upward
fn read_sprite_bits(memory: &MemorySpace, address: u32, width: u32, height: u32)
    -> Vec<bool>
{
    // uploads larger than the screen itself are clipped away anyway
    let count = (u64::from(width) * u64::from(height))
        .min((SCREEN_WIDTH * SCREEN_HEIGHT) as u64) as usize;
    let mut pixels = Vec::with_capacity(count);
    let mut word_addr = address;
    let mut bit_index = 0;
    for _ in 0..count {
        let word = memory.read(word_addr).unwrap_or(0);
        pixels.push((word >> (31 - bit_index)) & 1 != 0);
        if bit_index == 31 {
            word_addr += 1;
            bit_index = 0;
        } else {
            bit_index += 1;
        }
    }
    pixels
}

fn blit(screen: &mut [bool], sprite: &SpriteMeta, x: u32, y: u32) {
    for sy in 0..sprite.height as usize {
        let y_comp = sy + y as usize;
        if y_comp >= SCREEN_HEIGHT {
            return;
        }
        for sx in 0..sprite.width as usize {
            let x_comp = sx + x as usize;
            if x_comp >= SCREEN_WIDTH {
                break;
            }
            let bit = sprite.pixels.get(sx + sy * sprite.width as usize)
                .cloned()
                .unwrap_or(false);
            screen[x_comp + y_comp * SCREEN_WIDTH] = bit;
        }
    }
}
