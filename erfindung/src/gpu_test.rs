use pretty_assertions::assert_eq;

use crate::gpu::{Gpu, SCREEN_WIDTH};
use crate::isa::{GPU_CMD_CLEAR, GPU_CMD_DRAW, GPU_CMD_UPLOAD};
use crate::memory::MemorySpace;

fn pixel(gpu: &Gpu, x: usize, y: usize) -> bool {
    gpu.screen()[x + y * SCREEN_WIDTH]
}

#[test]
fn uploads_answer_with_fresh_sprite_indices() {
    let mut gpu = Gpu::new();
    for word in &[GPU_CMD_UPLOAD, 8, 8, 0x100] {
        assert!(gpu.io_write(*word));
    }
    assert_eq!(0, gpu.read());
    for word in &[GPU_CMD_UPLOAD, 8, 8, 0x120] {
        assert!(gpu.io_write(*word));
    }
    assert_eq!(1, gpu.read());
}

#[test]
fn unknown_command_words_are_malformed() {
    let mut gpu = Gpu::new();
    assert!(!gpu.io_write(99));
    // the stream recovers on the next valid command
    assert!(gpu.io_write(GPU_CMD_CLEAR));
}

#[test]
fn draw_blits_uploaded_bits_at_the_flush() {
    let mut mem = MemorySpace::new();
    // a 8x4 sprite: first row set, rest clear
    mem.write(0x40, 0xFF00_0000);
    let mut gpu = Gpu::new();
    for word in &[GPU_CMD_UPLOAD, 8, 4, 0x40] {
        gpu.io_write(*word);
    }
    let index = gpu.read();
    for word in &[GPU_CMD_DRAW, 10, 20, index] {
        gpu.io_write(*word);
    }
    gpu.flush(&mem);
    assert!(pixel(&gpu, 10, 20));
    assert!(pixel(&gpu, 17, 20));
    assert!(!pixel(&gpu, 18, 20));
    assert!(!pixel(&gpu, 10, 21));
}

#[test]
fn clear_wipes_the_framebuffer() {
    let mut mem = MemorySpace::new();
    mem.write(0, 0xFFFF_FFFF);
    let mut gpu = Gpu::new();
    for word in &[GPU_CMD_UPLOAD, 4, 4, 0, GPU_CMD_DRAW, 0, 0, 0] {
        gpu.io_write(*word);
    }
    gpu.flush(&mem);
    assert!(pixel(&gpu, 0, 0));
    gpu.io_write(GPU_CMD_CLEAR);
    gpu.flush(&mem);
    assert!(!pixel(&gpu, 0, 0));
}

#[test]
fn draws_clip_at_the_screen_edges() {
    let mut mem = MemorySpace::new();
    mem.write(0, 0xFFFF_FFFF);
    let mut gpu = Gpu::new();
    for word in &[GPU_CMD_UPLOAD, 4, 4, 0, GPU_CMD_DRAW, 318, 238, 0] {
        gpu.io_write(*word);
    }
    gpu.flush(&mem);
    assert!(pixel(&gpu, 318, 238));
    assert!(pixel(&gpu, 319, 239));
}

#[test]
fn drawing_an_unknown_sprite_is_a_no_op() {
    let mem = MemorySpace::new();
    let mut gpu = Gpu::new();
    for word in &[GPU_CMD_DRAW, 0, 0, 7] {
        gpu.io_write(*word);
    }
    gpu.flush(&mem);
    assert!(!pixel(&gpu, 0, 0));
}
