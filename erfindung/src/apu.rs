//! The waveform APU. Instructions arrive over the memory mapped stream as
//! channel / rate-type / value triples; notes are synthesized into per
//! channel sample buffers and mixed into one output buffer the front end
//! drains. The playback device itself lives outside the core.

use std::collections::VecDeque;

use crate::isa::{ApuRateType, Channel, CHANNEL_COUNT};

#[cfg(test)]
#[path = "./apu_test.rs"]
mod apu_test;

pub const SAMPLE_RATE: u32 = 11_025;

const MAX_AMP: i16 = i16::max_value();

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApuInst {
    pub channel: Channel,
    pub rate_type: ApuRateType,
    pub value: i32,
}

#[derive(Clone, Copy)]
enum DutyCycleOption {
    FullWave,
    OneHalf,
    OneThird,
    OneQuarter,
}

impl DutyCycleOption {
    fn from_bits(bits: u32) -> DutyCycleOption {
        match bits & 0x3 {
            0 => DutyCycleOption::FullWave,
            1 => DutyCycleOption::OneHalf,
            2 => DutyCycleOption::OneThird,
            3 => DutyCycleOption::OneQuarter,
            _ => unreachable!(),
        }
    }

    fn passes(self, wave_position: i16) -> bool {
        match self {
            DutyCycleOption::FullWave => true,
            DutyCycleOption::OneHalf => wave_position <= 0,
            DutyCycleOption::OneThird => wave_position <= -(MAX_AMP / 3),
            DutyCycleOption::OneQuarter => wave_position <= -(MAX_AMP / 2),
        }
    }
}

/// walks a 32-bit duty cycle window two bits per wave period
struct DutyCycleIterator {
    position: u32,
    window: u32,
}

impl DutyCycleIterator {
    fn new(window: u32) -> Self {
        DutyCycleIterator { position: 30, window }
    }

    fn advance(&mut self) {
        self.position = (self.position + 2) % 32;
    }

    fn option(&self) -> DutyCycleOption {
        DutyCycleOption::from_bits(self.window >> self.position)
    }
}

fn base_wave(channel: Channel, t: i16) -> i16 {
    match channel {
        Channel::Triangle => {
            let t = i32::from(t);
            let max = i32::from(MAX_AMP);
            if t.abs() < max / 2 {
                t as i16
            } else if t < 0 {
                (-t - max) as i16
            } else {
                (-t + max) as i16
            }
        }
        Channel::PulseOne | Channel::PulseTwo | Channel::Noise => {
            if t < 0 { -MAX_AMP } else { MAX_AMP }
        }
    }
}

pub struct Apu {
    // words of the triple currently being streamed in
    pending: Vec<u32>,
    insts: VecDeque<ApuInst>,
    // samples per note, per channel; zero means "no tempo yet"
    tempos: [u32; CHANNEL_COUNT],
    duty_windows: [u32; CHANNEL_COUNT],
    channel_samples: Vec<Vec<i16>>,
    samples: Vec<i16>,
}

impl Apu {
    pub fn new() -> Self {
        Apu {
            pending: Vec::new(),
            insts: VecDeque::new(),
            tempos: [0; CHANNEL_COUNT],
            duty_windows: [0; CHANNEL_COUNT],
            channel_samples: vec![Vec::new(); CHANNEL_COUNT],
            samples: Vec::new(),
        }
    }

    /// one word of the instruction stream; triples are validated as their
    /// words arrive and a bad word reports false for the bus latch
    pub fn io_write(&mut self, data: u32) -> bool {
        match self.pending.len() {
            0 => {
                if Channel::from_bits(data).is_none() {
                    return false;
                }
                self.pending.push(data);
            }
            1 => {
                if ApuRateType::from_bits(data).is_none() {
                    self.pending.clear();
                    return false;
                }
                self.pending.push(data);
            }
            _ => {
                let channel = match Channel::from_bits(self.pending[0]) {
                    Some(c) => c,
                    None => unreachable!("validated on arrival"),
                };
                let rate_type = match ApuRateType::from_bits(self.pending[1]) {
                    Some(t) => t,
                    None => unreachable!("validated on arrival"),
                };
                self.pending.clear();
                self.enqueue(ApuInst { channel, rate_type, value: data as i32 });
            }
        }
        true
    }

    pub fn enqueue(&mut self, inst: ApuInst) {
        self.insts.push_back(inst);
    }

    /// processes queued instructions and mixes the fresh samples; called
    /// once per frame
    pub fn update(&mut self) {
        self.process_instructions();
        self.merge_samples();
    }

    /// hands the mixed samples to the playback side
    pub fn drain_samples(&mut self) -> Vec<i16> {
        std::mem::replace(&mut self.samples, Vec::new())
    }

    fn process_instructions(&mut self) {
        while let Some(inst) = self.insts.pop_front() {
            let ch = inst.channel.index();
            match inst.rate_type {
                ApuRateType::Note => {
                    let tempo = self.tempos[ch];
                    if tempo == 0 {
                        continue;
                    }
                    generate_note(&mut self.channel_samples[ch], inst.channel,
                                  inst.value, tempo, self.duty_windows[ch]);
                }
                ApuRateType::Tempo => {
                    self.tempos[ch] = if inst.value > 0 {
                        SAMPLE_RATE / inst.value as u32
                    } else {
                        0
                    };
                }
                ApuRateType::DutyCycleWindow => {
                    self.duty_windows[ch] = inst.value as u32;
                }
            }
        }
    }

    fn merge_samples(&mut self) {
        let longest = self.channel_samples.iter().map(Vec::len).max().unwrap_or(0);
        for i in 0..longest {
            let mut mixed: i32 = 0;
            for channel in &self.channel_samples {
                mixed += i32::from(channel.get(i).cloned().unwrap_or(0));
            }
            let clamped = mixed.max(i32::from(-MAX_AMP)).min(i32::from(MAX_AMP));
            self.samples.push(clamped as i16);
        }
        for channel in &mut self.channel_samples {
            channel.clear();
        }
    }
}

impl Default for Apu {
    fn default() -> Self {
        Apu::new()
    }
}

/// one note: `tempo` samples of the channel's base wave at `pitch` hertz,
/// gated by the duty cycle window two bits per period
fn generate_note(samples: &mut Vec<i16>, channel: Channel, pitch: i32, tempo: u32,
                 duty_window: u32)
{
    // zero hertz is silence; if it's not moving, it doesn't make a sound
    if pitch <= 0 {
        for _ in 0..tempo {
            samples.push(0);
        }
        return;
    }
    let mut dci = DutyCycleIterator::new(duty_window);
    let mut wave_position: i32 = i32::from(-MAX_AMP);
    for _ in 0..tempo {
        let t = wave_position as i16;
        let sample = if dci.option().passes(t) { base_wave(channel, t) } else { 0 };
        samples.push(sample);
        wave_position += pitch;
        if wave_position > i32::from(MAX_AMP) {
            dci.advance();
            wave_position = i32::from(-MAX_AMP);
        }
    }
}
