//! Memory mapped device addresses and the wire constants shared by the
//! assembler's `io` pseudo instructions and the device implementations.

pub const RESERVED_NULL: u32 = 0x8000_0000;
pub const GPU_INPUT_STREAM: u32 = 0x8000_0001;
pub const GPU_RESPONSE: u32 = 0x8000_0002;
pub const APU_INPUT_STREAM: u32 = 0x8000_0003;
pub const TIMER_WAIT_AND_SYNC: u32 = 0x8000_0004;
pub const TIMER_QUERY_SYNC_ET: u32 = 0x8000_0005;
pub const RANDOM_NUMBER_GENERATOR: u32 = 0x8000_0006;
pub const READ_CONTROLLER: u32 = 0x8000_0007;
pub const HALT_SIGNAL: u32 = 0x8000_0008;
pub const BUS_ERROR: u32 = 0x8000_0009;

pub const DEVICE_ADDRESS_MASK: u32 = 0x8000_0000;

pub fn is_device_address(address: u32) -> bool {
    address & DEVICE_ADDRESS_MASK != 0
}

pub fn device_address_to_str(address: u32) -> Option<&'static str> {
    match address {
        RESERVED_NULL => Some("RESERVED_NULL"),
        GPU_INPUT_STREAM => Some("GPU_INPUT_STREAM"),
        GPU_RESPONSE => Some("GPU_RESPONSE"),
        APU_INPUT_STREAM => Some("APU_INPUT_STREAM"),
        TIMER_WAIT_AND_SYNC => Some("TIMER_WAIT_AND_SYNC"),
        TIMER_QUERY_SYNC_ET => Some("TIMER_QUERY_SYNC_ET"),
        RANDOM_NUMBER_GENERATOR => Some("RANDOM_NUMBER_GENERATOR"),
        READ_CONTROLLER => Some("READ_CONTROLLER"),
        HALT_SIGNAL => Some("HALT_SIGNAL"),
        BUS_ERROR => Some("BUS_ERROR"),
        _ => None,
    }
}

// GPU command stream opcodes
pub const GPU_CMD_UPLOAD: u32 = 0;
pub const GPU_CMD_DRAW: u32 = 1;
pub const GPU_CMD_CLEAR: u32 = 2;

/// parameter words following a GPU command word
pub fn gpu_params_per_command(command: u32) -> Option<usize> {
    match command {
        GPU_CMD_UPLOAD => Some(3), // width, height, address
        GPU_CMD_DRAW => Some(3),   // x, y, sprite index
        GPU_CMD_CLEAR => Some(0),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Triangle,
    PulseOne,
    PulseTwo,
    Noise,
}

pub const CHANNEL_COUNT: usize = 4;

impl Channel {
    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_bits(bits: u32) -> Option<Channel> {
        match bits {
            0 => Some(Channel::Triangle),
            1 => Some(Channel::PulseOne),
            2 => Some(Channel::PulseTwo),
            3 => Some(Channel::Noise),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApuRateType {
    Note,
    Tempo,
    DutyCycleWindow,
}

impl ApuRateType {
    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn from_bits(bits: u32) -> Option<ApuRateType> {
        match bits {
            0 => Some(ApuRateType::Note),
            1 => Some(ApuRateType::Tempo),
            2 => Some(ApuRateType::DutyCycleWindow),
            _ => None,
        }
    }
}

/// controller button bits
pub const PAD_UP: u32 = 1;
pub const PAD_DOWN: u32 = 1 << 1;
pub const PAD_LEFT: u32 = 1 << 2;
pub const PAD_RIGHT: u32 = 1 << 3;
pub const PAD_A: u32 = 1 << 4;
pub const PAD_B: u32 = 1 << 5;
pub const PAD_START: u32 = 1 << 6;
