#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpCode {
    // R-type, accept RRR or RRI; times/divide/modulus/comp also split on
    // the fixed point flag
    Plus,
    Minus,
    Times,
    Divide,
    Modulus,
    And,
    Or,
    Xor,
    Rotate,
    Comp,
    // S-type
    Set,
    // M-type
    Save,
    Load,
    // J-type
    Skip,
    Call,
    // unary
    Not,
    // deprecated legacy form, kept for tests; production code drives the
    // devices through memory mapped writes
    SystemCall,
}

impl OpCode {
    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn from_bits(bits: u32) -> Option<OpCode> {
        use self::OpCode::*;
        match bits & 0x1F {
            0 => Some(Plus),
            1 => Some(Minus),
            2 => Some(Times),
            3 => Some(Divide),
            4 => Some(Modulus),
            5 => Some(And),
            6 => Some(Or),
            7 => Some(Xor),
            8 => Some(Rotate),
            9 => Some(Comp),
            10 => Some(Set),
            11 => Some(Save),
            12 => Some(Load),
            13 => Some(Skip),
            14 => Some(Call),
            15 => Some(Not),
            16 => Some(SystemCall),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        use self::OpCode::*;
        match self {
            Plus => "plus",
            Minus => "minus",
            Times => "times",
            Divide => "div",
            Modulus => "mod",
            And => "and",
            Or => "or",
            Xor => "xor",
            Rotate => "rotate",
            Comp => "comp",
            Set => "set",
            Save => "save",
            Load => "load",
            Skip => "skip",
            Call => "call",
            Not => "not",
            SystemCall => "syscall",
        }
    }
}

/// the operand shape of an instruction as the encoder sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamForm {
    RegRegReg,
    RegRegImmd,
    RegReg,
    RegImmd,
    Reg,
    Immd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RTypeParamForm {
    ThreeRegsInt,
    TwoRegsImmdInt,
    // the fixed point flag doubles as the upper parameter form bit
    ThreeRegsFp,
    TwoRegsImmdFp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MTypeParamForm {
    TwoRegsImmd,
    TwoRegs,
    OneRegImmd,
    Invalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum STypeParamForm {
    TwoRegs,
    OneRegImmdInt,
    // the label addressing form: r0 = r1 + immd
    TwoRegsImmd,
    OneRegImmdFp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JTypeParamForm {
    Reg,
    Immd,
}

/// device operations selected by the legacy SYSTEM_CALL immediate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemCallValue {
    UploadSprite,
    UnloadSprite,
    DrawSprite,
    ScreenClear,
    WaitForFrame,
    ReadInput,
}

impl SystemCallValue {
    pub fn from_immd(v: i32) -> Option<SystemCallValue> {
        use self::SystemCallValue::*;
        match v {
            0 => Some(UploadSprite),
            1 => Some(UnloadSprite),
            2 => Some(DrawSprite),
            3 => Some(ScreenClear),
            4 => Some(WaitForFrame),
            5 => Some(ReadInput),
            _ => None,
        }
    }
}
