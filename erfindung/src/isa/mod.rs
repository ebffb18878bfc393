// these modules are re-exported as a single module

pub use self::register::*;
mod register;

pub use self::op::*;
mod op;

pub use self::devices::*;
mod devices;

pub use self::instruction::*;
mod instruction;

pub use self::disasm::*;
mod disasm;
