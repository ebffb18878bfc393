// these modules are re-exported as a single module

pub use self::breakpoints::*;
mod breakpoints;

pub use self::debugger::*;
mod debugger;
