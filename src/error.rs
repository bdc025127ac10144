use std::fmt;

/// Fatal integrity errors: conditions that stop the emulator and must be
/// reported to the host, per the error-handling design's first error class.
/// These are never recovered from internally and never panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// One of the eleven unused base/CB opcodes was fetched and executed.
    IllegalOpcode { pc: u16, opcode: u8 },
    /// Cartridge header byte 0x0147 names a cartridge type this core does not support.
    UnsupportedCartridgeType(u8),
    /// Cartridge header byte 0x0148 names a ROM size code this core does not support.
    UnsupportedRomSizeCode(u8),
    /// Cartridge header byte 0x0149 names a RAM size code this core does not support.
    UnsupportedRamSizeCode(u8),
    /// The cartridge image is too short to contain a header, or shorter than
    /// the size its own header declares.
    CartridgeTooShort { expected: usize, actual: usize },
    /// An internal state machine reached a value it should be structurally
    /// unable to reach (e.g. a PPU mode outside 0..=3).
    InvariantViolation(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::IllegalOpcode { pc, opcode } => {
                write!(f, "illegal opcode {:#04X} at {:#06X}", opcode, pc)
            }
            CoreError::UnsupportedCartridgeType(code) => {
                write!(f, "unsupported cartridge type {:#04X}", code)
            }
            CoreError::UnsupportedRomSizeCode(code) => {
                write!(f, "unsupported ROM size code {:#04X}", code)
            }
            CoreError::UnsupportedRamSizeCode(code) => {
                write!(f, "unsupported RAM size code {:#04X}", code)
            }
            CoreError::CartridgeTooShort { expected, actual } => write!(
                f,
                "cartridge too short: expected at least {} bytes, got {}",
                expected, actual
            ),
            CoreError::InvariantViolation(msg) => write!(f, "internal invariant violation: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;
