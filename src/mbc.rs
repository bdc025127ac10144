use crate::error::CoreError;

/// Defines the Memory Bank Controller type used by the cartridge.
///
/// Only the controllers named in the cartridge header contract (§6) are
/// supported; MBC3 and its real-time-clock registers are out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcType {
    NoMbc,
    Mbc1,
}

impl MbcType {
    /// Determines MBC type, RAM presence, and battery presence from the cartridge type code.
    pub fn from_header(cartridge_type_code: u8) -> Result<(Self, bool, bool), CoreError> {
        match cartridge_type_code {
            0x00 => Ok((MbcType::NoMbc, false, false)),
            0x01 => Ok((MbcType::Mbc1, false, false)),
            0x02 => Ok((MbcType::Mbc1, true, false)),
            0x03 => Ok((MbcType::Mbc1, true, true)),
            _ => Err(CoreError::UnsupportedCartridgeType(cartridge_type_code)),
        }
    }
}
