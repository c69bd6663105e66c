use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::warn;

/// Keys and mouse buttons a feature can be bound to.
///
/// Discriminants are the Windows virtual-key codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Display, EnumIter,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[repr(u16)]
pub enum VirtualKey {
    Mouse1 = 0x01,
    Mouse2 = 0x02,
    Mouse3 = 0x04,
    Mouse4 = 0x05,
    Mouse5 = 0x06,
    Backspace = 0x08,
    Tab = 0x09,
    Enter = 0x0D,
    Shift = 0x10,
    Ctrl = 0x11,
    Alt = 0x12,
    Esc = 0x1B,
    Space = 0x20,
    #[strum(serialize = "0")]
    Digit0 = 0x30,
    #[strum(serialize = "1")]
    Digit1 = 0x31,
    #[strum(serialize = "2")]
    Digit2 = 0x32,
    #[strum(serialize = "3")]
    Digit3 = 0x33,
    #[strum(serialize = "4")]
    Digit4 = 0x34,
    #[strum(serialize = "5")]
    Digit5 = 0x35,
    #[strum(serialize = "6")]
    Digit6 = 0x36,
    #[strum(serialize = "7")]
    Digit7 = 0x37,
    #[strum(serialize = "8")]
    Digit8 = 0x38,
    #[strum(serialize = "9")]
    Digit9 = 0x39,
    A = 0x41,
    B = 0x42,
    C = 0x43,
    D = 0x44,
    E = 0x45,
    F = 0x46,
    G = 0x47,
    H = 0x48,
    I = 0x49,
    J = 0x4A,
    K = 0x4B,
    L = 0x4C,
    M = 0x4D,
    N = 0x4E,
    O = 0x4F,
    P = 0x50,
    Q = 0x51,
    R = 0x52,
    S = 0x53,
    T = 0x54,
    U = 0x55,
    V = 0x56,
    W = 0x57,
    X = 0x58,
    Y = 0x59,
    Z = 0x5A,
    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    F11 = 0x7A,
    F12 = 0x7B,
}

impl VirtualKey {
    /// Key used when a configured name is not recognised
    pub const FALLBACK: Self = Self::Space;

    /// Parse a symbolic name, falling back to [`Self::FALLBACK`].
    pub fn from_name(name: &str) -> Self {
        match Self::from_str(name.trim()) {
            Ok(key) => key,
            Err(_) => {
                warn!("Unknown key '{}', using {}", name, Self::FALLBACK);
                Self::FALLBACK
            }
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}
