use std::fmt;

/// A fetched 16-bit instruction word.
///
/// Field accessors follow the conventional nibble names: `0xOXYN`, with `NN` the low byte and
/// `NNN` the low 12 bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Instruction(pub u16);

impl Instruction {
    #[inline]
    pub const fn from_bytes(hi: u8, lo: u8) -> Self {
        Self(u16::from_be_bytes([hi, lo]))
    }

    #[inline]
    pub const fn word(self) -> u16 {
        self.0
    }

    /// Top nibble; indexes the primary dispatch table.
    #[inline]
    pub const fn opcode(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// Bottom nibble; indexes the arithmetic (`0x8`) dispatch table.
    #[inline]
    pub const fn sub_opcode(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    #[inline]
    pub const fn x(self) -> usize {
        ((self.0 & 0x0F00) >> 8) as usize
    }

    #[inline]
    pub const fn y(self) -> usize {
        ((self.0 & 0x00F0) >> 4) as usize
    }

    #[inline]
    pub const fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    #[inline]
    pub const fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    #[inline]
    pub const fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction({:#06x})", self.0)
    }
}

impl From<u16> for Instruction {
    fn from(word: u16) -> Self {
        Self(word)
    }
}
