//! Sticky exception flags and trap enable bits

use bitflags::bitflags;

bitflags! {
    /// Sticky exception flags recorded on a context
    ///
    /// A flag stays set until the context's flags are explicitly cleared.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u8 {
        const UNDERFLOW = 0x01;
        const OVERFLOW = 0x02;
        const INEXACT = 0x04;
        const INVALID = 0x08;
        const ERANGE = 0x10;
        const DIVZERO = 0x20;
    }
}

bitflags! {
    /// Per-exception trap bits
    ///
    /// The first six bits share their position with the matching [`Flags`]
    /// bit. `EXPBOUND` has no sticky counterpart.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Traps: u8 {
        const UNDERFLOW = 0x01;
        const OVERFLOW = 0x02;
        const INEXACT = 0x04;
        const INVALID = 0x08;
        const ERANGE = 0x10;
        const DIVZERO = 0x20;
        const EXPBOUND = 0x40;
    }
}

impl Traps {
    /// The trap bits that correspond to a set of raised flags
    pub fn for_flags(flags: Flags) -> Self {
        Traps::from_bits_truncate(flags.bits())
    }
}

impl Flags {
    /// Names of the flags in display order
    pub const NAMES: [(&'static str, Flags); 6] = [
        ("underflow", Flags::UNDERFLOW),
        ("overflow", Flags::OVERFLOW),
        ("inexact", Flags::INEXACT),
        ("invalid", Flags::INVALID),
        ("erange", Flags::ERANGE),
        ("divzero", Flags::DIVZERO),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_and_trap_bits_line_up() {
        for (_, flag) in Flags::NAMES {
            assert_eq!(Traps::for_flags(flag).bits(), flag.bits());
        }
        assert!(!Traps::for_flags(Flags::all()).contains(Traps::EXPBOUND));
    }
}
