//! # The `impl_opcodes!` macro
//!
//! The opcode table is kept as a single source of truth from which the
//! [`Op`](crate::Op) enum and its implementations are derived.
//!
//! Its usage looks like this:
//!
//! ```rust,ignore
//! impl_opcodes! {
//!     "Move a 32-bit value between registers."
//!     0x01 Move "move" [Some(4), Some(4)]
//!     "Move a 32-bit value to a 16-bit register index."
//!     0x03 Move16 "move/16" [Some(16), Some(16)]
//!     // ...
//! }
//! ```
//!
//! Each row includes:
//!
//! - A short docstring.
//! - The 16-bit opcode value from the DEX bytecode specification.
//! - An identifier for the enum variant.
//! - The assembler mnemonic.
//! - The register-field bit widths `[dest, src]`: the number of bits
//!   available to encode the destination register and each source
//!   register, or `None` when the opcode has no such operand. All
//!   register sources of a single DEX opcode share one width.
//!
//! The macro derives the enum itself (with the opcode value as the
//! `u16` discriminant), a `TryFrom<u16>` implementation that rejects
//! unknown values with [`InvalidOpcode`](crate::InvalidOpcode), and the
//! `mnemonic`/`dest_width`/`src_width` lookup tables.

macro_rules! impl_opcodes {
    (
        $(
            $doc:literal
            $value:literal $Op:ident $mnemonic:literal [$dest:expr, $src:expr]
        )*
    ) => {
        /// A DEX bytecode opcode.
        ///
        /// Discriminants are the 16-bit numeric codes of the target
        /// bytecode specification.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u16)]
        pub enum Op {
            $(
                #[doc = $doc]
                $Op = $value,
            )*
        }

        impl Op {
            /// The assembler mnemonic of the opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $(Self::$Op => $mnemonic,)*
                }
            }

            /// Bit width of the destination register field, or `None`
            /// when the opcode writes no register.
            pub const fn dest_width(&self) -> Option<u8> {
                match self {
                    $(Self::$Op => $dest,)*
                }
            }

            /// Bit width of each source register field, or `None` when
            /// the opcode reads no registers.
            pub const fn src_width(&self) -> Option<u8> {
                match self {
                    $(Self::$Op => $src,)*
                }
            }
        }

        impl core::convert::TryFrom<u16> for Op {
            type Error = $crate::InvalidOpcode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$Op),)*
                    _ => Err($crate::InvalidOpcode(value)),
                }
            }
        }
    };
}
