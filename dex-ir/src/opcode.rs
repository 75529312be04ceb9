use core::fmt;

impl_opcodes! {
    "Waste cycles."
    0x00 Nop "nop" [None, None]
    "Move a 32-bit value between registers."
    0x01 Move "move" [Some(4), Some(4)]
    "Move a 32-bit value from a 16-bit register index."
    0x02 MoveFrom16 "move/from16" [Some(8), Some(16)]
    "Move a 32-bit value between 16-bit register indexes."
    0x03 Move16 "move/16" [Some(16), Some(16)]
    "Move an object reference between registers."
    0x07 MoveObject "move-object" [Some(4), Some(4)]
    "Move an object reference from a 16-bit register index."
    0x08 MoveObjectFrom16 "move-object/from16" [Some(8), Some(16)]
    "Move an object reference between 16-bit register indexes."
    0x09 MoveObject16 "move-object/16" [Some(16), Some(16)]
    "Move the 32-bit result of the most recent invoke into a register."
    0x0a MoveResult "move-result" [Some(8), None]
    "Move the 64-bit result of the most recent invoke into a register pair."
    0x0b MoveResultWide "move-result-wide" [Some(8), None]
    "Move the object result of the most recent invoke into a register."
    0x0c MoveResultObject "move-result-object" [Some(8), None]
    "Load a 4-bit sign-extended literal."
    0x12 Const4 "const/4" [Some(4), None]
    "Load a 16-bit sign-extended literal."
    0x13 Const16 "const/16" [Some(8), None]
    "Load an arbitrary 32-bit literal."
    0x14 Const "const" [Some(8), None]
    "Load a 16-bit literal shifted into the high-order bits."
    0x15 ConstHigh16 "const/high16" [Some(8), None]
    "Load a 16-bit sign-extended literal into a register pair."
    0x16 ConstWide16 "const-wide/16" [Some(8), None]
    "Load a 32-bit sign-extended literal into a register pair."
    0x17 ConstWide32 "const-wide/32" [Some(8), None]
    "Load an arbitrary 64-bit literal into a register pair."
    0x18 ConstWide "const-wide" [Some(8), None]
    "Load a 16-bit literal shifted into the high-order bits of a register pair."
    0x19 ConstWideHigh16 "const-wide/high16" [Some(8), None]
    "Load a reference to an interned string."
    0x1a ConstString "const-string" [Some(8), None]
    "Load a reference to an interned string with a 32-bit index."
    0x1b ConstStringJumbo "const-string/jumbo" [Some(8), None]
    "Load a reference to an interned class."
    0x1c ConstClass "const-class" [Some(8), None]
    "Throw unless the referenced object can be cast to the given type."
    0x1f CheckCast "check-cast" [None, Some(8)]
    "Invoke a virtual method."
    0x6e InvokeVirtual "invoke-virtual" [None, Some(4)]
    "Invoke the superclass implementation of a virtual method."
    0x6f InvokeSuper "invoke-super" [None, Some(4)]
    "Invoke a constructor or private method."
    0x70 InvokeDirect "invoke-direct" [None, Some(4)]
    "Invoke a static method."
    0x71 InvokeStatic "invoke-static" [None, Some(4)]
    "Invoke an interface method."
    0x72 InvokeInterface "invoke-interface" [None, Some(4)]
    "Invoke a virtual method with a contiguous register range."
    0x74 InvokeVirtualRange "invoke-virtual/range" [None, Some(16)]
    "Invoke a superclass method with a contiguous register range."
    0x75 InvokeSuperRange "invoke-super/range" [None, Some(16)]
    "Invoke a direct method with a contiguous register range."
    0x76 InvokeDirectRange "invoke-direct/range" [None, Some(16)]
    "Invoke a static method with a contiguous register range."
    0x77 InvokeStaticRange "invoke-static/range" [None, Some(16)]
    "Invoke an interface method with a contiguous register range."
    0x78 InvokeInterfaceRange "invoke-interface/range" [None, Some(16)]
    "Negate a 32-bit integer."
    0x7b NegInt "neg-int" [Some(4), Some(4)]
    "Add a 16-bit literal to a register."
    0xd0 AddIntLit16 "add-int/lit16" [Some(4), Some(4)]
    "Multiply a register by a 16-bit literal."
    0xd2 MulIntLit16 "mul-int/lit16" [Some(4), Some(4)]
    "Divide a register by a 16-bit literal."
    0xd3 DivIntLit16 "div-int/lit16" [Some(4), Some(4)]
    "Add an 8-bit literal to a register."
    0xd8 AddIntLit8 "add-int/lit8" [Some(8), Some(8)]
    "Multiply a register by an 8-bit literal."
    0xda MulIntLit8 "mul-int/lit8" [Some(8), Some(8)]
    "Divide a register by an 8-bit literal."
    0xdb DivIntLit8 "div-int/lit8" [Some(8), Some(8)]
}

impl Op {
    /// Whether the opcode is any of the invoke family.
    pub const fn is_invoke(&self) -> bool {
        matches!(
            self,
            Op::InvokeVirtual
                | Op::InvokeSuper
                | Op::InvokeDirect
                | Op::InvokeStatic
                | Op::InvokeInterface
                | Op::InvokeVirtualRange
                | Op::InvokeSuperRange
                | Op::InvokeDirectRange
                | Op::InvokeStaticRange
                | Op::InvokeInterfaceRange
        )
    }

    /// Whether the opcode is a range-form invoke.
    pub const fn is_invoke_range(&self) -> bool {
        matches!(
            self,
            Op::InvokeVirtualRange
                | Op::InvokeSuperRange
                | Op::InvokeDirectRange
                | Op::InvokeStaticRange
                | Op::InvokeInterfaceRange
        )
    }

    /// Whether the opcode carries a 64-bit literal operand.
    pub const fn has_literal(&self) -> bool {
        matches!(
            self,
            Op::Const4
                | Op::Const16
                | Op::Const
                | Op::ConstHigh16
                | Op::ConstWide16
                | Op::ConstWide32
                | Op::ConstWide
                | Op::ConstWideHigh16
                | Op::AddIntLit16
                | Op::MulIntLit16
                | Op::DivIntLit16
                | Op::AddIntLit8
                | Op::MulIntLit8
                | Op::DivIntLit8
        )
    }

    /// Whether the opcode carries an interned string handle.
    pub const fn has_string(&self) -> bool {
        matches!(self, Op::ConstString | Op::ConstStringJumbo)
    }

    /// Whether the opcode carries an interned type handle.
    pub const fn has_type(&self) -> bool {
        matches!(self, Op::ConstClass | Op::CheckCast)
    }

    /// Whether the opcode carries an interned method handle.
    pub const fn has_method(&self) -> bool {
        self.is_invoke()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// The raw value does not map to any known opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid opcode {0:#06x}")]
pub struct InvalidOpcode(pub u16);
