//! Shorthand constructors, to make it easier to hand-write IR for
//! rules and tests.
//!
//! Registers are virtual, so constructors do not restrict register
//! numbers to the widths of any particular encoding.

use crate::{DexMethodRef, DexString, DexType, IrInstruction, Op, Reg};

fn with_dest(op: Op, dest: Reg) -> IrInstruction {
    let mut insn = IrInstruction::new(op);
    insn.set_dest(dest);
    insn
}

fn with_dest_src(op: Op, dest: Reg, src: Reg) -> IrInstruction {
    let mut insn = with_dest(op, dest);
    insn.set_srcs(vec![src]);
    insn
}

fn with_dest_literal(op: Op, dest: Reg, literal: i64) -> IrInstruction {
    let mut insn = with_dest(op, dest);
    insn.set_literal(literal);
    insn
}

fn lit_arith(op: Op, dest: Reg, src: Reg, literal: i64) -> IrInstruction {
    let mut insn = with_dest_src(op, dest, src);
    insn.set_literal(literal);
    insn
}

fn invoke(op: Op, method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    let mut insn = IrInstruction::new(op);
    insn.set_srcs(args.to_vec());
    insn.set_method(method);
    insn
}

/// Waste cycles.
pub fn nop() -> IrInstruction {
    IrInstruction::new(Op::Nop)
}

/// Move a 32-bit value between registers.
pub fn move_(dest: Reg, src: Reg) -> IrInstruction {
    with_dest_src(Op::Move, dest, src)
}

/// Move a 32-bit value from a 16-bit register index.
pub fn move_from16(dest: Reg, src: Reg) -> IrInstruction {
    with_dest_src(Op::MoveFrom16, dest, src)
}

/// Move a 32-bit value between 16-bit register indexes.
pub fn move_16(dest: Reg, src: Reg) -> IrInstruction {
    with_dest_src(Op::Move16, dest, src)
}

/// Move an object reference between registers.
pub fn move_object(dest: Reg, src: Reg) -> IrInstruction {
    with_dest_src(Op::MoveObject, dest, src)
}

/// Move an object reference from a 16-bit register index.
pub fn move_object_from16(dest: Reg, src: Reg) -> IrInstruction {
    with_dest_src(Op::MoveObjectFrom16, dest, src)
}

/// Move an object reference between 16-bit register indexes.
pub fn move_object_16(dest: Reg, src: Reg) -> IrInstruction {
    with_dest_src(Op::MoveObject16, dest, src)
}

/// Move the 32-bit result of the most recent invoke into a register.
pub fn move_result(dest: Reg) -> IrInstruction {
    with_dest(Op::MoveResult, dest)
}

/// Move the 64-bit result of the most recent invoke into a register pair.
pub fn move_result_wide(dest: Reg) -> IrInstruction {
    with_dest(Op::MoveResultWide, dest)
}

/// Move the object result of the most recent invoke into a register.
pub fn move_result_object(dest: Reg) -> IrInstruction {
    with_dest(Op::MoveResultObject, dest)
}

/// Load a 4-bit sign-extended literal.
pub fn const_4(dest: Reg, literal: i64) -> IrInstruction {
    with_dest_literal(Op::Const4, dest, literal)
}

/// Load a 16-bit sign-extended literal.
pub fn const_16(dest: Reg, literal: i64) -> IrInstruction {
    with_dest_literal(Op::Const16, dest, literal)
}

/// Load an arbitrary 32-bit literal.
pub fn const_(dest: Reg, literal: i64) -> IrInstruction {
    with_dest_literal(Op::Const, dest, literal)
}

/// Load a 16-bit literal shifted into the high-order bits.
pub fn const_high16(dest: Reg, literal: i64) -> IrInstruction {
    with_dest_literal(Op::ConstHigh16, dest, literal)
}

/// Load a 16-bit sign-extended literal into a register pair.
pub fn const_wide_16(dest: Reg, literal: i64) -> IrInstruction {
    with_dest_literal(Op::ConstWide16, dest, literal)
}

/// Load a 32-bit sign-extended literal into a register pair.
pub fn const_wide_32(dest: Reg, literal: i64) -> IrInstruction {
    with_dest_literal(Op::ConstWide32, dest, literal)
}

/// Load an arbitrary 64-bit literal into a register pair.
pub fn const_wide(dest: Reg, literal: i64) -> IrInstruction {
    with_dest_literal(Op::ConstWide, dest, literal)
}

/// Load a 16-bit literal shifted into the high-order bits of a register pair.
pub fn const_wide_high16(dest: Reg, literal: i64) -> IrInstruction {
    with_dest_literal(Op::ConstWideHigh16, dest, literal)
}

/// Load a reference to an interned string.
pub fn const_string(dest: Reg, string: DexString) -> IrInstruction {
    let mut insn = with_dest(Op::ConstString, dest);
    insn.set_string(string);
    insn
}

/// Load a reference to an interned string with a 32-bit index.
pub fn const_string_jumbo(dest: Reg, string: DexString) -> IrInstruction {
    let mut insn = with_dest(Op::ConstStringJumbo, dest);
    insn.set_string(string);
    insn
}

/// Load a reference to an interned class.
pub fn const_class(dest: Reg, ty: DexType) -> IrInstruction {
    let mut insn = with_dest(Op::ConstClass, dest);
    insn.set_ty(ty);
    insn
}

/// Throw unless the referenced object can be cast to the given type.
pub fn check_cast(src: Reg, ty: DexType) -> IrInstruction {
    let mut insn = IrInstruction::new(Op::CheckCast);
    insn.set_srcs(vec![src]);
    insn.set_ty(ty);
    insn
}

/// Invoke a virtual method.
pub fn invoke_virtual(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeVirtual, method, args)
}

/// Invoke the superclass implementation of a virtual method.
pub fn invoke_super(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeSuper, method, args)
}

/// Invoke a constructor or private method.
pub fn invoke_direct(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeDirect, method, args)
}

/// Invoke a static method.
pub fn invoke_static(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeStatic, method, args)
}

/// Invoke an interface method.
pub fn invoke_interface(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeInterface, method, args)
}

/// Invoke a virtual method with a contiguous register range.
pub fn invoke_virtual_range(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeVirtualRange, method, args)
}

/// Invoke a superclass method with a contiguous register range.
pub fn invoke_super_range(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeSuperRange, method, args)
}

/// Invoke a direct method with a contiguous register range.
pub fn invoke_direct_range(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeDirectRange, method, args)
}

/// Invoke a static method with a contiguous register range.
pub fn invoke_static_range(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeStaticRange, method, args)
}

/// Invoke an interface method with a contiguous register range.
pub fn invoke_interface_range(method: DexMethodRef, args: &[Reg]) -> IrInstruction {
    invoke(Op::InvokeInterfaceRange, method, args)
}

/// Negate a 32-bit integer.
pub fn neg_int(dest: Reg, src: Reg) -> IrInstruction {
    with_dest_src(Op::NegInt, dest, src)
}

/// Add a 16-bit literal to a register.
pub fn add_int_lit16(dest: Reg, src: Reg, literal: i64) -> IrInstruction {
    lit_arith(Op::AddIntLit16, dest, src, literal)
}

/// Multiply a register by a 16-bit literal.
pub fn mul_int_lit16(dest: Reg, src: Reg, literal: i64) -> IrInstruction {
    lit_arith(Op::MulIntLit16, dest, src, literal)
}

/// Divide a register by a 16-bit literal.
pub fn div_int_lit16(dest: Reg, src: Reg, literal: i64) -> IrInstruction {
    lit_arith(Op::DivIntLit16, dest, src, literal)
}

/// Add an 8-bit literal to a register.
pub fn add_int_lit8(dest: Reg, src: Reg, literal: i64) -> IrInstruction {
    lit_arith(Op::AddIntLit8, dest, src, literal)
}

/// Multiply a register by an 8-bit literal.
pub fn mul_int_lit8(dest: Reg, src: Reg, literal: i64) -> IrInstruction {
    lit_arith(Op::MulIntLit8, dest, src, literal)
}

/// Divide a register by an 8-bit literal.
pub fn div_int_lit8(dest: Reg, src: Reg, literal: i64) -> IrInstruction {
    lit_arith(Op::DivIntLit8, dest, src, literal)
}
