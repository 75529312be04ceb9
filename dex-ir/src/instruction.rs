use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicU32, Ordering};

use crate::{DexMethodRef, DexString, DexType, Op};

/// A virtual register number.
///
/// Registers are unconstrained at the IR level; whether a register fits
/// an opcode's encoded field is decided when an encoding is selected.
pub type Reg = u16;

static NEXT_INSN_ID: AtomicU32 = AtomicU32::new(0);

/// Process-unique identity of an [`IrInstruction`].
///
/// `Clone`ing an instruction copies its identity; [`IrInstruction::duplicate`]
/// allocates a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsnId(u32);

impl InsnId {
    fn fresh() -> Self {
        Self(NEXT_INSN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A decoded IR instruction.
///
/// Instructions carry identity (see [`InsnId`]); equality and hashing
/// compare the semantic fields only, so structurally equal instructions
/// at different positions compare equal.
#[derive(Debug, Clone)]
pub struct IrInstruction {
    id: InsnId,
    op: Op,
    dest: Option<Reg>,
    srcs: Vec<Reg>,
    literal: i64,
    string: Option<DexString>,
    ty: Option<DexType>,
    method: Option<DexMethodRef>,
}

impl IrInstruction {
    /// A bare instruction with the given opcode and no operands.
    pub fn new(op: Op) -> Self {
        Self {
            id: InsnId::fresh(),
            op,
            dest: None,
            srcs: Vec::new(),
            literal: 0,
            string: None,
            ty: None,
            method: None,
        }
    }

    /// An equivalent new instruction with a fresh identity.
    pub fn duplicate(&self) -> Self {
        Self {
            id: InsnId::fresh(),
            ..self.clone()
        }
    }

    /// The instruction's identity.
    pub const fn id(&self) -> InsnId {
        self.id
    }

    /// The instruction's opcode.
    pub const fn op(&self) -> Op {
        self.op
    }

    /// The destination register, if any.
    pub const fn dest(&self) -> Option<Reg> {
        self.dest
    }

    /// Number of destination registers (0 or 1).
    pub const fn dests_size(&self) -> usize {
        self.dest.is_some() as usize
    }

    /// The source registers in operand order.
    pub fn srcs(&self) -> &[Reg] {
        &self.srcs
    }

    /// Number of source registers.
    pub fn srcs_size(&self) -> usize {
        self.srcs.len()
    }

    /// The `i`-th source register.
    ///
    /// # Panics
    ///
    /// Panics when `i >= srcs_size()`.
    pub fn src(&self, i: usize) -> Reg {
        self.srcs[i]
    }

    /// The signed 64-bit literal operand (0 when the opcode has none).
    pub const fn literal(&self) -> i64 {
        self.literal
    }

    /// The interned string operand, if any.
    pub const fn string(&self) -> Option<DexString> {
        self.string
    }

    /// The interned type operand, if any.
    pub const fn ty(&self) -> Option<DexType> {
        self.ty
    }

    /// The interned method operand, if any.
    pub const fn method(&self) -> Option<DexMethodRef> {
        self.method
    }

    /// Set the destination register.
    pub fn set_dest(&mut self, dest: Reg) {
        self.dest = Some(dest);
    }

    /// Replace the source registers.
    pub fn set_srcs(&mut self, srcs: Vec<Reg>) {
        self.srcs = srcs;
    }

    /// Set the literal operand.
    pub fn set_literal(&mut self, literal: i64) {
        self.literal = literal;
    }

    /// Set the string operand.
    pub fn set_string(&mut self, string: DexString) {
        self.string = Some(string);
    }

    /// Set the type operand.
    pub fn set_ty(&mut self, ty: DexType) {
        self.ty = Some(ty);
    }

    /// Set the method operand.
    pub fn set_method(&mut self, method: DexMethodRef) {
        self.method = Some(method);
    }
}

impl PartialEq for IrInstruction {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op
            && self.dest == other.dest
            && self.srcs == other.srcs
            && self.literal == other.literal
            && self.string == other.string
            && self.ty == other.ty
            && self.method == other.method
    }
}

impl Eq for IrInstruction {}

impl Hash for IrInstruction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.op.hash(state);
        self.dest.hash(state);
        self.srcs.hash(state);
        self.literal.hash(state);
        self.string.hash(state);
        self.ty.hash(state);
        self.method.hash(state);
    }
}
