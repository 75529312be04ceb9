//! The pattern language rules are written in.
//!
//! A rule is a pair of instruction-pattern sequences: the match side is
//! tested against the instruction stream, the replace side is
//! materialized from the bindings the match collected. Operands are
//! symbolic placeholders from small closed enums; a placeholder binds
//! to a concrete value the first time the matcher sees it and must
//! compare equal on every later occurrence.

use strum::EnumCount;

use dex_ir::{DexMethodRef, IrInstruction, Op, Reg};

/// Symbolic registers.
///
/// `PairX` is the high half of a wide value whose low half is `X`; it
/// never binds freely, it must equal the binding of `X` plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumCount)]
pub enum SymReg {
    /// First free register.
    A,
    /// Second free register.
    B,
    /// Third free register.
    C,
    /// Fourth free register.
    D,
    /// High half of the pair based at `A`.
    PairA,
    /// High half of the pair based at `B`.
    PairB,
    /// High half of the pair based at `C`.
    PairC,
    /// High half of the pair based at `D`.
    PairD,
}

impl SymReg {
    /// The base register of a pair placeholder, `None` for free
    /// registers.
    pub const fn base(&self) -> Option<SymReg> {
        match self {
            SymReg::PairA => Some(SymReg::A),
            SymReg::PairB => Some(SymReg::B),
            SymReg::PairC => Some(SymReg::C),
            SymReg::PairD => Some(SymReg::D),
            _ => None,
        }
    }
}

/// Symbolic literals.
///
/// Only `A` binds during matching; the rest are replacement directives
/// computed from other bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumCount)]
pub enum SymLit {
    /// A bindable 64-bit literal.
    A,
    /// 1 when `SymStr::A` and `SymStr::B` are the same interned string,
    /// else 0.
    CompareStringsAB,
    /// The UTF-16 length of `SymStr::A`.
    LengthStringA,
}

impl SymLit {
    /// Whether the placeholder may appear in a match element.
    pub const fn bindable(&self) -> bool {
        matches!(self, SymLit::A)
    }
}

/// Symbolic strings.
///
/// `A` and `B` bind during matching and `Empty` matches only the
/// interned empty string; the rest are replacement directives that
/// synthesize a new interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumCount)]
pub enum SymStr {
    /// First bindable string.
    A,
    /// Second bindable string.
    B,
    /// Matches only the empty interned string.
    Empty,
    /// `"true"` or `"false"` from `SymLit::A`.
    BooleanAToString,
    /// `SymLit::A` as a single UTF-16 code unit.
    CharAToString,
    /// `SymLit::A` as a 32-bit signed decimal.
    IntAToString,
    /// `SymLit::A` as a 64-bit signed decimal.
    LongIntAToString,
    /// `SymLit::A`'s low 32 bits as an IEEE-754 binary32 decimal.
    FloatAToString,
    /// `SymLit::A` as an IEEE-754 binary64 decimal.
    DoubleAToString,
    /// `SymStr::A` followed by `SymStr::B`.
    ConcatABStrings,
    /// `SymStr::A` followed by `SymLit::A` rendered as a boolean.
    ConcatStringABooleanA,
    /// `SymStr::A` followed by `SymLit::A` rendered as a char.
    ConcatStringACharA,
    /// `SymStr::A` followed by `SymLit::A` rendered as an int.
    ConcatStringAIntA,
    /// `SymStr::A` followed by `SymLit::A` rendered as a long.
    ConcatStringALongIntA,
    /// The simple class name of `SymTy::A`.
    TypeAGetSimpleName,
}

impl SymStr {
    /// Whether the placeholder may appear in a match element.
    pub const fn bindable(&self) -> bool {
        matches!(self, SymStr::A | SymStr::B | SymStr::Empty)
    }
}

/// Symbolic types; both bind during matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumCount)]
pub enum SymTy {
    /// First bindable type.
    A,
    /// Second bindable type.
    B,
}

/// The payload of a pattern element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Registers only.
    None,
    /// A concrete interned method the instruction must reference.
    Method(DexMethodRef),
    /// A symbolic string.
    String(SymStr),
    /// A symbolic literal.
    Literal(SymLit),
    /// A symbolic type.
    Type(SymTy),
    /// Replacement-only: clone the matched instruction at this index
    /// verbatim.
    Copy(usize),
}

/// One element of a match or replace sequence.
#[derive(Debug, Clone)]
pub struct InsnPattern {
    opcodes: Vec<Op>,
    srcs: Vec<SymReg>,
    dest: Option<SymReg>,
    payload: Payload,
}

impl InsnPattern {
    /// An element accepting any of `opcodes`, with no payload.
    pub fn new(opcodes: Vec<Op>, srcs: Vec<SymReg>, dest: Option<SymReg>) -> Self {
        Self {
            opcodes,
            srcs,
            dest,
            payload: Payload::None,
        }
    }

    /// A replacement-only element cloning a matched instruction.
    pub fn copy(index: usize) -> Self {
        Self {
            opcodes: Vec::new(),
            srcs: Vec::new(),
            dest: None,
            payload: Payload::Copy(index),
        }
    }

    /// Attach a concrete method payload.
    pub fn method(mut self, method: DexMethodRef) -> Self {
        self.payload = Payload::Method(method);
        self
    }

    /// Attach a symbolic string payload.
    pub fn string(mut self, s: SymStr) -> Self {
        self.payload = Payload::String(s);
        self
    }

    /// Attach a symbolic literal payload.
    pub fn literal(mut self, lit: SymLit) -> Self {
        self.payload = Payload::Literal(lit);
        self
    }

    /// Attach a symbolic type payload.
    pub fn ty(mut self, ty: SymTy) -> Self {
        self.payload = Payload::Type(ty);
        self
    }

    /// The accepted opcodes.
    pub fn opcodes(&self) -> &[Op] {
        &self.opcodes
    }

    /// The symbolic source registers in operand order.
    pub fn srcs(&self) -> &[SymReg] {
        &self.srcs
    }

    /// The symbolic destination register, if any.
    pub fn dest(&self) -> Option<SymReg> {
        self.dest
    }

    /// The payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    fn symbolic_registers(&self) -> impl Iterator<Item = SymReg> + '_ {
        self.dest.into_iter().chain(self.srcs.iter().copied())
    }
}

/// A predicate over the matched instructions, checked once the match
/// sequence is structurally complete.
pub type Predicate = Box<dyn Fn(&[IrInstruction]) -> bool + Send + Sync>;

/// A named match/replace rule with precomputed register width limits.
pub struct Rule {
    name: &'static str,
    match_seq: Vec<InsnPattern>,
    replace_seq: Vec<InsnPattern>,
    predicate: Option<Predicate>,
    reg_limits: [u8; SymReg::COUNT],
}

impl core::fmt::Debug for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("match_seq", &self.match_seq)
            .field("replace_seq", &self.replace_seq)
            .field("predicate", &self.predicate.is_some())
            .field("reg_limits", &self.reg_limits)
            .finish()
    }
}

impl Rule {
    /// A rule without a predicate. Width limits are derived from the
    /// replace sequence on construction.
    pub fn new(
        name: &'static str,
        match_seq: Vec<InsnPattern>,
        replace_seq: Vec<InsnPattern>,
    ) -> Self {
        let reg_limits = register_width_limits(&replace_seq);
        Self {
            name,
            match_seq,
            replace_seq,
            predicate: None,
            reg_limits,
        }
    }

    /// Attach a predicate over the matched instructions.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// The rule's stable name, used as its disable key.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The match sequence.
    pub fn match_seq(&self) -> &[InsnPattern] {
        &self.match_seq
    }

    /// The replace sequence.
    pub fn replace_seq(&self) -> &[InsnPattern] {
        &self.replace_seq
    }

    /// The predicate, if any.
    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Whether `reg` is encodable in every replacement field `sym`
    /// appears in.
    pub fn reg_fits(&self, sym: SymReg, reg: Reg) -> bool {
        match self.reg_limits[sym as usize] {
            4 => reg < 1 << 4,
            8 => reg < 1 << 8,
            _ => true,
        }
    }

    /// Check the structural laws the matcher and synthesizer assume.
    pub fn validate(&self) -> Result<(), RuleError> {
        for (index, pat) in self.match_seq.iter().enumerate() {
            let ok = match pat.payload() {
                Payload::Copy(_) => false,
                Payload::String(s) => s.bindable(),
                Payload::Literal(lit) => lit.bindable(),
                Payload::None | Payload::Method(_) | Payload::Type(_) => true,
            };
            if !ok {
                return Err(RuleError::ReplacementOnlyPayload { rule: self.name, index });
            }
            if pat.opcodes().is_empty() {
                return Err(RuleError::EmptyOpcodeSet { rule: self.name, index });
            }
        }
        for (index, pat) in self.replace_seq.iter().enumerate() {
            if let Payload::Copy(copied) = *pat.payload() {
                if copied >= self.match_seq.len() {
                    return Err(RuleError::CopyOutOfRange { rule: self.name, index, copied });
                }
                continue;
            }
            if pat.opcodes().len() != 1 {
                return Err(RuleError::NonSingletonReplacement { rule: self.name, index });
            }
            if *pat.payload() == Payload::String(SymStr::Empty) {
                return Err(RuleError::EmptyStringReplacement { rule: self.name, index });
            }
        }
        if self.replace_seq.len() > self.match_seq.len() {
            return Err(RuleError::SizeIncrease { rule: self.name });
        }
        Ok(())
    }
}

/// A structural defect in a rule declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A match element uses a payload only the synthesizer understands.
    #[error("rule {rule}: match element {index} uses a replacement-only payload")]
    ReplacementOnlyPayload {
        /// The rule's name.
        rule: &'static str,
        /// Element index in the match sequence.
        index: usize,
    },
    /// A match element accepts no opcode at all.
    #[error("rule {rule}: match element {index} has an empty opcode set")]
    EmptyOpcodeSet {
        /// The rule's name.
        rule: &'static str,
        /// Element index in the match sequence.
        index: usize,
    },
    /// A replacement element must name exactly one opcode.
    #[error("rule {rule}: replacement element {index} must name exactly one opcode")]
    NonSingletonReplacement {
        /// The rule's name.
        rule: &'static str,
        /// Element index in the replace sequence.
        index: usize,
    },
    /// A copy directive references a match index that does not exist.
    #[error("rule {rule}: replacement element {index} copies match index {copied}, which is out of range")]
    CopyOutOfRange {
        /// The rule's name.
        rule: &'static str,
        /// Element index in the replace sequence.
        index: usize,
        /// The out-of-range match index.
        copied: usize,
    },
    /// The empty-string placeholder cannot be synthesized.
    #[error("rule {rule}: replacement element {index} uses the empty-string placeholder")]
    EmptyStringReplacement {
        /// The rule's name.
        rule: &'static str,
        /// Element index in the replace sequence.
        index: usize,
    },
    /// The replacement is longer than the match.
    #[error("rule {rule}: replacement is longer than the match")]
    SizeIncrease {
        /// The rule's name.
        rule: &'static str,
    },
}

/// Per-register width limits for one replace sequence.
///
/// Every symbolic register an element mentions is capped by the
/// narrowest register field of that element's opcode; 16 means
/// unrestricted. `Copy` elements restrict nothing, their operands are
/// cloned verbatim.
fn register_width_limits(replace_seq: &[InsnPattern]) -> [u8; SymReg::COUNT] {
    let mut limits = [16u8; SymReg::COUNT];
    for pat in replace_seq {
        if matches!(pat.payload(), Payload::Copy(_)) {
            continue;
        }
        let Some(&op) = pat.opcodes().first() else { continue };
        let mut width = 16u8;
        if let Some(w) = op.dest_width() {
            width = width.min(w);
        }
        if let Some(w) = op.src_width() {
            width = width.min(w);
        }
        for sym in pat.symbolic_registers() {
            let limit = &mut limits[sym as usize];
            *limit = (*limit).min(width);
        }
    }
    limits
}
