//! Replacement synthesis: turning a completed match into concrete
//! instructions.
//!
//! Every placeholder a replace sequence references must have been bound
//! by the match; a miss is a defect in the rule declaration and panics.

use dex_ir::{DexString, DexType, IrInstruction, Op, Reg};

use crate::matcher::Matcher;
use crate::pattern::{InsnPattern, Payload, SymLit, SymReg, SymStr, SymTy};

impl Matcher<'_> {
    /// Materialize the rule's replace sequence from the current
    /// bindings. Call only after [`try_match`](Self::try_match)
    /// reported a full match.
    pub fn replacements(&self) -> Vec<IrInstruction> {
        self.rule()
            .replace_seq()
            .iter()
            .map(|pat| self.synthesize(pat))
            .collect()
    }

    fn synthesize(&self, pat: &InsnPattern) -> IrInstruction {
        if let Payload::Copy(index) = *pat.payload() {
            return self.matched_instructions()[index].duplicate();
        }
        assert_eq!(
            pat.opcodes().len(),
            1,
            "rule {}: replacement elements name exactly one opcode",
            self.rule().name()
        );
        let op = pat.opcodes()[0];
        match op {
            Op::InvokeDirect | Op::InvokeStatic | Op::InvokeVirtual => {
                assert!(
                    matches!(pat.payload(), Payload::Method(_)),
                    "rule {}: invoke replacement without a method",
                    self.rule().name()
                );
            }
            Op::Move16
            | Op::MoveObject16
            | Op::MoveResult
            | Op::MoveResultObject
            | Op::NegInt
            | Op::ConstString
            | Op::ConstClass
            | Op::Const4
            | Op::Const16
            | Op::Const => {}
            other => panic!(
                "rule {}: unsupported replacement opcode {other}",
                self.rule().name()
            ),
        }

        let mut insn = IrInstruction::new(op);
        if let Some(sym) = pat.dest() {
            insn.set_dest(self.bound_reg(sym));
        }
        insn.set_srcs(pat.srcs().iter().map(|&sym| self.bound_reg(sym)).collect());
        match *pat.payload() {
            Payload::None => {}
            Payload::Method(method) => insn.set_method(method),
            Payload::String(sym) => insn.set_string(self.synthesize_string(sym)),
            Payload::Literal(sym) => insn.set_literal(self.synthesize_literal(sym)),
            Payload::Type(sym) => insn.set_ty(self.bound_ty(sym)),
            Payload::Copy(_) => unreachable!(),
        }
        insn
    }

    fn synthesize_string(&self, sym: SymStr) -> DexString {
        let ctx = self.ctx();
        match sym {
            SymStr::A | SymStr::B => self.bound_str(sym),
            SymStr::Empty => panic!(
                "rule {}: the empty-string placeholder cannot be synthesized",
                self.rule().name()
            ),
            SymStr::BooleanAToString => ctx.make_string(render_boolean(self.bound_lit())),
            SymStr::CharAToString => {
                ctx.make_string_from_units(&[self.bound_lit() as u16])
            }
            SymStr::IntAToString => ctx.make_string(&render_int(self.bound_lit())),
            SymStr::LongIntAToString => ctx.make_string(&self.bound_lit().to_string()),
            SymStr::FloatAToString => ctx.make_string(&render_float(self.bound_lit())),
            SymStr::DoubleAToString => ctx.make_string(&render_double(self.bound_lit())),
            SymStr::ConcatABStrings => {
                ctx.concat_strings(self.bound_str(SymStr::A), self.bound_str(SymStr::B))
            }
            SymStr::ConcatStringABooleanA => self.concat_rendered(
                render_boolean(self.bound_lit()).to_string(),
            ),
            SymStr::ConcatStringACharA => {
                let rendered = ctx.make_string_from_units(&[self.bound_lit() as u16]);
                ctx.concat_strings(self.bound_str(SymStr::A), rendered)
            }
            SymStr::ConcatStringAIntA => self.concat_rendered(render_int(self.bound_lit())),
            SymStr::ConcatStringALongIntA => {
                self.concat_rendered(self.bound_lit().to_string())
            }
            SymStr::TypeAGetSimpleName => {
                let descriptor = ctx.type_descriptor(self.bound_ty(SymTy::A));
                ctx.make_string(simple_name(&descriptor))
            }
        }
    }

    fn synthesize_literal(&self, sym: SymLit) -> i64 {
        match sym {
            SymLit::A => self.bound_lit(),
            SymLit::CompareStringsAB => {
                // Interning makes handle identity equivalent to string
                // equality.
                i64::from(self.bound_str(SymStr::A) == self.bound_str(SymStr::B))
            }
            SymLit::LengthStringA => {
                self.ctx().string_utf16_len(self.bound_str(SymStr::A)) as i64
            }
        }
    }

    fn concat_rendered(&self, suffix: String) -> DexString {
        let ctx = self.ctx();
        ctx.concat_strings(self.bound_str(SymStr::A), ctx.make_string(&suffix))
    }

    fn bound_reg(&self, sym: SymReg) -> Reg {
        self.reg_binding(sym).unwrap_or_else(|| {
            panic!("rule {}: register {sym:?} is unbound", self.rule().name())
        })
    }

    fn bound_lit(&self) -> i64 {
        self.lit_binding(SymLit::A).unwrap_or_else(|| {
            panic!("rule {}: literal A is unbound", self.rule().name())
        })
    }

    fn bound_str(&self, sym: SymStr) -> DexString {
        self.str_binding(sym).unwrap_or_else(|| {
            panic!("rule {}: string {sym:?} is unbound", self.rule().name())
        })
    }

    fn bound_ty(&self, sym: SymTy) -> DexType {
        self.ty_binding(sym).unwrap_or_else(|| {
            panic!("rule {}: type {sym:?} is unbound", self.rule().name())
        })
    }
}

fn render_boolean(literal: i64) -> &'static str {
    if literal != 0 {
        "true"
    } else {
        "false"
    }
}

fn render_int(literal: i64) -> String {
    (literal as i32).to_string()
}

/// Render the low 32 bits as an IEEE-754 binary32 value the way the
/// Java runtime prints it.
fn render_float(literal: i64) -> String {
    let value = f32::from_bits(literal as u32);
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{value:?}")
    }
}

/// Render all 64 bits as an IEEE-754 binary64 value the way the Java
/// runtime prints it.
fn render_double(literal: i64) -> String {
    let value = f64::from_bits(literal as u64);
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{value:?}")
    }
}

/// `Lcom/pkg/Simple;` → `Simple`.
fn simple_name(descriptor: &str) -> &str {
    let trimmed = descriptor.strip_suffix(';').unwrap_or(descriptor);
    match trimmed.rfind('/') {
        Some(slash) => &trimmed[slash + 1..],
        None => trimmed.strip_prefix('L').unwrap_or(trimmed),
    }
}
