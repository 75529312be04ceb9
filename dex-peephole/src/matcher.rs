//! The streaming matcher: one state machine per rule, fed one
//! instruction at a time.

use strum::EnumCount;

use dex_ir::{DexContext, DexString, DexType, IrInstruction, Reg};

use crate::pattern::{Payload, Rule, SymLit, SymReg, SymStr, SymTy};

/// Incremental match state for one [`Rule`].
///
/// Feed instructions in program order with [`try_match`](Self::try_match);
/// it reports `true` when the instruction completes the rule's match
/// sequence. The caller resets the matcher at block boundaries and
/// after consuming a match.
pub struct Matcher<'a> {
    rule: &'a Rule,
    ctx: &'a DexContext,
    at: usize,
    matched: Vec<IrInstruction>,
    regs: [Option<Reg>; SymReg::COUNT],
    lits: [Option<i64>; SymLit::COUNT],
    strs: [Option<DexString>; SymStr::COUNT],
    tys: [Option<DexType>; SymTy::COUNT],
}

impl<'a> Matcher<'a> {
    /// A fresh matcher for `rule`.
    pub fn new(rule: &'a Rule, ctx: &'a DexContext) -> Self {
        Self {
            rule,
            ctx,
            at: 0,
            matched: Vec::new(),
            regs: [None; SymReg::COUNT],
            lits: [None; SymLit::COUNT],
            strs: [None; SymStr::COUNT],
            tys: [None; SymTy::COUNT],
        }
    }

    /// The rule this matcher runs.
    pub fn rule(&self) -> &'a Rule {
        self.rule
    }

    /// The interned-pool context.
    pub(crate) fn ctx(&self) -> &'a DexContext {
        self.ctx
    }

    /// Clear the cursor, the matched instructions, and every binding.
    pub fn reset(&mut self) {
        self.at = 0;
        self.matched.clear();
        self.regs = [None; SymReg::COUNT];
        self.lits = [None; SymLit::COUNT];
        self.strs = [None; SymStr::COUNT];
        self.tys = [None; SymTy::COUNT];
    }

    /// Feed the next instruction. Returns `true` when it completes a
    /// full match; the matched instructions and bindings then stay
    /// available until the next [`reset`](Self::reset).
    pub fn try_match(&mut self, insn: &IrInstruction) -> bool {
        if !self.match_element(insn) {
            // When exactly one element had matched, the current
            // instruction may still start the pattern over. Anywhere
            // else the scan moves on without re-examining it.
            if self.at == 1 {
                self.reset();
                if !self.match_element(insn) {
                    self.reset();
                    return false;
                }
            } else {
                self.reset();
                return false;
            }
        }
        self.matched.push(insn.clone());
        self.at += 1;
        if self.at == self.rule.match_seq().len() {
            if let Some(predicate) = self.rule.predicate() {
                if !predicate(&self.matched) {
                    self.reset();
                    return false;
                }
            }
            return true;
        }
        false
    }

    /// The instructions matched so far, in program order.
    pub fn matched_instructions(&self) -> &[IrInstruction] {
        &self.matched
    }

    /// The concrete register bound to `sym`, if any.
    pub fn reg_binding(&self, sym: SymReg) -> Option<Reg> {
        self.regs[sym as usize]
    }

    /// The concrete literal bound to `sym`, if any.
    pub fn lit_binding(&self, sym: SymLit) -> Option<i64> {
        self.lits[sym as usize]
    }

    /// The interned string bound to `sym`, if any.
    pub fn str_binding(&self, sym: SymStr) -> Option<DexString> {
        self.strs[sym as usize]
    }

    /// The interned type bound to `sym`, if any.
    pub fn ty_binding(&self, sym: SymTy) -> Option<DexType> {
        self.tys[sym as usize]
    }

    fn match_element(&mut self, insn: &IrInstruction) -> bool {
        let pat = &self.rule.match_seq()[self.at];
        if !pat.opcodes().contains(&insn.op()) {
            return false;
        }
        if insn.srcs_size() != pat.srcs().len()
            || insn.dests_size() != pat.dest().is_some() as usize
        {
            return false;
        }
        if let Some(sym) = pat.dest() {
            let Some(concrete) = insn.dest() else { return false };
            if !self.bind_reg(sym, concrete) {
                return false;
            }
        }
        for (i, &sym) in pat.srcs().iter().enumerate() {
            if !self.bind_reg(sym, insn.src(i)) {
                return false;
            }
        }
        match *pat.payload() {
            Payload::None => true,
            Payload::Method(method) => insn.method() == Some(method),
            Payload::String(SymStr::Empty) => {
                insn.string() == Some(self.ctx.empty_string())
            }
            Payload::String(sym @ (SymStr::A | SymStr::B)) => match insn.string() {
                Some(concrete) => self.bind_str(sym, concrete),
                None => false,
            },
            Payload::String(directive) => panic!(
                "rule {}: string directive {directive:?} in a match element",
                self.rule.name()
            ),
            Payload::Literal(SymLit::A) => self.bind_lit(SymLit::A, insn.literal()),
            Payload::Literal(directive) => panic!(
                "rule {}: literal directive {directive:?} in a match element",
                self.rule.name()
            ),
            Payload::Type(sym) => match insn.ty() {
                Some(concrete) => self.bind_ty(sym, concrete),
                None => false,
            },
            Payload::Copy(_) => panic!(
                "rule {}: copy directive in a match element",
                self.rule.name()
            ),
        }
    }

    fn bind_reg(&mut self, sym: SymReg, concrete: Reg) -> bool {
        if let Some(bound) = self.regs[sym as usize] {
            return bound == concrete;
        }
        if let Some(base) = sym.base() {
            // Pair halves derive from their base register, which the
            // pattern binds first.
            let Some(base_val) = self.regs[base as usize] else { return false };
            if base_val.checked_add(1) != Some(concrete) {
                return false;
            }
        }
        if !self.rule.reg_fits(sym, concrete) {
            return false;
        }
        self.regs[sym as usize] = Some(concrete);
        true
    }

    fn bind_lit(&mut self, sym: SymLit, concrete: i64) -> bool {
        match self.lits[sym as usize] {
            Some(bound) => bound == concrete,
            None => {
                self.lits[sym as usize] = Some(concrete);
                true
            }
        }
    }

    fn bind_str(&mut self, sym: SymStr, concrete: DexString) -> bool {
        match self.strs[sym as usize] {
            Some(bound) => bound == concrete,
            None => {
                self.strs[sym as usize] = Some(concrete);
                true
            }
        }
    }

    fn bind_ty(&mut self, sym: SymTy, concrete: DexType) -> bool {
        match self.tys[sym as usize] {
            Some(bound) => bound == concrete,
            None => {
                self.tys[sym as usize] = Some(concrete);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use dex_ir::{op, Op};

    use super::*;
    use crate::pattern::InsnPattern;

    fn move_rule() -> Rule {
        Rule::new(
            "self_move",
            vec![InsnPattern::new(
                vec![Op::Move, Op::MoveObject],
                vec![SymReg::A],
                Some(SymReg::A),
            )],
            vec![],
        )
    }

    #[test]
    fn binds_and_requires_equality() {
        let ctx = DexContext::new();
        let rule = move_rule();
        let mut matcher = Matcher::new(&rule, &ctx);

        assert!(!matcher.try_match(&op::move_(4, 5)));
        assert!(matcher.try_match(&op::move_(4, 4)));
        assert_eq!(matcher.reg_binding(SymReg::A), Some(4));
    }

    #[test]
    fn reset_clears_bindings() {
        let ctx = DexContext::new();
        let rule = move_rule();
        let mut matcher = Matcher::new(&rule, &ctx);

        assert!(matcher.try_match(&op::move_object(7, 7)));
        matcher.reset();
        assert_eq!(matcher.reg_binding(SymReg::A), None);
        assert!(matcher.matched_instructions().is_empty());
        assert!(matcher.try_match(&op::move_(9, 9)));
    }

    fn abc_rule() -> Rule {
        // const/4 ; neg-int ; nop, with all registers unconstrained.
        Rule::new(
            "abc",
            vec![
                InsnPattern::new(vec![Op::Const4], vec![], Some(SymReg::A)).literal(SymLit::A),
                InsnPattern::new(vec![Op::NegInt], vec![SymReg::C], Some(SymReg::B)),
                InsnPattern::new(vec![Op::Nop], vec![], None),
            ],
            vec![],
        )
    }

    #[test]
    fn restarts_only_from_position_one() {
        let ctx = DexContext::new();
        let rule = abc_rule();
        let mut matcher = Matcher::new(&rule, &ctx);

        // a b a b c: the failure happens at position 2, so the matcher
        // resets without rescanning and the trailing "a b c" suffix is
        // never seen as a match.
        assert!(!matcher.try_match(&op::const_4(0, 1)));
        assert!(!matcher.try_match(&op::neg_int(1, 2)));
        assert!(!matcher.try_match(&op::const_4(0, 1)));
        assert!(!matcher.try_match(&op::neg_int(1, 2)));
        assert!(!matcher.try_match(&op::nop()));
    }

    #[test]
    fn retries_current_instruction_at_position_one() {
        let ctx = DexContext::new();
        let rule = abc_rule();
        let mut matcher = Matcher::new(&rule, &ctx);

        // a a b c: the second "a" fails element 1 but restarts the
        // pattern, so the suffix still matches.
        assert!(!matcher.try_match(&op::const_4(0, 1)));
        assert!(!matcher.try_match(&op::const_4(0, 1)));
        assert!(!matcher.try_match(&op::neg_int(1, 2)));
        assert!(matcher.try_match(&op::nop()));
        assert_eq!(matcher.matched_instructions().len(), 3);
    }

    #[test]
    fn pair_registers_must_be_consecutive() {
        let ctx = DexContext::new();
        let long_t = ctx.make_type("J");
        let string_t = ctx.make_type("Ljava/lang/String;");
        let value_of = ctx.make_method(
            string_t,
            ctx.make_string("valueOf"),
            ctx.make_proto(string_t, &[long_t]),
        );
        let rule = Rule::new(
            "wide_call",
            vec![InsnPattern::new(
                vec![Op::InvokeStatic],
                vec![SymReg::A, SymReg::PairA],
                None,
            )
            .method(value_of)],
            vec![],
        );

        let mut matcher = Matcher::new(&rule, &ctx);
        assert!(matcher.try_match(&op::invoke_static(value_of, &[4, 5])));

        matcher.reset();
        assert!(!matcher.try_match(&op::invoke_static(value_of, &[4, 6])));
    }

    #[test]
    fn width_limits_refuse_wide_registers() {
        let ctx = DexContext::new();
        // Replacement neg-int caps both registers at 4 bits.
        let rule = Rule::new(
            "narrow",
            vec![InsnPattern::new(vec![Op::MulIntLit8], vec![SymReg::B], Some(SymReg::A))
                .literal(SymLit::A)],
            vec![InsnPattern::new(vec![Op::NegInt], vec![SymReg::B], Some(SymReg::A))],
        );
        let mut matcher = Matcher::new(&rule, &ctx);
        assert!(!matcher.try_match(&op::mul_int_lit8(16, 3, -1)));
        matcher.reset();
        assert!(!matcher.try_match(&op::mul_int_lit8(3, 300, -1)));
        matcher.reset();
        assert!(matcher.try_match(&op::mul_int_lit8(3, 7, -1)));
    }

    #[test]
    fn predicate_rejection_resets() {
        let ctx = DexContext::new();
        let rule = Rule::new(
            "mul_one",
            vec![InsnPattern::new(vec![Op::MulIntLit8], vec![SymReg::B], Some(SymReg::A))
                .literal(SymLit::A)],
            vec![InsnPattern::new(vec![Op::Move16], vec![SymReg::B], Some(SymReg::A))],
        )
        .with_predicate(crate::rules::first_literal_is(1));

        let mut matcher = Matcher::new(&rule, &ctx);
        assert!(!matcher.try_match(&op::mul_int_lit8(0, 1, 2)));
        assert_eq!(matcher.matched_instructions().len(), 0);
        assert!(matcher.try_match(&op::mul_int_lit8(0, 1, 1)));
    }

    #[test]
    fn empty_string_placeholder_matches_only_empty() {
        let ctx = DexContext::new();
        let rule = Rule::new(
            "empty",
            vec![InsnPattern::new(vec![Op::ConstString], vec![], Some(SymReg::A))
                .string(SymStr::Empty)],
            vec![],
        );
        let mut matcher = Matcher::new(&rule, &ctx);
        assert!(!matcher.try_match(&op::const_string(0, ctx.make_string("x"))));
        matcher.reset();
        assert!(matcher.try_match(&op::const_string(0, ctx.make_string(""))));
    }
}
