use strum::IntoEnumIterator;

use crate::{op, Block, DexContext, InvalidOpcode, IrInstruction, Op};

#[test]
fn opcode_values_round_trip() {
    for opcode in Op::iter() {
        assert_eq!(Op::try_from(opcode as u16), Ok(opcode));
    }
    assert_eq!(Op::try_from(0xffff), Err(InvalidOpcode(0xffff)));
    // A hole in the table: 0x04 is move-wide, which the IR does not model.
    assert_eq!(Op::try_from(0x0004), Err(InvalidOpcode(0x0004)));
}

#[test]
fn register_widths_are_encodable() {
    for opcode in Op::iter() {
        for width in [opcode.dest_width(), opcode.src_width()].into_iter().flatten() {
            assert!(
                matches!(width, 4 | 8 | 16),
                "{opcode} has a {width}-bit register field"
            );
        }
    }
}

#[test]
fn payload_classification_is_disjoint() {
    for opcode in Op::iter() {
        let payloads = [
            opcode.has_literal(),
            opcode.has_string(),
            opcode.has_type(),
            opcode.has_method(),
        ];
        assert!(
            payloads.iter().filter(|&&p| p).count() <= 1,
            "{opcode} claims multiple payloads"
        );
        assert_eq!(opcode.has_method(), opcode.is_invoke());
        if opcode.is_invoke_range() {
            assert!(opcode.is_invoke());
            assert_eq!(opcode.src_width(), Some(16));
        }
    }
}

#[test]
fn mnemonics_match_the_dex_spelling() {
    assert_eq!(Op::Move16.mnemonic(), "move/16");
    assert_eq!(Op::ConstString.mnemonic(), "const-string");
    assert_eq!(Op::InvokeVirtualRange.mnemonic(), "invoke-virtual/range");
    assert_eq!(Op::MulIntLit8.to_string(), "mul-int/lit8");
}

#[test]
fn identity_is_distinct_from_equality() {
    let a = op::move_(1, 2);
    let b = op::move_(1, 2);
    assert_eq!(a, b);
    assert_ne!(a.id(), b.id());

    let copy = a.clone();
    assert_eq!(copy.id(), a.id());

    let dup = a.duplicate();
    assert_eq!(dup, a);
    assert_ne!(dup.id(), a.id());
}

#[test]
fn accessors_expose_operands() {
    let ctx = DexContext::new();
    let s = ctx.make_string("hi");
    let insn = op::const_string(3, s);
    assert_eq!(insn.op(), Op::ConstString);
    assert_eq!(insn.dest(), Some(3));
    assert_eq!(insn.dests_size(), 1);
    assert_eq!(insn.srcs_size(), 0);
    assert_eq!(insn.string(), Some(s));

    let mul = op::mul_int_lit8(3, 7, -1);
    assert_eq!(mul.literal(), -1);
    assert_eq!(mul.src(0), 7);
    assert_eq!(mul.dests_size(), 1);
}

#[test]
fn constructors_agree_with_the_opcode_classification() {
    let ctx = DexContext::new();
    let s = ctx.make_string("s");
    let t = ctx.make_type("Lcom/example/T;");
    let m = ctx.make_method(t, s, ctx.make_proto(t, &[]));

    let insns = [
        op::nop(),
        op::move_from16(0, 300),
        op::move_object_from16(0, 300),
        op::move_object_16(300, 301),
        op::move_result_wide(2),
        op::const_high16(0, 0x7f80_0000),
        op::const_wide_16(2, -1),
        op::const_wide_32(2, 1 << 20),
        op::const_wide_high16(2, i64::MIN),
        op::const_string_jumbo(0, s),
        op::check_cast(0, t),
        op::invoke_super(m, &[0]),
        op::invoke_interface(m, &[0]),
        op::invoke_virtual_range(m, &[300, 301]),
        op::invoke_super_range(m, &[300]),
        op::invoke_direct_range(m, &[300]),
        op::invoke_static_range(m, &[300]),
        op::invoke_interface_range(m, &[300]),
    ];
    for insn in &insns {
        assert_eq!(insn.op().has_string(), insn.string().is_some(), "{}", insn.op());
        assert_eq!(insn.op().has_type(), insn.ty().is_some(), "{}", insn.op());
        assert_eq!(insn.op().has_method(), insn.method().is_some(), "{}", insn.op());
        assert_eq!(insn.dests_size(), usize::from(insn.op().dest_width().is_some()));
    }
}

#[test]
fn block_edits_by_identity() {
    let insns: Vec<IrInstruction> = vec![op::nop(), op::move_(0, 1), op::nop()];
    let anchor = insns[1].id();
    let victim = insns[2].id();
    let mut block = Block::new(insns);

    block.insert_after(anchor, [op::neg_int(4, 5)]);
    assert_eq!(block.len(), 4);
    assert_eq!(block.insns()[2], op::neg_int(4, 5));

    block.remove(victim);
    assert_eq!(block.len(), 3);
    assert!(block.iter().all(|insn| insn.id() != victim));
}

#[test]
#[should_panic(expected = "not in this block")]
fn edits_reject_foreign_instructions() {
    let mut block = Block::new(vec![op::nop()]);
    block.remove(op::nop().id());
}
