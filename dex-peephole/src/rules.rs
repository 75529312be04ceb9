//! The fixed catalog of optimization rules.
//!
//! Rule names are stable: they are the disable keys configuration uses
//! and the keys statistics are reported under. The catalog is built
//! once per optimizer because the string and func families embed
//! interned method handles.

use dex_ir::{DexContext, DexMethodRef, Op};

use crate::pattern::{InsnPattern, Predicate, Rule, SymLit, SymReg, SymStr, SymTy};

/// Accept the matched sequence only when the first matched instruction
/// carries exactly this literal. The comparison is on the signed 64-bit
/// value, so `-1` only matches a genuine minus one.
pub fn first_literal_is(value: i64) -> Predicate {
    Box::new(move |matched| matched.first().map_or(false, |insn| insn.literal() == value))
}

/// Rules shipped in the catalog but absent from the default enabled
/// set. `Remove_AppendEmptyString` stays here until the surrounding
/// code motion passes verification on it.
pub fn default_disabled() -> &'static [&'static str] {
    &["Remove_AppendEmptyString"]
}

/// Build the full catalog in matching order: nop, string, arith, func.
pub fn catalog(ctx: &DexContext) -> Vec<Rule> {
    let mut rules = nop_rules();
    rules.extend(string_rules(ctx));
    rules.extend(arith_rules());
    rules.extend(func_rules(ctx));
    rules
}

/// The `java.lang` handles the string and func families reference.
struct JavaLang {
    sb_init_void: DexMethodRef,
    sb_init_string: DexMethodRef,
    sb_append_string: DexMethodRef,
    sb_append_boolean: DexMethodRef,
    sb_append_char: DexMethodRef,
    sb_append_int: DexMethodRef,
    sb_append_long: DexMethodRef,
    value_of_boolean: DexMethodRef,
    value_of_char: DexMethodRef,
    value_of_int: DexMethodRef,
    value_of_long: DexMethodRef,
    value_of_float: DexMethodRef,
    value_of_double: DexMethodRef,
    string_equals: DexMethodRef,
    string_length: DexMethodRef,
    class_get_simple_name: DexMethodRef,
}

impl JavaLang {
    fn new(ctx: &DexContext) -> Self {
        let string_builder = ctx.make_type("Ljava/lang/StringBuilder;");
        let string = ctx.make_type("Ljava/lang/String;");
        let object = ctx.make_type("Ljava/lang/Object;");
        let class = ctx.make_type("Ljava/lang/Class;");
        let void = ctx.make_type("V");
        let boolean = ctx.make_type("Z");
        let char_t = ctx.make_type("C");
        let int = ctx.make_type("I");
        let long = ctx.make_type("J");
        let float = ctx.make_type("F");
        let double = ctx.make_type("D");
        let init = ctx.make_string("<init>");
        let append = ctx.make_string("append");
        let value_of = ctx.make_string("valueOf");
        Self {
            sb_init_void: ctx.make_method(string_builder, init, ctx.make_proto(void, &[])),
            sb_init_string: ctx.make_method(
                string_builder,
                init,
                ctx.make_proto(void, &[string]),
            ),
            sb_append_string: ctx.make_method(
                string_builder,
                append,
                ctx.make_proto(string_builder, &[string]),
            ),
            sb_append_boolean: ctx.make_method(
                string_builder,
                append,
                ctx.make_proto(string_builder, &[boolean]),
            ),
            sb_append_char: ctx.make_method(
                string_builder,
                append,
                ctx.make_proto(string_builder, &[char_t]),
            ),
            sb_append_int: ctx.make_method(
                string_builder,
                append,
                ctx.make_proto(string_builder, &[int]),
            ),
            sb_append_long: ctx.make_method(
                string_builder,
                append,
                ctx.make_proto(string_builder, &[long]),
            ),
            value_of_boolean: ctx.make_method(
                string,
                value_of,
                ctx.make_proto(string, &[boolean]),
            ),
            value_of_char: ctx.make_method(string, value_of, ctx.make_proto(string, &[char_t])),
            value_of_int: ctx.make_method(string, value_of, ctx.make_proto(string, &[int])),
            value_of_long: ctx.make_method(string, value_of, ctx.make_proto(string, &[long])),
            value_of_float: ctx.make_method(string, value_of, ctx.make_proto(string, &[float])),
            value_of_double: ctx.make_method(
                string,
                value_of,
                ctx.make_proto(string, &[double]),
            ),
            string_equals: ctx.make_method(
                string,
                ctx.make_string("equals"),
                ctx.make_proto(boolean, &[object]),
            ),
            string_length: ctx.make_method(
                string,
                ctx.make_string("length"),
                ctx.make_proto(int, &[]),
            ),
            class_get_simple_name: ctx.make_method(
                class,
                ctx.make_string("getSimpleName"),
                ctx.make_proto(string, &[]),
            ),
        }
    }
}

fn invoke_direct(method: DexMethodRef, srcs: Vec<SymReg>) -> InsnPattern {
    InsnPattern::new(vec![Op::InvokeDirect], srcs, None).method(method)
}

fn invoke_static(method: DexMethodRef, srcs: Vec<SymReg>) -> InsnPattern {
    InsnPattern::new(vec![Op::InvokeStatic], srcs, None).method(method)
}

fn invoke_virtual(method: DexMethodRef, srcs: Vec<SymReg>) -> InsnPattern {
    InsnPattern::new(vec![Op::InvokeVirtual], srcs, None).method(method)
}

fn move_result(dest: SymReg) -> InsnPattern {
    InsnPattern::new(vec![Op::MoveResult], vec![], Some(dest))
}

fn move_result_object(dest: SymReg) -> InsnPattern {
    InsnPattern::new(vec![Op::MoveResultObject], vec![], Some(dest))
}

fn const_string(dest: SymReg, s: SymStr) -> InsnPattern {
    InsnPattern::new(vec![Op::ConstString], vec![], Some(dest)).string(s)
}

fn const_literal(opcodes: Vec<Op>, dest: SymReg, lit: SymLit) -> InsnPattern {
    InsnPattern::new(opcodes, vec![], Some(dest)).literal(lit)
}

/// Any non-wide const carrying `SymLit::A`.
fn const_narrow(dest: SymReg) -> InsnPattern {
    const_literal(
        vec![Op::Const4, Op::Const16, Op::Const, Op::ConstHigh16],
        dest,
        SymLit::A,
    )
}

/// Any wide const carrying `SymLit::A`.
fn const_wide(dest: SymReg) -> InsnPattern {
    const_literal(
        vec![Op::ConstWide16, Op::ConstWide32, Op::ConstWide, Op::ConstWideHigh16],
        dest,
        SymLit::A,
    )
}

fn nop_rules() -> Vec<Rule> {
    vec![Rule::new(
        "Remove_Redundant_Move",
        // The destination binds A first, so the source only matches
        // when it is the same register.
        vec![InsnPattern::new(
            vec![Op::Move, Op::MoveObject],
            vec![SymReg::A],
            Some(SymReg::A),
        )],
        vec![],
    )]
}

fn string_rules(ctx: &DexContext) -> Vec<Rule> {
    use SymReg::{A, B, C, D, PairA, PairD};

    let jl = JavaLang::new(ctx);
    vec![
        // new StringBuilder() ... append("s") -> new StringBuilder("s")
        Rule::new(
            "Coalesce_InitVoid_AppendString",
            vec![
                invoke_direct(jl.sb_init_void, vec![A]),
                const_string(B, SymStr::A),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
                move_result_object(A),
            ],
            vec![
                const_string(B, SymStr::A),
                invoke_direct(jl.sb_init_string, vec![A, B]),
            ],
        ),
        // append("a") ... append("b") -> append("ab")
        Rule::new(
            "Coalesce_AppendString_AppendString",
            vec![
                const_string(B, SymStr::A),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
                move_result_object(C),
                const_string(D, SymStr::B),
                invoke_virtual(jl.sb_append_string, vec![C, D]),
            ],
            vec![
                const_string(B, SymStr::ConcatABStrings),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
            ],
        ),
        // append("") is the identity on the builder.
        Rule::new(
            "Remove_AppendEmptyString",
            vec![
                const_string(B, SymStr::Empty),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
                move_result_object(C),
            ],
            vec![InsnPattern::new(vec![Op::MoveObject16], vec![A], Some(C))],
        ),
        // append("s") ... append(true) -> append("strue")
        Rule::new(
            "Coalesce_AppendString_AppendBoolean",
            vec![
                const_string(B, SymStr::A),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
                move_result_object(C),
                const_literal(vec![Op::Const4], D, SymLit::A),
                invoke_virtual(jl.sb_append_boolean, vec![C, D]),
            ],
            vec![
                const_string(B, SymStr::ConcatStringABooleanA),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
            ],
        ),
        Rule::new(
            "Coalesce_AppendString_AppendChar",
            vec![
                const_string(B, SymStr::A),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
                move_result_object(C),
                const_narrow(D),
                invoke_virtual(jl.sb_append_char, vec![C, D]),
            ],
            vec![
                const_string(B, SymStr::ConcatStringACharA),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
            ],
        ),
        Rule::new(
            "Coalesce_AppendString_AppendInt",
            vec![
                const_string(B, SymStr::A),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
                move_result_object(C),
                const_narrow(D),
                invoke_virtual(jl.sb_append_int, vec![C, D]),
            ],
            vec![
                const_string(B, SymStr::ConcatStringAIntA),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
            ],
        ),
        Rule::new(
            "Coalesce_AppendString_AppendLongInt",
            vec![
                const_string(B, SymStr::A),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
                move_result_object(C),
                const_wide(D),
                invoke_virtual(jl.sb_append_long, vec![C, D, PairD]),
            ],
            vec![
                const_string(B, SymStr::ConcatStringALongIntA),
                invoke_virtual(jl.sb_append_string, vec![A, B]),
            ],
        ),
        // String.valueOf over a constant folds to a string constant.
        // The original const stays via a verbatim copy; its register
        // may have other readers, and dead code elimination runs later.
        Rule::new(
            "Replace_ValueOfBoolean",
            vec![
                const_literal(vec![Op::Const4], A, SymLit::A),
                invoke_static(jl.value_of_boolean, vec![A]),
                move_result_object(B),
            ],
            vec![
                InsnPattern::copy(0),
                const_string(B, SymStr::BooleanAToString),
            ],
        ),
        Rule::new(
            "Replace_ValueOfChar",
            vec![
                const_narrow(A),
                invoke_static(jl.value_of_char, vec![A]),
                move_result_object(B),
            ],
            vec![InsnPattern::copy(0), const_string(B, SymStr::CharAToString)],
        ),
        Rule::new(
            "Replace_ValueOfInt",
            vec![
                const_narrow(A),
                invoke_static(jl.value_of_int, vec![A]),
                move_result_object(B),
            ],
            vec![InsnPattern::copy(0), const_string(B, SymStr::IntAToString)],
        ),
        Rule::new(
            "Replace_ValueOfLong",
            vec![
                const_wide(A),
                invoke_static(jl.value_of_long, vec![A, PairA]),
                move_result_object(B),
            ],
            vec![
                InsnPattern::copy(0),
                const_string(B, SymStr::LongIntAToString),
            ],
        ),
        Rule::new(
            "Replace_ValueOfFloat",
            vec![
                const_narrow(A),
                invoke_static(jl.value_of_float, vec![A]),
                move_result_object(B),
            ],
            vec![InsnPattern::copy(0), const_string(B, SymStr::FloatAToString)],
        ),
        Rule::new(
            "Replace_ValueOfDouble",
            vec![
                const_wide(A),
                invoke_static(jl.value_of_double, vec![A, PairA]),
                move_result_object(B),
            ],
            vec![
                InsnPattern::copy(0),
                const_string(B, SymStr::DoubleAToString),
            ],
        ),
        // equals on two string constants is decided here; interning
        // makes handle identity the same thing as string equality.
        Rule::new(
            "CompileTime_StringCompare",
            vec![
                const_string(A, SymStr::A),
                const_string(B, SymStr::B),
                invoke_virtual(jl.string_equals, vec![A, B]),
                move_result(C),
            ],
            vec![const_literal(
                vec![Op::Const4],
                C,
                SymLit::CompareStringsAB,
            )],
        ),
        Rule::new(
            "CompileTime_StringLength",
            vec![
                const_string(A, SymStr::A),
                invoke_virtual(jl.string_length, vec![A]),
                move_result(B),
            ],
            vec![
                const_string(A, SymStr::A),
                const_literal(vec![Op::Const16], B, SymLit::LengthStringA),
            ],
        ),
    ]
}

fn arith_rules() -> Vec<Rule> {
    use SymReg::{A, B};

    let mul_div = vec![
        Op::MulIntLit8,
        Op::MulIntLit16,
        Op::DivIntLit8,
        Op::DivIntLit16,
    ];
    let add = vec![Op::AddIntLit8, Op::AddIntLit16];
    vec![
        Rule::new(
            "Arith_MulDivLit_Pos1",
            vec![InsnPattern::new(mul_div.clone(), vec![B], Some(A)).literal(SymLit::A)],
            vec![InsnPattern::new(vec![Op::Move16], vec![B], Some(A))],
        )
        .with_predicate(first_literal_is(1)),
        Rule::new(
            "Arith_MulDivLit_Neg1",
            vec![InsnPattern::new(mul_div, vec![B], Some(A)).literal(SymLit::A)],
            vec![InsnPattern::new(vec![Op::NegInt], vec![B], Some(A))],
        )
        .with_predicate(first_literal_is(-1)),
        Rule::new(
            "Arith_AddLit_0",
            vec![InsnPattern::new(add, vec![B], Some(A)).literal(SymLit::A)],
            vec![InsnPattern::new(vec![Op::Move16], vec![B], Some(A))],
        )
        .with_predicate(first_literal_is(0)),
    ]
}

fn func_rules(ctx: &DexContext) -> Vec<Rule> {
    use SymReg::{A, B};

    let jl = JavaLang::new(ctx);
    vec![
        // getSimpleName on a class constant folds to a string constant.
        // The const-class is cloned verbatim; its register may have
        // other readers, and dead code elimination runs later.
        Rule::new(
            "Replace_ClassGetSimpleName",
            vec![
                InsnPattern::new(vec![Op::ConstClass], vec![], Some(A)).ty(SymTy::A),
                invoke_virtual(jl.class_get_simple_name, vec![A]),
                move_result_object(B),
            ],
            vec![
                InsnPattern::copy(0),
                const_string(B, SymStr::TypeAGetSimpleName),
            ],
        ),
    ]
}
