//! Peephole optimizer for the `dex-ir` instruction stream.
//!
//! The pass scans each basic block of a method and replaces short,
//! locally recognizable instruction sequences with shorter equivalent
//! ones: `StringBuilder` chains are coalesced, constant calls such as
//! `String.valueOf(1)` fold to string constants, self-moves disappear,
//! and multiply/divide by `±1` become moves or negations.
//!
//! The engine is declarative. A [`Rule`] pairs a match sequence of
//! [`InsnPattern`]s with a replace sequence over the same symbolic
//! placeholders; one [`Matcher`] per rule streams over the block and
//! binds placeholders as instructions arrive, and the synthesizer
//! materializes the replacement from those bindings, evaluating
//! compile-time directives (string concatenation, number-to-string,
//! interned-string comparison). [`PeepholeOptimizer`] drives all
//! enabled matchers across a method and applies the queued edits.
//!
//! Matches never cross a basic-block boundary, and the matcher only
//! backtracks one step: a sequence failing past its second element is
//! abandoned without rescanning. Both are deliberate trade-offs for a
//! single cheap pass over each block.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

pub mod cast_removal;
mod config;
mod matcher;
mod optimizer;
mod pattern;
pub mod rules;
mod stats;
mod synthesize;

pub use config::PeepholeConfig;
pub use matcher::Matcher;
pub use optimizer::PeepholeOptimizer;
pub use pattern::{
    InsnPattern, Payload, Predicate, Rule, RuleError, SymLit, SymReg, SymStr, SymTy,
};
pub use stats::Stats;

#[doc(no_inline)]
pub use dex_ir;
