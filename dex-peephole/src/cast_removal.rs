//! Redundant check-cast removal.
//!
//! An independent pass over the same bodies: a `check-cast` directly
//! after `move-result-object` proves nothing when the invoked method
//! already returns exactly the cast type, so it is deleted. This is a
//! plain scan, not a pattern-engine rule; it is selected by
//! [`PeepholeConfig::run_cast_removal`](crate::PeepholeConfig).

use dex_ir::{DexContext, MethodBody, Op};

/// Delete casts that re-state an invoke's return type. Returns how
/// many were removed.
pub fn remove_redundant_casts(ctx: &DexContext, body: &mut MethodBody) -> u64 {
    let mut removed = 0;
    for block in body.blocks_mut() {
        let mut victims = Vec::new();
        for window in block.insns().windows(3) {
            let [invoke, result, cast] = window else { continue };
            if !invoke.op().is_invoke()
                || result.op() != Op::MoveResultObject
                || cast.op() != Op::CheckCast
            {
                continue;
            }
            if result.dest() != Some(cast.src(0)) {
                continue;
            }
            let Some(method) = invoke.method() else { continue };
            if cast.ty() == Some(ctx.method_return_type(method)) {
                victims.push(cast.id());
            }
        }
        removed += victims.len() as u64;
        for id in victims {
            block.remove(id);
        }
    }
    removed
}
