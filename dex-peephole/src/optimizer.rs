//! The per-method driver.

use std::collections::BTreeSet;

use tracing::trace;

use dex_ir::{DexContext, InsnId, IrInstruction, MethodBody};

use crate::cast_removal;
use crate::config::PeepholeConfig;
use crate::matcher::Matcher;
use crate::pattern::Rule;
use crate::rules;
use crate::stats::Stats;

/// An edit queued during block traversal and applied afterwards, so
/// the instruction iterator stays valid.
struct Edit {
    anchor: InsnId,
    remove: Vec<InsnId>,
    insert: Vec<IrInstruction>,
}

/// The peephole pass over one method at a time.
///
/// The optimizer itself is immutable once built; `run_method` takes
/// `&self`, so methods may be processed from several worker threads,
/// each worker owning its own matchers and summing the returned
/// [`Stats`].
pub struct PeepholeOptimizer<'a> {
    ctx: &'a DexContext,
    rules: Vec<Rule>,
    run_cast_removal: bool,
}

impl<'a> PeepholeOptimizer<'a> {
    /// Build the rule catalog against `ctx` and drop the rules `config`
    /// disables. A disabled name the catalog does not know is ignored.
    pub fn new(ctx: &'a DexContext, config: &PeepholeConfig) -> Self {
        let catalog = rules::catalog(ctx);
        let disabled: BTreeSet<&str> =
            config.disabled_rules.iter().map(String::as_str).collect();
        for &name in &disabled {
            if !catalog.iter().any(|rule| rule.name() == name) {
                trace!(rule = name, "ignoring unknown disabled rule");
            }
        }
        let rules = catalog
            .into_iter()
            .filter(|rule| !disabled.contains(rule.name()))
            .collect();
        Self {
            ctx,
            rules,
            run_cast_removal: config.run_cast_removal,
        }
    }

    /// The enabled rules, in matching order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run the pass over one method body.
    pub fn run_method(&self, body: &mut MethodBody) -> Stats {
        let mut stats = Stats::default();
        let mut matchers: Vec<Matcher<'_>> = self
            .rules
            .iter()
            .map(|rule| Matcher::new(rule, self.ctx))
            .collect();

        for block in body.blocks_mut() {
            for matcher in &mut matchers {
                matcher.reset();
            }
            let mut edits: Vec<Edit> = Vec::new();
            for insn in block.iter() {
                // First full match in catalog order wins; later
                // matchers never see this instruction.
                let winner = matchers.iter_mut().position(|m| m.try_match(insn));
                let Some(winner) = winner else { continue };
                {
                    let matcher = &matchers[winner];
                    let matched = matcher.matched_instructions();
                    let insert = matcher.replacements();
                    trace!(
                        rule = matcher.rule().name(),
                        matched = matched.len(),
                        inserted = insert.len(),
                        "rule fired"
                    );
                    stats.record(matcher.rule().name(), matched.len(), insert.len());
                    edits.push(Edit {
                        anchor: insn.id(),
                        remove: matched.iter().map(IrInstruction::id).collect(),
                        insert,
                    });
                }
                for matcher in &mut matchers {
                    matcher.reset();
                }
            }
            for edit in edits {
                block.insert_after(edit.anchor, edit.insert);
                for id in edit.remove {
                    block.remove(id);
                }
            }
        }

        if self.run_cast_removal {
            stats.casts_removed += cast_removal::remove_redundant_casts(self.ctx, body);
        }
        stats
    }
}
