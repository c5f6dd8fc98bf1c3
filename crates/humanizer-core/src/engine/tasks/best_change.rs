use crate::core::models::sequence::PositionalSequence;
use crate::engine::change::SequenceChange;
use crate::engine::context::HumanizationContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use tracing::{instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Scores reverting `current[position]` to `target`; identical residues yield the null change
/// without consulting the model.
fn evaluate_reversion(
    current: &PositionalSequence,
    position: usize,
    target: char,
    context: &HumanizationContext,
) -> Result<SequenceChange, EngineError> {
    let old_aa = current[position];
    if old_aa == target {
        return Ok(SequenceChange::unchanged(old_aa));
    }
    let candidate = current.with_residue(position, target);
    let value = context.model.score(&candidate)?;
    trace!(position, from = %old_aa, to = %target, value, "Scored candidate.");
    Ok(SequenceChange::new(position, old_aa, target, value))
}

/// Finds the best single-position reversion of `current` toward `original`.
///
/// Positions flagged in `skip_mask` are never touched. Returns the null change when every
/// eligible position already matches.
#[instrument(skip_all, name = "best_change_task")]
pub fn run(
    current: &PositionalSequence,
    original: &PositionalSequence,
    skip_mask: &[bool],
    context: &HumanizationContext,
) -> Result<SequenceChange, EngineError> {
    if current.len() != original.len() || current.len() != skip_mask.len() {
        return Err(EngineError::LengthMismatch {
            expected: original.len(),
            actual: current.len(),
        });
    }

    let positions: Vec<usize> = (0..current.len()).filter(|&i| !skip_mask[i]).collect();
    context.reporter.report(Progress::TaskStart {
        total_steps: positions.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = positions.iter();

    #[cfg(feature = "parallel")]
    let iterator = positions.par_iter();

    let candidates = iterator
        .map(|&position| {
            let change = evaluate_reversion(current, position, original[position], context);
            context.reporter.report(Progress::TaskIncrement);
            change
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    context.reporter.report(Progress::TaskFinish);

    let ordering = context.config.change_ordering;
    Ok(candidates
        .into_iter()
        .fold(SequenceChange::null(), |best, candidate| {
            if ordering.is_change_less(&best, &candidate) {
                candidate
            } else {
                best
            }
        }))
}
