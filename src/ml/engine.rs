// ============================================================
// Layer 5 - Step Engine Driver
// ============================================================
// Feeds a cut tensor to a StepEngine:
//
//   for t in 0..true_len:
//       (hidden, loss_t) = engine.step(x[t], hidden)
//       total += loss_t
//
// A sample always starts from a fresh hidden state supplied by
// the caller. The loop stops at the sample's true length, so the
// mask value never reaches the engine.

use crate::data::cutter::CutTensor;
use crate::domain::error::PipelineResult;
use crate::domain::traits::StepEngine;

/// Total and per-step loss over everything that was unrolled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnrollSummary {
    pub samples:    usize,
    pub steps:      usize,
    pub total_loss: f64,
}

impl UnrollSummary {
    pub fn mean_step_loss(&self) -> f64 {
        if self.steps == 0 { 0.0 } else { self.total_loss / self.steps as f64 }
    }
}

/// Unroll `engine` over the real rows of sample `index`.
/// Returns the final hidden state and the summed loss.
pub fn unroll_loss<E: StepEngine>(
    engine: &mut E,
    tensor: &CutTensor,
    index:  usize,
    hidden: E::Hidden,
) -> PipelineResult<(E::Hidden, f64)> {
    let sample   = tensor.sample(index)?;
    let true_len = tensor.lengths()[index];

    let mut hidden = hidden;
    let mut total  = 0.0;
    for row in sample.rows().into_iter().take(true_len) {
        let (next, loss) = engine.step([row[0], row[1], row[2]], hidden);
        hidden = next;
        total += loss;
    }
    Ok((hidden, total))
}

/// Unroll every sample of the tensor, each from `init_hidden()`.
pub fn unroll_corpus<E, F>(engine: &mut E, tensor: &CutTensor, mut init_hidden: F) -> PipelineResult<UnrollSummary>
where
    E: StepEngine,
    F: FnMut() -> E::Hidden,
{
    let mut summary = UnrollSummary { samples: 0, steps: 0, total_loss: 0.0 };
    for index in 0..tensor.sample_count() {
        let (_, loss) = unroll_loss(engine, tensor, index, init_hidden())?;
        summary.samples += 1;
        summary.steps += tensor.lengths()[index];
        summary.total_loss += loss;
    }
    tracing::debug!(
        "Unrolled {} samples, {} steps, mean step loss {:.6}",
        summary.samples,
        summary.steps,
        summary.mean_step_loss()
    );
    Ok(summary)
}
