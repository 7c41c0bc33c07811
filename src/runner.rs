//! Batch runner.
//!
//! Slices the input list into fixed-size chunks, submits each chunk to the
//! generation engine as one blocking call, and collects outputs in input
//! order. Chunks run strictly sequentially. Engine failures abort the run;
//! parse failures become null rows.

use anyhow::{ensure, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::engine::ChatGenerator;
use crate::parser;
use crate::prompt::build_conversation;
use crate::types::{EstimateReport, SamplingOptions};

pub struct BatchRunner<'a> {
    engine: &'a dyn ChatGenerator,
    sampling: SamplingOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(engine: &'a dyn ChatGenerator, sampling: SamplingOptions) -> Self {
        Self { engine, sampling }
    }

    /// Generate raw responses for all drugs, order-preserving.
    ///
    /// Splits `drugs` into contiguous chunks of `batch_size` (the last chunk
    /// may be shorter) and submits them sequentially. `batch_size` of zero
    /// is rejected.
    pub async fn run(&self, drugs: &[String], reasoning: bool, batch_size: usize) -> Result<Vec<String>> {
        ensure!(batch_size >= 1, "batch_size must be at least 1, got {batch_size}");

        let mut responses = Vec::with_capacity(drugs.len());
        let progress = chunk_progress_bar(drugs.len() as u64);

        for (index, chunk) in drugs.chunks(batch_size).enumerate() {
            debug!(chunk = index, size = chunk.len(), "Submitting chunk");

            let conversations: Vec<_> = chunk
                .iter()
                .map(|drug| build_conversation(drug, reasoning))
                .collect();

            let outputs = self
                .engine
                .generate(&conversations, &self.sampling)
                .await
                .with_context(|| format!("Generation failed on chunk {index}"))?;

            ensure!(
                outputs.len() == chunk.len(),
                "Engine returned {} outputs for a chunk of {}",
                outputs.len(),
                chunk.len()
            );

            responses.extend(outputs);
            progress.inc(chunk.len() as u64);
        }

        progress.finish_and_clear();
        Ok(responses)
    }

    /// Full estimation pass: generate, then parse each response into a
    /// probability. Output rows align positionally with `drugs`.
    pub async fn estimate(
        &self,
        drugs: &[String],
        reasoning: bool,
        batch_size: usize,
    ) -> Result<EstimateReport> {
        info!(
            drugs = drugs.len(),
            batch_size,
            reasoning,
            "Starting estimation run"
        );

        let responses = self.run(drugs, reasoning, batch_size).await?;

        let mut probabilities = Vec::with_capacity(drugs.len());
        for (drug, response) in drugs.iter().zip(&responses) {
            let probability = match parser::parse_probability_detailed(response) {
                Ok(p) => Some(p),
                Err(reason) => {
                    warn!(%drug, %reason, "No estimate parsed from response");
                    None
                }
            };
            probabilities.push(probability);
        }

        let report = EstimateReport {
            probabilities,
            responses,
        };

        info!(
            rows = report.len(),
            nulls = report.null_count(),
            "Estimation run complete"
        );

        Ok(report)
    }
}

fn chunk_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} drugs ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
