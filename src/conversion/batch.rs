//! Batch encoding with per-item failure isolation

use crate::conversion::config::ConversionOptions;
use crate::conversion::engine::Codec;
use crate::error::ToonResult;
use serde::Serialize;
use serde_json::Value;

/// Outcome of encoding one batch item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    fn from_result(index: usize, result: ToonResult<String>) -> Self {
        match result {
            Ok(toon) => Self {
                index,
                success: true,
                toon: Some(toon),
                error: None,
            },
            Err(err) => Self {
                index,
                success: false,
                toon: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Index-aligned results for a whole batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }
}

/// Encode every item in order with the same options.
///
/// A failing item yields a failed record at its index and never stops the
/// remaining items.
pub fn encode_batch(
    codec: &dyn Codec,
    items: &[Value],
    options: &ConversionOptions,
) -> BatchOutcome {
    let results: Vec<BatchItemResult> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let result = codec.encode(item, options);
            if let Err(err) = &result {
                tracing::debug!(index, error = %err, "Batch item failed");
            }
            BatchItemResult::from_result(index, result)
        })
        .collect();

    let failed = results.iter().filter(|r| !r.success).count();
    BatchOutcome {
        total: items.len(),
        failed,
        results,
    }
}
