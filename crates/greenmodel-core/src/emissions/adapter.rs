//! Wraps a unit of work in one measurement session.

use super::EmissionsProvider;
use crate::error::{EngineError, EngineResult};
use std::future::Future;

/// Output of measured work together with its emissions.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<T> {
    pub output: T,
    pub emissions_kg: f64,
}

/// Run `work` inside a measurement session on `provider`.
///
/// The session is started right before `work` and stopped right after it,
/// whether or not it succeeded. A failed `work` wins over a failed stop. Any
/// provider failure, or a non-finite or negative reading, is
/// [`EngineError::MeasurementUnavailable`] and the work output is discarded.
pub async fn measure<P, F, T>(provider: &mut P, work: F) -> EngineResult<Measured<T>>
where
    P: EmissionsProvider + ?Sized,
    F: Future<Output = EngineResult<T>>,
{
    provider.start().await?;

    let result = work.await;
    let stopped = provider.stop().await;

    let output = match result {
        Ok(output) => output,
        Err(err) => {
            if let Err(stop_err) = stopped {
                tracing::warn!(error = %stop_err, "measurement stop failed after work error");
            }
            return Err(err);
        }
    };

    let emissions_kg = stopped?;
    if !emissions_kg.is_finite() || emissions_kg < 0.0 {
        return Err(EngineError::MeasurementUnavailable(format!(
            "provider reported {emissions_kg} kg"
        )));
    }

    Ok(Measured { output, emissions_kg })
}
