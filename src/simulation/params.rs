//! Numerical parameters for one simulation run
//!
//! `Parameters` holds the validated run settings:
//! - time step and total simulated time,
//! - the derived step count,
//! - the number of output rows the caller asked for

use crate::error::{NbodyError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub time_step: f64,           // dt in seconds
    pub total_time: f64,          // simulated seconds
    pub num_steps: usize,         // round(total_time / time_step)
    pub requested_outputs: usize, // outputs-per-body as given by the caller
}

impl Parameters {
    /// Validate raw run arguments.
    ///
    /// `outputs_per_body` is signed so a negative request is reported as a
    /// validation error rather than a parse failure.
    pub fn new(time_step: f64, total_time: f64, outputs_per_body: i64) -> Result<Self> {
        if !time_step.is_finite() || !total_time.is_finite() {
            return Err(NbodyError::validation(
                "time-step and total-time must be finite numbers",
            ));
        }
        if time_step <= 0.0 || total_time <= 0.0 || time_step > total_time {
            return Err(NbodyError::validation(
                "time-step and total-time must be positive with total-time >= time-step",
            ));
        }
        if outputs_per_body <= 0 {
            return Err(NbodyError::validation("outputs-per-body must be positive"));
        }
        let requested_outputs = usize::try_from(outputs_per_body)
            .map_err(|_| NbodyError::validation("outputs-per-body is too large"))?;

        // rounded to the nearest whole step; at least 1 since time_step <= total_time
        let steps = (total_time / time_step + 0.5).floor();
        if steps > usize::MAX as f64 {
            return Err(NbodyError::validation("total-time / time-step is too large"));
        }

        Ok(Self {
            time_step,
            total_time,
            num_steps: steps as usize,
            requested_outputs,
        })
    }
}
