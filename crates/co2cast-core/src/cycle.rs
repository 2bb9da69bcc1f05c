//! Submission cycle: `Idle -> Collecting -> Submitted -> {Succeeded, Failed} -> Idle`.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::collector::InputCollector;
use crate::error::SubmitError;
use crate::feature::{FeatureSchema, FeatureVector};
use crate::gateway::{GatewayStatus, PredictionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Idle,
    Collecting,
    Submitted,
    Succeeded,
    Failed,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Cannot {action} while {phase:?}")]
pub struct CycleError {
    pub phase: CyclePhase,
    pub action: &'static str,
}

/// What one submission produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded {
        vector: FeatureVector,
        result: PredictionResult,
    },
    Failed(SubmitError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            Outcome::Succeeded { result, .. } => Some(result),
            Outcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SubmitError> {
        match self {
            Outcome::Succeeded { .. } => None,
            Outcome::Failed(e) => Some(e),
        }
    }
}

pub struct SubmissionCycle {
    phase: CyclePhase,
    collector: InputCollector,
    outcome: Option<Outcome>,
}

impl SubmissionCycle {
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            phase: CyclePhase::Idle,
            collector: InputCollector::new(schema),
            outcome: None,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    fn guard(&self, allowed: &[CyclePhase], action: &'static str) -> Result<(), CycleError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(CycleError {
                phase: self.phase,
                action,
            })
        }
    }

    /// Start a fresh form seeded with defaults.
    pub fn begin(&mut self) -> Result<&mut InputCollector, CycleError> {
        self.guard(&[CyclePhase::Idle], "begin")?;
        self.collector.reset();
        self.phase = CyclePhase::Collecting;
        Ok(&mut self.collector)
    }

    pub fn collector(&self) -> &InputCollector {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> Result<&mut InputCollector, CycleError> {
        self.guard(&[CyclePhase::Collecting], "edit inputs")?;
        Ok(&mut self.collector)
    }

    /// Read the drafts and run one prediction.
    pub fn submit(&mut self, status: &GatewayStatus) -> Result<&Outcome, CycleError> {
        self.guard(&[CyclePhase::Collecting], "submit")?;
        Ok(self.complete(status))
    }

    fn complete(&mut self, status: &GatewayStatus) -> &Outcome {
        self.phase = CyclePhase::Submitted;
        debug!("submission received");

        let outcome = match self.run(status) {
            Ok((vector, result)) => {
                info!(value = result.value, "prediction succeeded");
                self.phase = CyclePhase::Succeeded;
                Outcome::Succeeded { vector, result }
            }
            Err(e) => {
                info!("prediction failed: {}", e);
                self.phase = CyclePhase::Failed;
                Outcome::Failed(e)
            }
        };

        self.outcome.insert(outcome)
    }

    fn run(&self, status: &GatewayStatus) -> Result<(FeatureVector, PredictionResult), SubmitError> {
        let gateway = status.gateway()?;
        let vector = self.collector.collect()?;
        let result = gateway.predict(&vector)?;
        Ok((vector, result))
    }

    /// Hand back the rendered outcome and return to `Idle`.
    pub fn finish(&mut self) -> Result<Outcome, CycleError> {
        self.guard(&[CyclePhase::Succeeded, CyclePhase::Failed], "finish")?;
        self.phase = CyclePhase::Idle;
        self.collector.reset();
        self.outcome.take().ok_or(CycleError {
            phase: CyclePhase::Idle,
            action: "finish",
        })
    }
}

/// One complete cycle for stateless front ends.
pub fn submit_once<K, V>(
    status: &GatewayStatus,
    schema: FeatureSchema,
    pairs: impl IntoIterator<Item = (K, V)>,
) -> Outcome
where
    K: AsRef<str>,
    V: Into<String>,
{
    match InputCollector::from_pairs(schema, pairs) {
        Ok(collector) => submit_collected(status, collector),
        Err(e) => Outcome::Failed(e.into()),
    }
}

/// One complete cycle over drafts the caller already filled in.
pub fn submit_collected(status: &GatewayStatus, collector: InputCollector) -> Outcome {
    let mut cycle = SubmissionCycle {
        phase: CyclePhase::Collecting,
        collector,
        outcome: None,
    };
    cycle.complete(status).clone()
}
