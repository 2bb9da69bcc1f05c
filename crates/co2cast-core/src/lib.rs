// Domain modules
pub mod catalog;
pub mod collector;
pub mod config;
pub mod cycle;
pub mod error;
pub mod feature;
pub mod gateway;
pub mod predictor;
pub mod presenter;

#[cfg(test)]
mod testing;

pub use catalog::{Variant, VariantProfile};
pub use collector::{FieldView, InputCollector};
pub use config::Co2castConfig;
pub use cycle::{submit_collected, submit_once, CycleError, CyclePhase, Outcome, SubmissionCycle};
pub use error::{
    Co2castError, InputError, LoadError, PredictionError, Result, SchemaError, SubmitError,
};
pub use feature::{FeatureFrame, FeatureKind, FeatureSchema, FeatureSpec, FeatureVector, SafeRange};
pub use gateway::{FeatureImportance, GatewayStatus, ModelGateway, PredictionResult};
pub use predictor::{check_columns, ModelHandle, Predictor};
pub use presenter::{present, ImportanceBar, ImportanceChart, ResultKind, ResultView, SummaryRow};
