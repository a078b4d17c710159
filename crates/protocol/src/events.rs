//! Progress events emitted during workflow execution.
//!
//! The engine reports progress over an async channel as it moves through the
//! pipeline. Consumers (the CLI progress printer, tests) subscribe to the
//! receiving end; emission is best-effort and dropping the receiver never
//! affects workflow semantics.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow_models::{StepError, StepName};

/// Status updates sent from the engine to its consumer.
///
/// Uses tagged enum serialization:
/// ```json
/// {
///   "type": "stepCompleted",
///   "payload": {
///     "workflow_id": "uuid-here",
///     "step": "videoGeneration"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new workflow run has started.
    WorkflowStarted {
        workflow_id: Uuid,
        image_url: String,
    },

    /// A pipeline stage is about to execute.
    StepStarted { workflow_id: Uuid, step: StepName },

    /// A pipeline stage recorded a success outcome.
    StepCompleted { workflow_id: Uuid, step: StepName },

    /// A pipeline stage recorded a failure outcome.
    ///
    /// For required steps this is followed by `WorkflowCompleted` with
    /// `success == false`; best-effort steps keep the run going.
    StepFailed {
        workflow_id: Uuid,
        step: StepName,
        error: StepError,
    },

    /// The run finished and the result is final.
    WorkflowCompleted {
        workflow_id: Uuid,
        success: bool,
        duration_ms: u64,
    },

    /// A publish container was created and its confirm call scheduled.
    ContainerScheduled { container_id: String },
}
