mod errors;
mod types;

pub use errors::{DevHookError, ErrorCode, Result};
pub use types::{
    CallbackPayload,
    CallbackResponse,
    CallbackStatus,
    DeliveryStatus,
    FileRecord,
    PollFile,
    PollResult,
    PollStatus,
    PollUploadResponse,
    SignedPayload,
    SimulationId,
    SimulationOutcome,
    UploadDescriptor,
};
