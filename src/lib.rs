pub mod config;
pub mod core;
pub mod hook;
pub mod utils;

// 重新导出核心类型
pub use crate::core::{
    CallbackPayload,
    DeliveryStatus,
    DevHookError,
    ErrorCode,
    FileRecord,
    PollResult,
    Result,
    SignedPayload,
    SimulationOutcome,
    UploadDescriptor,
};

pub use crate::config::Config;
pub use crate::hook::{DevHookSimulator, HmacSigner, PayloadSigner};
