mod client;
mod dispatcher;
mod poller;
mod signer;
mod simulator;

pub use client::HttpClient;
pub use dispatcher::{
    build_callback_url, callback_headers, dispatch, is_valid_response, raw_callback_url, HOOK_HEADER,
    SIGNATURE_HEADER, VERSION_HEADER,
};
pub use poller::{poll_once, poll_until_done};
pub use signer::{sign_body, sign_payload, verify_signature, HmacSigner, PayloadSigner, SIGNATURE_PREFIX};
pub use simulator::DevHookSimulator;
