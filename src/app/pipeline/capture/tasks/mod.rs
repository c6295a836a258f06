mod build_payload;
mod event_id;
mod forward;
mod hash_identity;
mod validate;

pub use build_payload::BuildPayloadTask;
pub use event_id::EventIdTask;
pub use forward::ForwardEventTask;
pub use hash_identity::HashIdentityTask;
pub use validate::ValidateEventTask;
