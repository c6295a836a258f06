use crate::app::pipeline::capture::context::CaptureContext;
use crate::core::identity::hash::hash_identity_field;
use crate::core::models::payload::HashedIdentity;
use crate::core::pipeline::BlockingTask;
use anyhow::anyhow;

/// One-way hashes the plaintext identity fields. After this task
/// runs, nothing downstream touches raw PII
pub struct HashIdentityTask;

impl BlockingTask<CaptureContext, anyhow::Error> for HashIdentityTask {
    fn run(&self, context: &CaptureContext) -> Result<(), anyhow::Error> {
        let user = context.request.user_data.as_ref();

        let identity = HashedIdentity {
            email: hash_identity_field(user.and_then(|u| u.email.as_deref())),
            phone: hash_identity_field(user.and_then(|u| u.phone.as_deref())),
            first_name: hash_identity_field(user.and_then(|u| u.first_name.as_deref())),
        };

        context
            .identity
            .set(identity)
            .map_err(|_| anyhow!("Hashed identity already assigned"))?;

        Ok(())
    }
}
