use crate::app::pipeline::capture::context::CaptureContext;
use crate::core::models::payload::{
    ACTION_SOURCE_WEB, ConversionEvent, ConversionPayload, IdentityPayload,
};
use crate::core::pipeline::BlockingTask;
use anyhow::anyhow;
use std::time::{SystemTime, UNIX_EPOCH};

/// Assembles the upstream payload from the prior task outputs:
/// hashed identity merged with unhashed transport context, the
/// server-side event time, and the caller's custom data passed
/// through untouched
pub struct BuildPayloadTask;

impl BlockingTask<CaptureContext, anyhow::Error> for BuildPayloadTask {
    fn run(&self, context: &CaptureContext) -> Result<(), anyhow::Error> {
        let event_id = context
            .event_id
            .get()
            .ok_or_else(|| anyhow!("No event id set before payload assembly"))?;

        let identity = context
            .identity
            .get()
            .ok_or_else(|| anyhow!("No hashed identity set before payload assembly"))?;

        let user = context.request.user_data.as_ref();

        let event_source_url = context
            .request
            .event_source_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| context.client.referer.clone());

        let event_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let event = ConversionEvent {
            event_name: context.request.event_name.clone(),
            event_time,
            event_id: event_id.clone(),
            event_source_url,
            action_source: ACTION_SOURCE_WEB,
            user_data: IdentityPayload {
                em: identity.email.clone(),
                ph: identity.phone.clone(),
                first_name: identity.first_name.clone(),
                client_ip_address: context.client.ip.clone(),
                client_user_agent: context.client.user_agent.clone(),
                fbc: user.and_then(|u| u.fbc.clone()),
                fbp: user.and_then(|u| u.fbp.clone()),
            },
            custom_data: context.request.custom_data.clone(),
        };

        context
            .payload
            .set(ConversionPayload { data: vec![event] })
            .map_err(|_| anyhow!("Payload already assigned"))?;

        Ok(())
    }
}
