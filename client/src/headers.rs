//! Per-request API gateway headers

use crate::config::ClientConfig;
use uuid::Uuid;

/// Headers sent with every bank call. The body is an envelope token, so the
/// content type is plain text rather than JSON.
#[derive(Debug, Clone)]
pub struct RequestHeaders {
    /// `x-fapi-uuid`, also used as the log correlation id
    pub correlation_id: Uuid,
    pub epoch_millis: i64,
    channel_id: String,
    service_id: String,
    service_version: String,
    client_id: String,
    client_secret: String,
}

impl RequestHeaders {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            epoch_millis: chrono::Utc::now().timestamp_millis(),
            channel_id: config.channel_id.clone(),
            service_id: config.service_id.clone(),
            service_version: config.service_version.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Header names and values in the order the gateway documents them
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "text/plain".to_string()),
            ("x-fapi-epoch-millis", self.epoch_millis.to_string()),
            ("x-fapi-channel-id", self.channel_id.clone()),
            ("x-fapi-uuid", self.correlation_id.to_string()),
            ("x-fapi-serviceId", self.service_id.clone()),
            ("x-fapi-serviceVersion", self.service_version.clone()),
            ("X-IBM-Client-Id", self.client_id.clone()),
            ("X-IBM-Client-Secret", self.client_secret.clone()),
        ]
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.pairs()
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}
