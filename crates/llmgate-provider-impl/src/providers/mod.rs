pub mod claude;
pub mod openai;

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use llmgate_provider_core::{CustomParams, ProviderError, ProviderResult};

/// Serializes a vendor body, overlays the channel's custom params and drops any
/// `stream` flag: outbound calls are always non-streaming.
pub(crate) fn encode_body(body: &impl Serialize, params: &CustomParams) -> ProviderResult<Bytes> {
    encode_body_with(body, params, |_| {})
}

/// Like [`encode_body`], then runs `fill_defaults` on the merged body so vendor
/// defaults only land where neither the caller nor custom params set a value.
pub(crate) fn encode_body_with(
    body: &impl Serialize,
    params: &CustomParams,
    fill_defaults: impl FnOnce(&mut Map<String, Value>),
) -> ProviderResult<Bytes> {
    let mut value =
        serde_json::to_value(body).map_err(|err| ProviderError::Other(err.to_string()))?;
    let Value::Object(map) = &mut value else {
        return Err(ProviderError::Other(
            "vendor body is not a JSON object".to_string(),
        ));
    };
    map.remove("stream");
    params.merge(map);
    fill_defaults(map);
    let body = serde_json::to_vec(&value).map_err(|err| ProviderError::Other(err.to_string()))?;
    Ok(Bytes::from(body))
}

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> ProviderResult<T> {
    serde_json::from_slice(body).map_err(|err| ProviderError::Decode(err.to_string()))
}
