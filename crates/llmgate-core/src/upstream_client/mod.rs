use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use wreq::{Client, Method, Proxy};

use llmgate_provider_core::{
    ErrorDecodeHook, Headers, HttpMethod, TransportConfig, UpstreamFailure, UpstreamHttpRequest,
    UpstreamHttpResponse, UpstreamTransportErrorKind,
};

pub type UpstreamFuture<'a> =
    Pin<Box<dyn Future<Output = Result<UpstreamHttpResponse, UpstreamFailure>> + Send + 'a>>;

/// Performs one upstream call. Non-2xx responses come back as
/// `UpstreamFailure::Http` with the body already run through `hook`.
pub trait UpstreamClient: Send + Sync {
    fn send<'a>(&'a self, req: UpstreamHttpRequest, hook: ErrorDecodeHook) -> UpstreamFuture<'a>;
}

/// Builds (or reuses) a client for a channel's transport settings.
pub trait UpstreamConnector: Send + Sync {
    fn connect(&self, transport: &TransportConfig)
    -> Result<Arc<dyn UpstreamClient>, UpstreamFailure>;
}

pub struct WreqUpstreamClient {
    client: Client,
}

impl WreqUpstreamClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, wreq::Error> {
        let mut builder = Client::builder()
            .connect_timeout(transport.connect_timeout)
            .timeout(transport.request_timeout);

        if let Some(proxy) = normalize_proxy(transport.proxy.as_deref()) {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl UpstreamClient for WreqUpstreamClient {
    fn send<'a>(&'a self, req: UpstreamHttpRequest, hook: ErrorDecodeHook) -> UpstreamFuture<'a> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(http_method_to_wreq(req.method), &req.url);

            for (k, v) in &req.headers {
                builder = builder.header(k, v);
            }

            if let Some(body) = req.body {
                builder = builder.body(body);
            }

            let resp = builder.send().await.map_err(map_wreq_error)?;
            let status = resp.status().as_u16();
            let headers = headers_from_wreq(resp.headers());
            let body = resp.bytes().await.map_err(map_wreq_error)?;

            if (200..300).contains(&status) {
                return Ok(UpstreamHttpResponse {
                    status,
                    headers,
                    body,
                });
            }
            let decoded = hook(&body);
            Err(UpstreamFailure::Http {
                status,
                headers,
                body,
                decoded,
            })
        })
    }
}

/// Caches one `wreq` client per distinct transport config, so channels that
/// share a proxy and timeouts share a connection pool.
#[derive(Default)]
pub struct WreqConnector {
    clients: Mutex<HashMap<TransportConfig, Arc<WreqUpstreamClient>>>,
}

impl WreqConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UpstreamConnector for WreqConnector {
    fn connect(
        &self,
        transport: &TransportConfig,
    ) -> Result<Arc<dyn UpstreamClient>, UpstreamFailure> {
        let mut guard = self
            .clients
            .lock()
            .map_err(|_| UpstreamFailure::Transport {
                kind: UpstreamTransportErrorKind::Other,
                message: "upstream client cache lock failed".to_string(),
            })?;
        if let Some(client) = guard.get(transport) {
            return Ok(client.clone());
        }
        let client = Arc::new(WreqUpstreamClient::new(transport).map_err(map_wreq_error)?);
        guard.insert(transport.clone(), client.clone());
        Ok(client)
    }
}

fn normalize_proxy(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|item| !item.is_empty())
}

fn http_method_to_wreq(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
    }
}

fn headers_from_wreq(map: &wreq::header::HeaderMap) -> Headers {
    map.iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn map_wreq_error(err: wreq::Error) -> UpstreamFailure {
    UpstreamFailure::Transport {
        kind: classify_wreq_error(&err),
        message: err.to_string(),
    }
}

/// wreq exposes only coarse predicates; finer kinds come from the message.
fn classify_wreq_error(err: &wreq::Error) -> UpstreamTransportErrorKind {
    let message = err.to_string().to_ascii_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|needle| message.contains(needle));

    if err.is_timeout() {
        return if mentions(&["read"]) {
            UpstreamTransportErrorKind::ReadTimeout
        } else {
            UpstreamTransportErrorKind::Timeout
        };
    }
    if mentions(&["tls", "ssl", "certificate"]) {
        return UpstreamTransportErrorKind::Tls;
    }
    if err.is_connect() && mentions(&["dns", "resolve", "lookup"]) {
        return UpstreamTransportErrorKind::Dns;
    }
    if err.is_connect() || err.is_connection_reset() {
        return UpstreamTransportErrorKind::Connect;
    }
    UpstreamTransportErrorKind::Other
}
