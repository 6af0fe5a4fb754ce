/// Cloudflare's AI gateway injects its own API version segment.
pub const CLOUDFLARE_AI_GATEWAY_PREFIX: &str = "https://gateway.ai.cloudflare.com";

/// Channel override if set and non-blank, else the vendor default, with one
/// trailing `/` removed.
pub fn resolve_base_url(override_url: Option<&str>, default_base: &str) -> String {
    let base = override_url
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default_base);
    base.strip_suffix('/').unwrap_or(base).to_string()
}

/// Concatenates an already-resolved base with an endpoint path.
///
/// With `strip_gateway_version`, a passthrough-gateway base drops the leading
/// `/v1` of `path`.
pub fn join_url(base: &str, path: &str, strip_gateway_version: bool) -> String {
    let path = if strip_gateway_version && base.starts_with(CLOUDFLARE_AI_GATEWAY_PREFIX) {
        path.strip_prefix("/v1").unwrap_or(path)
    } else {
        path
    };
    format!("{base}{path}")
}
