/// Per-vendor constants. Each adapter owns one as a `const`, so every channel of
/// that vendor shares the same read-only instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderStaticConfig {
    pub base_url: &'static str,
    pub chat_completions: &'static str,
    pub model_list: &'static str,
}

impl ProviderStaticConfig {
    pub const fn new(
        base_url: &'static str,
        chat_completions: &'static str,
        model_list: &'static str,
    ) -> Self {
        Self {
            base_url,
            chat_completions,
            model_list,
        }
    }
}
