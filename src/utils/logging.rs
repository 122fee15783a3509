pub const BODY_PREVIEW_CHARS: usize = 300;

/// Lossy UTF-8 preview of a raw body, truncated to [`BODY_PREVIEW_CHARS`].
pub(crate) fn preview(raw: &[u8]) -> String {
    let body = String::from_utf8_lossy(raw);
    format!("{:.len$}", body, len = BODY_PREVIEW_CHARS)
}

/// Render a raw JSON body pretty-printed, only when DEBUG is enabled.
///
/// Non-JSON bodies (storage responses, empty bodies) fall back to [`preview`].
pub(crate) fn with_pretty_json_debug<F>(raw: &[u8], log_action: F)
where
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let rendered = serde_json::from_slice::<serde_json::Value>(raw)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .map(|pretty| format!("{:.len$}", pretty, len = BODY_PREVIEW_CHARS * 4))
        .unwrap_or_else(|| preview(raw));
    log_action(rendered.as_str());
}
