//! HTML pages. The map page gets its bench list as inline JSON.

use crate::error::{ApiError, ApiResult};
use crate::routes::MapBench;

pub const INDEX_HTML: &str = include_str!("../templates/index.html");
const MAP_HTML: &str = include_str!("../templates/map.html");
const BENCHES_PLACEHOLDER: &str = "__BENCHES_JSON__";

/// Renders the map page with `benches` embedded for the client script.
pub fn render_map(benches: &[MapBench]) -> ApiResult<String> {
    let json = serde_json::to_string(benches)
        .map_err(|err| ApiError::Internal(format!("failed to encode benches: {err}")))?;
    Ok(MAP_HTML.replace(BENCHES_PLACEHOLDER, &escape_for_script(&json)))
}

/// Rewrites `<`, `>` and `&` as JSON unicode escapes so user text can never
/// open a comment or close the surrounding `<script>` element.
fn escape_for_script(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            other => escaped.push(other),
        }
    }
    escaped
}
