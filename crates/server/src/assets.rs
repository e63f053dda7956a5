//! Static files served by the HTTP front end.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/assets"]
pub struct StaticAssets;

/// The status page served at `/`.
pub fn index_html() -> Option<String> {
    StaticAssets::get("index.html")
        .map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_polls_status() {
        let html = index_html().expect("index.html should be embedded");
        assert!(html.contains("/status"));
        assert!(html.contains("/start"));
    }
}
