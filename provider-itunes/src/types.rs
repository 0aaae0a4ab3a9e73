//! iTunes Search API response types

use core_library::Track;
use serde::Deserialize;

/// Body of `GET /search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub result_count: u32,
    pub results: Vec<Track>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_search_response() {
        let body = r#"{
            "resultCount": 2,
            "results": [
                {"trackId": 1, "trackName": "A", "artistName": "X", "previewUrl": "https://p/1.m4a"},
                {"trackId": 2, "trackName": "B", "artistName": "Y", "kind": "song"}
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.result_count, 2);
        assert_eq!(response.results[0].preview_url(), Some("https://p/1.m4a"));
        assert!(!response.results[1].has_preview());
    }
}
