//! Shared test utilities and fixtures.

use crate::ops::ApiResponse;

pub(crate) fn respond(status: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status,
        body: body.to_string(),
    }
}

pub(crate) fn ok(body: &str) -> ApiResponse {
    respond(200, body)
}

pub(crate) const TORRENTS_JSON: &str = r#"[
    {"hash":"8c4adbf9ebe66f1d804fb6a4fb9b74966c3ab609","name":"debian-12.iso","state":"pausedDL","tags":"qbt-rules-x"}
]"#;

pub(crate) const TRACKERS_JSON: &str = r#"[
    {"url":"** [DHT] **","status":2,"tier":-1},
    {"url":"** [PeX] **","status":2,"tier":-1},
    {"url":"udp://tracker.example.com:6969/announce","status":1,"tier":0}
]"#;

pub(crate) const CATEGORIES_JSON: &str = r#"{
    "movies":{"name":"movies","savePath":"/data/movies"},
    "tv":{"name":"tv","savePath":""}
}"#;
