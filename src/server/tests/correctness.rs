use super::helpers::*;
use crate::audio::codec;

// ── Full Synthesis Path ─────────────────────────────────────

#[tokio::test]
async fn post_tts_returns_playable_wav() {
    let (server, probe) = start_test_server().await;

    let resp = client()
        .post(server.url("/tts"))
        .json(&tts_body("test phrase", "alice"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "audio/wav"
    );
    assert_eq!(
        resp.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"tts_output.wav\""
    );

    let body = resp.bytes().await.unwrap();
    assert!(!body.is_empty());
    // what the engine produced is what the client can decode
    let (samples, rate) = codec::decode_wav(&body).unwrap();
    assert_eq!(samples.len(), 2400);
    assert_eq!(rate, 24000);

    assert_eq!(probe.calls(), 1);
}

#[tokio::test]
async fn get_tts_percent_decodes_text() {
    let (server, probe) = start_test_server().await;

    let resp = client()
        .get(server.url("/tts?text=test%20phrase&character=alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let specs = probe.seen_specs();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].text, "test phrase");
    // reference text flows from the character's ref.txt, trimmed
    assert_eq!(specs[0].ref_text, "hello there");
    assert!(specs[0].remove_silence);
}

#[tokio::test]
async fn mp3_and_ogg_formats_are_delivered() {
    let (server, _probe) = start_test_server().await;

    for format in ["mp3", "ogg"] {
        let resp = client()
            .post(server.url("/tts"))
            .json(&serde_json::json!({
                "text": "hi",
                "character": "alice",
                "format": format,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "format {} should succeed", format);
        assert_eq!(
            resp.headers().get("content-type").unwrap().to_str().unwrap(),
            format!("audio/{}", format)
        );
        assert!(!resp.bytes().await.unwrap().is_empty());
    }
}

// ── Fail-Fast Validation ────────────────────────────────────

#[tokio::test]
async fn empty_text_is_rejected_without_engine_call() {
    let (server, probe) = start_test_server().await;

    let resp = client()
        .post(server.url("/tts"))
        .json(&tts_body("", "alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Text is required");
    assert_eq!(probe.calls(), 0, "engine must not be invoked");
}

#[tokio::test]
async fn unsupported_language_is_rejected_without_engine_call() {
    let (server, probe) = start_test_server().await;

    let resp = client()
        .post(server.url("/tts"))
        .json(&serde_json::json!({
            "text": "x",
            "character": "alice",
            "text_language": "Klingon",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Unsupported language: Klingon");
    assert_eq!(probe.calls(), 0);
}

#[tokio::test]
async fn unsupported_format_is_rejected_eagerly() {
    let (server, probe) = start_test_server().await;

    let resp = client()
        .post(server.url("/tts"))
        .json(&serde_json::json!({
            "text": "x",
            "character": "alice",
            "format": "flac",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Unsupported format: flac");
    assert_eq!(probe.calls(), 0);
}

#[tokio::test]
async fn unknown_character_is_a_bad_request() {
    let (server, probe) = start_test_server().await;

    let resp = client()
        .post(server.url("/tts"))
        .json(&tts_body("x", "bob"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Character not found: bob");
    assert_eq!(probe.calls(), 0);
}

// ── Character Listing ───────────────────────────────────────

#[tokio::test]
async fn character_list_reports_complete_characters_only() {
    let (server, _probe) = start_test_server().await;
    add_character(&server.character_dir(), "bob", "good morning");
    // incomplete: directory without reference files
    std::fs::create_dir_all(server.character_dir().join("carol")).unwrap();

    let resp = client()
        .get(server.url("/character_list"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["alice"], serde_json::json!(["default"]));
    assert_eq!(body["bob"], serde_json::json!(["default"]));
    assert!(body.get("carol").is_none());
}

// ── Artifact Lifecycle ──────────────────────────────────────

#[tokio::test]
async fn artifacts_are_released_after_delivery() {
    let (server, _probe) = start_test_server().await;

    for _ in 0..3 {
        let resp = client()
            .post(server.url("/tts"))
            .json(&tts_body("test phrase", "alice"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.bytes().await.unwrap();
    }
    assert_eq!(
        server.cache_file_count(),
        0,
        "no transient artifacts may outlive their response"
    );
}

// ── Health & CORS ───────────────────────────────────────────

#[tokio::test]
async fn health_reports_engine_availability() {
    let (server, _probe) = start_test_server().await;

    let resp = client().get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["engine_available"], true);
}

#[tokio::test]
async fn cors_headers_are_present_for_any_origin() {
    let (server, _probe) = start_test_server().await;

    let resp = client()
        .get(server.url("/character_list"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let allow_origin = resp
        .headers()
        .get("access-control-allow-origin")
        .expect("CORS header must be present")
        .to_str()
        .unwrap();
    assert!(
        allow_origin == "http://example.com" || allow_origin == "*",
        "unexpected allow-origin: {}",
        allow_origin
    );
}
