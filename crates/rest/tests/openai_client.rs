//! OpenAI-compatible client tests against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wattle_rest::ai::{AiClient, AiError, AudioClip, ChatMessage, ContentPart, OpenAiClient};

async fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(
        format!("{}/v1", server.uri()),
        Some("sk-test".to_string()),
        Duration::from_secs(5),
    )
    .expect("client")
    .with_models("gpt-test", "whisper-test", "tts-test")
}

#[tokio::test]
async fn test_chat_sends_model_and_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "messages": [
                {"role": "system", "content": [{"type": "text", "text": "be brief"}]},
                {"role": "user", "content": [
                    {"type": "text", "text": "what is this?"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                ]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{"message": {"role": "assistant", "content": "<ANSWER>A cat.</ANSWER>"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client(&server)
        .await
        .chat(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user_parts(vec![
                ContentPart::Text("what is this?".into()),
                ContentPart::ImageUrl("data:image/png;base64,AAAA".into()),
            ]),
        ])
        .await
        .expect("chat");

    assert_eq!(completion.text, "<ANSWER>A cat.</ANSWER>");
    assert_eq!(completion.response_id.as_deref(), Some("chatcmpl-1"));
}

#[tokio::test]
async fn test_chat_without_choices_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .chat(vec![ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::Parse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .chat(vec![ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::RateLimited), "got {:?}", err);
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .chat(vec![ChatMessage::user("hi")])
        .await
        .unwrap_err();
    match err {
        AiError::RequestFailed { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_transcribe_posts_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "hello there"})))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server)
        .await
        .transcribe(AudioClip {
            bytes: vec![1, 2, 3],
            mime_type: "audio/webm".to_string(),
        })
        .await
        .expect("transcribe");
    assert_eq!(text, "hello there");

    let requests = server.received_requests().await.expect("recording enabled");
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(body.contains("whisper-test"));
    assert!(body.contains("filename=\"audio.webm\""));
}

#[tokio::test]
async fn test_transcribe_rejects_empty_audio() {
    let server = MockServer::start().await;

    let err = client(&server)
        .await
        .transcribe(AudioClip {
            bytes: Vec::new(),
            mime_type: "audio/webm".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_speak_returns_audio_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(body_partial_json(json!({
            "model": "tts-test",
            "input": "Good morning",
            "voice": "nova",
            "response_format": "mp3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let audio = client(&server)
        .await
        .speak("Good morning", "nova")
        .await
        .expect("speak");
    assert_eq!(audio, b"ID3audio");
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    let client = OpenAiClient::new("http://127.0.0.1:9/v1", None, Duration::from_secs(2))
        .expect("client");

    let err = client
        .chat(vec![ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::Network(_)), "got {:?}", err);
}
