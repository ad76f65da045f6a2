//! Health record API tests.
//!
//! Records, uploads, analysis, questions, transcription, conversations,
//! profile and file download, run against a scripted AI client.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};

use common::assertions::assert_operation_outcome;
use common::harness::{Authorized, OTHER_USER, ScriptedAi, TestApp, USER};
use wattle_rest::ai::ContentPart;
use wattle_rest::ai::prompts::{ANALYSIS_UNAVAILABLE, ANSWER_UNAVAILABLE, HOLISTIC_UNAVAILABLE};

fn text_file(name: &str, content: &str) -> Part {
    Part::bytes(content.as_bytes().to_vec())
        .file_name(name)
        .mime_type("text/plain")
}

/// Uploads one text file and returns `(recordId, fileUrls)`.
async fn upload_note(app: &TestApp, name: &str, content: &str) -> (String, Vec<String>) {
    let form = MultipartForm::new()
        .add_text("recordName", "Blood panel")
        .add_part("files", text_file(name, content));

    let response = app.server.post("/api/upload").as_user().multipart(form).await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    let urls = body["fileUrls"]
        .as_array()
        .expect("fileUrls")
        .iter()
        .map(|u| u.as_str().unwrap_or_default().to_string())
        .collect();
    (body["recordId"].as_str().expect("recordId").to_string(), urls)
}

/// Path part of a blob URL.
fn url_path(app: &TestApp, url: &str) -> String {
    url.strip_prefix(&app.config.base_url)
        .expect("blob URL under base URL")
        .to_string()
}

// =============================================================================
// Records
// =============================================================================

mod records {
    use super::*;

    #[tokio::test]
    async fn test_record_lifecycle() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/records")
            .as_user()
            .json(&json!({"name": "X-ray", "urls": ["http://example.org/a.png"], "comment": "left arm"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let record: Value = response.json();
        let id = record["id"].as_str().expect("id").to_string();
        assert_eq!(record["fileCount"], 1);
        assert_eq!(record["comment"], "left arm");

        let list: Value = app.server.get("/api/records").as_user().await.json();
        assert_eq!(list.as_array().map(Vec::len), Some(1));

        let commented = app
            .server
            .post(&format!("/api/records/{}/comments", id))
            .as_user()
            .json(&json!({"comment": "follow up in May"}))
            .await;
        commented.assert_status_ok();
        assert_eq!(commented.json::<Value>()["comments"][0], "follow up in May");

        app.server
            .delete(&format!("/api/records/{}", id))
            .as_user()
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.server
            .get(&format!("/api/records/{}", id))
            .as_user()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_name_is_400() {
        let app = TestApp::new();

        app.server
            .post("/api/records")
            .as_user()
            .json(&json!({"name": "  "}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_foreign_user_id_is_401() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/records")
            .as_user()
            .json(&json!({"userId": OTHER_USER, "name": "X-ray"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_operation_outcome(&response, "login");
    }

    #[tokio::test]
    async fn test_matching_user_id_is_accepted() {
        let app = TestApp::new();

        app.server
            .post("/api/records")
            .as_user()
            .json(&json!({"userId": USER, "name": "X-ray"}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_empty_comment_is_400() {
        let app = TestApp::new();
        let (id, _) = upload_note(&app, "a.txt", "hello").await;

        app.server
            .post(&format!("/api/records/{}/comments", id))
            .as_user()
            .json(&json!({"comment": ""}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_records_count_param() {
        let app = TestApp::new();
        for name in ["a", "b", "c"] {
            app.server
                .post("/api/records")
                .as_user()
                .json(&json!({"name": name}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let list: Value = app
            .server
            .get("/api/records")
            .add_query_param("_count", "2")
            .as_user()
            .await
            .json();
        assert_eq!(list.as_array().map(Vec::len), Some(2));
    }
}

// =============================================================================
// Upload and files
// =============================================================================

mod upload {
    use super::*;

    #[tokio::test]
    async fn test_upload_creates_record_and_serves_files() {
        let app = TestApp::new();

        let form = MultipartForm::new()
            .add_text("recordName", "Bloods")
            .add_text("comment", "fasting")
            .add_part("files", text_file("one.txt", "first"))
            .add_part("files", text_file("two.txt", "second"));
        let response = app.server.post("/api/upload").as_user().multipart(form).await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let urls = body["fileUrls"].as_array().expect("fileUrls").clone();
        assert_eq!(urls.len(), 2);

        let record: Value = app
            .server
            .get(&format!("/api/records/{}", body["recordId"].as_str().unwrap()))
            .as_user()
            .await
            .json();
        assert_eq!(record["name"], "Bloods");
        assert_eq!(record["comment"], "fasting");
        assert_eq!(record["urls"], Value::Array(urls.clone()));

        let file = app
            .server
            .get(&url_path(&app, urls[1].as_str().unwrap()))
            .as_user()
            .await;
        file.assert_status_ok();
        assert_eq!(file.text(), "second");
        assert!(
            file.header("content-type")
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
    }

    #[tokio::test]
    async fn test_deleting_record_removes_its_files() {
        let app = TestApp::new();

        let form = MultipartForm::new().add_part("files", text_file("scan.txt", "x"));
        let body: Value = app
            .server
            .post("/api/upload")
            .as_user()
            .multipart(form)
            .await
            .json();
        let file_path = url_path(&app, body["fileUrls"][0].as_str().unwrap());
        app.server.get(&file_path).as_user().await.assert_status_ok();

        app.server
            .delete(&format!("/api/records/{}", body["recordId"].as_str().unwrap()))
            .as_user()
            .await
            .assert_status(StatusCode::NO_CONTENT);

        app.server
            .get(&file_path)
            .as_user()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_record_name_defaults_to_first_file() {
        let app = TestApp::new();

        let form = MultipartForm::new().add_part("files", text_file("scan.txt", "x"));
        let body: Value = app
            .server
            .post("/api/upload")
            .as_user()
            .multipart(form)
            .await
            .json();

        let record: Value = app
            .server
            .get(&format!("/api/records/{}", body["recordId"].as_str().unwrap()))
            .as_user()
            .await
            .json();
        assert_eq!(record["name"], "scan.txt");
    }

    #[tokio::test]
    async fn test_upload_without_files_is_400() {
        let app = TestApp::new();

        let form = MultipartForm::new().add_text("recordName", "Nothing");
        app.server
            .post("/api/upload")
            .as_user()
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_files_are_private() {
        let app = TestApp::new();
        let (_, urls) = upload_note(&app, "private.txt", "secret").await;

        app.server
            .get(&url_path(&app, &urls[0]))
            .as_other_user()
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .get(&url_path(&app, &urls[0]))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

// =============================================================================
// Record analysis
// =============================================================================

mod analysis {
    use super::*;

    #[tokio::test]
    async fn test_analyze_stores_result() {
        let app = TestApp::with_ai(ScriptedAi::replying(
            "<SUMMARY>Iron is low.</SUMMARY>\nFerritin 12 ng/mL, below range.",
        ));
        let (id, _) = upload_note(&app, "labs.txt", "Ferritin 12").await;

        let response = app
            .server
            .post(&format!("/api/records/{}/analyze", id))
            .as_user()
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["summary"], "Iron is low.");

        let prompt = app.ai.last_prompt_text();
        assert!(prompt.contains("Ferritin 12"), "prompt: {}", prompt);
        assert!(prompt.contains("Blood panel"));

        let record: Value = app
            .server
            .get(&format!("/api/records/{}", id))
            .as_user()
            .await
            .json();
        assert_eq!(record["analysis"], body["analysis"]);
        assert!(record["analyzedAt"].is_string());
    }

    #[tokio::test]
    async fn test_image_sent_as_image_part() {
        let app = TestApp::with_ai(ScriptedAi::replying("Looks fine."));
        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(vec![0x89, b'P', b'N', b'G'])
                .file_name("scan.png")
                .mime_type("image/png"),
        );
        let body: Value = app
            .server
            .post("/api/upload")
            .as_user()
            .multipart(form)
            .await
            .json();

        app.server
            .post(&format!("/api/records/{}/analyze", body["recordId"].as_str().unwrap()))
            .as_user()
            .await
            .assert_status_ok();

        let chats = app.ai.chats();
        let has_image = chats[0].iter().flat_map(|m| m.parts.iter()).any(|p| {
            matches!(p, ContentPart::ImageUrl(url) if url.starts_with("data:image/png;base64,"))
        });
        assert!(has_image);
    }

    #[tokio::test]
    async fn test_model_failure_degrades() {
        let app = TestApp::new();
        let (id, _) = upload_note(&app, "labs.txt", "Ferritin 12").await;

        let response = app
            .server
            .post(&format!("/api/records/{}/analyze", id))
            .as_user()
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["analysis"], ANALYSIS_UNAVAILABLE);

        let record: Value = app
            .server
            .get(&format!("/api/records/{}", id))
            .as_user()
            .await
            .json();
        assert!(record.get("analyzedAt").is_none() || record["analyzedAt"].is_null());
    }

    #[tokio::test]
    async fn test_analyze_missing_record_is_404() {
        let app = TestApp::with_ai(ScriptedAi::replying("unused"));

        app.server
            .post("/api/records/ghost/analyze")
            .as_user()
            .await
            .assert_status(StatusCode::NOT_FOUND);
        assert!(app.ai.chats().is_empty());
    }
}

// =============================================================================
// Questions and conversations
// =============================================================================

mod question {
    use super::*;

    #[tokio::test]
    async fn test_answer_is_extracted_and_stored() {
        let app = TestApp::with_ai(ScriptedAi::replying(
            "Thinking...\n<ANSWER>Drink more water.</ANSWER>",
        ));

        let response = app
            .server
            .post("/api/question")
            .as_user()
            .json(&json!({"question": "How do I feel better?"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["answer"], "Drink more water.");
        assert!(body.get("audioUrl").is_none());
        let id = body["id"].as_str().expect("turn id").to_string();

        let turns: Value = app.server.get("/api/conversations").as_user().await.json();
        assert_eq!(turns[0]["id"], id);
        assert_eq!(turns[0]["question"], "How do I feel better?");

        app.server
            .get(&format!("/api/conversations/{}", id))
            .as_user()
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_follow_up_includes_previous_turn() {
        let app = TestApp::with_ai(ScriptedAi::replying("<ANSWER>Rest.</ANSWER>"));
        let first: Value = app
            .server
            .post("/api/question")
            .as_user()
            .json(&json!({"question": "I have a headache"}))
            .await
            .json();

        app.ai.set_reply("<ANSWER>Two days.</ANSWER>");
        let second: Value = app
            .server
            .post("/api/question")
            .as_user()
            .json(&json!({"question": "For how long?", "previousResponseId": first["id"]}))
            .await
            .json();
        assert_eq!(second["answer"], "Two days.");

        let prompt = app.ai.last_prompt_text();
        assert!(prompt.contains("I have a headache"));
        assert!(prompt.contains("Rest."));

        let turn: Value = app
            .server
            .get(&format!("/api/conversations/{}", second["id"].as_str().unwrap()))
            .as_user()
            .await
            .json();
        assert_eq!(turn["previousResponseId"], first["id"]);
    }

    #[tokio::test]
    async fn test_context_includes_profile() {
        let app = TestApp::with_ai(ScriptedAi::replying("<ANSWER>ok</ANSWER>"));
        app.server
            .put("/api/profile")
            .as_user()
            .json(&json!({"bloodType": "O-negative"}))
            .await
            .assert_status_ok();

        app.server
            .post("/api/question")
            .as_user()
            .json(&json!({"question": "Can I donate?"}))
            .await
            .assert_status_ok();

        assert!(app.ai.last_prompt_text().contains("bloodType: O-negative"));
    }

    #[tokio::test]
    async fn test_audio_generated_with_voice() {
        let app = TestApp::with_ai(ScriptedAi::replying("<ANSWER>Sleep well.</ANSWER>"));

        let body: Value = app
            .server
            .post("/api/question")
            .as_user()
            .json(&json!({"question": "Tips?", "generateAudio": true, "voicePreference": "nova"}))
            .await
            .json();

        let audio_url = body["audioUrl"].as_str().expect("audioUrl");
        assert!(audio_url.ends_with(".mp3"));
        assert_eq!(
            app.ai.spoken(),
            vec![("Sleep well.".to_string(), "nova".to_string())]
        );

        let audio = app.server.get(&url_path(&app, audio_url)).as_user().await;
        audio.assert_status_ok();
        assert_eq!(audio.header("content-type"), "audio/mpeg");
    }

    #[tokio::test]
    async fn test_speech_failure_keeps_answer() {
        let ai = ScriptedAi::replying("<ANSWER>Fine.</ANSWER>");
        ai.fail_speech();
        let app = TestApp::with_ai(ai);

        let body: Value = app
            .server
            .post("/api/question")
            .as_user()
            .json(&json!({"question": "Tips?", "generateAudio": true}))
            .await
            .json();

        assert_eq!(body["success"], true);
        assert!(body.get("audioUrl").is_none());
    }

    #[tokio::test]
    async fn test_model_failure_degrades_and_stores_nothing() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/question")
            .as_user()
            .json(&json!({"question": "Anything?"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["answer"], ANSWER_UNAVAILABLE);

        let turns: Value = app.server.get("/api/conversations").as_user().await.json();
        assert_eq!(turns, json!([]));
    }

    #[tokio::test]
    async fn test_empty_question_is_400() {
        let app = TestApp::new();

        app.server
            .post("/api/question")
            .as_user()
            .json(&json!({"question": " "}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_conversation_count_param() {
        let app = TestApp::with_ai(ScriptedAi::replying("<ANSWER>ok</ANSWER>"));
        for q in ["one", "two", "three"] {
            app.server
                .post("/api/question")
                .as_user()
                .json(&json!({"question": q}))
                .await
                .assert_status_ok();
        }

        let turns: Value = app
            .server
            .get("/api/conversations")
            .add_query_param("_count", "2")
            .as_user()
            .await
            .json();
        assert_eq!(turns.as_array().map(Vec::len), Some(2));
    }
}

// =============================================================================
// Holistic analysis
// =============================================================================

mod holistic {
    use super::*;

    #[tokio::test]
    async fn test_generate_then_fetch() {
        let app = TestApp::with_ai(ScriptedAi::replying("Overall stable."));
        app.server
            .get("/api/analysis/holistic")
            .as_user()
            .await
            .assert_status(StatusCode::NOT_FOUND);
        upload_note(&app, "a.txt", "x").await;

        let response = app.server.post("/api/analysis/holistic").as_user().await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["analysis"], "Overall stable.");

        let stored: Value = app.server.get("/api/analysis/holistic").as_user().await.json();
        assert_eq!(stored["analysis"], "Overall stable.");
        assert_eq!(stored["recordCount"], 1);
        assert!(stored["generatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_failure_degrades_and_stores_nothing() {
        let app = TestApp::new();

        let body: Value = app
            .server
            .post("/api/analysis/holistic")
            .as_user()
            .json(&json!({"userId": USER}))
            .await
            .json();

        assert_eq!(body["success"], false);
        assert_eq!(body["analysis"], HOLISTIC_UNAVAILABLE);
        app.server
            .get("/api/analysis/holistic")
            .as_user()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_foreign_user_id_is_401() {
        let app = TestApp::with_ai(ScriptedAi::replying("unused"));

        app.server
            .post("/api/analysis/holistic")
            .as_user()
            .json(&json!({"userId": OTHER_USER}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        assert!(app.ai.chats().is_empty());
    }
}

// =============================================================================
// Transcription and profile
// =============================================================================

mod transcribe {
    use super::*;

    #[tokio::test]
    async fn test_transcribes_data_url() {
        let ai = ScriptedAi::failing();
        ai.set_transcript(" my chest hurts ");
        let app = TestApp::with_ai(ai);

        let response = app
            .server
            .post("/api/transcribe")
            .as_user()
            .json(&json!({"audio": "data:audio/webm;base64,GkXfow=="}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"success": true, "text": "my chest hurts"}));
    }

    #[tokio::test]
    async fn test_bad_data_url_is_400() {
        let app = TestApp::new();

        app.server
            .post("/api/transcribe")
            .as_user()
            .json(&json!({"audio": "not a data url"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_failure_is_500() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/api/transcribe")
            .as_user()
            .json(&json!({"audio": "data:audio/webm;base64,GkXfow=="}))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_operation_outcome(&response, "transient");
    }
}

mod profile {
    use super::*;

    #[tokio::test]
    async fn test_profile_defaults_and_replaces() {
        let app = TestApp::new();

        app.server
            .get("/api/profile")
            .as_user()
            .await
            .assert_json(&json!({}));

        app.server
            .put("/api/profile")
            .as_user()
            .json(&json!({"age": 42, "allergies": ["penicillin"]}))
            .await
            .assert_status_ok();
        app.server
            .put("/api/profile")
            .as_user()
            .json(&json!({"age": 43}))
            .await
            .assert_status_ok();

        app.server
            .get("/api/profile")
            .as_user()
            .await
            .assert_json(&json!({"age": 43}));
        app.server
            .get("/api/profile")
            .as_other_user()
            .await
            .assert_json(&json!({}));
    }

    #[tokio::test]
    async fn test_non_object_is_400() {
        let app = TestApp::new();

        app.server
            .put("/api/profile")
            .as_user()
            .json(&json!([1, 2]))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
