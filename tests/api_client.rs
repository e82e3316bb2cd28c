mod common;

use std::time::{Duration, Instant};

use common::{client, client_for, unreachable_base_url, JSON};
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use transinia::api::{Envelope, Generated, Priority, Updated, Uploaded};

#[test]
fn upload_success_reports_file_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/transcripts/upload")
            .header_exists("content-type")
            .body_contains(r#"name="file"; filename="notes.txt""#)
            .body_contains("text/plain")
            .body_contains("Alice: hello\nBob: hi");
        then.status(200)
            .header("content-type", JSON)
            .body(r#"{"success": true, "message": "stored", "fileId": "abc123"}"#);
    });

    let outcome = client(&server).upload_transcript_bytes("notes.txt", b"Alice: hello\nBob: hi".to_vec());

    mock.assert();
    assert_eq!(
        outcome,
        Envelope::Success(Uploaded {
            message: "File uploaded successfully".to_string(),
            file_id: Some("abc123".to_string()),
        })
    );
}

#[test]
fn upload_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("standup.md");
    std::fs::write(&path, "# Standup\n").unwrap();

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/transcripts/upload")
            .body_contains(r#"filename="standup.md""#)
            .body_contains("# Standup\n");
        then.status(200).body(r#"{"fileId": "transcripts/1_standup.md"}"#);
    });

    let outcome = client(&server).upload_transcript(&path);

    mock.assert();
    assert_eq!(
        outcome.payload().and_then(|u| u.file_id.as_deref()),
        Some("transcripts/1_standup.md")
    );
}

#[test]
fn upload_surfaces_server_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/transcripts/upload");
        then.status(400).body(r#"{"message": "bad type"}"#);
    });
    let outcome = client(&server).upload_transcript_bytes("audio.mp3", vec![1, 2, 3]);
    assert_eq!(outcome, Envelope::failure("bad type"));
}

#[test]
fn upload_falls_back_without_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/transcripts/upload");
        then.status(400).body(
            r#"{"detail": "Invalid file format. Only .txt, .md, and .docx files are supported."}"#,
        );
    });
    let outcome = client(&server).upload_transcript_bytes("audio.mp3", vec![1]);
    assert_eq!(outcome.failure_message(), Some("Failed to upload transcript"));
}

#[test]
fn upload_missing_file_is_a_failure_envelope() {
    let client = client_for(&unreachable_base_url(), Duration::from_secs(1));
    let outcome = client.upload_transcript(std::path::Path::new("/definitely/not/here.txt"));
    let message = outcome.failure_message().unwrap();
    assert!(message.contains("/definitely/not/here.txt"), "{message}");
}

#[test]
fn transcripts_are_listed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/transcripts/list")
            .header("accept", JSON);
        then.status(200).header("content-type", JSON).body(
            r#"{"transcripts": [
                {"id": "transcripts/a.txt", "name": "a.txt", "date": "March 01, 2025",
                 "processed": true, "meetingDataId": "m-1", "size": 120, "source": "s3"},
                {"id": "transcripts/b.txt", "name": "b.txt", "date": "March 02, 2025",
                 "processed": false, "meetingDataId": null, "size": null, "source": "s3"}
            ]}"#,
        );
    });

    let transcripts = client(&server).get_transcripts();

    mock.assert();
    assert_eq!(transcripts.len(), 2);
    assert_eq!(transcripts[0].meeting_data_id.as_deref(), Some("m-1"));
    assert!(!transcripts[1].processed);
    assert!(transcripts[1].size.is_none());
}

#[test]
fn transcripts_skip_unreadable_entries() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/transcripts/list");
        then.status(200).body(
            r#"{"transcripts": [
                {"id": "transcripts/a.txt", "name": "a.txt", "date": "March 01, 2025"},
                {"id": "transcripts/broken.txt", "size": "big"}
            ]}"#,
        );
    });
    let transcripts = client(&server).get_transcripts();
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0].name, "a.txt");
}

#[test]
fn transcripts_fail_soft_on_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/transcripts/list");
        then.status(500).body(r#"{"detail": "Failed to list transcripts"}"#);
    });
    assert!(client(&server).get_transcripts().is_empty());
}

#[test]
fn transcripts_fail_soft_on_malformed_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/transcripts/list");
        then.status(200).body("<html>gateway</html>");
    });
    assert!(client(&server).get_transcripts().is_empty());
}

#[test]
fn transcripts_fail_soft_when_unreachable() {
    let client = client_for(&unreachable_base_url(), Duration::from_secs(2));
    assert!(client.get_transcripts().is_empty());
}

#[test]
fn missing_list_key_is_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/transcripts/list");
        then.status(200).body(r#"{"count": 0}"#);
    });
    assert!(client(&server).get_transcripts().is_empty());
}

#[test]
fn meetings_are_listed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/meeting-data/list");
        then.status(200).header("content-type", JSON).body(
            r#"{"meetingData": [{
                "id": "m-1", "title": "Kickoff", "date": "March 01, 2025",
                "summary": "Started.", "actionItems": [
                    {"id": "a", "text": "Write plan", "owner": "Kim", "priority": "Medium", "completed": false}
                ],
                "keyPoints": ["Scope agreed"], "participants": ["Kim", "Lou"],
                "duration": "30 minutes", "source": "transcripts/kickoff.txt"
            }]}"#,
        );
    });

    let meetings = client(&server).get_meetings();

    mock.assert();
    assert_eq!(meetings.len(), 1);
    assert_eq!(meetings[0].action_items[0].assignee.as_deref(), Some("Kim"));
    assert_eq!(meetings[0].action_items[0].priority, Some(Priority::Medium));
}

#[test]
fn meetings_keep_summary_records_next_to_full_ones() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/meeting-data/list");
        then.status(200).body(
            r#"{"meetingData": [
                {"id": "m-1", "title": "Kickoff", "date": "March 01, 2025", "summary": "Started.",
                 "actionItems": [{"id": "a", "text": null, "owner": "Kim"}],
                 "keyPoints": ["Scope agreed"], "participants": ["Kim"], "duration": "30 minutes"},
                {"id": "m-2", "title": "Meeting Summary", "date": "2025-03-02",
                 "participants": ["Lou"], "actionItems": 4, "keyPoints": 2, "duration": "Unknown"},
                {"title": "no id"}
            ]}"#,
        );
    });

    let meetings = client(&server).get_meetings();

    let ids: Vec<_> = meetings.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m-1", "m-2"]);
    assert_eq!(meetings[0].action_items[0].text, "");
    assert_eq!(meetings[1].summary, "");
    assert!(meetings[1].action_items.is_empty());
    assert!(meetings[1].key_points.is_empty());
}

#[test]
fn meetings_fail_soft_on_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/meeting-data/list");
        then.status(404).body(r#"{"detail": "Not Found"}"#);
    });
    assert!(client(&server).get_meetings().is_empty());
}

#[test]
fn meetings_fail_soft_on_malformed_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/meeting-data/list");
        then.status(200).body(r#"{"meetingData": "#);
    });
    assert!(client(&server).get_meetings().is_empty());
}

#[test]
fn high_priority_tasks_are_listed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/tasks/high-priority");
        then.status(200).body(
            r#"{"tasks": [{"id": "t1", "text": "Fix billing", "owner": "Ray", "due": "2025-03-10",
                          "priority": "High", "completed": false, "meetingId": "m-7"}]}"#,
        );
    });

    let tasks = client(&server).get_high_priority_tasks();

    mock.assert();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].priority, Some(Priority::High));
    assert_eq!(tasks[0].due.as_deref(), Some("2025-03-10"));
    assert_eq!(tasks[0].meeting_id.as_deref(), Some("m-7"));
}

#[test]
fn high_priority_tasks_fail_soft_on_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/tasks/high-priority");
        then.status(500).body(r#"{"detail": "Failed to fetch high priority tasks"}"#);
    });
    assert!(client(&server).get_high_priority_tasks().is_empty());
}

#[test]
fn high_priority_tasks_fail_soft_on_malformed_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/tasks/high-priority");
        then.status(200).body("tasks: none");
    });
    assert!(client(&server).get_high_priority_tasks().is_empty());
}

#[test]
fn high_priority_tasks_fail_soft_when_unreachable() {
    let client = client_for(&unreachable_base_url(), Duration::from_secs(2));
    assert!(client.get_high_priority_tasks().is_empty());
    assert!(client.get_meetings().is_empty());
}

#[test]
fn generate_passes_already_processed_through() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/meeting-data/generate")
            .header("content-type", JSON)
            .body(r#"{"transcriptId":"transcripts/x.txt"}"#);
        then.status(200).body(
            r#"{"success": true, "message": "Meeting data already exists for this transcript",
                "meetingDataId": "m-3", "alreadyProcessed": true}"#,
        );
    });

    let outcome = client(&server).generate_insights("transcripts/x.txt");

    mock.assert();
    assert_eq!(
        outcome,
        Envelope::Success(Generated {
            message: "Meeting data already exists for this transcript".to_string(),
            meeting_data_id: Some("m-3".to_string()),
            already_processed: true,
        })
    );
}

#[test]
fn generate_fresh_defaults_already_processed_false() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/meeting-data/generate");
        then.status(200).body(r#"{"success": true, "meetingDataId": "m-4"}"#);
    });
    let generated = client(&server).generate_insights("t").into_result().unwrap();
    assert!(!generated.already_processed);
    assert_eq!(generated.message, "Meeting data generated successfully");
    assert_eq!(generated.meeting_data_id.as_deref(), Some("m-4"));
}

#[test]
fn generate_not_found_uses_fallback() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/meeting-data/generate");
        then.status(404).body(r#"{"detail": "Transcript not found: t"}"#);
    });
    let outcome = client(&server).generate_insights("t");
    assert_eq!(outcome, Envelope::failure("Failed to generate meeting data"));
}

#[test]
fn generate_declared_failure_uses_server_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/meeting-data/generate");
        then.status(200).body(r#"{"success": false, "message": "Model quota exceeded"}"#);
    });
    let outcome = client(&server).generate_insights("t");
    assert_eq!(outcome.failure_message(), Some("Model quota exceeded"));
}

#[test]
fn insight_is_fetched_by_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/meeting-data/m-9")
            .header("accept", JSON);
        then.status(200).body(
            r#"{"id": "m-9", "title": "Retro", "date": "March 05, 2025", "summary": "Went well.",
                "executiveSummary": "Short.", "actionItems": [], "keyPoints": ["Less meetings"],
                "participants": ["Jo"], "duration": "20 minutes", "source": "transcripts/retro.txt",
                "createdBy": "pipeline-v2"}"#,
        );
    });

    let insight = client(&server).get_insight("m-9").into_result().unwrap();

    mock.assert();
    assert_eq!(insight.title, "Retro");
    assert_eq!(insight.executive_summary.as_deref(), Some("Short."));
    assert_eq!(insight.key_points, vec!["Less meetings".to_string()]);
}

#[test]
fn insight_with_null_action_text_is_kept() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/meeting-data/m-5");
        then.status(200).body(
            r#"{"id": "m-5", "title": "Ops", "date": "March 06, 2025", "summary": "Incidents.",
                "actionItems": [{"id": "task-1", "text": null, "owner": "Ira", "priority": "High"}]}"#,
        );
    });

    let insight = client(&server).get_insight("m-5").into_result().unwrap();

    assert_eq!(insight.action_items.len(), 1);
    assert_eq!(insight.action_items[0].text, "");
    assert_eq!(insight.action_items[0].assignee.as_deref(), Some("Ira"));
}

#[test]
fn insight_not_found_is_failure_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/meeting-data/nope");
        then.status(404).body(r#"{"detail": "Meeting data not found: nope"}"#);
    });
    let outcome = client(&server).get_insight("nope");
    assert_eq!(outcome, Envelope::failure("Failed to fetch meeting data"));
}

#[test]
fn insight_with_missing_required_field_is_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/meeting-data/m-1");
        then.status(200).body(r#"{"id": "m-1", "summary": "no title"}"#);
    });
    let outcome = client(&server).get_insight("m-1");
    assert_eq!(outcome.failure_message(), Some("Failed to fetch meeting data"));
}

#[test]
fn dot_ids_are_rejected_before_sending() {
    let server = MockServer::start();
    let any = server.mock(|_, then| {
        then.status(200).body("{}");
    });

    let api = client(&server);
    assert!(!api.get_insight("..").is_success());
    assert!(!api.update_action_item(".", "a", true).is_success());
    assert!(!api.get_transcript("").is_success());

    any.assert_hits(0);
}

#[test]
fn update_action_item_sends_exact_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/meeting-data/1/actions/2")
            .body(r#"{"completed":true}"#);
        then.status(200).body(r#"{"ok": true}"#);
    });

    let outcome = client(&server).update_action_item("1", "2", true);

    mock.assert();
    assert_eq!(
        outcome,
        Envelope::Success(Updated {
            message: "Action item updated successfully".to_string(),
        })
    );
}

#[test]
fn update_action_item_ignores_empty_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/meeting-data/m/actions/a")
            .body(r#"{"completed":false}"#);
        then.status(200);
    });
    let outcome = client(&server).update_action_item("m", "a", false);
    mock.assert();
    assert!(outcome.is_success());
}

#[test]
fn update_action_item_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PATCH).path("/api/meeting-data/m/actions/a");
        then.status(405).body(r#"{"detail": "Method Not Allowed"}"#);
    });
    let outcome = client(&server).update_action_item("m", "a", true);
    assert_eq!(outcome, Envelope::failure("Failed to update action item"));
}

#[test]
fn update_action_item_keeps_server_message_verbatim() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PATCH).path("/api/meeting-data/m/actions/a");
        then.status(409).body(r#"{"message": " Item is locked "}"#);
    });
    let outcome = client(&server).update_action_item("m", "a", true);
    assert_eq!(outcome.failure_message(), Some(" Item is locked "));
}

#[test]
fn transcript_content_id_is_one_path_segment() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/transcripts/transcripts%2Fa_notes.txt");
        then.status(200)
            .body(r#"{"success": true, "filename": "a_notes.txt", "content": "Hello there"}"#);
    });

    let content = client(&server)
        .get_transcript("transcripts/a_notes.txt")
        .into_result()
        .unwrap();

    mock.assert();
    assert_eq!(content.filename, "a_notes.txt");
    assert_eq!(content.content, "Hello there");
}

#[test]
fn health_reports_status() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200)
            .body(r#"{"status": "ok", "timestamp": "2025-03-03T10:15:30.5"}"#);
    });
    let health = client(&server).health().into_result().unwrap();
    mock.assert();
    assert_eq!(health.status, "ok");
    assert!(health.timestamp.is_some());
}

#[test]
fn health_unreachable_is_failure() {
    let client = client_for(&unreachable_base_url(), Duration::from_secs(2));
    assert_eq!(client.health(), Envelope::failure("Backend health check failed"));
}

#[test]
fn slow_backend_hits_configured_timeout() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/meeting-data/m-1");
        then.status(200)
            .body(r#"{"id": "m-1", "title": "Late", "date": "d", "summary": "s"}"#)
            .delay(Duration::from_secs(3));
    });
    let client = client_for(&server.base_url(), Duration::from_millis(300));

    let started = Instant::now();
    let outcome = client.get_insight("m-1");

    assert_eq!(outcome, Envelope::failure("Failed to fetch meeting data"));
    assert!(started.elapsed() < Duration::from_secs(3), "{:?}", started.elapsed());
}
