use anyhow::Result;
use serde::Serialize;

use crate::api::{ActionItem, Insight};

#[derive(Serialize)]
struct MeetingExport<'a> {
    meeting: ExportedMeeting<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedMeeting<'a> {
    id: &'a str,
    title: &'a str,
    date: &'a str,
    summary: &'a str,
    key_points: &'a [String],
    action_items: &'a [ActionItem],
    participants: &'a [String],
}

/// Pretty-printed `{"meeting": {...}}` export of an insight.
pub fn render(insight: &Insight) -> Result<String> {
    let export = MeetingExport {
        meeting: ExportedMeeting {
            id: &insight.id,
            title: &insight.title,
            date: &insight.date,
            summary: &insight.summary,
            key_points: &insight.key_points,
            action_items: &insight.action_items,
            participants: &insight.participants,
        },
    };
    Ok(serde_json::to_string_pretty(&export)?)
}
