use unicode_width::UnicodeWidthStr;

use crate::api::{ActionItem, Insight, Transcript, TranscriptContent};
use crate::dashboard::DashboardStats;

/// Truncate a string to fit within max_width (respecting unicode width).
pub(crate) fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Format the transcript list for `transinia list`.
pub fn print_transcript_list(transcripts: &[Transcript]) {
    if transcripts.is_empty() {
        println!("No transcripts found.");
        return;
    }

    println!("{} transcript{}:\n", transcripts.len(), plural(transcripts.len()));

    println!(
        "  {:<42} {:<20} {:<9} {:<10}",
        "NAME", "DATE", "SIZE", "STATUS"
    );
    println!("  {}", "-".repeat(82));

    for t in transcripts {
        let size = t.size.map(format_bytes).unwrap_or_else(|| "-".to_string());
        let status = if t.processed { "processed" } else { "pending" };
        println!(
            "  {:<42} {:<20} {:<9} {:<10}",
            truncate(&t.name, 40),
            truncate(&t.date, 20),
            size,
            status,
        );
        match t.meeting_data_id {
            Some(ref insight_id) => println!("  id: {}  insight: {}\n", t.id, insight_id),
            None => println!("  id: {}\n", t.id),
        }
    }
}

/// Raw transcript text for `transinia transcript`.
pub fn print_transcript_content(content: &TranscriptContent) {
    println!("Transcript: {}\n", content.filename);
    for line in content.content.lines() {
        println!("  {line}");
    }
}

/// Format the meeting list for `transinia meetings`.
pub fn print_meeting_list(meetings: &[Insight]) {
    if meetings.is_empty() {
        println!("No meetings found.");
        return;
    }

    println!("{} meeting{}:\n", meetings.len(), plural(meetings.len()));

    println!(
        "  {:<42} {:<20} {:<12} {:<8}",
        "TITLE", "DATE", "DURATION", "ACTIONS"
    );
    println!("  {}", "-".repeat(84));

    for m in meetings {
        let open = m.open_action_items().count();
        println!(
            "  {:<42} {:<20} {:<12} {:<8}",
            truncate(&m.title, 40),
            truncate(&m.date, 20),
            truncate(&m.duration, 12),
            format!("{open}/{}", m.action_items.len()),
        );
        println!("  id: {}\n", m.id);
    }
}

/// Format a single insight for `transinia show`.
pub fn print_insight_detail(insight: &Insight) {
    println!("Meeting: {}", insight.title);
    println!("  ID:           {}", insight.id);
    println!("  Date:         {}", insight.date);
    if !insight.duration.is_empty() {
        println!("  Duration:     {}", insight.duration);
    }
    if let Some(ref source) = insight.source {
        println!("  Source:       {source}");
    }
    if !insight.participants.is_empty() {
        println!(
            "  Participants: {} ({})",
            truncate(&insight.participants.join(", "), 60),
            insight.participants.len()
        );
    }

    if let Some(ref exec) = insight.executive_summary {
        println!("\nExecutive Summary:");
        for line in exec.lines() {
            println!("  {line}");
        }
    }

    if !insight.summary.is_empty() {
        println!("\nSummary:");
        for line in insight.summary.lines() {
            println!("  {line}");
        }
    }

    if !insight.key_points.is_empty() {
        println!("\nKey Points:");
        for point in &insight.key_points {
            println!("  - {}", truncate(point, 76));
        }
    }

    if !insight.action_items.is_empty() {
        println!("\nAction Items ({}):", insight.action_items.len());
        for item in &insight.action_items {
            println!("  {}", action_line(item));
        }
    }
}

/// Format high-priority tasks for `transinia tasks`.
pub fn print_tasks(tasks: &[ActionItem]) {
    if tasks.is_empty() {
        println!("No high priority tasks.");
        return;
    }

    println!("{} high priority task{}:\n", tasks.len(), plural(tasks.len()));
    for task in tasks {
        println!("  {}", action_line(task));
        let mut details = Vec::new();
        if let Some(ref due) = task.due {
            details.push(format!("due: {due}"));
        }
        if let Some(ref meeting) = task.meeting_id {
            details.push(format!("meeting: {meeting}"));
        }
        details.push(format!("id: {}", task.id));
        println!("      {}\n", details.join("  "));
    }
}

fn action_line(item: &ActionItem) -> String {
    let check = if item.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{check} {}", truncate(&item.text, 64));
    if let Some(ref who) = item.assignee {
        line.push_str(&format!(" ({who})"));
    }
    if let Some(priority) = item.priority {
        line.push_str(&format!(" [{}]", priority.as_str()));
    }
    line
}

/// Print dashboard counts.
pub fn print_dashboard(stats: &DashboardStats) {
    println!("Meeting Insights Dashboard:");
    println!("  Meetings:            {}", stats.meetings);
    println!("  Action Items:        {}", stats.action_items);
    println!("    completed:         {}", stats.completed_action_items);
    println!("    open:              {}", stats.open_action_items);
    println!("  Participants:        {}", stats.participants);
    println!("  High Priority (open): {}", stats.open_high_priority_tasks);
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
