use crate::api::Insight;

/// Meeting minutes as Markdown.
pub fn render_minutes(insight: &Insight) -> String {
    let key_points = bullets(insight.key_points.iter().map(String::as_str));
    let action_items = insight
        .action_items
        .iter()
        .map(|item| {
            let check = if item.completed { 'x' } else { ' ' };
            match item.assignee.as_deref() {
                Some(who) => format!("- [{check}] {} (Assigned to: {who})", item.text),
                None => format!("- [{check}] {}", item.text),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let participants = bullets(insight.participants.iter().map(String::as_str));

    format!(
        "# {title}\n\n\
         Date: {date}\n\n\
         ## Summary\n\n{summary}\n\n\
         ## Key Points\n\n{key_points}\n\n\
         ## Action Items\n\n{action_items}\n\n\
         ## Participants\n\n{participants}\n\n",
        title = insight.title,
        date = insight.date,
        summary = insight.summary,
    )
}

fn bullets<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.map(|s| format!("- {s}")).collect::<Vec<_>>().join("\n")
}
