use serde::Serialize;
use std::collections::BTreeSet;

use crate::api::{ActionItem, Insight};

/// Counts shown by `transinia dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub meetings: usize,
    pub action_items: usize,
    pub completed_action_items: usize,
    pub open_action_items: usize,
    pub participants: usize,
    pub open_high_priority_tasks: usize,
}

impl DashboardStats {
    pub fn collect(meetings: &[Insight], high_priority: &[ActionItem]) -> Self {
        let action_items: usize = meetings.iter().map(|m| m.action_items.len()).sum();
        let completed_action_items = meetings
            .iter()
            .flat_map(|m| m.action_items.iter())
            .filter(|a| a.completed)
            .count();

        // Same person shows up with different casing across meetings.
        let participants: BTreeSet<String> = meetings
            .iter()
            .flat_map(|m| m.participants.iter())
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            meetings: meetings.len(),
            action_items,
            completed_action_items,
            open_action_items: action_items - completed_action_items,
            participants: participants.len(),
            open_high_priority_tasks: high_priority.iter().filter(|t| !t.completed).count(),
        }
    }
}
