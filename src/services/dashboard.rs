use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{Activity, ActivityType, Contact, Deal, DealStage, Task, TaskStatus};
use crate::services::filters::DateWindow;

const RECENT_ACTIVITIES: usize = 5;
const UPCOMING_TASKS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_contacts: usize,
    pub total_deals: usize,
    pub total_deal_value: f64,
    /// Percentage of deals closed-won, one decimal place.
    pub conversion_rate: f64,
    pub overdue_tasks: usize,
    pub todays_tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub stage: DealStage,
    pub count: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub metrics: DashboardMetrics,
    pub deals_by_stage: Vec<StageSummary>,
    pub recent_activities: Vec<Activity>,
    pub upcoming_tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub stages: Vec<StageSummary>,
    pub total_value: f64,
    pub won_deals: usize,
    /// Whole percent of deals closed-won.
    pub win_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub today: usize,
    pub tomorrow: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub total: usize,
    pub this_week: usize,
    pub by_type: BTreeMap<ActivityType, usize>,
}

fn open(task: &Task) -> bool {
    task.status != TaskStatus::Completed
}

fn won_deals(deals: &[Deal]) -> usize {
    deals.iter().filter(|d| d.stage == DealStage::ClosedWon).count()
}

/// Every stage in pipeline order, including empty ones.
pub fn deals_by_stage(deals: &[Deal]) -> Vec<StageSummary> {
    DealStage::ALL
        .into_iter()
        .map(|stage| {
            let in_stage = deals.iter().filter(|d| d.stage == stage);
            StageSummary {
                stage,
                count: in_stage.clone().count(),
                value: in_stage.map(|d| d.value).sum(),
            }
        })
        .collect()
}

pub fn pipeline_summary(deals: &[Deal]) -> PipelineSummary {
    let won = won_deals(deals);
    let win_rate = if deals.is_empty() {
        0
    } else {
        (won as f64 / deals.len() as f64 * 100.0).round() as u32
    };
    PipelineSummary {
        stages: deals_by_stage(deals),
        total_value: deals.iter().map(|d| d.value).sum(),
        won_deals: won,
        win_rate,
    }
}

pub fn build_dashboard(
    contacts: &[Contact],
    deals: &[Deal],
    tasks: &[Task],
    activities: &[Activity],
    today: NaiveDate,
) -> Dashboard {
    let conversion_rate = if deals.is_empty() {
        0.0
    } else {
        (won_deals(deals) as f64 / deals.len() as f64 * 1000.0).round() / 10.0
    };

    let metrics = DashboardMetrics {
        total_contacts: contacts.len(),
        total_deals: deals.len(),
        total_deal_value: deals.iter().map(|d| d.value).sum(),
        conversion_rate,
        overdue_tasks: tasks.iter().filter(|t| open(t) && t.due_date < today).count(),
        todays_tasks: tasks.iter().filter(|t| open(t) && t.due_date == today).count(),
    };

    let mut recent_activities = activities.to_vec();
    recent_activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent_activities.truncate(RECENT_ACTIVITIES);

    let mut upcoming_tasks: Vec<Task> = tasks.iter().filter(|t| open(t)).cloned().collect();
    upcoming_tasks.sort_by_key(|t| t.due_date);
    upcoming_tasks.truncate(UPCOMING_TASKS);

    Dashboard {
        metrics,
        deals_by_stage: deals_by_stage(deals),
        recent_activities,
        upcoming_tasks,
    }
}

pub fn task_stats(tasks: &[Task], today: NaiveDate) -> TaskStats {
    let tomorrow = today + Duration::days(1);
    TaskStats {
        total: tasks.len(),
        completed: tasks.iter().filter(|t| !open(t)).count(),
        overdue: tasks.iter().filter(|t| open(t) && t.due_date < today).count(),
        today: tasks.iter().filter(|t| open(t) && t.due_date == today).count(),
        tomorrow: tasks.iter().filter(|t| open(t) && t.due_date == tomorrow).count(),
    }
}

pub fn activity_stats(activities: &[Activity], now: DateTime<Utc>) -> ActivityStats {
    let mut by_type = BTreeMap::new();
    for activity in activities {
        *by_type.entry(activity.kind).or_insert(0) += 1;
    }
    ActivityStats {
        total: activities.len(),
        this_week: activities
            .iter()
            .filter(|a| DateWindow::Week.contains(a.timestamp, now))
            .count(),
        by_type,
    }
}
