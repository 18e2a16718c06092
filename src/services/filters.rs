use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::models::{
    Activity, ActivityType, Contact, ContactStatus, Task, TaskPriority, TaskStatus,
};

fn matches_search(term: &str, haystacks: &[&str]) -> bool {
    haystacks.iter().any(|value| value.to_lowercase().contains(term))
}

fn normalized(search: &Option<String>) -> String {
    search.as_deref().unwrap_or("").trim().to_lowercase()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactQuery {
    pub search: Option<String>,
    pub status: Option<ContactStatus>,
}

pub fn filter_contacts(contacts: Vec<Contact>, query: &ContactQuery) -> Vec<Contact> {
    let term = normalized(&query.search);
    contacts
        .into_iter()
        .filter(|c| {
            matches_search(&term, &[c.name.as_str(), c.email.as_str(), c.company.as_str()])
        })
        .filter(|c| query.status.map_or(true, |status| c.status == status))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskQuery {
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Incomplete tasks first, each group by due date.
pub fn filter_tasks(tasks: Vec<Task>, query: &TaskQuery) -> Vec<Task> {
    let term = normalized(&query.search);
    let mut tasks: Vec<Task> = tasks
        .into_iter()
        .filter(|t| matches_search(&term, &[t.title.as_str(), t.description.as_str()]))
        .filter(|t| query.status.map_or(true, |status| t.status == status))
        .filter(|t| query.priority.map_or(true, |priority| t.priority == priority))
        .collect();
    tasks.sort_by_key(|t| (t.status == TaskStatus::Completed, t.due_date));
    tasks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateWindow {
    Today,
    Week,
    Month,
}

/// Sunday-to-Saturday week containing `day`.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day - Duration::days(day.weekday().num_days_from_sunday() as i64);
    (start, start + Duration::days(6))
}

impl DateWindow {
    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let day = timestamp.date_naive();
        let today = now.date_naive();
        match self {
            DateWindow::Today => day == today,
            DateWindow::Week => {
                let (start, end) = week_bounds(today);
                day >= start && day <= end
            }
            DateWindow::Month => day.year() == today.year() && day.month() == today.month(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ActivityType>,
    pub date: Option<DateWindow>,
}

pub fn contact_name(contacts: &[Contact], contact_id: u64) -> &str {
    contacts
        .iter()
        .find(|c| c.id == contact_id)
        .map(|c| c.name.as_str())
        .unwrap_or("Unknown Contact")
}

/// Newest first. The search also matches the related contact's name.
pub fn filter_activities(
    activities: Vec<Activity>,
    contacts: &[Contact],
    query: &ActivityQuery,
    now: DateTime<Utc>,
) -> Vec<Activity> {
    let term = normalized(&query.search);
    let mut activities: Vec<Activity> = activities
        .into_iter()
        .filter(|a| {
            let related = contact_name(contacts, a.contact_id);
            matches_search(&term, &[a.description.as_str(), related])
        })
        .filter(|a| query.kind.map_or(true, |kind| a.kind == kind))
        .filter(|a| query.date.map_or(true, |window| window.contains(a.timestamp, now)))
        .collect();
    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activities
}
