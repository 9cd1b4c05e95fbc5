//! Client-side incident filtering.
//!
//! The service only pages; narrowing by status, priority, text, or date
//! happens locally against whatever pages have been fetched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Incident, IncidentPriority, IncidentStatus};

/// Filter criteria applied to the local incident list.
///
/// All criteria are conjunctive; an unset criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub status: Option<IncidentStatus>,
    pub priority: Option<IncidentPriority>,
    /// Case-insensitive substring match against title and description.
    pub search: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl Filter {
    /// Whether no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `incident` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, incident: &Incident) -> bool {
        if let Some(status) = self.status
            && incident.status != status
        {
            return false;
        }
        if let Some(priority) = self.priority
            && incident.priority != priority
        {
            return false;
        }
        if let Some(search) = &self.search
            && !search.trim().is_empty()
        {
            let needle = search.trim().to_lowercase();
            let in_title = incident.title.to_lowercase().contains(&needle);
            let in_description = incident.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(from) = self.created_from
            && incident.created_at < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && incident.created_at > to
        {
            return false;
        }
        true
    }
}
