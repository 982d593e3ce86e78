//! Normalized search events.
//!
//! Each raw request document maps to a uniform `{id, date, type, options}`
//! shape so the merged feed reads the same regardless of originating kind.
//! Synthetic display options (locations, assignees) are prefixed ahead of the
//! request's own answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::request::{
    BearerRequest, CleanerRequest, RequestKind, RequestOption, VisitorRequest,
};

/// Uniform, human-readable entry in the merged event feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEvent {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub options: Vec<EventOption>,
}

/// Display option attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOption {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl From<&RequestOption> for EventOption {
    fn from(option: &RequestOption) -> Self {
        EventOption {
            id: option.option_id.clone(),
            label: option.label.clone(),
            value: option.value.clone(),
        }
    }
}

impl RequestEvent {
    /// A visit is dated by its request time.
    pub fn from_visitor(request: &VisitorRequest) -> Self {
        let mut options = vec![EventOption {
            id: format!("{}-visited", request.id),
            label: "Visited bed".to_string(),
            value: request.request_for.label.clone(),
        }];
        options.extend(request.options.iter().map(EventOption::from));
        RequestEvent {
            id: request.id,
            date: request.requested_on,
            kind: RequestKind::Visitor,
            options,
        }
    }

    /// A transport is dated by its completion; an uncompleted transport only
    /// reaches a feed when no completion filter applied, and then falls back
    /// to its request time.
    pub fn from_bearer(request: &BearerRequest) -> Self {
        let mut options = vec![
            EventOption {
                id: format!("{}-from", request.from.id),
                label: "Transport from".to_string(),
                value: request.from.label.clone(),
            },
            EventOption {
                id: format!("{}-to", request.to.id),
                label: "To".to_string(),
                value: request.to.label.clone(),
            },
        ];
        if let Some(assigned) = &request.assigned {
            options.push(EventOption {
                id: assigned.id.to_string(),
                label: "Bearer".to_string(),
                value: assigned.label.clone(),
            });
        }
        options.extend(request.options.iter().map(EventOption::from));
        RequestEvent {
            id: request.id,
            date: request.completed_on.unwrap_or(request.requested_on),
            kind: RequestKind::Bearer,
            options,
        }
    }

    /// Same dating rule as transports.
    pub fn from_cleaner(request: &CleanerRequest) -> Self {
        let mut options = vec![EventOption {
            id: request.from.id.to_string(),
            label: "Cleaned location".to_string(),
            value: request.from.label.clone(),
        }];
        if let Some(assigned) = &request.assigned {
            options.push(EventOption {
                id: assigned.id.to_string(),
                label: "Cleaner".to_string(),
                value: assigned.label.clone(),
            });
        }
        options.extend(request.options.iter().map(EventOption::from));
        RequestEvent {
            id: request.id,
            date: request.completed_on.unwrap_or(request.requested_on),
            kind: RequestKind::Cleaner,
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::{LocationRef, SectionRef};
    use crate::models::request::{Assignee, OptionKind};
    use chrono::TimeZone;

    fn bed_ref(label: &str) -> LocationRef {
        LocationRef::bed(
            Uuid::new_v4(),
            label,
            SectionRef {
                id: Uuid::new_v4(),
                floor_id: Uuid::new_v4(),
            },
        )
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap()
    }

    fn answered_option() -> RequestOption {
        RequestOption {
            option_id: "priority".into(),
            label: "Priority".into(),
            value: "Urgent".into(),
            value_id: None,
            kind: OptionKind::String,
            entity: None,
            multi: false,
        }
    }

    #[test]
    fn test_visitor_event_prefixes_visited_bed() {
        let request = VisitorRequest::new(bed_ref("204-A"), vec![answered_option()], at(3));
        let event = RequestEvent::from_visitor(&request);

        assert_eq!(event.kind, RequestKind::Visitor);
        assert_eq!(event.date, at(3));
        assert_eq!(event.options.len(), 2);
        assert_eq!(event.options[0].label, "Visited bed");
        assert_eq!(event.options[0].value, "204-A");
        assert_eq!(event.options[1].label, "Priority");
    }

    #[test]
    fn test_bearer_event_carries_endpoints_and_assignee() {
        let mut request =
            BearerRequest::new(bed_ref("204-A"), bed_ref("Radiology"), vec![answered_option()], at(1));
        request
            .assign(
                Assignee {
                    id: Uuid::new_v4(),
                    label: "Alex Tremblay".into(),
                },
                at(1),
            )
            .unwrap();
        request.complete(at(2)).unwrap();

        let event = RequestEvent::from_bearer(&request);
        assert_eq!(event.date, at(2));
        let labels: Vec<&str> = event.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Transport from", "To", "Bearer", "Priority"]);
    }

    #[test]
    fn test_cleaner_event_without_assignee() {
        let request = CleanerRequest::new(bed_ref("204-A"), vec![], at(2));
        let event = RequestEvent::from_cleaner(&request);
        // no completion filter applied, falls back to the request date
        assert_eq!(event.date, at(2));
        assert_eq!(event.options.len(), 1);
        assert_eq!(event.options[0].label, "Cleaned location");
    }

    #[test]
    fn test_event_wire_shape() {
        let request = VisitorRequest::new(bed_ref("204-A"), vec![], at(3));
        let event = RequestEvent::from_visitor(&request);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "visitor");
        assert!(json["options"].as_array().unwrap().len() == 1);
    }
}
