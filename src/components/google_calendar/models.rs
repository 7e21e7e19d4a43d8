use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Start or end of an event: a date-time for timed events, a date for all-day ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// A timed value
    pub fn at(date_time: &str) -> Self {
        Self {
            date_time: Some(date_time.to_string()),
            ..Default::default()
        }
    }

    /// An all-day value
    pub fn on(date: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    /// The date-time if present, else the date
    pub fn value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// Calendar event as returned by the events list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    /// Every other field of the wire object, kept for the raw view
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of the events list response
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events_page() {
        let body = r#"{
            "kind": "calendar#events",
            "nextPageToken": "abc",
            "items": [
                {
                    "id": "evt1",
                    "status": "confirmed",
                    "summary": "Boiler service",
                    "location": "12 Elm St",
                    "start": {"dateTime": "2024-05-01T09:00:00-04:00", "timeZone": "America/New_York"},
                    "end": {"dateTime": "2024-05-01T10:30:00-04:00"}
                },
                {
                    "id": "evt2",
                    "start": {"date": "2024-05-01"},
                    "end": {"date": "2024-05-02"}
                }
            ]
        }"#;

        let page: EventsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
        assert_eq!(page.items.len(), 2);

        let first = &page.items[0];
        assert_eq!(first.summary.as_deref(), Some("Boiler service"));
        assert_eq!(first.start.value(), Some("2024-05-01T09:00:00-04:00"));
        assert_eq!(first.extra.get("status"), Some(&Value::from("confirmed")));

        let second = &page.items[1];
        assert_eq!(second.summary, None);
        assert_eq!(second.description, None);
        assert_eq!(second.start.value(), Some("2024-05-01"));
    }

    #[test]
    fn test_missing_items_is_empty() {
        let page: EventsPage = serde_json::from_str(r#"{"kind": "calendar#events"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_raw_view_keeps_unknown_fields() {
        let body = r#"{"id":"e","htmlLink":"https://calendar.google.com/x","start":{"date":"2024-05-01"},"end":{"date":"2024-05-02"}}"#;
        let event: CalendarEvent = serde_json::from_str(body).unwrap();
        let raw = serde_json::to_value(&event).unwrap();
        assert_eq!(raw["htmlLink"], "https://calendar.google.com/x");
        assert_eq!(raw["start"]["date"], "2024-05-01");
    }
}
