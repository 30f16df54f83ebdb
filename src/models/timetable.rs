use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fixed daily exam windows.
pub const MORNING_SLOT: &str = "9:00 AM - 12:00 PM";
pub const AFTERNOON_SLOT: &str = "12:30 PM - 3:30 PM";

fn default_duration() -> u32 {
    180
}

fn default_day_gap() -> u32 {
    2
}

/// An exam to be scheduled. Credits drive placement priority; a missing
/// value counts as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: String,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub credits: Option<i32>,
}

impl Subject {
    pub fn new(name: impl Into<String>, credits: Option<i32>) -> Self {
        Self {
            name: name.into(),
            duration: default_duration(),
            credits,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    #[serde(rename = "Forenoon")]
    Morning,
    #[serde(rename = "Afternoon")]
    Afternoon,
}

impl Session {
    pub fn other(self) -> Self {
        match self {
            Session::Morning => Session::Afternoon,
            Session::Afternoon => Session::Morning,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Session::Morning => "Forenoon",
            Session::Afternoon => "Afternoon",
        }
    }

    pub fn time_slot(self) -> &'static str {
        match self {
            Session::Morning => MORNING_SLOT,
            Session::Afternoon => AFTERNOON_SLOT,
        }
    }
}

/// One placed exam within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAssignment {
    pub name: String,
    pub duration: u32,
    #[serde(default)]
    pub credits: Option<i32>,
    pub time: String,
    pub session: Session,
    pub code: String,
}

impl SessionAssignment {
    /// `sequence` is the subject's 1-based position in priority order and
    /// is baked into the generated code.
    pub fn new(subject: &Subject, session: Session, sequence: usize) -> Self {
        Self {
            name: subject.name.clone(),
            duration: subject.duration,
            credits: subject.credits,
            time: session.time_slot().to_string(),
            session,
            code: subject_code(&subject.name, sequence),
        }
    }
}

/// First 3 letters of the subject name, uppercased, plus a 3-digit
/// zero-padded sequence number.
pub fn subject_code(name: &str, sequence: usize) -> String {
    let prefix: String = name.chars().take(3).collect::<String>().to_uppercase();
    format!("{prefix}{sequence:03}")
}

/// One business day of the generated timetable, holding up to two exams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    #[serde(with = "day_date")]
    pub date: NaiveDate,
    pub day: String,
    pub morning: Option<SessionAssignment>,
    pub afternoon: Option<SessionAssignment>,
}

impl ScheduleDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            day: date.weekday().to_string(),
            morning: None,
            afternoon: None,
        }
    }

    pub fn slot(&self, session: Session) -> Option<&SessionAssignment> {
        match session {
            Session::Morning => self.morning.as_ref(),
            Session::Afternoon => self.afternoon.as_ref(),
        }
    }

    pub fn assign(&mut self, session: Session, assignment: SessionAssignment) {
        match session {
            Session::Morning => self.morning = Some(assignment),
            Session::Afternoon => self.afternoon = Some(assignment),
        }
    }

    pub fn is_full(&self) -> bool {
        self.morning.is_some() && self.afternoon.is_some()
    }
}

/// Day dates travel as `DD/MM/YYYY` strings on the wire.
pub mod day_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)
    }
}

/// A named, stored timetable. Start and end dates are kept as the raw
/// `YYYY-MM-DD` strings the caller submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    #[serde(default)]
    pub id: String,
    pub table_name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_day_gap")]
    pub day_gap: u32,
    pub timetable: Vec<ScheduleDay>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTimetableRequest {
    pub table_name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default = "default_day_gap")]
    pub day_gap: u32,
    pub subjects: Vec<Subject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_defaults_apply() {
        let subject: Subject = serde_json::from_str(r#"{"name":"Math"}"#).unwrap();
        assert_eq!(subject.duration, 180);
        assert_eq!(subject.credits, None);
    }

    #[test]
    fn session_labels_round_trip() {
        assert_eq!(serde_json::to_string(&Session::Morning).unwrap(), "\"Forenoon\"");
        assert_eq!(serde_json::to_string(&Session::Afternoon).unwrap(), "\"Afternoon\"");
        let parsed: Session = serde_json::from_str("\"Forenoon\"").unwrap();
        assert_eq!(parsed, Session::Morning);
    }

    #[test]
    fn day_dates_use_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let day = ScheduleDay::new(date);
        let json = serde_json::to_string(&day).unwrap();
        assert!(json.contains("\"date\":\"06/01/2025\""));
        assert!(json.contains("\"day\":\"Mon\""));

        let back: ScheduleDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, date);
    }

    #[test]
    fn codes_take_three_letters() {
        assert_eq!(subject_code("Mathematics", 1), "MAT001");
        assert_eq!(subject_code("Go", 12), "GO012");
        assert_eq!(subject_code("physics", 3), "PHY003");
    }
}
