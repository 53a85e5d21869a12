use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::FieldFormatError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub u64);

impl ActivityId {
    pub fn parse(raw: &str) -> Result<Self, FieldFormatError> {
        let trimmed = raw.trim();
        match trimmed.parse::<u64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(FieldFormatError::new(
                "id",
                format!("`{trimmed}` is not a positive activity id"),
            )),
        }
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The eight recognized activity fields, in menu order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityField {
    Subject,
    DealId,
    PersonId,
    OrgId,
    DueDate,
    Type,
    DueTime,
    Participants,
}

impl ActivityField {
    pub const ALL: [ActivityField; 8] = [
        Self::Subject,
        Self::DealId,
        Self::PersonId,
        Self::OrgId,
        Self::DueDate,
        Self::Type,
        Self::DueTime,
        Self::Participants,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::DealId => "deal_id",
            Self::PersonId => "person_id",
            Self::OrgId => "org_id",
            Self::DueDate => "due_date",
            Self::Type => "type",
            Self::DueTime => "due_time",
            Self::Participants => "participants",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Subject => "Subject",
            Self::DealId => "Deal ID",
            Self::PersonId => "Person ID",
            Self::OrgId => "Organization ID",
            Self::DueDate => "Due Date",
            Self::Type => "Type",
            Self::DueTime => "Due Time",
            Self::Participants => "Participants",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Subject => "Please provide the subject of the activity.",
            Self::DealId => "Please provide the deal ID associated with this activity.",
            Self::PersonId => "Please provide the person ID associated with this activity.",
            Self::OrgId => "Please provide the organization ID associated with this activity.",
            Self::DueDate => "Please provide the due date for this activity (format YYYY-MM-DD).",
            Self::Type => "Please specify the type of activity (e.g., call, meeting).",
            Self::DueTime => "Please provide the due time for this activity (format HH:MM).",
            Self::Participants => {
                "Please provide a list of participants (format: person_id=5, primary_flag=True; person_id=7, primary_flag=False)."
            }
        }
    }

    /// 1-based menu index.
    pub fn menu_index(&self) -> usize {
        Self::ALL.iter().position(|field| field == self).map(|index| index + 1).unwrap_or(0)
    }

    pub fn from_menu_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|offset| Self::ALL.get(offset).copied())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|field| field.name() == normalized)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub person_id: i64,
    pub primary_flag: bool,
}

/// Clock time carried on the wire as `HH:MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DueTime(pub NaiveTime);

impl DueTime {
    pub fn parse(raw: &str) -> Result<Self, FieldFormatError> {
        let trimmed = raw.trim();
        let shaped = trimmed.len() == 5 && trimmed.as_bytes()[2] == b':';
        if !shaped {
            return Err(FieldFormatError::new("due_time", format!("`{trimmed}` is not HH:MM")));
        }
        NaiveTime::parse_from_str(trimmed, TIME_FORMAT).map(Self).map_err(|_| {
            FieldFormatError::new("due_time", format!("`{trimmed}` is not a valid 24-hour time"))
        })
    }
}

impl Serialize for DueTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(TIME_FORMAT))
    }
}

impl<'de> Deserialize<'de> for DueTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Request body for create/update. Absent fields are not serialized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<DueTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
}

impl ActivityDraft {
    /// Coerces `raw` to the field's declared type and stores it, replacing any prior value.
    pub fn set(&mut self, field: ActivityField, raw: &str) -> Result<(), FieldFormatError> {
        let value = raw.trim();
        match field {
            ActivityField::Subject => self.subject = Some(value.to_string()),
            ActivityField::DealId => self.deal_id = Some(parse_integer(field, value)?),
            ActivityField::PersonId => self.person_id = Some(parse_integer(field, value)?),
            ActivityField::OrgId => self.org_id = Some(parse_integer(field, value)?),
            ActivityField::DueDate => self.due_date = Some(parse_date(value)?),
            ActivityField::Type => {
                if value.is_empty() {
                    return Err(FieldFormatError::new(field.name(), "activity type is empty"));
                }
                self.activity_type = Some(value.to_string());
            }
            ActivityField::DueTime => self.due_time = Some(DueTime::parse(value)?),
            ActivityField::Participants => self.participants = Some(parse_participants(value)?),
        }
        Ok(())
    }
}

fn parse_integer(field: ActivityField, value: &str) -> Result<i64, FieldFormatError> {
    value
        .parse::<i64>()
        .map_err(|_| FieldFormatError::new(field.name(), format!("`{value}` is not an integer")))
}

fn parse_date(value: &str) -> Result<NaiveDate, FieldFormatError> {
    let shaped = value.len() == 10 && value.as_bytes()[4] == b'-' && value.as_bytes()[7] == b'-';
    if !shaped {
        return Err(FieldFormatError::new("due_date", format!("`{value}` is not YYYY-MM-DD")));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        FieldFormatError::new("due_date", format!("`{value}` is not a valid calendar date"))
    })
}

/// Parses `person_id=5, primary_flag=True; person_id=7, primary_flag=False`.
pub fn parse_participants(raw: &str) -> Result<Vec<Participant>, FieldFormatError> {
    let participants = raw
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_participant)
        .collect::<Result<Vec<_>, _>>()?;

    if participants.is_empty() {
        return Err(FieldFormatError::new("participants", "no participants were given"));
    }
    Ok(participants)
}

fn parse_participant(item: &str) -> Result<Participant, FieldFormatError> {
    let malformed = || {
        FieldFormatError::new(
            "participants",
            format!("`{item}` is not `person_id=<int>, primary_flag=<bool>`"),
        )
    };

    let parts = item.split(',').map(str::trim).collect::<Vec<_>>();
    if parts.len() != 2 {
        return Err(malformed());
    }

    let mut person_id = None;
    let mut primary_flag = None;
    for part in parts {
        let (key, value) = part.split_once('=').ok_or_else(malformed)?;
        match key.trim().to_ascii_lowercase().as_str() {
            "person_id" => {
                let id = value.trim().parse::<i64>().map_err(|_| malformed())?;
                person_id = Some(id);
            }
            "primary_flag" => primary_flag = Some(value.trim().to_ascii_lowercase() == "true"),
            _ => return Err(malformed()),
        }
    }

    match (person_id, primary_flag) {
        (Some(person_id), Some(primary_flag)) => Ok(Participant { person_id, primary_flag }),
        _ => Err(malformed()),
    }
}
