use chrono::{Month, NaiveTime};

use crate::agenda::{EventRecord, Recurrence};
use crate::calendar::DateKey;

/// Where a filled-in event form ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    /// The form inside the day popup, saved on the popup's date.
    Popup,
    /// The "add event" dialog, saved on today's date.
    Today,
}

/// Contents of the event form before it becomes an [`EventRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub recurrence: Recurrence,
}

impl EventDraft {
    pub fn new(title: &str) -> Self {
        EventDraft {
            title: title.to_owned(),
            ..EventDraft::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }

    pub fn into_record(self, date: DateKey, target: FormTarget) -> EventRecord {
        let title = match (target, self.time) {
            (FormTarget::Today, Some(time)) => format!("{} @ {}", self.title, time.format("%H:%M")),
            _ => self.title,
        };

        EventRecord {
            title,
            date,
            time: self.time,
            description: self.description,
            recurrence: self.recurrence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    Noop,
    NextDay,
    PrevDay,
    NextWeek,
    PrevWeek,
    /// Moves the cursor by a number of cells, stopping at either end.
    MoveCursor(i64),
    PrevYear,
    NextYear,
    GotoYear(i32),
    SelectMonth(Month),
    SetSelectedMonth(Month),
    Today,
    Viewport(usize),
    OpenPopup,
    ClosePopup,
    NextEvent,
    PrevEvent,
    StartEdit,
    UpdateEdit(String),
    CommitEdit,
    CancelEdit,
    DeleteEvent,
    OpenForm(FormTarget),
    CancelForm,
    SaveEvent(EventDraft),
    AddEvent(EventDraft),
    DragStart,
    Drop,
    CommandMode,
    NormalMode,
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_dialog_appends_time_to_title() {
        let mut draft = EventDraft::new("Standup");
        draft.time = NaiveTime::from_hms_opt(9, 15, 0);
        let date = DateKey::new(2025, 5, 10);

        let record = draft.clone().into_record(date, FormTarget::Today);
        assert_eq!(record.title, "Standup @ 09:15");
        assert_eq!(record.date, date);

        let record = draft.into_record(date, FormTarget::Popup);
        assert_eq!(record.title, "Standup");
        assert_eq!(record.time, NaiveTime::from_hms_opt(9, 15, 0));
    }

    #[test]
    fn blank_titles() {
        assert!(EventDraft::new("   ").is_blank());
        assert!(EventDraft::default().is_blank());
        assert!(!EventDraft::new(" x ").is_blank());
    }
}
