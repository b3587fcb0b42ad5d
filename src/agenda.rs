use chrono::NaiveTime;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::calendar::DateKey;
use crate::error::{Error, ErrorKind, Result};

/// Recurrence as picked in the event form. Stored, never expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::None
    }
}

impl Recurrence {
    pub const ALL: [Recurrence; 5] = [
        Recurrence::None,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "None",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
            Recurrence::Custom => "Custom",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Recurrence::ALL
            .iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::CommandParse,
                    &format!("unknown recurrence '{}'", s),
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub title: String,
    pub date: DateKey,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub recurrence: Recurrence,
}

impl EventRecord {
    pub fn new(title: &str, date: DateKey) -> Self {
        EventRecord {
            title: title.to_owned(),
            date,
            time: None,
            description: String::new(),
            recurrence: Recurrence::None,
        }
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(time) = self.time {
            write!(f, " ({})", time.format("%H:%M"))?;
        }
        if self.recurrence != Recurrence::None {
            write!(f, " [{}]", self.recurrence)?;
        }
        Ok(())
    }
}

/// Events keyed by date, in insertion order per day.
///
/// Days without events have no entry; every stored sequence is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Agenda {
    days: BTreeMap<DateKey, Vec<EventRecord>>,
}

impl Agenda {
    pub fn new() -> Self {
        Agenda::default()
    }

    pub fn date_key(year: i32, month: u32, day: u32) -> DateKey {
        DateKey::new(year, month, day)
    }

    pub fn has_events(&self, key: &DateKey) -> bool {
        self.days.get(key).map_or(false, |events| !events.is_empty())
    }

    pub fn events_of_day(&self, key: &DateKey) -> &[EventRecord] {
        self.days.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_event(&mut self, key: DateKey, record: EventRecord) {
        log::debug!("add event '{}' on {}", record.title, key);
        self.days.entry(key).or_insert_with(Vec::new).push(record);
    }

    pub fn edit_event_title(&mut self, key: &DateKey, position: usize, title: &str) -> Result<()> {
        let events = self.days.get_mut(key);
        let len = events.as_ref().map_or(0, |events| events.len());

        match events.and_then(|events| events.get_mut(position)) {
            Some(record) => {
                log::debug!("retitle event {} on {} to '{}'", position, key, title);
                record.title = title.to_owned();
                Ok(())
            }
            None => Err(Error::out_of_range(position, len)),
        }
    }

    pub fn delete_event(&mut self, key: &DateKey, position: usize) -> Result<EventRecord> {
        let events = match self.days.get_mut(key) {
            Some(events) if position < events.len() => events,
            other => {
                return Err(Error::out_of_range(
                    position,
                    other.map_or(0, |events| events.len()),
                ))
            }
        };

        let removed = events.remove(position);
        if events.is_empty() {
            self.days.remove(key);
        }

        log::debug!("deleted event '{}' on {}", removed.title, key);
        Ok(removed)
    }

    /// Relocates every event of `from` behind the events already on `to`.
    ///
    /// Returns the number of moved events.
    pub fn move_events(&mut self, from: &DateKey, to: &DateKey) -> usize {
        if from == to {
            return 0;
        }

        let moved = match self.days.remove(from) {
            Some(events) if !events.is_empty() => events,
            _ => return 0,
        };

        let count = moved.len();
        self.days.entry(*to).or_insert_with(Vec::new).extend(moved);

        log::debug!("moved {} events from {} to {}", count, from, to);
        count
    }

    /// Number of events over all days.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days carrying events, in chronological order.
    pub fn days(&self) -> impl Iterator<Item = &DateKey> {
        self.days.keys()
    }
}

impl std::iter::FromIterator<EventRecord> for Agenda {
    fn from_iter<I: IntoIterator<Item = EventRecord>>(iter: I) -> Self {
        let mut agenda = Agenda::new();
        for record in iter {
            agenda.add_event(record.date, record);
        }
        agenda
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> DateKey {
        Agenda::date_key(2025, 5, 10)
    }

    fn record(title: &str) -> EventRecord {
        EventRecord::new(title, key())
    }

    fn titles(agenda: &Agenda, key: &DateKey) -> Vec<String> {
        agenda
            .events_of_day(key)
            .iter()
            .map(|e| e.title.clone())
            .collect()
    }

    #[test]
    fn add_then_lookup() {
        let mut agenda = Agenda::new();
        assert!(!agenda.has_events(&key()));

        agenda.add_event(key(), record("A"));

        assert!(agenda.has_events(&key()));
        assert_eq!(agenda.events_of_day(&key()).len(), 1);
        assert_eq!(agenda.events_of_day(&key())[0].title, "A");
        assert!(!agenda.has_events(&Agenda::date_key(2025, 5, 11)));
    }

    #[test]
    fn add_appends_in_order() {
        let mut agenda = Agenda::new();
        agenda.add_event(key(), record("A"));
        agenda.add_event(key(), record("B"));
        assert_eq!(titles(&agenda, &key()), vec!["A", "B"]);
        assert_eq!(agenda.len(), 2);
    }

    #[test]
    fn edit_replaces_title_only() {
        let mut agenda = Agenda::new();
        agenda.add_event(key(), record("A").with_description("keep me"));

        agenda.edit_event_title(&key(), 0, "B").unwrap();

        let edited = &agenda.events_of_day(&key())[0];
        assert_eq!(edited.title, "B");
        assert_eq!(edited.date, key());
        assert_eq!(edited.description, "keep me");
    }

    #[test]
    fn edit_out_of_range_leaves_agenda_unchanged() {
        let mut agenda = Agenda::new();
        agenda.add_event(key(), record("A"));
        let before = agenda.clone();

        let err = agenda.edit_event_title(&key(), 5, "X").unwrap_err();

        assert!(err.is_out_of_range());
        assert_eq!(agenda, before);
    }

    #[test]
    fn edit_on_empty_day_is_out_of_range() {
        let mut agenda = Agenda::new();
        assert!(agenda.edit_event_title(&key(), 0, "X").unwrap_err().is_out_of_range());
        assert!(agenda.is_empty());
    }

    #[test]
    fn delete_shifts_following_events() {
        let mut agenda = Agenda::new();
        for title in ["A", "B", "C"] {
            agenda.add_event(key(), record(title));
        }

        let removed = agenda.delete_event(&key(), 1).unwrap();

        assert_eq!(removed.title, "B");
        assert_eq!(titles(&agenda, &key()), vec!["A", "C"]);
    }

    #[test]
    fn delete_last_event_clears_the_day() {
        let mut agenda = Agenda::new();
        agenda.add_event(key(), record("A"));
        agenda.delete_event(&key(), 0).unwrap();
        assert!(!agenda.has_events(&key()));
        assert_eq!(agenda.days().count(), 0);
    }

    #[test]
    fn delete_out_of_range() {
        let mut agenda = Agenda::new();
        agenda.add_event(key(), record("A"));
        let before = agenda.clone();
        assert!(agenda.delete_event(&key(), 1).unwrap_err().is_out_of_range());
        assert_eq!(agenda, before);
    }

    #[test]
    fn move_appends_behind_destination_and_drops_source() {
        let from = Agenda::date_key(2025, 0, 1);
        let to = Agenda::date_key(2025, 0, 2);
        let e1 = EventRecord::new("E1", from);
        let e2 = EventRecord::new("E2", from);
        let e3 = EventRecord::new("E3", to);

        let mut agenda: Agenda = vec![e1.clone(), e2.clone(), e3.clone()]
            .into_iter()
            .collect();

        assert_eq!(agenda.move_events(&from, &to), 2);

        assert_eq!(agenda.events_of_day(&to), &[e3, e1, e2]);
        assert!(!agenda.has_events(&from));
        assert_eq!(agenda.days().collect::<Vec<_>>(), vec![&to]);
    }

    #[test]
    fn move_from_empty_day_is_noop() {
        let mut agenda = Agenda::new();
        agenda.add_event(key(), record("A"));
        let before = agenda.clone();

        assert_eq!(agenda.move_events(&Agenda::date_key(2025, 0, 1), &key()), 0);
        assert_eq!(agenda, before);
    }

    #[test]
    fn move_onto_itself_is_noop() {
        let mut agenda = Agenda::new();
        agenda.add_event(key(), record("A"));
        let before = agenda.clone();

        assert_eq!(agenda.move_events(&key(), &key()), 0);
        assert_eq!(agenda, before);
    }

    #[test]
    fn recurrence_parses_case_insensitively() {
        assert_eq!("weekly".parse::<Recurrence>().unwrap(), Recurrence::Weekly);
        assert_eq!("None".parse::<Recurrence>().unwrap(), Recurrence::None);
        assert!("yearly".parse::<Recurrence>().is_err());
    }

    #[test]
    fn record_display() {
        let record = record("Dentist")
            .with_time(NaiveTime::from_hms_opt(14, 30, 0).unwrap())
            .with_recurrence(Recurrence::Monthly);
        assert_eq!(record.to_string(), "Dentist (14:30) [Monthly]");
    }
}
