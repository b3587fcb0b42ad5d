use std::fmt::Write;
use unsegen::base::*;
use unsegen::widget::*;

use crate::context::{Context, Popup};

use super::Theme;

const HELP: &[&str] = &[
    "Enter  show the day's events",
    "i      add an event to the day",
    "a      add an event for today",
    "m / p  move events of a day",
    ":      enter a command",
];

fn title(popup: &Popup) -> String {
    match popup.date.month() {
        Some(month) => format!(
            "Events on {} {}, {}",
            month.name(),
            popup.date.day(),
            popup.date.year()
        ),
        None => format!("Events on {}", popup.date),
    }
}

/// Lists the events of the popup's day, or a short key reference if no
/// popup is open.
pub struct PopupWindow<'a> {
    context: &'a Context,
    theme: &'a Theme,
}

impl<'a> PopupWindow<'a> {
    pub fn new(context: &'a Context, theme: &'a Theme) -> Self {
        PopupWindow { context, theme }
    }

    fn draw_help(&self, cursor: &mut Cursor) {
        for line in HELP {
            if let Err(err) = write!(cursor, "{}", line) {
                log::warn!("Error while writing help: {}", err);
            }
            cursor.fill_and_wrap_line();
        }
    }

    fn draw_popup(&self, popup: &Popup, cursor: &mut Cursor) {
        cursor.set_style_modifier(self.theme.month_header_style);
        if let Err(err) = write!(cursor, "{}", title(popup)) {
            log::warn!("Error while writing popup title: {}", err);
        }
        cursor.fill_and_wrap_line();
        cursor.set_style_modifier(self.theme.day_style);

        let events = self.context.popup_events();
        if events.is_empty() {
            if let Err(err) = write!(cursor, "No events") {
                log::warn!("Error while writing event: {}", err);
            }
            cursor.fill_and_wrap_line();
        }

        for (idx, event) in events.iter().enumerate() {
            if idx == popup.selected {
                cursor.set_style_modifier(self.theme.selected_event_style);
            }

            let res = match &popup.editing {
                Some(edit) if edit.position == idx => write!(cursor, "> {}_", edit.buffer),
                _ => write!(cursor, "- {}", event),
            };
            if let Err(err) = res {
                log::warn!("Error while writing event: {}", err);
            }
            cursor.fill_and_wrap_line();

            if !event.description.is_empty() {
                if let Err(err) = write!(cursor, "    {}", event.description) {
                    log::warn!("Error while writing event description: {}", err);
                }
                cursor.fill_and_wrap_line();
            }

            cursor.set_style_modifier(self.theme.day_style);
        }
    }
}

impl Widget for PopupWindow<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(20),
            height: RowDemand::at_least(3),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let mut cursor = Cursor::new(&mut window);

        match &self.context.interaction().popup {
            Some(popup) => self.draw_popup(popup, &mut cursor),
            None => self.draw_help(&mut cursor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateKey;

    #[test]
    fn popup_title_names_the_day() {
        let popup = Popup {
            date: DateKey::new(2025, 0, 3),
            selected: 0,
            editing: None,
        };
        assert_eq!(title(&popup), "Events on January 3, 2025");
    }

    #[test]
    fn padding_dates_title() {
        let popup = Popup {
            date: DateKey::new(2024, 11, 31),
            selected: 0,
            editing: None,
        };
        assert_eq!(title(&popup), "Events on December 31, 2024");
    }
}
