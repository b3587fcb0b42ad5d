use chrono::{Month, Weekday};
use std::fmt::{self, Write};
use unsegen::base::*;
use unsegen::widget::*;

use crate::calendar::{CalendarCell, CalendarGrid, DAYS_PER_WEEK};
use crate::config::Config;
use crate::context::Context;

use super::Theme;

/// Year and month line plus weekday names.
pub const HEADER_ROWS: usize = 2;

const CELL_WIDTH: usize = 4;
const GUTTER_WIDTH: usize = 4;

const WEEKDAYS: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

fn put<W: Write>(sink: &mut W, args: fmt::Arguments) {
    if let Err(err) = sink.write_fmt(args) {
        log::warn!("Error while drawing year view: {}", err);
    }
}

fn abbrev(month: Month) -> &'static str {
    &month.name()[..3]
}

/// Number of week rows that fit into a window of `height` rows.
pub fn weeks_for_height(height: usize) -> usize {
    height.saturating_sub(HEADER_ROWS).max(1)
}

/// The month the visible part of the grid is mostly about: the last 15th
/// shown above three quarters of the viewport.
pub fn observed_month(context: &Context) -> Option<Month> {
    let grid = context.grid();
    let first = grid.first_visible_week();
    let probe = first + grid.visible_weeks() * 3 / 4;
    let probe = probe.min(grid.grid().num_weeks().saturating_sub(1));
    (first..=probe)
        .rev()
        .find_map(|week| grid.grid().month_marker(week))
}

/// Label for the gutter left of `week`: the first real month starting in it.
fn gutter_label(grid: &CalendarGrid, week: usize) -> Option<Month> {
    let start = week * DAYS_PER_WEEK;
    (start..start + DAYS_PER_WEEK)
        .filter(|&idx| grid.get(idx).map_or(false, |cell| !cell.is_padding()))
        .find_map(|idx| grid.month_label(idx))
}

/// Four columns: today marker, right aligned day number, event marker.
fn day_label(context: &Context, config: &Config, index: usize, cell: &CalendarCell) -> String {
    if cell.is_padding() && !config.show_padding {
        return " ".repeat(CELL_WIDTH);
    }

    let key = cell.key(context.grid().year());
    let today = if key == context.today_key() {
        config.today_char
    } else {
        ' '
    };
    let event = if context.agenda().has_events(&key) {
        config.event_char
    } else {
        ' '
    };

    let focus = if index == context.grid().cursor() {
        '>'
    } else {
        today
    };

    format!("{}{:>2}{}", focus, cell.day(), event)
}

/// Renders every week of the displayed year without terminal styling.
pub fn render_text(context: &Context, config: &Config) -> String {
    let grid = context.grid();
    let mut out = String::new();

    put(&mut out, format_args!("{}\n", grid.year()));
    put(&mut out, format_args!("{:w$}", "", w = GUTTER_WIDTH));
    for weekday in WEEKDAYS.iter() {
        put(&mut out, format_args!("{:>w$}", weekday.to_string(), w = CELL_WIDTH));
    }
    out.push('\n');

    for (week, cells) in grid.grid().weeks().enumerate() {
        let label = gutter_label(grid.grid(), week).map_or("", abbrev);
        put(&mut out, format_args!("{:<w$}", label, w = GUTTER_WIDTH));
        for (column, cell) in cells.iter().enumerate() {
            let index = week * DAYS_PER_WEEK + column;
            out.push_str(&day_label(context, config, index, cell));
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    }

    out
}

pub struct YearWindow<'a> {
    context: &'a Context,
    config: &'a Config,
    theme: &'a Theme,
}

impl<'a> YearWindow<'a> {
    pub fn new(context: &'a Context, config: &'a Config, theme: &'a Theme) -> Self {
        YearWindow {
            context,
            config,
            theme,
        }
    }

    fn cell_style(&self, index: usize, cell: &CalendarCell) -> StyleModifier {
        let grid = self.context.grid();
        let key = cell.key(grid.year());

        if index == grid.cursor() {
            self.theme.focus_day_style
        } else if self.context.interaction().drag_source == Some(key) {
            self.theme.drag_source_style
        } else if key == self.context.today_key() {
            self.theme.today_day_style
        } else if cell.is_padding() {
            self.theme.padding_style
        } else {
            self.theme.day_style
        }
    }
}

impl Widget for YearWindow<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::exact(GUTTER_WIDTH + DAYS_PER_WEEK * CELL_WIDTH),
            height: RowDemand::at_least(HEADER_ROWS + 1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let rows = window.get_height().raw_value().max(0) as usize;
        let grid = self.context.grid();

        let mut cursor = Cursor::new(&mut window);

        cursor.set_style_modifier(self.theme.month_header_style);
        put(
            &mut cursor,
            format_args!("{} {}", grid.year(), grid.selected_month().name()),
        );
        cursor.fill_and_wrap_line();

        cursor.set_style_modifier(self.theme.weekday_header_style);
        put(&mut cursor, format_args!("{:w$}", "", w = GUTTER_WIDTH));
        for weekday in WEEKDAYS.iter() {
            put(
                &mut cursor,
                format_args!("{:>w$}", weekday.to_string(), w = CELL_WIDTH),
            );
        }
        cursor.fill_and_wrap_line();

        let first = grid.first_visible_week();
        for (offset, week) in grid
            .grid()
            .weeks()
            .enumerate()
            .skip(first)
            .take(weeks_for_height(rows))
        {
            cursor.set_style_modifier(self.theme.month_header_style);
            let label = gutter_label(grid.grid(), offset).map_or("", abbrev);
            put(&mut cursor, format_args!("{:<w$}", label, w = GUTTER_WIDTH));

            for (column, cell) in week.iter().enumerate() {
                let index = offset * DAYS_PER_WEEK + column;
                cursor.set_style_modifier(self.cell_style(index, cell));
                put(
                    &mut cursor,
                    format_args!("{}", day_label(self.context, self.config, index, cell)),
                );
            }
            cursor.set_style_modifier(self.theme.day_style);
            cursor.fill_and_wrap_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::{Agenda, EventRecord};
    use crate::calendar::{build_year_grid, DateKey};
    use crate::cmds::Cmd;
    use chrono::NaiveDate;

    fn context(agenda: Agenda) -> Context {
        let mut context = Context::new(
            agenda,
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            2,
        );
        context.handle(Cmd::Viewport(12)).unwrap();
        context
    }

    #[test]
    fn height_to_weeks() {
        assert_eq!(weeks_for_height(0), 1);
        assert_eq!(weeks_for_height(HEADER_ROWS), 1);
        assert_eq!(weeks_for_height(HEADER_ROWS + 10), 10);
    }

    #[test]
    fn gutter_names_real_months_only() {
        // 2025 starts on a Wednesday, behind three December pads.
        let grid = build_year_grid(2025);
        assert_eq!(gutter_label(&grid, 0), Some(Month::January));
        assert_eq!(gutter_label(&grid, 1), None);
        // February 1st is the last cell of the fifth week.
        assert_eq!(gutter_label(&grid, 4), Some(Month::February));
        assert_eq!(gutter_label(&grid, grid.num_weeks() - 1), None);
    }

    #[test]
    fn day_labels_mark_today_cursor_and_events() {
        let config = Config::default();
        let agenda: Agenda = vec![EventRecord::new("Dinner", DateKey::new(2025, 5, 12))]
            .into_iter()
            .collect();
        let context = context(agenda);
        let grid = context.grid().grid();

        let today = grid.position_of(Month::June, 10).unwrap();
        let with_event = grid.position_of(Month::June, 12).unwrap();
        let plain = grid.position_of(Month::June, 11).unwrap();

        assert_eq!(
            day_label(&context, &config, today, &grid.cells()[today]),
            ">10 "
        );
        assert_eq!(
            day_label(&context, &config, with_event, &grid.cells()[with_event]),
            " 12•"
        );
        assert_eq!(
            day_label(&context, &config, plain, &grid.cells()[plain]),
            " 11 "
        );
    }

    #[test]
    fn today_marker_when_cursor_is_elsewhere() {
        let config = Config::default();
        let mut context = context(Agenda::new());
        context.handle(Cmd::NextDay).unwrap();
        let grid = context.grid().grid();
        let today = grid.position_of(Month::June, 10).unwrap();

        assert_eq!(
            day_label(&context, &config, today, &grid.cells()[today]),
            "*10 "
        );
    }

    #[test]
    fn hidden_padding_is_blank() {
        let mut config = Config::default();
        config.show_padding = false;
        let context = context(Agenda::new());
        let grid = context.grid().grid();

        assert_eq!(day_label(&context, &config, 0, &grid.cells()[0]), "    ");
        assert_eq!(
            day_label(&context, &Config::default(), 0, &grid.cells()[0]),
            " 29 "
        );
    }

    #[test]
    fn plain_text_year() {
        let context = context(Agenda::new());
        let text = render_text(&context, &Config::default());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "2025");
        assert_eq!(lines[1], "     Sun Mon Tue Wed Thu Fri Sat");
        assert_eq!(lines[2], "Jan  29  30  31   1   2   3   4");
        assert_eq!(lines.len(), 2 + context.grid().grid().num_weeks());
    }

    #[test]
    fn observed_month_follows_scrolling() {
        let mut context = context(Agenda::new());
        assert_eq!(observed_month(&context), Some(Month::July));

        context.handle(Cmd::SelectMonth(Month::January)).unwrap();
        assert_eq!(context.grid().first_visible_week(), 0);
        assert_eq!(observed_month(&context), Some(Month::February));
    }
}
