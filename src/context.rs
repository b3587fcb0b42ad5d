use chrono::{Datelike, Local, Month, NaiveDate};

use crate::agenda::{Agenda, EventRecord};
use crate::calendar::{self, build_year_grid, CalendarCell, CalendarGrid, DateKey};
use crate::cmds::{Cmd, EventDraft, FormTarget};
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
    Insert(FormTarget),
    Edit,
}

/// The displayed year, its grid and the scroll position over it.
#[derive(Clone, Debug)]
pub struct GridState {
    grid: CalendarGrid,
    cursor: usize,
    first_week: usize,
    visible_weeks: usize,
    scrolloff: usize,
    selected_month: Month,
}

impl GridState {
    pub fn new(year: i32, scrolloff: usize) -> Self {
        GridState {
            grid: build_year_grid(year),
            cursor: 0,
            first_week: 0,
            visible_weeks: 1,
            scrolloff,
            selected_month: Month::January,
        }
    }

    pub fn year(&self) -> i32 {
        self.grid.year()
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_cell(&self) -> Option<&CalendarCell> {
        self.grid.get(self.cursor)
    }

    pub fn cursor_key(&self) -> Option<DateKey> {
        self.grid.key_at(self.cursor)
    }

    pub fn first_visible_week(&self) -> usize {
        self.first_week
    }

    pub fn visible_weeks(&self) -> usize {
        self.visible_weeks
    }

    pub fn selected_month(&self) -> Month {
        self.selected_month
    }

    pub fn set_selected_month(&mut self, month: Month) {
        self.selected_month = month;
    }

    /// Rebuilds the grid for `year`, keeping the cursor on the same day of
    /// the same month where possible.
    pub fn set_year(&mut self, year: i32) {
        if year == self.year() {
            return;
        }

        let target = self.cursor_cell().and_then(|cell| {
            cell.month()
                .map(|month| (month, cell.day().min(calendar::days_of_month(&month, year))))
        });

        log::debug!("showing year {}", year);
        self.grid = build_year_grid(year);

        match target {
            Some((month, day)) => {
                self.select_date(month, day);
            }
            None => {
                self.cursor = self.cursor.min(self.grid.len().saturating_sub(1));
                self.scroll_to_cursor();
            }
        }
    }

    /// Moves the cursor by `delta` cells. Fails without moving when the
    /// target lies outside the grid.
    pub fn move_cursor(&mut self, delta: i64) -> bool {
        let target = self.cursor as i64 + delta;
        if target < 0 || target >= self.grid.len() as i64 {
            return false;
        }
        self.cursor = target as usize;
        self.scroll_to_cursor();
        true
    }

    /// Moves the cursor by `delta` cells, stopping at the first or last
    /// cell of the grid.
    pub fn move_cursor_clamped(&mut self, delta: i64) {
        let last = self.grid.len().saturating_sub(1) as i64;
        self.cursor = (self.cursor as i64).saturating_add(delta).clamp(0, last) as usize;
        self.scroll_to_cursor();
    }

    pub fn select_date(&mut self, month: Month, day: u32) -> bool {
        match self.grid.position_of(month, day) {
            Some(idx) => {
                self.cursor = idx;
                self.center_cursor();
                true
            }
            None => false,
        }
    }

    pub fn set_visible_weeks(&mut self, weeks: usize) {
        self.visible_weeks = weeks.max(1);
        self.scroll_to_cursor();
    }

    fn max_first_week(&self) -> usize {
        self.grid.num_weeks().saturating_sub(self.visible_weeks)
    }

    fn scroll_to_cursor(&mut self) {
        let row = CalendarGrid::week_of(self.cursor);
        let scrolloff = self.scrolloff.min(self.visible_weeks.saturating_sub(1) / 2);

        if row < self.first_week + scrolloff {
            self.first_week = row.saturating_sub(scrolloff);
        } else if row + scrolloff >= self.first_week + self.visible_weeks {
            self.first_week = row + scrolloff + 1 - self.visible_weeks;
        }
        self.first_week = self.first_week.min(self.max_first_week());
    }

    /// Places the cursor's week at two fifths of the visible rows.
    fn center_cursor(&mut self) {
        let row = CalendarGrid::week_of(self.cursor);
        self.first_week = row
            .saturating_sub(self.visible_weeks * 2 / 5)
            .min(self.max_first_week());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineEdit {
    pub position: usize,
    pub buffer: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Popup {
    pub date: DateKey,
    pub selected: usize,
    pub editing: Option<InlineEdit>,
}

impl Popup {
    fn new(date: DateKey) -> Self {
        Popup {
            date,
            selected: 0,
            editing: None,
        }
    }
}

/// Transient state of a user gesture in progress.
#[derive(Clone, Debug)]
pub struct InteractionState {
    pub mode: Mode,
    pub popup: Option<Popup>,
    pub drag_source: Option<DateKey>,
    pub last_error_message: Option<String>,
    pub quit: bool,
}

impl Default for InteractionState {
    fn default() -> Self {
        InteractionState {
            mode: Mode::Normal,
            popup: None,
            drag_source: None,
            last_error_message: None,
            quit: false,
        }
    }
}

pub struct Context {
    grid: GridState,
    agenda: Agenda,
    interaction: InteractionState,
    today: NaiveDate,
}

impl Context {
    pub fn new(agenda: Agenda, today: NaiveDate, scrolloff: usize) -> Self {
        let mut grid = GridState::new(today.year(), scrolloff);
        if let Some(month) = calendar::month_from_index(today.month0()) {
            grid.select_date(month, today.day());
            grid.set_selected_month(month);
        }

        Context {
            grid,
            agenda,
            interaction: InteractionState::default(),
            today,
        }
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn mode(&self) -> Mode {
        self.interaction.mode
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn today_key(&self) -> DateKey {
        DateKey::from(&self.today)
    }

    pub fn should_quit(&self) -> bool {
        self.interaction.quit
    }

    pub fn update(&mut self) {
        self.today = Local::now().date_naive();
    }

    pub fn report_error(&mut self, message: String) {
        log::warn!("{}", message);
        self.interaction.last_error_message = Some(message);
    }

    /// Events of the day shown in the popup.
    pub fn popup_events(&self) -> &[EventRecord] {
        match &self.interaction.popup {
            Some(popup) => self.agenda.events_of_day(&popup.date),
            None => &[],
        }
    }

    pub fn handle(&mut self, cmd: Cmd) -> Result<()> {
        log::debug!("handle {:?}", cmd);

        match cmd {
            Cmd::Noop => {}
            Cmd::NextDay => {
                self.grid.move_cursor(1);
            }
            Cmd::PrevDay => {
                self.grid.move_cursor(-1);
            }
            Cmd::NextWeek => {
                self.grid.move_cursor(calendar::DAYS_PER_WEEK as i64);
            }
            Cmd::PrevWeek => {
                self.grid.move_cursor(-(calendar::DAYS_PER_WEEK as i64));
            }
            Cmd::MoveCursor(delta) => self.grid.move_cursor_clamped(delta),
            Cmd::PrevYear => self.grid.set_year(self.grid.year().saturating_sub(1)),
            Cmd::NextYear => self.grid.set_year(self.grid.year().saturating_add(1)),
            Cmd::GotoYear(year) => self.grid.set_year(year),
            Cmd::SelectMonth(month) => {
                self.grid.set_selected_month(month);
                self.grid.select_date(month, 1);
            }
            Cmd::SetSelectedMonth(month) => self.grid.set_selected_month(month),
            Cmd::Today => {
                self.grid.set_year(self.today.year());
                if let Some(month) = calendar::month_from_index(self.today.month0()) {
                    self.grid.select_date(month, self.today.day());
                }
            }
            Cmd::Viewport(weeks) => self.grid.set_visible_weeks(weeks),
            Cmd::OpenPopup => {
                if let Some(date) = self.grid.cursor_key() {
                    self.interaction.popup = Some(Popup::new(date));
                }
            }
            Cmd::ClosePopup => {
                self.interaction.popup = None;
                self.interaction.mode = Mode::Normal;
            }
            Cmd::NextEvent => {
                let len = self.popup_events().len();
                if let Some(popup) = self.interaction.popup.as_mut() {
                    if popup.selected + 1 < len {
                        popup.selected += 1;
                    }
                }
            }
            Cmd::PrevEvent => {
                if let Some(popup) = self.interaction.popup.as_mut() {
                    popup.selected = popup.selected.saturating_sub(1);
                }
            }
            Cmd::StartEdit => {
                let title = self
                    .interaction
                    .popup
                    .as_ref()
                    .and_then(|popup| self.popup_events().get(popup.selected))
                    .map(|event| event.title.clone());

                if let (Some(popup), Some(title)) = (self.interaction.popup.as_mut(), title) {
                    popup.editing = Some(InlineEdit {
                        position: popup.selected,
                        buffer: title,
                    });
                    self.interaction.mode = Mode::Edit;
                }
            }
            Cmd::UpdateEdit(text) => {
                if let Some(edit) = self
                    .interaction
                    .popup
                    .as_mut()
                    .and_then(|popup| popup.editing.as_mut())
                {
                    edit.buffer = text;
                }
            }
            Cmd::CommitEdit => {
                self.interaction.mode = Mode::Normal;
                if let Some(popup) = self.interaction.popup.as_mut() {
                    if let Some(edit) = popup.editing.take() {
                        self.agenda
                            .edit_event_title(&popup.date, edit.position, &edit.buffer)?;
                    }
                }
            }
            Cmd::CancelEdit => {
                self.interaction.mode = Mode::Normal;
                if let Some(popup) = self.interaction.popup.as_mut() {
                    popup.editing = None;
                }
            }
            Cmd::DeleteEvent => {
                if let Some(popup) = self.interaction.popup.as_mut() {
                    self.agenda.delete_event(&popup.date, popup.selected)?;
                    let len = self.agenda.events_of_day(&popup.date).len();
                    popup.selected = popup.selected.min(len.saturating_sub(1));
                }
            }
            Cmd::OpenForm(target) => {
                if target == FormTarget::Popup && self.interaction.popup.is_none() {
                    self.handle(Cmd::OpenPopup)?;
                }
                self.interaction.mode = Mode::Insert(target);
            }
            Cmd::CancelForm => {
                if let Mode::Insert(FormTarget::Popup) = self.interaction.mode {
                    self.interaction.popup = None;
                }
                self.interaction.mode = Mode::Normal;
            }
            Cmd::SaveEvent(draft) => {
                if let Some(date) = self.interaction.popup.as_ref().map(|popup| popup.date) {
                    if self.save_draft(draft, date, FormTarget::Popup) {
                        self.interaction.popup = None;
                    }
                }
            }
            Cmd::AddEvent(draft) => {
                let date = self.today_key();
                self.save_draft(draft, date, FormTarget::Today);
            }
            Cmd::DragStart => {
                self.interaction.drag_source = self
                    .grid
                    .cursor_cell()
                    .filter(|cell| !cell.is_padding())
                    .and_then(|_| self.grid.cursor_key());
            }
            Cmd::Drop => {
                if let (Some(from), Some(to)) =
                    (self.interaction.drag_source.take(), self.grid.cursor_key())
                {
                    self.agenda.move_events(&from, &to);
                }
            }
            Cmd::CommandMode => self.interaction.mode = Mode::Command,
            Cmd::NormalMode => self.interaction.mode = Mode::Normal,
            Cmd::Exit => self.interaction.quit = true,
        }

        Ok(())
    }

    /// Blank titles keep the form open.
    fn save_draft(&mut self, draft: EventDraft, date: DateKey, target: FormTarget) -> bool {
        if draft.is_blank() {
            return false;
        }

        self.agenda.add_event(date, draft.into_record(date, target));
        self.interaction.mode = Mode::Normal;
        true
    }
}
