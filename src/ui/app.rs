use std::fmt::Write;

use crate::cmds::{Cmd, FormTarget};
use crate::config::{Config, KeyMap};
use crate::context::{Context, Mode};
use crate::events::{Dispatcher, Event};

use super::command::CommandParser;
use super::insert::InsertParser;
use super::year_window::{self, YearWindow};
use super::{apply, PopupWindow, Theme};

use unsegen::base::{Cursor, GraphemeCluster, Terminal, Window};
use unsegen::input::{Behavior, EditBehavior, Input, Key, ScrollBehavior};
use unsegen::widget::builtin::PromptLine;
use unsegen::widget::*;

const BOTTOM_BAR_ROWS: usize = 1;

pub struct App<'a> {
    config: &'a Config,
    theme: Theme,
    context: Context,
    command_line: PromptLine,
    insert_line: PromptLine,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, context: Context) -> App<'a> {
        App {
            config,
            theme: Theme::default(),
            context,
            command_line: PromptLine::with_prompt(":".to_owned()),
            insert_line: PromptLine::with_prompt("+ ".to_owned()),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    fn bottom_bar<'w>(&'w self) -> impl Widget + 'w {
        let mut layout = HLayout::new()
            .separator(GraphemeCluster::space())
            .widget(StatusLine {
                context: &self.context,
                theme: &self.theme,
            });

        match self.context.mode() {
            Mode::Command => layout = layout.widget(self.command_line.as_widget()),
            Mode::Insert(_) => layout = layout.widget(self.insert_line.as_widget()),
            Mode::Normal | Mode::Edit => {}
        }

        layout
    }

    fn as_widget<'w>(&'w self) -> impl Widget + 'w
    where
        'a: 'w,
    {
        VLayout::new()
            .widget(
                HLayout::new()
                    .separator(GraphemeCluster::space())
                    .widget(YearWindow::new(&self.context, self.config, &self.theme))
                    .widget(PopupWindow::new(&self.context, &self.theme)),
            )
            .widget(self.bottom_bar())
    }

    fn handle_input(&mut self, input: Input) {
        match self.context.mode() {
            Mode::Normal => {
                input
                    .chain((Key::Esc, || apply(&mut self.context, Cmd::ClosePopup)))
                    .chain(KeyMapBehavior {
                        context: &mut self.context,
                        key_map: &self.config.key_map,
                    })
                    .finish();
            }
            Mode::Command => {
                if input.matches(Key::Esc) {
                    // Typed text stays reachable through the history.
                    self.command_line.finish_line();
                    apply(&mut self.context, Cmd::NormalMode);
                    return;
                }
                input
                    .chain(CommandParser::new(
                        &mut self.context,
                        &mut self.command_line,
                    ))
                    .chain(
                        EditBehavior::new(&mut self.command_line)
                            .delete_forwards_on(Key::Delete)
                            .delete_backwards_on(Key::Backspace)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .chain(
                        ScrollBehavior::new(&mut self.command_line)
                            .backwards_on(Key::Up)
                            .forwards_on(Key::Down),
                    )
                    .finish();
            }
            Mode::Insert(target) => {
                if input.matches(Key::Esc) {
                    self.insert_line.finish_line();
                    apply(&mut self.context, Cmd::CancelForm);
                    return;
                }
                input
                    .chain(InsertParser::new(
                        &mut self.context,
                        &mut self.insert_line,
                        target,
                    ))
                    .chain(
                        EditBehavior::new(&mut self.insert_line)
                            .delete_forwards_on(Key::Delete)
                            .delete_backwards_on(Key::Backspace)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .chain(
                        ScrollBehavior::new(&mut self.insert_line)
                            .backwards_on(Key::Up)
                            .forwards_on(Key::Down),
                    )
                    .finish();
            }
            Mode::Edit => {
                input.chain(InlineEditBehavior(&mut self.context)).finish();
            }
        }
    }

    /// Sizes the grid viewport to the window and tracks the month in view.
    fn sync_viewport(&mut self, window: &Window) {
        let height = window.get_height().raw_value().max(0) as usize;
        let weeks = year_window::weeks_for_height(height.saturating_sub(BOTTOM_BAR_ROWS));
        if weeks != self.context.grid().visible_weeks() {
            apply(&mut self.context, Cmd::Viewport(weeks));
        }

        if let Some(month) = year_window::observed_month(&self.context) {
            if month != self.context.grid().selected_month() {
                apply(&mut self.context, Cmd::SetSelectedMonth(month));
            }
        }
    }

    pub fn run(
        &mut self,
        dispatcher: Dispatcher,
        mut term: Terminal,
    ) -> Result<(), Box<dyn std::error::Error>> {
        while !self.context.should_quit() {
            // Draw
            let root = term.create_root_window();
            self.sync_viewport(&root);
            self.as_widget().draw(root, RenderingHints::new());
            term.present();

            // Handle events
            match dispatcher.next()? {
                Event::Update => self.context.update(),
                Event::Resize => log::debug!("terminal resized"),
                Event::Input(input) => self.handle_input(input),
            }
        }

        Ok(())
    }

    /// The whole year as plain text, for non-interactive output.
    pub fn show(&self) -> String {
        year_window::render_text(&self.context, self.config)
    }
}

struct StatusLine<'a> {
    context: &'a Context,
    theme: &'a Theme,
}

impl Widget for StatusLine<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(12),
            height: RowDemand::exact(BOTTOM_BAR_ROWS),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let mode = match self.context.mode() {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
            Mode::Insert(FormTarget::Popup) => "INSERT",
            Mode::Insert(FormTarget::Today) => "ADD",
            Mode::Edit => "EDIT",
        };

        let mut cursor = Cursor::new(&mut window);
        if let Err(err) = write!(
            &mut cursor,
            "[{}] {}",
            mode,
            self.context.grid().selected_month().name()
        ) {
            log::warn!("Error while writing status: {}", err);
        }

        if let Some(msg) = &self.context.interaction().last_error_message {
            cursor.set_style_modifier(self.theme.error_style);
            if let Err(err) = write!(&mut cursor, "  {}", msg) {
                log::warn!("Error while writing status: {}", err);
            }
        }
    }
}

/// Dispatches Normal mode keys through the configured key map.
struct KeyMapBehavior<'a> {
    context: &'a mut Context,
    key_map: &'a KeyMap,
}

impl Behavior for KeyMapBehavior<'_> {
    fn input(self, input: Input) -> Option<Input> {
        if let unsegen::input::Event::Key(key) = input.event {
            if let Some(cmd) = self.key_map.get(&key) {
                apply(self.context, cmd.clone());
                return None;
            }
        }
        Some(input)
    }
}

/// Types into the popup's inline title editor. Enter and Esc both commit.
struct InlineEditBehavior<'a>(&'a mut Context);

impl InlineEditBehavior<'_> {
    fn buffer(&self) -> String {
        self.0
            .interaction()
            .popup
            .as_ref()
            .and_then(|popup| popup.editing.as_ref())
            .map(|edit| edit.buffer.clone())
            .unwrap_or_default()
    }
}

impl Behavior for InlineEditBehavior<'_> {
    fn input(self, input: Input) -> Option<Input> {
        let key = match input.event {
            unsegen::input::Event::Key(key) => key,
            _ => return Some(input),
        };

        match key {
            Key::Char('\n') | Key::Esc => apply(self.0, Cmd::CommitEdit),
            Key::Backspace => {
                let mut buffer = self.buffer();
                buffer.pop();
                apply(self.0, Cmd::UpdateEdit(buffer));
            }
            Key::Char(c) => {
                let mut buffer = self.buffer();
                buffer.push(c);
                apply(self.0, Cmd::UpdateEdit(buffer));
            }
            _ => return Some(input),
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::{Agenda, EventRecord};
    use crate::calendar::DateKey;
    use chrono::NaiveDate;
    use unsegen::input::Event as InputEvent;

    fn key(k: Key) -> Input {
        Input {
            event: InputEvent::Key(k),
            raw: Vec::new(),
        }
    }

    fn typed(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_input(key(Key::Char(c)));
        }
    }

    fn context(agenda: Agenda) -> Context {
        Context::new(agenda, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(), 2)
    }

    #[test]
    fn key_map_drives_navigation() {
        let config = Config::default();
        let mut app = App::new(&config, context(Agenda::new()));

        typed(&mut app, "llj");
        assert_eq!(
            app.context().grid().cursor_key(),
            Some(DateKey::new(2025, 5, 19))
        );

        typed(&mut app, "q");
        assert!(app.context().should_quit());
    }

    #[test]
    fn command_line_round_trip() {
        let config = Config::default();
        let mut app = App::new(&config, context(Agenda::new()));

        typed(&mut app, ":year 2030\n");
        assert_eq!(app.context().grid().year(), 2030);
        assert_eq!(app.context().mode(), Mode::Normal);
    }

    #[test]
    fn escape_leaves_command_mode() {
        let config = Config::default();
        let mut app = App::new(&config, context(Agenda::new()));

        typed(&mut app, ":yea");
        app.handle_input(key(Key::Esc));
        assert_eq!(app.context().mode(), Mode::Normal);
        assert_eq!(app.context().grid().year(), 2025);
    }

    #[test]
    fn insert_form_saves_on_the_popup_day() {
        let config = Config::default();
        let mut app = App::new(&config, context(Agenda::new()));

        typed(&mut app, "li");
        assert_eq!(app.context().mode(), Mode::Insert(FormTarget::Popup));
        typed(&mut app, "Dentist\n");

        let key = DateKey::new(2025, 5, 11);
        assert_eq!(app.context().agenda().events_of_day(&key)[0].title, "Dentist");
        assert!(app.context().interaction().popup.is_none());
        assert_eq!(app.context().mode(), Mode::Normal);
    }

    #[test]
    fn inline_edit_by_keys() {
        let config = Config::default();
        let today = DateKey::new(2025, 5, 10);
        let agenda: Agenda = vec![EventRecord::new("Gym", today)].into_iter().collect();
        let mut app = App::new(&config, context(agenda));

        typed(&mut app, "\ne");
        assert_eq!(app.context().mode(), Mode::Edit);
        app.handle_input(key(Key::Backspace));
        typed(&mut app, "m!\n");

        assert_eq!(app.context().agenda().events_of_day(&today)[0].title, "Gym!");
        assert_eq!(app.context().mode(), Mode::Normal);
    }

    #[test]
    fn escape_closes_popup() {
        let config = Config::default();
        let mut app = App::new(&config, context(Agenda::new()));

        typed(&mut app, "\n");
        assert!(app.context().interaction().popup.is_some());
        app.handle_input(key(Key::Esc));
        assert!(app.context().interaction().popup.is_none());
    }
}
