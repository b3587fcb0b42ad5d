pub mod app;
pub mod command;
pub mod insert;
mod popup_window;
mod year_window;

use unsegen::base::style::*;

use crate::cmds::Cmd;
use crate::context::Context;

pub use popup_window::PopupWindow;
pub use year_window::YearWindow;

#[derive(Clone, Debug)]
pub struct Theme {
    pub day_style: StyleModifier,
    pub padding_style: StyleModifier,
    pub focus_day_style: StyleModifier,
    pub today_day_style: StyleModifier,
    pub drag_source_style: StyleModifier,
    pub month_header_style: StyleModifier,
    pub weekday_header_style: StyleModifier,
    pub selected_event_style: StyleModifier,
    pub error_style: StyleModifier,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            day_style: StyleModifier::new(),
            padding_style: StyleModifier::new().fg_color(Color::LightBlack),
            focus_day_style: StyleModifier::new().bg_color(Color::Blue),
            today_day_style: StyleModifier::new().invert(true),
            drag_source_style: StyleModifier::new().fg_color(Color::Magenta).bold(true),
            month_header_style: StyleModifier::new().fg_color(Color::Yellow),
            weekday_header_style: StyleModifier::new().bold(true),
            selected_event_style: StyleModifier::new().invert(true),
            error_style: StyleModifier::new().fg_color(Color::LightRed),
        }
    }
}

/// Runs `cmd` and keeps a failure for the status bar instead of
/// propagating it.
pub(crate) fn apply(context: &mut Context, cmd: Cmd) {
    if let Err(e) = context.handle(cmd) {
        context.report_error(e.to_string());
    }
}
