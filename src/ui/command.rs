use std::str::FromStr;
use unsegen::input::*;
use unsegen::widget::builtin::PromptLine;

use chrono::Month;
use num_traits::FromPrimitive;

use nom::{
    character::complete::{alpha1, digit1, space0, space1},
    combinator::{all_consuming, map_res, opt, rest},
    sequence::{delimited, preceded, tuple},
    IResult,
};

use super::insert::parse_draft;
use crate::calendar;
use crate::cmds::Cmd;
use crate::context::{Context, Mode};
use crate::error::{Error, ErrorKind};

pub type ActionResult = Result<(), Error>;

pub enum Action {
    Arg(fn(&mut Context, &str) -> ActionResult),
    NoArg(fn(&mut Context) -> ActionResult),
    Repeatable(fn(&mut Context, u32) -> ActionResult),
}

fn move_days(context: &mut Context, days: i64) -> ActionResult {
    context.handle(Cmd::MoveCursor(days))
}

fn move_years(context: &mut Context, years: i64) -> ActionResult {
    let year = i64::from(context.grid().year()).saturating_add(years);
    let year = year.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    context.handle(Cmd::GotoYear(year))
}

fn invalid_argument(arg: &str) -> Error {
    Error::new(ErrorKind::CommandParse, &format!("invalid argument '{}'", arg))
}

fn parse_month(arg: &str) -> Option<Month> {
    if let Ok(number) = u32::from_str(arg) {
        return Month::from_u32(number);
    }

    calendar::months().find(|month| {
        let name = month.name();
        arg.len() >= 3
            && name.len() >= arg.len()
            && name[..arg.len()].eq_ignore_ascii_case(arg)
    })
}

const COMMANDS: &[(&str, Action)] = &[
    ("gd", Action::Repeatable(|c, n| move_days(c, i64::from(n)))),
    ("gD", Action::Repeatable(|c, n| move_days(c, -i64::from(n)))),
    ("gw", Action::Repeatable(|c, n| move_days(c, 7 * i64::from(n)))),
    ("gW", Action::Repeatable(|c, n| move_days(c, -7 * i64::from(n)))),
    ("gy", Action::Repeatable(|c, n| move_years(c, i64::from(n)))),
    ("gY", Action::Repeatable(|c, n| move_years(c, -i64::from(n)))),
    ("next", Action::NoArg(|c| c.handle(Cmd::NextYear))),
    ("prev", Action::NoArg(|c| c.handle(Cmd::PrevYear))),
    ("today", Action::NoArg(|c| c.handle(Cmd::Today))),
    ("q", Action::NoArg(|c| c.handle(Cmd::Exit))),
    ("quit", Action::NoArg(|c| c.handle(Cmd::Exit))),
    (
        "year",
        Action::Arg(|c, arg| {
            let year = i32::from_str(arg).map_err(|_| invalid_argument(arg))?;
            c.handle(Cmd::GotoYear(year))
        }),
    ),
    (
        "month",
        Action::Arg(|c, arg| {
            let month = parse_month(arg).ok_or_else(|| invalid_argument(arg))?;
            c.handle(Cmd::SelectMonth(month))
        }),
    ),
    (
        "add",
        Action::Arg(|c, arg| c.handle(Cmd::AddEvent(parse_draft(arg)?))),
    ),
];

fn find_action(name: &str) -> Option<&'static Action> {
    COMMANDS
        .iter()
        .find(|(cmd_name, _)| *cmd_name == name)
        .map(|(_, act)| act)
}

/// `[count]name[ argument]`
fn command_line(input: &str) -> IResult<&str, (Option<u32>, &str, Option<&str>)> {
    all_consuming(delimited(
        space0,
        tuple((
            opt(map_res(digit1, u32::from_str)),
            alpha1,
            opt(preceded(space1, rest)),
        )),
        space0,
    ))(input)
}

pub fn run_command(context: &mut Context, line: &str) -> ActionResult {
    let (_, (count, name, arg)) = command_line(line.trim())?;
    let arg = arg.map(str::trim).filter(|arg| !arg.is_empty());

    let act = find_action(name).ok_or_else(|| {
        Error::new(ErrorKind::CommandParse, &format!("unknown command '{}'", name))
    })?;

    match (act, count, arg) {
        (Action::Repeatable(a), count, None) => a(context, count.unwrap_or(1)),
        (Action::Arg(a), None, Some(arg)) => a(context, arg),
        (Action::NoArg(a), None, None) => a(context),
        _ => Err(Error::new(
            ErrorKind::CommandParse,
            &format!("wrong usage of '{}'", name),
        )),
    }
}

pub struct CommandParser<'a> {
    context: &'a mut Context,
    line: &'a mut PromptLine,
}

impl<'a> CommandParser<'a> {
    pub fn new(context: &'a mut Context, line: &'a mut PromptLine) -> Self {
        CommandParser { context, line }
    }
}

impl Behavior for CommandParser<'_> {
    fn input(self, input: Input) -> Option<Input> {
        if let Event::Key(Key::Char('\n')) = input.event {
            let cmd = self.line.finish_line().to_owned();
            match run_command(self.context, &cmd) {
                Err(e) => self.context.report_error(e.to_string()),
                Ok(()) => {
                    if self.context.mode() == Mode::Command {
                        super::apply(self.context, Cmd::NormalMode);
                    }
                }
            }
            None
        } else {
            Some(input)
        }
    }
}
