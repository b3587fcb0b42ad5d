use chrono::NaiveTime;
use unsegen::input::*;
use unsegen::widget::builtin::PromptLine;

use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_until},
    character::complete::{alpha1, char, space0},
    combinator::all_consuming,
    multi::many1,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};

use crate::cmds::{Cmd, EventDraft, FormTarget};
use crate::context::{Context, Mode};
use crate::error::{Error, ErrorKind, Result};

type InsertAction = fn(&mut EventDraft, &str) -> Result<()>;

const INSERT_ACTIONS: &[(&str, InsertAction)] = &[
    ("title", |d, v| {
        d.title = v.to_owned();
        Ok(())
    }),
    ("time", |d, v| {
        let time = NaiveTime::parse_from_str(v, "%H:%M").map_err(|e| {
            Error::new(ErrorKind::CommandParse, &format!("invalid time '{}': {}", v, e))
        })?;
        d.time = Some(time);
        Ok(())
    }),
    ("description", |d, v| {
        d.description = v.to_owned();
        Ok(())
    }),
    ("recurrence", |d, v| {
        d.recurrence = v.parse()?;
        Ok(())
    }),
];

fn value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        take_till1(|c: char| c.is_whitespace()),
    ))(input)
}

fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(space0, separated_pair(alpha1, char(':'), value))(input)
}

/// Reads an event form line of `key:value` pairs, for example
/// `title:"Dentist" time:14:30 recurrence:monthly`.
///
/// A line that is not made of such pairs is taken as the title.
pub fn parse_draft(line: &str) -> Result<EventDraft> {
    let pairs = match all_consuming(terminated(many1(key_value), space0))(line) {
        Ok((_, pairs)) => pairs,
        Err(_) => return Ok(EventDraft::new(line.trim())),
    };

    let mut draft = EventDraft::default();
    for (key, val) in pairs {
        let action = INSERT_ACTIONS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, action)| action)
            .ok_or_else(|| {
                Error::new(ErrorKind::CommandParse, &format!("unknown field '{}'", key))
            })?;
        action(&mut draft, val)?;
    }

    Ok(draft)
}

pub struct InsertParser<'a> {
    context: &'a mut Context,
    line: &'a mut PromptLine,
    target: FormTarget,
}

impl<'a> InsertParser<'a> {
    pub fn new(context: &'a mut Context, line: &'a mut PromptLine, target: FormTarget) -> Self {
        InsertParser {
            context,
            line,
            target,
        }
    }
}

impl Behavior for InsertParser<'_> {
    fn input(self, input: Input) -> Option<Input> {
        if let Event::Key(Key::Char('\n')) = input.event {
            let line = self.line.finish_line().to_owned();
            match parse_draft(&line) {
                Ok(draft) if draft.is_blank() => {
                    self.context.report_error("an event needs a title".to_owned())
                }
                Ok(draft) => {
                    let cmd = match self.target {
                        FormTarget::Popup => Cmd::SaveEvent(draft),
                        FormTarget::Today => Cmd::AddEvent(draft),
                    };
                    super::apply(self.context, cmd);
                    if let Mode::Insert(_) = self.context.mode() {
                        super::apply(self.context, Cmd::CancelForm);
                    }
                }
                Err(e) => self.context.report_error(e.to_string()),
            }
            None
        } else {
            Some(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::Recurrence;

    #[test]
    fn full_form() {
        let draft = parse_draft(
            r#"title:"Dentist appointment" time:14:30 description:"bring card" recurrence:monthly"#,
        )
        .unwrap();

        assert_eq!(draft.title, "Dentist appointment");
        assert_eq!(draft.time, NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(draft.description, "bring card");
        assert_eq!(draft.recurrence, Recurrence::Monthly);
    }

    #[test]
    fn bare_words_become_the_title() {
        let draft = parse_draft("  Lunch with Sam ").unwrap();
        assert_eq!(draft, EventDraft::new("Lunch with Sam"));
    }

    #[test]
    fn single_word_values() {
        let draft = parse_draft("title:Gym recurrence:weekly").unwrap();
        assert_eq!(draft.title, "Gym");
        assert_eq!(draft.recurrence, Recurrence::Weekly);
        assert_eq!(draft.time, None);
    }

    #[test]
    fn invalid_fields() {
        assert!(parse_draft("title:x time:25:99").is_err());
        assert!(parse_draft("title:x recurrence:hourly").is_err());
        assert!(parse_draft("title:x location:home").is_err());
    }

    #[test]
    fn empty_title_is_blank() {
        assert!(parse_draft(r#"title:"" time:10:00"#).unwrap().is_blank());
        assert!(parse_draft("").unwrap().is_blank());
    }
}
