use std::collections::HashMap;
use std::io::{BufRead, ErrorKind, Write};

use pipeshell_core::{ActivityDraft, ActivityField, FieldFormatError, ShellError};
use tracing::debug;

const MENU_HEADER: &str = "Select options to add or modify details:";
const MENU_FOOTER: &str = "Enter numbers separated by commas (e.g., 1,3,5) or type 'none': ";

/// Parsed menu answer: fields to prompt for, plus entries that matched nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub fields: Vec<ActivityField>,
    pub ignored: Vec<String>,
}

pub fn parse_selection(raw: &str) -> Selection {
    let normalized = raw.trim().to_lowercase();
    let mut selection = Selection::default();
    if normalized.is_empty() || normalized == "none" {
        return selection;
    }

    for entry in normalized.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        match entry.parse::<usize>().ok().and_then(ActivityField::from_menu_index) {
            Some(field) if !selection.fields.contains(&field) => selection.fields.push(field),
            Some(_) => {}
            None => selection.ignored.push(entry.to_string()),
        }
    }
    selection
}

/// Builds a draft from keyword parameters, coercing each value to its field type.
pub fn seed_draft(keywords: &HashMap<String, String>) -> Result<ActivityDraft, FieldFormatError> {
    let mut keys = keywords.keys().collect::<Vec<_>>();
    keys.sort();

    let mut draft = ActivityDraft::default();
    for key in keys {
        let field = ActivityField::from_name(key).ok_or_else(|| {
            FieldFormatError::new(key.as_str(), "not a recognized activity field")
        })?;
        draft.set(field, &keywords[key])?;
    }
    Ok(draft)
}

/// Interactive collection of activity fields over a line-oriented terminal.
pub struct SlotFiller<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R, W> SlotFiller<'a, R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }

    /// Seeds the draft from `keywords`, then lets the user add or overwrite fields.
    pub fn fill(&mut self, keywords: &HashMap<String, String>) -> Result<ActivityDraft, ShellError> {
        let mut draft = seed_draft(keywords)?;

        self.render_menu()?;
        let selection = parse_selection(&self.read_line()?);
        for entry in &selection.ignored {
            writeln!(self.output, "Ignoring unknown option '{entry}'.")?;
        }

        for field in &selection.fields {
            write!(self.output, "{} ", field.prompt())?;
            self.output.flush()?;
            let raw = self.read_line()?;
            draft.set(*field, &raw)?;
        }

        debug!(
            event_name = "slots.filled",
            seeded = keywords.len(),
            selected = selection.fields.len(),
            "activity draft collected"
        );
        Ok(draft)
    }

    fn render_menu(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "{MENU_HEADER}")?;
        for field in ActivityField::ALL {
            writeln!(self.output, "{}. {}", field.menu_index(), field.label())?;
        }
        write!(self.output, "{MENU_FOOTER}")?;
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, ShellError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ShellError::Input(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            )));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
