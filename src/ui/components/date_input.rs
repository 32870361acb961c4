use chrono::{Datelike, Days, Months, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    fn width(self) -> usize {
        match self {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }
}

/// Optional date edited one part at a time.
///
/// Digits fill the focused part and commit once it is complete; Up/Down step
/// it; Delete clears the date.
pub struct DateInputState {
    date: Option<NaiveDate>,
    /// Starting point for edits while the date is unset.
    base: NaiveDate,
    part: DatePart,
    buffer: String,
    pub editing: bool,
}

impl DateInputState {
    pub fn new(date: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            date,
            base: date.unwrap_or(today),
            part: DatePart::Year,
            buffer: String::new(),
            editing: false,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[cfg(test)]
    pub fn part(&self) -> DatePart {
        self.part
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
        self.part = DatePart::Year;
        self.buffer.clear();
    }

    fn current(&self) -> NaiveDate {
        self.date.unwrap_or(self.base)
    }

    fn commit(&mut self, date: NaiveDate) {
        self.date = Some(date);
        self.base = date;
    }

    fn next_part(&mut self) {
        self.part = match self.part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.buffer.clear();
    }

    fn previous_part(&mut self) {
        self.part = match self.part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.buffer.clear();
    }

    fn type_digit(&mut self, c: char) {
        self.buffer.push(c);
        if self.buffer.len() < self.part.width() {
            return;
        }

        let value: u32 = self.buffer.parse().unwrap_or(0);
        self.buffer.clear();

        let current = self.current();
        let typed = match self.part {
            DatePart::Year if (1900..=2100).contains(&value) => current.with_year(value as i32),
            DatePart::Month => current.with_month(value),
            DatePart::Day => current.with_day(value),
            _ => None,
        };

        if let Some(date) = typed {
            self.commit(date);
            if self.part != DatePart::Day {
                self.next_part();
            }
        }
    }

    fn step(&mut self, forward: bool) {
        let current = self.current();
        let stepped = match (self.part, forward) {
            (DatePart::Year, true) => current.checked_add_months(Months::new(12)),
            (DatePart::Year, false) => current.checked_sub_months(Months::new(12)),
            (DatePart::Month, true) => current.checked_add_months(Months::new(1)),
            (DatePart::Month, false) => current.checked_sub_months(Months::new(1)),
            (DatePart::Day, true) => current.checked_add_days(Days::new(1)),
            (DatePart::Day, false) => current.checked_sub_days(Days::new(1)),
        };
        if let Some(date) = stepped {
            self.commit(date);
        }
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => self.type_digit(c),
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Delete => {
                self.date = None;
                self.buffer.clear();
            }
            KeyCode::Up => self.step(true),
            KeyCode::Down => self.step(false),
            KeyCode::Right => self.next_part(),
            KeyCode::Left => self.previous_part(),
            _ => {}
        }
    }

    pub fn get_display_string(&self) -> String {
        if !self.editing {
            return match self.date {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => "Not set".to_string(),
            };
        }

        let date = self.current();
        let pending = if self.buffer.is_empty() {
            match self.part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.buffer)
        };

        let (year, month, day) = (
            format!("{:04}", date.year()),
            format!("{:02}", date.month()),
            format!("{:02}", date.day()),
        );
        match self.part {
            DatePart::Year => format!("{year}{pending}-{month}-{day}"),
            DatePart::Month => format!("{year}-{month}{pending}-{day}"),
            DatePart::Day => format!("{year}-{month}-{day}{pending}"),
        }
    }
}
