//! Relative-date grounding for prompts.
//!
//! The model cannot know what "this friday" means, so every chat prompt
//! carries a small calendar resolving relative labels to absolute dates.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Sunday-first, matching how the reference block is rendered.
const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Relative-date labels resolved against one "today".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateReference {
    pub today: NaiveDate,
    pub tomorrow: NaiveDate,
    /// "this <weekday>": the next occurrence, today included.
    pub this_week: [(Weekday, NaiveDate); 7],
    /// "next <weekday>": seven days after the "this" date.
    pub next_week: [(Weekday, NaiveDate); 7],
}

impl DateReference {
    pub fn for_date(today: NaiveDate) -> Self {
        let dow = today.weekday().num_days_from_sunday();
        let mut this_week = [(Weekday::Sun, today); 7];
        let mut next_week = [(Weekday::Sun, today); 7];

        for (i, day) in WEEK.iter().enumerate() {
            let ahead = (i as u32 + 7 - dow) % 7;
            this_week[i] = (*day, add_days(today, ahead as u64));
            next_week[i] = (*day, add_days(today, ahead as u64 + 7));
        }

        Self {
            today,
            tomorrow: add_days(today, 1),
            this_week,
            next_week,
        }
    }

    /// Resolve a label such as "tomorrow", "this friday", "next monday" or a
    /// bare weekday (treated as "this").
    pub fn resolve(&self, label: &str) -> Option<NaiveDate> {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "today" => return Some(self.today),
            "tomorrow" => return Some(self.tomorrow),
            _ => {}
        }

        let (table, name) = if let Some(rest) = label.strip_prefix("next ") {
            (&self.next_week, rest.trim())
        } else if let Some(rest) = label.strip_prefix("this ") {
            (&self.this_week, rest.trim())
        } else {
            (&self.this_week, label.as_str())
        };

        let weekday: Weekday = name.parse().ok()?;
        table
            .iter()
            .find(|(day, _)| *day == weekday)
            .map(|(_, date)| *date)
    }

    /// The block appended to the chat system prompt.
    pub fn to_prompt_block(&self) -> String {
        let this_week = self
            .this_week
            .iter()
            .map(|(day, date)| format!("this {}={}", weekday_name(*day).to_lowercase(), date))
            .collect::<Vec<_>>()
            .join(", ");
        let next_week = self
            .next_week
            .iter()
            .map(|(day, date)| format!("next {}={}", weekday_name(*day).to_lowercase(), date))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "DATE REFERENCE:\nToday: {} ({})\nTomorrow: {} ({})\nThis week: {}\nNext week: {}\n\
             Use these exact dates for \"tomorrow\", \"this wednesday\", \"next friday\", etc.",
            self.today,
            weekday_name(self.today.weekday()),
            self.tomorrow,
            weekday_name(self.tomorrow.weekday()),
            this_week,
            next_week,
        )
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_this_weekday_includes_today() {
        let refs = DateReference::for_date(monday());
        assert_eq!(refs.resolve("this monday"), Some(monday()));
        assert_eq!(refs.resolve("this friday"), Some(date(2026, 10, 23)));
        assert_eq!(refs.resolve("this sunday"), Some(date(2026, 10, 25)));
    }

    #[test]
    fn test_next_weekday_is_a_week_later() {
        let refs = DateReference::for_date(monday());
        assert_eq!(refs.resolve("next monday"), Some(date(2026, 10, 26)));
        assert_eq!(refs.resolve("next friday"), Some(date(2026, 10, 30)));
    }

    #[test]
    fn test_today_tomorrow_and_bare_weekday() {
        let refs = DateReference::for_date(monday());
        assert_eq!(refs.resolve("Today"), Some(monday()));
        assert_eq!(refs.resolve("tomorrow"), Some(date(2026, 10, 20)));
        assert_eq!(refs.resolve("wednesday"), Some(date(2026, 10, 21)));
        assert_eq!(refs.resolve("someday"), None);
    }

    #[test]
    fn test_month_rollover() {
        let refs = DateReference::for_date(date(2026, 12, 30));
        assert_eq!(refs.tomorrow, date(2026, 12, 31));
        assert_eq!(refs.resolve("next friday"), Some(date(2027, 1, 8)));
    }

    #[test]
    fn test_prompt_block_format() {
        let block = DateReference::for_date(monday()).to_prompt_block();
        assert!(block.starts_with("DATE REFERENCE:\nToday: 2026-10-19 (Monday)\n"));
        assert!(block.contains("Tomorrow: 2026-10-20 (Tuesday)"));
        assert!(block.contains("this sunday=2026-10-25, this monday=2026-10-19"));
        assert!(block.contains("next saturday=2026-10-31"));
    }
}
