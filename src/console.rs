//! Line-oriented front end.
//!
//! Plain lines go to the chat lane and are spawned without waiting for the
//! previous turn, so typing again before a reply lands supersedes it.
//! Slash commands cover manual entry and inspection.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveTime};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::actions::DEFAULT_EVENT_COLOR;
use crate::dates::DateReference;
use crate::emoji::guess_emoji;
use crate::mood::Mood;
use crate::orchestrator::{Orchestrator, TurnOutcome};
use crate::workspace::{ExpenseCategory, Workspace};

const HELP: &str = "Commands:\n  /task <text>\n  /event <title> <date> <HH:MM>   (date: YYYY-MM-DD, today, tomorrow, friday, next monday)\n  /expense <amount> <description> [category]\n  /done <n>   (toggle task n from /show)\n  /show\n  /quit\nAnything else is sent to the assistant.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chat(String),
    Task(String),
    Event {
        title: String,
        date: NaiveDate,
        time: NaiveTime,
    },
    Expense {
        amount: f64,
        description: String,
        category: ExpenseCategory,
    },
    /// 1-based position in the `/show` task list.
    Toggle(usize),
    Show,
    Help,
    Quit,
    /// Malformed slash command; carries the usage line.
    Usage(&'static str),
    Empty,
}

/// Interpret one input line. `today` anchors relative event dates.
pub fn parse_command(line: &str, today: NaiveDate) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Chat(line.to_string());
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name.to_lowercase().as_str() {
        "task" if !args.is_empty() => Command::Task(args.to_string()),
        "task" => Command::Usage("/task <text>"),
        "event" => parse_event(args, today).unwrap_or(Command::Usage("/event <title> <date> <HH:MM>")),
        "expense" => parse_expense(args).unwrap_or(Command::Usage("/expense <amount> <description> [category]")),
        "done" => match args.parse::<usize>() {
            Ok(n) if n > 0 => Command::Toggle(n),
            _ => Command::Usage("/done <n>"),
        },
        "show" => Command::Show,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Help,
    }
}

fn parse_event(args: &str, today: NaiveDate) -> Option<Command> {
    let words: Vec<&str> = args.split_whitespace().collect();
    let (time_word, rest) = words.split_last()?;
    let time = NaiveTime::parse_from_str(time_word, "%H:%M").ok()?;

    // "next monday" is two words; try that before the single-word forms.
    let reference = DateReference::for_date(today);
    let two_word = match rest {
        [title @ .., a, b] if !title.is_empty() => {
            resolve_date(&reference, &format!("{} {}", a, b)).map(|date| (date, title))
        }
        _ => None,
    };
    let (date, title_words) = match (two_word, rest) {
        (Some(found), _) => found,
        (None, [title @ .., last]) if !title.is_empty() => (resolve_date(&reference, last)?, title),
        _ => return None,
    };

    Some(Command::Event {
        title: title_words.join(" "),
        date,
        time,
    })
}

fn resolve_date(reference: &DateReference, label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .ok()
        .or_else(|| reference.resolve(label))
}

fn parse_expense(args: &str) -> Option<Command> {
    let mut words: Vec<&str> = args.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    let amount: f64 = words
        .remove(0)
        .trim_start_matches(['€', '$', '£'])
        .replace(',', ".")
        .parse()
        .ok()
        .filter(|a: &f64| a.is_finite())?;

    let category = match words.last().and_then(|w| ExpenseCategory::parse(w)) {
        Some(category) if words.len() > 1 => {
            words.pop();
            category
        }
        _ => ExpenseCategory::Other,
    };

    Some(Command::Expense {
        amount,
        description: words.join(" "),
        category,
    })
}

// =============================================================================
// Rendering
// =============================================================================

fn with_emoji(text: &str) -> String {
    match guess_emoji(text) {
        Some(emoji) => format!("{} {}", emoji, text),
        None => text.to_string(),
    }
}

/// Text rendering of the dashboard.
pub fn render_workspace(workspace: &Workspace, mood: Mood) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}  {}", mood.face(), mood.label(), workspace.greeting);
    let _ = writeln!(
        out,
        "Theme {} / accent {}{}",
        workspace.background,
        workspace.accent,
        if workspace.is_light() { " (light)" } else { "" }
    );

    let _ = writeln!(out, "\nTasks ({} active)", workspace.active_task_count());
    for (n, task) in workspace.tasks.iter().enumerate() {
        let check = if task.is_parent {
            "▸"
        } else if task.done {
            "[x]"
        } else {
            "[ ]"
        };
        let indent = if task.is_child() { "    " } else { "  " };
        let text = match task.emoji() {
            Some(emoji) => format!("{} {}", emoji, task.text),
            None => task.text.clone(),
        };
        let _ = writeln!(
            out,
            "{}{} {}. {} ({})",
            indent,
            check,
            n + 1,
            text,
            task.priority.as_str()
        );
    }

    let _ = writeln!(out, "\nEvents");
    for event in &workspace.events {
        let _ = writeln!(
            out,
            "  {} {} {} ({} min)",
            event.date,
            event.time.format("%H:%M"),
            with_emoji(&event.title),
            event.duration
        );
    }

    let _ = writeln!(
        out,
        "\nBudget {:.2} / {:.2}",
        workspace.total_spent(),
        workspace.budget
    );
    for expense in &workspace.expenses {
        let _ = writeln!(
            out,
            "  {:>8.2}  {} [{}]",
            expense.amount,
            with_emoji(&expense.description),
            expense.category.as_str()
        );
    }

    if !workspace.postits.is_empty() {
        let _ = writeln!(out, "\nNotes");
        for note in &workspace.postits {
            let _ = writeln!(out, "  {}", with_emoji(&note.content));
        }
    }
    if !workspace.timers.is_empty() {
        let _ = writeln!(out, "\nTimers");
        for timer in &workspace.timers {
            let _ = writeln!(out, "  {} min  {}", timer.minutes, timer.label);
        }
    }
    let widgets: Vec<&str> = workspace
        .widgets
        .iter()
        .filter(|w| w.is_known())
        .map(|w| w.widget_type.as_str())
        .collect();
    if !widgets.is_empty() {
        let _ = writeln!(out, "\nWidgets: {}", widgets.join(", "));
    }

    let ambient = &workspace.ambient;
    let _ = write!(
        out,
        "\nAmbient: {} glow {:.2}, grain {:.2}, warmth {:.2}, particles {:?}",
        ambient.glow_color, ambient.glow_intensity, ambient.grain_opacity, ambient.border_warmth, ambient.particles
    );
    out
}

/// `None` when there is no task `n`; `Some(false)` when it is a parent.
fn toggle_nth(orchestrator: &Orchestrator, n: usize) -> Option<bool> {
    orchestrator.with_workspace(|workspace| {
        let id = workspace.tasks.get(n.checked_sub(1)?)?.id.clone();
        Some(workspace.toggle_task(&id))
    })
}

fn print_outcome(orchestrator: &Orchestrator, outcome: &TurnOutcome) {
    if let Some(reply) = &outcome.reply {
        let face = orchestrator.mood().face();
        if outcome.executed.is_empty() {
            println!("{} {}", face, reply);
        } else {
            println!("{} {}  [{} action(s)]", face, reply, outcome.executed.len());
        }
    }
}

// =============================================================================
// Loop
// =============================================================================

/// Read stdin until EOF or `/quit`.
pub async fn run(orchestrator: Orchestrator) -> std::io::Result<()> {
    log::info!("Console: chat backend {}", orchestrator.backend_name());
    for message in orchestrator.conversation() {
        println!("{}\n", message.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line, orchestrator.today()) {
            Command::Empty => {}
            Command::Chat(text) => {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    let outcome = orchestrator.submit(&text).await;
                    print_outcome(&orchestrator, &outcome);
                });
            }
            Command::Task(text) => {
                if orchestrator.add_task_manually(&text).is_some() {
                    println!("Added task: {}", with_emoji(&text));
                }
            }
            Command::Event { title, date, time } => {
                if orchestrator
                    .add_event_manually(&title, date, time, DEFAULT_EVENT_COLOR)
                    .is_some()
                {
                    println!("Added event: {} on {} at {}", title, date, time.format("%H:%M"));
                }
            }
            Command::Expense {
                amount,
                description,
                category,
            } => {
                if orchestrator
                    .add_expense_manually(&description, amount, category)
                    .is_some()
                {
                    println!("Added expense: {:.2} {}", amount, description);
                }
            }
            Command::Toggle(n) => match toggle_nth(&orchestrator, n) {
                Some(true) => println!("Toggled task {}", n),
                Some(false) => println!("Task {} has subtasks; toggle those instead", n),
                None => println!("No task {}", n),
            },
            Command::Show => println!("{}", render_workspace(&orchestrator.workspace(), orchestrator.mood())),
            Command::Help => println!("{}", HELP),
            Command::Usage(usage) => println!("Usage: {}", usage),
            Command::Quit => break,
        }
    }
    log::info!("Console: input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{Priority, Task};

    fn today() -> NaiveDate {
        // A Monday.
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            parse_command("  make it cozy ", today()),
            Command::Chat("make it cozy".to_string())
        );
        assert_eq!(parse_command("   ", today()), Command::Empty);
    }

    #[test]
    fn test_task_command() {
        assert_eq!(
            parse_command("/task buy milk", today()),
            Command::Task("buy milk".to_string())
        );
        assert!(matches!(parse_command("/task", today()), Command::Usage(_)));
    }

    #[test]
    fn test_event_with_iso_date() {
        assert_eq!(
            parse_command("/event Dentist visit 2026-10-23 14:30", today()),
            Command::Event {
                title: "Dentist visit".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 10, 23).unwrap(),
                time: at(14, 30),
            }
        );
    }

    #[test]
    fn test_event_with_relative_dates() {
        assert_eq!(
            parse_command("/event Standup tomorrow 09:00", today()),
            Command::Event {
                title: "Standup".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
                time: at(9, 0),
            }
        );
        assert_eq!(
            parse_command("/event Retro next friday 16:00", today()),
            Command::Event {
                title: "Retro".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 10, 30).unwrap(),
                time: at(16, 0),
            }
        );
    }

    #[test]
    fn test_event_rejects_bad_input() {
        assert!(matches!(parse_command("/event Lunch someday 12:00", today()), Command::Usage(_)));
        assert!(matches!(parse_command("/event Lunch 2026-10-23 noon", today()), Command::Usage(_)));
        assert!(matches!(parse_command("/event 2026-10-23 12:00", today()), Command::Usage(_)));
    }

    #[test]
    fn test_expense_command() {
        assert_eq!(
            parse_command("/expense €12,50 lunch with team food", today()),
            Command::Expense {
                amount: 12.5,
                description: "lunch with team".to_string(),
                category: ExpenseCategory::Food,
            }
        );
        assert_eq!(
            parse_command("/expense 3 bills", today()),
            Command::Expense {
                amount: 3.0,
                description: "bills".to_string(),
                category: ExpenseCategory::Other,
            }
        );
        assert!(matches!(parse_command("/expense lots coffee", today()), Command::Usage(_)));
    }

    #[test]
    fn test_done_command() {
        assert_eq!(parse_command("/done 2", today()), Command::Toggle(2));
        assert!(matches!(parse_command("/done 0", today()), Command::Usage(_)));
        assert!(matches!(parse_command("/done first", today()), Command::Usage(_)));
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(parse_command("/show", today()), Command::Show);
        assert_eq!(parse_command("/QUIT", today()), Command::Quit);
        assert_eq!(parse_command("/whatever", today()), Command::Help);
    }

    #[test]
    fn test_toggle_nth_goes_through_workspace() {
        use crate::completion::LocalClient;
        use crate::orchestrator::TurnSettings;
        use std::sync::Arc;

        let client = Arc::new(LocalClient::new(reqwest::Client::new(), "http://localhost:1/v1", "m"));
        let orchestrator = Orchestrator::with_date(client, TurnSettings::default(), Workspace::seeded(today()), today());

        assert_eq!(toggle_nth(&orchestrator, 1), Some(true));
        assert!(orchestrator.workspace().tasks[0].done);
        assert_eq!(toggle_nth(&orchestrator, 0), None);
        assert_eq!(toggle_nth(&orchestrator, 9), None);
        assert_eq!(orchestrator.backend_name(), "local");
    }

    #[test]
    fn test_render_shows_tasks_and_budget() {
        let mut workspace = Workspace::default();
        let mut parent = Task::new("Plan trip", Priority::High);
        parent.is_parent = true;
        let child = Task::child_of(&parent, "Book flights");
        workspace.tasks = vec![parent, child];

        let out = render_workspace(&workspace, Mood::Calm);

        assert!(out.contains(Mood::Calm.face()));
        assert!(out.contains("Tasks (1 active)"));
        assert!(out.contains("▸"));
        assert!(out.contains("    [ ] 2. "));
        assert!(out.contains("Budget 0.00 / 500.00"));
        assert!(!out.contains("Notes"));
    }
}
