//! Action dispatcher: applies decoded actions to a `Workspace`.
//!
//! A plain reducer. Actions run in order and independently; anything that
//! matches nothing is a silent no-op, and nothing here returns an error.

use std::ops::Range;

use chrono::NaiveDate;
use serde_json::Value;

use crate::actions::{decode_batch, Action, ActionKind, AmbientUpdate};
use crate::workspace::{
    fuzzy_contains, new_id, truncate_chars, Ambient, Event, Expense, PostIt, Task, Timer, Widget,
    Workspace, BORDER_WARMTH_MAX, GLOW_INTENSITY_MAX, GRAIN_OPACITY_MAX, POSTIT_CHAR_LIMIT,
};

/// Subtasks kept from a single split.
pub const MAX_SUBTASKS: usize = 5;

/// Canvas region for notes placed without coordinates (half-open).
const POSTIT_X: Range<f64> = 80.0..380.0;
const POSTIT_Y: Range<f64> = 40.0..240.0;

/// What a batch did, for the caller's follow-up work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Kinds of every action that was dispatched, in order.
    pub executed: Vec<ActionKind>,
    /// Mood labels carried by `adjust_ambient`, for syncing the indicator.
    pub ambient_moods: Vec<String>,
}

impl DispatchReport {
    pub fn contains(&self, kind: ActionKind) -> bool {
        self.executed.contains(&kind)
    }
}

/// Apply `actions` in order. `today` fills in events sent without a date.
pub fn apply(workspace: &mut Workspace, actions: &[Action], today: NaiveDate) -> DispatchReport {
    let mut report = DispatchReport::default();
    for action in actions {
        apply_one(workspace, action, today, &mut report);
        report.executed.push(action.kind());
    }
    report
}

/// Decode raw wire objects and apply whatever survives decoding.
pub fn apply_raw(workspace: &mut Workspace, values: &[Value], today: NaiveDate) -> DispatchReport {
    apply(workspace, &decode_batch(values), today)
}

fn apply_one(workspace: &mut Workspace, action: &Action, today: NaiveDate, report: &mut DispatchReport) {
    match action {
        Action::AddTask { text, priority } => {
            workspace.tasks.push(Task::new(text, *priority));
        }
        Action::CompleteTask { text } => {
            for task in workspace
                .tasks
                .iter_mut()
                .filter(|t| !t.done && !t.is_parent && fuzzy_contains(&t.text, text))
            {
                task.done = true;
            }
        }
        Action::DeleteTask { text } => {
            // Children of a deleted parent stay behind with a dangling parent_id.
            workspace.tasks.retain(|t| !fuzzy_contains(&t.text, text));
        }
        Action::SplitTask { text, subtasks } => split_task(workspace, text, subtasks),
        Action::AddPostit { content, color, x, y } => {
            workspace.postits.push(PostIt {
                id: new_id(),
                content: truncate_chars(content, POSTIT_CHAR_LIMIT),
                color: color.clone(),
                x: x.unwrap_or_else(|| random_in(POSTIT_X)),
                y: y.unwrap_or_else(|| random_in(POSTIT_Y)),
            });
        }
        Action::AddEvent {
            title,
            date,
            time,
            duration,
            color,
        } => {
            workspace.events.push(Event {
                id: new_id(),
                title: title.clone(),
                date: date.unwrap_or(today),
                time: *time,
                duration: *duration,
                color: color.clone(),
            });
        }
        Action::DeleteEvent { title } => {
            workspace.events.retain(|e| !fuzzy_contains(&e.title, title));
        }
        Action::AddExpense {
            description,
            amount,
            category,
        } => {
            workspace.expenses.push(Expense {
                id: new_id(),
                description: description.clone(),
                amount: amount.max(0.0),
                category: *category,
            });
        }
        Action::DeleteExpense { description } => {
            workspace
                .expenses
                .retain(|e| !fuzzy_contains(&e.description, description));
        }
        Action::SetBudget { amount } => workspace.budget = amount.max(0.0),
        Action::AddTimer { minutes, label } => {
            workspace.timers.push(Timer {
                id: new_id(),
                minutes: *minutes,
                label: label.clone(),
            });
        }
        Action::ChangeTheme { theme } => {
            workspace.background = theme.background().to_string();
            workspace.accent = theme.accent().to_string();
        }
        Action::SetGreeting { text } => workspace.greeting = text.clone(),
        Action::AddWidget { widget_type } => {
            workspace.widgets.push(Widget {
                id: new_id(),
                widget_type: widget_type.clone(),
            });
        }
        Action::AdjustAmbient(update) => {
            merge_ambient(&mut workspace.ambient, update);
            if let Some(mood) = &update.mood {
                report.ambient_moods.push(mood.clone());
            }
        }
        Action::ChangeBg { color } => workspace.background = color.clone(),
        Action::ClearCanvas => {
            workspace.postits.clear();
            workspace.timers.clear();
            workspace.widgets.clear();
        }
    }
}

/// Turn the first plain task matching `text` into a parent and insert its
/// children right after it.
fn split_task(workspace: &mut Workspace, text: &str, subtasks: &[String]) {
    let Some(index) = workspace
        .tasks
        .iter()
        .position(|t| !t.is_parent && !t.is_child() && fuzzy_contains(&t.text, text))
    else {
        log::debug!("split_task: no task matches {:?}", text);
        return;
    };

    workspace.tasks[index].is_parent = true;
    let parent = workspace.tasks[index].clone();
    let children: Vec<Task> = subtasks
        .iter()
        .take(MAX_SUBTASKS)
        .map(|s| Task::child_of(&parent, s))
        .collect();
    workspace.tasks.splice(index + 1..index + 1, children);
}

/// Merge supplied fields over the current ambient, clamping numbers.
pub fn merge_ambient(ambient: &mut Ambient, update: &AmbientUpdate) {
    if let Some(color) = &update.glow_color {
        ambient.glow_color = color.clone();
    }
    if let Some(v) = update.glow_intensity {
        ambient.glow_intensity = v.clamp(0.0, GLOW_INTENSITY_MAX);
    }
    if let Some(v) = update.grain_opacity {
        ambient.grain_opacity = v.clamp(0.0, GRAIN_OPACITY_MAX);
    }
    if let Some(v) = update.border_warmth {
        ambient.border_warmth = v.clamp(0.0, BORDER_WARMTH_MAX);
    }
    if let Some(particles) = update.particles {
        ambient.particles = particles;
    }
    if let Some(mood) = &update.mood {
        ambient.mood = mood.clone();
    }
}

fn random_in(range: Range<f64>) -> f64 {
    range.start + rand::random::<f64>() * (range.end - range.start)
}
