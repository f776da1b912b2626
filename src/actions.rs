//! The bounded action vocabulary and its decoding from model output.
//!
//! Model payloads are untyped JSON. Everything past this module sees a
//! closed `Action` enum: missing or wrong-typed fields are defaulted here,
//! and an action that lacks the field identifying its target (or names an
//! unknown kind) fails to decode so the dispatcher can skip just that one.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::workspace::{ExpenseCategory, Particles, Priority, Theme};

pub const DEFAULT_TASK_TEXT: &str = "New task";
pub const DEFAULT_NOTE_CONTENT: &str = "Note";
pub const DEFAULT_NOTE_COLOR: &str = "#fef68a";
pub const DEFAULT_EVENT_TITLE: &str = "Event";
pub const DEFAULT_EVENT_COLOR: &str = "#6c5ce7";
pub const DEFAULT_EVENT_DURATION: u32 = 60;
pub const DEFAULT_EXPENSE_DESCRIPTION: &str = "Expense";
pub const DEFAULT_TIMER_MINUTES: u32 = 5;
pub const DEFAULT_TIMER_LABEL: &str = "Timer";
pub const DEFAULT_SUBTASK_TEXT: &str = "Subtask";

fn default_event_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

/// Discriminator values accepted in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AddTask,
    CompleteTask,
    DeleteTask,
    SplitTask,
    AddPostit,
    AddEvent,
    DeleteEvent,
    AddExpense,
    DeleteExpense,
    SetBudget,
    AddTimer,
    ChangeTheme,
    SetGreeting,
    AddWidget,
    AdjustAmbient,
    ChangeBg,
    ClearCanvas,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddTask => "add_task",
            Self::CompleteTask => "complete_task",
            Self::DeleteTask => "delete_task",
            Self::SplitTask => "split_task",
            Self::AddPostit => "add_postit",
            Self::AddEvent => "add_event",
            Self::DeleteEvent => "delete_event",
            Self::AddExpense => "add_expense",
            Self::DeleteExpense => "delete_expense",
            Self::SetBudget => "set_budget",
            Self::AddTimer => "add_timer",
            Self::ChangeTheme => "change_theme",
            Self::SetGreeting => "set_greeting",
            Self::AddWidget => "add_widget",
            Self::AdjustAmbient => "adjust_ambient",
            Self::ChangeBg => "change_bg",
            Self::ClearCanvas => "clear_canvas",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let kind = match value {
            "add_task" => Self::AddTask,
            "complete_task" => Self::CompleteTask,
            "delete_task" => Self::DeleteTask,
            "split_task" => Self::SplitTask,
            "add_postit" => Self::AddPostit,
            "add_event" => Self::AddEvent,
            "delete_event" => Self::DeleteEvent,
            "add_expense" => Self::AddExpense,
            "delete_expense" => Self::DeleteExpense,
            "set_budget" => Self::SetBudget,
            "add_timer" => Self::AddTimer,
            "change_theme" => Self::ChangeTheme,
            "set_greeting" => Self::SetGreeting,
            "add_widget" => Self::AddWidget,
            "adjust_ambient" => Self::AdjustAmbient,
            "change_bg" => Self::ChangeBg,
            "clear_canvas" => Self::ClearCanvas,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial ambient update. `None` leaves the current value untouched.
/// Numbers are stored as supplied; clamping happens on merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmbientUpdate {
    pub glow_color: Option<String>,
    pub glow_intensity: Option<f64>,
    pub grain_opacity: Option<f64>,
    pub border_warmth: Option<f64>,
    pub particles: Option<Particles>,
    pub mood: Option<String>,
}

/// One dashboard command, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddTask {
        text: String,
        priority: Priority,
    },
    CompleteTask {
        text: String,
    },
    DeleteTask {
        text: String,
    },
    SplitTask {
        text: String,
        subtasks: Vec<String>,
    },
    AddPostit {
        content: String,
        color: String,
        x: Option<f64>,
        y: Option<f64>,
    },
    AddEvent {
        title: String,
        /// `None` resolves to the session's "today" when applied.
        date: Option<NaiveDate>,
        time: NaiveTime,
        duration: u32,
        color: String,
    },
    DeleteEvent {
        title: String,
    },
    AddExpense {
        description: String,
        amount: f64,
        category: ExpenseCategory,
    },
    DeleteExpense {
        description: String,
    },
    SetBudget {
        amount: f64,
    },
    AddTimer {
        minutes: u32,
        label: String,
    },
    ChangeTheme {
        theme: Theme,
    },
    SetGreeting {
        text: String,
    },
    AddWidget {
        widget_type: String,
    },
    AdjustAmbient(AmbientUpdate),
    ChangeBg {
        color: String,
    },
    ClearCanvas,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::AddTask { .. } => ActionKind::AddTask,
            Self::CompleteTask { .. } => ActionKind::CompleteTask,
            Self::DeleteTask { .. } => ActionKind::DeleteTask,
            Self::SplitTask { .. } => ActionKind::SplitTask,
            Self::AddPostit { .. } => ActionKind::AddPostit,
            Self::AddEvent { .. } => ActionKind::AddEvent,
            Self::DeleteEvent { .. } => ActionKind::DeleteEvent,
            Self::AddExpense { .. } => ActionKind::AddExpense,
            Self::DeleteExpense { .. } => ActionKind::DeleteExpense,
            Self::SetBudget { .. } => ActionKind::SetBudget,
            Self::AddTimer { .. } => ActionKind::AddTimer,
            Self::ChangeTheme { .. } => ActionKind::ChangeTheme,
            Self::SetGreeting { .. } => ActionKind::SetGreeting,
            Self::AddWidget { .. } => ActionKind::AddWidget,
            Self::AdjustAmbient(_) => ActionKind::AdjustAmbient,
            Self::ChangeBg { .. } => ActionKind::ChangeBg,
            Self::ClearCanvas => ActionKind::ClearCanvas,
        }
    }

    /// Decode one wire object.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let obj = value.as_object().ok_or(DecodeError::NotAnObject)?;
        let type_name = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingType)?;
        let kind = ActionKind::parse(type_name)
            .ok_or_else(|| DecodeError::UnknownType(type_name.to_string()))?;

        let action = match kind {
            ActionKind::AddTask => Self::AddTask {
                text: text_field(obj, "text").unwrap_or_else(|| DEFAULT_TASK_TEXT.to_string()),
                priority: text_field(obj, "priority")
                    .and_then(|p| Priority::parse(&p))
                    .unwrap_or_default(),
            },
            ActionKind::CompleteTask => Self::CompleteTask {
                text: required(obj, kind, "text")?,
            },
            ActionKind::DeleteTask => Self::DeleteTask {
                text: required(obj, kind, "text")?,
            },
            ActionKind::SplitTask => {
                let text = required(obj, kind, "text")?;
                let subtasks = obj
                    .get("subtasks")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().map(subtask_text).collect::<Vec<_>>())
                    .filter(|items| !items.is_empty())
                    .ok_or(DecodeError::MissingField {
                        kind,
                        field: "subtasks",
                    })?;
                Self::SplitTask { text, subtasks }
            }
            ActionKind::AddPostit => Self::AddPostit {
                content: text_field(obj, "content")
                    .unwrap_or_else(|| DEFAULT_NOTE_CONTENT.to_string()),
                color: text_field(obj, "color").unwrap_or_else(|| DEFAULT_NOTE_COLOR.to_string()),
                x: number_field(obj, "x"),
                y: number_field(obj, "y"),
            },
            ActionKind::AddEvent => Self::AddEvent {
                title: text_field(obj, "title").unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_string()),
                date: text_field(obj, "date")
                    .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
                time: text_field(obj, "time")
                    .and_then(|t| parse_clock_time(&t))
                    .unwrap_or_else(default_event_time),
                duration: positive_whole(number_field(obj, "duration"))
                    .unwrap_or(DEFAULT_EVENT_DURATION),
                color: text_field(obj, "color")
                    .unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
            },
            ActionKind::DeleteEvent => Self::DeleteEvent {
                title: required(obj, kind, "title")?,
            },
            ActionKind::AddExpense => Self::AddExpense {
                description: text_field(obj, "description")
                    .unwrap_or_else(|| DEFAULT_EXPENSE_DESCRIPTION.to_string()),
                amount: number_field(obj, "amount").unwrap_or(0.0).max(0.0),
                category: text_field(obj, "category")
                    .and_then(|c| ExpenseCategory::parse(&c))
                    .unwrap_or_default(),
            },
            ActionKind::DeleteExpense => Self::DeleteExpense {
                description: required(obj, kind, "description")?,
            },
            ActionKind::SetBudget => Self::SetBudget {
                amount: number_field(obj, "amount").unwrap_or(0.0).max(0.0),
            },
            ActionKind::AddTimer => Self::AddTimer {
                minutes: positive_whole(number_field(obj, "minutes"))
                    .unwrap_or(DEFAULT_TIMER_MINUTES),
                label: text_field(obj, "label").unwrap_or_else(|| DEFAULT_TIMER_LABEL.to_string()),
            },
            ActionKind::ChangeTheme => {
                let name = required(obj, kind, "theme")?;
                let theme = Theme::parse(&name).ok_or(DecodeError::UnknownTheme(name))?;
                Self::ChangeTheme { theme }
            }
            ActionKind::SetGreeting => Self::SetGreeting {
                text: required(obj, kind, "text")?,
            },
            ActionKind::AddWidget => Self::AddWidget {
                widget_type: required(obj, kind, "widgetType")?,
            },
            ActionKind::AdjustAmbient => Self::AdjustAmbient(AmbientUpdate {
                glow_color: text_field(obj, "glowColor"),
                glow_intensity: number_field(obj, "glowIntensity"),
                grain_opacity: number_field(obj, "grainOpacity"),
                border_warmth: number_field(obj, "borderWarmth"),
                particles: text_field(obj, "particles").and_then(|p| Particles::parse(&p)),
                mood: text_field(obj, "mood"),
            }),
            ActionKind::ChangeBg => Self::ChangeBg {
                color: required(obj, kind, "color")?,
            },
            ActionKind::ClearCanvas => Self::ClearCanvas,
        };

        Ok(action)
    }
}

/// Why a single wire action was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("action is not a JSON object")]
    NotAnObject,
    #[error("action has no type")]
    MissingType,
    #[error("unknown action type: {0}")]
    UnknownType(String),
    #[error("{kind} is missing {field}")]
    MissingField {
        kind: ActionKind,
        field: &'static str,
    },
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}

/// Decode a batch, dropping (and logging) anything that doesn't decode.
/// Order of the surviving actions is preserved.
pub fn decode_batch(values: &[Value]) -> Vec<Action> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| match Action::from_value(value) {
            Ok(action) => Some(action),
            Err(e) => {
                log::debug!("Skipping action #{}: {}", i, e);
                None
            }
        })
        .collect()
}

// =============================================================================
// Field coercion
// =============================================================================

/// Non-empty string; numbers and booleans are stringified.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match obj.get(key)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn required(
    obj: &Map<String, Value>,
    kind: ActionKind,
    field: &'static str,
) -> Result<String, DecodeError> {
    text_field(obj, field).ok_or(DecodeError::MissingField { kind, field })
}

/// Finite number, or a string that parses as one.
fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let n = match obj.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Round to a whole count, rejecting zero and negatives.
fn positive_whole(value: Option<f64>) -> Option<u32> {
    let v = value?;
    if v <= 0.0 {
        return None;
    }
    Some(v.round().max(1.0) as u32)
}

fn subtask_text(item: &Value) -> String {
    match item {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Object(obj) => {
            text_field(obj, "text").unwrap_or_else(|| DEFAULT_SUBTASK_TEXT.to_string())
        }
        _ => DEFAULT_SUBTASK_TEXT.to_string(),
    }
}

fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_task_defaults_priority() {
        let action = Action::from_value(&json!({"type": "add_task", "text": "Buy milk 🥛"})).unwrap();
        assert_eq!(
            action,
            Action::AddTask {
                text: "Buy milk 🥛".to_string(),
                priority: Priority::Medium
            }
        );
    }

    #[test]
    fn test_unknown_priority_falls_back_to_medium() {
        let action =
            Action::from_value(&json!({"type": "add_task", "text": "x", "priority": "urgent"}))
                .unwrap();
        assert!(matches!(action, Action::AddTask { priority: Priority::Medium, .. }));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = Action::from_value(&json!({"type": "launch_rocket"})).unwrap_err();
        assert_eq!(err, DecodeError::UnknownType("launch_rocket".to_string()));
        assert_eq!(
            Action::from_value(&json!({"text": "no type"})).unwrap_err(),
            DecodeError::MissingType
        );
        assert_eq!(Action::from_value(&json!("add_task")).unwrap_err(), DecodeError::NotAnObject);
    }

    #[test]
    fn test_missing_identifying_field_is_rejected() {
        assert!(matches!(
            Action::from_value(&json!({"type": "complete_task"})),
            Err(DecodeError::MissingField { field: "text", .. })
        ));
        assert!(matches!(
            Action::from_value(&json!({"type": "delete_event", "title": ""})),
            Err(DecodeError::MissingField { field: "title", .. })
        ));
        assert!(matches!(
            Action::from_value(&json!({"type": "add_widget"})),
            Err(DecodeError::MissingField { field: "widgetType", .. })
        ));
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        assert_eq!(
            Action::from_value(&json!({"type": "change_theme", "theme": "vaporwave"})).unwrap_err(),
            DecodeError::UnknownTheme("vaporwave".to_string())
        );
    }

    #[test]
    fn test_numeric_coercion() {
        let action =
            Action::from_value(&json!({"type": "add_expense", "amount": "4.50", "category": "food"}))
                .unwrap();
        assert_eq!(
            action,
            Action::AddExpense {
                description: DEFAULT_EXPENSE_DESCRIPTION.to_string(),
                amount: 4.5,
                category: ExpenseCategory::Food
            }
        );

        let action = Action::from_value(&json!({"type": "set_budget", "amount": "lots"})).unwrap();
        assert_eq!(action, Action::SetBudget { amount: 0.0 });

        let action = Action::from_value(&json!({"type": "add_expense", "amount": -12})).unwrap();
        assert!(matches!(action, Action::AddExpense { amount, .. } if amount == 0.0));
    }

    #[test]
    fn test_timer_minutes_default() {
        for payload in [
            json!({"type": "add_timer"}),
            json!({"type": "add_timer", "minutes": "soon"}),
            json!({"type": "add_timer", "minutes": 0}),
            json!({"type": "add_timer", "minutes": [25]}),
        ] {
            let action = Action::from_value(&payload).unwrap();
            assert!(matches!(action, Action::AddTimer { minutes: 5, .. }), "{payload}");
        }
        let action = Action::from_value(&json!({"type": "add_timer", "minutes": 25, "label": "Focus"}))
            .unwrap();
        assert_eq!(
            action,
            Action::AddTimer {
                minutes: 25,
                label: "Focus".to_string()
            }
        );
    }

    #[test]
    fn test_add_event_fields() {
        let action = Action::from_value(&json!({
            "type": "add_event",
            "title": "Meeting 📞",
            "date": "2026-10-23",
            "time": "14:00",
            "duration": "90"
        }))
        .unwrap();
        match action {
            Action::AddEvent {
                title,
                date,
                time,
                duration,
                color,
            } => {
                assert_eq!(title, "Meeting 📞");
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 23));
                assert_eq!(time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
                assert_eq!(duration, 90);
                assert_eq!(color, DEFAULT_EVENT_COLOR);
            }
            other => panic!("Expected AddEvent, got {:?}", other),
        }
    }

    #[test]
    fn test_add_event_bad_date_and_time_default() {
        let action =
            Action::from_value(&json!({"type": "add_event", "date": "friday", "time": "2pm"}))
                .unwrap();
        match action {
            Action::AddEvent { title, date, time, .. } => {
                assert_eq!(title, DEFAULT_EVENT_TITLE);
                assert_eq!(date, None);
                assert_eq!(time, default_event_time());
            }
            other => panic!("Expected AddEvent, got {:?}", other),
        }
    }

    #[test]
    fn test_split_task_subtask_shapes() {
        let action = Action::from_value(&json!({
            "type": "split_task",
            "text": "report",
            "subtasks": ["Research 🔍", {"text": "Draft ✍️"}, {"name": "?"}, 7]
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::SplitTask {
                text: "report".to_string(),
                subtasks: vec![
                    "Research 🔍".to_string(),
                    "Draft ✍️".to_string(),
                    DEFAULT_SUBTASK_TEXT.to_string(),
                    DEFAULT_SUBTASK_TEXT.to_string(),
                ]
            }
        );
    }

    #[test]
    fn test_split_task_needs_subtask_list() {
        assert!(Action::from_value(&json!({"type": "split_task", "text": "report"})).is_err());
        assert!(Action::from_value(
            &json!({"type": "split_task", "text": "report", "subtasks": "a, b"})
        )
        .is_err());
    }

    #[test]
    fn test_adjust_ambient_keeps_only_supplied_fields() {
        let action = Action::from_value(&json!({
            "type": "adjust_ambient",
            "glowIntensity": 0.9,
            "particles": "confetti",
            "mood": "cozy"
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::AdjustAmbient(AmbientUpdate {
                glow_intensity: Some(0.9),
                mood: Some("cozy".to_string()),
                ..AmbientUpdate::default()
            })
        );
    }

    #[test]
    fn test_decode_batch_preserves_order_and_skips_bad() {
        let values = vec![
            json!({"type": "add_task", "text": "one"}),
            json!({"type": "complete_task"}),
            json!({"type": "clear_canvas"}),
        ];
        let actions = decode_batch(&values);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind(), ActionKind::AddTask);
        assert_eq!(actions[1].kind(), ActionKind::ClearCanvas);
    }

    #[test]
    fn test_kind_round_trips_through_wire_name() {
        for name in ["add_task", "delete_expense", "adjust_ambient", "clear_canvas"] {
            assert_eq!(ActionKind::parse(name).map(|k| k.as_str()), Some(name));
        }
    }
}
