//! The session workspace: every entity the dispatcher mutates and the
//! presentation layer observes.
//!
//! Memory-resident only. Owned by the orchestrator and passed by reference
//! into the dispatcher, so `apply` stays a plain reducer over
//! (state, actions) that tests can drive directly.

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::emoji::guess_emoji;

pub const TASK_CHAR_LIMIT: usize = 80;
pub const POSTIT_CHAR_LIMIT: usize = 120;

pub const GLOW_INTENSITY_MAX: f64 = 0.35;
pub const GRAIN_OPACITY_MAX: f64 = 0.08;
pub const BORDER_WARMTH_MAX: f64 = 1.0;

pub const DEFAULT_GREETING: &str = "Welcome to your dashboard.";
pub const DEFAULT_BACKGROUND: &str =
    "linear-gradient(135deg, #0f0f1a 0%, #1a1a2e 50%, #16213e 100%)";
pub const DEFAULT_ACCENT: &str = "#00cec9";
pub const DEFAULT_BUDGET: f64 = 500.0;
/// The one background rendered with dark text.
pub const LIGHT_BACKGROUND: &str = "#f5f0eb";

/// Tasks and events included in the prompt snapshot.
const SNAPSHOT_TASKS: usize = 10;
const SNAPSHOT_EVENTS: usize = 5;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Case-insensitive substring match used by every fuzzy action.
pub fn fuzzy_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// =============================================================================
// Entities
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A task is plain, a parent (`is_parent`, no `parent_id`) or a child
/// (`parent_id` set, never a parent itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub priority: Priority,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_parent: bool,
}

impl Task {
    pub fn new(text: &str, priority: Priority) -> Self {
        Self {
            id: new_id(),
            text: truncate_chars(text, TASK_CHAR_LIMIT),
            priority,
            done: false,
            parent_id: None,
            is_parent: false,
        }
    }

    pub fn child_of(parent: &Task, text: &str) -> Self {
        Self {
            parent_id: Some(parent.id.clone()),
            ..Self::new(text, parent.priority)
        }
    }

    pub fn is_child(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn emoji(&self) -> Option<&'static str> {
        guess_emoji(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    /// Minutes.
    pub duration: u32,
    pub color: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Entertainment,
    Shopping,
    Bills,
    Health,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "transport" => Some(Self::Transport),
            "entertainment" => Some(Self::Entertainment),
            "shopping" => Some(Self::Shopping),
            "bills" => Some(Self::Bills),
            "health" => Some(Self::Health),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Bills => "bills",
            Self::Health => "health",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    /// Never negative.
    pub amount: f64,
    pub category: ExpenseCategory,
}

/// Position is owned by the presentation layer once placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIt {
    pub id: String,
    pub content: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
}

/// Countdown state lives in the presentation layer; only the total is durable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    pub minutes: u32,
    pub label: String,
}

/// Widget types are an open set; the renderer ignores what it doesn't know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: String,
}

impl Widget {
    pub const KNOWN_TYPES: [&'static str; 2] = ["clock", "quote"];

    pub fn is_known(&self) -> bool {
        Self::KNOWN_TYPES.contains(&self.widget_type.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Particles {
    #[default]
    None,
    Fireflies,
    Stars,
    Rain,
    Sparkle,
}

impl Particles {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" => Some(Self::None),
            "fireflies" => Some(Self::Fireflies),
            "stars" => Some(Self::Stars),
            "rain" => Some(Self::Rain),
            "sparkle" => Some(Self::Sparkle),
            _ => None,
        }
    }
}

/// Visual atmosphere. Fields change independently; see `dispatcher::merge_ambient` for
/// the merge-only update rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ambient {
    pub glow_color: String,
    /// 0.0..=0.35
    pub glow_intensity: f64,
    /// 0.0..=0.08
    pub grain_opacity: f64,
    /// 0.0..=1.0
    pub border_warmth: f64,
    pub particles: Particles,
    pub mood: String,
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            glow_color: "transparent".to_string(),
            glow_intensity: 0.0,
            grain_opacity: 0.03,
            border_warmth: 0.0,
            particles: Particles::None,
            mood: "neutral".to_string(),
        }
    }
}

/// Named background + accent bundle. Changing theme writes both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Cozy,
    Focus,
    Ocean,
    Sunset,
    Forest,
    Midnight,
    Minimal,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cozy" => Some(Self::Cozy),
            "focus" => Some(Self::Focus),
            "ocean" => Some(Self::Ocean),
            "sunset" => Some(Self::Sunset),
            "forest" => Some(Self::Forest),
            "midnight" => Some(Self::Midnight),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            Self::Cozy => "linear-gradient(135deg, #2d1b14 0%, #1a1410 50%, #0d0a07 100%)",
            Self::Focus => "#0a0a12",
            Self::Ocean => "linear-gradient(135deg, #0c1829 0%, #0a2a3f 40%, #134e5e 100%)",
            Self::Sunset => {
                "linear-gradient(135deg, #1a0a2e 0%, #3d1c56 30%, #c0392b 70%, #e67e22 100%)"
            }
            Self::Forest => "linear-gradient(135deg, #0a1a0a 0%, #1a2f1a 50%, #0d1f0d 100%)",
            Self::Midnight => "linear-gradient(135deg, #020111 0%, #0a0a2e 50%, #060620 100%)",
            Self::Minimal => LIGHT_BACKGROUND,
        }
    }

    pub fn accent(&self) -> &'static str {
        match self {
            Self::Cozy => "#e17055",
            Self::Focus => "#636e72",
            Self::Ocean => "#00cec9",
            Self::Sunset => "#e67e22",
            Self::Forest => "#00b894",
            Self::Midnight => "#6c5ce7",
            Self::Minimal => "#2d3436",
        }
    }
}

// =============================================================================
// Workspace aggregate
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub expenses: Vec<Expense>,
    pub budget: f64,
    pub postits: Vec<PostIt>,
    pub timers: Vec<Timer>,
    pub widgets: Vec<Widget>,
    pub ambient: Ambient,
    pub greeting: String,
    pub background: String,
    pub accent: String,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            events: Vec::new(),
            expenses: Vec::new(),
            budget: DEFAULT_BUDGET,
            postits: Vec::new(),
            timers: Vec::new(),
            widgets: Vec::new(),
            ambient: Ambient::default(),
            greeting: DEFAULT_GREETING.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
        }
    }
}

impl Workspace {
    /// A fresh session with a few example entries so the dashboard isn't empty.
    pub fn seeded(today: NaiveDate) -> Self {
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let at = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or_default();

        Self {
            tasks: vec![
                Task::new("Review project proposal 📝", Priority::High),
                Task::new("Prepare meeting notes 📞", Priority::Medium),
                Task::new("Update documentation 📚", Priority::Low),
            ],
            events: vec![
                Event {
                    id: new_id(),
                    title: "Team standup 👥".to_string(),
                    date: today,
                    time: at(9),
                    duration: 30,
                    color: "#6c5ce7".to_string(),
                },
                Event {
                    id: new_id(),
                    title: "Design review 🎨".to_string(),
                    date: tomorrow,
                    time: at(14),
                    duration: 60,
                    color: "#00cec9".to_string(),
                },
            ],
            expenses: vec![
                Expense {
                    id: new_id(),
                    description: "Coffee ☕".to_string(),
                    amount: 4.50,
                    category: ExpenseCategory::Food,
                },
                Expense {
                    id: new_id(),
                    description: "Bus pass 🚆".to_string(),
                    amount: 30.0,
                    category: ExpenseCategory::Transport,
                },
                Expense {
                    id: new_id(),
                    description: "Groceries 🛒".to_string(),
                    amount: 42.80,
                    category: ExpenseCategory::Food,
                },
            ],
            ..Self::default()
        }
    }

    /// Open tasks, not counting parents.
    pub fn active_task_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.done && !t.is_parent)
            .count()
    }

    /// Folded from `0.0`: an empty `f64` sum is `-0.0`, which renders as "-0".
    pub fn total_spent(&self) -> f64 {
        self.expenses.iter().fold(0.0, |acc, e| acc + e.amount)
    }

    pub fn is_light(&self) -> bool {
        self.background == LIGHT_BACKGROUND
    }

    /// Compact state summary injected into the chat prompt.
    pub fn snapshot(&self) -> serde_json::Value {
        let tasks: Vec<String> = self
            .tasks
            .iter()
            .take(SNAPSHOT_TASKS)
            .map(|t| {
                if t.done {
                    format!("{} ✓", t.text)
                } else {
                    t.text.clone()
                }
            })
            .collect();
        let events: Vec<String> = self
            .events
            .iter()
            .take(SNAPSHOT_EVENTS)
            .map(|e| format!("{} {}", e.title, e.date))
            .collect();

        serde_json::json!({
            "tasks": tasks,
            "events": events,
            "budget": format!("{:.0}/{}", self.total_spent(), self.budget),
            "mood": self.ambient.mood,
        })
    }

    // -------------------------------------------------------------------------
    // Direct manipulation (user edits outside the chat lane)
    // -------------------------------------------------------------------------

    /// Flip a task's done flag. Parents have no checkbox.
    pub fn toggle_task(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id && !t.is_parent) {
            Some(task) => {
                task.done = !task.done;
                true
            }
            None => false,
        }
    }

    pub fn edit_task(&mut self, id: &str, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.text = truncate_chars(text, TASK_CHAR_LIMIT);
                true
            }
            None => false,
        }
    }

    pub fn edit_postit(&mut self, id: &str, content: &str) -> bool {
        let content = content.trim();
        if content.is_empty() {
            return false;
        }
        match self.postits.iter_mut().find(|p| p.id == id) {
            Some(note) => {
                note.content = truncate_chars(content, POSTIT_CHAR_LIMIT);
                true
            }
            None => false,
        }
    }

    pub fn remove_postit(&mut self, id: &str) -> bool {
        remove_by(&mut self.postits, |p| p.id == id)
    }

    pub fn remove_timer(&mut self, id: &str) -> bool {
        remove_by(&mut self.timers, |t| t.id == id)
    }

    pub fn remove_widget(&mut self, id: &str) -> bool {
        remove_by(&mut self.widgets, |w| w.id == id)
    }

    pub fn remove_event(&mut self, id: &str) -> bool {
        remove_by(&mut self.events, |e| e.id == id)
    }
}

fn remove_by<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !pred(item));
    items.len() != before
}

/// `HH:MM` wire format for event times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(serde::de::Error::custom)
    }
}
