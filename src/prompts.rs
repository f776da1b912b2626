//! Prompt text for both request lanes.

use serde_json::Value;

use crate::actions::ActionKind;
use crate::dates::DateReference;

/// Chat lane instructions. The date reference and state snapshot are
/// appended per turn by `build_chat_prompt`.
pub const SYSTEM_PROMPT: &str = r##"You control a dashboard. Respond ONLY with a JSON object. No markdown, no explanation.

ACTIONS you can use:
{"type":"add_task","text":"Buy milk 🥛","priority":"medium"}
{"type":"complete_task","text":"milk"} // Triggers on: complete, done, finish, check off, cross out
{"type":"delete_task","text":"milk"}
{"type":"split_task","text":"report","subtasks":["Research 🔍","Write draft ✍️","Edit 📝"]}
{"type":"add_postit","content":"Remember this","color":"#fef68a","x":200,"y":100}
{"type":"add_event","title":"Meeting 📞","date":"2026-02-16","time":"14:00","duration":60,"color":"#6c5ce7"}
{"type":"delete_event","title":"meeting"}
{"type":"add_expense","description":"Coffee ☕","amount":4.50,"category":"food"}
{"type":"delete_expense","description":"coffee"}
{"type":"set_budget","amount":500}
{"type":"add_timer","minutes":25,"label":"Focus"}
{"type":"change_theme","theme":"cozy"}
{"type":"set_greeting","text":"Hello!"}
{"type":"add_widget","widgetType":"clock"}
{"type":"add_widget","widgetType":"quote"}
{"type":"adjust_ambient","glowColor":"#e17055","glowIntensity":0.12,"borderWarmth":0.7,"particles":"fireflies","mood":"cozy"}
{"type":"change_bg","color":"#1a1a2e"}
{"type":"clear_canvas"}

split_task KEEPS the parent and adds subtasks below it.
adjust_ambient: particles=none|fireflies|stars|rain|sparkle. Use ONLY for emotional content.
Themes: cozy, focus, ocean, sunset, forest, midnight, minimal
Priority: high, medium, low
Categories: food, transport, entertainment, shopping, bills, health, other

FORMAT: {"actions":[...],"reply":"short message"}

EXAMPLES:
User: add task buy groceries
{"actions":[{"type":"add_task","text":"Buy groceries 🛒","priority":"medium"}],"reply":"Task added! 🛒"}

User: I finished the design mockup
{"actions":[{"type":"complete_task","text":"design mockup"}],"reply":"Great job! Checked off. ✅"}

User: logged 20 for train tickets
{"actions":[{"type":"add_expense","description":"Train tickets 🚆","amount":20,"category":"transport"}],"reply":"Expense logged! 🚆"}

RULES:
- Extract ACTUAL content and append ONE fitting standard Unicode emoji to the end of the text/title.
- Use STRICTLY valid standard Unicode emojis. Never mix regional indicator letters with text.
- Recognize synonyms for completion: "done", "complete", "finish", "check off" all map to "complete_task".
- Use DATE REFERENCE below to resolve dates accurately.
- Keep reply under 20 words
- Output ONLY the JSON object
"##;

/// Ambient lane instructions. Only `adjust_ambient` results are honored.
pub const AMBIENT_PROMPT: &str = r##"You adjust a dashboard's visual atmosphere. Respond with ONLY JSON, no markdown.
If the content has emotional weight, return: {"actions":[{"type":"adjust_ambient","glowColor":"#hex","glowIntensity":0.1,"borderWarmth":0.5,"particles":"none","mood":"label"}],"reply":""}
If no adjustment needed: {"actions":[],"reply":""}"##;

/// Full chat system prompt for one turn.
pub fn build_chat_prompt(dates: &DateReference, snapshot: &Value) -> String {
    format!(
        "{}\n{}\n\nState: {}",
        SYSTEM_PROMPT,
        dates.to_prompt_block(),
        snapshot
    )
}

/// Ambient context after a chat turn.
pub fn chat_ambient_context(user_text: &str, executed: &[ActionKind]) -> String {
    let taken = if executed.is_empty() {
        "none".to_string()
    } else {
        executed
            .iter()
            .map(ActionKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "User said: \"{}\". Actions taken: {}. Emotional weight?",
        user_text, taken
    )
}

pub fn task_ambient_context(text: &str) -> String {
    format!("User added task: \"{}\". Emotional weight?", text)
}

pub fn event_ambient_context(title: &str, date: &str) -> String {
    format!("User added event: \"{}\" on {}. Emotional weight?", title, date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_chat_prompt_layout() {
        let dates = DateReference::for_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        let prompt = build_chat_prompt(&dates, &json!({"mood": "neutral"}));
        assert!(prompt.starts_with("You control a dashboard."));
        assert!(prompt.contains("\nDATE REFERENCE:\nToday: 2026-10-19 (Monday)"));
        assert!(prompt.ends_with("\n\nState: {\"mood\":\"neutral\"}"));
    }

    #[test]
    fn test_chat_ambient_context() {
        assert_eq!(
            chat_ambient_context("hi", &[]),
            "User said: \"hi\". Actions taken: none. Emotional weight?"
        );
        assert_eq!(
            chat_ambient_context("done", &[ActionKind::CompleteTask, ActionKind::AddTimer]),
            "User said: \"done\". Actions taken: complete_task, add_timer. Emotional weight?"
        );
    }

    #[test]
    fn test_manual_contexts() {
        assert_eq!(
            task_ambient_context("Call mom"),
            "User added task: \"Call mom\". Emotional weight?"
        );
        assert_eq!(
            event_ambient_context("Party", "2026-10-23"),
            "User added event: \"Party\" on 2026-10-23. Emotional weight?"
        );
    }

    #[test]
    fn test_system_prompt_lists_every_action() {
        for kind in ["add_task", "split_task", "delete_expense", "adjust_ambient", "clear_canvas"] {
            assert!(SYSTEM_PROMPT.contains(&format!("\"type\":\"{kind}\"")), "{kind}");
        }
    }
}
