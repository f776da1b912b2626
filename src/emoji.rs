//! Keyword-based emoji inference for task, event, and note text.
//!
//! Pure function, no model involved: the first matching keyword group wins.
//! Text that already carries an emoji gets nothing, so the display never
//! doubles up on what the model appended itself.

use std::sync::OnceLock;

use regex::Regex;

/// Keyword groups in priority order. Earlier groups win when several match.
const EMOJI_RULES: &[(&str, &str)] = &[
    (r"\b(meet|call|zoom|standup|sync|huddle)\b", "📞"),
    (r"\b(lunch|dinner|eat|food|restaurant|cook|recipe|breakfast)\b", "🍽️"),
    (r"\b(coffee|cafe|latte|espresso)\b", "☕"),
    (r"\b(gym|exercise|workout|run|jog|fitness|yoga|swim)\b", "💪"),
    (r"\b(doctor|dentist|hospital|health|medical|checkup|appointment)\b", "🏥"),
    (r"\b(deploy|ship|release|launch|production|hotfix)\b", "🚀"),
    (r"\b(bug|fix|debug|error|crash)\b", "🐛"),
    (r"\b(code|develop|program|build|implement|refactor)\b", "💻"),
    (r"\b(design|sketch|figma|ui|ux|wireframe|prototype)\b", "🎨"),
    (r"\b(write|draft|blog|article|essay|report|document)\b", "✍️"),
    (r"\b(review|feedback|check|audit|inspect|proofread)\b", "🔍"),
    (r"\b(email|mail|inbox|send|reply|message)\b", "📧"),
    (r"\b(buy|shop|order|purchase|store|grocery|groceries)\b", "🛒"),
    (r"\b(travel|flight|trip|hotel|vacation|airport|train)\b", "✈️"),
    (r"\b(learn|study|course|class|read|book|research)\b", "📚"),
    (r"\b(money|pay|bill|invoice|budget|tax|salary|bank)\b", "💰"),
    (r"\b(clean|organize|tidy|laundry|vacuum|wash)\b", "🧹"),
    (r"\b(birthday|party|celebrate|cake|gift|anniversary)\b", "🎂"),
    (r"\b(plan|strategy|roadmap|brainstorm|think)\b", "🧠"),
    (r"\b(present|slides|deck|powerpoint|keynote|pitch)\b", "📊"),
    (r"\b(test|qa|quality|spec|validate)\b", "🧪"),
    (r"\b(team|hire|interview|onboard|people|hr)\b", "👥"),
    (r"\b(urgent|asap|critical|emergency|deadline)\b", "🔴"),
    (r"\b(car|drive|garage|mechanic|oil|tire)\b", "🚗"),
    (r"\b(pet|dog|cat|vet|walk)\b", "🐾"),
    (r"\b(music|song|playlist|concert|guitar|piano)\b", "🎵"),
    (r"\b(movie|film|watch|netflix|cinema|show)\b", "🎬"),
    (r"\b(game|play|gaming)\b", "🎮"),
    (r"\b(photo|picture|camera|shoot)\b", "📸"),
    (r"\b(plant|garden|water|flower)\b", "🌱"),
    (r"\b(sleep|rest|nap|relax|chill)\b", "😴"),
    (r"\b(idea|creative|brainstorm|inspiration)\b", "💡"),
];

fn re_has_emoji() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{Emoji_Presentation}\p{Extended_Pictographic}]").unwrap())
}

fn compiled_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        EMOJI_RULES
            .iter()
            .map(|(pattern, emoji)| (Regex::new(&format!("(?i){pattern}")).unwrap(), *emoji))
            .collect()
    })
}

/// True when the text already contains a pictographic emoji.
pub fn has_emoji(text: &str) -> bool {
    re_has_emoji().is_match(text)
}

/// Best-matching emoji for `text`, or `None` when nothing fits or the text
/// already has one.
pub fn guess_emoji(text: &str) -> Option<&'static str> {
    if text.trim().is_empty() || has_emoji(text) {
        return None;
    }
    compiled_rules()
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, emoji)| *emoji)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_emoji_keyword() {
        assert_eq!(guess_emoji("Call the plumber"), Some("📞"));
        assert_eq!(guess_emoji("Buy groceries"), Some("🛒"));
    }

    #[test]
    fn test_guess_emoji_case_insensitive() {
        assert_eq!(guess_emoji("DEPLOY the new build"), Some("🚀"));
    }

    #[test]
    fn test_guess_emoji_first_group_wins() {
        // the meeting group is declared before the food group
        assert_eq!(guess_emoji("meet for lunch"), Some("📞"));
    }

    #[test]
    fn test_guess_emoji_skips_text_with_emoji() {
        assert_eq!(guess_emoji("Buy milk 🥛"), None);
    }

    #[test]
    fn test_guess_emoji_whole_words_only() {
        // "caterpillar" must not trigger the "cat" group
        assert_eq!(guess_emoji("caterpillar"), None);
    }

    #[test]
    fn test_guess_emoji_empty() {
        assert_eq!(guess_emoji(""), None);
        assert_eq!(guess_emoji("   "), None);
    }
}
