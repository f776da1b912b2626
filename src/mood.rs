//! Mood inference from user text and executed actions.
//!
//! Weighted keyword scoring, no AI needed: a pattern hit is worth 2, an
//! associated action kind in the batch is worth 1.5. Rules are declared in
//! priority order and ties keep the earlier rule, so "proud" outranks the
//! generic "productive" on the same input. An explicit theme change beats
//! everything. `None` means "leave the current mood alone".

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::actions::{Action, ActionKind};
use crate::workspace::Theme;

const PATTERN_SCORE: f64 = 2.0;
const ACTION_BOOST_SCORE: f64 = 1.5;

/// Mood labels shown by the on-screen indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Cozy,
    Focus,
    Productive,
    Energetic,
    Happy,
    Calm,
    Creative,
    Dreamy,
    Sleepy,
    Chill,
    Mysterious,
    Intense,
    Romantic,
    Sad,
    Stressed,
    Proud,
    Curious,
    Playful,
    Ocean,
    Nature,
    Sunset,
    #[default]
    Neutral,
}

impl Mood {
    pub const ALL: [Mood; 22] = [
        Mood::Cozy,
        Mood::Focus,
        Mood::Productive,
        Mood::Energetic,
        Mood::Happy,
        Mood::Calm,
        Mood::Creative,
        Mood::Dreamy,
        Mood::Sleepy,
        Mood::Chill,
        Mood::Mysterious,
        Mood::Intense,
        Mood::Romantic,
        Mood::Sad,
        Mood::Stressed,
        Mood::Proud,
        Mood::Curious,
        Mood::Playful,
        Mood::Ocean,
        Mood::Nature,
        Mood::Sunset,
        Mood::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cozy => "cozy",
            Self::Focus => "focus",
            Self::Productive => "productive",
            Self::Energetic => "energetic",
            Self::Happy => "happy",
            Self::Calm => "calm",
            Self::Creative => "creative",
            Self::Dreamy => "dreamy",
            Self::Sleepy => "sleepy",
            Self::Chill => "chill",
            Self::Mysterious => "mysterious",
            Self::Intense => "intense",
            Self::Romantic => "romantic",
            Self::Sad => "sad",
            Self::Stressed => "stressed",
            Self::Proud => "proud",
            Self::Curious => "curious",
            Self::Playful => "playful",
            Self::Ocean => "ocean",
            Self::Nature => "nature",
            Self::Sunset => "sunset",
            Self::Neutral => "neutral",
        }
    }

    /// Lookup by id; unknown ids fall back to `Neutral` like the indicator does.
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == id)
            .unwrap_or(Self::Neutral)
    }

    pub fn face(&self) -> &'static str {
        match self {
            Self::Cozy => "( ˘ ω ˘ )",
            Self::Focus => "( •̀ᴗ•́ )",
            Self::Productive => "( •̀ᴗ•́ )و",
            Self::Energetic => "( ᗒ ᗨᗕ )",
            Self::Happy => "( ◠‿◠ )",
            Self::Calm => "( ◡ ‿ ◡ )",
            Self::Creative => "( ☆ ᗜ ☆ )",
            Self::Dreamy => "( ᵕ ꈊ ᵕ )",
            Self::Sleepy => "( ᴗ_ᴗ。)",
            Self::Chill => "( ‾́ ◡ ‾́ )",
            Self::Mysterious => "( ¬‿¬ )",
            Self::Intense => "( ⊙ᗜ⊙ )",
            Self::Romantic => "( ♡ ᴗ ♡ )",
            Self::Sad => "( ◞‸◟ )",
            Self::Stressed => "( ⊙﹏⊙ )",
            Self::Proud => "( ˙▿˙ )b",
            Self::Curious => "( ᐛ )",
            Self::Playful => "( ˙ᗜ˙ )",
            Self::Ocean => "( ≧ᗜ≦ )~",
            Self::Nature => "( ᵔ ᵕ ᵔ )",
            Self::Sunset => "( ◠ ꈊ ◠ )",
            Self::Neutral => "( ˘ ᵕ ˘ )",
        }
    }

    /// Short caption rendered under the face.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cozy => "cozy",
            Self::Focus => "locked in",
            Self::Productive => "on it",
            Self::Energetic => "hyped!",
            Self::Happy => "happy",
            Self::Calm => "at peace",
            Self::Creative => "inspired",
            Self::Dreamy => "dreamy",
            Self::Sleepy => "zzz",
            Self::Chill => "vibing",
            Self::Mysterious => "hmm...",
            Self::Intense => "intense",
            Self::Romantic => "lovely",
            Self::Sad => "aw",
            Self::Stressed => "eep",
            Self::Proud => "nailed it",
            Self::Curious => "curious",
            Self::Playful => "wheee",
            Self::Ocean => "wave~",
            Self::Nature => "nature",
            Self::Sunset => "golden",
            Self::Neutral => "chillin",
        }
    }

    /// Fixed theme → mood mapping used when the batch changes the theme.
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Cozy => Self::Cozy,
            Theme::Focus => Self::Focus,
            Theme::Ocean => Self::Ocean,
            Theme::Sunset => Self::Sunset,
            Theme::Forest => Self::Nature,
            Theme::Midnight => Self::Mysterious,
            Theme::Minimal => Self::Calm,
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct MoodRule {
    mood: Mood,
    pattern: &'static str,
    boost: &'static [ActionKind],
}

/// Declaration order is priority order.
const MOOD_RULES: &[MoodRule] = &[
    MoodRule {
        mood: Mood::Proud,
        pattern: r"\b(done|finished|completed|check off|nailed|shipped|deployed|crushed)\b",
        boost: &[ActionKind::CompleteTask],
    },
    MoodRule {
        mood: Mood::Stressed,
        pattern: r"\b(stress|anxious|worried|panic|overwhelm|deadline|urgent|asap|behind)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Sad,
        pattern: r"\b(sad|upset|bad day|terrible|awful|depressed|lonely|miss|lost)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Energetic,
        pattern: r"\b(excited|hyped|amazing|awesome|fantastic|pumped|let'?s go|fire|hell yeah|insane)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Happy,
        pattern: r"\b(happy|great|wonderful|love it|perfect|yay|nice|good news|celebrate)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Romantic,
        pattern: r"\b(love|date|anniversary|valentine|romantic|heart|wedding|partner)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Cozy,
        pattern: r"\b(cozy|cosy|warm|comfort|snug|blanket|candle|tea|fireplace|hygge|homey)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Focus,
        pattern: r"\b(focus|concentrate|deep work|grind|lock in|study|exam|pomodoro|timer)\b",
        boost: &[ActionKind::AddTimer],
    },
    MoodRule {
        mood: Mood::Creative,
        pattern: r"\b(creat|design|art|sketch|paint|draw|brainstorm|inspir|imagin|idea|write|draft|blog)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Sleepy,
        pattern: r"\b(sleep|tired|exhaust|nap|rest|bedtime|late night|insomnia|zzz)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Chill,
        pattern: r"\b(chill|relax|laid back|vibe|mellow|easy|no rush|take it easy|wind down)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Curious,
        pattern: r"\b(wonder|curious|what if|how does|why|interest|explore|discover|learn)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Playful,
        pattern: r"\b(fun|play|game|silly|goofy|party|joke|lol|haha|😂|🎉)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Intense,
        pattern: r"\b(intense|serious|critical|important|power|determined|no excuses|push)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Mysterious,
        pattern: r"\b(mysteri|dark|midnight|shadow|secret|enigma|noir|spooky)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Ocean,
        pattern: r"\b(ocean|sea|water|wave|beach|surf|coast|marine|island)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Nature,
        pattern: r"\b(forest|nature|green|earth|garden|tree|plant|hike|mountain|outdoor)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Sunset,
        pattern: r"\b(sunset|sunrise|golden|dusk|twilight|dawn|horizon|sky)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Dreamy,
        pattern: r"\b(dream|whimsical|fantasy|magic|wonder|fairy|starry|wish)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Calm,
        pattern: r"\b(calm|serene|peaceful|tranquil|zen|meditat|mindful|breathe|quiet)\b",
        boost: &[],
    },
    MoodRule {
        mood: Mood::Productive,
        pattern: r"\b(productive|efficient|organize|plan|schedule|manage|priorit|todo|task)\b",
        boost: &[ActionKind::AddTask, ActionKind::SplitTask],
    },
];

fn compiled_rules() -> &'static [(Regex, &'static MoodRule)] {
    static RULES: OnceLock<Vec<(Regex, &'static MoodRule)>> = OnceLock::new();
    RULES.get_or_init(|| {
        MOOD_RULES
            .iter()
            .map(|rule| (Regex::new(&format!("(?i){}", rule.pattern)).unwrap(), rule))
            .collect()
    })
}

/// Infer the indicator mood for a turn.
///
/// `actions` are the actions that were executed for the turn. A
/// `change_theme` among them overrides the scored result entirely.
pub fn infer_mood(user_text: &str, actions: &[Action]) -> Option<Mood> {
    if let Some(theme) = actions.iter().find_map(|a| match a {
        Action::ChangeTheme { theme } => Some(*theme),
        _ => None,
    }) {
        return Some(Mood::for_theme(theme));
    }

    let kinds: Vec<ActionKind> = actions.iter().map(Action::kind).collect();
    infer_mood_from_kinds(user_text, &kinds)
}

/// Score-only inference over action kinds (no theme override).
pub fn infer_mood_from_kinds(user_text: &str, kinds: &[ActionKind]) -> Option<Mood> {
    let text = user_text.to_lowercase();
    let mut best: Option<Mood> = None;
    let mut best_score = 0.0_f64;

    for (re, rule) in compiled_rules() {
        let mut score = 0.0;
        if re.is_match(&text) {
            score += PATTERN_SCORE;
        }
        if rule.boost.iter().any(|k| kinds.contains(k)) {
            score += ACTION_BOOST_SCORE;
        }
        // strictly greater: ties keep the earlier rule
        if score > best_score {
            best_score = score;
            best = Some(rule.mood);
        }
    }

    best
}
