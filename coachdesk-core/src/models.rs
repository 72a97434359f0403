use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Anatomical training targets offered by the exercise library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Shoulders,
    Biceps,
    Triceps,
    Core,
}

impl MuscleGroup {
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Legs,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Core,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Core => "Core/Abs",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            MuscleGroup::Chest => &["chest", "peito", "pecs"],
            MuscleGroup::Back => &["back", "costas"],
            MuscleGroup::Legs => &["legs", "leg", "pernas", "lower body"],
            MuscleGroup::Shoulders => &["shoulders", "shoulder", "ombros", "delts"],
            MuscleGroup::Biceps => &["biceps", "bíceps"],
            MuscleGroup::Triceps => &["triceps", "tríceps"],
            MuscleGroup::Core => &["core", "core/abs", "abs", "core/abdominais", "abdominais"],
        }
    }

    /// Best-effort match of a free-text label, e.g. one returned by the AI
    /// service. Returns `None` when nothing in the closed set fits.
    pub fn from_label(label: &str) -> Option<MuscleGroup> {
        let needle = label.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        MuscleGroup::all()
            .iter()
            .copied()
            .find(|g| g.aliases().iter().any(|a| *a == needle))
    }

    /// Cycles through the closed set in declaration order.
    pub fn next(&self) -> MuscleGroup {
        let all = MuscleGroup::all();
        let idx = all.iter().position(|g| g == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn all() -> &'static [Level] {
        &[Level::Beginner, Level::Intermediate, Level::Advanced]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Level> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "iniciante" => Some(Level::Beginner),
            "intermediate" | "intermediário" | "intermediario" => Some(Level::Intermediate),
            "advanced" | "avançado" | "avancado" => Some(Level::Advanced),
            _ => None,
        }
    }

    pub fn next(&self) -> Level {
        match self {
            Level::Beginner => Level::Intermediate,
            Level::Intermediate => Level::Advanced,
            Level::Advanced => Level::Beginner,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Accepts either a JSON string or a number for `sets` and keeps it as text.
/// Whole floats that fit an `i64` lose their fractional part (3.0 -> "3");
/// every other number keeps its full decimal form.
pub(crate) fn deserialize_sets<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Int(i64),
        UInt(u64),
        Float(f64),
        Text(String),
    }

    match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Int(i) => Ok(i.to_string()),
        TextOrNumber::UInt(u) => Ok(u.to_string()),
        TextOrNumber::Float(f) => {
            if !f.is_finite() {
                return Err(Error::custom(format!("invalid sets value: {}", f)));
            }
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Ok(format!("{}", f as i64))
            } else {
                Ok(f.to_string())
            }
        }
        TextOrNumber::Text(s) => Ok(s),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Kept as display text; see [`Exercise::muscle_group_kind`] for matching.
    pub muscle_group: String,
    #[serde(deserialize_with = "deserialize_sets")]
    pub sets: String,
    pub reps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Exercise {
    pub fn muscle_group_kind(&self) -> Option<MuscleGroup> {
        MuscleGroup::from_label(&self.muscle_group)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    pub day_name: String,
    pub muscle_groups: Vec<String>,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub goal: String,
    pub level: String,
    pub weekly_schedule: Vec<WorkoutDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub name: String,
    pub photo_url: String,
    pub specialty: String,
    pub email: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiWorkoutParams {
    pub name: String,
    pub goal: String,
    pub level: String,
    pub days_per_week: u8,
}

/// Form state for creating or editing a library exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDraft {
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub sets: String,
    pub reps: String,
    pub description: String,
    pub video_url: String,
    pub image_url: String,
}

impl Default for ExerciseDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            muscle_group: MuscleGroup::Chest,
            sets: "3".to_string(),
            reps: "12".to_string(),
            description: String::new(),
            video_url: String::new(),
            image_url: String::new(),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

impl ExerciseDraft {
    pub fn from_exercise(e: &Exercise) -> Self {
        Self {
            name: e.name.clone(),
            muscle_group: e.muscle_group_kind().unwrap_or(MuscleGroup::Chest),
            sets: e.sets.clone(),
            reps: e.reps.clone(),
            description: e.description.clone().unwrap_or_default(),
            video_url: e.video_url.clone().unwrap_or_default(),
            image_url: e.image_url.clone().unwrap_or_default(),
        }
    }

    pub fn into_exercise(self, id: String) -> Exercise {
        Exercise {
            id,
            name: self.name,
            muscle_group: self.muscle_group.label().to_string(),
            sets: self.sets,
            reps: self.reps,
            video_url: non_empty(self.video_url),
            image_url: non_empty(self.image_url),
            description: non_empty(self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muscle_group_matches_english_and_portuguese_labels() {
        assert_eq!(MuscleGroup::from_label("Chest"), Some(MuscleGroup::Chest));
        assert_eq!(MuscleGroup::from_label(" peito "), Some(MuscleGroup::Chest));
        assert_eq!(
            MuscleGroup::from_label("Core/Abdominais"),
            Some(MuscleGroup::Core)
        );
        assert_eq!(MuscleGroup::from_label("Tríceps"), Some(MuscleGroup::Triceps));
        assert_eq!(MuscleGroup::from_label("Glutes"), None);
        assert_eq!(MuscleGroup::from_label(""), None);
    }

    #[test]
    fn muscle_group_next_wraps() {
        assert_eq!(MuscleGroup::Core.next(), MuscleGroup::Chest);
        assert_eq!(MuscleGroup::Chest.next(), MuscleGroup::Back);
    }

    #[test]
    fn level_parse_is_lenient() {
        assert_eq!(Level::parse("INTERMEDIATE"), Some(Level::Intermediate));
        assert_eq!(Level::parse("Iniciante"), Some(Level::Beginner));
        assert_eq!(Level::parse("Avançado"), Some(Level::Advanced));
        assert_eq!(Level::parse("pro"), None);
    }

    #[test]
    fn sets_accepts_numbers_and_text() {
        let json = r#"[
            {"id":"a","name":"Squat","muscleGroup":"Legs","sets":4,"reps":"8"},
            {"id":"b","name":"Row","muscleGroup":"Back","sets":3.0,"reps":"10"},
            {"id":"c","name":"Plank","muscleGroup":"Core","sets":"3 to 4","reps":"30s"},
            {"id":"d","name":"Curl","muscleGroup":"Biceps","sets":2.5,"reps":"12"}
        ]"#;
        let parsed: Vec<Exercise> = serde_json::from_str(json).unwrap();
        let sets: Vec<&str> = parsed.iter().map(|e| e.sets.as_str()).collect();
        assert_eq!(sets, vec!["4", "3", "3 to 4", "2.5"]);
        assert!(parsed[0].video_url.is_none());
    }

    #[test]
    fn sets_outside_i64_are_not_clamped() {
        let json = r#"[
            {"id":"a","name":"Squat","muscleGroup":"Legs","sets":-1e19,"reps":"8"},
            {"id":"b","name":"Row","muscleGroup":"Back","sets":9223372036854775808,"reps":"10"},
            {"id":"c","name":"Plank","muscleGroup":"Core","sets":-9223372036854775808,"reps":"1"}
        ]"#;
        let parsed: Vec<Exercise> = serde_json::from_str(json).unwrap();
        let sets: Vec<&str> = parsed.iter().map(|e| e.sets.as_str()).collect();
        assert_eq!(
            sets,
            vec!["-10000000000000000000", "9223372036854775808", "-9223372036854775808"]
        );
    }

    #[test]
    fn draft_drops_blank_optionals() {
        let draft = ExerciseDraft {
            name: "Push-up".into(),
            muscle_group: MuscleGroup::Chest,
            video_url: "   ".into(),
            description: "Keep a straight line".into(),
            ..Default::default()
        };
        let ex = draft.into_exercise("42".into());
        assert_eq!(ex.id, "42");
        assert_eq!(ex.muscle_group, "Chest");
        assert_eq!(ex.video_url, None);
        assert_eq!(ex.image_url, None);
        assert_eq!(ex.description.as_deref(), Some("Keep a straight line"));
    }
}
