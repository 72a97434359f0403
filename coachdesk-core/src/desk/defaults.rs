//! Starter data for a fresh desk.

use crate::models::{Coach, Exercise, Level, MuscleGroup, Student, WorkoutDay};

fn exercise(
    id: &str,
    name: &str,
    group: MuscleGroup,
    sets: &str,
    reps: &str,
    video_url: &str,
    description: &str,
) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        muscle_group: group.label().to_string(),
        sets: sets.to_string(),
        reps: reps.to_string(),
        video_url: Some(video_url.to_string()),
        image_url: None,
        description: Some(description.to_string()),
    }
}

pub fn default_exercises() -> Vec<Exercise> {
    vec![
        exercise(
            "2",
            "Shoulder Press",
            MuscleGroup::Shoulders,
            "3",
            "10 to 12",
            "https://www.youtube.com/watch?v=HzIiNhHhhtA",
            "Press the dumbbells overhead until the arms are extended.",
        ),
        exercise(
            "3",
            "Back Squat",
            MuscleGroup::Legs,
            "3 to 4",
            "10 to 15",
            "https://www.youtube.com/watch?v=U3HlEF_E9fo",
            "Feet shoulder-width apart, squat keeping the spine neutral.",
        ),
        exercise(
            "4",
            "Dumbbell Lunge",
            MuscleGroup::Legs,
            "3",
            "10 to 12 per leg",
            "https://www.youtube.com/watch?v=QOVaHwm-Q6U",
            "Step forward and lower the back knee.",
        ),
        exercise(
            "5",
            "Push-up",
            MuscleGroup::Chest,
            "3",
            "8 to 15",
            "https://www.youtube.com/watch?v=IODxDxX7oi4",
            "Body in a straight line, lower until almost touching the floor.",
        ),
        exercise(
            "6",
            "Plank",
            MuscleGroup::Core,
            "3",
            "20 to 60 sec",
            "https://www.youtube.com/watch?v=ASdvN_XEl_c",
            "Keep the body straight and the core braced.",
        ),
        exercise(
            "7",
            "Calf Raise",
            MuscleGroup::Legs,
            "3",
            "15 to 20",
            "https://www.youtube.com/watch?v=-M4-G8p8fmc",
            "Raise the heels as high as possible in a controlled way.",
        ),
    ]
}

pub fn default_students(library: &[Exercise]) -> Vec<Student> {
    vec![Student {
        id: "1".to_string(),
        name: "Carlos Oliveira".to_string(),
        goal: "Hypertrophy".to_string(),
        level: Level::Intermediate.label().to_string(),
        weekly_schedule: vec![WorkoutDay {
            day_name: "Workout A - Lower Body & Shoulders".to_string(),
            muscle_groups: vec![
                MuscleGroup::Legs.label().to_string(),
                MuscleGroup::Shoulders.label().to_string(),
            ],
            exercises: library.to_vec(),
        }],
    }]
}

pub fn default_coach() -> Coach {
    Coach {
        name: "Coach Silva".to_string(),
        photo_url: "https://images.unsplash.com/photo-1594381898411-846e7d193883?auto=format&fit=crop&w=150&q=80".to_string(),
        specialty: "Hypertrophy Specialist".to_string(),
        email: Some("contato@coachsilva.fit".to_string()),
        instagram: Some("@coachsilva_pro".to_string()),
    }
}
