//! In-memory application state for one coach.
//!
//! `CoachDesk` is the single owner of the roster, the exercise library and
//! the coach profile. Every change goes through a `&mut self` method, so a
//! generated plan is integrated in one step or not at all.

mod defaults;

use log::{debug, info, warn};
use rand::Rng;

use crate::errors::GenerationError;
use crate::models::{AiWorkoutParams, Coach, Exercise, ExerciseDraft, MuscleGroup, Student};
use crate::planner::PlanGenerator;

pub use defaults::{default_coach, default_exercises};

const STUDENT_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const STUDENT_ID_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeskStats {
    pub students: usize,
    pub exercises: usize,
}

#[derive(Debug, Clone)]
pub struct CoachDesk {
    coach: Coach,
    students: Vec<Student>,
    exercises: Vec<Exercise>,
    selected_student: Option<String>,
}

fn random_student_id() -> String {
    let mut rng = rand::rng();
    (0..STUDENT_ID_LEN)
        .map(|_| STUDENT_ID_ALPHABET[rng.random_range(0..STUDENT_ID_ALPHABET.len())] as char)
        .collect()
}

impl CoachDesk {
    pub fn new(coach: Coach) -> Self {
        Self {
            coach,
            students: Vec::new(),
            exercises: Vec::new(),
            selected_student: None,
        }
    }

    pub fn with_defaults() -> Self {
        let exercises = defaults::default_exercises();
        let students = defaults::default_students(&exercises);
        debug!(
            "CoachDesk::with_defaults seeded students={} exercises={}",
            students.len(),
            exercises.len()
        );
        Self {
            coach: defaults::default_coach(),
            students,
            exercises,
            selected_student: None,
        }
    }

    pub fn coach(&self) -> &Coach {
        &self.coach
    }

    pub fn update_coach(&mut self, coach: Coach) {
        info!("updating coach profile name='{}'", coach.name);
        self.coach = coach;
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn stats(&self) -> DeskStats {
        DeskStats {
            students: self.students.len(),
            exercises: self.exercises.len(),
        }
    }

    pub fn add_student(&mut self, student: Student) {
        debug!("add_student id={} name='{}'", student.id, student.name);
        self.students.push(student);
    }

    pub fn select_student(&mut self, id: &str) -> bool {
        if self.students.iter().any(|s| s.id == id) {
            self.selected_student = Some(id.to_string());
            true
        } else {
            warn!("select_student: unknown id {}", id);
            false
        }
    }

    pub fn selected_student(&self) -> Option<&Student> {
        let id = self.selected_student.as_deref()?;
        self.students.iter().find(|s| s.id == id)
    }

    fn fresh_student_id(&self) -> String {
        loop {
            let id = random_student_id();
            if !self.students.iter().any(|s| s.id == id) {
                return id;
            }
        }
    }

    /// Asks `generator` for a schedule and, only if it succeeds, enrols a new
    /// student with it and selects them.
    pub async fn generate_student<G: PlanGenerator>(
        &mut self,
        generator: &G,
        params: &AiWorkoutParams,
    ) -> Result<&Student, GenerationError> {
        let schedule = generator.generate(params).await.map_err(|e| {
            warn!("plan generation for '{}' failed: {}", params.name, e);
            e
        })?;
        let student = Student {
            id: self.fresh_student_id(),
            name: params.name.clone(),
            goal: params.goal.clone(),
            level: params.level.clone(),
            weekly_schedule: schedule,
        };
        info!(
            "enrolled generated student id={} days={}",
            student.id,
            student.weekly_schedule.len()
        );
        self.selected_student = Some(student.id.clone());
        self.students.push(student);
        let idx = self.students.len() - 1;
        Ok(&self.students[idx])
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    fn fresh_exercise_id(&self) -> String {
        let mut stamp = chrono::Utc::now().timestamp_millis();
        while self.exercise(&stamp.to_string()).is_some() {
            stamp += 1;
        }
        stamp.to_string()
    }

    /// Replaces the exercise `editing` in place, keeping its id, or appends
    /// a new one when `editing` is `None` or no longer exists.
    pub fn save_exercise(&mut self, draft: ExerciseDraft, editing: Option<&str>) -> &Exercise {
        if let Some(id) = editing {
            if let Some(idx) = self.exercises.iter().position(|e| e.id == id) {
                debug!("save_exercise updating id={}", id);
                self.exercises[idx] = draft.into_exercise(id.to_string());
                return &self.exercises[idx];
            }
            warn!("save_exercise: id {} not found, adding as new", id);
        }
        let id = self.fresh_exercise_id();
        debug!("save_exercise adding id={}", id);
        self.exercises.push(draft.into_exercise(id));
        let idx = self.exercises.len() - 1;
        &self.exercises[idx]
    }

    /// Library exercises whose free-text group matches `group`.
    pub fn exercises_in_group(&self, group: MuscleGroup) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| e.muscle_group_kind() == Some(group))
            .collect()
    }
}

impl Default for CoachDesk {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutDay;
    use std::cell::Cell;

    struct FakePlanner {
        reply: Option<Vec<WorkoutDay>>,
        calls: Cell<usize>,
    }

    impl FakePlanner {
        fn ok(days: Vec<WorkoutDay>) -> Self {
            Self {
                reply: Some(days),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: Cell::new(0),
            }
        }
    }

    impl PlanGenerator for FakePlanner {
        async fn generate(
            &self,
            _params: &AiWorkoutParams,
        ) -> Result<Vec<WorkoutDay>, GenerationError> {
            self.calls.set(self.calls.get() + 1);
            self.reply
                .clone()
                .ok_or_else(|| GenerationError::GenerationFailed("service down".into()))
        }
    }

    fn params() -> AiWorkoutParams {
        AiWorkoutParams {
            name: "Beatriz".into(),
            goal: "Fat loss".into(),
            level: "Beginner".into(),
            days_per_week: 3,
        }
    }

    fn one_day() -> Vec<WorkoutDay> {
        vec![WorkoutDay {
            day_name: "Workout A".into(),
            muscle_groups: vec!["Legs".into()],
            exercises: default_exercises()[1..2].to_vec(),
        }]
    }

    #[test]
    fn defaults_seed_library_and_roster() {
        let desk = CoachDesk::with_defaults();
        assert_eq!(
            desk.stats(),
            DeskStats {
                students: 1,
                exercises: 6
            }
        );
        assert_eq!(desk.students()[0].name, "Carlos Oliveira");
        assert_eq!(desk.students()[0].weekly_schedule[0].exercises, desk.exercises());
        assert_eq!(desk.coach().name, "Coach Silva");
        assert!(desk.selected_student().is_none());
    }

    #[tokio::test]
    async fn generated_student_is_enrolled_and_selected() {
        let mut desk = CoachDesk::with_defaults();
        let planner = FakePlanner::ok(one_day());
        let input = params();

        let student = desk.generate_student(&planner, &input).await.unwrap().clone();
        assert_eq!(student.name, "Beatriz");
        assert_eq!(student.goal, "Fat loss");
        assert_eq!(student.level, "Beginner");
        assert_eq!(student.weekly_schedule, one_day());
        assert_eq!(student.id.len(), STUDENT_ID_LEN);
        assert!(student.id.bytes().all(|b| STUDENT_ID_ALPHABET.contains(&b)));

        assert_eq!(desk.stats().students, 2);
        assert_eq!(desk.selected_student(), Some(&student));
        assert_eq!(planner.calls.get(), 1);
    }

    #[tokio::test]
    async fn failed_generation_leaves_state_untouched() {
        let mut desk = CoachDesk::with_defaults();
        assert!(desk.select_student("1"));
        let before = desk.students().to_vec();

        let planner = FakePlanner::failing();
        let err = desk.generate_student(&planner, &params()).await.unwrap_err();
        assert!(matches!(err, GenerationError::GenerationFailed(_)));

        assert_eq!(desk.students(), before.as_slice());
        assert_eq!(desk.selected_student().map(|s| s.id.as_str()), Some("1"));
        assert_eq!(planner.calls.get(), 1);
    }

    #[test]
    fn select_unknown_student_keeps_selection() {
        let mut desk = CoachDesk::with_defaults();
        assert!(desk.select_student("1"));
        assert!(!desk.select_student("nope"));
        assert_eq!(desk.selected_student().map(|s| s.name.as_str()), Some("Carlos Oliveira"));
    }

    #[test]
    fn manually_added_student_can_be_selected() {
        let mut desk = CoachDesk::new(default_coach());
        assert_eq!(desk.stats().students, 0);
        desk.add_student(Student {
            id: "m1".into(),
            name: "Diego".into(),
            goal: "Conditioning".into(),
            level: "Advanced".into(),
            weekly_schedule: vec![],
        });
        assert!(desk.select_student("m1"));
        assert_eq!(desk.selected_student().map(|s| s.goal.as_str()), Some("Conditioning"));
    }

    #[test]
    fn save_exercise_edits_in_place() {
        let mut desk = CoachDesk::with_defaults();
        let mut draft = ExerciseDraft::from_exercise(desk.exercise("5").unwrap());
        draft.reps = "10 to 20".into();
        let saved = desk.save_exercise(draft, Some("5")).clone();

        assert_eq!(saved.id, "5");
        assert_eq!(saved.reps, "10 to 20");
        assert_eq!(saved.name, "Push-up");
        assert_eq!(desk.stats().exercises, 6);
        assert_eq!(desk.exercises()[3], saved);
    }

    #[test]
    fn save_exercise_appends_with_unique_ids() {
        let mut desk = CoachDesk::new(default_coach());
        let a = desk
            .save_exercise(
                ExerciseDraft {
                    name: "Deadlift".into(),
                    muscle_group: MuscleGroup::Back,
                    ..Default::default()
                },
                None,
            )
            .id
            .clone();
        let b = desk
            .save_exercise(
                ExerciseDraft {
                    name: "Barbell Row".into(),
                    muscle_group: MuscleGroup::Back,
                    ..Default::default()
                },
                Some("missing"),
            )
            .id
            .clone();
        assert_ne!(a, b);
        assert_eq!(desk.stats().exercises, 2);
        assert_eq!(desk.exercises()[1].name, "Barbell Row");
    }

    #[test]
    fn group_filter_uses_best_effort_matching() {
        let mut desk = CoachDesk::with_defaults();
        let legs: Vec<&str> = desk
            .exercises_in_group(MuscleGroup::Legs)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(legs, vec!["Back Squat", "Dumbbell Lunge", "Calf Raise"]);
        assert!(desk.exercises_in_group(MuscleGroup::Biceps).is_empty());

        desk.update_coach(Coach {
            name: "Coach Lima".into(),
            email: None,
            ..default_coach()
        });
        assert_eq!(desk.coach().name, "Coach Lima");
        assert_eq!(desk.coach().email, None);
    }
}
