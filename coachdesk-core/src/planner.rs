//! AI generated weekly workout plans.

use log::{debug, error, info};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::errors::GenerationError;
use crate::llm::{CompletionRequest, LlmInterface, parse_json};
use crate::models::{AiWorkoutParams, Exercise, WorkoutDay, deserialize_sets};

/// Produces a weekly schedule for a student. Implemented over an LLM by
/// [`LlmPlanRequester`]; tests substitute deterministic fakes.
#[allow(async_fn_in_trait)]
pub trait PlanGenerator {
    async fn generate(
        &self,
        params: &AiWorkoutParams,
    ) -> Result<Vec<WorkoutDay>, GenerationError>;
}

/// Output contract declared to the remote service.
pub fn plan_response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "dayName": { "type": "STRING", "description": "e.g. Workout A - Upper body" },
                "muscleGroups": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                },
                "exercises": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "id": { "type": "STRING" },
                            "name": { "type": "STRING" },
                            "sets": { "type": "NUMBER" },
                            "reps": { "type": "STRING" },
                            "description": { "type": "STRING" },
                            "muscleGroup": { "type": "STRING" },
                            "videoUrl": { "type": "STRING" },
                            "imageUrl": { "type": "STRING" }
                        },
                        "required": ["id", "name", "sets", "reps", "muscleGroup", "videoUrl"]
                    }
                }
            },
            "required": ["dayName", "muscleGroups", "exercises"]
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlannedExercise {
    id: String,
    name: String,
    #[serde(deserialize_with = "deserialize_sets")]
    sets: String,
    reps: String,
    muscle_group: String,
    video_url: String,
    description: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlannedDay {
    day_name: String,
    muscle_groups: Vec<String>,
    exercises: Vec<PlannedExercise>,
}

impl From<PlannedExercise> for Exercise {
    fn from(p: PlannedExercise) -> Self {
        Exercise {
            id: p.id,
            name: p.name,
            muscle_group: p.muscle_group,
            sets: p.sets,
            reps: p.reps,
            video_url: Some(p.video_url),
            image_url: p.image_url,
            description: p.description,
        }
    }
}

impl From<PlannedDay> for WorkoutDay {
    fn from(p: PlannedDay) -> Self {
        WorkoutDay {
            day_name: p.day_name,
            muscle_groups: p.muscle_groups,
            exercises: p.exercises.into_iter().map(Exercise::from).collect(),
        }
    }
}

/// Parses a raw service reply. The whole plan is rejected if any day or
/// exercise violates the schema.
pub fn parse_plan(raw: &str) -> Result<Vec<WorkoutDay>, GenerationError> {
    let days: Vec<PlannedDay> = parse_json(raw)?;
    Ok(days.into_iter().map(WorkoutDay::from).collect())
}

pub struct PlanPromptBuilder {
    schema: Value,
}

impl Default for PlanPromptBuilder {
    fn default() -> Self {
        Self {
            schema: plan_response_schema(),
        }
    }
}

impl PlanPromptBuilder {
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn system_plan_prompt(&self) -> String {
        let schema = serde_json::to_string(&self.schema).unwrap_or_default();
        format!(
            "You are a professional strength coach writing weekly training programs. \
             Respond with a single JSON array that matches this schema exactly:\n{}\n\
             Never include explanations, markdown or any text outside the JSON.",
            schema
        )
    }

    pub fn user_plan_prompt(&self, params: &AiWorkoutParams) -> String {
        format!(
            r#"Create a professional weekly workout plan.
Student: {} | Goal: {} | Level: {} | Frequency: {} days per week.

CRITICAL RULES:
1. Use web search to find high-quality YouTube links, preferring verified strength-training channels.
2. Every exercise MUST have a 'videoUrl' field with a direct YouTube link. It is used to build the exercise cover image.
3. Leave 'imageUrl' empty, or use an Unsplash image if the video has no good thumbnail.
4. Structure the plan by days (Workout A, B, C...).
5. Return ONLY the JSON."#,
            params.name, params.goal, params.level, params.days_per_week
        )
    }
}

/// Requests plans from an LLM backend in a single round trip. Failures are
/// never retried here; callers re-invoke if they want another attempt.
pub struct LlmPlanRequester {
    llm: LlmInterface,
    prompts: PlanPromptBuilder,
}

impl LlmPlanRequester {
    pub fn new(llm: LlmInterface) -> Self {
        Self {
            llm,
            prompts: PlanPromptBuilder::default(),
        }
    }

    pub fn backend(&self) -> String {
        self.llm.describe()
    }
}

impl PlanGenerator for LlmPlanRequester {
    async fn generate(
        &self,
        params: &AiWorkoutParams,
    ) -> Result<Vec<WorkoutDay>, GenerationError> {
        debug!(
            "generate called student='{}' days_per_week={}",
            params.name, params.days_per_week
        );
        let system = self.prompts.system_plan_prompt();
        let user = self.prompts.user_plan_prompt(params);
        let request = CompletionRequest::new(&system, &user)
            .with_schema(self.prompts.schema())
            .with_web_search(true);

        let planned: Vec<PlannedDay> = self.llm.call_json(&request).await.map_err(|e| {
            error!("workout plan request failed: {}", e);
            GenerationError::from(e)
        })?;
        let days: Vec<WorkoutDay> = planned.into_iter().map(WorkoutDay::from).collect();
        info!(
            "generate returned {} days, {} exercises",
            days.len(),
            days.iter().map(|d| d.exercises.len()).sum::<usize>()
        );
        Ok(days)
    }
}
