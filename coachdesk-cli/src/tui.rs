use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use coachdesk::models::{AiWorkoutParams, Coach, ExerciseDraft, Level};
use coachdesk::thumbnail::display_image;
use coachdesk::{CoachDesk, LlmPlanRequester};

const NORMAL_HELP: &str =
    "1-5: tabs | j/k: navigate | n: new exercise | e: edit | g: generate | s: profile | q: quit";
const FORM_HELP: &str = "Tab/Up/Down: field | Left/Right: change | Enter: submit | Esc: cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Dashboard,
    Students,
    Exercises,
    Generator,
    Settings,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Students,
        Tab::Exercises,
        Tab::Generator,
        Tab::Settings,
    ];

    fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "1 Dashboard",
            Tab::Students => "2 Students",
            Tab::Exercises => "3 Exercises",
            Tab::Generator => "4 AI Generator",
            Tab::Settings => "5 Settings",
        }
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Generator,
    Exercise,
    Coach,
}

struct GeneratorForm {
    name: String,
    goal: String,
    level: Level,
    days: u8,
    focus: usize,
}

impl GeneratorForm {
    const FIELDS: usize = 4;

    fn new() -> Self {
        Self {
            name: String::new(),
            goal: "Hypertrophy".to_string(),
            level: Level::Intermediate,
            days: 3,
            focus: 0,
        }
    }

    fn text_field(&mut self) -> Option<&mut String> {
        match self.focus {
            0 => Some(&mut self.name),
            1 => Some(&mut self.goal),
            _ => None,
        }
    }

    fn adjust(&mut self, forward: bool) {
        match self.focus {
            2 => {
                self.level = if forward {
                    self.level.next()
                } else {
                    self.level.next().next()
                }
            }
            3 => {
                self.days = if forward {
                    (self.days % 7) + 1
                } else if self.days <= 1 {
                    7
                } else {
                    self.days - 1
                }
            }
            _ => {}
        }
    }

    fn params(&self) -> AiWorkoutParams {
        AiWorkoutParams {
            name: self.name.trim().to_string(),
            goal: self.goal.trim().to_string(),
            level: self.level.label().to_string(),
            days_per_week: self.days,
        }
    }

    fn lines(&self, active: bool) -> Vec<Line<'static>> {
        let values = [
            ("Student name", self.name.clone()),
            ("Goal", self.goal.clone()),
            ("Level", format!("< {} >", self.level)),
            ("Days per week", format!("< {} >", self.days)),
        ];
        values
            .into_iter()
            .enumerate()
            .map(|(idx, (label, value))| {
                let marker = if active && idx == self.focus { ">" } else { " " };
                Line::from(format!("{} {:<14} {}", marker, label, value))
            })
            .collect()
    }
}

struct ExerciseForm {
    draft: ExerciseDraft,
    editing: Option<String>,
    focus: usize,
}

impl ExerciseForm {
    const FIELDS: usize = 7;

    fn text_field(&mut self) -> Option<&mut String> {
        match self.focus {
            0 => Some(&mut self.draft.name),
            2 => Some(&mut self.draft.sets),
            3 => Some(&mut self.draft.reps),
            4 => Some(&mut self.draft.video_url),
            5 => Some(&mut self.draft.image_url),
            6 => Some(&mut self.draft.description),
            _ => None,
        }
    }

    fn adjust(&mut self) {
        if self.focus == 1 {
            self.draft.muscle_group = self.draft.muscle_group.next();
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let d = &self.draft;
        let values = [
            ("Name", d.name.clone()),
            ("Muscle group", format!("< {} >", d.muscle_group)),
            ("Sets", d.sets.clone()),
            ("Reps", d.reps.clone()),
            ("Video URL", d.video_url.clone()),
            ("Image URL", d.image_url.clone()),
            ("Description", d.description.clone()),
        ];
        values
            .into_iter()
            .enumerate()
            .map(|(idx, (label, value))| {
                let marker = if idx == self.focus { ">" } else { " " };
                Line::from(format!("{} {:<13} {}", marker, label, value))
            })
            .collect()
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Edits the coach profile shown on the dashboard and in the header.
struct CoachForm {
    name: String,
    specialty: String,
    email: String,
    instagram: String,
    photo_url: String,
    focus: usize,
}

impl CoachForm {
    const FIELDS: usize = 5;

    fn from_coach(coach: &Coach) -> Self {
        Self {
            name: coach.name.clone(),
            specialty: coach.specialty.clone(),
            email: coach.email.clone().unwrap_or_default(),
            instagram: coach.instagram.clone().unwrap_or_default(),
            photo_url: coach.photo_url.clone(),
            focus: 0,
        }
    }

    fn text_field(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.name,
            1 => &mut self.specialty,
            2 => &mut self.email,
            3 => &mut self.instagram,
            _ => &mut self.photo_url,
        }
    }

    fn to_coach(&self) -> Coach {
        Coach {
            name: self.name.trim().to_string(),
            photo_url: self.photo_url.trim().to_string(),
            specialty: self.specialty.trim().to_string(),
            email: optional(&self.email),
            instagram: optional(&self.instagram),
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let values = [
            ("Name", &self.name),
            ("Specialty", &self.specialty),
            ("Email", &self.email),
            ("Instagram", &self.instagram),
            ("Photo URL", &self.photo_url),
        ];
        values
            .into_iter()
            .enumerate()
            .map(|(idx, (label, value))| {
                let marker = if idx == self.focus { ">" } else { " " };
                Line::from(format!("{} {:<10} {}", marker, label, value))
            })
            .collect()
    }
}

struct App {
    desk: CoachDesk,
    requester: Result<LlmPlanRequester>,
    tab: Tab,
    student_idx: usize,
    exercise_idx: usize,
    status_message: String,
    input_mode: InputMode,
    generator: GeneratorForm,
    exercise_form: Option<ExerciseForm>,
    coach_form: Option<CoachForm>,
    pending_generation: bool,
}

impl App {
    fn new(desk: CoachDesk, requester: Result<LlmPlanRequester>) -> Self {
        Self {
            desk,
            requester,
            tab: Tab::Exercises,
            student_idx: 0,
            exercise_idx: 0,
            status_message: NORMAL_HELP.to_string(),
            input_mode: InputMode::Normal,
            generator: GeneratorForm::new(),
            exercise_form: None,
            coach_form: None,
            pending_generation: false,
        }
    }

    fn list_len(&self) -> usize {
        match self.tab {
            Tab::Students => self.desk.students().len(),
            Tab::Exercises => self.desk.exercises().len(),
            _ => 0,
        }
    }

    fn cursor(&mut self) -> Option<&mut usize> {
        match self.tab {
            Tab::Students => Some(&mut self.student_idx),
            Tab::Exercises => Some(&mut self.exercise_idx),
            _ => None,
        }
    }

    fn scroll_down(&mut self) {
        let len = self.list_len();
        if let Some(idx) = self.cursor() {
            if len > 0 && *idx < len - 1 {
                *idx += 1;
            }
        }
        self.sync_selection();
    }

    fn scroll_up(&mut self) {
        if let Some(idx) = self.cursor() {
            if *idx > 0 {
                *idx -= 1;
            }
        }
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        if self.tab == Tab::Students {
            if let Some(id) = self.desk.students().get(self.student_idx).map(|s| s.id.clone()) {
                self.desk.select_student(&id);
            }
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.sync_selection();
    }

    fn open_exercise_form(&mut self, edit: bool) {
        let form = if edit {
            let Some(ex) = self.desk.exercises().get(self.exercise_idx) else {
                self.status_message = "No exercise selected".to_string();
                return;
            };
            ExerciseForm {
                draft: ExerciseDraft::from_exercise(ex),
                editing: Some(ex.id.clone()),
                focus: 0,
            }
        } else {
            ExerciseForm {
                draft: ExerciseDraft::default(),
                editing: None,
                focus: 0,
            }
        };
        self.tab = Tab::Exercises;
        self.exercise_form = Some(form);
        self.input_mode = InputMode::Exercise;
        self.status_message = FORM_HELP.to_string();
    }

    fn save_exercise_form(&mut self) {
        let Some(form) = self.exercise_form.take() else {
            return;
        };
        if form.draft.name.trim().is_empty() {
            self.status_message = "Exercise name is required".to_string();
            self.exercise_form = Some(form);
            return;
        }
        let editing = form.editing.clone();
        let saved = self.desk.save_exercise(form.draft, editing.as_deref());
        let (id, name) = (saved.id.clone(), saved.name.clone());
        if let Some(idx) = self.desk.exercises().iter().position(|e| e.id == id) {
            self.exercise_idx = idx;
        }
        self.input_mode = InputMode::Normal;
        self.status_message = format!("Saved exercise: {}", name);
    }

    fn open_coach_form(&mut self) {
        self.tab = Tab::Settings;
        self.coach_form = Some(CoachForm::from_coach(self.desk.coach()));
        self.input_mode = InputMode::Coach;
        self.status_message = FORM_HELP.to_string();
    }

    fn save_coach_form(&mut self) {
        let Some(form) = self.coach_form.as_ref() else {
            return;
        };
        if form.name.trim().is_empty() {
            self.status_message = "Coach name is required".to_string();
            return;
        }
        let coach = form.to_coach();
        self.coach_form = None;
        self.input_mode = InputMode::Normal;
        self.status_message = format!("Profile saved for {}", coach.name);
        self.desk.update_coach(coach);
    }

    fn submit_generator(&mut self) {
        if self.generator.name.trim().is_empty() {
            self.status_message = "Student name is required".to_string();
            return;
        }
        self.status_message = format!(
            "Generating a {}-day plan for {}...",
            self.generator.days,
            self.generator.name.trim()
        );
        self.pending_generation = true;
    }

    async fn run_generation(&mut self) {
        self.pending_generation = false;
        let requester = match &self.requester {
            Ok(r) => r,
            Err(e) => {
                self.status_message = format!("AI service not configured: {}", e);
                return;
            }
        };
        let params = self.generator.params();
        match self.desk.generate_student(requester, &params).await {
            Ok(student) => {
                let (id, days) = (student.id.clone(), student.weekly_schedule.len());
                self.student_idx = self
                    .desk
                    .students()
                    .iter()
                    .position(|s| s.id == id)
                    .unwrap_or(0);
                self.generator = GeneratorForm::new();
                self.input_mode = InputMode::Normal;
                self.tab = Tab::Students;
                self.status_message = format!("Plan ready for {}: {} days", params.name, days);
            }
            Err(_) => {
                self.status_message =
                    "Error generating the workout. Press Enter to try again.".to_string();
            }
        }
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.input_mode {
            InputMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Char('Q') => return true,
                KeyCode::Char('1') => self.switch_tab(Tab::Dashboard),
                KeyCode::Char('2') => self.switch_tab(Tab::Students),
                KeyCode::Char('3') => self.switch_tab(Tab::Exercises),
                KeyCode::Char('4') => self.switch_tab(Tab::Generator),
                KeyCode::Char('5') => self.switch_tab(Tab::Settings),
                KeyCode::Char('j') | KeyCode::Down => self.scroll_down(),
                KeyCode::Char('k') | KeyCode::Up => self.scroll_up(),
                KeyCode::Char('n') | KeyCode::Char('N') => self.open_exercise_form(false),
                KeyCode::Char('e') | KeyCode::Char('E') if self.tab == Tab::Exercises => {
                    self.open_exercise_form(true)
                }
                KeyCode::Char('g') | KeyCode::Char('G') => {
                    self.tab = Tab::Generator;
                    self.input_mode = InputMode::Generator;
                    self.status_message = FORM_HELP.to_string();
                }
                KeyCode::Char('s') | KeyCode::Char('S') => self.open_coach_form(),
                _ => {}
            },
            InputMode::Generator => match code {
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    self.status_message = NORMAL_HELP.to_string();
                }
                KeyCode::Enter => self.submit_generator(),
                KeyCode::Tab | KeyCode::Down => {
                    self.generator.focus = (self.generator.focus + 1) % GeneratorForm::FIELDS
                }
                KeyCode::Up => {
                    self.generator.focus =
                        (self.generator.focus + GeneratorForm::FIELDS - 1) % GeneratorForm::FIELDS
                }
                KeyCode::Left => self.generator.adjust(false),
                KeyCode::Right => self.generator.adjust(true),
                KeyCode::Backspace => {
                    if let Some(field) = self.generator.text_field() {
                        field.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(field) = self.generator.text_field() {
                        field.push(c);
                    }
                }
                _ => {}
            },
            InputMode::Exercise => {
                let Some(form) = self.exercise_form.as_mut() else {
                    self.input_mode = InputMode::Normal;
                    return false;
                };
                match code {
                    KeyCode::Esc => {
                        self.exercise_form = None;
                        self.input_mode = InputMode::Normal;
                        self.status_message = NORMAL_HELP.to_string();
                    }
                    KeyCode::Enter => self.save_exercise_form(),
                    KeyCode::Tab | KeyCode::Down => {
                        form.focus = (form.focus + 1) % ExerciseForm::FIELDS
                    }
                    KeyCode::Up => {
                        form.focus = (form.focus + ExerciseForm::FIELDS - 1) % ExerciseForm::FIELDS
                    }
                    KeyCode::Left | KeyCode::Right => form.adjust(),
                    KeyCode::Backspace => {
                        if let Some(field) = form.text_field() {
                            field.pop();
                        }
                    }
                    KeyCode::Char(c) => {
                        if let Some(field) = form.text_field() {
                            field.push(c);
                        }
                    }
                    _ => {}
                }
            }
            InputMode::Coach => {
                let Some(form) = self.coach_form.as_mut() else {
                    self.input_mode = InputMode::Normal;
                    return false;
                };
                match code {
                    KeyCode::Esc => {
                        self.coach_form = None;
                        self.input_mode = InputMode::Normal;
                        self.status_message = NORMAL_HELP.to_string();
                    }
                    KeyCode::Enter => self.save_coach_form(),
                    KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % CoachForm::FIELDS,
                    KeyCode::Up => {
                        form.focus = (form.focus + CoachForm::FIELDS - 1) % CoachForm::FIELDS
                    }
                    KeyCode::Backspace => {
                        form.text_field().pop();
                    }
                    KeyCode::Char(c) => form.text_field().push(c),
                    _ => {}
                }
            }
        }
        false
    }
}

fn highlight() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn render_dashboard(app: &App, frame: &mut Frame, area: Rect) {
    let coach = app.desk.coach();
    let stats = app.desk.stats();
    let mut lines = vec![
        Line::from(format!("Welcome, {}", coach.name)),
        Line::from(coach.specialty.clone()),
        Line::from(""),
        Line::from(format!("Students on the platform: {}", stats.students)),
        Line::from(format!("Exercises in the library: {}", stats.exercises)),
        Line::from(""),
    ];
    if let Some(email) = &coach.email {
        lines.push(Line::from(format!("Email: {}", email)));
    }
    if let Some(handle) = &coach.instagram {
        lines.push(Line::from(format!("Instagram: {}", handle)));
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Dashboard"))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_students(app: &App, frame: &mut Frame, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let items: Vec<ListItem> = app
        .desk
        .students()
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let style = if idx == app.student_idx {
                highlight()
            } else {
                Style::default()
            };
            ListItem::new(format!("{} - {} / {}", s.name, s.goal, s.level)).style(style)
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Students ({} total)", app.desk.students().len())),
    );
    let mut state = ListState::default();
    state.select(Some(app.student_idx));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let lines: Vec<Line> = match app.desk.selected_student() {
        None => vec![Line::from("Select a student with j/k to see the weekly plan.")],
        Some(student) => {
            let mut lines = vec![
                Line::from(format!("{} ({})", student.name, student.goal)),
                Line::from(""),
            ];
            for day in &student.weekly_schedule {
                lines.push(Line::from(format!(
                    "== {} [{}]",
                    day.day_name,
                    day.muscle_groups.join(", ")
                )));
                for (i, ex) in day.exercises.iter().enumerate() {
                    lines.push(Line::from(format!(
                        "  {}. {} - {} sets x {}",
                        i + 1,
                        ex.name,
                        ex.sets,
                        ex.reps
                    )));
                    if let Some(video) = &ex.video_url {
                        lines.push(Line::from(format!("     {}", video)));
                    }
                }
                lines.push(Line::from(""));
            }
            lines
        }
    };
    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Weekly plan"))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, chunks[1]);
}

fn render_exercises(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(form) = &app.exercise_form {
        let title = if form.editing.is_some() {
            "Edit Exercise"
        } else {
            "New Exercise"
        };
        let widget = Paragraph::new(form.lines())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(widget, area);
        return;
    }

    if app.desk.exercises().is_empty() {
        let empty = Paragraph::new("No exercises yet.\nPress 'n' to add one!")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Exercises"));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .desk
        .exercises()
        .iter()
        .enumerate()
        .map(|(idx, ex)| {
            let cover = display_image(ex).unwrap_or_else(|| "(no cover)".to_string());
            let content = format!(
                "{} [{}] {} sets x {} | {}",
                ex.name, ex.muscle_group, ex.sets, ex.reps, cover
            );
            let style = if idx == app.exercise_idx {
                highlight()
            } else {
                Style::default()
            };
            ListItem::new(content).style(style)
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Exercises ({} total)", app.desk.exercises().len())),
    );
    let mut state = ListState::default();
    state.select(Some(app.exercise_idx));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_generator(app: &App, frame: &mut Frame, area: Rect) {
    let active = matches!(app.input_mode, InputMode::Generator);
    let mut lines = app.generator.lines(active);
    lines.push(Line::from(""));
    match &app.requester {
        Ok(r) => lines.push(Line::from(format!("Backend: {}", r.backend()))),
        Err(e) => lines.push(Line::from(format!("Backend unavailable: {}", e))),
    }
    if !active {
        lines.push(Line::from("Press 'g' to fill in the form."));
    }
    let style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let widget = Paragraph::new(lines)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("AI Workout Generator"))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_settings(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(form) = &app.coach_form {
        let widget = Paragraph::new(form.lines())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Edit Profile"));
        frame.render_widget(widget, area);
        return;
    }
    let coach = app.desk.coach();
    let lines = vec![
        Line::from(format!("Name:      {}", coach.name)),
        Line::from(format!("Specialty: {}", coach.specialty)),
        Line::from(format!("Email:     {}", coach.email.as_deref().unwrap_or("-"))),
        Line::from(format!("Instagram: {}", coach.instagram.as_deref().unwrap_or("-"))),
        Line::from(format!("Photo:     {}", coach.photo_url)),
        Line::from(""),
        Line::from("Press 's' to edit the profile."),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Coach Profile"))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .split(frame.area());

    let header = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("CoachDesk - {}", app.desk.coach().name)),
        );
    frame.render_widget(header, chunks[0]);

    match app.tab {
        Tab::Dashboard => render_dashboard(app, frame, chunks[1]),
        Tab::Students => render_students(app, frame, chunks[1]),
        Tab::Exercises => render_exercises(app, frame, chunks[1]),
        Tab::Generator => render_generator(app, frame, chunks[1]),
        Tab::Settings => render_settings(app, frame, chunks[1]),
    }

    let footer = Paragraph::new(app.status_message.as_str())
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(footer, chunks[2]);
}

pub async fn run(
    mut terminal: DefaultTerminal,
    desk: CoachDesk,
    requester: Result<LlmPlanRequester>,
) -> Result<()> {
    let mut app = App::new(desk, requester);

    loop {
        terminal.draw(|frame| render(&app, frame))?;

        // The status line has been drawn; now block on the service.
        if app.pending_generation {
            app.run_generation().await;
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}
