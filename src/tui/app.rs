#![forbid(unsafe_code)]

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, TableState, Tabs, Wrap};
use tokio::task::JoinHandle;

use crate::config::{self, Config};
use crate::export::{self, ExportFormat, ExportReport};
use crate::notify::{self, Notifier};
use crate::task::draft::TaskDraft;
use crate::task::model::{Filter, Task, TaskId, format_date, parse_optional_date};
use crate::task::storage::{FileSlot, Slot};
use crate::task::store::TaskStore;
use crate::tui::{self, view};
use crate::voice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    NewTask,
    Help,
}

#[derive(Debug, Clone, Default)]
struct TextInput {
    text: String,
    // In chars, not bytes.
    cursor: usize,
}

impl TextInput {
    fn new(initial: impl Into<String>) -> Self {
        let text = initial.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn as_str(&self) -> &str {
        &self.text
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
    }

    fn delete(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
    }

    fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Text,
    Priority,
    Date,
    Category,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Text => FormField::Priority,
            FormField::Priority => FormField::Date,
            FormField::Date => FormField::Category,
            FormField::Category => FormField::Text,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Text => FormField::Category,
            FormField::Priority => FormField::Text,
            FormField::Date => FormField::Priority,
            FormField::Category => FormField::Date,
        }
    }
}

/// Entry form. Stays around while hidden, so a half-typed task survives.
#[derive(Debug, Clone)]
struct NewTaskForm {
    draft: TaskDraft,
    text: TextInput,
    date: TextInput,
    field: FormField,
    error: Option<String>,
}

impl NewTaskForm {
    fn new() -> Self {
        Self {
            draft: TaskDraft::default(),
            text: TextInput::default(),
            date: TextInput::default(),
            field: FormField::Text,
            error: None,
        }
    }

    fn sync_inputs(&mut self) {
        self.text = TextInput::new(self.draft.text.clone());
        self.date = TextInput::new(self.draft.date.map(format_date).unwrap_or_default());
    }
}

#[derive(Debug, Clone)]
struct ConfirmDialog {
    title: String,
    message: String,
    action: ConfirmAction,
}

#[derive(Debug, Clone, Copy)]
enum ConfirmAction {
    Delete { id: TaskId },
    ClearCompleted,
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    until: Instant,
}

impl Toast {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            until: Instant::now() + Duration::from_secs(3),
        }
    }
}

enum JobResult {
    Exported(ExportReport),
    Transcript(Option<String>),
}

struct PendingJob {
    label: &'static str,
    handle: JoinHandle<anyhow::Result<JobResult>>,
}

struct AppState<S: Slot> {
    cfg: Config,
    store: TaskStore<S>,
    notifier: Box<dyn Notifier>,

    mode: Mode,
    filter: Filter,
    visible: Vec<usize>,
    table_state: TableState,

    form: NewTaskForm,
    confirm: Option<ConfirmDialog>,
    jobs: Vec<PendingJob>,

    toast: Option<Toast>,
    last_error: Option<String>,
    should_quit: bool,
}

impl<S: Slot> AppState<S> {
    fn new(cfg: Config, store: TaskStore<S>, notifier: Box<dyn Notifier>) -> Self {
        let filter = cfg.ui.default_filter;
        let mut app = Self {
            cfg,
            store,
            notifier,
            mode: Mode::Normal,
            filter,
            visible: Vec::new(),
            table_state: TableState::default(),
            form: NewTaskForm::new(),
            confirm: None,
            jobs: Vec::new(),
            toast: None,
            last_error: None,
            should_quit: false,
        };
        app.refresh_view();
        app
    }

    fn refresh_view(&mut self) {
        self.visible = self.store.list().view_positions(self.filter);
        if self.visible.is_empty() {
            self.table_state.select(None);
            return;
        }
        let idx = self
            .table_state
            .selected()
            .unwrap_or(0)
            .min(self.visible.len() - 1);
        self.table_state.select(Some(idx));
    }

    fn selected_task(&self) -> Option<&Task> {
        let sel = self.table_state.selected()?;
        let pos = *self.visible.get(sel)?;
        self.store.tasks().get(pos)
    }

    fn move_selection(&mut self, delta: i64) {
        if self.visible.is_empty() {
            return;
        }
        let cur = i64::try_from(self.table_state.selected().unwrap_or(0)).unwrap_or(0);
        let max = i64::try_from(self.visible.len() - 1).unwrap_or(0);
        let next = usize::try_from((cur + delta).clamp(0, max)).unwrap_or(0);
        self.table_state.select(Some(next));
    }

    fn set_filter(&mut self, filter: Filter) {
        if self.filter != filter {
            self.filter = filter;
            self.table_state.select(Some(0));
        }
        self.refresh_view();
    }

    fn record<T>(&mut self, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            }
            Err(e) => {
                tracing::warn!(error = %e, "operation failed");
                self.last_error = Some(format!("{e:#}"));
                None
            }
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        let res = self.store.toggle_completed(id);
        self.record(res);
        self.refresh_view();
    }

    fn request_delete_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id;
        if !self.cfg.ui.confirm_delete {
            self.delete(id);
            return;
        }
        self.confirm = Some(ConfirmDialog {
            title: "Delete task".to_owned(),
            message: format!("Delete \"{}\"?", task.text),
            action: ConfirmAction::Delete { id },
        });
    }

    fn delete(&mut self, id: TaskId) {
        let res = self.store.remove(id);
        self.record(res);
        self.refresh_view();
    }

    fn request_clear_completed(&mut self) {
        let done = self.store.list().count(Filter::Completed);
        if done == 0 {
            self.toast = Some(Toast::info("No completed tasks"));
            return;
        }
        self.confirm = Some(ConfirmDialog {
            title: "Clear completed".to_owned(),
            message: format!("Remove {done} completed task(s)?"),
            action: ConfirmAction::ClearCompleted,
        });
    }

    fn clear_completed(&mut self) {
        let res = self.store.clear_completed();
        if let Some(n) = self.record(res) {
            self.toast = Some(Toast::info(format!("Removed {n} completed task(s)")));
        }
        self.refresh_view();
    }

    /// Moves the selected task past its visible neighbour. Positions are
    /// translated to the full list so hidden tasks keep their place.
    fn move_selected(&mut self, delta: i64) {
        let Some(sel) = self.table_state.selected() else {
            return;
        };
        let Ok(target) = usize::try_from(i64::try_from(sel).unwrap_or(0) + delta) else {
            return;
        };
        let (Some(&from), Some(&to)) = (self.visible.get(sel), self.visible.get(target)) else {
            return;
        };
        let res = self.store.reorder(from, Some(to));
        if self.record(res).is_some() {
            self.table_state.select(Some(target));
        }
        self.refresh_view();
    }

    fn open_form(&mut self) {
        self.form.error = None;
        self.form.field = FormField::Text;
        self.mode = Mode::NewTask;
    }

    fn submit_form(&mut self) {
        let form = &mut self.form;
        form.error = None;
        let date = match parse_optional_date(form.date.as_str()) {
            Ok(d) => d,
            Err(e) => {
                form.error = Some(e.to_string());
                form.field = FormField::Date;
                return;
            }
        };
        form.draft.text = form.text.as_str().to_owned();
        form.draft.date = date;

        match form.draft.submit(&mut self.store) {
            Ok(Some(task)) => {
                form.sync_inputs();
                notify::task_added(self.notifier.as_ref(), &task);
                self.toast = Some(Toast::info(format!("Added \"{}\"", task.text)));
                self.mode = Mode::Normal;
                self.table_state.select(Some(0));
                self.refresh_view();
            }
            // Blank text: nothing to add.
            Ok(None) => {}
            Err(e) => form.error = Some(format!("{e:#}")),
        }
    }

    fn start_export(&mut self, format: ExportFormat) {
        // CSV carries every task; PDF mirrors what is on screen.
        let filter = match format {
            ExportFormat::Csv => Filter::All,
            ExportFormat::Pdf => self.filter,
        };
        let snapshot = self.store.snapshot(filter);
        let path = match config::expand_path(format.default_file(&self.cfg.export)) {
            Ok(p) => p,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };
        let handle = tokio::task::spawn_blocking(move || {
            export::export_to_path(&snapshot, format, &path).map(JobResult::Exported)
        });
        self.jobs.push(PendingJob {
            label: match format {
                ExportFormat::Csv => "exporting CSV",
                ExportFormat::Pdf => "exporting PDF",
            },
            handle,
        });
    }

    fn start_voice(&mut self) {
        let command = self.cfg.voice.command.clone();
        if command.trim().is_empty() {
            self.last_error = Some("voice input disabled: set voice.command".to_owned());
            return;
        }
        if self.jobs.iter().any(|j| j.label == "listening") {
            return;
        }
        let handle = tokio::task::spawn_blocking(move || {
            voice::capture(&command)
                .map(JobResult::Transcript)
                .map_err(anyhow::Error::from)
        });
        self.jobs.push(PendingJob {
            label: "listening",
            handle,
        });
    }

    fn apply_transcript(&mut self, transcript: Option<String>) {
        let Some(transcript) = transcript else {
            self.toast = Some(Toast::info("No speech captured"));
            return;
        };
        self.form.draft.set_transcript(&transcript);
        self.form.text = TextInput::new(self.form.draft.text.clone());
        self.open_form();
    }
}

/// Runs the interactive list against the configured data file.
pub async fn run(cfg: Config) -> anyhow::Result<()> {
    let slot = FileSlot::from_config(&cfg.storage)?;
    run_with_store(cfg, TaskStore::open(slot)).await
}

pub async fn run_with_store<S: Slot>(cfg: Config, store: TaskStore<S>) -> anyhow::Result<()> {
    let notifier = notify::from_config(&cfg.notify);

    let terminal = tui::init_terminal()?;
    let mut guard = TerminalGuard::new(terminal);
    let mut app = AppState::new(cfg, store, notifier);

    loop {
        if let Some(toast) = &app.toast
            && Instant::now() >= toast.until
        {
            app.toast = None;
        }

        poll_jobs(&mut app).await;

        {
            let Some(terminal) = guard.terminal.as_mut() else {
                anyhow::bail!("terminal unavailable");
            };
            terminal.draw(|f| draw(f, &mut app))?;
        }

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            handle_key(key, &mut app);
        }
    }

    // Let in-flight exports finish writing before the process exits.
    for job in app.jobs.drain(..) {
        if let Ok(Err(e)) = job.handle.await {
            tracing::warn!(job = job.label, error = %e, "background job failed");
        }
    }
    Ok(())
}

async fn poll_jobs<S: Slot>(app: &mut AppState<S>) {
    if !app.jobs.iter().any(|j| j.handle.is_finished()) {
        return;
    }
    let (done, pending): (Vec<_>, Vec<_>) =
        app.jobs.drain(..).partition(|j| j.handle.is_finished());
    app.jobs = pending;

    for job in done {
        match job.handle.await {
            Ok(Ok(JobResult::Exported(report))) => {
                app.toast = Some(Toast::info(report.to_string()));
            }
            Ok(Ok(JobResult::Transcript(t))) => app.apply_transcript(t),
            Ok(Err(e)) => app.last_error = Some(format!("{}: {e:#}", job.label)),
            Err(e) => app.last_error = Some(format!("{}: {e}", job.label)),
        }
    }
}

fn draw<S: Slot>(f: &mut Frame<'_>, app: &mut AppState<S>) {
    let area = f.area();

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, root[0], app);
    draw_body(f, root[1], app);
    draw_footer(f, root[2], app);

    if app.mode == Mode::NewTask {
        draw_form(f, &app.form);
    }
    if app.mode == Mode::Help {
        draw_help(f);
    }
    if let Some(confirm) = &app.confirm {
        draw_confirm(f, confirm);
    }
}

fn draw_header<S: Slot>(f: &mut Frame<'_>, area: Rect, app: &AppState<S>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let titles: Vec<Line> = Filter::ALL
        .iter()
        .enumerate()
        .map(|(i, filter)| {
            let count = app.store.list().count(*filter);
            Line::from(format!("{} ({count}) [{}]", filter.label(), i + 1))
        })
        .collect();
    let selected = Filter::ALL
        .iter()
        .position(|f| *f == app.filter)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" | ");
    f.render_widget(tabs, chunks[0]);

    let location = app.store.slot().describe();
    let location = if app.cfg.ui.tilde_home {
        config::tilde_path(&location)
    } else {
        location
    };
    let path = Paragraph::new(Line::from(location))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    f.render_widget(path, chunks[1]);
}

fn draw_body<S: Slot>(f: &mut Frame<'_>, area: Rect, app: &mut AppState<S>) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(area);

    let tasks = app.visible.iter().filter_map(|&i| app.store.tasks().get(i));
    let title = view::list_title(app.filter, app.visible.len());
    let table = view::task_table(tasks, app.cfg.ui.icons, title);
    f.render_stateful_widget(table, layout[0], &mut app.table_state);

    draw_detail(f, layout[1], app);
}

fn draw_detail<S: Slot>(f: &mut Frame<'_>, area: Rect, app: &AppState<S>) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(t) = app.selected_task() else {
        let msg = if app.store.tasks().is_empty() {
            "No tasks yet. Press 'a' to add one."
        } else {
            "No tasks match this filter."
        };
        f.render_widget(Paragraph::new(msg).wrap(Wrap { trim: true }), inner);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let position = app
        .table_state
        .selected()
        .map_or(0, |i| i + 1);
    let lines = vec![
        Line::from(vec![Span::styled("Task: ", bold), Span::raw(t.text.as_str())]),
        Line::from(format!("ID: {}", t.id)),
        Line::from(vec![
            Span::styled("Priority: ", bold),
            Span::styled(t.priority.label(), view::priority_style(t.priority)),
        ]),
        Line::from(format!(
            "Date: {}",
            t.date.map_or_else(|| "-".to_owned(), format_date)
        )),
        Line::from(format!("Category: {}", t.category)),
        Line::from(format!(
            "Status: {}",
            if t.completed { "done" } else { "open" }
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{position} of {}", app.visible.len()),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_footer<S: Slot>(f: &mut Frame<'_>, area: Rect, app: &AppState<S>) {
    let mut spans: Vec<Span> = Vec::new();
    for job in &app.jobs {
        spans.push(Span::styled(
            format!("[{}…] ", job.label),
            Style::default().fg(Color::Magenta),
        ));
    }

    if let Some(err) = app.last_error.as_deref() {
        spans.push(Span::styled(
            "Error: ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(err, Style::default().fg(Color::Red)));
    } else if let Some(toast) = &app.toast {
        spans.push(Span::styled(
            toast.message.as_str(),
            Style::default().fg(Color::Green),
        ));
    } else {
        let hints = match (app.confirm.is_some(), app.mode) {
            (true, _) => "y confirm • n/Esc cancel",
            (false, Mode::NewTask) => {
                "Tab next field • ←/→ change • Enter add • F2 voice • Esc close"
            }
            (false, Mode::Help) => "any key closes help",
            (false, Mode::Normal) => {
                "a add • space toggle • d delete • c clear done • J/K move • f filter • e/p export • ? help • q quit"
            }
        };
        spans.push(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_form(f: &mut Frame<'_>, form: &NewTaskForm) {
    let area = centered_rect(70, 40, f.area());
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title("New task");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let active = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let style_for = |field: FormField| {
        if form.field == field {
            active
        } else {
            Style::default()
        }
    };
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Task:     ", bold),
            Span::styled(form.text.as_str(), style_for(FormField::Text)),
        ]),
        Line::from(vec![
            Span::styled("Priority: ", bold),
            Span::styled(
                format!("‹ {} ›", form.draft.priority),
                style_for(FormField::Priority),
            ),
        ]),
        Line::from(vec![
            Span::styled("Date:     ", bold),
            Span::styled(form.date.as_str(), style_for(FormField::Date)),
            Span::styled("  (YYYY-MM-DD, optional)", dim),
        ]),
        Line::from(vec![
            Span::styled("Category: ", bold),
            Span::styled(
                format!("‹ {} ›", form.draft.category),
                style_for(FormField::Category),
            ),
        ]),
    ];

    if let Some(err) = form.error.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(err, Style::default().fg(Color::Red)),
        ]));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    let (line_idx, input) = match form.field {
        FormField::Text => (0u16, &form.text),
        FormField::Date => (2u16, &form.date),
        FormField::Priority | FormField::Category => return,
    };
    let prefix_len = u16::try_from("Task:     ".chars().count()).unwrap_or(0);
    let x = inner.x + prefix_len + u16::try_from(input.cursor).unwrap_or(0);
    f.set_cursor_position((x, inner.y + line_idx));
}

fn draw_confirm(f: &mut Frame<'_>, confirm: &ConfirmDialog) {
    let area = centered_rect(60, 25, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(confirm.title.as_str());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(confirm.message.clone()),
        Line::from(""),
        Line::from("[y] yes    [n] no"),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_help(f: &mut Frame<'_>) {
    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from("Keys:"),
        Line::from("  j/k, ↑/↓    Move selection"),
        Line::from("  g/G         First / last task"),
        Line::from("  a           New task"),
        Line::from("  space, x    Toggle completed"),
        Line::from("  d           Delete task"),
        Line::from("  c           Clear completed"),
        Line::from("  J/K         Move task down / up"),
        Line::from("  f, 1-3      Filter: all / active / completed"),
        Line::from("  v           Voice input"),
        Line::from("  e / p       Export CSV / PDF"),
        Line::from("  q, Esc      Quit"),
        Line::from(""),
        Line::from("New task form:"),
        Line::from("  Tab         Next field"),
        Line::from("  ←/→         Change priority or category"),
        Line::from("  Enter       Add"),
        Line::from("  F2          Voice input"),
    ];
    let popup = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

fn handle_key<S: Slot>(key: KeyEvent, app: &mut AppState<S>) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        app.should_quit = true;
        return;
    }

    if app.confirm.is_some() {
        handle_confirm_key(key, app);
        return;
    }

    match app.mode {
        Mode::NewTask => handle_form_key(key, app),
        Mode::Help => app.mode = Mode::Normal,
        Mode::Normal => handle_normal_key(key, app),
    }
}

fn handle_normal_key<S: Slot>(key: KeyEvent, app: &mut AppState<S>) {
    app.last_error = None;
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('?') => app.mode = Mode::Help,
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Home | KeyCode::Char('g') => app.move_selection(i64::MIN / 2),
        KeyCode::End | KeyCode::Char('G') => app.move_selection(i64::MAX / 2),
        KeyCode::Char('J') => app.move_selected(1),
        KeyCode::Char('K') => app.move_selected(-1),
        KeyCode::Char('a' | 'n' | 'i') => app.open_form(),
        KeyCode::Char(' ' | 'x') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete_selected(),
        KeyCode::Char('c') => app.request_clear_completed(),
        KeyCode::Char('f') | KeyCode::Tab => app.set_filter(app.filter.next()),
        KeyCode::Char('1') => app.set_filter(Filter::All),
        KeyCode::Char('2') => app.set_filter(Filter::Active),
        KeyCode::Char('3') => app.set_filter(Filter::Completed),
        KeyCode::Char('v') => app.start_voice(),
        KeyCode::Char('e') => app.start_export(ExportFormat::Csv),
        KeyCode::Char('p') => app.start_export(ExportFormat::Pdf),
        _ => {}
    }
}

fn handle_confirm_key<S: Slot>(key: KeyEvent, app: &mut AppState<S>) {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
            let Some(confirm) = app.confirm.take() else {
                return;
            };
            match confirm.action {
                ConfirmAction::Delete { id } => app.delete(id),
                ConfirmAction::ClearCompleted => app.clear_completed(),
            }
        }
        KeyCode::Char('n' | 'N' | 'q') | KeyCode::Esc => app.confirm = None,
        _ => {}
    }
}

fn handle_form_key<S: Slot>(key: KeyEvent, app: &mut AppState<S>) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            return;
        }
        KeyCode::Enter => {
            app.submit_form();
            return;
        }
        KeyCode::F(2) => {
            app.start_voice();
            return;
        }
        _ => {}
    }

    let form = &mut app.form;
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            form.error = None;
            form.field = form.field.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.error = None;
            form.field = form.field.prev();
        }
        _ => match form.field {
            FormField::Text => handle_text_input_key(key, &mut form.text),
            FormField::Date => handle_text_input_key(key, &mut form.date),
            FormField::Priority => match key.code {
                KeyCode::Right | KeyCode::Char(' ') => {
                    form.draft.priority = form.draft.priority.next();
                }
                KeyCode::Left => form.draft.priority = form.draft.priority.prev(),
                _ => {}
            },
            FormField::Category => match key.code {
                KeyCode::Right | KeyCode::Char(' ') => {
                    form.draft.category = form.draft.category.next();
                }
                KeyCode::Left => form.draft.category = form.draft.category.prev(),
                _ => {}
            },
        },
    }
}

fn handle_text_input_key(key: KeyEvent, input: &mut TextInput) {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.cursor = 0,
        KeyCode::End => input.cursor = input.len(),
        KeyCode::Char(c) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT)
            {
                input.insert_char(c);
            }
        }
        _ => {}
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

struct TerminalGuard {
    terminal: Option<ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>>,
}

impl TerminalGuard {
    fn new(
        terminal: ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    ) -> Self {
        Self {
            terminal: Some(terminal),
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Some(terminal) = self.terminal.take() {
            let _ = tui::restore_terminal(terminal);
        }
    }
}
