use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::collections::HashMap;
use std::io;
use tribunal_admin::{
    latest_summary, summary_line, AccessLevel, AppConfig, CredentialStore, Dataset, DatasetKind,
    SqliteUserStore, User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Datasets,
    Users,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Datasets => Page::Users,
            Page::Users => Page::Datasets,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Datasets => "Datasets",
            Page::Users => "Usuarios",
        }
    }
}

/// Row being edited in place: Tab moves between fields, Enter commits
#[derive(Debug, Clone, PartialEq)]
pub struct RowEdit {
    pub row: usize,
    pub column: usize,
    pub values: Vec<String>,
}

pub struct App {
    pub config: AppConfig,
    pub store: SqliteUserStore,
    pub current_page: Page,
    pub dataset: Dataset,
    pub dataset_state: TableState,
    pub users: Vec<User>,
    pub users_state: TableState,
    pub edit: Option<RowEdit>,
    pub dirty: bool,
    /// Unsaved working copies of the datasets not on screen
    pub drafts: HashMap<DatasetKind, Dataset>,
    pub summary: String,
    pub message: Option<String>,
}

impl App {
    pub fn new(config: AppConfig, store: SqliteUserStore) -> Self {
        let mut app = Self {
            dataset: Dataset::new(DatasetKind::ALL[0], Vec::new()),
            config,
            store,
            current_page: Page::Datasets,
            dataset_state: TableState::default(),
            users: Vec::new(),
            users_state: TableState::default(),
            edit: None,
            dirty: false,
            drafts: HashMap::new(),
            summary: String::new(),
            message: None,
        };
        app.load_dataset(DatasetKind::ALL[0]);
        app.reload_users();
        app.refresh_summary();
        app
    }

    /// Read `kind` from disk, discarding any unsaved draft of it
    pub fn load_dataset(&mut self, kind: DatasetKind) {
        self.drafts.remove(&kind);
        let path = self.config.dataset_path(kind);
        self.dataset = match Dataset::load(kind, &path) {
            Ok(dataset) => {
                self.message = None;
                dataset
            }
            Err(err) => {
                tracing::warn!(dataset = kind.key(), error = %format!("{:#}", err), "dataset unavailable");
                self.message = Some(format!("❌ {:#}", err));
                Dataset::new(kind, Vec::new())
            }
        };
        self.edit = None;
        self.dirty = false;
        self.dataset_state
            .select(if self.dataset.is_empty() { None } else { Some(0) });
    }

    /// Show `kind`, resuming its unsaved draft when there is one
    pub fn open_dataset(&mut self, kind: DatasetKind) {
        let Some(draft) = self.drafts.remove(&kind) else {
            self.load_dataset(kind);
            return;
        };

        self.dataset = draft;
        self.edit = None;
        self.dirty = true;
        self.message = Some(format!("✏️ {}: cambios sin guardar", kind.label()));
        self.dataset_state
            .select(if self.dataset.is_empty() { None } else { Some(0) });
    }

    /// Park the dataset on screen as a draft if it has unsaved changes
    fn stash_current(&mut self) {
        if !self.dirty {
            return;
        }
        let kind = self.dataset.kind;
        let current = std::mem::replace(&mut self.dataset, Dataset::new(kind, Vec::new()));
        self.drafts.insert(kind, current);
        self.dirty = false;
    }

    pub fn reload_users(&mut self) {
        match self.store.list_users() {
            Ok(users) => self.users = users,
            Err(err) => self.message = Some(format!("❌ {:#}", err)),
        }
        self.users_state
            .select(if self.users.is_empty() { None } else { Some(0) });
    }

    pub fn refresh_summary(&mut self) {
        self.summary = summary_line(&latest_summary(&self.config.data_dir));
    }

    pub fn save_dataset(&mut self) {
        let path = self.config.dataset_path(self.dataset.kind);
        match self.dataset.save(&path) {
            Ok(()) => {
                self.dirty = false;
                self.message = Some(format!("✅ {} guardado", self.dataset.kind.label()));
                self.refresh_summary();
            }
            Err(err) => self.message = Some(format!("❌ {:#}", err)),
        }
    }

    pub fn insert_row(&mut self) {
        if self.dataset.headers.is_empty() {
            return;
        }
        self.dataset.insert_blank_row();
        self.dirty = true;
        self.dataset_state.select(Some(0));
        self.start_edit();
    }

    pub fn delete_selected(&mut self) {
        let Some(i) = self.dataset_state.selected() else {
            return;
        };
        if self.dataset.delete_row(i).is_ok() {
            self.dirty = true;
            let len = self.dataset.len();
            self.dataset_state
                .select(if len == 0 { None } else { Some(i.min(len - 1)) });
        }
    }

    pub fn start_edit(&mut self) {
        if let Some(row) = self.dataset_state.selected() {
            if let Some(values) = self.dataset.rows.get(row) {
                let mut values = values.clone();
                values.resize(self.dataset.headers.len(), String::new());
                self.edit = Some(RowEdit {
                    row,
                    column: 0,
                    values,
                });
            }
        }
    }

    pub fn commit_edit(&mut self) {
        let Some(edit) = self.edit.take() else {
            return;
        };
        match self.dataset.update_row(edit.row, edit.values) {
            Ok(()) => self.dirty = true,
            Err(err) => self.message = Some(format!("❌ {:#}", err)),
        }
    }

    pub fn switch_dataset(&mut self, forward: bool) {
        let kind = if forward {
            self.dataset.kind.next()
        } else {
            self.dataset.kind.previous()
        };
        self.stash_current();
        self.open_dataset(kind);
    }

    fn rows_on_page(&self) -> usize {
        match self.current_page {
            Page::Datasets => self.dataset.len(),
            Page::Users => self.users.len(),
        }
    }

    fn table_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::Datasets => &mut self.dataset_state,
            Page::Users => &mut self.users_state,
        }
    }

    pub fn next(&mut self) {
        let len = self.rows_on_page();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows_on_page();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.edit.is_some() {
            self.handle_edit_key(key);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.current_page = self.current_page.next(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Char('r') => {
                match self.current_page {
                    Page::Datasets => self.load_dataset(self.dataset.kind),
                    Page::Users => self.reload_users(),
                }
                self.refresh_summary();
            }
            _ if self.current_page == Page::Datasets => match key.code {
                KeyCode::Right | KeyCode::Char('l') => self.switch_dataset(true),
                KeyCode::Left | KeyCode::Char('h') => self.switch_dataset(false),
                KeyCode::Char('n') => self.insert_row(),
                KeyCode::Char('d') => self.delete_selected(),
                KeyCode::Char('s') => self.save_dataset(),
                KeyCode::Enter => self.start_edit(),
                _ => {}
            },
            _ => {}
        }
        false
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(edit) = self.edit.as_mut() else {
            return;
        };
        let columns = edit.values.len().max(1);

        match key.code {
            KeyCode::Esc => self.edit = None,
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                edit.column = (edit.column + columns - 1) % columns
            }
            KeyCode::BackTab => edit.column = (edit.column + columns - 1) % columns,
            KeyCode::Tab => edit.column = (edit.column + 1) % columns,
            KeyCode::Backspace => {
                if let Some(value) = edit.values.get_mut(edit.column) {
                    value.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(value) = edit.values.get_mut(edit.column) {
                    value.push(c);
                }
            }
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(4), // Status bar + latest data
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Datasets => render_dataset_table(f, chunks[1], app),
        Page::Users => render_users_table(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Datasets, Page::Users].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        tab_spans.push(Span::styled(page.title().to_string(), tab_style(*page == app.current_page)));
    }

    if app.current_page == Page::Datasets {
        tab_spans.push(Span::raw("  |  "));
        for (i, kind) in DatasetKind::ALL.iter().enumerate() {
            if i > 0 {
                tab_spans.push(Span::raw(" "));
            }
            tab_spans.push(Span::styled(kind.label(), tab_style(*kind == app.dataset.kind)));
            if app.drafts.contains_key(kind) {
                tab_spans.push(Span::styled("*", Style::default().fg(Color::Red)));
            }
        }
        if app.dirty {
            tab_spans.push(Span::styled("  ● sin guardar", Style::default().fg(Color::Red)));
        }
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn tab_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn header_row<'a>(titles: impl IntoIterator<Item = String>) -> Row<'a> {
    let cells = titles.into_iter().map(|h| {
        Cell::from(h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    Row::new(cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn render_dataset_table(f: &mut Frame, area: Rect, app: &mut App) {
    let dataset = &app.dataset;
    let columns = dataset.headers.len().max(1) as u16;
    let column_width = (area.width.saturating_sub(4) / columns).max(8);

    let header = header_row(dataset.headers.iter().map(|h| h.trim().to_string()));

    let rows = dataset.rows.iter().enumerate().map(|(i, row)| {
        let editing = app.edit.as_ref().filter(|edit| edit.row == i);
        let values = editing.map(|edit| &edit.values).unwrap_or(row);

        let cells = values.iter().enumerate().map(|(col, value)| {
            let text = truncate(value, column_width as usize);
            match editing {
                Some(edit) if edit.column == col => Cell::from(format!("{}▏", text))
                    .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
                Some(_) => Cell::from(text).style(Style::default().fg(Color::Yellow)),
                None => Cell::from(text),
            }
        });

        Row::new(cells.collect::<Vec<_>>()).height(1)
    });

    let widths = vec![Constraint::Length(column_width); dataset.headers.len()];
    let title = format!(
        " {} - {} ({} filas) ",
        dataset.kind.label(),
        dataset.kind.file_name(),
        dataset.len()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.dataset_state);
}

fn render_users_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(
        ["Usuario", "Nivel", "Nombre", "Email", "Último Acceso", "Activo"]
            .iter()
            .map(|h| h.to_string()),
    );

    let rows = app.users.iter().map(|user| {
        let level_color = match user.level {
            AccessLevel::Admin => Color::Magenta,
            AccessLevel::Normal => Color::White,
        };
        let last_access = user
            .last_access
            .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        let cells = vec![
            Cell::from(user.username.clone()),
            Cell::from(user.level.to_string()).style(Style::default().fg(level_color)),
            Cell::from(truncate(&user.full_name, 28)),
            Cell::from(truncate(&user.email, 30)),
            Cell::from(last_access),
            Cell::from(if user.active { "✅" } else { "❌" }),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(30),
            Constraint::Length(32),
            Constraint::Length(18),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Usuarios del Sistema - Total: {} ", app.users.len())),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.users_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut status_spans = vec![];
    if let Some(message) = &app.message {
        status_spans.push(Span::styled(format!(" {} ", message), Style::default().fg(Color::Cyan)));
        status_spans.push(Span::raw(" | "));
    }

    if app.edit.is_some() {
        status_spans.extend([
            key("Tab"),
            Span::raw(" Campo | "),
            key("Enter"),
            Span::raw(" Aceptar | "),
            key("Esc"),
            Span::raw(" Cancelar"),
        ]);
    } else {
        status_spans.extend([key("Tab"), Span::raw(" Página | "), key("↑/↓"), Span::raw(" Nav | ")]);
        if app.current_page == Page::Datasets {
            status_spans.extend([
                key("←/→"),
                Span::raw(" Dataset | "),
                key("Enter"),
                Span::raw(" Editar | "),
                key("n"),
                Span::raw(" Nueva | "),
                key("d"),
                Span::raw(" Borrar | "),
                key("s"),
                Span::raw(" Guardar | "),
            ]);
        }
        status_spans.extend([
            key("r"),
            Span::raw(" Recargar | "),
            Span::styled("q", Style::default().fg(Color::Red)),
            Span::raw(" Salir"),
        ]);
    }

    let summary = if app.summary.is_empty() {
        "Sin datos disponibles".to_string()
    } else {
        app.summary.clone()
    };

    let status_text = vec![
        Line::from(status_spans),
        Line::from(Span::styled(format!(" 📅 {}", summary), Style::default().fg(Color::Green))),
    ];

    let status_bar = Paragraph::new(status_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_jus() -> (TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DatasetKind::Jus.file_name()),
            "FECHA ENTRADA EN VIGENCIA,VALOR IUS,ACUERDO\n01/03/2025,40285,4150\n",
        )
        .unwrap();
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            users_db: dir.path().join("usuarios.db"),
        };
        let app = App::new(config, SqliteUserStore::open_in_memory().unwrap());
        (dir, app)
    }

    #[test]
    fn test_insert_edit_and_save_row() {
        let (dir, mut app) = app_with_jus();
        assert_eq!(app.dataset.len(), 1);

        app.handle_key(press(KeyCode::Char('n')));
        assert!(app.edit.is_some());
        for c in "01/06/2025".chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
        app.handle_key(press(KeyCode::Tab));
        for c in "45000".chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
        app.handle_key(press(KeyCode::Enter));
        assert!(app.edit.is_none());
        assert!(app.dirty);

        app.handle_key(press(KeyCode::Char('s')));
        assert!(!app.dirty);

        let saved = Dataset::load(DatasetKind::Jus, &dir.path().join("Dataset_JUS.csv")).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved.rows[0], vec!["01/06/2025", "45000", ""]);
        assert!(app.summary.starts_with("JUS 6/2025: $ 45.000,00"));
    }

    #[test]
    fn test_escape_cancels_edit() {
        let (_dir, mut app) = app_with_jus();

        app.handle_key(press(KeyCode::Enter));
        app.handle_key(press(KeyCode::Backspace));
        app.handle_key(press(KeyCode::Esc));

        assert!(app.edit.is_none());
        assert!(!app.dirty);
        assert_eq!(app.dataset.rows[0][0], "01/03/2025");
    }

    #[test]
    fn test_missing_dataset_shows_message() {
        let (_dir, mut app) = app_with_jus();

        app.handle_key(press(KeyCode::Right));
        assert_eq!(app.dataset.kind, DatasetKind::Ipc);
        assert!(app.dataset.is_empty());
        assert!(app.message.is_some());

        // No headers: nothing to insert into
        app.handle_key(press(KeyCode::Char('n')));
        assert!(app.dataset.is_empty());
    }

    #[test]
    fn test_delete_and_quit() {
        let (_dir, mut app) = app_with_jus();

        app.handle_key(press(KeyCode::Char('d')));
        assert!(app.dataset.is_empty());
        assert_eq!(app.dataset_state.selected(), None);

        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.current_page, Page::Users);
        // Dataset keys do nothing on the users page
        app.handle_key(press(KeyCode::Char('n')));
        assert!(app.dataset.is_empty());

        assert!(app.handle_key(press(KeyCode::Char('q'))));
    }

    #[test]
    fn test_unsaved_edits_survive_switching_datasets() {
        let (dir, mut app) = app_with_jus();

        app.handle_key(press(KeyCode::Char('d')));
        assert!(app.dirty);
        assert!(app.dataset.is_empty());

        app.handle_key(press(KeyCode::Right));
        assert_eq!(app.dataset.kind, DatasetKind::Ipc);
        assert!(!app.dirty);
        assert!(app.drafts.contains_key(&DatasetKind::Jus));

        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.dataset.kind, DatasetKind::Jus);
        assert!(app.dirty);
        assert!(app.dataset.is_empty());
        assert!(app.drafts.is_empty());

        // Nothing was written behind the user's back
        let on_disk = Dataset::load(DatasetKind::Jus, &dir.path().join("Dataset_JUS.csv")).unwrap();
        assert_eq!(on_disk.len(), 1);
    }

    #[test]
    fn test_reload_discards_draft() {
        let (_dir, mut app) = app_with_jus();

        app.handle_key(press(KeyCode::Char('d')));
        app.handle_key(press(KeyCode::Char('r')));

        assert!(!app.dirty);
        assert_eq!(app.dataset.len(), 1);
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Último", 10), "Último");
        assert_eq!(truncate("Resolución 12/2024", 10), "Resoluc...");
    }
}
