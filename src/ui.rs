use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hospital_ratings::{
    stars_text, AddOutcome, CompareError, ComparisonView, HospitalBrowser, HospitalDetail,
    HospitalType, RadiusStatus, SearchQuery, SortKey, ToggleOutcome, MAX_COMPARE,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

const RADIUS_STEPS: [Option<f64>; 5] = [None, Some(10.0), Some(25.0), Some(50.0), Some(100.0)];

const TYPE_CHOICES: [(char, Option<HospitalType>, &str); 7] = [
    ('0', None, "All Hospitals"),
    ('1', Some(HospitalType::Rural), "Rural"),
    ('2', Some(HospitalType::Urban), "Urban"),
    ('3', Some(HospitalType::NonProfit), "Non-Profit"),
    ('4', Some(HospitalType::ForProfit), "For-Profit"),
    ('5', Some(HospitalType::CriticalAccess), "Critical Access"),
    ('6', Some(HospitalType::AcuteCare), "Acute Care"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Results,
    Compare,
    Filters,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Results => Page::Compare,
            Page::Compare => Page::Filters,
            Page::Filters => Page::Results,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Results => Page::Filters,
            Page::Compare => Page::Results,
            Page::Filters => Page::Compare,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Results => "Hospitals",
            Page::Compare => "Compare",
            Page::Filters => "Filters",
        }
    }
}

/// Which text field keystrokes go to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Zip,
    Search,
}

/// One row of the results table
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub grade: String,
    pub stars: f64,
    pub distance: Option<f64>,
    pub selected: bool,
}

pub struct App {
    pub browser: HospitalBrowser,
    pub query: SearchQuery,
    pub rows: Vec<ResultRow>,
    pub radius_status: RadiusStatus,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    pub input_mode: InputMode,
    pub input: String,
    pub message: Option<String>,
    default_radius: f64,
}

impl App {
    pub fn new(browser: HospitalBrowser, default_radius: f64) -> Self {
        let mut app = Self {
            browser,
            query: SearchQuery::default(),
            rows: Vec::new(),
            radius_status: RadiusStatus::NotRequested,
            state: TableState::default(),
            current_page: Page::Results,
            show_detail: false,
            input_mode: InputMode::Normal,
            input: String::new(),
            message: None,
            default_radius,
        };
        app.refresh();
        app
    }

    /// Re-run the search and keep the cursor on the same hospital if it survived
    pub fn refresh(&mut self) {
        let keep = self.selected_id().map(str::to_string);

        let results = self.browser.search(&self.query);
        self.radius_status = results.radius;
        self.rows = results
            .hits
            .iter()
            .map(|hit| ResultRow {
                id: hit.hospital.id.clone(),
                name: hit.hospital.display_name().to_string(),
                location: hit.hospital.location_line(),
                grade: hit.hospital.overall().display(),
                stars: hit.overall_stars,
                distance: hit.distance_miles,
                selected: hit.selected,
            })
            .collect();

        let index = keep
            .and_then(|id| self.rows.iter().position(|r| r.id == id))
            .or(if self.rows.is_empty() { None } else { Some(0) });
        self.state.select(index);
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.state
            .selected()
            .and_then(|i| self.rows.get(i))
            .map(|r| r.id.as_str())
    }

    pub fn selected_detail(&self) -> Option<HospitalDetail> {
        self.selected_id().and_then(|id| self.browser.detail(id))
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn toggle_compare(&mut self) {
        let Some(id) = self.selected_id().map(str::to_string) else {
            return;
        };

        self.message = match self.browser.toggle_selected(&id) {
            ToggleOutcome::Added => Some(format!(
                "Added to comparison ({}/{})",
                self.browser.selection().len(),
                MAX_COMPARE
            )),
            ToggleOutcome::Removed => Some("Removed from comparison".to_string()),
            ToggleOutcome::AtCapacity => Some(format!(
                "You can compare up to {} hospitals at a time",
                MAX_COMPARE
            )),
            ToggleOutcome::Invalid => None,
        };
        self.refresh();
    }

    pub fn add_to_compare(&mut self) {
        let Some(id) = self.selected_id().map(str::to_string) else {
            return;
        };
        if self.browser.select(&id) == AddOutcome::AtCapacity {
            self.message = Some(format!("You can compare up to {} hospitals at a time", MAX_COMPARE));
        }
        self.refresh();
    }

    pub fn clear_compare(&mut self) {
        self.browser.clear_selection();
        self.message = Some("Comparison cleared".to_string());
        self.refresh();
    }

    pub fn comparison(&self) -> Result<ComparisonView, CompareError> {
        self.browser.comparison(None)
    }

    pub fn set_type(&mut self, hospital_type: Option<HospitalType>) {
        self.query.filter.hospital_type = hospital_type;
        self.refresh();
    }

    pub fn cycle_sort(&mut self) {
        self.query.sort = match self.query.sort {
            SortKey::None => SortKey::Grade,
            SortKey::Grade => SortKey::Name,
            SortKey::Name if self.query.zip.is_some() => SortKey::Distance,
            SortKey::Name | SortKey::Distance => SortKey::None,
        };
        self.refresh();
    }

    pub fn cycle_radius(&mut self) {
        let current = RADIUS_STEPS
            .iter()
            .position(|r| *r == self.query.radius_miles)
            .unwrap_or(0);
        self.query.radius_miles = RADIUS_STEPS[(current + 1) % RADIUS_STEPS.len()];
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.query = SearchQuery::default();
        self.message = None;
        self.refresh();
    }

    pub fn start_input(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input = match mode {
            InputMode::Zip => self.query.zip.clone().unwrap_or_default(),
            InputMode::Search => self.query.filter.name_query.clone().unwrap_or_default(),
            InputMode::Normal => String::new(),
        };
    }

    pub fn submit_input(&mut self) {
        let value = self.input.trim().to_string();
        let value = if value.is_empty() { None } else { Some(value) };
        self.message = None;

        match self.input_mode {
            InputMode::Zip => {
                if value.is_some() && self.query.radius_miles.is_none() {
                    self.query.radius_miles = Some(self.default_radius);
                }
                if value.is_none() {
                    self.query.radius_miles = None;
                    if self.query.sort == SortKey::Distance {
                        self.query.sort = SortKey::None;
                    }
                }
                self.query.zip = value;
            }
            InputMode::Search => self.query.filter.name_query = value,
            InputMode::Normal => {}
        }

        let zip_submitted = self.input_mode == InputMode::Zip;
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.refresh();

        if zip_submitted && self.radius_status == RadiusStatus::UnknownZip {
            self.message = Some("ZIP code not found, showing all hospitals".to_string());
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = self.state.selected().map(|i| i.saturating_sub(20)).unwrap_or(0);
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Text entry swallows everything except submit/cancel
        if app.input_mode != InputMode::Normal {
            match key.code {
                KeyCode::Enter => app.submit_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Backspace => {
                    app.input.pop();
                }
                KeyCode::Char(c) => app.input.push(c),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Enter => app.toggle_detail(),
            KeyCode::Tab => app.next_page(),
            KeyCode::BackTab => app.previous_page(),
            KeyCode::Char(' ') => app.toggle_compare(),
            KeyCode::Char('a') => app.add_to_compare(),
            KeyCode::Char('x') => app.clear_compare(),
            KeyCode::Char('s') => app.cycle_sort(),
            KeyCode::Char('r') => app.cycle_radius(),
            KeyCode::Char('z') => app.start_input(InputMode::Zip),
            KeyCode::Char('/') => app.start_input(InputMode::Search),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Char('c') => {
                app.clear_filters();
                app.current_page = Page::Results;
            }
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::PageDown => app.page_down(),
            KeyCode::PageUp => app.page_up(),
            KeyCode::Home => app.state.select(Some(0)),
            KeyCode::End => {
                if !app.rows.is_empty() {
                    app.state.select(Some(app.rows.len() - 1));
                }
            }
            KeyCode::Char(c) if app.current_page == Page::Filters => {
                if let Some((_, hospital_type, _)) = TYPE_CHOICES.iter().find(|(k, _, _)| *k == c) {
                    app.set_type(*hospital_type);
                    app.current_page = Page::Results;
                }
            }
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Results {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(55), // Hospital list
                Constraint::Percentage(45), // Detail panel
            ])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Results => render_table(f, chunks[1], app),
            Page::Compare => render_compare(f, chunks[1], app),
            Page::Filters => render_filters(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Results, Page::Compare, Page::Filters];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Showing: {}/{}", app.rows.len(), app.browser.hospitals().len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("⚖ {}/{}", app.browser.selection().len(), MAX_COMPARE),
        Style::default().fg(if app.browser.selection().is_full() { Color::Red } else { Color::Green }),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn star_color(stars: f64) -> Color {
    if stars >= 4.0 {
        Color::Green
    } else if stars >= 2.5 {
        Color::Yellow
    } else if stars > 0.0 {
        Color::Red
    } else {
        Color::DarkGray
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["", "Hospital", "Location", "Grade", "Rating", "Miles"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.rows.iter().map(|r| {
        let color = star_color(r.stars);
        let cells = vec![
            Cell::from(if r.selected { "⚖" } else { " " }).style(Style::default().fg(Color::Cyan)),
            Cell::from(truncate(&r.name, 34)),
            Cell::from(truncate(&r.location, 22)),
            Cell::from(r.grade.clone()).style(Style::default().fg(color)),
            Cell::from(stars_text(r.stars)).style(Style::default().fg(color)),
            Cell::from(r.distance.map(|d| format!("{:.1}", d)).unwrap_or_default()),
        ];

        Row::new(cells).height(1)
    });

    let title = format!(" {} ", search_summary(app));
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(36),
            Constraint::Length(24),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
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

    f.render_stateful_widget(table, area, &mut app.state);
}

fn search_summary(app: &App) -> String {
    let mut parts = vec!["Hospitals".to_string()];
    if let Some(zip) = &app.query.zip {
        match app.query.radius_miles {
            Some(r) => parts.push(format!("within {} mi of {}", r, zip)),
            None => parts.push(format!("near {}", zip)),
        }
    }
    if let Some(t) = app.query.filter.hospital_type {
        if let Some((_, _, label)) = TYPE_CHOICES.iter().find(|(_, ht, _)| *ht == Some(t)) {
            parts.push(format!("[{}]", label));
        }
    }
    if let Some(q) = &app.query.filter.name_query {
        parts.push(format!("matching \"{}\"", q));
    }
    if app.query.sort != SortKey::None {
        parts.push(format!("sorted by {:?}", app.query.sort).to_lowercase());
    }
    parts.join(" ")
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    match app.input_mode {
        InputMode::Zip | InputMode::Search => {
            let label = if app.input_mode == InputMode::Zip { " ZIP: " } else { " Search: " };
            status_spans.push(Span::styled(label, Style::default().fg(Color::Cyan)));
            status_spans.push(Span::styled(format!("{}█", app.input), Style::default().fg(Color::White)));
            status_spans.push(Span::raw("  ("));
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" apply, "));
            status_spans.push(Span::styled("Esc", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" cancel)"));
        }
        InputMode::Normal => {
            let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
            status_spans.push(Span::styled(
                format!(" Row: {}/{} ", selected, app.rows.len()),
                Style::default().fg(Color::Cyan),
            ));

            if let Some(message) = &app.message {
                status_spans.push(Span::raw(" | "));
                status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
            }

            for (key, label) in [
                ("Space", " Compare"),
                ("z", " ZIP"),
                ("/", " Search"),
                ("r", " Radius"),
                ("s", " Sort"),
                ("c", " Clear"),
                ("Tab", " Page"),
            ] {
                status_spans.push(Span::raw(" | "));
                status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
                status_spans.push(Span::raw(label));
            }
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
            status_spans.push(Span::raw(" Quit"));
        }
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
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
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn render_filters(f: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Hospital Type",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ];

    for (key, hospital_type, label) in TYPE_CHOICES.iter() {
        let active = app.query.filter.hospital_type == *hospital_type;
        content.push(Line::from(vec![
            if active {
                Span::styled("  → ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            } else {
                Span::raw("    ")
            },
            Span::styled(key.to_string(), Style::default().fg(Color::Yellow)),
            Span::raw(format!(". {}", label)),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  ZIP: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(app.query.zip.clone().unwrap_or_else(|| "any".to_string())),
        Span::styled("   Radius: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(
            app.query
                .radius_miles
                .map(|r| format!("{} mi", r))
                .unwrap_or_else(|| "any".to_string()),
        ),
    ]));
    content.push(Line::from(vec![
        Span::styled("  Cities in dataset: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(app.browser.cities().len().to_string()),
    ]));
    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled(
            "  Hint: ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ),
        Span::styled(
            "Press 0-6 to filter, z for ZIP, r for radius, c to clear",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    ]));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filters "),
    );

    f.render_widget(paragraph, area);
}

fn render_compare(f: &mut Frame, area: Rect, app: &App) {
    let view = match app.comparison() {
        Ok(view) => view,
        Err(e) => {
            let hint = match e {
                CompareError::TooFew(_) => format!(
                    "  {}.\n\n  Press Space on a hospital in the list to add it (up to {}).",
                    e, MAX_COMPARE
                ),
                _ => format!("  {}", e),
            };
            let paragraph = Paragraph::new(hint).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Compare Hospitals "),
            );
            f.render_widget(paragraph, area);
            return;
        }
    };

    let mut header_cells = vec![Cell::from("")];
    for card in &view.hospitals {
        header_cells.push(
            Cell::from(truncate(&card.name, 28))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        );
    }
    let header = Row::new(header_cells).style(Style::default().bg(Color::DarkGray)).height(1);

    let mut rows = vec![];
    let info = |label: &str, values: Vec<String>| {
        let mut cells = vec![Cell::from(label.to_string()).style(Style::default().fg(Color::Cyan))];
        cells.extend(values.into_iter().map(Cell::from));
        Row::new(cells)
    };
    rows.push(info("Location", view.hospitals.iter().map(|c| c.location.clone()).collect()));
    rows.push(info("Setting", view.hospitals.iter().map(|c| c.setting.clone()).collect()));
    rows.push(info(
        "Critical Access",
        view.hospitals.iter().map(|c| yes_no(c.critical_access)).collect(),
    ));
    rows.push(info("In System", view.hospitals.iter().map(|c| yes_no(c.in_system)).collect()));
    rows.push(info("County", view.hospitals.iter().map(|c| c.county.clone()).collect()));

    let metric_cells = |label: &str, values: Vec<(String, f64)>, style: Style| {
        let mut cells = vec![Cell::from(label.to_string()).style(style)];
        for (raw, stars) in values {
            cells.push(
                Cell::from(format!("{} {}", stars_text(stars), raw)).style(Style::default().fg(star_color(stars))),
            );
        }
        Row::new(cells)
    };

    rows.push(metric_cells(
        &view.overall.label,
        view.overall.values.iter().map(|m| (m.raw.clone(), m.stars)).collect(),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    for section in &view.sections {
        rows.push(metric_cells(
            &section.title,
            section.scores.iter().map(|s| (String::new(), *s)).collect(),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ));
        for row in &section.rows {
            rows.push(metric_cells(
                &format!("  {}", row.label),
                row.values.iter().map(|m| (m.raw.clone(), m.stars)).collect(),
                Style::default(),
            ));
        }
    }

    let mut widths = vec![Constraint::Length(46)];
    widths.extend(view.hospitals.iter().map(|_| Constraint::Length(30)));

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Compare Hospitals (x to clear) "),
    );

    f.render_widget(table, area);
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let detail = match app.selected_detail() {
        Some(d) => d,
        None => {
            let no_selection = Paragraph::new("No hospital selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Hospital Details "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let label = |text: &str| {
        Span::styled(
            format!("  {}: ", text),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };
    let heading = |text: String| {
        Line::from(vec![Span::styled(
            format!("  {}", text),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )])
    };

    let mut content = vec![
        Line::from(vec![Span::styled(
            format!("  {}", detail.name),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![Span::styled(
            format!("  {}", detail.address),
            Style::default().fg(Color::DarkGray),
        )]),
        Line::from(""),
        Line::from(vec![
            label("Overall"),
            Span::styled(
                format!("{} {}", stars_text(detail.overall.stars), detail.overall.raw),
                Style::default().fg(star_color(detail.overall.stars)),
            ),
        ]),
        Line::from(vec![label("Size"), Span::raw(detail.size.clone())]),
        Line::from(vec![label("Ownership"), Span::raw(detail.ownership.clone())]),
        Line::from(vec![label("Setting"), Span::raw(detail.setting.clone())]),
        Line::from(vec![label("County"), Span::raw(detail.county.clone())]),
    ];

    if !detail.services.is_empty() {
        content.push(Line::from(vec![
            label("Services"),
            Span::raw(wrap_text(&detail.services.join(", "), 40)),
        ]));
    }

    for section in &detail.sections {
        content.push(Line::from(""));
        content.push(heading(format!("{}  {}", section.name, stars_text(section.score))));
        for metric in &section.metrics {
            content.push(Line::from(vec![
                Span::raw(format!("    {:<24}", truncate(&metric.label, 24))),
                Span::styled(
                    format!("{} {}", stars_text(metric.stars), metric.raw),
                    Style::default().fg(star_color(metric.stars)),
                ),
            ]));
        }
    }

    content.push(Line::from(""));
    content.push(heading("Grades".to_string()));
    for badge in &detail.badges {
        content.push(Line::from(vec![
            Span::raw(format!("    {:<28}", badge.label)),
            Span::styled(badge.raw.clone(), Style::default().fg(star_color(badge.stars))),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![Span::styled(
        "  Press Enter to close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )]));

    let detail_panel = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Hospital Details "),
    );

    f.render_widget(detail_panel, area);
}

fn wrap_text(text: &str, width: usize) -> String {
    if text.len() <= width {
        text.to_string()
    } else {
        let mut result = String::new();
        let mut current_line = String::new();

        for word in text.split_whitespace() {
            if current_line.len() + word.len() < width {
                if !current_line.is_empty() {
                    current_line.push(' ');
                }
                current_line.push_str(word);
            } else {
                if !result.is_empty() {
                    result.push_str("\n  ");
                }
                result.push_str(&current_line);
                current_line = word.to_string();
            }
        }

        if !current_line.is_empty() {
            if !result.is_empty() {
                result.push_str("\n  ");
            }
            result.push_str(&current_line);
        }

        result
    }
}
