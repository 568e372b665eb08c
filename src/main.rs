use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use lecturebank::app::{App, AppScreen, NoticeLevel};
use lecturebank::backend::http::HttpBackend;
use lecturebank::config::Config;
use lecturebank::engine::generation::GenerationPhase;
use lecturebank::event::{AppEvent, EventHandler};
use lecturebank::logging;
use lecturebank::ui::components::history_list::HistoryList;
use lecturebank::ui::components::progress_bar::ProgressBar;
use lecturebank::ui::components::question_view::QuestionView;
use lecturebank::ui::components::unit_list::UnitList;
use lecturebank::ui::layout::{AppLayout, centered_rect, pack_hint_lines, split_unit_screen};
use lecturebank::ui::line_input::{InputField, InputResult};
use lecturebank::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "lecturebank", version, about = "Generate and practise quiz questions from your lecture notes")]
struct Cli {
    #[arg(long, help = "Base URL of the question service")]
    api_url: Option<String>,

    #[arg(long, help = "User id sent with every request")]
    user_id: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory exported sets are written to")]
    export_dir: Option<String>,

    #[arg(short, long, help = "Log debug output")]
    verbose: bool,

    #[arg(long, help = "Print the bundled theme names and exit")]
    list_themes: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.list_themes {
        for name in Theme::available_themes() {
            println!("{name}");
        }
        return Ok(());
    }
    let log_path = logging::init_tracing(cli.verbose)?;

    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "could not read config, using defaults");
        Config::default()
    });
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }
    config.validate();
    tracing::info!(api = %config.api_base_url, log = %log_path.display(), "starting lecturebank");

    let backend = Arc::new(HttpBackend::new(&config)?);
    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, backend, events.sender());
    app.refresh_units();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Backend(event) => app.handle_backend_event(event),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    app.notice = None;

    if let Some(input) = app.input.as_mut() {
        match input.handle(key) {
            InputResult::Continue => app.sync_input(),
            InputResult::Submit => app.submit_input(),
            InputResult::Cancel => app.cancel_input(),
        }
        return;
    }

    match app.screen {
        AppScreen::Units => handle_units_key(app, key),
        AppScreen::Unit => handle_unit_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
    }
}

fn handle_units_key(app: &mut App, key: KeyEvent) {
    let count = app.units.units().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down if count > 0 => {
            app.unit_selected = (app.unit_selected + 1) % count;
        }
        KeyCode::Char('k') | KeyCode::Up if count > 0 => {
            app.unit_selected = (app.unit_selected + count - 1) % count;
        }
        KeyCode::Enter => app.select_highlighted_unit(),
        KeyCode::Char('n') => app.open_input(InputField::UnitTitle),
        KeyCode::Char('r') => app.refresh_units(),
        _ => {}
    }
}

fn handle_unit_key(app: &mut App, key: KeyEvent) {
    if app.history_confirm_delete {
        match key.code {
            KeyCode::Char('y') => {
                app.delete_highlighted_set();
                app.history_confirm_delete = false;
            }
            KeyCode::Char('n') | KeyCode::Esc => app.history_confirm_delete = false,
            _ => {}
        }
        return;
    }

    let visible = app.visible_history().len();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.deselect_unit(),
        KeyCode::Char('j') | KeyCode::Down if visible > 0 => {
            app.history_selected = (app.history_selected + 1).min(visible - 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.history_selected = app.history_selected.saturating_sub(1);
        }
        KeyCode::Enter => app.view_highlighted_set(),
        KeyCode::Char('x') | KeyCode::Delete if visible > 0 => app.history_confirm_delete = true,
        KeyCode::Char('e') => {
            if let Some(id) = app.highlighted_set_id() {
                app.export_set(&id);
            }
        }
        KeyCode::Char('f') => app.toggle_export_format(),
        KeyCode::Char('g') | KeyCode::Char('t') => app.open_input(InputField::Topic),
        KeyCode::Char('s') => app.generation.cycle_style(),
        KeyCode::Char('u') => app.open_input(InputField::UploadPath),
        KeyCode::Char('c') => app.cancel_upload(),
        KeyCode::Char('/') => app.open_input(InputField::Search),
        KeyCode::Char('r') => {
            app.search_term.clear();
            app.load_history();
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_set(),
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Right | KeyCode::Char('l') => {
            app.next_question()
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::Left | KeyCode::Char('h') => {
            app.prev_question()
        }
        KeyCode::Char(c @ '1'..='9') => app.choose_option(c as usize - '1' as usize),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_reveal(),
        KeyCode::Char('e') => {
            if let Some(id) = app.sets.displayed().map(|s| s.id.clone()) {
                app.export_set(&id);
            }
        }
        KeyCode::Char('x') => {
            if let Some(id) = app.sets.displayed().map(|s| s.id.clone()) {
                app.delete_set(&id);
            }
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let hints = hints_for(app);
    let footer_lines = pack_hint_lines(&hints, area.width as usize);
    let layout = AppLayout::new(area, footer_lines.len() as u16 + 1);

    render_header(frame, app, layout.header);
    match app.screen {
        AppScreen::Units => frame.render_widget(
            UnitList::new(app.units.units(), app.unit_selected, app.units_loading, app.theme),
            layout.main,
        ),
        AppScreen::Unit => render_unit(frame, app, layout.main),
        AppScreen::Quiz => render_quiz(frame, app, layout.main),
    }
    render_footer(frame, app, layout.footer, footer_lines);

    if app.input.is_some() {
        render_input(frame, app, area);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let location = match app.units.current() {
        Some(unit) => format!(" {} ", unit.title),
        None => " Units ".to_string(),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " lecturebank ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(location, Style::default().fg(colors.header_fg()).bg(colors.header_bg())),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_unit(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let (controls, history_area) = split_unit_screen(area);

    let control_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Length(3), Constraint::Min(0)])
        .split(controls);

    let status = match app.generation.phase() {
        GenerationPhase::Idle => Span::styled("ready", Style::default().fg(colors.muted())),
        GenerationPhase::Pending => Span::styled("generating...", Style::default().fg(colors.warning())),
        GenerationPhase::Failed(msg) => {
            Span::styled(format!("failed: {msg}"), Style::default().fg(colors.error()))
        }
    };
    let topic = if app.generation.topic().is_empty() {
        Span::styled("(none)", Style::default().fg(colors.muted()))
    } else {
        Span::styled(app.generation.topic().to_string(), Style::default().fg(colors.fg()))
    };
    let generate = Paragraph::new(vec![
        Line::from(vec![Span::raw(" Topic:  "), topic]),
        Line::from(vec![
            Span::raw(" Style:  "),
            Span::styled(app.generation.style().label(), Style::default().fg(colors.accent())),
        ]),
        Line::from(vec![Span::raw(" Status: "), status]),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Export format: {}", app.export_format.label()),
            Style::default().fg(colors.muted()),
        )),
    ])
    .block(
        Block::bordered()
            .title(" Generate ")
            .border_style(Style::default().fg(colors.border())),
    );
    frame.render_widget(generate, control_layout[0]);
    frame.render_widget(ProgressBar::new(&app.upload, app.theme), control_layout[1]);

    let visible = app.visible_history();
    frame.render_widget(
        HistoryList {
            sets: &visible,
            selected: app.history_selected,
            search_term: &app.search_term,
            loading: app.sets.is_loading(),
            confirm_delete: app.history_confirm_delete,
            focused: app.input.is_none(),
            theme: app.theme,
        },
        history_area,
    );
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    if let Some(set) = app.sets.displayed() {
        frame.render_widget(
            QuestionView {
                set,
                responses: &app.responses,
                selected: app.question_selected,
                theme: app.theme,
            },
            area,
        );
    }
}

fn hints_for(app: &App) -> Vec<&'static str> {
    if app.input.is_some() {
        return vec!["[Enter] Confirm", "[Esc] Cancel", "[Tab] Complete path"];
    }
    match app.screen {
        AppScreen::Units => vec!["[j/k] Move", "[Enter] Open", "[n] New unit", "[r] Refresh", "[q] Quit"],
        AppScreen::Unit => vec![
            "[g] Topic",
            "[s] Style",
            "[u] Upload",
            "[c] Cancel upload",
            "[/] Search",
            "[Enter] View",
            "[x] Delete",
            "[e] Export",
            "[f] Format",
            "[r] Reload",
            "[Esc] Units",
        ],
        AppScreen::Quiz => vec![
            "[j/k] Question",
            "[1-9] Answer",
            "[Space] Reveal",
            "[e] Export",
            "[x] Delete",
            "[Esc] Back",
        ],
    }
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hint_lines: Vec<String>) {
    let colors = &app.theme.colors;
    let notice = match &app.notice {
        Some(n) => {
            let color = match n.level {
                NoticeLevel::Info => colors.success(),
                NoticeLevel::Error => colors.error(),
            };
            Line::from(Span::styled(format!("  {}", n.text), Style::default().fg(color)))
        }
        None => Line::from(""),
    };
    let mut lines = vec![notice];
    lines.extend(
        hint_lines
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.accent())))),
    );
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_input(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(input) = &app.input else {
        return;
    };
    let colors = &app.theme.colors;
    let popup = centered_rect(area.width.saturating_sub(8).min(70), 3, area);
    let (before, cursor, after) = input.render_parts();
    let cursor_style = Style::default().fg(colors.bg()).bg(colors.accent());

    let mut spans = vec![Span::styled(before.to_string(), Style::default().fg(colors.fg()))];
    match cursor {
        Some(ch) => spans.push(Span::styled(ch.to_string(), cursor_style)),
        None => spans.push(Span::styled(" ", cursor_style)),
    }
    spans.push(Span::styled(after.to_string(), Style::default().fg(colors.fg())));

    let border = if input.completion_error {
        colors.error()
    } else {
        colors.border_focused()
    };
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(Line::from(spans))
        .block(
            Block::bordered()
                .title(format!(" {} ", input.field().title()))
                .border_style(Style::default().fg(border))
                .style(Style::default().bg(colors.bg())),
        )
        .render(popup, frame.buffer_mut());
}
