//! Terminal rendering of the training form using ratatui
//!
//! The screen owns no form state. It draws `FormState` through the
//! controller, maps keys onto controller calls and runs the connectivity
//! probe on a worker thread whose result is applied on the next tick.

use std::io::{stdout, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::debug;

use crate::cloud::{CloudSession, HealthProbe, ProbeError};
use crate::form::{BodyTab, ConnectionStatus, FormController, ModelMode, ParamField};

type ProbeResult = Result<bool, ProbeError>;

/// How the user left the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenExit {
    /// Train with the current settings
    Submit,
    /// Closed without training
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Target,
    Partition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    Name,
    Description,
}

/// Popup currently layered over the form
enum Popup {
    None,
    SelectColumn {
        role: ColumnRole,
        search: String,
        filtered: Vec<usize>,
        selected: usize,
    },
    SelectIdColumns {
        search: String,
        filtered: Vec<usize>,
        selected: usize,
        checked: Vec<String>,
    },
    SelectModel {
        selected: usize,
    },
    SelectMachine {
        selected: usize,
    },
    EditText {
        field: TextField,
        input: String,
    },
}

// ============================================================================
// Terminal Setup
// ============================================================================

/// Setup terminal for TUI rendering with panic-safe cleanup
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        teardown_terminal();
        original_hook(panic_info);
    }));

    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
pub fn teardown_terminal() {
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
}

// ============================================================================
// Entry Point
// ============================================================================

/// Show the training form until the user submits or cancels.
///
/// The session is updated in place when a different machine is picked.
pub fn run_form(
    controller: &mut FormController,
    session: &mut CloudSession,
    dataset_label: &str,
) -> Result<ScreenExit> {
    let mut terminal = setup_terminal()?;
    let result = run_form_loop(&mut terminal, controller, session, dataset_label);
    teardown_terminal();
    result
}

fn spawn_probe(session: &CloudSession, host: &str, tx: &Sender<ProbeResult>) {
    let session = session.clone();
    let host = host.to_string();
    let tx = tx.clone();
    thread::spawn(move || {
        let result = session.probe(&host);
        // The form may already be closed; a dropped receiver is fine
        let _ = tx.send(result);
    });
}

fn run_form_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: &mut FormController,
    session: &mut CloudSession,
    dataset_label: &str,
) -> Result<ScreenExit> {
    let (tx, rx): (Sender<ProbeResult>, Receiver<ProbeResult>) = mpsc::channel();
    spawn_probe(session, controller.host(), &tx);

    let mut popup = Popup::None;
    let mut focus: usize = 0;
    let mut message: Option<String> = None;

    loop {
        while let Ok(result) = rx.try_recv() {
            let status = controller.apply_probe_result(result);
            debug!(%status, "connectivity updated");
        }

        terminal.draw(|frame| {
            draw_ui(frame, controller, &popup, focus, message.as_deref(), dataset_label);
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match &mut popup {
            Popup::None => {
                message = None;
                let fields = controller.visible_fields();
                match key.code {
                    KeyCode::Enter => {
                        if controller.submit_enabled() {
                            return Ok(ScreenExit::Submit);
                        }
                        message = Some("Select a target column first".to_string());
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        controller.cancel()?;
                        return Ok(ScreenExit::Cancel);
                    }
                    KeyCode::Char('m') | KeyCode::Char('M') => {
                        let mode = controller.state().mode.toggled();
                        match controller.set_mode(mode, &*session) {
                            Ok(()) if mode == ModelMode::Existing
                                && controller.state().known_models.is_empty() =>
                            {
                                message = Some("No existing models available".to_string());
                            }
                            Ok(()) => {}
                            Err(e) => message = Some(e.to_string()),
                        }
                    }
                    KeyCode::Char('l') | KeyCode::Char('L') => {
                        if controller.visibility().model_selector {
                            popup = Popup::SelectModel {
                                selected: controller
                                    .state()
                                    .selected_existing_model
                                    .map_or(0, |i| i + 1),
                            };
                        }
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') => {
                        if controller.visibility().identity_fields {
                            popup = Popup::EditText {
                                field: TextField::Name,
                                input: controller.state().model_name.clone(),
                            };
                        }
                    }
                    KeyCode::Char('d') | KeyCode::Char('D') => {
                        if controller.visibility().identity_fields {
                            popup = Popup::EditText {
                                field: TextField::Description,
                                input: controller.state().model_description.clone(),
                            };
                        }
                    }
                    KeyCode::Char('t') | KeyCode::Char('T') => {
                        popup = column_popup(controller, ColumnRole::Target);
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        popup = column_popup(controller, ColumnRole::Partition);
                    }
                    KeyCode::Char('i') | KeyCode::Char('I') => {
                        let labels = id_labels(controller);
                        popup = Popup::SelectIdColumns {
                            search: String::new(),
                            filtered: (0..labels.len()).collect(),
                            selected: 0,
                            checked: controller.state().id_columns.clone(),
                        };
                    }
                    KeyCode::Char('o') | KeyCode::Char('O') => {
                        if let Err(e) = controller.toggle_optimise() {
                            message = Some(e.to_string());
                        }
                        focus = 0;
                    }
                    KeyCode::Char('h') | KeyCode::Char('H') => {
                        if !controller.state().machines.is_empty() {
                            popup = Popup::SelectMachine {
                                selected: controller.state().selected_machine.unwrap_or(0),
                            };
                        }
                    }
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        spawn_probe(session, controller.host(), &tx);
                    }
                    KeyCode::Tab => {
                        controller.switch_tab();
                        focus = 0;
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        focus = focus.saturating_sub(1);
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        if focus + 1 < fields.len() {
                            focus += 1;
                        }
                    }
                    KeyCode::Left | KeyCode::Right => {
                        let steps = if key.code == KeyCode::Left { -1 } else { 1 };
                        if let Some(field) = fields.get(focus) {
                            if let Err(e) = controller.nudge(*field, steps) {
                                message = Some(e.to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Popup::SelectColumn {
                role,
                search,
                filtered,
                selected,
            } => match key.code {
                KeyCode::Enter => {
                    let options = column_options(controller, *role);
                    if let Some(&idx) = filtered.get(*selected) {
                        let column = options[idx].clone();
                        let result = match role {
                            ColumnRole::Target => controller.select_target(column),
                            ColumnRole::Partition => controller.select_partition(column),
                        };
                        if let Err(e) = result {
                            message = Some(e.to_string());
                        }
                    }
                    popup = Popup::None;
                }
                KeyCode::Esc => popup = Popup::None,
                KeyCode::Up => *selected = selected.saturating_sub(1),
                KeyCode::Down => {
                    if *selected + 1 < filtered.len() {
                        *selected += 1;
                    }
                }
                KeyCode::Backspace => {
                    search.pop();
                    let labels = option_labels(&column_options(controller, *role));
                    *filtered = update_filtered(search, &labels);
                    *selected = 0;
                }
                KeyCode::Char(c) => {
                    search.push(c);
                    let labels = option_labels(&column_options(controller, *role));
                    *filtered = update_filtered(search, &labels);
                    *selected = 0;
                }
                _ => {}
            },
            Popup::SelectIdColumns {
                search,
                filtered,
                selected,
                checked,
            } => match key.code {
                KeyCode::Enter => {
                    if let Err(e) = controller.set_id_columns(checked.clone()) {
                        message = Some(e.to_string());
                    }
                    popup = Popup::None;
                }
                KeyCode::Esc => popup = Popup::None,
                KeyCode::Char(' ') => {
                    let labels = id_labels(controller);
                    if let Some(column) = filtered.get(*selected).map(|&i| &labels[i]) {
                        match checked.iter().position(|c| c == column) {
                            Some(pos) => {
                                checked.remove(pos);
                            }
                            None => checked.push(column.clone()),
                        }
                    }
                }
                KeyCode::Up => *selected = selected.saturating_sub(1),
                KeyCode::Down => {
                    if *selected + 1 < filtered.len() {
                        *selected += 1;
                    }
                }
                KeyCode::Backspace => {
                    search.pop();
                    *filtered = update_filtered(search, &id_labels(controller));
                    *selected = 0;
                }
                KeyCode::Char(c) => {
                    search.push(c);
                    *filtered = update_filtered(search, &id_labels(controller));
                    *selected = 0;
                }
                _ => {}
            },
            Popup::SelectModel { selected } => match key.code {
                KeyCode::Enter => {
                    // Row 0 is the empty placeholder
                    let index = selected.checked_sub(1);
                    if let Err(e) = controller.select_existing_model(index) {
                        message = Some(e.to_string());
                    }
                    popup = Popup::None;
                }
                KeyCode::Esc => popup = Popup::None,
                KeyCode::Up => *selected = selected.saturating_sub(1),
                KeyCode::Down => {
                    if *selected < controller.state().known_models.len() {
                        *selected += 1;
                    }
                }
                _ => {}
            },
            Popup::SelectMachine { selected } => match key.code {
                KeyCode::Enter => {
                    match controller.select_machine(*selected) {
                        Ok(machine_id) => {
                            session.set_machine(machine_id);
                            spawn_probe(session, controller.host(), &tx);
                        }
                        Err(e) => message = Some(e.to_string()),
                    }
                    popup = Popup::None;
                }
                KeyCode::Esc => popup = Popup::None,
                KeyCode::Up => *selected = selected.saturating_sub(1),
                KeyCode::Down => {
                    if *selected + 1 < controller.state().machines.len() {
                        *selected += 1;
                    }
                }
                _ => {}
            },
            Popup::EditText { field, input } => match key.code {
                KeyCode::Enter => {
                    let value = input.trim().to_string();
                    let result = match field {
                        TextField::Name => controller.set_model_name(value),
                        TextField::Description => controller.set_model_description(value),
                    };
                    if let Err(e) = result {
                        message = Some(e.to_string());
                    }
                    popup = Popup::None;
                }
                KeyCode::Esc => popup = Popup::None,
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            },
        }
    }
}

fn column_options(controller: &FormController, role: ColumnRole) -> &[Option<String>] {
    match role {
        ColumnRole::Target => &controller.candidates().target,
        ColumnRole::Partition => &controller.candidates().partition,
    }
}

fn column_popup(controller: &FormController, role: ColumnRole) -> Popup {
    let count = column_options(controller, role).len();
    Popup::SelectColumn {
        role,
        search: String::new(),
        filtered: (0..count).collect(),
        selected: 0,
    }
}

/// ID candidates without the placeholder entry or the chosen target
fn id_labels(controller: &FormController) -> Vec<String> {
    let target = controller.state().target_column.as_deref();
    controller
        .candidates()
        .id
        .iter()
        .flatten()
        .filter(|c| Some(c.as_str()) != target)
        .cloned()
        .collect()
}

fn option_labels(options: &[Option<String>]) -> Vec<String> {
    options
        .iter()
        .map(|o| o.clone().unwrap_or_else(|| "(none)".to_string()))
        .collect()
}

/// Indices of labels matching the search query (case-insensitive)
fn update_filtered(search: &str, labels: &[String]) -> Vec<usize> {
    let search_lower = search.to_lowercase();
    labels
        .iter()
        .enumerate()
        .filter(|(_, label)| label.to_lowercase().contains(&search_lower))
        .map(|(i, _)| i)
        .collect()
}

// ============================================================================
// Drawing
// ============================================================================

fn label(text: &str) -> Span<'static> {
    Span::styled(format!("  {:<14}", text), Style::default().fg(Color::DarkGray))
}

fn value_or(value: Option<&str>, placeholder: &str) -> Span<'static> {
    match value {
        Some(v) if !v.is_empty() => Span::styled(v.to_string(), Style::default().fg(Color::White)),
        _ => Span::styled(placeholder.to_string(), Style::default().fg(Color::Yellow)),
    }
}

fn key_hint(key: &str, action: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled("[", Style::default().fg(Color::DarkGray)),
        Span::styled(key.to_string(), Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("] {}  ", action), Style::default().fg(Color::White)),
    ]
}

fn status_span(status: ConnectionStatus) -> Span<'static> {
    let color = match status {
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Offline => Color::Red,
        ConnectionStatus::Unknown => Color::DarkGray,
    };
    Span::styled(format!("● {}", status), Style::default().fg(color).bold())
}

fn draw_ui(
    frame: &mut Frame,
    controller: &FormController,
    popup: &Popup,
    focus: usize,
    message: Option<&str>,
    dataset_label: &str,
) {
    let vis = controller.visibility();
    if !vis.header {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(8),
            Constraint::Length(5),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], controller, dataset_label);
    if vis.body {
        draw_body(frame, chunks[1], controller, focus);
    }
    if vis.footer {
        draw_footer(frame, chunks[2], controller, message);
    }

    match popup {
        Popup::None => {}
        Popup::SelectColumn {
            role,
            search,
            filtered,
            selected,
        } => {
            let labels = option_labels(column_options(controller, *role));
            let items: Vec<String> = filtered.iter().map(|&i| labels[i].clone()).collect();
            let (title, color) = match role {
                ColumnRole::Target => (" Select Target Column ", Color::Magenta),
                ColumnRole::Partition => (" Select Partition Column ", Color::Blue),
            };
            draw_list_popup(frame, title, color, Some(search.as_str()), &items, *selected, "select");
        }
        Popup::SelectIdColumns {
            search,
            filtered,
            selected,
            checked,
        } => {
            let labels = id_labels(controller);
            let items: Vec<String> = filtered
                .iter()
                .map(|&i| {
                    let mark = if checked.contains(&labels[i]) { "[x]" } else { "[ ]" };
                    format!("{} {}", mark, labels[i])
                })
                .collect();
            let title = format!(" ID Columns ({} selected) ", checked.len());
            draw_list_popup(frame, &title, Color::Green, Some(search.as_str()), &items, *selected, "confirm");
        }
        Popup::SelectModel { selected } => {
            let items: Vec<String> = std::iter::once("(none)".to_string())
                .chain(controller.state().known_models.iter().map(|m| m.name.clone()))
                .collect();
            draw_list_popup(frame, " Existing Models ", Color::Cyan, None, &items, *selected, "select");
        }
        Popup::SelectMachine { selected } => {
            let items: Vec<String> = controller
                .state()
                .machines
                .iter()
                .map(|m| format!("{} ({})", m.label, m.id))
                .collect();
            draw_list_popup(frame, " Select Machine ", Color::Yellow, None, &items, *selected, "select");
        }
        Popup::EditText { field, input } => {
            let title = match field {
                TextField::Name => " Model Name ",
                TextField::Description => " Model Description ",
            };
            draw_edit_popup(frame, title, input);
        }
    }
}

fn draw_header(frame: &mut Frame, area: Rect, controller: &FormController, dataset_label: &str) {
    let state = controller.state();
    let vis = controller.visibility();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" xtrain | Binary Classification ")
        .title_style(Style::default().fg(Color::Cyan).bold());

    let mut lines = vec![Line::from(vec![
        label("Dataset:"),
        Span::styled(dataset_label.to_string(), Style::default().fg(Color::White)),
    ])];

    lines.push(Line::from(vec![
        label("Mode:"),
        Span::styled(state.mode.label(), Style::default().fg(Color::Magenta).bold()),
    ]));

    if vis.identity_fields {
        lines.push(Line::from(vec![
            label("Name:"),
            value_or(Some(state.model_name.as_str()), "<unnamed>"),
        ]));
        lines.push(Line::from(vec![
            label("Description:"),
            value_or(Some(state.model_description.as_str()), "-"),
        ]));
    }
    if vis.model_selector {
        let selected = state
            .selected_existing_model
            .and_then(|i| state.known_models.get(i))
            .map(|m| m.name.as_str());
        lines.push(Line::from(vec![
            label("Model:"),
            value_or(selected, "Select a model"),
        ]));
        lines.push(Line::from(vec![
            label("Description:"),
            Span::styled(
                state.description_display.clone(),
                Style::default().fg(Color::DarkGray).italic(),
            ),
        ]));
    }

    let machine = state
        .selected_machine()
        .map(|m| format!("{} ({})", m.label, m.id));
    lines.push(Line::from(vec![
        label("Machine:"),
        value_or(machine.as_deref(), "default"),
        Span::raw("   "),
        status_span(state.connection_status),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_body(frame: &mut Frame, area: Rect, controller: &FormController, focus: usize) {
    let state = controller.state();
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let id_display = if state.id_columns.is_empty() {
        "None".to_string()
    } else {
        state.id_columns.join(", ")
    };
    let optimise_span = if state.optimise_enabled {
        Span::styled("On", Style::default().fg(Color::Green).bold())
    } else {
        Span::styled("Off", Style::default().fg(Color::DarkGray))
    };
    let columns = vec![
        Line::from(""),
        Line::from(vec![
            label("Target:"),
            value_or(state.target_column.as_deref(), "⚠ Not selected"),
        ]),
        Line::from(vec![
            Span::styled(
                format!("  {:<14}", state.id_label()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            label(""),
            Span::styled(id_display, Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            label("Partition:"),
            value_or(state.partition_column.as_deref(), "None"),
        ]),
        Line::from(vec![label("Optimise:"), optimise_span]),
    ];
    let left = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Columns ");
    frame.render_widget(Paragraph::new(columns).block(left), halves[0]);

    let tab_style = |tab: BodyTab| {
        if state.active_tab == tab {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let title = Line::from(vec![
        Span::raw(" "),
        Span::styled(" Parameters ", tab_style(BodyTab::Parameters)),
        Span::raw(" "),
        Span::styled(" Settings ", tab_style(BodyTab::Settings)),
        Span::raw(" "),
    ]);
    let right = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);
    let inner = right.inner(halves[1]);
    frame.render_widget(right, halves[1]);

    let fields = controller.visible_fields();
    let items: Vec<ListItem> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| field_item(controller, *field, i == focus))
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(focus.min(fields.len().saturating_sub(1))));
    frame.render_stateful_widget(List::new(items), inner, &mut list_state);
}

fn field_item(controller: &FormController, field: ParamField, focused: bool) -> ListItem<'static> {
    let value = controller.field_value(field);
    let line = if focused {
        Line::from(vec![
            Span::styled(
                format!("  {:<22}", field.label()),
                Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
            ),
            Span::styled(format!(" ◀ {} ▶", value), Style::default().fg(Color::Yellow).bold()),
        ])
    } else {
        Line::from(vec![
            Span::styled(format!("  {:<22}", field.label()), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("   {}", value), Style::default().fg(Color::Green)),
        ])
    };
    ListItem::new(line)
}

fn draw_footer(frame: &mut Frame, area: Rect, controller: &FormController, message: Option<&str>) {
    let enabled = controller.submit_enabled();
    let enter_style = if enabled {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let train_style = if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut first = vec![
        Span::styled("  [", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", enter_style),
        Span::styled("] Train model  ", train_style),
    ];
    first.extend(key_hint("Q", "Close"));
    first.extend(key_hint("M", "Mode"));
    if controller.visibility().identity_fields {
        first.extend(key_hint("N/D", "Name/Desc"));
    } else {
        first.extend(key_hint("L", "Pick model"));
    }

    let mut second = vec![Span::raw("  ")];
    second.extend(key_hint("T", "Target"));
    second.extend(key_hint("I", "IDs"));
    second.extend(key_hint("P", "Partition"));
    second.extend(key_hint("O", "Optimise"));
    second.extend(key_hint("Tab", "Tab"));
    second.extend(key_hint("H", "Machine"));
    second.extend(key_hint("C", "Check"));

    let status = match message {
        Some(msg) => Line::from(Span::styled(
            format!("  {}", msg),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "  ↑/↓ field  ←/→ adjust",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(vec![Line::from(first), Line::from(second), status]).block(block);
    frame.render_widget(paragraph, area);
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn draw_list_popup(
    frame: &mut Frame,
    title: &str,
    color: Color,
    search: Option<&str>,
    items: &[String],
    selected: usize,
    enter_action: &str,
) {
    let popup_area = centered_fixed_rect(50, 18, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string())
        .title_style(Style::default().fg(color).bold());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let search_height = if search.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(search_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    if let Some(search) = search {
        let search_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Search ")
            .title_style(Style::default().fg(Color::DarkGray));
        let search_para = Paragraph::new(Line::from(vec![
            Span::styled(search.to_string(), Style::default().fg(Color::White)),
            Span::styled("▌", Style::default().fg(color)),
        ]))
        .block(search_block);
        frame.render_widget(search_para, chunks[0]);
    }

    let max_visible = chunks[1].height as usize;
    let start_idx = if selected >= max_visible {
        selected - max_visible + 1
    } else {
        0
    };
    let list_items: Vec<ListItem> = items
        .iter()
        .enumerate()
        .skip(start_idx)
        .take(max_visible)
        .map(|(i, item)| {
            let style = if i == selected {
                Style::default().fg(Color::Black).bg(color).bold()
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("  {}", item)).style(style)
        })
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(selected.saturating_sub(start_idx)));
    frame.render_stateful_widget(List::new(list_items), chunks[1], &mut list_state);

    let mut help = vec![
        Span::styled("  Enter", Style::default().fg(Color::Cyan)),
        Span::styled(format!(" {}  ", enter_action), Style::default().fg(Color::DarkGray)),
    ];
    if enter_action == "confirm" {
        help.push(Span::styled("Space", Style::default().fg(Color::Cyan)));
        help.push(Span::styled(" toggle  ", Style::default().fg(Color::DarkGray)));
    }
    help.push(Span::styled("Esc", Style::default().fg(Color::Cyan)));
    help.push(Span::styled(" cancel", Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(help)), chunks[2]);
}

fn draw_edit_popup(frame: &mut Frame, title: &str, input: &str) {
    let popup_area = centered_fixed_rect(60, 7, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title.to_string())
        .title_style(Style::default().fg(Color::Yellow).bold());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Value: ", Style::default().fg(Color::DarkGray)),
            Span::styled(input.to_string(), Style::default().fg(Color::White).bold()),
            Span::styled("▌", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", Style::default().fg(Color::Cyan)),
            Span::styled(" to confirm, ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Cyan)),
            Span::styled(" to cancel", Style::default().fg(Color::DarkGray)),
        ]),
    ];
    frame.render_widget(Paragraph::new(content), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_filtered_case_insensitive() {
        let labels = vec!["(none)".to_string(), "Churn".to_string(), "region".to_string()];
        assert_eq!(update_filtered("", &labels), vec![0, 1, 2]);
        assert_eq!(update_filtered("CH", &labels), vec![1]);
        assert_eq!(update_filtered("zzz", &labels), Vec::<usize>::new());
    }

    #[test]
    fn test_option_labels_placeholder() {
        let labels = option_labels(&[None, Some("a".to_string())]);
        assert_eq!(labels, vec!["(none)".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_id_labels_hide_selected_target() {
        use crate::dataset::{CandidateThresholds, ColumnCandidates};
        use polars::prelude::*;

        let df = df! {
            "churn" => [0i32, 1, 0, 1],
            "source" => ["crm", "crm", "crm", "crm"],
            "tenant" => ["acme", "acme", "acme", "acme"],
        }
        .unwrap();
        let candidates = ColumnCandidates::from_stats(&df, CandidateThresholds::default()).unwrap();
        let mut controller = FormController::new(candidates, Vec::new(), "http://localhost");
        assert_eq!(id_labels(&controller), vec!["source", "tenant"]);

        controller.select_target(Some("source".to_string())).unwrap();
        assert_eq!(id_labels(&controller), vec!["tenant"]);
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let rect = centered_fixed_rect(50, 18, Rect::new(0, 0, 40, 10));
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 10);
    }
}
