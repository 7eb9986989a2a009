use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use crate::compare::fields::{format_fees, format_rank, format_rating};
use crate::output::{format_college_detail, truncate_text};
use crate::tui::app::{App, InputMode, View};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.height < 6 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    match app.current_view {
        View::Browse => render_college_table(frame, chunks[2], app),
        View::Compare => render_comparison(frame, chunks[2], app),
    }
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::Search => render_search_popup(frame, app),
        InputMode::Detail => render_detail_popup(frame, app),
        InputMode::Help => render_help_popup(frame, app),
        InputMode::Normal => {}
    }

    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "College Compare";
    let right = match app.filter.search {
        Some(ref term) => format!("search: {}  |  {}", term, app.source_label),
        None => app.source_label.clone(),
    };
    let padding = (area.width as usize).saturating_sub(title.len() + right.chars().count());

    let line = Line::from(vec![
        Span::styled(title, Style::default().fg(app.theme.title_color).bold()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(app.theme.muted)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles = vec![
        "Browse".to_string(),
        format!("Compare ({}/{})", app.selection.len(), app.selection.max()),
    ];
    let selected = match app.current_view {
        View::Browse => 0,
        View::Compare => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_college_table(frame: &mut Frame, area: Rect, app: &mut App) {
    if app.colleges.is_empty() {
        let text = if app.is_loading {
            ""
        } else {
            "No colleges found"
        };
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
        return;
    }

    let theme = &app.theme;
    // Marker, rank, fees and rating columns plus spacing
    let name_width = (area.width as usize).saturating_sub(3 + 6 + 16 + 8 + 4).max(10);

    let rows: Vec<Row> = app
        .colleges
        .iter()
        .enumerate()
        .map(|(idx, college)| {
            let marker = match app.selection.position(college.id) {
                Some(pos) => Cell::from(format!("[{}]", pos + 1))
                    .style(Style::default().fg(theme.selected_marker).bold()),
                None => Cell::from(" · ").style(Style::default().fg(theme.index_color)),
            };

            let name = Line::from(vec![
                Span::raw(truncate_text(college.display_name(), name_width.saturating_sub(2))),
                Span::styled(
                    format!("  {}", college.location),
                    Style::default().fg(theme.muted),
                ),
            ]);

            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                marker,
                Cell::from(format_rank(college.overall_rank.as_ref())),
                Cell::from(name),
                Cell::from(format_fees(college.fees.as_ref(), college.fees_period)),
                Cell::from(format_rating(college.rating.as_ref())),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(16),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Rank", "College", "Fees", "Rating"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_comparison(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let table = app.comparison_table();

    if table.is_empty() {
        let hint = Paragraph::new(vec![
            Line::from("No colleges selected"),
            Line::from(Span::styled(
                "Press Tab to browse, then Space to add colleges",
                Style::default().fg(theme.muted),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(hint, area);
        return;
    }

    let header_style = |idx: usize| {
        if idx == app.compare_cursor {
            theme.column_selected
        } else {
            theme.header_style
        }
    };

    let mut header_cells = vec![Cell::from("")];
    header_cells.extend(table.columns.iter().enumerate().map(|(idx, col)| {
        Cell::from(vec![
            Line::from(Span::styled(col.index_label.clone(), Style::default().fg(theme.muted))),
            Line::from(Span::styled(col.display_name.clone(), header_style(idx))),
            Line::from(Span::styled(col.location.clone(), Style::default().fg(theme.muted))),
        ])
    }));

    let best_counts = table.best_counts();
    let mut rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![Cell::from(row.label.clone()).style(theme.header_style)];
            cells.extend(row.cells.iter().map(|cell| {
                if cell.is_best {
                    Cell::from(format!("{} ✓", cell.display_text))
                        .style(Style::default().fg(theme.best_fg).bold())
                } else {
                    Cell::from(cell.display_text.clone())
                }
            }));
            let style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let mut summary = vec![Cell::from("Best in").style(Style::default().fg(theme.muted))];
    summary.extend(best_counts.iter().map(|count| {
        Cell::from(format!("{} fields", count)).style(Style::default().fg(theme.muted))
    }));
    rows.push(Row::new(summary).top_margin(1));

    let mut widths = vec![Constraint::Length(16)];
    widths.extend(table.columns.iter().map(|_| Constraint::Fill(1)));

    let widget = Table::new(rows, widths)
        .header(Row::new(header_cells).height(3).bottom_margin(1))
        .column_spacing(2);

    frame.render_widget(widget, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some(ref flash) = app.flash_message {
        let color = if flash.is_error {
            theme.flash_error
        } else {
            theme.flash_success
        };
        Line::from(Span::styled(flash.text.clone(), Style::default().fg(color)))
    } else {
        let count = match app.current_view {
            View::Browse => format!("{} colleges", app.colleges.len()),
            View::Compare => format!("{} selected", app.selection.len()),
        };

        let elapsed = app.last_refresh.elapsed();
        let refresh_time = if elapsed.as_secs() < 60 {
            format!("refreshed {}s ago", elapsed.as_secs())
        } else {
            format!("refreshed {}m ago", elapsed.as_secs() / 60)
        };

        let hints: &[(&str, &str)] = match app.current_view {
            View::Browse => &[
                ("j/k", ":nav "),
                ("Space", ":select "),
                ("Enter", ":details "),
                ("/", ":search "),
                ("Tab", ":compare "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            View::Compare => &[
                ("j/k", ":column "),
                ("d", ":remove "),
                ("c", ":clear "),
                ("z", ":undo "),
                ("Tab", ":browse "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };

        let mut spans = vec![
            Span::styled(count, Style::default().fg(theme.muted)),
            Span::raw(" "),
            Span::styled(refresh_time, Style::default().fg(theme.muted)),
            Span::raw("  "),
        ];
        for (key, label) in hints {
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn popup_block<'a>(title: &'a str, app: &App) -> Block<'a> {
    Block::bordered()
        .title(title)
        .title_style(app.theme.popup_title)
        .border_style(Style::default().fg(app.theme.popup_border))
        .style(Style::default().bg(app.theme.popup_bg))
}

fn render_search_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(50, 4, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Search ", app);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    frame.render_widget(Paragraph::new(format!("{}|", app.search_input)), chunks[0]);
    frame.render_widget(
        Paragraph::new("Enter: search | Esc: cancel | empty = all")
            .style(Style::default().fg(app.theme.muted)),
        chunks[1],
    );
}

fn render_detail_popup(frame: &mut Frame, app: &App) {
    let Some(college) = app.selected_college() else {
        return;
    };
    let area = frame.area();
    let popup_area = centered_rect_fixed(area.width.saturating_sub(8).min(80), 24, area);
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Details ", app);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = format_college_detail(college, false)
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect();
    if let Some(first) = lines.first_mut() {
        *first = Line::from(Span::styled(
            first.to_string(),
            Style::default().fg(app.theme.title_color).bold(),
        ));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "o: open website | Esc: close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_help_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(52, 20, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Keyboard Shortcuts ", app);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let keys = [
        ("j / Down", "Move down"),
        ("k / Up", "Move up"),
        ("Space", "Add/remove college from comparison"),
        ("a", "Add college to comparison"),
        ("d", "Remove college from comparison"),
        ("c", "Clear comparison"),
        ("z", "Undo last change"),
        ("Enter", "Show details"),
        ("o", "Open website"),
        ("/", "Search"),
        ("Tab", "Toggle Browse/Compare"),
        ("r", "Refresh (bypasses cache)"),
        ("?", "Show/hide this help"),
        ("q / Ctrl-c", "Quit"),
    ];

    let key_style = Style::default().fg(app.theme.status_key_color).bold();
    let mut help_lines: Vec<Line> = keys
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{:<14}", key), key_style),
                Span::raw(*action),
            ])
        })
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
    let text = if app.colleges.is_empty() {
        format!("{} Loading colleges...", spinner)
    } else {
        format!("{} Refreshing...", spinner)
    };

    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.title_color)),
        inner,
    );
}
