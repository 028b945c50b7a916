use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use ratatui::Frame;

use kinfolk_config::DetailTab;
use kinfolk_core::dto::ContactRow;
use kinfolk_core::rules::reminders::countdown_text;
use kinfolk_core::rules::{birthday_badge, BirthdayBadge, SortColumn, SortDirection};

use crate::app::{App, ConfirmState, Mode, PageView};
use crate::forms::Form;

pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let size = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(size);

    render_header(frame, chunks[0], app);

    if app.page_path().is_some() {
        render_page(frame, chunks[1], app);
    } else {
        render_table(frame, chunks[1], app);
    }

    render_footer(frame, chunks[2], app);

    if app.show_help {
        render_help(frame, size);
    }

    match &app.mode {
        Mode::Form(form) => render_form(frame, size, app, form),
        Mode::Confirm(state) => render_confirm(frame, size, state),
        _ => {}
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut title = vec![Span::styled(
        format!("{}  {} / {}", app.t("contacts_title"), app.rows.len(), app.total),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if app.skipped > 0 {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            app.text
                .format("skipped_files", &[("count", app.skipped.to_string().as_str())]),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(dir) = &app.missing_folder {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            app.text
                .format("folder_not_found", &[("folder", dir.display().to_string().as_str())]),
            Style::default().fg(Color::Red),
        ));
    }

    let lines = vec![Line::from(title), search_line(app)];
    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("kinfolk"));
    frame.render_widget(paragraph, area);
}

fn search_line(app: &App) -> Line<'static> {
    let search = &app.search;
    let prefix = Span::styled("/ ", Style::default().fg(Color::DarkGray));
    if search.text().is_empty() && !search.is_focused() {
        return Line::from(vec![
            prefix,
            Span::styled(
                app.t("search_placeholder").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
    }

    let text_style = if search.is_focused() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let before: String = search.text().chars().take(search.caret()).collect();
    let after: String = search.text().chars().skip(search.caret()).collect();
    let mut spans = vec![prefix, Span::styled(before, text_style)];
    if search.is_focused() {
        spans.push(Span::styled(
            "│",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    spans.push(Span::styled(after, text_style));
    Line::from(spans)
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let hint = match &app.mode {
        Mode::Table => "j/k move  enter open  / search  1-7 sort  a add  i interaction  d delete  r refresh  ? help",
        Mode::Search => "type to filter  enter keep  esc clear",
        Mode::Page(_) => "esc back  tab switch  j/k field  e edit  + add  - remove  n notes  i log  J/K entry  E edit  X delete  r rename  d delete",
        Mode::Form(form) if form.is_relationship_focus() => {
            "tab next  shift+tab prev  enter select  ctrl+n next type  ctrl+s save  esc cancel"
        }
        Mode::Form(_) => "tab next  shift+tab prev  enter select  ctrl+s save  esc cancel",
        Mode::Confirm(_) => "y confirm  n cancel",
    };

    let mut lines = vec![Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    ))];

    if let Some(err) = &app.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Green),
        )));
    }

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn column_label(app: &App, column: SortColumn) -> &str {
    match column {
        SortColumn::Name => app.t("name"),
        SortColumn::Birthday => app.t("birthday"),
        SortColumn::Relationship => app.t("type"),
        SortColumn::Age => app.t("age"),
        SortColumn::FormattedBirthday => column.title(),
        SortColumn::DaysUntilBirthday => app.t("days_left"),
        SortColumn::LastInteraction => app.t("last_interaction"),
    }
}

fn cell_text(row: &ContactRow, column: SortColumn) -> String {
    let dash = || "-".to_string();
    match column {
        SortColumn::Name => row.name.clone(),
        SortColumn::Birthday => row.birthday.clone(),
        SortColumn::Relationship => row.relationship.clone(),
        SortColumn::Age => row.age.map(|age| age.to_string()).unwrap_or_else(dash),
        SortColumn::FormattedBirthday => row.formatted_birthday.clone(),
        SortColumn::DaysUntilBirthday => row
            .days_until_birthday
            .map(|days| days.to_string())
            .unwrap_or_else(dash),
        SortColumn::LastInteraction => row.last_interaction.clone().unwrap_or_else(dash),
    }
}

fn badge_style(badge: Option<BirthdayBadge>) -> (&'static str, Style) {
    match badge {
        Some(BirthdayBadge::Today) => (
            "🎂 ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Some(BirthdayBadge::ThisWeek) => ("• ", Style::default().fg(Color::Magenta)),
        None => ("  ", Style::default()),
    }
}

fn render_table(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.t("contacts_title").to_string());

    if app.rows.is_empty() {
        let message = if app.total == 0 {
            format!("{}. Press 'a' to {}.", app.t("no_contacts"), app.t("add_contact").to_lowercase())
        } else {
            app.t("no_contacts").to_string()
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(SortColumn::ALL.iter().enumerate().map(|(index, column)| {
        let arrow = if app.sort.column == *column {
            match app.sort.direction {
                SortDirection::Ascending => " ▲",
                SortDirection::Descending => " ▼",
            }
        } else {
            ""
        };
        Cell::from(format!("{} {}{}", index + 1, column_label(app, *column), arrow))
    }))
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = app.rows.iter().map(|row| {
        let (marker, style) = badge_style(birthday_badge(row.days_until_birthday));
        let cells = SortColumn::ALL.iter().map(|column| {
            let text = cell_text(row, *column);
            if *column == SortColumn::Name {
                Cell::from(format!("{marker}{text}")).style(style)
            } else {
                Cell::from(text)
            }
        });
        Row::new(cells)
    });

    let widths = [
        Constraint::Min(18),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(18),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");

    let mut state = TableState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_page(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(page) = &app.page else {
        let paragraph =
            Paragraph::new("Loading...").block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(6)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[0]);

    render_page_info(frame, top[0], page);
    render_page_fields(frame, top[1], app, page);
    render_page_tabs(frame, chunks[1], app, page);
}

fn render_page_info(frame: &mut Frame<'_>, area: Rect, page: &PageView) {
    let detail = &page.detail;
    let mut lines = vec![Line::from(Span::styled(
        detail.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(age) = &detail.detailed_age {
        lines.push(Line::from(age.clone()));
    }
    if let Some(days) = detail.days_until_birthday {
        let (marker, style) = badge_style(birthday_badge(Some(days)));
        lines.push(Line::from(Span::styled(
            format!("{marker}{} ({})", countdown_text(days), detail.formatted_birthday),
            style,
        )));
    }
    if let Some(almanac) = &detail.almanac {
        lines.push(Line::from(""));
        lines.push(info_line("Zodiac", almanac.zodiac));
        lines.push(info_line("Chinese zodiac", almanac.chinese_zodiac));
        lines.push(info_line("Season", almanac.season));
        lines.push(info_line("Birthstone", almanac.birthstone));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_page_fields(frame: &mut Frame<'_>, area: Rect, app: &App, page: &PageView) {
    let focused = matches!(app.mode, Mode::Page(_));
    let lines: Vec<Line> = page
        .detail
        .fields
        .iter()
        .enumerate()
        .map(|(index, (key, value))| {
            let mut line = info_line(key, value);
            if focused && index == page.field_cursor {
                line = line.style(Style::default().fg(Color::Black).bg(Color::LightGreen));
            }
            line
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Fields"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_page_tabs(frame: &mut Frame<'_>, area: Rect, app: &App, page: &PageView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let titles = DetailTab::ALL.iter().map(|tab| app.t(tab.key()).to_string());
    let selected = DetailTab::ALL
        .iter()
        .position(|tab| *tab == app.tab)
        .unwrap_or_default();
    let tabs = Tabs::new(titles).select(selected).highlight_style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(tabs, chunks[0]);

    let content = match app.tab {
        DetailTab::Notes => match &page.detail.notes {
            Some(notes) => Text::from(notes.clone()),
            None => muted(app.t("no_notes")),
        },
        DetailTab::Interactions => interaction_lines(app, page),
        DetailTab::Markdown => {
            if page.body.trim().is_empty() {
                muted("-")
            } else {
                Text::from(page.body.clone())
            }
        }
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL))
        .scroll((page.scroll, 0))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[1]);
}

fn interaction_lines(app: &App, page: &PageView) -> Text<'static> {
    if page.detail.interactions.is_empty() {
        return muted(app.t("no_interactions"));
    }
    let mut lines = Vec::new();
    for (index, entry) in page.detail.interactions.iter().enumerate() {
        let date_style = if index == page.interaction_cursor {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let mut text = entry.text.lines();
        lines.push(Line::from(vec![
            Span::styled(entry.date.clone(), date_style),
            Span::raw(" "),
            Span::raw(text.next().unwrap_or_default().to_string()),
        ]));
        for rest in text {
            lines.push(Line::from(format!("           {rest}")));
        }
    }
    Text::from(lines)
}

fn render_form(frame: &mut Frame<'_>, area: Rect, app: &App, form: &Form) {
    let modal = centered_rect(70, 70, area);
    frame.render_widget(Clear, modal);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.t(form.title_key()).to_string());
    let mut lines = Vec::new();
    for (index, input) in form.inputs.iter().enumerate() {
        let focused = form.focus() == index;
        let mut values = input.value.split('\n');
        lines.push(field_line(
            app.t(input.label),
            values.next().unwrap_or_default(),
            focused,
        ));
        for rest in values {
            lines.push(field_line("", rest, focused));
        }
    }
    if form.is_relationship_focus() && !app.relationship_types.is_empty() {
        lines.push(Line::from(Span::styled(
            app.relationship_types.join(", "),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    let save_style = if form.is_save_focus() {
        Style::default().fg(Color::Black).bg(Color::LightGreen)
    } else {
        Style::default().fg(Color::Green)
    };
    let cancel_style = if form.is_cancel_focus() {
        Style::default().fg(Color::Black).bg(Color::LightRed)
    } else {
        Style::default().fg(Color::Red)
    };
    lines.push(Line::from(vec![
        Span::styled(format!("[{}]", app.t("save")), save_style),
        Span::raw("  "),
        Span::styled(format!("[{}]", app.t("cancel")), cancel_style),
    ]));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, modal);
}

fn render_confirm(frame: &mut Frame<'_>, area: Rect, state: &ConfirmState) {
    let modal = centered_rect(50, 30, area);
    frame.render_widget(Clear, modal);
    let paragraph = Paragraph::new(format!("{} (y/n)", state.message))
        .block(Block::default().borders(Borders::ALL).title("Confirm"))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, modal);
}

fn render_help(frame: &mut Frame<'_>, area: Rect) {
    let modal = centered_rect(70, 80, area);
    frame.render_widget(Clear, modal);

    let text = vec![
        Line::from("Global: q quit (table and page), Ctrl+C quit, ? help"),
        Line::from("Table: j/k move, enter open, / search, esc clear search, 1-7 sort by column (again to flip), a add, i log interaction, d delete, r refresh"),
        Line::from("Search: type to filter by name, enter keep, esc clear"),
        Line::from("Page: esc back, tab next tab, j/k field, e edit field, + add field, - remove field, n notes, r rename, d delete"),
        Line::from("Interactions: i add, J/K select, E edit, X delete, PgUp/PgDn scroll"),
        Line::from("Forms: tab/shift+tab move, enter activate (new line in text areas), ctrl+s save, ctrl+n next relationship type, esc cancel"),
        Line::from(""),
        Line::from("The table follows changes made to the folder by other programs."),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, modal);
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let label = if label.is_empty() {
        String::from("  ")
    } else {
        format!("{label}: ")
    };
    Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(value.to_string(), style),
    ])
}

fn info_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value.to_string()),
    ])
}

fn muted(message: &str) -> Text<'static> {
    Text::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
