use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::{average_rating_label, rating_counts};
use crate::ui::styles;
use crate::utils::{format::format_optional, truncate};

/// Render the Reviews tab: summary strip, filterable list, detail panel
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(6)])
        .split(area);

    render_summary(frame, app, chunks[0]);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    render_review_table(frame, app, halves[0]);
    render_review_detail(frame, app, halves[1]);
}

/// Average + per-star counts over the reviews matching the current filter
fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let filtered = app.filtered_reviews();
    let average = average_rating_label(&filtered);
    let counts = rating_counts(&filtered);

    let mut spans = vec![
        Span::styled("Average: ", styles::muted_style()),
        Span::styled(average, styles::title_style()),
        Span::raw("   "),
    ];
    // Highest rating first, matching the dashboard ordering
    for rating in (1..=5).rev() {
        spans.push(Span::styled(
            format!("{}★ ", rating),
            styles::rating_style(rating),
        ));
        spans.push(Span::styled(
            format!("{}  ", counts[(rating - 1) as usize]),
            styles::list_item_style(),
        ));
    }

    let filter_label = match app.period_filter {
        Some(ref period) => format!(" Period: {} ", period),
        None => " All periods ".to_string(),
    };

    let block = Block::default()
        .title(filter_label)
        .title_style(styles::highlight_style())
        .borders(Borders::ALL)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_review_table(frame: &mut Frame, app: &App, area: Rect) {
    let reviews = app.filtered_reviews();
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Employee"),
        Cell::from("Period"),
        Cell::from("Rating"),
        Cell::from("Date"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = reviews
        .iter()
        .map(|review| {
            Row::new(vec![
                Cell::from(review.employee_display()),
                Cell::from(review.review_period.clone()),
                Cell::from(Span::styled(
                    format!("{}/5 {}", review.rating, review.rating_label()),
                    styles::rating_style(review.rating),
                )),
                Cell::from(review.date_display()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(34),
        Constraint::Length(9),
        Constraint::Fill(2),
        Constraint::Length(13),
    ];

    let title = format!(" Reviews ({}) - [f]ilter period ", reviews.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.review_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_review_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let content = match app.selected_review() {
        Some(review) => {
            let mut lines = vec![];
            lines.push(Line::from(Span::styled(
                review.employee_display(),
                styles::title_style(),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Period: ", styles::muted_style()),
                Span::raw(review.review_period.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Rating: ", styles::muted_style()),
                Span::styled(
                    format!("{}/5 {}", review.rating, review.rating_label()),
                    styles::rating_style(review.rating),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Date:   ", styles::muted_style()),
                Span::raw(review.date_display()),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Feedback", styles::highlight_style())));

            let feedback = format_optional(&review.feedback, "No feedback recorded");
            // Wrap by hand; Paragraph wrapping would also wrap the header lines
            for chunk in wrap_text(&feedback, area.width.saturating_sub(4) as usize) {
                lines.push(Line::from(Span::raw(chunk)));
            }

            lines
        }
        None => vec![Line::from(Span::styled(
            "No review selected",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Detail ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));
    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![truncate(text, 40)];
    }
    let mut lines = vec![];
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
