use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::recent_employees;
use crate::ui::styles;
use crate::utils::pluralize;

/// Render the Dashboard tab: stat cards on top, department and rating
/// breakdowns in the middle, recent joiners at the bottom.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Length(9),
        ])
        .split(area);

    render_stat_cards(frame, app, chunks[0]);
    render_breakdowns(frame, app, chunks[1]);
    render_recent_employees(frame, app, chunks[2]);
}

fn render_stat_cards(frame: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let average = if app.review_stats.average_rating > 0.0 {
        format!("{:.2}", app.review_stats.average_rating)
    } else {
        "0".to_string()
    };

    render_card(
        frame,
        cards[0],
        "Total Employees",
        &app.employee_stats.total_employees.to_string(),
    );
    render_card(
        frame,
        cards[1],
        "Total Reviews",
        &app.review_stats.total_reviews.to_string(),
    );
    render_card(frame, cards[2], "Average Rating", &average);
    render_card(
        frame,
        cards[3],
        "Departments",
        &app.employee_stats.departments.len().to_string(),
    );
}

fn render_card(frame: &mut Frame, area: Rect, label: &str, value: &str) {
    let lines = vec![
        Line::from(Span::styled(value.to_string(), styles::title_style())),
        Line::from(Span::styled(label.to_string(), styles::muted_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_breakdowns(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_department_breakdown(frame, app, halves[0]);
    render_rating_distribution(frame, app, halves[1]);
}

fn render_department_breakdown(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];
    if app.employee_stats.departments.is_empty() {
        lines.push(Line::from(Span::styled(
            "No department data available",
            styles::muted_style(),
        )));
    } else {
        for dept in &app.employee_stats.departments {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<24}", dept.department), styles::list_item_style()),
                Span::styled(
                    pluralize(dept.count.max(0) as usize, "employee"),
                    styles::muted_style(),
                ),
            ]));
        }
    }

    let block = Block::default()
        .title(" Department Breakdown ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_rating_distribution(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];
    if app.review_stats.rating_distribution.is_empty() {
        lines.push(Line::from(Span::styled(
            "No rating data available",
            styles::muted_style(),
        )));
    } else {
        // Highest rating first
        let mut distribution = app.review_stats.rating_distribution.clone();
        distribution.sort_by(|a, b| b.rating.cmp(&a.rating));

        for entry in &distribution {
            let stars = "★".repeat(entry.rating.clamp(0, 5) as usize);
            lines.push(Line::from(vec![
                Span::styled(format!("{:<6}", stars), styles::rating_style(entry.rating)),
                Span::styled(
                    format!("{:<16}", pluralize(entry.count.max(0) as usize, "review")),
                    styles::list_item_style(),
                ),
            ]));
        }
    }

    let block = Block::default()
        .title(" Rating Distribution ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_recent_employees(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];
    let recent = recent_employees(&app.employees);

    if recent.is_empty() {
        lines.push(Line::from(Span::styled(
            "No employees found",
            styles::muted_style(),
        )));
    } else {
        for employee in recent {
            let reviews = if employee.reviews_count > 0 {
                format!(
                    "  {} (avg {})",
                    pluralize(employee.reviews_count.max(0) as usize, "review"),
                    employee.rating_display()
                )
            } else {
                String::new()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<28}", employee.full_name()), styles::list_item_style()),
                Span::styled(format!("{:<18}", employee.department), styles::muted_style()),
                Span::styled(
                    format!("Joined {}", employee.joined_display()),
                    styles::muted_style(),
                ),
                Span::styled(reviews, styles::highlight_style()),
            ]));
        }
    }

    let block = Block::default()
        .title(" Recent Employees ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
