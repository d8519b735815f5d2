use crate::api::models::LIST_COLUMNS;
use crate::app::state::AppState;
use crate::ui::field;
use crate::ui::layout::sidebar;
use crate::ui::theme::Theme;
use crate::views::filter_list::{DataTable, FilterField, FilterList, SortDirection};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let (form_area, table_area) = sidebar(area, 30);
    render_filters(frame, form_area, &state.list);

    let block = Block::default()
        .title(" Entries ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border());
    let inner = block.inner(table_area);
    frame.render_widget(block, table_area);

    match (&state.list.table, state.list.placeholder()) {
        (Some(table), _) => render_table(frame, inner, table),
        (None, Some(text)) => {
            frame.render_widget(Paragraph::new(Span::styled(text, Theme::dim())), inner);
        }
        (None, None) => {}
    }
}

fn render_filters(frame: &mut Frame, area: Rect, list: &FilterList) {
    let mut y = area.y;
    for filter in FilterField::ALL {
        if y >= area.bottom() {
            break;
        }
        let input = match filter {
            FilterField::Name => &list.name,
            FilterField::Country => &list.country,
            other => {
                let located = other.date_id().and_then(|id| list.dates.locate(id));
                match located {
                    Some((index, role)) => &list.dates.pairs[index].field(role).input,
                    None => continue,
                }
            }
        };
        let rect = Rect::new(area.x, y, area.width, area.bottom() - y);
        y += field::render(frame, rect, filter.label(), input, filter == list.focus, &[]);
    }
}

fn render_table(frame: &mut Frame, area: Rect, table: &DataTable) {
    if area.height < 3 {
        return;
    }
    let header = Row::new(LIST_COLUMNS.iter().enumerate().map(|(i, name)| {
        let arrow = match (i == table.sort_column, table.direction) {
            (true, SortDirection::Asc) => " ▲",
            (true, SortDirection::Desc) => " ▼",
            _ => "",
        };
        Cell::from(format!("{}{}", name, arrow))
    }))
    .style(Theme::tab_active());

    let rows = table
        .page_rows()
        .iter()
        .map(|row| Row::new((0..LIST_COLUMNS.len()).map(|i| Cell::from(row.cell(i).to_string()))).style(Theme::text()));

    let widths = [
        Constraint::Percentage(16),
        Constraint::Percentage(9),
        Constraint::Percentage(9),
        Constraint::Percentage(9),
        Constraint::Percentage(5),
        Constraint::Percentage(9),
        Constraint::Percentage(9),
        Constraint::Percentage(9),
        Constraint::Percentage(7),
        Constraint::Percentage(18),
    ];

    let body = Rect::new(area.x, area.y, area.width, area.height - 1);
    frame.render_widget(Table::new(rows, widths).header(header).column_spacing(1), body);

    let footer = Line::from(vec![
        Span::styled(table.info(), Theme::dim()),
        Span::styled(format!("   page {}/{}", table.page + 1, table.page_count()), Theme::dim()),
    ]);
    frame.render_widget(
        Paragraph::new(footer),
        Rect::new(area.x, area.y + area.height - 1, area.width, 1),
    );
}
