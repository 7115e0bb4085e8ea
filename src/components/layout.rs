//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Report screen areas
pub struct ReportLayout {
    pub title: Rect,
    pub toolbar: Rect,
    pub table: Rect,
    pub status: Rect,
    pub help: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Title, toolbar, table, one status line and the help bar
pub fn calculate_report_layout(area: Rect) -> ReportLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    ReportLayout {
        title: chunks[0],
        toolbar: chunks[1],
        table: chunks[2],
        status: chunks[3],
        help: chunks[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup_fits_inside_area() {
        let area = Rect::new(10, 5, 100, 40);
        let popup = centered_popup(area, 40, 10);
        assert_eq!(popup, Rect::new(40, 20, 40, 10));

        let small = centered_popup(Rect::new(0, 0, 20, 5), 40, 10);
        assert_eq!(small, Rect::new(0, 0, 20, 5));
    }

    #[test]
    fn test_report_layout_reserves_fixed_rows() {
        let layout = calculate_report_layout(Rect::new(0, 0, 80, 30));
        assert_eq!(layout.title.height, 1);
        assert_eq!(layout.toolbar.height, 3);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.help.height, 3);
        assert_eq!(layout.table.height, 22);
    }
}
