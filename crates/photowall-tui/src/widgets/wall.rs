use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use ratatui_image::Image;

use photowall_core::ItemRect;

use crate::app::App;
use crate::images::ImageState;

/// One item ready to draw, snapshotted out of the wall so the image
/// cache can be borrowed mutably afterwards.
struct ItemDraw {
    cell: Rect,
    fully_visible: bool,
    img: String,
    title: String,
    subtitle: String,
    hovered: bool,
}

pub struct WallWidget;

impl WallWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
        // hit-testing maps pointer cells back into this region
        app.wall_area = area;

        let hovered = app.hovered;
        let Some(wall) = app.wall() else {
            frame.render_widget(
                Paragraph::new("no wall bound").style(Style::default().fg(Color::DarkGray)),
                area,
            );
            return;
        };

        let bg = parse_hex_color(&wall.config().bgcolor).unwrap_or(Color::Black);
        let placeholder =
            parse_hex_color(&wall.config().placeholder_color).unwrap_or(Color::DarkGray);

        let mut draws: Vec<ItemDraw> = Vec::new();
        for view in wall.items() {
            let Some((cell, fully_visible)) = clip_to_cells(area, view.rect) else {
                continue;
            };
            draws.push(ItemDraw {
                cell,
                fully_visible,
                img: view.photo.img.clone(),
                title: view.photo.title.clone(),
                subtitle: view.photo.subtitle.clone(),
                hovered: hovered == Some((view.lane, view.slot)),
            });
        }

        frame.render_widget(Block::default().style(Style::default().bg(bg)), area);

        for draw in draws {
            Self::render_item(frame, app, &draw, placeholder);
        }
    }

    fn render_item(frame: &mut Frame, app: &mut App, draw: &ItemDraw, placeholder: Color) {
        frame.render_widget(
            Block::default().style(Style::default().bg(placeholder)),
            draw.cell,
        );

        // Only fully visible items get the pixel protocol; edge items
        // change cell size every frame which would force a protocol
        // rebuild per frame, so they keep the placeholder.
        let mut image_drawn = false;
        if draw.fully_visible && !draw.img.is_empty() {
            if let Some(ImageState::Loaded(cached)) = app.photos.get_mut(&draw.img) {
                if let Some(protocol) = cached.protocol(draw.cell) {
                    frame.render_widget(Image::new(protocol), draw.cell);
                    image_drawn = true;
                }
            }
        }

        if draw.hovered {
            Self::render_mask(frame, draw);
        } else if !image_drawn && !draw.title.is_empty() && draw.cell.height > 0 {
            // placeholder label while the image is loading or absent
            let line = Line::from(Span::styled(
                draw.title.clone(),
                Style::default().fg(Color::Gray),
            ));
            frame.render_widget(Paragraph::new(line), title_row(draw.cell));
        }
    }

    /// Caption overlay shown while the item is hovered
    fn render_mask(frame: &mut Frame, draw: &ItemDraw) {
        if draw.cell.height == 0 {
            return;
        }
        let mut lines = vec![Line::from(Span::styled(
            draw.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))];
        if !draw.subtitle.is_empty() && draw.cell.height > 1 {
            lines.push(Line::from(Span::styled(
                draw.subtitle.clone(),
                Style::default().fg(Color::Gray),
            )));
        }

        let mask_height = (lines.len() as u16).min(draw.cell.height);
        let mask = Rect {
            x: draw.cell.x,
            y: draw.cell.y + draw.cell.height - mask_height,
            width: draw.cell.width,
            height: mask_height,
        };
        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(Color::Black)),
            mask,
        );
    }
}

fn title_row(cell: Rect) -> Rect {
    Rect {
        x: cell.x,
        y: cell.y + cell.height - 1,
        width: cell.width,
        height: 1,
    }
}

/// Clip an item rectangle to the drawn area, returning terminal cells
/// and whether the item was entirely inside the area.
fn clip_to_cells(area: Rect, rect: ItemRect) -> Option<(Rect, bool)> {
    let x0 = rect.x.round() as i64;
    let y0 = rect.y.round() as i64;
    let x1 = x0 + rect.w.round() as i64;
    let y1 = y0 + rect.h.round() as i64;

    let cx0 = x0.clamp(0, area.width as i64);
    let cy0 = y0.clamp(0, area.height as i64);
    let cx1 = x1.clamp(0, area.width as i64);
    let cy1 = y1.clamp(0, area.height as i64);
    if cx1 <= cx0 || cy1 <= cy0 {
        return None;
    }

    let cell = Rect {
        x: area.x + cx0 as u16,
        y: area.y + cy0 as u16,
        width: (cx1 - cx0) as u16,
        height: (cy1 - cy0) as u16,
    };
    let fully_visible = cx0 == x0 && cy0 == y0 && cx1 == x1 && cy1 == y1;
    Some((cell, fully_visible))
}

/// Parse `#rgb` or `#rrggbb` CSS colors
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Color::Rgb(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#000"), Some(Color::Rgb(0, 0, 0)));
        assert_eq!(parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("#333333"), Some(Color::Rgb(0x33, 0x33, 0x33)));
        assert_eq!(parse_hex_color("#1a2b3c"), Some(Color::Rgb(0x1a, 0x2b, 0x3c)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_clip_inside_and_partial() {
        let area = Rect::new(2, 1, 40, 20);

        let inside = ItemRect {
            x: 5.0,
            y: 5.0,
            w: 10.0,
            h: 4.0,
        };
        let (cell, full) = clip_to_cells(area, inside).unwrap();
        assert!(full);
        assert_eq!(cell, Rect::new(7, 6, 10, 4));

        // item sticking out past the top edge gets trimmed
        let partial = ItemRect {
            x: 0.0,
            y: -2.0,
            w: 10.0,
            h: 4.0,
        };
        let (cell, full) = clip_to_cells(area, partial).unwrap();
        assert!(!full);
        assert_eq!(cell, Rect::new(2, 1, 10, 2));

        // fully off-screen items vanish
        let gone = ItemRect {
            x: 0.0,
            y: -10.0,
            w: 10.0,
            h: 4.0,
        };
        assert!(clip_to_cells(area, gone).is_none());
    }
}
