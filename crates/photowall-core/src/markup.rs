//! Static markup snapshot of a wall.
//!
//! Emits the rendered contract as plain HTML: one wrapper per instance,
//! one element per lane, one anchor per item holding an overlay and a
//! title/subtitle mask, plus a non-interactive inset-shadow overlay.
//! Class and id names carry a per-instance prefix so two walls on one
//! page never collide. Titles, subtitles and URLs are untrusted and are
//! always escaped.

use std::fmt::Write;

use crate::engine::Wall;
use crate::layout::Orientation;

/// Escape text for safe inclusion in markup (element content or
/// double-quoted attribute values).
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Unique class/id prefix for a wall instance
pub fn instance_prefix(wall: &Wall) -> String {
    let id = wall.id().simple().to_string();
    format!("pw-{}", &id[..8])
}

/// Render the wall as a static markup snapshot.
pub fn render_markup(wall: &Wall) -> String {
    let pc = instance_prefix(wall);
    let config = wall.config();
    let horizontal = wall.plan().orientation == Orientation::Horizontal;
    let axis = if horizontal { "X" } else { "Y" };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<div id=\"{pc}\" class=\"{pc} pw-wall\" style=\"background-color:{};overflow:hidden;position:relative\">",
        escape(&config.bgcolor),
    );
    // Uniform mode moves the wrapper as one block; variable-speed mode
    // keeps the wrapper at rest and translates each lane on its own.
    let wrapper_offset = if config.variable_speed {
        0.0
    } else {
        wall.lane_translation(0)
    };
    let _ = writeln!(
        out,
        "  <div id=\"{pc}-all\" class=\"{pc}-all pw-all\" style=\"position:absolute;transform:translate{axis}({}px)\">",
        fmt_px(wrapper_offset),
    );

    for (li, lane) in wall.lanes().iter().enumerate() {
        let lane_style = if config.variable_speed {
            format!(
                " style=\"transform:translate{axis}({}px)\"",
                fmt_px(lane.offset)
            )
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "    <div id=\"{pc}-lane-{li}\" class=\"{pc}-lane pw-lane{}\" data-lane-index=\"{li}\"{lane_style}>",
            if lane.active { " pw-lane-active" } else { "" },
        );

        for item in &lane.items {
            let (x, y) = if horizontal {
                (item.main_pos, item.cross_pos)
            } else {
                (item.cross_pos, item.main_pos)
            };
            let _ = writeln!(
                out,
                "      <a class=\"{pc}-item pw-item\" href=\"{}\" style=\"position:absolute;left:{}px;top:{}px;width:{}px;height:{}px\">",
                escape(if item.photo.url.is_empty() { "#" } else { &item.photo.url }),
                fmt_px(x),
                fmt_px(y),
                fmt_px(if horizontal { wall.plan().item_main } else { wall.plan().item_cross }),
                fmt_px(if horizontal { wall.plan().item_cross } else { wall.plan().item_main }),
            );
            let _ = writeln!(
                out,
                "        <div class=\"{pc}-overlay pw-item-overlay\" style=\"opacity:{};background-color:{}\"></div>",
                config.opacity,
                escape(&config.overlay_color),
            );
            let _ = writeln!(out, "        <div class=\"{pc}-mask pw-item-mask\">");
            let _ = writeln!(
                out,
                "          <span class=\"{pc}-title pw-item-title\">{}</span>",
                escape(&item.photo.title),
            );
            let _ = writeln!(
                out,
                "          <span class=\"{pc}-subtitle pw-item-subtitle\">{}</span>",
                escape(&item.photo.subtitle),
            );
            let _ = writeln!(out, "        </div>");
            let _ = writeln!(out, "      </a>");
        }

        let _ = writeln!(out, "    </div>");
    }

    let _ = writeln!(out, "  </div>");
    let _ = writeln!(
        out,
        "  <div id=\"{pc}-shadow\" class=\"{pc}-shadow pw-shadow\" style=\"position:absolute;pointer-events:none\"></div>",
    );
    let _ = writeln!(out, "</div>");
    out
}

/// Trim trailing zeros so whole positions render without a fraction
fn fmt_px(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.2}", v)
    }
}
