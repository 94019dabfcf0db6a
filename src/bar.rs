//! Status bar rendering (dwm.c `drawbar`): tag boxes, layout symbol,
//! status text, and the selected client's title.

use crate::config::{Scheme, COLORS, TAGS};
use crate::display::XConn;
use crate::manager::Wm;
use crate::monitor::{Monitor, MonitorId};

pub const BAR_PADDING: i32 = 2;

/// One rendered tag box: its label, on-screen x offset/width, and whether
/// it should be drawn selected/occupied/filled/urgent.
pub struct TagBox {
    pub label: &'static str,
    pub x: i32,
    pub w: i32,
    pub selected: bool,
    /// Some client on the monitor occupies this tag — drawn as an outline
    /// square.
    pub occupied: bool,
    /// The monitor's *selected* client occupies this tag — drawn as a
    /// filled square instead of an outline (dwm.c `drawbar`'s
    /// `urg`/`occ`/`m->tagset` bit tests).
    pub filled: bool,
    pub urgent: bool,
}

/// Lay out the tag boxes left-to-right, returning their geometry and the
/// x offset the layout-symbol box starts at (dwm.c's `drawbar` tag loop).
pub fn layout_tag_boxes(conn: &dyn XConn, mon: &Monitor, occupied: u32, sel_tags: u32, urgent: u32) -> (Vec<TagBox>, i32) {
    let mut x = 0;
    let mut boxes = Vec::with_capacity(TAGS.len());
    for (i, label) in TAGS.iter().enumerate() {
        let w = conn.text_width(label);
        let bit = 1u32 << i;
        boxes.push(TagBox {
            label,
            x,
            w,
            selected: mon.current_view() & bit != 0,
            occupied: occupied & bit != 0,
            filled: sel_tags & bit != 0,
            urgent: urgent & bit != 0,
        });
        x += w;
    }
    (boxes, x)
}

/// Truncate `text` to fit within `max_w` pixels, appending `...` when it
/// doesn't (dwm.c has no truncation of its own for the title but this
/// crate's bar needs one for unusually long window titles; ellipsis
/// approach matches the status bar conventions of the other example
/// repos' terminal UIs).
pub fn truncate_to_width(conn: &dyn XConn, text: &str, max_w: i32) -> String {
    if conn.text_width(text) <= max_w {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let candidate = format!("{}{}...", out, ch);
        if conn.text_width(&candidate) > max_w {
            break;
        }
        out.push(ch);
    }
    format!("{}...", out)
}

pub fn scheme_colors(scheme: Scheme) -> [&'static str; 3] {
    COLORS[scheme as usize]
}

/// Redraw every monitor's bar (dwm.c `drawbars`): tag boxes, the layout
/// symbol, the selected client's title, and (on the selected monitor)
/// room left for externally-fed status text.
pub fn redraw_all(wm: &mut Wm) {
    for mid in wm.monitors.ids() {
        redraw_one(wm, mid);
    }
}

pub fn redraw_one(wm: &mut Wm, mid: MonitorId) {
    let barwin = match wm.monitors.get(mid) {
        Some(m) if m.show_bar => m.barwin,
        _ => return,
    };
    let sel_cid = wm.monitors.get(mid).unwrap().sel;
    let sel_tags = sel_cid.and_then(|cid| wm.clients.get(cid)).map(|c| c.tags).unwrap_or(0);
    let occupied: u32 = wm
        .monitors
        .get(mid)
        .unwrap()
        .clients
        .iter()
        .filter_map(|&cid| wm.clients.get(cid))
        .fold(0u32, |acc, c| acc | c.tags);
    let urgent: u32 = wm
        .monitors
        .get(mid)
        .unwrap()
        .clients
        .iter()
        .filter_map(|&cid| wm.clients.get(cid))
        .filter(|c| c.is_urgent())
        .fold(0u32, |acc, c| acc | c.tags);

    let gc = wm.conn.create_gc(barwin);
    let (boxes, tags_w) = layout_tag_boxes(wm.conn.as_ref(), wm.monitors.get(mid).unwrap(), occupied, sel_tags, urgent);
    for tb in boxes.iter() {
        let scheme = if tb.selected { Scheme::Sel } else { Scheme::Norm };
        let [_, scheme_bg, scheme_fg] = scheme_colors(scheme);
        let (bg, fg) = if tb.urgent { (scheme_fg, scheme_bg) } else { (scheme_bg, scheme_fg) };
        let bg_pixel = wm.conn.alloc_color(bg);
        wm.conn.set_foreground(gc, bg_pixel);
        wm.conn.fill_rect(barwin, gc, tb.x, 0, tb.w as u32, wm.bar_height as u32);
        let fg_pixel = wm.conn.alloc_color(fg);
        wm.conn.draw_text(barwin, gc, tb.x + BAR_PADDING, wm.bar_height - BAR_PADDING, fg_pixel, tb.label);
        if tb.occupied {
            wm.conn.set_foreground(gc, fg_pixel);
            wm.conn.fill_rect(barwin, gc, tb.x + 1, 1, 3, 3);
            if !tb.filled {
                // Punch a hole in bg color so an occupied-but-not-selected
                // tag reads as an outline rather than a filled square.
                wm.conn.set_foreground(gc, bg_pixel);
                wm.conn.fill_rect(barwin, gc, tb.x + 2, 2, 1, 1);
            }
        }
    }

    let ltsymbol = wm.monitors.get(mid).unwrap().ltsymbol.clone();
    let [_, _, fg] = scheme_colors(Scheme::Norm);
    let fg_pixel = wm.conn.alloc_color(fg);
    wm.conn.draw_text(barwin, gc, tags_w + BAR_PADDING, wm.bar_height - BAR_PADDING, fg_pixel, &ltsymbol);

    let status = if mid == wm.selmon { wm.status.clone() } else { String::new() };
    let status_w = if status.is_empty() { 0 } else { wm.conn.text_width(&status) + BAR_PADDING * 2 };
    if !status.is_empty() {
        let ww = wm.monitors.get(mid).unwrap().ww;
        let status_x = ww - status_w + BAR_PADDING;
        wm.conn.draw_text(barwin, gc, status_x, wm.bar_height - BAR_PADDING, fg_pixel, &status);
    }

    let sel_title = sel_cid.and_then(|cid| wm.clients.get(cid)).map(|c| c.name.clone()).unwrap_or_default();
    let title_x = tags_w + wm.conn.text_width(&ltsymbol) + BAR_PADDING * 2;
    let ww = wm.monitors.get(mid).unwrap().ww;
    let title_max_w = (ww - status_w - title_x).max(0);
    let sel_title = truncate_to_width(wm.conn.as_ref(), &sel_title, title_max_w);
    wm.conn.draw_text(barwin, gc, title_x, wm.bar_height - BAR_PADDING, fg_pixel, &sel_title);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomSource;
    use crate::display::{CursorShape, Gc, NormalHints, Rect, WmHintsInfo, XEvent};

    struct FixedWidthConn;

    impl AtomSource for FixedWidthConn {
        fn intern_atom(&self, _name: &str) -> u64 {
            1
        }
    }

    impl XConn for FixedWidthConn {
        fn default_screen_geometry(&self) -> Rect {
            Rect { x: 0, y: 0, w: 1920, h: 1080 }
        }
        fn root(&self) -> u64 { 1 }
        fn become_wm(&self) -> crate::error::Result<()> { Ok(()) }
        fn next_event(&self) -> XEvent { XEvent::Unknown }
        fn pending(&self) -> i32 { 0 }
        fn grab_key(&self, _: u32, _: u32) {}
        fn ungrab_all_keys(&self) {}
        fn grab_button(&self, _: u32, _: u32, _: u64, _: bool) {}
        fn ungrab_all_buttons(&self, _: u64) {}
        fn select_input(&self, _: u64, _: i64) {}
        fn map_window(&self, _: u64) {}
        fn unmap_window(&self, _: u64) {}
        fn destroy_window(&self, _: u64) {}
        fn move_resize(&self, _: u64, _: i32, _: i32, _: u32, _: u32) {}
        fn set_border_width(&self, _: u64, _: u32) {}
        fn set_border_color(&self, _: u64, _: u64) {}
        fn configure_notify(&self, _: u64, _: i32, _: i32, _: u32, _: u32, _: u32) {}
        fn raise_window(&self, _: u64) {}
        fn restack(&self, _: &[u64]) {}
        fn set_input_focus(&self, _: u64) {}
        fn send_protocol_message(&self, _: u64, _: u64) -> bool { false }
        fn send_configure(&self, _: u64, _: Rect, _: u32) {}
        fn get_transient_for(&self, _: u64) -> Option<u64> { None }
        fn get_wm_protocols(&self, _: u64) -> Vec<u64> { Vec::new() }
        fn get_wm_hints(&self, _: u64) -> WmHintsInfo { WmHintsInfo::default() }
        fn set_wm_hints_not_urgent(&self, _: u64) {}
        fn get_normal_hints(&self, _: u64) -> NormalHints { NormalHints::default() }
        fn get_window_name(&self, _: u64) -> Option<String> { None }
        fn get_net_window_name(&self, _: u64) -> Option<String> { None }
        fn get_class_instance(&self, _: u64) -> (String, String) { (String::new(), String::new()) }
        fn get_window_attributes(&self, _: u64) -> Option<(bool, bool)> { None }
        fn get_window_geometry(&self, _: u64) -> Rect { Rect { x: 0, y: 0, w: 100, h: 100 } }
        fn update_numlock_mask(&self) {}
        fn numlock_mask(&self) -> u32 { 0 }
        fn get_wm_state(&self, _: u64) -> Option<i64> { None }
        fn set_wm_state(&self, _: u64, _: i64) {}
        fn set_net_wm_state_empty(&self, _: u64) {}
        fn set_net_wm_state_fullscreen(&self, _: u64) {}
        fn is_net_wm_state_fullscreen(&self, _: u64) -> bool { false }
        fn is_dialog(&self, _: u64) -> bool { false }
        fn query_tree(&self, _: u64) -> Vec<u64> { Vec::new() }
        fn query_pointer(&self, _: u64) -> (i32, i32) { (0, 0) }
        fn warp_pointer(&self, _: u64, _: i32, _: i32) {}
        fn set_supported(&self, _: u64, _: &[u64]) {}
        fn append_client_list(&self, _: u64, _: u64) {}
        fn delete_client_list(&self, _: u64) {}
        fn delete_property_active_window(&self, _: u64) {}
        fn set_active_window(&self, _: u64, _: u64) {}
        fn alloc_color(&self, _: &str) -> u64 { 0 }
        fn create_cursor(&self, _: CursorShape) -> u64 { 0 }
        fn create_simple_window(&self, _: i32, _: i32, _: u32, _: u32, _: bool) -> u64 { 0 }
        fn create_gc(&self, _: u64) -> Gc { std::ptr::null_mut() }
        fn set_foreground(&self, _: Gc, _: u64) {}
        fn fill_rect(&self, _: u64, _: Gc, _: i32, _: i32, _: u32, _: u32) {}
        fn draw_text(&self, _: u64, _: Gc, _: i32, _: i32, _: u64, _: &str) {}
        fn text_width(&self, text: &str) -> i32 {
            text.chars().count() as i32 * 8
        }
        fn font_height(&self) -> i32 { 16 }
        fn grab_pointer_for_drag(&self, _: u64) -> bool { false }
        fn ungrab_pointer(&self) {}
        fn sync(&self) {}
        fn spawn(&self, _: &[&str]) {}
    }

    #[test]
    fn tag_boxes_cover_all_nine_tags_without_overlap() {
        let conn = FixedWidthConn;
        let mon = Monitor::new(0);
        let (boxes, total_w) = layout_tag_boxes(&conn, &mon, 0, 0, 0);
        assert_eq!(boxes.len(), 9);
        assert_eq!(boxes[0].x, 0);
        assert_eq!(total_w, boxes.iter().map(|b| b.w).sum::<i32>());
    }

    #[test]
    fn selected_tag_reflects_monitor_view() {
        let conn = FixedWidthConn;
        let mon = Monitor::new(0);
        let (boxes, _) = layout_tag_boxes(&conn, &mon, 0, 0, 0);
        assert!(boxes[0].selected);
        assert!(!boxes[1].selected);
    }

    #[test]
    fn occupied_tag_not_matching_selected_client_is_outline_only() {
        let conn = FixedWidthConn;
        let mon = Monitor::new(0);
        let (boxes, _) = layout_tag_boxes(&conn, &mon, 1 << 2, 0, 0);
        assert!(boxes[2].occupied);
        assert!(!boxes[2].filled);
    }

    #[test]
    fn truncation_appends_ellipsis_when_too_long() {
        let conn = FixedWidthConn;
        let truncated = truncate_to_width(&conn, "a very long window title indeed", 40);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn short_text_is_not_truncated() {
        let conn = FixedWidthConn;
        let short = truncate_to_width(&conn, "ok", 1000);
        assert_eq!(short, "ok");
    }
}
