//! Modal pointer-driven move/resize loops (dwm.c `movemouse`/`resizemouse`).
//! Both grab the pointer and pump motion events directly rather than going
//! back through the main dispatch loop, exactly as dwm does.

use crate::bindings::Arg;
use crate::config::SNAP;
use crate::display::{CursorShape, XEvent};
use crate::manager::Wm;

/// Snap `value` to `target` when within `SNAP` pixels (dwm.c's repeated
/// `abs(x - wx) < snap` checks in both mouse loops).
fn snap(value: i32, target: i32) -> i32 {
    if (value - target).abs() < SNAP {
        target
    } else {
        value
    }
}

pub fn movemouse(wm: &mut Wm, _arg: &Arg) {
    let mid = wm.selmon;
    let cid = match wm.monitors.get(mid).unwrap().sel {
        Some(c) => c,
        None => return,
    };
    if wm.clients.get(cid).map(|c| c.is_fixed()).unwrap_or(true) {
        return;
    }

    let (start_x, start_y) = wm.conn.query_pointer(wm.conn.root());
    let geom = wm.clients.get(cid).unwrap().geom;
    let was_floating = wm.clients.get(cid).map(|c| c.is_floating()).unwrap_or(false);

    if !wm.conn.grab_pointer_for_drag(wm.cursor_move) {
        return;
    }

    loop {
        match wm.conn.next_event() {
            XEvent::MotionNotify { x, y } => {
                let mut nx = geom.x + (x - start_x);
                let mut ny = geom.y + (y - start_y);
                let (wx, wy, ww, wh) = wm.work_area(wm.client_monitor(cid));
                nx = snap(nx, wx);
                ny = snap(ny, wy);
                nx = snap(nx, wx + ww - geom.width_with_border());
                ny = snap(ny, wy + wh - geom.height_with_border());

                if !was_floating {
                    if let Some(c) = wm.clients.get_mut(cid) {
                        c.set_floating(true);
                    }
                    wm.arrange();
                }
                wm.resize_client(cid, nx, ny, geom.w, geom.h, true);
            }
            XEvent::ButtonRelease => break,
            _ => {}
        }
    }
    wm.conn.ungrab_pointer();
}

pub fn resizemouse(wm: &mut Wm, _arg: &Arg) {
    let mid = wm.selmon;
    let cid = match wm.monitors.get(mid).unwrap().sel {
        Some(c) => c,
        None => return,
    };
    if wm.clients.get(cid).map(|c| c.is_fixed()).unwrap_or(true) {
        return;
    }

    let geom = wm.clients.get(cid).unwrap().geom;
    let was_floating = wm.clients.get(cid).map(|c| c.is_floating()).unwrap_or(false);
    wm.conn.warp_pointer(wm.clients.get(cid).unwrap().win, geom.width_with_border(), geom.height_with_border());

    if !wm.conn.grab_pointer_for_drag(wm.cursor_resize) {
        return;
    }

    loop {
        match wm.conn.next_event() {
            XEvent::MotionNotify { x, y } => {
                let nw = (x - geom.x - 2 * geom.bw + 1).max(1);
                let nh = (y - geom.y - 2 * geom.bw + 1).max(1);

                if !was_floating {
                    if let Some(c) = wm.clients.get_mut(cid) {
                        c.set_floating(true);
                    }
                    wm.arrange();
                }
                wm.resize_client(cid, geom.x, geom.y, nw, nh, true);
            }
            XEvent::ButtonRelease => break,
            _ => {}
        }
    }
    let win = wm.clients.get(cid).unwrap().win;
    let final_geom = wm.clients.get(cid).unwrap().geom;
    wm.conn.warp_pointer(win, final_geom.width_with_border(), final_geom.height_with_border());
    wm.conn.ungrab_pointer();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_pulls_value_within_threshold_to_target() {
        assert_eq!(snap(10, 0), 0);
        assert_eq!(snap(100, 0), 100);
    }
}
