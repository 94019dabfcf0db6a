//! Arrange functions: `tile`, `monocle`. Floating layout is the `None` arm
//! of `Layout::arrange` and needs no function (dwm.c: `NULL` means "leave
//! client geometry alone").

use crate::manager::Wm;
use crate::monitor::MonitorId;

/// Single-master tiling (dwm.c `tile`). The first visible, non-floating
/// client gets a master column sized by `mfact`; the rest stack vertically
/// in the remaining column.
pub fn tile(wm: &mut Wm, mid: MonitorId) {
    let ids = wm.tiled_clients(mid);
    let n = ids.len();
    if n == 0 {
        return;
    }
    let (wx, wy, ww, wh) = wm.work_area(mid);
    let mfact = wm.mfact(mid);
    let mw = if n > 1 { (ww as f64 * mfact) as i32 } else { ww };

    let master = ids[0];
    wm.resize_client(master, wx, wy, mw - wm.border_width(master) * 2, wh - wm.border_width(master) * 2, false);

    let mut ty = 0;
    for (i, &cid) in ids.iter().enumerate().skip(1) {
        let h = (wh - ty) / (n as i32 - i as i32);
        wm.resize_client(cid, wx + mw, wy + ty, ww - mw - wm.border_width(cid) * 2, h - wm.border_width(cid) * 2, false);
        ty += wm.client_height_with_border(cid);
    }
}

/// One client fills the whole work area at a time; others are stacked
/// exactly behind it (dwm.c `monocle`).
pub fn monocle(wm: &mut Wm, mid: MonitorId) {
    let ids = wm.tiled_clients(mid);
    let (wx, wy, ww, wh) = wm.work_area(mid);
    for &cid in ids.iter() {
        wm.resize_client(cid, wx, wy, ww - wm.border_width(cid) * 2, wh - wm.border_width(cid) * 2, false);
    }
}
