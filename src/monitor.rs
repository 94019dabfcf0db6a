//! The per-output `Monitor` record (spec.md §3, "Monitor").

use crate::client::Window;
use crate::config::{Layout, LAYOUTS};

pub type MonitorId = usize;
pub type ClientId = usize;

pub const ALL_TAGS: u32 = (1 << crate::config::TAGS.len()) - 1;

#[derive(Debug)]
pub struct Monitor {
    pub num: i32,
    /// Full screen geometry.
    pub mx: i32,
    pub my: i32,
    pub mw: i32,
    pub mh: i32,
    /// Work area: screen geometry minus the bar.
    pub wx: i32,
    pub wy: i32,
    pub ww: i32,
    pub wh: i32,
    /// Bar y-coordinate.
    pub by: i32,

    pub tagset: [u32; 2],
    pub seltags: usize,
    pub lt: [&'static Layout; 2],
    pub sellt: usize,
    pub mfact: f64,
    pub ltsymbol: String,

    pub show_bar: bool,
    pub top_bar: bool,
    pub barwin: Window,

    /// Attach-order client list.
    pub clients: Vec<ClientId>,
    /// Most-recently-focused-first focus stack.
    pub stack: Vec<ClientId>,
    pub sel: Option<ClientId>,
}

impl Monitor {
    pub fn new(num: i32) -> Self {
        Monitor {
            num,
            mx: 0,
            my: 0,
            mw: 0,
            mh: 0,
            wx: 0,
            wy: 0,
            ww: 0,
            wh: 0,
            by: 0,
            tagset: [1, 1],
            seltags: 0,
            lt: [&LAYOUTS[0], &LAYOUTS[1 % LAYOUTS.len()]],
            sellt: 0,
            mfact: crate::config::MFACT,
            ltsymbol: LAYOUTS[0].symbol.to_string(),
            show_bar: crate::config::SHOW_BAR,
            top_bar: crate::config::TOP_BAR,
            barwin: 0,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
        }
    }

    pub fn current_view(&self) -> u32 {
        self.tagset[self.seltags]
    }

    pub fn current_layout(&self) -> &'static Layout {
        self.lt[self.sellt]
    }

    /// Replace the current view with `mask` (or all tags for `!0`),
    /// preserving the previous view as tagset history. A no-op identity
    /// view leaves `seltags` untouched (spec §3, `view`).
    pub fn view(&mut self, mask: u32) -> bool {
        let requested = if mask == !0u32 { ALL_TAGS } else { mask & ALL_TAGS };
        if requested == self.current_view() {
            return false;
        }
        self.seltags ^= 1;
        if mask != 0 {
            self.tagset[self.seltags] = requested;
        }
        true
    }

    /// XOR the monitor's view with `mask`, refusing to clear all bits.
    pub fn toggle_view(&mut self, mask: u32) -> bool {
        let new_view = self.current_view() ^ (mask & ALL_TAGS);
        if new_view == 0 {
            return false;
        }
        self.tagset[self.seltags] = new_view;
        true
    }

    /// Recompute the work area from the screen geometry and bar settings
    /// (dwm.c `updatebarpos`).
    pub fn update_bar_pos(&mut self, bar_height: i32) {
        self.wy = self.my;
        self.wh = self.mh;
        if self.show_bar {
            self.wh -= bar_height;
            self.by = if self.top_bar { self.wy } else { self.wy + self.wh };
            self.wy = if self.top_bar { self.wy + bar_height } else { self.wy };
        } else {
            self.by = -bar_height;
        }
    }

    pub fn attach(&mut self, c: ClientId) {
        self.clients.insert(0, c);
    }

    pub fn detach(&mut self, c: ClientId) {
        self.clients.retain(|&id| id != c);
    }

    pub fn attach_stack(&mut self, c: ClientId) {
        self.stack.insert(0, c);
    }

    pub fn detach_stack(&mut self, c: ClientId) {
        self.stack.retain(|&id| id != c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_toggle_history_restores_original() {
        let mut m = Monitor::new(0);
        m.tagset = [1, 1];
        m.seltags = 0;
        assert!(m.view(1 << 1));
        assert_eq!(m.tagset[1], 1 << 1);
        assert_eq!(m.seltags, 1);

        // toggling back to the same mask is identity, rejected
        assert!(!m.view(1 << 1));

        // view(0) flips seltags back without changing either slot
        assert!(m.view(0));
        assert_eq!(m.seltags, 0);
        assert_eq!(m.current_view(), 1);
    }

    #[test]
    fn toggleview_refuses_to_clear_all_bits() {
        let mut m = Monitor::new(0);
        m.tagset[0] = 1;
        assert!(!m.toggle_view(1));
        assert_eq!(m.current_view(), 1);
    }

    #[test]
    fn toggleview_twice_is_identity_when_nonempty() {
        let mut m = Monitor::new(0);
        m.tagset[0] = 0b11;
        assert!(m.toggle_view(0b10));
        assert_eq!(m.current_view(), 0b01);
        assert!(m.toggle_view(0b10));
        assert_eq!(m.current_view(), 0b11);
    }

    #[test]
    fn attach_puts_client_at_head() {
        let mut m = Monitor::new(0);
        m.attach(1);
        m.attach(2);
        assert_eq!(m.clients, vec![2, 1]);
    }
}
