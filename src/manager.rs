//! The `Wm` engine: owns all client/monitor state and the operations that
//! mutate it (dwm.c's global `mons`/`selmon`/`clients` plus its top-level
//! functions, collapsed into one struct per spec REDESIGN FLAGS).

use crate::arena::Arena;
use crate::atom::{Atoms, WmAtom};
use crate::bar;
use crate::bindings::{Arg, Binding, Key};
use crate::client::{Client, Geometry, Window};
use crate::config;
use crate::display::{CursorShape, XConn};
use crate::monitor::{ClientId, Monitor, MonitorId};
use crate::rules::{self, WindowIdentity};

pub const BAR_HEIGHT_PAD: i32 = 4;

pub struct Wm {
    pub conn: Box<dyn XConn>,
    pub atoms: Atoms,
    pub clients: Arena<Client>,
    pub monitors: Arena<Monitor>,
    pub selmon: MonitorId,
    pub running: bool,
    pub keys: Vec<Binding<Key>>,
    pub buttons: Vec<Binding<crate::bindings::Button>>,
    pub bar_height: i32,
    pub cursor_normal: u64,
    pub cursor_move: u64,
    pub cursor_resize: u64,
    /// Cached root `WM_NAME`, drawn right-aligned on the selected monitor's
    /// bar (dwm.c `updatestatus`).
    pub status: String,
}

impl Wm {
    pub fn new(conn: Box<dyn XConn>) -> Self {
        let atoms = Atoms::intern(conn.as_ref());
        let bar_height = conn.font_height() + BAR_HEIGHT_PAD;
        let cursor_normal = conn.create_cursor(CursorShape::Normal);
        let cursor_move = conn.create_cursor(CursorShape::Move);
        let cursor_resize = conn.create_cursor(CursorShape::Resize);
        let mut wm = Wm {
            conn,
            atoms,
            clients: Arena::new(),
            monitors: Arena::new(),
            selmon: 0,
            running: true,
            keys: config::keys(),
            buttons: config::buttons(),
            bar_height,
            cursor_normal,
            cursor_move,
            cursor_resize,
            status: String::new(),
        };
        wm.update_geometry();
        wm.ensure_bar_windows();
        wm
    }

    /// Create a bar override-redirect window for any monitor that doesn't
    /// have one yet (dwm.c `updatebars`).
    fn ensure_bar_windows(&mut self) {
        let ids = self.monitors.ids();
        for mid in ids {
            let mon = self.monitors.get(mid).unwrap();
            if mon.barwin != 0 {
                continue;
            }
            let (x, y, w) = (mon.wx, mon.by, mon.ww.max(1) as u32);
            let win = self.conn.create_simple_window(x, y, w, self.bar_height.max(1) as u32, true);
            self.conn.select_input(win, x11::xlib::ExposureMask);
            self.conn.map_window(win);
            self.monitors.get_mut(mid).unwrap().barwin = win;
        }
    }

    /// Single always-present monitor sized to the root window (spec §3,
    /// REDESIGN FLAGS: no Xinerama/RandR probe, matching dwm-xcb's own
    /// `updategeom`, which never branches on Xinerama either).
    pub fn update_geometry(&mut self) {
        let screen = self.conn.default_screen_geometry();
        if self.monitors.is_empty() {
            let mut mon = Monitor::new(0);
            mon.mx = screen.x;
            mon.my = screen.y;
            mon.mw = screen.w as i32;
            mon.mh = screen.h as i32;
            mon.update_bar_pos(self.bar_height);
            let id = self.monitors.insert(mon);
            self.selmon = id;
        } else {
            for (_, mon) in self.monitors.iter_mut() {
                mon.mx = screen.x;
                mon.my = screen.y;
                mon.mw = screen.w as i32;
                mon.mh = screen.h as i32;
                mon.update_bar_pos(self.bar_height);
            }
        }
    }

    pub fn selected_monitor(&self) -> &Monitor {
        self.monitors.get(self.selmon).expect("selmon always valid")
    }

    pub fn selected_monitor_mut(&mut self) -> &mut Monitor {
        self.monitors.get_mut(self.selmon).expect("selmon always valid")
    }

    // --- layout.rs accessors -------------------------------------------------

    /// Visible, non-floating, non-fullscreen clients on `mid` in attach
    /// order (dwm.c `nexttiled` walked over the client list).
    pub fn tiled_clients(&self, mid: MonitorId) -> Vec<ClientId> {
        let mon = self.monitors.get(mid).expect("valid monitor");
        let view = mon.current_view();
        mon.clients
            .iter()
            .copied()
            .filter(|&cid| {
                self.clients
                    .get(cid)
                    .map(|c| c.visible_on(view) && !c.is_floating())
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn work_area(&self, mid: MonitorId) -> (i32, i32, i32, i32) {
        let mon = self.monitors.get(mid).expect("valid monitor");
        (mon.wx, mon.wy, mon.ww, mon.wh)
    }

    pub fn mfact(&self, mid: MonitorId) -> f64 {
        self.monitors.get(mid).map(|m| m.mfact).unwrap_or(config::MFACT)
    }

    pub fn border_width(&self, cid: ClientId) -> i32 {
        self.clients.get(cid).map(|c| c.geom.bw).unwrap_or(config::BORDER_PX as i32)
    }

    pub fn client_height_with_border(&self, cid: ClientId) -> i32 {
        self.clients.get(cid).map(|c| c.geom.height_with_border()).unwrap_or(0)
    }

    /// Apply size hints and issue the X move/resize only if geometry
    /// actually changes (dwm.c `resizeclient`/`resize`).
    pub fn resize_client(&mut self, cid: ClientId, x: i32, y: i32, w: i32, h: i32, interact: bool) {
        let screen = self.conn.default_screen_geometry();
        let mon = self.client_monitor(cid);
        let (mx, my, mw, mh) = self.work_area_full(mon);
        let bar_h = self.bar_height;
        let client = match self.clients.get(cid) {
            Some(c) => c,
            None => return,
        };
        let (nx, ny, nw, nh, changed) =
            client.apply_size_hints(x, y, w, h, interact, screen.w as i32, screen.h as i32, mx, my, mw, mh, bar_h);
        if !changed {
            return;
        }
        let bw = client.geom.bw;
        if let Some(c) = self.clients.get_mut(cid) {
            c.geom = Geometry { x: nx, y: ny, w: nw, h: nh, bw };
        }
        self.conn.move_resize(self.clients.get(cid).unwrap().win, nx, ny, (nw + 2 * bw) as u32, (nh + 2 * bw) as u32);
        self.conn.configure_notify(self.clients.get(cid).unwrap().win, nx, ny, nw as u32, nh as u32, bw as u32);
    }

    fn work_area_full(&self, mid: MonitorId) -> (i32, i32, i32, i32) {
        self.monitors.get(mid).map(|m| (m.mx, m.my, m.mw, m.mh)).unwrap_or((0, 0, 0, 0))
    }

    pub fn client_monitor(&self, cid: ClientId) -> MonitorId {
        self.clients.get(cid).map(|c| c.mon).unwrap_or(self.selmon)
    }

    // --- arrange/restack ------------------------------------------------------

    /// Recompute `ltsymbol` and run the active layout's arrange function
    /// on every monitor (dwm.c `arrange`).
    pub fn arrange(&mut self) {
        let ids = self.monitors.ids();
        for mid in ids {
            self.show_hide_stack(mid);
        }
        for mid in self.monitors.ids() {
            self.arrangemon(mid);
            self.restack(mid);
        }
    }

    pub fn arrangemon(&mut self, mid: MonitorId) {
        let layout = self.monitors.get(mid).unwrap().current_layout();
        self.monitors.get_mut(mid).unwrap().ltsymbol = layout.symbol.to_string();
        if let Some(arrange) = layout.arrange {
            arrange(self, mid);
        }
    }

    /// Show visible clients, push invisible ones off-screen rather than
    /// unmapping them (dwm.c `showhide`'s `x + 2 * sw` trick, spec §4.6).
    fn show_hide_stack(&mut self, mid: MonitorId) {
        let screen_w = self.conn.default_screen_geometry().w as i32;
        let view = self.monitors.get(mid).unwrap().current_view();
        let order: Vec<ClientId> = self.monitors.get(mid).unwrap().stack.clone();
        for cid in order {
            let visible = self.clients.get(cid).map(|c| c.visible_on(view)).unwrap_or(false);
            let win = match self.clients.get(cid) {
                Some(c) => c.win,
                None => continue,
            };
            if visible {
                let (x, y) = self.clients.get(cid).map(|c| (c.geom.x, c.geom.y)).unwrap();
                self.conn.move_resize(win, x, y, self.clients.get(cid).unwrap().geom.width_with_border() as u32, self.clients.get(cid).unwrap().geom.height_with_border() as u32);
            } else {
                let (y, w, h) = self.clients.get(cid).map(|c| (c.geom.y, c.geom.width_with_border(), c.geom.height_with_border())).unwrap();
                self.conn.move_resize(win, -2 * screen_w, y, w as u32, h as u32);
            }
        }
    }

    /// Bottom-up restacking: floating clients raised above tiled ones,
    /// stacking order otherwise following the focus stack (dwm.c `restack`).
    pub fn restack(&mut self, mid: MonitorId) {
        let mon = self.monitors.get(mid).unwrap();
        let sel = mon.sel;
        if let Some(sel_cid) = sel {
            if self.clients.get(sel_cid).map(|c| c.is_floating()).unwrap_or(false) {
                let win = self.clients.get(sel_cid).unwrap().win;
                self.conn.raise_window(win);
            }
        }
        let order: Vec<Window> = mon
            .stack
            .iter()
            .filter_map(|&cid| self.clients.get(cid).map(|c| c.win))
            .collect();
        self.conn.restack(&order);
        self.conn.sync();
    }

    // --- focus ------------------------------------------------------------

    /// Unset the currently-selected client's border, optionally leaving
    /// window input focus to revert to root (dwm.c `unfocus`).
    pub fn unfocus(&mut self, mid: MonitorId, set_focus: bool) {
        let sel = self.monitors.get(mid).unwrap().sel;
        if let Some(cid) = sel {
            let win = self.clients.get(cid).unwrap().win;
            self.grab_buttons(cid, false);
            let color = self.conn.alloc_color(bar::scheme_colors(config::Scheme::Norm)[0]);
            self.conn.set_border_color(win, color);
            if set_focus {
                self.conn.set_input_focus(self.conn.root());
                self.conn.delete_property_active_window(self.conn.root());
            }
        }
    }

    /// Focus `cid` (or the top of the current monitor's focus stack if
    /// `None`), raising its border and restacking (dwm.c `focus`).
    pub fn focus(&mut self, cid: Option<ClientId>) {
        let mid = self.selmon;
        let view = self.monitors.get(mid).unwrap().current_view();
        let target = cid
            .filter(|&c| self.clients.get(c).map(|cl| cl.visible_on(view)).unwrap_or(false))
            .or_else(|| {
                self.monitors
                    .get(mid)
                    .unwrap()
                    .stack
                    .iter()
                    .copied()
                    .find(|&c| self.clients.get(c).map(|cl| cl.visible_on(view)).unwrap_or(false))
            });

        if let Some(prev) = self.monitors.get(mid).unwrap().sel {
            if Some(prev) != target {
                self.unfocus(mid, false);
            }
        }

        if let Some(cid) = target {
            self.monitors.get_mut(mid).unwrap().detach_stack(cid);
            self.monitors.get_mut(mid).unwrap().attach_stack(cid);
            self.grab_buttons(cid, true);
            let win = self.clients.get(cid).unwrap().win;
            let color = self.conn.alloc_color(bar::scheme_colors(config::Scheme::Sel)[0]);
            self.conn.set_border_color(win, color);
            self.set_client_focus(cid);
        } else {
            self.conn.set_input_focus(self.conn.root());
            self.conn.delete_property_active_window(self.conn.root());
        }
        self.monitors.get_mut(mid).unwrap().sel = target;
    }

    fn set_client_focus(&mut self, cid: ClientId) {
        let win = match self.clients.get(cid) {
            Some(c) => c.win,
            None => return,
        };
        self.conn.set_input_focus(win);
        self.conn.set_active_window(self.conn.root(), win);
        self.conn.send_protocol_message(win, self.atoms.wm(WmAtom::TakeFocus));
    }

    fn grab_buttons(&mut self, cid: ClientId, focused: bool) {
        let win = match self.clients.get(cid) {
            Some(c) => c.win,
            None => return,
        };
        self.conn.ungrab_all_buttons(win);
        if !focused {
            self.conn.grab_button(0, 0, win, true);
        }
        for binding in self.buttons.iter() {
            if binding.click == Some(crate::bindings::ClickArea::ClientWin) {
                self.conn.grab_button(binding.trigger.button, binding.trigger.modifiers, win, false);
            }
        }
    }

    // --- manage / unmanage --------------------------------------------------

    /// Adopt `win` into a new `Client` record (dwm.c `manage`). Applies
    /// window rules, ICCCM size hints, and the fix for the STACK_MODE
    /// precedence bug noted in spec REDESIGN FLAGS: a stacking-mode
    /// argument is only sent on the initial configure when the client
    /// ends up floating.
    pub fn manage(&mut self, win: Window) {
        if self.window_to_client(win).is_some() {
            return;
        }
        let transient = self.conn.get_transient_for(win);
        let parent = transient.and_then(|t| self.window_to_client(t));
        let (class, instance) = self.conn.get_class_instance(win);
        let title = self.conn.get_net_window_name(win).or_else(|| self.conn.get_window_name(win)).unwrap_or_default();
        let identity = WindowIdentity { class, instance, title };

        // A transient window inherits its parent's monitor and tags
        // (dwm.c `manage`); otherwise the window-rule table picks both.
        let (mon, tags, rule_floating) = if let Some(parent_cid) = parent {
            let p = self.clients.get(parent_cid).unwrap();
            (p.mon, p.tags, false)
        } else {
            let rule_match = rules::apply(&identity);
            let mon = if rule_match.monitor >= 0 && self.monitors.contains(rule_match.monitor as usize) {
                rule_match.monitor as usize
            } else {
                self.selmon
            };
            let tags = if rule_match.tags != 0 { rule_match.tags } else { self.monitors.get(mon).unwrap().current_view() };
            (mon, tags, rule_match.is_floating)
        };

        let mut client = Client::new(win, mon, tags);

        // Read the window's actual requested geometry and clamp it into
        // the owning monitor (dwm.c `manage`'s `XGetWindowAttributes`
        // offset/clamp block). A window that already fills the monitor
        // is made borderless floating rather than tiled.
        let geom = self.conn.get_window_geometry(win);
        let (mx, my, mw, mh, wy) = {
            let m = self.monitors.get(mon).unwrap();
            (m.mx, m.my, m.mw, m.mh, m.wy)
        };
        let fills_monitor = geom.w as i32 >= mw && geom.h as i32 >= mh;
        let bw = if fills_monitor { 0 } else { config::BORDER_PX as i32 };
        let mut x = geom.x;
        let mut y = geom.y;
        let w = geom.w.max(1) as i32;
        let h = geom.h.max(1) as i32;
        if x + w + 2 * bw > mx + mw {
            x = mx + mw - (w + 2 * bw);
        }
        if y + h + 2 * bw > my + mh {
            y = my + mh - (h + 2 * bw);
        }
        x = x.max(mx);
        y = y.max(wy);
        client.geom = Geometry { x, y, w, h, bw };
        client.old_geom = client.geom;

        client.hints = {
            let nh = self.conn.get_normal_hints(win);
            crate::client::SizeHints {
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
            }
        };
        client.flags.set(crate::client::WindowFlags::FIXED, client.hints.is_fixed());
        client.set_floating(rule_floating);
        if !client.is_floating() {
            client.set_floating(transient.is_some() || client.is_fixed());
        }
        if fills_monitor {
            client.set_floating(true);
        }
        client.name = title_or_broken(identity.title.clone());

        let wm_hints = self.conn.get_wm_hints(win);
        client.set_urgent(wm_hints.urgent);

        self.conn.select_input(
            win,
            x11::xlib::EnterWindowMask | x11::xlib::FocusChangeMask | x11::xlib::PropertyChangeMask | x11::xlib::StructureNotifyMask,
        );
        self.conn.set_border_width(win, client.geom.bw as u32);
        let color = self.conn.alloc_color(bar::scheme_colors(config::Scheme::Norm)[0]);
        self.conn.set_border_color(win, color);
        // Propagate the border width to the client even when geometry
        // itself doesn't change (dwm.c `configure`'s initial synthetic
        // ConfigureNotify).
        self.conn.configure_notify(win, client.geom.x, client.geom.y, client.geom.w as u32, client.geom.h as u32, client.geom.bw as u32);

        let cid = self.clients.insert(client);
        self.monitors.get_mut(mon).unwrap().attach(cid);
        self.monitors.get_mut(mon).unwrap().attach_stack(cid);
        self.conn.append_client_list(self.conn.root(), win);
        self.conn.set_wm_state(win, 1); // NormalState

        if self.clients.get(cid).unwrap().is_floating() {
            self.conn.raise_window(win);
        }

        // Move off-screen before the first map so `arrange`'s subsequent
        // `show_hide_stack` pass is the one that brings a visible client
        // on-screen (dwm.c `manage`'s `x + 2 * sw` premap trick).
        let screen_w = self.conn.default_screen_geometry().w as i32;
        let c = self.clients.get(cid).unwrap();
        self.conn.move_resize(win, c.geom.x + 2 * screen_w, c.geom.y, c.geom.width_with_border() as u32, c.geom.height_with_border() as u32);

        self.conn.map_window(win);
        self.arrange();
        if mon == self.selmon {
            self.focus(Some(cid));
        }
    }

    /// Release a client from the engine. `destroyed` means the X window
    /// is already gone (no point unmapping/resetting WM_STATE on it).
    pub fn unmanage(&mut self, cid: ClientId, destroyed: bool) {
        let (mon, win) = match self.clients.get(cid) {
            Some(c) => (c.mon, c.win),
            None => return,
        };
        self.monitors.get_mut(mon).unwrap().detach(cid);
        self.monitors.get_mut(mon).unwrap().detach_stack(cid);
        if self.monitors.get(mon).unwrap().sel == Some(cid) {
            let next = self.monitors.get(mon).unwrap().stack.first().copied();
            self.monitors.get_mut(mon).unwrap().sel = None;
            self.focus(next);
        }
        self.clients.remove(cid);
        if !destroyed {
            self.conn.ungrab_all_buttons(win);
            self.conn.set_wm_state(win, 0); // WithdrawnState
        }
        self.arrange();
    }

    pub fn window_to_client(&self, win: Window) -> Option<ClientId> {
        self.clients.iter().find(|(_, c)| c.win == win).map(|(id, _)| id)
    }

    /// Adopt windows already mapped before this process took over root
    /// (dwm.c `scan`), so a WM restart doesn't orphan running clients.
    pub fn scan(&mut self) {
        let root = self.conn.root();
        let children = self.conn.query_tree(root);
        for &win in children.iter() {
            let attrs = self.conn.get_window_attributes(win);
            let (override_redirect, viewable) = match attrs {
                Some(a) => a,
                None => continue,
            };
            if override_redirect {
                continue;
            }
            let state = self.conn.get_wm_state(win);
            let iconic = state == Some(3);
            if viewable || iconic {
                self.manage(win);
            }
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}

fn title_or_broken(title: String) -> String {
    if title.is_empty() {
        "broken".to_string()
    } else {
        title.chars().take(255).collect()
    }
}

/// Key/button handler bodies (spec §5's action set). Each signature
/// matches `Action = fn(&mut Wm, &Arg)` so the binding tables in
/// `config.rs` can reference them directly.
pub mod actions {
    use super::*;

    pub fn spawn(wm: &mut Wm, arg: &Arg) {
        if let Arg::Strv(argv) = arg {
            wm.conn.spawn(argv);
        }
    }

    pub fn togglebar(wm: &mut Wm, _arg: &Arg) {
        let mid = wm.selmon;
        {
            let mon = wm.monitors.get_mut(mid).unwrap();
            mon.show_bar = !mon.show_bar;
        }
        let bar_height = wm.bar_height;
        wm.monitors.get_mut(mid).unwrap().update_bar_pos(bar_height);
        wm.arrange();
    }

    pub fn focusstack(wm: &mut Wm, arg: &Arg) {
        let dir = if let Arg::Int(i) = arg { *i } else { 1 };
        let mid = wm.selmon;
        let view = wm.monitors.get(mid).unwrap().current_view();
        let visible: Vec<ClientId> = wm
            .monitors
            .get(mid)
            .unwrap()
            .clients
            .iter()
            .copied()
            .filter(|&c| wm.clients.get(c).map(|cl| cl.visible_on(view)).unwrap_or(false))
            .collect();
        if visible.is_empty() {
            return;
        }
        let sel = wm.monitors.get(mid).unwrap().sel;
        let idx = sel.and_then(|s| visible.iter().position(|&c| c == s));
        let next = match idx {
            Some(i) => {
                let len = visible.len() as i32;
                let new_i = ((i as i32 + dir).rem_euclid(len)) as usize;
                visible[new_i]
            }
            None => visible[0],
        };
        wm.focus(Some(next));
    }

    pub fn setmfact(wm: &mut Wm, arg: &Arg) {
        if let Arg::Float(delta) = arg {
            let mid = wm.selmon;
            let mon = wm.monitors.get_mut(mid).unwrap();
            let new_fact = if *delta == 0.0 { 0.5 } else { mon.mfact + delta };
            if new_fact >= 0.05 && new_fact <= 0.95 {
                mon.mfact = new_fact;
                wm.arrange();
            }
        }
    }

    /// Promote the selected client to master, or demote master to the
    /// next slot if it's already master (dwm.c `zoom`).
    pub fn zoom(wm: &mut Wm, _arg: &Arg) {
        let mid = wm.selmon;
        let sel = match wm.monitors.get(mid).unwrap().sel {
            Some(c) => c,
            None => return,
        };
        if wm.clients.get(sel).map(|c| c.is_floating()).unwrap_or(true) {
            return;
        }
        let clients = wm.monitors.get(mid).unwrap().clients.clone();
        let promoted = if clients.first() == Some(&sel) {
            // already master: promote whichever tiled client follows it instead
            match clients.get(1).copied() {
                Some(next) => next,
                None => return,
            }
        } else {
            sel
        };
        wm.monitors.get_mut(mid).unwrap().detach(promoted);
        wm.monitors.get_mut(mid).unwrap().attach(promoted);
        wm.focus(Some(promoted));
        wm.arrange();
    }

    pub fn view(wm: &mut Wm, arg: &Arg) {
        if let Arg::UInt(mask) = arg {
            let mid = wm.selmon;
            if wm.monitors.get_mut(mid).unwrap().view(*mask) {
                wm.focus(None);
                wm.arrange();
            }
        }
    }

    pub fn toggleview(wm: &mut Wm, arg: &Arg) {
        if let Arg::UInt(mask) = arg {
            let mid = wm.selmon;
            if wm.monitors.get_mut(mid).unwrap().toggle_view(*mask) {
                wm.focus(None);
                wm.arrange();
            }
        }
    }

    pub fn tag(wm: &mut Wm, arg: &Arg) {
        if let Arg::UInt(mask) = arg {
            let mid = wm.selmon;
            let sel = wm.monitors.get(mid).unwrap().sel;
            if let Some(cid) = sel {
                if *mask != 0 {
                    if let Some(c) = wm.clients.get_mut(cid) {
                        c.tags = *mask & crate::monitor::ALL_TAGS;
                    }
                    wm.focus(None);
                    wm.arrange();
                }
            }
        }
    }

    pub fn toggletag(wm: &mut Wm, arg: &Arg) {
        if let Arg::UInt(mask) = arg {
            let mid = wm.selmon;
            let sel = wm.monitors.get(mid).unwrap().sel;
            if let Some(cid) = sel {
                if let Some(c) = wm.clients.get_mut(cid) {
                    let new_tags = c.tags ^ (*mask & crate::monitor::ALL_TAGS);
                    if new_tags != 0 {
                        c.tags = new_tags;
                        wm.focus(None);
                        wm.arrange();
                    }
                }
            }
        }
    }

    pub fn killclient(wm: &mut Wm, _arg: &Arg) {
        let mid = wm.selmon;
        let sel = match wm.monitors.get(mid).unwrap().sel {
            Some(c) => c,
            None => return,
        };
        let win = wm.clients.get(sel).unwrap().win;
        let delete_atom = wm.atoms.wm(WmAtom::DeleteWindow);
        if !wm.conn.send_protocol_message(win, delete_atom) {
            wm.conn.destroy_window(win);
        }
    }

    pub fn setlayout(wm: &mut Wm, arg: &Arg) {
        let mid = wm.selmon;
        let mon = wm.monitors.get_mut(mid).unwrap();
        match arg {
            Arg::Layout(layout) => {
                mon.sellt ^= 1;
                mon.lt[mon.sellt] = layout;
            }
            _ => {
                mon.sellt ^= 1;
            }
        }
        mon.ltsymbol = mon.lt[mon.sellt].symbol.to_string();
        wm.arrange();
    }

    pub fn togglefloating(wm: &mut Wm, _arg: &Arg) {
        let mid = wm.selmon;
        let sel = match wm.monitors.get(mid).unwrap().sel {
            Some(c) => c,
            None => return,
        };
        let (is_fixed, is_floating) = wm
            .clients
            .get(sel)
            .map(|c| (c.is_fixed(), c.is_floating()))
            .unwrap_or((true, false));
        if is_fixed {
            return;
        }
        if let Some(c) = wm.clients.get_mut(sel) {
            c.set_floating(!is_floating);
        }
        wm.arrange();
    }

    pub fn focusmon(wm: &mut Wm, arg: &Arg) {
        if let Arg::Int(dir) = arg {
            let ids = wm.monitors.ids();
            if ids.len() < 2 {
                return;
            }
            let idx = ids.iter().position(|&m| m == wm.selmon).unwrap_or(0) as i32;
            let len = ids.len() as i32;
            let new_idx = (idx + dir).rem_euclid(len) as usize;
            wm.unfocus(wm.selmon, true);
            wm.selmon = ids[new_idx];
            wm.focus(None);
        }
    }

    pub fn tagmon(wm: &mut Wm, arg: &Arg) {
        if let Arg::Int(dir) = arg {
            let ids = wm.monitors.ids();
            if ids.len() < 2 {
                return;
            }
            let mid = wm.selmon;
            let sel = match wm.monitors.get(mid).unwrap().sel {
                Some(c) => c,
                None => return,
            };
            let idx = ids.iter().position(|&m| m == mid).unwrap_or(0) as i32;
            let len = ids.len() as i32;
            let target = ids[(idx + dir).rem_euclid(len) as usize];
            wm.monitors.get_mut(mid).unwrap().detach(sel);
            wm.monitors.get_mut(mid).unwrap().detach_stack(sel);
            if let Some(c) = wm.clients.get_mut(sel) {
                c.mon = target;
            }
            wm.monitors.get_mut(target).unwrap().attach(sel);
            wm.monitors.get_mut(target).unwrap().attach_stack(sel);
            wm.arrange();
        }
    }

    pub fn movemouse(wm: &mut Wm, arg: &Arg) {
        crate::mouse::movemouse(wm, arg);
    }

    pub fn resizemouse(wm: &mut Wm, arg: &Arg) {
        crate::mouse::resizemouse(wm, arg);
    }

    pub fn quit(wm: &mut Wm, _arg: &Arg) {
        wm.quit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{NormalHints, Rect, WmHintsInfo, XEvent};
    use std::cell::RefCell;

    struct NullConn {
        geom: Rect,
        spawned: RefCell<Vec<Vec<String>>>,
    }

    impl crate::atom::AtomSource for NullConn {
        fn intern_atom(&self, _name: &str) -> u64 {
            1
        }
    }

    impl XConn for NullConn {
        fn default_screen_geometry(&self) -> Rect { self.geom }
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
        fn get_window_attributes(&self, _: u64) -> Option<(bool, bool)> { Some((false, true)) }
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
        fn create_gc(&self, _: u64) -> crate::display::Gc { std::ptr::null_mut() }
        fn set_foreground(&self, _: crate::display::Gc, _: u64) {}
        fn fill_rect(&self, _: u64, _: crate::display::Gc, _: i32, _: i32, _: u32, _: u32) {}
        fn draw_text(&self, _: u64, _: crate::display::Gc, _: i32, _: i32, _: u64, _: &str) {}
        fn text_width(&self, text: &str) -> i32 { text.len() as i32 * 6 }
        fn font_height(&self) -> i32 { 12 }
        fn grab_pointer_for_drag(&self, _: u64) -> bool { false }
        fn ungrab_pointer(&self) {}
        fn sync(&self) {}
        fn spawn(&self, argv: &[&str]) {
            self.spawned.borrow_mut().push(argv.iter().map(|s| s.to_string()).collect());
        }
    }

    fn test_wm() -> Wm {
        let conn = NullConn { geom: Rect { x: 0, y: 0, w: 1920, h: 1080 }, spawned: RefCell::new(Vec::new()) };
        Wm::new(Box::new(conn))
    }

    #[test]
    fn manage_attaches_client_to_selected_monitor() {
        let mut wm = test_wm();
        wm.manage(100);
        let mid = wm.selmon;
        assert_eq!(wm.monitors.get(mid).unwrap().clients.len(), 1);
    }

    #[test]
    fn manage_is_idempotent_for_already_managed_window() {
        let mut wm = test_wm();
        wm.manage(100);
        wm.manage(100);
        assert_eq!(wm.clients.len(), 1);
    }

    #[test]
    fn unmanage_removes_client_and_reassigns_focus() {
        let mut wm = test_wm();
        wm.manage(100);
        wm.manage(200);
        let cid = wm.window_to_client(200).unwrap();
        wm.unmanage(cid, false);
        assert_eq!(wm.clients.len(), 1);
        assert!(wm.window_to_client(200).is_none());
    }

    #[test]
    fn zoom_promotes_second_client_to_master() {
        let mut wm = test_wm();
        wm.manage(100);
        wm.manage(200);
        let mid = wm.selmon;
        let second = *wm.monitors.get(mid).unwrap().clients.last().unwrap();
        wm.monitors.get_mut(mid).unwrap().sel = Some(second);
        actions::zoom(&mut wm, &Arg::UInt(0));
        assert_eq!(wm.monitors.get(mid).unwrap().clients[0], second);
    }

    #[test]
    fn view_switch_updates_tagset_history() {
        let mut wm = test_wm();
        let mid = wm.selmon;
        actions::view(&mut wm, &Arg::UInt(1 << 2));
        assert_eq!(wm.monitors.get(mid).unwrap().current_view(), 1 << 2);
    }
}
