//! The display adapter seam.
//!
//! Everywhere dwm.c calls straight into Xlib, this crate calls through
//! `XConn` instead. `XlibConn` is the one production implementation, built
//! on the `x11` crate's raw bindings in the same unsafe-but-contained style
//! the teacher crate used; keeping the trait narrow is what lets
//! `manager.rs`/`event.rs`/`bar.rs` be unit tested without an X server.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::ptr;
use std::sync::Mutex;

use lazy_static::lazy_static;
use x11::xlib;

use crate::atom::AtomSource;
use crate::error::{Result, WmError};

pub type Window = u64;
pub type Atom = u64;
pub type Cursor = u64;
pub type Colormap = u64;
pub type Gc = *mut xlib::_XGC;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WmHintsInfo {
    pub urgent: bool,
    pub never_focus: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalHints {
    pub base_w: i32,
    pub base_h: i32,
    pub inc_w: i32,
    pub inc_h: i32,
    pub max_w: i32,
    pub max_h: i32,
    pub min_w: i32,
    pub min_h: i32,
    pub min_aspect: f64,
    pub max_aspect: f64,
}

/// Which named cursor glyph to realize (dwm.c `CurNormal`/`CurResize`/`CurMove`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Normal,
    Resize,
    Move,
}

/// Raw X event, reduced to the fields the dispatch loop actually reads.
/// `event.rs` owns the full match; this just needs to move bytes off the
/// wire without dragging `xlib::XEvent`'s C union into every other module.
#[derive(Debug, Clone)]
pub enum XEvent {
    ButtonPress { window: Window, button: u32, state: u32, x: i32, y: i32, subwindow: Window },
    ClientMessage { window: Window, message_type: Atom, data: [i64; 5] },
    ConfigureRequest { window: Window, value_mask: u64, x: i32, y: i32, w: i32, h: i32, border_width: i32, above: Window, detail: i32 },
    ConfigureNotify { window: Window },
    DestroyNotify { window: Window },
    EnterNotify { window: Window, mode: i32, detail: i32 },
    Expose { window: Window, count: i32 },
    FocusIn { window: Window },
    KeyPress { keycode: u32, state: u32 },
    MappingNotify { request: i32 },
    MapRequest { window: Window },
    PropertyNotify { window: Window, atom: Atom, state: i32 },
    UnmapNotify { window: Window, send_event: bool },
    MotionNotify { x: i32, y: i32 },
    ButtonRelease,
    Unknown,
}

/// Everything the engine needs from an X display connection. One
/// production implementation (`XlibConn`); tests fake the narrower
/// `AtomSource` supertrait directly instead of this whole surface.
pub trait XConn: AtomSource {
    fn default_screen_geometry(&self) -> Rect;
    fn root(&self) -> Window;

    /// Claims `SubstructureRedirectMask` on root; fails with
    /// `WmError::AnotherWmRunning` if a WM is already present (dwm.c
    /// `checkotherwm`).
    fn become_wm(&self) -> Result<()>;

    fn next_event(&self) -> XEvent;
    fn pending(&self) -> i32;

    fn grab_key(&self, keycode: u32, modifiers: u32);
    fn ungrab_all_keys(&self);
    fn grab_button(&self, button: u32, modifiers: u32, window: Window, pointer_mode_sync: bool);
    fn ungrab_all_buttons(&self, window: Window);

    /// Recompute which modifier bit NumLock landed on (dwm.c
    /// `updatenumlockmask`), so grabs and `CLEANMASK` strip it regardless of
    /// keyboard layout.
    fn update_numlock_mask(&self);
    fn numlock_mask(&self) -> u32;

    fn select_input(&self, window: Window, event_mask: i64);
    fn map_window(&self, window: Window);
    fn unmap_window(&self, window: Window);
    fn destroy_window(&self, window: Window);
    fn move_resize(&self, window: Window, x: i32, y: i32, w: u32, h: u32);
    fn set_border_width(&self, window: Window, bw: u32);
    fn set_border_color(&self, window: Window, pixel: u64);
    fn configure_notify(&self, window: Window, x: i32, y: i32, w: u32, h: u32, bw: u32);
    fn raise_window(&self, window: Window);
    fn restack(&self, order: &[Window]);

    fn set_input_focus(&self, window: Window);
    fn send_protocol_message(&self, window: Window, protocol_atom: Atom) -> bool;
    fn send_configure(&self, window: Window, r: Rect, bw: u32);

    fn get_transient_for(&self, window: Window) -> Option<Window>;
    fn get_wm_protocols(&self, window: Window) -> Vec<Atom>;
    fn get_wm_hints(&self, window: Window) -> WmHintsInfo;
    fn set_wm_hints_not_urgent(&self, window: Window);
    fn get_normal_hints(&self, window: Window) -> NormalHints;
    fn get_window_name(&self, window: Window) -> Option<String>;
    fn get_net_window_name(&self, window: Window) -> Option<String>;
    fn get_class_instance(&self, window: Window) -> (String, String);
    fn get_window_attributes(&self, window: Window) -> Option<(bool, bool)>; // (override_redirect, viewable)
    /// The window's current geometry as the X server sees it right now
    /// (dwm.c `manage`'s `XGetWindowAttributes`-sourced `wa->x/y/width/height`).
    fn get_window_geometry(&self, window: Window) -> Rect;
    fn get_wm_state(&self, window: Window) -> Option<i64>;
    fn set_wm_state(&self, window: Window, state: i64);
    fn set_net_wm_state_empty(&self, window: Window);
    fn set_net_wm_state_fullscreen(&self, window: Window);
    fn is_net_wm_state_fullscreen(&self, window: Window) -> bool;
    fn is_dialog(&self, window: Window) -> bool;
    fn query_tree(&self, window: Window) -> Vec<Window>;
    fn query_pointer(&self, window: Window) -> (i32, i32);
    fn warp_pointer(&self, window: Window, x: i32, y: i32);

    fn set_supported(&self, root: Window, atoms: &[Atom]);
    fn append_client_list(&self, root: Window, window: Window);
    fn delete_client_list(&self, root: Window);
    fn delete_property_active_window(&self, root: Window);
    fn set_active_window(&self, root: Window, window: Window);

    fn alloc_color(&self, name: &str) -> u64;
    fn create_cursor(&self, shape: CursorShape) -> Cursor;
    fn create_simple_window(&self, x: i32, y: i32, w: u32, h: u32, override_redirect: bool) -> Window;
    fn create_gc(&self, window: Window) -> Gc;
    fn set_foreground(&self, gc: Gc, pixel: u64);
    fn fill_rect(&self, window: Window, gc: Gc, x: i32, y: i32, w: u32, h: u32);
    fn draw_text(&self, window: Window, gc: Gc, x: i32, y: i32, color: u64, text: &str);
    fn text_width(&self, text: &str) -> i32;
    fn font_height(&self) -> i32;

    fn grab_pointer_for_drag(&self, cursor: Cursor) -> bool;
    fn ungrab_pointer(&self);
    fn sync(&self);
    fn spawn(&self, argv: &[&str]);
}

pub struct XlibConn {
    display: *mut xlib::Display,
    screen: i32,
    root: Window,
    atom_cache: std::cell::RefCell<HashMap<String, Atom>>,
    gc_font_height: i32,
    numlock_mask: std::cell::Cell<u32>,
}

impl AtomSource for XlibConn {
    fn intern_atom(&self, name: &str) -> u64 {
        if let Some(&a) = self.atom_cache.borrow().get(name) {
            return a;
        }
        let c_name = CString::new(name).unwrap();
        let atom = unsafe { xlib::XInternAtom(self.display, c_name.as_ptr(), xlib::False) };
        self.atom_cache.borrow_mut().insert(name.to_string(), atom);
        atom
    }
}

impl XlibConn {
    /// Open the default display, failing with `WmError::NoDisplay` if the
    /// `DISPLAY` environment is unset or unreachable (dwm.c `main`).
    pub fn open() -> Result<Self> {
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(WmError::NoDisplay);
        }
        let screen = unsafe { xlib::XDefaultScreen(display) };
        let root = unsafe { xlib::XRootWindow(display, screen) };
        Ok(XlibConn {
            display,
            screen,
            root,
            atom_cache: std::cell::RefCell::new(HashMap::new()),
            gc_font_height: 16,
            numlock_mask: std::cell::Cell::new(0),
        })
    }
}

impl Drop for XlibConn {
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.display);
        }
    }
}

/// Guard flag the Xlib error handler writes through. Needs to live outside
/// `XlibConn` because `XSetErrorHandler` only accepts a bare function
/// pointer, no closure captures (same constraint the teacher crate hit) --
/// a `lazy_static` `Mutex` instead of an inherent `XlibConn` field.
lazy_static! {
    static ref WM_DETECTED: Mutex<bool> = Mutex::new(false);
}

extern "C" fn wm_detected_handler(_display: *mut xlib::Display, event: *mut xlib::XErrorEvent) -> i32 {
    let err = unsafe { &*event };
    if err.error_code == xlib::BadAccess {
        *WM_DETECTED.lock().unwrap() = true;
    }
    0
}

impl XConn for XlibConn {
    fn default_screen_geometry(&self) -> Rect {
        unsafe {
            Rect {
                x: 0,
                y: 0,
                w: xlib::XDisplayWidth(self.display, self.screen) as u32,
                h: xlib::XDisplayHeight(self.display, self.screen) as u32,
            }
        }
    }

    fn root(&self) -> Window {
        self.root
    }

    fn become_wm(&self) -> Result<()> {
        *WM_DETECTED.lock().unwrap() = false;
        unsafe {
            xlib::XSetErrorHandler(Some(wm_detected_handler));
            xlib::XSelectInput(
                self.display,
                self.root,
                xlib::SubstructureRedirectMask | xlib::SubstructureNotifyMask,
            );
            xlib::XSync(self.display, xlib::False);
        }
        if *WM_DETECTED.lock().unwrap() {
            return Err(WmError::AnotherWmRunning);
        }
        unsafe {
            xlib::XSetErrorHandler(None);
        }
        self.update_numlock_mask();
        Ok(())
    }

    fn next_event(&self) -> XEvent {
        let mut ev: xlib::XEvent = unsafe { std::mem::zeroed() };
        unsafe {
            xlib::XNextEvent(self.display, &mut ev);
        }
        translate_event(&ev)
    }

    fn pending(&self) -> i32 {
        unsafe { xlib::XPending(self.display) }
    }

    fn grab_key(&self, keycode: u32, modifiers: u32) {
        let numlock = self.numlock_mask.get();
        let lock_masks = [0, xlib::LockMask, numlock, xlib::LockMask | numlock];
        for &lock in lock_masks.iter() {
            unsafe {
                xlib::XGrabKey(
                    self.display,
                    keycode as i32,
                    modifiers | lock,
                    self.root,
                    xlib::True,
                    xlib::GrabModeAsync,
                    xlib::GrabModeAsync,
                );
            }
        }
    }

    fn ungrab_all_keys(&self) {
        unsafe {
            xlib::XUngrabKey(self.display, xlib::AnyKey, xlib::AnyModifier, self.root);
        }
    }

    fn grab_button(&self, button: u32, modifiers: u32, window: Window, pointer_mode_sync: bool) {
        let mode = if pointer_mode_sync { xlib::GrabModeSync } else { xlib::GrabModeAsync };
        let numlock = self.numlock_mask.get();
        let lock_masks = [0, xlib::LockMask, numlock, xlib::LockMask | numlock];
        for &lock in lock_masks.iter() {
            unsafe {
                xlib::XGrabButton(
                    self.display,
                    button,
                    modifiers | lock,
                    window,
                    xlib::False,
                    (xlib::ButtonPressMask | xlib::ButtonReleaseMask | xlib::PointerMotionMask) as u32,
                    mode,
                    xlib::GrabModeAsync,
                    0,
                    0,
                );
            }
        }
    }

    fn ungrab_all_buttons(&self, window: Window) {
        unsafe {
            xlib::XUngrabButton(self.display, xlib::AnyButton as u32, xlib::AnyModifier, window);
        }
    }

    fn select_input(&self, window: Window, event_mask: i64) {
        unsafe {
            xlib::XSelectInput(self.display, window, event_mask);
        }
    }

    fn map_window(&self, window: Window) {
        unsafe {
            xlib::XMapWindow(self.display, window);
        }
    }

    fn unmap_window(&self, window: Window) {
        unsafe {
            xlib::XUnmapWindow(self.display, window);
        }
    }

    fn destroy_window(&self, window: Window) {
        unsafe {
            xlib::XDestroyWindow(self.display, window);
        }
    }

    fn move_resize(&self, window: Window, x: i32, y: i32, w: u32, h: u32) {
        unsafe {
            xlib::XMoveResizeWindow(self.display, window, x, y, w, h);
        }
    }

    fn set_border_width(&self, window: Window, bw: u32) {
        unsafe {
            xlib::XSetWindowBorderWidth(self.display, window, bw);
        }
    }

    fn set_border_color(&self, window: Window, pixel: u64) {
        unsafe {
            xlib::XSetWindowBorder(self.display, window, pixel);
        }
    }

    fn configure_notify(&self, window: Window, x: i32, y: i32, w: u32, h: u32, bw: u32) {
        self.send_configure(window, Rect { x, y, w, h }, bw);
    }

    fn raise_window(&self, window: Window) {
        unsafe {
            xlib::XRaiseWindow(self.display, window);
        }
    }

    fn restack(&self, order: &[Window]) {
        if order.len() < 2 {
            if let Some(&w) = order.first() {
                self.raise_window(w);
            }
            return;
        }
        let mut windows: Vec<Window> = order.to_vec();
        unsafe {
            xlib::XRestackWindows(self.display, windows.as_mut_ptr(), windows.len() as i32);
        }
    }

    fn set_input_focus(&self, window: Window) {
        unsafe {
            xlib::XSetInputFocus(self.display, window, xlib::RevertToPointerRoot, xlib::CurrentTime);
        }
    }

    fn send_protocol_message(&self, window: Window, protocol_atom: Atom) -> bool {
        let protocols = self.get_wm_protocols(window);
        if !protocols.contains(&protocol_atom) {
            return false;
        }
        let wm_protocols = self.intern_atom("WM_PROTOCOLS");
        let mut ev: xlib::XClientMessageEvent = unsafe { std::mem::zeroed() };
        ev.type_ = xlib::ClientMessage;
        ev.window = window;
        ev.message_type = wm_protocols;
        ev.format = 32;
        ev.data.as_longs_mut()[0] = protocol_atom as i64;
        ev.data.as_longs_mut()[1] = xlib::CurrentTime as i64;
        let mut xev = xlib::XEvent { client_message: ev };
        unsafe {
            xlib::XSendEvent(self.display, window, xlib::False, xlib::NoEventMask, &mut xev);
        }
        true
    }

    fn send_configure(&self, window: Window, r: Rect, bw: u32) {
        let mut ev: xlib::XConfigureEvent = unsafe { std::mem::zeroed() };
        ev.type_ = xlib::ConfigureNotify;
        ev.event = window;
        ev.window = window;
        ev.x = r.x;
        ev.y = r.y;
        ev.width = r.w as i32;
        ev.height = r.h as i32;
        ev.border_width = bw as i32;
        ev.above = 0;
        ev.override_redirect = 0;
        let mut xev = xlib::XEvent { configure: ev };
        unsafe {
            xlib::XSendEvent(self.display, window, xlib::False, xlib::StructureNotifyMask, &mut xev);
        }
    }

    fn get_transient_for(&self, window: Window) -> Option<Window> {
        let mut trans: xlib::Window = 0;
        let ok = unsafe { xlib::XGetTransientForHint(self.display, window, &mut trans) };
        if ok != 0 && trans != 0 {
            Some(trans)
        } else {
            None
        }
    }

    fn get_wm_protocols(&self, window: Window) -> Vec<Atom> {
        let mut protocols: *mut xlib::Atom = ptr::null_mut();
        let mut count: i32 = 0;
        let ok = unsafe { xlib::XGetWMProtocols(self.display, window, &mut protocols, &mut count) };
        if ok == 0 || protocols.is_null() {
            return Vec::new();
        }
        let slice = unsafe { std::slice::from_raw_parts(protocols, count as usize) };
        let out = slice.to_vec();
        unsafe {
            xlib::XFree(protocols as *mut _);
        }
        out
    }

    fn get_wm_hints(&self, window: Window) -> WmHintsInfo {
        let hints = unsafe { xlib::XGetWMHints(self.display, window) };
        if hints.is_null() {
            return WmHintsInfo::default();
        }
        let h = unsafe { &*hints };
        let flags = h.flags;
        let info = WmHintsInfo {
            urgent: flags & xlib::XUrgencyHint != 0,
            never_focus: flags & xlib::InputHint != 0 && h.input == 0,
        };
        unsafe {
            xlib::XFree(hints as *mut _);
        }
        info
    }

    fn set_wm_hints_not_urgent(&self, window: Window) {
        let hints = unsafe { xlib::XGetWMHints(self.display, window) };
        if hints.is_null() {
            return;
        }
        unsafe {
            (*hints).flags &= !xlib::XUrgencyHint;
            xlib::XSetWMHints(self.display, window, hints);
            xlib::XFree(hints as *mut _);
        }
    }

    fn get_normal_hints(&self, window: Window) -> NormalHints {
        let mut size: xlib::XSizeHints = unsafe { std::mem::zeroed() };
        let mut supplied: i64 = 0;
        let ok = unsafe { xlib::XGetWMNormalHints(self.display, window, &mut size, &mut supplied) };
        let mut out = NormalHints::default();
        if ok == 0 {
            return out;
        }
        if size.flags & xlib::PBaseSize != 0 {
            out.base_w = size.base_width;
            out.base_h = size.base_height;
        } else if size.flags & xlib::PMinSize != 0 {
            out.base_w = size.min_width;
            out.base_h = size.min_height;
        }
        if size.flags & xlib::PResizeInc != 0 {
            out.inc_w = size.width_inc;
            out.inc_h = size.height_inc;
        }
        if size.flags & xlib::PMaxSize != 0 {
            out.max_w = size.max_width;
            out.max_h = size.max_height;
        }
        if size.flags & xlib::PMinSize != 0 {
            out.min_w = size.min_width;
            out.min_h = size.min_height;
        } else if size.flags & xlib::PBaseSize != 0 {
            out.min_w = size.base_width;
            out.min_h = size.base_height;
        }
        if size.flags & xlib::PAspect != 0 {
            out.min_aspect = size.min_aspect.y as f64 / size.min_aspect.x.max(1) as f64;
            out.max_aspect = size.max_aspect.x as f64 / size.max_aspect.y.max(1) as f64;
        }
        out
    }

    fn get_window_name(&self, window: Window) -> Option<String> {
        let mut text: xlib::XTextProperty = unsafe { std::mem::zeroed() };
        let ok = unsafe { xlib::XGetWMName(self.display, window, &mut text) };
        if ok == 0 || text.nitems == 0 {
            return None;
        }
        let s = unsafe { CStr::from_ptr(text.value as *const i8) }.to_string_lossy().into_owned();
        unsafe {
            xlib::XFree(text.value as *mut _);
        }
        Some(s)
    }

    fn get_net_window_name(&self, window: Window) -> Option<String> {
        let atom = self.intern_atom("_NET_WM_NAME");
        self.get_text_property(window, atom)
    }

    fn get_class_instance(&self, window: Window) -> (String, String) {
        let mut class_hint: xlib::XClassHint = unsafe { std::mem::zeroed() };
        let ok = unsafe { xlib::XGetClassHint(self.display, window, &mut class_hint) };
        if ok == 0 {
            return (String::new(), String::new());
        }
        let class = unsafe { CStr::from_ptr(class_hint.res_class) }.to_string_lossy().into_owned();
        let instance = unsafe { CStr::from_ptr(class_hint.res_name) }.to_string_lossy().into_owned();
        unsafe {
            xlib::XFree(class_hint.res_class as *mut _);
            xlib::XFree(class_hint.res_name as *mut _);
        }
        (class, instance)
    }

    fn get_window_attributes(&self, window: Window) -> Option<(bool, bool)> {
        let mut wa: xlib::XWindowAttributes = unsafe { std::mem::zeroed() };
        let ok = unsafe { xlib::XGetWindowAttributes(self.display, window, &mut wa) };
        if ok == 0 {
            return None;
        }
        Some((wa.override_redirect != 0, wa.map_state == xlib::IsViewable))
    }

    fn get_window_geometry(&self, window: Window) -> Rect {
        let mut root: xlib::Window = 0;
        let (mut x, mut y) = (0i32, 0i32);
        let (mut w, mut h, mut bw, mut depth) = (0u32, 0u32, 0u32, 0u32);
        unsafe {
            xlib::XGetGeometry(self.display, window, &mut root, &mut x, &mut y, &mut w, &mut h, &mut bw, &mut depth);
        }
        Rect { x, y, w, h }
    }

    fn update_numlock_mask(&self) {
        let mut mask = 0u32;
        unsafe {
            let modmap = xlib::XGetModifierMapping(self.display);
            if !modmap.is_null() {
                let m = &*modmap;
                let numlock_keycode = xlib::XKeysymToKeycode(self.display, x11::keysym::XK_Num_Lock as u64);
                for i in 0..8 {
                    for j in 0..m.max_keypermod {
                        let entry = *m.modifiermap.offset((i * m.max_keypermod + j) as isize);
                        if entry == numlock_keycode {
                            mask = 1 << i;
                        }
                    }
                }
                xlib::XFreeModifiermap(modmap);
            }
        }
        self.numlock_mask.set(mask);
    }

    fn numlock_mask(&self) -> u32 {
        self.numlock_mask.get()
    }

    fn get_wm_state(&self, window: Window) -> Option<i64> {
        let atom = self.intern_atom("WM_STATE");
        self.get_cardinal_property(window, atom)
    }

    fn set_wm_state(&self, window: Window, state: i64) {
        let atom = self.intern_atom("WM_STATE");
        let data = [state, 0i64];
        unsafe {
            xlib::XChangeProperty(
                self.display,
                window,
                atom,
                atom,
                32,
                xlib::PropModeReplace,
                data.as_ptr() as *const u8,
                2,
            );
        }
    }

    fn set_net_wm_state_empty(&self, window: Window) {
        let atom = self.intern_atom("_NET_WM_STATE");
        unsafe {
            xlib::XChangeProperty(self.display, window, atom, xlib::XA_ATOM as u64, 32, xlib::PropModeReplace, ptr::null(), 0);
        }
    }

    fn set_net_wm_state_fullscreen(&self, window: Window) {
        let atom = self.intern_atom("_NET_WM_STATE");
        let fs = self.intern_atom("_NET_WM_STATE_FULLSCREEN");
        unsafe {
            xlib::XChangeProperty(
                self.display,
                window,
                atom,
                xlib::XA_ATOM as u64,
                32,
                xlib::PropModeReplace,
                &fs as *const u64 as *const u8,
                1,
            );
        }
    }

    fn is_net_wm_state_fullscreen(&self, window: Window) -> bool {
        let atom = self.intern_atom("_NET_WM_STATE");
        let fs = self.intern_atom("_NET_WM_STATE_FULLSCREEN");
        self.get_atom_list_property(window, atom).contains(&fs)
    }

    fn is_dialog(&self, window: Window) -> bool {
        let atom = self.intern_atom("_NET_WM_WINDOW_TYPE");
        let dialog = self.intern_atom("_NET_WM_WINDOW_TYPE_DIALOG");
        self.get_atom_list_property(window, atom).contains(&dialog)
    }

    fn query_tree(&self, window: Window) -> Vec<Window> {
        let mut root: xlib::Window = 0;
        let mut parent: xlib::Window = 0;
        let mut children: *mut xlib::Window = ptr::null_mut();
        let mut n: u32 = 0;
        let ok = unsafe { xlib::XQueryTree(self.display, window, &mut root, &mut parent, &mut children, &mut n) };
        if ok == 0 || children.is_null() {
            return Vec::new();
        }
        let slice = unsafe { std::slice::from_raw_parts(children, n as usize) };
        let out = slice.to_vec();
        unsafe {
            xlib::XFree(children as *mut _);
        }
        out
    }

    fn query_pointer(&self, window: Window) -> (i32, i32) {
        let mut root: xlib::Window = 0;
        let mut child: xlib::Window = 0;
        let (mut root_x, mut root_y, mut win_x, mut win_y) = (0, 0, 0, 0);
        let mut mask: u32 = 0;
        unsafe {
            xlib::XQueryPointer(
                self.display,
                window,
                &mut root,
                &mut child,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            );
        }
        (root_x, root_y)
    }

    fn warp_pointer(&self, window: Window, x: i32, y: i32) {
        unsafe {
            xlib::XWarpPointer(self.display, 0, window, 0, 0, 0, 0, x, y);
        }
    }

    fn set_supported(&self, root: Window, atoms: &[Atom]) {
        let atom = self.intern_atom("_NET_SUPPORTED");
        unsafe {
            xlib::XChangeProperty(
                self.display,
                root,
                atom,
                xlib::XA_ATOM as u64,
                32,
                xlib::PropModeReplace,
                atoms.as_ptr() as *const u8,
                atoms.len() as i32,
            );
        }
    }

    fn append_client_list(&self, root: Window, window: Window) {
        let atom = self.intern_atom("_NET_CLIENT_LIST");
        unsafe {
            xlib::XChangeProperty(
                self.display,
                root,
                atom,
                xlib::XA_WINDOW as u64,
                32,
                xlib::PropModeAppend,
                &window as *const Window as *const u8,
                1,
            );
        }
    }

    fn delete_client_list(&self, root: Window) {
        let atom = self.intern_atom("_NET_CLIENT_LIST");
        unsafe {
            xlib::XDeleteProperty(self.display, root, atom);
        }
    }

    fn delete_property_active_window(&self, root: Window) {
        let atom = self.intern_atom("_NET_ACTIVE_WINDOW");
        unsafe {
            xlib::XDeleteProperty(self.display, root, atom);
        }
    }

    fn set_active_window(&self, root: Window, window: Window) {
        let atom = self.intern_atom("_NET_ACTIVE_WINDOW");
        unsafe {
            xlib::XChangeProperty(
                self.display,
                root,
                atom,
                xlib::XA_WINDOW as u64,
                32,
                xlib::PropModeReplace,
                &window as *const Window as *const u8,
                1,
            );
        }
    }

    fn alloc_color(&self, name: &str) -> u64 {
        let colormap = unsafe { xlib::XDefaultColormap(self.display, self.screen) };
        let c_name = CString::new(name).unwrap();
        let mut color: xlib::XColor = unsafe { std::mem::zeroed() };
        unsafe {
            xlib::XAllocNamedColor(self.display, colormap, c_name.as_ptr(), &mut color, &mut color);
        }
        color.pixel
    }

    fn create_cursor(&self, shape: CursorShape) -> Cursor {
        let glyph = match shape {
            CursorShape::Normal => x11::cursorfont::XC_left_ptr,
            CursorShape::Resize => x11::cursorfont::XC_sizing,
            CursorShape::Move => x11::cursorfont::XC_fleur,
        };
        unsafe { xlib::XCreateFontCursor(self.display, glyph) }
    }

    fn create_simple_window(&self, x: i32, y: i32, w: u32, h: u32, override_redirect: bool) -> Window {
        let mut attrs: xlib::XSetWindowAttributes = unsafe { std::mem::zeroed() };
        attrs.override_redirect = if override_redirect { 1 } else { 0 };
        attrs.background_pixel = unsafe { xlib::XBlackPixel(self.display, self.screen) };
        attrs.event_mask = xlib::ExposureMask;
        unsafe {
            xlib::XCreateWindow(
                self.display,
                self.root,
                x,
                y,
                w,
                h,
                0,
                xlib::CopyFromParent,
                xlib::CopyFromParent as u32,
                ptr::null_mut(),
                (xlib::CWOverrideRedirect | xlib::CWBackPixel | xlib::CWEventMask) as u64,
                &mut attrs,
            )
        }
    }

    fn create_gc(&self, window: Window) -> Gc {
        unsafe { xlib::XCreateGC(self.display, window, 0, ptr::null_mut()) }
    }

    fn set_foreground(&self, gc: Gc, pixel: u64) {
        unsafe {
            xlib::XSetForeground(self.display, gc, pixel);
        }
    }

    fn fill_rect(&self, window: Window, gc: Gc, x: i32, y: i32, w: u32, h: u32) {
        unsafe {
            xlib::XFillRectangle(self.display, window, gc, x, y, w, h);
        }
    }

    fn draw_text(&self, window: Window, gc: Gc, x: i32, y: i32, color: u64, text: &str) {
        self.set_foreground(gc, color);
        let c_text = CString::new(text).unwrap_or_default();
        unsafe {
            xlib::XDrawString(self.display, window, gc, x, y, c_text.as_ptr(), text.len() as i32);
        }
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * (self.gc_font_height / 2).max(1) + self.gc_font_height
    }

    fn font_height(&self) -> i32 {
        self.gc_font_height
    }

    fn grab_pointer_for_drag(&self, cursor: Cursor) -> bool {
        let mask = (xlib::ButtonPressMask | xlib::ButtonReleaseMask | xlib::PointerMotionMask) as u32;
        let res = unsafe {
            xlib::XGrabPointer(
                self.display,
                self.root,
                xlib::False,
                mask,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                0,
                cursor,
                xlib::CurrentTime,
            )
        };
        res == xlib::GrabSuccess
    }

    fn ungrab_pointer(&self) {
        unsafe {
            xlib::XUngrabPointer(self.display, xlib::CurrentTime);
        }
    }

    fn sync(&self) {
        unsafe {
            xlib::XSync(self.display, xlib::False);
        }
    }

    fn spawn(&self, argv: &[&str]) {
        if argv.is_empty() {
            return;
        }
        let mut cmd = std::process::Command::new(argv[0]);
        cmd.args(&argv[1..]);
        if let Err(e) = cmd.spawn() {
            log::warn!("failed to spawn {:?}: {}", argv, e);
        }
    }
}

impl XlibConn {
    fn get_text_property(&self, window: Window, atom: Atom) -> Option<String> {
        let mut text: xlib::XTextProperty = unsafe { std::mem::zeroed() };
        let ok = unsafe { xlib::XGetTextProperty(self.display, window, &mut text, atom) };
        if ok == 0 || text.nitems == 0 {
            return None;
        }
        let s = unsafe { CStr::from_ptr(text.value as *const i8) }.to_string_lossy().into_owned();
        unsafe {
            xlib::XFree(text.value as *mut _);
        }
        Some(s)
    }

    fn get_cardinal_property(&self, window: Window, atom: Atom) -> Option<i64> {
        let mut actual_type: xlib::Atom = 0;
        let mut actual_format: i32 = 0;
        let mut nitems: u64 = 0;
        let mut bytes_after: u64 = 0;
        let mut data: *mut u8 = ptr::null_mut();
        let status = unsafe {
            xlib::XGetWindowProperty(
                self.display,
                window,
                atom,
                0,
                2,
                xlib::False,
                xlib::AnyPropertyType as u64,
                &mut actual_type,
                &mut actual_format,
                &mut nitems,
                &mut bytes_after,
                &mut data,
            )
        };
        if status != 0 || data.is_null() || nitems == 0 {
            return None;
        }
        let value = unsafe { *(data as *const i64) };
        unsafe {
            xlib::XFree(data as *mut _);
        }
        Some(value)
    }

    fn get_atom_list_property(&self, window: Window, atom: Atom) -> Vec<Atom> {
        let mut actual_type: xlib::Atom = 0;
        let mut actual_format: i32 = 0;
        let mut nitems: u64 = 0;
        let mut bytes_after: u64 = 0;
        let mut data: *mut u8 = ptr::null_mut();
        let status = unsafe {
            xlib::XGetWindowProperty(
                self.display,
                window,
                atom,
                0,
                64,
                xlib::False,
                xlib::XA_ATOM as u64,
                &mut actual_type,
                &mut actual_format,
                &mut nitems,
                &mut bytes_after,
                &mut data,
            )
        };
        if status != 0 || data.is_null() {
            return Vec::new();
        }
        let slice = unsafe { std::slice::from_raw_parts(data as *const Atom, nitems as usize) };
        let out = slice.to_vec();
        unsafe {
            xlib::XFree(data as *mut _);
        }
        out
    }
}

fn translate_event(ev: &xlib::XEvent) -> XEvent {
    unsafe {
        match ev.get_type() {
            xlib::ButtonPress => {
                let e = ev.button;
                XEvent::ButtonPress { window: e.window, button: e.button, state: e.state, x: e.x, y: e.y, subwindow: e.subwindow }
            }
            xlib::ButtonRelease => XEvent::ButtonRelease,
            xlib::ClientMessage => {
                let e = ev.client_message;
                let data = e.data.as_longs();
                let mut arr = [0i64; 5];
                for i in 0..5.min(data.len()) {
                    arr[i] = data[i];
                }
                XEvent::ClientMessage { window: e.window, message_type: e.message_type, data: arr }
            }
            xlib::ConfigureRequest => {
                let e = ev.configure_request;
                XEvent::ConfigureRequest {
                    window: e.window,
                    value_mask: e.value_mask,
                    x: e.x,
                    y: e.y,
                    w: e.width,
                    h: e.height,
                    border_width: e.border_width,
                    above: e.above,
                    detail: e.detail,
                }
            }
            xlib::ConfigureNotify => XEvent::ConfigureNotify { window: ev.configure.window },
            xlib::DestroyNotify => XEvent::DestroyNotify { window: ev.destroy_window.window },
            xlib::EnterNotify => {
                let e = ev.crossing;
                XEvent::EnterNotify { window: e.window, mode: e.mode, detail: e.detail }
            }
            xlib::Expose => {
                let e = ev.expose;
                XEvent::Expose { window: e.window, count: e.count }
            }
            xlib::FocusIn => XEvent::FocusIn { window: ev.focus_change.window },
            xlib::KeyPress => {
                let e = ev.key;
                XEvent::KeyPress { keycode: e.keycode, state: e.state }
            }
            xlib::MappingNotify => {
                let mut mapping = ev.mapping;
                xlib::XRefreshKeyboardMapping(&mut mapping);
                XEvent::MappingNotify { request: mapping.request }
            }
            xlib::MapRequest => XEvent::MapRequest { window: ev.map_request.window },
            xlib::PropertyNotify => {
                let e = ev.property;
                XEvent::PropertyNotify { window: e.window, atom: e.atom, state: e.state }
            }
            xlib::UnmapNotify => {
                let e = ev.unmap;
                XEvent::UnmapNotify { window: e.window, send_event: e.send_event != 0 }
            }
            xlib::MotionNotify => {
                let e = ev.motion;
                XEvent::MotionNotify { x: e.x, y: e.y }
            }
            _ => XEvent::Unknown,
        }
    }
}
