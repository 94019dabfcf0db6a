//! Compiled-in configuration.
//!
//! dwm famously configures itself by editing `config.h` and recompiling; the
//! teacher crate instead loaded a `config.toml` at startup via `serde`. Spec
//! §1 explicitly rules out a configuration file format, so this module goes
//! back to the dwm way: every knob below is a `const`/`static` compiled into
//! the binary. The `serde`/`serde_test`/`toml` dependencies the teacher used
//! to load `config.toml` have no remaining caller and are dropped (see
//! DESIGN.md).

use crate::bindings::{Binding, Button, Key};

pub const BORDER_PX: u32 = 1;
pub const SNAP: i32 = 32;
pub const SHOW_BAR: bool = true;
pub const TOP_BAR: bool = true;
pub const MFACT: f64 = 0.55;
pub const RESIZE_HINTS: bool = true;
/// Lock the tiling layout so floating-window drags never nudge other
/// clients in the stack (dwm's `lockfullscreen`-adjacent `resizehints`
/// sibling knob is folded into the one flag above; this crate has no
/// separate `lockfullscreen` distinct behaviour to carry forward).
pub const FONT_NAME: &str = "monospace:size=10";

pub const TAGS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

pub const COL_GRAY1: &str = "#222222";
pub const COL_GRAY2: &str = "#444444";
pub const COL_GRAY3: &str = "#bbbbbb";
pub const COL_GRAY4: &str = "#eeeeee";
pub const COL_CYAN: &str = "#005577";

/// `[border, background, foreground]`, indexed by `Scheme`.
pub const COLORS: [[&str; 3]; 2] = [
    [COL_GRAY3, COL_GRAY1, COL_GRAY3], // Scheme::Norm
    [COL_CYAN, COL_CYAN, COL_GRAY4],   // Scheme::Sel
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Norm = 0,
    Sel = 1,
}

pub type Arrange = fn(&mut crate::manager::Wm, crate::monitor::MonitorId);

#[derive(Debug)]
pub struct Layout {
    pub symbol: &'static str,
    pub arrange: Option<Arrange>,
}

pub static LAYOUTS: [Layout; 3] = [
    Layout { symbol: "[]=", arrange: Some(crate::layout::tile) },
    Layout { symbol: "><>", arrange: None },
    Layout { symbol: "[M]", arrange: Some(crate::layout::monocle) },
];

/// Window-rule table (spec §5): substring match on class/instance/title to
/// a tag mask, floating default, and preferred monitor (`-1` = unchanged).
pub struct Rule {
    pub class: &'static str,
    pub instance: &'static str,
    pub title: &'static str,
    pub tags: u32,
    pub is_floating: bool,
    pub monitor: i32,
}

pub static RULES: [Rule; 2] = [
    Rule { class: "Gimp", instance: "", title: "", tags: 0, is_floating: true, monitor: -1 },
    Rule { class: "Firefox", instance: "", title: "", tags: 1 << 8, is_floating: false, monitor: -1 },
];

pub const MODKEY: u32 = x11::xlib::Mod1Mask;

pub const TERMINAL_CMD: &[&str] = &["st"];
pub const DMENU_CMD: &[&str] = &["dmenu_run"];

pub fn keys() -> Vec<Binding<Key>> {
    use crate::bindings::Arg;
    use crate::manager::actions;
    use x11::keysym::*;

    let mut v = vec![
        Key::new(MODKEY, XK_p, actions::spawn, Arg::Strv(DMENU_CMD)),
        Key::new(MODKEY | x11::xlib::ShiftMask, XK_Return, actions::spawn, Arg::Strv(TERMINAL_CMD)),
        Key::new(MODKEY, XK_b, actions::togglebar, Arg::UInt(0)),
        Key::new(MODKEY, XK_j, actions::focusstack, Arg::Int(1)),
        Key::new(MODKEY, XK_k, actions::focusstack, Arg::Int(-1)),
        Key::new(MODKEY, XK_h, actions::setmfact, Arg::Float(-0.05)),
        Key::new(MODKEY, XK_l, actions::setmfact, Arg::Float(0.05)),
        Key::new(MODKEY, XK_Return, actions::zoom, Arg::UInt(0)),
        Key::new(MODKEY, XK_Tab, actions::view, Arg::UInt(0)),
        Key::new(MODKEY | x11::xlib::ShiftMask, XK_c, actions::killclient, Arg::UInt(0)),
        Key::new(MODKEY, XK_t, actions::setlayout, Arg::Layout(&LAYOUTS[0])),
        Key::new(MODKEY, XK_f, actions::setlayout, Arg::Layout(&LAYOUTS[1])),
        Key::new(MODKEY, XK_m, actions::setlayout, Arg::Layout(&LAYOUTS[2])),
        Key::new(MODKEY, XK_space, actions::setlayout, Arg::UInt(0)),
        Key::new(MODKEY | x11::xlib::ShiftMask, XK_space, actions::togglefloating, Arg::UInt(0)),
        Key::new(MODKEY, XK_0, actions::view, Arg::UInt(!0)),
        Key::new(MODKEY | x11::xlib::ShiftMask, XK_0, actions::tag, Arg::UInt(!0)),
        Key::new(MODKEY, XK_comma, actions::focusmon, Arg::Int(-1)),
        Key::new(MODKEY, XK_period, actions::focusmon, Arg::Int(1)),
        Key::new(MODKEY | x11::xlib::ShiftMask, XK_comma, actions::tagmon, Arg::Int(-1)),
        Key::new(MODKEY | x11::xlib::ShiftMask, XK_period, actions::tagmon, Arg::Int(1)),
        Key::new(MODKEY | x11::xlib::ShiftMask, XK_q, actions::quit, Arg::UInt(0)),
    ];
    const TAG_KEYSYMS: [u32; 9] =
        [XK_1, XK_2, XK_3, XK_4, XK_5, XK_6, XK_7, XK_8, XK_9];
    for i in 0..TAGS.len() {
        let tagmask = 1u32 << i;
        let key = TAG_KEYSYMS[i];
        v.push(Key::new(MODKEY, key, actions::view, Arg::UInt(tagmask)));
        v.push(Key::new(MODKEY | x11::xlib::ControlMask, key, actions::toggleview, Arg::UInt(tagmask)));
        v.push(Key::new(MODKEY | x11::xlib::ShiftMask, key, actions::tag, Arg::UInt(tagmask)));
        v.push(Key::new(
            MODKEY | x11::xlib::ControlMask | x11::xlib::ShiftMask,
            key,
            actions::toggletag,
            Arg::UInt(tagmask),
        ));
    }
    v
}

pub fn buttons() -> Vec<Binding<Button>> {
    use crate::bindings::{Arg, ClickArea::*};
    use crate::manager::actions;
    use x11::xlib::{Button1, Button2, Button3};

    vec![
        Binding::button(LtSymbol, 0, Button1, actions::setlayout, Arg::UInt(0)),
        Binding::button(WinTitle, 0, Button2, actions::zoom, Arg::UInt(0)),
        Binding::button(StatusText, 0, Button2, actions::spawn, Arg::Strv(TERMINAL_CMD)),
        Binding::button(ClientWin, MODKEY, Button1, actions::movemouse, Arg::UInt(0)),
        Binding::button(ClientWin, MODKEY, Button2, actions::togglefloating, Arg::UInt(0)),
        Binding::button(ClientWin, MODKEY, Button3, actions::resizemouse, Arg::UInt(0)),
        Binding::button(TagBar, 0, Button1, actions::view, Arg::UInt(0)),
        Binding::button(TagBar, 0, Button3, actions::toggleview, Arg::UInt(0)),
        Binding::button(TagBar, MODKEY, Button1, actions::tag, Arg::UInt(0)),
        Binding::button(TagBar, MODKEY, Button3, actions::toggletag, Arg::UInt(0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_table_stays_in_sync_with_tag_count() {
        for rule in RULES.iter() {
            assert!(rule.tags == 0 || rule.tags <= (1 << TAGS.len()) - 1);
        }
    }

    #[test]
    fn key_table_is_nonempty_and_covers_all_tags() {
        let ks = keys();
        assert!(ks.len() > TAGS.len() * 4);
    }
}
