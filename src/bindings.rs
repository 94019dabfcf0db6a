//! Key/button binding tables and the `Arg` union replacement.
//!
//! dwm dispatches through an array of `{ keysym, func, arg }` triples with
//! `Arg` a raw C union. Rust has no safe union-as-variant type, so `Arg`
//! becomes a tagged enum (spec REDESIGN FLAGS) and each binding carries a
//! plain function pointer to one of the `actions::*` handlers in
//! `manager.rs`.

use crate::config::Layout;
use crate::manager::Wm;

/// Which region of the bar a button click landed in (dwm.c `drawbar`
/// region bookkeeping, promoted to a real enum here instead of magic
/// x-coordinate comparisons re-derived at dispatch time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickArea {
    TagBar,
    LtSymbol,
    WinTitle,
    StatusText,
    ClientWin,
    RootWin,
}

#[derive(Debug, Clone, Copy)]
pub enum Arg {
    Int(i32),
    UInt(u32),
    Float(f64),
    Layout(&'static Layout),
    Strv(&'static [&'static str]),
}

pub type Action = fn(&mut Wm, &Arg);

/// A keyboard binding: `MODKEY` (+ extra modifiers) and an X keysym.
#[derive(Clone, Copy)]
pub struct Key {
    pub modifiers: u32,
    pub keysym: u32,
    pub func: Action,
    pub arg: Arg,
}

impl Key {
    pub fn new(modifiers: u32, keysym: u32, func: Action, arg: Arg) -> Binding<Key> {
        Binding { trigger: Key { modifiers, keysym, func, arg }, click: None }
    }
}

/// A button binding: restricted to one `ClickArea`, like dwm's per-region
/// `Button` table.
#[derive(Clone, Copy)]
pub struct Button {
    pub modifiers: u32,
    pub button: u32,
    pub func: Action,
    pub arg: Arg,
}

impl Button {
    pub fn new(area: ClickArea, modifiers: u32, button: u32, func: Action, arg: Arg) -> Binding<Button> {
        Binding { trigger: Button { modifiers, button, func, arg }, click: Some(area) }
    }
}

/// One row of a binding table. `click` is `None` for key bindings (which
/// fire regardless of bar region) and `Some(area)` for button bindings.
#[derive(Clone, Copy)]
pub struct Binding<T> {
    pub trigger: T,
    pub click: Option<ClickArea>,
}

impl Binding<Button> {
    pub fn button(area: ClickArea, modifiers: u32, button: u32, func: Action, arg: Arg) -> Self {
        Button::new(area, modifiers, button, func, arg)
    }
}

/// Re-exported so `config.rs` can build keysym constants without a second
/// `use x11::keysym` import at the call site.
pub mod keysym {
    pub use x11::keysym::*;
}
