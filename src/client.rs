//! The per-window client record (spec.md §3, "Client").

use bitflags::bitflags;

use crate::config::{BORDER_PX, RESIZE_HINTS};
use crate::monitor::MonitorId;

pub type Window = x11::xlib::Window;

bitflags! {
    /// Internal-only flags, never visible to X clients. Mirrors the
    /// `isfixed`/`isfloating`/`isurgent`/`oldstate` bools of dwm's `Client`
    /// struct, collapsed into one bitset in the teacher's `WindowFlags`
    /// idiom (`examples/blinklad-rdwm/src/rdwm.rs`).
    pub struct WindowFlags: u32 {
        const NONE       = 0;
        const FLOATING   = 1 << 0;
        const URGENT     = 1 << 1;
        const FIXED      = 1 << 2;
        /// Snapshot of `FLOATING` taken before entering fullscreen, restored
        /// when fullscreen is cleared (dwm's `oldstate`).
        const OLDSTATE   = 1 << 3;
    }
}

/// Current or previous `(x, y, w, h, bw)` geometry of a client window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub bw: i32,
}

impl Geometry {
    pub fn width_with_border(&self) -> i32 {
        self.w + 2 * self.bw
    }

    pub fn height_with_border(&self) -> i32 {
        self.h + 2 * self.bw
    }
}

/// Cached ICCCM `WM_NORMAL_HINTS`. All fields default to "unconstrained"
/// (spec §7.4) when the property is absent or malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeHints {
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

impl SizeHints {
    /// A client is `fixed` when min == max on both axes (spec §3).
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0
            && self.min_w > 0
            && self.max_h > 0
            && self.min_h > 0
            && self.max_w == self.min_w
            && self.max_h == self.min_h
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub win: Window,
    /// Bounded to 255 bytes (spec §3); defaults to "broken" on decode
    /// failure.
    pub name: String,
    pub geom: Geometry,
    pub old_geom: Geometry,
    pub hints: SizeHints,
    pub flags: WindowFlags,
    /// Bitmask over the nine tags (bits 0..8).
    pub tags: u32,
    pub mon: MonitorId,
}

impl Client {
    pub fn new(win: Window, mon: MonitorId, tags: u32) -> Self {
        Client {
            win,
            name: String::from("broken"),
            geom: Geometry { x: 0, y: 0, w: 1, h: 1, bw: BORDER_PX as i32 },
            old_geom: Geometry { x: 0, y: 0, w: 1, h: 1, bw: BORDER_PX as i32 },
            hints: SizeHints::default(),
            flags: WindowFlags::NONE,
            tags,
            mon,
        }
    }

    pub fn is_floating(&self) -> bool {
        self.flags.contains(WindowFlags::FLOATING)
    }

    pub fn set_floating(&mut self, floating: bool) {
        self.flags.set(WindowFlags::FLOATING, floating);
    }

    pub fn is_urgent(&self) -> bool {
        self.flags.contains(WindowFlags::URGENT)
    }

    pub fn set_urgent(&mut self, urgent: bool) {
        self.flags.set(WindowFlags::URGENT, urgent);
    }

    pub fn is_fixed(&self) -> bool {
        self.flags.contains(WindowFlags::FIXED)
    }

    pub fn visible_on(&self, viewed_tags: u32) -> bool {
        self.tags & viewed_tags != 0
    }

    /// Remember current geometry/floating state before a fullscreen
    /// transition so it can be restored exactly (spec §4.1 ClientMessage
    /// handler, dwm.c `clientmessage`).
    pub fn snapshot_for_fullscreen(&mut self) {
        self.flags.set(WindowFlags::OLDSTATE, self.is_floating());
        self.old_geom = self.geom;
    }

    pub fn had_floating_before_fullscreen(&self) -> bool {
        self.flags.contains(WindowFlags::OLDSTATE)
    }

    /// Apply ICCCM size hints to a proposed geometry, returning `true` iff
    /// the result differs from the client's *current* geometry (so the
    /// caller only issues an X request on change — spec §4.4).
    ///
    /// `interact` selects the clamp rectangle: the full screen for
    /// pointer-driven interactive resizes, the owning monitor otherwise.
    /// Hint enforcement (steps 4a-4f) only runs when `resizehints` is
    /// globally enabled or the client floats — this is the variant named
    /// in spec.md's Open Questions as the one to implement.
    pub fn apply_size_hints(
        &self,
        mut x: i32,
        mut y: i32,
        mut w: i32,
        mut h: i32,
        interact: bool,
        screen_w: i32,
        screen_h: i32,
        mon_x: i32,
        mon_y: i32,
        mon_w: i32,
        mon_h: i32,
        bar_h: i32,
    ) -> (i32, i32, i32, i32, bool) {
        w = w.max(1);
        h = h.max(1);

        if interact {
            if x > screen_w {
                x = screen_w - (w + 2 * self.geom.bw);
            }
            if y > screen_h {
                y = screen_h - (h + 2 * self.geom.bw);
            }
            if x + w + 2 * self.geom.bw < 0 {
                x = 0;
            }
            if y + h + 2 * self.geom.bw < 0 {
                y = 0;
            }
        } else {
            if x > mon_x + mon_w {
                x = mon_x + mon_w - (w + 2 * self.geom.bw);
            }
            if y > mon_y + mon_h {
                y = mon_y + mon_h - (h + 2 * self.geom.bw);
            }
            if x + w + 2 * self.geom.bw < mon_x {
                x = mon_x;
            }
            if y + h + 2 * self.geom.bw < mon_y {
                y = mon_y;
            }
        }

        if h < bar_h {
            h = bar_h;
        }
        if w < bar_h {
            w = bar_h;
        }

        if RESIZE_HINTS || self.is_floating() {
            let base_is_min = self.hints.base_w == self.hints.min_w && self.hints.base_h == self.hints.min_h;
            if !base_is_min {
                w -= self.hints.base_w;
                h -= self.hints.base_h;
            }
            if self.hints.min_aspect > 0.0 && self.hints.max_aspect > 0.0 {
                if self.hints.max_aspect < w as f64 / h as f64 {
                    w = (h as f64 * self.hints.max_aspect + 0.5) as i32;
                } else if self.hints.min_aspect < h as f64 / w as f64 {
                    h = (w as f64 * self.hints.min_aspect + 0.5) as i32;
                }
            }
            if base_is_min {
                w -= self.hints.base_w;
                h -= self.hints.base_h;
            }
            if self.hints.inc_w != 0 {
                w -= w % self.hints.inc_w;
            }
            if self.hints.inc_h != 0 {
                h -= h % self.hints.inc_h;
            }
            w += self.hints.base_w;
            h += self.hints.base_h;
            w = w.max(self.hints.min_w.max(1));
            h = h.max(self.hints.min_h.max(1));
            if self.hints.max_w > 0 {
                w = w.min(self.hints.max_w);
            }
            if self.hints.max_h > 0 {
                h = h.min(self.hints.max_h);
            }
        }

        let changed = x != self.geom.x || y != self.geom.y || w != self.geom.w || h != self.geom.h;
        (x, y, w, h, changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_client() -> Client {
        let mut c = Client::new(1, 0, 1);
        c.geom = Geometry { x: 10, y: 10, w: 100, h: 100, bw: 1 };
        c
    }

    #[test]
    fn hints_floor_width_and_height_to_one() {
        let c = fixed_client();
        let (_, _, w, h, _) = c.apply_size_hints(0, 0, 0, 0, false, 1920, 1080, 0, 0, 1920, 1080, 14);
        assert_eq!(w, 14); // floored to bar height after the >=1 floor
        assert_eq!(h, 14);
    }

    #[test]
    fn idempotent_on_repeated_application() {
        let c = fixed_client();
        let (x, y, w, h, changed) =
            c.apply_size_hints(50, 60, 200, 150, false, 1920, 1080, 0, 0, 1920, 1080, 14);
        assert!(changed);
        let mut c2 = c.clone();
        c2.geom = Geometry { x, y, w, h, bw: 1 };
        let (_, _, _, _, changed_again) =
            c2.apply_size_hints(x, y, w, h, false, 1920, 1080, 0, 0, 1920, 1080, 14);
        assert!(!changed_again);
    }

    #[test]
    fn non_interactive_clamp_pulls_back_from_far_edge() {
        let c = fixed_client();
        let (x, _, _, _, _) = c.apply_size_hints(5000, 0, 100, 100, false, 1920, 1080, 0, 0, 1920, 1080, 14);
        assert_eq!(x, 1920 - (100 + 2));
    }
}
