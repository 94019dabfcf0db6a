//! ICCCM/EWMH atom cache.
//!
//! dwm interns a fixed set of atoms once at startup into a `Atom[]` array
//! indexed by an enum (`WMAtom`, `NetAtom`). This is that same table,
//! fetched through the `XConn::intern_atom` seam so it stays testable
//! without a live display.

/// The one capability `Atoms::intern` needs from a display connection.
/// Kept separate from the full `XConn` trait (which embeds this as a
/// supertrait) so atom interning stays testable without faking every other
/// X request.
pub trait AtomSource {
    fn intern_atom(&self, name: &str) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WmAtom {
    Protocols,
    DeleteWindow,
    State,
    TakeFocus,
    Name,
    TransientFor,
    NormalHints,
    Hints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetAtom {
    ActiveWindow,
    Supported,
    WmName,
    WmState,
    WmStateFullscreen,
    WmWindowType,
    WmWindowTypeDialog,
    ClientList,
}

#[derive(Debug, Clone, Copy)]
pub struct Atoms {
    pub wm: [u64; 8],
    pub net: [u64; 8],
}

impl Atoms {
    pub fn intern(conn: &dyn AtomSource) -> Self {
        Atoms {
            wm: [
                conn.intern_atom("WM_PROTOCOLS"),
                conn.intern_atom("WM_DELETE_WINDOW"),
                conn.intern_atom("WM_STATE"),
                conn.intern_atom("WM_TAKE_FOCUS"),
                conn.intern_atom("WM_NAME"),
                conn.intern_atom("WM_TRANSIENT_FOR"),
                conn.intern_atom("WM_NORMAL_HINTS"),
                conn.intern_atom("WM_HINTS"),
            ],
            net: [
                conn.intern_atom("_NET_ACTIVE_WINDOW"),
                conn.intern_atom("_NET_SUPPORTED"),
                conn.intern_atom("_NET_WM_NAME"),
                conn.intern_atom("_NET_WM_STATE"),
                conn.intern_atom("_NET_WM_STATE_FULLSCREEN"),
                conn.intern_atom("_NET_WM_WINDOW_TYPE"),
                conn.intern_atom("_NET_WM_WINDOW_TYPE_DIALOG"),
                conn.intern_atom("_NET_CLIENT_LIST"),
            ],
        }
    }

    pub fn wm(&self, a: WmAtom) -> u64 {
        self.wm[a as usize]
    }

    pub fn net(&self, a: NetAtom) -> u64 {
        self.net[a as usize]
    }

    /// The list advertised via `_NET_SUPPORTED` on the root window
    /// (spec §7.3, EWMH supplement from dwm-xcb's `setup`).
    pub fn supported_list(&self) -> Vec<u64> {
        self.net.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeConn {
        next: RefCell<u64>,
        seen: RefCell<HashMap<String, u64>>,
    }

    impl FakeConn {
        fn new() -> Self {
            FakeConn { next: RefCell::new(100), seen: RefCell::new(HashMap::new()) }
        }
    }

    impl AtomSource for FakeConn {
        fn intern_atom(&self, name: &str) -> u64 {
            if let Some(&id) = self.seen.borrow().get(name) {
                return id;
            }
            let mut n = self.next.borrow_mut();
            let id = *n;
            *n += 1;
            self.seen.borrow_mut().insert(name.to_string(), id);
            id
        }
    }

    #[test]
    fn interns_distinct_atoms_for_each_name() {
        let conn = FakeConn::new();
        let atoms = Atoms::intern(&conn);
        let mut all: Vec<u64> = atoms.wm.to_vec();
        all.extend(atoms.net.iter());
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }
}
