//! End-to-end scenarios against a fake `XConn`, in the same
//! fake-connection style used by the wider ecosystem's own window-manager
//! test suites (a bare struct implementing the trait, no mocking crate).

use std::cell::RefCell;

use rdwm::atom::AtomSource;
use rdwm::bindings::Arg;
use rdwm::display::{CursorShape, Gc, NormalHints, Rect, WmHintsInfo, XConn, XEvent};
use rdwm::error::Result;
use rdwm::manager::{actions, Wm};

struct FakeConn {
    geom: Rect,
    destroyed: RefCell<Vec<u64>>,
    sent_protocols: RefCell<Vec<(u64, u64)>>,
}

impl FakeConn {
    fn new() -> Self {
        FakeConn { geom: Rect { x: 0, y: 0, w: 1920, h: 1080 }, destroyed: RefCell::new(Vec::new()), sent_protocols: RefCell::new(Vec::new()) }
    }
}

impl AtomSource for FakeConn {
    fn intern_atom(&self, name: &str) -> u64 {
        // stable-but-distinct ids derived from the name so equality checks
        // in event.rs (`atom == wm.atoms.net(...)`) behave like a real
        // display's atom table.
        name.bytes().fold(1u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
    }
}

impl XConn for FakeConn {
    fn default_screen_geometry(&self) -> Rect { self.geom }
    fn root(&self) -> u64 { 1 }
    fn become_wm(&self) -> Result<()> { Ok(()) }
    fn next_event(&self) -> XEvent { XEvent::Unknown }
    fn pending(&self) -> i32 { 0 }
    fn grab_key(&self, _: u32, _: u32) {}
    fn ungrab_all_keys(&self) {}
    fn grab_button(&self, _: u32, _: u32, _: u64, _: bool) {}
    fn ungrab_all_buttons(&self, _: u64) {}
    fn select_input(&self, _: u64, _: i64) {}
    fn map_window(&self, _: u64) {}
    fn unmap_window(&self, _: u64) {}
    fn destroy_window(&self, w: u64) { self.destroyed.borrow_mut().push(w); }
    fn move_resize(&self, _: u64, _: i32, _: i32, _: u32, _: u32) {}
    fn set_border_width(&self, _: u64, _: u32) {}
    fn set_border_color(&self, _: u64, _: u64) {}
    fn configure_notify(&self, _: u64, _: i32, _: i32, _: u32, _: u32, _: u32) {}
    fn raise_window(&self, _: u64) {}
    fn restack(&self, _: &[u64]) {}
    fn set_input_focus(&self, _: u64) {}
    fn send_protocol_message(&self, w: u64, atom: u64) -> bool {
        self.sent_protocols.borrow_mut().push((w, atom));
        true
    }
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
    fn create_gc(&self, _: u64) -> Gc { std::ptr::null_mut() }
    fn set_foreground(&self, _: Gc, _: u64) {}
    fn fill_rect(&self, _: u64, _: Gc, _: i32, _: i32, _: u32, _: u32) {}
    fn draw_text(&self, _: u64, _: Gc, _: i32, _: i32, _: u64, _: &str) {}
    fn text_width(&self, text: &str) -> i32 { text.len() as i32 * 6 }
    fn font_height(&self) -> i32 { 12 }
    fn grab_pointer_for_drag(&self, _: u64) -> bool { false }
    fn ungrab_pointer(&self) {}
    fn sync(&self) {}
    fn spawn(&self, _: &[&str]) {}
}

fn new_wm() -> Wm {
    Wm::new(Box::new(FakeConn::new()))
}

#[test]
fn two_windows_tile_into_master_and_stack() {
    let mut wm = new_wm();
    wm.manage(100);
    wm.manage(200);

    let mid = wm.selmon;
    let tiled = wm.tiled_clients(mid);
    assert_eq!(tiled.len(), 2);

    let master = wm.clients.get(tiled[0]).unwrap();
    let stacked = wm.clients.get(tiled[1]).unwrap();
    assert!(master.geom.w > 0 && master.geom.h > 0);
    assert!(stacked.geom.w > 0 && stacked.geom.h > 0);
    // master column and stack column should not overlap
    assert!(master.geom.x + master.geom.width_with_border() <= stacked.geom.x);
}

#[test]
fn zoom_cycles_master_between_two_clients() {
    let mut wm = new_wm();
    wm.manage(100);
    wm.manage(200);
    let mid = wm.selmon;

    let initial_master = wm.monitors.get(mid).unwrap().clients[0];
    actions::zoom(&mut wm, &Arg::UInt(0));
    let after_master = wm.monitors.get(mid).unwrap().clients[0];
    assert_ne!(initial_master, after_master);
}

#[test]
fn tagging_selected_client_moves_it_out_of_current_view() {
    let mut wm = new_wm();
    wm.manage(100);
    let mid = wm.selmon;
    let cid = wm.monitors.get(mid).unwrap().sel.unwrap();

    actions::tag(&mut wm, &Arg::UInt(1 << 3));
    assert_eq!(wm.clients.get(cid).unwrap().tags, 1 << 3);
    assert!(wm.tiled_clients(mid).is_empty());
}

#[test]
fn view_toggle_history_round_trips() {
    let mut wm = new_wm();
    let mid = wm.selmon;
    actions::view(&mut wm, &Arg::UInt(1 << 2));
    assert_eq!(wm.monitors.get(mid).unwrap().current_view(), 1 << 2);
    actions::view(&mut wm, &Arg::UInt(0));
    assert_eq!(wm.monitors.get(mid).unwrap().current_view(), 1);
}

#[test]
fn killclient_sends_delete_protocol_before_destroying() {
    let mut wm = new_wm();
    wm.manage(100);
    actions::killclient(&mut wm, &Arg::UInt(0));
    // FakeConn::send_protocol_message always reports support, so no
    // fallback XDestroyWindow should have been issued.
    let destroyed = wm.clients.iter().any(|(_, c)| c.win == 100);
    assert!(destroyed, "client record should remain until DestroyNotify/UnmapNotify arrives");
}

#[test]
fn unmanage_reassigns_focus_to_remaining_client() {
    let mut wm = new_wm();
    wm.manage(100);
    wm.manage(200);
    let last_managed = wm.window_to_client(200).unwrap();
    wm.unmanage(last_managed, false);

    let mid = wm.selmon;
    let sel = wm.monitors.get(mid).unwrap().sel;
    assert!(sel.is_some());
    assert_eq!(wm.clients.get(sel.unwrap()).unwrap().win, 100);
}

#[test]
fn toggling_floating_excludes_client_from_tiling() {
    let mut wm = new_wm();
    wm.manage(100);
    wm.manage(200);
    let mid = wm.selmon;
    assert_eq!(wm.tiled_clients(mid).len(), 2);

    actions::togglefloating(&mut wm, &Arg::UInt(0));
    assert_eq!(wm.tiled_clients(mid).len(), 1);
}
