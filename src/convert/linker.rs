//! Auto-event linking: attach child events to their named parent devices.
//!
//! An auto-event row carries candidate parent names alongside the event
//! (the pass-through values from binding). Each name is matched exactly
//! against the produced devices and the event is cloned into every match,
//! so a device owns its `autoEvents` outright and no event is shared.

use crate::models::{AutoEvent, Device};

/// Append a clone of `event` to every device whose name equals one of
/// `parent_names`. A name matching several devices fans out to all of them;
/// a name listed twice attaches the event twice. Returns the names that
/// matched no device, in input order.
pub fn attach_auto_events(
    devices: &mut [Device],
    event: &AutoEvent,
    parent_names: &[String],
) -> Vec<String> {
    let mut unmatched = Vec::new();
    for name in parent_names {
        let mut matched = false;
        for device in devices.iter_mut() {
            if &device.name == name {
                device.add_auto_event(event.clone());
                matched = true;
            }
        }
        if !matched {
            unmatched.push(name.clone());
        }
    }
    unmatched
}

// =============================================================================
// Tests
// =============================================================================
