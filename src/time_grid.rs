//! The canonical half-hour grid every sales vector is aligned to.
//!
//! Slot `i` starts at `floor(i / 2) + 5` hours and `0` or `30` minutes, so the
//! grid runs from `05:00` (index 0) to `18:30` (index 27), covering the
//! trading day up to 19:00.

/// Number of half-hour slots in a trading day.
pub const SLOT_COUNT: usize = 28;

/// Hour of the first slot.
pub const FIRST_HOUR: usize = 5;

pub const TIME_SLOTS: [&str; SLOT_COUNT] = [
    "05:00", "05:30", "06:00", "06:30", "07:00", "07:30", "08:00", "08:30", "09:00", "09:30",
    "10:00", "10:30", "11:00", "11:30", "12:00", "12:30", "13:00", "13:30", "14:00", "14:30",
    "15:00", "15:30", "16:00", "16:30", "17:00", "17:30", "18:00", "18:30",
];

/// One value per slot, index-aligned to [`TIME_SLOTS`].
pub type SalesVector = [f64; SLOT_COUNT];

pub fn slot_label(index: usize) -> Option<&'static str> {
    TIME_SLOTS.get(index).copied()
}

/// Inverse of [`slot_label`]. Labels outside the grid are `None`, never index 0.
pub fn slot_index(label: &str) -> Option<usize> {
    TIME_SLOTS.iter().position(|slot| *slot == label)
}

/// The time at which the slot ends, e.g. `"19:00"` for the last slot.
pub fn slot_end_label(index: usize) -> Option<String> {
    if index >= SLOT_COUNT {
        return None;
    }
    let end_minutes = (FIRST_HOUR * 60) + (index + 1) * 30;
    Some(format!("{:02}:{:02}", end_minutes / 60, end_minutes % 60))
}

/// Pads `H:MM` to `HH:MM` and looks the result up on the grid.
pub fn slot_index_for_time(time: &str) -> Option<usize> {
    let (hour, minute) = time.trim().split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    slot_index(&format!("{:02}:{:02}", hour, minute))
}
