//! Occupancy distribution for the supplier's per-room guest array.

use caravel_core::models::RoomOccupancy;

/// Splits a total adult count across rooms, front-loading the remainder so
/// earlier rooms are never smaller than later ones. Every room carries at
/// least one adult, so when `adults_total < rooms_count` the summed occupancy
/// exceeds the requested total rather than sending the supplier an empty room.
///
/// Child ages are not itemized by this flow; each room's `children` array goes
/// out empty.
pub fn distribute_occupancy(adults_total: u32, rooms_count: u32) -> Vec<RoomOccupancy> {
    let adults = adults_total.max(1);
    let rooms = rooms_count.max(1);

    let base = adults / rooms;
    let remainder = adults % rooms;

    (0..rooms)
        .map(|room| {
            let extra = if room < remainder { 1 } else { 0 };
            RoomOccupancy::adults_only((base + extra).max(1))
        })
        .collect()
}
