use skirmish_core::{tuning, TileCoord, UnitCategory, UnitId, UnitView};

/// Damage actually applied after flat mitigation; never less than one.
#[must_use]
pub fn mitigate(raw: u32, defense: u32) -> u32 {
    raw.saturating_sub(defense).max(1)
}

/// Per-recipient share of a death reward; the floor-division remainder is lost.
#[must_use]
pub fn experience_share(total: u32, recipients: usize) -> u32 {
    match u32::try_from(recipients) {
        Ok(0) => 0,
        Ok(count) => total / count,
        Err(_) => 0,
    }
}

/// Live heroes within the reward radius of `origin`, in identifier order.
#[must_use]
pub fn reward_recipients(origin: TileCoord, units: &UnitView) -> Vec<UnitId> {
    units
        .iter()
        .filter(|unit| unit.category == UnitCategory::Hero && unit.is_alive())
        .filter(|unit| unit.tile.manhattan_distance(origin) <= tuning::REWARD_RADIUS)
        .map(|unit| unit.id)
        .collect()
}
