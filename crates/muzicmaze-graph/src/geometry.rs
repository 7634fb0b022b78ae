use muzicmaze_core::{AxialCoordinate, AXIAL_DIRECTIONS};

/// Track nodes placed around a new bridge must be this far from the first parent.
pub const BRIDGE_DISTANCE: u32 = 2;

/// Index into the origin's `accessed_tracks` for the ring cell in `direction`,
/// or `None` when that ring cell stays walkable.
pub fn seed_slot(direction: AxialCoordinate) -> Option<usize> {
    match (direction.q, direction.r) {
        (1, -1) => Some(0),
        (-1, 0) => Some(1),
        (0, 1) => Some(2),
        _ => None,
    }
}

/// Where a bridge between the track nodes at `first` and `second` goes,
/// given that both are neighbors of `center`.
///
/// Directions are scanned in canonical order. A candidate may not share an
/// axis with either parent and must sit [`BRIDGE_DISTANCE`] from `first`.
pub fn bridge_candidate(
    center: AxialCoordinate,
    first: AxialCoordinate,
    second: AxialCoordinate,
) -> Option<AxialCoordinate> {
    let to_first = first.offset_from(&center);
    let to_second = second.offset_from(&center);

    AXIAL_DIRECTIONS
        .iter()
        .filter(|direction| !direction.is_collinear(&to_first) && !direction.is_collinear(&to_second))
        .map(|direction| center.neighbor(*direction))
        .find(|candidate| candidate.distance(&first) == BRIDGE_DISTANCE)
}
