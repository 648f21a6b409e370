use domain_items::Direction;

/// Reference point: New York, NY 10001.
pub const NEW_YORK_LATITUDE: f64 = 40.7506;
pub const NEW_YORK_LONGITUDE: f64 = -73.9971;

/// Quadrant of `(latitude, longitude)` relative to New York. Points on the
/// reference latitude count as north, on the reference longitude as east.
pub fn direction_from_new_york(latitude: f64, longitude: f64) -> Direction {
    let north = latitude >= NEW_YORK_LATITUDE;
    let east = longitude >= NEW_YORK_LONGITUDE;

    match (north, east) {
        (true, true) => Direction::NE,
        (true, false) => Direction::NW,
        (false, true) => Direction::SE,
        (false, false) => Direction::SW,
    }
}
