/// Check that a station location is usable for geohashing.
///
/// Returns a description of the problem so callers can wrap it in the
/// error that fits their context.
pub fn validate_coordinates(longitude: f64, latitude: f64) -> Result<(), String> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(format!(
            "Coordinates must be finite numbers, got lon={} lat={}",
            longitude, latitude
        ));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("Latitude {} is outside [-90, 90]", latitude));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("Longitude {} is outside [-180, 180]", longitude));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        assert!(validate_coordinates(3.148423900000012, 50.7042756).is_ok());
        assert!(validate_coordinates(-180.0, -90.0).is_ok());
        assert!(validate_coordinates(180.0, 90.0).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(validate_coordinates(0.0, 91.0).is_err());
        assert!(validate_coordinates(-181.0, 0.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::INFINITY).is_err());
    }
}
