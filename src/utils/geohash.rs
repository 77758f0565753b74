//! Geohash encoding of station locations.
//!
//! Bits alternate between longitude and latitude, starting with longitude,
//! and every five bits select one character of the geohash base32
//! alphabet. A coordinate sitting exactly on a bisection midpoint goes to
//! the lower half, so `(0.0, 0.0)` encodes as `7zzzzzzz`.

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Encode a location into a geohash of `precision` characters.
///
/// # Examples
/// ```
/// use netatmo_collector::utils::geohash::encode;
///
/// assert_eq!(encode(3.148423900000012, 50.7042756, 8), "u140rwkt");
/// ```
pub fn encode(longitude: f64, latitude: f64, precision: usize) -> String {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;
    let mut bit = 0;
    let mut index = 0usize;

    while hash.len() < precision {
        let (range, value) = if even_bit {
            (&mut lon_range, longitude)
        } else {
            (&mut lat_range, latitude)
        };

        let mid = (range.0 + range.1) / 2.0;
        if value > mid {
            index = index * 2 + 1;
            range.0 = mid;
        } else {
            index *= 2;
            range.1 = mid;
        }

        even_bit = !even_bit;
        bit += 1;
        if bit == 5 {
            hash.push(BASE32[index] as char);
            bit = 0;
            index = 0;
        }
    }

    hash
}
