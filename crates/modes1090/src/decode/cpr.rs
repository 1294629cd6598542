/*!
 * Compact Position Reporting (DO-260B 2.2.3.2.3 and 2.2.3.2.4).
 *
 * Positions are broadcast as 17-bit encoded latitudes and longitudes,
 * alternating between an even and an odd grid. Two decoding paths
 * exist:
 *
 * - globally unambiguous decoding, from a pair of frames of opposite
 *   formats received within a few seconds of each other;
 * - locally unambiguous decoding, from a single frame and a reference
 *   position known to be within one half grid cell (180 NM airborne,
 *   45 NM surface) of the aircraft.
 *
 * Surface frames use grid cells a quarter of the airborne size, which
 * drops the most significant bits of the position: the same encoded
 * pair matches four longitudes 90° apart (and both hemispheres), so
 * even the global decoding needs a rough reference there.
 *
 * [`decode_position`] arbitrates between the two paths for every new
 * frame, against the per-aircraft [`AircraftState`].
 */
use super::adsb::ME;
use super::bds::bds05::AirbornePosition;
use super::bds::bds06::SurfacePosition;
use super::{TimedMessage, DF, ICAO};
use deku::prelude::*;
use libm::{fabs, floor};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// NZ is the number of latitude zones between the equator and a pole.
/// In Mode S, is defined to be 15.
const NZ: f64 = 15.0;

/// CPR_MAX is 2^17 since CPR lat and lon values are encoded on 17 bits
const CPR_MAX: f64 = 131_072.0;

const D_LAT_EVEN: f64 = 360.0 / (4.0 * NZ);
const D_LAT_ODD: f64 = 360.0 / (4.0 * NZ - 1.0);

/// Two frames of opposite parities must be received within this window
/// for a global decoding (10 s airborne, 25 s surface, the surface
/// relaxation accounting for taxi speeds).
const AIRBORNE_PAIR_WINDOW: f64 = 10.0;
const SURFACE_PAIR_WINDOW: f64 = 25.0;

/// A reference position older than this is not used for local decoding.
const REFERENCE_MAX_AGE: f64 = 180.0;

/// A decoded position further than this (in km) from the previous one
/// of the same aircraft is discarded as implausible.
const AIRBORNE_MAX_JUMP_KM: f64 = 50.0;
const SURFACE_MAX_JUMP_KM: f64 = 5.0;

/// A flag to qualify a CPR frame as odd or even
#[derive(Debug, PartialEq, Eq, Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "1")]
#[serde(rename_all = "snake_case")]
pub enum CPRFormat {
    Even = 0,
    Odd = 1,
}

impl fmt::Display for CPRFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Even => "even",
                Self::Odd => "odd",
            }
        )
    }
}

/// A WGS-84 position, latitude in [-90, 90], longitude in (-180, 180]
#[derive(Debug, PartialEq, Serialize, Clone, Copy)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + lat1.to_radians().cos()
            * lat2.to_radians().cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    const R: f64 = 6371.0; // Earth radius in km
    R * c
}

fn dist_haversine(pos1: &Position, pos2: &Position) -> f64 {
    haversine(pos1.latitude, pos1.longitude, pos2.latitude, pos2.longitude)
}

/// The number of longitude zones, between 1 and 59, at a given
/// latitude (the NL function of DO-260B). The closed form below agrees
/// with the tabulated transition latitudes of 1090-WP-9-14.
fn nl(lat: f64) -> u64 {
    let lat = fabs(lat);
    if lat >= 87.0 {
        return 1;
    }
    if lat == 0.0 {
        return 59;
    }
    let a = 1.0 - libm::cos(std::f64::consts::PI / (2.0 * NZ));
    let b = libm::cos(lat.to_radians());
    let x = 1.0 - a / (b * b);
    if x < -1.0 {
        return 1;
    }
    floor(2.0 * std::f64::consts::PI / libm::acos(x)) as u64
}

// The sign of % in Rust follows the dividend; CPR needs the
// non-negative convention.
fn modulo(a: f64, b: f64) -> f64 {
    if a >= 0. {
        a % b
    } else {
        a % b + fabs(b)
    }
}

/**
 * Decode an airborne position from a pair of even and odd frames of
 * the same aircraft, in order of reception. The latitude zone of the
 * more recent frame drives the longitude computation; a pair
 * straddling a zone boundary is unresolvable and yields None until
 * the next frame.
 */
pub fn airborne_position(
    oldest: &AirbornePosition,
    latest: &AirbornePosition,
) -> Option<Position> {
    let (even_frame, odd_frame) = match (oldest.parity, latest.parity) {
        (CPRFormat::Even, CPRFormat::Odd) => (oldest, latest),
        (CPRFormat::Odd, CPRFormat::Even) => (latest, oldest),
        _ => return None,
    };

    let cpr_lat_even = f64::from(even_frame.lat_cpr) / CPR_MAX;
    let cpr_lon_even = f64::from(even_frame.lon_cpr) / CPR_MAX;
    let cpr_lat_odd = f64::from(odd_frame.lat_cpr) / CPR_MAX;
    let cpr_lon_odd = f64::from(odd_frame.lon_cpr) / CPR_MAX;

    // the latitude zone index
    let j = floor(59.0 * cpr_lat_even - 60.0 * cpr_lat_odd + 0.5);

    let mut lat_even = D_LAT_EVEN * (modulo(j, 60.) + cpr_lat_even);
    let mut lat_odd = D_LAT_ODD * (modulo(j, 59.) + cpr_lat_odd);

    // southern hemisphere values are in [270, 360)
    if lat_even >= 270.0 {
        lat_even -= 360.0;
    }
    if lat_odd >= 270.0 {
        lat_odd -= 360.0;
    }

    if !(-90. ..=90.).contains(&lat_even) || !(-90. ..=90.).contains(&lat_odd)
    {
        return None;
    }
    // both frames must land in the same longitude zone
    if nl(lat_even) != nl(lat_odd) {
        return None;
    }

    let latest_is_even = latest.parity == CPRFormat::Even;
    let lat = if latest_is_even { lat_even } else { lat_odd };

    let (p, c) = if latest_is_even {
        (0, cpr_lon_even)
    } else {
        (1, cpr_lon_odd)
    };
    let nl = nl(lat);
    let ni = std::cmp::max(nl - p, 1) as f64;
    let m =
        floor(cpr_lon_even * (nl - 1) as f64 - cpr_lon_odd * nl as f64 + 0.5);

    let mut lon = (360.0 / ni) * (modulo(m, ni) + c);
    if lon >= 180.0 {
        lon -= 360.0;
    }

    Some(Position {
        latitude: lat,
        longitude: lon,
    })
}

/**
 * Decode an airborne position from a single frame and a reference
 * position within 180 NM of the aircraft (a previously decoded
 * position, a ground station, an airport). Both half-cell checks must
 * pass, otherwise the frame stays undecoded.
 */
pub fn airborne_position_with_reference(
    msg: &AirbornePosition,
    latitude_ref: f64,
    longitude_ref: f64,
) -> Option<Position> {
    let cpr_lat = f64::from(msg.lat_cpr) / CPR_MAX;
    let cpr_lon = f64::from(msg.lon_cpr) / CPR_MAX;
    local_decode(
        cpr_lat,
        cpr_lon,
        msg.parity,
        latitude_ref,
        longitude_ref,
        false,
    )
}

/**
 * Decode a surface position from a single frame and a reference
 * position within 45 NM of the aircraft.
 */
pub fn surface_position_with_reference(
    msg: &SurfacePosition,
    latitude_ref: f64,
    longitude_ref: f64,
) -> Option<Position> {
    let cpr_lat = f64::from(msg.lat_cpr) / CPR_MAX;
    let cpr_lon = f64::from(msg.lon_cpr) / CPR_MAX;
    local_decode(
        cpr_lat,
        cpr_lon,
        msg.parity,
        latitude_ref,
        longitude_ref,
        true,
    )
}

/// The local decoding shared by the airborne and surface paths; only
/// the zone sizes differ (90° of latitude instead of 360°).
fn local_decode(
    cpr_lat: f64,
    cpr_lon: f64,
    parity: CPRFormat,
    latitude_ref: f64,
    longitude_ref: f64,
    surface: bool,
) -> Option<Position> {
    let base = if surface { 90.0 } else { 360.0 };
    let d_lat = if parity == CPRFormat::Even {
        base / 60.
    } else {
        base / 59.
    };

    let j = floor(latitude_ref / d_lat)
        + floor(0.5 + modulo(latitude_ref, d_lat) / d_lat - cpr_lat);
    let lat = d_lat * (j + cpr_lat);

    if !(-90. ..=90.).contains(&lat) {
        return None;
    }
    // the reference must sit within half a cell
    if fabs(lat - latitude_ref) > d_lat / 2. {
        return None;
    }

    let ni = match parity {
        CPRFormat::Even => nl(lat),
        CPRFormat::Odd => std::cmp::max(nl(lat), 1) - 1,
    };
    let d_lon = if ni > 0 { base / ni as f64 } else { base };
    let m = floor(longitude_ref / d_lon)
        + floor(0.5 + modulo(longitude_ref, d_lon) / d_lon - cpr_lon);
    let lon = d_lon * (m + cpr_lon);

    if fabs(lon - longitude_ref) > d_lon / 2. {
        return None;
    }

    Some(Position {
        latitude: lat,
        longitude: lon,
    })
}

/**
 * Decode a surface position from a pair of even and odd frames of the
 * same aircraft, in order of reception.
 *
 * The surface grid cells cover a quarter of the airborne ones, so the
 * pair pins the position modulo 90° of latitude and longitude only:
 * the reference position (receiver, airport, previous position; any
 * point in the right quadrant of the Earth does) selects among the
 * candidates. Without any reference, use
 * [`surface_position_candidates`].
 */
pub fn surface_position(
    oldest: &SurfacePosition,
    latest: &SurfacePosition,
    reference: &Position,
) -> Option<Position> {
    let candidates = surface_position_candidates(oldest, latest)?;
    candidates.into_iter().min_by(|a, b| {
        dist_haversine(a, reference).total_cmp(&dist_haversine(b, reference))
    })
}

/**
 * The candidate solutions of a global surface decoding: the four
 * longitudes 90° apart, in both hemispheres where the latitude stays
 * in range. None when the pair itself is unresolvable (same parity
 * twice, or a longitude zone boundary between the two frames).
 */
pub fn surface_position_candidates(
    oldest: &SurfacePosition,
    latest: &SurfacePosition,
) -> Option<Vec<Position>> {
    let (even_frame, odd_frame) = match (oldest.parity, latest.parity) {
        (CPRFormat::Even, CPRFormat::Odd) => (oldest, latest),
        (CPRFormat::Odd, CPRFormat::Even) => (latest, oldest),
        _ => return None,
    };

    let cpr_lat_even = f64::from(even_frame.lat_cpr) / CPR_MAX;
    let cpr_lon_even = f64::from(even_frame.lon_cpr) / CPR_MAX;
    let cpr_lat_odd = f64::from(odd_frame.lat_cpr) / CPR_MAX;
    let cpr_lon_odd = f64::from(odd_frame.lon_cpr) / CPR_MAX;

    let j = floor(59.0 * cpr_lat_even - 60.0 * cpr_lat_odd + 0.5);

    // both in [0, 90), the northern candidates
    let lat_even = (D_LAT_EVEN / 4.) * (modulo(j, 60.) + cpr_lat_even);
    let lat_odd = (D_LAT_ODD / 4.) * (modulo(j, 59.) + cpr_lat_odd);

    let latest_is_even = latest.parity == CPRFormat::Even;
    let lat = if latest_is_even { lat_even } else { lat_odd };

    let mut candidates = Vec::with_capacity(8);
    for lat in [lat, lat - 90.] {
        if !(-90. ..=90.).contains(&lat) {
            continue;
        }
        // the zone consistency check in the candidate hemisphere
        let shift = if lat < 0. { 90. } else { 0. };
        if nl(lat_even - shift) != nl(lat_odd - shift) {
            continue;
        }

        let (p, c) = if latest_is_even {
            (0, cpr_lon_even)
        } else {
            (1, cpr_lon_odd)
        };
        let nl = nl(lat);
        let ni = std::cmp::max(nl - p, 1) as f64;
        let m = floor(
            cpr_lon_even * (nl - 1) as f64 - cpr_lon_odd * nl as f64 + 0.5,
        );
        // in [0, 90), the first of four solutions
        let lon = (90.0 / ni) * (modulo(m, ni) + c);

        for quadrant in 0..4 {
            let mut lon = lon + 90.0 * f64::from(quadrant);
            if lon > 180.0 {
                lon -= 360.0;
            }
            candidates.push(Position {
                latitude: lat,
                longitude: lon,
            });
        }
    }
    if candidates.is_empty() {
        None
    } else {
        Some(candidates)
    }
}

/// One stored CPR frame; airborne and surface frames never pair up.
#[derive(Debug, PartialEq, Copy, Clone)]
enum CPRFrame {
    Airborne(AirbornePosition),
    Surface(SurfacePosition),
}

/// The per-aircraft decoding state, keyed by the ICAO address in a
/// caller-owned map. No internal synchronization: concurrent producers
/// must serialize access themselves, and should evict entries idle for
/// a few minutes.
#[derive(Debug, Default)]
pub struct AircraftState {
    /// Timestamp of the reference position
    timestamp: f64,
    /// The most recent decoded position, the local decoding reference
    pos: Option<Position>,
    even_ts: f64,
    even_frame: Option<CPRFrame>,
    odd_ts: f64,
    odd_frame: Option<CPRFrame>,
    /// NIC supplement A, from the latest operational status message
    nic_a: Option<u8>,
}

impl AircraftState {
    /// The most recent decoded position of this aircraft
    pub fn position(&self) -> Option<Position> {
        self.pos
    }

    /// NIC supplement A, from the latest operational status message,
    /// for the containment radius lookup
    pub fn nic_supplement_a(&self) -> Option<u8> {
        self.nic_a
    }
}

/**
 * Mutates the decoded message with the position recovered from the
 * per-aircraft state, if any, and updates the state with the new
 * frame.
 *
 * The arbitration order on a new frame follows the reliability of the
 * decodings: global against the freshest opposite-format frame inside
 * the pairing window, local against the most recent decoded position
 * otherwise, defer when neither applies. A position jumping too far
 * from the previous one is discarded. The caller-provided `reference`
 * (receiver or airport location) only seeds the surface decoding,
 * whose grid is too coarse to ever resolve on its own.
 *
 * Operational status messages do not carry positions but feed the NIC
 * supplement A bit of the state.
 */
pub fn decode_position(
    message: &mut ME,
    timestamp: f64,
    icao24: &ICAO,
    aircraft: &mut BTreeMap<ICAO, AircraftState>,
    reference: Option<&Position>,
) {
    let state = aircraft.entry(*icao24).or_default();
    match message {
        ME::BDS05(airborne) => {
            let (opposite_ts, opposite_frame) = match airborne.parity {
                CPRFormat::Even => (state.odd_ts, &state.odd_frame),
                CPRFormat::Odd => (state.even_ts, &state.even_frame),
            };

            // several sources may feed one tracker out of order
            if timestamp - opposite_ts < 0. {
                return;
            }

            let mut pos = None;
            if timestamp - opposite_ts < AIRBORNE_PAIR_WINDOW {
                if let Some(CPRFrame::Airborne(oldest)) = opposite_frame {
                    pos = airborne_position(oldest, airborne);
                }
            }

            // fall back on the local decoding, against a fresh reference
            if pos.is_none()
                && (timestamp - state.timestamp) < REFERENCE_MAX_AGE
            {
                if let Some(latest_pos) = state.pos {
                    pos = airborne_position_with_reference(
                        airborne,
                        latest_pos.latitude,
                        latest_pos.longitude,
                    )
                }
            }

            if let (Some(new_pos), Some(latest_pos)) = (&pos, &state.pos) {
                let jump = dist_haversine(new_pos, latest_pos);
                if jump > AIRBORNE_MAX_JUMP_KM {
                    debug!("implausible jump of {jump:.1} km for {icao24}");
                    pos = None
                }
            }

            if let Some(pos) = pos {
                airborne.latitude = Some(pos.latitude);
                airborne.longitude = Some(pos.longitude);
                state.pos = Some(pos);
                state.timestamp = timestamp;
            }

            match airborne.parity {
                CPRFormat::Even => {
                    state.even_frame = Some(CPRFrame::Airborne(*airborne));
                    state.even_ts = timestamp
                }
                CPRFormat::Odd => {
                    state.odd_frame = Some(CPRFrame::Airborne(*airborne));
                    state.odd_ts = timestamp
                }
            }
        }
        ME::BDS06(surface) => {
            let (opposite_ts, opposite_frame) = match surface.parity {
                CPRFormat::Even => (state.odd_ts, &state.odd_frame),
                CPRFormat::Odd => (state.even_ts, &state.even_frame),
            };

            if timestamp - opposite_ts < 0. {
                return;
            }

            // any anchor in the right quadrant of the Earth works
            let anchor = state.pos.or(reference.copied());

            let mut pos = None;
            if let Some(anchor) = anchor {
                if timestamp - opposite_ts < SURFACE_PAIR_WINDOW {
                    if let Some(CPRFrame::Surface(oldest)) = opposite_frame {
                        pos = surface_position(oldest, surface, &anchor);
                    }
                }
                if pos.is_none() {
                    pos = surface_position_with_reference(
                        surface,
                        anchor.latitude,
                        anchor.longitude,
                    )
                }
            }

            if let (Some(new_pos), Some(latest_pos)) = (&pos, &state.pos) {
                let jump = dist_haversine(new_pos, latest_pos);
                if jump > SURFACE_MAX_JUMP_KM {
                    debug!("implausible jump of {jump:.1} km for {icao24}");
                    pos = None
                }
            }

            if let Some(pos) = pos {
                surface.latitude = Some(pos.latitude);
                surface.longitude = Some(pos.longitude);
                state.pos = Some(pos);
                state.timestamp = timestamp;
            }

            match surface.parity {
                CPRFormat::Even => {
                    state.even_frame = Some(CPRFrame::Surface(*surface));
                    state.even_ts = timestamp
                }
                CPRFormat::Odd => {
                    state.odd_frame = Some(CPRFrame::Surface(*surface));
                    state.odd_ts = timestamp
                }
            }
        }
        ME::BDS65(status) => {
            if let Some(nic_a) = status.nic_supplement_a() {
                state.nic_a = Some(nic_a);
            }
        }
        _ => (),
    }
}

/**
 * Decode the positions of a batch of timestamped messages, e.g. replayed
 * from a recording, with a fresh tracker.
 */
pub fn decode_positions(
    res: &mut [TimedMessage],
    reference: Option<Position>,
) {
    let mut aircraft: BTreeMap<ICAO, AircraftState> = BTreeMap::new();

    for msg in res.iter_mut() {
        if let Some(message) = &mut msg.message {
            match &mut message.df {
                DF::ADSB(adsb) => decode_position(
                    &mut adsb.message,
                    msg.timestamp,
                    &adsb.icao24,
                    &mut aircraft,
                    reference.as_ref(),
                ),
                DF::TisB { cf, .. } => decode_position(
                    &mut cf.me,
                    msg.timestamp,
                    &cf.aa,
                    &mut aircraft,
                    reference.as_ref(),
                ),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use approx::assert_relative_eq;

    fn airborne_frame(hex: &str) -> AirbornePosition {
        let msg = Message::from_hex(hex).unwrap();
        match msg.df {
            ADSB(adsb) => match adsb.message {
                ME::BDS05(me) => me,
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }

    fn surface_frame(hex: &str) -> SurfacePosition {
        let msg = Message::from_hex(hex).unwrap();
        match msg.df {
            ADSB(adsb) => match adsb.message {
                ME::BDS06(me) => me,
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn decode_airborne_global() {
        let even = airborne_frame("8D40058B58C901375147EFD09357");
        let odd = airborne_frame("8D40058B58C904A87F402D3B8C59");

        let Position {
            latitude,
            longitude,
        } = airborne_position(&even, &odd).unwrap();

        assert_relative_eq!(latitude, 49.81755, max_relative = 1e-3);
        assert_relative_eq!(longitude, 6.08442, max_relative = 1e-3);

        let odd = airborne_frame("8d4d224f58bf07c2d41a9a353d70");
        let even = airborne_frame("8d4d224f58bf003b221b34aa5b8d");

        let Position {
            latitude,
            longitude,
        } = airborne_position(&odd, &even).unwrap();

        assert_relative_eq!(latitude, 42.346, max_relative = 1e-3);
        assert_relative_eq!(longitude, 0.4347, max_relative = 1e-3);
    }

    #[test]
    fn decode_airborne_global_needs_both_parities() {
        let even = airborne_frame("8D40058B58C901375147EFD09357");
        assert_eq!(airborne_position(&even, &even), None);
    }

    #[test]
    fn decode_airborne_local() {
        let msg = airborne_frame("8D40058B58C901375147EFD09357");
        let Position {
            latitude,
            longitude,
        } = airborne_position_with_reference(&msg, 49.0, 6.0).unwrap();

        assert_relative_eq!(latitude, 49.82410, max_relative = 1e-3);
        assert_relative_eq!(longitude, 6.06785, max_relative = 1e-3);

        let msg = airborne_frame("8D40058B58C904A87F402D3B8C59");
        let Position {
            latitude,
            longitude,
        } = airborne_position_with_reference(&msg, 49.0, 6.0).unwrap();

        assert_relative_eq!(latitude, 49.81755, max_relative = 1e-3);
        assert_relative_eq!(longitude, 6.08442, max_relative = 1e-3);

        // a reference further than half a cell defers the decoding
        assert_eq!(airborne_position_with_reference(&msg, 60.0, 6.0), None);
    }

    #[test]
    fn decode_surface_local() {
        let msg = surface_frame("8c4841753a9a153237aef0f275be");
        let Position {
            latitude,
            longitude,
        } = surface_position_with_reference(&msg, 51.99, 4.375).unwrap();

        assert_relative_eq!(latitude, 52.32061, max_relative = 1e-3);
        assert_relative_eq!(longitude, 4.73473, max_relative = 1e-3);
    }

    #[test]
    fn decode_surface_global() {
        let odd = surface_frame("8c4841753a9a153237aef0f275be");
        let even = surface_frame("8c4841753aab238733c8cd4020b1");

        // Schiphol as the reference: the right quadrant by a wide margin
        let reference = Position {
            latitude: 52.31,
            longitude: 4.76,
        };
        let Position {
            latitude,
            longitude,
        } = surface_position(&odd, &even, &reference).unwrap();

        assert_relative_eq!(latitude, 52.323, max_relative = 1e-3);
        assert_relative_eq!(longitude, 4.735, max_relative = 1e-3);

        // without a reference, all four longitude candidates come out
        let candidates = surface_position_candidates(&odd, &even).unwrap();
        assert_eq!(candidates.len(), 8);
        let mut longitudes: Vec<f64> = candidates
            .iter()
            .filter(|p| p.latitude > 0.)
            .map(|p| p.longitude)
            .collect();
        longitudes.sort_by(f64::total_cmp);
        assert_eq!(longitudes.len(), 4);
        for pair in longitudes.windows(2) {
            assert_relative_eq!(pair[1] - pair[0], 90., max_relative = 1e-9);
        }
    }

    #[test]
    fn nl_is_monotonic() {
        let mut previous = 59;
        let mut lat = 0.0;
        while lat < 87.0 {
            let current = nl(lat);
            assert!(current <= previous, "NL must not increase, at {lat}");
            assert!(current >= 1);
            previous = current;
            lat += 0.05;
        }
        assert_eq!(nl(87.0), 1);
        assert_eq!(nl(-87.0), 1);
        assert_eq!(nl(90.0), 1);
        assert_eq!(nl(0.0), 59);
        // a couple of tabulated boundaries
        assert_eq!(nl(10.4), 59);
        assert_eq!(nl(10.5), 58);
        assert_eq!(nl(86.9), 2);
    }

    /// Test-side CPR encoder, the inverse of the decoders above.
    fn cpr_encode(lat: f64, lon: f64, parity: CPRFormat, surface: bool) -> (u32, u32) {
        let base = if surface { 90.0 } else { 360.0 };
        let p = if parity == CPRFormat::Odd { 1.0 } else { 0.0 };
        let d_lat = base / (4.0 * NZ - p);
        let yz = floor(CPR_MAX * modulo(lat, d_lat) / d_lat + 0.5);
        let rlat = d_lat * (yz / CPR_MAX + floor(lat / d_lat));
        let d_lon = base / (std::cmp::max(nl(rlat) - p as u64, 1) as f64);
        let xz = floor(CPR_MAX * modulo(lon, d_lon) / d_lon + 0.5);
        (
            (yz as u32) % (CPR_MAX as u32),
            (xz as u32) % (CPR_MAX as u32),
        )
    }

    fn airborne_with_cpr(parity: CPRFormat, lat_cpr: u32, lon_cpr: u32) -> AirbornePosition {
        let mut frame = airborne_frame("8D40058B58C901375147EFD09357");
        frame.parity = parity;
        frame.lat_cpr = lat_cpr;
        frame.lon_cpr = lon_cpr;
        frame
    }

    #[test]
    fn airborne_global_roundtrip() {
        // encoding then global-decoding lands within 5.1 m
        let mut lat = -84.2;
        while lat < 85.0 {
            let mut lon = -179.4;
            while lon < 180.0 {
                let (lat_e, lon_e) = cpr_encode(lat, lon, CPRFormat::Even, false);
                let (lat_o, lon_o) = cpr_encode(lat, lon, CPRFormat::Odd, false);
                let even = airborne_with_cpr(CPRFormat::Even, lat_e, lon_e);
                let odd = airborne_with_cpr(CPRFormat::Odd, lat_o, lon_o);
                let pos = airborne_position(&even, &odd).unwrap();
                let error = haversine(lat, lon, pos.latitude, pos.longitude);
                assert!(
                    error < 0.0051,
                    "{:.1} m off at ({lat}, {lon})",
                    error * 1000.
                );

                // the local decoder agrees with the global one
                let local = airborne_position_with_reference(
                    &odd,
                    pos.latitude,
                    pos.longitude,
                )
                .unwrap();
                let disagreement = haversine(
                    pos.latitude,
                    pos.longitude,
                    local.latitude,
                    local.longitude,
                );
                assert!(disagreement < 0.001);

                lon += 23.7;
            }
            lat += 7.9;
        }
    }

    fn surface_with_cpr(parity: CPRFormat, lat_cpr: u32, lon_cpr: u32) -> SurfacePosition {
        let mut frame = surface_frame("8c4841753a9a153237aef0f275be");
        frame.parity = parity;
        frame.lat_cpr = lat_cpr;
        frame.lon_cpr = lon_cpr;
        frame
    }

    #[test]
    fn surface_global_roundtrip() {
        // the finer surface grid lands within 1.25 m
        let mut lat = -84.3;
        while lat < 85.0 {
            let mut lon = -179.2;
            while lon < 180.0 {
                let (lat_e, lon_e) = cpr_encode(lat, lon, CPRFormat::Even, true);
                let (lat_o, lon_o) = cpr_encode(lat, lon, CPRFormat::Odd, true);
                let even = surface_with_cpr(CPRFormat::Even, lat_e, lon_e);
                let odd = surface_with_cpr(CPRFormat::Odd, lat_o, lon_o);
                let reference = Position {
                    latitude: lat,
                    longitude: lon,
                };
                let pos = surface_position(&even, &odd, &reference).unwrap();
                let error = haversine(lat, lon, pos.latitude, pos.longitude);
                assert!(
                    error < 0.00125,
                    "{:.2} m off at ({lat}, {lon})",
                    error * 1000.
                );
                lon += 31.1;
            }
            lat += 11.3;
        }
    }

    #[test]
    fn tracker_global_then_local() {
        let mut aircraft = BTreeMap::new();
        let icao = ICAO(0x40058b);

        let mut even = ME::BDS05(airborne_frame("8D40058B58C901375147EFD09357"));
        let mut odd = ME::BDS05(airborne_frame("8D40058B58C904A87F402D3B8C59"));

        decode_position(&mut even, 100.0, &icao, &mut aircraft, None);
        if let ME::BDS05(me) = &even {
            // a single frame cannot resolve
            assert_eq!(me.latitude, None);
        }

        decode_position(&mut odd, 104.0, &icao, &mut aircraft, None);
        if let ME::BDS05(me) = &odd {
            assert_relative_eq!(
                me.latitude.unwrap(),
                49.81755,
                max_relative = 1e-3
            );
            assert_relative_eq!(
                me.longitude.unwrap(),
                6.08442,
                max_relative = 1e-3
            );
        }
        assert!(aircraft.get(&icao).unwrap().position().is_some());

        // the same even frame again, now resolvable locally
        let mut even = ME::BDS05(airborne_frame("8D40058B58C901375147EFD09357"));
        decode_position(&mut even, 130.0, &icao, &mut aircraft, None);
        if let ME::BDS05(me) = &even {
            assert_relative_eq!(
                me.latitude.unwrap(),
                49.82410,
                max_relative = 1e-3
            );
        }
    }

    #[test]
    fn tracker_window_expired() {
        let mut aircraft = BTreeMap::new();
        let icao = ICAO(0x40058b);

        let mut even = ME::BDS05(airborne_frame("8D40058B58C901375147EFD09357"));
        let mut odd = ME::BDS05(airborne_frame("8D40058B58C904A87F402D3B8C59"));

        decode_position(&mut even, 100.0, &icao, &mut aircraft, None);
        // 30 s later, outside the 10 s pairing window
        decode_position(&mut odd, 130.0, &icao, &mut aircraft, None);
        if let ME::BDS05(me) = &odd {
            assert_eq!(me.latitude, None);
        }
        assert!(aircraft.get(&icao).unwrap().position().is_none());
    }

    #[test]
    fn tracker_surface_needs_reference() {
        let mut aircraft = BTreeMap::new();
        let icao = ICAO(0x484175);
        let reference = Position {
            latitude: 51.99,
            longitude: 4.375,
        };

        let mut odd = ME::BDS06(surface_frame("8c4841753a9a153237aef0f275be"));
        decode_position(&mut odd, 100.0, &icao, &mut aircraft, None);
        if let ME::BDS06(me) = &odd {
            // no reference at all: defer
            assert_eq!(me.latitude, None);
        }

        let mut odd = ME::BDS06(surface_frame("8c4841753a9a153237aef0f275be"));
        decode_position(&mut odd, 101.0, &icao, &mut aircraft, Some(&reference));
        if let ME::BDS06(me) = &odd {
            assert_relative_eq!(
                me.latitude.unwrap(),
                52.32056,
                max_relative = 1e-4
            );
            assert_relative_eq!(
                me.longitude.unwrap(),
                4.735735,
                max_relative = 1e-4
            );
        }

        // the opposite parity now resolves globally off the stored state
        let mut even = ME::BDS06(surface_frame("8c4841753aab238733c8cd4020b1"));
        decode_position(&mut even, 103.0, &icao, &mut aircraft, None);
        if let ME::BDS06(me) = &even {
            assert_relative_eq!(
                me.latitude.unwrap(),
                52.32304,
                max_relative = 1e-4
            );
        }
    }

    #[test]
    fn tracker_nic_supplement() {
        let mut aircraft = BTreeMap::new();
        let icao = ICAO(0x4840d6);

        let msg = Message::from_hex("8d4840d6f8300000005ab8260f8d").unwrap();
        let mut me = match msg.df {
            ADSB(adsb) => adsb.message,
            _ => unreachable!(),
        };
        decode_position(&mut me, 100.0, &icao, &mut aircraft, None);
        assert_eq!(aircraft.get(&icao).unwrap().nic_supplement_a(), Some(1));
    }
}
