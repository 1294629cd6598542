#![doc = include_str!("../readme.md")]

pub mod decode;

pub mod prelude {
    /// This re-export is necessary to decode messages
    pub use deku::prelude::*;

    pub use crate::decode::adsb::{ExtendedSquitter, ME};
    pub use crate::decode::bds::bds05::AirbornePosition;
    pub use crate::decode::bds::bds06::SurfacePosition;
    pub use crate::decode::bds::bds08::AircraftIdentification;
    pub use crate::decode::bds::bds09::AirborneVelocity;
    pub use crate::decode::bds::bds61::AircraftStatus;
    pub use crate::decode::bds::bds65::OperationStatus;
    pub use crate::decode::cpr::{AircraftState, CPRFormat, Position};
    /// The root structure to decode messages
    pub use crate::decode::Message;
    pub use crate::decode::DF::*;
    pub use crate::decode::{TimedMessage, ICAO};
}
