//! Station coordinate lookup.
//!
//! Stations without coordinates make segment distances unknown, which in
//! turn leaves timeline gaps unfilled. This module looks them up by name
//! against a Nominatim-style search API, one station at a time with a pause
//! between calls.

mod client;
mod error;
mod fill;

pub use client::{GeocoderConfig, NominatimClient, parse_search_response};
pub use error::GeocodeError;
pub use fill::{GeocodeReport, Geocoder, fill_missing_coordinates};
