//! Reading and writing data files.

mod error;
mod export;
mod input;

pub use error::FormatError;
pub use export::{TableFormat, read_timeline, write_pairs_csv, write_timeline};
pub use input::{
    load_schedule_input, load_stations, parse_schedule, parse_stations, parse_trains,
    write_stations,
};
