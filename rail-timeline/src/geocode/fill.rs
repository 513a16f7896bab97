//! Filling in missing station coordinates.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use super::error::GeocodeError;
use crate::domain::{StationCode, StationDirectory};
use crate::geo::Coordinates;

/// Something that can turn a station name into coordinates.
pub trait Geocoder {
    /// `Ok(None)` when the name is not found.
    fn locate(
        &self,
        station_name: &str,
    ) -> impl Future<Output = Result<Option<Coordinates>, GeocodeError>> + Send;
}

/// What happened to each station that lacked coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodeReport {
    pub updated: Vec<StationCode>,
    pub not_found: Vec<StationCode>,
    /// Lookups that errored; these stations are left untouched
    pub failed: Vec<StationCode>,
    /// Placeholder codes (`XX-`, `YY-`) that are never looked up
    pub skipped_dummy: Vec<StationCode>,
}

/// Look up every station missing a coordinate, in code order.
///
/// Waits `delay` between consecutive remote calls. A failed lookup is
/// recorded and the pass moves on.
pub async fn fill_missing_coordinates<G: Geocoder>(
    geocoder: &G,
    stations: &mut StationDirectory,
    delay: Duration,
) -> GeocodeReport {
    let mut report = GeocodeReport::default();
    let mut first_call = true;

    for code in stations.missing_coordinates() {
        if code.is_dummy() {
            report.skipped_dummy.push(code);
            continue;
        }

        let name = stations
            .get(&code)
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| code.to_string());

        if !first_call && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        first_call = false;

        match geocoder.locate(&name).await {
            Ok(Some(coords)) => {
                if let Some(station) = stations.get_mut(&code) {
                    station.lat = Some(coords.lat);
                    station.lon = Some(coords.lon);
                }
                info!(station = %code, lat = coords.lat, lon = coords.lon, "updated coordinates");
                report.updated.push(code);
            }
            Ok(None) => {
                warn!(station = %code, %name, "no coordinates found");
                report.not_found.push(code);
            }
            Err(e) => {
                warn!(station = %code, %name, error = %e, "geocoding failed");
                report.failed.push(code);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Station;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves fixed answers and records the names it was asked for.
    struct MockGeocoder {
        known: HashMap<&'static str, Coordinates>,
        asked: Mutex<Vec<String>>,
    }

    impl MockGeocoder {
        fn new() -> Self {
            let mut known = HashMap::new();
            known.insert("Kazipet Jn", Coordinates::new(17.9689, 79.5941));
            known.insert("BPQ", Coordinates::new(19.8497, 79.3481));
            Self {
                known,
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    impl Geocoder for MockGeocoder {
        fn locate(
            &self,
            station_name: &str,
        ) -> impl Future<Output = Result<Option<Coordinates>, GeocodeError>> + Send {
            self.asked.lock().unwrap().push(station_name.to_string());
            let result = if station_name == "Broken" {
                Err(GeocodeError::Api {
                    status: 503,
                    message: "unavailable".into(),
                })
            } else {
                Ok(self.known.get(station_name).copied())
            };
            async move { result }
        }
    }

    fn code(s: &str) -> StationCode {
        StationCode::parse(s).unwrap()
    }

    fn directory() -> StationDirectory {
        [
            Station::new(code("SC")).with_name("Secunderabad Jn").with_coordinates(17.4337, 78.5016),
            Station::new(code("KZJ")).with_name("Kazipet Jn"),
            Station::new(code("BPQ")),
            Station::new(code("XX-BECE")).with_name("Dummy"),
            Station::new(code("YY-BPLC")),
            Station::new(code("NOWHERE")).with_name("Nowhere"),
            Station::new(code("BRK")).with_name("Broken"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn fills_known_and_reports_the_rest() {
        let geocoder = MockGeocoder::new();
        let mut stations = directory();

        let report = fill_missing_coordinates(&geocoder, &mut stations, Duration::ZERO).await;

        assert_eq!(report.updated, vec![code("BPQ"), code("KZJ")]);
        assert_eq!(report.not_found, vec![code("NOWHERE")]);
        assert_eq!(report.failed, vec![code("BRK")]);
        assert_eq!(report.skipped_dummy, vec![code("XX-BECE"), code("YY-BPLC")]);

        let kzj = stations.get(&code("KZJ")).unwrap();
        assert_eq!(kzj.coordinates(), Some(Coordinates::new(17.9689, 79.5941)));
        assert!(stations.get(&code("BRK")).unwrap().coordinates().is_none());
    }

    #[tokio::test]
    async fn never_asks_for_dummies_or_located_stations() {
        let geocoder = MockGeocoder::new();
        let mut stations = directory();

        fill_missing_coordinates(&geocoder, &mut stations, Duration::ZERO).await;

        let asked = geocoder.asked.lock().unwrap().clone();
        // Nameless stations are looked up by code
        assert_eq!(asked, vec!["BPQ", "Broken", "Kazipet Jn", "Nowhere"]);
    }

    #[tokio::test]
    async fn nothing_missing_is_a_no_op() {
        let geocoder = MockGeocoder::new();
        let mut stations: StationDirectory =
            [Station::new(code("SC")).with_coordinates(17.4, 78.5)].into_iter().collect();

        let report = fill_missing_coordinates(&geocoder, &mut stations, Duration::from_secs(5)).await;

        assert_eq!(report, GeocodeReport::default());
        assert!(geocoder.asked.lock().unwrap().is_empty());
    }
}
