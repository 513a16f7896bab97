use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rail_timeline::cache::{ArtifactCache, CacheMode, Fingerprint};
use rail_timeline::conflict::{ConflictConfig, generate_pairs, shuffle_pairs};
use rail_timeline::domain::TrainType;
use rail_timeline::formats::{
    load_schedule_input, load_stations, read_timeline, write_pairs_csv, write_stations,
    write_timeline,
};
use rail_timeline::geocode::{GeocoderConfig, NominatimClient, fill_missing_coordinates};
use rail_timeline::policy::{OperationalSnapshot, PolicyTable, SectionType, TrackAvailability};
use rail_timeline::timeline::{
    DEFAULT_LIMIT, ScheduleQuery, ScheduleRow, TimelineConfig, TimelineRecord, simulate_schedule,
    simulate_schedule_parallel,
};
use rail_timeline::web::{AppState, ServerConfig, serve};

#[derive(Parser, Debug)]
#[command(
    name = "rail-timeline",
    version,
    about = "Reconstruct train timelines and decide train movements",
    long_about = "Builds complete per-stop timelines from sparse schedules, generates \
                  labelled conflict pairs from them, and serves movement decisions \
                  backed by a precomputed policy table."
)]
struct Cli {
    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the timeline for every train in a schedule
    Simulate {
        /// Schedule JSON: train number to list of stops
        #[arg(long)]
        schedule: PathBuf,

        /// Train catalogue JSON: train number to type, speed and name
        #[arg(long)]
        trains: PathBuf,

        /// Station directory JSON: code to name and coordinates
        #[arg(long)]
        stations: PathBuf,

        /// Output table (.csv or .json)
        #[arg(short, long, default_value = "timeline.csv")]
        out: PathBuf,

        /// Calendar date of day 1 (YYYY-MM-DD)
        #[arg(long)]
        service_date: Option<NaiveDate>,

        /// Speed used when a train has no usable maximum speed
        #[arg(long, default_value_t = 60.0)]
        default_speed: f64,

        /// Build trains on this many threads
        #[arg(long)]
        workers: Option<usize>,

        /// Reuse timelines cached in this directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Ignore any cached timeline and rebuild it
        #[arg(long)]
        recompute: bool,
    },

    /// Generate labelled conflict pairs from a timeline
    Pairs {
        /// Timeline table written by `simulate`
        #[arg(long)]
        timeline: PathBuf,

        /// Output CSV
        #[arg(short, long, default_value = "pairs.csv")]
        out: PathBuf,

        /// Arrival window in minutes
        #[arg(long, default_value_t = 10)]
        window: u32,

        /// Seed for the output shuffle
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Keep pairs in generation order
        #[arg(long)]
        no_shuffle: bool,
    },

    /// Look up rows in a timeline
    Query {
        /// Timeline table written by `simulate`
        #[arg(long)]
        timeline: PathBuf,

        #[command(flatten)]
        target: QueryTarget,

        /// Maximum rows to print
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Decide a single movement from the policy table
    Decide {
        /// Policy table JSON
        #[arg(long)]
        policy: PathBuf,

        #[arg(long)]
        train_id: String,

        /// Express, Mail, Passenger, Freight or any other label
        #[arg(long)]
        train_type: String,

        /// Free or Occupied
        #[arg(long)]
        track: TrackAvailability,

        /// Double-line or Single-line
        #[arg(long)]
        section: SectionType,

        /// Current delay in minutes
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        delay: i64,

        /// Buffer to the next train in minutes
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        buffer: i64,

        /// Seed for fallback decisions
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Fill in missing station coordinates from a geocoding service
    Geocode {
        /// Station directory JSON
        #[arg(long)]
        stations: PathBuf,

        /// Where to write the updated directory (defaults to in place)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Search API base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Pause between lookups in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },

    /// Serve decisions and schedule lookups over HTTP
    Serve {
        /// Policy table JSON
        #[arg(long)]
        policy: PathBuf,

        /// Timeline table for the schedule endpoints
        #[arg(long)]
        timeline: Option<PathBuf>,

        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,

        /// Seed for fallback decisions
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct QueryTarget {
    /// Exact train number
    #[arg(long)]
    train: Option<String>,

    /// Station code (case-insensitive)
    #[arg(long)]
    station: Option<String>,

    /// Fragment of a station name (case-insensitive)
    #[arg(long)]
    junction: Option<String>,
}

impl QueryTarget {
    fn into_query(self) -> Option<ScheduleQuery> {
        self.train
            .map(ScheduleQuery::Train)
            .or(self.station.map(ScheduleQuery::Station))
            .or(self.junction.map(ScheduleQuery::Junction))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if cli.verbose { "debug" } else { "info" })
        }))
        .init();

    match cli.command {
        Command::Simulate {
            schedule,
            trains,
            stations,
            out,
            service_date,
            default_speed,
            workers,
            cache_dir,
            recompute,
        } => {
            let mut config = TimelineConfig::default().with_default_speed(default_speed);
            if let Some(date) = service_date {
                config = config.with_service_date(date);
            }

            let input = load_schedule_input(&schedule, &trains, &stations, config.service_date)
                .context("Failed to load schedule input")?;

            let build = || {
                let report = match workers {
                    Some(n) if n > 1 => simulate_schedule_parallel(&input, &config, n),
                    _ => simulate_schedule(&input, &config),
                };
                if !report.skipped.is_empty() {
                    warn!(skipped = report.skipped.len(), "some trains have no timeline");
                }
                report.records()
            };

            let records: Vec<TimelineRecord> = match cache_dir {
                Some(dir) => {
                    let cache = ArtifactCache::new(dir);
                    let fingerprint = Fingerprint::of(&(&input, &config))
                        .context("Failed to fingerprint schedule input")?;
                    let mode = if recompute {
                        CacheMode::Recompute
                    } else {
                        CacheMode::Reuse
                    };
                    cache
                        .get_or_compute("timeline", fingerprint, mode, build)
                        .context("Failed to cache timeline")?
                }
                None => build(),
            };

            write_timeline(&out, &records)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!(rows = records.len(), out = %out.display(), "timeline written");
        }

        Command::Pairs {
            timeline,
            out,
            window,
            seed,
            no_shuffle,
        } => {
            let records = read_timeline(&timeline)
                .with_context(|| format!("Failed to read {}", timeline.display()))?;
            let config = ConflictConfig::default()
                .with_window(window)
                .with_shuffle_seed(seed);

            let mut pairs = generate_pairs(&records, &config);
            if !no_shuffle {
                shuffle_pairs(&mut pairs, config.shuffle_seed);
            }

            write_pairs_csv(&out, &pairs)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!(pairs = pairs.len(), out = %out.display(), "conflict pairs written");
        }

        Command::Query {
            timeline,
            target,
            limit,
        } => {
            let Some(q) = target.into_query() else {
                bail!("one of --train, --station or --junction is required");
            };
            if q.is_blank() {
                bail!("query must not be empty");
            }

            let records = read_timeline(&timeline)
                .with_context(|| format!("Failed to read {}", timeline.display()))?;
            for record in rail_timeline::timeline::query::query(&records, &q, limit) {
                let row = ScheduleRow::from(record);
                println!(
                    "{:<6} {:<8} {:<24} {:>5} {:>5}  {}",
                    row.train_number,
                    row.station_code,
                    row.station_name.as_deref().unwrap_or("-"),
                    row.scheduled_arrival,
                    row.scheduled_departure,
                    row.train_name.as_deref().unwrap_or(""),
                );
            }
        }

        Command::Decide {
            policy,
            train_id,
            train_type,
            track,
            section,
            delay,
            buffer,
            seed,
        } => {
            let table = PolicyTable::load(&policy)
                .with_context(|| format!("Failed to load policy {}", policy.display()))?;
            let state = OperationalSnapshot {
                train_type: TrainType::parse(&train_type),
                track_availability: track,
                section_type: section,
                delay_mins: delay,
                buffer_mins: buffer,
            }
            .state();

            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let decision = table.decide(&state, &mut rng);
            info!(state = %state, source = ?decision.source, "decision");
            println!("{}", decision.action.message(&train_id));
        }

        Command::Geocode {
            stations,
            out,
            base_url,
            delay_ms,
        } => {
            let mut directory = load_stations(&stations)
                .with_context(|| format!("Failed to load {}", stations.display()))?;

            let mut config = GeocoderConfig::new().with_delay(Duration::from_millis(delay_ms));
            if let Some(url) = base_url {
                config = config.with_base_url(url);
            }
            let client = NominatimClient::new(&config).context("Failed to create geocoder")?;

            let report = fill_missing_coordinates(&client, &mut directory, config.delay).await;
            info!(
                updated = report.updated.len(),
                not_found = report.not_found.len(),
                failed = report.failed.len(),
                skipped = report.skipped_dummy.len(),
                "geocoding finished"
            );

            let out = out.unwrap_or(stations);
            write_stations(&out, &directory)
                .with_context(|| format!("Failed to write {}", out.display()))?;
        }

        Command::Serve {
            policy,
            timeline,
            addr,
            seed,
        } => {
            let table = PolicyTable::load(&policy)
                .with_context(|| format!("Failed to load policy {}", policy.display()))?;
            let records = match timeline {
                Some(path) => read_timeline(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => Vec::new(),
            };
            info!(states = table.len(), rows = records.len(), "loaded server data");

            let state = AppState::new(table, records, seed);
            serve(state, &ServerConfig { addr })
                .await
                .context("Server failed")?;
        }
    }

    Ok(())
}
