use airshed_core::attribution::parse_timestamp;
use airshed_core::core_types::{Degrees, Meters, MetersPerSecond};
use airshed_core::{
    AirshedConfig, AttributionEngine, AttributionRequest, AttributionResult, BoundaryLayerClass, Confidence,
    DispersionForecaster, FireActivity, GeoPoint, Meteorology, OutfallForecast, OutfallRequest, Pollutant, Reading,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Anand Vihar monitoring station (DPCC)
const ANAND_VIHAR: GeoPoint = GeoPoint::new(28.6469, 77.3164);

/// Source attribution and outfall forecast demo
#[derive(Parser, Debug)]
#[command(name = "airshed-demo")]
#[command(about = "Delhi NCR source attribution and outfall forecast demo", long_about = None)]
struct Args {
    /// JSON file overriding baselines, priors or dispersion constants
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Attribute one reading (or a JSON file of requests) to source categories
    Attribute {
        /// ISO-8601 timestamp (defaults to now)
        #[arg(short, long)]
        timestamp: Option<String>,

        /// PM2.5 in µg/m³
        #[arg(long)]
        pm25: Option<f64>,

        /// PM10 in µg/m³
        #[arg(long)]
        pm10: Option<f64>,

        /// NO2 in µg/m³
        #[arg(long)]
        no2: Option<f64>,

        /// SO2 in µg/m³
        #[arg(long)]
        so2: Option<f64>,

        /// CO in mg/m³
        #[arg(long)]
        co: Option<f64>,

        /// Wind speed in m/s
        #[arg(long)]
        wind_speed: Option<f64>,

        /// Wind direction in degrees (direction wind blows FROM)
        #[arg(long)]
        wind_dir: Option<f64>,

        /// Boundary-layer height in meters
        #[arg(long)]
        blh: Option<f64>,

        /// Fire detections in the lookback window
        #[arg(short, long, default_value_t = 0)]
        fires: u32,

        /// JSON array of attribution requests, evaluated in parallel
        #[arg(short, long, conflicts_with = "timestamp")]
        input: Option<PathBuf>,
    },

    /// Forecast where a plume travels over the next hours
    Outfall {
        /// Source latitude
        #[arg(long, default_value_t = ANAND_VIHAR.latitude)]
        lat: f64,

        /// Source longitude
        #[arg(long, default_value_t = ANAND_VIHAR.longitude)]
        lon: f64,

        /// Wind speed in m/s
        #[arg(long)]
        wind_speed: Option<f64>,

        /// Wind direction in degrees
        #[arg(long)]
        wind_dir: Option<f64>,

        /// Boundary-layer height in meters
        #[arg(long)]
        blh: Option<f64>,

        /// Forecast horizon in hours
        #[arg(long)]
        hours: Option<u32>,

        /// Current PM2.5 to project downwind
        #[arg(short, long)]
        reading: Option<f64>,
    },

    /// Run the four validation scenarios
    Scenarios,
}

/// Attribution plus the caller-side context shown next to it.
#[derive(Serialize)]
struct AttributionReport {
    #[serde(flatten)]
    result: AttributionResult,
    summary: String,
    confidence: Confidence,
    meteorology: Meteorology,
    mixing: BoundaryLayerClass,
}

impl AttributionReport {
    fn new(request: &AttributionRequest, result: AttributionResult) -> Self {
        AttributionReport {
            summary: result.summary(),
            confidence: Confidence::assess(&request.readings, &request.meteorology),
            meteorology: request.meteorology,
            mixing: BoundaryLayerClass::classify(request.meteorology.boundary_layer_height),
            result,
        }
    }

    fn print(&self) {
        println!("{}", self.result);
        println!("  {}", self.summary);
        println!("  confidence: {}, mixing: {}", self.confidence, self.mixing);
    }
}

#[derive(Serialize)]
struct ScenarioReport {
    name: &'static str,
    #[serde(flatten)]
    attribution: AttributionReport,
    outfall: OutfallForecast,
}

struct Scenario {
    name: &'static str,
    timestamp: &'static str,
    pm25: f64,
    pm10: f64,
    no2: f64,
    so2: f64,
    co: f64,
    wind_dir: f64,
    wind_speed: f64,
    blh: f64,
    fires: u32,
}

const SCENARIOS: [Scenario; 4] = [
    Scenario {
        name: "Rush Hour High Traffic",
        timestamp: "2025-11-08T09:00:00",
        pm25: 200.0,
        pm10: 350.0,
        no2: 120.0,
        so2: 15.0,
        co: 1.2,
        wind_dir: 308.0,
        wind_speed: 4.0,
        blh: 300.0,
        fires: 150,
    },
    Scenario {
        name: "Peak Stubble Event",
        timestamp: "2025-11-08T18:00:00",
        pm25: 400.0,
        pm10: 550.0,
        no2: 80.0,
        so2: 20.0,
        co: 2.5,
        wind_dir: 290.0,
        wind_speed: 5.0,
        blh: 200.0,
        fires: 500,
    },
    Scenario {
        name: "Summer Dust Storm",
        timestamp: "2025-05-15T14:00:00",
        pm25: 150.0,
        pm10: 500.0,
        no2: 50.0,
        so2: 10.0,
        co: 0.8,
        wind_dir: 250.0,
        wind_speed: 12.0,
        blh: 2000.0,
        fires: 10,
    },
    Scenario {
        name: "Night Winter Inversion",
        timestamp: "2025-12-15T03:00:00",
        pm25: 350.0,
        pm10: 450.0,
        no2: 40.0,
        so2: 25.0,
        co: 2.0,
        wind_dir: 90.0,
        wind_speed: 1.5,
        blh: 100.0,
        fires: 20,
    },
];

fn reading_from(pm25: Option<f64>, pm10: Option<f64>, no2: Option<f64>, so2: Option<f64>, co: Option<f64>) -> Reading {
    [
        (Pollutant::Pm25, pm25),
        (Pollutant::Pm10, pm10),
        (Pollutant::No2, no2),
        (Pollutant::So2, so2),
        (Pollutant::Co, co),
    ]
    .into_iter()
    .filter_map(|(pollutant, value)| value.map(|v| (pollutant, v)))
    .collect()
}

fn load_config(path: Option<&Path>) -> Result<AirshedConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(AirshedConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let config = AirshedConfig::from_json_str(&text)?;
    info!(path = %path.display(), "loaded configuration overrides");
    Ok(config)
}

fn emit<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outfall(forecast: &OutfallForecast) {
    if forecast.is_empty() {
        println!("No outfall forecast: wind vector unknown");
        return;
    }
    println!(
        "Outfall from ({:.5}, {:.5}):",
        forecast.source.latitude, forecast.source.longitude
    );
    println!("  hour   latitude   longitude   dist km  intensity  predicted");
    for p in &forecast.points {
        println!(
            "  {:>4}  {:>9.5}  {:>10.5}  {:>8.2}  {:>9.3}  {:>9.1}",
            p.hour, p.latitude, p.longitude, p.distance_km, p.intensity_factor, p.predicted_concentration
        );
    }
}

fn run_attribute(config: &AirshedConfig, json: bool, requests: &[AttributionRequest]) -> Result<(), Box<dyn Error>> {
    let engine = AttributionEngine::new(config);
    let reports: Vec<AttributionReport> = requests
        .iter()
        .zip(engine.attribute_batch(requests))
        .map(|(request, result)| AttributionReport::new(request, result))
        .collect();

    if json {
        if let [single] = reports.as_slice() {
            return emit(single);
        }
        return emit(&reports);
    }

    println!("=== Source Attribution ===\n");
    for report in &reports {
        report.print();
        println!();
    }
    Ok(())
}

fn run_scenarios(config: &AirshedConfig, json: bool) -> Result<(), Box<dyn Error>> {
    let engine = AttributionEngine::new(config);
    let forecaster = DispersionForecaster::new(&config.dispersion);

    let mut reports = Vec::with_capacity(SCENARIOS.len());
    for scenario in &SCENARIOS {
        let request = AttributionRequest::parse(
            scenario.timestamp,
            reading_from(
                Some(scenario.pm25),
                Some(scenario.pm10),
                Some(scenario.no2),
                Some(scenario.so2),
                Some(scenario.co),
            ),
            Meteorology::UNKNOWN
                .with_wind(MetersPerSecond::new(scenario.wind_speed), Degrees::new(scenario.wind_dir))
                .with_blh(Meters::new(scenario.blh)),
            FireActivity::new(scenario.fires),
        )?;
        let result = engine.attribute_request(&request);
        let outfall = forecaster.outfall(
            &OutfallRequest::new(ANAND_VIHAR, MetersPerSecond::new(scenario.wind_speed), Degrees::new(scenario.wind_dir))
                .with_blh(Meters::new(scenario.blh))
                .with_reading(scenario.pm25),
        );
        reports.push(ScenarioReport {
            name: scenario.name,
            attribution: AttributionReport::new(&request, result),
            outfall,
        });
    }

    if json {
        return emit(&reports);
    }

    println!("=== Validation Scenarios ===");
    for report in &reports {
        println!("\n>>> {}", report.name);
        report.attribution.print();
        print_outfall(&report.outfall);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Attribute {
            timestamp,
            pm25,
            pm10,
            no2,
            so2,
            co,
            wind_speed,
            wind_dir,
            blh,
            fires,
            input,
        } => {
            let requests = if let Some(path) = input {
                let text = std::fs::read_to_string(&path)?;
                serde_json::from_str::<Vec<AttributionRequest>>(&text)?
            } else {
                let timestamp = match timestamp {
                    Some(text) => parse_timestamp(&text)?,
                    None => chrono::Local::now().naive_local(),
                };
                vec![AttributionRequest::new(
                    timestamp,
                    reading_from(pm25, pm10, no2, so2, co),
                    Meteorology::from_raw(wind_speed, wind_dir, blh),
                    FireActivity::new(fires),
                )]
            };
            info!(count = requests.len(), "attributing");
            run_attribute(&config, args.json, &requests)
        }
        Command::Outfall {
            lat,
            lon,
            wind_speed,
            wind_dir,
            blh,
            hours,
            reading,
        } => {
            let request = OutfallRequest {
                source: GeoPoint::new(lat, lon),
                wind_speed: wind_speed.map(MetersPerSecond::new),
                wind_direction: wind_dir.map(Degrees::new),
                boundary_layer_height: blh.map(Meters::new),
                hours,
                reading,
            };
            let forecast = DispersionForecaster::new(&config.dispersion).outfall(&request);
            if args.json {
                emit(&forecast)
            } else {
                println!("=== Outfall Forecast ===\n");
                print_outfall(&forecast);
                Ok(())
            }
        }
        Command::Scenarios => run_scenarios(&config, args.json),
    }
}
