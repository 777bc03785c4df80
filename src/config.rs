//! Command line and environment configuration for the server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use rust_decimal::Decimal;
use time::Duration;

use crate::report::ReportConfig;

/// The REST API server for spendlog.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    pub db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The IP address to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub address: IpAddr,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    ///
    /// Calendar months in reports start and end at local midnight.
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = "Etc/UTC")]
    pub local_timezone: String,

    /// The secret used to derive the key that encrypts session cookies.
    #[arg(long, env = "SECRET", hide_env_values = true)]
    pub secret: String,

    /// How long a session lasts without any requests.
    #[arg(long, default_value_t = 30)]
    pub cookie_duration_minutes: i64,

    /// The number of decimal places shown in percentages.
    #[arg(long, default_value_t = 1)]
    pub percentage_precision: u32,

    /// Expenditures larger than this many times the mean expenditure are
    /// reported as anomalies. Must not be negative.
    #[arg(long, default_value = "2", value_parser = parse_multiplier)]
    pub anomaly_multiplier: Decimal,

    /// The number of categories listed as high frequency.
    #[arg(long, default_value_t = 3)]
    pub top_categories: usize,
}

fn parse_multiplier(value: &str) -> Result<Decimal, String> {
    let multiplier = value.parse::<Decimal>().map_err(|error| error.to_string())?;

    if multiplier.is_sign_negative() && !multiplier.is_zero() {
        return Err(format!("{value} is negative"));
    }

    Ok(multiplier)
}

impl Config {
    /// The address and port to listen on.
    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// How long a session lasts without any requests.
    pub fn cookie_duration(&self) -> Duration {
        Duration::minutes(self.cookie_duration_minutes)
    }

    /// The settings passed to the report aggregator.
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            percentage_precision: self.percentage_precision,
            anomaly_multiplier: self.anomaly_multiplier,
            top_categories: self.top_categories,
        }
    }
}
