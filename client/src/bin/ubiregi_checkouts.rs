//! Dump Ubiregi checkouts (or one checkout, or the account) as JSON lines.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use ubiclient::ClientSettings;
use ubiclient::domain::{AccountService, CheckoutId, CheckoutManager, SearchCriteria};
use ubiclient::outbound::UbiHttpAgent;

/// `ubiregi-checkouts` command arguments.
///
/// Connection settings come from `UBIREGI_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ubiregi-checkouts",
    about = "Fetch checkouts from the Ubiregi API and print them as JSON lines",
    version
)]
struct CliArgs {
    /// Inclusive lower bound on `updated_at`, in account wall-clock time.
    #[arg(long, value_name = "datetime", value_parser = parse_window_bound)]
    since: Option<NaiveDateTime>,
    /// Exclusive upper bound on `updated_at`, in account wall-clock time.
    #[arg(long, value_name = "datetime", value_parser = parse_window_bound)]
    until: Option<NaiveDateTime>,
    /// Page size hint sent to the server.
    #[arg(long, value_name = "count")]
    limit: Option<u32>,
    /// Only return checkouts with an id greater than this one.
    #[arg(long, value_name = "id")]
    glb: Option<i64>,
    /// Fetch a single checkout instead of searching.
    #[arg(long, value_name = "id", conflicts_with_all = ["since", "until", "limit", "glb"])]
    id: Option<i64>,
    /// Print the current account instead of checkouts.
    #[arg(long, conflicts_with = "id")]
    account: bool,
}

impl CliArgs {
    fn criteria(&self) -> Option<SearchCriteria> {
        if self.since.is_none() && self.until.is_none() && self.limit.is_none() && self.glb.is_none()
        {
            return None;
        }
        let mut criteria = SearchCriteria::default();
        if let Some(since) = self.since {
            criteria = criteria.with_since(since);
        }
        if let Some(until) = self.until {
            criteria = criteria.with_until(until);
        }
        if let Some(limit) = self.limit {
            criteria = criteria.with_limit(limit);
        }
        if let Some(glb) = self.glb {
            criteria = criteria.with_glb(glb);
        }
        Some(criteria)
    }
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = ClientSettings::load_from_iter([OsString::from("ubiregi-checkouts")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let agent_config = settings
        .agent_config()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;
    let agent = Arc::new(
        UbiHttpAgent::new(agent_config)
            .map_err(|error| io::Error::other(format!("create agent: {error}")))?,
    );

    if args.account {
        let account = AccountService::new(agent)
            .current()
            .await
            .map_err(|error| io::Error::other(format!("fetch account: {error}")))?;
        return account.map_or(Ok(()), |found| write_json(&mut io::stdout().lock(), &found));
    }

    let manager = CheckoutManager::new(agent, Arc::new(DefaultClock), settings.manager_config());
    if let Some(id) = args.id {
        let checkout = manager
            .get(CheckoutId::new(id))
            .await
            .map_err(|error| io::Error::other(format!("fetch checkout {id}: {error}")))?;
        return match checkout {
            Some(found) => write_json(&mut io::stdout().lock(), &found),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("checkout {id} not found"),
            )),
        };
    }

    let checkouts = manager
        .search(args.criteria())
        .await
        .map_err(|error| io::Error::other(format!("search checkouts: {error}")))?;
    let mut out = io::stdout().lock();
    for checkout in &checkouts {
        write_json(&mut out, checkout)?;
    }
    out.flush()
}

/// Write `value` as one JSON line; a closed stdout surfaces as an error.
fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value).map_err(io::Error::from)?;
    writeln!(out)
}

/// Accepts RFC 3339 (offset dropped, wall-clock kept), `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM:SS` or a bare date (midnight).
fn parse_window_bound(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(with_offset.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| format!("`{raw}` is not a date or date-time"))
}
