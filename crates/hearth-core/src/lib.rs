pub mod axis;
pub mod bucket;
pub mod cli;
pub mod clock;
pub mod color;
pub mod commands;
pub mod config;
pub mod datekey;
pub mod error;
pub mod grid;
pub mod layout;
pub mod model;
pub mod render;
pub mod view;

use std::collections::BTreeSet;
use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use error::CalendarError;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting hearth CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.hearthrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_file =
    config::resolve_data_file(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve calendar \
       snapshot"
    )?;

  let data =
    model::CalendarData::load(
      &data_file
    )
    .with_context(|| {
      format!(
        "failed to load calendar from \
         {}",
        data_file.display()
      )
    })?;

  let active: Option<BTreeSet<_>> =
    (!cli.members.is_empty()).then(
      || {
        cli.members.iter().copied().collect()
      }
    );
  let data =
    data.filter_members(active.as_ref());

  let renderer =
    render::Renderer::new(&cfg)?;
  let inv = cli::Invocation::parse(
    &cfg, cli.rest
  )?;

  commands::dispatch(
    &cfg,
    &renderer,
    &data,
    inv,
    datekey::today()
  )?;

  info!("done");
  Ok(())
}
