use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::axis::{
  AxisWindow,
  DEFAULT_END_HOUR,
  DEFAULT_SNAP_MINUTES,
  DEFAULT_START_HOUR
};

pub const RC_ENV_VAR: &str = "HEARTHRC";
const RC_FILE_NAME: &str = ".hearthrc";

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    for (key, value) in [
      (
        "data.location",
        "~/.hearth/calendar.json"
          .to_string()
      ),
      (
        "default.command",
        "month".to_string()
      ),
      ("color", "on".to_string()),
      (
        "axis.start_hour",
        DEFAULT_START_HOUR.to_string()
      ),
      (
        "axis.end_hour",
        DEFAULT_END_HOUR.to_string()
      ),
      (
        "quickadd.snap_minutes",
        DEFAULT_SNAP_MINUTES.to_string()
      )
    ] {
      map.insert(key.to_string(), value);
    }

    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading hearthrc");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no hearthrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  pub fn get_u32(
    &self,
    key: &str
  ) -> anyhow::Result<Option<u32>> {
    self
      .map
      .get(key)
      .map(|v| {
        v.trim().parse::<u32>().with_context(
          || {
            format!(
              "config key {key} must be \
               a non-negative integer, \
               got {v:?}"
            )
          }
        )
      })
      .transpose()
  }

  /// Sorted for stable output.
  pub fn entries(
    &self
  ) -> Vec<(&String, &String)> {
    let mut entries: Vec<_> =
      self.map.iter().collect();
    entries.sort();
    entries
  }

  pub fn axis_window(
    &self
  ) -> anyhow::Result<AxisWindow> {
    let start = self
      .get_u32("axis.start_hour")?
      .unwrap_or(DEFAULT_START_HOUR);
    let end = self
      .get_u32("axis.end_hour")?
      .unwrap_or(DEFAULT_END_HOUR);
    AxisWindow::new(start, end)
      .context("invalid axis.* settings")
  }

  pub fn snap_minutes(
    &self
  ) -> anyhow::Result<u32> {
    let snap = self
      .get_u32("quickadd.snap_minutes")?
      .unwrap_or(DEFAULT_SNAP_MINUTES);
    if snap == 0 || snap > 60 {
      return Err(anyhow!(
        "quickadd.snap_minutes must be \
         within 1..=60, got {snap}"
      ));
    }
    Ok(snap)
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let line = raw_line
        .split_once('#')
        .map_or(raw_line, |(before, _)| {
          before
        })
        .trim();
      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        if self
          .loaded_files
          .contains(&include_path)
        {
          warn!(include = %include_path.display(), "include already loaded; skipping");
          continue;
        }
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

/// Path of the JSON calendar snapshot:
/// `--data` first, then
/// `data.location`.
#[tracing::instrument(skip(
  cfg,
  override_file
))]
pub fn resolve_data_file(
  cfg: &Config,
  override_file: Option<&Path>
) -> anyhow::Result<PathBuf> {
  if let Some(path) = override_file {
    return Ok(path.to_path_buf());
  }

  let location = cfg
    .get("data.location")
    .filter(|value| {
      !value.trim().is_empty()
    })
    .ok_or_else(|| {
      anyhow!(
        "data.location is not set and \
         no --data file was given"
      )
    })?;
  Ok(expand_tilde(Path::new(&location)))
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV_VAR)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping hearthrc"
    );
    return Ok(None);
  };
  let candidate = home.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let expanded =
    expand_tilde(Path::new(include));
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::path::Path;

  use tempfile::tempdir;

  use super::{
    Config,
    resolve_data_file
  };
  use crate::axis::AxisWindow;

  #[test]
  fn defaults_cover_axis_and_snap() {
    let cfg = Config::default();
    assert_eq!(
      cfg.axis_window().expect("axis"),
      AxisWindow::default()
    );
    assert_eq!(
      cfg.snap_minutes().expect("snap"),
      15
    );
    assert_eq!(
      cfg.get("default.command")
        .as_deref(),
      Some("month")
    );
    assert_eq!(
      cfg.get_bool("color"),
      Some(true)
    );
  }

  #[test]
  fn loads_file_with_comments_and_includes()
   {
    let dir = tempdir().expect("tempdir");
    fs::write(
      dir.path().join("axis.rc"),
      "axis.start_hour = 7\n"
    )
    .expect("write include");
    let rc = dir.path().join("hearthrc");
    fs::write(
      &rc,
      "# household calendar\n\
       color = off # no ansi\n\
       include axis.rc\n\
       axis.end_hour=20\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&rc))
      .expect("load config");
    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg.get_bool("color"),
      Some(false)
    );
    assert_eq!(
      cfg.axis_window().expect("axis"),
      AxisWindow::new(7, 20)
        .expect("window")
    );
  }

  #[test]
  fn rejects_lines_without_equals() {
    let dir = tempdir().expect("tempdir");
    let rc = dir.path().join("hearthrc");
    fs::write(&rc, "axis.start_hour 7\n")
      .expect("write rc");
    assert!(Config::load(Some(&rc)).is_err());
  }

  #[test]
  fn overrides_win_and_invalid_axis_is_rejected()
   {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![
      (
        "rc.axis.start_hour".to_string(),
        "23".to_string()
      ),
      (
        "axis.end_hour".to_string(),
        "8".to_string()
      )
    ]);
    assert_eq!(
      cfg.get("axis.start_hour")
        .as_deref(),
      Some("23")
    );
    assert!(cfg.axis_window().is_err());

    cfg.apply_overrides(vec![(
      "quickadd.snap_minutes"
        .to_string(),
      "abc".to_string()
    )]);
    assert!(cfg.snap_minutes().is_err());
  }

  #[test]
  fn data_file_prefers_override() {
    let cfg = Config::default();
    let explicit = Path::new(
      "/tmp/hearth/calendar.json"
    );
    assert_eq!(
      resolve_data_file(
        &cfg,
        Some(explicit)
      )
      .expect("data file"),
      explicit
    );

    let mut cfg = Config::default();
    cfg.apply_overrides(vec![(
      "data.location".to_string(),
      "snap.json".to_string()
    )]);
    assert_eq!(
      resolve_data_file(&cfg, None)
        .expect("data file"),
      Path::new("snap.json")
    );
  }
}
