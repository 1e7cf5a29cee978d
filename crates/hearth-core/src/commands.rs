use std::io;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::cli::Invocation;
use crate::config::Config;
use crate::datekey::{format_date_key, parse_date_key};
use crate::grid::{ViewMode, shift_focus, view_range};
use crate::model::CalendarData;
use crate::render::Renderer;
use crate::view::ViewBuilder;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "month", "week", "day", "range", "hours", "pick", "config", "help", "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(cfg, renderer, data, inv))]
pub fn dispatch(
    cfg: &Config,
    renderer: &Renderer,
    data: &CalendarData,
    inv: Invocation,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let command = inv.command.as_str();
    debug!(command, args = ?inv.command_args, "dispatching command");

    match command {
        "month" => cmd_view(cfg, renderer, data, ViewMode::Month, &inv.command_args, today),
        "week" => cmd_view(cfg, renderer, data, ViewMode::Week, &inv.command_args, today),
        "day" => cmd_view(cfg, renderer, data, ViewMode::Day, &inv.command_args, today),
        "range" => cmd_range(&inv.command_args, today),
        "hours" => cmd_hours(cfg, renderer),
        "pick" => cmd_pick(cfg, &inv.command_args),
        "config" => cmd_config(cfg),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

/// Resolves the focus date from `[DATE] [+N|-N]`: `today`, `YYYY-MM-DD` or
/// `YYYY-MM`, then moved by N views.
pub fn resolve_focus(args: &[String], view: ViewMode, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let mut focus = today;
    let mut step = 0_i64;

    for arg in args {
        let token = arg.trim();
        if let Some(rest) = token.strip_prefix('+').or_else(|| token.strip_prefix('-')) {
            let amount: i64 = rest
                .parse()
                .with_context(|| format!("invalid view offset: {token}"))?;
            step = if token.starts_with('-') { -amount } else { amount };
            continue;
        }
        focus = parse_focus_date(token, today)?;
    }

    if step != 0 {
        focus = shift_focus(focus, view, step)
            .with_context(|| format!("cannot move {} view by {step}", view.as_key()))?;
    }
    Ok(focus)
}

fn parse_focus_date(token: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    if token.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    if token.len() == 7 {
        return parse_date_key(&format!("{token}-01"))
            .with_context(|| format!("invalid month: {token} (expected YYYY-MM)"));
    }
    parse_date_key(token).with_context(|| format!("invalid date: {token} (expected YYYY-MM-DD)"))
}

#[instrument(skip(cfg, renderer, data, args, today))]
fn cmd_view(
    cfg: &Config,
    renderer: &Renderer,
    data: &CalendarData,
    view: ViewMode,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<()> {
    let focus = resolve_focus(args, view, today)?;
    let builder = ViewBuilder::new(data, cfg.axis_window()?, today);
    info!(view = view.as_key(), focus = %focus, "command view");

    match view {
        ViewMode::Month => renderer.print_month(&builder.month(focus)?),
        ViewMode::Week => renderer.print_week(&builder.week(focus)?),
        ViewMode::Day => renderer.print_day(&builder.day(focus)?),
    }
}

#[instrument(skip(args, today))]
fn cmd_range(args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let (view_arg, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("usage: range <month|week|day> [DATE] [+N|-N]"))?;
    let view = ViewMode::from_key(view_arg)
        .ok_or_else(|| anyhow!("unknown view: {view_arg} (expected month, week or day)"))?;
    let focus = resolve_focus(rest, view, today)?;
    let (start, end) = view_range(view, focus)?;

    println!("{} {}", format_date_key(start), format_date_key(end));
    Ok(())
}

fn cmd_hours(cfg: &Config, renderer: &Renderer) -> anyhow::Result<()> {
    let axis = cfg.axis_window()?;
    renderer.write_hours(io::stdout().lock(), &axis)
}

/// Clock time under a click at a fraction of the day grid's height.
#[instrument(skip(cfg, args))]
fn cmd_pick(cfg: &Config, args: &[String]) -> anyhow::Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow!("usage: pick <FRACTION 0.0-1.0>"))?;
    let fraction: f64 = raw
        .parse()
        .with_context(|| format!("invalid fraction: {raw}"))?;
    if !(0.0..=1.0).contains(&fraction) {
        return Err(anyhow!("fraction must be within 0.0..=1.0, got {fraction}"));
    }

    let time = cfg.axis_window()?.time_at_fraction(fraction, cfg.snap_minutes()?);
    println!("{time}");
    Ok(())
}

fn cmd_config(cfg: &Config) -> anyhow::Result<()> {
    for path in &cfg.loaded_files {
        println!("# loaded {}", path.display());
    }
    for (key, value) in cfg.entries() {
        println!("{key}={value}");
    }
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!("hearth [options] <command> [args]");
    println!();
    println!("commands:");
    println!("  month [YYYY-MM|DATE] [+N|-N]   month grid with item counts");
    println!("  week [DATE] [+N|-N]            week columns with timed layout");
    println!("  day [DATE] [+N|-N]             one day on the hour axis");
    println!("  range <month|week|day> [DATE]  data window for a view");
    println!("  hours                          axis tick hours");
    println!("  pick <FRACTION>                clock time at a grid height fraction");
    println!("  config                         effective settings");
    println!("  help | version");
    println!();
    println!("options: --data FILE, --member ID, --hearthrc PATH, --rc KEY=VALUE, rc.KEY=VALUE");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{expand_command_abbrev, known_command_names, resolve_focus};
    use crate::grid::ViewMode;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn abbreviations_must_be_unique() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("mo", &known), Some("month"));
        assert_eq!(expand_command_abbrev("d", &known), Some("day"));
        assert_eq!(expand_command_abbrev("h", &known), None);
        assert_eq!(expand_command_abbrev("year", &known), None);
    }

    #[test]
    fn focus_defaults_to_today_and_accepts_offsets() {
        let today = ymd(2026, 10, 19);
        assert_eq!(resolve_focus(&[], ViewMode::Day, today).expect("focus"), today);
        assert_eq!(
            resolve_focus(&args(&["+1"]), ViewMode::Month, today).expect("focus"),
            ymd(2026, 11, 19)
        );
        assert_eq!(
            resolve_focus(&args(&["2026-01-31", "+1"]), ViewMode::Month, today).expect("focus"),
            ymd(2026, 2, 28)
        );
        assert_eq!(
            resolve_focus(&args(&["-2"]), ViewMode::Week, today).expect("focus"),
            ymd(2026, 10, 5)
        );
        assert_eq!(
            resolve_focus(&args(&["2026-12"]), ViewMode::Month, today).expect("focus"),
            ymd(2026, 12, 1)
        );
    }

    #[test]
    fn focus_rejects_garbage() {
        let today = ymd(2026, 10, 19);
        assert!(resolve_focus(&args(&["tomorrow"]), ViewMode::Day, today).is_err());
        assert!(resolve_focus(&args(&["+x"]), ViewMode::Day, today).is_err());
        assert!(resolve_focus(&args(&["2026-13"]), ViewMode::Month, today).is_err());
    }
}
