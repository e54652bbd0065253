//! `ensure` and `diff` handlers.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use zabbly_core::{
    CoreError, DesiredHost, HostDefaults, HostDrift, HostInterface, InterfaceSpec, Outcome, Plan,
};

use crate::cli::{GlobalOpts, HostArgs};
use crate::config::{self, Resolved};
use crate::error::CliError;
use crate::output::{self, Painter};

// ── Desired state ───────────────────────────────────────────────────

/// Merge manifest, flags and profile defaults into one validated host.
///
/// Flags extend the manifest's lists; `--proxy` and a positional hostname
/// replace the manifest's values. Profile defaults only fill what is still
/// empty afterwards.
pub fn build_desired(args: HostArgs, defaults: HostDefaults) -> Result<DesiredHost, CliError> {
    let mut builder = match args.from_file {
        Some(ref path) => {
            let mut manifest = zabbly_config::load_manifest(path)?;
            if let Some(hostname) = args.hostname {
                manifest.hostname = hostname;
            }
            manifest.into_builder()?
        }
        None => {
            let hostname = args.hostname.ok_or_else(|| CliError::Validation {
                field: "hostname".into(),
                reason: "a hostname or --from-file is required".into(),
            })?;
            DesiredHost::builder(hostname)
        }
    };

    for raw in &args.interfaces {
        let spec = InterfaceSpec::from_str(raw)?;
        builder = builder.interface(HostInterface::try_from(spec)?);
    }

    builder = builder
        .groups(args.groups)
        .templates(args.templates)
        .macros(args.macros)
        .defaults(defaults);
    if args.proxy.is_some() {
        builder = builder.proxy(args.proxy);
    }
    if args.create_missing_groups {
        builder = builder.create_missing_groups(true);
    }

    Ok(builder.build()?)
}

/// Core errors carry neither the profile nor the configured timeout.
fn contextualize(err: CoreError, resolved: &Resolved) -> CliError {
    let err = match err {
        CoreError::Timeout { timeout_secs: 0 } => CoreError::Timeout {
            timeout_secs: resolved.server.timeout.as_secs(),
        },
        other => other,
    };
    CliError::from(err).with_profile(&resolved.profile_name)
}

// ── Reports ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Report<'a, T> {
    host: &'a str,
    #[serde(flatten)]
    result: &'a T,
}

fn drift_lines(out: &mut String, drift: &HostDrift, painter: Painter) {
    for reason in drift.reasons() {
        let _ = writeln!(out, "  {} {reason}", painter.changed("~"));
    }
}

fn outcome_detail(host: &DesiredHost, outcome: &Outcome, painter: Painter) -> String {
    let name = host.hostname();
    let mut out = String::new();
    match outcome {
        Outcome::Created { hostid } => {
            let id = hostid
                .as_ref()
                .map_or_else(|| "id not reported".to_owned(), |id| format!("hostid {id}"));
            let _ = writeln!(out, "{} created host {name} ({id})", painter.added("+"));
            if !host.interfaces().is_empty() {
                out.push_str(&output::interface_table(host.interfaces()));
            }
        }
        Outcome::Updated {
            hostid,
            interfaces_created,
            drift,
        } => {
            let _ = writeln!(
                out,
                "{} updated host {name} (hostid {hostid})",
                painter.changed("~")
            );
            drift_lines(&mut out, drift, painter);
            if !interfaces_created.is_empty() {
                let _ = writeln!(out, "Interfaces added:");
                out.push_str(&output::interface_table(interfaces_created));
            }
        }
        Outcome::Unchanged { hostid } => {
            let _ = write!(
                out,
                "{} host {name} is up to date {}",
                painter.dim("="),
                painter.dim(&format!("(hostid {hostid})"))
            );
        }
    }
    out.trim_end().to_owned()
}

fn plan_detail(host: &DesiredHost, plan: &Plan, painter: Painter) -> String {
    let name = host.hostname();
    let mut out = String::new();
    match plan {
        Plan::Create => {
            let _ = writeln!(out, "{} host {name} will be created", painter.added("+"));
            let _ = writeln!(out, "  groups:    {}", host.groups().join(", "));
            if !host.templates().is_empty() {
                let _ = writeln!(out, "  templates: {}", host.templates().join(", "));
            }
            if let Some(proxy) = host.proxy() {
                let _ = writeln!(out, "  proxy:     {proxy}");
            }
            if !host.macros().is_empty() {
                let keys: Vec<String> = host
                    .macros()
                    .keys()
                    .map(|k| zabbly_core::normalize_macro_name(k))
                    .collect();
                let _ = writeln!(out, "  macros:    {}", keys.join(", "));
            }
            if !host.interfaces().is_empty() {
                out.push_str(&output::interface_table(host.interfaces()));
            }
        }
        Plan::Update { hostid, drift } => {
            let _ = writeln!(
                out,
                "{} host {name} (hostid {hostid}) will be updated",
                painter.changed("~")
            );
            drift_lines(&mut out, drift, painter);
        }
        Plan::NoOp { hostid } => {
            let _ = write!(
                out,
                "{} host {name} is up to date {}",
                painter.dim("="),
                painter.dim(&format!("(hostid {hostid})"))
            );
        }
    }
    out.trim_end().to_owned()
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn ensure(args: HostArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let host = build_desired(args, resolved.defaults.clone())?;
    tracing::debug!(host = host.hostname(), profile = %resolved.profile_name, "ensuring host");

    let outcome = zabbly_core::ensure_host(&resolved.server, &host)
        .await
        .map_err(|e| contextualize(e, &resolved))?;

    let painter = Painter::new(&global.color);
    let report = Report {
        host: host.hostname(),
        result: &outcome,
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| outcome_detail(&host, r.result, painter),
        |r| match r.result {
            Outcome::Created { hostid } => hostid.as_ref().map(ToString::to_string).unwrap_or_default(),
            Outcome::Updated { hostid, .. } | Outcome::Unchanged { hostid } => hostid.to_string(),
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn diff(args: HostArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let host = build_desired(args, resolved.defaults.clone())?;
    tracing::debug!(host = host.hostname(), profile = %resolved.profile_name, "planning host");

    let plan = zabbly_core::plan_host(&resolved.server, &host)
        .await
        .map_err(|e| contextualize(e, &resolved))?;

    let painter = Painter::new(&global.color);
    let report = Report {
        host: host.hostname(),
        result: &plan,
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| plan_detail(&host, r.result, painter),
        |r| match r.result {
            Plan::Create => "create".to_owned(),
            Plan::Update { .. } => "update".to_owned(),
            Plan::NoOp { .. } => "noop".to_owned(),
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
