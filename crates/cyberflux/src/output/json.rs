use std::io::Write;

use serde_json::{Value, json};

use fluxcore::ClientKind;

use crate::arrival::RunReport;
use crate::config::RunConfig;
use crate::output::outputs::Output;

#[derive(Default)]
pub struct JsonOutput;

impl JsonOutput {
    fn print(&self, data: Value) {
        let mut stdout = std::io::stdout().lock();
        let result = serde_json::to_writer_pretty(&mut stdout, &data)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(stdout));
        if let Err(e) = result {
            log::error!("Cannot print JSON to stdout: {e:?}");
        }
    }
}

impl Output for JsonOutput {
    // Parameters are part of the report
    fn print_parameters(&self, _config: &RunConfig) {}

    fn print_report(&self, config: &RunConfig, report: &RunReport) {
        self.print(format_report(config, report));
    }

    fn print_error(&self, error: anyhow::Error) {
        self.print(json!({
            "error": format!("{error:?}")
        }));
    }
}

fn format_parameters(config: &RunConfig) -> Value {
    let simulation = &config.simulation;
    let arrival = &config.arrival;
    json!({
        "clients_min": arrival.clients_min,
        "clients_max": arrival.clients_max,
        "open_hours": arrival.open_hours,
        "hour_length": format_duration(arrival.hour_length),
        "mode": simulation.mode,
        "gate_timeout": format_duration(simulation.gate_timeout),
        "backoff": format_duration(simulation.backoff),
        "service_min": format_duration(arrival.service_time.min()),
        "service_max": format_duration(arrival.service_time.max()),
        "capacities": simulation.capacities,
        "near_deadlock_alerts": simulation.near_deadlock_alerts,
        "seed": arrival.seed,
    })
}

pub fn format_report(config: &RunConfig, report: &RunReport) -> Value {
    let stats = &report.summary.stats;
    let kinds: serde_json::Map<String, Value> = ClientKind::ALL
        .iter()
        .map(|kind| {
            (
                kind.name().to_string(),
                json!({
                    "served": stats.served_by_kind.get(*kind),
                    "abandoned": stats.abandoned_by_kind.get(*kind),
                }),
            )
        })
        .collect();

    json!({
        "parameters": format_parameters(config),
        "planned": report.planned,
        "created": report.summary.created,
        "served": stats.total_served,
        "abandoned": stats.total_abandoned,
        "average_wait_ms": stats.average_wait_ms(),
        "resource_usage": stats.resource_usage,
        "clients": kinds,
        "duration": format_duration(report.duration),
    })
}

fn format_duration(duration: std::time::Duration) -> String {
    humantime::format_duration(duration).to_string()
}
