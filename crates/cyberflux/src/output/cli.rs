use cli_table::format::{Justify, Separator};
use cli_table::{Cell, CellStruct, ColorChoice, Style, Table, TableStruct, print_stdout};

use colored::Colorize;
use humantime::format_duration;

use fluxcore::ClientKind;

use crate::arrival::RunReport;
use crate::common::timeutils::format_millis;
use crate::config::{RunConfig, Verbosity};
use crate::output::outputs::Output;

pub struct CliOutput {
    color_policy: ColorChoice,
}

impl CliOutput {
    pub fn new(color_policy: ColorChoice) -> CliOutput {
        CliOutput { color_policy }
    }

    fn print_vertical_table(&self, rows: Vec<Vec<CellStruct>>) {
        let table = rows.table().separator(
            Separator::builder()
                .column(Some(Default::default()))
                .build(),
        );
        self.print_table(table);
    }

    fn print_horizontal_table(&self, rows: Vec<Vec<CellStruct>>, header: Vec<CellStruct>) {
        let table = rows
            .table()
            .separator(
                Separator::builder()
                    .title(Some(Default::default()))
                    .column(Some(Default::default()))
                    .build(),
            )
            .title(header);
        self.print_table(table);
    }

    fn print_table(&self, table: TableStruct) {
        let table = table.color_choice(self.color_policy);
        if let Err(e) = print_stdout(table) {
            log::error!("Cannot print table to stdout: {e:?}");
        }
    }
}

impl Output for CliOutput {
    fn print_parameters(&self, config: &RunConfig) {
        let simulation = &config.simulation;
        let arrival = &config.arrival;
        let capacities = &simulation.capacities;

        println!("{}", "=== CyberFlux simulator ===".bold());
        let rows = vec![
            vec![
                "Clients".cell().bold(true),
                format!("{} - {}", arrival.clients_min, arrival.clients_max).cell(),
            ],
            vec![
                "Open hours".cell().bold(true),
                format!(
                    "{} ({} per hour)",
                    arrival.open_hours,
                    format_duration(arrival.hour_length)
                )
                .cell(),
            ],
            vec!["Mode".cell().bold(true), simulation.mode.cell()],
            vec![
                "Verbosity".cell().bold(true),
                match config.verbosity {
                    Verbosity::Summary => "summary",
                    Verbosity::Narrate => "narrate",
                }
                .cell(),
            ],
            vec![
                "Gate timeout".cell().bold(true),
                format_duration(simulation.gate_timeout).cell(),
            ],
            vec![
                "Backoff".cell().bold(true),
                format_duration(simulation.backoff).cell(),
            ],
            vec![
                "Service time".cell().bold(true),
                format!(
                    "{} - {}",
                    format_duration(arrival.service_time.min()),
                    format_duration(arrival.service_time.max())
                )
                .cell(),
            ],
            vec![
                "Resources".cell().bold(true),
                format!(
                    "{} compute slot(s), {} seat(s), {} VR headset(s)",
                    capacities.compute_slots, capacities.seats, capacities.headsets
                )
                .cell(),
            ],
            vec![
                "Near-deadlock alerts".cell().bold(true),
                if simulation.near_deadlock_alerts {
                    "yes"
                } else {
                    "no"
                }
                .cell(),
            ],
            vec![
                "Seed".cell().bold(true),
                arrival
                    .seed
                    .map(|seed| seed.to_string())
                    .unwrap_or_else(|| "random".to_string())
                    .cell(),
            ],
        ];
        self.print_vertical_table(rows);
    }

    fn print_report(&self, _config: &RunConfig, report: &RunReport) {
        let stats = &report.summary.stats;

        println!("\n{}", "--- Final statistics ---".bold());
        let mut rows = vec![
            vec![
                "Clients created".cell().bold(true),
                format!("{} (of {} planned)", report.summary.created, report.planned).cell(),
            ],
            vec![
                "Clients served".cell().bold(true),
                stats
                    .total_served
                    .to_string()
                    .color(colored::Color::Green)
                    .cell(),
            ],
            vec![
                "Clients abandoned".cell().bold(true),
                if stats.total_abandoned > 0 {
                    stats
                        .total_abandoned
                        .to_string()
                        .color(colored::Color::Red)
                        .to_string()
                } else {
                    stats.total_abandoned.to_string()
                }
                .cell(),
            ],
            vec![
                "Average wait (ms)".cell().bold(true),
                format_millis(stats.average_wait()).cell(),
            ],
        ];
        for (kind, uses) in stats.resource_usage.iter() {
            rows.push(vec![
                format!("Total {kind} uses").cell().bold(true),
                uses.cell(),
            ]);
        }
        rows.push(vec![
            "Duration".cell().bold(true),
            format_duration(round_to_millis(report.duration)).cell(),
        ]);
        self.print_vertical_table(rows);

        let rows = ClientKind::ALL
            .iter()
            .map(|kind| {
                vec![
                    kind.cell(),
                    stats.served_by_kind.get(*kind).cell().justify(Justify::Right),
                    stats
                        .abandoned_by_kind
                        .get(*kind)
                        .cell()
                        .justify(Justify::Right),
                ]
            })
            .collect();
        let header = vec![
            "Client".cell().bold(true),
            "Served".cell().bold(true),
            "Abandoned".cell().bold(true),
        ];
        self.print_horizontal_table(rows, header);
        println!("Simulation finished.");
    }

    fn print_error(&self, error: anyhow::Error) {
        log::error!("{error:?}");
    }
}

fn round_to_millis(duration: std::time::Duration) -> std::time::Duration {
    std::time::Duration::from_millis(duration.as_millis() as u64)
}
