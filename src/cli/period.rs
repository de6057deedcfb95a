use std::collections::BTreeSet;

use ansi_term::Colour::{Fixed, Green, Purple};
use chrono::{DateTime, Local, Utc};

use crate::{
    cycle::{
        entities::{CycleRecord, FlowLevel},
        lifecycle::PeriodState,
        phase::{Phase, PhaseReport},
        stats::CycleStats,
        tracker::CycleTracker,
    },
    error::TrackerResult,
    storage::record_store::RecordStore,
};

const NO_DATA: &str = "--";

fn local_date(moment: DateTime<Utc>) -> String {
    moment.with_timezone(&Local).format("%x").to_string()
}

fn notice(message: &str) {
    println!("{}", Green.paint(message));
}

pub async fn start(tracker: &mut CycleTracker<impl RecordStore>) -> TrackerResult<()> {
    tracker.start_period().await?;
    notice("Period started - tracking your cycle!");
    print_status(tracker);
    Ok(())
}

pub async fn end(tracker: &mut CycleTracker<impl RecordStore>) -> TrackerResult<()> {
    tracker.end_period().await?;
    notice("Period ended - cycle recorded!");
    print_stats(&tracker.stats());
    Ok(())
}

pub async fn log(
    tracker: &mut CycleTracker<impl RecordStore>,
    symptoms: Vec<String>,
    flow: Option<FlowLevel>,
    note: Option<String>,
) -> TrackerResult<()> {
    let symptoms = symptoms
        .into_iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>();
    let log = tracker.log_symptoms(symptoms, flow, note).await?;
    if tracker.state().state() == PeriodState::Active {
        notice("Symptoms logged for the current period!");
    } else {
        notice("Symptoms logged!");
    }
    if !log.symptoms.is_empty() {
        println!("{}", log.symptoms.iter().cloned().collect::<Vec<_>>().join(", "));
    }
    Ok(())
}

pub async fn delete(tracker: &mut CycleTracker<impl RecordStore>, index: usize) -> TrackerResult<()> {
    tracker.delete_cycle(index).await?;
    notice("Cycle record deleted");
    print_history(tracker.state().cycles.as_slice());
    Ok(())
}

pub fn print_status(tracker: &CycleTracker<impl RecordStore>) {
    match (tracker.active_day(), tracker.state().current_period.as_ref()) {
        (Some(day), Some(period)) => println!(
            "{}\tDay {day}\tstarted {}",
            Purple.bold().paint("Period in progress"),
            local_date(period.start_date)
        ),
        _ => println!("No active period. Run `bloomlog start` to begin tracking"),
    }
    println!();

    match tracker.phase() {
        Some(report) => print_phase(&report),
        None => println!("Start tracking to see your cycle phases"),
    }
}

fn print_phase(report: &PhaseReport) {
    for phase in Phase::ALL {
        let days = phase.days(report.cycle_length);
        let line = format!(
            "{:<12}days {}-{}",
            phase.to_string(),
            days.start(),
            days.end()
        );
        if report.phase == Some(phase) {
            println!("{} <", Purple.bold().paint(line));
        } else {
            println!("{}", Fixed(245).paint(line));
        }
    }
    println!();

    let Some(phase) = report.phase else {
        println!(
            "Day {} is past the expected {} day cycle",
            report.current_day, report.cycle_length
        );
        return;
    };
    let info = phase.info();
    println!(
        "{}",
        Purple
            .bold()
            .paint(format!("Day {} - {}", report.current_day, info.name))
    );
    println!("{}", info.description);
    println!("{}", Fixed(245).paint(info.tip));
}

pub fn print_stats(stats: &CycleStats) {
    let days = |value: Option<u32>| value.map_or_else(|| NO_DATA.to_string(), |v| format!("{v} days"));

    println!("Total cycles\t\t{}", stats.total_cycles);
    println!("Average cycle length\t{}", days(stats.average_cycle_length));
    println!("Average period length\t{}", days(stats.average_period_length));
    match stats.next_period {
        Some(next) => println!(
            "Next period\t\t{} ({})",
            next.predicted.with_timezone(&Local).format("%b %e"),
            next.countdown()
        ),
        None => println!("Next period\t\t{NO_DATA}"),
    }
}

pub fn print_history(cycles: &[CycleRecord]) {
    if cycles.is_empty() {
        println!("No cycle data yet. Start tracking to see your history!");
        return;
    }
    for (index, cycle) in cycles.iter().enumerate() {
        println!("{}", format_history_entry(index, cycle));
    }
}

fn format_history_entry(index: usize, cycle: &CycleRecord) -> String {
    let end = cycle
        .end_date
        .map_or_else(|| "present".to_string(), local_date);
    let duration = match cycle.period_length_days() {
        Some(1) => "1 day".to_string(),
        Some(days) => format!("{days} days"),
        None => "ongoing".to_string(),
    };
    let mut line = format!(
        "[{index}]\t{} - {end}\t{duration}",
        local_date(cycle.start_date)
    );
    if !cycle.symptom_logs.is_empty() {
        line += &format!("\t{} symptom logs", cycle.symptom_logs.len());
    }
    line
}
