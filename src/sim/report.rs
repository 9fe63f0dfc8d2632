use log::info;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::SimConfig;
use crate::core::{Event, EventKind, Report, Stats};
use crate::error::SimError;

pub fn write_scheduler_log(events: &[Event], mut out: impl Write) -> io::Result<()> {
    writeln!(out, "#At time x process y state arr w total z remain y wait k")?;
    for event in events {
        writeln!(out, "{event}")?;
    }
    Ok(())
}

pub fn write_memory_log(events: &[Event], mut out: impl Write) -> io::Result<()> {
    writeln!(out, "#At time x allocated y bytes for process z from i to j")?;
    for event in events {
        let (verb, relation) = match event.kind {
            EventKind::Start => ("allocated", "for"),
            EventKind::Finish { .. } => ("freed", "from"),
            EventKind::Stop | EventKind::Resume => continue,
        };
        let Some(addr) = event.memory_address else {
            continue;
        };
        writeln!(
            out,
            "At time {} {verb} {} bytes {relation} process {} from {} to {}",
            event.time,
            event.requested_memory,
            event.process,
            addr,
            addr + event.allocated_memory - 1
        )?;
    }
    Ok(())
}

pub fn write_perf(stats: &Stats, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "CPU utilization = {:.2}%", stats.cpu_utilization)?;
    writeln!(out, "Avg WTA = {:.2}", stats.avg_wta)?;
    writeln!(out, "Std WTA = {:.2}", stats.std_wta)?;
    writeln!(out, "Avg Waiting = {:.2}", stats.avg_waiting)?;
    writeln!(out, "Std Waiting = {:.2}", stats.std_waiting)?;
    Ok(())
}

/// Writes the scheduler log, memory log and performance summary into the
/// configured output directory.
pub fn write_reports(report: &Report, config: &SimConfig) -> Result<(), SimError> {
    fs::create_dir_all(&config.out_dir)?;

    let write = |name: &str, f: &dyn Fn(&mut BufWriter<File>) -> io::Result<()>| -> Result<(), SimError> {
        let path = config.out_dir.join(name);
        let mut out = BufWriter::new(File::create(&path)?);
        f(&mut out)?;
        out.flush()?;
        info!("wrote {}", path.display());
        Ok(())
    };

    write(&config.scheduler_log, &|out| write_scheduler_log(&report.events, out))?;
    write(&config.memory_log, &|out| write_memory_log(&report.events, out))?;
    write(&config.perf_file, &|out| write_perf(&report.stats, out))?;
    Ok(())
}

pub fn print_summary(stats: &Stats, path: Option<&Path>) {
    if let Some(path) = path {
        println!("Workload: {}", path.display());
    }
    println!("Processes finished: {}", stats.finished);
    println!("CPU utilization = {:.2}%", stats.cpu_utilization);
    println!("Avg WTA = {:.2}", stats.avg_wta);
    println!("Std WTA = {:.2}", stats.std_wta);
    println!("Avg Waiting = {:.2}", stats.avg_waiting);
    println!("Std Waiting = {:.2}", stats.std_waiting);
}
