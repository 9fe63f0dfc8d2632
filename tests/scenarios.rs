use srtn_sim::{
    Event, EventKind, Job, Sim,
    mem::POOL_SIZE,
    sim::{GeneratorConfig, generate_workload},
};
use std::collections::HashMap;
use test_log::test;

fn job(id: u32, arrival_time: u64, run_time: u64, mem_size: u32) -> Job {
    Job {
        id,
        arrival_time,
        run_time,
        priority: 0,
        mem_size,
    }
}

/// (process, from, to) for every stretch a process held the CPU.
fn gantt(events: &[Event]) -> Vec<(u32, u64, u64)> {
    let mut open: Option<(u32, u64)> = None;
    let mut intervals = Vec::new();
    for event in events {
        match event.kind {
            EventKind::Start | EventKind::Resume => {
                assert!(open.is_none(), "process {} dispatched while another runs", event.process);
                open = Some((event.process, event.time));
            }
            EventKind::Stop | EventKind::Finish { .. } => {
                let (process, from) = open.take().expect("stop/finish with nothing running");
                assert_eq!(process, event.process);
                intervals.push((process, from, event.time));
            }
        }
    }
    intervals
}

fn finishes(events: &[Event]) -> Vec<&Event> {
    events.iter().filter(|e| e.is_finish()).collect()
}

#[test]
fn classic_srtf_trace() {
    let jobs = vec![job(1, 0, 8, 10), job(2, 1, 4, 10), job(3, 2, 9, 10), job(4, 3, 5, 10)];
    let report = Sim::new(jobs).run().unwrap();

    assert_eq!(
        gantt(&report.events),
        vec![(1, 0, 1), (2, 1, 5), (4, 5, 10), (1, 10, 17), (3, 17, 26)]
    );

    let done: Vec<(u32, u64, u64)> = finishes(&report.events)
        .iter()
        .map(|e| (e.process, e.wait_time, e.time - e.arrival_time))
        .collect();
    assert_eq!(done, vec![(2, 0, 4), (4, 2, 7), (1, 9, 17), (3, 15, 24)]);
    assert!(finishes(&report.events).iter().all(|e| e.remaining_time == 0));

    let stop = &report.events[1];
    assert_eq!((stop.kind, stop.time, stop.remaining_time), (EventKind::Stop, 1, 7));
    let resume = report.events.iter().find(|e| e.kind == EventKind::Resume).unwrap();
    assert_eq!((resume.process, resume.remaining_time, resume.wait_time), (1, 7, 9));

    let stats = &report.stats;
    assert_eq!(stats.finished, 4);
    assert_eq!(stats.elapsed, 26);
    assert!((stats.cpu_utilization - 100.0).abs() < 1e-9);
    assert!((stats.avg_waiting - 6.5).abs() < 1e-9);
    let avg_wta = (1.0 + 7.0 / 5.0 + 17.0 / 8.0 + 24.0 / 9.0) / 4.0;
    assert!((stats.avg_wta - avg_wta).abs() < 1e-9);
}

#[test]
fn equal_runtime_does_not_preempt() {
    // At t=1 the running process has exactly 5 left, the newcomer needs 5
    let report = Sim::new(vec![job(1, 0, 6, 4), job(2, 1, 5, 4)]).run().unwrap();
    assert_eq!(gantt(&report.events), vec![(1, 0, 6), (2, 6, 11)]);
}

#[test]
fn idle_gap_lowers_utilization() {
    let report = Sim::new(vec![job(1, 2, 3, 4), job(2, 9, 1, 4)]).run().unwrap();
    assert_eq!(gantt(&report.events), vec![(1, 2, 5), (2, 9, 10)]);
    // Elapsed is measured from the first arrival
    assert_eq!(report.stats.elapsed, 8);
    assert!((report.stats.cpu_utilization - 50.0).abs() < 1e-9);
}

#[test]
fn full_pool_blocks_preemption_until_release() {
    let jobs = vec![
        job(1, 0, 40, 256),
        job(2, 1, 30, 256),
        job(3, 2, 20, 256),
        job(4, 3, 10, 256),
        job(5, 4, 1, 2),
    ];
    let report = Sim::new(jobs).run().unwrap();
    let events = &report.events;

    // Every 256 block is held by t=3; the short newcomer at t=4 must wait
    assert!(events.iter().all(|e| e.time != 4));
    let p4_finish = events.iter().position(|e| e.process == 4 && e.is_finish()).unwrap();
    let p5_start = &events[p4_finish + 1];
    assert_eq!((p5_start.process, p5_start.kind, p5_start.time), (5, EventKind::Start, 13));
    assert_eq!(p5_start.memory_address, Some(768));
    assert_eq!(p5_start.allocated_memory, 2);

    assert_eq!(
        gantt(events),
        vec![
            (1, 0, 1),
            (2, 1, 2),
            (3, 2, 3),
            (4, 3, 13),
            (5, 13, 14),
            (3, 14, 33),
            (2, 33, 62),
            (1, 62, 101)
        ]
    );
}

#[test]
fn rejected_dispatch_is_retried_after_memory_frees() {
    let jobs = vec![
        job(1, 0, 100, 256),
        job(2, 1, 90, 256),
        job(3, 2, 80, 256),
        job(4, 3, 40, 128),
        job(5, 4, 10, 100),
        job(6, 5, 2, 200),
    ];
    let report = Sim::new(jobs).run().unwrap();
    let events = &report.events;

    // P5 leaves 768..896 held by the stopped P4, so P6 cannot get a 256 block
    // when P5 finishes and P4 is resumed instead
    let at_14: Vec<(u32, EventKind)> = events.iter().filter(|e| e.time == 14).map(|e| (e.process, e.kind)).collect();
    assert_eq!(at_14.len(), 2);
    assert_eq!(at_14[0].0, 5);
    assert!(events[..].iter().any(|e| e.time == 14 && e.process == 4 && e.kind == EventKind::Resume));

    let p6_start = events
        .iter()
        .find(|e| e.process == 6 && e.kind == EventKind::Start)
        .unwrap();
    assert_eq!(p6_start.time, 53);
    assert_eq!(p6_start.memory_address, Some(768));
    assert_eq!(p6_start.wait_time, 48);

    let p4_finish = events.iter().find(|e| e.process == 4 && e.is_finish()).unwrap();
    assert_eq!(p4_finish.time, 53);
    assert_eq!(report.stats.finished, 6);
}

#[test]
fn random_workloads_hold_scheduling_invariants() {
    for seed in 0..25 {
        let jobs = generate_workload(&GeneratorConfig {
            count: 40,
            seed,
            max_gap: 3,
            max_run_time: 15,
            ..GeneratorConfig::default()
        });
        let runtimes: HashMap<u32, u64> = jobs.iter().map(|j| (j.id, j.run_time)).collect();
        let report = Sim::new(jobs).run().unwrap();
        let events = &report.events;

        // Single CPU, chronological log
        gantt(events);
        assert!(events.windows(2).all(|w| w[0].time <= w[1].time));

        let mut last_remaining: HashMap<u32, u64> = HashMap::new();
        let mut held: HashMap<u32, (u32, u32)> = HashMap::new();
        let mut finished = 0;

        for (i, event) in events.iter().enumerate() {
            if let Some(&previous) = last_remaining.get(&event.process) {
                assert!(event.remaining_time <= previous, "seed {seed}: remaining time grew for {}", event.process);
                if event.kind == EventKind::Resume {
                    assert_eq!(event.remaining_time, previous, "seed {seed}: remaining changed while stopped");
                }
            }
            last_remaining.insert(event.process, event.remaining_time);

            match event.kind {
                EventKind::Start => {
                    let addr = event.memory_address.unwrap();
                    let size = event.allocated_memory;
                    assert!(size >= event.requested_memory && size.is_power_of_two());
                    assert_eq!(addr % size, 0);
                    assert!(
                        held.values().all(|&(a, s)| addr + size <= a || a + s <= addr),
                        "seed {seed}: overlapping blocks"
                    );
                    held.insert(event.process, (addr, size));
                    let in_use: u32 = held.values().map(|&(_, s)| s).sum();
                    assert!(in_use <= POOL_SIZE);
                }
                EventKind::Stop => {
                    // Something is dispatched at the same instant. A fragmented pool may defer
                    // the shorter newcomer, but nothing longer than the stopped process runs.
                    let next = &events[i + 1];
                    assert_eq!(next.time, event.time);
                    assert!(matches!(next.kind, EventKind::Start | EventKind::Resume));
                    assert!(next.remaining_time <= event.remaining_time, "seed {seed}: unjustified preemption");
                }
                EventKind::Resume => {}
                EventKind::Finish {
                    turnaround,
                    weighted_turnaround,
                } => {
                    finished += 1;
                    assert_eq!(event.remaining_time, 0);
                    assert_eq!(event.run_time, runtimes[&event.process]);
                    assert_eq!(turnaround, event.time - event.arrival_time);
                    assert!((weighted_turnaround - turnaround as f64 / event.run_time as f64).abs() < 1e-9);
                    assert_eq!(held.remove(&event.process), event.memory_address.map(|a| (a, event.allocated_memory)));
                }
            }
        }

        assert_eq!(finished, 40, "seed {seed}");
        assert!(held.is_empty());
        assert_eq!(report.stats.finished, 40);
    }
}

#[test]
fn empty_workload_finishes_immediately() {
    let report = Sim::new(Vec::new()).run().unwrap();
    assert!(report.events.is_empty());
    assert_eq!(report.stats.finished, 0);
}

#[test]
fn oversized_job_is_refused_without_stalling_others() {
    let report = Sim::new(vec![job(1, 0, 3, 300), job(2, 0, 2, 4)]).run().unwrap();
    assert_eq!(report.rejected, vec![1]);
    assert_eq!(gantt(&report.events), vec![(2, 0, 2)]);
    assert_eq!(report.stats.finished, 1);
    assert_eq!(report.stats.elapsed, 2);
}

#[test]
fn huge_memory_request_is_refused() {
    let report = Sim::new(vec![job(1, 0, 3, (1 << 31) + 1), job(2, 1, 1, 8)]).run().unwrap();
    assert_eq!(report.rejected, vec![1]);
    assert_eq!(gantt(&report.events), vec![(2, 1, 2)]);
}

#[test]
fn zero_runtime_job_is_refused() {
    let report = Sim::new(vec![job(1, 0, 0, 4), job(2, 0, 4, 4)]).run().unwrap();
    assert_eq!(report.rejected, vec![1]);
    assert_eq!(report.stats.finished, 1);
    assert!(report.stats.avg_wta.is_finite());
    assert!((report.stats.avg_wta - 1.0).abs() < 1e-9);
}

#[test]
fn only_refused_jobs_finish_immediately() {
    let report = Sim::new(vec![job(1, 0, 0, 4), job(2, 3, 5, 0)]).run().unwrap();
    assert_eq!(report.rejected, vec![1, 2]);
    assert!(report.events.is_empty());
}
