use std::env;
use std::process;

use perception_monitor::{
    ExperimentConfig, ExperimentController, Location, ScriptedAgent, ScriptedEnvironment,
    VoteTiming, VotingDecision,
};

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    agents: u64,
    objects: u64,
    max_ticks: u64,
    seed: u32,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            agents: 5,
            objects: 4,
            max_ticks: 50,
            seed: 42,
        }
    }
}

fn parse_options<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    while let Some(arg) = args.next() {
        let mut value_for = |name: &str| -> Result<&'a str, String> {
            args.next().ok_or_else(|| format!("missing value for {name}"))
        };
        match arg {
            "--agents" => {
                options.agents = value_for("--agents")?
                    .parse()
                    .map_err(|_| "invalid --agents value".to_string())?;
            }
            "--objects" => {
                options.objects = value_for("--objects")?
                    .parse()
                    .map_err(|_| "invalid --objects value".to_string())?;
            }
            "--max-ticks" => {
                options.max_ticks = value_for("--max-ticks")?
                    .parse()
                    .map_err(|_| "invalid --max-ticks value".to_string())?;
            }
            "--seed" => {
                options.seed = value_for("--seed")?
                    .parse()
                    .map_err(|_| "invalid --seed value".to_string())?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    if options.agents == 0 || options.objects == 0 {
        return Err("need at least one agent and one object".to_string());
    }
    Ok(options)
}

fn print_help() {
    eprintln!("usage: perception_monitor_demo [--agents N] [--objects N] [--max-ticks N] [--seed N]");
}

/// Builds a population where agent `i` finalizes a vote on object
/// `i % objects` at tick `i + 1`, so coverage grows tick by tick.
fn build_environment(options: &CliOptions) -> ScriptedEnvironment {
    let mut env = ScriptedEnvironment::new();
    let categories = ["A", "B"];

    for object in 0..options.objects {
        let category = categories[(object % 2) as usize];
        env.add_object(Location::new(object as f64, 0.0, 0.0), category);
    }

    for i in 0..options.agents {
        let mut agent = ScriptedAgent::new(format!("fb{i}"), i, 10, 5);
        let object = i % options.objects;
        agent.script_vote(
            i + 1,
            VotingDecision {
                location: Location::new(object as f64, 0.0, 0.0),
                category: categories[(object % 2) as usize].to_string(),
                radius: 0.5,
                timing: VoteTiming {
                    start: 0,
                    last_update: i + 1,
                },
            },
        );
        env.add_agent(agent);
    }
    env
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = match parse_options(args.iter().skip(1).map(|arg| arg.as_str())) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            print_help();
            process::exit(1);
        }
    };

    let config =
        ExperimentConfig::new(3, 10, 5, 4, options.seed).with_max_ticks(options.max_ticks);
    let mut env = build_environment(&options);

    let mut controller = match ExperimentController::setup(config, &mut env) {
        Ok(controller) => controller,
        Err(err) => {
            eprintln!("setup failed: {err}");
            process::exit(1);
        }
    };

    println!("population: {}", controller.population());
    println!("objects: {}", controller.registry().object_count());
    println!("storage capacity: {}", controller.total_storage_capacity());

    loop {
        env.advance();
        // Fake a little per-tick traffic so the load curve is non-trivial.
        for i in 0..options.agents {
            if let Some(agent) = env.agent_mut(&format!("fb{i}")) {
                agent.record_traffic(2, 48);
            }
        }
        let report = match controller.step(&mut env) {
            Ok(report) => report,
            Err(err) => {
                eprintln!("tick failed: {err}");
                process::exit(1);
            }
        };
        println!(
            "tick={} coverage={}/{} messages={} bytes={}",
            report.tick,
            report.coverage.voted,
            report.coverage.registered,
            report.summary.total_messages,
            report.summary.total_bytes_sent
        );
        if report.finished {
            break;
        }
    }

    if let Err(err) = controller.finish() {
        eprintln!("teardown failed: {err}");
        process::exit(1);
    }
    println!("finished; coverage {:?}", controller.coverage());
}
