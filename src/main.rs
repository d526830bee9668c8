use clap::Parser;
use std::{fs, path::Path, process};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::Cli;
use critpath::{
    cache::{CachedSchedule, cache_entry_key, content_digest, load_cache, lookup, save_cache},
    compute_critical_path,
    error::{CritpathError, Result},
    output::{OutputFormat, Report},
    schedule::Schedule,
    task::{ProjectConfiguration, parse_project, required_tasks},
    util::expand_project_files,
};

struct Analysis {
    file: String,
    config: ProjectConfiguration,
    target: Option<String>,
    schedule: Schedule,
}

impl Analysis {
    fn report(&self) -> Report<'_> {
        Report {
            file: self.file.clone(),
            project: self.config.name.as_deref(),
            target: self.target.as_deref(),
            schedule: &self.schedule,
            calendar: self.config.start_date.map(|d| self.schedule.calendar(d)),
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run_critpath(args) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_critpath(args: Cli) -> Result<()> {
    let files = expand_project_files(&args.file)?;

    let analyses = files
        .iter()
        .map(|path| analyze_file(&args, path))
        .collect::<Result<Vec<Analysis>>>()?;

    let format = args
        .format
        .clone()
        .or_else(|| analyses.iter().find_map(|a| a.config.format.clone()))
        .unwrap_or(OutputFormat::Text);

    let reports: Vec<Report<'_>> = analyses.iter().map(Analysis::report).collect();

    match (&format, reports.as_slice()) {
        (OutputFormat::Json, [single]) => println!("{}", single.render(&format)?),
        (OutputFormat::Json, _) => println!("{}", serde_json::to_string_pretty(&reports)?),
        (OutputFormat::Text, _) => {
            let rendered = reports
                .iter()
                .map(|r| r.render(&format))
                .collect::<Result<Vec<String>>>()?;
            print!("{}", rendered.join("\n"));
        }
    }

    Ok(())
}

fn analyze_file(args: &Cli, path: &Path) -> Result<Analysis> {
    let contents = fs::read_to_string(path)?;
    let config = parse_project(&contents)?;

    let target = args.task.clone().or_else(|| config.default_task.clone());
    let tasks = match target.as_deref() {
        Some(target_id) => required_tasks(&config.tasks, target_id)?,
        None => config.tasks.clone(),
    };

    let schedule = if args.no_cache {
        compute_critical_path(&tasks)?
    } else {
        cached_schedule(&config, path, &contents, target.as_deref(), &tasks)?
    };

    if args.strict {
        if let Some(invalid) = schedule.warnings.first() {
            return Err(CritpathError::InvalidEstimate(invalid.clone()));
        }
    }

    info!(
        file = %path.display(),
        tasks = schedule.tasks.len(),
        total_duration = schedule.total_duration,
        "analysed project"
    );

    Ok(Analysis {
        file: path.display().to_string(),
        config,
        target,
        schedule,
    })
}

fn cached_schedule(
    config: &ProjectConfiguration,
    path: &Path,
    contents: &str,
    target: Option<&str>,
    tasks: &[critpath::Task],
) -> Result<Schedule> {
    let cache_dir = config.cache_dir.as_deref();
    let mut cache = load_cache(cache_dir, path);
    let key = cache_entry_key(path, target);
    let digest = content_digest(contents, target);

    if let Some(schedule) = lookup(&cache, &key, &digest) {
        debug!(file = %path.display(), "using cached schedule");
        return Ok(schedule.clone());
    }

    let schedule = compute_critical_path(tasks)?;
    cache.insert(
        key,
        CachedSchedule {
            digest,
            schedule: schedule.clone(),
        },
    );
    save_cache(&cache, cache_dir, path);

    Ok(schedule)
}
