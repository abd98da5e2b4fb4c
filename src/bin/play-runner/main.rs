use std::process::ExitCode;

use clap::Parser;
use clap::builder::FalseyValueParser;
use log::{debug, info};

use play_runner::commands::{CommandBuilder, Programs};
use play_runner::env::{Environment, ProcessEnvironment};
use play_runner::invoker::{PrintInvoker, ProcessInvoker};
use play_runner::report::Reporter;
use play_runner::runner::{RunReport, Runner};
use play_runner::{CHECK_MODE_VAR, load_config, logger, parse_playbook_filter};

#[derive(Parser, Debug)]
#[command(
    name = "play-runner",
    version,
    about = "Run ansible-galaxy and ansible-playbook as described by a config file"
)]
struct Cli {
    /// Path to config file (auto-detected if not specified)
    #[arg(short, long, env = "PLAY_RUNNER_CONFIG")]
    config: Option<String>,

    /// Only run these playbooks, separated by `,` or `;`
    #[arg(short, long, env = "PLAY_RUNNER_PLAYBOOKS", default_value = "")]
    playbooks: String,

    /// Print debug output
    #[arg(
        short,
        long,
        env = "PLAY_RUNNER_DEBUG",
        action = clap::ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    debug: bool,

    /// Run playbooks in check mode (also enabled by ANSIBLE_CHECK_MODE)
    #[arg(short = 'C', long)]
    check: bool,

    /// Program used for dependency installation
    #[arg(long, env = "PLAY_RUNNER_GALAXY_BIN", default_value = "ansible-galaxy")]
    galaxy_bin: String,

    /// Program used for playbook runs
    #[arg(long, env = "PLAY_RUNNER_PLAYBOOK_BIN", default_value = "ansible-playbook")]
    playbook_bin: String,

    /// Suppress stdout/stderr for commands that pass
    #[arg(long)]
    mute_success: bool,

    /// Print the commands instead of running them
    #[arg(long)]
    print_only: bool,

    /// Log file path (log lines are written to stderr as well)
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .as_ref()
        .map(std::fs::File::create)
        .transpose()?;
    let rust_log = std::env::var("RUST_LOG").ok();
    logger::init(logger::level_filter(rust_log.as_deref(), cli.debug), log_file)?;

    let (config, config_path) = load_config(cli.config.as_deref())?;
    info!(
        "Loaded {} playbook(s) from {}",
        config.entries.len(),
        config_path.display()
    );

    let filter = parse_playbook_filter(&cli.playbooks);
    let check_mode = cli.check || ProcessEnvironment.flag(CHECK_MODE_VAR);
    let builder = CommandBuilder::new(
        Programs {
            galaxy: cli.galaxy_bin,
            playbook: cli.playbook_bin,
        },
        check_mode,
    );

    let report: RunReport = if cli.print_only {
        let invoker = PrintInvoker::new(std::io::stdout());
        let mut runner = Runner::new(builder, ProcessEnvironment, invoker);
        runner.run(&config, &filter)?
    } else {
        let mut runner = Runner::new(
            builder,
            ProcessEnvironment,
            ProcessInvoker::new(cli.mute_success),
        )
        .with_reporter(Reporter::stderr().streaming_output(!cli.mute_success));
        runner.run(&config, &filter)?
    };

    if report.exit_code() == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        debug!("Exiting with a non-zero exit code");
        Ok(ExitCode::FAILURE)
    }
}
