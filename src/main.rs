use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use brokerwatch::{print_listing, LineEmitter, Monitor, Overrides, RabbitMqSource, Settings};
use brokerwatch_adapters::rabbitmq::ObjectKind;
use brokerwatch_adapters::{ConnectionDetailProjector, ConnectionProjector};

#[derive(Parser, Debug)]
#[command(name = "brokerwatch")]
#[command(about = "Stream changes in RabbitMQ queue and connection state")]
struct Cli {
    /// Path to a TOML config file (keys: endpoint, username, password, vhost, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll queues and print each changed queue as
    /// `<timestamp> <name> <state> <messages_ready> <messages_unacknowledged>`
    Queues {
        #[command(flatten)]
        broker: BrokerArgs,

        /// Only watch this queue
        #[arg(short, long)]
        queue: Option<String>,

        #[command(flatten)]
        poll: PollArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Poll connections and print each changed connection as
    /// `<timestamp> <name> <state> <send_rate> <recv_rate>`
    Connections {
        #[command(flatten)]
        broker: BrokerArgs,

        /// Only watch this connection, e.g. "127.0.0.1:46542 -> 127.0.0.1:5672"
        #[arg(short, long)]
        connection: Option<String>,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Print `<name> <state> <messages_ready> <messages_unacknowledged>` for every queue once
    QueueInfo {
        #[command(flatten)]
        broker: BrokerArgs,

        /// Only show this queue
        #[arg(short, long)]
        queue: Option<String>,
    },

    /// Print `<name> <state> <channels> <send_rate> <recv_rate>` for every connection once
    ConnectionInfo {
        #[command(flatten)]
        broker: BrokerArgs,

        /// Only show this connection
        #[arg(short, long)]
        connection: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Queues { .. } => "queues",
            Command::Connections { .. } => "connections",
            Command::QueueInfo { .. } => "queue-info",
            Command::ConnectionInfo { .. } => "connection-info",
        }
    }

    fn overrides(&self) -> Overrides {
        let (broker, poll, filter) = match self {
            Command::Queues {
                broker, poll, filter, ..
            } => (broker, Some(poll), Some(filter)),
            Command::Connections { broker, poll, .. } => (broker, Some(poll), None),
            Command::QueueInfo { broker, .. } | Command::ConnectionInfo { broker, .. } => {
                (broker, None, None)
            }
        };

        Overrides {
            endpoint: broker.endpoint.clone(),
            username: broker.username.clone(),
            password: broker.passwd.clone(),
            vhost: broker.vhost.clone(),
            interval_secs: poll.and_then(|p| p.interval),
            timeout_secs: broker.timeout,
            insecure: broker.insecure,
            exclude_prefix: filter.and_then(|f| f.exclude_prefix.clone()),
            no_exclude: filter.is_some_and(|f| f.no_exclude),
        }
    }
}

#[derive(Args, Debug)]
struct BrokerArgs {
    /// Management API base URL, e.g. "https://mozart.example.org:15673"
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Username for the management API (default: guest)
    #[arg(short, long)]
    username: Option<String>,

    /// Password for the management API (default: guest)
    #[arg(short, long)]
    passwd: Option<String>,

    /// Virtual host for queue listings (default: "/")
    #[arg(long)]
    vhost: Option<String>,

    /// Request timeout in seconds (default: 10)
    #[arg(long)]
    timeout: Option<u64>,

    /// Accept invalid TLS certificates from the management endpoint
    #[arg(long)]
    insecure: bool,
}

#[derive(Args, Debug)]
struct PollArgs {
    /// Seconds to sleep between polls (default: 10)
    #[arg(short, long)]
    interval: Option<u64>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Skip queues whose name starts with this prefix (default: "celery")
    #[arg(long, conflicts_with = "no_exclude")]
    exclude_prefix: Option<String>,

    /// Track every queue, including celery's
    #[arg(long)]
    no_exclude: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match Settings::load(cli.config.as_deref(), &cli.command.overrides()) {
        Ok(settings) => settings,
        Err(err) if err.is_usage() => exit_with_usage(&cli.command, &err),
        Err(err) => return Err(err.into()),
    };

    // One poll at a time: a single-threaded runtime is all the loop needs
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = rt.block_on(run(cli.command, settings));
    if let Err(ref err) = result {
        error!("{:#}", err);
    }
    result
}

async fn run(command: Command, settings: Settings) -> Result<()> {
    let adapter = settings.adapter()?;

    match command {
        Command::Queues { queue, .. } => {
            let source = RabbitMqSource::new(adapter, ObjectKind::Queues);
            let monitor = Monitor::new(source, settings.queue_projector(), LineEmitter::stdout())
                .interval(settings.interval());
            match queue {
                Some(queue) => monitor.target(queue).run().await?,
                None => monitor.run().await?,
            }
        }
        Command::Connections { connection, .. } => {
            let source = RabbitMqSource::new(adapter, ObjectKind::Connections);
            let monitor = Monitor::new(source, ConnectionProjector, LineEmitter::stdout())
                .interval(settings.interval());
            match connection {
                Some(connection) => monitor.target(connection).run().await?,
                None => monitor.run().await?,
            }
        }
        Command::QueueInfo { queue, .. } => {
            let source = RabbitMqSource::new(adapter, ObjectKind::Queues);
            print_listing(
                &source,
                &settings.queue_projector(),
                queue.as_deref(),
                &mut LineEmitter::stdout(),
            )
            .await?;
        }
        Command::ConnectionInfo { connection, .. } => {
            let source = RabbitMqSource::new(adapter, ObjectKind::Connections);
            print_listing(
                &source,
                &ConnectionDetailProjector,
                connection.as_deref(),
                &mut LineEmitter::stdout(),
            )
            .await?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only change lines.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print the subcommand's usage to stderr and exit with status 2.
fn exit_with_usage(command: &Command, err: &brokerwatch::SettingsError) -> ! {
    let mut cmd = Cli::command();
    eprintln!("error: {}\n", err);
    match cmd.find_subcommand_mut(command.name()) {
        Some(sub) => eprintln!("{}", sub.render_help()),
        None => eprintln!("{}", cmd.render_usage()),
    }
    std::process::exit(2)
}
