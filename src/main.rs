use anyhow::Context;
use clap::{Parser, Subcommand};
use p1_rs::{
    encode, init_logger_with_level, log_info, parse_telegram, read_capture_file, shutdown_signal,
    Config, InfluxClient, InfluxConfig, MeterReader, P1Port, ReaderSettings, SerialConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "p1-cli")]
#[command(about = "Read DSMR P1 smart meter telegrams and export them to InfluxDB")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the meter and write every reading to InfluxDB (default)
    Run,
    /// Read one telegram from the serial port and print it as line protocol
    Read,
    /// Parse a captured telegram file and print it as line protocol
    Parse {
        file: PathBuf,
        /// Print the extracted record as JSON instead
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger_with_level(&cli.config.log_level);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(cli.config).await,
        Commands::Read => read_one(cli.config).await,
        Commands::Parse { file, json } => parse_file(file, json).await,
    }
}

async fn open_port(config: &Config) -> anyhow::Result<P1Port> {
    P1Port::connect_with_config(
        &config.serial_port,
        SerialConfig {
            baudrate: config.baud_rate,
        },
    )
    .await
    .with_context(|| format!("Failed to initialize P1 reader on {}", config.serial_port))
}

async fn run(config: Config) -> anyhow::Result<()> {
    config.validate().context("Configuration error")?;

    let port = open_port(&config).await?;
    let client = InfluxClient::connect(InfluxConfig::from(&config))
        .await
        .with_context(|| format!("Failed to initialize InfluxDB client at {}", config.influxdb_url))?;

    log_info(&format!(
        "Reading {} at {} baud into database {}",
        config.serial_port,
        config.baud_rate,
        client.database()
    ));

    let mut reader = MeterReader::new(port, client, ReaderSettings::from(&config));
    reader.run_until(shutdown_signal()).await?;
    Ok(())
}

async fn read_one(config: Config) -> anyhow::Result<()> {
    let mut port = open_port(&config).await?;
    let telegram = tokio::time::timeout(config.read_timeout(), port.read_telegram())
        .await
        .context("Timed out waiting for telegram")?
        .context("Error reading telegram")?;

    println!("{}", encode(&parse_telegram(&telegram)));
    Ok(())
}

async fn parse_file(file: PathBuf, json: bool) -> anyhow::Result<()> {
    let telegram = read_capture_file(&file)
        .await
        .with_context(|| format!("Error reading telegram from {}", file.display()))?;
    let record = parse_telegram(&telegram);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", encode(&record));
    }
    Ok(())
}
