use std::env;

use anyhow::{Context, Result};
use tracing::info;

use modbus_client::ModbusClient;
use rover_cli::{parse_args, run_apply_thresholds, run_status, run_thresholds, Mode, RoverConfig, USAGE};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = parse_args(env::args().skip(1))?;
    if args.mode == Mode::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = RoverConfig::load_with_path(args.config_path).context("load config failed")?;
    config.validate().context("config validation failed")?;

    let output = if args.mode.needs_device() {
        let mut client = ModbusClient::connect(config.serial.clone())
            .with_context(|| format!("open {}", config.serial.path))?;
        info!(path = %config.serial.path, slave_id = config.serial.slave_id, "connected");
        if args.mode == Mode::ApplyThresholds {
            run_apply_thresholds(&mut client, &config, args.json)?
        } else {
            run_status(&mut client, args.json)?
        }
    } else {
        run_thresholds(&config, args.json)?
    };

    print!("{output}");
    if args.json {
        println!();
    }
    Ok(())
}
