use anyhow::Result;

pub const USAGE: &str = "\
usage: rover [status|thresholds|apply-thresholds] [--config <path>] [--json]

  status            read identity, live values and settings (default)
  thresholds        compute protection voltages from the battery section
  apply-thresholds  compute and write protection voltages to the controller";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Status,
    Thresholds,
    ApplyThresholds,
    Help,
}

impl Mode {
    /// Whether the mode talks to the controller.
    pub fn needs_device(&self) -> bool {
        matches!(self, Mode::Status | Mode::ApplyThresholds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliArgs {
    pub mode: Mode,
    pub config_path: Option<String>,
    pub json: bool,
}

/// Scans the arguments after the program name.
pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut mode_seen = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("--config needs a path"))?;
            parsed.config_path = Some(path);
            continue;
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            parsed.config_path = Some(path.to_string());
            continue;
        }

        let mode = match arg.as_str() {
            "--json" => {
                parsed.json = true;
                continue;
            }
            "-h" | "--help" | "help" => Mode::Help,
            "status" => Mode::Status,
            "thresholds" => Mode::Thresholds,
            "apply-thresholds" => Mode::ApplyThresholds,
            other => anyhow::bail!("unexpected argument '{other}'\n{USAGE}"),
        };
        // Help wins over any other mode word.
        if mode == Mode::Help || parsed.mode == Mode::Help {
            parsed.mode = Mode::Help;
        } else if mode_seen {
            anyhow::bail!("only one mode may be given\n{USAGE}");
        } else {
            parsed.mode = mode;
        }
        mode_seen = true;
    }

    Ok(parsed)
}
