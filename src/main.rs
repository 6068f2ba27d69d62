use std::process::ExitCode;

use gesture_particles::{run, AppConfig, AppError};

const USAGE: &str = "usage: gesture-particles [CONFIG.json]\n       gesture-particles --write-config PATH";

fn main() -> ExitCode {
    // RUST_LOG=debug for shape regeneration details
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match start(std::env::args().skip(1).collect()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// What the command line asks for.
#[derive(Debug, PartialEq)]
enum Command {
    Run(Option<String>),
    WriteConfig(String),
    Help,
    Usage,
}

fn parse_args(args: &[String]) -> Command {
    match args {
        [] => Command::Run(None),
        [flag] if flag == "--help" || flag == "-h" => Command::Help,
        [flag, path] if flag == "--write-config" && !path.starts_with('-') => {
            Command::WriteConfig(path.clone())
        }
        [path] if !path.starts_with('-') => Command::Run(Some(path.clone())),
        _ => Command::Usage,
    }
}

fn start(args: Vec<String>) -> Result<ExitCode, AppError> {
    match parse_args(&args) {
        Command::Run(None) => run(AppConfig::default())?,
        Command::Run(Some(path)) => {
            let config = AppConfig::load(&path)?;
            log::info!("loaded configuration from {}", path);
            run(config)?;
        }
        Command::WriteConfig(path) => {
            AppConfig::default().save(&path)?;
            log::info!("wrote default configuration to {}", path);
        }
        Command::Help => println!("{}", USAGE),
        Command::Usage => {
            eprintln!("{}", USAGE);
            return Ok(ExitCode::from(2));
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flags_are_not_config_paths() {
        assert_eq!(parse_args(&args(&["--write-config"])), Command::Usage);
        assert_eq!(parse_args(&args(&["--verbose"])), Command::Usage);
        assert_eq!(parse_args(&args(&["--write-config", "--help"])), Command::Usage);
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(&[]), Command::Run(None));
        assert_eq!(parse_args(&args(&["-h"])), Command::Help);
        assert_eq!(
            parse_args(&args(&["scene.json"])),
            Command::Run(Some("scene.json".into()))
        );
        assert_eq!(
            parse_args(&args(&["--write-config", "out.json"])),
            Command::WriteConfig("out.json".into())
        );
        assert_eq!(parse_args(&args(&["a.json", "b.json"])), Command::Usage);
    }
}
