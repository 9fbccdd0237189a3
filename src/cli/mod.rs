use crate::infra::ConfigOverrides;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui { overrides: ConfigOverrides },
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

/// Parses `args` including the program name in position 0. Help and version
/// flags win over everything else on the line.
pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().skip(1).any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args
        .iter()
        .skip(1)
        .any(|arg| arg == "--version" || arg == "-v" || arg == "-V")
    {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut overrides = ConfigOverrides::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--api-url" | "-u" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--api-url".to_string()))?;
                overrides.api_url = Some(value.to_string());
            }
            "--timeout" | "-t" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--timeout".to_string()))?;
                overrides.timeout_secs = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(arg.to_string()));
            }
            _ => return Err(CliParseError::UnexpectedArgument(arg.to_string())),
        }
    }

    Ok(CliInvocation::Tui { overrides })
}

pub fn help_text(name: &str) -> String {
    format!(
        "{name} · browse NIST CMVP validated cryptographic modules\n\n\
USAGE:\n  {name} [--api-url URL] [--timeout SECS]   Start the TUI\n  {name} --help | --version\n\n\
FLAGS:\n  -u, --api-url URL   Catalog API base URL (default: {default_url})\n  \
-t, --timeout SECS  Request timeout in seconds (default: {default_timeout})\n  \
-h, --help          Print this help\n  -v, --version       Print the version\n\n\
ENV:\n  CMVP_API_URL        Same as --api-url\n  CMVP_TIMEOUT_SECS   Same as --timeout\n  \
CMVP_LOG            Log filter, e.g. info or cmvp=debug (logging is off unless set)\n  \
CMVP_LOG_FILE       Log file path (default: <state dir>/cmvp/cmvp.log)\n",
        default_url = crate::infra::DEFAULT_API_URL,
        default_timeout = crate::infra::DEFAULT_TIMEOUT_SECS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn parse_defaults_to_tui_when_no_args() {
        let parsed = parse_invocation(&args(&["cmvp"])).expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Tui {
                overrides: ConfigOverrides::default()
            }
        );
    }

    #[test]
    fn parse_version_flags() {
        for flag in ["--version", "-v", "-V"] {
            let parsed = parse_invocation(&args(&["cmvp", flag])).expect("parse");
            assert_eq!(parsed, CliInvocation::PrintVersion, "{flag}");
        }
    }

    #[test]
    fn parse_help_flag_wins() {
        let parsed =
            parse_invocation(&args(&["cmvp", "--version", "--help", "--bogus"])).expect("parse");
        assert_eq!(parsed, CliInvocation::PrintHelp);
    }

    #[test]
    fn parse_config_flags() {
        let parsed = parse_invocation(&args(&[
            "cmvp",
            "--api-url",
            "http://127.0.0.1:9000/api",
            "-t",
            "10",
        ]))
        .expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Tui {
                overrides: ConfigOverrides {
                    api_url: Some("http://127.0.0.1:9000/api".to_string()),
                    timeout_secs: Some("10".to_string()),
                }
            }
        );
    }

    #[test]
    fn parse_rejects_bad_arguments() {
        assert!(matches!(
            parse_invocation(&args(&["cmvp", "--api-url"])),
            Err(CliParseError::MissingFlagValue(flag)) if flag == "--api-url"
        ));
        assert!(matches!(
            parse_invocation(&args(&["cmvp", "--engine", "x"])),
            Err(CliParseError::UnknownFlag(flag)) if flag == "--engine"
        ));
        assert!(matches!(
            parse_invocation(&args(&["cmvp", "modules"])),
            Err(CliParseError::UnexpectedArgument(arg)) if arg == "modules"
        ));
    }

    #[test]
    fn help_text_mentions_environment() {
        let text = help_text("cmvp");
        assert!(text.contains("--api-url"));
        assert!(text.contains("CMVP_API_URL"));
        assert!(text.contains("CMVP_LOG_FILE"));
    }
}
