use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use token_uncertainty::{DegeneratePolicy, LogTokUConfig};

pub const KAPPA_VAR: &str = "LOGTOKU_KAPPA";
pub const TOP_K_INCONFIDENT_VAR: &str = "LOGTOKU_TOP_K_INCONFIDENT";
pub const DEGENERATE_POLICY_VAR: &str = "LOGTOKU_DEGENERATE_POLICY";
pub const PARALLEL_VAR: &str = "LOGTOKU_PARALLEL";
pub const PRETTY_VAR: &str = "TRACE_SCORER_PRETTY";

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub logtoku: LogTokUConfig,
    /// Pretty-print each report instead of one JSON object per line
    pub pretty: bool,
}

impl ScorerConfig {
    /// Build the config from any key/value source (process env, CLI overrides, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kappa: usize = get(KAPPA_VAR)
            .with_context(|| {
                format!(
                    "{} not set (evidence width must be chosen explicitly)",
                    KAPPA_VAR
                )
            })?
            .trim()
            .parse()
            .with_context(|| format!("{} must be a positive integer", KAPPA_VAR))?;

        let top_k_inconfident = get(TOP_K_INCONFIDENT_VAR)
            .map(|v| v.trim().parse::<usize>())
            .transpose()
            .with_context(|| format!("{} must be a positive integer", TOP_K_INCONFIDENT_VAR))?;

        let degenerate_policy = get(DEGENERATE_POLICY_VAR)
            .map(|v| v.parse::<DegeneratePolicy>())
            .transpose()?
            .unwrap_or_default();

        let parallel = parse_flag(get(PARALLEL_VAR), PARALLEL_VAR)?;
        let pretty = parse_flag(get(PRETTY_VAR), PRETTY_VAR)?;

        let logtoku = LogTokUConfig::new(kappa, top_k_inconfident)?
            .with_degenerate_policy(degenerate_policy)
            .with_parallel(parallel);

        Ok(Self { logtoku, pretty })
    }
}

fn parse_flag(value: Option<String>, key: &str) -> Result<bool> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => bail!("{} must be a boolean, got '{}'", key, v),
        },
    }
}

/// Command line: input files plus flags that override the environment
#[derive(Debug, Default)]
pub struct CliArgs {
    pub overrides: HashMap<&'static str, String>,
    pub files: Vec<PathBuf>,
}

impl CliArgs {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut cli = CliArgs::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let key = match arg.as_str() {
                "--kappa" => KAPPA_VAR,
                "--top-k" | "--top-k-inconfident" => TOP_K_INCONFIDENT_VAR,
                "--degenerate" => DEGENERATE_POLICY_VAR,
                "--parallel" => {
                    cli.overrides.insert(PARALLEL_VAR, "true".to_string());
                    continue;
                }
                "--pretty" => {
                    cli.overrides.insert(PRETTY_VAR, "true".to_string());
                    continue;
                }
                flag if flag.starts_with("--") => bail!("unknown option '{}'", flag),
                path => {
                    cli.files.push(PathBuf::from(path));
                    continue;
                }
            };
            let value = iter
                .next()
                .with_context(|| format!("{} requires a value", arg))?;
            cli.overrides.insert(key, value.clone());
        }

        Ok(cli)
    }

    /// CLI flags first, then the given fallback (usually the process environment)
    pub fn lookup<'a, F>(&'a self, fallback: F) -> impl Fn(&str) -> Option<String> + 'a
    where
        F: Fn(&str) -> Option<String> + 'a,
    {
        move |key: &str| self.overrides.get(key).cloned().or_else(|| fallback(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_from_lookup() {
        let vars = env(&[
            (KAPPA_VAR, "10"),
            (TOP_K_INCONFIDENT_VAR, "5"),
            (DEGENERATE_POLICY_VAR, "reject"),
            (PARALLEL_VAR, "yes"),
        ]);
        let config = ScorerConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.logtoku.kappa, 10);
        assert_eq!(config.logtoku.top_k_inconfident, Some(5));
        assert_eq!(config.logtoku.degenerate_policy, DegeneratePolicy::Reject);
        assert!(config.logtoku.parallel);
        assert!(!config.pretty);
    }

    #[test]
    fn test_kappa_is_required() {
        let vars = env(&[(TOP_K_INCONFIDENT_VAR, "5")]);
        let err = ScorerConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains(KAPPA_VAR));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_kappa = env(&[(KAPPA_VAR, "five")]);
        assert!(ScorerConfig::from_lookup(|k| bad_kappa.get(k).cloned()).is_err());

        let zero_kappa = env(&[(KAPPA_VAR, "0")]);
        assert!(ScorerConfig::from_lookup(|k| zero_kappa.get(k).cloned()).is_err());

        let bad_flag = env(&[(KAPPA_VAR, "2"), (PARALLEL_VAR, "sometimes")]);
        assert!(ScorerConfig::from_lookup(|k| bad_flag.get(k).cloned()).is_err());
    }

    #[test]
    fn test_blank_optional_values_use_defaults() {
        let vars = env(&[(KAPPA_VAR, "3"), (TOP_K_INCONFIDENT_VAR, " ")]);
        let config = ScorerConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.logtoku.top_k_inconfident, None);
        assert_eq!(config.logtoku.degenerate_policy, DegeneratePolicy::MaxEpistemic);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = CliArgs::parse(&args(&[
            "--kappa", "5", "a.json", "--parallel", "b.json", "--top-k", "2",
        ]))
        .unwrap();

        assert_eq!(cli.files, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(cli.overrides.get(KAPPA_VAR).map(String::as_str), Some("5"));
        assert_eq!(cli.overrides.get(PARALLEL_VAR).map(String::as_str), Some("true"));
        assert_eq!(
            cli.overrides.get(TOP_K_INCONFIDENT_VAR).map(String::as_str),
            Some("2")
        );
    }

    #[test]
    fn test_cli_errors() {
        assert!(CliArgs::parse(&args(&["--bogus"])).is_err());
        assert!(CliArgs::parse(&args(&["a.json", "--kappa"])).is_err());
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let vars = env(&[(KAPPA_VAR, "10"), (TOP_K_INCONFIDENT_VAR, "4")]);
        let cli = CliArgs::parse(&args(&["--kappa", "3", "trace.json"])).unwrap();

        let config = ScorerConfig::from_lookup(cli.lookup(|k| vars.get(k).cloned())).unwrap();
        assert_eq!(config.logtoku.kappa, 3);
        assert_eq!(config.logtoku.top_k_inconfident, Some(4));
    }
}
