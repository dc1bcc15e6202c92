//! Command-line surface: global options and one subcommand per marketplace
//! action. Type coercion of IDs, amounts and env pairs happens here at parse
//! time; cross-field checks happen when the command becomes an
//! [`Invocation`](crate::dispatch::Invocation).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use vast_core::{ValidationError, DEFAULT_BASE_URL};

/// vast: rent and manage GPU instances from the command line
#[derive(Debug, Parser)]
#[command(name = "vast", version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// API base URL, including the version path
    #[arg(long, global = true, env = "VAST_URL", default_value = DEFAULT_BASE_URL)]
    pub url: String,

    /// API key sent as a bearer token
    #[arg(long, global = true, env = "VAST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Print the full JSON response instead of a summary
    #[arg(long, global = true)]
    pub raw: bool,

    /// Print the request payload before sending it
    #[arg(long, global = true)]
    pub explain: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Attach an SSH public key to an instance
    AttachSsh {
        #[arg(long)]
        instance_id: u64,

        /// Public key text, or a path to a .pub file
        #[arg(long)]
        ssh_key: Option<String>,
    },

    /// Detach an SSH key from an instance
    DetachSsh {
        #[arg(long)]
        instance_id: u64,

        #[arg(long)]
        ssh_key_id: u64,
    },

    /// Register an SSH public key on the account
    CreateSshKey {
        /// Public key text, or a path to a .pub file
        ssh_key: Option<String>,
    },

    /// Rent an offer and start an instance on it
    CreateInstance(CreateInstanceArgs),

    /// Destroy an instance; this is irreversible
    DestroyInstance { id: u64 },

    /// Prepay credits on an instance for a discount
    PrepayInstance { id: u64, amount: f64 },

    /// Reboot an instance without losing its GPU priority
    RebootInstance { id: u64 },

    /// Destroy and recreate an instance from a fresh image pull
    RecycleInstance { id: u64 },

    /// Start a stopped instance
    StartInstance { id: u64 },

    /// Stop a running instance
    StopInstance { id: u64 },

    /// Set the label of an instance
    LabelInstance { id: u64, label: String },

    /// List your instances
    ShowInstances,
}

#[derive(Debug, Args)]
pub struct CreateInstanceArgs {
    /// ID of the offer (ask) to rent
    pub id: u64,

    /// Docker image to launch
    #[arg(long)]
    pub image: Option<String>,

    /// Environment variable for the container, as KEY=VALUE; repeatable
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Bid price per hour for an interruptible instance
    #[arg(long)]
    pub price: Option<f64>,

    /// Disk size in GB
    #[arg(long, default_value_t = 10.0)]
    pub disk: f64,

    #[arg(long)]
    pub label: Option<String>,

    /// Extra docker run options
    #[arg(long)]
    pub extra: Option<String>,

    /// File whose contents run when the instance starts
    #[arg(long, value_name = "FILE")]
    pub onstart: Option<PathBuf>,

    /// Command to run when the instance starts
    #[arg(long)]
    pub onstart_cmd: Option<String>,

    /// Container entrypoint, used as the start command if no other is given
    #[arg(long)]
    pub entrypoint: Option<String>,

    /// Docker registry login, e.g. "-u user -p token docker.io"
    #[arg(long)]
    pub login: Option<String>,

    #[arg(long)]
    pub python_utf8: bool,

    #[arg(long)]
    pub lang_utf8: bool,

    /// Launch with jupyter
    #[arg(long)]
    pub jupyter: bool,

    /// Launch with jupyter lab instead of notebook
    #[arg(long)]
    pub jupyter_lab: bool,

    #[arg(long)]
    pub jupyter_dir: Option<String>,

    /// Skip sanity checks when creating from an existing instance
    #[arg(long)]
    pub force: bool,

    /// Fail rather than queue when the offer is unavailable
    #[arg(long)]
    pub cancel_unavail: bool,

    /// Create from a template; its settings replace the launch mode
    #[arg(long)]
    pub template_hash: Option<String>,

    /// Arguments passed to the image entrypoint; must come last
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    pub args: Option<Vec<String>>,
}

/// Parse one `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_env_pair(raw: &str) -> Result<(String, String), ValidationError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(ValidationError::InvalidEnv(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Cli, clap::Error> {
        let mut full = vec!["vast"];
        full.extend_from_slice(argv);
        Cli::try_parse_from(full)
    }

    #[test]
    fn env_pairs_split_on_first_equals() {
        assert_eq!(parse_env_pair("KEY1=value1").unwrap(), ("KEY1".to_string(), "value1".to_string()));
        assert_eq!(parse_env_pair("URL=a=b").unwrap(), ("URL".to_string(), "a=b".to_string()));
        assert_eq!(parse_env_pair("EMPTY=").unwrap(), ("EMPTY".to_string(), String::new()));
    }

    #[test]
    fn malformed_env_pairs_are_rejected() {
        assert_eq!(parse_env_pair("NOVALUE"), Err(ValidationError::InvalidEnv("NOVALUE".to_string())));
        assert!(parse_env_pair("=value").is_err());
        assert!(parse(&["create-instance", "1", "--image", "x", "--env", "BROKEN"]).is_err());
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        assert!(parse(&["destroy-instance", "not_an_integer"]).is_err());
        assert!(parse(&["attach-ssh", "--instance-id", "abc", "--ssh-key", "ssh-rsa AAAA"]).is_err());
        assert!(parse(&["prepay-instance", "12345", "lots"]).is_err());
    }

    #[test]
    fn missing_instance_id_is_rejected() {
        assert!(parse(&["attach-ssh", "--ssh-key", "ssh-rsa AAAA"]).is_err());
        assert!(parse(&["reboot-instance"]).is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = parse(&["reboot-instance", "12345", "--raw", "--explain"]).unwrap();
        assert!(cli.global.raw);
        assert!(cli.global.explain);
        assert!(matches!(cli.command, Command::RebootInstance { id: 12345 }));
    }

    #[test]
    fn create_collects_repeated_env() {
        let cli = parse(&["create-instance", "7", "--image", "ubuntu", "-e", "A=1", "--env", "B=2"]).unwrap();
        let Command::CreateInstance(args) = cli.command else {
            panic!("expected create-instance");
        };
        assert_eq!(args.env, vec![("A".to_string(), "1".to_string()), ("B".to_string(), "2".to_string())]);
        assert_eq!(args.disk, 10.0);
    }
}
