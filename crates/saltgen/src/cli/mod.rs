//! Command-line interface for saltgen
//!
//! `saltgen [options] <target> [<attr>=<value> ...]`

use anyhow::{Context, Result};
use clap::{Args, Parser};
use saltgen::builder::{BuilderConfig, ResourceBuilder, DEFAULT_SERVER_NODE_USER};
use saltgen::config::{MinionConfig, DEFAULT_CONFIG_DIR};
use saltgen::error::SaltgenError;
use saltgen::fetch::{salt_call, MineQuery, SaltCall, SaltVersion, Target, TargetMode};
use saltgen::output::to_yaml;
use saltgen::request::split_grain_list;
use saltgen::statics::parse_static_args;
use saltgen_grains::DEFAULT_DELIMITER;
use saltgen_logging::{init_logging, LogConfig, LogFile, LogLevel};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "saltgen",
    version,
    about = "Generate Rundeck node resources from the Salt Mine"
)]
pub struct Cli {
    /// Targeting expression selecting the minions to include
    pub target: Option<String>,

    /// Static attributes added to every node, as key=value
    #[arg(value_name = "ATTR=VALUE")]
    pub statics: Vec<String>,

    #[command(flatten)]
    pub targeting: TargetingArgs,

    /// Mine function (or alias) that returns grains
    #[arg(short = 'm', long = "mine-function", default_value = "grains.items")]
    pub mine_function: String,

    /// Add a node for the Rundeck server itself, built from local grains
    #[arg(short = 's', long = "include-server-node")]
    pub include_server_node: bool,

    /// Username for jobs run on the server node
    #[arg(short = 'u', long = "server-node-user", default_value = DEFAULT_SERVER_NODE_USER)]
    pub server_node_user: String,

    /// Grains to add as node attributes (comma or space separated, repeatable)
    #[arg(short = 'a', long = "attributes")]
    pub attributes: Vec<String>,

    /// Grains to add as node tags (comma or space separated, repeatable)
    #[arg(short = 't', long = "tags")]
    pub tags: Vec<String>,

    /// Separator for nested grain paths
    #[arg(short = 'd', long = "delimiter", default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,

    /// Salt configuration directory
    #[arg(
        short = 'c',
        long = "config-dir",
        env = "SALTGEN_CONFIG_DIR",
        default_value = DEFAULT_CONFIG_DIR
    )]
    pub config_dir: PathBuf,

    /// Path to the salt-call executable (default: looked up in PATH)
    #[arg(long = "salt-call", env = "SALTGEN_SALT_CALL")]
    pub salt_call: Option<PathBuf>,

    /// Salt release to target instead of asking salt-call, e.g. 2016.11
    #[arg(long = "salt-version")]
    pub salt_version: Option<SaltVersion>,

    /// Console log level
    #[arg(short = 'l', long = "log-level", default_value = "warning", value_parser = parse_level)]
    pub log_level: LogLevel,

    /// Log file path
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Log file level
    #[arg(long = "log-file-level", value_parser = parse_level)]
    pub log_file_level: Option<LogLevel>,
}

/// Targeting mode flags. At most one may be given; glob is the default.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct TargetingArgs {
    /// Target with a PCRE regular expression
    #[arg(short = 'E', long = "pcre")]
    pub pcre: bool,

    /// Target a list of minion ids
    #[arg(short = 'L', long = "list")]
    pub list: bool,

    /// Target by grain value (glob)
    #[arg(short = 'G', long = "grain")]
    pub grain: bool,

    /// Target by grain value (PCRE)
    #[arg(long = "grain-pcre")]
    pub grain_pcre: bool,

    /// Target a nodegroup
    #[arg(short = 'N', long = "nodegroup")]
    pub nodegroup: bool,

    /// Target with a range expression
    #[arg(short = 'R', long = "range")]
    pub range: bool,

    /// Target with a compound expression
    #[arg(short = 'C', long = "compound")]
    pub compound: bool,

    /// Target by pillar value (glob)
    #[arg(short = 'I', long = "pillar")]
    pub pillar: bool,

    /// Target by pillar value (PCRE)
    #[arg(long = "pillar-pcre")]
    pub pillar_pcre: bool,

    /// Target by IP address or CIDR
    #[arg(short = 'S', long = "ipcidr")]
    pub ipcidr: bool,
}

impl TargetingArgs {
    pub fn mode(&self) -> TargetMode {
        let flags = [
            (self.pcre, TargetMode::Pcre),
            (self.list, TargetMode::List),
            (self.grain, TargetMode::Grain),
            (self.grain_pcre, TargetMode::GrainPcre),
            (self.nodegroup, TargetMode::Nodegroup),
            (self.range, TargetMode::Range),
            (self.compound, TargetMode::Compound),
            (self.pillar, TargetMode::Pillar),
            (self.pillar_pcre, TargetMode::PillarPcre),
            (self.ipcidr, TargetMode::Ipcidr),
        ];
        flags
            .into_iter()
            .find_map(|(set, mode)| set.then_some(mode))
            .unwrap_or_default()
    }
}

fn parse_level(s: &str) -> std::result::Result<LogLevel, String> {
    s.parse::<LogLevel>().map_err(|e| e.to_string())
}

/// Run one generation pass and print the document to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let raw_target = cli.target.as_deref().ok_or(SaltgenError::NoTarget)?;

    let minion_config = MinionConfig::load(&cli.config_dir)?;
    init_logging(log_config(&cli, &minion_config)?)?;

    let mode = cli.targeting.mode();
    let target = Target::parse(raw_target, mode);

    let builder_config = BuilderConfig::new()
        .with_delimiter(cli.delimiter.as_str())
        .with_attributes(split_grain_list(&cli.attributes))
        .with_tags(split_grain_list(&cli.tags))
        .with_statics(parse_static_args(&cli.statics))
        .with_server_node_user(cli.server_node_user.as_str());
    debug!(
        "Resource generator configured: attributes={:?} tags={:?} statics={:?}",
        builder_config.attributes(),
        builder_config.tags(),
        builder_config.statics()
    );

    let program = salt_call::locate(cli.salt_call.clone())?;
    let source = SaltCall::new(program, cli.config_dir.clone(), cli.salt_version);

    let query = MineQuery {
        target,
        mode,
        function: cli.mine_function.clone(),
        exclude_local: cli.include_server_node,
    };

    let resources = ResourceBuilder::new(builder_config).generate(
        &source,
        &query,
        cli.include_server_node,
    )?;

    let document = to_yaml(&resources)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(document.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write resources to stdout")?;

    Ok(())
}

fn log_config(cli: &Cli, minion_config: &MinionConfig) -> Result<LogConfig> {
    let path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| minion_config.log_file());
    let level = match cli.log_file_level {
        Some(level) => level,
        None => minion_config.log_file_level()?.unwrap_or(cli.log_level),
    };

    Ok(LogConfig {
        console_level: cli.log_level,
        file: Some(LogFile { path, level }),
    })
}
