use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use decomp_cache::{compute_analysis_hash, AnalysisRequest};
use decomp_core::{logging, AnalyzerConfig, DecompositionPipeline, PipelineContext};
use decomp_diff::compare;
use decomp_model::{AnalysisMeta, Decomposition};
use std::io::Read;
use std::path::{Path, PathBuf};

fn build_cli() -> Command {
    Command::new("decomp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Repair, hash and diff model-generated workflow decompositions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Analyzer config file (TOML)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("repair")
                .about("Run a raw model response through the decomposition pipeline")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .default_value("-")
                        .help("Response file, or '-' for stdin"),
                )
                .arg(
                    Arg::new("team-size")
                        .long("team-size")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64))
                        .help("Team size used to calibrate health scores"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Title used when the response carries none"),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Compare two decompositions")
                .arg(
                    Arg::new("before")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Earlier decomposition (JSON)"),
                )
                .arg(
                    Arg::new("after")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Later decomposition (JSON)"),
                ),
        )
        .subcommand(
            Command::new("hash")
                .about("Print the cache key for an analysis request")
                .arg(
                    Arg::new("description")
                        .long("description")
                        .short('d')
                        .required(true)
                        .help("Workflow description"),
                )
                .arg(
                    Arg::new("stages")
                        .long("stages")
                        .value_delimiter(',')
                        .help("Comma-separated stage hints"),
                )
                .arg(
                    Arg::new("team-size")
                        .long("team-size")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64))
                        .help("Team size"),
                )
                .arg(
                    Arg::new("team-context")
                        .long("team-context")
                        .help("Free-text team context"),
                )
                .arg(
                    Arg::new("prompt-version")
                        .long("prompt-version")
                        .help("Override the configured prompt version"),
                )
                .arg(
                    Arg::new("model-id")
                        .long("model-id")
                        .help("Override the configured model id"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<AnalyzerConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => AnalyzerConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading response from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading {source}"))
    }
}

fn read_decomposition(path: &Path) -> Result<Decomposition> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a decomposition", path.display()))
}

fn repair(config: &AnalyzerConfig, args: &ArgMatches) -> Result<String> {
    let source = args.get_one::<String>("input").map_or("-", String::as_str);
    let raw = read_input(source)?;

    let title = args
        .get_one::<String>("title")
        .cloned()
        .unwrap_or_else(|| config.fallback_title.clone());
    let ctx = PipelineContext::new(title).with_team_size(args.get_one::<i64>("team-size").copied());

    let run = DecompositionPipeline::new().run(&raw, &ctx)?;
    if !run.integrity.is_clean() {
        tracing::info!(repairs = run.integrity.repair_count(), "repaired dependency graph");
    }

    let meta = AnalysisMeta::new(config.prompt_version.clone(), config.model_id.clone());
    Ok(serde_json::to_string_pretty(&run.into_analysis_output(meta))?)
}

fn diff(args: &ArgMatches) -> Result<String> {
    let before = args
        .get_one::<PathBuf>("before")
        .context("missing <before>")?;
    let after = args.get_one::<PathBuf>("after").context("missing <after>")?;

    let report = compare(&read_decomposition(before)?, &read_decomposition(after)?);
    Ok(serde_json::to_string_pretty(&report)?)
}

fn hash(config: &AnalyzerConfig, args: &ArgMatches) -> Result<String> {
    let description = args
        .get_one::<String>("description")
        .context("missing --description")?;

    let mut request = AnalysisRequest::new(description.as_str());
    if let Some(stages) = args.get_many::<String>("stages") {
        request = request.with_stages(stages.cloned());
    }
    if let Some(size) = args.get_one::<i64>("team-size") {
        request = request.with_team_size(*size);
    }
    if let Some(context) = args.get_one::<String>("team-context") {
        request = request.with_team_context(context.as_str());
    }

    let prompt_version = args
        .get_one::<String>("prompt-version")
        .unwrap_or(&config.prompt_version);
    let model_id = args
        .get_one::<String>("model-id")
        .unwrap_or(&config.model_id);

    Ok(compute_analysis_hash(&request, prompt_version, model_id)?.to_string())
}

fn run(matches: &ArgMatches) -> Result<String> {
    let mut config = load_config(matches)?;
    if matches.get_flag("json-logs") {
        config.log_json = true;
    }
    logging::init_from_config(&config);

    match matches.subcommand() {
        Some(("repair", args)) => repair(&config, args),
        Some(("diff", args)) => diff(args),
        Some(("hash", args)) => hash(&config, args),
        _ => anyhow::bail!("unknown command; see --help"),
    }
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let output = run(&matches)?;
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn run_args(args: &[&str]) -> Result<String> {
        let matches = build_cli().try_get_matches_from(args)?;
        run(&matches)
    }

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn hash_is_sixteen_hex_chars() {
        let out = run_args(&["decomp", "hash", "--description", "Run  payroll "]).unwrap();
        assert_eq!(out.len(), 16);

        let same = run_args(&["decomp", "hash", "-d", "Run payroll"]).unwrap();
        assert_eq!(out, same);

        let other = run_args(&["decomp", "hash", "-d", "Run payroll", "--team-size", "3"]).unwrap();
        assert_ne!(out, other);
    }

    #[test]
    fn hash_respects_overrides() {
        let base = run_args(&["decomp", "hash", "-d", "x", "--stages", "a,b"]).unwrap();
        let bumped = run_args(&[
            "decomp", "hash", "-d", "x", "--stages", "a,b", "--prompt-version", "v99",
        ])
        .unwrap();
        assert_ne!(base, bumped);
    }

    #[test]
    fn repair_reads_a_file() {
        let input = write_temp("```json\n{\"title\": \"Payroll\", \"steps\": [], \"gaps\": []}\n```");
        let out = run_args(&["decomp", "repair", "--input", input.path().to_str().unwrap()]).unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["title"], "Payroll");
        assert_eq!(json["_partial"], false);
    }

    #[test]
    fn repair_uses_title_flag_when_degrading() {
        let input = write_temp("no json here");
        let out = run_args(&[
            "decomp",
            "repair",
            "-i",
            input.path().to_str().unwrap(),
            "--title",
            "My flow",
        ])
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["title"], "My flow");
        assert_eq!(json["_partial"], true);
    }

    #[test]
    fn diff_two_files() {
        let flow = r#"{"id": "d", "title": "T", "steps": [], "gaps": [],
            "health": {"complexity": 0, "fragility": 10, "automationPotential": 0, "teamLoadBalance": 0}}"#;
        let before = write_temp(flow);
        let after = write_temp(&flow.replace("\"fragility\": 10", "\"fragility\": 4"));

        let out = run_args(&[
            "decomp",
            "diff",
            before.path().to_str().unwrap(),
            after.path().to_str().unwrap(),
        ])
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["summary"], "fragility reduced by 6 points.");
    }

    #[test]
    fn bad_config_path_fails() {
        let err = run_args(&["decomp", "--config", "/nonexistent.toml", "hash", "-d", "x"]).unwrap_err();
        assert!(err.to_string().contains("loading config"));
    }
}
