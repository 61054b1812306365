use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use unidep::{materialize_artifact, pipeline, Config};

/// CLI overrides applied on top of the loaded configuration.
pub struct Options {
    pub packages: Option<String>,
    pub target_dir: Option<String>,
    pub repos: Vec<String>,
    pub maven_local: Option<bool>,
    pub remote: Option<bool>,
    pub jetifier: bool,
    pub data_binding_version: Option<String>,
    pub dry_run: bool,
}

pub fn run(options: Options) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(packages) = options.packages {
        config.packages_to_copy = packages;
    }
    if let Some(target_dir) = options.target_dir {
        config.target_dir = target_dir;
    }
    if !options.repos.is_empty() {
        config.maven_repos = options.repos;
    }
    if let Some(maven_local) = options.maven_local {
        config.use_maven_local_repo = maven_local;
    }
    if let Some(remote) = options.remote {
        config.use_remote_maven_repos = remote;
    }
    if options.jetifier {
        config.use_jetifier = true;
    }
    if let Some(version) = options.data_binding_version {
        config.data_binding_version = Some(version);
    }

    if config.packages_to_copy.trim().is_empty() {
        bail!("No packages requested; pass --packages or set packages_to_copy in unidep.toml");
    }

    let resolution = pipeline::run(&config)?;

    if options.dry_run {
        eprintln!(
            "[DRY RUN] Would copy {} artifact(s) to {}",
            resolution.result.copied.len(),
            config.target_path().display()
        );
    } else if !resolution.result.copied.is_empty() {
        let target = config.target_path();
        fs::create_dir_all(&target)?;

        let progress = ProgressBar::new(resolution.result.copied.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.green} {pos}/{len} {msg}")
                .unwrap(),
        );
        for artifact in &resolution.result.copied {
            progress.set_message(artifact.file_name());
            materialize_artifact(artifact, &target)?;
            progress.inc(1);
        }
        progress.finish_and_clear();
    }

    // The report on stdout is the machine contract; diagnostics stay on
    // stderr.
    print!("{}", resolution.result.render());

    if !resolution.spec_errors.is_empty() {
        for err in &resolution.spec_errors {
            eprintln!("Error: {err}");
        }
        bail!(
            "{} malformed package specification(s)",
            resolution.spec_errors.len()
        );
    }
    Ok(())
}
