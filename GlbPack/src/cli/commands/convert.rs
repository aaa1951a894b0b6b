//! CLI command for folder conversion

use std::path::Path;
use std::time::Instant;

use crate::batch::{batch_convert, default_output_dir, find_gltf_files};
use crate::cli::progress::{LOOKING_GLASS, PACKAGE, WARNING, print_done, print_step, simple_bar};
use crate::converter::{ConvertOptions, MissingResourcePolicy};

pub fn execute(
    input: &Path,
    output: Option<&Path>,
    strict: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    if !input.is_dir() {
        anyhow::bail!("Input folder does not exist: {}", input.display());
    }

    let started = Instant::now();
    print_step(1, 2, &LOOKING_GLASS, &format!("Scanning {}...", input.display()));
    let files = find_gltf_files(input)?;

    if files.is_empty() {
        println!("No .gltf files found in: {}", input.display());
        return Ok(());
    }

    let output_dir = output.map_or_else(|| default_output_dir(input), Path::to_path_buf);
    let policy = if strict {
        MissingResourcePolicy::Error
    } else {
        MissingResourcePolicy::Warn
    };
    let options = ConvertOptions::new()
        .with_missing_resources(policy)
        .with_generator(format!("glbpack {}", crate::VERSION));

    print_step(
        2,
        2,
        &PACKAGE,
        &format!("Packing {} files into {}...", files.len(), output_dir.display()),
    );

    let pb = simple_bar(files.len() as u64, "Converting");
    if quiet {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let result = batch_convert(&files, &output_dir, &options, |progress| {
        pb.set_position(progress.current as u64);
        pb.set_message(progress.file.clone());
    });

    pb.finish_and_clear();

    println!();
    println!("Conversion complete:");
    println!("  Success: {}", result.success_count);
    println!("  Failed: {}", result.fail_count);

    if result.warning_count > 0 {
        println!();
        println!("{WARNING}{} missing resources:", result.warning_count);
        for msg in result
            .results
            .iter()
            .filter(|m| m.starts_with("Converted with warnings"))
        {
            println!("  {msg}");
        }
    }

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for msg in result.results.iter().filter(|m| m.starts_with("Failed")) {
            println!("  {msg}");
        }
        anyhow::bail!("{} of {} files failed", result.fail_count, files.len());
    }

    print_done(started.elapsed());
    Ok(())
}
