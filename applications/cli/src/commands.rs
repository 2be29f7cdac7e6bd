/// Command execution
use crate::cli::{Cli, Commands, InputArgs};
use anyhow::Context;
use roomwalk_audio::pipeline::{plan_job, render_job, JobPlan};
use roomwalk_audio::SymphoniaSource;

/// Run a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Render(inputs) => render(&inputs),
        Commands::Plan { inputs, json } => plan(&inputs, json),
    }
}

fn render(inputs: &InputArgs) -> anyhow::Result<()> {
    let config = inputs.resolve()?;
    let mut sink = config.render.sink();
    let job = config.into_job()?;

    tracing::info!(
        dry = %job.dry.display(),
        environments = job.environments.len(),
        output = %job.output.display(),
        quality = job.options.quality.as_str(),
        parallel = job.options.parallel,
        format = sink.format().as_str(),
        "Starting render"
    );

    let mut source = SymphoniaSource::new();
    let report = render_job(&job, &mut source, &mut sink)
        .with_context(|| format!("failed to render {}", job.output.display()))?;

    let seconds = report.output_len as f64 / f64::from(report.sample_rate);
    tracing::info!(
        output = %job.output.display(),
        samples = report.output_len,
        seconds,
        peak = report.peak,
        warnings = report.warnings.len(),
        "Done"
    );

    Ok(())
}

fn plan(inputs: &InputArgs, json: bool) -> anyhow::Result<()> {
    let job = inputs.resolve()?.into_plan_job()?;
    let plan = plan_job(&job, &mut SymphoniaSource::new()).context("failed to plan render")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", format_plan(&plan));
    }

    Ok(())
}

/// Human-readable timeline
pub fn format_plan(plan: &JobPlan) -> String {
    let rate = f64::from(plan.sample_rate);
    let mut out = format!(
        "Output: {} samples at {} Hz ({:.3}s)\n",
        plan.output_len,
        plan.sample_rate,
        plan.output_len as f64 / rate
    );

    if plan.spans.is_empty() {
        out.push_str("Single environment, no transitions\n");
    }
    for span in &plan.spans {
        out.push_str(&format!(
            "Transition {} -> {}: {:.3}s to {:.3}s (samples {}..{})\n",
            span.index,
            span.index + 1,
            span.start_secs,
            span.end_secs(),
            span.ramp_start,
            span.ramp_end
        ));
    }
    for warning in &plan.warnings {
        out.push_str(&format!("Warning: {warning}\n"));
    }

    out
}
