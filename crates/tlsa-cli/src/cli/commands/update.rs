//! `update-tlsa update` - derive a TLSA record and publish it.

use anyhow::Result;
use colored::Colorize;
use tracing::{debug, warn};

use super::Context;
use crate::cli::args::UpdateArgs;
use crate::education::Explain;
use crate::output::{self, OutputFormat};
use tlsa::Updater;

pub async fn execute(ctx: Context, args: UpdateArgs) -> Result<()> {
    let request = args.target.request()?;
    let debug = args.target.debug;
    let pretty = ctx.output_format == OutputFormat::Pretty;

    if ctx.explain && pretty {
        Explain::type_code(request.code, request.port).print();
    }

    let mut settings = ctx.config.updater_config();
    if args.dry_run {
        settings.publish = false;
    }
    let publisher = ctx.config.publisher()?;
    debug!(
        config = %ctx.config_path.display(),
        provider = publisher.is_some(),
        publish = settings.publish,
        "starting update"
    );

    let mut updater = Updater::new(settings)?;
    let prepared = updater.prepare(&request).await?;

    if pretty {
        println!("Using {}.", prepared.source);
        if debug >= 2 {
            output::print_certificates(&prepared);
        }
        if debug >= 1 {
            println!(
                "New TLSA content = {} {}",
                prepared.owner_name,
                prepared.record.content()
            );
        }
    }

    let manual = publisher.is_none();
    match publisher {
        Some(publisher) => {
            updater = updater.with_publisher(publisher);
            if pretty {
                println!(
                    "Looking for TLSA record {} on zone '{}' with subdomain '{}' and type {}",
                    prepared.owner_name.as_str().cyan(),
                    prepared.parts.zone,
                    prepared.parts.subdomain,
                    request.code.presentation()
                );
            }
        }
        None => debug!("no DNS provider configured, manual mode"),
    }
    let publish_enabled = updater.config().publish;

    match updater.publish(&prepared).await {
        Ok(outcome) => {
            if !pretty {
                return output::print_update(&prepared, &outcome, publish_enabled);
            }
            if manual {
                println!(
                    "{}",
                    "No DNS provider configured, no automatic DNS updates possible!".yellow()
                );
                output::print_manual(&prepared);
            } else {
                output::print_outcome(&outcome, publish_enabled);
            }
            Ok(())
        }
        Err(e) => {
            warn!(status = e.status_code(), error = %e, "publishing failed");
            eprintln!("{} {}", output::publish_failure(&e).red().bold(), e);
            if pretty {
                output::print_manual(&prepared);
            } else {
                output::print_record(&prepared, ctx.output_format)?;
            }
            Err(e.into())
        }
    }
}
