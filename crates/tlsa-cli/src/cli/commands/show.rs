//! `update-tlsa show` - derive a TLSA record and print it.

use anyhow::Result;

use super::Context;
use crate::cli::args::TargetArgs;
use crate::education::Explain;
use crate::output::{self, OutputFormat};
use tlsa::Updater;

pub async fn execute(ctx: Context, args: TargetArgs) -> Result<()> {
    let request = args.request()?;

    if ctx.explain {
        Explain::type_code(request.code, request.port).print();
    }

    let updater = Updater::new(ctx.config.updater_config())?;
    let prepared = updater.prepare(&request).await?;

    if args.debug >= 2 && ctx.output_format == OutputFormat::Pretty {
        output::print_certificates(&prepared);
    }
    output::print_record(&prepared, ctx.output_format)
}
