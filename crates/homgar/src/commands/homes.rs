//! Home listing.

use tabled::Tabled;

use homgar_core::Home;

use crate::cli::GlobalOpts;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct HomeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Home> for HomeRow {
    fn from(h: &Home) -> Self {
        Self {
            id: h.id.clone(),
            name: h.name.clone(),
        }
    }
}

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let homes = ctx.homgar.get_homes().await?;
    let out = output::render_list(&global.output, &homes, |h| HomeRow::from(h), |h| h.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
