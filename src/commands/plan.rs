//! `lbmon plan` - preview a pass without touching the remote side

use anyhow::Result;

use super::Workspace;
use crate::Context;
use crate::engine::{build_plan, differ};

pub fn run(ctx: &Context, name: Option<&str>) -> Result<()> {
    let ws = Workspace::load(ctx)?;
    let planned = build_plan(&ws.config, &ws.state, name)?;

    differ::display_plan(&planned);
    Ok(())
}
