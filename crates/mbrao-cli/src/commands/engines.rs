use anyhow::Result;
use mbrao_core::{EngineRole, Parser};
use std::io::Write;

pub fn execute(parser: &Parser, role: Option<EngineRole>, out: &mut dyn Write) -> Result<()> {
    let roles = match role {
        Some(role) => vec![role],
        None => vec![EngineRole::Parsing, EngineRole::Rendering],
    };

    let config = parser.config();
    for role in roles {
        let default = match role {
            EngineRole::Parsing => config.parsing_engine(),
            EngineRole::Rendering => config.rendering_engine(),
        };

        for name in parser.registry().names(role) {
            let marker = if &name == default { " (default)" } else { "" };
            writeln!(out, "{}\t{}{}", role, name, marker)?;
        }
    }
    Ok(())
}
