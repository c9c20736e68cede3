use std::path::{Path, PathBuf};

use crate::error::ExtractError;
use crate::formats::{self, Format, Stage};
use crate::{AppContext, InputTarget};

pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    /// At least one stage ran. `chain` lists the formats in order.
    Extracted { chain: Vec<&'static str>, last: PathBuf },
    /// The input itself matched no format.
    Unrecognized,
}

fn identify(app_ctx: &AppContext, registry: &[Format], target: &InputTarget) -> Option<(usize, Box<dyn std::any::Any>)> {
    for (i, format) in registry.iter().enumerate() {
        match (format.detect_func)(app_ctx, target) {
            Ok(Some(ctx)) => return Some((i, ctx)),
            Ok(None) => {}
            Err(e) => log::warn!("{} probe failed on {}: {}", format.name, target.path.display(), e),
        }
    }
    None
}

/// Identifies `path`, extracts it, and keeps going on whatever single file
/// each stage derives until a stage is terminal or nothing matches.
pub fn resolve(app_ctx: &AppContext, path: &Path) -> Result<Resolution, ExtractError> {
    let registry = formats::get_registry();
    let mut chain: Vec<&'static str> = Vec::new();
    let mut current = path.to_path_buf();

    loop {
        if current.is_dir() {
            log::debug!("{} is a directory, not probing", current.display());
            break;
        }
        let target = InputTarget::open(&current)
            .map_err(|source| ExtractError::ReadFailure { path: current.clone(), source })?;

        let Some((index, ctx)) = identify(app_ctx, &registry, &target) else {
            log::debug!("No format matched {}", current.display());
            break;
        };
        if chain.len() >= app_ctx.max_depth {
            return Err(ExtractError::ChainTooLong(chain.len()));
        }

        let format = &registry[index];
        println!("\n[{}] {} detected: {}", chain.len() + 1, format.name, current.display());
        chain.push(format.name);

        let stage = (format.run_func)(app_ctx, &target, ctx).map_err(|cause| ExtractError::Stage {
            format: format.name,
            path: current.clone(),
            cause,
        })?;
        match stage {
            Stage::Derived(next) => {
                log::debug!("{} -> {}", current.display(), next.display());
                current = next;
            }
            Stage::Terminal => break,
        }
    }

    if chain.is_empty() {
        Ok(Resolution::Unrecognized)
    } else {
        log::debug!("Chain finished after {} stages", chain.len());
        Ok(Resolution::Extracted { chain, last: current })
    }
}
