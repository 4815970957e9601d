use log::debug;

use crate::{
    cache::{CloneFactory, IdAllocator},
    git::GitRunner,
    model::RequestOptions,
};
use std::{error::Error, path::PathBuf};

/// Handler to clone command
/// 1 - Validates the raw options
/// 2 - Acquires a working copy according to the cache mode
/// 3 - Returns the working copy path
pub fn do_clone<R, A>(
    factory: &CloneFactory<R, A>,
    options: RequestOptions,
) -> Result<PathBuf, Box<dyn Error>>
where
    R: GitRunner,
    A: IdAllocator,
{
    let request = options.validate()?;
    debug!("Validated request {:?}", request);

    let path = factory.acquire(&request)?;

    Ok(path)
}
