mod classify;
mod model;

pub(crate) use classify::*;
pub(crate) use model::*;
