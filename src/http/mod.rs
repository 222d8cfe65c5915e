mod covers;
mod health;

pub(crate) use covers::search_covers;
pub(crate) use health::health_check;
