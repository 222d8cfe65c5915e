mod cover_search;
pub(crate) use cover_search::*;

mod credentials;
pub(crate) use credentials::*;
