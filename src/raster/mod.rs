pub(crate) mod snapshot;
