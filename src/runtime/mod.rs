pub(crate) mod host;
pub(crate) mod virtual_host;
